use crate::domain::policy::{
    CollectionLimits, CreditBounds, GradePolicy, LockMode, Precision, TranscriptSettings,
};
use crate::utils::error::{GradeError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Optional policy file. Every section and key may be left out; missing
/// values fall back to [`GradePolicy::default`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PolicyConfig {
    pub limits: Option<LimitsConfig>,
    pub credits: Option<CreditsConfig>,
    pub calculation: Option<CalculationConfig>,
    pub transcript: Option<TranscriptConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LimitsConfig {
    pub subjects: Option<CollectionConfig>,
    pub semesters: Option<CollectionConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CollectionConfig {
    pub max_rows: Option<usize>,
    pub max_total_credits: Option<u32>,
    pub default_credits: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreditsConfig {
    pub subject_min: Option<u32>,
    pub subject_max: Option<u32>,
    pub semester_min: Option<u32>,
    pub semester_max: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CalculationConfig {
    pub precision: Option<Precision>,
    pub lock_mode: Option<LockMode>,
    pub standing_threshold: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TranscriptConfig {
    pub institution: Option<String>,
    pub registration_prefix: Option<String>,
    pub file_prefix: Option<String>,
}

impl CollectionConfig {
    fn apply(&self, base: CollectionLimits) -> CollectionLimits {
        CollectionLimits {
            max_rows: self.max_rows.unwrap_or(base.max_rows),
            max_total_credits: self.max_total_credits.unwrap_or(base.max_total_credits),
            default_credits: self.default_credits.unwrap_or(base.default_credits),
        }
    }
}

impl PolicyConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(GradeError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed = Self::substitute_env_vars(content)?;

        toml::from_str(&processed).map_err(|e| GradeError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unknown variables stay
    /// as written.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| GradeError::ConfigError {
            message: format!("env substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// Merges the file over the defaults.
    pub fn to_policy(&self) -> GradePolicy {
        let mut policy = GradePolicy::default();

        if let Some(limits) = &self.limits {
            if let Some(subjects) = &limits.subjects {
                policy.subject_limits = subjects.apply(policy.subject_limits);
            }
            if let Some(semesters) = &limits.semesters {
                policy.semester_limits = semesters.apply(policy.semester_limits);
            }
        }

        if let Some(credits) = &self.credits {
            policy.subject_credits = CreditBounds {
                min: credits.subject_min.unwrap_or(policy.subject_credits.min),
                max: credits.subject_max.unwrap_or(policy.subject_credits.max),
            };
            policy.semester_credits = CreditBounds {
                min: credits.semester_min.unwrap_or(policy.semester_credits.min),
                max: credits.semester_max.unwrap_or(policy.semester_credits.max),
            };
        }

        if let Some(calculation) = &self.calculation {
            policy.precision = calculation.precision.unwrap_or(policy.precision);
            policy.lock_mode = calculation.lock_mode.unwrap_or(policy.lock_mode);
            policy.standing_threshold = calculation
                .standing_threshold
                .unwrap_or(policy.standing_threshold);
        }

        if let Some(transcript) = &self.transcript {
            let defaults = TranscriptSettings::default();
            policy.transcript = TranscriptSettings {
                institution: transcript.institution.clone().unwrap_or(defaults.institution),
                registration_prefix: transcript
                    .registration_prefix
                    .clone()
                    .unwrap_or(defaults.registration_prefix),
                file_prefix: transcript.file_prefix.clone().unwrap_or(defaults.file_prefix),
            };
        }

        policy
    }

    /// Validates and converts in one step.
    pub fn into_policy(self) -> Result<GradePolicy> {
        self.validate()?;
        Ok(self.to_policy())
    }
}

fn validate_limits(prefix: &str, limits: &CollectionLimits) -> Result<()> {
    validation::validate_positive_number(
        &format!("{}.max_rows", prefix),
        u32::try_from(limits.max_rows).unwrap_or(u32::MAX),
        1,
    )?;
    validation::validate_positive_number(
        &format!("{}.default_credits", prefix),
        limits.default_credits,
        1,
    )?;
    validation::validate_range(
        &format!("{}.max_total_credits", prefix),
        limits.max_total_credits,
        limits.default_credits,
        u32::MAX,
    )
}

fn validate_bounds(prefix: &str, bounds: &CreditBounds) -> Result<()> {
    validation::validate_positive_number(&format!("{}_min", prefix), bounds.min, 1)?;
    validation::validate_range(&format!("{}_max", prefix), bounds.max, bounds.min, u32::MAX)
}

impl Validate for PolicyConfig {
    fn validate(&self) -> Result<()> {
        let policy = self.to_policy();

        validate_limits("limits.subjects", &policy.subject_limits)?;
        validate_limits("limits.semesters", &policy.semester_limits)?;
        validate_bounds("credits.subject", &policy.subject_credits)?;
        validate_bounds("credits.semester", &policy.semester_credits)?;

        validation::validate_range(
            "calculation.standing_threshold",
            policy.standing_threshold,
            0.0,
            4.0,
        )?;
        validation::validate_non_empty_string(
            "transcript.institution",
            &policy.transcript.institution,
        )?;
        validation::validate_non_empty_string(
            "transcript.registration_prefix",
            &policy.transcript.registration_prefix,
        )?;
        validation::validate_non_empty_string(
            "transcript.file_prefix",
            &policy.transcript.file_prefix,
        )?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_empty_file_gives_defaults() {
        let config = PolicyConfig::from_toml_str("").unwrap();
        assert_eq!(config.into_policy().unwrap(), GradePolicy::default());
    }

    #[test]
    fn test_parse_partial_policy() {
        let toml_content = r#"
[limits.semesters]
max_rows = 8
max_total_credits = 144

[credits]
subject_min = 1

[calculation]
precision = "display"
lock_mode = "sequential"
"#;

        let policy = PolicyConfig::from_toml_str(toml_content)
            .unwrap()
            .into_policy()
            .unwrap();

        assert_eq!(policy.semester_limits.max_rows, 8);
        assert_eq!(policy.semester_limits.max_total_credits, 144);
        assert_eq!(policy.semester_limits.default_credits, 18);
        assert_eq!(policy.subject_limits, CollectionLimits::SUBJECTS);
        assert_eq!(policy.subject_credits.min, 1);
        assert_eq!(policy.subject_credits.max, 6);
        assert_eq!(policy.precision, Precision::Display);
        assert_eq!(policy.lock_mode, LockMode::Sequential);
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("GRADESHEET_TEST_INSTITUTION", "Test University");

        let toml_content = r#"
[transcript]
institution = "${GRADESHEET_TEST_INSTITUTION}"
"#;

        let policy = PolicyConfig::from_toml_str(toml_content).unwrap().to_policy();
        assert_eq!(policy.transcript.institution, "Test University");
        assert_eq!(policy.transcript.registration_prefix, "AWKUM-");

        std::env::remove_var("GRADESHEET_TEST_INSTITUTION");
    }

    #[test]
    fn test_config_validation() {
        let toml_content = r#"
[credits]
subject_min = 5
subject_max = 3
"#;
        let config = PolicyConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());

        let toml_content = r#"
[calculation]
standing_threshold = 5.0
"#;
        let config = PolicyConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_malformed_toml() {
        let result = PolicyConfig::from_toml_str("[limits\nmax_rows = ");
        assert!(matches!(
            result,
            Err(GradeError::ConfigValidationError { .. })
        ));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();

        let toml_content = r#"
[limits.subjects]
max_rows = 6
"#;
        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let policy = PolicyConfig::from_file(temp_file.path()).unwrap().to_policy();
        assert_eq!(policy.subject_limits.max_rows, 6);
    }
}
