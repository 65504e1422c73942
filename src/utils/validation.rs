use crate::utils::error::{GradeError, Result};
use regex::Regex;
use std::sync::OnceLock;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(GradeError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(GradeError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: u32, min_value: u32) -> Result<()> {
    if value < min_value {
        return Err(GradeError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(GradeError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(GradeError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

/// Subject names keep ASCII letters and whitespace only.
pub fn sanitize_name(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphabetic() || c.is_whitespace())
        .collect()
}

/// Upper-cases a course code and strips anything outside `A-Z 0-9 -`.
/// A second hyphen cuts the code at the last hyphen.
pub fn normalize_course_code(raw: &str) -> String {
    let mut code: String = raw
        .to_ascii_uppercase()
        .chars()
        .filter(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || *c == '-')
        .collect();

    if code.matches('-').count() > 1 {
        if let Some(last) = code.rfind('-') {
            code.truncate(last);
        }
    }
    code
}

fn course_code_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z]{2,5}-\d{3}$").expect("course code pattern"))
}

/// 2-5 letters, one hyphen, 3 digits (`CS-123`, `MATH-101`).
pub fn is_valid_course_code(code: &str) -> bool {
    course_code_pattern().is_match(code)
}

pub fn validate_registration_number(field_name: &str, value: &str, prefix: &str) -> Result<()> {
    let upper = value.trim().to_ascii_uppercase();
    let prefix_upper = prefix.to_ascii_uppercase();
    if !upper.starts_with(&prefix_upper) || upper.len() <= prefix_upper.len() {
        return Err(GradeError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!(
                "Registration number must start with \"{}\" followed by your ID",
                prefix
            ),
        });
    }
    Ok(())
}
