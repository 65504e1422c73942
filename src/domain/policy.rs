use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// Size limits of one growing collection (subjects of a semester, or the
/// semesters of a programme).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionLimits {
    pub max_rows: usize,
    pub max_total_credits: u32,
    pub default_credits: u32,
}

impl CollectionLimits {
    pub const SUBJECTS: Self = Self {
        max_rows: 7,
        max_total_credits: 21,
        default_credits: 3,
    };

    pub const SEMESTERS: Self = Self {
        max_rows: 12,
        max_total_credits: 216,
        default_credits: 18,
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditBounds {
    pub min: u32,
    pub max: u32,
}

impl CreditBounds {
    pub fn range(&self) -> RangeInclusive<u32> {
        self.min..=self.max
    }

    pub fn contains(&self, credits: u32) -> bool {
        self.range().contains(&credits)
    }
}

/// How the SGPA of an expert-mode semester is fed into the CGPA.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Precision {
    /// Unrounded SGPA values.
    #[default]
    Full,
    /// SGPA rounded to two decimals first, as shown on screen.
    Display,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LockMode {
    #[default]
    Free,
    /// Adding a row locks every row before it.
    Sequential,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSettings {
    pub institution: String,
    pub registration_prefix: String,
    pub file_prefix: String,
}

impl Default for TranscriptSettings {
    fn default() -> Self {
        Self {
            institution: "Abdul Wali Khan University Mardan".to_string(),
            registration_prefix: "AWKUM-".to_string(),
            file_prefix: "AWKUM".to_string(),
        }
    }
}

/// Every limit and switch the engine consults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradePolicy {
    pub subject_limits: CollectionLimits,
    pub semester_limits: CollectionLimits,
    pub subject_credits: CreditBounds,
    pub semester_credits: CreditBounds,
    pub precision: Precision,
    pub lock_mode: LockMode,
    pub standing_threshold: f64,
    pub transcript: TranscriptSettings,
}

impl Default for GradePolicy {
    fn default() -> Self {
        Self {
            subject_limits: CollectionLimits::SUBJECTS,
            semester_limits: CollectionLimits::SEMESTERS,
            subject_credits: CreditBounds { min: 2, max: 6 },
            semester_credits: CreditBounds { min: 12, max: 21 },
            precision: Precision::Full,
            lock_mode: LockMode::Free,
            standing_threshold: 2.0,
            transcript: TranscriptSettings::default(),
        }
    }
}

pub const MAX_MARKS: u32 = 100;
