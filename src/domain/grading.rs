use serde::{Deserialize, Serialize};
use std::fmt;

pub const MAX_GRADE_POINT: f64 = 4.0;
pub const MIN_GRADE_POINT: f64 = 0.0;

/// Letter grade assigned from a grade point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GradeLetter {
    #[serde(rename = "A+")]
    APlus,
    #[serde(rename = "A")]
    A,
    #[serde(rename = "A-")]
    AMinus,
    #[serde(rename = "B+")]
    BPlus,
    #[serde(rename = "B")]
    B,
    #[serde(rename = "B-")]
    BMinus,
    #[serde(rename = "C+")]
    CPlus,
    #[serde(rename = "C")]
    C,
    #[serde(rename = "C-")]
    CMinus,
    #[serde(rename = "F")]
    #[default]
    F,
}

impl GradeLetter {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::APlus => "A+",
            Self::A => "A",
            Self::AMinus => "A-",
            Self::BPlus => "B+",
            Self::B => "B",
            Self::BMinus => "B-",
            Self::CPlus => "C+",
            Self::C => "C",
            Self::CMinus => "C-",
            Self::F => "F",
        }
    }
}

impl fmt::Display for GradeLetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lower bounds (inclusive) of each letter band, highest first.
const LETTER_THRESHOLDS: [(f64, GradeLetter); 9] = [
    (4.00, GradeLetter::APlus),
    (3.75, GradeLetter::A),
    (3.50, GradeLetter::AMinus),
    (3.25, GradeLetter::BPlus),
    (3.00, GradeLetter::B),
    (2.75, GradeLetter::BMinus),
    (2.50, GradeLetter::CPlus),
    (2.25, GradeLetter::C),
    (2.00, GradeLetter::CMinus),
];

/// Converts marks to a grade point.
///
/// Marks are rounded to the nearest integer first. 90 and above is a flat
/// 4.00, below 50 is 0.00, and every mark in between adds 0.05 on top of
/// 2.00. Callers range-check marks before calling.
pub fn grade_point(marks: f64) -> f64 {
    let m = marks.round();
    if m >= 90.0 {
        return 4.00;
    }
    if m < 50.0 {
        return 0.00;
    }
    2.00 + (m - 50.0) * 0.05
}

/// Maps a grade point (or an SGPA/CGPA) to its letter.
pub fn letter_grade(grade_point: f64) -> GradeLetter {
    LETTER_THRESHOLDS
        .iter()
        .find(|(min, _)| grade_point >= *min)
        .map(|(_, letter)| *letter)
        .unwrap_or(GradeLetter::F)
}

pub fn is_valid_grade_point(value: f64) -> bool {
    value.is_finite() && (MIN_GRADE_POINT..=MAX_GRADE_POINT).contains(&value)
}

/// Rounds to two decimals for display.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// One band of the printed reference chart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GradeBand {
    pub letter: GradeLetter,
    pub min_marks: u8,
    pub max_marks: u8,
    pub gp_range: &'static str,
}

const fn band(
    letter: GradeLetter,
    min_marks: u8,
    max_marks: u8,
    gp_range: &'static str,
) -> GradeBand {
    GradeBand {
        letter,
        min_marks,
        max_marks,
        gp_range,
    }
}

// Display-only marks table. Computed letters always come from
// `letter_grade`, the two tables are not interchangeable.
const GRADING_CHART: [GradeBand; 10] = [
    band(GradeLetter::APlus, 90, 100, "4.00"),
    band(GradeLetter::A, 85, 89, "3.75 - 3.95"),
    band(GradeLetter::AMinus, 80, 84, "3.50 - 3.70"),
    band(GradeLetter::BPlus, 75, 79, "3.25 - 3.45"),
    band(GradeLetter::B, 70, 74, "3.00 - 3.20"),
    band(GradeLetter::BMinus, 65, 69, "2.75 - 2.95"),
    band(GradeLetter::CPlus, 60, 64, "2.50 - 2.70"),
    band(GradeLetter::C, 55, 59, "2.25 - 2.45"),
    band(GradeLetter::CMinus, 50, 54, "2.00 - 2.20"),
    band(GradeLetter::F, 0, 49, "0.00"),
];

pub fn grading_chart() -> &'static [GradeBand] {
    &GRADING_CHART
}
