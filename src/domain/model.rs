use crate::domain::grading::{self, GradeLetter};
use crate::domain::policy::MAX_MARKS;
use crate::utils::error::Result;
use crate::utils::validation;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One graded course. Grade point and letter follow the marks and cannot
/// be set on their own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subject {
    #[serde(default)]
    name: String,
    #[serde(default)]
    code: String,
    credits: Option<u32>,
    marks: Option<u32>,
    #[serde(default)]
    grade_point: f64,
    #[serde(default)]
    grade_letter: GradeLetter,
    #[serde(default)]
    locked: bool,
}

impl Subject {
    /// A blank row carrying only its default credit hours.
    pub fn new(credits: u32) -> Self {
        Self {
            name: String::new(),
            code: String::new(),
            credits: Some(credits),
            marks: None,
            grade_point: 0.0,
            grade_letter: GradeLetter::F,
            locked: false,
        }
    }

    pub fn graded(name: &str, credits: u32, marks: u32) -> Self {
        let mut subject = Self::new(credits);
        subject.set_name(name);
        subject.set_marks(Some(marks));
        subject
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn credits(&self) -> Option<u32> {
        self.credits
    }

    pub fn marks(&self) -> Option<u32> {
        self.marks
    }

    pub fn grade_point(&self) -> f64 {
        self.grade_point
    }

    pub fn grade_letter(&self) -> GradeLetter {
        self.grade_letter
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Empty codes are allowed; anything else must look like `CS-101`.
    pub fn has_valid_code(&self) -> bool {
        self.code.is_empty() || validation::is_valid_course_code(&self.code)
    }

    pub fn set_name(&mut self, raw: &str) {
        self.name = validation::sanitize_name(raw);
    }

    pub fn set_code(&mut self, raw: &str) {
        self.code = validation::normalize_course_code(raw);
    }

    pub fn set_credits(&mut self, credits: Option<u32>) {
        self.credits = credits;
    }

    /// Marks above 100 are clamped. Blank marks give 0.00 / F.
    pub fn set_marks(&mut self, marks: Option<u32>) {
        self.marks = marks.map(|m| m.min(MAX_MARKS));
        self.rederive();
    }

    pub(crate) fn set_locked(&mut self, locked: bool) {
        self.locked = locked;
    }

    pub(crate) fn rederive(&mut self) {
        self.marks = self.marks.map(|m| m.min(MAX_MARKS));
        match self.marks {
            Some(marks) => {
                self.grade_point = grading::grade_point(f64::from(marks));
                self.grade_letter = grading::letter_grade(self.grade_point);
            }
            None => {
                self.grade_point = 0.0;
                self.grade_letter = GradeLetter::F;
            }
        }
    }
}

/// One semester of a CGPA computation. In quick mode `sgpa` and `credits`
/// are entered directly; in expert mode both are recomputed from
/// `subjects` after every change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Semester {
    number: usize,
    name: String,
    sgpa: Option<f64>,
    credits: Option<u32>,
    #[serde(default)]
    subjects: Vec<Subject>,
    #[serde(default)]
    grade_letter: GradeLetter,
    #[serde(default)]
    locked: bool,
}

impl Semester {
    pub fn quick(number: usize, credits: u32) -> Self {
        Self {
            number,
            name: semester_name(number),
            sgpa: None,
            credits: Some(credits),
            subjects: Vec::new(),
            grade_letter: GradeLetter::F,
            locked: false,
        }
    }

    pub fn expert(number: usize, subjects: Vec<Subject>) -> Self {
        Self {
            number,
            name: semester_name(number),
            sgpa: None,
            credits: None,
            subjects,
            grade_letter: GradeLetter::F,
            locked: false,
        }
    }

    pub fn number(&self) -> usize {
        self.number
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sgpa(&self) -> Option<f64> {
        self.sgpa
    }

    pub fn credits(&self) -> Option<u32> {
        self.credits
    }

    pub fn subjects(&self) -> &[Subject] {
        &self.subjects
    }

    pub fn grade_letter(&self) -> GradeLetter {
        self.grade_letter
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub(crate) fn subjects_mut(&mut self) -> &mut Vec<Subject> {
        &mut self.subjects
    }

    /// Quick-mode entry. Out-of-range values keep the entry but grade F.
    pub(crate) fn set_sgpa(&mut self, sgpa: Option<f64>) {
        self.sgpa = sgpa;
        self.grade_letter = match sgpa {
            Some(value) if grading::is_valid_grade_point(value) => grading::letter_grade(value),
            _ => GradeLetter::F,
        };
    }

    pub(crate) fn set_credits(&mut self, credits: Option<u32>) {
        self.credits = credits;
    }

    pub(crate) fn set_locked(&mut self, locked: bool) {
        self.locked = locked;
    }

    pub(crate) fn set_number(&mut self, number: usize) {
        self.number = number;
        self.name = semester_name(number);
    }
}

pub fn semester_name(number: usize) -> String {
    format!("Semester {}", number)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CgpaMode {
    #[default]
    Quick,
    Expert,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Standing {
    Satisfactory,
    AcademicWarning,
}

impl Standing {
    pub fn from_gpa(value: f64, threshold: f64) -> Self {
        if value < threshold {
            Self::AcademicWarning
        } else {
            Self::Satisfactory
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Self::Satisfactory => "Satisfactory Standing",
            Self::AcademicWarning => "Academic Warning: Below Graduation Requirement",
        }
    }
}

/// A finished SGPA or CGPA calculation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GpaSummary {
    pub value: f64,
    pub letter: GradeLetter,
    pub total_credits: u32,
    pub standing: Standing,
}

impl GpaSummary {
    pub fn new(value: f64, total_credits: u32, standing_threshold: f64) -> Self {
        Self {
            value,
            letter: grading::letter_grade(value),
            total_credits,
            standing: Standing::from_gpa(value, standing_threshold),
        }
    }

    pub fn display_value(&self) -> String {
        format!("{:.2}", self.value)
    }
}

/// Student details printed on an exported grade sheet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StudentInfo {
    pub name: String,
    pub father_name: String,
    pub registration_number: String,
}

impl StudentInfo {
    pub fn validate_with_prefix(&self, registration_prefix: &str) -> Result<()> {
        validation::validate_non_empty_string("student.name", &self.name)?;
        validation::validate_non_empty_string("student.father_name", &self.father_name)?;
        validation::validate_registration_number(
            "student.registration_number",
            &self.registration_number,
            registration_prefix,
        )
    }
}

/// Everything the session store keeps between runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub subjects: Vec<Subject>,
    #[serde(default)]
    pub cgpa_mode: CgpaMode,
    pub semesters: Vec<Semester>,
    pub saved_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subject_rederives_on_marks() {
        let mut subject = Subject::new(3);
        assert_eq!(subject.grade_letter(), GradeLetter::F);

        subject.set_marks(Some(72));
        assert!((subject.grade_point() - 3.10).abs() < 1e-9);
        assert_eq!(subject.grade_letter(), GradeLetter::B);

        subject.set_marks(Some(150));
        assert_eq!(subject.marks(), Some(100));
        assert_eq!(subject.grade_point(), 4.0);

        subject.set_marks(None);
        assert_eq!(subject.grade_point(), 0.0);
        assert_eq!(subject.grade_letter(), GradeLetter::F);
    }

    #[test]
    fn test_subject_code_flag() {
        let mut subject = Subject::new(3);
        assert!(subject.has_valid_code());
        subject.set_code("cs-1");
        assert!(!subject.has_valid_code());
        subject.set_code("cs-101");
        assert_eq!(subject.code(), "CS-101");
        assert!(subject.has_valid_code());
    }

    #[test]
    fn test_quick_semester_letter() {
        let mut semester = Semester::quick(1, 18);
        assert_eq!(semester.name(), "Semester 1");
        semester.set_sgpa(Some(3.3));
        assert_eq!(semester.grade_letter(), GradeLetter::BPlus);
        semester.set_sgpa(Some(4.5));
        assert_eq!(semester.grade_letter(), GradeLetter::F);
    }

    #[test]
    fn test_standing() {
        let summary = GpaSummary::new(1.95, 36, 2.0);
        assert_eq!(summary.standing, Standing::AcademicWarning);
        assert_eq!(summary.letter, GradeLetter::F);
        assert_eq!(summary.display_value(), "1.95");
        assert_eq!(GpaSummary::new(2.0, 36, 2.0).standing, Standing::Satisfactory);
    }

    #[test]
    fn test_student_info_validation() {
        let mut info = StudentInfo {
            name: "Ayesha Khan".to_string(),
            father_name: "Imran Khan".to_string(),
            registration_number: "AWKUM-2041".to_string(),
        };
        assert!(info.validate_with_prefix("AWKUM-").is_ok());
        info.father_name = " ".to_string();
        assert!(info.validate_with_prefix("AWKUM-").is_err());
    }
}
