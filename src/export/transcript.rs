use crate::core::session::{CgpaCalculator, SgpaCalculator};
use crate::domain::model::{GpaSummary, StudentInfo};
use crate::domain::policy::TranscriptSettings;
use crate::utils::error::{GradeError, Result};
use chrono::{DateTime, Utc};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

const FOOTER: &str = "This is a system-generated document for unofficial use only.";

const SGPA_COLUMNS: [&str; 6] = [
    "Subject",
    "Code",
    "Credit Hours",
    "Obtained Marks",
    "Grade Point",
    "Grade",
];

const CGPA_COLUMNS: [&str; 4] = ["Semester", "Obtained SGPA", "Total Credits", "Weighted Score"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetKind {
    Sgpa,
    Cgpa,
}

impl SheetKind {
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Sgpa => "SGPA",
            Self::Cgpa => "CGPA",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Sgpa => "Provisional Semester Grade Sheet",
            Self::Cgpa => "Provisional Cumulative Grade Sheet",
        }
    }
}

/// A grade sheet ready to be written. Only built from a calculated result,
/// so the rows always match the printed GPA.
#[derive(Debug, Clone)]
pub struct Transcript {
    kind: SheetKind,
    settings: TranscriptSettings,
    student: StudentInfo,
    columns: Vec<&'static str>,
    rows: Vec<Vec<String>>,
    summary: Vec<[String; 2]>,
}

fn optional_cell(value: Option<u32>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn or_untitled(name: &str, fallback: &str) -> String {
    if name.trim().is_empty() {
        fallback.to_string()
    } else {
        name.to_string()
    }
}

fn require_result(result: Option<&GpaSummary>) -> Result<GpaSummary> {
    result.copied().ok_or(GradeError::NotCalculated)
}

impl Transcript {
    pub fn for_sgpa(calculator: &SgpaCalculator, student: &StudentInfo) -> Result<Self> {
        let summary = require_result(calculator.result())?;
        let settings = calculator.policy().transcript.clone();
        student.validate_with_prefix(&settings.registration_prefix)?;

        let rows = calculator
            .subjects()
            .iter()
            .map(|subject| {
                vec![
                    or_untitled(subject.name(), "Untitled Subject"),
                    subject.code().to_string(),
                    optional_cell(subject.credits()),
                    optional_cell(subject.marks()),
                    format!("{:.2}", subject.grade_point()),
                    subject.grade_letter().to_string(),
                ]
            })
            .collect();

        Ok(Self {
            kind: SheetKind::Sgpa,
            settings,
            student: student.clone(),
            columns: SGPA_COLUMNS.to_vec(),
            rows,
            summary: vec![
                ["Semester GPA".to_string(), summary.display_value()],
                ["Letter Grade".to_string(), summary.letter.to_string()],
            ],
        })
    }

    pub fn for_cgpa(calculator: &CgpaCalculator, student: &StudentInfo) -> Result<Self> {
        let summary = require_result(calculator.result())?;
        let settings = calculator.policy().transcript.clone();
        student.validate_with_prefix(&settings.registration_prefix)?;

        let rows = calculator
            .semesters()
            .iter()
            .map(|semester| {
                let sgpa = semester.sgpa().unwrap_or(0.0);
                let credits = semester.credits().unwrap_or(0);
                vec![
                    or_untitled(semester.name(), "Untitled Semester"),
                    format!("{:.2}", sgpa),
                    credits.to_string(),
                    format!("{:.2}", sgpa * f64::from(credits)),
                ]
            })
            .collect();

        Ok(Self {
            kind: SheetKind::Cgpa,
            settings,
            student: student.clone(),
            columns: CGPA_COLUMNS.to_vec(),
            rows,
            summary: vec![
                ["Cumulative GPA".to_string(), summary.display_value()],
                ["Overall Grade".to_string(), summary.letter.to_string()],
                ["Standing".to_string(), summary.standing.message().to_string()],
            ],
        })
    }

    pub fn kind(&self) -> SheetKind {
        self.kind
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// `<PREFIX>_<SGPA|CGPA>_<epoch millis>.csv`
    pub fn file_name(&self, at: DateTime<Utc>) -> String {
        format!(
            "{}_{}_{}.csv",
            self.settings.file_prefix,
            self.kind.tag(),
            at.timestamp_millis()
        )
    }

    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut wtr = csv::WriterBuilder::new().flexible(true).from_writer(writer);

        wtr.write_record([self.settings.institution.as_str()])?;
        wtr.write_record([self.kind.title()])?;
        wtr.write_record(["Student Name", self.student.name.as_str()])?;
        wtr.write_record(["Father Name", self.student.father_name.as_str()])?;
        wtr.write_record([
            "Registration Number",
            self.student.registration_number.as_str(),
        ])?;

        wtr.write_record(&self.columns)?;
        for row in &self.rows {
            wtr.write_record(row)?;
        }

        for line in &self.summary {
            wtr.write_record(line)?;
        }
        wtr.write_record([FOOTER])?;
        wtr.flush()?;
        Ok(())
    }

    /// Writes the sheet into `dir` (created if missing) and returns the path.
    pub fn export_to_dir(&self, dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(dir)?;
        let path = dir.join(self.file_name(Utc::now()));
        let file = fs::File::create(&path)?;
        self.write_csv(file)?;

        tracing::info!(
            "{} grade sheet with {} rows written to {}",
            self.kind.tag(),
            self.rows.len(),
            path.display()
        );
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::CgpaMode;
    use crate::domain::policy::GradePolicy;
    use chrono::TimeZone;

    fn student() -> StudentInfo {
        StudentInfo {
            name: "Ayesha Khan".to_string(),
            father_name: "Imran Khan".to_string(),
            registration_number: "AWKUM-2021-117".to_string(),
        }
    }

    fn calculated_sgpa() -> SgpaCalculator {
        let mut calculator = SgpaCalculator::new(GradePolicy::default());
        calculator.set_name(0, "Calculus").unwrap();
        calculator.set_code(0, "math-101").unwrap();
        calculator.set_marks(0, Some(72)).unwrap();
        calculator.add_subject();
        calculator.set_marks(1, Some(45)).unwrap();
        calculator.calculate().unwrap();
        calculator
    }

    fn render(transcript: &Transcript) -> String {
        let mut buffer = Vec::new();
        transcript.write_csv(&mut buffer).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn test_requires_calculated_result() {
        let calculator = SgpaCalculator::new(GradePolicy::default());
        let result = Transcript::for_sgpa(&calculator, &student());
        assert!(matches!(result, Err(GradeError::NotCalculated)));
    }

    #[test]
    fn test_requires_valid_student() {
        let calculator = calculated_sgpa();
        let mut info = student();
        info.registration_number = "2021-117".to_string();
        assert!(Transcript::for_sgpa(&calculator, &info).is_err());
    }

    #[test]
    fn test_sgpa_sheet_layout() {
        let transcript = Transcript::for_sgpa(&calculated_sgpa(), &student()).unwrap();
        let text = render(&transcript);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "Abdul Wali Khan University Mardan");
        assert_eq!(lines[1], "Provisional Semester Grade Sheet");
        assert_eq!(lines[2], "Student Name,Ayesha Khan");
        assert_eq!(
            lines[5],
            "Subject,Code,Credit Hours,Obtained Marks,Grade Point,Grade"
        );
        assert_eq!(lines[6], "Calculus,MATH-101,3,72,3.10,B");
        assert_eq!(lines[7], "Untitled Subject,,3,45,0.00,F");
        assert_eq!(lines[8], "Semester GPA,1.55");
        assert_eq!(lines[9], "Letter Grade,F");
        assert_eq!(
            lines.last().copied(),
            Some("This is a system-generated document for unofficial use only.")
        );
    }

    #[test]
    fn test_cgpa_sheet_has_weighted_scores() {
        let mut calculator = CgpaCalculator::new(CgpaMode::Quick, GradePolicy::default());
        calculator.set_sgpa(0, Some(3.5)).unwrap();
        calculator.add_semester();
        calculator.set_sgpa(1, Some(3.0)).unwrap();
        calculator.calculate().unwrap();

        let transcript = Transcript::for_cgpa(&calculator, &student()).unwrap();
        assert_eq!(transcript.kind(), SheetKind::Cgpa);
        assert_eq!(
            transcript.rows()[0],
            vec!["Semester 1", "3.50", "18", "63.00"]
        );

        let text = render(&transcript);
        assert!(text.contains("Cumulative GPA,3.25"));
        assert!(text.contains("Overall Grade,B+"));
        assert!(text.contains("Standing,Satisfactory Standing"));
    }

    #[test]
    fn test_file_name_uses_prefix_and_kind() {
        let transcript = Transcript::for_sgpa(&calculated_sgpa(), &student()).unwrap();
        let at = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        assert_eq!(transcript.file_name(at), "AWKUM_SGPA_1700000000123.csv");
    }

    #[test]
    fn test_export_to_dir_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let transcript = Transcript::for_sgpa(&calculated_sgpa(), &student()).unwrap();

        let path = transcript.export_to_dir(&dir.path().join("sheets")).unwrap();
        assert!(path.exists());
        let content = std::fs::read_to_string(path).unwrap();
        assert!(content.starts_with("Abdul Wali Khan University Mardan"));
    }
}
