use crate::core::constraints::total_weight;
use crate::domain::grading::{self, is_valid_grade_point};
use crate::domain::model::{CgpaMode, Semester, Subject};
use crate::domain::policy::{CreditBounds, GradePolicy, Precision};
use crate::utils::error::{GradeError, Result};

/// Credit-weighted mean of `(value, weight)` pairs.
///
/// Fails with [`GradeError::DivisionByZero`] when the weights sum to zero,
/// which includes the empty input.
pub fn weighted_average<I>(items: I) -> Result<f64>
where
    I: IntoIterator<Item = (f64, f64)>,
{
    let (total_weighted, total_weight) = items
        .into_iter()
        .fold((0.0, 0.0), |(sum, weight), (v, w)| (sum + v * w, weight + w));

    if total_weight == 0.0 {
        return Err(GradeError::DivisionByZero);
    }
    Ok(total_weighted / total_weight)
}

fn subject_is_valid(subject: &Subject, bounds: &CreditBounds) -> bool {
    let credits_ok = subject.credits().is_some_and(|c| bounds.contains(c));
    let marks_ok = subject.marks().is_some() && is_valid_grade_point(subject.grade_point());
    credits_ok && marks_ok
}

/// SGPA of a subject list. Every row must have marks and credits within
/// `bounds`; otherwise nothing is averaged and the offending rows are
/// reported together.
pub fn semester_gpa(subjects: &[Subject], bounds: &CreditBounds) -> Result<f64> {
    let invalid: Vec<usize> = subjects
        .iter()
        .enumerate()
        .filter(|(_, s)| !subject_is_valid(s, bounds))
        .map(|(i, _)| i)
        .collect();

    if !invalid.is_empty() {
        return Err(GradeError::validation(
            format!(
                "Please ensure all subjects have valid credits ({}-{}) and marks (0-100).",
                bounds.min, bounds.max
            ),
            invalid,
        ));
    }

    weighted_average(
        subjects
            .iter()
            .map(|s| (s.grade_point(), f64::from(s.credits().unwrap_or(0)))),
    )
}

/// The `(sgpa, credits)` pair an expert-mode semester contributes.
pub fn expert_semester_entry(semester: &Semester, policy: &GradePolicy) -> Result<(f64, u32)> {
    let sgpa = semester_gpa(semester.subjects(), &policy.subject_credits)?;
    let sgpa = match policy.precision {
        Precision::Full => sgpa,
        Precision::Display => grading::round2(sgpa),
    };
    Ok((sgpa, total_weight(semester.subjects())))
}

/// CGPA over all semesters, all-or-nothing like [`semester_gpa`].
pub fn cumulative_gpa(
    semesters: &[Semester],
    mode: CgpaMode,
    policy: &GradePolicy,
) -> Result<f64> {
    let mut entries = Vec::with_capacity(semesters.len());
    let mut invalid = Vec::new();

    for (index, semester) in semesters.iter().enumerate() {
        let entry = match mode {
            CgpaMode::Quick => quick_semester_entry(semester, &policy.semester_credits),
            CgpaMode::Expert => expert_semester_entry(semester, policy).ok(),
        };
        match entry {
            Some(entry) => entries.push(entry),
            None => invalid.push(index),
        }
    }

    if !invalid.is_empty() {
        let message = match mode {
            CgpaMode::Quick => format!(
                "Check inputs: SGPA (0-4.00) and Credits ({}-{}) are required for all semesters.",
                policy.semester_credits.min, policy.semester_credits.max
            ),
            CgpaMode::Expert => {
                "Check inputs: every subject needs valid credits and marks in all semesters."
                    .to_string()
            }
        };
        return Err(GradeError::validation(message, invalid));
    }

    weighted_average(
        entries
            .into_iter()
            .map(|(sgpa, credits)| (sgpa, f64::from(credits))),
    )
}

fn quick_semester_entry(semester: &Semester, bounds: &CreditBounds) -> Option<(f64, u32)> {
    let sgpa = semester.sgpa().filter(|v| is_valid_grade_point(*v))?;
    let credits = semester.credits().filter(|c| bounds.contains(*c))?;
    Some((sgpa, credits))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quick(number: usize, sgpa: f64, credits: u32) -> Semester {
        let mut semester = Semester::quick(number, credits);
        semester.set_sgpa(Some(sgpa));
        semester
    }

    #[test]
    fn test_weighted_average() {
        assert_eq!(weighted_average([(4.0, 3.0), (2.0, 3.0)]).unwrap(), 3.0);
        assert_eq!(weighted_average([(3.5, 18.0), (3.0, 18.0)]).unwrap(), 3.25);
    }

    #[test]
    fn test_weighted_average_zero_weight() {
        assert!(matches!(
            weighted_average(Vec::<(f64, f64)>::new()),
            Err(GradeError::DivisionByZero)
        ));
        assert!(matches!(
            weighted_average([(4.0, 0.0), (3.0, 0.0)]),
            Err(GradeError::DivisionByZero)
        ));
    }

    #[test]
    fn test_semester_gpa_scenario() {
        let subjects = vec![
            Subject::graded("Calculus", 3, 95),
            Subject::graded("Physics", 3, 72),
            Subject::graded("Chemistry", 3, 40),
        ];
        let bounds = GradePolicy::default().subject_credits;
        let sgpa = semester_gpa(&subjects, &bounds).unwrap();
        assert!((sgpa - 2.366_666_666).abs() < 1e-6);
        assert_eq!(grading::round2(sgpa), 2.37);
        assert_eq!(grading::letter_grade(sgpa), crate::domain::grading::GradeLetter::C);
    }

    #[test]
    fn test_semester_gpa_is_all_or_nothing() {
        let mut blank = Subject::new(3);
        blank.set_marks(None);
        let subjects = vec![
            Subject::graded("Calculus", 3, 95),
            blank,
            Subject::graded("Physics", 7, 80),
        ];
        let bounds = GradePolicy::default().subject_credits;
        match semester_gpa(&subjects, &bounds) {
            Err(GradeError::ValidationError { rows, .. }) => assert_eq!(rows, vec![1, 2]),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_semester_gpa_empty_is_division_by_zero() {
        let bounds = GradePolicy::default().subject_credits;
        assert!(matches!(semester_gpa(&[], &bounds), Err(GradeError::DivisionByZero)));
    }

    #[test]
    fn test_cumulative_quick() {
        let policy = GradePolicy::default();
        let semesters = vec![quick(1, 3.5, 18), quick(2, 3.0, 18)];
        let cgpa = cumulative_gpa(&semesters, CgpaMode::Quick, &policy).unwrap();
        assert_eq!(cgpa, 3.25);
    }

    #[test]
    fn test_cumulative_quick_rejects_out_of_range() {
        let policy = GradePolicy::default();
        let semesters = vec![quick(1, 3.5, 18), quick(2, 4.2, 18), quick(3, 3.0, 9)];
        match cumulative_gpa(&semesters, CgpaMode::Quick, &policy) {
            Err(GradeError::ValidationError { rows, .. }) => assert_eq!(rows, vec![1, 2]),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_cumulative_expert_precision() {
        let subjects = vec![
            Subject::graded("Calculus", 3, 95),
            Subject::graded("Physics", 3, 72),
            Subject::graded("Chemistry", 3, 40),
        ];
        let semesters = vec![
            Semester::expert(1, subjects.clone()),
            Semester::expert(2, vec![Subject::graded("Algebra", 3, 90)]),
        ];

        let full = GradePolicy::default();
        let cgpa = cumulative_gpa(&semesters, CgpaMode::Expert, &full).unwrap();
        assert!((cgpa - (21.3 + 12.0) / 12.0).abs() < 1e-9);

        let display = GradePolicy {
            precision: Precision::Display,
            ..GradePolicy::default()
        };
        let rounded = cumulative_gpa(&semesters, CgpaMode::Expert, &display).unwrap();
        assert!((rounded - (2.37 * 9.0 + 12.0) / 12.0).abs() < 1e-9);
    }
}
