use anyhow::Result;
use chrono::Utc;
use gradesheet::core::constraints::RowKind;
use gradesheet::domain::model::{CgpaMode, Semester, Session, Subject};
use gradesheet::domain::ports::SessionStore;
use gradesheet::{GradeEngine, GradePolicy, JsonFileStore};
use std::cell::{Cell, RefCell};
use tempfile::TempDir;

/// In-memory store that counts saves.
#[derive(Default)]
struct MemoryStore {
    session: RefCell<Option<Session>>,
    saves: Cell<usize>,
}

impl MemoryStore {
    fn with_session(session: Session) -> Self {
        Self {
            session: RefCell::new(Some(session)),
            saves: Cell::new(0),
        }
    }
}

impl SessionStore for MemoryStore {
    fn load(&self) -> gradesheet::Result<Option<Session>> {
        Ok(self.session.borrow().clone())
    }

    fn save(&self, session: &Session) -> gradesheet::Result<()> {
        *self.session.borrow_mut() = Some(session.clone());
        self.saves.set(self.saves.get() + 1);
        Ok(())
    }
}

#[test]
fn test_every_edit_is_saved() -> Result<()> {
    let mut engine = GradeEngine::new(MemoryStore::default(), GradePolicy::default());
    assert!(engine.restore()?.is_empty());

    engine.edit_sgpa(|calc| calc.set_marks(0, Some(81)))??;
    engine.edit_sgpa(|calc| calc.add_subject())?;
    engine.edit_cgpa(|calc| calc.set_sgpa(0, Some(3.4)))??;
    assert_eq!(engine.store().saves.get(), 3);

    engine.edit_sgpa(|calc| calc.set_marks(1, Some(64)))??;
    engine.calculate_sgpa()?;
    assert_eq!(engine.store().saves.get(), 4);

    let stored = engine.store().load()?.unwrap_or_else(|| panic!("session not stored"));
    assert_eq!(stored.subjects.len(), 2);
    assert_eq!(stored.subjects[0].marks(), Some(81));
    assert_eq!(stored.semesters[0].sgpa(), Some(3.4));

    Ok(())
}

#[test]
fn test_session_survives_restart() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("state").join("session.json");

    {
        let mut engine = GradeEngine::new(JsonFileStore::new(&path), GradePolicy::default());
        engine.restore()?;
        engine.edit_sgpa(|calc| {
            calc.set_name(0, "Operating Systems")?;
            calc.set_code(0, "cs-310")?;
            calc.set_marks(0, Some(77))
        })??;
        engine.edit_cgpa(|calc| calc.set_mode(CgpaMode::Expert))?;
        engine.edit_cgpa(|calc| calc.set_subject_marks(0, 0, Some(90)))??;
    }
    assert!(path.exists());

    let mut engine = GradeEngine::new(JsonFileStore::new(&path), GradePolicy::default());
    let notices = engine.restore()?;
    assert!(notices.is_empty());

    let subject = &engine.sgpa().subjects()[0];
    assert_eq!(subject.name(), "Operating Systems");
    assert_eq!(subject.code(), "CS-310");
    assert_eq!(subject.marks(), Some(77));
    assert!((subject.grade_point() - 3.35).abs() < 1e-9);

    assert_eq!(engine.cgpa().mode(), CgpaMode::Expert);
    assert_eq!(engine.cgpa().semesters()[0].sgpa(), Some(4.0));
    assert!(engine.cgpa().result().is_none());

    let summary = engine.calculate_cgpa()?;
    assert_eq!(summary.display_value(), "4.00");

    Ok(())
}

#[test]
fn test_restore_prunes_over_limit_subjects() -> Result<()> {
    let subjects: Vec<Subject> = (0..8).map(|_| Subject::new(3)).collect();
    let session = Session {
        subjects,
        cgpa_mode: CgpaMode::Quick,
        semesters: vec![Semester::quick(1, 18)],
        saved_at: Utc::now(),
    };

    let mut engine = GradeEngine::new(MemoryStore::with_session(session), GradePolicy::default());
    let notices = engine.restore()?;

    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].kind, RowKind::Subject);
    assert_eq!(notices[0].removed, 1);
    assert_eq!(engine.sgpa().subjects().len(), 7);
    assert_eq!(engine.sgpa().total_credits(), 21);

    Ok(())
}

#[test]
fn test_stored_grade_points_are_recomputed() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("session.json");

    let session = Session {
        subjects: vec![Subject::graded("Physics", 3, 72)],
        cgpa_mode: CgpaMode::Quick,
        semesters: vec![Semester::quick(1, 18)],
        saved_at: Utc::now(),
    };
    let mut value = serde_json::to_value(&session)?;
    value["subjects"][0]["grade_point"] = serde_json::json!(9.9);
    value["subjects"][0]["grade_letter"] = serde_json::json!("A+");
    std::fs::write(&path, serde_json::to_string_pretty(&value)?)?;

    let mut engine = GradeEngine::new(JsonFileStore::new(&path), GradePolicy::default());
    engine.restore()?;

    let subject = &engine.sgpa().subjects()[0];
    assert!((subject.grade_point() - 3.10).abs() < 1e-9);
    assert_eq!(subject.grade_letter().as_str(), "B");

    Ok(())
}

#[test]
fn test_corrupt_session_is_reported() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("session.json");
    std::fs::write(&path, "{ not json")?;

    let mut engine = GradeEngine::new(JsonFileStore::new(&path), GradePolicy::default());
    let err = engine.restore().err().unwrap_or_else(|| panic!("expected an error"));
    assert_eq!(
        err.severity(),
        gradesheet::utils::error::ErrorSeverity::Critical
    );

    Ok(())
}
