use crate::core::aggregation::{cumulative_gpa, semester_gpa};
use crate::core::constraints::{
    admits, prune_excess, renumber, total_weight, Admission, PruneNotice, RowKind,
};
use crate::domain::model::{CgpaMode, GpaSummary, Semester, Subject};
use crate::domain::policy::{GradePolicy, LockMode};
use crate::utils::error::{GradeError, Result};

trait Lockable {
    fn locked(&self) -> bool;
    fn set_lock(&mut self, locked: bool);
}

impl Lockable for Subject {
    fn locked(&self) -> bool {
        self.is_locked()
    }

    fn set_lock(&mut self, locked: bool) {
        self.set_locked(locked)
    }
}

impl Lockable for Semester {
    fn locked(&self) -> bool {
        self.is_locked()
    }

    fn set_lock(&mut self, locked: bool) {
        self.set_locked(locked)
    }
}

fn check_index(len: usize, index: usize) -> Result<()> {
    if index >= len {
        return Err(GradeError::RowOutOfRange { index, len });
    }
    Ok(())
}

/// Mutable access to a row that is present and not locked.
fn editable<T: Lockable>(items: &mut [T], index: usize) -> Result<&mut T> {
    check_index(items.len(), index)?;
    let item = &mut items[index];
    if item.locked() {
        return Err(GradeError::RowLocked { index });
    }
    Ok(item)
}

/// Sequential mode: every row before a newly added one is frozen.
fn lock_all<T: Lockable>(items: &mut [T], mode: LockMode) {
    if mode == LockMode::Sequential {
        items.iter_mut().for_each(|item| item.set_lock(true));
    }
}

/// Unlocks `index` and relocks everything after it.
fn unlock_row<T: Lockable>(items: &mut [T], index: usize) -> Result<()> {
    check_index(items.len(), index)?;
    for (i, item) in items.iter_mut().enumerate() {
        if i == index {
            item.set_lock(false);
        } else if i > index {
            item.set_lock(true);
        }
    }
    Ok(())
}

/// Removes a row unless it is the only one. `Ok(false)` means refused.
fn remove_row<T>(items: &mut Vec<T>, index: usize) -> Result<bool> {
    check_index(items.len(), index)?;
    if items.len() <= 1 {
        return Ok(false);
    }
    items.remove(index);
    Ok(true)
}

fn add_subject_row(subjects: &mut Vec<Subject>, policy: &GradePolicy) -> Admission {
    let admission = admits(subjects, &policy.subject_limits);
    if admission.is_admitted() {
        lock_all(subjects, policy.lock_mode);
        subjects.push(Subject::new(policy.subject_limits.default_credits));
    } else {
        tracing::debug!("Subject row refused: {:?}", admission);
    }
    admission
}

fn prune_subjects(subjects: &mut Vec<Subject>, policy: &GradePolicy) -> Option<PruneNotice> {
    let max = policy.subject_limits.max_total_credits;
    let removed = prune_excess(subjects, max);
    if removed > 0 {
        tracing::warn!("Pruned {} subject rows to stay within {} credits", removed, max);
    }
    PruneNotice::from_pruned(RowKind::Subject, removed, max)
}

fn set_subject_credits(
    subjects: &mut Vec<Subject>,
    index: usize,
    credits: Option<u32>,
    policy: &GradePolicy,
) -> Result<Option<PruneNotice>> {
    let max = policy.subject_credits.max;
    editable(subjects, index)?.set_credits(credits.map(|c| c.min(max)));
    Ok(prune_subjects(subjects, policy))
}

/// Leaving the credits field: blank or too-small entries become the minimum.
fn commit_subject_credits(
    subjects: &mut Vec<Subject>,
    index: usize,
    policy: &GradePolicy,
) -> Result<Option<PruneNotice>> {
    let min = policy.subject_credits.min;
    let subject = editable(subjects, index)?;
    if subject.credits().map_or(true, |c| c < min) {
        subject.set_credits(Some(min));
    }
    Ok(prune_subjects(subjects, policy))
}

fn summarize(value: f64, total_credits: u32, policy: &GradePolicy) -> GpaSummary {
    GpaSummary::new(value, total_credits, policy.standing_threshold)
}

/// Semester GPA calculator over a single subject table.
#[derive(Debug, Clone)]
pub struct SgpaCalculator {
    subjects: Vec<Subject>,
    policy: GradePolicy,
    result: Option<GpaSummary>,
}

impl SgpaCalculator {
    pub fn new(policy: GradePolicy) -> Self {
        let subjects = vec![Subject::new(policy.subject_limits.default_credits)];
        Self {
            subjects,
            policy,
            result: None,
        }
    }

    /// Rebuilds a calculator from stored rows. Derived fields are recomputed
    /// and limits re-applied.
    pub fn restore(subjects: Vec<Subject>, policy: GradePolicy) -> (Self, Option<PruneNotice>) {
        if subjects.is_empty() {
            return (Self::new(policy), None);
        }
        let mut calculator = Self {
            subjects,
            policy,
            result: None,
        };
        calculator.subjects.iter_mut().for_each(Subject::rederive);
        let notice = prune_subjects(&mut calculator.subjects, &calculator.policy);
        (calculator, notice)
    }

    pub fn subjects(&self) -> &[Subject] {
        &self.subjects
    }

    pub fn policy(&self) -> &GradePolicy {
        &self.policy
    }

    pub fn result(&self) -> Option<&GpaSummary> {
        self.result.as_ref()
    }

    pub fn total_credits(&self) -> u32 {
        total_weight(&self.subjects)
    }

    pub fn can_add(&self) -> Admission {
        admits(&self.subjects, &self.policy.subject_limits)
    }

    pub fn add_subject(&mut self) -> Admission {
        self.result = None;
        add_subject_row(&mut self.subjects, &self.policy)
    }

    pub fn remove_subject(&mut self, index: usize) -> Result<bool> {
        self.result = None;
        remove_row(&mut self.subjects, index)
    }

    pub fn set_name(&mut self, index: usize, name: &str) -> Result<()> {
        self.result = None;
        editable(&mut self.subjects, index)?.set_name(name);
        Ok(())
    }

    pub fn set_code(&mut self, index: usize, code: &str) -> Result<()> {
        self.result = None;
        editable(&mut self.subjects, index)?.set_code(code);
        Ok(())
    }

    pub fn set_credits(
        &mut self,
        index: usize,
        credits: Option<u32>,
    ) -> Result<Option<PruneNotice>> {
        self.result = None;
        set_subject_credits(&mut self.subjects, index, credits, &self.policy)
    }

    pub fn commit_credits(&mut self, index: usize) -> Result<Option<PruneNotice>> {
        self.result = None;
        commit_subject_credits(&mut self.subjects, index, &self.policy)
    }

    pub fn set_marks(&mut self, index: usize, marks: Option<u32>) -> Result<()> {
        self.result = None;
        editable(&mut self.subjects, index)?.set_marks(marks);
        Ok(())
    }

    pub fn unlock(&mut self, index: usize) -> Result<()> {
        unlock_row(&mut self.subjects, index)
    }

    pub fn calculate(&mut self) -> Result<GpaSummary> {
        self.result = None;
        let sgpa = semester_gpa(&self.subjects, &self.policy.subject_credits).inspect_err(|e| {
            tracing::warn!("SGPA calculation rejected: {}", e);
        })?;
        let summary = summarize(sgpa, self.total_credits(), &self.policy);
        tracing::info!("SGPA {} ({})", summary.display_value(), summary.letter);
        self.result = Some(summary);
        Ok(summary)
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.policy.clone());
    }
}

/// Cumulative GPA calculator in quick or expert mode.
#[derive(Debug, Clone)]
pub struct CgpaCalculator {
    mode: CgpaMode,
    semesters: Vec<Semester>,
    policy: GradePolicy,
    result: Option<GpaSummary>,
}

impl CgpaCalculator {
    pub fn new(mode: CgpaMode, policy: GradePolicy) -> Self {
        let mut calculator = Self {
            mode,
            semesters: Vec::new(),
            policy,
            result: None,
        };
        let first = calculator.new_semester(1);
        calculator.semesters.push(first);
        calculator
    }

    pub fn restore(
        mode: CgpaMode,
        semesters: Vec<Semester>,
        policy: GradePolicy,
    ) -> (Self, Vec<PruneNotice>) {
        if semesters.is_empty() {
            return (Self::new(mode, policy), Vec::new());
        }
        let mut calculator = Self {
            mode,
            semesters,
            policy,
            result: None,
        };
        renumber(&mut calculator.semesters);

        let mut notices = Vec::new();
        for index in 0..calculator.semesters.len() {
            notices.extend(calculator.refresh_semester(index));
        }
        notices.extend(calculator.prune_semesters());
        (calculator, notices)
    }

    pub fn mode(&self) -> CgpaMode {
        self.mode
    }

    pub fn semesters(&self) -> &[Semester] {
        &self.semesters
    }

    pub fn policy(&self) -> &GradePolicy {
        &self.policy
    }

    pub fn result(&self) -> Option<&GpaSummary> {
        self.result.as_ref()
    }

    pub fn total_credits(&self) -> u32 {
        total_weight(&self.semesters)
    }

    pub fn can_add(&self) -> Admission {
        admits(&self.semesters, &self.policy.semester_limits)
    }

    /// Switches entry mode, carrying what can be carried: expert semesters
    /// keep their derived SGPA and credits, quick semesters start with one
    /// default subject.
    pub fn set_mode(&mut self, mode: CgpaMode) -> Vec<PruneNotice> {
        if mode == self.mode {
            return Vec::new();
        }
        self.result = None;
        self.mode = mode;
        let default_subject = self.policy.subject_limits.default_credits;
        let semester_max = self.policy.semester_credits.max;
        for semester in &mut self.semesters {
            match mode {
                CgpaMode::Quick => {
                    semester.subjects_mut().clear();
                    let credits = semester.credits().map(|c| c.min(semester_max));
                    semester.set_credits(credits);
                }
                CgpaMode::Expert => {
                    *semester.subjects_mut() = vec![Subject::new(default_subject)];
                }
            }
        }

        let mut notices = Vec::new();
        for index in 0..self.semesters.len() {
            notices.extend(self.refresh_semester(index));
        }
        notices.extend(self.prune_semesters());
        tracing::info!("CGPA mode switched to {:?}", mode);
        notices
    }

    pub fn add_semester(&mut self) -> Admission {
        self.result = None;
        let admission = self.can_add();
        if admission.is_admitted() {
            lock_all(&mut self.semesters, self.policy.lock_mode);
            let semester = self.new_semester(self.semesters.len() + 1);
            self.semesters.push(semester);
        } else {
            tracing::debug!("Semester row refused: {:?}", admission);
        }
        admission
    }

    /// Removes a semester and renumbers the rest.
    pub fn remove_semester(&mut self, index: usize) -> Result<bool> {
        self.result = None;
        let removed = remove_row(&mut self.semesters, index)?;
        if removed {
            renumber(&mut self.semesters);
        }
        Ok(removed)
    }

    pub fn set_sgpa(&mut self, index: usize, sgpa: Option<f64>) -> Result<()> {
        self.require_mode(CgpaMode::Quick, "enter an SGPA")?;
        self.result = None;
        editable(&mut self.semesters, index)?.set_sgpa(sgpa);
        Ok(())
    }

    /// Quick mode only. Entries above the semester maximum are clamped.
    pub fn set_credits(
        &mut self,
        index: usize,
        credits: Option<u32>,
    ) -> Result<Vec<PruneNotice>> {
        self.require_mode(CgpaMode::Quick, "enter semester credits")?;
        self.result = None;
        let max = self.policy.semester_credits.max;
        editable(&mut self.semesters, index)?.set_credits(credits.map(|c| c.min(max)));
        Ok(self.prune_semesters().into_iter().collect())
    }

    /// Adds a subject row to an expert semester. The new credits count
    /// toward the programme limit, so later semesters may be pruned.
    pub fn add_subject(&mut self, semester: usize) -> Result<(Admission, Vec<PruneNotice>)> {
        self.require_mode(CgpaMode::Expert, "add a subject")?;
        self.result = None;
        let policy = &self.policy;
        let subjects = editable(&mut self.semesters, semester)?.subjects_mut();
        let admission = add_subject_row(subjects, policy);
        let mut notices: Vec<PruneNotice> = self.refresh_semester(semester).into_iter().collect();
        notices.extend(self.prune_semesters());
        Ok((admission, notices))
    }

    pub fn remove_subject(&mut self, semester: usize, subject: usize) -> Result<bool> {
        self.require_mode(CgpaMode::Expert, "remove a subject")?;
        self.result = None;
        let removed = remove_row(editable(&mut self.semesters, semester)?.subjects_mut(), subject)?;
        self.refresh_semester(semester);
        Ok(removed)
    }

    pub fn set_subject_name(&mut self, semester: usize, subject: usize, name: &str) -> Result<()> {
        self.require_mode(CgpaMode::Expert, "rename a subject")?;
        self.result = None;
        let subjects = editable(&mut self.semesters, semester)?.subjects_mut();
        editable(subjects, subject)?.set_name(name);
        Ok(())
    }

    pub fn set_subject_code(&mut self, semester: usize, subject: usize, code: &str) -> Result<()> {
        self.require_mode(CgpaMode::Expert, "set a course code")?;
        self.result = None;
        let subjects = editable(&mut self.semesters, semester)?.subjects_mut();
        editable(subjects, subject)?.set_code(code);
        Ok(())
    }

    pub fn set_subject_credits(
        &mut self,
        semester: usize,
        subject: usize,
        credits: Option<u32>,
    ) -> Result<Vec<PruneNotice>> {
        self.require_mode(CgpaMode::Expert, "set subject credits")?;
        self.result = None;
        let policy = &self.policy;
        let subjects = editable(&mut self.semesters, semester)?.subjects_mut();
        let mut notices: Vec<PruneNotice> = set_subject_credits(subjects, subject, credits, policy)?
            .into_iter()
            .collect();
        notices.extend(self.refresh_semester(semester));
        notices.extend(self.prune_semesters());
        Ok(notices)
    }

    pub fn commit_subject_credits(
        &mut self,
        semester: usize,
        subject: usize,
    ) -> Result<Vec<PruneNotice>> {
        self.require_mode(CgpaMode::Expert, "set subject credits")?;
        self.result = None;
        let policy = &self.policy;
        let subjects = editable(&mut self.semesters, semester)?.subjects_mut();
        let mut notices: Vec<PruneNotice> = commit_subject_credits(subjects, subject, policy)?
            .into_iter()
            .collect();
        notices.extend(self.refresh_semester(semester));
        notices.extend(self.prune_semesters());
        Ok(notices)
    }

    pub fn set_subject_marks(
        &mut self,
        semester: usize,
        subject: usize,
        marks: Option<u32>,
    ) -> Result<()> {
        self.require_mode(CgpaMode::Expert, "set subject marks")?;
        self.result = None;
        let subjects = editable(&mut self.semesters, semester)?.subjects_mut();
        editable(subjects, subject)?.set_marks(marks);
        self.refresh_semester(semester);
        Ok(())
    }

    pub fn unlock(&mut self, index: usize) -> Result<()> {
        unlock_row(&mut self.semesters, index)
    }

    pub fn unlock_subject(&mut self, semester: usize, subject: usize) -> Result<()> {
        self.require_mode(CgpaMode::Expert, "unlock a subject")?;
        unlock_row(editable(&mut self.semesters, semester)?.subjects_mut(), subject)
    }

    pub fn calculate(&mut self) -> Result<GpaSummary> {
        self.result = None;
        let cgpa = cumulative_gpa(&self.semesters, self.mode, &self.policy).inspect_err(|e| {
            tracing::warn!("CGPA calculation rejected: {}", e);
        })?;
        let summary = summarize(cgpa, self.total_credits(), &self.policy);
        tracing::info!(
            "CGPA {} ({}) over {} semesters",
            summary.display_value(),
            summary.letter,
            self.semesters.len()
        );
        self.result = Some(summary);
        Ok(summary)
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.mode, self.policy.clone());
    }

    fn require_mode(&self, mode: CgpaMode, operation: &str) -> Result<()> {
        if self.mode != mode {
            return Err(GradeError::ModeMismatch {
                operation: operation.to_string(),
                mode: format!("{:?}", self.mode).to_lowercase(),
            });
        }
        Ok(())
    }

    fn new_semester(&self, number: usize) -> Semester {
        match self.mode {
            CgpaMode::Quick => Semester::quick(number, self.policy.semester_limits.default_credits),
            CgpaMode::Expert => {
                let subject = Subject::new(self.policy.subject_limits.default_credits);
                let mut semester = Semester::expert(number, vec![subject]);
                let total = total_weight(semester.subjects());
                semester.set_credits(Some(total));
                semester
            }
        }
    }

    /// Re-derives one semester from its rows. In expert mode this prunes the
    /// subject table and recomputes credits and SGPA; in quick mode it only
    /// refreshes the letter grade.
    fn refresh_semester(&mut self, index: usize) -> Option<PruneNotice> {
        let policy = &self.policy;
        let semester = self.semesters.get_mut(index)?;
        match self.mode {
            CgpaMode::Quick => {
                let sgpa = semester.sgpa();
                semester.set_sgpa(sgpa);
                None
            }
            CgpaMode::Expert => {
                let subjects = semester.subjects_mut();
                if subjects.is_empty() {
                    subjects.push(Subject::new(policy.subject_limits.default_credits));
                }
                subjects.iter_mut().for_each(Subject::rederive);
                let notice = prune_subjects(subjects, policy);

                let credits = total_weight(semester.subjects());
                let sgpa = semester_gpa(semester.subjects(), &policy.subject_credits).ok();
                semester.set_credits(Some(credits));
                semester.set_sgpa(sgpa);
                tracing::debug!(
                    "{} now {} credits, SGPA {:?}",
                    semester.name(),
                    credits,
                    sgpa
                );
                notice
            }
        }
    }

    fn prune_semesters(&mut self) -> Option<PruneNotice> {
        let max = self.policy.semester_limits.max_total_credits;
        let removed = prune_excess(&mut self.semesters, max);
        if removed > 0 {
            tracing::warn!("Pruned {} semesters to stay within {} credits", removed, max);
        }
        PruneNotice::from_pruned(RowKind::Semester, removed, max)
    }
}
