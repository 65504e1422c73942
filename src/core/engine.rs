use crate::core::constraints::PruneNotice;
use crate::core::session::{CgpaCalculator, SgpaCalculator};
use crate::domain::model::{CgpaMode, GpaSummary, Session};
use crate::domain::policy::GradePolicy;
use crate::domain::ports::SessionStore;
use crate::utils::error::Result;
use chrono::Utc;

/// Owns both calculators and the session store. Every edit made through
/// [`GradeEngine::edit_sgpa`] or [`GradeEngine::edit_cgpa`] is saved right
/// after it runs.
pub struct GradeEngine<S: SessionStore> {
    store: S,
    policy: GradePolicy,
    sgpa: SgpaCalculator,
    cgpa: CgpaCalculator,
}

impl<S: SessionStore> GradeEngine<S> {
    pub fn new(store: S, policy: GradePolicy) -> Self {
        Self {
            sgpa: SgpaCalculator::new(policy.clone()),
            cgpa: CgpaCalculator::new(CgpaMode::default(), policy.clone()),
            store,
            policy,
        }
    }

    /// Loads the last saved session, if any. Stored derived values are
    /// ignored and recomputed; rows beyond current limits are pruned.
    pub fn restore(&mut self) -> Result<Vec<PruneNotice>> {
        let Some(session) = self.store.load()? else {
            tracing::info!("No saved session, starting fresh");
            return Ok(Vec::new());
        };

        tracing::info!(
            "Restoring session saved at {} ({} subjects, {} semesters)",
            session.saved_at,
            session.subjects.len(),
            session.semesters.len()
        );

        let (sgpa, sgpa_notice) = SgpaCalculator::restore(session.subjects, self.policy.clone());
        let (cgpa, mut notices) =
            CgpaCalculator::restore(session.cgpa_mode, session.semesters, self.policy.clone());
        notices.extend(sgpa_notice);

        self.sgpa = sgpa;
        self.cgpa = cgpa;
        for notice in &notices {
            tracing::warn!("{}", notice);
        }
        Ok(notices)
    }

    pub fn policy(&self) -> &GradePolicy {
        &self.policy
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn sgpa(&self) -> &SgpaCalculator {
        &self.sgpa
    }

    pub fn cgpa(&self) -> &CgpaCalculator {
        &self.cgpa
    }

    pub fn edit_sgpa<T>(&mut self, edit: impl FnOnce(&mut SgpaCalculator) -> T) -> Result<T> {
        let outcome = edit(&mut self.sgpa);
        self.save()?;
        Ok(outcome)
    }

    pub fn edit_cgpa<T>(&mut self, edit: impl FnOnce(&mut CgpaCalculator) -> T) -> Result<T> {
        let outcome = edit(&mut self.cgpa);
        self.save()?;
        Ok(outcome)
    }

    /// Results are not part of the stored session, so calculating does not
    /// trigger a save.
    pub fn calculate_sgpa(&mut self) -> Result<GpaSummary> {
        self.sgpa.calculate()
    }

    pub fn calculate_cgpa(&mut self) -> Result<GpaSummary> {
        self.cgpa.calculate()
    }

    pub fn snapshot(&self) -> Session {
        Session {
            subjects: self.sgpa.subjects().to_vec(),
            cgpa_mode: self.cgpa.mode(),
            semesters: self.cgpa.semesters().to_vec(),
            saved_at: Utc::now(),
        }
    }

    pub fn save(&self) -> Result<()> {
        let session = self.snapshot();
        self.store.save(&session)?;
        tracing::debug!("Session saved at {}", session.saved_at);
        Ok(())
    }
}
