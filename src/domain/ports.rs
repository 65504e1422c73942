use crate::domain::model::Session;
use crate::utils::error::Result;

/// Persistence collaborator. The engine hands it complete snapshots and
/// never touches the storage medium itself.
pub trait SessionStore {
    fn load(&self) -> Result<Option<Session>>;
    fn save(&self, session: &Session) -> Result<()>;
}
