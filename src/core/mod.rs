pub mod aggregation;
pub mod constraints;
pub mod engine;
pub mod session;

pub use crate::domain::model::{CgpaMode, GpaSummary, Semester, Session, Subject};
pub use crate::domain::ports::SessionStore;
pub use crate::utils::error::Result;
