pub mod transcript;

pub use transcript::{SheetKind, Transcript};
