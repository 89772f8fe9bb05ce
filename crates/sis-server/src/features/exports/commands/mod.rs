pub mod cancel;
pub mod create;

pub use cancel::CancelExportCommand;
pub use create::{CreateExportCommand, CreateExportError};
