pub mod cancel;
pub mod commit;
pub mod upload;

pub use cancel::CancelImportCommand;
pub use commit::CommitImportCommand;
pub use upload::{UploadImportCommand, UploadImportError};
