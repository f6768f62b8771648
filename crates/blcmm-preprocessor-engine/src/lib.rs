pub mod canonical;
pub mod error;
pub mod escape;
pub mod harness;
pub mod io;
pub mod list;
pub mod record;
pub mod transcode;

// Re-export key types for easier usage
pub use error::*;
pub use escape::escape_str;
pub use list::list_contains;
pub use record::{TERMINATOR, WARNING_PREFIX};
pub use transcode::*;
