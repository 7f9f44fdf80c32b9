//! Dead-letter store for tickets that could not complete processing.
//!
//! Records are write-once JSON documents. The pipeline only ever writes;
//! listing and age-based pruning are for operators and the startup hook.

mod error;
mod fs_sink;
mod traits;
mod types;

pub use error::DeadLetterError;
pub use fs_sink::FsDeadLetterSink;
pub use traits::DeadLetterSink;
pub use types::{DeadLetterEntry, DeadLetterRecord, DeadLetterStage};
