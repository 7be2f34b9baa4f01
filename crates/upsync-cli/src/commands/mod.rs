//! Command implementations for upsync-cli

pub mod backups;
pub mod bootstrap;
pub mod detect;
pub mod diff;
pub mod status;
pub mod sync;
mod upstream;

pub use backups::{run_backups, run_restore};
pub use bootstrap::run_bootstrap;
pub use detect::run_detect;
pub use diff::run_diff;
pub use status::run_status;
pub use sync::{SyncFlags, run_sync};
