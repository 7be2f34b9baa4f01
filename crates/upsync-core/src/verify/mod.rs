//! Post-sync verification
//!
//! Every synced file is checked for presence and content, source files are
//! parsed with tree-sitter, structured files with their serde parser, and
//! configured manifests are checked for dangling file references.

mod references;
mod report;
mod structured;
mod syntax;
mod verifier;

pub use references::{ManifestCheck, check_manifest, path_references};
pub use report::{CheckKind, CheckOutcome, ParseOutcome, VerifyResult};
pub use structured::{StructuredFormat, check_structured};
pub use syntax::{SourceLanguage, check_syntax};
pub use verifier::Verifier;
