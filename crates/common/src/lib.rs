//! Shared types for the minfs volume plugin.
//!
//! - [`target`]: the remote bucket a volume is bound to, and the validation
//!   that turns raw volume options into a [`RemoteTarget`]
//! - [`version`]: build information reported by the daemon and the CLI

pub mod target;
pub mod version;

pub use target::{
    matches_existing, validate, validate_name, ConflictError, RemoteTarget, TargetField,
    ValidationError,
};
pub use version::BuildInfo;
