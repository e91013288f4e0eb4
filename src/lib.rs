pub mod auth;
pub mod diagnostics;
pub mod errors;
pub mod logging;
pub mod versions;

// Re-export key types at crate root for convenience.
pub use auth::{
    ensure_auth, is_valid_api_key, read_config_api_key, AuthOutcome, CredentialLookup,
    CredentialSource, ResolvedCredential,
};
pub use diagnostics::{Diagnostic, Severity};
pub use errors::{PreflightError, Result};
pub use versions::{
    check_versions, compare_versions, read_catalog, read_manifest_version, CatalogDescriptor,
    VersionReport,
};
