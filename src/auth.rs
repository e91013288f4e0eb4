//! API key precondition: resolve an AnomalyArmor API key and check its format.
//!
//! Resolution order is the `ARMOR_API_KEY` environment variable, then the
//! `api_key:` line of `~/.armor/config.yaml`. The config file is scanned line
//! by line rather than parsed, so unrelated syntax errors elsewhere in the
//! file never block resolution.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::diagnostics::{Diagnostic, Severity, A001, A002};

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "ARMOR_API_KEY";

/// Config file location relative to the user's home directory.
pub const CONFIG_RELATIVE_PATH: &str = ".armor/config.yaml";

/// Where users obtain an API key.
pub const API_KEYS_URL: &str = "https://app.anomalyarmor.ai/settings/api-keys";

/// Key token recognized by the config line scan.
const CONFIG_KEY_PREFIX: &str = "api_key:";

/// API key pattern: `aa_live_*` or `aa_test_*` with a 32+ alphanumeric tail.
static API_KEY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^aa_(live|test)_[A-Za-z0-9]{32,}$").expect("api key regex")
});

/// Which source supplied a candidate credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    Environment,
    ConfigFile,
}

impl fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialSource::Environment => write!(f, "{API_KEY_ENV} environment variable"),
            CredentialSource::ConfigFile => write!(f, "~/{CONFIG_RELATIVE_PATH}"),
        }
    }
}

/// A candidate credential and where it came from.
#[derive(Clone, PartialEq, Eq)]
pub struct ResolvedCredential {
    pub value: String,
    pub source: CredentialSource,
}

// Keep the key itself out of logs and panic messages.
impl fmt::Debug for ResolvedCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedCredential")
            .field("value", &"<redacted>")
            .field("source", &self.source)
            .finish()
    }
}

/// Inputs to credential resolution, captured once from the process.
#[derive(Debug, Clone, Default)]
pub struct CredentialLookup {
    /// Raw value of `ARMOR_API_KEY`, if set.
    pub env_value: Option<String>,
    /// Config file to scan when the environment yields nothing.
    pub config_path: Option<PathBuf>,
}

impl CredentialLookup {
    /// Capture `ARMOR_API_KEY` and the home-relative config path.
    ///
    /// A non-UTF-8 environment value is treated as unset.
    #[must_use]
    pub fn from_process() -> Self {
        let home = std::env::var_os("HOME")
            .or_else(|| std::env::var_os("USERPROFILE"))
            .map(PathBuf::from);
        Self {
            env_value: std::env::var(API_KEY_ENV).ok(),
            config_path: home.as_deref().map(default_config_path),
        }
    }

    /// Resolve a candidate: a non-empty environment value wins, otherwise
    /// the config file is consulted.
    #[must_use]
    pub fn resolve(&self) -> Option<ResolvedCredential> {
        if let Some(value) = self.env_value.as_deref().filter(|v| !v.is_empty()) {
            tracing::debug!("api key resolved from {API_KEY_ENV}");
            return Some(ResolvedCredential {
                value: value.to_string(),
                source: CredentialSource::Environment,
            });
        }

        let path = self.config_path.as_deref()?;
        let value = read_config_api_key(path)?;
        tracing::debug!(path = %path.display(), "api key resolved from config file");
        Some(ResolvedCredential {
            value,
            source: CredentialSource::ConfigFile,
        })
    }
}

/// `{home}/.armor/config.yaml`.
#[must_use]
pub fn default_config_path(home: &Path) -> PathBuf {
    home.join(CONFIG_RELATIVE_PATH)
}

/// Scan a config file for its `api_key:` line.
///
/// The first line (after trimming) that starts with `api_key:` decides the
/// result. Any read failure is logged and treated as "no key".
#[must_use]
pub fn read_config_api_key(path: &Path) -> Option<String> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "config file not found");
        return None;
    }

    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "ignoring unreadable config file");
            return None;
        }
    };

    let line = content
        .lines()
        .map(str::trim)
        .find(|l| l.starts_with(CONFIG_KEY_PREFIX))?;
    let value = strip_quotes(line[CONFIG_KEY_PREFIX.len()..].trim());
    (!value.is_empty()).then(|| value.to_string())
}

/// Strip one leading and one trailing quote character (`'` or `"`).
fn strip_quotes(s: &str) -> &str {
    let s = s.strip_prefix(['\'', '"']).unwrap_or(s);
    s.strip_suffix(['\'', '"']).unwrap_or(s)
}

/// Returns `true` if the key matches `^aa_(live|test)_[A-Za-z0-9]{32,}$`.
#[must_use]
pub fn is_valid_api_key(key: &str) -> bool {
    API_KEY_RE.is_match(key)
}

/// Result of the authentication precondition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    /// A well-formed key was found.
    Ready(ResolvedCredential),
    /// Neither source yielded a key.
    Missing,
    /// A key was found but does not match the expected format.
    InvalidFormat(ResolvedCredential),
}

impl AuthOutcome {
    /// Returns `true` if dependent functionality may run.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(self, AuthOutcome::Ready(_))
    }

    /// Diagnostic describing a failed outcome.
    #[must_use]
    pub fn diagnostic(&self) -> Option<Diagnostic> {
        match self {
            AuthOutcome::Ready(_) => None,
            AuthOutcome::Missing => Some(
                Diagnostic::new(Severity::Error, A001, "No AnomalyArmor API key configured.")
                    .with_field("api_key")
                    .with_suggestion(format!("Get your API key at: {API_KEYS_URL}")),
            ),
            AuthOutcome::InvalidFormat(cred) => Some(
                Diagnostic::new(
                    Severity::Error,
                    A002,
                    format!("Invalid API key format in {}.", cred.source),
                )
                .with_field("api_key")
                .with_suggestion(format!("Get a valid key at: {API_KEYS_URL}")),
            ),
        }
    }

    /// Render the stderr report for a failed outcome; empty on success.
    #[must_use]
    pub fn format_text(&self) -> String {
        match self {
            AuthOutcome::Ready(_) => String::new(),
            AuthOutcome::Missing => format!(
                "Error: No AnomalyArmor API key configured.\n\
                 \n\
                 To configure authentication:\n\
                 \n\
                 Option 1: Set environment variable\n  \
                 export {API_KEY_ENV}=aa_live_your_key_here\n\
                 \n\
                 Option 2: Create config file\n  \
                 mkdir -p ~/.armor\n  \
                 echo 'api_key: aa_live_your_key_here' > ~/{CONFIG_RELATIVE_PATH}\n\
                 \n\
                 Get your API key at: {API_KEYS_URL}\n"
            ),
            AuthOutcome::InvalidFormat(cred) => format!(
                "Error: Invalid API key format in {}.\n\
                 \n\
                 API keys should match pattern: aa_live_* or aa_test_*\n\
                 Get a valid key at: {API_KEYS_URL}\n",
                cred.source
            ),
        }
    }
}

/// Resolve a key and check its format.
#[must_use]
pub fn ensure_auth(lookup: &CredentialLookup) -> AuthOutcome {
    match lookup.resolve() {
        None => AuthOutcome::Missing,
        Some(cred) if is_valid_api_key(&cred.value) => AuthOutcome::Ready(cred),
        Some(cred) => {
            tracing::debug!(source = %cred.source, "api key has invalid format");
            AuthOutcome::InvalidFormat(cred)
        }
    }
}
