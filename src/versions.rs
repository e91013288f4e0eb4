//! Version consistency between the package manifest (`pyproject.toml`) and
//! the marketplace catalog (`marketplace.json`).
//!
//! Comparison is exact string equality. `1.0` and `1.0.0` are different
//! versions here.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::diagnostics::{Diagnostic, Severity, V001, V002, V003};
use crate::errors::{PreflightError, Result};

/// Manifest location relative to the project root.
pub const DEFAULT_MANIFEST_PATH: &str = "armor-mcp/pyproject.toml";

/// Catalog location relative to the project root.
pub const DEFAULT_CATALOG_PATH: &str = ".claude-plugin/marketplace.json";

/// Regex for semver: x.y.z (no pre-release/build metadata).
static SEMVER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+\.[0-9]+\.[0-9]+$").expect("semver regex"));

/// The slice of `pyproject.toml` this check reads.
#[derive(Debug, Deserialize)]
pub struct ManifestVersion {
    pub project: ManifestProject,
}

/// The `[project]` table of `pyproject.toml`.
#[derive(Debug, Deserialize)]
pub struct ManifestProject {
    pub version: String,
}

/// Parsed `marketplace.json`.
#[derive(Debug, Deserialize)]
pub struct CatalogDescriptor {
    /// Top-level catalog version.
    pub version: String,
    /// Plugin entries in declaration order.
    pub plugins: Vec<CatalogPlugin>,
}

/// One entry of the catalog's `plugins` array.
#[derive(Debug, Deserialize)]
pub struct CatalogPlugin {
    pub version: String,
}

impl CatalogDescriptor {
    /// Version of the first plugin entry, the only one compared.
    #[must_use]
    pub fn first_plugin_version(&self) -> Option<&str> {
        self.plugins.first().map(|p| p.version.as_str())
    }
}

/// Outcome of one consistency check.
#[derive(Debug, Clone, Serialize)]
pub struct VersionReport {
    pub manifest_version: String,
    pub catalog_version: String,
    pub plugin_version: String,
    /// Mismatches; empty when all three versions agree.
    pub mismatches: Vec<Diagnostic>,
    /// Non-fatal observations about the versions.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<Diagnostic>,
}

impl VersionReport {
    /// Returns `true` if no mismatch was recorded.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.mismatches.is_empty()
    }

    /// The shared version, when the check passed.
    #[must_use]
    pub fn agreed_version(&self) -> Option<&str> {
        self.passed().then_some(self.manifest_version.as_str())
    }

    /// Render the human-readable banner and itemized mismatches.
    #[must_use]
    pub fn format_text(&self) -> String {
        match self.agreed_version() {
            Some(version) => format!("Version consistency check PASSED: {version}\n"),
            None => {
                let mut out = String::from("Version consistency check FAILED:\n");
                for d in &self.mismatches {
                    out.push_str(&format!("  - {d}\n"));
                }
                out
            }
        }
    }
}

fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| PreflightError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Read `project.version` from a `pyproject.toml`.
///
/// A missing file, invalid TOML, or a missing/non-string version is fatal.
pub fn read_manifest_version(path: &Path) -> Result<String> {
    let content = read_file(path)?;
    let manifest: ManifestVersion =
        toml::from_str(&content).map_err(|source| PreflightError::Toml {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(manifest.project.version)
}

/// Read a `marketplace.json` catalog.
///
/// Fails if `version` or `plugins` is missing, or if `plugins` is empty.
pub fn read_catalog(path: &Path) -> Result<CatalogDescriptor> {
    let content = read_file(path)?;
    let catalog: CatalogDescriptor =
        serde_json::from_str(&content).map_err(|source| PreflightError::Json {
            path: path.to_path_buf(),
            source,
        })?;
    if catalog.plugins.is_empty() {
        return Err(PreflightError::MissingField {
            path: path.to_path_buf(),
            field: "plugins[0]",
        });
    }
    Ok(catalog)
}

/// Compare the manifest version against the catalog and first-plugin
/// versions. Each disagreeing pair yields one diagnostic.
#[must_use]
pub fn compare_versions(manifest: &str, catalog: &str, plugin: &str) -> Vec<Diagnostic> {
    let mut diags = Vec::new();

    if manifest != catalog {
        diags.push(
            Diagnostic::new(
                Severity::Error,
                V001,
                format!(
                    "Version mismatch: pyproject.toml={manifest}, marketplace.json={catalog}"
                ),
            )
            .with_field("version"),
        );
    }

    if manifest != plugin {
        diags.push(
            Diagnostic::new(
                Severity::Error,
                V002,
                format!("Version mismatch: pyproject.toml={manifest}, plugin version={plugin}"),
            )
            .with_field("plugins[0].version"),
        );
    }

    diags
}

/// Non-fatal checks on the manifest version.
#[must_use]
pub fn version_warnings(manifest: &str) -> Vec<Diagnostic> {
    if SEMVER_RE.is_match(manifest) {
        return vec![];
    }
    vec![Diagnostic::new(
        Severity::Warning,
        V003,
        format!("`version` is not valid semver: \"{manifest}\""),
    )
    .with_field("project.version")
    .with_suggestion("Use x.y.z format (e.g., \"1.0.0\")")]
}

/// Run the full consistency check over a manifest and a catalog file.
pub fn check_versions(manifest_path: &Path, catalog_path: &Path) -> Result<VersionReport> {
    let manifest_version = read_manifest_version(manifest_path)?;
    let catalog = read_catalog(catalog_path)?;
    let plugin_version = catalog
        .first_plugin_version()
        .ok_or_else(|| PreflightError::MissingField {
            path: catalog_path.to_path_buf(),
            field: "plugins[0]",
        })?
        .to_string();

    tracing::debug!(
        manifest = %manifest_version,
        catalog = %catalog.version,
        plugin = %plugin_version,
        "comparing versions"
    );

    let mismatches = compare_versions(&manifest_version, &catalog.version, &plugin_version);
    let warnings = version_warnings(&manifest_version);

    Ok(VersionReport {
        manifest_version,
        catalog_version: catalog.version,
        plugin_version,
        mismatches,
        warnings,
    })
}

/// Resolve the manifest and catalog paths under a project root, honoring
/// explicit overrides.
#[must_use]
pub fn resolve_paths(
    root: &Path,
    manifest: Option<PathBuf>,
    catalog: Option<PathBuf>,
) -> (PathBuf, PathBuf) {
    (
        manifest.unwrap_or_else(|| root.join(DEFAULT_MANIFEST_PATH)),
        catalog.unwrap_or_else(|| root.join(DEFAULT_CATALOG_PATH)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn write_project(dir: &Path, manifest: &str, catalog: &str) -> (PathBuf, PathBuf) {
        let (m, c) = resolve_paths(dir, None, None);
        fs::create_dir_all(m.parent().unwrap()).unwrap();
        fs::create_dir_all(c.parent().unwrap()).unwrap();
        fs::write(&m, manifest).unwrap();
        fs::write(&c, catalog).unwrap();
        (m, c)
    }

    fn manifest(version: &str) -> String {
        format!("[project]\nname = \"armor-mcp\"\nversion = \"{version}\"\n")
    }

    fn catalog(version: &str, plugin: &str) -> String {
        format!(
            r#"{{ "name": "armor", "version": "{version}", "plugins": [ {{ "name": "armor", "version": "{plugin}" }} ] }}"#
        )
    }

    #[test]
    fn all_equal_passes() {
        assert!(compare_versions("1.2.3", "1.2.3", "1.2.3").is_empty());
    }

    #[test]
    fn catalog_mismatch_only() {
        let diags = compare_versions("1.2.3", "1.2.4", "1.2.3");
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code, V001);
        assert_eq!(
            diags[0].message,
            "Version mismatch: pyproject.toml=1.2.3, marketplace.json=1.2.4"
        );
    }

    #[test]
    fn plugin_mismatch_only() {
        let diags = compare_versions("1.2.3", "1.2.3", "2.0.0");
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code, V002);
        assert_eq!(
            diags[0].message,
            "Version mismatch: pyproject.toml=1.2.3, plugin version=2.0.0"
        );
    }

    #[test]
    fn both_mismatch_reported_independently() {
        let diags = compare_versions("1.0.0", "1.1.0", "1.1.0");
        let codes: Vec<_> = diags.iter().map(|d| d.code).collect();
        assert_eq!(codes, vec![V001, V002]);
    }

    #[test]
    fn no_normalization_applied() {
        assert_eq!(compare_versions("1.0", "1.0.0", "1.0").len(), 1);
        assert_eq!(compare_versions("1.0.0", "1.0.0 ", "1.0.0").len(), 1);
        assert_eq!(compare_versions("v1.0.0", "V1.0.0", "v1.0.0").len(), 1);
    }

    #[test]
    fn check_versions_reads_files() {
        let dir = tempdir().unwrap();
        let (m, c) = write_project(dir.path(), &manifest("1.2.3"), &catalog("1.2.3", "1.2.3"));
        let report = check_versions(&m, &c).unwrap();
        assert!(report.passed());
        assert_eq!(report.agreed_version(), Some("1.2.3"));
        assert_eq!(
            report.format_text(),
            "Version consistency check PASSED: 1.2.3\n"
        );
    }

    #[test]
    fn failed_report_itemizes_mismatches() {
        let dir = tempdir().unwrap();
        let (m, c) = write_project(dir.path(), &manifest("1.2.3"), &catalog("1.2.4", "1.2.3"));
        let report = check_versions(&m, &c).unwrap();
        assert!(!report.passed());
        assert_eq!(report.agreed_version(), None);
        assert_eq!(
            report.format_text(),
            "Version consistency check FAILED:\n  \
             - Version mismatch: pyproject.toml=1.2.3, marketplace.json=1.2.4\n"
        );
    }

    #[test]
    fn only_first_plugin_is_compared() {
        let dir = tempdir().unwrap();
        let cat = r#"{ "version": "1.0.0", "plugins": [ { "version": "1.0.0" }, { "version": "9.9.9" } ] }"#;
        let (m, c) = write_project(dir.path(), &manifest("1.0.0"), cat);
        assert!(check_versions(&m, &c).unwrap().passed());
    }

    #[test]
    fn missing_manifest_is_fatal() {
        let dir = tempdir().unwrap();
        let (m, c) = resolve_paths(dir.path(), None, None);
        let err = check_versions(&m, &c).unwrap_err();
        assert!(matches!(err, PreflightError::Io { .. }));
    }

    #[test]
    fn manifest_without_version_is_fatal() {
        let dir = tempdir().unwrap();
        let (m, c) = write_project(
            dir.path(),
            "[project]\nname = \"armor-mcp\"\n",
            &catalog("1.0.0", "1.0.0"),
        );
        let err = check_versions(&m, &c).unwrap_err();
        assert!(matches!(err, PreflightError::Toml { .. }));
    }

    #[test]
    fn manifest_with_numeric_version_is_fatal() {
        let dir = tempdir().unwrap();
        let (m, _) = write_project(dir.path(), "[project]\nversion = 1\n", "{}");
        assert!(matches!(
            read_manifest_version(&m).unwrap_err(),
            PreflightError::Toml { .. }
        ));
    }

    #[test]
    fn malformed_catalog_is_fatal() {
        let dir = tempdir().unwrap();
        let (m, c) = write_project(dir.path(), &manifest("1.0.0"), "{ not json }");
        let err = check_versions(&m, &c).unwrap_err();
        assert!(matches!(err, PreflightError::Json { .. }));
    }

    #[test]
    fn catalog_without_plugins_is_fatal() {
        let dir = tempdir().unwrap();
        let (m, c) = write_project(dir.path(), &manifest("1.0.0"), r#"{ "version": "1.0.0" }"#);
        assert!(matches!(
            check_versions(&m, &c).unwrap_err(),
            PreflightError::Json { .. }
        ));
    }

    #[test]
    fn catalog_with_empty_plugins_is_fatal() {
        let dir = tempdir().unwrap();
        let (m, c) = write_project(
            dir.path(),
            &manifest("1.0.0"),
            r#"{ "version": "1.0.0", "plugins": [] }"#,
        );
        let err = check_versions(&m, &c).unwrap_err();
        assert!(matches!(
            err,
            PreflightError::MissingField {
                field: "plugins[0]",
                ..
            }
        ));
        assert!(err.to_string().contains("missing required field `plugins[0]`"));
    }

    #[test]
    fn non_semver_manifest_warns_without_failing() {
        let dir = tempdir().unwrap();
        let (m, c) = write_project(dir.path(), &manifest("1.0"), &catalog("1.0", "1.0"));
        let report = check_versions(&m, &c).unwrap();
        assert!(report.passed());
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].code, V003);
    }

    #[test]
    fn semver_manifest_has_no_warnings() {
        assert!(version_warnings("10.20.30").is_empty());
    }

    #[test]
    fn explicit_paths_override_root() {
        let root = Path::new("/project");
        let (m, c) = resolve_paths(root, Some(PathBuf::from("a.toml")), None);
        assert_eq!(m, PathBuf::from("a.toml"));
        assert_eq!(c, root.join(DEFAULT_CATALOG_PATH));
    }
}
