use std::path::PathBuf;

use armor_preflight::versions::resolve_paths;

pub(crate) fn run(
    root: PathBuf,
    manifest: Option<PathBuf>,
    catalog: Option<PathBuf>,
    format: super::Format,
) {
    let (manifest_path, catalog_path) = resolve_paths(&root, manifest, catalog);

    let report = match armor_preflight::check_versions(&manifest_path, &catalog_path) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("armor-preflight check-versions: {e}");
            std::process::exit(1);
        }
    };

    match format {
        super::Format::Text => {
            for w in &report.warnings {
                eprintln!("{w}");
            }
            print!("{}", report.format_text());
        }
        super::Format::Json => {
            let mut json = serde_json::to_value(&report).unwrap();
            json["passed"] = serde_json::Value::Bool(report.passed());
            println!("{}", serde_json::to_string_pretty(&json).unwrap());
        }
    }

    if !report.passed() {
        std::process::exit(1);
    }
}
