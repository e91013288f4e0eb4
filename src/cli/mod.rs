use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

mod check_versions;
mod ensure_auth;

#[derive(Parser)]
#[command(
    name = "armor-preflight",
    version,
    about = "Preflight checks for the AnomalyArmor plugin"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Show project information
    #[arg(long)]
    about: bool,
}

/// Output format for check results.
#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum Format {
    /// Human-readable text output (default)
    #[default]
    Text,
    /// JSON report object
    Json,
}

#[derive(Subcommand)]
#[command(next_display_order = None)]
enum Commands {
    /// Check that pyproject.toml and marketplace.json declare the same version
    #[command(alias = "versions")]
    CheckVersions {
        /// Project root containing armor-mcp/ and .claude-plugin/
        #[arg(long, default_value = ".")]
        root: PathBuf,
        /// Override the manifest path [default: <root>/armor-mcp/pyproject.toml]
        #[arg(long)]
        manifest: Option<PathBuf>,
        /// Override the catalog path [default: <root>/.claude-plugin/marketplace.json]
        #[arg(long)]
        catalog: Option<PathBuf>,
        /// Output format
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
    /// Verify that a well-formed API key is configured (silent on success)
    #[command(alias = "auth")]
    EnsureAuth,
}

pub fn run(cli: Cli) {
    if cli.about {
        print_about();
        return;
    }

    match cli.command {
        Some(Commands::CheckVersions {
            root,
            manifest,
            catalog,
            format,
        }) => check_versions::run(root, manifest, catalog, format),
        Some(Commands::EnsureAuth) => ensure_auth::run(),
        None => {
            eprintln!("Usage: armor-preflight <command> [args]");
            eprintln!("Run `armor-preflight --help` for details.");
            std::process::exit(1);
        }
    }
}

fn print_about() {
    println!(
        "armor-preflight: AnomalyArmor plugin preflight checks\n\
         ├─ version:    {}\n\
         ├─ author:     {}\n\
         ├─ source:     {}\n\
         └─ licence:    {} https://www.apache.org/licenses/LICENSE-2.0",
        env!("CARGO_PKG_VERSION"),
        env!("CARGO_PKG_AUTHORS"),
        env!("CARGO_PKG_REPOSITORY"),
        env!("CARGO_PKG_LICENSE"),
    );
}
