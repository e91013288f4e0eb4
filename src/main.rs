use clap::Parser;

mod cli;

fn main() {
    armor_preflight::logging::init_logging();
    cli::run(cli::Cli::parse());
}
