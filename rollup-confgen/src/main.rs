//! CLI entrypoint for `rollup-confgen`.

use clap::Parser;
use rollup_confgen_cli::cli::Args;
use rollup_confgen_cli::error::CliError;

fn main() -> Result<(), CliError> {
    let args = Args::parse();
    let node_env = std::env::var("NODE_ENV").ok();
    let stdout = std::io::stdout();
    rollup_confgen_cli::run(&args, node_env.as_deref(), &mut stdout.lock())
}
