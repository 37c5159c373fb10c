use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(version, author, about, long_about = None)]
pub struct Args {
    /// Read the configuration from this TOML file instead of the environment
    #[arg(long)]
    pub(crate) config_path: Option<PathBuf>,

    /// Deploy this contract instead of the configured one
    #[arg(long)]
    pub(crate) contract: Option<String>,
}
