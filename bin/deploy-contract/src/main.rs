#![deny(unused_crate_dependencies)]
#![warn(missing_docs)]
#![warn(unused_extern_crates)]
#![warn(unused_imports)]

//! Deploys a compiled contract and prints its address.

use artifacts::ArtifactStore;
use clap::Parser;
use envconfig::Envconfig;
use eyre::Result;

use cli::Args;
use config::Config;

mod cli;
mod config;
mod deploy;
mod error;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::parse();

    let mut config = match args.config_path {
        Some(path) => Config::from_file(path)?,
        None => {
            dotenvy::dotenv().ok();
            Config::init_from_env()?
        }
    };

    if let Some(contract) = args.contract {
        config.contract_name = contract;
    }

    let _sentry_guard = vlog::init();

    vlog::debug!("{config:?}");
    vlog::info!(
        "connecting to {}",
        config.rpc_url.host_str().unwrap_or("<no host>")
    );

    // The lookup is local, do it before touching the network so a missing or
    // misspelled contract is reported as such even with the node down.
    let artifact = ArtifactStore::new(&config.artifacts_path).find(&config.contract_name)?;

    let deployer = deployer::connect(
        &config.rpc_url,
        config.private_key.as_deref(),
        config.confirmations,
    )
    .await?;

    deploy::run(&deployer, &artifact, &mut std::io::stdout()).await?;

    Ok(())
}
