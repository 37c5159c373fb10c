use std::{
    fmt, fs,
    path::{Path, PathBuf},
};

use envconfig::Envconfig;
use serde::Deserialize;
use url::Url;

use crate::error::Error;

/// Contract deployed when nothing else is configured.
pub(crate) const DEFAULT_CONTRACT_NAME: &str = "DreamToken";

const DEFAULT_RPC_URL: &str = "http://127.0.0.1:8545";
const DEFAULT_ARTIFACTS_PATH: &str = "artifacts";
const DEFAULT_CONFIRMATIONS: usize = 1;

/// Deployment configuration.
///
/// Read from `DEPLOYER_*` environment variables or from a TOML file with
/// the same keys in snake case.
#[derive(Deserialize, Envconfig)]
pub(crate) struct Config {
    /// JSON-RPC endpoint of the node.
    #[envconfig(from = "DEPLOYER_RPC_URL", default = "http://127.0.0.1:8545")]
    #[serde(default = "default_rpc_url")]
    pub(crate) rpc_url: Url,

    /// Hex-encoded key to sign the deployment with.
    ///
    /// If absent the first account unlocked on the node is used.
    #[envconfig(from = "DEPLOYER_PRIVATE_KEY")]
    #[serde(default)]
    pub(crate) private_key: Option<String>,

    /// Directory with the compiled contract artifacts.
    #[envconfig(from = "DEPLOYER_ARTIFACTS_PATH", default = "artifacts")]
    #[serde(default = "default_artifacts_path")]
    pub(crate) artifacts_path: PathBuf,

    /// Name of the contract to deploy.
    #[envconfig(from = "DEPLOYER_CONTRACT_NAME", default = "DreamToken")]
    #[serde(default = "default_contract_name")]
    pub(crate) contract_name: String,

    /// Blocks to wait for after the deployment transaction is mined.
    #[envconfig(from = "DEPLOYER_CONFIRMATIONS", default = "1")]
    #[serde(default = "default_confirmations")]
    pub(crate) confirmations: usize,
}

fn default_rpc_url() -> Url {
    Url::parse(DEFAULT_RPC_URL).expect("the default RPC url is valid; qed")
}

fn default_artifacts_path() -> PathBuf {
    PathBuf::from(DEFAULT_ARTIFACTS_PATH)
}

fn default_contract_name() -> String {
    DEFAULT_CONTRACT_NAME.to_owned()
}

fn default_confirmations() -> usize {
    DEFAULT_CONFIRMATIONS
}

impl Config {
    /// Read the config from a TOML file.
    pub(crate) fn from_file<P: AsRef<Path>>(config_path: P) -> Result<Self, Error> {
        let contents = fs::read_to_string(config_path)?;

        let config: Config = toml::from_str(&contents)?;

        Ok(config)
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("rpc_url", &self.rpc_url.as_str())
            .field(
                "private_key",
                &self.private_key.as_ref().map(|_| "<redacted>"),
            )
            .field("artifacts_path", &self.artifacts_path)
            .field("contract_name", &self.contract_name)
            .field("confirmations", &self.confirmations)
            .finish()
    }
}
