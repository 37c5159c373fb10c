#![deny(unused_crate_dependencies)]
#![warn(missing_docs)]
#![warn(unused_extern_crates)]
#![warn(unused_imports)]

//! Deployment of compiled contracts.

use std::{str::FromStr, sync::Arc};

use async_trait::async_trait;
use auto_impl::auto_impl;
use ethers::{
    contract::ContractFactory,
    middleware::SignerMiddleware,
    providers::{Http, Middleware, Provider},
    signers::{LocalWallet, Signer},
    types::{Address, H256, U256, U64},
};
use url::Url;

use artifacts::Artifact;

mod error;

pub use error::{Error, Result};

/// Outcome of a successful deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deployment {
    /// Address of the deployed contract
    pub address: Address,

    /// Hash of the deployment transaction
    pub transaction_hash: H256,

    /// Block the deployment transaction was included in
    pub block_number: Option<U64>,

    /// Gas spent on the deployment
    pub gas_used: Option<U256>,
}

/// Something that can put a compiled contract on chain.
#[async_trait]
#[auto_impl(&, Arc, Box)]
pub trait ContractDeployer: Send + Sync {
    /// Deploy the contract described by `artifact` with no constructor arguments.
    ///
    /// Every call sends a new deployment transaction.
    async fn deploy(&self, artifact: &Artifact) -> Result<Deployment>;
}

/// [`ContractDeployer`] sending transactions through an ethers [`Middleware`].
pub struct EthersDeployer<M> {
    client: Arc<M>,
    confirmations: usize,
}

impl<M: Middleware> EthersDeployer<M> {
    /// Create a new `EthersDeployer`.
    ///
    /// # Arguments
    ///
    /// * `client`: [`Middleware`] to send the deployment with
    /// * `confirmations`: number of blocks to wait for after the deployment is mined
    pub fn new(client: Arc<M>, confirmations: usize) -> Self {
        Self {
            client,
            confirmations,
        }
    }
}

#[async_trait]
impl<M> ContractDeployer for EthersDeployer<M>
where
    M: Middleware + 'static,
{
    async fn deploy(&self, artifact: &Artifact) -> Result<Deployment> {
        let factory = ContractFactory::new(
            artifact.abi.clone(),
            artifact.bytecode.clone(),
            self.client.clone(),
        );

        let deployer = factory.deploy(())?.confirmations(self.confirmations);

        vlog::debug!(
            "sending deployment of {}, waiting for {} confirmations",
            artifact.contract_name,
            self.confirmations
        );

        let (contract, receipt) = deployer.send_with_receipt().await?;

        if receipt.status == Some(U64::zero()) {
            return Err(Error::Reverted(receipt.transaction_hash));
        }

        Ok(Deployment {
            address: contract.address(),
            transaction_hash: receipt.transaction_hash,
            block_number: receipt.block_number,
            gas_used: receipt.gas_used,
        })
    }
}

/// Connect to a node and pick the account to deploy from.
///
/// With a `private_key` transactions are signed locally for the chain id the
/// node reports. Without one the node's first unlocked account is used, which
/// is what local development nodes provide.
pub async fn connect(
    rpc_url: &Url,
    private_key: Option<&str>,
    confirmations: usize,
) -> Result<Box<dyn ContractDeployer>> {
    let provider = Provider::new(Http::new(rpc_url.clone()));

    match private_key {
        Some(private_key) => {
            let chain_id = provider.get_chainid().await?;
            let wallet = LocalWallet::from_str(private_key)?.with_chain_id(chain_id.as_u64());

            vlog::info!(
                "deploying from account {:?} on chain {chain_id}",
                wallet.address()
            );

            let client = Arc::new(SignerMiddleware::new(provider, wallet));

            Ok(Box::new(EthersDeployer::new(client, confirmations)))
        }
        None => {
            let from = provider
                .get_accounts()
                .await?
                .first()
                .copied()
                .ok_or(Error::NoAccounts)?;

            vlog::info!("deploying from node account {from:?}");

            let client = Arc::new(provider.with_sender(from));

            Ok(Box::new(EthersDeployer::new(client, confirmations)))
        }
    }
}

/// Deploy `artifact` once and log the outcome.
pub async fn deploy_contract<D>(deployer: &D, artifact: &Artifact) -> Result<Deployment>
where
    D: ContractDeployer + ?Sized,
{
    vlog::info!("deploying {}", artifact.fully_qualified_name());

    let deployment = deployer.deploy(artifact).await?;

    vlog::info!(
        "{} deployed at {:?} in tx {:?}, gas used {:?}",
        artifact.contract_name,
        deployment.address,
        deployment.transaction_hash,
        deployment.gas_used,
    );

    Ok(deployment)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use ethers::types::{Address, H256};
    use pretty_assertions::assert_eq;

    use artifacts::{Artifact, ArtifactStore};

    use super::{deploy_contract, ContractDeployer, Deployment, Error, Result};

    const FIXTURES: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/artifacts");

    #[derive(Default)]
    struct CountingDeployer {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl ContractDeployer for CountingDeployer {
        async fn deploy(&self, artifact: &Artifact) -> Result<Deployment> {
            self.calls.fetch_add(1, Ordering::SeqCst);

            if self.fail {
                return Err(Error::ContractError(format!(
                    "insufficient funds to deploy {}",
                    artifact.contract_name
                )));
            }

            Ok(Deployment {
                address: Address::repeat_byte(0x42),
                transaction_hash: H256::repeat_byte(0x01),
                block_number: Some(1.into()),
                gas_used: Some(53_000.into()),
            })
        }
    }

    #[tokio::test]
    async fn deploys_once() {
        let deployer = CountingDeployer::default();
        let artifact = ArtifactStore::new(FIXTURES).find("DreamToken").unwrap();

        let deployment = deploy_contract(&deployer, &artifact).await.unwrap();

        assert_eq!(deployment.address, Address::repeat_byte(0x42));
        assert_eq!(deployer.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn deploy_error_is_propagated() {
        let deployer = CountingDeployer {
            fail: true,
            ..Default::default()
        };
        let artifact = ArtifactStore::new(FIXTURES).find("DreamToken").unwrap();

        let boxed: Box<dyn ContractDeployer> = Box::new(deployer);

        match deploy_contract(&boxed, &artifact).await.unwrap_err() {
            Error::ContractError(msg) => {
                assert_eq!(msg, "insufficient funds to deploy DreamToken")
            }
            e => panic!("expected ContractError, got {e:?}"),
        }
    }
}
