use std::io::Write;

use artifacts::Artifact;
use deployer::{deploy_contract, ContractDeployer, Deployment};
use ethers::utils::to_checksum;
use eyre::Result;

/// Deploy `artifact` and report its address to `out`.
pub(crate) async fn run<D, W>(deployer: &D, artifact: &Artifact, out: &mut W) -> Result<Deployment>
where
    D: ContractDeployer + ?Sized,
    W: Write,
{
    let deployment = deploy_contract(deployer, artifact).await?;

    writeln!(
        out,
        "Contract deployed to address: {}",
        to_checksum(&deployment.address, None)
    )?;

    Ok(deployment)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use artifacts::Artifact;
    use async_trait::async_trait;
    use deployer::{ContractDeployer, Deployment, Error};
    use ethers::types::{Address, H256};
    use pretty_assertions::assert_eq;

    const DREAM_TOKEN_ARTIFACT: &str = r#"{
        "_format": "hh-sol-artifact-1",
        "contractName": "DreamToken",
        "sourceName": "contracts/DreamToken.sol",
        "abi": [],
        "bytecode": "0x6001600c60003960016000f300",
        "deployedBytecode": "0x00",
        "linkReferences": {},
        "deployedLinkReferences": {}
    }"#;

    struct FakeDeployer {
        calls: AtomicUsize,
        result: fn() -> deployer::Result<Deployment>,
    }

    impl FakeDeployer {
        fn new(result: fn() -> deployer::Result<Deployment>) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                result,
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ContractDeployer for FakeDeployer {
        async fn deploy(&self, _artifact: &Artifact) -> deployer::Result<Deployment> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            (self.result)()
        }
    }

    fn deployed() -> deployer::Result<Deployment> {
        Ok(Deployment {
            address: "0x5fbdb2315678afecb367f032d93f642f64180aa3"
                .parse::<Address>()
                .unwrap(),
            transaction_hash: H256::repeat_byte(0xab),
            block_number: Some(1.into()),
            gas_used: Some(60_000.into()),
        })
    }

    fn out_of_funds() -> deployer::Result<Deployment> {
        Err(Error::ContractError(
            "insufficient funds for gas * price + value".to_owned(),
        ))
    }

    fn dream_token() -> Artifact {
        Artifact::from_json(DREAM_TOKEN_ARTIFACT).unwrap()
    }

    #[tokio::test]
    async fn prints_checksummed_address() {
        let deployer = FakeDeployer::new(deployed);
        let mut out = vec![];

        super::run(&deployer, &dream_token(), &mut out)
            .await
            .unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Contract deployed to address: 0x5FbDB2315678afecb367f032d93F642f64180aa3\n"
        );
        assert_eq!(deployer.calls(), 1);
    }

    #[tokio::test]
    async fn deploy_failure_prints_nothing() {
        let deployer = FakeDeployer::new(out_of_funds);
        let mut out = vec![];

        let err = super::run(&deployer, &dream_token(), &mut out)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("insufficient funds"));
        assert!(out.is_empty());
        assert_eq!(deployer.calls(), 1);
    }
}
