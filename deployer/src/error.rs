use ethers::{
    contract::ContractError,
    prelude::Middleware,
    providers::ProviderError,
    signers::WalletError,
    types::H256,
};

#[derive(Debug, thiserror::Error)]
#[allow(missing_docs)]
pub enum Error {
    #[error(transparent)]
    ProviderError(#[from] ProviderError),

    #[error("Contract error {0}")]
    ContractError(String),

    #[error("Wallet error {0}")]
    Wallet(String),

    #[error("The node has no unlocked accounts and no private key is configured")]
    NoAccounts,

    #[error("Deployment transaction {0:?} reverted")]
    Reverted(H256),
}

impl<M: Middleware> From<ContractError<M>> for Error {
    fn from(value: ContractError<M>) -> Self {
        Self::ContractError(value.to_string())
    }
}

impl From<WalletError> for Error {
    fn from(value: WalletError) -> Self {
        Self::Wallet(value.to_string())
    }
}

/// The deployer result type.
pub type Result<T> = std::result::Result<T, Error>;
