use std::path::PathBuf;

use ethers::types::ParseBytesError;

#[derive(Debug, thiserror::Error)]
#[allow(missing_docs)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("invalid bytecode for {name}: {source}")]
    Bytecode {
        name: String,
        source: ParseBytesError,
    },

    #[error("artifacts directory {0} does not exist, compile the contracts first")]
    MissingDirectory(PathBuf),

    #[error("artifact for contract {name} not found in {root}")]
    NotFound { name: String, root: PathBuf },

    #[error("artifact for contract {requested} not found, but {found} exists; contract names are case-sensitive")]
    CaseMismatch { requested: String, found: String },

    #[error("multiple artifacts for contract {name}, use a fully qualified name: {}", candidates.join(", "))]
    Ambiguous {
        name: String,
        candidates: Vec<String>,
    },

    #[error("contract {0} has no bytecode, abstract contracts and interfaces cannot be deployed")]
    NotDeployable(String),

    #[error("contract {name} needs linked libraries: {}", libraries.join(", "))]
    UnlinkedLibraries {
        name: String,
        libraries: Vec<String>,
    },
}

/// The crate result type.
pub type Result<T> = std::result::Result<T, Error>;
