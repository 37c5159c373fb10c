#![deny(unused_crate_dependencies)]
#![warn(missing_docs)]
#![warn(unused_extern_crates)]
#![warn(unused_imports)]

//! Lookup of compiled contract artifacts.
//!
//! Reads the JSON files Hardhat writes under its `artifacts/` directory
//! (`artifacts/<source>/<Contract>.json`) and turns them into something
//! a contract factory can be built from.

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use ethers::{abi::Abi, types::Bytes};
use serde::Deserialize;

mod error;

pub use error::{Error, Result};

const BUILD_INFO_DIR: &str = "build-info";
const DEBUG_FILE_SUFFIX: &str = ".dbg.json";
const ARTIFACT_EXTENSION: &str = "json";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HardhatArtifact {
    contract_name: String,
    source_name: String,
    abi: Abi,
    bytecode: String,
    #[serde(default)]
    link_references: BTreeMap<String, BTreeMap<String, serde_json::Value>>,
}

/// A compiled contract ready to be deployed.
#[derive(Debug, Clone)]
pub struct Artifact {
    /// Name of the contract
    pub contract_name: String,

    /// Source file the contract was compiled from, e.g. `contracts/DreamToken.sol`
    pub source_name: String,

    /// Contract ABI
    pub abi: Abi,

    /// Creation bytecode
    pub bytecode: Bytes,
}

impl Artifact {
    /// Parse an artifact from its JSON representation.
    ///
    /// Fails if the bytecode is empty or still has library placeholders in it.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: HardhatArtifact = serde_json::from_str(json)?;

        if !raw.link_references.is_empty() {
            let libraries = raw
                .link_references
                .iter()
                .flat_map(|(source, libs)| libs.keys().map(move |lib| format!("{source}:{lib}")))
                .collect();

            return Err(Error::UnlinkedLibraries {
                name: raw.contract_name,
                libraries,
            });
        }

        let bytecode = Bytes::from_str(&raw.bytecode).map_err(|source| Error::Bytecode {
            name: raw.contract_name.clone(),
            source,
        })?;

        if bytecode.is_empty() {
            return Err(Error::NotDeployable(raw.contract_name));
        }

        Ok(Self {
            contract_name: raw.contract_name,
            source_name: raw.source_name,
            abi: raw.abi,
            bytecode,
        })
    }

    /// Read an artifact from a file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;

        Self::from_json(&contents)
    }

    /// Name in `source:Contract` form.
    pub fn fully_qualified_name(&self) -> String {
        format!("{}:{}", self.source_name, self.contract_name)
    }
}

/// Artifacts directory of a compiled project.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    /// Create a new `ArtifactStore` over the `root` directory.
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    /// The artifacts directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Find the artifact of a contract.
    ///
    /// # Arguments
    ///
    /// * `name`: either a bare contract name (`DreamToken`) or a fully
    ///   qualified one (`contracts/DreamToken.sol:DreamToken`).
    ///
    /// Names are matched case-sensitively. A name that only differs from an
    /// existing artifact by case is reported with [`Error::CaseMismatch`].
    pub fn find(&self, name: &str) -> Result<Artifact> {
        if !self.root.is_dir() {
            return Err(Error::MissingDirectory(self.root.clone()));
        }

        if let Some((source, contract)) = name.rsplit_once(':') {
            return self.find_qualified(name, source, contract);
        }

        let mut exact = vec![];
        let mut other_case = vec![];

        self.collect(&self.root, name, &mut exact, &mut other_case)?;

        match exact.len() {
            0 => match other_case.into_iter().min() {
                Some(found) => Err(Error::CaseMismatch {
                    requested: name.to_owned(),
                    found,
                }),
                None => Err(self.not_found(name)),
            },
            1 => {
                let artifact = Artifact::from_file(&exact[0])?;
                self.check_contract_name(artifact, name, name, false)
            }
            _ => {
                let mut candidates: Vec<_> = exact
                    .iter()
                    .map(|path| self.fully_qualified_name(path, name))
                    .collect();
                candidates.sort();

                Err(Error::Ambiguous {
                    name: name.to_owned(),
                    candidates,
                })
            }
        }
    }

    fn collect(
        &self,
        dir: &Path,
        name: &str,
        exact: &mut Vec<PathBuf>,
        other_case: &mut Vec<String>,
    ) -> Result<()> {
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let file_type = entry.file_type()?;
            let path = entry.path();

            // Symlinks are not followed, a link back to a parent would never end.
            if file_type.is_symlink() {
                continue;
            }

            if file_type.is_dir() {
                if path.file_name().is_some_and(|n| n == BUILD_INFO_DIR) {
                    continue;
                }
                self.collect(&path, name, exact, other_case)?;
                continue;
            }

            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };

            if file_name.ends_with(DEBUG_FILE_SUFFIX)
                || path.extension().map_or(true, |ext| ext != ARTIFACT_EXTENSION)
            {
                continue;
            }

            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };

            if stem == name {
                exact.push(path.clone());
            } else if stem.eq_ignore_ascii_case(name) {
                other_case.push(stem.to_owned());
            }
        }

        Ok(())
    }

    // Walks `source` one component at a time using the names found on disk,
    // so the match does not depend on the case sensitivity of the filesystem.
    fn find_qualified(&self, name: &str, source: &str, contract: &str) -> Result<Artifact> {
        let mut dir = self.root.clone();
        let mut on_disk_source = vec![];
        let mut case_differs = false;

        for component in source.split('/').filter(|c| !c.is_empty()) {
            let Some((path, entry_name)) = resolve_entry(&dir, component)? else {
                return Err(self.not_found(name));
            };

            if !path.is_dir() {
                return Err(self.not_found(name));
            }

            case_differs |= entry_name != component;
            on_disk_source.push(entry_name);
            dir = path;
        }

        let file_name = format!("{contract}.{ARTIFACT_EXTENSION}");
        let Some((path, entry_name)) = resolve_entry(&dir, &file_name)? else {
            return Err(self.not_found(name));
        };

        if !path.is_file() {
            return Err(self.not_found(name));
        }

        if case_differs || entry_name != file_name {
            let on_disk_contract = entry_name
                .strip_suffix(&format!(".{ARTIFACT_EXTENSION}"))
                .unwrap_or(&entry_name);

            return Err(Error::CaseMismatch {
                requested: name.to_owned(),
                found: format!("{}:{on_disk_contract}", on_disk_source.join("/")),
            });
        }

        let artifact = Artifact::from_file(path)?;

        self.check_contract_name(artifact, name, contract, true)
    }

    // The file name is only a convention, the artifact itself says which
    // contract it holds.
    fn check_contract_name(
        &self,
        artifact: Artifact,
        requested: &str,
        contract: &str,
        qualified: bool,
    ) -> Result<Artifact> {
        if artifact.contract_name == contract {
            return Ok(artifact);
        }

        if artifact.contract_name.eq_ignore_ascii_case(contract) {
            let found = if qualified {
                artifact.fully_qualified_name()
            } else {
                artifact.contract_name
            };

            return Err(Error::CaseMismatch {
                requested: requested.to_owned(),
                found,
            });
        }

        Err(self.not_found(requested))
    }

    fn fully_qualified_name(&self, path: &Path, name: &str) -> String {
        let source = path
            .parent()
            .and_then(|p| p.strip_prefix(&self.root).ok())
            .map(|p| p.to_string_lossy().replace('\\', "/"))
            .unwrap_or_default();

        format!("{source}:{name}")
    }

    fn not_found(&self, name: &str) -> Error {
        Error::NotFound {
            name: name.to_owned(),
            root: self.root.clone(),
        }
    }
}

/// Entry of `dir` called `name`, preferring an exact match over one that
/// only differs by case. Returns the path and the name as stored on disk.
fn resolve_entry(dir: &Path, name: &str) -> Result<Option<(PathBuf, String)>> {
    let mut other_case = None;

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let Ok(entry_name) = entry.file_name().into_string() else {
            continue;
        };

        if entry_name == name {
            return Ok(Some((entry.path(), entry_name)));
        }

        if other_case.is_none() && entry_name.eq_ignore_ascii_case(name) {
            other_case = Some((entry.path(), entry_name));
        }
    }

    Ok(other_case)
}
