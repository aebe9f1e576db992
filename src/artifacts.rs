use std::path::{Path, PathBuf};

use async_trait::async_trait;
use ethers::abi::Abi;
use ethers::types::Bytes;
use eyre::WrapErr;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::forge_utils::ForgeInspect;
use crate::serde_utils;

/// A compiled contract as the build tool recorded it.
///
/// `abi` and `bytecode` are kept verbatim so they can be re-exported without
/// changing a byte.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    pub contract_name: String,
    pub abi: serde_json::Value,
    pub bytecode: String,
}

impl Artifact {
    pub fn parsed_abi(&self) -> eyre::Result<Abi> {
        serde_json::from_value(self.abi.clone()).wrap_err_with(|| {
            format!("Parsing the ABI of {}", self.contract_name)
        })
    }

    pub fn creation_code(&self) -> eyre::Result<Bytes> {
        let hex = self.bytecode.trim();

        if hex.trim_start_matches("0x").is_empty() {
            eyre::bail!(
                "{} has no bytecode, is it abstract or an interface?",
                self.contract_name
            );
        }

        if hex.contains("__$") {
            eyre::bail!(
                "{} has unlinked library references",
                self.contract_name
            );
        }

        hex.parse().wrap_err_with(|| {
            format!("Decoding the bytecode of {}", self.contract_name)
        })
    }
}

#[async_trait]
pub trait ArtifactStore: Send + Sync {
    async fn read_artifact(
        &self,
        contract_name: &str,
    ) -> eyre::Result<Artifact>;
}

/// Reads `artifacts/**/<Name>.json` files as written by `hardhat compile`.
#[derive(Debug, Clone)]
pub struct HardhatArtifacts {
    root: PathBuf,
}

impl HardhatArtifacts {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_owned(),
        }
    }

    async fn candidates(
        &self,
        contract_name: &str,
    ) -> eyre::Result<Vec<PathBuf>> {
        let file_name = format!("{contract_name}.json");

        let mut found = vec![];
        let mut pending = vec![self.root.clone()];

        while let Some(dir) = pending.pop() {
            let mut entries = tokio::fs::read_dir(&dir)
                .await
                .wrap_err_with(|| format!("Listing {}", dir.display()))?;

            while let Some(entry) = entries.next_entry().await? {
                let path = entry.path();

                if entry.file_type().await?.is_dir() {
                    if entry.file_name() != "build-info" {
                        pending.push(path);
                    }
                } else if entry.file_name().to_string_lossy() == file_name {
                    found.push(path);
                }
            }
        }

        found.sort();

        Ok(found)
    }
}

#[async_trait]
impl ArtifactStore for HardhatArtifacts {
    #[instrument(name = "hardhat_artifact", skip(self))]
    async fn read_artifact(
        &self,
        contract_name: &str,
    ) -> eyre::Result<Artifact> {
        let mut matches = vec![];

        for path in self.candidates(contract_name).await? {
            let artifact: Artifact = serde_utils::read_json(&path).await?;

            if artifact.contract_name == contract_name {
                debug!("Found artifact at {}", path.display());
                matches.push((path, artifact));
            }
        }

        match matches.len() {
            0 => eyre::bail!(
                "Artifact for {contract_name} not found in {}",
                self.root.display()
            ),
            1 => Ok(matches.remove(0).1),
            _ => {
                let paths: Vec<_> = matches
                    .iter()
                    .map(|(path, _)| path.display().to_string())
                    .collect();

                eyre::bail!(
                    "Ambiguous artifact {contract_name}, found: {}",
                    paths.join(", ")
                )
            }
        }
    }
}

/// Asks `forge inspect` in a foundry project.
#[derive(Debug, Clone)]
pub struct ForgeArtifacts {
    cwd: PathBuf,
}

impl ForgeArtifacts {
    pub fn new(cwd: impl AsRef<Path>) -> Self {
        Self {
            cwd: cwd.as_ref().to_owned(),
        }
    }
}

#[async_trait]
impl ArtifactStore for ForgeArtifacts {
    #[instrument(name = "forge_artifact", skip(self))]
    async fn read_artifact(
        &self,
        contract_name: &str,
    ) -> eyre::Result<Artifact> {
        let abi = ForgeInspect::abi(contract_name)
            .with_cwd(&self.cwd)
            .run()
            .await?;
        let abi = serde_json::from_str(&abi)
            .wrap_err("Parsing forge inspect abi output")?;

        let bytecode = ForgeInspect::bytecode(contract_name)
            .with_cwd(&self.cwd)
            .run()
            .await?;

        Ok(Artifact {
            contract_name: contract_name.to_string(),
            abi,
            bytecode,
        })
    }
}

#[cfg(test)]
pub mod test_utils {
    use serde_json::json;

    use super::*;

    /// Serves one artifact from memory.
    pub struct FixedArtifact(pub Artifact);

    #[async_trait]
    impl ArtifactStore for FixedArtifact {
        async fn read_artifact(
            &self,
            contract_name: &str,
        ) -> eyre::Result<Artifact> {
            if self.0.contract_name != contract_name {
                eyre::bail!("Artifact for {contract_name} not found");
            }

            Ok(self.0.clone())
        }
    }

    pub const BYTECODE: &str = "0x6080604052348015600f57600080fd5b50";

    pub fn weed_cutter_artifact() -> Artifact {
        Artifact {
            contract_name: "WeedCutterNFT".to_string(),
            abi: json!([
                {
                    "inputs": [],
                    "stateMutability": "nonpayable",
                    "type": "constructor"
                },
                {
                    "inputs": [
                        { "internalType": "address", "name": "user", "type": "address" }
                    ],
                    "name": "getUserWeapons",
                    "outputs": [
                        { "internalType": "uint256[]", "name": "", "type": "uint256[]" }
                    ],
                    "stateMutability": "view",
                    "type": "function"
                }
            ]),
            bytecode: BYTECODE.to_string(),
        }
    }

    pub fn hardhat_json(artifact: &Artifact) -> serde_json::Value {
        json!({
            "_format": "hh-sol-artifact-1",
            "contractName": artifact.contract_name,
            "sourceName": format!("contracts/{}.sol", artifact.contract_name),
            "abi": artifact.abi,
            "bytecode": artifact.bytecode,
            "deployedBytecode": "0x",
            "linkReferences": {},
            "deployedLinkReferences": {}
        })
    }
}
