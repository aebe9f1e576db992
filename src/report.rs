use std::path::{Path, PathBuf};

use ethers::types::Address;
use serde::{Deserialize, Serialize};

use crate::artifacts::Artifact;
use crate::serde_utils::{self, checksum_address};
use crate::types::ChainId;

pub const CONTRACT_INFO_FILE: &str = "contract-info.json";

/// Where a deployment landed, as read by the game client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractInfo {
    #[serde(with = "checksum_address")]
    pub address: Address,
    #[serde(with = "checksum_address")]
    pub deployer: Address,
    pub network: String,
    #[serde(rename = "chainId")]
    pub chain_id: ChainId,
}

/// The ABI and creation bytecode snapshot written next to the contract info.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactExport {
    pub abi: serde_json::Value,
    pub bytecode: String,
}

impl From<Artifact> for ArtifactExport {
    fn from(value: Artifact) -> Self {
        Self {
            abi: value.abi,
            bytecode: value.bytecode,
        }
    }
}

pub fn artifact_export_file(contract_name: &str) -> String {
    format!("{contract_name}.json")
}

pub fn contract_info_path(out_dir: impl AsRef<Path>) -> PathBuf {
    out_dir.as_ref().join(CONTRACT_INFO_FILE)
}

pub fn artifact_export_path(
    out_dir: impl AsRef<Path>,
    contract_name: &str,
) -> PathBuf {
    out_dir.as_ref().join(artifact_export_file(contract_name))
}

impl ContractInfo {
    pub async fn write(&self, path: impl AsRef<Path>) -> eyre::Result<()> {
        serde_utils::write_json_atomic(path, self).await
    }
}

impl ArtifactExport {
    pub async fn write(&self, path: impl AsRef<Path>) -> eyre::Result<()> {
        serde_utils::write_json_atomic(path, self).await
    }
}
