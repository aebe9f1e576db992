use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use crate::artifacts::ArtifactStore;
use crate::chain::Chain;

pub struct DeploymentContext {
    pub network: String,
    pub contract_name: String,
    pub out_dir: PathBuf,
    pub chain: Arc<dyn Chain>,
    pub artifacts: Arc<dyn ArtifactStore>,
    /// Ask before deploying to a chain that isn't a local dev node
    pub confirm_remote: bool,
}

impl DeploymentContext {
    pub fn contract_info_path(&self) -> PathBuf {
        crate::report::contract_info_path(&self.out_dir)
    }

    pub fn artifact_export_path(&self) -> PathBuf {
        crate::report::artifact_export_path(&self.out_dir, &self.contract_name)
    }
}

/// Where the human readable progress lines go.
pub type Console<'a> = &'a mut (dyn Write + Send);
