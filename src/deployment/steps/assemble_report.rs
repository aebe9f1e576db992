use std::path::PathBuf;

use tracing::instrument;

use crate::artifacts::Artifact;
use crate::deployment::deployment_context::Console;
use crate::deployment::DeploymentContext;
use crate::report::{
    artifact_export_file, ArtifactExport, ContractInfo, CONTRACT_INFO_FILE,
};

#[derive(Debug)]
pub struct WrittenReport {
    pub contract_info_path: PathBuf,
    pub artifact_export_path: PathBuf,
}

/// Writes the contract info, then the ABI export. The two files are replaced
/// one after the other, each atomically.
#[instrument(skip_all)]
pub async fn assemble_report(
    context: &DeploymentContext,
    info: &ContractInfo,
    artifact: Artifact,
    console: Console<'_>,
) -> eyre::Result<WrittenReport> {
    tokio::fs::create_dir_all(&context.out_dir).await?;

    let contract_info_path = context.contract_info_path();
    info.write(&contract_info_path).await?;
    writeln!(console, "合约信息已保存到 {CONTRACT_INFO_FILE}")?;

    let artifact_export_path = context.artifact_export_path();
    ArtifactExport::from(artifact)
        .write(&artifact_export_path)
        .await?;
    writeln!(
        console,
        "ABI 已导出到 {}",
        artifact_export_file(&context.contract_name)
    )?;

    Ok(WrittenReport {
        contract_info_path,
        artifact_export_path,
    })
}
