use ethers::utils::to_checksum;
use tracing::{info, instrument};

use crate::artifacts::Artifact;
use crate::chain::DeployedContract;
use crate::deployment::deployment_context::Console;
use crate::deployment::DeploymentContext;

#[instrument(skip_all, fields(contract = %context.contract_name))]
pub async fn deploy(
    context: &DeploymentContext,
    artifact: &Artifact,
    console: Console<'_>,
) -> eyre::Result<DeployedContract> {
    let deployment = context.chain.deploy(artifact).await?;

    info!(
        address = ?deployment.address,
        tx = ?deployment.transaction_hash,
        "Deployed {}", context.contract_name
    );

    writeln!(console, "✅ 合约部署成功")?;
    writeln!(
        console,
        "合约地址: {}",
        to_checksum(&deployment.address, None)
    )?;

    Ok(deployment)
}
