use ethers::types::{Address, U256};
use ethers::utils::to_checksum;
use tracing::{info, instrument};

use crate::deployment::deployment_context::Console;
use crate::deployment::DeploymentContext;

/// `format_ether` without the trailing zeros.
pub fn format_eth(wei: U256) -> String {
    let formatted = ethers::utils::format_ether(wei);

    if !formatted.contains('.') {
        return formatted;
    }

    formatted
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}

#[instrument(skip_all)]
pub async fn report_deployer(
    context: &DeploymentContext,
    console: Console<'_>,
) -> eyre::Result<Address> {
    let address = context.chain.deployer();
    let balance = context.chain.balance(address).await?;

    info!(deployer = ?address, %balance, "Deployer balance");

    writeln!(console, "部署者地址: {}", to_checksum(&address, None))?;
    writeln!(console, "部署者余额: {} ETH", format_eth(balance))?;

    Ok(address)
}
