use ethers::types::Address;
use tracing::instrument;

use crate::chain::Chain;
use crate::deployment::deployment_context::Console;
use crate::weapon::{WeaponLine, WeaponRecord};

/// Reads every weapon `user` owns, one `getWeaponDetails` call per id, in
/// the order the contract lists them.
#[instrument(skip(chain, console))]
pub async fn read_weapons(
    chain: &dyn Chain,
    contract: Address,
    user: Address,
    console: Console<'_>,
) -> eyre::Result<Vec<WeaponRecord>> {
    let ids = chain.user_weapons(contract, user).await?;

    writeln!(console, "初始武器数量: {}", ids.len())?;

    let mut weapons = Vec::with_capacity(ids.len());

    for (index, id) in ids.into_iter().enumerate() {
        let weapon = chain.weapon_details(contract, id).await?;

        writeln!(
            console,
            "{}",
            WeaponLine {
                index: index + 1,
                weapon: &weapon
            }
        )?;

        weapons.push(weapon);
    }

    Ok(weapons)
}
