use std::fmt;

use ethers::types::{Address, U256};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, FromRepr};

use crate::types::WeaponId;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    FromRepr,
)]
#[repr(u8)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Rarity {
    Common = 0,
    Rare = 1,
    Epic = 2,
    Legendary = 3,
}

impl TryFrom<u8> for Rarity {
    type Error = eyre::Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_repr(value)
            .ok_or_else(|| eyre::eyre!("Unknown rarity value {value}"))
    }
}

/// Raw `getWeaponDetails` return, in ABI order.
pub type WeaponDetailsTuple = (U256, String, u8, U256, Address, U256, bool);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeaponRecord {
    pub id: WeaponId,
    pub name: String,
    pub rarity: Rarity,
    pub damage_multiplier: U256,
    pub owner: Address,
    pub price: U256,
    pub for_sale: bool,
}

impl TryFrom<WeaponDetailsTuple> for WeaponRecord {
    type Error = eyre::Error;

    fn try_from(value: WeaponDetailsTuple) -> Result<Self, Self::Error> {
        let (id, name, rarity, damage_multiplier, owner, price, for_sale) =
            value;

        let rarity = Rarity::try_from(rarity).map_err(|err| {
            err.wrap_err(format!("Weapon #{id} ({name}) has an invalid rarity"))
        })?;

        Ok(Self {
            id: WeaponId(id),
            name,
            rarity,
            damage_multiplier,
            owner,
            price,
            for_sale,
        })
    }
}

/// The one-line summary printed for each weapon, `index` counting from 1.
pub struct WeaponLine<'a> {
    pub index: usize,
    pub weapon: &'a WeaponRecord,
}

impl fmt::Display for WeaponLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "武器 {}: {} (稀有度: {}, 伤害: {})",
            self.index,
            self.weapon.name,
            self.weapon.rarity,
            self.weapon.damage_multiplier
        )
    }
}
