use std::str::FromStr;

use ethers::prelude::k256::SecretKey;
use ethers::signers::LocalWallet;
use serde::{Deserialize, Deserializer};

#[derive(Debug, Clone)]
pub struct PrivateKey {
    pub key: SecretKey,
}

impl PrivateKey {
    pub fn wallet(&self) -> LocalWallet {
        LocalWallet::from(self.key.clone())
    }
}

impl FromStr for PrivateKey {
    type Err = eyre::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().trim_start_matches("0x");

        let bytes = hex::decode(s)?;

        let key = SecretKey::from_slice(&bytes)?;

        Ok(Self { key })
    }
}

impl<'de> Deserialize<'de> for PrivateKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;

        s.parse().map_err(serde::de::Error::custom)
    }
}
