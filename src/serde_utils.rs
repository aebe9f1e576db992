use std::ffi::OsString;
use std::path::{Path, PathBuf};

use eyre::WrapErr;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// EIP-55 checksummed hex, the form the deployment tooling writes addresses in.
pub mod checksum_address {
    use ethers::types::Address;
    use ethers::utils::to_checksum;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(
        address: &Address,
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&to_checksum(address, None))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Address, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;

        s.trim().parse().map_err(serde::de::Error::custom)
    }
}

pub async fn read_deserialize<T>(path: impl AsRef<Path>) -> eyre::Result<T>
where
    T: DeserializeOwned,
{
    let path = path.as_ref();

    let content = tokio::fs::read_to_string(path)
        .await
        .wrap_err_with(|| format!("Reading from {}", path.display()))?;

    let value = serde_yaml::from_str(&content).wrap_err_with(|| {
        format!("Parsing {} content was {content}", path.display())
    })?;

    Ok(value)
}

pub async fn read_json<T>(path: impl AsRef<Path>) -> eyre::Result<T>
where
    T: DeserializeOwned,
{
    let path = path.as_ref();

    let content = tokio::fs::read_to_string(path)
        .await
        .wrap_err_with(|| format!("Reading from {}", path.display()))?;

    let value = serde_json::from_str(&content)
        .wrap_err_with(|| format!("Parsing {}", path.display()))?;

    Ok(value)
}

/// Writes `value` as 2-space indented JSON.
///
/// The content goes to a sibling temporary file first and is renamed over
/// `path`, so a reader sees either the old file or the complete new one.
pub async fn write_json_atomic<T>(
    path: impl AsRef<Path>,
    value: &T,
) -> eyre::Result<()>
where
    T: Serialize,
{
    let path = path.as_ref();

    let content = serde_json::to_string_pretty(value)
        .wrap_err_with(|| format!("Serializing {}", path.display()))?;

    let tmp_path = tmp_sibling(path);

    tokio::fs::write(&tmp_path, content)
        .await
        .wrap_err_with(|| format!("Writing to {}", tmp_path.display()))?;

    if let Err(err) = tokio::fs::rename(&tmp_path, path).await {
        let _ = tokio::fs::remove_file(&tmp_path).await;

        return Err(err)
            .wrap_err_with(|| format!("Replacing {}", path.display()));
    }

    Ok(())
}

fn tmp_sibling(path: &Path) -> PathBuf {
    let mut file_name = path
        .file_name()
        .map(ToOwned::to_owned)
        .unwrap_or_else(|| OsString::from("out"));
    file_name.push(".tmp");

    path.with_file_name(file_name)
}
