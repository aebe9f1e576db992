use std::path::{Path, PathBuf};

use ethers::abi::Abi;
use ethers::types::Address;
use ethers::utils::to_checksum;
use tracing::{info, instrument, warn};

use crate::chain::Chain;
use crate::cli::Args;
use crate::deployment::deployment_context::Console;
use crate::deployment::steps::initial_weapons;
use crate::report::{
    artifact_export_file, ArtifactExport, ContractInfo, CONTRACT_INFO_FILE,
};
use crate::serde_utils;
use crate::weapon::WeaponRecord;

/// Searched after the out dir itself, where the game client also looks.
const FALLBACK_DIR: &str = "scripts";

const REQUIRED_FUNCTIONS: [&str; 2] = ["getUserWeapons", "getWeaponDetails"];

#[derive(Debug)]
pub struct Status {
    pub info: ContractInfo,
    pub info_path: PathBuf,
    pub export_path: PathBuf,
    pub chain_id_matches: bool,
    pub owner: Option<Address>,
    pub weapons: Vec<WeaponRecord>,
}

fn candidates(out_dir: &Path, file_name: &str) -> [PathBuf; 2] {
    [
        out_dir.join(file_name),
        out_dir.join(FALLBACK_DIR).join(file_name),
    ]
}

fn not_found(what: &str, errors: &[String]) -> eyre::Report {
    eyre::eyre!("No usable {what} found: {}", errors.join(" | "))
}

async fn load_export(
    out_dir: &Path,
    contract_name: &str,
) -> eyre::Result<(PathBuf, ArtifactExport)> {
    let mut errors = vec![];

    for path in candidates(out_dir, &artifact_export_file(contract_name)) {
        if !path.exists() {
            errors.push(format!("{}: missing", path.display()));
            continue;
        }

        let export: ArtifactExport = match serde_utils::read_json(&path).await {
            Ok(export) => export,
            Err(err) => {
                errors.push(format!("{}: {err:#}", path.display()));
                continue;
            }
        };

        let abi: Abi = match serde_json::from_value(export.abi.clone()) {
            Ok(abi) => abi,
            Err(err) => {
                errors.push(format!("{}: invalid abi ({err})", path.display()));
                continue;
            }
        };

        if let Some(missing) = REQUIRED_FUNCTIONS
            .iter()
            .find(|name| abi.function(name).is_err())
        {
            errors.push(format!("{}: abi has no {missing}", path.display()));
            continue;
        }

        return Ok((path, export));
    }

    Err(not_found("ABI export", &errors))
}

async fn load_contract_info(
    chain: &dyn Chain,
    out_dir: &Path,
) -> eyre::Result<(PathBuf, ContractInfo)> {
    let mut errors = vec![];

    for path in candidates(out_dir, CONTRACT_INFO_FILE) {
        if !path.exists() {
            errors.push(format!("{}: missing", path.display()));
            continue;
        }

        let info: ContractInfo = match serde_utils::read_json(&path).await {
            Ok(info) => info,
            Err(err) => {
                errors.push(format!("{}: {err:#}", path.display()));
                continue;
            }
        };

        let code = chain.code(info.address).await?;

        if code.iter().all(|byte| *byte == 0) {
            errors.push(format!(
                "{}: no contract deployed at {:?}",
                path.display(),
                info.address
            ));
            continue;
        }

        return Ok((path, info));
    }

    Err(not_found("contract info", &errors))
}

/// Checks the files a deployment left in `out_dir` against the chain.
#[instrument(skip(chain, console))]
pub async fn check(
    chain: &dyn Chain,
    out_dir: &Path,
    contract_name: &str,
    console: Console<'_>,
) -> eyre::Result<Status> {
    let (export_path, _) = load_export(out_dir, contract_name).await?;
    writeln!(console, "ABI: {}", export_path.display())?;

    let (info_path, info) = load_contract_info(chain, out_dir).await?;
    writeln!(console, "合约信息: {}", info_path.display())?;
    writeln!(console, "合约地址: {}", to_checksum(&info.address, None))?;
    writeln!(console, "部署网络: {} ({})", info.network, info.chain_id)?;

    let chain_id = chain.chain_id().await?;
    let chain_id_matches = chain_id == info.chain_id;

    if !chain_id_matches {
        warn!(
            recorded = %info.chain_id,
            connected = %chain_id,
            "Chain id mismatch"
        );
        writeln!(
            console,
            "⚠️ 记录的 chainId {} 与当前网络 {} 不一致",
            info.chain_id, chain_id
        )?;
    }

    let owner = match chain.owner(info.address).await {
        Ok(owner) => {
            let owner_address = to_checksum(&owner, None);
            writeln!(console, "合约所有者: {owner_address}")?;
            Some(owner)
        }
        Err(err) => {
            warn!("Failed to read owner: {err:#}");
            writeln!(console, "⚠️ 无法读取合约所有者: {err:#}")?;
            None
        }
    };

    let account = chain.deployer();
    writeln!(console, "当前账户: {}", to_checksum(&account, None))?;

    let weapons =
        initial_weapons::read_weapons(chain, info.address, account, console)
            .await?;

    Ok(Status {
        info,
        info_path,
        export_path,
        chain_id_matches,
        owner,
        weapons,
    })
}

pub async fn run_status(args: &Args) -> eyre::Result<()> {
    let chain = crate::deployment::connect(args).await?;

    let mut stdout = std::io::stdout();

    let status =
        check(chain.as_ref(), &args.out_dir, &args.contract_name, &mut stdout)
            .await?;

    info!(
        address = ?status.info.address,
        chain_id_matches = status.chain_id_matches,
        owner = ?status.owner,
        weapons = status.weapons.len(),
        contract_info = %status.info_path.display(),
        artifact_export = %status.export_path.display(),
        "Status checked"
    );

    Ok(())
}
