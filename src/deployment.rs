use std::sync::Arc;

use tracing::{info, instrument};

use self::deployment_context::Console;
use self::steps::assemble_report::{self, WrittenReport};
use self::steps::{deployer, initial_weapons, weed_cutter};
use crate::artifacts::{ArtifactStore, ForgeArtifacts, HardhatArtifacts};
use crate::chain::{self, Chain, DeployedContract};
use crate::cli::{ArtifactSource, Args};
use crate::config::Config;
use crate::report::ContractInfo;
use crate::weapon::WeaponRecord;

pub mod deployment_context;
pub mod steps;

pub use self::deployment_context::DeploymentContext;

#[derive(Debug)]
pub struct Deployment {
    pub contract: DeployedContract,
    pub info: ContractInfo,
    pub weapons: Vec<WeaponRecord>,
    pub report: WrittenReport,
}

/// Resolves the selected network and connects to it.
pub async fn connect(args: &Args) -> eyre::Result<Arc<dyn Chain>> {
    let config = Config::load(&args.config).await?;
    let network = config.network(&args.network)?;

    let rpc_url = match args.rpc_url.as_ref() {
        Some(rpc_url) => rpc_url.clone(),
        None => network.rpc_url()?,
    };

    let private_key = args.private_key.as_ref().or(network.accounts.first());

    chain::connect(
        &rpc_url,
        private_key,
        network.chain_id,
        network.confirmations,
    )
    .await
}

pub fn artifact_store(args: &Args) -> Arc<dyn ArtifactStore> {
    let dir = args.artifacts_dir();

    match args.artifacts {
        ArtifactSource::Hardhat => Arc::new(HardhatArtifacts::new(dir)),
        ArtifactSource::Forge => Arc::new(ForgeArtifacts::new(dir)),
    }
}

pub async fn run_deployment(args: &Args) -> eyre::Result<()> {
    let chain = connect(args).await?;

    let context = DeploymentContext {
        network: args.network.clone(),
        contract_name: args.contract_name.clone(),
        out_dir: args.out_dir.clone(),
        chain,
        artifacts: artifact_store(args),
        confirm_remote: !args.yes,
    };

    let mut stdout = std::io::stdout();

    if let Some(deployment) = run(&context, &mut stdout).await? {
        info!(
            address = ?deployment.contract.address,
            tx = ?deployment.contract.transaction_hash,
            chain_id = %deployment.info.chain_id,
            weapons = deployment.weapons.len(),
            contract_info = %deployment.report.contract_info_path.display(),
            artifact_export = %deployment.report.artifact_export_path.display(),
            "Deployment complete"
        );
    }

    Ok(())
}

/// Deploys the contract and writes its report files.
///
/// Returns `None` when the deployment was declined at the confirmation
/// prompt. Nothing is written unless every chain call succeeded.
#[instrument(name = "deployment", skip_all, fields(network = %context.network))]
pub async fn run(
    context: &DeploymentContext,
    console: Console<'_>,
) -> eyre::Result<Option<Deployment>> {
    writeln!(console, "开始部署 {} 合约...", context.contract_name)?;

    let deployer = deployer::report_deployer(context, console).await?;

    let artifact = context
        .artifacts
        .read_artifact(&context.contract_name)
        .await?;

    if context.confirm_remote && !confirm_deployment(context).await? {
        writeln!(console, "已取消部署")?;
        return Ok(None);
    }

    let contract = weed_cutter::deploy(context, &artifact, console).await?;

    let weapons = initial_weapons::read_weapons(
        context.chain.as_ref(),
        contract.address,
        deployer,
        console,
    )
    .await?;

    let chain_id = context.chain.chain_id().await?;

    let info = ContractInfo {
        address: contract.address,
        deployer,
        network: context.network.clone(),
        chain_id,
    };

    let report =
        assemble_report::assemble_report(context, &info, artifact, console)
            .await?;

    Ok(Some(Deployment {
        contract,
        info,
        weapons,
        report,
    }))
}

async fn confirm_deployment(context: &DeploymentContext) -> eyre::Result<bool> {
    let chain_id = context.chain.chain_id().await?;

    if chain_id.is_dev_chain() {
        return Ok(true);
    }

    let confirmed = inquire::Confirm::new(&format!(
        "Deploy {} to {} (chain id {chain_id})?",
        context.contract_name, context.network
    ))
    .with_default(false)
    .prompt()?;

    Ok(confirmed)
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use ethers::utils::to_checksum;

    use super::*;
    use crate::artifacts::test_utils::{
        weed_cutter_artifact, FixedArtifact, BYTECODE,
    };
    use crate::chain::test_utils::{weapon, FakeChain};
    use crate::report::ArtifactExport;
    use crate::serde_utils;
    use crate::types::ChainId;
    use crate::weapon::Rarity;

    fn context(chain: Arc<FakeChain>, out_dir: &Path) -> DeploymentContext {
        DeploymentContext {
            network: "localhost".to_string(),
            contract_name: "WeedCutterNFT".to_string(),
            out_dir: out_dir.to_owned(),
            chain,
            artifacts: Arc::new(FixedArtifact(weed_cutter_artifact())),
            confirm_remote: false,
        }
    }

    fn starter_weapons() -> Vec<crate::weapon::WeaponDetailsTuple> {
        vec![
            weapon(1, "Wooden Sickle", 0, 100),
            weapon(2, "Steel Axe", 2, 180),
        ]
    }

    #[tokio::test]
    async fn successful_run_writes_both_files() {
        let dir = tempfile::tempdir().unwrap();
        let chain = Arc::new(FakeChain::funded(starter_weapons()));
        let context = context(chain.clone(), dir.path());

        let mut console = Vec::<u8>::new();
        let deployment = run(&context, &mut console).await.unwrap().unwrap();

        let info: ContractInfo =
            serde_utils::read_json(dir.path().join("contract-info.json"))
                .await
                .unwrap();
        assert_eq!(info.address, deployment.contract.address);
        assert_eq!(info.deployer, chain.deployer);
        assert_eq!(info.network, "localhost");
        assert_eq!(*info.chain_id, 31337);

        let export: ArtifactExport =
            serde_utils::read_json(dir.path().join("WeedCutterNFT.json"))
                .await
                .unwrap();
        assert!(!export.bytecode.is_empty());
        assert_eq!(export.bytecode, BYTECODE);
        assert_eq!(export.abi, weed_cutter_artifact().abi);

        assert_eq!(
            deployment.report.contract_info_path,
            dir.path().join("contract-info.json")
        );
        assert_eq!(chain.deployment_count(), 1);
    }

    #[tokio::test]
    async fn console_output_walks_through_every_step() {
        let dir = tempfile::tempdir().unwrap();
        let chain = Arc::new(FakeChain::funded(starter_weapons()));
        let context = context(chain.clone(), dir.path());

        let mut console = Vec::<u8>::new();
        let deployment = run(&context, &mut console).await.unwrap().unwrap();
        let console = String::from_utf8(console).unwrap();

        let expected = format!(
            "开始部署 WeedCutterNFT 合约...\n\
             部署者地址: {}\n\
             部署者余额: 10000 ETH\n\
             ✅ 合约部署成功\n\
             合约地址: {}\n\
             初始武器数量: 2\n\
             武器 1: Wooden Sickle (稀有度: COMMON, 伤害: 100)\n\
             武器 2: Steel Axe (稀有度: EPIC, 伤害: 180)\n\
             合约信息已保存到 contract-info.json\n\
             ABI 已导出到 WeedCutterNFT.json\n",
            to_checksum(&chain.deployer, None),
            to_checksum(&deployment.contract.address, None)
        );
        assert_eq!(console, expected);

        assert_eq!(
            deployment
                .weapons
                .iter()
                .map(|weapon| weapon.rarity)
                .collect::<Vec<_>>(),
            [Rarity::Common, Rarity::Epic]
        );
    }

    #[tokio::test]
    async fn failed_deploy_leaves_previous_files_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let info_path = dir.path().join("contract-info.json");
        std::fs::write(&info_path, "previous info").unwrap();

        let chain = Arc::new(FakeChain::broke());
        let context = context(chain.clone(), dir.path());

        let mut console = Vec::<u8>::new();
        let err = run(&context, &mut console).await.unwrap_err();

        assert!(err.to_string().contains("insufficient funds"));
        assert_eq!(
            std::fs::read_to_string(&info_path).unwrap(),
            "previous info"
        );
        assert!(!dir.path().join("WeedCutterNFT.json").exists());
        assert_eq!(chain.deployment_count(), 0);
    }

    #[tokio::test]
    async fn failed_deploy_creates_no_files() {
        let dir = tempfile::tempdir().unwrap();
        let context = context(Arc::new(FakeChain::broke()), dir.path());

        let mut console = Vec::<u8>::new();
        assert!(run(&context, &mut console).await.is_err());

        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn second_run_replaces_the_first() {
        let dir = tempfile::tempdir().unwrap();
        let chain = Arc::new(FakeChain::funded(starter_weapons()));
        let context = context(chain, dir.path());

        let first =
            run(&context, &mut Vec::<u8>::new()).await.unwrap().unwrap();
        let second =
            run(&context, &mut Vec::<u8>::new()).await.unwrap().unwrap();

        assert_ne!(first.contract.address, second.contract.address);

        let info: ContractInfo =
            serde_utils::read_json(dir.path().join("contract-info.json"))
                .await
                .unwrap();
        assert_eq!(info, second.info);
    }

    #[tokio::test]
    async fn unknown_rarity_aborts_before_writing() {
        let dir = tempfile::tempdir().unwrap();
        let chain =
            Arc::new(FakeChain::funded(vec![weapon(1, "Glitch", 4, 1)]));
        let context = context(chain.clone(), dir.path());

        let err = run(&context, &mut Vec::<u8>::new()).await.unwrap_err();

        assert_eq!(err.root_cause().to_string(), "Unknown rarity value 4");
        assert_eq!(chain.deployment_count(), 1);
        assert!(!dir.path().join("contract-info.json").exists());
    }

    #[tokio::test]
    async fn missing_artifact_fails_before_deploying() {
        let dir = tempfile::tempdir().unwrap();
        let chain = Arc::new(FakeChain::funded(starter_weapons()));
        let mut context = context(chain.clone(), dir.path());
        context.contract_name = "SomethingElse".to_string();

        let err = run(&context, &mut Vec::<u8>::new()).await.unwrap_err();

        assert!(err.to_string().contains("SomethingElse"));
        assert_eq!(chain.deployment_count(), 0);
    }

    #[tokio::test]
    async fn creates_missing_out_dir() {
        let dir = tempfile::tempdir().unwrap();
        let out_dir = dir.path().join("scripts");
        let context = context(Arc::new(FakeChain::funded(vec![])), &out_dir);

        run(&context, &mut Vec::<u8>::new()).await.unwrap().unwrap();

        assert!(out_dir.join("contract-info.json").exists());
        assert!(out_dir.join("WeedCutterNFT.json").exists());
    }

    #[tokio::test]
    async fn dev_chain_deploys_without_asking() {
        let dir = tempfile::tempdir().unwrap();
        let chain = Arc::new(FakeChain::funded(starter_weapons()));
        let mut context = context(chain.clone(), dir.path());
        context.confirm_remote = true;

        let mut console = Vec::<u8>::new();
        let deployment = run(&context, &mut console).await.unwrap();

        assert!(deployment.is_some());
        assert_eq!(chain.deployment_count(), 1);
        let console = String::from_utf8(console).unwrap();
        assert!(!console.contains("已取消部署"));
    }

    #[tokio::test]
    async fn remote_chain_deploys_when_confirmation_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let mut chain = FakeChain::funded(starter_weapons());
        chain.chain_id = ChainId(11155111);
        let chain = Arc::new(chain);

        let mut context = context(chain.clone(), dir.path());
        context.network = "sepolia".to_string();

        let deployment =
            run(&context, &mut Vec::<u8>::new()).await.unwrap().unwrap();

        assert_eq!(chain.deployment_count(), 1);
        assert_eq!(deployment.info.network, "sepolia");
        assert_eq!(deployment.info.chain_id, ChainId(11155111));
    }
}
