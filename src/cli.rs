use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use reqwest::Url;

pub mod private_key;

pub use private_key::PrivateKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[clap(rename_all = "kebab-case")]
pub enum ArtifactSource {
    Hardhat,
    Forge,
}

#[derive(Debug, Clone, Default, Subcommand)]
#[clap(rename_all = "kebab-case")]
pub enum Command {
    /// Deploy the contract and export its receipt and ABI
    #[default]
    Deploy,
    /// Check a previous deployment against the connected chain
    Status,
}

#[derive(Debug, Clone, Parser)]
#[clap(rename_all = "kebab-case")]
pub struct Args {
    #[clap(subcommand)]
    pub command: Option<Command>,

    /// Name of the target network, looked up in the network config
    #[clap(short, long, env, default_value = "localhost")]
    pub network: String,

    /// Path to the network configuration file
    #[clap(
        short,
        long,
        env = "NETWORKS_CONFIG",
        default_value = "networks.yml"
    )]
    pub config: PathBuf,

    /// Overrides the network's RPC url
    #[clap(short, long, env)]
    pub rpc_url: Option<Url>,

    /// Private key of the deployer
    ///
    /// When omitted the network's configured accounts are used, then the
    /// node's own unlocked accounts
    #[clap(short, long, env)]
    pub private_key: Option<PrivateKey>,

    /// Where compiled contract artifacts come from
    #[clap(long, env, default_value = "hardhat")]
    pub artifacts: ArtifactSource,

    /// Hardhat artifacts directory, or the forge project root
    ///
    /// Defaults to `artifacts` for hardhat and `.` for forge
    #[clap(long, env)]
    pub artifacts_dir: Option<PathBuf>,

    /// The contract to deploy
    #[clap(long, env, default_value = "WeedCutterNFT")]
    pub contract_name: String,

    /// Directory the JSON outputs are written to
    #[clap(short, long, env = "DEPLOY_OUT_DIR", default_value = ".")]
    pub out_dir: PathBuf,

    /// Don't ask for confirmation before deploying to a non-local chain
    #[clap(short, long)]
    pub yes: bool,
}

impl ArtifactSource {
    pub fn default_dir(&self) -> PathBuf {
        match self {
            Self::Hardhat => PathBuf::from("artifacts"),
            Self::Forge => PathBuf::from("."),
        }
    }
}

impl Args {
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or_default()
    }

    pub fn artifacts_dir(&self) -> PathBuf {
        self.artifacts_dir
            .clone()
            .unwrap_or_else(|| self.artifacts.default_dir())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_deploy_on_localhost() {
        let args = Args::try_parse_from(["weed-cutter-deployer"]).unwrap();

        assert!(matches!(args.command(), Command::Deploy));
        assert_eq!(args.network, "localhost");
        assert_eq!(args.contract_name, "WeedCutterNFT");
        assert_eq!(args.artifacts, ArtifactSource::Hardhat);
        assert_eq!(args.artifacts_dir(), PathBuf::from("artifacts"));
        assert_eq!(args.out_dir, PathBuf::from("."));
        assert!(!args.yes);
    }

    #[test]
    fn parses_status_with_network() {
        let args = Args::try_parse_from([
            "weed-cutter-deployer",
            "--network",
            "sepolia",
            "--artifacts",
            "forge",
            "status",
        ])
        .unwrap();

        assert!(matches!(args.command(), Command::Status));
        assert_eq!(args.network, "sepolia");
        assert_eq!(args.artifacts, ArtifactSource::Forge);
    }

    #[test]
    fn forge_artifacts_default_to_the_project_root() {
        let args = Args::try_parse_from([
            "weed-cutter-deployer",
            "--artifacts",
            "forge",
        ])
        .unwrap();

        assert_eq!(args.artifacts_dir(), PathBuf::from("."));
    }

    #[test]
    fn explicit_artifacts_dir_wins() {
        let args = Args::try_parse_from([
            "weed-cutter-deployer",
            "--artifacts",
            "forge",
            "--artifacts-dir",
            "contracts",
        ])
        .unwrap();

        assert_eq!(args.artifacts_dir(), PathBuf::from("contracts"));
    }
}
