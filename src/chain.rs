use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use ethers::contract::ContractFactory;
use ethers::middleware::SignerMiddleware;
use ethers::providers::{Http, Middleware, Provider};
use ethers::signers::Signer;
use ethers::types::{Address, Bytes, H256, U256};
use eyre::{ContextCompat, WrapErr};
use reqwest::Url;
use tracing::{info, instrument};

use crate::abis::WeedCutterNFT;
use crate::artifacts::Artifact;
use crate::cli::PrivateKey;
use crate::types::{ChainId, WeaponId};
use crate::weapon::WeaponRecord;

const DEV_POLL_INTERVAL: Duration = Duration::from_millis(200);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeployedContract {
    pub address: Address,
    pub transaction_hash: H256,
}

/// Everything the deployment needs from the node and the signing account.
#[async_trait]
pub trait Chain: Send + Sync {
    /// The account transactions are sent from.
    fn deployer(&self) -> Address;

    async fn chain_id(&self) -> eyre::Result<ChainId>;

    async fn balance(&self, address: Address) -> eyre::Result<U256>;

    async fn code(&self, address: Address) -> eyre::Result<Bytes>;

    /// Sends the creation transaction and waits for it to be confirmed.
    async fn deploy(
        &self,
        artifact: &Artifact,
    ) -> eyre::Result<DeployedContract>;

    async fn owner(&self, contract: Address) -> eyre::Result<Address>;

    async fn user_weapons(
        &self,
        contract: Address,
        user: Address,
    ) -> eyre::Result<Vec<WeaponId>>;

    async fn weapon_details(
        &self,
        contract: Address,
        weapon_id: WeaponId,
    ) -> eyre::Result<WeaponRecord>;
}

#[derive(Debug)]
pub struct EthersChain<M> {
    client: Arc<M>,
    deployer: Address,
    confirmations: usize,
}

impl<M> EthersChain<M> {
    pub fn new(
        client: Arc<M>,
        deployer: Address,
        confirmations: usize,
    ) -> Self {
        Self {
            client,
            deployer,
            confirmations,
        }
    }
}

/// Connects to `rpc_url` and picks the deploying account.
///
/// With a private key the transactions are signed locally, without one the
/// node's first unlocked account is used.
#[instrument(skip(private_key))]
pub async fn connect(
    rpc_url: &Url,
    private_key: Option<&PrivateKey>,
    expected_chain_id: Option<u64>,
    confirmations: usize,
) -> eyre::Result<Arc<dyn Chain>> {
    let provider = Provider::<Http>::try_from(rpc_url.as_str())?;

    let chain_id = provider
        .get_chainid()
        .await
        .wrap_err_with(|| format!("Connecting to {rpc_url}"))?
        .as_u64();

    if let Some(expected) = expected_chain_id {
        if expected != chain_id {
            eyre::bail!(
                "Network is configured with chain id {expected} \
                 but {rpc_url} reports {chain_id}"
            );
        }
    }

    let provider = if ChainId(chain_id).is_dev_chain() {
        provider.interval(DEV_POLL_INTERVAL)
    } else {
        provider
    };

    if let Some(private_key) = private_key {
        let wallet = private_key.wallet().with_chain_id(chain_id);
        let deployer = wallet.address();

        info!(?deployer, chain_id, "Using local signer");

        let signer = SignerMiddleware::new(provider, wallet);

        return Ok(Arc::new(EthersChain::new(
            Arc::new(signer),
            deployer,
            confirmations,
        )));
    }

    let accounts = provider
        .get_accounts()
        .await
        .wrap_err("Listing node accounts")?;

    let deployer = accounts.first().copied().with_context(|| {
        format!(
            "No wallet account available: {rpc_url} has no unlocked \
             accounts and no private key was given"
        )
    })?;

    info!(?deployer, chain_id, "Using node account");

    Ok(Arc::new(EthersChain::new(
        Arc::new(provider.with_sender(deployer)),
        deployer,
        confirmations,
    )))
}

#[async_trait]
impl<M> Chain for EthersChain<M>
where
    M: Middleware + 'static,
    M::Error: 'static,
{
    fn deployer(&self) -> Address {
        self.deployer
    }

    async fn chain_id(&self) -> eyre::Result<ChainId> {
        let chain_id = self
            .client
            .get_chainid()
            .await
            .wrap_err("Querying chain id")?;

        Ok(ChainId(chain_id.as_u64()))
    }

    async fn balance(&self, address: Address) -> eyre::Result<U256> {
        self.client
            .get_balance(address, None)
            .await
            .wrap_err_with(|| format!("Querying balance of {address:?}"))
    }

    async fn code(&self, address: Address) -> eyre::Result<Bytes> {
        self.client
            .get_code(address, None)
            .await
            .wrap_err_with(|| format!("Querying code at {address:?}"))
    }

    #[instrument(
        name = "deploy_contract",
        skip_all,
        fields(contract = %artifact.contract_name)
    )]
    async fn deploy(
        &self,
        artifact: &Artifact,
    ) -> eyre::Result<DeployedContract> {
        let factory = ContractFactory::new(
            artifact.parsed_abi()?,
            artifact.creation_code()?,
            self.client.clone(),
        );

        let (contract, receipt) = factory
            .deploy(())?
            .confirmations(self.confirmations)
            .send_with_receipt()
            .await
            .wrap_err_with(|| format!("Deploying {}", artifact.contract_name))?;

        info!(
            address = ?contract.address(),
            tx = ?receipt.transaction_hash,
            gas_used = ?receipt.gas_used,
            "Deployment confirmed"
        );

        Ok(DeployedContract {
            address: contract.address(),
            transaction_hash: receipt.transaction_hash,
        })
    }

    async fn owner(&self, contract: Address) -> eyre::Result<Address> {
        WeedCutterNFT::new(contract, self.client.clone())
            .owner()
            .call()
            .await
            .wrap_err("Reading owner()")
    }

    async fn user_weapons(
        &self,
        contract: Address,
        user: Address,
    ) -> eyre::Result<Vec<WeaponId>> {
        let ids = WeedCutterNFT::new(contract, self.client.clone())
            .get_user_weapons(user)
            .call()
            .await
            .wrap_err_with(|| format!("Reading getUserWeapons({user:?})"))?;

        Ok(ids.into_iter().map(WeaponId).collect())
    }

    async fn weapon_details(
        &self,
        contract: Address,
        weapon_id: WeaponId,
    ) -> eyre::Result<WeaponRecord> {
        let details = WeedCutterNFT::new(contract, self.client.clone())
            .get_weapon_details(weapon_id.0)
            .call()
            .await
            .wrap_err_with(|| {
                format!("Reading getWeaponDetails({weapon_id})")
            })?;

        WeaponRecord::try_from(details)
    }
}
