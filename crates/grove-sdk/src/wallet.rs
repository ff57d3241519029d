//! Wallet capability: something that can sign and submit a transaction on
//! behalf of the user and tell us which address it acts for.

use std::future::Future;

use ethers::middleware::SignerMiddleware;
use ethers::providers::{Http, JsonRpcClient, Middleware, PendingTransaction, Provider};
use ethers::signers::{LocalWallet, Signer};
use ethers::types::{Address, Bytes, H256, TransactionRequest, U256};
use serde::Serialize;

use crate::config::ChainConfig;
use crate::error::{Error, Result};

/// The `{to, data, value?}` triple handed to the wallet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TxRequest {
    pub to: Address,
    pub data: Bytes,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<U256>,
}

impl TxRequest {
    fn into_request(self, from: Option<Address>) -> TransactionRequest {
        let mut request = TransactionRequest::new().to(self.to).data(self.data);
        if let Some(value) = self.value {
            request = request.value(value);
        }
        if let Some(from) = from {
            request = request.from(from);
        }
        request
    }
}

pub trait Wallet: Send + Sync + 'static {
    /// Address the wallet signs for.
    fn address(&self) -> Address;

    /// Submit the transaction and wait until it is mined.
    ///
    /// Resolves to the transaction hash once the receipt reports success.
    fn send_transaction(&self, tx: TxRequest) -> impl Future<Output = Result<H256>> + Send;
}

/// Account managed by the node behind the RPC endpoint (`eth_sendTransaction`).
pub struct RpcWallet {
    provider: Provider<Http>,
    from: Address,
}

impl RpcWallet {
    pub fn new(rpc_url: &str, from: Address) -> Result<Self> {
        let provider = Provider::<Http>::try_from(rpc_url)
            .map_err(|e| Error::Config(format!("invalid rpc url {rpc_url}: {e}")))?;
        Ok(Self { provider, from })
    }

    /// First account the node exposes, if any.
    pub async fn detect(rpc_url: &str) -> Result<Option<Self>> {
        let provider = Provider::<Http>::try_from(rpc_url)
            .map_err(|e| Error::Config(format!("invalid rpc url {rpc_url}: {e}")))?;
        let accounts = provider
            .get_accounts()
            .await
            .map_err(|e| Error::Rpc(e.to_string()))?;
        Ok(accounts
            .into_iter()
            .next()
            .map(|from| Self { provider, from }))
    }
}

impl Wallet for RpcWallet {
    fn address(&self) -> Address {
        self.from
    }

    async fn send_transaction(&self, tx: TxRequest) -> Result<H256> {
        let pending = self
            .provider
            .send_transaction(tx.into_request(Some(self.from)), None)
            .await
            .map_err(|e| Error::Wallet(e.to_string()))?;
        confirm(pending).await
    }
}

/// Local private key signing through `SignerMiddleware`.
pub struct KeyWallet {
    client: SignerMiddleware<Provider<Http>, LocalWallet>,
}

impl KeyWallet {
    pub fn new(rpc_url: &str, private_key: &str, chain_id: u64) -> Result<Self> {
        let provider = Provider::<Http>::try_from(rpc_url)
            .map_err(|e| Error::Config(format!("invalid rpc url {rpc_url}: {e}")))?;
        let signer = private_key
            .trim()
            .parse::<LocalWallet>()
            .map_err(|e| Error::Wallet(format!("invalid private key: {e}")))?
            .with_chain_id(chain_id);
        Ok(Self {
            client: SignerMiddleware::new(provider, signer),
        })
    }
}

impl Wallet for KeyWallet {
    fn address(&self) -> Address {
        self.client.address()
    }

    async fn send_transaction(&self, tx: TxRequest) -> Result<H256> {
        let pending = self
            .client
            .send_transaction(tx.into_request(None), None)
            .await
            .map_err(|e| Error::Wallet(e.to_string()))?;
        confirm(pending).await
    }
}

async fn confirm<P: JsonRpcClient>(pending: PendingTransaction<'_, P>) -> Result<H256> {
    let hash = *pending;
    log::info!("transaction {hash:#x} submitted, waiting for receipt");
    match pending.await {
        Ok(Some(receipt)) if receipt.status.unwrap_or_default().as_u64() == 1 => Ok(hash),
        Ok(Some(_)) => Err(Error::Reverted(format!("{hash:#x}"))),
        Ok(None) => Err(Error::NoReceipt(format!("{hash:#x}"))),
        Err(e) => Err(Error::Wallet(e.to_string())),
    }
}

/// Whichever wallet the environment provides.
pub enum ConnectedWallet {
    Key(KeyWallet),
    Rpc(RpcWallet),
}

impl Wallet for ConnectedWallet {
    fn address(&self) -> Address {
        match self {
            ConnectedWallet::Key(w) => w.address(),
            ConnectedWallet::Rpc(w) => w.address(),
        }
    }

    async fn send_transaction(&self, tx: TxRequest) -> Result<H256> {
        match self {
            ConnectedWallet::Key(w) => w.send_transaction(tx).await,
            ConnectedWallet::Rpc(w) => w.send_transaction(tx).await,
        }
    }
}

/// Result of asking whether a wallet can be used.
pub enum WalletAvailability<W = ConnectedWallet> {
    Present(W),
    Absent,
}

impl<W> WalletAvailability<W> {
    pub fn into_option(self) -> Option<W> {
        match self {
            WalletAvailability::Present(w) => Some(w),
            WalletAvailability::Absent => None,
        }
    }
}

/// A configured private key wins; otherwise the first node-managed account.
///
/// An unreachable node is reported as `Absent` rather than an error, the same
/// way a missing injected provider would be.
pub async fn detect_wallet(
    config: &ChainConfig,
    private_key: Option<&str>,
) -> Result<WalletAvailability> {
    if let Some(key) = private_key.filter(|k| !k.trim().is_empty()) {
        let wallet = KeyWallet::new(&config.rpc_url, key, config.network.chain_id())?;
        return Ok(WalletAvailability::Present(ConnectedWallet::Key(wallet)));
    }

    match RpcWallet::detect(&config.rpc_url).await {
        Ok(Some(wallet)) => Ok(WalletAvailability::Present(ConnectedWallet::Rpc(wallet))),
        Ok(None) => Ok(WalletAvailability::Absent),
        Err(e) => {
            log::debug!("no node-managed account available: {e}");
            Ok(WalletAvailability::Absent)
        }
    }
}
