use std::future::Future;
use std::sync::Arc;

use ethers::providers::{Http, Middleware, Provider};
use ethers::types::transaction::eip2718::TypedTransaction;
use ethers::types::{Address, Bytes, TransactionRequest, U256};

use crate::contract::{self, QuestCall, parse_address};
use crate::error::{Error, Result};
use crate::quest::QuestRecord;
use crate::wallet::TxRequest;

/// Read access to the chain the quest board lives on.
pub trait ChainBackend: Send + Sync + 'static {
    /// Execute a read-only call against `to` and return the raw return data.
    fn call(&self, to: Address, data: Bytes) -> impl Future<Output = Result<Bytes>> + Send;
}

/// JSON-RPC backend (`eth_call`) over HTTP.
pub struct RpcBackend {
    provider: Provider<Http>,
    rpc_url: String,
}

impl RpcBackend {
    pub fn new(rpc_url: &str) -> Result<Self> {
        let provider = Provider::<Http>::try_from(rpc_url)
            .map_err(|e| Error::Config(format!("invalid rpc url {rpc_url}: {e}")))?;
        Ok(Self {
            provider,
            rpc_url: rpc_url.to_string(),
        })
    }

    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }
}

impl ChainBackend for RpcBackend {
    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes> {
        let tx: TypedTransaction = TransactionRequest::new().to(to).data(data).into();
        self.provider
            .call(&tx, None)
            .await
            .map_err(|e| Error::Rpc(e.to_string()))
    }
}

/// Typed view of the quest board contract on top of a [`ChainBackend`].
pub struct QuestBoard<C> {
    chain: Arc<C>,
    contract: String,
}

impl<C> Clone for QuestBoard<C> {
    fn clone(&self) -> Self {
        Self {
            chain: self.chain.clone(),
            contract: self.contract.clone(),
        }
    }
}

impl<C> QuestBoard<C> {
    pub fn new(chain: Arc<C>, contract: impl Into<String>) -> Self {
        Self {
            chain,
            contract: contract.into(),
        }
    }

    pub fn contract_address(&self) -> Result<Address> {
        parse_address(&self.contract)
    }

    /// Encode a write call into a request for the wallet.
    pub fn prepare(&self, call: &QuestCall, value: Option<U256>) -> Result<TxRequest> {
        Ok(TxRequest {
            to: self.contract_address()?,
            data: call.encode()?,
            value,
        })
    }
}

impl<C: ChainBackend> QuestBoard<C> {
    pub async fn quest_count(&self) -> Result<u64> {
        let data = self.read(&QuestCall::QuestCount).await?;
        contract::decode_quest_count(&data)
    }

    pub async fn get_quest(&self, id: u64) -> Result<QuestRecord> {
        let data = self.read(&QuestCall::GetQuest { id }).await?;
        contract::decode_quest(id, &data)
    }

    async fn read(&self, call: &QuestCall) -> Result<Bytes> {
        let to = self.contract_address()?;
        let data = call.encode()?;
        log::debug!("eth_call {} on {}", call.signature(), self.contract);
        self.chain.call(to, data).await
    }
}
