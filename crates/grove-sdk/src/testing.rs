//! Test doubles for the chain, content store, wallet and share composer.
//!
//! Every double is a cheap `Clone` over shared state, so a test can hand one
//! copy to a [`QuestNode`] and keep another to inspect what happened.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use ethers::abi::{self, Token};
use ethers::types::{Address, Bytes, H256, U256};
use serde_json::Value;

use crate::chain::ChainBackend;
use crate::clock::Clock;
use crate::config::ChainConfig;
use crate::content::ContentStore;
use crate::contract::{QuestCall, decode_call, encode_quest};
use crate::error::{Error, Result};
use crate::network::Network;
use crate::node::QuestNode;
use crate::quest::{QuestMetadata, QuestRecord};
use crate::share::{Cast, ShareComposer};
use crate::wallet::{TxRequest, Wallet};

pub const TEST_CONTRACT: &str = "0x00000000000000000000000000000000000c0ffe";
pub const CREATOR: &str = "0x000000000000000000000000000000000000c0de";
pub const STRANGER: &str = "0x000000000000000000000000000000000000beef";
pub const TEST_NOW: u64 = 1_700_000_000;

fn address(hex: &str) -> Address {
    hex.parse().expect("valid test address")
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub fn test_config() -> ChainConfig {
    let mut config = ChainConfig::for_network(Network::BaseSepolia);
    config.contract_address = TEST_CONTRACT.to_string();
    config.app_url = "https://grove.test".to_string();
    config
}

/// An open quest by [`CREATOR`] with a deadline one day after [`TEST_NOW`].
pub fn open_quest(id: u64) -> QuestRecord {
    QuestRecord {
        id,
        creator: address(CREATOR),
        metadata_cid: format!("bafymeta{id}"),
        prize: U256::exp10(17),
        deadline: TEST_NOW + 86_400,
        cancelled: false,
        finalized: false,
        participant_count: 0,
        winners: vec![],
    }
}

/// Same quest with its deadline already behind [`TEST_NOW`].
pub fn ended_quest(id: u64) -> QuestRecord {
    QuestRecord {
        deadline: TEST_NOW - 60,
        ..open_quest(id)
    }
}

pub fn metadata(title: &str, description: &str) -> QuestMetadata {
    QuestMetadata {
        title: Some(title.to_string()),
        description: Some(description.to_string()),
    }
}

/// A node over the given doubles, pinned to [`TEST_NOW`].
pub fn test_node(
    chain: MockChain,
    store: MockContentStore,
    wallet: Option<MockWallet>,
) -> QuestNode<MockChain, MockContentStore, MockWallet> {
    QuestNode::new(test_config(), chain, store, wallet).with_clock(FixedClock::new(TEST_NOW))
}

// ---------------------------------------------------------------------------
// Chain
// ---------------------------------------------------------------------------

/// Contract double answering `eth_call` at the ABI level.
#[derive(Clone, Default)]
pub struct MockChain {
    quests: Arc<Mutex<BTreeMap<u64, QuestRecord>>>,
    count: Arc<Mutex<Option<u64>>>,
    failing: Arc<Mutex<HashSet<u64>>>,
    calls: Arc<AtomicUsize>,
}

impl MockChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quest(self, record: QuestRecord) -> Self {
        self.insert(record);
        self
    }

    pub fn insert(&self, record: QuestRecord) {
        self.quests.lock().expect("lock").insert(record.id, record);
    }

    /// Override `questCount()`; by default it is the highest stored id.
    pub fn set_count(&self, count: u64) {
        *self.count.lock().expect("lock") = Some(count);
    }

    /// Make `getQuest(id)` fail with an RPC error.
    pub fn fail_quest(&self, id: u64) {
        self.failing.lock().expect("lock").insert(id);
    }

    /// Number of `eth_call`s served so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ChainBackend for MockChain {
    async fn call(&self, _to: Address, data: Bytes) -> Result<Bytes> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match decode_call(&data)? {
            QuestCall::QuestCount => {
                let count = self.count.lock().expect("lock").unwrap_or_else(|| {
                    self.quests
                        .lock()
                        .expect("lock")
                        .keys()
                        .next_back()
                        .copied()
                        .unwrap_or(0)
                });
                Ok(Bytes::from(abi::encode(&[Token::Uint(U256::from(count))])))
            }
            QuestCall::GetQuest { id } => {
                if self.failing.lock().expect("lock").contains(&id) {
                    return Err(Error::Rpc(format!("getQuest({id}) reverted")));
                }
                let record = self
                    .quests
                    .lock()
                    .expect("lock")
                    .get(&id)
                    .cloned()
                    .unwrap_or_else(|| zeroed(id));
                Ok(encode_quest(&record))
            }
            other => Err(Error::Rpc(format!(
                "{} is not a view function",
                other.signature()
            ))),
        }
    }
}

/// What the contract returns for an id it never issued.
fn zeroed(id: u64) -> QuestRecord {
    QuestRecord {
        id,
        creator: Address::zero(),
        metadata_cid: String::new(),
        prize: U256::zero(),
        deadline: 0,
        cancelled: false,
        finalized: false,
        participant_count: 0,
        winners: vec![],
    }
}

// ---------------------------------------------------------------------------
// Content
// ---------------------------------------------------------------------------

#[derive(Clone, Default)]
pub struct MockContentStore {
    documents: Arc<Mutex<HashMap<String, Value>>>,
    pinned: Arc<Mutex<Vec<Value>>>,
    pin_error: Arc<Mutex<Option<String>>>,
    fetches: Arc<AtomicUsize>,
}

impl MockContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(self, cid: &str, body: Value) -> Self {
        self.documents
            .lock()
            .expect("lock")
            .insert(cid.to_string(), body);
        self
    }

    pub fn with_metadata(self, cid: &str, meta: &QuestMetadata) -> Self {
        let body = serde_json::to_value(meta).expect("metadata serializes");
        self.with_document(cid, body)
    }

    /// Make every pin fail with `message`.
    pub fn fail_pins(&self, message: &str) {
        *self.pin_error.lock().expect("lock") = Some(message.to_string());
    }

    /// Bodies pinned so far, in order.
    pub fn pinned(&self) -> Vec<Value> {
        self.pinned.lock().expect("lock").clone()
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

impl ContentStore for MockContentStore {
    async fn pin(&self, body: Value) -> Result<String> {
        if let Some(message) = self.pin_error.lock().expect("lock").clone() {
            return Err(Error::Pin(message));
        }
        let mut pinned = self.pinned.lock().expect("lock");
        let cid = format!("bafypinned{}", pinned.len());
        pinned.push(body.clone());
        self.documents.lock().expect("lock").insert(cid.clone(), body);
        Ok(cid)
    }

    async fn fetch(&self, cid: &str) -> Result<Value> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.documents
            .lock()
            .expect("lock")
            .get(cid)
            .cloned()
            .ok_or_else(|| Error::Content(format!("{cid} answered 404 Not Found")))
    }
}

// ---------------------------------------------------------------------------
// Wallet
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct MockWallet {
    address: Address,
    sent: Arc<Mutex<Vec<TxRequest>>>,
    failure: Arc<Mutex<Option<String>>>,
}

impl MockWallet {
    pub fn new(address_hex: &str) -> Self {
        Self {
            address: address(address_hex),
            sent: Arc::default(),
            failure: Arc::default(),
        }
    }

    /// Reject every following transaction with `message`.
    pub fn reject_with(&self, message: &str) {
        *self.failure.lock().expect("lock") = Some(message.to_string());
    }

    /// Requests the wallet was asked to send, including rejected ones.
    pub fn sent(&self) -> Vec<TxRequest> {
        self.sent.lock().expect("lock").clone()
    }
}

impl Wallet for MockWallet {
    fn address(&self) -> Address {
        self.address
    }

    async fn send_transaction(&self, tx: TxRequest) -> Result<H256> {
        let mut sent = self.sent.lock().expect("lock");
        sent.push(tx);
        if let Some(message) = self.failure.lock().expect("lock").clone() {
            return Err(Error::Wallet(message));
        }
        Ok(H256::from_low_u64_be(sent.len() as u64))
    }
}

// ---------------------------------------------------------------------------
// Share composer and clock
// ---------------------------------------------------------------------------

#[derive(Clone, Default)]
pub struct RecordingComposer {
    casts: Arc<Mutex<Vec<Cast>>>,
}

impl RecordingComposer {
    pub fn casts(&self) -> Vec<Cast> {
        self.casts.lock().expect("lock").clone()
    }
}

impl ShareComposer for RecordingComposer {
    fn compose(&self, cast: &Cast) -> Result<String> {
        let mut casts = self.casts.lock().expect("lock");
        casts.push(cast.clone());
        Ok(format!("share://{}", casts.len()))
    }
}

/// A clock that only moves when told to.
#[derive(Clone)]
pub struct FixedClock(Arc<AtomicU64>);

impl FixedClock {
    pub fn new(now: u64) -> Self {
        Self(Arc::new(AtomicU64::new(now)))
    }

    pub fn set(&self, now: u64) {
        self.0.store(now, Ordering::SeqCst);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }
}
