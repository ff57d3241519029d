//! `QuestNode`: one handle over the quest board, the content store and the
//! user's wallet.
//!
//! Reads go through [`QuestNode::load_quest`] / [`QuestNode::load_quests`] or
//! their `mount_*` counterparts, which run on a spawned task and publish into
//! a [`ViewHandle`]. Writes live in [`crate::flows`].

use std::sync::Arc;

use serde::Serialize;

use crate::chain::{ChainBackend, QuestBoard, RpcBackend};
use crate::clock::{Clock, SystemClock};
use crate::config::ChainConfig;
use crate::content::{ContentStore, HttpContentStore};
use crate::error::{Error, Result};
use crate::flows::Busy;
use crate::network::Network;
use crate::quest::QuestView;
use crate::share::{Cast, FrameContext, ShareComposer};
use crate::view::{self, LoadState, QuestIndexing, ViewHandle};
use crate::wallet::{ConnectedWallet, TxRequest, Wallet, detect_wallet};

// ── Struct ──────────────────────────────────────────────────────────────────

pub struct QuestNode<C, S, W = ConnectedWallet> {
    pub(crate) config: ChainConfig,
    pub(crate) board: QuestBoard<C>,
    pub(crate) store: Arc<S>,
    pub(crate) wallet: Option<Arc<W>>,
    pub(crate) composer: Option<Arc<dyn ShareComposer>>,
    pub(crate) frame: FrameContext,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) indexing: QuestIndexing,
    pub(crate) busy: Busy,
}

impl<C, S, W> Clone for QuestNode<C, S, W> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            board: self.board.clone(),
            store: self.store.clone(),
            wallet: self.wallet.clone(),
            composer: self.composer.clone(),
            frame: self.frame.clone(),
            clock: self.clock.clone(),
            indexing: self.indexing,
            busy: self.busy.clone(),
        }
    }
}

/// What the `wallet` page shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WalletStatus {
    pub connected: bool,
    pub address: Option<String>,
    pub network: Network,
    pub chain_id: u64,
}

// ── Construction ────────────────────────────────────────────────────────────

impl QuestNode<RpcBackend, HttpContentStore, ConnectedWallet> {
    /// JSON-RPC chain access, HTTP pinning and whatever wallet is available.
    pub async fn connect(config: ChainConfig, private_key: Option<&str>) -> Result<Self> {
        let chain = RpcBackend::new(&config.rpc_url)?;
        let store = HttpContentStore::new(&config.pin_endpoint, &config.gateway);
        let wallet = detect_wallet(&config, private_key).await?.into_option();
        if wallet.is_none() {
            log::info!("no wallet available, running read-only");
        }
        Ok(Self::new(config, chain, store, wallet))
    }
}

impl<C, S, W> QuestNode<C, S, W> {
    pub fn new(config: ChainConfig, chain: C, store: S, wallet: Option<W>) -> Self {
        let board = QuestBoard::new(Arc::new(chain), config.contract_address.clone());
        Self {
            config,
            board,
            store: Arc::new(store),
            wallet: wallet.map(Arc::new),
            composer: None,
            frame: FrameContext::default(),
            clock: Arc::new(SystemClock),
            indexing: QuestIndexing::default(),
            busy: Busy::default(),
        }
    }

    /// Compose a share after every successful action.
    pub fn with_composer(mut self, composer: impl ShareComposer + 'static) -> Self {
        self.composer = Some(Arc::new(composer));
        self
    }

    pub fn with_frame(mut self, frame: FrameContext) -> Self {
        self.frame = frame;
        self
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn with_indexing(mut self, indexing: QuestIndexing) -> Self {
        self.indexing = indexing;
        self
    }

    // ── Accessors ───────────────────────────────────────────────────────

    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    pub fn frame(&self) -> &FrameContext {
        &self.frame
    }

    pub fn now(&self) -> u64 {
        self.clock.now()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.is_busy()
    }

    /// Compose a share if a composer is configured. Failures only cost the link.
    pub(crate) fn share(&self, cast: &Cast) -> Option<String> {
        let composer = self.composer.as_ref()?;
        match composer.compose(cast) {
            Ok(link) => Some(link),
            Err(e) => {
                log::warn!("could not compose share: {e}");
                None
            }
        }
    }
}

// ── Wallet ──────────────────────────────────────────────────────────────────

impl<C, S, W: Wallet> QuestNode<C, S, W> {
    /// Lowercase hex address of the connected wallet.
    pub fn wallet_address(&self) -> Option<String> {
        self.wallet.as_ref().map(|w| format!("{:?}", w.address()))
    }

    pub fn wallet_status(&self) -> WalletStatus {
        let address = self.wallet_address();
        WalletStatus {
            connected: address.is_some(),
            address,
            network: self.config.network,
            chain_id: self.config.network.chain_id(),
        }
    }

    pub(crate) fn require_wallet(&self) -> Result<&Arc<W>> {
        self.wallet.as_ref().ok_or(Error::NoWallet)
    }

    /// Hand a request to the wallet and wait for the receipt.
    pub(crate) async fn send(&self, wallet: &Arc<W>, request: TxRequest) -> Result<String> {
        log::debug!(
            "sending {} bytes of call data to {:?}",
            request.data.len(),
            request.to
        );
        let hash = wallet.send_transaction(request).await?;
        let hash = format!("{hash:#x}");
        log::info!("confirmed {}", self.config.network.tx_url(&hash));
        Ok(hash)
    }
}

// ── Read models ─────────────────────────────────────────────────────────────

impl<C, S, W> QuestNode<C, S, W>
where
    C: ChainBackend,
    S: ContentStore,
    W: Send + Sync + 'static,
{
    pub async fn load_quest(&self, id: i64) -> LoadState<QuestView> {
        view::load_quest(&self.board, self.store.as_ref(), id).await
    }

    pub async fn load_quests(&self) -> LoadState<Vec<QuestView>> {
        view::load_quests(&self.board, self.store.as_ref(), self.indexing).await
    }

    /// Start loading a quest in the background.
    pub fn mount_quest(&self, id: i64) -> ViewHandle<QuestView> {
        let (writer, handle) = view::mount();
        let node = self.clone();
        tokio::spawn(async move {
            let state = node.load_quest(id).await;
            if !writer.publish(state) {
                log::debug!("quest #{id} unmounted before it loaded");
            }
        });
        handle
    }

    /// Start loading the quest list in the background.
    pub fn mount_quests(&self) -> ViewHandle<Vec<QuestView>> {
        let (writer, handle) = view::mount();
        let node = self.clone();
        tokio::spawn(async move {
            let state = node.load_quests().await;
            if !writer.publish(state) {
                log::debug!("quest list unmounted before it loaded");
            }
        });
        handle
    }
}
