pub mod chain;
pub mod clock;
pub mod config;
pub mod content;
pub mod contract;
pub mod error;
pub mod flows;
pub mod network;
pub mod node;
pub mod quest;
pub mod share;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod units;
pub mod view;
pub mod wallet;

// Core types
pub use chain::{ChainBackend, QuestBoard, RpcBackend};
pub use clock::{Clock, SystemClock};
pub use config::ChainConfig;
pub use content::{ContentStore, HttpContentStore, gateway_url};
pub use contract::{QuestCall, parse_address};
pub use error::{Error, FormError, Result};
pub use network::Network;
pub use node::{QuestNode, WalletStatus};
pub use quest::{QuestContent, QuestMetadata, QuestRecord, QuestStatus, QuestView, SubmissionContent};

// Flows and views
pub use flows::{
    CreateQuestForm, DRY_RUN_CID, Preview, SubmissionForm, Submitted, SuccessCountdown,
    parse_deadline, parse_winner_list,
};
pub use view::{LoadState, QuestIndexing, ViewHandle};

// Capabilities
pub use share::{Cast, FrameContext, FrameUser, ShareComposer, WarpcastComposer};
pub use wallet::{
    ConnectedWallet, KeyWallet, RpcWallet, TxRequest, Wallet, WalletAvailability, detect_wallet,
};

pub use units::{eth_to_wei, format_eth, short_address, time_left};

// Re-export ethers for app-layer use
pub use ethers;
