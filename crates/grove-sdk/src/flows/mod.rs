//! User actions that write to the quest board: create, submit, pick winners.
//!
//! Every flow follows the same path. Validate locally, pin the JSON body,
//! encode the call, hand it to the wallet and wait for the receipt, then
//! optionally compose a share. Nothing is retried.

pub mod create;
pub mod submission;
pub mod winners;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::Serialize;

use crate::error::{Error, Result};
use crate::wallet::TxRequest;

pub use create::{CreateQuestForm, ValidQuest, parse_deadline};
pub use submission::{SUCCESS_COUNTDOWN_SECS, SubmissionForm, SuccessCountdown};
pub use winners::parse_winner_list;

/// CID used in place of a real pin when previewing a call.
pub const DRY_RUN_CID: &str = "bafy-dry-run";

/// In-flight flag shared by the flows of one node.
#[derive(Debug, Clone, Default)]
pub struct Busy(Arc<AtomicBool>);

impl Busy {
    pub fn is_busy(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Claim the flag; the guard releases it when dropped.
    pub fn acquire(&self) -> Result<BusyGuard> {
        if self
            .0
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(Error::Busy);
        }
        Ok(BusyGuard(self.0.clone()))
    }
}

pub struct BusyGuard(Arc<AtomicBool>);

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Outcome of a confirmed write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Submitted {
    pub tx_hash: String,
    /// CID of the pinned body, if the action pinned one.
    pub cid: Option<String>,
    pub share_link: Option<String>,
}

/// A write that was validated and encoded but not sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Preview {
    pub request: TxRequest,
    pub cid: Option<String>,
}
