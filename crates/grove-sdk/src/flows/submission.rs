use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::chain::ChainBackend;
use crate::content::{ContentStore, pin_json};
use crate::contract::QuestCall;
use crate::error::{Error, FormError, Result};
use crate::flows::{DRY_RUN_CID, Preview, Submitted};
use crate::node::QuestNode;
use crate::quest::{QuestRecord, QuestView, SubmissionContent};
use crate::share::entry_submitted_cast;
use crate::wallet::Wallet;

/// Seconds the success message stays up before the form resets.
pub const SUCCESS_COUNTDOWN_SECS: u64 = 3;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionForm {
    pub link: String,
}

impl SubmissionForm {
    pub fn new(link: impl Into<String>) -> Self {
        Self { link: link.into() }
    }

    pub fn validate(&self) -> std::result::Result<SubmissionContent, FormError> {
        let link = self.link.trim();
        if link.is_empty() {
            return Err(FormError::EmptyLink);
        }
        Ok(SubmissionContent {
            link: link.to_string(),
        })
    }

    pub fn clear(&mut self) {
        self.link.clear();
    }
}

/// One tick per second, counting down to zero.
#[derive(Debug, Clone, Copy)]
pub struct SuccessCountdown {
    secs: u64,
}

impl Default for SuccessCountdown {
    fn default() -> Self {
        Self {
            secs: SUCCESS_COUNTDOWN_SECS,
        }
    }
}

impl SuccessCountdown {
    pub fn new(secs: u64) -> Self {
        Self { secs }
    }

    /// Calls `on_tick` with the seconds remaining (3, 2, 1) and returns once
    /// the last second has elapsed.
    pub async fn run(self, mut on_tick: impl FnMut(u64)) {
        let mut interval = tokio::time::interval(Duration::from_secs(1));
        interval.tick().await;
        for remaining in (1..=self.secs).rev() {
            on_tick(remaining);
            interval.tick().await;
        }
    }
}

fn check_open<C, S, W>(node: &QuestNode<C, S, W>, record: &QuestRecord) -> Result<()> {
    let now = node.now();
    if !record.accepts_submissions(now) {
        return Err(Error::NotAllowed(record.status(now)));
    }
    Ok(())
}

impl<C, S, W> QuestNode<C, S, W>
where
    C: ChainBackend,
    S: ContentStore,
    W: Wallet,
{
    /// Pin the entry and send `submit`. On success the countdown runs and the
    /// form is cleared; on failure the input is left as typed.
    pub async fn submit_entry(
        &self,
        quest: &QuestView,
        form: &mut SubmissionForm,
        on_tick: impl FnMut(u64),
    ) -> Result<Submitted> {
        let record = &quest.record;
        check_open(self, record)?;
        let content = form
            .validate()
            .map_err(|e| Error::Validation(vec![e]))?;
        let wallet = self.require_wallet()?;
        let guard = self.busy.acquire()?;

        let result = async {
            let cid = pin_json(self.store.as_ref(), &content).await?;
            log::info!("pinned entry for quest #{} as {cid}", record.id);
            let call = QuestCall::Submit {
                id: record.id,
                cid: cid.clone(),
            };
            let request = self.board.prepare(&call, None)?;
            let tx_hash = self.send(wallet, request).await?;
            let share_link = self.share(&entry_submitted_cast(
                &quest.title(),
                &self.config.quest_url(record.id),
            ));
            Ok::<_, Error>(Submitted {
                tx_hash,
                cid: Some(cid),
                share_link,
            })
        }
        .await;
        drop(guard);

        match &result {
            Ok(_) => {
                SuccessCountdown::default().run(on_tick).await;
                form.clear();
            }
            Err(e) => log::warn!("submission to quest #{} failed: {e}", record.id),
        }
        result
    }

    pub fn preview_submission(&self, record: &QuestRecord, form: &SubmissionForm) -> Result<Preview> {
        check_open(self, record)?;
        form.validate().map_err(|e| Error::Validation(vec![e]))?;
        let call = QuestCall::Submit {
            id: record.id,
            cid: DRY_RUN_CID.to_string(),
        };
        Ok(Preview {
            request: self.board.prepare(&call, None)?,
            cid: None,
        })
    }
}
