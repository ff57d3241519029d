use serde::{Deserialize, Serialize};

use crate::chain::{ChainBackend, QuestBoard};
use crate::content::{ContentStore, fetch_metadata};
use crate::error::Result;
use crate::quest::QuestView;
use crate::view::LoadState;

/// Which ids `questCount()` covers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuestIndexing {
    /// `0..count`
    ZeroBased,
    /// `1..=count`, the contract's numbering.
    #[default]
    OneBased,
}

impl QuestIndexing {
    pub fn ids(self, count: u64) -> std::ops::Range<u64> {
        match self {
            QuestIndexing::ZeroBased => 0..count,
            QuestIndexing::OneBased => 1..count.saturating_add(1),
        }
    }
}

/// Every listed quest, in id order.
///
/// Records are fetched one after the other. A failing record aborts the whole
/// listing; failing metadata only leaves that item without it.
pub async fn fetch_quest_list<C, S>(
    board: &QuestBoard<C>,
    store: &S,
    indexing: QuestIndexing,
) -> Result<Vec<QuestView>>
where
    C: ChainBackend,
    S: ContentStore,
{
    let count = board.quest_count().await?;
    log::debug!("questCount = {count}");

    let mut quests = Vec::new();
    for id in indexing.ids(count) {
        let record = board.get_quest(id).await?;
        let metadata = if record.has_metadata() {
            fetch_metadata(store, &record.metadata_cid).await
        } else {
            None
        };
        quests.push(QuestView { record, metadata });
    }

    quests.retain(|q| q.record.exists() && !q.record.cancelled);
    Ok(quests)
}

pub async fn load_quests<C, S>(
    board: &QuestBoard<C>,
    store: &S,
    indexing: QuestIndexing,
) -> LoadState<Vec<QuestView>>
where
    C: ChainBackend,
    S: ContentStore,
{
    match fetch_quest_list(board, store, indexing).await {
        Ok(quests) => LoadState::Ready(quests),
        Err(e) => {
            log::warn!("failed to list quests: {e}");
            LoadState::Failed(e.to_string())
        }
    }
}
