use crate::chain::{ChainBackend, QuestBoard};
use crate::content::{ContentStore, fetch_metadata};
use crate::error::{Error, Result};
use crate::quest::QuestView;
use crate::view::LoadState;

/// Record plus best-effort metadata for one quest.
///
/// A zeroed record (unknown id) is reported as not found. Metadata failures
/// never fail the view.
pub async fn fetch_quest_view<C, S>(board: &QuestBoard<C>, store: &S, id: u64) -> Result<QuestView>
where
    C: ChainBackend,
    S: ContentStore,
{
    let record = board.get_quest(id).await?;
    if !record.exists() {
        return Err(Error::NotFound(id));
    }
    let metadata = if record.has_metadata() {
        fetch_metadata(store, &record.metadata_cid).await
    } else {
        None
    };
    Ok(QuestView { record, metadata })
}

/// Load the detail view for a user supplied id.
pub async fn load_quest<C, S>(board: &QuestBoard<C>, store: &S, id: i64) -> LoadState<QuestView>
where
    C: ChainBackend,
    S: ContentStore,
{
    if id <= 0 {
        return LoadState::Invalid(Error::InvalidQuestId(id).to_string());
    }
    match fetch_quest_view(board, store, id as u64).await {
        Ok(view) => LoadState::Ready(view),
        Err(e @ Error::NotFound(_)) => LoadState::Failed(e.to_string()),
        Err(e) => {
            log::warn!("failed to load quest #{id}: {e}");
            LoadState::Failed(e.to_string())
        }
    }
}
