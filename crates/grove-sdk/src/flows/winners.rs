use crate::chain::ChainBackend;
use crate::content::ContentStore;
use crate::contract::QuestCall;
use crate::error::{Error, FormError, Result};
use crate::flows::{Preview, Submitted};
use crate::node::QuestNode;
use crate::quest::{QuestRecord, QuestView};
use crate::share::winners_selected_cast;
use crate::wallet::Wallet;

/// Split a comma separated list. Entries are trimmed and blanks dropped; the
/// addresses themselves are only checked when the call is encoded.
pub fn parse_winner_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

/// Gate checks, then the parsed winner list.
fn checked_winners<C, S, W>(
    node: &QuestNode<C, S, W>,
    record: &QuestRecord,
    wallet_address: &str,
    input: &str,
) -> Result<Vec<String>> {
    if !record.is_creator(wallet_address) {
        return Err(Error::NotCreator);
    }
    let now = node.now();
    if !record.can_select_winners(Some(wallet_address), now) {
        return Err(Error::NotAllowed(record.status(now)));
    }
    let winners = parse_winner_list(input);
    if winners.is_empty() {
        return Err(Error::Validation(vec![FormError::NoWinners]));
    }
    Ok(winners)
}

impl<C, S, W> QuestNode<C, S, W>
where
    C: ChainBackend,
    S: ContentStore,
    W: Wallet,
{
    /// Whether the connected wallet gets the winner selection control.
    pub fn can_select_winners(&self, record: &QuestRecord) -> bool {
        let address = self.wallet_address();
        record.can_select_winners(address.as_deref(), self.now())
    }

    pub async fn select_winners(&self, quest: &QuestView, input: &str) -> Result<Submitted> {
        let wallet = self.require_wallet()?;
        let address = format!("{:?}", wallet.address());
        let winners = checked_winners(self, &quest.record, &address, input)?;
        let winner_count = winners.len();
        let call = QuestCall::SelectWinners {
            id: quest.id(),
            winners,
        };
        let _guard = self.busy.acquire()?;

        let result = async {
            let request = self.board.prepare(&call, None)?;
            let tx_hash = self.send(wallet, request).await?;
            let share_link = self.share(&winners_selected_cast(
                &quest.title(),
                winner_count,
                &self.config.quest_url(quest.id()),
            ));
            Ok::<_, Error>(Submitted {
                tx_hash,
                cid: None,
                share_link,
            })
        }
        .await;

        if let Err(e) = &result {
            log::warn!("winner selection for quest #{} failed: {e}", quest.id());
        }
        result
    }

    /// Checks and encodes as `select_winners` would, for the given address.
    pub fn preview_winners(
        &self,
        record: &QuestRecord,
        wallet_address: &str,
        input: &str,
    ) -> Result<Preview> {
        let winners = checked_winners(self, record, wallet_address, input)?;
        let call = QuestCall::SelectWinners {
            id: record.id,
            winners,
        };
        Ok(Preview {
            request: self.board.prepare(&call, None)?,
            cid: None,
        })
    }
}
