use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use ethers::types::U256;
use serde::{Deserialize, Serialize};

use crate::chain::ChainBackend;
use crate::content::{ContentStore, pin_json};
use crate::contract::QuestCall;
use crate::error::{Error, FormError, Result};
use crate::flows::{DRY_RUN_CID, Preview, Submitted};
use crate::node::QuestNode;
use crate::quest::QuestContent;
use crate::share::quest_created_cast;
use crate::units::eth_to_wei;
use crate::wallet::Wallet;

/// Minimum distance between now and the deadline of a new quest.
pub const MIN_DEADLINE_LEAD_SECS: u64 = 60;

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
];

/// Raw input of the create form, as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateQuestForm {
    pub title: String,
    pub description: String,
    /// ETH, decimal.
    pub prize: String,
    pub deadline: String,
}

/// A create form that passed every gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidQuest {
    pub content: QuestContent,
    pub prize_wei: U256,
    pub deadline: u64,
}

impl CreateQuestForm {
    /// Check every gate and collect all failures.
    pub fn validate(&self, now: u64) -> std::result::Result<ValidQuest, Vec<FormError>> {
        let mut errors = Vec::new();

        let title = self.title.trim();
        if title.chars().count() <= 2 {
            errors.push(FormError::TitleTooShort);
        }
        let description = self.description.trim();
        if description.chars().count() <= 5 {
            errors.push(FormError::DescriptionTooShort);
        }
        let prize_wei = eth_to_wei(&self.prize).ok();
        if prize_wei.is_none() {
            errors.push(FormError::InvalidPrize);
        }
        let deadline = match parse_deadline(&self.deadline) {
            Some(deadline) if deadline >= now.saturating_add(MIN_DEADLINE_LEAD_SECS) => {
                Some(deadline)
            }
            Some(_) => {
                errors.push(FormError::DeadlineTooSoon);
                None
            }
            None => {
                errors.push(FormError::UnparsableDeadline);
                None
            }
        };

        match (prize_wei, deadline) {
            (Some(prize_wei), Some(deadline)) if errors.is_empty() => Ok(ValidQuest {
                content: QuestContent {
                    title: title.to_string(),
                    description: description.to_string(),
                },
                prize_wei,
                deadline,
            }),
            _ => Err(errors),
        }
    }

    pub fn can_submit(&self, now: u64) -> bool {
        self.validate(now).is_ok()
    }
}

/// Unix seconds from a datetime-local style value, RFC 3339, or raw seconds.
///
/// Values without an offset are local time. A wall-clock time skipped by a
/// DST change does not parse; a repeated one resolves to its first instant.
pub fn parse_deadline(input: &str) -> Option<u64> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    if input.bytes().all(|b| b.is_ascii_digit()) {
        return input.parse().ok();
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return u64::try_from(dt.timestamp()).ok();
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok())
        .and_then(|dt| Local.from_local_datetime(&dt).earliest())
        .and_then(|dt| u64::try_from(dt.timestamp()).ok())
}

impl<C, S, W> QuestNode<C, S, W>
where
    C: ChainBackend,
    S: ContentStore,
    W: Wallet,
{
    /// Pin the quest body, then send `createQuest` funded with the prize.
    pub async fn create_quest(&self, form: &CreateQuestForm) -> Result<Submitted> {
        let valid = form.validate(self.now()).map_err(Error::Validation)?;
        let wallet = self.require_wallet()?;
        let _guard = self.busy.acquire()?;

        let result = async {
            let cid = pin_json(self.store.as_ref(), &valid.content).await?;
            log::info!("pinned quest body as {cid}");
            let call = QuestCall::CreateQuest {
                cid: cid.clone(),
                deadline: valid.deadline,
            };
            let request = self.board.prepare(&call, Some(valid.prize_wei))?;
            let tx_hash = self.send(wallet, request).await?;
            let share_link = self.share(&quest_created_cast(
                &valid.content.title,
                valid.prize_wei,
                &self.config.app_url,
            ));
            Ok::<_, Error>(Submitted {
                tx_hash,
                cid: Some(cid),
                share_link,
            })
        }
        .await;

        if let Err(e) = &result {
            log::warn!("create quest failed: {e}");
        }
        result
    }

    /// Validate and encode without pinning or sending.
    pub fn preview_create(&self, form: &CreateQuestForm) -> Result<Preview> {
        let valid = form.validate(self.now()).map_err(Error::Validation)?;
        let call = QuestCall::CreateQuest {
            cid: DRY_RUN_CID.to_string(),
            deadline: valid.deadline,
        };
        Ok(Preview {
            request: self.board.prepare(&call, Some(valid.prize_wei))?,
            cid: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: u64 = 1_700_000_000;

    fn form() -> CreateQuestForm {
        CreateQuestForm {
            title: "Logo".into(),
            description: "Design our new logo".into(),
            prize: "0.25".into(),
            deadline: (NOW + 3_600).to_string(),
        }
    }

    #[test]
    fn valid_form_passes() {
        let valid = form().validate(NOW).unwrap();
        assert_eq!(valid.content.title, "Logo");
        assert_eq!(valid.prize_wei, U256::exp10(16) * U256::from(25u64));
        assert_eq!(valid.deadline, NOW + 3_600);
        assert!(form().can_submit(NOW));
    }

    fn rejected_with(mutate: impl FnOnce(&mut CreateQuestForm), expected: FormError) {
        let mut f = form();
        mutate(&mut f);
        assert!(!f.can_submit(NOW));
        assert_eq!(f.validate(NOW).unwrap_err(), vec![expected]);
    }

    #[test]
    fn each_gate_flips_can_submit() {
        rejected_with(|f| f.title = " ab ".into(), FormError::TitleTooShort);
        rejected_with(|f| f.description = "short".into(), FormError::DescriptionTooShort);
        rejected_with(|f| f.description = "  six    ".into(), FormError::DescriptionTooShort);
        rejected_with(|f| f.prize = "0".into(), FormError::InvalidPrize);
        rejected_with(|f| f.prize = "lots".into(), FormError::InvalidPrize);
        rejected_with(|f| f.deadline = "next week".into(), FormError::UnparsableDeadline);
        rejected_with(|f| f.deadline = (NOW + 59).to_string(), FormError::DeadlineTooSoon);
    }

    #[test]
    fn deadline_exactly_one_minute_out_is_accepted() {
        let mut f = form();
        f.deadline = (NOW + 60).to_string();
        assert!(f.can_submit(NOW));
    }

    #[test]
    fn all_failures_are_reported_together() {
        let errors = CreateQuestForm::default().validate(NOW).unwrap_err();
        assert_eq!(
            errors,
            vec![
                FormError::TitleTooShort,
                FormError::DescriptionTooShort,
                FormError::InvalidPrize,
                FormError::UnparsableDeadline,
            ]
        );
    }

    #[test]
    fn naive_deadlines_are_local_wall_clock() {
        let wall = NaiveDateTime::parse_from_str("2023-11-14 22:13:00", "%Y-%m-%d %H:%M:%S").unwrap();
        let offset = Local.offset_from_local_datetime(&wall).earliest().unwrap();
        // 2023-11-14T22:13:00Z
        let as_utc: i64 = 1_700_000_000 - 20;
        let expected = u64::try_from(as_utc - i64::from(offset.local_minus_utc())).unwrap();

        assert_eq!(parse_deadline("2023-11-14T22:13"), Some(expected));
        assert_eq!(parse_deadline("2023-11-14 22:13"), Some(expected));
        assert_eq!(parse_deadline("2023-11-14T22:13:20"), Some(expected + 20));
    }

    #[test]
    fn deadline_formats() {
        assert_eq!(parse_deadline("2023-11-14T23:13:20+01:00"), Some(1_700_000_000));
        assert_eq!(parse_deadline(" 1700000000 "), Some(1_700_000_000));
        assert_eq!(parse_deadline("tomorrow"), None);
        assert_eq!(parse_deadline(""), None);
    }
}
