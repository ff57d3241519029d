use ethers::types::{Address, U256};
use serde::{Deserialize, Serialize};

/// Display state of a quest, derived from its record and the current time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuestStatus {
    /// Accepting submissions.
    Open,
    /// Deadline passed, winners not selected yet.
    Ended,
    /// Winners selected and the prize paid out.
    Finalized,
    /// Withdrawn by the creator.
    Cancelled,
}

impl QuestStatus {
    /// Cancelled wins over finalized, finalized wins over the deadline.
    pub fn derive(finalized: bool, cancelled: bool, deadline: u64, now: u64) -> Self {
        if cancelled {
            QuestStatus::Cancelled
        } else if finalized {
            QuestStatus::Finalized
        } else if now > deadline {
            QuestStatus::Ended
        } else {
            QuestStatus::Open
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            QuestStatus::Open => "Open",
            QuestStatus::Ended => "Ended",
            QuestStatus::Finalized => "Finalized",
            QuestStatus::Cancelled => "Cancelled",
        }
    }

    /// Returns true for the two states a quest never leaves.
    pub fn is_terminal(self) -> bool {
        matches!(self, QuestStatus::Finalized | QuestStatus::Cancelled)
    }
}

impl std::fmt::Display for QuestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// On-chain quest as returned by `getQuest`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestRecord {
    pub id: u64,
    pub creator: Address,
    pub metadata_cid: String,
    /// Prize pool in wei.
    pub prize: U256,
    /// Unix seconds.
    pub deadline: u64,
    pub cancelled: bool,
    pub finalized: bool,
    pub participant_count: u64,
    pub winners: Vec<Address>,
}

impl QuestRecord {
    pub fn status(&self, now: u64) -> QuestStatus {
        QuestStatus::derive(self.finalized, self.cancelled, self.deadline, now)
    }

    /// Unknown ids come back as a zeroed struct.
    pub fn exists(&self) -> bool {
        !self.creator.is_zero()
    }

    pub fn has_metadata(&self) -> bool {
        !self.metadata_cid.trim().is_empty()
    }

    pub fn accepts_submissions(&self, now: u64) -> bool {
        !self.status(now).is_terminal() && now <= self.deadline
    }

    /// Case-insensitive match of a wallet address against the creator.
    pub fn is_creator(&self, wallet: &str) -> bool {
        format!("{:?}", self.creator).eq_ignore_ascii_case(wallet.trim())
    }

    /// Winner selection is offered to the creator once the deadline has
    /// passed, until the quest is finalized or cancelled.
    pub fn can_select_winners(&self, wallet: Option<&str>, now: u64) -> bool {
        match wallet {
            Some(wallet) => {
                self.is_creator(wallet) && now > self.deadline && !self.status(now).is_terminal()
            }
            None => false,
        }
    }
}

/// Off-chain metadata pinned at creation time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Body pinned for a new quest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestContent {
    pub title: String,
    pub description: String,
}

/// Body pinned for a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionContent {
    pub link: String,
}

/// A quest record joined with whatever metadata could be fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestView {
    pub record: QuestRecord,
    pub metadata: Option<QuestMetadata>,
}

impl QuestView {
    pub fn id(&self) -> u64 {
        self.record.id
    }

    /// Metadata title, or `Quest #<id>` when there is none.
    pub fn title(&self) -> String {
        self.metadata
            .as_ref()
            .and_then(|m| m.title.as_deref())
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("Quest #{}", self.record.id))
    }

    pub fn description(&self) -> Option<&str> {
        self.metadata
            .as_ref()
            .and_then(|m| m.description.as_deref())
            .filter(|d| !d.trim().is_empty())
    }

    pub fn status(&self, now: u64) -> QuestStatus {
        self.record.status(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> QuestRecord {
        QuestRecord {
            id: 3,
            creator: "0x00000000000000000000000000000000000000aB".parse().unwrap(),
            metadata_cid: "bafyquest".into(),
            prize: U256::exp10(17),
            deadline: 1_000,
            cancelled: false,
            finalized: false,
            participant_count: 2,
            winners: vec![],
        }
    }

    #[test]
    fn status_table() {
        assert_eq!(QuestStatus::derive(false, false, 1_000, 999), QuestStatus::Open);
        assert_eq!(QuestStatus::derive(false, false, 1_000, 1_000), QuestStatus::Open);
        assert_eq!(QuestStatus::derive(false, false, 1_000, 1_001), QuestStatus::Ended);
        for now in [0, 1_000, 5_000] {
            assert_eq!(QuestStatus::derive(true, false, 1_000, now), QuestStatus::Finalized);
            assert_eq!(QuestStatus::derive(false, true, 1_000, now), QuestStatus::Cancelled);
            assert_eq!(QuestStatus::derive(true, true, 1_000, now), QuestStatus::Cancelled);
        }
    }

    #[test]
    fn creator_match_ignores_case() {
        let quest = record();
        assert!(quest.is_creator("0x00000000000000000000000000000000000000AB"));
        assert!(quest.is_creator("0x00000000000000000000000000000000000000ab"));
        assert!(!quest.is_creator("0x00000000000000000000000000000000000000ac"));
    }

    #[test]
    fn winner_selection_gate() {
        let mut quest = record();
        let creator = Some("0x00000000000000000000000000000000000000ab");
        let stranger = Some("0x00000000000000000000000000000000000000cd");

        assert!(!quest.can_select_winners(creator, 1_000));
        assert!(quest.can_select_winners(creator, 1_001));
        assert!(!quest.can_select_winners(stranger, 1_001));
        assert!(!quest.can_select_winners(stranger, u64::MAX));
        assert!(!quest.can_select_winners(None, 1_001));

        quest.finalized = true;
        assert!(!quest.can_select_winners(creator, 1_001));

        quest.finalized = false;
        quest.cancelled = true;
        assert!(!quest.can_select_winners(creator, 1_001));
    }

    #[test]
    fn submissions_close_on_terminal_states_and_deadline() {
        let mut quest = record();
        assert!(quest.accepts_submissions(1_000));
        assert!(!quest.accepts_submissions(1_001));
        quest.cancelled = true;
        assert!(!quest.accepts_submissions(0));
    }

    #[test]
    fn title_falls_back_to_placeholder() {
        let mut view = QuestView {
            record: record(),
            metadata: None,
        };
        assert_eq!(view.title(), "Quest #3");

        view.metadata = Some(QuestMetadata {
            title: Some("  ".into()),
            description: None,
        });
        assert_eq!(view.title(), "Quest #3");

        view.metadata = Some(QuestMetadata {
            title: Some("Build a bridge".into()),
            description: Some("Across the river".into()),
        });
        assert_eq!(view.title(), "Build a bridge");
        assert_eq!(view.description(), Some("Across the river"));
    }

    #[test]
    fn metadata_tolerates_missing_and_extra_fields() {
        let meta: QuestMetadata =
            serde_json::from_str(r#"{"title":"Hi","image":"ipfs://x"}"#).unwrap();
        assert_eq!(meta.title.as_deref(), Some("Hi"));
        assert_eq!(meta.description, None);
    }
}
