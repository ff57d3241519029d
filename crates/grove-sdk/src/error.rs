use thiserror::Error;

use crate::quest::QuestStatus;

/// A single failed gate on one of the action forms.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("title must be longer than 2 characters")]
    TitleTooShort,

    #[error("description must be longer than 5 characters")]
    DescriptionTooShort,

    #[error("prize must be a positive number of ETH")]
    InvalidPrize,

    #[error("deadline could not be parsed")]
    UnparsableDeadline,

    #[error("deadline must be at least 60 seconds in the future")]
    DeadlineTooSoon,

    #[error("submission link is empty")]
    EmptyLink,

    #[error("no winner addresses given")]
    NoWinners,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid address {0:?}")]
    InvalidAddress(String),

    #[error("quest id must be positive (got {0})")]
    InvalidQuestId(i64),

    #[error("quest #{0} not found")]
    NotFound(u64),

    #[error("rpc error: {0}")]
    Rpc(String),

    #[error("failed to decode contract response: {0}")]
    Decode(String),

    #[error("pinning failed: {0}")]
    Pin(String),

    #[error("content fetch failed: {0}")]
    Content(String),

    #[error("wallet error: {0}")]
    Wallet(String),

    #[error("no wallet available")]
    NoWallet,

    #[error("transaction {0} was not confirmed")]
    NoReceipt(String),

    #[error("transaction {0} reverted")]
    Reverted(String),

    #[error("form rejected: {}", join_form_errors(.0))]
    Validation(Vec<FormError>),

    #[error("action not allowed while quest is {0:?}")]
    NotAllowed(QuestStatus),

    #[error("only the quest creator can select winners")]
    NotCreator,

    #[error("another action is already in progress")]
    Busy,

    #[error("invalid configuration: {0}")]
    Config(String),
}

fn join_form_errors(errors: &[FormError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

pub type Result<T> = std::result::Result<T, Error>;
