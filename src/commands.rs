//! Command handlers behind the CLI. Each one returns `Result<T, String>` with
//! a message fit for the terminal, and a serializable value the renderer or
//! `--json` prints.

use grove_sdk::chain::ChainBackend;
use grove_sdk::content::ContentStore;
use grove_sdk::{
    ChainConfig, CreateQuestForm, Error, LoadState, Network, Preview, QuestNode, QuestStatus,
    QuestView, SubmissionForm, Submitted, Wallet, WalletStatus, format_eth, time_left,
};
use serde::Serialize;

use crate::state::{Settings, SettingsManager};

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// One row of the quest list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestSummary {
    pub id: u64,
    pub title: String,
    pub status: QuestStatus,
    pub prize_eth: String,
    pub time_left: String,
    pub participant_count: u64,
}

/// The detail page: the joined view plus what the current wallet may do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestPage {
    pub id: u64,
    pub title: String,
    pub description: Option<String>,
    pub status: QuestStatus,
    pub prize_eth: String,
    pub deadline: u64,
    pub time_left: String,
    pub creator: String,
    pub participant_count: u64,
    pub winners: Vec<String>,
    pub can_submit: bool,
    pub can_select_winners: bool,
}

/// Where to look after a confirmed create.
pub const LISTING_COMMAND: &str = "grove list";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ActionOutcome {
    Submitted {
        #[serde(flatten)]
        done: Submitted,
        /// Command that shows the result.
        next: String,
    },
    Preview(Preview),
}

impl ActionOutcome {
    fn confirmed(done: Submitted, next: impl Into<String>) -> Self {
        ActionOutcome::Submitted {
            done,
            next: next.into(),
        }
    }
}

fn show_command(id: i64) -> String {
    format!("grove show {id}")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigView {
    pub network: Network,
    pub chain_id: u64,
    pub contract_address: String,
    pub rpc_url: String,
    pub pin_endpoint: String,
    pub gateway: String,
    pub app_url: String,
    pub settings_path: String,
    pub first_launch: bool,
}

impl ConfigView {
    pub fn new(config: &ChainConfig, settings: &SettingsManager) -> Self {
        Self {
            network: config.network,
            chain_id: config.network.chain_id(),
            contract_address: config.contract_address.clone(),
            rpc_url: config.rpc_url.clone(),
            pin_endpoint: config.pin_endpoint.clone(),
            gateway: config.gateway.clone(),
            app_url: config.app_url.clone(),
            settings_path: settings.settings_path().display().to_string(),
            first_launch: settings.is_first_launch(),
        }
    }
}

/// Terminal wording for SDK errors.
pub fn user_error(err: Error) -> String {
    match err {
        Error::NoWallet => {
            "no wallet available: pass --private-key or point --rpc-url at a node with an unlocked account"
                .to_string()
        }
        Error::NotAllowed(QuestStatus::Ended) => "this quest is no longer accepting submissions".to_string(),
        Error::NotAllowed(status) => format!("not possible while the quest is {}", status.label()),
        other => other.to_string(),
    }
}

fn load_error<T>(state: LoadState<T>) -> String {
    state
        .message()
        .map(str::to_string)
        .unwrap_or_else(|| "still loading".to_string())
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

pub async fn list_quests<C, S, W>(node: &QuestNode<C, S, W>) -> Result<Vec<QuestSummary>, String>
where
    C: ChainBackend,
    S: ContentStore,
    W: Wallet,
{
    let mut handle = node.mount_quests();
    let state = handle.settled().await;
    let now = node.now();
    match state {
        LoadState::Ready(quests) => Ok(quests
            .iter()
            .map(|quest| QuestSummary {
                id: quest.id(),
                title: quest.title(),
                status: quest.status(now),
                prize_eth: format_eth(quest.record.prize),
                time_left: time_left(quest.record.deadline, now),
                participant_count: quest.record.participant_count,
            })
            .collect()),
        other => Err(load_error(other)),
    }
}

async fn ready_quest<C, S, W>(node: &QuestNode<C, S, W>, id: i64) -> Result<QuestView, String>
where
    C: ChainBackend,
    S: ContentStore,
    W: Wallet,
{
    let mut handle = node.mount_quest(id);
    match handle.settled().await {
        LoadState::Ready(view) => Ok(view),
        other => Err(load_error(other)),
    }
}

pub async fn show_quest<C, S, W>(node: &QuestNode<C, S, W>, id: i64) -> Result<QuestPage, String>
where
    C: ChainBackend,
    S: ContentStore,
    W: Wallet,
{
    let view = ready_quest(node, id).await?;
    let now = node.now();
    let record = &view.record;
    Ok(QuestPage {
        id: view.id(),
        title: view.title(),
        description: view.description().map(str::to_string),
        status: view.status(now),
        prize_eth: format_eth(record.prize),
        deadline: record.deadline,
        time_left: time_left(record.deadline, now),
        creator: format!("{:?}", record.creator),
        participant_count: record.participant_count,
        winners: record.winners.iter().map(|w| format!("{w:?}")).collect(),
        can_submit: record.accepts_submissions(now),
        can_select_winners: node.can_select_winners(record),
    })
}

pub fn wallet_status<C, S, W: Wallet>(node: &QuestNode<C, S, W>) -> WalletStatus {
    node.wallet_status()
}

// ---------------------------------------------------------------------------
// Writes
// ---------------------------------------------------------------------------

pub async fn create_quest<C, S, W>(
    node: &QuestNode<C, S, W>,
    form: &CreateQuestForm,
    dry_run: bool,
) -> Result<ActionOutcome, String>
where
    C: ChainBackend,
    S: ContentStore,
    W: Wallet,
{
    if dry_run {
        return node
            .preview_create(form)
            .map(ActionOutcome::Preview)
            .map_err(user_error);
    }
    node.create_quest(form)
        .await
        .map(|done| ActionOutcome::confirmed(done, LISTING_COMMAND))
        .map_err(user_error)
}

/// `on_tick` receives the seconds left on the success countdown.
pub async fn submit_entry<C, S, W>(
    node: &QuestNode<C, S, W>,
    id: i64,
    link: &str,
    dry_run: bool,
    on_tick: impl FnMut(u64),
) -> Result<ActionOutcome, String>
where
    C: ChainBackend,
    S: ContentStore,
    W: Wallet,
{
    let quest = ready_quest(node, id).await?;
    let mut form = SubmissionForm::new(link);
    if dry_run {
        return node
            .preview_submission(&quest.record, &form)
            .map(ActionOutcome::Preview)
            .map_err(user_error);
    }
    node.submit_entry(&quest, &mut form, on_tick)
        .await
        .map(|done| ActionOutcome::confirmed(done, show_command(id)))
        .map_err(user_error)
}

pub async fn select_winners<C, S, W>(
    node: &QuestNode<C, S, W>,
    id: i64,
    winners: &str,
    dry_run: bool,
) -> Result<ActionOutcome, String>
where
    C: ChainBackend,
    S: ContentStore,
    W: Wallet,
{
    let quest = ready_quest(node, id).await?;
    if dry_run {
        let address = node
            .wallet_address()
            .ok_or_else(|| user_error(Error::NoWallet))?;
        return node
            .preview_winners(&quest.record, &address, winners)
            .map(ActionOutcome::Preview)
            .map_err(user_error);
    }
    node.select_winners(&quest, winners)
        .await
        .map(|done| ActionOutcome::confirmed(done, show_command(id)))
        .map_err(user_error)
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

pub fn set_network(manager: &mut SettingsManager, network: Network) -> Result<Settings, String> {
    let settings = manager
        .set_network(network)
        .map_err(|e| format!("failed to save settings: {e}"))?;
    log::info!("network set to {network}");
    Ok(settings)
}
