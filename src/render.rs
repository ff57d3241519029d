//! Plain text rendering of command results.

use std::fmt::Write as _;

use grove_sdk::{Network, QuestStatus, WalletStatus, format_eth, short_address};

use crate::commands::{ActionOutcome, ConfigView, QuestPage, QuestSummary};

fn status_tag(status: QuestStatus) -> &'static str {
    match status {
        QuestStatus::Open => "[open]",
        QuestStatus::Ended => "[ended]",
        QuestStatus::Finalized => "[final]",
        QuestStatus::Cancelled => "[cancelled]",
    }
}

pub fn quest_list(quests: &[QuestSummary]) -> String {
    if quests.is_empty() {
        return "No quests yet. Create the first one with `grove create`.".to_string();
    }
    let mut out = String::new();
    for quest in quests {
        let _ = writeln!(
            out,
            "#{:<4} {:<12} {:>12} ETH  {:<22} {} ({} entries)",
            quest.id,
            status_tag(quest.status),
            quest.prize_eth,
            quest.time_left,
            quest.title,
            quest.participant_count,
        );
    }
    out
}

pub fn quest_page(page: &QuestPage) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} (#{})", page.title, page.id);
    let _ = writeln!(out, "{}", status_tag(page.status));
    if let Some(description) = &page.description {
        let _ = writeln!(out, "\n{description}\n");
    }
    let _ = writeln!(out, "Prize:    {} ETH", page.prize_eth);
    let _ = writeln!(out, "Deadline: {} ({})", page.deadline, page.time_left);
    let _ = writeln!(out, "Creator:  {}", short_address(&page.creator));
    let _ = writeln!(out, "Entries:  {}", page.participant_count);
    if !page.winners.is_empty() {
        let winners: Vec<String> = page.winners.iter().map(|w| short_address(w)).collect();
        let _ = writeln!(out, "Winners:  {}", winners.join(", "));
    }
    if page.can_submit {
        let _ = writeln!(out, "\nSubmit an entry: grove submit {} --link <url>", page.id);
    }
    if page.can_select_winners {
        let _ = writeln!(
            out,
            "\nPick winners: grove select-winners {} --winners <addr,addr>",
            page.id
        );
    }
    out
}

pub fn outcome(outcome: &ActionOutcome, network: Network) -> String {
    let mut out = String::new();
    match outcome {
        ActionOutcome::Submitted { done, next } => {
            let _ = writeln!(out, "Confirmed: {}", network.tx_url(&done.tx_hash));
            if let Some(cid) = &done.cid {
                let _ = writeln!(out, "Content:   {cid}");
            }
            if let Some(link) = &done.share_link {
                let _ = writeln!(out, "Share:     {link}");
            }
            let _ = writeln!(out, "View it:   {next}");
        }
        ActionOutcome::Preview(preview) => {
            let _ = writeln!(out, "Dry run, nothing was pinned or sent.");
            let _ = writeln!(out, "To:    {:?}", preview.request.to);
            if let Some(value) = preview.request.value {
                let _ = writeln!(out, "Value: {} ETH", format_eth(value));
            }
            let _ = writeln!(out, "Data:  {}", preview.request.data);
        }
    }
    out
}

pub fn wallet(status: &WalletStatus) -> String {
    match &status.address {
        Some(address) => format!(
            "Connected as {address} on {} (chain {})",
            status.network, status.chain_id
        ),
        None => format!("No wallet connected ({} is read-only)", status.network),
    }
}

pub fn config(view: &ConfigView) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "network:      {} (chain {})", view.network, view.chain_id);
    let _ = writeln!(out, "contract:     {}", view.contract_address);
    let _ = writeln!(out, "rpc:          {}", view.rpc_url);
    let _ = writeln!(out, "pin endpoint: {}", view.pin_endpoint);
    let _ = writeln!(out, "gateway:      {}", view.gateway);
    let _ = writeln!(out, "app:          {}", view.app_url);
    let saved = if view.first_launch { " (not saved yet)" } else { "" };
    let _ = writeln!(out, "settings:     {}{saved}", view.settings_path);
    out
}
