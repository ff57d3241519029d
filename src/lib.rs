pub mod cli;
pub mod commands;
pub mod logging;
pub mod pin_relay;
pub mod render;
pub mod state;

use std::process::ExitCode;

use clap::Parser;
use grove_sdk::config::{
    CONTRACT_ADDRESS_VAR, GATEWAY_VAR, NETWORK_VAR, PIN_ENDPOINT_VAR, RPC_URL_VAR,
};
use grove_sdk::{
    ChainConfig, CreateQuestForm, FrameContext, QuestIndexing, QuestNode, WarpcastComposer,
};
use serde::Serialize;

use cli::{Cli, Command};
use commands::ConfigView;
use pin_relay::PinRelay;
use state::SettingsManager;

// ============================================================================
// Configuration
// ============================================================================

/// Flag values win over the environment, which wins over the settings file.
pub fn resolve_config(cli: &Cli, settings: &SettingsManager) -> ChainConfig {
    let flag = |key: &str| -> Option<String> {
        match key {
            NETWORK_VAR => cli.network.map(|n| n.as_str().to_string()),
            CONTRACT_ADDRESS_VAR => cli.contract.clone(),
            RPC_URL_VAR => cli.rpc_url.clone(),
            PIN_ENDPOINT_VAR => cli.pin_endpoint.clone(),
            GATEWAY_VAR => cli.gateway.clone(),
            _ => None,
        }
    };
    settings.chain_config(|key| {
        flag(key)
            .filter(|v| !v.trim().is_empty())
            .or_else(|| std::env::var(key).ok())
    })
}

/// A malformed frame context is logged and treated as absent.
pub fn parse_frame_context(raw: Option<&str>) -> FrameContext {
    let Some(raw) = raw.filter(|r| !r.trim().is_empty()) else {
        return FrameContext::default();
    };
    serde_json::from_str(raw).unwrap_or_else(|e| {
        log::warn!("ignoring frame context: {e}");
        FrameContext::default()
    })
}

fn emit<T: Serialize>(json: bool, value: &T, text: impl FnOnce(&T) -> String) -> Result<(), String> {
    if json {
        let out = serde_json::to_string_pretty(value).map_err(|e| format!("json error: {e}"))?;
        println!("{out}");
    } else {
        print!("{}", text(value));
    }
    Ok(())
}

// ============================================================================
// Dispatch
// ============================================================================

async fn dispatch(cli: Cli) -> Result<(), String> {
    let data_dir = cli
        .data_dir
        .clone()
        .unwrap_or_else(SettingsManager::default_data_dir);
    let mut settings = SettingsManager::new(data_dir);
    let config = resolve_config(&cli, &settings);
    log::debug!("resolved config: {config:?}");

    match &cli.command {
        Command::Config => {
            return emit(cli.json, &ConfigView::new(&config, &settings), render::config);
        }
        Command::SetNetwork { network } => {
            let saved = commands::set_network(&mut settings, *network)?;
            return emit(cli.json, &saved, |s| {
                format!(
                    "Network saved to {}: {}\n",
                    settings.settings_path().display(),
                    s.network.map(|n| n.as_str()).unwrap_or("default")
                )
            });
        }
        Command::ServePin {
            listen,
            upstream,
            jwt,
        } => {
            let relay = PinRelay::new(upstream.clone(), jwt.clone());
            return pin_relay::serve(*listen, relay)
                .await
                .map_err(|e| format!("pin relay stopped: {e}"));
        }
        _ => {}
    }

    let frame = parse_frame_context(cli.frame_context.as_deref());
    let share = cli.share || frame.user.is_some();
    let indexing = if cli.zero_based {
        QuestIndexing::ZeroBased
    } else {
        QuestIndexing::OneBased
    };

    let mut node = QuestNode::connect(config, cli.private_key.as_deref())
        .await
        .map_err(commands::user_error)?
        .with_frame(frame)
        .with_indexing(indexing);
    if share {
        node = node.with_composer(WarpcastComposer::default());
    }
    if let Some(handle) = node.frame().handle() {
        log::info!("running inside a frame as {handle}");
    }
    let network = node.config().network;

    match cli.command {
        Command::List => {
            let quests = commands::list_quests(&node).await?;
            emit(cli.json, &quests, |q| render::quest_list(q))
        }
        Command::Show { id } => {
            let page = commands::show_quest(&node, id).await?;
            emit(cli.json, &page, render::quest_page)
        }
        Command::Create {
            title,
            description,
            prize,
            deadline,
            dry_run,
        } => {
            let form = CreateQuestForm {
                title,
                description,
                prize,
                deadline,
            };
            let outcome = commands::create_quest(&node, &form, dry_run).await?;
            emit(cli.json, &outcome, |o| render::outcome(o, network))
        }
        Command::Submit { id, link, dry_run } => {
            let quiet = cli.json;
            let outcome = commands::submit_entry(&node, id, &link, dry_run, |secs| {
                if !quiet {
                    eprintln!("Entry submitted. Closing in {secs}...");
                }
            })
            .await?;
            emit(cli.json, &outcome, |o| render::outcome(o, network))
        }
        Command::SelectWinners {
            id,
            winners,
            dry_run,
        } => {
            let outcome = commands::select_winners(&node, id, &winners, dry_run).await?;
            emit(cli.json, &outcome, |o| render::outcome(o, network))
        }
        Command::Wallet => {
            let status = commands::wallet_status(&node);
            emit(cli.json, &status, render::wallet)
        }
        Command::Config | Command::SetNetwork { .. } | Command::ServePin { .. } => Ok(()),
    }
}

// ============================================================================
// App Entry Point
// ============================================================================

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = logging::init(logging::parse_level(&cli.log_level)) {
        eprintln!("failed to install logger: {e}");
    }

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("failed to start runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(dispatch(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
