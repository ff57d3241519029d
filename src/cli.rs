use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use grove_sdk::Network;

use crate::pin_relay::PINATA_PIN_JSON_URL;

/// Grove quest board
///
/// Browse, create, enter and resolve quests with ETH prize pools.
#[derive(Debug, Parser)]
#[clap(name = "grove", version)]
pub struct Cli {
    /// Directory holding grove_settings.json
    #[clap(long, global = true, env = "GROVE_DATA_DIR", value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[clap(long, global = true, env = "GROVE_LOG", default_value = "info", value_name = "LEVEL")]
    pub log_level: String,

    /// Network to use instead of the configured one
    #[clap(long, global = true, value_name = "NETWORK")]
    pub network: Option<Network>,

    /// Quest board contract address
    #[clap(long, global = true, value_name = "ADDRESS")]
    pub contract: Option<String>,

    /// JSON-RPC endpoint
    #[clap(long, global = true, value_name = "URL")]
    pub rpc_url: Option<String>,

    /// Pin endpoint that answers `{cid}`
    #[clap(long, global = true, value_name = "URL")]
    pub pin_endpoint: Option<String>,

    /// IPFS gateway base URL
    #[clap(long, global = true, value_name = "URL")]
    pub gateway: Option<String>,

    /// Sign locally with this key instead of a node-managed account
    #[clap(long, global = true, env = "GROVE_PRIVATE_KEY", hide_env_values = true)]
    pub private_key: Option<String>,

    /// Frame user context as JSON, e.g. {"user":{"fid":1,"username":"alice"}}
    #[clap(long, global = true, env = "GROVE_FRAME_CONTEXT", value_name = "JSON")]
    pub frame_context: Option<String>,

    /// Print a Warpcast share link after successful actions
    #[clap(long, global = true)]
    pub share: bool,

    /// Machine readable output
    #[clap(long, global = true)]
    pub json: bool,

    /// List quest ids from zero. Quest #0 then shows up in `list` but cannot
    /// be opened, since show, submit and select-winners need a positive id
    #[clap(long, global = true)]
    pub zero_based: bool,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List open, ended and finalized quests
    List,

    /// Show one quest and the actions available on it
    Show {
        #[clap(allow_negative_numbers = true)]
        id: i64,
    },

    /// Open a new quest funded with a prize pool
    Create {
        #[clap(long)]
        title: String,
        #[clap(long)]
        description: String,
        /// Prize in ETH
        #[clap(long)]
        prize: String,
        /// YYYY-MM-DDTHH:MM in local time, RFC 3339 or unix seconds
        #[clap(long)]
        deadline: String,
        /// Validate and print the transaction without pinning or sending
        #[clap(long)]
        dry_run: bool,
    },

    /// Submit an entry to a quest
    Submit {
        #[clap(allow_negative_numbers = true)]
        id: i64,
        #[clap(long)]
        link: String,
        #[clap(long)]
        dry_run: bool,
    },

    /// Pick the winners of a quest you created
    SelectWinners {
        #[clap(allow_negative_numbers = true)]
        id: i64,
        /// Comma separated addresses
        #[clap(long)]
        winners: String,
        #[clap(long)]
        dry_run: bool,
    },

    /// Show the connected wallet
    Wallet,

    /// Show the resolved configuration
    Config,

    /// Remember a network choice
    SetNetwork { network: Network },

    /// Run the pin relay server
    ServePin {
        #[clap(long, default_value = "127.0.0.1:3000", value_name = "ADDR")]
        listen: SocketAddr,
        #[clap(long, default_value = PINATA_PIN_JSON_URL, value_name = "URL")]
        upstream: String,
        #[clap(long, env = "PINATA_JWT", hide_env_values = true)]
        jwt: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_create_command() {
        let cli = Cli::parse_from([
            "grove",
            "--network",
            "base",
            "create",
            "--title",
            "Logo",
            "--description",
            "Design our logo",
            "--prize",
            "0.1",
            "--deadline",
            "2030-01-01T00:00",
            "--dry-run",
        ]);
        assert_eq!(cli.network, Some(Network::Base));
        match cli.command {
            Command::Create { title, dry_run, .. } => {
                assert_eq!(title, "Logo");
                assert!(dry_run);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn zero_based_help_warns_about_quest_zero() {
        use clap::CommandFactory;

        let cli = Cli::command();
        let flag = cli
            .get_arguments()
            .find(|arg| arg.get_id() == "zero_based")
            .unwrap();
        let help = flag.get_long_help().or(flag.get_help()).unwrap().to_string();
        assert!(help.contains("Quest #0"), "{help}");
        assert!(help.contains("positive id"), "{help}");
    }

    #[test]
    fn negative_ids_reach_the_read_model() {
        let cli = Cli::parse_from(["grove", "show", "-3"]);
        assert!(matches!(cli.command, Command::Show { id: -3 }));
    }
}
