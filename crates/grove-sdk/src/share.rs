//! Social sharing after a successful action.
//!
//! Composing a post is optional: it only happens when the node has a
//! [`ShareComposer`], which is the case when running inside a frame or when
//! the user asked for share links.

use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::units::format_eth;

pub const WARPCAST_COMPOSE_URL: &str = "https://warpcast.com/~/compose";

/// A post to compose: text plus embedded links.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cast {
    pub text: String,
    pub embeds: Vec<String>,
}

impl Cast {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            embeds: Vec::new(),
        }
    }

    pub fn with_embed(mut self, url: impl Into<String>) -> Self {
        self.embeds.push(url.into());
        self
    }
}

pub trait ShareComposer: Send + Sync {
    /// Turn a cast into something the user can open, usually a link.
    fn compose(&self, cast: &Cast) -> Result<String>;
}

/// Builds Warpcast compose intents.
#[derive(Debug, Clone)]
pub struct WarpcastComposer {
    base: String,
}

impl Default for WarpcastComposer {
    fn default() -> Self {
        Self {
            base: WARPCAST_COMPOSE_URL.to_string(),
        }
    }
}

impl WarpcastComposer {
    pub fn new(base: impl Into<String>) -> Self {
        Self { base: base.into() }
    }
}

impl ShareComposer for WarpcastComposer {
    fn compose(&self, cast: &Cast) -> Result<String> {
        let mut url = Url::parse(&self.base)
            .map_err(|e| Error::Config(format!("invalid compose url {}: {e}", self.base)))?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("text", &cast.text);
            for embed in &cast.embeds {
                query.append_pair("embeds[]", embed);
            }
        }
        Ok(url.to_string())
    }
}

/// User context handed to us by a hosting frame.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameContext {
    #[serde(default)]
    pub user: Option<FrameUser>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameUser {
    pub fid: u64,
    #[serde(default)]
    pub username: Option<String>,
}

impl FrameContext {
    pub fn handle(&self) -> Option<String> {
        self.user
            .as_ref()
            .and_then(|u| u.username.as_deref())
            .map(|name| format!("@{name}"))
    }
}

pub fn quest_created_cast(title: &str, prize_wei: ethers::types::U256, quest_url: &str) -> Cast {
    Cast::new(format!(
        "I just opened a quest on Grove: \"{title}\" with a {} ETH prize pool. Think you can win it?",
        format_eth(prize_wei)
    ))
    .with_embed(quest_url)
}

pub fn entry_submitted_cast(title: &str, quest_url: &str) -> Cast {
    Cast::new(format!("Just submitted my entry to \"{title}\" on Grove."))
        .with_embed(quest_url)
}

pub fn winners_selected_cast(title: &str, winners: usize, quest_url: &str) -> Cast {
    let noun = if winners == 1 { "winner" } else { "winners" };
    Cast::new(format!(
        "The results are in for \"{title}\": {winners} {noun} picked on Grove. Congrats!"
    ))
    .with_embed(quest_url)
}
