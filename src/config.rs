use std::time::Duration;

use serde::{Deserialize, Deserializer};

pub const DEFAULT_URL: &str = "https://www.gamesforthebrain.com/game/checkers/";
pub const DEFAULT_PROMPT: &str = "Select an orange piece to move.";
const DEFAULT_READY_TIMEOUT_MS: u64 = 3000;
const DEFAULT_POLL_INTERVAL_MS: u64 = 25;

/// Settings for one [`CheckersPage`](crate::session::CheckersPage).
///
/// Every field has a default, so a partial JS object (or none) is enough when
/// the config comes through the wasm binding.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PageConfig {
    pub url: String,
    /// Message bar text written back on every board injection.
    pub default_prompt: String,
    #[serde(rename = "readyTimeoutMs", deserialize_with = "millis")]
    pub ready_timeout: Duration,
    #[serde(rename = "pollIntervalMs", deserialize_with = "millis")]
    pub poll_interval: Duration,
    pub globals: HostGlobals,
    pub message_id: String,
    pub restart_selector: String,
    pub rules_selector: String,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            default_prompt: DEFAULT_PROMPT.to_string(),
            ready_timeout: Duration::from_millis(DEFAULT_READY_TIMEOUT_MS),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            globals: HostGlobals::default(),
            message_id: "message".to_string(),
            restart_selector: "a[href='./']".to_string(),
            rules_selector: "a[href*='rules']".to_string(),
        }
    }
}

impl PageConfig {
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn with_default_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.default_prompt = prompt.into();
        self
    }

    pub fn with_ready_timeout(mut self, timeout: Duration) -> Self {
        self.ready_timeout = timeout;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}

/// Names of the host page's script globals.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HostGlobals {
    pub board: String,
    /// `draw(file, rank, image)`; square images are set directly when absent.
    pub draw: String,
    pub player_turn: String,
    pub host_busy: String,
    pub selection: String,
    pub continuation: String,
    pub game_over: String,
}

impl Default for HostGlobals {
    fn default() -> Self {
        Self {
            board: "board".to_string(),
            draw: "draw".to_string(),
            player_turn: "my_turn".to_string(),
            host_busy: "g_wait".to_string(),
            selection: "selected".to_string(),
            continuation: "double_jump".to_string(),
            game_over: "game_is_over".to_string(),
        }
    }
}

fn millis<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
    u64::deserialize(deserializer).map(Duration::from_millis)
}
