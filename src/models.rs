use serde::{Deserialize, Serialize};

/// Fixed lookback windows, ordered ascending so the shortest window gets
/// fetch priority (it "owns" any article seen again by a longer window).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Window {
    #[serde(rename = "24h")]
    H24,
    #[serde(rename = "72h")]
    H72,
    #[serde(rename = "7d")]
    D7,
    #[serde(rename = "30d")]
    D30,
    #[serde(rename = "90d")]
    D90,
}

impl Window {
    pub const ALL: [Window; 5] = [
        Window::H24,
        Window::H72,
        Window::D7,
        Window::D30,
        Window::D90,
    ];

    pub fn lookback_days(self) -> i64 {
        match self {
            Window::H24 => 1,
            Window::H72 => 3,
            Window::D7 => 7,
            Window::D30 => 30,
            Window::D90 => 90,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Window::H24 => "24h",
            Window::H72 => "72h",
            Window::D7 => "7d",
            Window::D30 => "30d",
            Window::D90 => "90d",
        }
    }

    pub fn parse(label: &str) -> Option<Window> {
        Window::ALL.into_iter().find(|w| w.label() == label)
    }
}

impl std::fmt::Display for Window {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A normalized, deduplicated news article. Region and topic stay `None`
/// until classification runs; rows stored before classification existed are
/// backfilled on read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    pub hash: String, // 16 hex chars, dedup identity
    pub title: String,
    pub description: String, // capped at 500 chars
    pub source: String,
    pub published_at: String, // ISO8601 UTC, kept as text
    pub url: String,
    pub window: Window, // which lookback produced it
    pub region: Option<String>,
    pub topic: Option<String>,
    pub fetched_at: String,
}
