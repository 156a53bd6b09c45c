//! Output payload types consumed by the downstream report generator.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::Article;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionCount {
    pub region: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicCount {
    pub topic: String,
    pub count: usize,
}

/// Per-window aggregate: counts plus frequency-ranked regions, topics and
/// title keywords.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WindowAggregate {
    pub count: usize,
    pub top_regions: Vec<RegionCount>,  // capped at 6
    pub top_topics: Vec<TopicCount>,    // capped at 8
    pub top_keywords: Vec<String>,      // capped at 10
}

/// Categorical signal from diffing a longer window against the 24h baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrendSignal {
    Continuation,
    TurningPoint,
    Anomaly,
    NoData,
}

impl TrendSignal {
    pub fn label(self) -> &'static str {
        match self {
            TrendSignal::Continuation => "kontynuacja",
            TrendSignal::TurningPoint => "możliwy punkt zwrotny",
            TrendSignal::Anomaly => "anomalia",
            TrendSignal::NoData => "brak danych",
        }
    }
}

impl std::fmt::Display for TrendSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrendDiffDetails {
    pub dominant_topic_24h: Option<String>,
    pub dominant_topic_window: Option<String>,
    pub dominant_region_24h: Option<String>,
    pub dominant_region_window: Option<String>,
    pub new_topics_in_24h: Vec<String>, // capped at 5
    pub new_keywords: Vec<String>,      // capped at 5
    pub fading_keywords: Vec<String>,   // capped at 5
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendDiff {
    pub window: String, // e.g. "7d vs 24h"
    pub signal: TrendSignal,
    pub details: TrendDiffDetails,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrendAggregates {
    pub h24: WindowAggregate,
    pub d7: WindowAggregate,
    pub d30: WindowAggregate,
    pub d90: WindowAggregate,
}

impl TrendAggregates {
    /// Windows in the fixed rendering order.
    pub fn iter(&self) -> [(&'static str, &WindowAggregate); 4] {
        [
            ("24h", &self.h24),
            ("7d", &self.d7),
            ("30d", &self.d30),
            ("90d", &self.d90),
        ]
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrendPayload {
    pub aggregates: TrendAggregates,
    pub diffs: Vec<TrendDiff>,
}

/// The single most impactful article with its audit trail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsOfDayResult {
    pub selected: Article,
    pub score: f64,
    pub justification: Vec<String>, // 3-6 bullets
    pub watch_signals: Vec<String>, // 2-5 signals
}

/// Geo-breakdown entry, stripped to what the prompt needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoArticle {
    pub title: String,
    pub source: String,
    pub topic: String,
}

/// Detailed 24h article, stripped to what the prompt needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlimArticle {
    pub title: String,
    pub source: String,
    pub published_at: String, // minute precision
    pub region: String,
    pub topic: String,
    pub description: String, // capped at 120 chars
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FetchStats {
    pub total_fetched: usize,
    pub articles_24h: usize,
    pub articles_7d: usize,
    pub articles_30d: usize,
    pub articles_90d: usize,
}

/// Everything the downstream LLM prompt needs for one analysis run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MacroPayload {
    pub news_of_day: Option<NewsOfDayResult>,
    pub geo_24h: BTreeMap<String, Vec<GeoArticle>>,
    pub articles_24h: Vec<SlimArticle>,
    pub trend: TrendPayload,
    pub stats: FetchStats,
}
