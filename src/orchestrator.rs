//! Pipeline sequencing: one engine pass produces one macro payload.
//!
//! Fetch → classify → persist → query per window → backfill tags → score →
//! aggregate → slim. Strictly sequential; the caller must not run two
//! passes concurrently against the same database.

use anyhow::Result;
use reqwest::blocking::Client;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

use crate::budget::{slim_articles, slim_trend, summarize_geo, MAX_24H_ARTICLES};
use crate::classifier::{classify_articles, ensure_classified};
use crate::fetch::{fetch_all_windows, FetchOptions};
use crate::news_of_day::{select_news_of_day, ScoreWeights};
use crate::out_models::{FetchStats, MacroPayload};
use crate::store::NewsStore;
use crate::trend::{build_geo_24h, build_trend_payload};

/// Rows older than this are purged on every pass.
pub const RETENTION_DAYS: i64 = 100;

/// The scoring window reaches back 72h so a quiet news day still has
/// candidates.
const SCORING_WINDOW_HOURS: i64 = 72;
const SCORING_WINDOW_LIMIT: usize = 100;

/// Longer windows feed aggregation only, never the raw prompt.
const MAX_LONGER_WINDOW: usize = 50;

const CONNECT_TIMEOUT_SECS: u64 = 8;
const READ_TIMEOUT_SECS: u64 = 15;

pub struct MacroEngine {
    client: Client,
    store: NewsStore,
    weights: ScoreWeights,
}

impl MacroEngine {
    pub fn new(db_path: impl AsRef<Path>) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(READ_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            client,
            store: NewsStore::open(db_path)?,
            weights: ScoreWeights::default(),
        })
    }

    /// Override the scoring multipliers (testing, tuning).
    pub fn with_weights(mut self, weights: ScoreWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Run one full pass and return the structured payload.
    ///
    /// Fetch failures degrade to empty windows; classification, scoring and
    /// aggregation errors propagate — they operate on already-validated
    /// local data, so a failure there is a real defect.
    pub fn build_macro_payload(
        &self,
        api_key: &str,
        opts: &FetchOptions,
    ) -> Result<MacroPayload> {
        let pipeline_start = std::time::Instant::now();

        // 1) fetch & deduplicate across windows
        let mut raw = fetch_all_windows(&self.client, api_key, opts);
        info!("Fetched {} deduplicated articles across all windows", raw.len());

        // 2) classify before persisting so new rows carry tags
        classify_articles(&mut raw);

        // 3) persist + retention
        let inserted = self.store.store(&raw)?;
        debug!("Persisted articles - new_rows={}", inserted);
        self.store.cleanup(RETENTION_DAYS)?;

        // 4) query each window from the store; backfill tags on legacy rows
        let mut articles_24h = self.store.since(SCORING_WINDOW_HOURS, SCORING_WINDOW_LIMIT)?;
        ensure_classified(&mut articles_24h);

        let mut articles_7d = self.store.in_range(7, 0, MAX_LONGER_WINDOW)?;
        ensure_classified(&mut articles_7d);

        let mut articles_30d = self.store.in_range(30, 0, MAX_LONGER_WINDOW)?;
        ensure_classified(&mut articles_30d);

        let mut articles_90d = self.store.in_range(90, 0, MAX_LONGER_WINDOW)?;
        ensure_classified(&mut articles_90d);

        // 5) news of the day from the freshest window
        let news_of_day = select_news_of_day(&articles_24h, &self.weights);

        // 6) geo breakdown
        let geo_24h = build_geo_24h(&articles_24h);

        // 7) trend aggregates + diffs
        let trend = build_trend_payload(&articles_24h, &articles_7d, &articles_30d, &articles_90d);

        // 8) slim and assemble
        let detailed = &articles_24h[..articles_24h.len().min(MAX_24H_ARTICLES)];
        let payload = MacroPayload {
            stats: FetchStats {
                total_fetched: raw.len(),
                articles_24h: articles_24h.len(),
                articles_7d: articles_7d.len(),
                articles_30d: articles_30d.len(),
                articles_90d: articles_90d.len(),
            },
            news_of_day,
            geo_24h: summarize_geo(&geo_24h),
            articles_24h: slim_articles(detailed),
            trend: slim_trend(trend),
        };

        info!(
            "Macro payload built - duration={:.2}s, articles_24h={}, total_fetched={}",
            pipeline_start.elapsed().as_secs_f32(),
            payload.stats.articles_24h,
            payload.stats.total_fetched
        );
        Ok(payload)
    }
}
