//! Cross-window aggregates and trend diffs against the 24h baseline.
//!
//! Output is structured data, not narrative text; the downstream LLM does
//! the storytelling.

use itertools::Itertools;
use regex::Regex;
use std::collections::{BTreeMap, HashSet};
use std::sync::LazyLock;

use crate::classifier::{DEFAULT_REGION, DEFAULT_TOPIC};
use crate::models::Article;
use crate::out_models::{
    RegionCount, TopicCount, TrendAggregates, TrendDiff, TrendDiffDetails, TrendPayload,
    TrendSignal, WindowAggregate,
};

const TOP_REGIONS: usize = 6;
const TOP_TOPICS: usize = 8;
const TOP_KEYWORDS: usize = 10;
const KEYWORD_DELTA_CAP: usize = 5;
const EMERGING_TOPICS_CAP: usize = 5;

static TITLE_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[a-zA-ZąćęłńóśźżĄĆĘŁŃÓŚŹŻ]{3,}").unwrap());

// Bilingual stop words filtered out of title keywords.
#[rustfmt::skip]
const STOPWORDS: &[&str] = &[
    "the", "a", "an", "in", "on", "at", "to", "for", "of", "and",
    "or", "is", "are", "was", "were", "be", "been", "has", "have",
    "had", "with", "from", "by", "as", "it", "its", "this", "that",
    "but", "not", "no", "will", "would", "can", "could", "may",
    "new", "says", "said", "after", "over", "into", "about",
    "than", "more", "up", "out", "also", "just", "how", "what",
    "when", "where", "who", "all", "their", "his", "her", "he",
    "she", "they", "we", "you", "i", "my", "your", "do", "does",
    "did", "if", "so", "get", "got", "one", "two",
    "w", "na", "i", "z", "do", "się", "nie", "o", "po", "za",
    "to", "ze", "od", "jest", "dla", "jak", "co", "ale",
];

fn ranked_counts(counts: BTreeMap<String, usize>, top_n: usize) -> Vec<(String, usize)> {
    // Stable sort over the BTreeMap keeps tie order alphabetical, so the
    // ranking is deterministic run to run.
    counts
        .into_iter()
        .sorted_by(|a, b| b.1.cmp(&a.1))
        .take(top_n)
        .collect()
}

fn extract_keywords(articles: &[Article], top_n: usize) -> Vec<String> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for art in articles {
        let title = art.title.to_lowercase();
        for token in TITLE_TOKEN.find_iter(&title) {
            let word = token.as_str();
            if !STOPWORDS.contains(&word) {
                *counts.entry(word.to_string()).or_insert(0) += 1;
            }
        }
    }
    ranked_counts(counts, top_n)
        .into_iter()
        .map(|(word, _)| word)
        .collect()
}

/// Aggregate stats for one window's articles.
pub fn aggregate(articles: &[Article]) -> WindowAggregate {
    if articles.is_empty() {
        return WindowAggregate::default();
    }

    let mut regions: BTreeMap<String, usize> = BTreeMap::new();
    let mut topics: BTreeMap<String, usize> = BTreeMap::new();
    for art in articles {
        let region = art.region.as_deref().unwrap_or(DEFAULT_REGION);
        let topic = art.topic.as_deref().unwrap_or(DEFAULT_TOPIC);
        *regions.entry(region.to_string()).or_insert(0) += 1;
        *topics.entry(topic.to_string()).or_insert(0) += 1;
    }

    WindowAggregate {
        count: articles.len(),
        top_regions: ranked_counts(regions, TOP_REGIONS)
            .into_iter()
            .map(|(region, count)| RegionCount { region, count })
            .collect(),
        top_topics: ranked_counts(topics, TOP_TOPICS)
            .into_iter()
            .map(|(topic, count)| TopicCount { topic, count })
            .collect(),
        top_keywords: extract_keywords(articles, TOP_KEYWORDS),
    }
}

/// Diff a longer window against the 24h baseline.
///
/// Continuation when the dominant topic and region agree; possible turning
/// point when a 24h top topic's relative share in the longer window fell
/// under half its baseline share (an emerging theme); anomaly otherwise.
pub fn compare(baseline: &WindowAggregate, window: &WindowAggregate, label: &str) -> TrendDiff {
    if baseline.count == 0 || window.count == 0 {
        return TrendDiff {
            window: label.to_string(),
            signal: TrendSignal::NoData,
            details: TrendDiffDetails::default(),
        };
    }

    let window_topics: BTreeMap<&str, usize> = window
        .top_topics
        .iter()
        .map(|t| (t.topic.as_str(), t.count))
        .collect();

    let base_top_topic = baseline.top_topics.first().map(|t| t.topic.clone());
    let window_top_topic = window.top_topics.first().map(|t| t.topic.clone());
    let base_top_region = baseline.top_regions.first().map(|r| r.region.clone());
    let window_top_region = window.top_regions.first().map(|r| r.region.clone());

    let mut emerging: Vec<String> = Vec::new();
    for t in &baseline.top_topics {
        let base_share = t.count as f64 / baseline.count as f64;
        match window_topics.get(t.topic.as_str()) {
            None => emerging.push(t.topic.clone()),
            Some(&count) => {
                let window_share = count as f64 / window.count as f64;
                if window_share < base_share * 0.5 {
                    emerging.push(t.topic.clone());
                }
            }
        }
    }
    emerging.truncate(EMERGING_TOPICS_CAP);

    let signal = if base_top_topic == window_top_topic && base_top_region == window_top_region {
        TrendSignal::Continuation
    } else if !emerging.is_empty() {
        TrendSignal::TurningPoint
    } else {
        TrendSignal::Anomaly
    };

    // Keyword deltas keep the ranked order, so output is diffable.
    let base_kw: HashSet<&str> = baseline.top_keywords.iter().map(String::as_str).collect();
    let window_kw: HashSet<&str> = window.top_keywords.iter().map(String::as_str).collect();
    let new_keywords: Vec<String> = baseline
        .top_keywords
        .iter()
        .filter(|kw| !window_kw.contains(kw.as_str()))
        .take(KEYWORD_DELTA_CAP)
        .cloned()
        .collect();
    let fading_keywords: Vec<String> = window
        .top_keywords
        .iter()
        .filter(|kw| !base_kw.contains(kw.as_str()))
        .take(KEYWORD_DELTA_CAP)
        .cloned()
        .collect();

    TrendDiff {
        window: label.to_string(),
        signal,
        details: TrendDiffDetails {
            dominant_topic_24h: base_top_topic,
            dominant_topic_window: window_top_topic,
            dominant_region_24h: base_top_region,
            dominant_region_window: window_top_region,
            new_topics_in_24h: emerging,
            new_keywords,
            fading_keywords,
        },
    }
}

/// Aggregate all four windows and diff the longer ones against 24h.
pub fn build_trend_payload(
    articles_24h: &[Article],
    articles_7d: &[Article],
    articles_30d: &[Article],
    articles_90d: &[Article],
) -> TrendPayload {
    let h24 = aggregate(articles_24h);
    let d7 = aggregate(articles_7d);
    let d30 = aggregate(articles_30d);
    let d90 = aggregate(articles_90d);

    let diffs = vec![
        compare(&h24, &d7, "7d vs 24h"),
        compare(&h24, &d30, "30d vs 24h"),
        compare(&h24, &d90, "90d vs 24h"),
    ];

    TrendPayload {
        aggregates: TrendAggregates { h24, d7, d30, d90 },
        diffs,
    }
}

/// Group 24h articles by region, each list newest first. Structural view
/// only; no scoring.
pub fn build_geo_24h(articles_24h: &[Article]) -> BTreeMap<String, Vec<Article>> {
    let mut geo: BTreeMap<String, Vec<Article>> = BTreeMap::new();
    for art in articles_24h {
        let region = art.region.as_deref().unwrap_or(DEFAULT_REGION);
        geo.entry(region.to_string()).or_default().push(art.clone());
    }
    for articles in geo.values_mut() {
        articles.sort_by(|a, b| b.published_at.cmp(&a.published_at));
    }
    geo
}
