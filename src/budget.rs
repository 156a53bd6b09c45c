//! Output slimming: fixed caps that bound the downstream prompt size.

use std::collections::BTreeMap;

use crate::classifier::{DEFAULT_REGION, DEFAULT_TOPIC};
use crate::models::Article;
use crate::out_models::{GeoArticle, SlimArticle, TrendPayload};

pub const MAX_24H_ARTICLES: usize = 20;
pub const MAX_GEO_PER_REGION: usize = 5;
pub const MAX_AGG_REGIONS: usize = 3;
pub const MAX_AGG_TOPICS: usize = 3;
pub const MAX_AGG_KEYWORDS: usize = 5;
pub const SLIM_DESCRIPTION_CAP: usize = 120;
const SLIM_TIMESTAMP_CAP: usize = 16; // minute precision

fn truncate_chars(s: &str, cap: usize) -> String {
    s.chars().take(cap).collect()
}

/// Keep only the fields the prompt needs, with tight caps.
pub fn slim_articles(articles: &[Article]) -> Vec<SlimArticle> {
    articles
        .iter()
        .map(|a| SlimArticle {
            title: a.title.clone(),
            source: a.source.clone(),
            published_at: truncate_chars(&a.published_at, SLIM_TIMESTAMP_CAP),
            region: a.region.clone().unwrap_or_else(|| DEFAULT_REGION.to_string()),
            topic: a.topic.clone().unwrap_or_else(|| DEFAULT_TOPIC.to_string()),
            description: truncate_chars(&a.description, SLIM_DESCRIPTION_CAP),
        })
        .collect()
}

/// Geo breakdown capped to a handful of title/source/topic entries per
/// region.
pub fn summarize_geo(
    geo: &BTreeMap<String, Vec<Article>>,
) -> BTreeMap<String, Vec<GeoArticle>> {
    geo.iter()
        .map(|(region, articles)| {
            let slim = articles
                .iter()
                .take(MAX_GEO_PER_REGION)
                .map(|a| GeoArticle {
                    title: a.title.clone(),
                    source: a.source.clone(),
                    topic: a.topic.clone().unwrap_or_else(|| DEFAULT_TOPIC.to_string()),
                })
                .collect();
            (region.clone(), slim)
        })
        .collect()
}

/// Cap each window aggregate's rankings; the diffs are already bounded.
pub fn slim_trend(mut trend: TrendPayload) -> TrendPayload {
    for agg in [
        &mut trend.aggregates.h24,
        &mut trend.aggregates.d7,
        &mut trend.aggregates.d30,
        &mut trend.aggregates.d90,
    ] {
        agg.top_regions.truncate(MAX_AGG_REGIONS);
        agg.top_topics.truncate(MAX_AGG_TOPICS);
        agg.top_keywords.truncate(MAX_AGG_KEYWORDS);
    }
    trend
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Window;
    use crate::out_models::{RegionCount, TopicCount, TrendAggregates, WindowAggregate};

    fn article(title: &str) -> Article {
        Article {
            hash: "0".repeat(16),
            title: title.to_string(),
            description: "long description ".repeat(20),
            source: "Reuters".to_string(),
            published_at: "2025-01-01T12:00:00Z".to_string(),
            url: "https://example.com".to_string(),
            window: Window::H24,
            region: Some("Europa".to_string()),
            topic: Some("makro".to_string()),
            fetched_at: String::new(),
        }
    }

    #[test]
    fn slim_articles_caps_description_and_timestamp() {
        let slim = slim_articles(&[article("Test")]);
        assert_eq!(slim.len(), 1);
        assert!(slim[0].description.chars().count() <= SLIM_DESCRIPTION_CAP);
        assert_eq!(slim[0].published_at, "2025-01-01T12:00");
    }

    #[test]
    fn geo_keeps_at_most_five_per_region() {
        let mut geo = BTreeMap::new();
        geo.insert(
            "Europa".to_string(),
            (0..10).map(|i| article(&format!("News {}", i))).collect(),
        );
        let slim = summarize_geo(&geo);
        assert_eq!(slim["Europa"].len(), 5);
    }

    #[test]
    fn trend_caps_rankings_per_window() {
        let agg = WindowAggregate {
            count: 10,
            top_regions: (0..6)
                .map(|i| RegionCount { region: format!("R{}", i), count: i })
                .collect(),
            top_topics: (0..8)
                .map(|i| TopicCount { topic: format!("T{}", i), count: i })
                .collect(),
            top_keywords: (0..10).map(|i| format!("kw{}", i)).collect(),
        };
        let trend = TrendPayload {
            aggregates: TrendAggregates {
                h24: agg.clone(),
                d7: agg.clone(),
                d30: agg.clone(),
                d90: agg,
            },
            diffs: Vec::new(),
        };
        let slim = slim_trend(trend);
        assert_eq!(slim.aggregates.h24.top_regions.len(), 3);
        assert_eq!(slim.aggregates.h24.top_topics.len(), 3);
        assert_eq!(slim.aggregates.h24.top_keywords.len(), 5);
        assert_eq!(slim.aggregates.d90.top_keywords.len(), 5);
    }
}
