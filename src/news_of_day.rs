//! Selection of the single most impactful article from the freshest window.
//!
//! Scoring factors: source trust, recency within 72h, high-impact keywords
//! and topic priority. All tables are hand-tuned heuristics kept as data so
//! they can be swapped without touching the pipeline.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use regex::Regex;
use std::sync::LazyLock;

use crate::classifier::{DEFAULT_REGION, DEFAULT_TOPIC};
use crate::models::Article;
use crate::out_models::NewsOfDayResult;

// Source trust, 0-10 scale. Matched as a case-insensitive substring in
// either direction so "BBC News" resolves to "bbc".
const SOURCE_WEIGHTS: &[(&str, f64)] = &[
    ("reuters", 10.0),
    ("bloomberg", 10.0),
    ("financial times", 9.0),
    ("the wall street journal", 9.0),
    ("associated press", 9.0),
    ("bbc", 8.0),
    ("cnbc", 8.0),
    ("the economist", 8.0),
    ("the guardian", 7.0),
    ("the new york times", 8.0),
    ("al jazeera", 7.0),
    ("bankier.pl", 7.0),
    ("pap", 7.0),
    ("money.pl", 6.0),
    ("investing.com", 6.0),
    ("marketwatch", 7.0),
    ("seeking alpha", 5.0),
    ("business insider", 6.0),
    ("coindesk", 5.0),
    ("zerohedge", 4.0),
];
const DEFAULT_SOURCE_WEIGHT: f64 = 3.0;

#[rustfmt::skip]
static HIGH_IMPACT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(crash|recession|war\b|invasion|default|collapse|emergency|crisis|rate\s?cut|rate\s?hike|rate\s?decision|surprise|shock|black\s?swan|bankrupt|bail.?out|sanction|escalat|cease.?fire|nuclear|pandemic|shutdown|tariff|trade\s?war|currency\s?crisis|record\s?high|record\s?low|flash\s?crash|bank\s?run|kryzys|wojna|recesja|krach|upadłość|sankcj)\b",
    )
    .unwrap()
});

// Topic priority: central-bank policy outranks everything else.
const TOPIC_WEIGHTS: &[(&str, f64)] = &[
    ("banki centralne", 3.0),
    ("konflikt", 2.5),
    ("inflacja/stopy", 2.0),
    ("handel", 2.0),
    ("makro", 1.8),
    ("energia", 1.5),
    ("rynek pracy", 1.5),
    ("tech/AI", 1.2),
    ("krypto", 1.0),
    ("surowce", 1.0),
    ("nieruchomości", 0.8),
    ("inne", 0.5),
];
const DEFAULT_TOPIC_WEIGHT: f64 = 0.5;

const TOPIC_SIGNALS: &[(&str, &str)] = &[
    ("banki centralne", "Decyzje stóp procentowych i forward guidance"),
    ("konflikt", "Eskalacja/deeskalacja i wpływ na ceny energii"),
    ("inflacja/stopy", "Odczyty CPI/PPI i reakcja rynku obligacji"),
    ("handel", "Nowe taryfy celne i retaliacja partnerów handlowych"),
    ("makro", "Dane PKB i PMI w kolejnych tygodniach"),
    ("energia", "Decyzje OPEC+ i poziomy zapasów"),
    ("rynek pracy", "Payrolls i dynamika płac"),
    ("tech/AI", "Wyniki big tech i regulacje AI"),
    ("krypto", "Regulacje i przepływy instytucjonalne"),
    ("surowce", "Popyt z Chin i poziomy zapasów"),
];

const REGION_SIGNALS: &[(&str, &str)] = &[
    ("Polska", "Decyzje RPP i kurs PLN"),
    ("Europa", "Dane ze strefy euro i polityka ECB"),
    ("Ameryka Pn.", "Dane z USA i retoryka Fed"),
    ("Azja", "Dane z Chin i polityka PBoC"),
    ("Australia", "Decyzje RBA i eksport surowców"),
];

const FALLBACK_SIGNAL: &str = "Ogólna zmienność i sentyment rynkowy";

/// Composite score multipliers. Reference values reproduce the tuned
/// behavior; swap them wholesale rather than re-deriving.
#[derive(Debug, Clone, Copy)]
pub struct ScoreWeights {
    pub source: f64,
    pub recency: f64,
    pub keyword: f64,
    pub topic: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            source: 1.5,
            recency: 1.0,
            keyword: 2.0,
            topic: 1.5,
        }
    }
}

/// Trust weight for a source name; unknown sources get a low default.
pub fn source_weight(source: &str) -> f64 {
    let s = source.trim().to_lowercase();
    if s.is_empty() {
        return DEFAULT_SOURCE_WEIGHT;
    }
    for (key, weight) in SOURCE_WEIGHTS {
        if s.contains(key) || key.contains(s.as_str()) {
            return *weight;
        }
    }
    DEFAULT_SOURCE_WEIGHT
}

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    let head = s.get(..19)?;
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(head, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    None
}

/// Recency on a 1-10 scale, decaying linearly from 10 (now) to 1 at the
/// 72h edge. An unparsable timestamp scores minimally instead of erroring.
pub fn recency_score(published_at: &str) -> f64 {
    let Some(published) = parse_timestamp(published_at) else {
        return 2.0;
    };
    let age_hours = ((Utc::now() - published).num_seconds() as f64 / 3600.0).max(0.0);
    (10.0 - (age_hours / 72.0) * 9.0).max(1.0)
}

/// Bonus for high-impact vocabulary: 0 with no match, otherwise 3-6
/// scaling with match count. The cap keeps keyword stuffing from
/// dominating the composite.
pub fn keyword_bonus(title: &str, description: &str) -> f64 {
    let text = format!("{} {}", title, description);
    let matches = HIGH_IMPACT.find_iter(&text).count();
    if matches == 0 {
        0.0
    } else {
        (3.0 + matches as f64).min(6.0)
    }
}

pub fn topic_weight(topic: &str) -> f64 {
    TOPIC_WEIGHTS
        .iter()
        .find(|(key, _)| *key == topic)
        .map(|(_, w)| *w)
        .unwrap_or(DEFAULT_TOPIC_WEIGHT)
}

/// Composite score. Pure and deterministic over the article fields.
pub fn score_article(article: &Article, weights: &ScoreWeights) -> f64 {
    let src = source_weight(&article.source);
    let rec = recency_score(&article.published_at);
    let kw = keyword_bonus(&article.title, &article.description);
    let tp = topic_weight(article.topic.as_deref().unwrap_or(DEFAULT_TOPIC));
    src * weights.source + rec * weights.recency + kw * weights.keyword + tp * weights.topic
}

/// Pick the highest-scoring article; ties go to the earliest occurrence.
/// Returns `None` for an empty input.
pub fn select_news_of_day(articles: &[Article], weights: &ScoreWeights) -> Option<NewsOfDayResult> {
    let mut best: Option<(f64, &Article)> = None;
    for art in articles {
        let score = score_article(art, weights);
        if best.map_or(true, |(top, _)| score > top) {
            best = Some((score, art));
        }
    }
    let (score, selected) = best?;

    Some(NewsOfDayResult {
        justification: build_justification(selected, score),
        watch_signals: build_watch_signals(selected, articles),
        selected: selected.clone(),
        score: (score * 100.0).round() / 100.0,
    })
}

fn build_justification(article: &Article, score: f64) -> Vec<String> {
    let mut bullets = Vec::with_capacity(6);

    let source = if article.source.is_empty() {
        "nieznane"
    } else {
        article.source.as_str()
    };
    bullets.push(format!(
        "Źródło: {} (waga: {:.0}/10)",
        source,
        source_weight(&article.source)
    ));

    bullets.push(format!(
        "Aktualność: {:.1}/10",
        recency_score(&article.published_at)
    ));

    let kw = keyword_bonus(&article.title, &article.description);
    if kw > 0.0 {
        bullets.push(format!(
            "Słowa kluczowe high-impact wykryte (bonus: +{:.1})",
            kw
        ));
    } else {
        bullets.push("Brak słów kluczowych high-impact".to_string());
    }

    let topic = article.topic.as_deref().unwrap_or(DEFAULT_TOPIC);
    bullets.push(format!("Temat: {} (waga: {:.1})", topic, topic_weight(topic)));

    bullets.push(format!(
        "Region: {}",
        article.region.as_deref().unwrap_or(DEFAULT_REGION)
    ));

    bullets.push(format!("Łączny scoring: {:.1}", score));

    bullets.truncate(6);
    bullets
}

fn lookup<'a>(table: &[(&str, &'a str)], key: &str) -> Option<&'a str> {
    table.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
}

fn build_watch_signals(selected: &Article, all: &[Article]) -> Vec<String> {
    let mut signals = Vec::new();

    let topic = selected.topic.as_deref().unwrap_or(DEFAULT_TOPIC);
    if let Some(signal) = lookup(TOPIC_SIGNALS, topic) {
        signals.push(signal.to_string());
    }

    let region = selected.region.as_deref().unwrap_or(DEFAULT_REGION);
    if let Some(signal) = lookup(REGION_SIGNALS, region) {
        signals.push(signal.to_string());
    }

    // Repeating-topic signal: count the other articles sharing the winning
    // topic.
    let same_topic = all
        .iter()
        .filter(|a| a.topic.as_deref().unwrap_or(DEFAULT_TOPIC) == topic)
        .count()
        .saturating_sub(1);
    if same_topic >= 5 {
        signals.push(format!(
            "Temat '{}' dominuje ({} artykułów) — nasilony trend",
            topic, same_topic
        ));
    } else if same_topic >= 3 {
        signals.push(format!("Temat '{}' powtarza się ({} artykułów)", topic, same_topic));
    }

    if signals.len() < 2 {
        signals.push(FALLBACK_SIGNAL.to_string());
    }
    signals.truncate(5);
    signals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::classify_articles;
    use crate::models::Window;
    use chrono::Duration;

    fn iso_hours_ago(hours: i64) -> String {
        (Utc::now() - Duration::hours(hours))
            .format("%Y-%m-%dT%H:%M:%SZ")
            .to_string()
    }

    fn make_article(title: &str, source: &str, published_at: &str, topic: &str) -> Article {
        Article {
            hash: "0".repeat(16),
            title: title.to_string(),
            description: String::new(),
            source: source.to_string(),
            published_at: published_at.to_string(),
            url: String::new(),
            window: Window::H24,
            region: Some("Świat".to_string()),
            topic: Some(topic.to_string()),
            fetched_at: String::new(),
        }
    }

    #[test]
    fn source_weight_trusted_and_default() {
        assert_eq!(source_weight("Reuters"), 10.0);
        assert_eq!(source_weight("Random Blog"), 3.0);
        assert_eq!(source_weight(""), 3.0);
    }

    #[test]
    fn source_weight_partial_match() {
        assert_eq!(source_weight("BBC News"), 8.0);
    }

    #[test]
    fn recency_fresh_old_and_mid() {
        assert!(recency_score(&iso_hours_ago(0)) > 9.0);
        assert!(recency_score(&iso_hours_ago(72)) <= 2.0);
        let mid = recency_score(&iso_hours_ago(36));
        assert!(mid > 4.0 && mid < 7.0);
    }

    #[test]
    fn recency_unparsable_scores_minimally() {
        assert_eq!(recency_score("not a date"), 2.0);
        assert_eq!(recency_score(""), 2.0);
    }

    #[test]
    fn recency_never_below_one() {
        assert_eq!(recency_score(&iso_hours_ago(24 * 90)), 1.0);
    }

    #[test]
    fn keyword_bonus_zero_without_matches() {
        assert_eq!(keyword_bonus("Market update today", ""), 0.0);
    }

    #[test]
    fn keyword_bonus_scales_with_matches() {
        assert!(keyword_bonus("Fed announces rate cut", "") > 0.0);
        assert!(keyword_bonus("War crisis crash recession", "") >= 3.0);
    }

    #[test]
    fn keyword_bonus_is_capped() {
        let stuffed = "war crash recession crisis default collapse bank run nuclear";
        assert!(keyword_bonus(stuffed, "") <= 6.0);
    }

    #[test]
    fn topic_weight_table() {
        assert_eq!(topic_weight("banki centralne"), 3.0);
        assert_eq!(topic_weight("inne"), 0.5);
        assert_eq!(topic_weight("unmapped"), 0.5);
    }

    #[test]
    fn composite_high_impact_scores_high() {
        let art = make_article(
            "War escalates as sanctions imposed",
            "Reuters",
            &iso_hours_ago(0),
            "konflikt",
        );
        assert!(score_article(&art, &ScoreWeights::default()) > 30.0);
    }

    #[test]
    fn composite_bland_scores_low() {
        let art = make_article(
            "Regular market update",
            "Unknown Blog",
            &iso_hours_ago(70),
            "inne",
        );
        assert!(score_article(&art, &ScoreWeights::default()) < 15.0);
    }

    #[test]
    fn higher_trust_source_never_scores_lower() {
        let weights = ScoreWeights::default();
        let when = iso_hours_ago(10);
        let trusted = make_article("Same headline", "Reuters", &when, "makro");
        let unknown = make_article("Same headline", "Random Blog", &when, "makro");
        assert!(score_article(&trusted, &weights) >= score_article(&unknown, &weights));
    }

    #[test]
    fn more_recent_never_scores_lower() {
        let weights = ScoreWeights::default();
        let newer = make_article("Same headline", "Reuters", &iso_hours_ago(1), "makro");
        let older = make_article("Same headline", "Reuters", &iso_hours_ago(50), "makro");
        assert!(score_article(&newer, &weights) >= score_article(&older, &weights));
    }

    #[test]
    fn empty_input_selects_nothing() {
        assert!(select_news_of_day(&[], &ScoreWeights::default()).is_none());
    }

    #[test]
    fn single_article_is_selected() {
        let arts = vec![make_article("Only news", "Reuters", &iso_hours_ago(0), "makro")];
        let result = select_news_of_day(&arts, &ScoreWeights::default()).unwrap();
        assert_eq!(result.selected.title, "Only news");
    }

    #[test]
    fn best_article_wins() {
        let weak = make_article("Regular update", "Unknown", &iso_hours_ago(60), "inne");
        let strong = make_article(
            "Fed emergency rate cut shocks markets",
            "Reuters",
            &iso_hours_ago(0),
            "banki centralne",
        );
        let result = select_news_of_day(&[weak, strong.clone()], &ScoreWeights::default()).unwrap();
        assert_eq!(result.selected.title, strong.title);
    }

    #[test]
    fn ties_break_to_first_occurrence() {
        let when = iso_hours_ago(5);
        let first = make_article("Identical score A", "Reuters", &when, "makro");
        let second = make_article("Identical score B", "Reuters", &when, "makro");
        let result = select_news_of_day(&[first, second], &ScoreWeights::default()).unwrap();
        assert_eq!(result.selected.title, "Identical score A");
    }

    #[test]
    fn result_shape_within_bounds() {
        let arts = vec![make_article("Test", "Reuters", &iso_hours_ago(0), "makro")];
        let result = select_news_of_day(&arts, &ScoreWeights::default()).unwrap();
        assert!(result.justification.len() >= 3 && result.justification.len() <= 6);
        assert!(result.watch_signals.len() >= 2 && result.watch_signals.len() <= 5);
    }

    #[test]
    fn justification_names_source_and_total() {
        let arts = vec![make_article("Test", "Reuters", &iso_hours_ago(0), "makro")];
        let result = select_news_of_day(&arts, &ScoreWeights::default()).unwrap();
        assert!(result.justification.iter().any(|j| j.contains("Reuters")));
        assert!(result.justification.iter().any(|j| j.contains("Łączny scoring")));
    }

    #[test]
    fn repeated_topic_produces_trend_signal() {
        let mut arts = vec![make_article(
            "Fed cuts rates",
            "Reuters",
            &iso_hours_ago(0),
            "banki centralne",
        )];
        for i in 0..3 {
            arts.push(make_article(
                &format!("Central bank watch {}", i),
                "Unknown",
                &iso_hours_ago(40),
                "banki centralne",
            ));
        }
        let result = select_news_of_day(&arts, &ScoreWeights::default()).unwrap();
        assert!(result
            .watch_signals
            .iter()
            .any(|s| s.contains("powtarza się")));
    }

    #[test]
    fn fed_story_beats_weather_blog() {
        let mut arts = vec![
            Article {
                topic: None,
                region: None,
                ..make_article("Fed cuts rates", "Reuters", &iso_hours_ago(0), "inne")
            },
            Article {
                topic: None,
                region: None,
                ..make_article("Local weather report", "Unknown Blog", &iso_hours_ago(70), "inne")
            },
        ];
        classify_articles(&mut arts);

        let weights = ScoreWeights::default();
        let fed_score = score_article(&arts[0], &weights);
        let weather_score = score_article(&arts[1], &weights);

        let result = select_news_of_day(&arts, &weights).unwrap();
        assert_eq!(result.selected.title, "Fed cuts rates");
        // Margin reflects source trust (10 vs 3) and topic priority
        // (banki centralne 3.0 vs inne 0.5) on top of recency.
        assert!(fed_score - weather_score > (10.0 - 3.0) * weights.source);
    }
}
