//! Plain-text rendering of the macro payload for the downstream LLM prompt.
//!
//! Section order and headers are part of the contract: prompt text must be
//! stable and diffable.

use crate::out_models::MacroPayload;

fn truncate_chars(s: &str, cap: usize) -> String {
    s.chars().take(cap).collect()
}

pub fn format_macro_payload_for_llm(payload: &MacroPayload) -> String {
    let mut parts: Vec<String> = Vec::new();

    if let Some(nod) = &payload.news_of_day {
        let sel = &nod.selected;
        parts.push("=== NEWS DNIA ===".to_string());
        parts.push(format!(
            "Tytuł: {}",
            if sel.title.is_empty() { "brak" } else { &sel.title }
        ));
        parts.push(format!(
            "Źródło: {} | Region: {} | Temat: {}",
            sel.source,
            sel.region.as_deref().unwrap_or(""),
            sel.topic.as_deref().unwrap_or("")
        ));
        parts.push(format!("Score: {}", nod.score));
        parts.push("Uzasadnienie:".to_string());
        for j in &nod.justification {
            parts.push(format!("  - {}", j));
        }
        parts.push("Co obserwować:".to_string());
        for s in &nod.watch_signals {
            parts.push(format!("  - {}", s));
        }
        parts.push(String::new());
    }

    if !payload.geo_24h.is_empty() {
        parts.push("=== GEO 24H (per region) ===".to_string());
        for (region, articles) in &payload.geo_24h {
            parts.push(format!("\n[{}] ({} news)", region, articles.len()));
            for a in articles.iter().take(3) {
                parts.push(format!("  - {}", truncate_chars(&a.title, 100)));
            }
        }
        parts.push(String::new());
    }

    if !payload.articles_24h.is_empty() {
        parts.push(format!("=== NEWSY 24-72H (top {}) ===", payload.articles_24h.len()));
        for (i, a) in payload.articles_24h.iter().take(15).enumerate() {
            parts.push(format!(
                "{}. [{}] {} | {} | {}",
                i + 1,
                a.source,
                a.title,
                a.region,
                a.topic
            ));
            if !a.description.is_empty() {
                parts.push(format!("   {}", a.description));
            }
        }
        parts.push(String::new());
    }

    let aggregates = payload.trend.aggregates.iter();
    if aggregates.iter().any(|(_, agg)| agg.count > 0) {
        parts.push("=== TREND NARRACJI ===".to_string());
        for (window, agg) in aggregates {
            if agg.count == 0 {
                continue;
            }
            let regions = agg
                .top_regions
                .iter()
                .map(|r| format!("{}({})", r.region, r.count))
                .collect::<Vec<_>>()
                .join(", ");
            let topics = agg
                .top_topics
                .iter()
                .map(|t| format!("{}({})", t.topic, t.count))
                .collect::<Vec<_>>()
                .join(", ");
            let keywords = agg.top_keywords.join(", ");
            parts.push(format!(
                "[{}] {} art. | regiony: {} | tematy: {} | keywords: {}",
                window, agg.count, regions, topics, keywords
            ));
        }
        parts.push(String::new());
    }

    if !payload.trend.diffs.is_empty() {
        parts.push("Porównanie trendów:".to_string());
        for diff in &payload.trend.diffs {
            parts.push(format!(
                "  {}: {} (temat 24h: {} vs okno: {})",
                diff.window,
                diff.signal,
                diff.details.dominant_topic_24h.as_deref().unwrap_or("?"),
                diff.details.dominant_topic_window.as_deref().unwrap_or("?")
            ));
            if !diff.details.new_keywords.is_empty() {
                parts.push(format!(
                    "    Nowe keywords: {}",
                    diff.details.new_keywords.join(", ")
                ));
            }
        }
        parts.push(String::new());
    }

    parts.join("\n")
}
