//! Deterministic region and topic classification.
//!
//! No ML, just ordered keyword tables evaluated top to bottom; the first
//! matching rule wins. Transparent and auditable.

use regex::Regex;
use std::sync::LazyLock;

use crate::models::Article;

pub const DEFAULT_REGION: &str = "Świat";
pub const DEFAULT_TOPIC: &str = "inne";

// Region rules. Order matters: the most specific geography (home market)
// comes before the continental blocks, so an article naming both a country
// and its continent resolves to the country.
#[rustfmt::skip]
static REGION_RULES: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    vec![
        ("Polska", Regex::new(
            r"(?i)\b(poland|polish|polska|warszaw|gpw|wig\d*|nbp|pln|zloty|złot|tusk|morawiecki|kaczyński|sejm|senat|orlen|kghm|pekao|pko\s?bp|allegro\.pl|biedronka|żabka|gdańsk|kraków|wrocław|łódź|poznań|katowice)\b",
        ).unwrap()),
        ("Europa", Regex::new(
            r"(?i)\b(europ\w*|eu\b|euro\s?zone|eurozone|ecb|lagarde|euro\b|german\w*|france|french|italy|italian|spain|spanish|dutch|netherlands|belgium|austria\w*|switzerland|swiss|sweden|norway|denmark|finland|portugal|greece|ireland|czech|hungar\w*|romania|bulgaria|croatia|brexit|uk\b|britain|british|london|paris|berlin|frankfurt|dax\b|stoxx|ftse|cac\s?40|bund|gilt|boe\b|bank\s?of\s?england|bundesbank|nato\b)\b",
        ).unwrap()),
        ("Ameryka Pn.", Regex::new(
            r"(?i)\b(usa|u\.s\.|united\s?states|america|washington|wall\s?street|fed\b|federal\s?reserve|powell|yellen|treasury|congress|senate|s&p\s?500|nasdaq|dow\s?jones|nyse|spy\b|qqq\b|silicon\s?valley|california|texas|new\s?york|chicago|canada|canadian|toronto|tsx|mexico|mexican|peso|trump|biden|white\s?house)\b",
        ).unwrap()),
        ("Azja", Regex::new(
            r"(?i)\b(china|chinese|beijing|shanghai|hong\s?kong|taiwan|taipei|japan|japanese|tokyo|nikkei|boj\b|yen\b|abe\b|korea|korean|seoul|kospi|samsung|india|indian|mumbai|sensex|nifty|rupee|modi\b|asean|singapore|indonesia|vietnam|thailand|malaysia|philippines|asia|asian)\b",
        ).unwrap()),
        ("Australia", Regex::new(
            r"(?i)\b(australia|australian|sydney|asx\b|rba\b|aud\b|new\s?zealand|nzd\b|rbnz)\b",
        ).unwrap()),
    ]
});

// Topic rules, ordered by priority.
#[rustfmt::skip]
static TOPIC_RULES: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    vec![
        ("banki centralne", Regex::new(
            r"(?i)\b(central\s?bank|fed\b|federal\s?reserve|ecb|boe|boj|rba|rbnz|nbp|pboc|rate\s?decision|interest\s?rate|stopy\s?proc|monetary\s?policy|quantitative|tapering|hawkish|dovish|powell|lagarde|ueda)\b",
        ).unwrap()),
        ("inflacja/stopy", Regex::new(
            r"(?i)\b(inflat|cpi\b|pce\b|deflat|price\s?index|consumer\s?price|core\s?inflation|disinflat|stagflat|hyperinflat|yield|bond\s?yield|treasury\s?yield|bund\s?yield)\b",
        ).unwrap()),
        ("rynek pracy", Regex::new(
            r"(?i)\b(employ|unemploy|jobless|payroll|non.?farm|labor|labour|hiring|layoff|job\s?market|workforce|wage|salary|zatrudnieni|bezroboci|rynek\s?pracy)\b",
        ).unwrap()),
        ("energia", Regex::new(
            r"(?i)\b(oil\b|crude|brent|wti|opec|natural\s?gas|lng\b|petroleum|energy\s?crisis|energy\s?price|solar|wind\s?power|nuclear|coal\b|ropa\b|gaz\b|energia)\b",
        ).unwrap()),
        ("handel", Regex::new(
            r"(?i)\b(trade\s?war|tariff\w*|sanction\w*|embargo\w*|import\s?dut\w*|export\s?ban|trade\s?deal|trade\s?deficit|trade\s?surplus|wto\b|nafta\b|usmca|supply\s?chain|shipping|port\b|freight|handel|cło|cła)\b",
        ).unwrap()),
        ("konflikt", Regex::new(
            r"(?i)\b(war\b|conflict|military|invasion|attack|missile|drone\s?strike|geopoliti|tension|escalat|cease.?fire|peace\s?talk|nato|nuclear\s?threat|sanction|ukrain|russia|gaza|israel|iran|north\s?korea|wojna|konflikt)\b",
        ).unwrap()),
        ("tech/AI", Regex::new(
            r"(?i)\b(ai\b|artificial\s?intelligen|machine\s?learn|deep\s?learn|chatgpt|openai|google\s?ai|nvidia|semiconductor|chip\b|chips\b|tech\s?stock|big\s?tech|apple|microsoft|amazon|alphabet|meta|tesla|startup|fintech|blockchain|quantum\s?comput|sztuczn|technologi)\b",
        ).unwrap()),
        ("makro", Regex::new(
            r"(?i)\b(gdp\b|pkb\b|pmi\b|recession|growth|economic\s?growth|fiscal|budget|debt\s?ceiling|sovereign\s?debt|deficit|stimulus|spending|austerity|imf\b|world\s?bank|wzrost|recesja|produkcja\s?przemysłowa)\b",
        ).unwrap()),
        ("nieruchomości", Regex::new(
            r"(?i)\b(real\s?estate|housing|mortgage|property|home\s?price|rent\b|construction|nieruchomości|mieszkani)\b",
        ).unwrap()),
        ("krypto", Regex::new(
            r"(?i)\b(bitcoin|btc\b|ethereum|eth\b|crypto|defi|nft\b|stablecoin|binance|coinbase|token|halving|kryptowalut)\b",
        ).unwrap()),
        ("surowce", Regex::new(
            r"(?i)\b(gold\b|silver\b|copper|platinum|palladium|iron\s?ore|wheat|corn\b|soybean|coffee|cocoa|sugar|commodity|commodities|złoto|srebro|miedź|surowc)\b",
        ).unwrap()),
    ]
});

fn first_match(rules: &[(&'static str, Regex)], text: &str, default: &'static str) -> &'static str {
    rules
        .iter()
        .find(|(_, pattern)| pattern.is_match(text))
        .map(|(label, _)| *label)
        .unwrap_or(default)
}

/// Region tag for an article text. First matching rule wins.
pub fn classify_region(title: &str, description: &str) -> &'static str {
    let text = format!("{} {}", title, description);
    first_match(&REGION_RULES, &text, DEFAULT_REGION)
}

/// Topic tag for an article text. First matching rule wins.
pub fn classify_topic(title: &str, description: &str) -> &'static str {
    let text = format!("{} {}", title, description);
    first_match(&TOPIC_RULES, &text, DEFAULT_TOPIC)
}

/// Enrich one article with region and topic tags.
pub fn classify_article(article: &mut Article) {
    article.region = Some(classify_region(&article.title, &article.description).to_string());
    article.topic = Some(classify_topic(&article.title, &article.description).to_string());
}

pub fn classify_articles(articles: &mut [Article]) {
    for art in articles.iter_mut() {
        classify_article(art);
    }
}

/// Backfill tags on rows that predate classification. Already-tagged rows
/// are left untouched; stored articles are otherwise immutable.
pub fn ensure_classified(articles: &mut [Article]) {
    for art in articles.iter_mut() {
        if art.region.is_none() {
            art.region = Some(classify_region(&art.title, &art.description).to_string());
        }
        if art.topic.is_none() {
            art.topic = Some(classify_topic(&art.title, &art.description).to_string());
        }
    }
}
