//! Traditional search-engine scoring rubric
//!
//! Twelve independently-scored factors tuned for classic ranking signals.
//! Evaluation is a pure function over [`PageSignals`]: no I/O, no clock, no
//! mutation, and it never fails for any well-formed input.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

use crate::scoring::{self, order_factors};
use crate::types::{Evaluation, PageSignals, ScoreFactor};

/// Canonical display order; also the closed factor-name enumeration.
pub const CANONICAL_ORDER: [&str; 12] = [
    "title_tag",
    "meta_description",
    "header_tags",
    "content_quality",
    "structured_data",
    "canonical_tag",
    "internal_links",
    "image_optimization",
    "mobile_optimization",
    "https_security",
    "page_speed",
    "language_locale",
];

pub const RAW_POINTS_MAX: u32 = 130;

static RE_VIEWPORT_META: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<meta\b[^>]*name\s*=\s*["']viewport["']"#).expect("invalid viewport regex")
});

/// Scores classic search-ranking signals against the fixed 130-point rubric.
pub struct TraditionalScorer;

impl TraditionalScorer {
    pub fn evaluate(&self, signals: &PageSignals) -> Evaluation {
        let factors = vec![
            score_title(signals),
            score_meta_description(signals),
            score_header_tags(signals),
            score_content_quality(signals),
            score_structured_data(signals),
            score_canonical(signals),
            score_internal_links(signals),
            score_image_optimization(signals),
            score_mobile_optimization(signals),
            score_https(signals),
            score_page_speed(signals),
            score_language(signals),
        ];

        let mut derived_flags = BTreeMap::new();
        derived_flags.insert("has_title".to_string(), signals.title.is_some());
        derived_flags.insert(
            "has_meta_description".to_string(),
            signals.meta_description.is_some(),
        );
        derived_flags.insert(
            "has_canonical".to_string(),
            signals.canonical_url.is_some(),
        );
        derived_flags.insert(
            "has_structured_data".to_string(),
            !signals.structured_data_blocks.is_empty(),
        );
        derived_flags.insert(
            "has_viewport_meta".to_string(),
            RE_VIEWPORT_META.is_match(&signals.raw_html),
        );
        derived_flags.insert("is_https".to_string(), is_https(&signals.url));
        derived_flags.insert(
            "has_language_tag".to_string(),
            signals.language_tag.is_some(),
        );

        let raw_points = factors.iter().map(|f| f.points_awarded).sum();

        Evaluation {
            normalized_score: scoring::normalize_score(raw_points, RAW_POINTS_MAX),
            raw_points,
            raw_points_max: RAW_POINTS_MAX,
            factors: order_factors(factors, &CANONICAL_ORDER),
            derived_flags,
        }
    }

    /// Maximum awardable points for a factor name, `None` for unknown names.
    pub fn factor_max(name: &str) -> Option<u32> {
        match name {
            "title_tag" | "meta_description" | "header_tags" => Some(15),
            "content_quality" => Some(12),
            "structured_data" | "internal_links" | "image_optimization" => Some(10),
            "canonical_tag" | "mobile_optimization" | "page_speed" => Some(7),
            "https_security" | "language_locale" => Some(5),
            _ => None,
        }
    }
}

fn score_title(signals: &PageSignals) -> ScoreFactor {
    match signals.title.as_deref() {
        None => ScoreFactor::new("title_tag", 0, "no title tag found"),
        Some(title) => {
            let length = title.chars().count();
            let points = if (50..=60).contains(&length) {
                15
            } else if (30..50).contains(&length) {
                10
            } else {
                5
            };
            ScoreFactor::new("title_tag", points, format!("title is {length} characters"))
        }
    }
}

fn score_meta_description(signals: &PageSignals) -> ScoreFactor {
    match signals.meta_description.as_deref() {
        None => ScoreFactor::new("meta_description", 0, "no meta description found"),
        Some(description) => {
            let length = description.chars().count();
            let points = if (150..=160).contains(&length) {
                15
            } else if (120..150).contains(&length) {
                12
            } else {
                5
            };
            ScoreFactor::new(
                "meta_description",
                points,
                format!("meta description is {length} characters"),
            )
        }
    }
}

fn score_header_tags(signals: &PageSignals) -> ScoreFactor {
    let h1_count = signals.h1_headings.len();
    let h2_count = signals.h2_headings.len();

    let points = if h1_count == 1 && h2_count >= 4 {
        15
    } else if h1_count == 1 && h2_count >= 2 {
        10
    } else if h1_count >= 1 {
        5
    } else {
        0
    };

    ScoreFactor::new(
        "header_tags",
        points,
        format!("{h1_count} H1 and {h2_count} H2 headings"),
    )
}

fn score_content_quality(signals: &PageSignals) -> ScoreFactor {
    let words = signals.word_count;
    let points = if words >= 1500 {
        12
    } else if words >= 800 {
        10
    } else if words >= 300 {
        5
    } else {
        0
    };
    ScoreFactor::new("content_quality", points, format!("{words} words of content"))
}

fn score_structured_data(signals: &PageSignals) -> ScoreFactor {
    let blocks = signals.structured_data_blocks.len();
    let points = match blocks {
        0 => 0,
        1 => 7,
        _ => 10,
    };
    ScoreFactor::new(
        "structured_data",
        points,
        format!("{blocks} JSON-LD blocks found"),
    )
}

fn score_canonical(signals: &PageSignals) -> ScoreFactor {
    match signals.canonical_url.as_deref() {
        Some(canonical) => ScoreFactor::new(
            "canonical_tag",
            7,
            format!("canonical URL set to {canonical}"),
        ),
        None => ScoreFactor::new("canonical_tag", 0, "no canonical URL found"),
    }
}

fn score_internal_links(signals: &PageSignals) -> ScoreFactor {
    let count = scoring::internal_link_count(&signals.raw_html);
    let points = if count >= 5 {
        10
    } else if count >= 3 {
        6
    } else {
        2
    };
    ScoreFactor::new(
        "internal_links",
        points,
        format!("{count} internal links found"),
    )
}

fn score_image_optimization(signals: &PageSignals) -> ScoreFactor {
    let (total, with_alt) = scoring::image_alt_stats(&signals.raw_html);

    // Zero images count as full coverage here; the AI-readiness rubric
    // treats the same case as unoptimized. Both behaviors are contractual.
    let coverage = if total == 0 {
        1.0
    } else {
        with_alt as f64 / total as f64
    };
    let points = if coverage >= 0.9 {
        10
    } else if coverage >= 0.5 {
        6
    } else {
        2
    };

    let explanation = if total == 0 {
        "no images on page".to_string()
    } else {
        format!("alt text on {with_alt} of {total} images")
    };
    ScoreFactor::new("image_optimization", points, explanation)
}

fn score_mobile_optimization(signals: &PageSignals) -> ScoreFactor {
    if RE_VIEWPORT_META.is_match(&signals.raw_html) {
        ScoreFactor::new("mobile_optimization", 7, "viewport meta tag present")
    } else {
        ScoreFactor::new("mobile_optimization", 0, "no viewport meta tag found")
    }
}

fn score_https(signals: &PageSignals) -> ScoreFactor {
    if is_https(&signals.url) {
        ScoreFactor::new("https_security", 5, "page served over https")
    } else {
        ScoreFactor::new("https_security", 0, "page not served over https")
    }
}

fn score_page_speed(signals: &PageSignals) -> ScoreFactor {
    let ms = signals.load_time_ms;
    let points = if ms <= 1500 {
        7
    } else if ms <= 3000 {
        5
    } else {
        2
    };
    ScoreFactor::new("page_speed", points, format!("page loaded in {ms} ms"))
}

fn score_language(signals: &PageSignals) -> ScoreFactor {
    match signals.language_tag.as_deref() {
        Some(tag) => ScoreFactor::new("language_locale", 5, format!("language tag \"{tag}\" set")),
        None => ScoreFactor::new("language_locale", 0, "no language tag found"),
    }
}

fn is_https(url: &str) -> bool {
    match Url::parse(url) {
        Ok(parsed) => parsed.scheme() == "https",
        Err(_) => url.trim_start().to_ascii_lowercase().starts_with("https://"),
    }
}
