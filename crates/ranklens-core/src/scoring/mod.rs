//! Rubric scoring engine
//!
//! Both scoring components are additive tables of independently-scored,
//! weighted factors evaluated against [`PageSignals`](crate::PageSignals).
//! This module holds the normalization and display-order helpers plus the
//! markup pattern counters the two rubrics share.

pub mod ai_readiness;
pub mod traditional;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::ScoreFactor;

static RE_ANCHOR_HREF: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<a\b[^>]*?href\s*=\s*["']([^"']*)["']"#).expect("invalid anchor regex")
});
static RE_IMG_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<img\b[^>]*>").expect("invalid img regex"));
static RE_IMG_ALT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)\balt\s*=\s*["'][^"']+["']"#).expect("invalid alt regex")
});

/// Normalize an additive raw score onto the 0-100 scale, clamped.
pub(crate) fn normalize_score(raw_points: u32, raw_points_max: u32) -> u8 {
    if raw_points_max == 0 {
        return 0;
    }
    let scaled = (raw_points as f64 / raw_points_max as f64 * 100.0).round();
    scaled.clamp(0.0, 100.0) as u8
}

/// Re-sort factors into a fixed canonical name sequence.
///
/// Factors whose name is not in `canonical` are dropped; canonical names
/// absent from the input are omitted, never synthesized. Purely cosmetic:
/// ordering never affects scoring. Idempotent.
pub fn order_factors(factors: Vec<ScoreFactor>, canonical: &[&str]) -> Vec<ScoreFactor> {
    let mut remaining = factors;
    let mut ordered = Vec::with_capacity(remaining.len());
    for name in canonical {
        if let Some(pos) = remaining.iter().position(|f| f.name == *name) {
            ordered.push(remaining.remove(pos));
        }
    }
    ordered
}

/// Count anchors whose href does not start with an absolute http(s) scheme.
///
/// Relative, anchor, and protocol-relative hrefs all count; this is the
/// rubric's lossy notion of an internal link.
pub(crate) fn internal_link_count(html: &str) -> usize {
    RE_ANCHOR_HREF
        .captures_iter(html)
        .filter(|caps| {
            let href = caps[1].trim().to_ascii_lowercase();
            !href.starts_with("http://") && !href.starts_with("https://")
        })
        .count()
}

/// All anchor href values in document order, lowercased.
pub(crate) fn anchor_hrefs(html: &str) -> Vec<String> {
    RE_ANCHOR_HREF
        .captures_iter(html)
        .map(|caps| caps[1].trim().to_ascii_lowercase())
        .collect()
}

/// `(total <img> tags, tags carrying a non-empty alt attribute)`
pub(crate) fn image_alt_stats(html: &str) -> (usize, usize) {
    let mut total = 0;
    let mut with_alt = 0;
    for tag in RE_IMG_TAG.find_iter(html) {
        total += 1;
        if RE_IMG_ALT.is_match(tag.as_str()) {
            with_alt += 1;
        }
    }
    (total, with_alt)
}
