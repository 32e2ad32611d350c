//! # ranklens-core
//!
//! Core library for scoring fetched web pages against two heuristic quality
//! rubrics:
//!
//! - a **traditional** rubric tuned for classic search-engine ranking
//!   signals (title, meta description, headings, content length, ...)
//! - an **AI-readiness** rubric tuned for generative-answer-engine citation
//!   likelihood (conversational headers, FAQ schema, E-E-A-T, authority
//!   citations), configurable per vertical
//!
//! Both rubrics are deterministic point tables evaluated against a
//! [`PageSignals`] record extracted from raw HTML. Scoring is pure
//! computation: the same signals and evaluation instant always produce the
//! same [`Evaluation`].
//!
//! ## Features
//!
//! - `default`: extraction and scoring, no network access
//! - `recommend`: recommendation generation through an external
//!   language-model endpoint (pulls in `reqwest` and `tokio`)
//!
//! ## Example
//!
//! ```
//! use chrono::Utc;
//! use ranklens_core::{extract_signals, AiReadinessScorer, RubricConfig, TraditionalScorer};
//!
//! let html = r#"
//!     <html lang="en"><head><title>What is a standing desk?</title></head>
//!     <body><h1>What is a standing desk?</h1></body></html>
//! "#;
//!
//! let signals = extract_signals("https://example.com/desks", html, 900, 200);
//! let seo = TraditionalScorer.evaluate(&signals);
//! let geo = AiReadinessScorer::new(RubricConfig::business()).evaluate(&signals, Utc::now());
//!
//! assert!(seo.normalized_score <= 100);
//! assert!(geo.normalized_score <= 100);
//! ```

pub mod extractor;
pub mod scoring;
pub mod types;

#[cfg(feature = "recommend")]
pub mod recommend;

// Re-export commonly used items
pub use extractor::{extract_json_ld_blocks, extract_signals, sanitize_html};
pub use scoring::ai_readiness::{AiReadinessScorer, RubricConfig};
pub use scoring::order_factors;
pub use scoring::traditional::TraditionalScorer;
pub use types::{Evaluation, PageSignals, ScoreFactor};

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn sample_html() -> &'static str {
        r#"
        <html lang="en">
            <head>
                <title>How to fix a leaking tap: a practical repair guide</title>
                <meta name="description" content="Step-by-step instructions for fixing a leaking tap, the tools you need, and when to call a plumber instead of doing it yourself at home.">
                <meta name="viewport" content="width=device-width, initial-scale=1">
                <link rel="canonical" href="https://example.com/leaking-tap">
                <script type="application/ld+json">
                {"@context": "https://schema.org", "@type": "FAQPage"}
                </script>
                <script type="application/ld+json">
                {"@context": "https://schema.org", "@type": "Organization", "name": "Example"}
                </script>
            </head>
            <body>
                <h1>How to fix a leaking tap</h1>
                <h2>What tools do you need?</h2>
                <h2>Which washer should you buy?</h2>
                <h2>When should you call a plumber?</h2>
                <h2>How long does the repair take?</h2>
                <ul><li>Adjustable wrench</li><li>Replacement washer</li></ul>
                <a href="/guides">More guides</a>
                <a href="/tools">Tool reviews</a>
                <a href="/contact">Contact</a>
                <img src="tap.jpg" alt="A disassembled tap">
                <p>Written by our team. According to industry research, 30% of
                   indoor water waste comes from drips. Updated 2026.</p>
            </body>
        </html>
        "#
    }

    #[test]
    fn test_full_pipeline_both_components() {
        let signals = extract_signals("https://example.com/leaking-tap", sample_html(), 1200, 200);

        let seo = TraditionalScorer.evaluate(&signals);
        let geo = AiReadinessScorer::new(RubricConfig::business())
            .evaluate(&signals, Utc.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).unwrap());

        assert!(seo.normalized_score > 50);
        assert!(geo.normalized_score > 50);
        assert_eq!(seo.raw_points, seo.factor_point_sum());
        assert_eq!(geo.raw_points, geo.factor_point_sum());
        assert_eq!(seo.factors.len(), 12);
        assert_eq!(geo.factors.len(), 14);
    }

    #[test]
    fn test_components_are_independent() {
        // running the scorers in either order gives identical results
        let signals = extract_signals("https://example.com/leaking-tap", sample_html(), 1200, 200);
        let instant = Utc.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).unwrap();
        let scorer = AiReadinessScorer::new(RubricConfig::business());

        let geo_first = scorer.evaluate(&signals, instant);
        let seo = TraditionalScorer.evaluate(&signals);
        let geo_second = scorer.evaluate(&signals, instant);

        assert_eq!(
            serde_json::to_string(&geo_first).unwrap(),
            serde_json::to_string(&geo_second).unwrap()
        );
        assert!(seo.normalized_score <= 100);
    }
}
