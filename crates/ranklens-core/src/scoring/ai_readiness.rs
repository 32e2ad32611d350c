//! AI-search-readiness scoring rubric
//!
//! Fourteen weighted factors tuned for generative-answer-engine citation
//! likelihood: conversational headers, FAQ schema, question coverage,
//! authority citations, E-E-A-T trust indicators. One rubric, parameterized
//! by a [`RubricConfig`] chosen at construction time; the medical and
//! business profiles differ only in keyword lists, schema allowlists and a
//! few tier weights.
//!
//! Evaluation is pure except for `content_freshness`, which is a function of
//! the calendar year of the `evaluated_at` argument. Passing the instant in
//! explicitly keeps the one time dependency visible in the signature.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::scoring::{self, order_factors};
use crate::types::{Evaluation, PageSignals, ScoreFactor};

pub const RAW_POINTS_MAX: u32 = 150;

/// Question-trigger words are fixed across profiles.
static RE_QUESTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(what|how|why|when|where|who|which|can|should|does|do|is|are)\b[^?]{0,120}\?")
        .expect("invalid question regex")
});
static RE_FAQ_HEADING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)frequently asked questions|>\s*faqs?\s*<").expect("invalid faq regex")
});
static RE_LIST_OR_TABLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<(ol|ul|table)\b").expect("invalid list regex"));
static RE_STATISTICS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b\d+(?:\.\d+)?\s*(?:%|percent\b)|\b\d+(?:\.\d+)?x\b")
        .expect("invalid statistics regex")
});

/// Keyword lists, schema allowlist and tier weights for one rubric profile.
///
/// Selected when the scorer is constructed and never switched during an
/// evaluation.
#[derive(Debug, Clone)]
pub struct RubricConfig {
    pub name: &'static str,
    /// Identifier of the question-driven factor in this profile.
    pub voice_factor: &'static str,
    /// Schema type names that count as vertical-specific structured data.
    pub vertical_schema_types: &'static [&'static str],
    /// Full `structured_data` points require FAQ schema alongside a vertical
    /// type (the combined-schema variant).
    pub require_faq_with_vertical: bool,
    pub conversational_triggers: &'static [&'static str],
    pub authority_keywords: &'static [&'static str],
    pub trusted_domains: &'static [&'static str],
    /// Distinct trust-indicator patterns; the count of patterns that match
    /// drives `eeat_signals`.
    pub trust_indicator_patterns: &'static [&'static str],
    /// `(minimum indicator count, points)` tiers, highest first.
    pub eeat_tiers: &'static [(usize, u32)],
    pub meta_title_points: u32,
    pub meta_description_points: u32,
}

impl RubricConfig {
    /// Medical-vertical profile: clinical schema types, credential-heavy
    /// trust indicators, three indicators needed for full E-E-A-T points.
    pub fn medical() -> Self {
        Self {
            name: "medical",
            voice_factor: "voice_search",
            vertical_schema_types: &[
                "MedicalWebPage",
                "MedicalClinic",
                "Physician",
                "MedicalOrganization",
                "HealthTopicContent",
            ],
            require_faq_with_vertical: true,
            conversational_triggers: &[
                "what", "how", "why", "when", "which", "guide", "symptoms", "treatment",
            ],
            authority_keywords: &[
                "according to",
                "study",
                "research",
                "clinical",
                "journal",
                "peer-reviewed",
            ],
            trusted_domains: &[
                "nih.gov",
                "who.int",
                "cdc.gov",
                "pubmed",
                "thelancet.com",
                "nejm.org",
            ],
            trust_indicator_patterns: &[
                r"(?i)(written by|posted by|byline|\bauthor\b)",
                r"(?i)\b(m\.?d\.?|board-certified|physician|pharmd|specialist)\b",
                r"(?i)(medically reviewed|reviewed by|fact[- ]checked)",
                r"(?i)(about us|our team|editorial policy)",
            ],
            eeat_tiers: &[(3, 13), (2, 9), (1, 4)],
            meta_title_points: 5,
            meta_description_points: 5,
        }
    }

    /// Business-vertical profile: commercial schema types, two indicators
    /// needed for full E-E-A-T points.
    pub fn business() -> Self {
        Self {
            name: "business",
            voice_factor: "ai_search_ready",
            vertical_schema_types: &[
                "Organization",
                "LocalBusiness",
                "Product",
                "Service",
                "ProfessionalService",
            ],
            require_faq_with_vertical: false,
            conversational_triggers: &[
                "what", "how", "why", "when", "which", "guide", "best", "vs",
            ],
            authority_keywords: &[
                "according to",
                "study",
                "research",
                "report",
                "survey",
                "industry",
            ],
            trusted_domains: &[
                ".gov",
                ".edu",
                "forbes.com",
                "harvard.edu",
                "mckinsey.com",
                "gartner.com",
            ],
            trust_indicator_patterns: &[
                r"(?i)(written by|posted by|byline|\bauthor\b)",
                r"(?i)\b(mba|cpa|ph\.?d\.?|certified|years of experience)\b",
                r"(?i)(about us|our team|our story)",
            ],
            eeat_tiers: &[(2, 13), (1, 6)],
            meta_title_points: 4,
            meta_description_points: 4,
        }
    }
}

/// Boolean and count signals computed once per evaluation and shared across
/// factors.
struct DerivedSignals {
    has_structured_data: bool,
    has_faq_schema: bool,
    has_vertical_schema: bool,
    has_faq_content: bool,
    question_count: usize,
    has_conversational_headers: bool,
    has_structured_formatting: bool,
    has_citations: bool,
    has_high_quality_citations: bool,
    has_statistics: bool,
    eeat_count: usize,
    image_total: usize,
    image_with_alt: usize,
    internal_link_count: usize,
    has_content_freshness: bool,
}

/// Scores generative-answer-engine readiness against the fixed 150-point
/// rubric of the profile supplied at construction.
pub struct AiReadinessScorer {
    config: RubricConfig,
    trust_indicators: Vec<Regex>,
}

impl AiReadinessScorer {
    pub fn new(config: RubricConfig) -> Self {
        let trust_indicators = config
            .trust_indicator_patterns
            .iter()
            .map(|pattern| Regex::new(pattern).expect("invalid trust indicator regex"))
            .collect();
        Self {
            config,
            trust_indicators,
        }
    }

    pub fn config(&self) -> &RubricConfig {
        &self.config
    }

    /// Canonical display order for this profile.
    pub fn canonical_order(&self) -> [&'static str; 14] {
        [
            "conversational_headers",
            "structure",
            "content_depth",
            "structured_data",
            "faq_schema",
            self.config.voice_factor,
            "authority_signals",
            "performance",
            "eeat_signals",
            "meta_optimization",
            "image_optimization",
            "internal_linking",
            "structured_formatting",
            "content_freshness",
        ]
    }

    /// Maximum awardable points for a factor name, `None` for unknown names.
    pub fn factor_max(&self, name: &str) -> Option<u32> {
        if name == self.config.voice_factor {
            return Some(20);
        }
        match name {
            "faq_schema" => Some(18),
            "conversational_headers" | "structured_data" => Some(15),
            "eeat_signals" => Some(13),
            "content_depth" | "authority_signals" => Some(12),
            "structure" | "meta_optimization" => Some(10),
            "performance"
            | "image_optimization"
            | "internal_linking"
            | "structured_formatting"
            | "content_freshness" => Some(5),
            _ => None,
        }
    }

    pub fn evaluate(&self, signals: &PageSignals, evaluated_at: DateTime<Utc>) -> Evaluation {
        let derived = self.derive_signals(signals, evaluated_at);

        let factors = vec![
            self.score_conversational_headers(signals, &derived),
            self.score_structure(signals),
            self.score_content_depth(signals),
            self.score_structured_data(&derived),
            self.score_faq_schema(&derived),
            self.score_voice_search(&derived),
            self.score_authority_signals(&derived),
            self.score_performance(signals),
            self.score_eeat_signals(&derived),
            self.score_meta_optimization(signals),
            self.score_image_optimization(&derived),
            self.score_internal_linking(&derived),
            self.score_structured_formatting(&derived),
            self.score_content_freshness(&derived, evaluated_at),
        ];

        let raw_points = factors.iter().map(|f| f.points_awarded).sum();
        let canonical = self.canonical_order();

        Evaluation {
            normalized_score: scoring::normalize_score(raw_points, RAW_POINTS_MAX),
            raw_points,
            raw_points_max: RAW_POINTS_MAX,
            factors: order_factors(factors, &canonical),
            derived_flags: flags_map(&derived),
        }
    }

    fn derive_signals(&self, signals: &PageSignals, evaluated_at: DateTime<Utc>) -> DerivedSignals {
        let html = &signals.raw_html;
        let html_lower = html.to_ascii_lowercase();
        let blocks = &signals.structured_data_blocks;

        let has_structured_data = !blocks.is_empty();
        // Substring match over the raw block text: malformed JSON-LD that
        // contains the type name still counts.
        let has_faq_schema = blocks.iter().any(|block| block.contains("FAQPage"));
        let has_vertical_schema = blocks.iter().any(|block| {
            self.config
                .vertical_schema_types
                .iter()
                .any(|schema_type| block.contains(schema_type))
        });

        let question_count = RE_QUESTION.find_iter(html).count();
        let has_faq_content =
            has_faq_schema || RE_FAQ_HEADING.is_match(html) || question_count >= 3;

        let has_conversational_headers = signals
            .h1_headings
            .iter()
            .chain(signals.h2_headings.iter())
            .any(|heading| {
                let folded = heading.to_lowercase();
                self.config
                    .conversational_triggers
                    .iter()
                    .any(|trigger| folded.contains(trigger))
            });

        let has_citations = self
            .config
            .authority_keywords
            .iter()
            .any(|keyword| html_lower.contains(keyword));
        let has_high_quality_citations = scoring::anchor_hrefs(html).iter().any(|href| {
            self.config
                .trusted_domains
                .iter()
                .any(|domain| href.contains(domain))
        });
        let has_statistics = RE_STATISTICS.is_match(html);

        let eeat_count = self
            .trust_indicators
            .iter()
            .filter(|re| re.is_match(html))
            .count();

        let (image_total, image_with_alt) = scoring::image_alt_stats(html);
        let internal_link_count = scoring::internal_link_count(html);

        let current_year = evaluated_at.year();
        let has_content_freshness = contains_standalone_year(html, current_year)
            || contains_standalone_year(html, current_year - 1);

        DerivedSignals {
            has_structured_data,
            has_faq_schema,
            has_vertical_schema,
            has_faq_content,
            question_count,
            has_conversational_headers,
            has_structured_formatting: RE_LIST_OR_TABLE.is_match(html),
            has_citations,
            has_high_quality_citations,
            has_statistics,
            eeat_count,
            image_total,
            image_with_alt,
            internal_link_count,
            has_content_freshness,
        }
    }

    fn score_conversational_headers(
        &self,
        signals: &PageSignals,
        derived: &DerivedSignals,
    ) -> ScoreFactor {
        let h1_count = signals.h1_headings.len();
        if derived.has_conversational_headers && h1_count >= 1 {
            ScoreFactor::new(
                "conversational_headers",
                15,
                format!("conversational phrasing in headings, {h1_count} H1 present"),
            )
        } else if h1_count >= 1 {
            ScoreFactor::new(
                "conversational_headers",
                5,
                format!("{h1_count} H1 present but headings are not conversational"),
            )
        } else {
            ScoreFactor::new("conversational_headers", 0, "no H1 heading found")
        }
    }

    fn score_structure(&self, signals: &PageSignals) -> ScoreFactor {
        let h2_count = signals.h2_headings.len();
        let points = if h2_count >= 6 {
            10
        } else if h2_count >= 4 {
            6
        } else {
            2
        };
        ScoreFactor::new(
            "structure",
            points,
            format!("{h2_count} H2 section headings"),
        )
    }

    fn score_content_depth(&self, signals: &PageSignals) -> ScoreFactor {
        let words = signals.word_count;
        let points = if words >= 1500 {
            12
        } else if words >= 800 {
            8
        } else if words >= 400 {
            4
        } else {
            0
        };
        ScoreFactor::new("content_depth", points, format!("{words} words of content"))
    }

    fn score_structured_data(&self, derived: &DerivedSignals) -> ScoreFactor {
        let full_award = derived.has_vertical_schema
            && (!self.config.require_faq_with_vertical || derived.has_faq_schema);

        if full_award {
            ScoreFactor::new(
                "structured_data",
                15,
                format!("{}-vertical schema types present", self.config.name),
            )
        } else if derived.has_structured_data {
            ScoreFactor::new(
                "structured_data",
                8,
                "structured data present but no vertical-specific schema",
            )
        } else {
            ScoreFactor::new("structured_data", 0, "no structured data found")
        }
    }

    fn score_faq_schema(&self, derived: &DerivedSignals) -> ScoreFactor {
        if derived.has_faq_schema {
            ScoreFactor::new("faq_schema", 18, "FAQPage schema present")
        } else if derived.has_faq_content {
            ScoreFactor::new(
                "faq_schema",
                5,
                "FAQ-style content found but not marked up as FAQPage schema",
            )
        } else {
            ScoreFactor::new("faq_schema", 0, "no FAQ schema or FAQ content found")
        }
    }

    fn score_voice_search(&self, derived: &DerivedSignals) -> ScoreFactor {
        let count = derived.question_count;
        let points = if count >= 8 {
            20
        } else if count >= 5 {
            15
        } else if count >= 3 {
            8
        } else {
            2
        };
        ScoreFactor::new(
            self.config.voice_factor,
            points,
            format!("{count} question phrases found"),
        )
    }

    fn score_authority_signals(&self, derived: &DerivedSignals) -> ScoreFactor {
        if derived.has_high_quality_citations && derived.has_statistics {
            ScoreFactor::new(
                "authority_signals",
                12,
                "high-trust citations and quantified statistics present",
            )
        } else if derived.has_citations || derived.has_statistics {
            ScoreFactor::new(
                "authority_signals",
                6,
                "some citations or statistics present",
            )
        } else {
            ScoreFactor::new("authority_signals", 0, "no citations or statistics found")
        }
    }

    fn score_performance(&self, signals: &PageSignals) -> ScoreFactor {
        let ms = signals.load_time_ms;
        let points = if ms <= 2000 {
            5
        } else if ms <= 3500 {
            3
        } else {
            0
        };
        ScoreFactor::new("performance", points, format!("page loaded in {ms} ms"))
    }

    fn score_eeat_signals(&self, derived: &DerivedSignals) -> ScoreFactor {
        let count = derived.eeat_count;
        let points = self
            .config
            .eeat_tiers
            .iter()
            .find(|(minimum, _)| count >= *minimum)
            .map(|(_, points)| *points)
            .unwrap_or(0);
        ScoreFactor::new(
            "eeat_signals",
            points,
            format!("{count} distinct trust indicators matched"),
        )
    }

    fn score_meta_optimization(&self, signals: &PageSignals) -> ScoreFactor {
        let title_length = signals
            .title
            .as_deref()
            .map(|t| t.chars().count())
            .unwrap_or(0);
        let description_length = signals
            .meta_description
            .as_deref()
            .map(|d| d.chars().count())
            .unwrap_or(0);

        let mut points = 0;
        if (30..=60).contains(&title_length) {
            points += self.config.meta_title_points;
        }
        if (120..=160).contains(&description_length) {
            points += self.config.meta_description_points;
        }

        ScoreFactor::new(
            "meta_optimization",
            points,
            format!("title {title_length} chars, description {description_length} chars"),
        )
    }

    fn score_image_optimization(&self, derived: &DerivedSignals) -> ScoreFactor {
        let total = derived.image_total;
        // Unlike the traditional rubric, a page with no images is not
        // considered optimized here.
        if total == 0 {
            return ScoreFactor::new("image_optimization", 0, "no images on page");
        }

        let coverage = derived.image_with_alt as f64 / total as f64;
        let points = if coverage >= 0.9 {
            5
        } else if coverage >= 0.5 {
            3
        } else {
            0
        };
        ScoreFactor::new(
            "image_optimization",
            points,
            format!("alt text on {} of {} images", derived.image_with_alt, total),
        )
    }

    fn score_internal_linking(&self, derived: &DerivedSignals) -> ScoreFactor {
        let count = derived.internal_link_count;
        let points = if count >= 10 {
            5
        } else if count >= 5 {
            3
        } else {
            0
        };
        ScoreFactor::new(
            "internal_linking",
            points,
            format!("{count} internal links found"),
        )
    }

    fn score_structured_formatting(&self, derived: &DerivedSignals) -> ScoreFactor {
        if derived.has_structured_formatting {
            ScoreFactor::new("structured_formatting", 5, "lists or tables present")
        } else {
            ScoreFactor::new("structured_formatting", 0, "no lists or tables found")
        }
    }

    fn score_content_freshness(
        &self,
        derived: &DerivedSignals,
        evaluated_at: DateTime<Utc>,
    ) -> ScoreFactor {
        let year = evaluated_at.year();
        if derived.has_content_freshness {
            ScoreFactor::new(
                "content_freshness",
                5,
                format!("page mentions {} or {}", year, year - 1),
            )
        } else {
            ScoreFactor::new(
                "content_freshness",
                0,
                format!("no mention of {} or {}", year, year - 1),
            )
        }
    }
}

fn flags_map(derived: &DerivedSignals) -> BTreeMap<String, bool> {
    let image_optimized = derived.image_total > 0
        && derived.image_with_alt as f64 / derived.image_total as f64 >= 0.9;

    let mut flags = BTreeMap::new();
    flags.insert(
        "has_structured_data".to_string(),
        derived.has_structured_data,
    );
    flags.insert("has_faq_schema".to_string(), derived.has_faq_schema);
    flags.insert(
        "has_vertical_schema".to_string(),
        derived.has_vertical_schema,
    );
    flags.insert("has_faq_content".to_string(), derived.has_faq_content);
    flags.insert(
        "has_conversational_headers".to_string(),
        derived.has_conversational_headers,
    );
    flags.insert(
        "has_structured_formatting".to_string(),
        derived.has_structured_formatting,
    );
    flags.insert("has_citations".to_string(), derived.has_citations);
    flags.insert(
        "has_high_quality_citations".to_string(),
        derived.has_high_quality_citations,
    );
    flags.insert("has_statistics".to_string(), derived.has_statistics);
    flags.insert("has_image_optimization".to_string(), image_optimized);
    flags.insert(
        "has_content_freshness".to_string(),
        derived.has_content_freshness,
    );
    flags
}

/// Whether `year` appears in the text as a standalone number.
fn contains_standalone_year(html: &str, year: i32) -> bool {
    Regex::new(&format!(r"\b{year}\b"))
        .map(|re| re.is_match(html))
        .unwrap_or(false)
}
