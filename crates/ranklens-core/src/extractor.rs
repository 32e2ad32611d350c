//! Page signal extraction
//!
//! Turns raw HTML plus response metadata into the [`PageSignals`] record the
//! scoring components consume. Extraction is lossy and pattern-based by
//! design: JSON-LD blocks are collected as opaque text, never parsed, and a
//! field that cannot be derived becomes `None`/empty rather than an error.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};

use crate::types::PageSignals;

/// Build a [`PageSignals`] record from a fetched document.
///
/// Total over any input: malformed markup yields empty or absent fields.
pub fn extract_signals(url: &str, html: &str, load_time_ms: u64, status_code: u16) -> PageSignals {
    let document = Html::parse_document(html);

    PageSignals {
        url: url.to_string(),
        title: select_text(&document, "title"),
        meta_description: select_attr(&document, r#"meta[name="description"]"#, "content"),
        canonical_url: select_attr(&document, r#"link[rel="canonical"]"#, "href"),
        language_tag: select_attr(&document, "html", "lang"),
        h1_headings: select_all_text(&document, "h1"),
        h2_headings: select_all_text(&document, "h2"),
        structured_data_blocks: extract_json_ld_blocks(html),
        word_count: count_words(html),
        load_time_ms,
        status_code,
        page_size_kb: html.len() / 1024,
        raw_html: html.to_string(),
    }
}

/// Extract JSON-LD script blocks from HTML as raw text.
///
/// Blocks are trimmed and empty ones dropped. The text is kept verbatim even
/// when it is not valid JSON; schema detection downstream is substring-based.
pub fn extract_json_ld_blocks(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let script_selector = match Selector::parse("script") {
        Ok(selector) => selector,
        Err(_) => return Vec::new(),
    };

    document
        .select(&script_selector)
        .filter_map(|element| {
            let script_type = element
                .value()
                .attr("type")
                .map(|t| t.trim().to_ascii_lowercase())
                .unwrap_or_default();

            // contains() catches variations like "application/ld+json; charset=utf-8"
            if script_type.contains("ld+json") {
                let text = element.text().collect::<String>().trim().to_string();
                if text.is_empty() { None } else { Some(text) }
            } else {
                None
            }
        })
        .collect()
}

/// Strip script, style, noscript, template blocks and comments.
///
/// Keeps the visible document text so that word counting is not inflated by
/// embedded code.
pub fn sanitize_html(html: &str) -> String {
    static RE_STRIP: Lazy<Vec<Regex>> = Lazy::new(|| {
        [
            r"(?is)<script[^>]*?>[\s\S]*?</script>",
            r"(?is)<style[^>]*?>[\s\S]*?</style>",
            r"(?is)<noscript[^>]*?>[\s\S]*?</noscript>",
            r"(?is)<template[^>]*?>[\s\S]*?</template>",
            r"(?is)<!--.*?-->",
        ]
        .into_iter()
        .map(|pattern| Regex::new(pattern).expect("invalid strip regex"))
        .collect()
    });

    let mut clean = html.to_string();
    for re in RE_STRIP.iter() {
        clean = re.replace_all(&clean, "").into_owned();
    }
    clean
}

/// Whitespace-delimited word count of the readable page text.
fn count_words(html: &str) -> usize {
    html2md::parse_html(&sanitize_html(html))
        .split_whitespace()
        .count()
}

fn select_text(document: &Html, selector_str: &str) -> Option<String> {
    let selector = Selector::parse(selector_str).ok()?;
    document
        .select(&selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|text| !text.is_empty())
}

fn select_attr(document: &Html, selector_str: &str, attr: &str) -> Option<String> {
    let selector = Selector::parse(selector_str).ok()?;
    document
        .select(&selector)
        .next()
        .and_then(|el| el.value().attr(attr))
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn select_all_text(document: &Html, selector_str: &str) -> Vec<String> {
    let selector = match Selector::parse(selector_str) {
        Ok(selector) => selector,
        Err(_) => return Vec::new(),
    };
    document
        .select(&selector)
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|text| !text.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_signals_full_document() {
        let html = r#"
            <html lang="en">
                <head>
                    <title>Understanding Knee Pain: Causes and Treatment</title>
                    <meta name="description" content="A practical guide to knee pain.">
                    <link rel="canonical" href="https://example.com/knee-pain">
                    <script type="application/ld+json">
                    {"@context": "https://schema.org", "@type": "MedicalWebPage"}
                    </script>
                </head>
                <body>
                    <h1>Understanding Knee Pain</h1>
                    <h2>What causes knee pain?</h2>
                    <h2>When should you see a doctor?</h2>
                    <p>Knee pain is a common complaint.</p>
                </body>
            </html>
        "#;

        let signals = extract_signals("https://example.com/knee-pain", html, 850, 200);

        assert_eq!(
            signals.title.as_deref(),
            Some("Understanding Knee Pain: Causes and Treatment")
        );
        assert_eq!(
            signals.meta_description.as_deref(),
            Some("A practical guide to knee pain.")
        );
        assert_eq!(
            signals.canonical_url.as_deref(),
            Some("https://example.com/knee-pain")
        );
        assert_eq!(signals.language_tag.as_deref(), Some("en"));
        assert_eq!(signals.h1_headings, vec!["Understanding Knee Pain"]);
        assert_eq!(signals.h2_headings.len(), 2);
        assert_eq!(signals.structured_data_blocks.len(), 1);
        assert_eq!(signals.load_time_ms, 850);
        assert_eq!(signals.status_code, 200);
        assert!(signals.word_count > 0);
    }

    #[test]
    fn test_extract_signals_empty_document() {
        let signals = extract_signals("https://example.com/", "", 0, 200);

        assert!(signals.title.is_none());
        assert!(signals.meta_description.is_none());
        assert!(signals.canonical_url.is_none());
        assert!(signals.language_tag.is_none());
        assert!(signals.h1_headings.is_empty());
        assert!(signals.h2_headings.is_empty());
        assert!(signals.structured_data_blocks.is_empty());
        assert_eq!(signals.word_count, 0);
        assert_eq!(signals.page_size_kb, 0);
    }

    #[test]
    fn test_headings_keep_document_order_and_duplicates() {
        let html = r#"
            <body>
                <h2>Overview</h2>
                <h2>Details</h2>
                <h2>Overview</h2>
            </body>
        "#;

        let signals = extract_signals("https://example.com/", html, 0, 200);
        assert_eq!(signals.h2_headings, vec!["Overview", "Details", "Overview"]);
    }

    #[test]
    fn test_extract_json_ld_with_charset() {
        let html = r#"
            <script type="application/ld+json; charset=utf-8">
            {"@type": "Product", "name": "Test"}
            </script>
        "#;

        let blocks = extract_json_ld_blocks(html);
        assert_eq!(blocks.len(), 1);
        assert!(blocks[0].contains("Test"));
    }

    #[test]
    fn test_extract_json_ld_case_insensitive() {
        let html = r#"
            <script type="APPLICATION/LD+JSON">
            {"@type": "Product", "name": "Test"}
            </script>
        "#;

        assert_eq!(extract_json_ld_blocks(html).len(), 1);
    }

    #[test]
    fn test_extract_json_ld_skips_empty_scripts() {
        let html = r#"
            <script type="application/ld+json"></script>
            <script type="application/ld+json">   </script>
        "#;

        assert!(extract_json_ld_blocks(html).is_empty());
    }

    #[test]
    fn test_extract_json_ld_keeps_malformed_blocks() {
        let html = r#"
            <script type="application/ld+json">
            {"@type": "FAQPage", "broken":
            </script>
        "#;

        let blocks = extract_json_ld_blocks(html);
        assert_eq!(blocks.len(), 1);
        assert!(blocks[0].contains("FAQPage"));
    }

    #[test]
    fn test_sanitize_html_strips_code_and_comments() {
        let html = r#"
            <p>Keep this</p>
            <script>alert('remove')</script>
            <style>body { color: red; }</style>
            <!-- gone -->
        "#;

        let sanitized = sanitize_html(html);
        assert!(sanitized.contains("Keep this"));
        assert!(!sanitized.contains("<script"));
        assert!(!sanitized.contains("alert"));
        assert!(!sanitized.contains("color: red"));
        assert!(!sanitized.contains("<!--"));
    }

    #[test]
    fn test_word_count_ignores_scripts() {
        let html = r#"
            <body>
                <p>one two three</p>
                <script>var alpha = "beta gamma delta epsilon";</script>
            </body>
        "#;

        let signals = extract_signals("https://example.com/", html, 0, 200);
        assert_eq!(signals.word_count, 3);
    }
}
