use std::env;
use std::fmt::Write as FmtWrite;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result, anyhow};
use chrono::Utc;
use ranklens_core::recommend::{Recommendation, RecommendationClient, low_scoring_factors};
use ranklens_core::{
    AiReadinessScorer, Evaluation, PageSignals, RubricConfig, TraditionalScorer, extract_signals,
};
use reqwest::Client;
use url::Url;

const APP_NAME: &str = "ranklens";
const VERSION: &str = env!("CARGO_PKG_VERSION");

const DIVIDER: &str = "─────────────────────────────────────────────────────────────";
const LABEL_WIDTH: usize = 24;

#[derive(Clone, Copy, PartialEq)]
enum Profile {
    Medical,
    Business,
}

impl Profile {
    fn from_name(name: &str) -> Result<Self> {
        match name {
            "medical" => Ok(Profile::Medical),
            "business" => Ok(Profile::Business),
            other => Err(anyhow!(
                "unknown profile: {other} (expected medical or business)"
            )),
        }
    }

    fn config(self) -> RubricConfig {
        match self {
            Profile::Medical => RubricConfig::medical(),
            Profile::Business => RubricConfig::business(),
        }
    }
}

struct CliOptions {
    url: String,
    profile: Profile,
    json: bool,
    recommend: bool,
    save_target: Option<PathBuf>,
}

enum CliCommand {
    Run(CliOptions),
    Help,
    Version,
}

fn parse_arguments(args: &[String]) -> Result<CliCommand> {
    if args.is_empty() {
        return Ok(CliCommand::Help);
    }

    let mut url: Option<String> = None;
    let mut profile = Profile::Business;
    let mut profile_set = false;
    let mut json = false;
    let mut recommend = false;
    let mut save_target: Option<PathBuf> = None;
    let mut i = 0;

    while i < args.len() {
        let arg = &args[i];

        if matches!(arg.as_str(), "-h" | "--help") {
            return Ok(CliCommand::Help);
        }

        if matches!(arg.as_str(), "-v" | "--version") {
            return Ok(CliCommand::Version);
        }

        if matches!(arg.as_str(), "-j" | "--json") {
            json = true;
            i += 1;
            continue;
        }

        if matches!(arg.as_str(), "-r" | "--recommend") {
            recommend = true;
            i += 1;
            continue;
        }

        if let Some(value) = arg.strip_prefix("--profile=") {
            if profile_set {
                return Err(anyhow!("--profile specified multiple times"));
            }
            profile = Profile::from_name(value)?;
            profile_set = true;
            i += 1;
            continue;
        }

        if matches!(arg.as_str(), "-p" | "--profile") {
            if profile_set {
                return Err(anyhow!("--profile specified multiple times"));
            }
            let value = args
                .get(i + 1)
                .ok_or_else(|| anyhow!("--profile requires a value"))?;
            profile = Profile::from_name(value)?;
            profile_set = true;
            i += 2;
            continue;
        }

        if let Some(value) = arg.strip_prefix("--save=") {
            if save_target.is_some() {
                return Err(anyhow!("--save specified multiple times"));
            }
            let path = if value.is_empty() {
                PathBuf::from(".")
            } else {
                PathBuf::from(value)
            };
            save_target = Some(path);
            i += 1;
            continue;
        }

        if matches!(arg.as_str(), "-s" | "--save") {
            if save_target.is_some() {
                return Err(anyhow!("--save specified multiple times"));
            }
            let next_is_path = url.is_some()
                && args
                    .get(i + 1)
                    .map(|next| !next.starts_with('-'))
                    .unwrap_or(false);

            if next_is_path {
                save_target = Some(PathBuf::from(args[i + 1].clone()));
                i += 2;
            } else {
                save_target = Some(PathBuf::from("."));
                i += 1;
            }

            continue;
        }

        if arg.starts_with('-') {
            return Err(anyhow!("unknown flag: {arg}"));
        }

        if url.is_none() {
            url = Some(arg.clone());
        } else {
            return Err(anyhow!("unexpected additional argument: {}", arg));
        }

        i += 1;
    }

    let url = url.ok_or_else(|| anyhow!("missing <url> argument"))?;

    Ok(CliCommand::Run(CliOptions {
        url,
        profile,
        json,
        recommend,
        save_target,
    }))
}

fn print_help() {
    println!("{APP_NAME} — a search-readiness lens for web pages");
    println!("Usage: {APP_NAME} [OPTIONS] <URL>\n");
    println!("Options:");
    println!("  -p, --profile <NAME>    AI-readiness rubric profile: medical or business");
    println!("                          (default: business)");
    println!("  -j, --json              Output both evaluations as JSON");
    println!("  -r, --recommend         Generate prioritized recommendations for");
    println!("                          low-scoring factors (needs RANKLENS_LLM_ENDPOINT)");
    println!("  -s, --save [PATH]       Save the rendered report to file");
    println!("  -v, --version           Show version information");
    println!("  -h, --help              Show this help message");
}

fn print_version() {
    println!("{APP_NAME} {VERSION}");
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();

    let raw_args = env::args().skip(1).collect::<Vec<_>>();
    match parse_arguments(&raw_args)? {
        CliCommand::Help => {
            print_help();
            Ok(())
        }
        CliCommand::Version => {
            print_version();
            Ok(())
        }
        CliCommand::Run(options) => run(options).await,
    }
}

async fn run(options: CliOptions) -> Result<()> {
    let parsed_url = Url::parse(&options.url).context("invalid URL")?;
    let page = fetch(parsed_url.as_str()).await?;

    if !(200..300).contains(&page.status_code) {
        tracing::warn!(
            status = page.status_code,
            "scoring page despite non-success status"
        );
    }

    let signals = extract_signals(
        parsed_url.as_str(),
        &page.body,
        page.load_time_ms,
        page.status_code,
    );

    // The two components share no state and can run in either order.
    let traditional = TraditionalScorer.evaluate(&signals);
    let scorer = AiReadinessScorer::new(options.profile.config());
    let ai_readiness = scorer.evaluate(&signals, Utc::now());

    let recommendations = if options.recommend {
        generate_recommendations(&traditional, &scorer, &ai_readiness).await
    } else {
        Vec::new()
    };

    let output = if options.json {
        let combined = serde_json::json!({
            "url": signals.url,
            "profile": scorer.config().name,
            "traditional": traditional,
            "aiReadiness": ai_readiness,
            "recommendations": recommendations,
        });
        serde_json::to_string_pretty(&combined)?
    } else {
        render_report(
            &signals,
            &traditional,
            &ai_readiness,
            scorer.config().name,
            &recommendations,
        )
    };

    println!("{output}");

    if let Some(save_base) = options.save_target {
        let output_path = build_output_path(&save_base, &parsed_url);
        if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed to create output directory {}", parent.display())
            })?;
        }

        fs::write(&output_path, output.as_bytes())
            .with_context(|| format!("failed to write output file {}", output_path.display()))?;

        println!("\nWrote output to {}", output_path.display());
    }

    Ok(())
}

struct FetchedPage {
    body: String,
    status_code: u16,
    load_time_ms: u64,
}

/// Timed fetch. Redirects are followed; non-success statuses are kept and
/// scored, only transport failures abort.
async fn fetch(url: &str) -> Result<FetchedPage> {
    let client = Client::builder()
        .user_agent(format!("Mozilla/5.0 (compatible; {APP_NAME}/{VERSION})"))
        .build()
        .context("failed to build http client")?;

    let start = Instant::now();
    let response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("failed to fetch {}", url))?;

    let status_code = response.status().as_u16();
    let body = response
        .text()
        .await
        .with_context(|| format!("failed to read response body from {}", url))?;
    let load_time_ms = start.elapsed().as_millis() as u64;

    Ok(FetchedPage {
        body,
        status_code,
        load_time_ms,
    })
}

async fn generate_recommendations(
    traditional: &Evaluation,
    scorer: &AiReadinessScorer,
    ai_readiness: &Evaluation,
) -> Vec<Recommendation> {
    let Ok(endpoint) = env::var("RANKLENS_LLM_ENDPOINT") else {
        tracing::warn!("RANKLENS_LLM_ENDPOINT not set, skipping recommendations");
        return Vec::new();
    };

    let mut low = low_scoring_factors(&traditional.factors, TraditionalScorer::factor_max);
    low.extend(low_scoring_factors(&ai_readiness.factors, |name| {
        scorer.factor_max(name)
    }));

    let mut client = RecommendationClient::new(endpoint, env::var("RANKLENS_LLM_API_KEY").ok());
    if let Ok(model) = env::var("RANKLENS_LLM_MODEL") {
        client = client.with_model(model);
    }

    client.generate(&low).await
}

fn render_report(
    signals: &PageSignals,
    traditional: &Evaluation,
    ai_readiness: &Evaluation,
    profile_name: &str,
    recommendations: &[Recommendation],
) -> String {
    let mut output = String::new();

    push_section_header(&mut output, "🔎", &format!("Page Analysis: {}", signals.url));
    push_key_value(&mut output, "Status", &signals.status_code.to_string());
    push_key_value(
        &mut output,
        "Load Time",
        &format!("{} ms", signals.load_time_ms),
    );
    push_key_value(&mut output, "Words", &signals.word_count.to_string());
    push_key_value(
        &mut output,
        "Page Size",
        &format!("{} KB", signals.page_size_kb),
    );
    let _ = writeln!(&mut output);

    render_evaluation(&mut output, "🏷️", "Traditional Search (SEO)", traditional);
    render_evaluation(
        &mut output,
        "🤖",
        &format!("AI Search Readiness (GEO, {profile_name} profile)"),
        ai_readiness,
    );

    if !recommendations.is_empty() {
        push_section_header(&mut output, "💡", "Recommendations");
        for recommendation in recommendations {
            let _ = writeln!(
                &mut output,
                "{}. [{}] {}",
                recommendation.priority, recommendation.factor, recommendation.action
            );
        }
        let _ = writeln!(&mut output);
    }

    output
}

fn render_evaluation(output: &mut String, icon: &str, title: &str, evaluation: &Evaluation) {
    push_section_header(output, icon, title);
    let _ = writeln!(
        output,
        "Score: {} / 100  ({} of {} points)\n",
        evaluation.normalized_score, evaluation.raw_points, evaluation.raw_points_max
    );

    for factor in &evaluation.factors {
        let _ = writeln!(
            output,
            "• {:<width$}: {:>2} pts  ({})",
            factor.name,
            factor.points_awarded,
            factor.explanation,
            width = LABEL_WIDTH
        );
    }
    let _ = writeln!(output);
}

fn push_section_header(buf: &mut String, icon: &str, title: &str) {
    let _ = writeln!(buf, "{DIVIDER}");
    let _ = writeln!(buf, "{icon} {title}");
    let _ = writeln!(buf, "{DIVIDER}");
}

fn push_key_value(buf: &mut String, label: &str, value: &str) {
    let _ = writeln!(buf, "• {label:<width$}: {value}", width = LABEL_WIDTH);
}

fn build_output_path(base: &Path, url: &Url) -> PathBuf {
    if base.extension().is_some() {
        return base.to_path_buf();
    }

    let host = url.host_str().unwrap_or("page");
    let slug: String = format!("{host}{}", url.path())
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();
    let trimmed = slug.trim_matches('-');
    let file_name = if trimmed.is_empty() {
        "page".to_string()
    } else {
        trimmed.to_string()
    };

    base.join(format!("{file_name}.txt"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_no_arguments_shows_help() {
        assert!(matches!(parse_arguments(&[]).unwrap(), CliCommand::Help));
    }

    #[test]
    fn test_parse_run_with_defaults() {
        let command = parse_arguments(&args(&["https://example.com"])).unwrap();
        let CliCommand::Run(options) = command else {
            panic!("expected run command");
        };

        assert_eq!(options.url, "https://example.com");
        assert!(options.profile == Profile::Business);
        assert!(!options.json);
        assert!(!options.recommend);
        assert!(options.save_target.is_none());
    }

    #[test]
    fn test_parse_profile_forms() {
        let command =
            parse_arguments(&args(&["-p", "medical", "https://example.com"])).unwrap();
        let CliCommand::Run(options) = command else {
            panic!("expected run command");
        };
        assert!(options.profile == Profile::Medical);

        let command =
            parse_arguments(&args(&["--profile=medical", "https://example.com"])).unwrap();
        let CliCommand::Run(options) = command else {
            panic!("expected run command");
        };
        assert!(options.profile == Profile::Medical);

        assert!(parse_arguments(&args(&["-p", "veterinary", "https://example.com"])).is_err());
        assert!(parse_arguments(&args(&["-p"])).is_err());
    }

    #[test]
    fn test_parse_save_forms() {
        let command =
            parse_arguments(&args(&["https://example.com", "-s", "reports"])).unwrap();
        let CliCommand::Run(options) = command else {
            panic!("expected run command");
        };
        assert_eq!(options.save_target, Some(PathBuf::from("reports")));

        let command = parse_arguments(&args(&["--save=out", "https://example.com"])).unwrap();
        let CliCommand::Run(options) = command else {
            panic!("expected run command");
        };
        assert_eq!(options.save_target, Some(PathBuf::from("out")));
    }

    #[test]
    fn test_parse_rejects_unknown_flag_and_extra_args() {
        assert!(parse_arguments(&args(&["--bogus", "https://example.com"])).is_err());
        assert!(parse_arguments(&args(&["https://example.com", "https://two.example"])).is_err());
        assert!(parse_arguments(&args(&["-j"])).is_err());
    }

    #[test]
    fn test_build_output_path_slugifies_url() {
        let url = Url::parse("https://example.com/guides/knee-pain/").unwrap();
        let path = build_output_path(Path::new("reports"), &url);
        assert_eq!(
            path,
            PathBuf::from("reports/example-com-guides-knee-pain.txt")
        );

        let explicit = build_output_path(Path::new("out/report.txt"), &url);
        assert_eq!(explicit, PathBuf::from("out/report.txt"));
    }

    #[test]
    fn test_render_report_includes_scores_and_factors() {
        let factor = ranklens_core::ScoreFactor::new("title_tag", 15, "title is 55 characters");
        let evaluation = Evaluation {
            normalized_score: 12,
            raw_points: 15,
            raw_points_max: 130,
            factors: vec![factor],
            derived_flags: BTreeMap::new(),
        };
        let signals = extract_signals("https://example.com/", "<html></html>", 500, 200);

        let report = render_report(&signals, &evaluation, &evaluation, "business", &[]);

        assert!(report.contains("Page Analysis: https://example.com/"));
        assert!(report.contains("Score: 12 / 100  (15 of 130 points)"));
        assert!(report.contains("title_tag"));
        assert!(report.contains("title is 55 characters"));
        assert!(report.contains("business profile"));
    }
}
