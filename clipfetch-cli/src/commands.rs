//! CLI command implementations

use std::process::ExitCode;

use chrono::{DateTime, Utc};
use clap::Subcommand;
use clipfetch_core::config::ClipfetchConfig;
use clipfetch_core::resolver::{
    AUDIO_FILE_NAME, MediaResult, ResolutionAttempt, ResolveOutcome, Resolver, VIDEO_FILE_NAME,
};
use serde::Serialize;

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Resolve a short-video link to downloadable media URLs
    Resolve {
        /// Link to the clip, e.g. https://www.tiktok.com/@user/video/123
        url: String,
        /// Print the outcome as JSON
        #[arg(long)]
        json: bool,
    },
    /// List extraction services in fallback order
    Endpoints,
}

/// Handle the CLI command
///
/// # Errors
/// - `ClipfetchError::HttpClient` - HTTP client could not be built
/// - `serde_json::Error` - JSON rendering failed
pub async fn handle_command(
    command: Commands,
    config: ClipfetchConfig,
) -> anyhow::Result<ExitCode> {
    match command {
        Commands::Resolve { url, json } => resolve(url, json, config).await,
        Commands::Endpoints => list_endpoints(config),
    }
}

/// Resolve a link, cancelling cleanly on Ctrl+C.
///
/// # Errors
/// - `ClipfetchError::HttpClient` - HTTP client could not be built
pub async fn resolve(
    url: String,
    json: bool,
    config: ClipfetchConfig,
) -> anyhow::Result<ExitCode> {
    let resolver = Resolver::new(&config)?;

    let handle = resolver.spawn(url);
    let token = handle.cancellation_token();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupted, cancelling resolution");
            token.cancel();
        }
    });

    let outcome = handle.outcome().await;
    interrupt.abort();

    if json {
        let report = OutcomeReport::from(&outcome);
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_outcome(&outcome);
    }

    Ok(if outcome.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn list_endpoints(config: ClipfetchConfig) -> anyhow::Result<ExitCode> {
    let resolver = Resolver::new(&config)?;

    println!("Extraction services (fallback order)");
    println!("{:-<60}", "");
    for (index, endpoint) in resolver.registry().entries().iter().enumerate() {
        println!(
            "{}. {:<18} {} [{}]",
            index + 1,
            endpoint.id(),
            endpoint.base_url(),
            endpoint.shape().name()
        );
    }
    println!("\nPer-endpoint timeout: {:?}", resolver.request_timeout());

    Ok(ExitCode::SUCCESS)
}

fn print_outcome(outcome: &ResolveOutcome) {
    match outcome.media() {
        Some(media) => {
            println!("{}", media.display_title());
            println!("{:-<60}", "");
            println!("Video ({VIDEO_FILE_NAME}): {}", media.video_url);
            if let Some(audio) = &media.audio_url {
                println!("Audio ({AUDIO_FILE_NAME}): {audio}");
            }
        }
        None => println!("{}", outcome.user_message()),
    }

    if !outcome.attempts().is_empty() && !outcome.is_success() {
        println!("\nAttempts:");
        for attempt in outcome.attempts() {
            println!(
                "  {:<18} {} ({} ms)",
                attempt.endpoint_id,
                attempt.outcome,
                attempt.elapsed.as_millis()
            );
        }
    }
}

/// Machine-readable rendering of a resolution outcome.
#[derive(Debug, Serialize)]
struct OutcomeReport {
    status: &'static str,
    message: String,
    media: Option<MediaResult>,
    attempts: Vec<AttemptReport>,
}

#[derive(Debug, Serialize)]
struct AttemptReport {
    endpoint: String,
    outcome: String,
    started_at: DateTime<Utc>,
    elapsed_ms: u64,
}

impl From<&ResolveOutcome> for OutcomeReport {
    fn from(outcome: &ResolveOutcome) -> Self {
        let status = match outcome {
            ResolveOutcome::Rejected(_) => "rejected",
            ResolveOutcome::Succeeded { .. } => "succeeded",
            ResolveOutcome::Exhausted { .. } => "exhausted",
            ResolveOutcome::Cancelled { .. } => "cancelled",
        };

        Self {
            status,
            message: outcome.user_message(),
            media: outcome.media().cloned(),
            attempts: outcome.attempts().iter().map(AttemptReport::from).collect(),
        }
    }
}

impl From<&ResolutionAttempt> for AttemptReport {
    fn from(attempt: &ResolutionAttempt) -> Self {
        Self {
            endpoint: attempt.endpoint_id.clone(),
            outcome: attempt.outcome.to_string(),
            started_at: attempt.started_at,
            elapsed_ms: u64::try_from(attempt.elapsed.as_millis()).unwrap_or(u64::MAX),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use clipfetch_core::resolver::{AttemptOutcome, RejectReason};

    use super::*;

    fn attempt(endpoint: &str, outcome: AttemptOutcome) -> ResolutionAttempt {
        ResolutionAttempt {
            endpoint_id: endpoint.to_string(),
            started_at: Utc::now(),
            elapsed: Duration::from_millis(42),
            outcome,
        }
    }

    #[test]
    fn test_report_for_success() {
        let media = MediaResult {
            video_url: "https://x/v.mp4".to_string(),
            audio_url: None,
            title: Some("Clip".to_string()),
        };
        let outcome = ResolveOutcome::Succeeded {
            result: media.clone(),
            attempts: vec![
                attempt("a", AttemptOutcome::Timeout),
                attempt("b", AttemptOutcome::Success(media.clone())),
            ],
        };

        let report = OutcomeReport::from(&outcome);
        let value = serde_json::to_value(&report).unwrap();

        assert_eq!(value["status"], "succeeded");
        assert_eq!(value["media"]["video_url"], "https://x/v.mp4");
        assert_eq!(value["attempts"][0]["outcome"], "timed out");
        assert_eq!(value["attempts"][1]["elapsed_ms"], 42);
    }

    #[test]
    fn test_report_for_rejection() {
        let outcome = ResolveOutcome::Rejected(RejectReason::InvalidUrl {
            input: "https://example.com".to_string(),
        });

        let report = OutcomeReport::from(&outcome);

        assert_eq!(report.status, "rejected");
        assert!(report.media.is_none());
        assert!(report.attempts.is_empty());
        assert!(report.message.starts_with("Invalid TikTok URL"));
    }

    #[test]
    fn test_report_for_exhaustion_lists_http_status() {
        let outcome = ResolveOutcome::Exhausted {
            attempts: vec![attempt("a", AttemptOutcome::HttpStatus(500))],
        };

        let report = OutcomeReport::from(&outcome);

        assert_eq!(report.status, "exhausted");
        assert_eq!(report.attempts[0].outcome, "HTTP 500");
    }
}
