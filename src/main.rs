use chrono::Utc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use issue_metrics::config::AppConfig;
use issue_metrics::github::{self, GitHubClient};
use issue_metrics::json_output::write_to_json;
use issue_metrics::markdown::write_to_markdown;
use issue_metrics::report::build_report;

#[tokio::main]
async fn main() {
    // Initialize tracing (logging)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "issue_metrics=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();

    let config = match AppConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("Invalid environment configuration: {}. Exiting.", e);
            std::process::exit(1);
        }
    };

    if github::get_owners(&config.search_query).is_empty() {
        tracing::error!(
            "SEARCH_QUERY '{}' names no repo:, org:, owner:, or user: to search. Exiting.",
            config.search_query
        );
        std::process::exit(1);
    }

    if let Err(e) = run(&config).await {
        tracing::error!("{:#}", e);
        std::process::exit(1);
    }
}

async fn run(config: &AppConfig) -> anyhow::Result<()> {
    let client = GitHubClient::new(config.github_token.clone(), config.rate_limit_bypass)?;

    tracing::info!("Searching with query: {}", config.search_query);
    let items = client
        .fetch_items(&config.search_query, config.max_api_pages)
        .await?;
    tracing::info!("Found {} items", items.len());

    let report = build_report(&items, config, Utc::now());

    let markdown = write_to_markdown(&report, config);
    std::fs::write(&config.output_file, markdown)?;
    tracing::info!("Wrote {}", config.output_file);

    let json = write_to_json(&report, config)?;
    let json_file = config.json_output_file();
    std::fs::write(&json_file, json)?;
    tracing::info!("Wrote {}", json_file);

    Ok(())
}
