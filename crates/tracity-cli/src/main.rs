use std::path::Path;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use dotenvy::dotenv;
use sqlx::postgres::PgPoolOptions;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use tracity::{Command, Config, read_documents};
use tracity_client::CompletionProviderEnum;
use tracity_core::filter::{FilterRequest, SortDirection};
use tracity_core::traits::CompletionProvider;
use tracity_core::{AppError, DataService, DatasetInfo, DbConfig, load_catalog};
use tracity_db::DocumentRepository;

type Service = DataService<DocumentRepository, CompletionProviderEnum>;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {}", describe_error(&err));
            ExitCode::FAILURE
        }
    }
}

/// Prefers the friendly message of an underlying [`AppError`].
fn describe_error(err: &anyhow::Error) -> String {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<AppError>())
        .map(AppError::user_message)
        .unwrap_or_else(|| format!("{:#}", err))
}

async fn run() -> anyhow::Result<()> {
    dotenv().ok();

    // Logs go to stderr so stdout stays pipeable
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to install tracing subscriber")?;

    let config = Config::parse();

    info!("Connecting to database...");
    let db_config = DbConfig::default();
    let pool = PgPoolOptions::new()
        .max_connections(db_config.max_connections)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;

    let repo = DocumentRepository::new(pool);
    repo.ensure_schema()
        .await
        .context("Failed to prepare documents table")?;

    let catalog = load_catalog(config.catalog_config.clone())?;

    let provider = CompletionProviderEnum::from_config(
        config.llm_provider,
        config.openai_api_key.as_deref(),
        config.gemini_api_key.as_deref(),
        config.llm_model.as_deref(),
    )?;

    let service = DataService::new(repo.clone(), provider, catalog);

    match config.command {
        Command::Explore => explore(&service).await?,
        Command::Import {
            collection,
            file,
            replace,
        } => import(&repo, &collection, &file, replace).await?,
        Command::Filter {
            collection,
            states,
            years,
            categories,
            sort_by,
            sort_order,
            limit,
            insights,
        } => {
            if limit == 0 {
                anyhow::bail!("--limit must be greater than zero");
            }
            let mut request = FilterRequest::new(collection)
                .with_states(states)
                .with_years(years)
                .with_categories(categories)
                .with_limit(limit);
            if let Some(field) = sort_by {
                request = request.with_sort(field, SortDirection::from_order(&sort_order));
            }
            filter(&service, &request, insights).await?;
        }
        Command::Insights { collection } => insights(&service, &collection).await?,
        Command::Stats => show_stats(&service).await?,
    }

    Ok(())
}

async fn explore(service: &Service) -> anyhow::Result<()> {
    let datasets = service.list_datasets().await?;

    if datasets.is_empty() {
        println!("No datasets found. Import one with `tracity import <collection> <file>`.");
        return Ok(());
    }

    println!("\nAvailable datasets\n");
    for dataset in &datasets {
        println!("{}", format_dataset_line(dataset));
    }
    println!();

    Ok(())
}

fn format_dataset_line(dataset: &DatasetInfo) -> String {
    format!(
        "  {:<20} {:>8} records  {}",
        dataset.collection, dataset.record_count, dataset.description
    )
}

async fn import(
    repo: &DocumentRepository,
    collection: &str,
    file: &Path,
    replace: bool,
) -> anyhow::Result<()> {
    let docs = read_documents(file)?;

    if docs.is_empty() {
        info!("No records found in {}", file.display());
        return Ok(());
    }

    if replace {
        let removed = repo.drop_collection(collection).await?;
        info!("Removed {} existing records from '{}'", removed, collection);
    }

    let inserted = repo.insert_many(collection, &docs).await?;
    info!("Imported {} records into '{}'", inserted, collection);

    Ok(())
}

async fn filter(service: &Service, request: &FilterRequest, insights: bool) -> anyhow::Result<()> {
    if insights && !service.insight_provider().is_enabled() {
        info!("No completion provider configured; insights use the static fallback");
    }

    let outcome = service.filter(request, insights).await?;
    info!(
        "{} of {} matching records, recommended chart: {}",
        outcome.count, outcome.total_matching, outcome.chart_recommendations.chart
    );

    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}

async fn insights(service: &Service, collection: &str) -> anyhow::Result<()> {
    info!(
        "Analyzing '{}' with {}",
        collection,
        service.insight_provider().name()
    );
    let result = service.insights(collection).await?;

    println!("\nInsights for {}\n", result.collection);
    println!("  Records:      {}", result.total_records);
    println!("  Sample size:  {}", result.sample_size);
    println!("  Trend:        {}", result.insights.trend);
    if let Some(chart) = &result.insights.chart_type {
        println!("  Chart:        {}", chart);
    }
    println!("\n  {}\n", result.insights.insight);

    if !result.insights.key_metrics.is_empty() {
        println!("  Key metrics:");
        for metric in &result.insights.key_metrics {
            println!("    - {}", display_value(metric));
        }
    }
    if !result.insights.anomalies.is_empty() {
        println!("  Anomalies:");
        for anomaly in &result.insights.anomalies {
            println!("    - {}", display_value(anomaly));
        }
    }
    println!();

    Ok(())
}

fn display_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

async fn show_stats(service: &Service) -> anyhow::Result<()> {
    let stats = service.platform_stats().await?;

    println!("\nPlatform Statistics\n");
    println!("  Datasets:              {}", stats.total_datasets);
    println!("  Visualizations:        {}", stats.total_visualizations);
    println!("  Users:                 {}", stats.total_users);
    println!("  Insights:              {}", stats.total_insights);
    println!();

    Ok(())
}
