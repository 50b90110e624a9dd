use crate::{
    config::ResearchConfig,
    driver::{Driver, ResearchAssistant},
    pipeline::{ArxivPipeline, ResearchPipeline},
    tools::{ArxivClient, SearchBackend},
    Kernel, Planner,
};
use anyhow::Context;
use clap::{Arg, ArgAction, Command};
use std::time::Duration;
use tracing::{error, info};

fn command() -> Command {
    Command::new("web-research")
        .version("0.1.0")
        .about("Research topics on the web with an LLM planner, semantic memory and summaries")
        .arg(
            Arg::new("task")
                .help("Research tasks to run (the built-in tasks are used when omitted)")
                .action(ArgAction::Append)
                .num_args(1..)
                .index(1),
        )
        .arg(
            Arg::new("model")
                .short('m')
                .long("model")
                .value_name("MODEL")
                .help("Chat model (or set RESEARCH_MODEL)"),
        )
        .arg(
            Arg::new("api-key")
                .short('k')
                .long("api-key")
                .value_name("KEY")
                .help("API key (or set OPENAI_API_KEY env var)"),
        )
        .arg(
            Arg::new("base-url")
                .short('u')
                .long("base-url")
                .value_name("URL")
                .help("Chat API base URL (or set OPENAI_BASE_URL / OPENROUTER_BASE_URL)"),
        )
        .arg(
            Arg::new("embedding-model")
                .long("embedding-model")
                .value_name("MODEL")
                .help("Embedding model (or set EMBEDDING_MODEL)"),
        )
        .arg(
            Arg::new("search-backend")
                .short('s')
                .long("search-backend")
                .value_name("BACKEND")
                .help("Search backend: duckduckgo or stract (or set SEARCH_BACKEND)"),
        )
        .arg(
            Arg::new("timeout")
                .short('t')
                .long("timeout")
                .value_name("SECONDS")
                .help("Request timeout in seconds")
                .default_value("120"),
        )
        .arg(
            Arg::new("max-iterations")
                .short('i')
                .long("max-iterations")
                .value_name("COUNT")
                .help("Maximum function-calling turns per task"),
        )
        .arg(
            Arg::new("max-tokens")
                .long("max-tokens")
                .value_name("COUNT")
                .help("Completion token budget per task"),
        )
        .arg(
            Arg::new("pipeline")
                .short('p')
                .long("pipeline")
                .value_name("TOPIC")
                .help("Run the fixed search/extract/save/summarize pipeline for TOPIC instead of the planner"),
        )
        .arg(
            Arg::new("arxiv")
                .short('a')
                .long("arxiv")
                .value_name("TOPIC")
                .conflicts_with("pipeline")
                .help("Fetch recent arXiv papers on TOPIC, store their abstracts and summarize them"),
        )
}

/// CLI entry point for the research assistant
pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let matches = command().get_matches();

    let mut config = match matches.get_one::<String>("api-key") {
        Some(api_key) => ResearchConfig::new(api_key.clone()).apply_env()?,
        None => ResearchConfig::from_env()
            .context("API key is required. Set OPENAI_API_KEY or use --api-key")?,
    };

    if let Some(base_url) = matches.get_one::<String>("base-url") {
        config = config.with_base_url(base_url.clone());
    }
    if let Some(model) = matches.get_one::<String>("model") {
        config = config.with_model(model.clone());
    }
    if let Some(model) = matches.get_one::<String>("embedding-model") {
        config = config.with_embedding_model(model.clone());
    }
    if let Some(backend) = matches.get_one::<String>("search-backend") {
        config = config.with_search_backend(backend.parse::<SearchBackend>()?);
    }
    if let Some(timeout) = matches.get_one::<String>("timeout") {
        config = config.with_timeout(Duration::from_secs(
            timeout.parse().context("--timeout must be a number of seconds")?,
        ));
    }
    if let Some(count) = matches.get_one::<String>("max-iterations") {
        config = config.with_max_iterations(count.parse().context("--max-iterations must be a number")?);
    }
    if let Some(count) = matches.get_one::<String>("max-tokens") {
        config = config.with_max_tokens(count.parse().context("--max-tokens must be a number")?);
    }

    println!("Web Research Assistant");
    println!("=====================");
    info!("Using model: {}", config.model);
    info!("Base URL: {}", config.base_url);
    info!("Search backend: {}", config.search_backend);

    let kernel = Kernel::from_config(&config)?;

    if let Some(topic) = matches.get_one::<String>("pipeline") {
        let report = match ResearchPipeline::new(&kernel).run(topic).await {
            Ok(report) => report,
            Err(e) => {
                error!("Research pipeline failed: {}", e);
                return Err(e.into());
            }
        };
        println!("\nResearch Topic: {}", report.topic);
        println!("Documents saved: {}", report.saved.len());
        for (url, reason) in &report.failures {
            println!("Skipped {}: {}", url, reason);
        }
        println!("\nSummary:\n{}", report.summary);
        return Ok(());
    }

    if let Some(topic) = matches.get_one::<String>("arxiv") {
        let client = ArxivClient::new()
            .with_max_results(config.max_papers)
            .with_timeout(config.timeout)?;
        println!("\nFetching papers on: {}", topic.trim());
        let report = match ArxivPipeline::new(&kernel, &client)
            .with_collection(config.paper_collection.clone())
            .run(topic)
            .await
        {
            Ok(report) => report,
            Err(e) => {
                error!("arXiv pipeline failed: {}", e);
                return Err(e.into());
            }
        };
        println!("Stored {} papers in memory", report.saved.len());
        for paper in &report.papers {
            println!("- {} ({})", paper.title, paper.url);
        }
        println!("\nResearch Summary:\n{}", report.summary);
        return Ok(());
    }

    let driver = match matches.get_many::<String>("task") {
        Some(tasks) => Driver::new(tasks.cloned().collect()),
        None => Driver::default(),
    };

    let assistant = ResearchAssistant::new(kernel, Planner::from_config(&config));
    let report = driver.run(&assistant, &mut std::io::stdout()).await?;
    info!(
        succeeded = report.succeeded,
        failed = report.failed,
        "research run finished"
    );

    Ok(())
}
