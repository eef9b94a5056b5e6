//! NERL CLI - Batch entity linking over web archives
//!
//! Usage:
//!   nerl link <archive.warc.gz> <output.tsv> [--workers N] [--config FILE]
//!   nerl config [--config FILE]

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use nerl_core::{AppConfig, CandidateSearch, FactCount, MentionRecognizer};
use nerl_extract::HeuristicRecognizer;
use nerl_link::{ElasticSearchClient, LinkPipeline, OutputSink, TridentClient};
use nerl_warc::open_archive;

#[derive(Parser)]
#[command(name = "nerl")]
#[command(about = "Named-entity recognition and linking over WARC archives")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Link entities in an archive and append results to a TSV file
    Link {
        /// Input WARC archive (gzipped if the path ends in .gz)
        input: PathBuf,
        /// Output TSV file, opened in append mode
        output: PathBuf,
        /// Documents processed concurrently (overrides config)
        #[arg(long)]
        workers: Option<usize>,
        /// TOML configuration file
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Print the effective configuration as TOML
    Config {
        /// TOML configuration file
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn load_config(path: Option<PathBuf>) -> anyhow::Result<AppConfig> {
    let config = match path {
        Some(path) => AppConfig::from_file(path)?.with_env_override()?,
        None => AppConfig::from_env()?,
    };
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Link {
            input,
            output,
            workers,
            config,
        } => {
            let config = load_config(config)?;
            init_tracing(&config);
            let workers = workers.unwrap_or(config.pipeline.workers).max(1);
            run_link(&config, input, output, workers).await
        }
        Commands::Config { config } => {
            let config = load_config(config)?;
            println!("{}", config.to_toml()?);
            Ok(())
        }
    }
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.level.clone()));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn run_link(
    config: &AppConfig,
    input: PathBuf,
    output: PathBuf,
    workers: usize,
) -> anyhow::Result<()> {
    // Built once per process and shared; the recognizer is the expensive
    // part and must never be rebuilt per document.
    let recognizer: Arc<dyn MentionRecognizer> = Arc::new(HeuristicRecognizer::new());
    let search: Arc<dyn CandidateSearch> =
        Arc::new(ElasticSearchClient::from_config(&config.search)?);
    let kb: Arc<dyn FactCount> = Arc::new(TridentClient::from_config(&config.knowledge_base)?);

    let pipeline = Arc::new(LinkPipeline::new(recognizer, search, kb, config));
    let sink = Arc::new(OutputSink::append(&output).await?);
    let blocks = open_archive(&input)
        .with_context(|| format!("cannot open input archive {}", input.display()))?;

    info!(
        input = %input.display(),
        output = %output.display(),
        workers,
        "starting linking run"
    );

    let (records, lines) = if workers <= 1 {
        link_sequential(&pipeline, &sink, blocks).await?
    } else {
        link_parallel(pipeline, sink.clone(), blocks, workers).await?
    };

    sink.flush().await?;
    info!(records, lines, "linking run finished");
    Ok(())
}

/// Sequential execution strategy: one document at a time
async fn link_sequential(
    pipeline: &LinkPipeline,
    sink: &OutputSink,
    blocks: impl Iterator<Item = std::io::Result<String>>,
) -> anyhow::Result<(usize, usize)> {
    let mut records = 0usize;
    let mut lines = 0usize;

    for block in blocks {
        let block = block.context("failed to read input archive")?;
        records += 1;
        match pipeline.process_block(&block).await {
            Ok(linked) => {
                sink.write_all(&linked).await?;
                lines += linked.len();
            }
            Err(e) => warn!(error = %e, "record skipped"),
        }
    }

    Ok((records, lines))
}

/// Parallel execution strategy: a reader thread feeds a bounded channel
/// and at most `workers` documents are in flight at once. Documents stay
/// independent; only the output sink serializes writes.
async fn link_parallel(
    pipeline: Arc<LinkPipeline>,
    sink: Arc<OutputSink>,
    blocks: impl Iterator<Item = std::io::Result<String>> + Send + 'static,
    workers: usize,
) -> anyhow::Result<(usize, usize)> {
    let (tx, mut rx) = tokio::sync::mpsc::channel::<std::io::Result<String>>(workers * 2);
    let reader = std::thread::spawn(move || {
        for block in blocks {
            if tx.blocking_send(block).is_err() {
                break;
            }
        }
    });

    let mut tasks = tokio::task::JoinSet::new();
    let mut records = 0usize;
    let mut lines = 0usize;

    while let Some(block) = rx.recv().await {
        let block = block.context("failed to read input archive")?;
        records += 1;

        while tasks.len() >= workers {
            lines += collect_task(&mut tasks).await?;
        }

        let pipeline = pipeline.clone();
        let sink = sink.clone();
        tasks.spawn(async move {
            match pipeline.process_block(&block).await {
                Ok(linked) => {
                    let count = linked.len();
                    sink.write_all(&linked).await?;
                    Ok(count)
                }
                Err(e) => {
                    warn!(error = %e, "record skipped");
                    Ok(0)
                }
            }
        });
    }

    while !tasks.is_empty() {
        lines += collect_task(&mut tasks).await?;
    }

    if reader.join().is_err() {
        warn!("archive reader thread panicked");
    }

    Ok((records, lines))
}

async fn collect_task(
    tasks: &mut tokio::task::JoinSet<nerl_core::Result<usize>>,
) -> anyhow::Result<usize> {
    match tasks.join_next().await {
        Some(Ok(Ok(count))) => Ok(count),
        // Output failures are the one fatal error class here
        Some(Ok(Err(e))) => Err(e.into()),
        Some(Err(join_error)) => {
            warn!(error = %join_error, "worker task failed");
            Ok(0)
        }
        None => Ok(0),
    }
}
