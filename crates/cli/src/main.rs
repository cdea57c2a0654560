use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use cli::{batch, inputs, render};
use integrity_core::config::{self, AppConfig};
use integrity_core::models::SourceRecord;
use integrity_core::plagiarism;
use integrity_core::{build_registry, corpus, history, AnalysisPipeline};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Analyze {
            path,
            corpus,
            json,
            save,
        } => run_analyze(cfg, &path, corpus.as_deref(), json, save).await,
        Commands::Score { path, json } => run_score(&cfg, &path, json),
        Commands::Embed { path } => run_embed(cfg, &path).await,
        Commands::Corpus { command } => match command {
            CorpusCommand::Import { file, embed } => run_import(cfg, &file, embed).await,
            CorpusCommand::List { json } => run_list(cfg, json).await,
        },
    }
}

#[derive(Parser)]
#[command(name = "integrity")]
#[command(about = "Academic integrity analysis for submitted documents", long_about = None)]
struct Cli {
    /// Path to config TOML
    #[arg(short, long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Full report: similar sources, plagiarism signals and analysis
    Analyze {
        /// A document, or a directory of documents
        path: PathBuf,
        /// Read the reference corpus from a JSON file instead of the database
        #[arg(long)]
        corpus: Option<PathBuf>,
        /// Output JSON
        #[arg(long)]
        json: bool,
        /// Record each report in the database
        #[arg(long, default_value_t = false)]
        save: bool,
    },
    /// Heuristic plagiarism score only
    Score {
        path: PathBuf,
        /// Output JSON
        #[arg(long)]
        json: bool,
    },
    /// Print a document's embedding vector as JSON
    Embed { path: PathBuf },
    /// Manage the reference corpus
    Corpus {
        #[command(subcommand)]
        command: CorpusCommand,
    },
}

#[derive(Subcommand)]
enum CorpusCommand {
    /// Import sources from a JSON array
    Import {
        file: PathBuf,
        /// Embed title and abstract for entries without an embedding
        #[arg(long, default_value_t = false)]
        embed: bool,
    },
    /// List stored sources
    List {
        /// Output JSON
        #[arg(long)]
        json: bool,
    },
}

async fn open_db(cfg: &AppConfig) -> Result<sqlx::SqlitePool> {
    let pool = storage::connect(&cfg.database.path)
        .await
        .with_context(|| format!("opening database {}", cfg.database.path))?;
    storage::migrate(&pool).await?;
    Ok(pool)
}

async fn run_analyze(
    cfg: AppConfig,
    path: &Path,
    corpus_file: Option<&Path>,
    json: bool,
    save: bool,
) -> Result<()> {
    let registry = build_registry(&cfg);
    let pipeline = AnalysisPipeline::from_config(&cfg, &registry)?;
    let files = inputs::collect_files(path, &cfg.input)?;
    if files.is_empty() {
        anyhow::bail!("no documents matched under {}", path.display());
    }

    let db = if save || corpus_file.is_none() {
        Some(open_db(&cfg).await?)
    } else {
        None
    };
    let sources: Vec<SourceRecord> = match (corpus_file, &db) {
        (Some(file), _) => corpus::load_json(file)?,
        (None, Some(pool)) => corpus::load_db(pool).await?,
        (None, None) => Vec::new(),
    };
    info!("ranking against {} corpus entries", sources.len());

    let outcomes = batch::analyze_files(&pipeline, &files, &sources).await;
    let failures = outcomes.iter().filter(|o| o.result.is_err()).count();
    let mut results = Vec::with_capacity(outcomes.len());
    for outcome in &outcomes {
        results.push(outcome.to_json());
        let Ok(report) = &outcome.result else {
            continue;
        };
        let label = outcome.label();
        if save {
            if let Some(pool) = &db {
                let previous =
                    storage::analyses::analyses_for_document(pool, &report.document_hash).await?;
                if !previous.is_empty() {
                    info!("{} analyzed {} time(s) before", label, previous.len());
                }
                let id = history::save(pool, report, Some(&label)).await?;
                info!("saved analysis {} for {}", id, label);
            }
        }
        if !json {
            print!("{}", render::report(&label, report));
        }
    }

    if json {
        let out = if results.len() == 1 {
            results.remove(0)
        } else {
            serde_json::Value::Array(results)
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    }
    if failures == files.len() {
        anyhow::bail!("no document could be analyzed");
    }
    Ok(())
}

fn run_score(cfg: &AppConfig, path: &Path, json: bool) -> Result<()> {
    let files = inputs::collect_files(path, &cfg.input)?;
    let mut out = Vec::new();
    for file in &files {
        let text = match inputs::read_document(file) {
            Ok(text) => text,
            Err(err) => {
                warn!("{:#}", err);
                if json {
                    out.push(serde_json::json!({
                        "path": file.display().to_string(),
                        "error": format!("{:#}", err),
                    }));
                }
                continue;
            }
        };
        let report = plagiarism::score(&text);
        if json {
            out.push(serde_json::json!({
                "path": file.display().to_string(),
                "score": report.score,
                "flagged_sections": report.flagged_sections(),
                "signals": report.signals,
            }));
        } else {
            println!("== {}", file.display());
            print!("{}", render::plagiarism(&report));
        }
    }
    if json {
        println!("{}", serde_json::to_string_pretty(&out)?);
    }
    Ok(())
}

async fn run_embed(cfg: AppConfig, path: &Path) -> Result<()> {
    let registry = build_registry(&cfg);
    let pipeline = AnalysisPipeline::from_config(&cfg, &registry)?;
    let text = inputs::read_document(path)?;
    let vector = pipeline.embedder().embed(&text).await?;
    println!("{}", serde_json::to_string(&vector)?);
    Ok(())
}

async fn run_import(cfg: AppConfig, file: &Path, embed: bool) -> Result<()> {
    let mut records = corpus::load_json(file)?;
    if embed {
        let registry = build_registry(&cfg);
        let pipeline = AnalysisPipeline::from_config(&cfg, &registry)?;
        let filled = corpus::embed_missing(pipeline.embedder(), &mut records).await?;
        info!("computed {} missing embeddings", filled);
    }
    let pool = open_db(&cfg).await?;
    let n = corpus::import(&pool, &records).await?;
    let total = storage::sources::count_sources(&pool).await?;
    println!("imported {} sources ({} in corpus)", n, total);
    Ok(())
}

async fn run_list(cfg: AppConfig, json: bool) -> Result<()> {
    let pool = open_db(&cfg).await?;
    let records = corpus::load_db(&pool).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }
    for r in &records {
        let dims = match r.embedding.as_array() {
            Some(values) => format!("{} dims", values.len()),
            None => "no usable embedding".to_string(),
        };
        println!("{}\t{}\t{}\t{}", r.id, r.title, r.authors.join(", "), dims);
    }
    println!("{} sources", records.len());
    Ok(())
}
