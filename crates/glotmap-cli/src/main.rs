//! Glotmap CLI
//!
//! Command-line interface for:
//! - Running the one-time batch ingestion (`glotmap ingest`)
//! - Ranked cross-lingual tag prediction (`glotmap predict`)
//! - Read accessors over the ingested store and name index
//!   (`languages`, `tags`, `entity`, `search`)

use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use glotmap_core::{Config, EntityId, Locale, RawTag};
use glotmap_ingest::Ingestor;
use glotmap_mapper::MapperRegistry;
use glotmap_search::NameIndex;
use glotmap_store::{Entities, KvStore, Languages, Store, TagSets};

/// Mapper handles kept per process; the CLI is short-lived so a small
/// cache is plenty.
const MAPPER_CACHE_CAPACITY: usize = 8;

#[derive(Parser)]
#[command(name = "glotmap")]
#[command(author, version, about = "Cross-lingual tag mapping over a shared embedding space")]
struct Cli {
    /// Data directory (overrides GLOTMAP_DATA).
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest the tag/entity corpora into the store and name index.
    ///
    /// Idempotent: a completion marker makes re-runs no-ops, and
    /// completed phases are skipped when retrying after a failure.
    Ingest,

    /// Rank target-locale tags for a set of source-locale tags.
    Predict {
        /// Source locale(s), repeatable.
        #[arg(long = "from", required = true)]
        sources: Vec<String>,
        /// Target locale.
        #[arg(long = "to")]
        target: String,
        /// Raw locale-qualified tags the prediction starts from.
        #[arg(required = true)]
        tags: Vec<String>,
        /// Keep only the top N predictions.
        #[arg(long, default_value_t = 20)]
        limit: usize,
        /// Drop input tags unknown to the embedding space instead of
        /// failing.
        #[arg(long)]
        lenient: bool,
    },

    /// List known languages.
    Languages,

    /// Print a locale's tag vocabulary.
    Tags {
        #[arg(long)]
        locale: String,
    },

    /// Show everything persisted for one entity id.
    Entity {
        eid: String,
        /// Emit JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Ngram search over entity names.
    Search {
        query: String,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = match &cli.data {
        Some(dir) => Config::rooted(dir.clone()),
        None => Config::from_env(),
    };

    match cli.command {
        Commands::Ingest => ingest(&config),
        Commands::Predict {
            sources,
            target,
            tags,
            limit,
            lenient,
        } => predict(&config, &sources, &target, &tags, limit, lenient),
        Commands::Languages => languages(&config),
        Commands::Tags { locale } => tags(&config, &locale),
        Commands::Entity { eid, json } => entity(&config, &eid, json),
        Commands::Search { query, limit } => search(&config, &query, limit),
    }
}

fn open_store(config: &Config) -> Result<KvStore> {
    KvStore::open(&config.store_path)
        .with_context(|| format!("opening store {}", config.store_path.display()))
}

fn ingest(config: &Config) -> Result<()> {
    println!("{}", "glotmap corpus ingestion".bold());
    info!(data = %config.data_dir.display(), "starting ingestion");
    let store = open_store(config)?;
    let report = Ingestor::new(&store, config).run()?;
    if report.skipped {
        println!("{} ingestion marker present, nothing to do", "SKIP".yellow());
        return Ok(());
    }
    store.flush()?;
    println!(
        "{} {} languages, {} tags, {} entities",
        "DONE".green(),
        report.languages,
        report.tags,
        report.entities
    );
    Ok(())
}

fn predict(
    config: &Config,
    sources: &[String],
    target: &str,
    tags: &[String],
    limit: usize,
    lenient: bool,
) -> Result<()> {
    let store = open_store(config)?;
    let sources = sources
        .iter()
        .map(|code| Locale::from_str(code))
        .collect::<glotmap_core::Result<Vec<_>>>()?;
    let target = Locale::from_str(target)?;

    // Reject malformed or out-of-scope tags before touching the matrix.
    for tag in tags {
        let tag = RawTag::new(tag.clone())?;
        if !sources.contains(&tag.locale()) {
            anyhow::bail!("tag {tag} is not in a source locale");
        }
    }

    let registry = MapperRegistry::new(config.embeddings.clone(), MAPPER_CACHE_CAPACITY);
    let provider = |locale: &Locale| TagSets::for_locale(&store, locale);
    let mapper = registry.get(&sources, &target, &provider)?;

    // Never suggest a tag the caller already holds.
    let holds = |tag: &str| !tags.iter().any(|t| t == tag);
    let ranked = if lenient {
        let partial = mapper.predict_partial(tags, holds);
        for unknown in &partial.unknown {
            eprintln!("{} unknown tag {unknown}", "WARN".yellow());
        }
        partial.predictions
    } else {
        mapper.predict(tags, holds)?
    };

    for tag in ranked.iter().take(limit) {
        println!("{tag}");
    }
    Ok(())
}

fn languages(config: &Config) -> Result<()> {
    let store = open_store(config)?;
    for language in Languages::all(&store)? {
        println!("{}  {}", language.locale.to_string().bold(), language.label);
    }
    Ok(())
}

fn tags(config: &Config, locale: &str) -> Result<()> {
    let store = open_store(config)?;
    let locale = Locale::from_str(locale)?;
    for tag in TagSets::for_locale(&store, &locale) {
        println!("{tag}");
    }
    Ok(())
}

fn entity(config: &Config, eid: &str, json: bool) -> Result<()> {
    let store = open_store(config)?;
    let eid = EntityId::parse(eid)?;
    let views = Entities::get(&store, &eid)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&views)?);
        return Ok(());
    }
    for view in views {
        println!("{} {}", view.locale.to_string().bold(), view.uri);
        for tag in view.tags {
            println!("    {tag}");
        }
    }
    Ok(())
}

fn search(config: &Config, query: &str, limit: usize) -> Result<()> {
    let index = NameIndex::open(&config.index_dir)
        .with_context(|| format!("opening index {}", config.index_dir.display()))?;
    for hit in index.search(query, limit)? {
        println!(
            "{}  {}  [{}]",
            hit.eid.dimmed(),
            hit.name.bold(),
            hit.locales.join(", ")
        );
    }
    Ok(())
}
