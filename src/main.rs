use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use reshard::dictionary::{CsvMappingSource, ReloadWorker};
use reshard::functions::{evaluate, ConsistentHashShard, HashRangeBucket};
use reshard::{DictionaryRegistry, FunctionFactory, QueryContext, RouterConfig, ScalarValue};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "reshard")]
#[command(about = "Resolve hash-range buckets and shards from a partition map", long_about = None)]
struct Args {
    /// Configuration file (TOML); falls back to $RESHARD_CONFIG
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Partition map CSV, overrides dictionary.source
    #[arg(short, long)]
    mapping: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Hash-range bucket of typed values (u8:7 i8:-1 i64:42 str:alice)
    Bucket {
        #[arg(required = true)]
        values: Vec<String>,
    },

    /// Shard owning (table, date, range id)
    Shard {
        #[arg(long)]
        table: String,
        #[arg(long)]
        date: u32,
        #[arg(long)]
        range_id: u32,
        /// Mapping version (default: routing.default_version)
        #[arg(long)]
        version: Option<String>,
    },

    /// Bucket the values, then resolve the shard of that bucket
    Route {
        #[arg(long)]
        table: String,
        #[arg(long)]
        date: u32,
        #[arg(long)]
        version: Option<String>,
        #[arg(required = true)]
        values: Vec<String>,
    },

    /// Keep reloading the partition map until Ctrl+C
    Watch,
}

fn load_config(args: &Args) -> anyhow::Result<RouterConfig> {
    let path = args
        .config
        .clone()
        .or_else(|| std::env::var_os("RESHARD_CONFIG").map(PathBuf::from));

    let mut config = match path {
        Some(path) => RouterConfig::load(&path)?,
        None => RouterConfig::default(),
    };
    if let Some(mapping) = &args.mapping {
        config.dictionary.source = Some(mapping.clone());
    }
    Ok(config)
}

fn parse_values(values: &[String]) -> anyhow::Result<Vec<ScalarValue>> {
    values
        .iter()
        .map(|v| ScalarValue::parse_literal(v).map_err(anyhow::Error::msg))
        .collect()
}

fn query_context(version: Option<String>) -> QueryContext {
    match version {
        Some(version) => QueryContext::new().with_active_version(version),
        None => QueryContext::new(),
    }
}

fn resolve_shard(
    factory: &FunctionFactory,
    context: &QueryContext,
    table: &str,
    date: u32,
    range_id: u32,
) -> anyhow::Result<u32> {
    let function = factory.get(ConsistentHashShard::NAME, context)?;
    let shard = evaluate(
        function.as_ref(),
        &[
            ScalarValue::String(table.to_string()),
            ScalarValue::UInt32(date),
            ScalarValue::UInt32(range_id),
        ],
    )?;
    Ok(shard)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "reshard=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = load_config(&args)?;

    let registry = Arc::new(DictionaryRegistry::new());
    if let Some(source) = &config.dictionary.source {
        registry.register(
            config.dictionary.name.clone(),
            Arc::new(CsvMappingSource::new(source)),
        );
    }
    let factory = FunctionFactory::new(config.clone(), registry.clone())?;

    match args.command {
        Command::Bucket { values } => {
            let values = parse_values(&values)?;
            let hash = factory.bucket_resolver().resolve_hash(&values);
            let function = factory.get(HashRangeBucket::NAME, &QueryContext::new())?;
            let bucket = evaluate(function.as_ref(), &values)?;

            if args.json {
                println!("{}", serde_json::json!({ "hash": hash, "bucket": bucket }));
            } else {
                println!("{}", bucket);
            }
        }

        Command::Shard {
            table,
            date,
            range_id,
            version,
        } => {
            let context = query_context(version);
            let shard = resolve_shard(&factory, &context, &table, date, range_id)?;

            if args.json {
                println!(
                    "{}",
                    serde_json::json!({
                        "table": table,
                        "date": date,
                        "range_id": range_id,
                        "version": factory.version_for(&context),
                        "shard": shard,
                    })
                );
            } else {
                println!("{}", shard);
            }
        }

        Command::Route {
            table,
            date,
            version,
            values,
        } => {
            let values = parse_values(&values)?;
            let bucket_fn = factory.get(HashRangeBucket::NAME, &QueryContext::new())?;
            let range_id = evaluate(bucket_fn.as_ref(), &values)?;

            let context = query_context(version);
            let shard = resolve_shard(&factory, &context, &table, date, range_id)?;

            if args.json {
                println!(
                    "{}",
                    serde_json::json!({
                        "table": table,
                        "date": date,
                        "range_id": range_id,
                        "version": factory.version_for(&context),
                        "shard": shard,
                    })
                );
            } else {
                println!("bucket {} -> shard {}", range_id, shard);
            }
        }

        Command::Watch => {
            if config.dictionary.source.is_none() {
                anyhow::bail!("no partition map configured (set dictionary.source or --mapping)");
            }

            for (name, result) in registry.reload_all() {
                if let Err(e) = result {
                    tracing::warn!("Initial load of {} failed: {}", name, e);
                }
            }

            let worker = Arc::new(ReloadWorker::new(
                registry.clone(),
                config.dictionary.refresh_interval_secs,
            ));
            let handle = tokio::spawn(worker.start());

            tokio::signal::ctrl_c().await?;
            handle.abort();

            tracing::info!("Shutdown signal received");
            for status in registry.status() {
                if args.json {
                    println!("{}", serde_json::to_string(&status)?);
                } else {
                    println!(
                        "{} generation={} loaded={}",
                        status.name, status.generation, status.loaded
                    );
                }
            }
        }
    }

    Ok(())
}
