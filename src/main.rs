use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use stylevec::prelude::*;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// Encode captured page styles into style vectors
#[derive(Parser, Debug)]
#[command(name = "stylevec")]
#[command(about = "Style vector encoding engine", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Optional JSON encoder config; missing fields keep their defaults
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Encode one capture bundle and print the vectors as JSON
    Encode {
        /// Capture bundle (viewport, nodes, tokens, report)
        bundle: PathBuf,

        /// Which vectors to build
        #[arg(long, value_enum, default_value_t = KindArg::All)]
        kind: KindArg,
    },
    /// Compare the global style vectors of two capture bundles
    Compare {
        left: PathBuf,
        right: PathBuf,

        /// Number of differentiating features to list
        #[arg(long, default_value_t = 5)]
        top: usize,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum KindArg {
    Global,
    Cta,
    All,
}

fn load_config(path: Option<&Path>) -> anyhow::Result<EncoderConfig> {
    let config: EncoderConfig = match path {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            serde_json::from_str(&json)
                .with_context(|| format!("Invalid config {}", path.display()))?
        }
        None => EncoderConfig::default(),
    };
    config.validate()?;
    Ok(config)
}

async fn encode_global(bundle: &CaptureBundle, config: &EncoderConfig) -> anyhow::Result<StyleVector> {
    let provider = HashingTextEmbedder::new(config.font_embedding_dim);
    let vector = build_global_style_vector(
        &bundle.tokens,
        &bundle.report,
        &bundle.nodes,
        &bundle.viewport,
        &provider,
        config,
    )
    .await?;
    Ok(vector)
}

async fn run_encode(path: &Path, kind: KindArg, config: &EncoderConfig) -> anyhow::Result<()> {
    let bundle = CaptureBundle::from_path(path)?;
    info!("Loaded {} nodes from {}", bundle.nodes.len(), path.display());

    let mut output = serde_json::Map::new();
    if matches!(kind, KindArg::Global | KindArg::All) {
        let vector = encode_global(&bundle, config).await?;
        output.insert("globalStyle".to_string(), serde_json::to_value(&vector)?);
    }
    if matches!(kind, KindArg::Cta | KindArg::All) {
        let vector = build_primary_cta_vector(&bundle.tokens, &bundle.report, config)?;
        output.insert("primaryCta".to_string(), serde_json::to_value(&vector)?);
    }

    println!("{}", serde_json::to_string_pretty(&Value::Object(output))?);
    Ok(())
}

async fn run_compare(left: &Path, right: &Path, top: usize, config: &EncoderConfig) -> anyhow::Result<()> {
    let a = encode_global(&CaptureBundle::from_path(left)?, config).await?;
    let b = encode_global(&CaptureBundle::from_path(right)?, config).await?;
    let comparison = compare_vectors(&a, &b)?;

    println!("{:<36} {:>8} {:>8} {:>8}  verdict", "feature", "left", "right", "delta");
    for d in &comparison.deltas {
        println!(
            "{:<36} {:>8.3} {:>8.3} {:>+8.3}  {}",
            d.name, d.left, d.right, d.delta, d.verdict
        );
    }
    println!();
    println!("combined cosine:      {:.4}", comparison.combined_similarity);
    println!("interpretable cosine: {:.4}", comparison.interpretable_similarity);

    let top_features: Vec<Value> = comparison
        .top_differentiators(top)
        .into_iter()
        .map(|d| json!({"feature": d.name, "delta": d.delta}))
        .collect();
    println!("top differentiators:  {}", serde_json::to_string(&top_features)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    // Logs go to stderr so stdout stays machine-readable
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("stylevec v{}", env!("CARGO_PKG_VERSION"));
    let config = load_config(args.config.as_deref())?;

    match args.command {
        Command::Encode { bundle, kind } => run_encode(&bundle, kind, &config).await,
        Command::Compare { left, right, top } => run_compare(&left, &right, top, &config).await,
    }
}
