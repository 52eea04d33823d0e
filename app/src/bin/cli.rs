use std::io::Write;
use std::path::PathBuf;

use clap::Parser;
use tf_classify_core::{ImageClassifier, ModelConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Print the top classes of an image according to a retrained frozen graph.
#[derive(Parser)]
struct Args {
    image: PathBuf,

    /// Frozen GraphDef (`.pb`)
    model: PathBuf,

    /// One label per line, line N naming output class N
    labels: PathBuf,

    /// TOML file overriding tensor names and preprocessing
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    top_k: Option<usize>,
}

pub fn main() -> anyhow::Result<()> {
    std::env::set_var("RUST_BACKTRACE", "full");
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut config = match &args.config {
        Some(path) => ModelConfig::from_path(path)?,
        None => ModelConfig::default(),
    };
    if let Some(k) = args.top_k {
        config.top_k = k;
    }

    let classifier = ImageClassifier::new(&args.model, &args.labels, config)?;
    let results = classifier.classify(&args.image)?;
    info!("classified {}", args.image.display());

    let mut out = std::io::stdout().lock();
    for r in results {
        writeln!(out, "{r}")?;
    }
    Ok(())
}
