// docx-markdown: convert Word documents to Markdown with extracted images.
//
// Ctrl-C stops the batch after the documents already in progress.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use docx_markdown::batch::convert_batch_with_cancel;
use docx_markdown::config::ConverterConfig;

#[derive(Parser, Debug)]
#[command(name = "docx-markdown")]
#[command(about = "Convert Word documents to Markdown", version)]
struct Args {
    /// Word documents to convert
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Write Markdown and images here instead of next to each document
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Name of the image directory
    #[arg(long, value_name = "NAME")]
    images: Option<String>,

    /// Do not insert the file name as a level-1 heading
    #[arg(long)]
    no_title: bool,

    /// Replace existing Markdown files
    #[arg(long)]
    overwrite: bool,

    /// Convert documents in parallel
    #[arg(long)]
    parallel: bool,

    /// JSON settings file (camelCase keys); flags override it
    #[arg(long, value_name = "SETTINGS_JSON")]
    config: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn converter_config(&self) -> Result<ConverterConfig> {
        let base = match &self.config {
            Some(path) => ConverterConfig::from_json_file(path)
                .with_context(|| format!("Failed to load settings from {}", path.display()))?,
            None => ConverterConfig::default(),
        };

        let mut builder = ConverterConfig::builder()
            .image_dir_name(self.images.clone().unwrap_or_else(|| base.image_dir_name().to_string()))
            .insert_title(base.insert_title() && !self.no_title)
            .overwrite(base.overwrite() || self.overwrite)
            .parallel(base.parallel() || self.parallel)
            .image_types(base.extra_image_types().clone());
        if let Some(dir) = self.out_dir.clone().or_else(|| base.output_dir().map(PathBuf::from)) {
            builder = builder.output_dir(dir);
        }
        Ok(builder.build()?)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("docx_markdown={default_level}").into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = args.converter_config()?;

    let cancel = Arc::new(AtomicBool::new(false));
    {
        let cancel = Arc::clone(&cancel);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("interrupt received, finishing documents in progress");
                cancel.store(true, Ordering::Relaxed);
            }
        });
    }

    let files = args.files;
    let summary = tokio::task::spawn_blocking(move || {
        convert_batch_with_cancel(&files, &config, &cancel)
    })
    .await
    .context("Batch conversion task panicked")?;

    print!("{}", summary.render());
    if summary.has_failures() {
        std::process::exit(1);
    }
    Ok(())
}
