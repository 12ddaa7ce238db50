mod config;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use engine_logging::{engine_error, engine_info, LogDestination};
use log::LevelFilter;
use newsletter_engine::{ConversionJob, Pipeline, ReqwestFetcher, RunReport};

use crate::config::SettingsFile;

/// Converts exported newsletter archive pages into static-site page bundles.
#[derive(Parser, Debug)]
#[command(
    version,
    about,
    after_help = "example: newsletter2hugo ~/Downloads/archive/posts/ ~/blog/content/ posts"
)]
struct Args {
    /// Folder holding the exported .html pages
    input_folder: PathBuf,

    /// Content folder of the static site, e.g. hugo/content
    output_folder: PathBuf,

    /// Section the posts are written to, e.g. posts
    content_type: String,

    /// RON settings file overriding selectors and download settings
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Also write the log to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Log debug messages
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            let _ = err.print();
            return if err.use_stderr() {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    let destination = match args.log_file.clone() {
        Some(path) => LogDestination::TerminalAndFile(path),
        None => LogDestination::Terminal,
    };
    let level = if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    engine_logging::initialize(destination, level);

    match run(args) {
        Ok(report) => {
            engine_info!(
                "Done: {} converted, {} skipped, {} failed of {} entries",
                report.converted,
                report.skipped,
                report.failed,
                report.found
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            engine_error!("{err:#}");
            ExitCode::from(1)
        }
    }
}

fn run(args: Args) -> anyhow::Result<RunReport> {
    let settings = match args.config.as_deref() {
        Some(path) => config::load(path)?,
        None => SettingsFile::default(),
    };
    let job = ConversionJob {
        input_dir: args.input_folder,
        output_dir: args.output_folder,
        content_type: args.content_type,
    };

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("starting the async runtime")?;

    runtime.block_on(async {
        let fetcher = ReqwestFetcher::new(&settings.fetch).context("building the HTTP client")?;
        let pipeline = Pipeline::new(settings.convert, Box::new(fetcher));
        let report = pipeline.run(&job).await?;
        Ok::<_, anyhow::Error>(report)
    })
}
