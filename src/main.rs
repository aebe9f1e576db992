use clap::Parser;
use cli::{Args, Command};
use indicatif::ProgressStyle;
use tracing::level_filters::LevelFilter;
use tracing_error::ErrorLayer;
use tracing_indicatif::IndicatifLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

pub mod artifacts;
pub mod chain;
pub mod forge_utils;
pub mod serde_utils;

mod abis;
mod cli;
mod config;
mod deployment;
mod report;
mod status;
mod types;
mod weapon;

const SPAN_TEMPLATE: &str = "{spinner:.green} \
    {span_child_prefix}{span_name}{{{span_fields}}} {wide_msg} {elapsed}";

fn failure_message(report: &eyre::Report) -> String {
    format!("部署失败: {report:?}")
}

async fn start() -> eyre::Result<()> {
    let args = Args::parse();

    match args.command() {
        Command::Deploy => deployment::run_deployment(&args).await,
        Command::Status => status::run_status(&args).await,
    }
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    color_eyre::install()?;

    dotenv::dotenv().ok();

    let indicatif_layer = IndicatifLayer::new()
        .with_progress_style(ProgressStyle::with_template(SPAN_TEMPLATE)?);

    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(indicatif_layer.get_stderr_writer())
                .with_filter(filter),
        )
        .with(indicatif_layer)
        .with(ErrorLayer::default())
        .init();

    match start().await {
        Ok(()) => Ok(()),
        Err(report) => {
            eprintln!("{}", failure_message(&report));
            std::process::exit(1)
        }
    }
}
