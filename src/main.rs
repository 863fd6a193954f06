use clap::Parser;
use tracing_subscriber::EnvFilter;

mod app;
mod cli;
mod config;
mod notes;
mod query;
mod quote;
mod storage;
#[cfg(test)]
mod tests;
mod vault;
mod widgets;

use app::AppFactory;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("vq=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = cli::Args::parse();

    let base_path = AppFactory::get_base_path(args.base_dir.as_deref())?;
    let mut ctx = AppFactory::create_context(&base_path, args.vault.as_deref())?;

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(cli::run(args.command, &mut ctx))
}
