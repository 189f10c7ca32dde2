use kaisar_zero::config::KaisarConfig;
use kaisar_zero::{AccountTaskPipeline, JsonAccountLoader, ResilientHttpInvoker, SessionScheduler};

use anyhow::{Context, Result};
use clap::Parser;
use core_logic::{
    setup_logger, shutdown_on_ctrl_c, AccountLoader, JsonProxyFile, ProxyManager, ProxyResolver,
};
use dotenv::dotenv;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(author, version, about = "Kaisar ZeroNode hourly task runner", long_about = None)]
struct Args {
    #[arg(short, long, default_value = "config/config.toml")]
    config: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let _log_guard = setup_logger();
    dotenv().ok();

    let args = Args::parse();
    info!("Loading config from: {}", args.config);

    let config = match KaisarConfig::load(&args.config) {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to load config: {:#}", e);
            return Err(e);
        }
    };
    let timezone = config.timezone()?;

    let accounts = JsonAccountLoader::new(&config.accounts_file)
        .load_accounts()
        .await
        .context("Failed to load accounts")?;

    let proxy: Arc<dyn ProxyResolver> = match &config.proxy_list_file {
        Some(path) => Arc::new(ProxyManager::load_from(path)?),
        None => Arc::new(JsonProxyFile::new(&config.proxy_file)),
    };

    let invoker = Arc::new(ResilientHttpInvoker::new(
        config.base_url.clone(),
        config.retry_policy(),
        proxy,
    ));
    let pipeline = AccountTaskPipeline::new(invoker, timezone);
    let mut scheduler = SessionScheduler::new(accounts, pipeline, config.session_interval());

    scheduler.run(shutdown_on_ctrl_c()).await;

    info!("🛑 Shutdown Complete.");
    Ok(())
}
