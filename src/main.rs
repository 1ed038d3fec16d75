use std::sync::Arc;

use dotenvy::dotenv;
use tracing::info;

use roster_sync::infra::{
    config::AppConfig,
    scheduler::run_weekly,
    setup::{init_member_sync, init_tracing},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let config = AppConfig::from_env()?;
    init_tracing(config.log_file.as_deref())?;

    let member_sync = Arc::new(init_member_sync(&config)?);

    info!(workspace = %config.slack_workspace_origin, "Roster sync starting");

    run_weekly(config.schedule, member_sync).await;

    Ok(())
}
