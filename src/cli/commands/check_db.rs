use anyhow::Context;

use crate::config;
use crate::database::{PgStore, Store};

pub async fn handle() -> anyhow::Result<()> {
    let store = PgStore::connect(&config::config().database)
        .await
        .context("failed to connect to database")?;
    store.health_check().await.context("database liveness query failed")?;

    println!("database ok");
    Ok(())
}
