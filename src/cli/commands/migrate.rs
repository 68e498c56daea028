use anyhow::Context;

use crate::config;
use crate::database::PgStore;

pub async fn handle() -> anyhow::Result<()> {
    let store = PgStore::connect(&config::config().database)
        .await
        .context("failed to connect to database")?;
    store.migrate().await.context("failed to create tables")?;

    println!("tables ok");
    Ok(())
}
