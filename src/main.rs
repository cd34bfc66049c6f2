use std::sync::Arc;

use anyhow::Context;
use launcher_client::{
    catalog::Templates,
    launcher::{directories::config_file, logging, process::ProcessBackend},
    state::ClientConfig,
    store::Store,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ClientConfig::load();
    logging::init(&config.log_filter);

    if config_file().is_some_and(|path| !path.exists()) {
        if let Err(e) = config.save().await {
            tracing::warn!("could not write default configuration: {:#}", e);
        }
    }

    let (backend, events) = ProcessBackend::spawn(&config.backend)?;
    let store = Store::new(Arc::new(backend), Arc::new(Templates::default()), &config);
    let pump = store.listen(events);

    store.init().await.context("failed to load the launcher session")?;

    let mut changes = store.subscribe();
    let mut page = changes.borrow_and_update().page;
    tracing::info!(?page, "launcher ready");
    loop {
        let changed = tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = changes.changed() => changed,
        };
        if changed.is_err() {
            break;
        }
        let current = changes.borrow_and_update().page;
        if current != page {
            tracing::info!(from = ?page, to = ?current, "page changed");
            page = current;
        }
    }

    store.shutdown();
    pump.abort();
    println!("Until next time!");
    Ok(())
}
