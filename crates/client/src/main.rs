use std::sync::Arc;

use anyhow::Context;
use nooryx_client::{
    ClientConfig, ControllerSettings, FilePreferenceStore, HttpInventoryApi, ListController,
    PreferenceStore, TableView,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    nooryx_observability::init();

    let config = ClientConfig::from_env().context("invalid client configuration")?;

    let store = match &config.preferences_path {
        Some(path) => Some(FilePreferenceStore::new(path)),
        None => FilePreferenceStore::default_location().ok(),
    };
    let prefs = store
        .map(|s| s.load())
        .transpose()
        .unwrap_or_else(|e| {
            tracing::warn!("ignoring unreadable preferences: {}", e);
            None
        })
        .unwrap_or_default();

    // Optional search term as the only argument.
    let search = std::env::args().nth(1);
    let location = search.as_deref().map(|s| {
        url::form_urlencoded::Serializer::new(String::new())
            .append_pair("search", s)
            .finish()
    });

    let api = Arc::new(HttpInventoryApi::new(&config).context("failed to build HTTP client")?);
    let settings = ControllerSettings::resolve(&config, &prefs, location.as_deref());
    tracing::info!(api = %config.api_url, "listing inventory");

    let mut controller = ListController::new(api, settings);
    controller.start();
    controller.settle().await;

    match controller.view() {
        TableView::Rows { items, page, .. } => {
            for row in &items {
                println!(
                    "{:<16} {:<32} {:<10} {:>8}  {}",
                    row.sku_code.as_str(),
                    row.name,
                    row.location.as_str(),
                    row.available_quantity,
                    row.status
                );
            }
            println!(
                "page {}/{} ({} items)",
                page.page, page.total_pages, page.total_items
            );
        }
        TableView::Empty => println!("no inventory matches"),
        TableView::NotProvisioned => println!("inventory has not been set up yet"),
        TableView::Failed { message, status, .. } => {
            anyhow::bail!("failed to list inventory ({status:?}): {message}");
        }
        TableView::Idle | TableView::Skeleton { .. } => {}
    }

    if let Some(query) = controller.location_query().filter(|q| !q.is_empty()) {
        println!("?{query}");
    }

    Ok(())
}
