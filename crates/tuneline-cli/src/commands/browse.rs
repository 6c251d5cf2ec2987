use crate::output::Output;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use media_catalog_core::{Catalog, SearchOutcome};

pub async fn run_listing(catalog: &Catalog, output: &Output) -> Result<()> {
    let items = catalog.get_listing().await;
    output.items("Listing", &items);
    Ok(())
}

pub async fn run_search(catalog: &Catalog, query: &str, output: &Output) -> Result<()> {
    let cancel = catalog.begin_search();
    match catalog.search(query, &cancel).await {
        SearchOutcome::Completed(items) => output.items(&format!("Results for '{}'", query), &items),
        SearchOutcome::Cancelled => output.warn("Search cancelled"),
    }
    Ok(())
}

pub async fn run_children(catalog: &Catalog, id: &str, output: &Output) -> Result<()> {
    let items = catalog.get_children(id).await;
    output.items(&format!("Children of {}", id), &items);
    Ok(())
}

pub async fn run_item(catalog: &Catalog, id: &str, output: &Output) -> Result<()> {
    let item = catalog
        .get_item(id)
        .await
        .ok_or_else(|| eyre!("Item '{}' not found in any provider", id))?;
    output.item(&item);
    Ok(())
}
