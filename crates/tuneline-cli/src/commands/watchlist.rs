use crate::output::Output;
use crate::WatchlistCommands;
use color_eyre::eyre::{eyre, Context};
use color_eyre::Result;
use media_catalog_core::Catalog;

pub async fn run_watchlist(cmd: WatchlistCommands, catalog: &Catalog, output: &Output) -> Result<()> {
    match cmd {
        WatchlistCommands::List => {
            let items = catalog.get_watchlist_items().await;
            output.items("Watchlist", &items);
        }
        WatchlistCommands::Add { id } => {
            if catalog.is_on_watchlist(&id) {
                output.info(format!("{} is already on the watchlist", id));
                return Ok(());
            }
            let item = catalog
                .get_item(&id)
                .await
                .ok_or_else(|| eyre!("Item '{}' not found in any provider", id))?;
            catalog
                .add_to_watchlist(&item)
                .await
                .wrap_err("Failed to save watchlist")?;
            output.success(format!("Added '{}' to the watchlist", item.name()));
        }
        WatchlistCommands::Remove { id } => {
            if catalog.remove_from_watchlist(&id).await.wrap_err("Failed to save watchlist")? {
                output.success(format!("Removed {} from the watchlist", id));
            } else {
                output.info(format!("{} was not on the watchlist", id));
            }
        }
        WatchlistCommands::Clear => {
            if catalog.clear_watchlist().await.wrap_err("Failed to clear watchlist")? {
                output.success("Watchlist cleared");
            } else {
                output.info("Watchlist was already empty");
            }
        }
    }
    Ok(())
}
