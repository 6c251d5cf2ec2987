use crate::output::Output;
use color_eyre::eyre::Context;
use color_eyre::Result;
use media_catalog_core::Catalog;

pub async fn run_clear(all: bool, cache: bool, history: bool, watchlist: bool, catalog: &Catalog, output: &Output) -> Result<()> {
    if !(all || cache || history || watchlist) {
        output.warn("No clear option specified. Use --cache, --history, --watchlist, or --all");
        output.info("Example: tuneline clear --cache");
        return Ok(());
    }

    if all || cache {
        catalog.clear_item_cache().await.wrap_err("Failed to clear item cache")?;
        output.success("Cleared item cache");
    }

    if all || history {
        catalog.clear_history().await.wrap_err("Failed to clear history")?;
        output.success("Cleared watch history");
    }

    if all || watchlist {
        catalog.clear_watchlist().await.wrap_err("Failed to clear watchlist")?;
        output.success("Cleared watchlist");
    }

    Ok(())
}
