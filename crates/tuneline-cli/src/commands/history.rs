use crate::output::Output;
use crate::HistoryCommands;
use color_eyre::eyre::{bail, Context};
use color_eyre::Result;
use media_catalog_core::Catalog;

pub async fn run_history(cmd: HistoryCommands, catalog: &Catalog, output: &Output) -> Result<()> {
    match cmd {
        HistoryCommands::List => output.history(&catalog.get_all_history()),
        HistoryCommands::Continue => {
            let items = catalog.continue_watching().await;
            output.items("Continue watching", &items);
        }
        HistoryCommands::Record { id, position, duration } => {
            if !(position >= 0.0 && duration > 0.0) {
                bail!("Position must be >= 0 and duration > 0 (got {} / {})", position, duration);
            }
            let record = catalog
                .upsert_history(&id, position, duration)
                .await
                .wrap_err_with(|| format!("Failed to save history for {}", id))?;
            if record.is_finished() {
                output.success(format!("Recorded {} as finished", id));
            } else {
                output.success(format!("Recorded {} at {:.0}%", id, record.progress() * 100.0));
            }
        }
        HistoryCommands::Clear => {
            catalog.clear_history().await.wrap_err("Failed to clear history")?;
            output.success("Watch history cleared");
        }
    }
    Ok(())
}
