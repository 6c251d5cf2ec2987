use crate::output::Output;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use media_catalog_core::{Advance, Catalog, ContinuousPlayback};
use media_catalog_models::ItemRecord;
use std::sync::Arc;

/// Play `episode_id` from `container_id` and report what continuous playback picks when it ends.
pub async fn run_next(catalog: Arc<Catalog>, container_id: &str, episode_id: &str, output: &Output) -> Result<()> {
    let mut playback = ContinuousPlayback::new(catalog.clone());

    if let Some(container) = catalog.get_item(container_id).await {
        playback.open_container(&container.record());
    }

    let children: Vec<ItemRecord> = catalog
        .get_children(container_id)
        .await
        .iter()
        .map(|item| item.record())
        .collect();
    let episode = children
        .iter()
        .find(|child| child.id == episode_id)
        .cloned()
        .ok_or_else(|| eyre!("'{}' is not a child of '{}'", episode_id, container_id))?;

    playback.play_from_container(container_id, children, episode);

    match playback.advance_or_exit().await {
        Advance::Play(next) => output.next_up(Some(&next)),
        Advance::Exit => output.next_up(None),
    }
    Ok(())
}
