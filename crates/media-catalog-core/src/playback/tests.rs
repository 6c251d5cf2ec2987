use super::*;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

#[derive(Default)]
struct Seasons {
    children: HashMap<String, Vec<ItemRecord>>,
    requests: Mutex<Vec<String>>,
    calls: AtomicUsize,
}

impl Seasons {
    fn with(mut self, container_id: &str, episodes: Vec<ItemRecord>) -> Self {
        self.children.insert(container_id.to_string(), episodes);
        self
    }
}

#[async_trait]
impl EpisodeSource for Seasons {
    async fn episodes(&self, container_id: &str) -> Vec<ItemRecord> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(container_id.to_string());
        self.children.get(container_id).cloned().unwrap_or_default()
    }
}

fn episode(id: &str) -> ItemRecord {
    ItemRecord::new(id, id.to_uppercase(), ItemType::Video)
}

fn episodes(ids: &[&str]) -> Vec<ItemRecord> {
    ids.iter().map(|id| episode(id)).collect()
}

fn season_one() -> PlaybackContext {
    PlaybackContext {
        current_episode_list: episodes(&["ep1", "ep2", "ep3"]),
        current_show_id: Some("show".to_string()),
        current_season_id: Some("show|1".to_string()),
    }
}

fn engine(seasons: Seasons) -> (Arc<Seasons>, ContinuousPlayback) {
    let seasons = Arc::new(seasons);
    let engine = ContinuousPlayback::new(seasons.clone());
    (seasons, engine)
}

#[tokio::test]
async fn test_advance_plays_next_episode_in_list() {
    let (seasons, engine) = engine(Seasons::default());
    let mut engine = engine.with_context(season_one(), episode("ep1"));

    assert_eq!(engine.advance_or_exit().await, Advance::Play(episode("ep2")));
    assert_eq!(engine.advance_or_exit().await, Advance::Play(episode("ep3")));
    assert_eq!(engine.active().map(|e| e.id.as_str()), Some("ep3"));
    assert_eq!(seasons.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_advance_from_last_episode_moves_to_next_season() {
    let (seasons, engine) = engine(Seasons::default().with("show|2", episodes(&["s2ep1", "s2ep2"])));
    let mut engine = engine.with_context(season_one(), episode("ep3"));

    assert_eq!(engine.advance_or_exit().await, Advance::Play(episode("s2ep1")));
    assert_eq!(engine.context().current_season_id.as_deref(), Some("show|2"));
    assert_eq!(engine.context().current_show_id.as_deref(), Some("show"));
    assert_eq!(engine.context().current_episode_list, episodes(&["s2ep1", "s2ep2"]));
    assert_eq!(*seasons.requests.lock().unwrap(), vec!["show|2".to_string()]);

    // And keeps going inside the new season
    assert_eq!(engine.advance_or_exit().await, Advance::Play(episode("s2ep2")));
}

#[tokio::test]
async fn test_last_episode_of_last_season_exits() {
    let (_, engine) = engine(Seasons::default());
    let mut engine = engine.with_context(season_one(), episode("ep3"));

    assert_eq!(engine.advance_or_exit().await, Advance::Exit);
    assert!(engine.active().is_none());
    assert_eq!(engine.advance_or_exit().await, Advance::Exit);
}

#[tokio::test]
async fn test_next_season_of_only_containers_exits() {
    let folder = ItemRecord::new("show|2|extras", "Extras", ItemType::Folder);
    let (_, engine) = engine(Seasons::default().with("show|2", vec![folder]));
    let mut engine = engine.with_context(season_one(), episode("ep3"));

    assert_eq!(engine.advance_or_exit().await, Advance::Exit);
}

#[tokio::test]
async fn test_next_season_skips_containers() {
    let folder = ItemRecord::new("show|2|extras", "Extras", ItemType::Folder);
    let track = ItemRecord::new("s2t1", "Track", ItemType::Audio);
    let (_, engine) = engine(Seasons::default().with("show|2", vec![folder, track.clone()]));
    let mut engine = engine.with_context(season_one(), episode("ep3"));

    assert_eq!(engine.advance_or_exit().await, Advance::Play(track.clone()));
    assert_eq!(engine.context().current_episode_list, vec![track]);
}

#[tokio::test]
async fn test_flat_container_has_no_next_season() {
    let (seasons, mut engine) = engine(Seasons::default());
    engine.play_from_container("album", episodes(&["t1", "t2"]), episode("t2"));

    assert_eq!(engine.context().current_show_id.as_deref(), Some("album"));
    assert_eq!(engine.advance_or_exit().await, Advance::Exit);
    assert_eq!(seasons.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_malformed_season_suffix_exits() {
    let (seasons, mut engine) = engine(Seasons::default());
    engine.play_from_container("show|abc", episodes(&["e1"]), episode("e1"));

    assert_eq!(engine.advance_or_exit().await, Advance::Exit);
    assert_eq!(seasons.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_no_active_item_exits() {
    let (_, mut engine) = engine(Seasons::default());
    assert_eq!(engine.advance_or_exit().await, Advance::Exit);
}

#[tokio::test]
async fn test_play_direct_clears_context() {
    let (seasons, engine) = engine(Seasons::default().with("show|2", episodes(&["s2ep1"])));
    let mut engine = engine.with_context(season_one(), episode("ep1"));

    engine.play_direct(episode("from-search"));

    assert!(!engine.context().is_active());
    assert_eq!(engine.advance_or_exit().await, Advance::Exit);
    assert_eq!(seasons.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_opening_a_brand_clears_context_but_other_containers_do_not() {
    let (_, engine) = engine(Seasons::default());
    let mut engine = engine.with_context(season_one(), episode("ep1"));

    engine.open_container(&ItemRecord::new("show|2", "Season 2", ItemType::Folder));
    assert_eq!(engine.context(), &season_one());

    engine.open_container(&ItemRecord::new("show", "Show", ItemType::Brand));
    assert_eq!(engine.context(), &PlaybackContext::default());
}

#[test]
fn test_context_from_season_container() {
    let context = PlaybackContext::from_container(
        "net|show|3",
        vec![episode("e1"), ItemRecord::new("bonus", "Bonus", ItemType::Folder), episode("e2")],
    );

    assert_eq!(context.current_show_id.as_deref(), Some("net|show"));
    assert_eq!(context.current_season_id.as_deref(), Some("net|show|3"));
    assert_eq!(context.current_episode_list, episodes(&["e1", "e2"]));
}

#[test]
fn test_next_is_found_by_id_not_by_payload() {
    let mut context = season_one();
    context.current_episode_list[1].name = "renamed".to_string();

    let playing = ItemRecord::new("ep1", "something else", ItemType::Audio);
    assert_eq!(context.next_after(&playing.id).map(|e| e.name.as_str()), Some("renamed"));
}
