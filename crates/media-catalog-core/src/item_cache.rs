//! Persisted cache of provider records (second cache tier).
//!
//! Reads never touch the disk. Writes are coalesced by a single background
//! writer task: the first `put` opens a debounce window, further puts inside
//! the window ride along, and one full snapshot is written when it closes.

use media_catalog_models::ItemRecord;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use crate::error::{CatalogError, Result};
use crate::persist;

enum WriterCommand {
    Schedule,
    Flush(oneshot::Sender<()>),
}

struct CacheState {
    path: PathBuf,
    records: RwLock<HashMap<String, ItemRecord>>,
    dirty: AtomicBool,
    writes: AtomicUsize,
}

impl CacheState {
    async fn write_if_dirty(&self) {
        if !self.dirty.swap(false, Ordering::SeqCst) {
            return;
        }

        let snapshot: BTreeMap<String, ItemRecord> = self
            .records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(id, record)| (id.clone(), record.clone()))
            .collect();

        let result = match persist::to_json(&snapshot, "item cache") {
            Ok(bytes) => persist::write_atomic(&self.path, bytes).await,
            Err(e) => Err(e),
        };
        match result {
            Ok(()) => {
                self.writes.fetch_add(1, Ordering::SeqCst);
                debug!("Saved item cache: {} records", snapshot.len());
            }
            Err(e) => {
                // Keep the data marked dirty so the next put or flush retries
                self.dirty.store(true, Ordering::SeqCst);
                warn!("Failed to save item cache: {}", e);
            }
        }
    }
}

pub struct RawItemCache {
    state: Arc<CacheState>,
    commands: Mutex<Option<mpsc::UnboundedSender<WriterCommand>>>,
    writer: Mutex<Option<JoinHandle<()>>>,
}

impl RawItemCache {
    /// Load the cache and start its writer task. Must be called inside a Tokio runtime.
    pub fn load(path: impl Into<PathBuf>, debounce: Duration) -> Self {
        let path = path.into();
        let records: HashMap<String, ItemRecord> =
            persist::load_json(&path, "item cache").unwrap_or_default();
        info!("Loaded item cache: {} records from {:?}", records.len(), path);

        let state = Arc::new(CacheState {
            path,
            records: RwLock::new(records),
            dirty: AtomicBool::new(false),
            writes: AtomicUsize::new(0),
        });

        let (tx, rx) = mpsc::unbounded_channel();
        let writer = tokio::spawn(run_writer(state.clone(), rx, debounce));

        Self {
            state,
            commands: Mutex::new(Some(tx)),
            writer: Mutex::new(Some(writer)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.state.path
    }

    pub fn try_get(&self, id: &str) -> Option<ItemRecord> {
        self.state
            .records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    /// Store a record in memory and schedule a debounced write.
    pub fn put(&self, record: ItemRecord) {
        if !record.has_id() {
            return;
        }
        self.state
            .records
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(record.id.clone(), record);
        self.schedule_write();
    }

    pub fn put_all(&self, records: impl IntoIterator<Item = ItemRecord>) {
        let mut inserted = 0;
        {
            let mut map = self.state.records.write().unwrap_or_else(PoisonError::into_inner);
            for record in records.into_iter().filter(ItemRecord::has_id) {
                map.insert(record.id.clone(), record);
                inserted += 1;
            }
        }
        if inserted > 0 {
            self.schedule_write();
        }
    }

    pub fn clear(&self) {
        self.state.records.write().unwrap_or_else(PoisonError::into_inner).clear();
        self.schedule_write();
    }

    pub fn len(&self) -> usize {
        self.state.records.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of snapshots written to disk so far.
    pub fn write_count(&self) -> usize {
        self.state.writes.load(Ordering::SeqCst)
    }

    /// Write any pending changes now and wait for the write to finish.
    pub async fn flush(&self) -> Result<()> {
        let (ack_tx, ack_rx) = oneshot::channel();
        {
            let commands = self.commands.lock().unwrap_or_else(PoisonError::into_inner);
            let sender = commands.as_ref().ok_or(CatalogError::Shutdown)?;
            sender
                .send(WriterCommand::Flush(ack_tx))
                .map_err(|_| CatalogError::Shutdown)?;
        }
        ack_rx.await.map_err(|_| CatalogError::Shutdown)
    }

    /// Stop the writer after a final flush. Later puts stay in memory only.
    pub async fn shutdown(&self) {
        // Dropping the only sender ends the writer loop
        self.commands.lock().unwrap_or_else(PoisonError::into_inner).take();
        let writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner).take();
        if let Some(writer) = writer {
            if let Err(e) = writer.await {
                warn!("Item cache writer ended abnormally: {}", e);
            }
        }
    }

    fn schedule_write(&self) {
        self.state.dirty.store(true, Ordering::SeqCst);
        let commands = self.commands.lock().unwrap_or_else(PoisonError::into_inner);
        match commands.as_ref() {
            Some(sender) => {
                if sender.send(WriterCommand::Schedule).is_err() {
                    debug!("Item cache writer is gone, change kept in memory");
                }
            }
            None => debug!("Item cache is shut down, change kept in memory"),
        }
    }
}

async fn run_writer(
    state: Arc<CacheState>,
    mut commands: mpsc::UnboundedReceiver<WriterCommand>,
    debounce: Duration,
) {
    while let Some(command) = commands.recv().await {
        let mut waiters = Vec::new();
        let mut closed = false;

        match command {
            WriterCommand::Flush(ack) => waiters.push(ack),
            WriterCommand::Schedule => {
                let window = tokio::time::sleep(debounce);
                tokio::pin!(window);
                loop {
                    tokio::select! {
                        _ = &mut window => break,
                        next = commands.recv() => match next {
                            Some(WriterCommand::Schedule) => {}
                            Some(WriterCommand::Flush(ack)) => {
                                waiters.push(ack);
                                break;
                            }
                            None => {
                                closed = true;
                                break;
                            }
                        },
                    }
                }
            }
        }

        state.write_if_dirty().await;
        for ack in waiters {
            let _ = ack.send(());
        }
        if closed {
            break;
        }
    }

    // Final flush on shutdown
    state.write_if_dirty().await;
    debug!("Item cache writer stopped");
}
