pub mod history;
pub mod item;

pub use history::HistoryRecord;
pub use item::{ItemRecord, ItemType};
