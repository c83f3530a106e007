pub mod error;
pub mod geometry;
pub mod manager;
pub mod models;
pub mod storage;

pub use error::{Error, Result};
pub use geometry::ScreenBounds;
pub use manager::{NoteManager, TrayNote, WindowHost};
pub use models::{NoteId, NoteItem, NoteRecord};
pub use storage::NoteStore;
