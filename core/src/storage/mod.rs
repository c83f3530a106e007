mod store;

pub use store::{NoteStore, MAX_BACKUPS};
