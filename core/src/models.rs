mod note;

pub use note::{NoteItem, NoteRecord, DEFAULT_HEIGHT, DEFAULT_WIDTH, DEFAULT_X, DEFAULT_Y};

pub use uuid::Uuid as NoteId;
