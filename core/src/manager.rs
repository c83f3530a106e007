use crate::geometry::{
    clamp_to_screen, ScreenBounds, COLLAPSED_HEIGHT, MAX_NORMALIZED_HEIGHT, MAX_NORMALIZED_WIDTH,
};
use crate::models::{NoteId, NoteItem, NoteRecord, DEFAULT_HEIGHT, DEFAULT_X, DEFAULT_Y};
use crate::storage::NoteStore;
use log::warn;
use std::collections::HashMap;

/// Offset applied per existing note when placing a new one, so freshly
/// created notes do not stack exactly on top of each other.
pub const STAGGER_STEP: f64 = 30.0;

/// The seam to the windowing layer.
///
/// The core never touches a toolkit directly; it issues requests through
/// this trait and receives opaque handles back. Handles live in the
/// manager's registry and are only borrowed out, except on close, which
/// consumes the handle.
pub trait WindowHost {
    type Handle;

    /// Union of all monitors' visible area.
    fn virtual_screen(&self) -> ScreenBounds;

    /// Create and display a window for the given note.
    fn create_window(&mut self, note: &NoteRecord) -> Self::Handle;

    fn show_window(&mut self, window: &Self::Handle);
    fn hide_window(&mut self, window: &Self::Handle);
    fn focus_window(&mut self, window: &Self::Handle);
    fn close_window(&mut self, window: Self::Handle);

    /// Move/resize the displayed window to match stored geometry.
    fn set_window_geometry(&mut self, window: &Self::Handle, x: f64, y: f64, width: f64, height: f64);

    /// Bring a window back from a maximized or otherwise unusual state.
    fn restore_window(&mut self, window: &Self::Handle);
}

/// Read-only entry for building the tray menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrayNote {
    pub id: NoteId,
    pub title: String,
    pub visible: bool,
}

/// Owner of the note collection and of the note-id to window registry.
///
/// The manager is the sole mutator of note records; the window layer
/// requests mutations through it and never writes records directly. All
/// methods must be called from the UI/event thread — background contexts
/// marshal onto it first. Every mutating operation ends with a persistence
/// request; a failed save is logged and the in-memory state stays
/// authoritative for the rest of the session.
pub struct NoteManager<H: WindowHost> {
    notes: Vec<NoteRecord>,
    windows: HashMap<NoteId, H::Handle>,
    store: NoteStore,
    host: H,
}

impl<H: WindowHost> NoteManager<H> {
    pub fn new(store: NoteStore, host: H) -> Self {
        Self {
            notes: Vec::new(),
            windows: HashMap::new(),
            store,
            host,
        }
    }

    /// Load persisted notes, open windows for the visible ones, and make
    /// sure the collection is never empty on a fresh start.
    pub fn initialize(&mut self) {
        self.notes = self.store.load();

        for index in 0..self.notes.len() {
            if self.notes[index].visible {
                self.open_window(index);
            }
        }

        if self.notes.is_empty() {
            self.create_note();
        }
    }

    /// Create a new note staggered away from the default position, persist
    /// it, and open its window. Returns a snapshot of the new record.
    pub fn create_note(&mut self) -> NoteRecord {
        let step = STAGGER_STEP * self.notes.len() as f64;
        let mut note = NoteRecord::at(DEFAULT_X + step, DEFAULT_Y + step);
        clamp_to_screen(&mut note, self.host.virtual_screen());

        self.notes.push(note);
        self.persist();

        let index = self.notes.len() - 1;
        self.open_window(index);
        self.notes[index].clone()
    }

    /// Delete a note, closing its window and dropping its registry entry.
    /// Unknown ids are ignored.
    pub fn delete_note(&mut self, id: NoteId) {
        let Some(index) = self.notes.iter().position(|n| n.id == id) else {
            return;
        };

        if let Some(handle) = self.windows.remove(&id) {
            self.host.close_window(handle);
        }

        self.notes.remove(index);
        self.persist();
    }

    /// Hide a note's window without closing it, so its state is retained
    /// for a fast re-show.
    pub fn hide_note(&mut self, id: NoteId) {
        let Some(note) = self.notes.iter_mut().find(|n| n.id == id) else {
            return;
        };
        note.visible = false;

        if let Some(handle) = self.windows.get(&id) {
            self.host.hide_window(handle);
        }

        self.persist();
    }

    /// Make a single note visible, raising its existing window or creating
    /// one if it was never opened.
    pub fn show_note(&mut self, id: NoteId) {
        let Some(index) = self.notes.iter().position(|n| n.id == id) else {
            return;
        };
        self.notes[index].visible = true;
        self.raise_or_open(index);
        self.persist();
    }

    /// Make every note visible. Persists once after the full pass.
    pub fn show_all_notes(&mut self) {
        for index in 0..self.notes.len() {
            self.notes[index].visible = true;
            self.raise_or_open(index);
        }
        self.persist();
    }

    /// Re-clamp every note against current screen bounds and push the
    /// corrected geometry to any open window. Persists once at the end.
    pub fn bring_all_on_screen(&mut self) {
        let bounds = self.host.virtual_screen();

        for index in 0..self.notes.len() {
            clamp_to_screen(&mut self.notes[index], bounds);

            let note = &self.notes[index];
            let (id, x, y, width, height) = (note.id, note.x, note.y, note.width, note.height);
            if let Some(handle) = self.windows.get(&id) {
                self.host.set_window_geometry(handle, x, y, width, height);
                self.host.show_window(handle);
                self.host.focus_window(handle);
            }
        }

        self.persist();
    }

    /// Cap every note to a sane size. Never grows a note; open windows are
    /// restored from maximized state and resized to match.
    pub fn normalize_all_notes(&mut self) {
        for index in 0..self.notes.len() {
            let note = &mut self.notes[index];
            note.width = note.width.min(MAX_NORMALIZED_WIDTH);
            note.height = note.height.min(MAX_NORMALIZED_HEIGHT);

            let (id, x, y, width, height) = (note.id, note.x, note.y, note.width, note.height);
            if let Some(handle) = self.windows.get(&id) {
                self.host.restore_window(handle);
                self.host.set_window_geometry(handle, x, y, width, height);
            }
        }

        self.persist();
    }

    /// Record a user-driven move/resize reported by the window layer.
    ///
    /// Stored verbatim: live manipulation is trusted and not clamped.
    pub fn update_geometry(&mut self, id: NoteId, x: f64, y: f64, width: f64, height: f64) {
        let Some(note) = self.notes.iter_mut().find(|n| n.id == id) else {
            return;
        };
        note.x = x;
        note.y = y;
        note.width = width;
        note.height = height;
        self.persist();
    }

    /// Collapse a note to its title bar, or expand it back.
    ///
    /// Collapsing records the current height in `expanded_height`;
    /// expanding restores it, falling back to the default height when the
    /// remembered value is not usable.
    pub fn set_collapsed(&mut self, id: NoteId, collapsed: bool) {
        let Some(note) = self.notes.iter_mut().find(|n| n.id == id) else {
            return;
        };
        if note.collapsed == collapsed {
            return;
        }

        if collapsed {
            note.expanded_height = note.height;
        } else {
            note.height = if note.expanded_height > COLLAPSED_HEIGHT {
                note.expanded_height
            } else {
                DEFAULT_HEIGHT
            };
        }
        note.collapsed = collapsed;

        let (x, y, width) = (note.x, note.y, note.width);
        let display_height = if collapsed { COLLAPSED_HEIGHT } else { note.height };
        if let Some(handle) = self.windows.get(&id) {
            self.host.set_window_geometry(handle, x, y, width, display_height);
        }

        self.persist();
    }

    /// Rename a note.
    pub fn set_title(&mut self, id: NoteId, title: impl Into<String>) {
        let Some(note) = self.notes.iter_mut().find(|n| n.id == id) else {
            return;
        };
        note.title = title.into();
        self.persist();
    }

    /// Replace a note's checklist items.
    pub fn set_items(&mut self, id: NoteId, items: Vec<NoteItem>) {
        let Some(note) = self.notes.iter_mut().find(|n| n.id == id) else {
            return;
        };
        note.items = items;
        self.persist();
    }

    /// Snapshot for the tray menu, in collection order.
    pub fn list_for_tray(&self) -> Vec<TrayNote> {
        self.notes
            .iter()
            .map(|note| TrayNote {
                id: note.id,
                title: note.title.clone(),
                visible: note.visible,
            })
            .collect()
    }

    pub fn notes(&self) -> &[NoteRecord] {
        &self.notes
    }

    pub fn note(&self, id: NoteId) -> Option<&NoteRecord> {
        self.notes.iter().find(|n| n.id == id)
    }

    /// Whether a window is currently allocated for the note (hidden or not).
    pub fn has_window(&self, id: NoteId) -> bool {
        self.windows.contains_key(&id)
    }

    fn raise_or_open(&mut self, index: usize) {
        let id = self.notes[index].id;
        if let Some(handle) = self.windows.get(&id) {
            self.host.show_window(handle);
            self.host.focus_window(handle);
        } else {
            self.open_window(index);
        }
    }

    fn open_window(&mut self, index: usize) {
        let bounds = self.host.virtual_screen();
        clamp_to_screen(&mut self.notes[index], bounds);

        let handle = self.host.create_window(&self.notes[index]);
        let id = self.notes[index].id;
        self.windows.insert(id, handle);
    }

    fn persist(&self) {
        if let Err(err) = self.store.save(&self.notes) {
            warn!("failed to persist notes: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[derive(Debug, PartialEq)]
    enum HostCall {
        Create(NoteId),
        Show(u32),
        Hide(u32),
        Focus(u32),
        Close(u32),
        SetGeometry(u32, f64, f64, f64, f64),
        Restore(u32),
    }

    struct TestHost {
        bounds: ScreenBounds,
        calls: Vec<HostCall>,
        next_handle: u32,
    }

    impl TestHost {
        fn new() -> Self {
            Self {
                bounds: ScreenBounds::new(0.0, 0.0, 1920.0, 1080.0),
                calls: Vec::new(),
                next_handle: 0,
            }
        }
    }

    impl WindowHost for TestHost {
        type Handle = u32;

        fn virtual_screen(&self) -> ScreenBounds {
            self.bounds
        }

        fn create_window(&mut self, note: &NoteRecord) -> u32 {
            self.calls.push(HostCall::Create(note.id));
            self.next_handle += 1;
            self.next_handle
        }

        fn show_window(&mut self, window: &u32) {
            self.calls.push(HostCall::Show(*window));
        }

        fn hide_window(&mut self, window: &u32) {
            self.calls.push(HostCall::Hide(*window));
        }

        fn focus_window(&mut self, window: &u32) {
            self.calls.push(HostCall::Focus(*window));
        }

        fn close_window(&mut self, window: u32) {
            self.calls.push(HostCall::Close(window));
        }

        fn set_window_geometry(&mut self, window: &u32, x: f64, y: f64, width: f64, height: f64) {
            self.calls
                .push(HostCall::SetGeometry(*window, x, y, width, height));
        }

        fn restore_window(&mut self, window: &u32) {
            self.calls.push(HostCall::Restore(*window));
        }
    }

    fn manager_in(dir: &std::path::Path) -> NoteManager<TestHost> {
        NoteManager::new(NoteStore::new(dir), TestHost::new())
    }

    #[test]
    fn test_empty_start_creates_one_note() {
        let dir = tempdir().unwrap();
        let mut mgr = manager_in(dir.path());
        mgr.initialize();

        assert_eq!(mgr.notes().len(), 1);
        assert!(mgr.has_window(mgr.notes()[0].id));

        // The default note survives a restart.
        let mut second = manager_in(dir.path());
        second.initialize();
        assert_eq!(second.notes().len(), 1);
        assert_eq!(second.notes()[0].id, mgr.notes()[0].id);
    }

    #[test]
    fn test_initialize_opens_only_visible_notes() {
        let dir = tempdir().unwrap();
        let mut mgr = manager_in(dir.path());
        mgr.initialize();
        let shown = mgr.create_note().id;
        let hidden = mgr.create_note().id;
        mgr.hide_note(hidden);

        let mut restarted = manager_in(dir.path());
        restarted.initialize();
        assert_eq!(restarted.notes().len(), 3);
        assert!(restarted.has_window(shown));
        assert!(!restarted.has_window(hidden));
    }

    #[test]
    fn test_create_note_staggers_position() {
        let dir = tempdir().unwrap();
        let mut mgr = manager_in(dir.path());

        let a = mgr.create_note();
        let b = mgr.create_note();
        let c = mgr.create_note();
        assert_eq!((a.x, a.y), (200.0, 200.0));
        assert_eq!((b.x, b.y), (230.0, 230.0));
        assert_eq!((c.x, c.y), (260.0, 260.0));
    }

    #[test]
    fn test_delete_note_is_idempotent() {
        let dir = tempdir().unwrap();
        let mut mgr = manager_in(dir.path());
        let id = mgr.create_note().id;
        let keep = mgr.create_note().id;

        mgr.delete_note(id);
        assert_eq!(mgr.notes().len(), 1);
        assert!(!mgr.has_window(id));
        let closes = mgr
            .host
            .calls
            .iter()
            .filter(|c| matches!(c, HostCall::Close(_)))
            .count();

        mgr.delete_note(id);
        assert_eq!(mgr.notes().len(), 1);
        assert_eq!(mgr.notes()[0].id, keep);
        let closes_after = mgr
            .host
            .calls
            .iter()
            .filter(|c| matches!(c, HostCall::Close(_)))
            .count();
        assert_eq!(closes, closes_after);
    }

    #[test]
    fn test_hide_keeps_window_allocated() {
        let dir = tempdir().unwrap();
        let mut mgr = manager_in(dir.path());
        let id = mgr.create_note().id;

        mgr.hide_note(id);
        assert!(!mgr.note(id).unwrap().visible);
        assert!(mgr.has_window(id));
        assert!(mgr.host.calls.contains(&HostCall::Hide(1)));
    }

    #[test]
    fn test_show_all_raises_or_opens() {
        let dir = tempdir().unwrap();
        let mut mgr = manager_in(dir.path());
        let hidden = mgr.create_note().id;
        mgr.hide_note(hidden);

        // A note persisted as invisible never got a window.
        let mut restarted = manager_in(dir.path());
        restarted.initialize();
        assert!(!restarted.has_window(hidden));

        restarted.show_all_notes();
        assert!(restarted.has_window(hidden));
        assert!(restarted.notes().iter().all(|n| n.visible));
    }

    #[test]
    fn test_show_note_focuses_existing_window() {
        let dir = tempdir().unwrap();
        let mut mgr = manager_in(dir.path());
        let id = mgr.create_note().id;
        mgr.hide_note(id);

        mgr.show_note(id);
        assert!(mgr.note(id).unwrap().visible);
        assert!(mgr.host.calls.contains(&HostCall::Show(1)));
        assert!(mgr.host.calls.contains(&HostCall::Focus(1)));
    }

    #[test]
    fn test_bring_all_on_screen_clamps_and_syncs() {
        let dir = tempdir().unwrap();
        let mut mgr = manager_in(dir.path());
        let id = mgr.create_note().id;
        mgr.update_geometry(id, 99999.0, -500.0, 250.0, 200.0);

        mgr.bring_all_on_screen();
        let note = mgr.note(id).unwrap();
        assert_eq!(note.x, 1920.0 - 40.0);
        assert_eq!(note.y, 0.0);
        assert!(mgr
            .host
            .calls
            .contains(&HostCall::SetGeometry(1, 1880.0, 0.0, 250.0, 200.0)));
    }

    #[test]
    fn test_normalize_caps_but_never_grows() {
        let dir = tempdir().unwrap();
        let mut mgr = manager_in(dir.path());
        let small = mgr.create_note().id;
        let big = mgr.create_note().id;
        mgr.update_geometry(small, 200.0, 200.0, 200.0, 100.0);
        mgr.update_geometry(big, 300.0, 300.0, 900.0, 800.0);

        mgr.normalize_all_notes();
        let small = mgr.note(small).unwrap();
        let big = mgr.note(big).unwrap();
        assert_eq!((small.width, small.height), (200.0, 100.0));
        assert_eq!((big.width, big.height), (400.0, 300.0));
        assert!(mgr.host.calls.contains(&HostCall::Restore(2)));
    }

    #[test]
    fn test_update_geometry_is_verbatim() {
        let dir = tempdir().unwrap();
        let mut mgr = manager_in(dir.path());
        let id = mgr.create_note().id;

        mgr.update_geometry(id, -9000.0, 12345.0, 30.0, 5.0);
        let note = mgr.note(id).unwrap();
        assert_eq!((note.x, note.y), (-9000.0, 12345.0));
        assert_eq!((note.width, note.height), (30.0, 5.0));
    }

    #[test]
    fn test_geometry_survives_restart() {
        let dir = tempdir().unwrap();
        let mut mgr = manager_in(dir.path());
        let id = mgr.create_note().id;
        mgr.update_geometry(id, 640.0, 480.0, 300.0, 250.0);

        let mut restarted = manager_in(dir.path());
        restarted.initialize();
        let note = restarted.note(id).unwrap();
        assert_eq!((note.x, note.y, note.width, note.height), (640.0, 480.0, 300.0, 250.0));
    }

    #[test]
    fn test_collapse_and_expand_restore_height() {
        let dir = tempdir().unwrap();
        let mut mgr = manager_in(dir.path());
        let id = mgr.create_note().id;
        mgr.update_geometry(id, 200.0, 200.0, 250.0, 333.0);

        mgr.set_collapsed(id, true);
        let note = mgr.note(id).unwrap();
        assert!(note.collapsed);
        assert_eq!(note.expanded_height, 333.0);
        assert!(mgr
            .host
            .calls
            .contains(&HostCall::SetGeometry(1, 200.0, 200.0, 250.0, COLLAPSED_HEIGHT)));

        mgr.set_collapsed(id, false);
        let note = mgr.note(id).unwrap();
        assert!(!note.collapsed);
        assert_eq!(note.height, 333.0);
    }

    #[test]
    fn test_expand_with_unusable_height_uses_default() {
        let dir = tempdir().unwrap();
        let mut mgr = manager_in(dir.path());
        let id = mgr.create_note().id;
        mgr.update_geometry(id, 200.0, 200.0, 250.0, 10.0);

        mgr.set_collapsed(id, true);
        mgr.set_collapsed(id, false);
        assert_eq!(mgr.note(id).unwrap().height, DEFAULT_HEIGHT);
    }

    #[test]
    fn test_list_for_tray_matches_collection_order() {
        let dir = tempdir().unwrap();
        let mut mgr = manager_in(dir.path());
        let a = mgr.create_note().id;
        let b = mgr.create_note().id;
        mgr.set_title(b, "Second");
        mgr.hide_note(b);

        let tray = mgr.list_for_tray();
        assert_eq!(tray.len(), 2);
        assert_eq!(tray[0].id, a);
        assert_eq!(tray[1].id, b);
        assert_eq!(tray[1].title, "Second");
        assert!(!tray[1].visible);
    }

    #[test]
    fn test_set_items_replaces_checklist() {
        let dir = tempdir().unwrap();
        let mut mgr = manager_in(dir.path());
        let id = mgr.create_note().id;

        mgr.set_items(
            id,
            vec![
                NoteItem::new("wash"),
                NoteItem {
                    text: "dry".to_string(),
                    checked: true,
                },
            ],
        );

        let mut restarted = manager_in(dir.path());
        restarted.initialize();
        let items = &restarted.note(id).unwrap().items;
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].text, "wash");
        assert!(items[1].checked);
    }

    #[test]
    fn test_unknown_id_mutations_are_noops() {
        let dir = tempdir().unwrap();
        let mut mgr = manager_in(dir.path());
        mgr.create_note();
        let ghost = NoteId::new_v4();

        mgr.delete_note(ghost);
        mgr.hide_note(ghost);
        mgr.show_note(ghost);
        mgr.update_geometry(ghost, 1.0, 2.0, 3.0, 4.0);
        mgr.set_collapsed(ghost, true);
        assert_eq!(mgr.notes().len(), 1);
    }
}
