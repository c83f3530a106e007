// Example: Basic usage of the stickies-core library
use std::fs;

use stickies_core::{NoteItem, NoteManager, NoteRecord, NoteStore, ScreenBounds, WindowHost};

/// Stand-in for a real windowing layer: prints what it is asked to do.
struct ConsoleHost {
    next_handle: u32,
}

impl WindowHost for ConsoleHost {
    type Handle = u32;

    fn virtual_screen(&self) -> ScreenBounds {
        ScreenBounds::new(0.0, 0.0, 1920.0, 1080.0)
    }

    fn create_window(&mut self, note: &NoteRecord) -> u32 {
        self.next_handle += 1;
        println!("   [host] create window #{} for '{}'", self.next_handle, note.title);
        self.next_handle
    }

    fn show_window(&mut self, window: &u32) {
        println!("   [host] show window #{window}");
    }

    fn hide_window(&mut self, window: &u32) {
        println!("   [host] hide window #{window}");
    }

    fn focus_window(&mut self, window: &u32) {
        println!("   [host] focus window #{window}");
    }

    fn close_window(&mut self, window: u32) {
        println!("   [host] close window #{window}");
    }

    fn set_window_geometry(&mut self, window: &u32, x: f64, y: f64, width: f64, height: f64) {
        println!("   [host] window #{window} -> ({x}, {y}) {width}x{height}");
    }

    fn restore_window(&mut self, window: &u32) {
        println!("   [host] restore window #{window}");
    }
}

fn main() {
    let data_dir = std::env::temp_dir().join("stickies_basic_usage");
    fs::remove_dir_all(&data_dir).ok(); // Clean up previous run

    println!("--- Basic Usage of stickies-core ---");

    // ========== First launch ==========
    println!("\n1. First launch (empty data dir)...");
    let mut manager = NoteManager::new(NoteStore::new(&data_dir), ConsoleHost { next_handle: 0 });
    manager.initialize();
    println!("   ✓ {} note(s) after initialize", manager.notes().len());

    // ========== Create and edit notes ==========
    println!("\n2. Creating notes...");
    let groceries = manager.create_note();
    manager.set_title(groceries.id, "Groceries");
    manager.set_items(
        groceries.id,
        vec![
            NoteItem::new("milk"),
            NoteItem::new("eggs"),
            NoteItem {
                text: "bread".to_string(),
                checked: true,
            },
        ],
    );
    println!("   ✓ created staggered note at ({}, {})", groceries.x, groceries.y);

    // ========== Geometry ==========
    println!("\n3. Dragging a note off-screen, then bringing it back...");
    manager.update_geometry(groceries.id, 5000.0, -200.0, 250.0, 200.0);
    manager.bring_all_on_screen();

    // ========== Tray menu ==========
    println!("\n4. Tray snapshot:");
    for entry in manager.list_for_tray() {
        let marker = if entry.visible { "shown" } else { "hidden" };
        println!("   - {} ({marker})", entry.title);
    }

    // ========== Restart ==========
    println!("\n5. Simulated restart...");
    drop(manager);
    let mut manager = NoteManager::new(NoteStore::new(&data_dir), ConsoleHost { next_handle: 0 });
    manager.initialize();
    println!("   ✓ {} note(s) reloaded from disk", manager.notes().len());

    fs::remove_dir_all(&data_dir).ok();
}
