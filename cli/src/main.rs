use anyhow::{anyhow, Context, Result};
use stickies_core::{NoteManager, NoteRecord, NoteStore, ScreenBounds, WindowHost};
use std::env;
use std::fs;
use std::path::PathBuf;

/// Window host for headless maintenance runs: windows are never created,
/// every request is a no-op against a nominal single-monitor desktop.
struct HeadlessHost;

impl WindowHost for HeadlessHost {
    type Handle = ();

    fn virtual_screen(&self) -> ScreenBounds {
        ScreenBounds::new(0.0, 0.0, 1920.0, 1080.0)
    }

    fn create_window(&mut self, _note: &NoteRecord) -> Self::Handle {}
    fn show_window(&mut self, _window: &Self::Handle) {}
    fn hide_window(&mut self, _window: &Self::Handle) {}
    fn focus_window(&mut self, _window: &Self::Handle) {}
    fn close_window(&mut self, _window: Self::Handle) {}
    fn set_window_geometry(
        &mut self,
        _window: &Self::Handle,
        _x: f64,
        _y: f64,
        _width: f64,
        _height: f64,
    ) {
    }
    fn restore_window(&mut self, _window: &Self::Handle) {}
}

fn data_dir() -> Result<PathBuf> {
    Ok(dirs::data_dir()
        .context("could not resolve the user data directory")?
        .join("Stickies"))
}

fn main() -> Result<()> {
    flexi_logger::Logger::try_with_env_or_str("warn")?
        .start()
        .context("failed to start logger")?;

    let args: Vec<String> = env::args().skip(1).collect();
    let dir = data_dir()?;
    let store = NoteStore::new(&dir);

    match args.first().map(String::as_str) {
        Some("list") => list(&store),
        Some("add") => add(store, args.get(1).cloned()),
        Some("path") => {
            println!("{}", dir.display());
            Ok(())
        }
        Some("check") => check(&store),
        _ => {
            eprintln!("usage: stickies <list | add [title] | path | check>");
            Err(anyhow!("unknown command"))
        }
    }
}

fn list(store: &NoteStore) -> Result<()> {
    let notes = store.load();
    if notes.is_empty() {
        println!("no notes");
        return Ok(());
    }

    for note in &notes {
        let marker = if note.visible { "*" } else { " " };
        let done = note.items.iter().filter(|i| i.checked).count();
        println!(
            "{marker} {}  {}  ({done}/{} items)",
            note.id,
            note.title,
            note.items.len()
        );
    }
    Ok(())
}

fn add(store: NoteStore, title: Option<String>) -> Result<()> {
    let mut manager = NoteManager::new(store, HeadlessHost);
    manager.initialize();

    let note = manager.create_note();
    let title = title.unwrap_or(note.title);
    manager.set_title(note.id, title.clone());

    println!("created {}  {title}", note.id);
    Ok(())
}

fn check(store: &NoteStore) -> Result<()> {
    let notes = store.load();
    let backups = fs::read_dir(store.backup_dir())
        .map(|entries| entries.filter_map(|e| e.ok()).count())
        .unwrap_or(0);

    println!("notes file: {}", store.notes_path().display());
    println!("notes:      {}", notes.len());
    println!("backups:    {backups}");
    Ok(())
}
