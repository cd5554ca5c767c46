//! Walk through one editor session: load rules, edit values, persist them.
//!
//! Run with `RUST_LOG=debug` to see what the stores log.

use std::sync::Arc;

use carpet_stores::{AppState, ColorScheme, FileStorage, Settings};
use tracing_subscriber::EnvFilter;

const CATALOG: &str = r#"[
    {
        "id": "commandLog", "name": "commandLog", "type": "String", "value": "ops",
        "categories": ["command", "creative"], "options": ["true", "false", "ops"],
        "config_files": ["carpet.conf"], "minecraft_versions": ["1.20", "1.19"],
        "mod_name": "Carpet", "mod_slug": "carpet", "mod_url": ""
    },
    {
        "id": "fastRedstoneDust", "name": "fastRedstoneDust", "type": "boolean", "value": "false",
        "categories": ["optimization", "feature"], "options": ["true", "false"],
        "config_files": ["carpet.conf"], "minecraft_versions": ["1.20"],
        "repo": "gnembon/fabric-carpet", "branches": ["master"]
    }
]"#;

fn main() -> carpet_stores::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Editor session ===\n");

    let storage_path = std::env::temp_dir().join("carpet-stores-demo.json");
    let settings = Settings {
        autosave: true,
        ..Settings::default()
    };
    let state = AppState::bootstrap(Arc::new(FileStorage::new(&storage_path)), settings);

    // Notifications
    state.snackbar().register(|message, _actions| {
        println!("   [snackbar] {message}");
    });

    // Theme
    let _theme = state.theme().dark_theme().subscribe(|dark| {
        println!("   [theme] dark = {dark}");
    });
    state.theme().set_system_preference(true);
    state.theme().set_scheme(ColorScheme::Light);

    // Rules
    println!("\n1. Loading rules");
    let count = state.rules().load_json(CATALOG)?;
    state.snackbar().show(&format!("Loaded {count} rules"));
    println!("   categories: {:?}", state.rules().categories().get());
    println!("   mods:       {:?}", state.rules().mods().get());
    println!("   versions:   {:?}", state.rules().mc_versions().get());

    // Config edits
    println!("\n2. Editing {}", state.config().selected_file().get());
    let _current = state.config().current().subscribe(|settings| {
        println!("   [current] {settings:?}");
    });
    state.config().set_current_value("commandLog", "true");
    state.config().set_current_value("fastRedstoneDust", "true");

    let orphans = state.rules().orphaned_settings(&state.config().config().get());
    if !orphans.is_empty() {
        println!("   settings without a rule: {orphans:?}");
    }

    println!("\n3. Saved to {}", storage_path.display());
    Ok(())
}
