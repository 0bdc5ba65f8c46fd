// lootcli-settings - Legacy LOOT settings migration for lootcli
//
// This library resolves which game a stored LOOT settings entry describes, rebuilds the
// game's settings from fixed facts and stored overrides, and turns legacy masterlist
// repository settings into a single source the downloader can fetch.

pub mod config;
pub mod diagnostics;
pub mod logging;
pub mod models;
pub mod services;
pub mod session;

// Re-export commonly used types for convenience
pub use config::ConfigManager;
pub use diagnostics::{DiagnosticSink, NullSink, Severity, TracingSink};
pub use models::{EngineType, GameId, GameSettings, IdentityFacts};
pub use services::{GameResolver, MasterlistMigrator, SettingsError, SettingsLoader};
pub use session::{LootSession, MasterlistRequest, PreparedRun};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
