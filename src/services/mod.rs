//! Services module - Pure logic for resolving and migrating stored LOOT settings.
//!
//! The services take a parsed settings table and produce one active
//! [`GameSettings`](crate::models::GameSettings) record plus a canonical masterlist source.
//! They never download anything and have no dependency on how lootcli is invoked.
//!
//! # Components
//!
//! - [`GameResolver`]: Turns a stored game type label into a concrete [`GameId`](crate::models::GameId).
//!   Labels shared with a total conversion (Nehrim, Enderal, Enderal SE) are disambiguated by
//!   looking for the total conversion's launcher, or failing that, by independent heuristics.
//!
//! - [`MasterlistMigrator`]: Rewrites legacy repository URL and branch settings, or an old
//!   masterlist source, into a local masterlist path or a raw GitHub URL.
//!
//! - [`SettingsLoader`]: Scans the `[[games]]` array, skipping broken entries, and builds the
//!   settings for the first entry whose engine matches the requested game.
//!
//! # Usage Example
//!
//! ```ignore
//! use lootcli_settings::services::SettingsLoader;
//! use lootcli_settings::diagnostics::TracingSink;
//!
//! let loader = SettingsLoader::new(app_data_root);
//! let settings = loader.load(&table, GameId::Tes5se, &TracingSink)?;
//! println!("masterlist: {}", settings.masterlist_source);
//! ```

pub mod game_detection;
pub mod masterlist;
pub mod settings_loader;

pub use game_detection::{GameHints, GameResolver, UnrecognizedGameType, is_variant};
pub use masterlist::{MasterlistMigrator, UnmigratableSource};
pub use settings_loader::{RecordError, SettingsError, SettingsLoader, StoredGame};
