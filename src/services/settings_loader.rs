//! Loading game settings from LOOT's `settings.toml`.
//!
//! The settings file holds a `[[games]]` array written by many LOOT versions. Each entry
//! is identified, merged over the game's baseline facts and, for the first entry whose
//! engine matches the requested game, returned as the active [`GameSettings`].
//!
//! A broken entry only costs that entry: it is reported and skipped. The one exception is
//! an entry that sets both `local_path` and `local_folder`, which fails the whole load.

use camino::{Utf8Path, Utf8PathBuf};
use thiserror::Error;
use toml::{Table, Value};

use crate::diagnostics::{DiagnosticSink, Severity};
use crate::models::{GameId, GameSettings};
use crate::services::game_detection::{GameHints, GameResolver, UnrecognizedGameType};
use crate::services::masterlist::MasterlistMigrator;

/// Game type label older versions used for Skyrim SE, which was also its folder name.
const LEGACY_SKYRIM_SE_TYPE: &str = "SkyrimSE";

/// Folder that replaced [`LEGACY_SKYRIM_SE_TYPE`] as Skyrim SE's folder name.
const SKYRIM_SE_FOLDER: &str = "Skyrim Special Edition";

/// Problems with a single `[[games]]` entry. The entry is skipped.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("games array element is not a table")]
    NotATable,

    #[error("'gameId' and 'type' keys both missing from game settings table")]
    MissingGameId,

    #[error("'folder' key missing from game settings table")]
    MissingFolder,

    #[error(transparent)]
    UnrecognizedGameType(#[from] UnrecognizedGameType),
}

/// Errors that abort loading altogether.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SettingsError {
    #[error("Game settings for \"{folder}\" have local_path and local_folder set, use only one.")]
    ConflictingFields { folder: String },

    #[error("invalid game name \"{0}\"")]
    InvalidGameName(String),
}

/// A `[[games]]` entry whose game has been identified.
#[derive(Debug, Clone)]
pub struct StoredGame<'a> {
    pub id: GameId,
    pub folder: String,
    table: &'a Table,
}

impl StoredGame<'_> {
    fn str_field(&self, key: &str) -> Option<&str> {
        str_field(self.table, key)
    }
}

fn str_field<'a>(table: &'a Table, key: &str) -> Option<&'a str> {
    table.get(key).and_then(Value::as_str)
}

fn float_field(table: &Table, key: &str) -> Option<f64> {
    match table.get(key)? {
        Value::Float(value) => Some(*value),
        Value::Integer(value) => Some(*value as f64),
        _ => None,
    }
}

/// The stored local data folder: `local_folder`, else the last component of `local_path`.
fn stored_local_folder(table: &Table) -> Option<String> {
    if let Some(folder) = str_field(table, "local_folder") {
        return Some(folder.to_string());
    }

    str_field(table, "local_path")
        .and_then(|path| Utf8Path::new(path).file_name())
        .map(str::to_string)
}

/// Collect disambiguation hints from a stored entry.
pub fn hints_from_table(table: &Table) -> GameHints {
    let owned = |key: &str| str_field(table, key).map(str::to_string);

    GameHints {
        install_path: owned("path"),
        name: owned("name"),
        master: owned("master"),
        folder: owned("folder"),
        local_folder: stored_local_folder(table),
        is_base_game_instance: table.get("isBaseGameInstance").and_then(Value::as_bool),
    }
}

/// Stored interface language, if any.
pub fn stored_language(table: &Table) -> Option<String> {
    str_field(table, "language").map(str::to_string)
}

/// Builds the active [`GameSettings`] from a parsed settings table.
#[derive(Debug, Clone)]
pub struct SettingsLoader {
    resolver: GameResolver,
    migrator: MasterlistMigrator,
    /// Root that `local_folder` values are relative to.
    app_data_root: Utf8PathBuf,
}

impl SettingsLoader {
    pub fn new(app_data_root: impl Into<Utf8PathBuf>) -> Self {
        Self::with_components(GameResolver::new(), MasterlistMigrator::new(), app_data_root)
    }

    pub fn with_components(
        resolver: GameResolver,
        migrator: MasterlistMigrator,
        app_data_root: impl Into<Utf8PathBuf>,
    ) -> Self {
        Self {
            resolver,
            migrator,
            app_data_root: app_data_root.into(),
        }
    }

    /// Identify the game a `[[games]]` entry describes.
    pub fn identify<'a>(&self, record: &'a Value) -> Result<StoredGame<'a>, RecordError> {
        let table = record.as_table().ok_or(RecordError::NotATable)?;

        let label = str_field(table, "gameId")
            .or_else(|| str_field(table, "type"))
            .ok_or(RecordError::MissingGameId)?;

        let id = self.resolver.resolve(label, &hints_from_table(table))?;

        let mut folder = str_field(table, "folder")
            .ok_or(RecordError::MissingFolder)?
            .to_string();

        if str_field(table, "type") == Some(LEGACY_SKYRIM_SE_TYPE) && folder == LEGACY_SKYRIM_SE_TYPE {
            folder = SKYRIM_SE_FOLDER.to_string();
        }

        Ok(StoredGame { id, folder, table })
    }

    /// Merge a stored entry's overrides over its game's baseline settings.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::ConflictingFields`] if both `local_path` and
    /// `local_folder` are set.
    pub fn build_settings(
        &self,
        stored: &StoredGame<'_>,
        sink: &dyn DiagnosticSink,
    ) -> Result<GameSettings, SettingsError> {
        let mut settings = GameSettings::new(stored.id, stored.folder.clone());

        if let Some(name) = stored.str_field("name") {
            settings.set_name(name);
        }

        if let Some(master) = stored.str_field("master") {
            settings.set_master_file(master);
        }

        if let Some(version) = float_field(stored.table, "minimumHeaderVersion") {
            settings.set_minimum_header_version(version as f32);
        }

        // An explicit source always wins over legacy repository settings.
        if let Some(source) = stored.str_field("masterlistSource") {
            settings.set_masterlist_source(self.migrator.migrate_source(source, sink));
        } else if let (Some(url), Some(branch)) =
            (stored.str_field("repo"), stored.str_field("branch"))
        {
            if let Ok(source) = self.migrator.migrate_repo_settings(stored.id, url, branch, sink) {
                settings.set_masterlist_source(source);
            }
        }

        if let Some(path) = stored.str_field("path") {
            settings.set_game_path(path);
        }

        match (stored.str_field("local_path"), stored.str_field("local_folder")) {
            (Some(_), Some(_)) => {
                return Err(SettingsError::ConflictingFields {
                    folder: stored.folder.clone(),
                });
            }
            (Some(local_path), None) => {
                settings.set_game_local_path(local_path);
            }
            (None, Some(local_folder)) => {
                settings.set_game_local_folder(&self.app_data_root, local_folder);
            }
            (None, None) => {}
        }

        Ok(settings)
    }

    /// Load the settings for `requested` from a parsed `settings.toml`.
    ///
    /// Entries are scanned in file order and the first one whose engine type matches the
    /// requested game's is returned. If none match, the requested game's baseline
    /// settings are returned.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::ConflictingFields`] if the matching entry sets both
    /// `local_path` and `local_folder`.
    pub fn load(
        &self,
        table: &Table,
        requested: GameId,
        sink: &dyn DiagnosticSink,
    ) -> Result<GameSettings, SettingsError> {
        let engine = requested.engine_type();

        let Some(games) = table.get("games").and_then(Value::as_array) else {
            tracing::debug!("No games array in settings, using defaults for {}", requested);
            return Ok(GameSettings::baseline(requested));
        };

        for (index, record) in games.iter().enumerate() {
            let stored = match self.identify(record) {
                Ok(stored) => stored,
                Err(e) => {
                    sink.emit(
                        Severity::Warning,
                        &format!("Skipping game settings entry {}: {}", index, e),
                    );
                    continue;
                }
            };

            if stored.id.engine_type() != engine {
                continue;
            }

            let settings = self.build_settings(&stored, sink)?;
            tracing::info!(
                "Using stored settings for {} from folder {}",
                settings.id(),
                settings.folder_name
            );
            return Ok(settings);
        }

        tracing::debug!("No stored settings match {}, using defaults", requested);
        Ok(GameSettings::baseline(requested))
    }
}
