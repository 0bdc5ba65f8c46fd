//! One lootcli run's settings, from the requested game to a masterlist request.
//!
//! A [`LootSession`] is configured with the game lootcli was invoked for and then
//! [`prepare`](LootSession::prepare)d once. The returned [`PreparedRun`] is the explicit
//! context later stages receive: the active [`GameSettings`], the interface language, and
//! what the external downloader should fetch where.

use anyhow::Result;
use camino::Utf8PathBuf;

use crate::config::ConfigManager;
use crate::diagnostics::{DiagnosticSink, TracingSink};
use crate::models::{GameId, GameSettings};
use crate::services::settings_loader::{SettingsError, SettingsLoader, stored_language};

/// Language used when neither the caller nor the settings file choose one.
pub const DEFAULT_LANGUAGE: &str = "en";

/// What the external downloader should fetch and where it should write it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MasterlistRequest {
    /// Local file path or URL.
    pub source: String,
    pub destination: Utf8PathBuf,
}

/// Settings resolved for one run.
#[derive(Debug, Clone)]
pub struct PreparedRun {
    pub game: GameSettings,
    pub language: String,
    pub game_folder: Utf8PathBuf,
    pub userlist: Option<Utf8PathBuf>,
    pub masterlist: MasterlistRequest,
}

pub struct LootSession {
    game: GameId,
    game_path: Option<Utf8PathBuf>,
    language: Option<String>,
    config: ConfigManager,
    sink: Box<dyn DiagnosticSink>,
}

impl LootSession {
    /// Session for `game`, reporting diagnostics through `tracing`.
    pub fn new(config: ConfigManager, game: GameId) -> Self {
        Self {
            game,
            game_path: None,
            language: None,
            config,
            sink: Box::new(TracingSink),
        }
    }

    /// Session for the game lootcli was invoked with, e.g. `skyrimse`.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::InvalidGameName`] if `name` isn't a supported game.
    pub fn for_game_name(config: ConfigManager, name: &str) -> Result<Self, SettingsError> {
        let game =
            GameId::from_cli_name(name).ok_or_else(|| SettingsError::InvalidGameName(name.to_string()))?;
        Ok(Self::new(config, game))
    }

    pub fn with_sink(mut self, sink: impl DiagnosticSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    /// Install path that overrides whatever the settings file stores.
    pub fn with_game_path(mut self, path: impl Into<Utf8PathBuf>) -> Self {
        self.game_path = Some(path.into());
        self
    }

    /// Language that overrides whatever the settings file stores.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn game(&self) -> GameId {
        self.game
    }

    pub fn config(&self) -> &ConfigManager {
        &self.config
    }

    /// Load the stored settings without touching the filesystem beyond reading them.
    ///
    /// # Returns
    /// The active settings and the resolved language
    pub fn load_settings(&self) -> Result<(GameSettings, String)> {
        let loader = SettingsLoader::new(self.config.app_data_root());

        let (mut game, stored_language) = match self.config.load_settings_table()? {
            Some(table) => (
                loader.load(&table, self.game, self.sink.as_ref())?,
                stored_language(&table),
            ),
            None => (GameSettings::baseline(self.game), None),
        };

        if let Some(path) = &self.game_path {
            game.set_game_path(path.clone());
        }

        let language = self
            .language
            .clone()
            .or(stored_language)
            .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());

        Ok((game, language))
    }

    /// Resolve the settings for this run and set up the game's LOOT folder.
    pub fn prepare(&self) -> Result<PreparedRun> {
        let (game, language) = self.load_settings()?;

        tracing::info!(
            "Preparing {} ({}), data path {}",
            game.name,
            game.id(),
            game.data_path()
        );

        let game_folder = self.config.prepare_game_folder(&game)?;

        let userlist = self.config.userlist_path(&game);
        let userlist = userlist.is_file().then_some(userlist);

        let masterlist = MasterlistRequest {
            source: game.masterlist_source.clone(),
            destination: self.config.masterlist_path(&game),
        };

        tracing::info!(
            "Masterlist will be fetched from {} to {}",
            masterlist.source,
            masterlist.destination
        );

        Ok(PreparedRun {
            game,
            language,
            game_folder,
            userlist,
            masterlist,
        })
    }
}
