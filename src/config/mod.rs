use crate::models::{GameId, GameSettings, MASTERLIST_FILENAME};
use anyhow::{Context, Result, bail};
use camino::{Utf8Path, Utf8PathBuf};
use directories::BaseDirs;
use std::fs;
use toml::Table;

/// Locates LOOT's data folder and reads the settings stored in it.
///
/// Layout, relative to the local application data root:
/// - `LOOT/settings.toml`: Game settings written by LOOT
/// - `LOOT/games/<folder>/masterlist.yaml`: Downloaded masterlist for a game
/// - `LOOT/games/<folder>/userlist.yaml`: User metadata for a game
/// - `LOOT/resources/l10n`: Translations
#[derive(Debug, Clone)]
pub struct ConfigManager {
    app_data_root: Utf8PathBuf,
    data_dir: Utf8PathBuf,
}

impl ConfigManager {
    /// Create a ConfigManager rooted at the given local application data folder.
    ///
    /// # Arguments
    /// * `app_data_root` - Folder containing `LOOT` (e.g. `%LOCALAPPDATA%`)
    pub fn new<P: AsRef<Utf8Path>>(app_data_root: P) -> Self {
        let app_data_root = app_data_root.as_ref().to_path_buf();

        Self {
            data_dir: app_data_root.join("LOOT"),
            app_data_root,
        }
    }

    /// Create a ConfigManager for the current user's local application data folder.
    pub fn from_default_location() -> Result<Self> {
        let dirs = BaseDirs::new().context("Unable to determine the home directory")?;
        let root = Utf8PathBuf::try_from(dirs.data_local_dir().to_path_buf())
            .context("Local application data path is not valid UTF-8")?;

        Ok(Self::new(root))
    }

    /// Folder that `local_folder` settings are relative to.
    pub fn app_data_root(&self) -> &Utf8Path {
        &self.app_data_root
    }

    /// LOOT's own data folder.
    pub fn data_dir(&self) -> &Utf8Path {
        &self.data_dir
    }

    pub fn settings_path(&self) -> Utf8PathBuf {
        self.data_dir.join("settings.toml")
    }

    pub fn l10n_path(&self) -> Utf8PathBuf {
        self.data_dir.join("resources").join("l10n")
    }

    pub fn games_dir(&self) -> Utf8PathBuf {
        self.data_dir.join("games")
    }

    /// Folder holding a game's masterlist and userlist.
    pub fn game_folder(&self, settings: &GameSettings) -> Utf8PathBuf {
        self.games_dir().join(&settings.folder_name)
    }

    pub fn masterlist_path(&self, settings: &GameSettings) -> Utf8PathBuf {
        self.game_folder(settings).join(MASTERLIST_FILENAME)
    }

    pub fn userlist_path(&self, settings: &GameSettings) -> Utf8PathBuf {
        self.game_folder(settings).join("userlist.yaml")
    }

    /// Load and parse `settings.toml`.
    ///
    /// # Returns
    /// The parsed table, or `None` if the file doesn't exist
    pub fn load_settings_table(&self) -> Result<Option<Table>> {
        let settings_path = self.settings_path();
        if !settings_path.exists() {
            tracing::warn!("Settings file not found at {}, using defaults", settings_path);
            return Ok(None);
        }

        let file_contents = fs::read_to_string(&settings_path)
            .with_context(|| format!("{} could not be opened for parsing", settings_path))?;

        let table: Table = toml::from_str(&file_contents)
            .with_context(|| format!("Failed to parse settings: {}", settings_path))?;

        tracing::info!("Loaded settings from {}", settings_path);
        Ok(Some(table))
    }

    /// Make sure the game's folder exists, moving a legacy folder into place if found.
    ///
    /// Before the `games` folder existed, game folders lived directly in the LOOT data
    /// folder, and LOOT v0.10.0 used `SkyrimSE` as Skyrim SE's folder name.
    ///
    /// # Returns
    /// The game folder path
    pub fn prepare_game_folder(&self, settings: &GameSettings) -> Result<Utf8PathBuf> {
        let game_folder = self.game_folder(settings);
        if game_folder.is_dir() {
            return Ok(game_folder);
        }

        if game_folder.exists() {
            bail!(
                "Could not create LOOT folder for game, the path {} exists but is not a directory",
                game_folder
            );
        }

        let mut legacy_folders = vec![self.data_dir.join(&settings.folder_name)];
        if settings.id() == GameId::Tes5se {
            legacy_folders.insert(0, self.data_dir.join("SkyrimSE"));
        }

        for legacy_folder in legacy_folders {
            if legacy_folder.is_dir() {
                tracing::info!(
                    "Found a legacy game folder at {}, moving it to {}",
                    legacy_folder,
                    game_folder
                );

                fs::create_dir_all(self.games_dir())
                    .with_context(|| format!("Failed to create games folder: {}", self.games_dir()))?;
                fs::rename(&legacy_folder, &game_folder).with_context(|| {
                    format!("Failed to move {} to {}", legacy_folder, game_folder)
                })?;
                break;
            }
        }

        fs::create_dir_all(&game_folder)
            .with_context(|| format!("Failed to create game folder: {}", game_folder))?;

        Ok(game_folder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_config_manager() -> (ConfigManager, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let root = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
        (ConfigManager::new(&root), temp_dir)
    }

    #[test]
    fn test_paths() {
        let manager = ConfigManager::new("/appdata");
        let settings = GameSettings::baseline(GameId::Tes5se);

        assert_eq!(manager.settings_path(), Utf8PathBuf::from("/appdata/LOOT/settings.toml"));
        assert_eq!(
            manager.masterlist_path(&settings),
            Utf8PathBuf::from("/appdata/LOOT/games/Skyrim Special Edition/masterlist.yaml")
        );
        assert_eq!(
            manager.userlist_path(&settings),
            Utf8PathBuf::from("/appdata/LOOT/games/Skyrim Special Edition/userlist.yaml")
        );
        assert_eq!(manager.l10n_path(), Utf8PathBuf::from("/appdata/LOOT/resources/l10n"));
    }

    #[test]
    fn test_missing_settings_file() {
        let (manager, _temp_dir) = create_test_config_manager();
        assert!(manager.load_settings_table().unwrap().is_none());
    }

    #[test]
    fn test_invalid_settings_file() {
        let (manager, _temp_dir) = create_test_config_manager();
        fs::create_dir_all(manager.data_dir()).unwrap();
        fs::write(manager.settings_path(), "games = [").unwrap();

        let error = manager.load_settings_table().unwrap_err();
        assert!(error.to_string().contains("Failed to parse settings"));
    }

    #[test]
    fn test_prepare_creates_game_folder() {
        let (manager, _temp_dir) = create_test_config_manager();
        let settings = GameSettings::baseline(GameId::Fo4);

        let folder = manager.prepare_game_folder(&settings).unwrap();
        assert!(folder.is_dir());
        assert!(folder.ends_with("games/Fallout4"));
    }

    #[test]
    fn test_prepare_moves_skyrim_se_legacy_folder() {
        let (manager, _temp_dir) = create_test_config_manager();
        let legacy = manager.data_dir().join("SkyrimSE");
        fs::create_dir_all(&legacy).unwrap();
        fs::write(legacy.join("userlist.yaml"), "plugins: []\n").unwrap();

        let settings = GameSettings::baseline(GameId::Tes5se);
        let folder = manager.prepare_game_folder(&settings).unwrap();

        assert!(!legacy.exists());
        assert!(folder.join("userlist.yaml").is_file());
    }

    #[test]
    fn test_prepare_rejects_file_in_the_way() {
        let (manager, _temp_dir) = create_test_config_manager();
        let settings = GameSettings::baseline(GameId::Fo3);
        fs::create_dir_all(manager.games_dir()).unwrap();
        fs::write(manager.game_folder(&settings), "").unwrap();

        assert!(manager.prepare_game_folder(&settings).is_err());
    }
}
