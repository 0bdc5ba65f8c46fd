use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;

use super::game::{EngineType, GameId, IdentityFacts, facts};

/// Resolved settings for one game installation.
///
/// Built from [`IdentityFacts`] as a baseline and then overridden field by field from a
/// stored `[[games]]` record. The engine type is not stored: it is always derived from
/// the game ID.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameSettings {
    id: GameId,
    pub name: String,
    pub master_file: String,
    pub minimum_header_version: f32,
    /// Folder under the LOOT data directory's `games` folder used for this game.
    pub folder_name: String,
    /// Local file path or URL the masterlist is fetched from.
    pub masterlist_source: String,
    /// The game's install folder.
    pub game_path: Utf8PathBuf,
    /// The game's local application data folder, if it has been configured.
    pub game_local_path: Option<Utf8PathBuf>,
}

impl GameSettings {
    /// Baseline settings for `id`, stored under `folder_name`.
    pub fn new(id: GameId, folder_name: impl Into<String>) -> Self {
        let facts = facts(id);
        Self {
            id,
            name: facts.display_name.to_string(),
            master_file: facts.master_file.to_string(),
            minimum_header_version: facts.minimum_header_version,
            folder_name: folder_name.into(),
            masterlist_source: facts.default_masterlist_url(),
            game_path: Utf8PathBuf::new(),
            game_local_path: None,
        }
    }

    /// Baseline settings stored under the game's default folder name.
    pub fn baseline(id: GameId) -> Self {
        Self::new(id, facts(id).short_name)
    }

    pub fn id(&self) -> GameId {
        self.id
    }

    pub fn engine_type(&self) -> EngineType {
        self.id.engine_type()
    }

    pub fn facts(&self) -> IdentityFacts {
        facts(self.id)
    }

    /// Folder holding the game's plugins.
    pub fn data_path(&self) -> Utf8PathBuf {
        self.game_path.join(self.facts().plugins_folder)
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.name = name.into();
        self
    }

    pub fn set_master_file(&mut self, master_file: impl Into<String>) -> &mut Self {
        self.master_file = master_file.into();
        self
    }

    pub fn set_minimum_header_version(&mut self, version: f32) -> &mut Self {
        self.minimum_header_version = version;
        self
    }

    pub fn set_masterlist_source(&mut self, source: impl Into<String>) -> &mut Self {
        self.masterlist_source = source.into();
        self
    }

    pub fn set_game_path(&mut self, path: impl Into<Utf8PathBuf>) -> &mut Self {
        self.game_path = path.into();
        self
    }

    pub fn set_game_local_path(&mut self, path: impl Into<Utf8PathBuf>) -> &mut Self {
        self.game_local_path = Some(path.into());
        self
    }

    /// Point the local path at `folder_name` inside the local application data root.
    pub fn set_game_local_folder(&mut self, app_data_root: &Utf8Path, folder_name: &str) -> &mut Self {
        self.game_local_path = Some(app_data_root.join(folder_name));
        self
    }

    /// Two records describe the same game if either their names or their storage
    /// folders match.
    pub fn is_same_game(&self, other: &GameSettings) -> bool {
        self.name == other.name || self.folder_name == other.folder_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_baseline_uses_identity_facts() {
        let settings = GameSettings::baseline(GameId::Nehrim);

        assert_eq!(settings.id(), GameId::Nehrim);
        assert_eq!(settings.engine_type(), EngineType::Tes4);
        assert_eq!(settings.name, "Nehrim - At Fate's Edge");
        assert_eq!(settings.master_file, "Nehrim.esm");
        assert_eq!(settings.folder_name, "Nehrim");
        assert_eq!(
            settings.masterlist_source,
            "https://raw.githubusercontent.com/loot/oblivion/v0.23/masterlist.yaml"
        );
        assert!(settings.game_path.as_str().is_empty());
        assert!(settings.game_local_path.is_none());
    }

    #[test]
    fn test_data_path() {
        let mut morrowind = GameSettings::baseline(GameId::Tes3);
        morrowind.set_game_path("C:/Games/Morrowind");
        assert_eq!(
            morrowind.data_path(),
            Utf8PathBuf::from("C:/Games/Morrowind/Data Files")
        );

        let mut fallout = GameSettings::baseline(GameId::Fo4);
        fallout.set_game_path("C:/Games/Fallout 4");
        assert_eq!(fallout.data_path(), Utf8PathBuf::from("C:/Games/Fallout 4/Data"));
    }

    #[test]
    fn test_setters_chain() {
        let mut settings = GameSettings::baseline(GameId::Tes5);
        settings
            .set_name("Custom Skyrim")
            .set_master_file("Custom.esm")
            .set_minimum_header_version(1.0)
            .set_masterlist_source("C:/masterlists/skyrim/masterlist.yaml");

        assert_eq!(settings.name, "Custom Skyrim");
        assert_eq!(settings.master_file, "Custom.esm");
        assert_eq!(settings.minimum_header_version, 1.0);
        assert_eq!(settings.masterlist_source, "C:/masterlists/skyrim/masterlist.yaml");
        assert_eq!(settings.engine_type(), EngineType::Tes5);
    }

    #[test]
    fn test_local_folder_joins_app_data_root() {
        let mut settings = GameSettings::baseline(GameId::Enderal);
        settings.set_game_local_folder(Utf8Path::new("/home/user/AppData/Local"), "enderal");

        assert_eq!(
            settings.game_local_path,
            Some(Utf8PathBuf::from("/home/user/AppData/Local/enderal"))
        );
    }

    #[test]
    fn test_is_same_game() {
        let skyrim = GameSettings::baseline(GameId::Tes5);
        let renamed = GameSettings::new(GameId::Tes5, "Other Folder");
        let mut same_folder = GameSettings::baseline(GameId::Tes5);
        same_folder.set_name("My Skyrim");

        assert!(skyrim.is_same_game(&renamed));
        assert!(skyrim.is_same_game(&same_folder));
        assert!(!skyrim.is_same_game(&GameSettings::baseline(GameId::Enderal)));
    }

    #[test]
    fn test_serializes_to_toml() {
        let mut settings = GameSettings::baseline(GameId::Fo4);
        settings.set_game_path("C:/Games/Fallout 4");

        let serialized = toml::to_string(&settings).unwrap();
        assert!(serialized.contains("id = \"fo4\""));
        assert!(serialized.contains("folder_name = \"Fallout4\""));
        assert!(serialized.contains("game_path = \"C:/Games/Fallout 4\""));
    }
}
