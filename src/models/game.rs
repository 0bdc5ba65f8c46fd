//! Fixed facts about every game lootcli can target.
//!
//! A [`GameId`] names one concrete game or total conversion. Several of them share an
//! [`EngineType`] (Nehrim runs on Oblivion's engine, Enderal on Skyrim's), which is the
//! key used when picking the active settings record. [`IdentityFacts`] holds the constant
//! defaults that seed a [`GameSettings`](super::GameSettings) before stored overrides are
//! applied.

use serde::Serialize;
use std::fmt;

/// Filename of the masterlist inside a masterlist repository.
pub const MASTERLIST_FILENAME: &str = "masterlist.yaml";

/// Branch that current masterlists are published on.
pub const DEFAULT_MASTERLIST_BRANCH: &str = "v0.23";

/// Branches that were the default at some point and should be moved to
/// [`DEFAULT_MASTERLIST_BRANCH`].
pub const OLD_DEFAULT_BRANCHES: &[&str] = &[
    "master", "v0.7", "v0.8", "v0.10", "v0.13", "v0.14", "v0.15", "v0.17", "v0.18",
];

/// Repositories published under the `loot` GitHub organisation that older
/// versions pointed at directly.
pub const OFFICIAL_MASTERLIST_REPOS: &[&str] = &[
    "morrowind",
    "oblivion",
    "skyrim",
    "skyrimse",
    "skyrimvr",
    "fallout3",
    "falloutnv",
    "fallout4",
    "fallout4vr",
    "enderal",
];

const MORROWIND_MINIMUM_HEADER_VERSION: f32 = 1.2;
const OBLIVION_MINIMUM_HEADER_VERSION: f32 = 0.8;
const SKYRIM_FO3_MINIMUM_HEADER_VERSION: f32 = 0.94;
const SKYRIM_SE_MINIMUM_HEADER_VERSION: f32 = 1.7;
const FONV_MINIMUM_HEADER_VERSION: f32 = 1.32;
const FO4_MINIMUM_HEADER_VERSION: f32 = 0.95;
const STARFIELD_MINIMUM_HEADER_VERSION: f32 = 0.96;

/// Plugin data format family shared by one or more games.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineType {
    Tes3,
    Tes4,
    Tes5,
    Tes5se,
    Tes5vr,
    Fo3,
    Fonv,
    Fo4,
    Fo4vr,
    Starfield,
}

impl EngineType {
    /// Whether plugins of this engine may be flagged as light (ESL).
    pub fn supports_light_plugins(self) -> bool {
        matches!(
            self,
            EngineType::Tes5se | EngineType::Tes5vr | EngineType::Fo4 | EngineType::Fo4vr
        )
    }
}

/// One concrete supported game or total conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GameId {
    Tes3,
    Tes4,
    Nehrim,
    Tes5,
    Enderal,
    Tes5se,
    Enderalse,
    Tes5vr,
    Fo3,
    Fonv,
    Fo4,
    Fo4vr,
    Starfield,
}

impl GameId {
    /// Every supported game, in declaration order.
    pub const ALL: [GameId; 13] = [
        GameId::Tes3,
        GameId::Tes4,
        GameId::Nehrim,
        GameId::Tes5,
        GameId::Enderal,
        GameId::Tes5se,
        GameId::Enderalse,
        GameId::Tes5vr,
        GameId::Fo3,
        GameId::Fonv,
        GameId::Fo4,
        GameId::Fo4vr,
        GameId::Starfield,
    ];

    /// Resolve the game name lootcli is invoked with (`--game skyrimse`).
    ///
    /// Matching is case-insensitive. Returns `None` for names that are not supported.
    pub fn from_cli_name(name: &str) -> Option<GameId> {
        let id = match name.to_lowercase().as_str() {
            "morrowind" => GameId::Tes3,
            "oblivion" => GameId::Tes4,
            "nehrim" => GameId::Nehrim,
            "skyrim" => GameId::Tes5,
            "enderal" => GameId::Enderal,
            "skyrimse" => GameId::Tes5se,
            "enderalse" => GameId::Enderalse,
            "skyrimvr" => GameId::Tes5vr,
            "fallout3" => GameId::Fo3,
            "falloutnv" => GameId::Fonv,
            "fallout4" => GameId::Fo4,
            "fallout4vr" => GameId::Fo4vr,
            "starfield" => GameId::Starfield,
            _ => return None,
        };

        Some(id)
    }

    /// Engine family of this game.
    pub fn engine_type(self) -> EngineType {
        self.facts().engine
    }

    /// Constant defaults for this game.
    pub fn facts(self) -> IdentityFacts {
        facts(self)
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.facts().short_name)
    }
}

/// Constant per-game defaults.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IdentityFacts {
    pub engine: EngineType,
    /// Human readable name, e.g. "TES IV: Oblivion".
    pub display_name: &'static str,
    /// Short name, also the default LOOT storage folder for the game.
    pub short_name: &'static str,
    pub master_file: &'static str,
    pub minimum_header_version: f32,
    /// Folder under the install path that holds plugins.
    pub plugins_folder: &'static str,
    /// Repository under the `loot` organisation that hosts this game's masterlist.
    pub masterlist_repository: &'static str,
    /// Git URL older versions cloned the masterlist from, where one existed.
    pub legacy_repository_url: Option<&'static str>,
}

impl IdentityFacts {
    /// Raw-content URL of the masterlist on the current default branch.
    pub fn default_masterlist_url(&self) -> String {
        default_masterlist_url(self.masterlist_repository)
    }
}

/// Raw-content URL of a `loot` repository's masterlist on the current default branch.
pub fn default_masterlist_url(repository: &str) -> String {
    masterlist_url("loot", repository, DEFAULT_MASTERLIST_BRANCH)
}

/// Raw-content URL of the masterlist in `owner/repository` on `branch`.
pub fn masterlist_url(owner: &str, repository: &str, branch: &str) -> String {
    format!(
        "https://raw.githubusercontent.com/{}/{}/{}/{}",
        owner, repository, branch, MASTERLIST_FILENAME
    )
}

/// Look up the constant defaults for a game. Total over [`GameId`].
pub fn facts(id: GameId) -> IdentityFacts {
    match id {
        GameId::Tes3 => IdentityFacts {
            engine: EngineType::Tes3,
            display_name: "TES III: Morrowind",
            short_name: "Morrowind",
            master_file: "Morrowind.esm",
            minimum_header_version: MORROWIND_MINIMUM_HEADER_VERSION,
            plugins_folder: "Data Files",
            masterlist_repository: "morrowind",
            legacy_repository_url: Some("https://github.com/loot/morrowind.git"),
        },
        GameId::Tes4 => IdentityFacts {
            engine: EngineType::Tes4,
            display_name: "TES IV: Oblivion",
            short_name: "Oblivion",
            master_file: "Oblivion.esm",
            minimum_header_version: OBLIVION_MINIMUM_HEADER_VERSION,
            plugins_folder: "Data",
            masterlist_repository: "oblivion",
            legacy_repository_url: Some("https://github.com/loot/oblivion.git"),
        },
        GameId::Nehrim => IdentityFacts {
            engine: EngineType::Tes4,
            display_name: "Nehrim - At Fate's Edge",
            short_name: "Nehrim",
            master_file: "Nehrim.esm",
            minimum_header_version: OBLIVION_MINIMUM_HEADER_VERSION,
            plugins_folder: "Data",
            masterlist_repository: "oblivion",
            legacy_repository_url: None,
        },
        GameId::Tes5 => IdentityFacts {
            engine: EngineType::Tes5,
            display_name: "TES V: Skyrim",
            short_name: "Skyrim",
            master_file: "Skyrim.esm",
            minimum_header_version: SKYRIM_FO3_MINIMUM_HEADER_VERSION,
            plugins_folder: "Data",
            masterlist_repository: "skyrim",
            legacy_repository_url: Some("https://github.com/loot/skyrim.git"),
        },
        GameId::Enderal => IdentityFacts {
            engine: EngineType::Tes5,
            display_name: "Enderal: Forgotten Stories",
            short_name: "Enderal",
            master_file: "Skyrim.esm",
            minimum_header_version: SKYRIM_FO3_MINIMUM_HEADER_VERSION,
            plugins_folder: "Data",
            masterlist_repository: "enderal",
            legacy_repository_url: None,
        },
        GameId::Tes5se => IdentityFacts {
            engine: EngineType::Tes5se,
            display_name: "TES V: Skyrim Special Edition",
            short_name: "Skyrim Special Edition",
            master_file: "Skyrim.esm",
            minimum_header_version: SKYRIM_SE_MINIMUM_HEADER_VERSION,
            plugins_folder: "Data",
            masterlist_repository: "skyrimse",
            legacy_repository_url: Some("https://github.com/loot/skyrimse.git"),
        },
        GameId::Enderalse => IdentityFacts {
            engine: EngineType::Tes5se,
            display_name: "Enderal: Forgotten Stories (Special Edition)",
            short_name: "Enderal Special Edition",
            master_file: "Skyrim.esm",
            minimum_header_version: SKYRIM_SE_MINIMUM_HEADER_VERSION,
            plugins_folder: "Data",
            masterlist_repository: "enderal",
            legacy_repository_url: None,
        },
        GameId::Tes5vr => IdentityFacts {
            engine: EngineType::Tes5vr,
            display_name: "TES V: Skyrim VR",
            short_name: "Skyrim VR",
            master_file: "Skyrim.esm",
            minimum_header_version: SKYRIM_SE_MINIMUM_HEADER_VERSION,
            plugins_folder: "Data",
            masterlist_repository: "skyrimvr",
            legacy_repository_url: Some("https://github.com/loot/skyrimvr.git"),
        },
        GameId::Fo3 => IdentityFacts {
            engine: EngineType::Fo3,
            display_name: "Fallout 3",
            short_name: "Fallout3",
            master_file: "Fallout3.esm",
            minimum_header_version: SKYRIM_FO3_MINIMUM_HEADER_VERSION,
            plugins_folder: "Data",
            masterlist_repository: "fallout3",
            legacy_repository_url: Some("https://github.com/loot/fallout3.git"),
        },
        GameId::Fonv => IdentityFacts {
            engine: EngineType::Fonv,
            display_name: "Fallout: New Vegas",
            short_name: "FalloutNV",
            master_file: "FalloutNV.esm",
            minimum_header_version: FONV_MINIMUM_HEADER_VERSION,
            plugins_folder: "Data",
            masterlist_repository: "falloutnv",
            legacy_repository_url: Some("https://github.com/loot/falloutnv.git"),
        },
        GameId::Fo4 => IdentityFacts {
            engine: EngineType::Fo4,
            display_name: "Fallout 4",
            short_name: "Fallout4",
            master_file: "Fallout4.esm",
            minimum_header_version: FO4_MINIMUM_HEADER_VERSION,
            plugins_folder: "Data",
            masterlist_repository: "fallout4",
            legacy_repository_url: Some("https://github.com/loot/fallout4.git"),
        },
        GameId::Fo4vr => IdentityFacts {
            engine: EngineType::Fo4vr,
            display_name: "Fallout 4 VR",
            short_name: "Fallout4VR",
            master_file: "Fallout4.esm",
            minimum_header_version: FO4_MINIMUM_HEADER_VERSION,
            plugins_folder: "Data",
            masterlist_repository: "fallout4vr",
            legacy_repository_url: Some("https://github.com/loot/fallout4vr.git"),
        },
        GameId::Starfield => IdentityFacts {
            engine: EngineType::Starfield,
            display_name: "Starfield",
            short_name: "Starfield",
            master_file: "Starfield.esm",
            minimum_header_version: STARFIELD_MINIMUM_HEADER_VERSION,
            plugins_folder: "Data",
            masterlist_repository: "starfield",
            legacy_repository_url: None,
        },
    }
}
