//! Game detection for stored `[[games]]` records.
//!
//! Older LOOT versions stored a game *type* rather than a game ID, and several games
//! share a type: Nehrim is stored as `Oblivion`, Enderal as `Skyrim`, and Enderal SE as
//! `SkyrimSE`. This module turns a stored label back into one concrete [`GameId`]:
//!
//! - If the record's install path exists on disk, the presence of the total conversion's
//!   launcher decides the outcome.
//! - Otherwise a set of independent heuristics over the stored values is evaluated, and
//!   any positive match selects the total conversion.
//!
//! # Examples
//!
//! ```ignore
//! use lootcli_settings::services::game_detection::{GameHints, GameResolver};
//!
//! let resolver = GameResolver::new();
//! let hints = GameHints {
//!     name: Some("My Enderal Install".to_string()),
//!     ..GameHints::default()
//! };
//! assert_eq!(resolver.resolve("Skyrim", &hints)?, GameId::Enderal);
//! ```

use camino::Utf8Path;
use thiserror::Error;

use crate::models::GameId;

/// The stored label does not name any known game type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unrecognised game type \"{0}\"")]
pub struct UnrecognizedGameType(pub String);

/// Values from a stored record that help tell a base game from its total conversion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameHints {
    /// Stored install path (`path`).
    pub install_path: Option<String>,
    /// Stored display name (`name`).
    pub name: Option<String>,
    /// Stored master filename (`master`).
    pub master: Option<String>,
    /// Stored LOOT folder name (`folder`).
    pub folder: Option<String>,
    /// Stored local data folder: `local_folder`, or the last component of `local_path`.
    pub local_folder: Option<String>,
    /// `isBaseGameInstance`, only written by LOOT 0.18.1 to 0.19.0.
    pub is_base_game_instance: Option<bool>,
}

/// What distinguishes a total conversion from the base game it shares a type with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariantProfile {
    pub id: GameId,
    /// File only present in the total conversion's install folder.
    pub launcher: &'static str,
    /// Lowercase token expected in the game's name or LOOT folder.
    pub name_token: &'static str,
    /// Master file that differs from the base game's, if any.
    pub master_file: Option<&'static str>,
    /// Local data folder that differs from the base game's, if any.
    pub local_folder: Option<&'static str>,
}

pub const NEHRIM_PROFILE: VariantProfile = VariantProfile {
    id: GameId::Nehrim,
    launcher: "NehrimLauncher.exe",
    name_token: "nehrim",
    master_file: Some("Nehrim.esm"),
    local_folder: None,
};

pub const ENDERAL_PROFILE: VariantProfile = VariantProfile {
    id: GameId::Enderal,
    launcher: "Enderal Launcher.exe",
    name_token: "enderal",
    master_file: None,
    local_folder: Some("enderal"),
};

pub const ENDERAL_SE_PROFILE: VariantProfile = VariantProfile {
    id: GameId::Enderalse,
    launcher: "Enderal Launcher.exe",
    name_token: "enderal",
    master_file: None,
    local_folder: Some("Enderal Special Edition"),
};

/// A single fallback rule. Rules are pure and independent of each other.
pub type Heuristic = fn(&GameHints, &VariantProfile) -> bool;

/// The stored master file is the total conversion's own master.
pub fn master_matches(hints: &GameHints, profile: &VariantProfile) -> bool {
    match (&hints.master, profile.master_file) {
        (Some(master), Some(expected)) => master == expected,
        _ => false,
    }
}

/// The stored name mentions the total conversion.
pub fn name_mentions_variant(hints: &GameHints, profile: &VariantProfile) -> bool {
    hints
        .name
        .as_deref()
        .is_some_and(|name| contains_ignore_case(name, profile.name_token))
}

/// The stored LOOT folder mentions the total conversion.
pub fn folder_mentions_variant(hints: &GameHints, profile: &VariantProfile) -> bool {
    hints
        .folder
        .as_deref()
        .is_some_and(|folder| contains_ignore_case(folder, profile.name_token))
}

/// The stored local data folder is the one the total conversion uses.
pub fn local_folder_matches(hints: &GameHints, profile: &VariantProfile) -> bool {
    match (&hints.local_folder, profile.local_folder) {
        (Some(folder), Some(expected)) => folder == expected,
        _ => false,
    }
}

/// `isBaseGameInstance` was false for every total conversion while it existed.
pub fn base_game_flag_cleared(hints: &GameHints, _profile: &VariantProfile) -> bool {
    hints.is_base_game_instance == Some(false)
}

/// Fallback rules, evaluated only when the install path can't be inspected.
pub const HEURISTICS: [Heuristic; 5] = [
    master_matches,
    name_mentions_variant,
    folder_mentions_variant,
    local_folder_matches,
    base_game_flag_cleared,
];

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Look for the total conversion's launcher in the stored install path.
///
/// Returns `None` if there is no usable install path, in which case the heuristics apply.
pub fn launcher_check(hints: &GameHints, profile: &VariantProfile) -> Option<bool> {
    let install_path = hints.install_path.as_deref().filter(|p| !p.is_empty())?;
    let install_path = Utf8Path::new(install_path);

    if !install_path.exists() {
        return None;
    }

    Some(install_path.join(profile.launcher).exists())
}

/// OR-combine `rules`. The result does not depend on their order.
pub fn matches_any(hints: &GameHints, profile: &VariantProfile, rules: &[Heuristic]) -> bool {
    rules
        .iter()
        .fold(false, |matched, rule| matched || rule(hints, profile))
}

/// Whether `hints` describe the total conversion in `profile` rather than its base game.
pub fn is_variant(hints: &GameHints, profile: &VariantProfile) -> bool {
    if let Some(has_launcher) = launcher_check(hints, profile) {
        tracing::debug!(
            "Install path decides {}: launcher {} present = {}",
            profile.id,
            profile.launcher,
            has_launcher
        );
        return has_launcher;
    }

    matches_any(hints, profile, &HEURISTICS)
}

/// Maps stored game type labels to concrete games.
#[derive(Debug, Clone)]
pub struct GameResolver {
    nehrim: VariantProfile,
    enderal: VariantProfile,
    enderal_se: VariantProfile,
}

impl GameResolver {
    pub fn new() -> Self {
        Self::with_profiles(NEHRIM_PROFILE, ENDERAL_PROFILE, ENDERAL_SE_PROFILE)
    }

    /// Build a resolver with custom total conversion profiles.
    pub fn with_profiles(
        nehrim: VariantProfile,
        enderal: VariantProfile,
        enderal_se: VariantProfile,
    ) -> Self {
        Self {
            nehrim,
            enderal,
            enderal_se,
        }
    }

    /// Resolve a stored game type label into a concrete game.
    ///
    /// Labels shared by a base game and a total conversion are disambiguated with
    /// [`is_variant`]; all other labels ignore `hints`.
    ///
    /// # Errors
    ///
    /// Returns [`UnrecognizedGameType`] if `label` isn't a known game type.
    pub fn resolve(&self, label: &str, hints: &GameHints) -> Result<GameId, UnrecognizedGameType> {
        let pick = |base: GameId, profile: &VariantProfile| {
            if is_variant(hints, profile) {
                profile.id
            } else {
                base
            }
        };

        let id = match label {
            "Morrowind" => GameId::Tes3,
            "Oblivion" => pick(GameId::Tes4, &self.nehrim),
            "Skyrim" => pick(GameId::Tes5, &self.enderal),
            "SkyrimSE" | "Skyrim Special Edition" => pick(GameId::Tes5se, &self.enderal_se),
            "Skyrim VR" => GameId::Tes5vr,
            "Fallout3" => GameId::Fo3,
            "FalloutNV" => GameId::Fonv,
            "Fallout4" => GameId::Fo4,
            "Fallout4VR" => GameId::Fo4vr,
            "Starfield" => GameId::Starfield,
            _ => return Err(UnrecognizedGameType(label.to_string())),
        };

        tracing::debug!("Resolved game type {} to {:?}", label, id);
        Ok(id)
    }
}

impl Default for GameResolver {
    fn default() -> Self {
        Self::new()
    }
}
