//! Data models for lootcli settings.
//!
//! This module contains the core data structures:
//! - [`GameId`]: One concrete supported game or total conversion
//! - [`EngineType`]: The plugin format family shared by several games
//! - [`IdentityFacts`]: Constant per-game defaults (master file, header version, repository)
//! - [`GameSettings`]: The resolved, overridable settings record for one installation
//!
//! # Architecture Note
//!
//! Identity facts are constants looked up through an exhaustive `match`, so every
//! [`GameId`] always has an entry. A [`GameSettings`] record only stores its [`GameId`];
//! the engine type is always derived from it.

pub mod game;
pub mod settings;

pub use game::{
    DEFAULT_MASTERLIST_BRANCH, EngineType, GameId, IdentityFacts, MASTERLIST_FILENAME,
    OFFICIAL_MASTERLIST_REPOS, OLD_DEFAULT_BRANCHES, default_masterlist_url, facts,
    masterlist_url,
};
pub use settings::GameSettings;
