//! Content definitions and persistence backends for the Polyup engine.
//!
//! The engine itself is content-agnostic; this crate supplies the on-disk
//! schema for upgrade trees and question banks, a loader that resolves data
//! files into engine types, the built-in campaign content, and a JSON file
//! implementation of the save-store contract.

pub mod builtin;
pub mod loader;
pub mod schema;
pub mod store;

pub use loader::{DataLoadError, GameData, load_game_data};
pub use store::JsonFileStore;
