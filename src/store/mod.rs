//! JSON-file persistence for asset records and the history log
//!
//! Both stores are whole-file read-modify-write; the server serializes
//! access behind a mutex. A missing file is an empty store; a corrupt file
//! is logged and treated as empty rather than aborting requests.

pub mod assets;
pub mod history;

pub use assets::AssetStore;
pub use history::HistoryLog;
