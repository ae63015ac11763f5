//! File system cache locations and helpers.
//!
//! League settings are cached as JSON and the entity store can be persisted
//! as a SQLite file, both under `<cache_dir>/fantasy-hoops/`.

use std::{
    fs,
    io::{Read, Write},
    path::{Path, PathBuf},
};

use crate::LeagueKey;

/// Base directory: `<cache_dir>/fantasy-hoops`, falling back to `~/.cache`.
pub fn cache_base_dir() -> PathBuf {
    let base = dirs::cache_dir().unwrap_or_else(|| {
        let mut home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        home.push(".cache");
        home
    });
    base.join("fantasy-hoops")
}

/// Path: `<cache_dir>/fantasy-hoops/league-settings_{league_key}.json`
pub fn league_settings_path(league_key: &LeagueKey) -> PathBuf {
    cache_base_dir().join(format!("league-settings_{}.json", league_key))
}

/// Path: `<cache_dir>/fantasy-hoops/{league_key}.db`
pub fn entity_db_path(league_key: &LeagueKey) -> PathBuf {
    cache_base_dir().join(format!("{}.db", league_key))
}

/// Try to read a file into a String
pub fn try_read_to_string(path: &Path) -> Option<String> {
    let mut f = fs::File::open(path).ok()?;
    let mut s = String::new();

    f.read_to_string(&mut s).ok()?;

    Some(s)
}

/// Write a string to file
pub fn write_string(path: &Path, contents: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut f = fs::File::create(path)?;
    f.write_all(contents.as_bytes())
}
