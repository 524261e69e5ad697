//! Tournament document - JSON persistence for the CLI
//!
//! The document is the whole `Tournament`: configuration, rosters and every
//! pairing with its result. The ledger is rebuilt on load.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use tracing::info;

use swiss_core::Player;
use swiss_tournament::{SectionFormat, Tournament, TournamentConfig};

/// Read a tournament document
pub fn load(path: &Path) -> Result<Tournament> {
    let json = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&json).with_context(|| format!("Failed to parse tournament document {}", path.display()))
}

/// Write a tournament document
pub fn save(path: &Path, tournament: &Tournament) -> Result<()> {
    let json = serde_json::to_string_pretty(tournament).context("Failed to serialize tournament")?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
}

/// Load, apply `op`, save
///
/// The document is only written back when `op` succeeds.
pub fn update<T>(path: &Path, op: impl FnOnce(&mut Tournament) -> Result<T>) -> Result<T> {
    let mut tournament = load(path)?;
    let value = op(&mut tournament)?;
    save(path, &tournament)?;
    Ok(value)
}

pub fn init(path: &Path, id: String, name: String, rounds: u32, config: Option<&Path>) -> Result<()> {
    if path.exists() {
        bail!("{} already exists", path.display());
    }
    let config = match config {
        Some(file) => {
            let json = fs::read_to_string(file).with_context(|| format!("Failed to read {}", file.display()))?;
            serde_json::from_str(&json).with_context(|| format!("Invalid configuration in {}", file.display()))?
        }
        None => TournamentConfig::swiss(rounds),
    };

    let tournament = Tournament::new(id, name, config);
    save(path, &tournament)?;
    info!("Created tournament '{}' in {}", tournament.id, path.display());
    Ok(())
}

pub fn add_section(path: &Path, section: String, players: &Path, team: bool) -> Result<()> {
    let json = fs::read_to_string(players).with_context(|| format!("Failed to read {}", players.display()))?;
    let roster: Vec<Player> =
        serde_json::from_str(&json).with_context(|| format!("Invalid roster in {}", players.display()))?;
    let format = if team {
        SectionFormat::Team
    } else {
        SectionFormat::Individual
    };

    let count = roster.len();
    update(path, |t| Ok(t.add_section(section.clone(), format, roster)?))?;
    println!("Section '{}' added with {} players", section, count);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn scratch(name: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("swiss-cli-{}-{}.json", name, std::process::id()));
        let _ = fs::remove_file(&path);
        path
    }

    #[test]
    fn test_init_then_update() {
        let path = scratch("init");
        init(&path, "spring".to_string(), "Spring Open".to_string(), 4, None).unwrap();
        assert!(init(&path, "spring".to_string(), "again".to_string(), 4, None).is_err());

        let players = (1..=4).map(|i| Player::new(i, format!("P{i}"), Some(1500), "open")).collect();
        update(&path, |t| Ok(t.add_section("open", SectionFormat::Individual, players)?)).unwrap();

        let loaded = load(&path).unwrap();
        assert_eq!(loaded.config.total_rounds, 4);
        assert_eq!(loaded.sections().count(), 1);
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_failed_update_leaves_document() {
        let path = scratch("failed");
        init(&path, "spring".to_string(), "Spring Open".to_string(), 3, None).unwrap();
        let before = fs::read_to_string(&path).unwrap();

        let result = update(&path, |t| Ok(t.generate_pairings("spring", "missing", 1)?));
        assert!(result.is_err());
        assert_eq!(fs::read_to_string(&path).unwrap(), before);
        fs::remove_file(&path).unwrap();
    }
}
