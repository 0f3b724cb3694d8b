use std::{
    collections::BTreeMap,
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use chrono::Local;
use directories::ProjectDirs;
use serde::{Serialize, de::DeserializeOwned};
use tracing::warn;

use crate::domain::{self, Snapshot};

const CATEGORIES_FILE: &str = "categories.json";
const TIMERS_FILE: &str = "timers.json";

pub fn get_data_dir() -> PathBuf {
    let local_categories = Path::new("./categories.json");
    let local_timers = Path::new("./timers.json");
    if local_categories.exists() || local_timers.exists() {
        return PathBuf::from(".");
    }

    if let Some(proj_dirs) = ProjectDirs::from("com", "tagwerk", "tagwerk") {
        let data_dir = proj_dirs.data_dir().to_path_buf();
        fs::create_dir_all(&data_dir).ok();
        data_dir
    } else {
        PathBuf::from(".")
    }
}

pub fn get_state_dir() -> PathBuf {
    if let Some(proj_dirs) = ProjectDirs::from("com", "tagwerk", "tagwerk") {
        if let Some(state_dir) = proj_dirs.state_dir() {
            let dir = state_dir.to_path_buf();
            fs::create_dir_all(&dir).ok();
            return dir;
        }
    }
    PathBuf::from(".")
}

pub fn get_categories_path() -> PathBuf {
    get_data_dir().join(CATEGORIES_FILE)
}

pub fn get_timers_path() -> PathBuf {
    get_data_dir().join(TIMERS_FILE)
}

/// Loads the persisted snapshot. Missing or corrupt files never abort the
/// program: categories fall back to the built-in defaults, timers to empty,
/// and the store's load-time reconciliation refills the rest.
pub fn load_snapshot(categories_path: &Path, timers_path: &Path) -> Snapshot {
    let categories: BTreeMap<String, u64> = if categories_path.exists() {
        match read_json(categories_path) {
            Ok(map) => map,
            Err(e) => {
                warn!(
                    "could not load {}, using default categories: {}",
                    categories_path.display(),
                    e
                );
                domain::default_categories()
            }
        }
    } else {
        domain::default_categories()
    };

    let timers: BTreeMap<String, f64> = if timers_path.exists() {
        match read_json(timers_path) {
            Ok(map) => map,
            Err(e) => {
                warn!(
                    "could not load {}, timers reset to defaults: {}",
                    timers_path.display(),
                    e
                );
                BTreeMap::new()
            }
        }
    } else {
        BTreeMap::new()
    };

    Snapshot { categories, timers }
}

/// Whole-snapshot overwrite, one JSON object per file.
pub fn save_snapshot(
    categories_path: &Path,
    timers_path: &Path,
    snapshot: &Snapshot,
) -> Result<(), String> {
    write_json_atomic(categories_path, &snapshot.categories)?;
    write_json_atomic(timers_path, &snapshot.timers)
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, String> {
    let content = fs::read_to_string(path).map_err(|e| e.to_string())?;
    serde_json::from_str(&content).map_err(|e| e.to_string())
}

pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), String> {
    let json = serde_json::to_string_pretty(value).map_err(|e| e.to_string())?;
    atomic_write(path, &json)
}

pub fn create_backup(path: &Path) -> Result<(), String> {
    if !path.exists() {
        return Ok(());
    }

    let backup_dir = path.parent().unwrap_or(Path::new(".")).join("backups");
    fs::create_dir_all(&backup_dir).map_err(|e| e.to_string())?;

    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    let filename = format!(
        "{}.{}",
        path.file_name().unwrap_or_default().to_string_lossy(),
        timestamp
    );
    let backup_path = backup_dir.join(&filename);
    fs::copy(path, &backup_path).map_err(|e| e.to_string())?;

    let stem = path.file_stem().unwrap_or_default().to_string_lossy();
    if let Ok(entries) = fs::read_dir(&backup_dir) {
        let mut backups: Vec<_> = entries
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().starts_with(&*stem))
            .collect();
        backups.sort_by_key(|e| e.metadata().ok().and_then(|m| m.modified().ok()));

        while backups.len() > 10 {
            if let Some(oldest) = backups.first() {
                let _ = fs::remove_file(oldest.path());
                backups.remove(0);
            }
        }
    }

    Ok(())
}

pub fn atomic_write(path: &Path, content: &str) -> Result<(), String> {
    if path.exists() {
        create_backup(path)?;
    }

    let tmp_path = path.with_extension("tmp");
    let mut tmp_file = File::create(&tmp_path).map_err(|e| e.to_string())?;
    tmp_file
        .write_all(content.as_bytes())
        .map_err(|e| e.to_string())?;
    tmp_file.sync_all().map_err(|e| e.to_string())?;
    fs::rename(&tmp_path, path).map_err(|e| e.to_string())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::{fs, path::PathBuf, time::SystemTime};

    use super::*;

    fn unique_dir(prefix: &str) -> PathBuf {
        let now = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let dir = PathBuf::from(format!("/tmp/{}_{}", prefix, now));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn sample_snapshot() -> Snapshot {
        Snapshot {
            categories: BTreeMap::from([
                ("Work".to_string(), 21600),
                ("Break".to_string(), 7200),
            ]),
            timers: BTreeMap::from([
                ("Work".to_string(), 12345.625),
                ("Break".to_string(), 7200.0),
            ]),
        }
    }

    #[test]
    fn test_snapshot_round_trip() {
        let dir = unique_dir("tagwerk_snapshot_roundtrip");
        let categories_path = dir.join("categories.json");
        let timers_path = dir.join("timers.json");
        let snapshot = sample_snapshot();

        save_snapshot(&categories_path, &timers_path, &snapshot).unwrap();
        let loaded = load_snapshot(&categories_path, &timers_path);

        assert_eq!(loaded.categories, snapshot.categories);
        for (name, value) in &snapshot.timers {
            let loaded_value = loaded.timers.get(name).copied().unwrap();
            assert!((loaded_value - value).abs() < 1e-9);
        }

        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_missing_files_fall_back_to_defaults() {
        let dir = unique_dir("tagwerk_snapshot_missing");
        let loaded = load_snapshot(&dir.join("categories.json"), &dir.join("timers.json"));

        assert_eq!(loaded.categories, domain::default_categories());
        assert!(loaded.timers.is_empty());

        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_corrupt_files_fall_back_instead_of_crashing() {
        let dir = unique_dir("tagwerk_snapshot_corrupt");
        let categories_path = dir.join("categories.json");
        let timers_path = dir.join("timers.json");
        fs::write(&categories_path, "{not json").unwrap();
        fs::write(&timers_path, "[1, 2, 3]").unwrap();

        let loaded = load_snapshot(&categories_path, &timers_path);
        assert_eq!(loaded.categories, domain::default_categories());
        assert!(loaded.timers.is_empty());

        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_atomic_write_replaces_existing_content() {
        let dir = unique_dir("tagwerk_atomic_write");
        let path = dir.join("categories.json");

        atomic_write(&path, "{\"Work\": 1}").unwrap();
        atomic_write(&path, "{\"Work\": 2}").unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "{\"Work\": 2}");
        assert!(
            dir.join("backups").exists(),
            "second write backs up the first"
        );

        fs::remove_dir_all(dir).ok();
    }
}
