use dirs::home_dir;
use std::{
    env,
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use crate::errors::LedgerResult;

const DEFAULT_DIR_NAME: &str = ".group_ledger";
const SNAPSHOT_DIR: &str = "groups";
const CONFIG_FILE: &str = "config.json";
const HOME_ENV: &str = "GROUP_LEDGER_HOME";
const TMP_SUFFIX: &str = "tmp";

/// Resolves the on-disk layout used by the JSON store and config manager.
pub struct PathResolver;

impl PathResolver {
    /// Application data directory, defaulting to `~/.group_ledger`.
    pub fn base_dir() -> PathBuf {
        if let Some(custom) = env::var_os(HOME_ENV) {
            return PathBuf::from(custom);
        }
        home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(DEFAULT_DIR_NAME)
    }

    pub fn resolve_base(custom: Option<PathBuf>) -> PathBuf {
        custom.unwrap_or_else(Self::base_dir)
    }

    pub fn snapshot_dir_in(base: &Path) -> PathBuf {
        base.join(SNAPSHOT_DIR)
    }

    pub fn config_file_in(base: &Path) -> PathBuf {
        base.join(CONFIG_FILE)
    }
}

pub fn ensure_dir(path: &Path) -> LedgerResult<()> {
    fs::create_dir_all(path)?;
    Ok(())
}

/// Sibling path a file is staged at before it replaces `path`.
pub fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

/// Writes `data` to the temp sibling, then renames it over `path`.
/// A failed write leaves any previous file untouched.
pub fn write_atomic(path: &Path, data: &str) -> LedgerResult<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    let tmp = tmp_path(path);
    let mut file = File::create(&tmp)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    fs::rename(&tmp, path)?;
    Ok(())
}

/// File-system safe slug for a storage key.
pub fn canonical_name(name: &str) -> String {
    let sanitized: String = name
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'a'..='z' | '0'..='9' | '-' => c,
            _ => '_',
        })
        .collect();
    if sanitized.trim_matches('_').is_empty() {
        "group".into()
    } else {
        sanitized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_name_slugs_keys() {
        assert_eq!(canonical_name("Trip to Lisbon"), "trip_to_lisbon");
        assert_eq!(canonical_name("group-ledger"), "group-ledger");
        assert_eq!(canonical_name("  ??? "), "group");
    }

    #[test]
    fn tmp_path_appends_suffix() {
        assert_eq!(
            tmp_path(Path::new("/data/trip.json")),
            PathBuf::from("/data/trip.json.tmp")
        );
        assert_eq!(tmp_path(Path::new("/data/trip")), PathBuf::from("/data/trip.tmp"));
    }

    #[test]
    fn write_atomic_replaces_file_without_leftovers() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("nested").join("config.json");
        write_atomic(&path, "first").unwrap();
        write_atomic(&path, "second").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "second");
        assert!(!tmp_path(&path).exists());
    }

    #[test]
    fn failed_write_keeps_previous_contents() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("config.json");
        write_atomic(&path, "kept").unwrap();
        fs::create_dir_all(tmp_path(&path)).unwrap();
        assert!(write_atomic(&path, "lost").is_err());
        assert_eq!(fs::read_to_string(&path).unwrap(), "kept");
    }

    #[test]
    fn layout_is_relative_to_base() {
        let base = PathBuf::from("/tmp/ledger-home");
        assert_eq!(
            PathResolver::snapshot_dir_in(&base),
            base.join("groups")
        );
        assert_eq!(
            PathResolver::resolve_base(Some(base.clone())),
            base
        );
    }
}
