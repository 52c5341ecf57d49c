// Download path resolution backed by a per-user settings file

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum PathError {
    #[error("Cannot create directory '{path}': {source}. Please check permissions or choose a different location.")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Cannot write settings file '{path}': {source}")]
    WriteSettings {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Resolves the download directory for a file extension, creating it on
/// demand. Executors call this once per job at dispatch time so a
/// settings change mid-batch applies to jobs that have not started yet.
pub trait PathResolver: Send + Sync {
    fn resolve(&self, ext: &str) -> Result<PathBuf, PathError>;
}

/// `PathResolver` backed by a `settings.json` mapping extension →
/// directory. Entries are created lazily: the first request for an
/// extension writes a `~/Downloads/{ext}` default back to the file,
/// extensions never requested never appear in it.
pub struct SettingsPathResolver {
    settings_file: PathBuf,
    downloads_dir: PathBuf,
    paths: Mutex<Option<HashMap<String, PathBuf>>>,
}

impl SettingsPathResolver {
    /// Settings under `~/Documents/VidGrab/settings.json`, defaults
    /// under the user's download directory.
    pub fn new() -> Self {
        let settings_dir = dirs::document_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("VidGrab");
        let downloads_dir = dirs::download_dir().unwrap_or_else(|| PathBuf::from("."));
        Self::with_base(settings_dir, downloads_dir)
    }

    /// Explicit locations, used by tests and embedders.
    pub fn with_base(settings_dir: impl Into<PathBuf>, downloads_dir: impl Into<PathBuf>) -> Self {
        Self {
            settings_file: settings_dir.into().join("settings.json"),
            downloads_dir: downloads_dir.into(),
            paths: Mutex::new(None),
        }
    }

    fn load(settings_file: &Path) -> HashMap<String, PathBuf> {
        let data = match fs::read_to_string(settings_file) {
            Ok(data) => data,
            Err(_) => return HashMap::new(),
        };
        match serde_json::from_str::<HashMap<String, String>>(&data) {
            Ok(map) => map.into_iter().map(|(k, v)| (k, PathBuf::from(v))).collect(),
            Err(e) => {
                warn!("ignoring unreadable settings file {}: {}", settings_file.display(), e);
                HashMap::new()
            }
        }
    }

    fn save(&self, paths: &HashMap<String, PathBuf>) -> Result<(), PathError> {
        if let Some(parent) = self.settings_file.parent() {
            fs::create_dir_all(parent).map_err(|source| PathError::WriteSettings {
                path: self.settings_file.clone(),
                source,
            })?;
        }
        let data: HashMap<&str, String> = paths
            .iter()
            .map(|(k, v)| (k.as_str(), v.display().to_string()))
            .collect();
        let json = serde_json::to_string_pretty(&data).map_err(|e| PathError::WriteSettings {
            path: self.settings_file.clone(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidData, e),
        })?;
        fs::write(&self.settings_file, json).map_err(|source| PathError::WriteSettings {
            path: self.settings_file.clone(),
            source,
        })
    }
}

impl Default for SettingsPathResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl PathResolver for SettingsPathResolver {
    fn resolve(&self, ext: &str) -> Result<PathBuf, PathError> {
        let mut guard = self.paths.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let paths = guard.get_or_insert_with(|| Self::load(&self.settings_file));

        if !paths.contains_key(ext) {
            let fallback = self.downloads_dir.join(ext);
            paths.insert(ext.to_string(), fallback);
            // Persist immediately so the new default survives restarts.
            let snapshot = paths.clone();
            self.save(&snapshot)?;
        }

        let dir = paths[ext].clone();
        fs::create_dir_all(&dir).map_err(|source| PathError::CreateDir { path: dir.clone(), source })?;
        Ok(dir)
    }
}

/// Fixed-directory resolver for tests and one-shot embedders: every
/// extension maps to `{base}/{ext}` with no settings file involved.
pub struct FixedPathResolver {
    base: PathBuf,
}

impl FixedPathResolver {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }
}

impl PathResolver for FixedPathResolver {
    fn resolve(&self, ext: &str) -> Result<PathBuf, PathError> {
        let dir = self.base.join(ext);
        fs::create_dir_all(&dir).map_err(|source| PathError::CreateDir { path: dir.clone(), source })?;
        Ok(dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn resolve_creates_directory_and_persists_mapping() {
        let tmp = TempDir::new().unwrap();
        let resolver = SettingsPathResolver::with_base(tmp.path().join("cfg"), tmp.path().join("dl"));

        let dir = resolver.resolve("mp3").unwrap();
        assert_eq!(dir, tmp.path().join("dl").join("mp3"));
        assert!(dir.is_dir());

        let raw = fs::read_to_string(tmp.path().join("cfg").join("settings.json")).unwrap();
        let map: HashMap<String, String> = serde_json::from_str(&raw).unwrap();
        assert_eq!(map.len(), 1, "only the requested extension is initialized");
        assert!(map.contains_key("mp3"));
    }

    #[test]
    fn existing_settings_take_precedence_over_defaults() {
        let tmp = TempDir::new().unwrap();
        let cfg = tmp.path().join("cfg");
        fs::create_dir_all(&cfg).unwrap();
        let custom = tmp.path().join("elsewhere");
        fs::write(
            cfg.join("settings.json"),
            serde_json::to_string(&HashMap::from([("mp4", custom.display().to_string())])).unwrap(),
        )
        .unwrap();

        let resolver = SettingsPathResolver::with_base(&cfg, tmp.path().join("dl"));
        assert_eq!(resolver.resolve("mp4").unwrap(), custom);
    }

    #[test]
    fn corrupt_settings_fall_back_to_defaults() {
        let tmp = TempDir::new().unwrap();
        let cfg = tmp.path().join("cfg");
        fs::create_dir_all(&cfg).unwrap();
        fs::write(cfg.join("settings.json"), "{not json").unwrap();

        let resolver = SettingsPathResolver::with_base(&cfg, tmp.path().join("dl"));
        let dir = resolver.resolve("jpg").unwrap();
        assert_eq!(dir, tmp.path().join("dl").join("jpg"));
    }

    #[test]
    fn mapping_survives_a_new_resolver_instance() {
        let tmp = TempDir::new().unwrap();
        let cfg = tmp.path().join("cfg");
        {
            let resolver = SettingsPathResolver::with_base(&cfg, tmp.path().join("a"));
            resolver.resolve("wav").unwrap();
        }
        let resolver = SettingsPathResolver::with_base(&cfg, tmp.path().join("b"));
        // Second instance reads the persisted mapping, not its own default.
        assert_eq!(resolver.resolve("wav").unwrap(), tmp.path().join("a").join("wav"));
    }
}
