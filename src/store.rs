// src/store.rs

//! Template store: loads and indexes profile definitions.
//!
//! Profiles live as `<id>.toml` files in a directory (or are handed in
//! directly for embedded use). Validation happens at load: a definition
//! missing required fields or carrying malformed CSS is skipped with a
//! warning, fatal for that one template but never for the store. `reload`
//! swaps in a new immutable snapshot; `Arc<Profile>` handles fetched
//! earlier keep pointing at the old snapshot, so in-flight verification
//! runs are never disturbed.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use crate::error::Result;
use crate::models::Profile;

type Snapshot = Arc<HashMap<String, Arc<Profile>>>;

/// Read-mostly collection of loaded profiles.
pub struct TemplateStore {
    dir: Option<PathBuf>,
    snapshot: RwLock<Snapshot>,
}

impl TemplateStore {
    /// Load every `*.toml` profile definition in a directory.
    ///
    /// An unreadable directory is an error; an invalid file is not.
    pub fn from_dir(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        let map = load_dir(&dir)?;
        Ok(Self {
            dir: Some(dir),
            snapshot: RwLock::new(Arc::new(map)),
        })
    }

    /// Build an in-memory store from already-constructed profiles.
    pub fn from_profiles(profiles: impl IntoIterator<Item = Profile>) -> Self {
        let map = profiles
            .into_iter()
            .map(|p| (p.meta.id.clone(), Arc::new(p)))
            .collect();
        Self {
            dir: None,
            snapshot: RwLock::new(Arc::new(map)),
        }
    }

    /// Enumerate known profile ids, sorted.
    pub fn list_profile_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.read().keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Look up one profile. A missing id is `None`, never an error.
    pub fn get(&self, id: &str) -> Option<Arc<Profile>> {
        self.read().get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Re-read the backing directory and swap in a new snapshot.
    ///
    /// A no-op for in-memory stores.
    pub fn reload(&self) -> Result<()> {
        let Some(dir) = &self.dir else {
            return Ok(());
        };
        let map = load_dir(dir)?;
        *self
            .snapshot
            .write()
            .expect("template store lock poisoned") = Arc::new(map);
        Ok(())
    }

    fn read(&self) -> Snapshot {
        Arc::clone(&self.snapshot.read().expect("template store lock poisoned"))
    }
}

fn load_dir(dir: &Path) -> Result<HashMap<String, Arc<Profile>>> {
    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().and_then(|e| e.to_str()) == Some("toml"))
        .collect();
    paths.sort();

    let mut map = HashMap::new();
    for path in paths {
        let origin = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("profile")
            .to_string();
        let source = match std::fs::read_to_string(&path) {
            Ok(source) => source,
            Err(e) => {
                log::warn!("skipping unreadable profile {}: {}", path.display(), e);
                continue;
            }
        };
        match Profile::from_toml(&source, &origin) {
            Ok(profile) => {
                let id = profile.meta.id.clone();
                if map.insert(id.clone(), Arc::new(profile)).is_some() {
                    log::warn!(
                        "duplicate profile id '{}' in {}, keeping the later file",
                        id,
                        dir.display()
                    );
                }
            }
            Err(e) => log::warn!("skipping invalid profile {}: {}", path.display(), e),
        }
    }
    log::debug!("loaded {} profiles from {}", map.len(), dir.display());
    Ok(map)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    const ALPHA: &str = r#"
        [meta]
        id = "alpha"
        family = "Alpha"

        [verify]
        url_contains = "alpha"
    "#;

    const BETA: &str = r#"
        [meta]
        id = "beta"
        family = "Beta"
        version = "2"

        [verify]
        title_contains = "beta"
    "#;

    fn write_profiles(dir: &Path) {
        fs::write(dir.join("alpha.toml"), ALPHA).unwrap();
        fs::write(dir.join("beta.toml"), BETA).unwrap();
        // Missing family: must be skipped, not fatal.
        fs::write(
            dir.join("broken.toml"),
            "[meta]\nid = \"broken\"\n\n[verify]\nurl_contains = \"x\"\n",
        )
        .unwrap();
        fs::write(dir.join("notes.txt"), "not a profile").unwrap();
    }

    #[test]
    fn test_load_dir_skips_invalid_files() {
        let tmp = tempfile::tempdir().unwrap();
        write_profiles(tmp.path());

        let store = TemplateStore::from_dir(tmp.path()).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.list_profile_ids(), vec!["alpha", "beta"]);
        assert!(store.get("broken").is_none());
    }

    #[test]
    fn test_get_missing_is_none() {
        let store = TemplateStore::from_profiles(vec![]);
        assert!(store.get("ghost").is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_reload_picks_up_new_definitions() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("alpha.toml"), ALPHA).unwrap();

        let store = TemplateStore::from_dir(tmp.path()).unwrap();
        assert_eq!(store.len(), 1);

        fs::write(tmp.path().join("beta.toml"), BETA).unwrap();
        store.reload().unwrap();
        assert_eq!(store.list_profile_ids(), vec!["alpha", "beta"]);
    }

    #[test]
    fn test_reload_does_not_disturb_handed_out_profiles() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("alpha.toml"), ALPHA).unwrap();

        let store = TemplateStore::from_dir(tmp.path()).unwrap();
        let before = store.get("alpha").unwrap();
        assert_eq!(before.meta.version, "1");

        let updated = ALPHA.replace("family = \"Alpha\"", "family = \"Alpha\"\nversion = \"9\"");
        fs::write(tmp.path().join("alpha.toml"), updated).unwrap();
        store.reload().unwrap();

        // The old handle is an intact old snapshot...
        assert_eq!(before.meta.version, "1");
        // ...while new lookups see the new definition.
        assert_eq!(store.get("alpha").unwrap().meta.version, "9");
    }

    #[test]
    fn test_in_memory_reload_is_noop() {
        let src = r#"
            [meta]
            id = "solo"
            family = "Solo"

            [verify]
            url_contains = "solo"
        "#;
        let profile = Profile::from_toml(src, "solo").unwrap();
        let store = TemplateStore::from_profiles(vec![profile]);
        store.reload().unwrap();
        assert_eq!(store.len(), 1);
    }
}
