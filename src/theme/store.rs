//! Persisted theme preference and the active presentation.
//!
//! `PreferenceStore` is the only owner of the active palette: it is
//! initialized once at startup and changes only through [`PreferenceStore::apply`].

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use tracing::{debug, info, warn};

use super::{ColorSchemeSignal, ResolvedTheme, ThemeColors, ThemePreference};

/// Storage key for the theme preference.
pub const THEME_KEY: &str = "theme";

/// Device-local key/value store. A missing key is a valid state.
pub trait PreferenceStorage {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()>;
}

/// Flat TOML table on disk.
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn read_table(&self) -> anyhow::Result<toml::Table> {
        if !self.path.exists() {
            return Ok(toml::Table::new());
        }
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("reading {}", self.path.display()))?;
        let table = content
            .parse::<toml::Table>()
            .with_context(|| format!("parsing {}", self.path.display()))?;
        Ok(table)
    }
}

impl PreferenceStorage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        match self.read_table() {
            Ok(table) => table.get(key).and_then(|v| v.as_str()).map(str::to_string),
            Err(e) => {
                warn!(error = %e, "failed to read preferences");
                None
            }
        }
    }

    fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        // A corrupt file is replaced rather than blocking the write
        let mut table = self.read_table().unwrap_or_default();
        table.insert(key.to_string(), toml::Value::String(value.to_string()));

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        fs::write(&self.path, toml::to_string(&table)?)
            .with_context(|| format!("writing {}", self.path.display()))?;
        Ok(())
    }
}

/// Storage that forgets everything, used when no home directory exists.
#[derive(Default)]
pub struct MemoryStorage {
    values: std::collections::HashMap<String, String>,
}

impl PreferenceStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

pub struct PreferenceStore {
    storage: Box<dyn PreferenceStorage>,
    signal: Box<dyn ColorSchemeSignal>,
    preference: ThemePreference,
    resolved: ResolvedTheme,
    colors: ThemeColors,
}

impl PreferenceStore {
    /// Load the stored preference and apply it.
    pub fn init(storage: Box<dyn PreferenceStorage>, signal: Box<dyn ColorSchemeSignal>) -> Self {
        let mut store = Self {
            storage,
            signal,
            preference: ThemePreference::Light,
            resolved: ResolvedTheme::Light,
            colors: ResolvedTheme::Light.colors(),
        };
        let preference = store.load();
        store.apply(preference);
        store
    }

    /// The persisted preference, `Light` when absent or unrecognized.
    pub fn load(&self) -> ThemePreference {
        match self.storage.get(THEME_KEY) {
            Some(raw) => ThemePreference::from_stored(&raw).unwrap_or_else(|| {
                debug!(value = %raw, "unrecognized stored theme, using light");
                ThemePreference::Light
            }),
            None => ThemePreference::Light,
        }
    }

    /// Resolve `preference` now and make it the active presentation.
    pub fn apply(&mut self, preference: ThemePreference) -> ResolvedTheme {
        let resolved = match preference {
            ThemePreference::Light => ResolvedTheme::Light,
            ThemePreference::Dark => ResolvedTheme::Dark,
            ThemePreference::Auto => {
                if self.signal.prefers_dark() {
                    ResolvedTheme::Dark
                } else {
                    ResolvedTheme::Light
                }
            }
        };
        self.preference = preference;
        self.resolved = resolved;
        self.colors = resolved.colors();
        info!(preference = %preference, resolved = resolved.as_str(), "theme applied");
        resolved
    }

    /// Persist the raw preference. Failures are logged, not surfaced.
    pub fn save(&mut self, preference: ThemePreference) {
        if let Err(e) = self.storage.set(THEME_KEY, preference.as_str()) {
            warn!(error = %e, preference = %preference, "failed to persist theme");
        }
    }

    pub fn preference(&self) -> ThemePreference {
        self.preference
    }

    pub fn resolved(&self) -> ResolvedTheme {
        self.resolved
    }

    pub fn colors(&self) -> &ThemeColors {
        &self.colors
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    /// Signal whose answer can be flipped from the test.
    #[derive(Clone, Default)]
    pub struct FixedSignal(pub Rc<Cell<bool>>);

    impl ColorSchemeSignal for FixedSignal {
        fn prefers_dark(&self) -> bool {
            self.0.get()
        }
    }

    pub fn memory_store(prefers_dark: bool) -> (PreferenceStore, FixedSignal) {
        let signal = FixedSignal(Rc::new(Cell::new(prefers_dark)));
        let store = PreferenceStore::init(
            Box::new(MemoryStorage::default()),
            Box::new(signal.clone()),
        );
        (store, signal)
    }

    #[test]
    fn test_default_is_light() {
        let (store, _) = memory_store(true);
        assert_eq!(store.load(), ThemePreference::Light);
        assert_eq!(store.resolved(), ResolvedTheme::Light);
        assert_eq!(store.colors(), &ResolvedTheme::Light.colors());
    }

    #[test]
    fn test_apply_fixed_preferences() {
        for prefers_dark in [false, true] {
            let (mut store, _) = memory_store(prefers_dark);
            assert_eq!(store.apply(ThemePreference::Light), ResolvedTheme::Light);
            assert_eq!(store.apply(ThemePreference::Dark), ResolvedTheme::Dark);
            assert_eq!(store.colors(), &ResolvedTheme::Dark.colors());
        }
    }

    #[test]
    fn test_auto_samples_signal_at_apply_time() {
        let (mut store, signal) = memory_store(false);
        assert_eq!(store.apply(ThemePreference::Auto), ResolvedTheme::Light);

        // Changing the signal alone does not re-resolve
        signal.0.set(true);
        assert_eq!(store.resolved(), ResolvedTheme::Light);

        assert_eq!(store.apply(ThemePreference::Auto), ResolvedTheme::Dark);
        assert_eq!(store.preference(), ThemePreference::Auto);
    }

    #[test]
    fn test_save_load_round_trip() {
        let (mut store, _) = memory_store(true);
        for pref in ThemePreference::ALL {
            store.save(pref);
            assert_eq!(store.load(), pref);
        }
    }

    #[test]
    fn test_auto_is_stored_unresolved() {
        let mut storage = MemoryStorage::default();
        storage.set(THEME_KEY, "auto").unwrap();
        let signal = FixedSignal(Rc::new(Cell::new(true)));
        let store = PreferenceStore::init(Box::new(storage), Box::new(signal));
        assert_eq!(store.preference(), ThemePreference::Auto);
        assert_eq!(store.resolved(), ResolvedTheme::Dark);
    }

    #[test]
    fn test_unrecognized_value_loads_light() {
        let mut storage = MemoryStorage::default();
        storage.set(THEME_KEY, "neon").unwrap();
        let signal = FixedSignal::default();
        let store = PreferenceStore::init(Box::new(storage), Box::new(signal));
        assert_eq!(store.load(), ThemePreference::Light);
    }

    #[test]
    fn test_file_storage_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/preferences.toml");

        let mut storage = FileStorage::new(path.clone());
        assert_eq!(storage.get(THEME_KEY), None);
        storage.set(THEME_KEY, "dark").unwrap();
        storage.set("other", "kept").unwrap();

        let reopened = FileStorage::new(path);
        assert_eq!(reopened.get(THEME_KEY).as_deref(), Some("dark"));
        assert_eq!(reopened.get("other").as_deref(), Some("kept"));
    }

    #[test]
    fn test_file_storage_survives_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preferences.toml");
        fs::write(&path, "this is = = not toml").unwrap();

        let mut storage = FileStorage::new(path);
        assert_eq!(storage.get(THEME_KEY), None);
        storage.set(THEME_KEY, "auto").unwrap();
        assert_eq!(storage.get(THEME_KEY).as_deref(), Some("auto"));
    }

    #[test]
    fn test_persisted_across_sessions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preferences.toml");

        let mut first = PreferenceStore::init(
            Box::new(FileStorage::new(path.clone())),
            Box::new(FixedSignal::default()),
        );
        first.save(ThemePreference::Dark);
        first.apply(ThemePreference::Dark);

        let second = PreferenceStore::init(
            Box::new(FileStorage::new(path)),
            Box::new(FixedSignal::default()),
        );
        assert_eq!(second.preference(), ThemePreference::Dark);
        assert_eq!(second.resolved(), ResolvedTheme::Dark);
    }
}
