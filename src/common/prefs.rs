use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use parking_lot::RwLock;
use semver::{Version, VersionReq};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::Error;

/// Private key-value store scoped to one application
pub trait Preferences: Send + Sync {
    /// Get the string stored at `key`
    fn get_string(&self, key: &str) -> Result<Option<String>, Error>;

    /// Store `value` at `key` and commit it
    fn put_string(&self, key: &str, value: &str) -> Result<(), Error>;
}

#[must_use]
#[derive(Serialize, Deserialize)]
struct PrefsFile {
    version: Version,
    #[serde(default)]
    values: BTreeMap<String, String>,
}

/// Preferences kept in a TOML file named after the store
#[must_use]
pub struct TomlPreferences {
    path: PathBuf,
    values: RwLock<BTreeMap<String, String>>,
}

impl TomlPreferences {
    const FILE_EXTENSION: &str = "toml";
    const PREFS_VERSION: &str = "0.1.0";

    /// Open the store `name` inside `dir`, loading it if it already exists
    pub fn open<T, E>(dir: T, name: E) -> Result<Self, Error>
    where
        T: AsRef<Path>,
        E: AsRef<str>,
    {
        let mut path = dir.as_ref().join(name.as_ref());
        path.set_extension(TomlPreferences::FILE_EXTENSION);

        let values = TomlPreferences::load(&path)?;

        Ok(Self {
            path,
            values: RwLock::new(values),
        })
    }

    /// Location of the backing file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(path: &Path) -> Result<BTreeMap<String, String>, Error> {
        if !path.exists() {
            info!("The preferences file will be created at: `{}`", path.display());
            return Ok(BTreeMap::new());
        }

        info!("The preferences file is located at: `{}`", path.display());

        let prefs = fs::read_to_string(path)?;
        let prefs: PrefsFile = toml::from_str(&prefs)?;

        let req = VersionReq::parse(&format!("^{}", TomlPreferences::PREFS_VERSION))?;
        if req.matches(&prefs.version) {
            Ok(prefs.values)
        } else {
            warn!(
                "Ignoring the preferences file because its version `{}` is incompatible",
                prefs.version
            );
            Ok(BTreeMap::new())
        }
    }

    fn commit(&self, values: &BTreeMap<String, String>) -> Result<(), Error> {
        let prefs = PrefsFile {
            version: Version::parse(TomlPreferences::PREFS_VERSION)?,
            values: values.clone(),
        };

        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::write(&self.path, toml::to_string(&prefs)?)?;

        info!("Save the preferences file at: `{}`", self.path.display());

        Ok(())
    }
}

impl Preferences for TomlPreferences {
    fn get_string(&self, key: &str) -> Result<Option<String>, Error> {
        Ok(self.values.read().get(key).cloned())
    }

    fn put_string(&self, key: &str, value: &str) -> Result<(), Error> {
        let mut values = self.values.write();

        // Only a committed value becomes visible to readers
        let mut updated = values.clone();
        updated.insert(key.to_string(), value.to_string());
        self.commit(&updated)?;

        *values = updated;
        Ok(())
    }
}
