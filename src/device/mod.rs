mod installation;
mod platform;
mod source;

use std::{path::PathBuf, sync::Arc};

use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::{name_uuid_from_bytes, Error, Preferences, Timing, TomlPreferences};

pub use installation::*;
pub use platform::*;
pub use source::*;

/// Resolves the identifier of this device and keeps it.
///
/// The first call looks for a previously stored identifier, then walks the source
/// chain until one of them yields a value, derives a name-based identifier from it and
/// stores the result. Every later call returns the same value without touching any
/// source. Share one factory per process, by reference or behind an [`Arc`].
#[must_use]
pub struct DeviceUuidFactory {
    prefs: Box<dyn Preferences>,
    sources: Vec<Box<dyn IdSource>>,

    uuid: OnceCell<Uuid>,
    lock: Mutex<()>,
}

impl DeviceUuidFactory {
    /// Name of the preferences store holding the identifier
    pub const PREFS_FILE: &str = "device_id";
    /// Key of the identifier inside [`Self::PREFS_FILE`]
    pub const PREFS_DEVICE_ID: &str = "device_id";

    /// Create a factory for `app_name` with default locations and the host platform
    pub fn builder<T>(app_name: T) -> DeviceUuidFactoryBuilder
    where
        T: AsRef<str>,
    {
        DeviceUuidFactoryBuilder::new(app_name)
    }

    /// Create a factory from explicit collaborators, `sources` being tried in order
    pub fn new(prefs: Box<dyn Preferences>, sources: Vec<Box<dyn IdSource>>) -> Self {
        Self {
            prefs,
            sources,
            uuid: OnceCell::new(),
            lock: Mutex::new(()),
        }
    }

    /// The standard chain: device id, SIM serial number, secure id, installation
    #[must_use]
    pub fn source_chain(
        platform: Arc<dyn Platform>,
        installation: Installation,
    ) -> Vec<Box<dyn IdSource>> {
        let sources: [Box<dyn IdSource>; 4] = [
            Box::new(PlatformSource::device_id(Arc::clone(&platform))),
            Box::new(PlatformSource::sim_serial_number(Arc::clone(&platform))),
            Box::new(PlatformSource::secure_id(platform)),
            Box::new(installation),
        ];

        sources.into()
    }

    /// Identifier of this device
    pub fn uuid(&self) -> Result<Uuid, Error> {
        if let Some(uuid) = self.uuid.get() {
            return Ok(*uuid);
        }

        let _guard = self.lock.lock();
        if let Some(uuid) = self.uuid.get() {
            return Ok(*uuid);
        }

        let uuid = self.resolve()?;
        // Only this thread sets the value while it holds the lock
        let _ = self.uuid.set(uuid);

        Ok(uuid)
    }

    fn resolve(&self) -> Result<Uuid, Error> {
        let timing = Timing::new();

        if let Some(old_id) = self.prefs.get_string(DeviceUuidFactory::PREFS_DEVICE_ID)? {
            debug!("Using the stored device id `{old_id}`");
            return Ok(Uuid::parse_str(&old_id)?);
        }

        let (kind, uuid) = self.derive()?;
        self.prefs.put_string(
            DeviceUuidFactory::PREFS_DEVICE_ID,
            &uuid.hyphenated().to_string(),
        )?;

        match timing.elapsed() {
            Ok(elapsed) => info!("Device id derived from the {kind} in `{elapsed}`"),
            Err(err) => info!("Device id derived from the {kind}, timing unavailable: {err}"),
        }

        Ok(uuid)
    }

    fn derive(&self) -> Result<(SourceKind, Uuid), Error> {
        for source in &self.sources {
            let kind = source.kind();

            let bytes = match source.probe()? {
                Some(bytes) => bytes,
                None => {
                    debug!("No {kind} available, trying the next source");
                    continue;
                }
            };

            // An undecodable value ends the chain instead of falling through,
            // the next call probes again
            return match simdutf8::basic::from_utf8(&bytes) {
                Ok(text) => Ok((kind, name_uuid_from_bytes(text))),
                Err(err) => {
                    error!("The {kind} is not valid UTF-8: {err}");
                    Err(Error::Unresolved(kind))
                }
            };
        }

        Err(Error::Exhausted)
    }
}

/// Locations and platform used by a [`DeviceUuidFactory`]
#[must_use]
pub struct DeviceUuidFactoryBuilder {
    app_name: String,
    prefs_dir: Option<PathBuf>,
    files_dir: Option<PathBuf>,
    platform: Arc<dyn Platform>,
}

impl DeviceUuidFactoryBuilder {
    pub(crate) fn new<T>(app_name: T) -> Self
    where
        T: AsRef<str>,
    {
        Self {
            app_name: app_name.as_ref().to_string(),
            prefs_dir: None,
            files_dir: None,
            platform: Arc::new(HostPlatform),
        }
    }

    /// Directory of the preferences store, the app's config directory by default
    pub fn prefs_dir<T>(self, prefs_dir: T) -> Self
    where
        T: Into<PathBuf>,
    {
        Self {
            prefs_dir: Some(prefs_dir.into()),
            ..self
        }
    }

    /// Directory of the installation file, the app's local data directory by default
    pub fn files_dir<T>(self, files_dir: T) -> Self
    where
        T: Into<PathBuf>,
    {
        Self {
            files_dir: Some(files_dir.into()),
            ..self
        }
    }

    /// Platform answering the identifier lookups, [`HostPlatform`] by default
    pub fn platform<T>(self, platform: T) -> Self
    where
        T: Platform + 'static,
    {
        Self {
            platform: Arc::new(platform),
            ..self
        }
    }

    /// Open the preferences store and assemble the source chain
    pub fn build(self) -> Result<DeviceUuidFactory, Error> {
        let prefs_dir = match self.prefs_dir {
            Some(dir) => dir,
            None => crate::config_dir_path(&self.app_name)?,
        };
        let files_dir = match self.files_dir {
            Some(dir) => dir,
            None => crate::data_dir_path(&self.app_name)?,
        };

        let prefs = TomlPreferences::open(prefs_dir, DeviceUuidFactory::PREFS_FILE)?;
        let installation = Installation::new(files_dir);
        let sources = DeviceUuidFactory::source_chain(self.platform, installation);

        Ok(DeviceUuidFactory::new(Box::new(prefs), sources))
    }
}
