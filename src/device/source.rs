use std::{fmt, sync::Arc};

use tracing::{debug, info, warn};

use crate::{Error, Installation, Platform};

/// Secure settings identifier that many devices of one buggy platform build share
pub const SECURE_ID_SENTINEL: &str = "9774d56d682e549c";

/// Where an identifier comes from, in order of preference
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    /// Hardware device identifier
    DeviceId,
    /// SIM serial number
    SimSerialNumber,
    /// Platform secure settings identifier
    SecureId,
    /// Locally generated installation marker
    Installation,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SourceKind::DeviceId => "device id",
            SourceKind::SimSerialNumber => "SIM serial number",
            SourceKind::SecureId => "secure id",
            SourceKind::Installation => "installation",
        };

        f.write_str(name)
    }
}

/// One link of the fallback chain
pub trait IdSource: Send + Sync {
    /// Which source this is
    fn kind(&self) -> SourceKind;

    /// Raw bytes of the identifier, or `None` to fall through to the next source.
    /// An error aborts the whole resolution.
    fn probe(&self) -> Result<Option<Vec<u8>>, Error>;
}

/// A lookup answered by the host [`Platform`]
#[must_use]
pub struct PlatformSource {
    platform: Arc<dyn Platform>,
    kind: SourceKind,
    lookup: Lookup,
}

type Lookup = fn(&dyn Platform) -> Result<Option<Vec<u8>>, Error>;

impl PlatformSource {
    /// Hardware device identifier source
    pub fn device_id(platform: Arc<dyn Platform>) -> Self {
        Self {
            platform,
            kind: SourceKind::DeviceId,
            lookup: |platform| platform.device_id(),
        }
    }

    /// SIM serial number source
    pub fn sim_serial_number(platform: Arc<dyn Platform>) -> Self {
        Self {
            platform,
            kind: SourceKind::SimSerialNumber,
            lookup: |platform| platform.sim_serial_number(),
        }
    }

    /// Secure settings identifier source, rejecting [`SECURE_ID_SENTINEL`]
    pub fn secure_id(platform: Arc<dyn Platform>) -> Self {
        Self {
            platform,
            kind: SourceKind::SecureId,
            lookup: |platform| platform.secure_id(),
        }
    }
}

impl IdSource for PlatformSource {
    fn kind(&self) -> SourceKind {
        self.kind
    }

    fn probe(&self) -> Result<Option<Vec<u8>>, Error> {
        let value = match (self.lookup)(self.platform.as_ref()) {
            Ok(value) => value,
            Err(err) => {
                warn!("The {} lookup failed, treating it as absent: {err}", self.kind);
                return Ok(None);
            }
        };

        if self.kind == SourceKind::DeviceId {
            match value.as_deref() {
                Some(bytes) => debug!("deviceId={}", String::from_utf8_lossy(bytes)),
                None => debug!("deviceId=null"),
            }
        }

        if self.kind == SourceKind::SecureId
            && value.as_deref() == Some(SECURE_ID_SENTINEL.as_bytes())
        {
            info!("Ignoring the well-known broken secure id `{SECURE_ID_SENTINEL}`");
            return Ok(None);
        }

        Ok(value)
    }
}

impl IdSource for Installation {
    fn kind(&self) -> SourceKind {
        SourceKind::Installation
    }

    fn probe(&self) -> Result<Option<Vec<u8>>, Error> {
        Ok(Some(self.id()?.as_bytes().to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io;

    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;
    use tracing::Level;

    use crate::FixedPlatform;

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    struct Denied;

    impl Platform for Denied {
        fn device_id(&self) -> Result<Option<Vec<u8>>, Error> {
            Err(Error::Platform(String::from("READ_PHONE_STATE not granted")))
        }

        fn sim_serial_number(&self) -> Result<Option<Vec<u8>>, Error> {
            Err(Error::Platform(String::from("READ_PHONE_STATE not granted")))
        }

        fn secure_id(&self) -> Result<Option<Vec<u8>>, Error> {
            Err(Error::Platform(String::from("no settings provider")))
        }
    }

    #[test]
    fn each_source_reads_its_own_value() -> Result<(), Error> {
        let platform: Arc<dyn Platform> = Arc::new(
            FixedPlatform::new()
                .with_device_id("imei")
                .with_sim_serial_number("iccid")
                .with_secure_id("android"),
        );

        assert_eq!(
            PlatformSource::device_id(Arc::clone(&platform)).probe()?,
            Some(b"imei".to_vec())
        );
        assert_eq!(
            PlatformSource::sim_serial_number(Arc::clone(&platform)).probe()?,
            Some(b"iccid".to_vec())
        );
        assert_eq!(
            PlatformSource::secure_id(platform).probe()?,
            Some(b"android".to_vec())
        );

        Ok(())
    }

    #[test]
    fn device_id_is_logged() -> Result<(), Error> {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        let platform: Arc<dyn Platform> =
            Arc::new(FixedPlatform::new().with_device_id("359881030314356"));
        let value = tracing::subscriber::with_default(subscriber, || {
            PlatformSource::device_id(platform).probe()
        })?;
        assert_eq!(value, Some(b"359881030314356".to_vec()));

        let logs = String::from_utf8_lossy(&captured.0.lock()).to_string();
        assert!(logs.contains("deviceId=359881030314356"), "{logs}");

        Ok(())
    }

    #[test]
    fn lookup_failure_is_absence() -> Result<(), Error> {
        let platform: Arc<dyn Platform> = Arc::new(Denied);

        assert_eq!(PlatformSource::device_id(Arc::clone(&platform)).probe()?, None);
        assert_eq!(
            PlatformSource::sim_serial_number(Arc::clone(&platform)).probe()?,
            None
        );
        assert_eq!(PlatformSource::secure_id(platform).probe()?, None);

        Ok(())
    }

    #[test]
    fn sentinel_secure_id_is_rejected() -> Result<(), Error> {
        let platform: Arc<dyn Platform> =
            Arc::new(FixedPlatform::new().with_secure_id(SECURE_ID_SENTINEL));
        let source = PlatformSource::secure_id(platform);

        assert_eq!(source.kind(), SourceKind::SecureId);
        assert_eq!(source.probe()?, None);

        Ok(())
    }

    #[test]
    fn sentinel_is_only_special_for_secure_id() -> Result<(), Error> {
        let platform: Arc<dyn Platform> =
            Arc::new(FixedPlatform::new().with_device_id(SECURE_ID_SENTINEL));

        assert_eq!(
            PlatformSource::device_id(platform).probe()?,
            Some(SECURE_ID_SENTINEL.as_bytes().to_vec())
        );

        Ok(())
    }

    #[test]
    fn installation_source() -> Result<(), Error> {
        let dir = TempDir::new()?;
        let installation = Installation::new(dir.path());

        let bytes = installation.probe()?;
        assert_eq!(bytes.as_deref(), Some(installation.id()?.as_bytes()));
        assert_eq!(installation.kind(), SourceKind::Installation);

        Ok(())
    }
}
