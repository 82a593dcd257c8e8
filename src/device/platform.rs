use tracing::debug;

use crate::Error;

/// Identifier lookups the host platform answers.
///
/// Each lookup returns the raw value as reported by the platform, `None` when the
/// platform has no such value, or an error when the lookup itself failed (missing
/// permission, missing hardware capability).
pub trait Platform: Send + Sync {
    /// Hardware device identifier (IMEI, MEID or ESN)
    fn device_id(&self) -> Result<Option<Vec<u8>>, Error>;

    /// Serial number of the SIM card
    fn sim_serial_number(&self) -> Result<Option<Vec<u8>>, Error>;

    /// Identifier kept in the platform's secure settings
    fn secure_id(&self) -> Result<Option<Vec<u8>>, Error>;
}

/// The machine this process runs on.
///
/// Only the machine id is available here; a desktop host has neither a SIM card
/// nor a secure settings identifier.
#[must_use]
#[derive(Debug, Default, Clone, Copy)]
pub struct HostPlatform;

impl Platform for HostPlatform {
    fn device_id(&self) -> Result<Option<Vec<u8>>, Error> {
        let uid = machine_uid::get().map_err(|err| Error::Platform(err.to_string()))?;
        let uid = uid.trim();

        debug!("Machine id: `{uid}`");

        if uid.is_empty() {
            Ok(None)
        } else {
            Ok(Some(uid.as_bytes().to_vec()))
        }
    }

    fn sim_serial_number(&self) -> Result<Option<Vec<u8>>, Error> {
        Ok(None)
    }

    fn secure_id(&self) -> Result<Option<Vec<u8>>, Error> {
        Ok(None)
    }
}

/// Values a host has already queried from its telephony and settings services
#[must_use]
#[derive(Debug, Default, Clone)]
pub struct FixedPlatform {
    device_id: Option<Vec<u8>>,
    sim_serial_number: Option<Vec<u8>>,
    secure_id: Option<Vec<u8>>,
}

impl FixedPlatform {
    /// A platform without any identifier
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the hardware device identifier
    pub fn with_device_id<T>(self, device_id: T) -> Self
    where
        T: Into<Vec<u8>>,
    {
        Self {
            device_id: Some(device_id.into()),
            ..self
        }
    }

    /// Set the SIM serial number
    pub fn with_sim_serial_number<T>(self, sim_serial_number: T) -> Self
    where
        T: Into<Vec<u8>>,
    {
        Self {
            sim_serial_number: Some(sim_serial_number.into()),
            ..self
        }
    }

    /// Set the secure settings identifier
    pub fn with_secure_id<T>(self, secure_id: T) -> Self
    where
        T: Into<Vec<u8>>,
    {
        Self {
            secure_id: Some(secure_id.into()),
            ..self
        }
    }
}

impl Platform for FixedPlatform {
    fn device_id(&self) -> Result<Option<Vec<u8>>, Error> {
        Ok(self.device_id.clone())
    }

    fn sim_serial_number(&self) -> Result<Option<Vec<u8>>, Error> {
        Ok(self.sim_serial_number.clone())
    }

    fn secure_id(&self) -> Result<Option<Vec<u8>>, Error> {
        Ok(self.secure_id.clone())
    }
}
