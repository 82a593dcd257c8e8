//! Stable per-device identifier.
//!
//! [`DeviceUuidFactory`] resolves an identifier from the best source available on the
//! device (hardware id, SIM serial number, secure settings id, and finally a random
//! installation marker), derives a name-based UUID from it and stores the result so
//! it never changes afterwards.
//!
//! ```no_run
//! use device_uuid::{DeviceUuidFactory, Error};
//!
//! fn main() -> Result<(), Error> {
//!     let factory = DeviceUuidFactory::builder("my-app").build()?;
//!     println!("{}", factory.uuid()?);
//!     Ok(())
//! }
//! ```

mod common;
mod device;

pub use common::*;
pub use device::*;
