use anyhow::Result;
use tracing::warn;

use device_uuid::DeviceUuidFactory;

fn main() -> Result<()> {
    tracing_subscriber::fmt().init();

    let factory = DeviceUuidFactory::builder("device-uuid-demo").build()?;

    let device_id_str = factory.uuid()?.to_string();
    warn!("deviceIdStr={device_id_str}");

    Ok(())
}
