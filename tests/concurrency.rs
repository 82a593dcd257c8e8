use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Barrier,
    },
    thread,
};

use anyhow::Result;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

use device_uuid::{
    DeviceUuidFactory, Error, FixedPlatform, Installation, Preferences, TomlPreferences,
    SECURE_ID_SENTINEL,
};

const THREADS: usize = 16;

struct CountingPreferences {
    inner: TomlPreferences,
    writes: Arc<AtomicUsize>,
}

impl Preferences for CountingPreferences {
    fn get_string(&self, key: &str) -> Result<Option<String>, Error> {
        self.inner.get_string(key)
    }

    fn put_string(&self, key: &str, value: &str) -> Result<(), Error> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.put_string(key, value)
    }
}

#[test]
fn concurrent_first_use() -> Result<()> {
    let dir = TempDir::new()?;
    let writes = Arc::new(AtomicUsize::new(0));

    let prefs = CountingPreferences {
        inner: TomlPreferences::open(dir.path(), DeviceUuidFactory::PREFS_FILE)?,
        writes: Arc::clone(&writes),
    };
    // Sentinel secure id, so every thread would end up on the random marker path
    let sources = DeviceUuidFactory::source_chain(
        Arc::new(FixedPlatform::new().with_secure_id(SECURE_ID_SENTINEL)),
        Installation::new(dir.path().join("files")),
    );
    let factory = DeviceUuidFactory::new(Box::new(prefs), sources);

    let barrier = Barrier::new(THREADS);
    let uuids = thread::scope(|scope| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                scope.spawn(|| {
                    barrier.wait();
                    factory.uuid()
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|handle| handle.join().expect("resolver thread panicked"))
            .collect::<Result<Vec<_>, Error>>()
    })?;

    assert_eq!(uuids.len(), THREADS);
    assert!(uuids.iter().all(|uuid| *uuid == uuids[0]));
    assert_eq!(writes.load(Ordering::SeqCst), 1);

    Ok(())
}

#[test]
fn shared_behind_arc() -> Result<()> {
    let dir = TempDir::new()?;
    let factory = Arc::new(
        DeviceUuidFactory::builder("device-uuid-test")
            .prefs_dir(dir.path())
            .files_dir(dir.path())
            .platform(FixedPlatform::new().with_device_id("990000862471854"))
            .build()?,
    );

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let factory = Arc::clone(&factory);
            thread::spawn(move || factory.uuid())
        })
        .collect();

    let expected = factory.uuid()?;
    for handle in handles {
        let uuid = handle.join().expect("resolver thread panicked")?;
        assert_eq!(uuid, expected);
    }

    Ok(())
}
