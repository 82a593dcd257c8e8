use md5::{Digest, Md5};
use uuid::{Builder, Uuid};

/// Name-based (version 3) identifier of `name`.
///
/// Unlike `Uuid::new_v3`, the MD5 digest is taken over the bytes alone, without a
/// namespace prefix.
#[must_use]
pub fn name_uuid_from_bytes<T>(name: T) -> Uuid
where
    T: AsRef<[u8]>,
{
    let mut md5_bytes = [0; 16];
    md5_bytes.copy_from_slice(&Md5::digest(name.as_ref()));

    Builder::from_md5_bytes(md5_bytes).into_uuid()
}
