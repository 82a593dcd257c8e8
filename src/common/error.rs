use std::path::PathBuf;

use thiserror::Error;

use crate::SourceKind;

/// device-uuid error
#[must_use]
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    StdIo(#[from] std::io::Error),
    #[error(transparent)]
    StdSystemTime(#[from] std::time::SystemTimeError),
    #[error(transparent)]
    TomlDe(#[from] toml::de::Error),
    #[error(transparent)]
    TomlSer(#[from] toml::ser::Error),
    #[error(transparent)]
    Semver(#[from] semver::Error),
    #[error(transparent)]
    Simdutf8(#[from] simdutf8::basic::Utf8Error),
    #[error(transparent)]
    Uuid(#[from] uuid::Error),
    #[error("Platform lookup failed: {0}")]
    Platform(String),
    #[error("The installation file `{}` could not be used: {source}", .path.display())]
    Installation {
        path: PathBuf,
        #[source]
        source: Box<Error>,
    },
    #[error("No identifier could be derived, the `{0}` value is not valid UTF-8")]
    Unresolved(SourceKind),
    #[error("Every identifier source came up empty")]
    Exhausted,
}
