use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use once_cell::sync::OnceCell;
use tracing::info;
use uuid::Uuid;

use crate::Error;

/// Random identifier generated on first use and kept in the app's files directory.
///
/// Unlike hardware identifiers it is scoped to one installation: clearing the app's
/// private storage or reinstalling produces a new one.
#[must_use]
pub struct Installation {
    path: PathBuf,
    id: OnceCell<String>,
}

impl Installation {
    pub const FILE_NAME: &str = "INSTALLATION";

    /// Installation marker kept inside `files_dir`
    pub fn new<T>(files_dir: T) -> Self
    where
        T: AsRef<Path>,
    {
        Self {
            path: files_dir.as_ref().join(Installation::FILE_NAME),
            id: OnceCell::new(),
        }
    }

    /// Location of the marker file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The marker, creating the file the first time.
    ///
    /// The file is read at most once per `Installation`. Any failure is fatal:
    /// a replacement marker is never made up when the file cannot be used.
    pub fn id(&self) -> Result<&str, Error> {
        self.id
            .get_or_try_init(|| {
                self.get_or_create().map_err(|err| Error::Installation {
                    path: self.path.clone(),
                    source: Box::new(err),
                })
            })
            .map(String::as_str)
    }

    fn get_or_create(&self) -> Result<String, Error> {
        if !self.path.exists() {
            self.write_installation_file()?;
        }

        self.read_installation_file()
    }

    fn read_installation_file(&self) -> Result<String, Error> {
        let bytes = fs::read(&self.path)?;
        Ok(simdutf8::basic::from_utf8(&bytes)?.to_string())
    }

    fn write_installation_file(&self) -> Result<(), Error> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }

        let id = Uuid::new_v4().hyphenated().to_string();

        let mut file = File::options()
            .write(true)
            .create_new(true)
            .open(&self.path)?;
        file.write_all(id.as_bytes())?;

        info!("The installation file is created at: `{}`", self.path.display());

        Ok(())
    }
}
