use std::{env, path::PathBuf};

use directories::ProjectDirs;
use tracing::warn;

use crate::Error;

/// Directory holding the preferences store of `app_name`
pub fn config_dir_path<T>(app_name: T) -> Result<PathBuf, Error>
where
    T: AsRef<str>,
{
    project_dir(app_name.as_ref(), "config", |dirs| dirs.config_dir().to_path_buf())
}

/// Private files directory of `app_name`, where the installation file lives
pub fn data_dir_path<T>(app_name: T) -> Result<PathBuf, Error>
where
    T: AsRef<str>,
{
    project_dir(app_name.as_ref(), "local data", |dirs| {
        dirs.data_local_dir().to_path_buf()
    })
}

fn project_dir<F>(app_name: &str, kind: &str, select: F) -> Result<PathBuf, Error>
where
    F: FnOnce(&ProjectDirs) -> PathBuf,
{
    match ProjectDirs::from("", "", app_name) {
        Some(dirs) => Ok(select(&dirs)),
        None => {
            warn!("Failed to get the path to the project's {kind} directory, using the current working directory");
            Ok(env::current_dir()?)
        }
    }
}
