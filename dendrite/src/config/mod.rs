mod error;
mod log;

use std::path::{Path, PathBuf};

use resolve_path::PathResolveExt;
use serde::{Deserialize, Serialize};
use snafu::ResultExt;

pub use self::{error::Error, log::LogConfig};
use crate::{CLI_CONFIG_NAME, PROJECT_CONFIG_DIR, fallback_project_config_directories};

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Parameters file used when a command is not given one explicitly.
    pub default_params_file: Option<PathBuf>,

    #[serde(default = "LogConfig::default")]
    pub log: LogConfig,
}

impl Config {
    pub fn search_config_file_path() -> PathBuf {
        let paths = vec![Self::default_path()]
            .into_iter()
            .chain(fallback_project_config_directories().into_iter().map(|mut path| {
                path.push(CLI_CONFIG_NAME);
                path
            }))
            .collect::<Vec<_>>();
        for path in paths {
            let Ok(exists) = path.try_exists() else {
                continue;
            };
            if exists {
                return path;
            }
        }
        Self::default_path()
    }

    #[inline]
    pub fn default_path() -> PathBuf {
        [PROJECT_CONFIG_DIR.to_path_buf(), PathBuf::from(CLI_CONFIG_NAME)].into_iter().collect()
    }

    #[inline]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let mut config: Self = {
            let path =
                path.as_ref().try_resolve().map(|path| path.to_path_buf()).with_context(|_| {
                    error::ResolveFilePathSnafu { file_path: path.as_ref().to_path_buf() }
                })?;
            let data =
                std::fs::read(&path).context(error::OpenConfigSnafu { filename: path.clone() })?;
            serde_yaml::from_slice(&data).context(error::ParseConfigSnafu { filename: path })?
        };

        config.log.file_path = match config.log.file_path.map(|path| {
            path.try_resolve()
                .map(|path| path.to_path_buf())
                .with_context(|_| error::ResolveFilePathSnafu { file_path: path.clone() })
        }) {
            Some(Ok(path)) => Some(path),
            Some(Err(err)) => return Err(err),
            None => None,
        };

        Ok(config)
    }

    /// Like [`load`](Self::load), except that a missing file yields the
    /// default configuration instead of an error. Used for the searched
    /// default locations, where having no configuration file at all is
    /// legitimate.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        match path.as_ref().try_exists() {
            Ok(true) => Self::load(path),
            _ => Ok(Self::default()),
        }
    }

    /// Returns the default configuration rendered as YAML, for
    /// `dendrite default-config`.
    #[must_use]
    pub fn template_basic() -> Vec<u8> {
        serde_yaml::to_string(&Self::default()).map_or_else(|_| Vec::new(), String::into_bytes)
    }
}
