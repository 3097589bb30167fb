use std::{
    env::{self, VarError},
    fs::{self, File},
    io,
    path::{Path, PathBuf},
    time::Duration,
};

use platform_dirs::AppDirs;
use serde::{Deserialize, Serialize};

use crate::{
    error::Error, recent::DEFAULT_MAX_RECENT_ITEMS, router::RouterOptions, search::SearchOptions,
};

const APP_NAME: &str = "Finnav";
const CONFIG_FILENAME: &str = "config.json";
const STORAGE_DIRNAME: &str = "storage";
const PROXY_ENV_VAR: &str = "HTTPS_PROXY";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL or directory that instrument `contentRef`s resolve against.
    pub content_base: String,
    pub catalog_path: Option<PathBuf>,
    pub debounce_ms: u64,
    pub max_recent_items: usize,
    pub results_per_group: usize,
    pub view_all_threshold: usize,
    pub recent_rows: usize,
    pub discard_stale_responses: bool,
    pub fetch_timeout_secs: u64,
    pub fetch_threads: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            content_base: "http://localhost:8000/".to_string(),
            catalog_path: None,
            debounce_ms: 200,
            max_recent_items: DEFAULT_MAX_RECENT_ITEMS,
            results_per_group: 5,
            view_all_threshold: 10,
            recent_rows: 5,
            discard_stale_responses: false,
            fetch_timeout_secs: 5,
            fetch_threads: 4,
        }
    }
}

impl Config {
    fn app_dirs() -> Option<AppDirs> {
        const USE_XDG_ON_MACOS: bool = false;

        AppDirs::new(Some(APP_NAME), USE_XDG_ON_MACOS)
    }

    pub fn config_dir() -> Option<PathBuf> {
        Self::app_dirs().map(|dirs| dirs.config_dir)
    }

    /// Where the persistent store keeps its entries.
    pub fn storage_dir() -> Option<PathBuf> {
        Self::app_dirs().map(|dirs| dirs.data_dir.join(STORAGE_DIRNAME))
    }

    fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join(CONFIG_FILENAME))
    }

    pub fn load() -> Result<Option<Config>, Error> {
        let path = Self::config_path().ok_or_else(no_config_dir)?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Option<Config>, Error> {
        match File::open(path) {
            Ok(file) => {
                log::info!("loading config: {:?}", path);
                Ok(Some(serde_json::from_reader(file)?))
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    pub fn save(&self) -> Result<(), Error> {
        let path = Self::config_path().ok_or_else(no_config_dir)?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), Error> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let file = File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    pub fn router_options(&self) -> RouterOptions {
        RouterOptions {
            max_recent_items: self.max_recent_items,
            discard_stale_responses: self.discard_stale_responses,
        }
    }

    pub fn search_options(&self) -> SearchOptions {
        SearchOptions {
            debounce: Duration::from_millis(self.debounce_ms),
            results_per_group: self.results_per_group,
            view_all_threshold: self.view_all_threshold,
            recent_rows: self.recent_rows,
        }
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn proxy() -> Option<String> {
        env::var(PROXY_ENV_VAR).map_or_else(
            |err| match err {
                VarError::NotPresent => None,
                VarError::NotUnicode(_) => {
                    log::error!("proxy URL is not a valid unicode");
                    None
                }
            },
            Some,
        )
    }
}

fn no_config_dir() -> Error {
    Error::IoError(io::Error::new(
        io::ErrorKind::NotFound,
        "no configuration directory on this platform",
    ))
}
