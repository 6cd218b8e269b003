use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use directories::BaseDirs;
use serde::Deserialize;

use crate::domain::{DatasetSource, DatasetVariant};
use crate::error::SampleDataError;

pub const CONFIG_FILE_NAME: &str = "mps-sample-data.json";
pub const CACHE_DIR_ENV: &str = "MPS_SAMPLE_DATA_DIR";

const FULL_FILE_NAME: &str = "Count00000_Point2C_ChannelBF_Seq0015.nd2";
const FULL_URL: &str = "https://www.dropbox.com/scl/fi/d885qvngi3oqfdc8fnxin/Count00000_Point2C_ChannelBF_Seq0015.nd2?rlkey=yb9dmf3zj597idte89cba73wx&dl=1";
const REDUCED_FILE_NAME: &str = "Count00000_Point2C_ChannelBF_Seq0015.npy";
const REDUCED_URL: &str = "https://www.dropbox.com/scl/fi/dy9e3vqyjf57bih3i36iz/Count00000_Point2C_ChannelBF_Seq0015.npy?rlkey=2415vstljhbm2lmt1b06ytxfj&&dl=1";

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub cache_dir: Option<String>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub datasets: DatasetOverrides,
}

#[derive(Debug, Default, Deserialize)]
pub struct DatasetOverrides {
    #[serde(default)]
    pub full: Option<DatasetSource>,
    #[serde(default)]
    pub reduced: Option<DatasetSource>,
}

#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub cache_dir: Option<Utf8PathBuf>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub cache_dir: Utf8PathBuf,
    pub full: DatasetSource,
    pub reduced: DatasetSource,
    pub timeout: Option<Duration>,
}

impl CacheConfig {
    pub fn new(cache_dir: impl Into<Utf8PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            full: default_source(DatasetVariant::Full),
            reduced: default_source(DatasetVariant::Reduced),
            timeout: None,
        }
    }

    pub fn source(&self, variant: DatasetVariant) -> &DatasetSource {
        match variant {
            DatasetVariant::Full => &self.full,
            DatasetVariant::Reduced => &self.reduced,
        }
    }

    pub fn cache_dir(&self) -> &Utf8Path {
        &self.cache_dir
    }

    pub fn local_path(&self, variant: DatasetVariant) -> Utf8PathBuf {
        self.cache_dir.join(&self.source(variant).file_name)
    }

    pub fn default_cache_dir() -> Result<Utf8PathBuf, SampleDataError> {
        BaseDirs::new()
            .and_then(|dirs| {
                Utf8PathBuf::from_path_buf(dirs.home_dir().join(".cache").join("mps-sample-data"))
                    .ok()
            })
            .ok_or_else(|| {
                SampleDataError::Filesystem("unable to resolve cache directory".to_string())
            })
    }
}

pub fn default_source(variant: DatasetVariant) -> DatasetSource {
    let (url, file_name) = match variant {
        DatasetVariant::Full => (FULL_URL, FULL_FILE_NAME),
        DatasetVariant::Reduced => (REDUCED_URL, REDUCED_FILE_NAME),
    };
    DatasetSource {
        url: url.to_string(),
        file_name: file_name.to_string(),
    }
}

fn is_plain_file_name(name: &str) -> bool {
    let mut components = Utf8Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Utf8Component::Normal(_)), None)
    )
}

pub struct ConfigLoader;

impl ConfigLoader {
    pub fn resolve(
        path: Option<&str>,
        overrides: ConfigOverrides,
    ) -> Result<CacheConfig, SampleDataError> {
        let config_path = match path {
            Some(path) => PathBuf::from(path),
            None => PathBuf::from(CONFIG_FILE_NAME),
        };

        let config = if path.is_some() || config_path.exists() {
            let content = fs::read_to_string(&config_path)
                .map_err(|_| SampleDataError::ConfigRead(config_path.clone()))?;
            serde_json::from_str(&content)
                .map_err(|err| SampleDataError::ConfigParse(err.to_string()))?
        } else {
            Config::default()
        };

        let env_dir = std::env::var(CACHE_DIR_ENV)
            .ok()
            .filter(|value| !value.trim().is_empty());
        Self::resolve_config(config, overrides, env_dir)
    }

    pub fn resolve_config(
        config: Config,
        overrides: ConfigOverrides,
        env_dir: Option<String>,
    ) -> Result<CacheConfig, SampleDataError> {
        let cache_dir = match overrides.cache_dir {
            Some(dir) => dir,
            None => match env_dir.or(config.cache_dir) {
                Some(dir) => Utf8PathBuf::from(dir.trim()),
                None => CacheConfig::default_cache_dir()?,
            },
        };

        let full = config
            .datasets
            .full
            .unwrap_or_else(|| default_source(DatasetVariant::Full));
        let reduced = config
            .datasets
            .reduced
            .unwrap_or_else(|| default_source(DatasetVariant::Reduced));
        for source in [&full, &reduced] {
            if source.file_name.trim().is_empty() || source.url.trim().is_empty() {
                return Err(SampleDataError::ConfigParse(
                    "dataset entries need both url and file_name".to_string(),
                ));
            }
            if !is_plain_file_name(&source.file_name) {
                return Err(SampleDataError::ConfigParse(format!(
                    "dataset file_name must be a bare file name inside the cache directory: {}",
                    source.file_name
                )));
            }
        }

        Ok(CacheConfig {
            cache_dir,
            full,
            reduced,
            timeout: overrides
                .timeout_secs
                .or(config.timeout_secs)
                .map(Duration::from_secs),
        })
    }
}
