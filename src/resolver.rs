use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;
use tracing::debug;

use crate::config::CacheConfig;
use crate::domain::{DatasetVariant, FetchRequest};
use crate::error::SampleDataError;
use crate::fetch::Fetcher;
use crate::progress::{ProgressEvent, ProgressSink};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AcquireAction {
    Cache,
    Download,
}

#[derive(Debug, Clone, Serialize)]
pub struct AcquireResult {
    pub variant: DatasetVariant,
    pub action: AcquireAction,
    pub path: Utf8PathBuf,
    pub url: String,
    pub bytes: Option<u64>,
    pub downloaded_at: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusResult {
    pub cache_dir: Utf8PathBuf,
    pub entries: Vec<StatusEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusEntry {
    pub variant: DatasetVariant,
    pub path: Utf8PathBuf,
    pub url: String,
    pub cached: bool,
    pub size: Option<u64>,
}

pub trait SampleLoader {
    type Output;

    fn load(&self, path: &Utf8Path) -> Result<Self::Output, SampleDataError>;
}

impl<T, F> SampleLoader for F
where
    F: Fn(&Utf8Path) -> Result<T, SampleDataError>,
{
    type Output = T;

    fn load(&self, path: &Utf8Path) -> Result<T, SampleDataError> {
        self(path)
    }
}

#[derive(Clone)]
pub struct CacheResolver<F: Fetcher> {
    config: CacheConfig,
    fetcher: F,
}

impl<F: Fetcher> CacheResolver<F> {
    pub fn new(config: CacheConfig, fetcher: F) -> Self {
        Self { config, fetcher }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub fn resolve(
        &self,
        variant: DatasetVariant,
        overwrite: bool,
        sink: &dyn ProgressSink,
    ) -> Result<Utf8PathBuf, SampleDataError> {
        self.acquire(variant, overwrite, sink).map(|result| result.path)
    }

    pub fn acquire(
        &self,
        variant: DatasetVariant,
        overwrite: bool,
        sink: &dyn ProgressSink,
    ) -> Result<AcquireResult, SampleDataError> {
        let source = self.config.source(variant);
        let path = self.config.local_path(variant);
        debug!(%variant, %path, overwrite, "resolving dataset");

        if !overwrite && path.as_std_path().exists() {
            let message = format!("File {path} already exists. Skipping download.");
            debug!(%path, "cache hit");
            sink.event(ProgressEvent::Notice(message));
            return Ok(AcquireResult {
                variant,
                action: AcquireAction::Cache,
                path,
                url: source.url.clone(),
                bytes: None,
                downloaded_at: None,
            });
        }

        fs::create_dir_all(self.config.cache_dir().as_std_path()).map_err(|err| {
            SampleDataError::Filesystem(format!("create {}: {err}", self.config.cache_dir()))
        })?;

        let request = FetchRequest::new(path.clone(), source.url.clone());
        let bytes = self.fetcher.fetch(&request, sink)?;

        Ok(AcquireResult {
            variant,
            action: AcquireAction::Download,
            path,
            url: source.url.clone(),
            bytes: Some(bytes),
            downloaded_at: Some(chrono::Utc::now().to_rfc3339()),
        })
    }

    pub fn load_sample<L: SampleLoader>(
        &self,
        variant: DatasetVariant,
        loader: &L,
        sink: &dyn ProgressSink,
    ) -> Result<L::Output, SampleDataError> {
        let path = self.resolve(variant, false, sink)?;
        loader.load(&path)
    }

    pub fn status(&self) -> Result<StatusResult, SampleDataError> {
        let entries = DatasetVariant::ALL
            .into_iter()
            .map(|variant| {
                let path = self.config.local_path(variant);
                let size = match fs::metadata(path.as_std_path()) {
                    Ok(meta) if meta.is_file() => Some(meta.len()),
                    Ok(_) => None,
                    Err(err) if err.kind() == std::io::ErrorKind::NotFound => None,
                    Err(err) => {
                        return Err(SampleDataError::Filesystem(format!("stat {path}: {err}")));
                    }
                };
                Ok(StatusEntry {
                    variant,
                    url: self.config.source(variant).url.clone(),
                    cached: size.is_some(),
                    size,
                    path,
                })
            })
            .collect::<Result<Vec<_>, SampleDataError>>()?;

        Ok(StatusResult {
            cache_dir: self.config.cache_dir().to_path_buf(),
            entries,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::progress::SilentProgress;

    #[derive(Default)]
    struct MockFetcher {
        calls: Mutex<Vec<String>>,
    }

    impl Fetcher for MockFetcher {
        fn fetch(
            &self,
            request: &FetchRequest,
            _sink: &dyn ProgressSink,
        ) -> Result<u64, SampleDataError> {
            self.calls.lock().unwrap().push(request.url.clone());
            fs::write(request.destination.as_std_path(), b"frames").unwrap();
            Ok(6)
        }
    }

    #[test]
    fn cache_hit_skips_fetch() {
        let temp = tempfile::tempdir().unwrap();
        let cache_dir = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).unwrap();
        let config = CacheConfig::new(cache_dir);
        fs::write(config.local_path(DatasetVariant::Reduced), b"data").unwrap();

        let resolver = CacheResolver::new(config, MockFetcher::default());
        let result = resolver
            .acquire(DatasetVariant::Reduced, false, &SilentProgress)
            .unwrap();

        assert_eq!(result.action, AcquireAction::Cache);
        assert!(result.bytes.is_none());
        assert!(resolver.fetcher().calls.lock().unwrap().is_empty());
    }

    #[test]
    fn status_reports_cached_sizes() {
        let temp = tempfile::tempdir().unwrap();
        let cache_dir = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).unwrap();
        let resolver = CacheResolver::new(CacheConfig::new(cache_dir), MockFetcher::default());
        resolver
            .resolve(DatasetVariant::Full, false, &SilentProgress)
            .unwrap();

        let status = resolver.status().unwrap();
        assert_eq!(status.entries.len(), 2);
        let full = &status.entries[0];
        assert_eq!(full.variant, DatasetVariant::Full);
        assert!(full.cached);
        assert_eq!(full.size, Some(6));
        let reduced = &status.entries[1];
        assert!(!reduced.cached);
        assert_eq!(reduced.size, None);
    }
}
