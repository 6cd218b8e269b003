pub mod config;
pub mod domain;
pub mod error;
pub mod fetch;
pub mod output;
pub mod progress;
pub mod resolver;

pub use config::{CacheConfig, ConfigLoader, ConfigOverrides};
pub use domain::{DatasetSource, DatasetVariant, FetchRequest};
pub use error::SampleDataError;
pub use fetch::{Fetcher, HttpFetcher};
pub use resolver::{AcquireAction, AcquireResult, CacheResolver, SampleLoader};
