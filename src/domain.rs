use std::fmt;
use std::str::FromStr;

use camino::Utf8PathBuf;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::SampleDataError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DatasetVariant {
    Full,
    Reduced,
}

impl DatasetVariant {
    pub const ALL: [DatasetVariant; 2] = [DatasetVariant::Full, DatasetVariant::Reduced];

    pub fn as_str(self) -> &'static str {
        match self {
            DatasetVariant::Full => "full",
            DatasetVariant::Reduced => "reduced",
        }
    }
}

impl fmt::Display for DatasetVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DatasetVariant {
    type Err = SampleDataError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "full" | "full-resolution" | "nd2" => Ok(DatasetVariant::Full),
            "reduced" | "reduced-resolution" | "low-res" | "npy" => Ok(DatasetVariant::Reduced),
            _ => Err(SampleDataError::InvalidVariant(value.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DatasetSource {
    pub url: String,
    pub file_name: String,
}

#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub destination: Utf8PathBuf,
    pub url: String,
    pub description: Option<String>,
}

impl FetchRequest {
    pub fn new(destination: Utf8PathBuf, url: impl Into<String>) -> Self {
        Self {
            destination,
            url: url.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn label(&self) -> String {
        match &self.description {
            Some(description) => description.clone(),
            None => format!("Download data to {}", self.destination),
        }
    }
}
