use std::time::Duration;

use assert_matches::assert_matches;
use camino::Utf8PathBuf;

use mps_sample_data::config::{ConfigLoader, ConfigOverrides};
use mps_sample_data::domain::DatasetVariant;
use mps_sample_data::error::SampleDataError;

#[test]
fn explicit_config_file_is_loaded() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("custom.json");
    std::fs::write(
        &path,
        r#"{
            "timeout_secs": 120,
            "datasets": {
                "full": { "url": "https://mirror.example/sample.nd2", "file_name": "sample.nd2" }
            }
        }"#,
    )
    .unwrap();

    let overrides = ConfigOverrides {
        cache_dir: Some(Utf8PathBuf::from("/srv/mps")),
        timeout_secs: None,
    };
    let config = ConfigLoader::resolve(path.to_str(), overrides).unwrap();

    assert_eq!(config.timeout, Some(Duration::from_secs(120)));
    assert_eq!(
        config.local_path(DatasetVariant::Full),
        Utf8PathBuf::from("/srv/mps/sample.nd2")
    );
    assert_eq!(
        config.source(DatasetVariant::Full).url,
        "https://mirror.example/sample.nd2"
    );
    assert!(
        config
            .source(DatasetVariant::Reduced)
            .url
            .starts_with("https://www.dropbox.com/")
    );
}

#[test]
fn explicit_config_file_must_exist() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("absent.json");

    let err = ConfigLoader::resolve(path.to_str(), ConfigOverrides::default()).unwrap_err();
    assert_matches!(err, SampleDataError::ConfigRead(_));
}

#[test]
fn malformed_config_is_rejected() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("broken.json");
    std::fs::write(&path, "{ \"cache_dir\": 12 ").unwrap();

    let err = ConfigLoader::resolve(path.to_str(), ConfigOverrides::default()).unwrap_err();
    assert_matches!(err, SampleDataError::ConfigParse(_));
}
