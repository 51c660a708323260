//! Integration tests for config loading from fixture files.
//!
//! These tests verify that the sample config file parses into the massrename config.

use std::fs;
use std::path::Path;

use mass_rename::mass_rename::MassRenameConfig;

/// Read the sample config file content.
fn read_sample_config() -> String {
    let config_path = Path::new("tests/fixtures/sample_config.toml");
    fs::read_to_string(config_path).expect("Failed to read sample config file")
}

#[test]
fn sample_config_file_exists() {
    let config_path = Path::new("tests/fixtures/sample_config.toml");
    assert!(config_path.exists(), "Sample config file should exist");
}

#[test]
fn sample_config_is_valid_toml() {
    let config_content = read_sample_config();
    let result: Result<toml::Value, _> = toml::from_str(&config_content);
    assert!(result.is_ok(), "Sample config should be valid TOML: {:?}", result.err());
}

#[test]
fn massrename_section_has_expected_structure() {
    let config_content = read_sample_config();
    let value: toml::Value = toml::from_str(&config_content).expect("should parse");

    let section = value.get("massrename").expect("should have massrename section");

    for key in ["dryrun", "force", "ignorecase", "recursive", "verbose"] {
        assert!(section.get(key).is_some(), "massrename section should have {key}");
    }
}

#[test]
fn sample_config_parses_into_massrename_config() {
    let config = MassRenameConfig::from_toml_str(&read_sample_config()).expect("should parse");
    assert!(config.ignorecase);
    assert!(config.recursive);
    assert!(!config.force);
    assert!(!config.dryrun);
    assert!(!config.verbose);
}
