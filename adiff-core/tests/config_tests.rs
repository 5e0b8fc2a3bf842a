use adiff_core::{AugmentConfig, AugmentError, DEFAULT_GENERATOR, DEFAULT_NOTE};
use pretty_assertions::assert_eq;
use std::io::Write;

#[test]
fn defaults_carry_generator_and_note() {
    let config = AugmentConfig::default();
    assert_eq!(config.generator, DEFAULT_GENERATOR);
    assert_eq!(config.note, DEFAULT_NOTE);
    assert!(!config.indent);
    assert!(config.generator.starts_with("Overpass API"));
}

#[test]
fn missing_fields_take_defaults() {
    let config = AugmentConfig::from_toml_str("indent = true\n").unwrap();
    assert_eq!(
        config,
        AugmentConfig {
            indent: true,
            ..AugmentConfig::default()
        }
    );
}

#[test]
fn empty_file_is_the_default() {
    assert_eq!(AugmentConfig::from_toml_str("").unwrap(), AugmentConfig::default());
}

#[test]
fn all_fields_can_be_set() {
    let config = AugmentConfig::from_toml_str(
        "generator = \"custom\"\nnote = \"Some note\"\nindent = false\n",
    )
    .unwrap();
    assert_eq!(config.generator, "custom");
    assert_eq!(config.note, "Some note");
}

#[test]
fn invalid_toml_is_a_config_error() {
    let err = AugmentConfig::from_toml_str("indent = \"sometimes\"").unwrap_err();
    assert!(matches!(err, AugmentError::Config(_)));
}

#[test]
fn load_reads_a_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "generator = \"from file\"").unwrap();
    let config = AugmentConfig::load(file.path()).unwrap();
    assert_eq!(config.generator, "from file");
}

#[test]
fn load_of_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = AugmentConfig::load(&dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, AugmentError::Io(_)));
}
