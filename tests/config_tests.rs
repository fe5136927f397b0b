use quillq::config::Config;
use quillq::file::printer::{Printer, PrinterOptions};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_default_config() {
    let config = Config::default();
    assert_eq!(config.indent_size, 2);
    assert!(config.document_separators);
    assert!(config.unwrap_scalars);
    assert_eq!(config.log_level, "warn");
}

#[test]
fn test_save_and_load_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("config.toml");
    let config = Config {
        indent_size: 4,
        document_separators: false,
        unwrap_scalars: false,
        log_level: "quillq=debug".to_string(),
    };

    config.save_to(&path).unwrap();
    assert!(path.exists());
    assert_eq!(Config::load_from(&path), config);
}

#[test]
fn test_missing_file_gives_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.toml");
    assert_eq!(Config::load_from(&path), Config::default());
}

#[test]
fn test_invalid_file_gives_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "indent_size = \"wide\"\n").unwrap();
    assert_eq!(Config::load_from(&path), Config::default());
}

#[test]
fn test_partial_file_keeps_other_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "document_separators = false\n").unwrap();

    let config = Config::load_from(&path);
    assert!(!config.document_separators);
    assert_eq!(config.indent_size, 2);
}

#[test]
fn test_printer_options_follow_config() {
    let config = Config {
        indent_size: 3,
        unwrap_scalars: false,
        ..Config::default()
    };
    let options = PrinterOptions::from_config(&config);
    assert_eq!(options.indent_size, 3);
    assert!(!options.unwrap_scalars);
    assert_eq!(Printer::new(options).options().indent_size, 3);
}
