//! Tests for validation.rs module

use std::path::{Path, PathBuf};
use social_sentiment::validation::InputValidator;

#[test]
fn test_validate_file_path_valid() {
    assert!(InputValidator::validate_file_path(Path::new("output/joined.csv")).is_ok());
}

#[test]
fn test_validate_file_path_empty() {
    assert!(InputValidator::validate_file_path(Path::new("")).is_err());
}

#[test]
fn test_validate_file_path_too_long() {
    let long = "a".repeat(4097);
    assert!(InputValidator::validate_file_path(Path::new(&long)).is_err());
}

#[test]
fn test_validate_input_file_missing() {
    let dir = tempfile::tempdir().expect("tempdir");
    assert!(InputValidator::validate_input_file(&dir.path().join("absent.json")).is_err());
}

#[test]
fn test_validate_input_file_directory() {
    let dir = tempfile::tempdir().expect("tempdir");
    assert!(InputValidator::validate_input_file(dir.path()).is_err());
}

#[test]
fn test_validate_tag_rejects_comma() {
    assert!(InputValidator::validate_tag("Company", "nike,adidas").is_err());
}

#[test]
fn test_validate_tag_too_long() {
    assert!(InputValidator::validate_tag("Channel", &"x".repeat(101)).is_err());
}

#[test]
fn test_source_lists_length_mismatch() {
    let files = vec![PathBuf::from("a.csv"), PathBuf::from("b.csv")];
    let companies = vec!["nike".to_string()];
    let channels = vec!["facebook".to_string(), "tweet".to_string()];

    let err = InputValidator::validate_source_lists(&files, &companies, &channels).expect_err("mismatch");
    assert!(err.to_string().contains("differ in length"));
}

#[test]
fn test_source_lists_zip_in_order() {
    let dir = tempfile::tempdir().expect("tempdir");
    let first = dir.path().join("a.csv");
    let second = dir.path().join("b.csv");
    std::fs::write(&first, "id\n").expect("write");
    std::fs::write(&second, "id\n").expect("write");

    let sources = InputValidator::validate_source_lists(
        &[first.clone(), second.clone()],
        &["nike".to_string(), " adidas ".to_string()],
        &["facebook".to_string(), "tweet".to_string()],
    )
    .expect("valid lists");

    assert_eq!(sources.len(), 2);
    assert_eq!(sources[0].path, first);
    assert_eq!(sources[1].company, "adidas");
    assert_eq!(sources[1].channel, "tweet");
}

#[test]
fn test_source_lists_empty_is_ok() {
    let sources = InputValidator::validate_source_lists(&[], &[], &[]).expect("empty lists");
    assert!(sources.is_empty());
}

#[test]
fn test_validate_timeout_upper_bound() {
    assert!(InputValidator::validate_timeout_ms(600_000).is_ok());
    assert!(InputValidator::validate_timeout_ms(600_001).is_err());
}
