use anyhow::{anyhow, Result};
use std::path::{Path, PathBuf};

use crate::models::SourceSpec;

/// Validation utilities for command-line inputs
#[derive(Debug, Copy, Clone)]
pub struct InputValidator;

impl InputValidator {
    /// Validate a path the pipeline will write to
    pub fn validate_file_path(path: &Path) -> Result<()> {
        let path_str = path.to_string_lossy();
        if path_str.trim().is_empty() {
            return Err(anyhow!("File path cannot be empty"));
        }

        if path_str.contains('\0') {
            return Err(anyhow!("File path contains a NUL byte"));
        }

        // Check path length
        if path_str.len() > 4096 {
            return Err(anyhow!("File path too long (max 4096 characters)"));
        }

        if path.file_name().is_none() {
            return Err(anyhow!("File path has no file name: {path:?}"));
        }

        Ok(())
    }

    /// Validate a path the pipeline will read from
    pub fn validate_input_file(path: &Path) -> Result<()> {
        Self::validate_file_path(path)?;

        if !path.exists() {
            return Err(anyhow!("Input file does not exist: {path:?}"));
        }

        if !path.is_file() {
            return Err(anyhow!("Input path is not a file: {path:?}"));
        }

        Ok(())
    }

    /// Validate a company or channel provenance tag
    ///
    /// Tags end up as CSV cells and metric labels, so they must be
    /// non-empty single-line text.
    pub fn validate_tag(kind: &str, tag: &str) -> Result<()> {
        if tag.trim().is_empty() {
            return Err(anyhow!("{kind} tag cannot be empty"));
        }

        if tag.len() > 100 {
            return Err(anyhow!("{kind} tag too long (max 100 characters)"));
        }

        if tag.chars().any(char::is_control) {
            return Err(anyhow!("{kind} tag contains control characters"));
        }

        if tag.contains(',') {
            return Err(anyhow!("{kind} tag cannot contain commas"));
        }

        Ok(())
    }

    /// Zip parallel file, company and channel lists into sources
    pub fn validate_source_lists(files: &[PathBuf], companies: &[String], channels: &[String]) -> Result<Vec<SourceSpec>> {
        if files.len() != companies.len() || files.len() != channels.len() {
            return Err(anyhow!(
                "Source lists differ in length: {} files, {} companies, {} channels",
                files.len(),
                companies.len(),
                channels.len()
            ));
        }

        files
            .iter()
            .zip(companies)
            .zip(channels)
            .map(|((file, company), channel)| {
                Self::validate_input_file(file)?;
                Self::validate_tag("Company", company)?;
                Self::validate_tag("Channel", channel)?;
                Ok(SourceSpec::new(company.trim(), channel.trim(), file.clone()))
            })
            .collect()
    }

    /// Validate an annotation timeout in milliseconds
    pub fn validate_timeout_ms(timeout_ms: u64) -> Result<()> {
        if timeout_ms == 0 {
            return Err(anyhow!("Timeout must be greater than 0"));
        }

        if timeout_ms > 600_000 {
            return Err(anyhow!("Timeout too large (max 600000 ms)"));
        }

        Ok(())
    }
}
