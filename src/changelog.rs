//! Changelog entry rendering and patch version calculation

use chrono::{NaiveDate, Utc};
use std::path::Path;

use crate::error::FileSystemError;

/// Increment the patch component of a dotted version
///
/// Missing or non-numeric components read as zero, so `""` becomes `0.0.1`.
/// Anything after the third component is dropped. Components are kept as
/// decimal digit strings, so arbitrarily long numbers carry instead of
/// overflowing.
pub fn calculate_new_version(current: &str) -> String {
    let mut parts = current.split('.');
    let mut next = || {
        parts
            .next()
            .map(leading_digits)
            .unwrap_or_else(|| "0".to_string())
    };
    let (major, minor, patch) = (next(), next(), next());

    format!("{}.{}.{}", major, minor, increment_digits(&patch))
}

/// Leading digits of a component without leading zeros, `"3-beta"` reads as `3`
fn leading_digits(component: &str) -> String {
    let digits: String = component
        .trim_start()
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();

    match digits.trim_start_matches('0') {
        "" => "0".to_string(),
        significant => significant.to_string(),
    }
}

/// Add one to a non-empty string of decimal digits
fn increment_digits(digits: &str) -> String {
    let mut bytes = digits.as_bytes().to_vec();

    let mut carry = true;
    for digit in bytes.iter_mut().rev() {
        if *digit == b'9' {
            *digit = b'0';
        } else {
            *digit += 1;
            carry = false;
            break;
        }
    }
    if carry {
        bytes.insert(0, b'1');
    }

    bytes.into_iter().map(char::from).collect()
}

/// Render the entry prepended to the changelog
pub fn render_entry(version: &str, date: NaiveDate, packages: &[String]) -> String {
    format!(
        "# {} / {}\n\n### :tada: Enhancements\n- Updated dependencies: {}\n\n",
        version,
        date.format("%Y-%m-%d"),
        packages.join(", ")
    )
}

/// Writes release entries to the project changelog
#[derive(Debug, Clone)]
pub struct ChangelogWriter<'a> {
    path: Option<&'a Path>,
}

impl<'a> ChangelogWriter<'a> {
    pub fn new(path: Option<&'a Path>) -> Self {
        Self { path }
    }

    /// Prepend an entry for the next patch version of `current_version`
    pub fn update_changelog(
        &self,
        current_version: &str,
        updated_packages: &[String],
    ) -> Result<(), FileSystemError> {
        self.update_changelog_on(current_version, updated_packages, Utc::now().date_naive())
    }

    /// Same as [`update_changelog`](Self::update_changelog) with a fixed date
    pub fn update_changelog_on(
        &self,
        current_version: &str,
        updated_packages: &[String],
        date: NaiveDate,
    ) -> Result<(), FileSystemError> {
        let Some(path) = self.path else {
            log::debug!("No changelog file specified, skipping changelog update");
            return Ok(());
        };

        let new_version = calculate_new_version(current_version);
        let entry = render_entry(&new_version, date, updated_packages);

        prepend(path, &entry).inspect_err(|e| {
            log::error!("Failed to update changelog: {}", e);
        })?;

        log::debug!("Changelog updated with version {}", new_version);
        Ok(())
    }
}

fn prepend(path: &Path, entry: &str) -> Result<(), FileSystemError> {
    let existing = if path.exists() {
        std::fs::read(path).map_err(|e| FileSystemError::read(path, e))?
    } else {
        Vec::new()
    };

    let mut content = Vec::with_capacity(entry.len() + existing.len());
    content.extend_from_slice(entry.as_bytes());
    content.extend_from_slice(&existing);

    std::fs::write(path, content).map_err(|e| FileSystemError::write(path, e))
}
