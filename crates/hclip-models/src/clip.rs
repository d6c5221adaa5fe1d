//! Clip file naming.

use std::collections::HashSet;

/// Suffix appended to every cut clip filename.
pub const CLIP_SUFFIX: &str = "_highlight.mp4";

/// Fallback stem for titles that sanitize to nothing.
const EMPTY_TITLE_STEM: &str = "highlight";

/// Sanitize a title for use in filenames.
///
/// Keeps ASCII alphanumerics, `-` and `_`; whitespace runs become a single
/// `_`; everything else (quotes, `?`, `:`, `!`, slashes, ...) is dropped.
pub fn sanitize_filename_title(title: &str) -> String {
    title
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace() || *c == '-' || *c == '_')
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .to_lowercase()
        .chars()
        .take(50) // Limit length
        .collect()
}

/// Assigns unique clip filenames within one run.
///
/// Titles that sanitize to an already used stem get `_2`, `_3`, ... appended
/// in the order they are named, so the same highlight list always maps to the
/// same filenames.
#[derive(Debug, Default)]
pub struct ClipNamer {
    used: HashSet<String>,
}

impl ClipNamer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a filename for `title` that has not been handed out before.
    pub fn filename_for(&mut self, title: &str) -> String {
        let mut stem = sanitize_filename_title(title);
        if stem.is_empty() {
            stem = EMPTY_TITLE_STEM.to_string();
        }

        let mut candidate = stem.clone();
        let mut index = 2u32;
        while !self.used.insert(candidate.clone()) {
            candidate = format!("{}_{}", stem, index);
            index += 1;
        }

        format!("{}{}", candidate, CLIP_SUFFIX)
    }
}
