//! Archive filename rules: which listing entries count as data tarballs and
//! which data category each one carries.

/// Archives with more digits than this are treated as dated duplicates.
pub const DEFAULT_MAX_DIGITS: usize = 7;

/// Flags archives whose names carry too many digits.
///
/// Dated copies such as `sample_data-obs-20240101.tgz` sit next to the
/// current archive in the listing and must not produce volumes of their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DuplicateFilter {
    pub max_digits: usize,
}

impl DuplicateFilter {
    pub fn new(max_digits: usize) -> Self {
        Self { max_digits }
    }

    pub fn is_duplicate(&self, filename: &str) -> bool {
        filename.chars().filter(char::is_ascii_digit).count() > self.max_digits
    }
}

impl Default for DuplicateFilter {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DIGITS)
    }
}

pub fn is_candidate(name: &str, prefix: &str, extension: &str) -> bool {
    name.starts_with(prefix) && name.ends_with(extension)
}

/// Data category of an archive: the second `-` separated segment of the
/// filename stem. `sample_data-met_tool_wrapper-5.1.tgz` gives
/// `met_tool_wrapper`.
pub fn category_of(filename: &str) -> Option<&str> {
    let stem = match filename.rfind('.') {
        Some(idx) if idx > 0 => &filename[..idx],
        _ => filename,
    };
    stem.split('-').nth(1)
}

/// Volume tag published for `category` under `version`.
pub fn volume_tag(version: &str, category: &str) -> String {
    format!("{version}-{category}")
}
