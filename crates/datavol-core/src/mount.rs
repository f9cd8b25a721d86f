use std::collections::BTreeMap;
use std::path::Path;

use crate::{Error, Result};

/// Category → mount directory relative to the data root.
pub type MountDirectoryMap = BTreeMap<String, String>;

/// Parse `category:relative/path` lines. Only the first colon separates.
pub fn parse_mount_map(text: &str) -> Result<MountDirectoryMap> {
    let mut map = MountDirectoryMap::new();
    for line in text.lines() {
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }
        let (category, path) = line
            .split_once(':')
            .ok_or_else(|| Error::MalformedMountLine {
                line: line.to_owned(),
            })?;
        map.insert(category.to_owned(), path.to_owned());
    }
    Ok(map)
}

/// Absolute mount point for a mapped directory, without trailing slash.
pub fn mount_point(data_dir: &str, relative: &str) -> String {
    let joined = Path::new(data_dir).join(relative);
    joined.to_string_lossy().trim_end_matches('/').to_owned()
}
