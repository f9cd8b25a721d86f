use std::collections::BTreeMap;

use crate::Result;
use crate::archive::{category_of, volume_tag};
use crate::timestamp::{display, parse_timestamp};

/// Archive filename → `last-modified` header value.
pub type TarfileMap = BTreeMap<String, String>;

/// Volume tag → registry `last_updated` value.
pub type VolumeMap = BTreeMap<String, String>;

/// Archive filename → data category whose volume must be (re)built.
pub type VolumesToCreate = BTreeMap<String, String>;

/// Existing volumes as reported by the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VolumeListing {
    /// The tag listing endpoint could not be queried.
    Unavailable,
    Found(VolumeMap),
}

impl VolumeListing {
    pub fn volumes(&self) -> Option<&VolumeMap> {
        match self {
            Self::Unavailable => None,
            Self::Found(map) => Some(map),
        }
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.volumes()
            .into_iter()
            .flat_map(|map| map.keys().map(String::as_str))
    }
}

/// Decide which archives need a fresh volume.
///
/// A volume is rebuilt when its tag is missing or when it was last updated
/// strictly before its archive was last modified.
pub fn plan_rebuilds(
    version: &str,
    tarfiles: &TarfileMap,
    volumes: &VolumeListing,
) -> Result<VolumesToCreate> {
    let mut to_create = VolumesToCreate::new();

    for (tarfile, last_modified) in tarfiles {
        let Some(category) = category_of(tarfile) else {
            tracing::warn!(%tarfile, "no category in archive name, skipping");
            continue;
        };
        let tag = volume_tag(version, category);

        let Some(last_updated) = volumes.volumes().and_then(|v| v.get(&tag)) else {
            tracing::info!(%tag, "data volume does not exist, creating it");
            to_create.insert(tarfile.clone(), category.to_owned());
            continue;
        };

        let volume_time = parse_timestamp(last_updated)?;
        let tarfile_time = parse_timestamp(last_modified)?;
        tracing::info!(
            %tag,
            volume_time = %display(&volume_time),
            tarfile_time = %display(&tarfile_time),
            "comparing timestamps"
        );

        if volume_time < tarfile_time {
            tracing::info!(
                %tarfile,
                %tag,
                "archive changed since volume was created, regenerating"
            );
            to_create.insert(tarfile.clone(), category.to_owned());
        }
    }

    Ok(to_create)
}
