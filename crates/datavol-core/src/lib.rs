//! Core types and decisions for datavol.
//!
//! This crate holds the run configuration ([`Settings`]), the branch →
//! data version mapping, archive naming rules, and the staleness check
//! that turns two timestamp listings into a rebuild plan. Nothing here
//! touches the network or spawns processes.

pub mod archive;
pub mod branch;
pub mod config;
pub mod error;
pub mod mount;
pub mod plan;
pub mod report;
pub mod timestamp;

pub use archive::DuplicateFilter;
pub use branch::{DataTarget, resolve_branch, search_url, select_target};
pub use config::{BranchConfig, BuildConfig, Settings, SourceConfig, TrimMode};
pub use error::{Error, Result};
pub use mount::MountDirectoryMap;
pub use plan::{TarfileMap, VolumeListing, VolumeMap, VolumesToCreate, plan_rebuilds};
pub use report::{BatchError, RebuildReport, RebuildStep, VolumeFailure};
