use std::path::PathBuf;

use crate::{Error, Result};

pub const ENV_BRANCH_NAME: &str = "INPUT_BRANCH_NAME";
pub const ENV_DATA_REPO_DEV: &str = "INPUT_DATA_REPO_DEV";
pub const ENV_DATA_REPO_STABLE: &str = "INPUT_DATA_REPO_STABLE";
pub const ENV_USE_FEATURE_DATA: &str = "INPUT_USE_FEATURE_DATA";
pub const ENV_REPO_NAME: &str = "INPUT_REPO_NAME";
pub const ENV_DATA_PREFIX: &str = "INPUT_DATA_PREFIX";
pub const ENV_TAG_MAX_PAGES: &str = "INPUT_TAG_MAX_PAGES";
pub const ENV_DOCKER_DATA_DIR: &str = "INPUT_DOCKER_DATA_DIR";

pub const ENV_WEB_DATA_DIR: &str = "DATAVOL_WEB_DATA_DIR";
pub const ENV_REGISTRY_API: &str = "DATAVOL_REGISTRY_API";
pub const ENV_REGISTRY_NAMESPACE: &str = "DATAVOL_REGISTRY_NAMESPACE";
pub const ENV_DOCKERFILE: &str = "DATAVOL_DOCKERFILE";
pub const ENV_BUILD_CONTEXT: &str = "DATAVOL_BUILD_CONTEXT";
pub const ENV_OUTPUT_FILE: &str = "DATAVOL_OUTPUT_FILE";
pub const ENV_MAX_DIGITS: &str = "DATAVOL_MAX_DIGITS";
pub const ENV_TRIM_MODE: &str = "DATAVOL_TRIM_MODE";

/// How a marker such as `-PR` or `main_v` is removed from a name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrimMode {
    /// Remove the marker text exactly once.
    #[default]
    Literal,
    /// Remove every leading/trailing character that appears anywhere in the
    /// marker. `"main_vmain"` with marker `main_v` becomes `""`.
    CharSet,
}

impl TrimMode {
    pub fn parse(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "literal" => Ok(Self::Literal),
            "charset" => Ok(Self::CharSet),
            _ => Err(Error::InvalidTrimMode(value.to_owned())),
        }
    }

    pub fn strip_prefix<'a>(self, s: &'a str, marker: &str) -> &'a str {
        match self {
            Self::Literal => s.strip_prefix(marker).unwrap_or(s),
            Self::CharSet => s.trim_start_matches(|c| marker.contains(c)),
        }
    }

    pub fn strip_suffix<'a>(self, s: &'a str, marker: &str) -> &'a str {
        match self {
            Self::Literal => s.strip_suffix(marker).unwrap_or(s),
            Self::CharSet => s.trim_end_matches(|c| marker.contains(c)),
        }
    }
}

/// Complete run configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct Settings {
    pub branch: BranchConfig,
    pub sources: SourceConfig,
    pub build: BuildConfig,
    /// File receiving the comma-joined list of known volume tags.
    pub output_path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct BranchConfig {
    /// Raw branch name as handed over by CI
    pub name: String,
    /// Registry repository used for develop and feature data
    pub data_repo_dev: String,
    /// Registry repository used for release branches, if any
    pub data_repo_stable: Option<String>,
    /// Use the branch name itself as the data version
    pub use_feature_data: bool,
    pub trim_mode: TrimMode,
}

#[derive(Debug, Clone)]
pub struct SourceConfig {
    /// Base web directory holding `<repo>/<version>/` listings
    pub web_data_dir: String,
    /// Repository display name, e.g. `dtcenter/METplus`
    pub repo_name: String,
    /// Archive filenames must start with this
    pub data_prefix: String,
    pub archive_extension: String,
    /// Archives with more digits than this are treated as dated duplicates
    pub max_digits: usize,
    pub mount_file_name: String,
    /// Registry repositories API, without trailing slash
    pub registry_api: String,
    pub registry_namespace: String,
    /// Upper bound on registry tag pages to walk
    pub tag_max_pages: u32,
}

#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Root under which data is mounted inside the volume image
    pub docker_data_dir: String,
    pub dockerfile: String,
    pub context: String,
}

impl Settings {
    /// Load settings from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load settings through an arbitrary key lookup.
    ///
    /// Every value is read and validated here, before any network activity.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| lookup(key).ok_or_else(|| missing(key));
        let optional = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let tag_max_pages = parse_number::<u32>("tag_max_pages", &required(ENV_TAG_MAX_PAGES)?)?;
        let max_digits = match optional(ENV_MAX_DIGITS) {
            Some(v) => parse_number::<usize>("max_digits", &v)?,
            None => default_max_digits(),
        };
        let trim_mode = match optional(ENV_TRIM_MODE) {
            Some(v) => TrimMode::parse(&v)?,
            None => TrimMode::default(),
        };

        let settings = Self {
            branch: BranchConfig {
                name: required(ENV_BRANCH_NAME)?,
                data_repo_dev: required(ENV_DATA_REPO_DEV)?,
                data_repo_stable: optional(ENV_DATA_REPO_STABLE),
                use_feature_data: feature_flag(lookup(ENV_USE_FEATURE_DATA).as_deref()),
                trim_mode,
            },
            sources: SourceConfig {
                web_data_dir: optional(ENV_WEB_DATA_DIR).unwrap_or_else(default_web_data_dir),
                repo_name: required(ENV_REPO_NAME)?,
                data_prefix: required(ENV_DATA_PREFIX)?,
                archive_extension: default_archive_extension(),
                max_digits,
                mount_file_name: default_mount_file_name(),
                registry_api: optional(ENV_REGISTRY_API)
                    .map(|v| v.trim_end_matches('/').to_owned())
                    .unwrap_or_else(default_registry_api),
                registry_namespace: optional(ENV_REGISTRY_NAMESPACE)
                    .unwrap_or_else(default_registry_namespace),
                tag_max_pages,
            },
            build: BuildConfig {
                docker_data_dir: required(ENV_DOCKER_DATA_DIR)?,
                dockerfile: optional(ENV_DOCKERFILE).unwrap_or_else(default_dockerfile),
                context: optional(ENV_BUILD_CONTEXT).unwrap_or_else(default_build_context),
            },
            output_path: optional(ENV_OUTPUT_FILE)
                .map(PathBuf::from)
                .unwrap_or_else(default_output_path),
        };

        tracing::debug!(
            branch = %settings.branch.name,
            repo_name = %settings.sources.repo_name,
            tag_max_pages = settings.sources.tag_max_pages,
            "settings loaded"
        );
        Ok(settings)
    }
}

/// Anything other than the literal `false` enables feature data.
fn feature_flag(value: Option<&str>) -> bool {
    value.unwrap_or("false") != "false"
}

fn missing(key: &str) -> Error {
    Error::MissingEnvVar(key.to_owned())
}

fn parse_number<T>(name: &'static str, value: &str) -> Result<T>
where
    T: std::str::FromStr<Err = std::num::ParseIntError>,
{
    value.trim().parse().map_err(|e| Error::InvalidNumber {
        name,
        value: value.to_owned(),
        source: e,
    })
}

fn default_web_data_dir() -> String {
    "https://dtcenter.ucar.edu/dfiles/code/METplus/test_data/".to_owned()
}

fn default_archive_extension() -> String {
    ".tgz".to_owned()
}

fn default_max_digits() -> usize {
    crate::archive::DEFAULT_MAX_DIGITS
}

fn default_mount_file_name() -> String {
    "volume_mount_directories".to_owned()
}

fn default_registry_api() -> String {
    "https://hub.docker.com/v2/repositories".to_owned()
}

fn default_registry_namespace() -> String {
    "dtcenter".to_owned()
}

fn default_dockerfile() -> String {
    "/docker/Dockerfile.data".to_owned()
}

fn default_build_context() -> String {
    "/docker".to_owned()
}

fn default_output_path() -> PathBuf {
    PathBuf::from("/data_volumes.txt")
}
