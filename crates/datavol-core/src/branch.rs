use crate::config::{BranchConfig, TrimMode};

/// Release branches look like `main_v5.1`.
pub const RELEASE_BRANCH_PREFIX: &str = "main_v";

/// Data version used unless the branch selects another one.
pub const DEFAULT_DATA_VERSION: &str = "develop";

/// Owner prefix removed from the repository name in web directory paths.
pub const REPO_OWNER_PREFIX: &str = "dtcenter/";

const PR_SUFFIX: &str = "-PR";
const REF_SUFFIX: &str = "-ref";

/// Registry repository and data version a branch maps to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataTarget {
    pub repository: String,
    pub version: String,
}

/// Strip the CI `-PR` and `-ref` markers from a raw branch name.
pub fn resolve_branch(raw: &str, mode: TrimMode) -> String {
    let mut name = raw;
    if name.ends_with(PR_SUFFIX) {
        name = mode.strip_suffix(name, PR_SUFFIX);
    }
    if name.ends_with(REF_SUFFIX) {
        name = mode.strip_suffix(name, REF_SUFFIX);
    }
    tracing::debug!(raw, resolved = name, "branch name resolved");
    name.to_owned()
}

/// Pick the registry repository and data version for a cleaned branch name.
pub fn select_target(branch: &str, config: &BranchConfig) -> DataTarget {
    if branch.starts_with(RELEASE_BRANCH_PREFIX) {
        let repository = config
            .data_repo_stable
            .as_deref()
            .unwrap_or(&config.data_repo_dev);
        return DataTarget {
            repository: repository.to_owned(),
            version: config
                .trim_mode
                .strip_prefix(branch, RELEASE_BRANCH_PREFIX)
                .to_owned(),
        };
    }

    let version = if config.use_feature_data {
        branch
    } else {
        DEFAULT_DATA_VERSION
    };

    DataTarget {
        repository: config.data_repo_dev.clone(),
        version: version.to_owned(),
    }
}

/// Directory URL holding the archives for `version`.
///
/// The [`REPO_OWNER_PREFIX`] is removed from `repo_name`, numeric versions
/// get a `v` prefix, and the result always ends with exactly one `/`.
pub fn search_url(web_data_dir: &str, repo_name: &str, version: &str, mode: TrimMode) -> String {
    let repo = mode.strip_prefix(repo_name, REPO_OWNER_PREFIX);
    let version = if version.starts_with(|c: char| c.is_ascii_digit()) {
        format!("v{version}")
    } else {
        version.to_owned()
    };

    let parts = [web_data_dir, repo, &version];
    let joined = parts
        .iter()
        .map(|p| p.trim_matches('/'))
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join("/");
    format!("{joined}/")
}
