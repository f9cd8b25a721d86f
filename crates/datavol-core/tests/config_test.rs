use std::collections::HashMap;
use std::path::Path;

use datavol_core::archive::DEFAULT_MAX_DIGITS;
use datavol_core::{Error, Settings, TrimMode};

fn base_env() -> HashMap<&'static str, &'static str> {
    HashMap::from([
        ("INPUT_BRANCH_NAME", "feature_123-PR"),
        ("INPUT_DATA_REPO_DEV", "metplus-data-dev"),
        ("INPUT_REPO_NAME", "dtcenter/METplus"),
        ("INPUT_DATA_PREFIX", "sample_data"),
        ("INPUT_TAG_MAX_PAGES", "15"),
        ("INPUT_DOCKER_DATA_DIR", "/data/input/METplus_Data"),
    ])
}

fn load(env: &HashMap<&'static str, &'static str>) -> datavol_core::Result<Settings> {
    Settings::from_lookup(|key| env.get(key).map(|v| (*v).to_owned()))
}

#[test]
fn load_fills_defaults() {
    let settings = load(&base_env()).unwrap();

    assert_eq!(settings.branch.name, "feature_123-PR");
    assert_eq!(settings.branch.data_repo_dev, "metplus-data-dev");
    assert!(settings.branch.data_repo_stable.is_none());
    assert!(!settings.branch.use_feature_data);
    assert_eq!(settings.branch.trim_mode, TrimMode::Literal);

    assert_eq!(
        settings.sources.web_data_dir,
        "https://dtcenter.ucar.edu/dfiles/code/METplus/test_data/"
    );
    assert_eq!(settings.sources.repo_name, "dtcenter/METplus");
    assert_eq!(settings.sources.data_prefix, "sample_data");
    assert_eq!(settings.sources.archive_extension, ".tgz");
    assert_eq!(settings.sources.max_digits, DEFAULT_MAX_DIGITS);
    assert_eq!(settings.sources.mount_file_name, "volume_mount_directories");
    assert_eq!(
        settings.sources.registry_api,
        "https://hub.docker.com/v2/repositories"
    );
    assert_eq!(settings.sources.registry_namespace, "dtcenter");
    assert_eq!(settings.sources.tag_max_pages, 15);

    assert_eq!(settings.build.docker_data_dir, "/data/input/METplus_Data");
    assert_eq!(settings.build.dockerfile, "/docker/Dockerfile.data");
    assert_eq!(settings.build.context, "/docker");
    assert_eq!(settings.output_path, Path::new("/data_volumes.txt"));
}

#[test]
fn load_reads_overrides() {
    let mut env = base_env();
    env.insert("INPUT_DATA_REPO_STABLE", "metplus-data");
    env.insert("INPUT_USE_FEATURE_DATA", "true");
    env.insert("DATAVOL_WEB_DATA_DIR", "https://mirror.test/data/");
    env.insert("DATAVOL_REGISTRY_API", "https://registry.test/v2/repos/");
    env.insert("DATAVOL_REGISTRY_NAMESPACE", "acme");
    env.insert("DATAVOL_DOCKERFILE", "/build/Dockerfile");
    env.insert("DATAVOL_BUILD_CONTEXT", "/build");
    env.insert("DATAVOL_OUTPUT_FILE", "/tmp/volumes.txt");
    env.insert("DATAVOL_MAX_DIGITS", "4");
    env.insert("DATAVOL_TRIM_MODE", "charset");

    let settings = load(&env).unwrap();

    assert_eq!(
        settings.branch.data_repo_stable.as_deref(),
        Some("metplus-data")
    );
    assert!(settings.branch.use_feature_data);
    assert_eq!(settings.branch.trim_mode, TrimMode::CharSet);
    assert_eq!(settings.sources.web_data_dir, "https://mirror.test/data/");
    assert_eq!(
        settings.sources.registry_api,
        "https://registry.test/v2/repos"
    );
    assert_eq!(settings.sources.registry_namespace, "acme");
    assert_eq!(settings.sources.max_digits, 4);
    assert_eq!(settings.build.dockerfile, "/build/Dockerfile");
    assert_eq!(settings.build.context, "/build");
    assert_eq!(settings.output_path, Path::new("/tmp/volumes.txt"));
}

#[test]
fn empty_stable_repo_counts_as_unset() {
    let mut env = base_env();
    env.insert("INPUT_DATA_REPO_STABLE", "");

    let settings = load(&env).unwrap();
    assert!(settings.branch.data_repo_stable.is_none());
}

#[test]
fn missing_required_variable_is_named() {
    let mut env = base_env();
    env.remove("INPUT_DOCKER_DATA_DIR");

    match load(&env) {
        Err(Error::MissingEnvVar(key)) => assert_eq!(key, "INPUT_DOCKER_DATA_DIR"),
        other => panic!("expected a missing variable error, got {other:?}"),
    }
}

#[test]
fn non_numeric_max_pages_is_rejected() {
    let mut env = base_env();
    env.insert("INPUT_TAG_MAX_PAGES", "many");

    let err = load(&env).unwrap_err();
    assert!(err.to_string().contains("tag_max_pages"), "got: {err}");
}

#[test]
fn negative_max_pages_is_rejected() {
    let mut env = base_env();
    env.insert("INPUT_TAG_MAX_PAGES", "-1");

    assert!(matches!(load(&env), Err(Error::InvalidNumber { .. })));
}

#[test]
fn max_pages_tolerates_surrounding_whitespace() {
    let mut env = base_env();
    env.insert("INPUT_TAG_MAX_PAGES", " 3\n");

    assert_eq!(load(&env).unwrap().sources.tag_max_pages, 3);
}

#[test]
fn unknown_trim_mode_is_rejected() {
    let mut env = base_env();
    env.insert("DATAVOL_TRIM_MODE", "fuzzy");

    assert!(matches!(load(&env), Err(Error::InvalidTrimMode(_))));
}
