use datavol_core::DuplicateFilter;
use datavol_remote::http::{FetchResponse, HttpError, HttpFetcher};
use datavol_remote::web::{ArchiveFilter, TarfileListing, WebDataClient, WebError};
use mockall::mock;

mock! {
    Fetcher {}

    impl HttpFetcher for Fetcher {
        async fn get(&self, url: &str) -> Result<FetchResponse, HttpError>;
        async fn head(&self, url: &str) -> Result<FetchResponse, HttpError>;
    }
}

const SEARCH_URL: &str = "https://example.org/test_data/METplus/develop/";

const LISTING: &str = r#"<html><body><pre>
<a href="/test_data/METplus/">Parent Directory</a>
<a href="sample_data-obs.tgz">sample_data-obs.tgz</a>
<a href="sample_data-model.tgz">sample_data-model.tgz</a>
<a href="sample_data-obs-20240101.tgz">sample_data-obs-20240101.tgz</a>
<a href="sample_data-notes.txt">sample_data-notes.txt</a>
<a href="other-obs.tgz">other-obs.tgz</a>
<a href="volume_mount_directories">volume_mount_directories</a>
</pre></body></html>"#;

const EMPTY_LISTING: &str = "<html><body>nothing here</body></html>";
const MOUNTS: &str = "obs:model_applications/obs\nmodel:model_applications/model/\n";

const OBS_MODIFIED: &str = "Mon, 01 Jan 2024 00:00:00 GMT";
const MODEL_MODIFIED: &str = "Tue, 02 Jan 2024 00:00:00 GMT";

fn filter() -> ArchiveFilter {
    ArchiveFilter {
        prefix: "sample_data".to_owned(),
        extension: ".tgz".to_owned(),
        duplicates: DuplicateFilter::default(),
    }
}

fn last_modified(url: &str) -> FetchResponse {
    let stamp = if url.ends_with("obs.tgz") {
        OBS_MODIFIED
    } else {
        MODEL_MODIFIED
    };
    FetchResponse::ok("").with_header("Last-Modified", stamp)
}

// ── Tarball listing ──

#[tokio::test]
async fn list_tarfiles_keeps_matching_archives() {
    let mut mock = MockFetcher::new();

    mock.expect_get()
        .withf(|url| url == SEARCH_URL)
        .times(1)
        .returning(|_| Ok(FetchResponse::ok(LISTING)));

    mock.expect_head()
        .times(2)
        .returning(|url| Ok(last_modified(url)));

    let client = WebDataClient::with_fetcher(mock);
    let listing = client.list_tarfiles(SEARCH_URL, &filter()).await.unwrap();

    let tarfiles = match listing {
        TarfileListing::Found(tarfiles) => tarfiles,
        other => panic!("expected archives, got {other:?}"),
    };
    assert_eq!(tarfiles.len(), 2);
    assert_eq!(tarfiles["sample_data-obs.tgz"], OBS_MODIFIED);
    assert_eq!(tarfiles["sample_data-model.tgz"], MODEL_MODIFIED);
}

#[tokio::test]
async fn list_tarfiles_heads_joined_urls() {
    let mut mock = MockFetcher::new();

    mock.expect_get()
        .returning(|_| Ok(FetchResponse::ok(LISTING)));

    mock.expect_head()
        .withf(|url| url == format!("{SEARCH_URL}sample_data-obs.tgz"))
        .times(1)
        .returning(|url| Ok(last_modified(url)));
    mock.expect_head()
        .withf(|url| url == format!("{SEARCH_URL}sample_data-model.tgz"))
        .times(1)
        .returning(|url| Ok(last_modified(url)));

    let client = WebDataClient::with_fetcher(mock);
    client.list_tarfiles(SEARCH_URL, &filter()).await.unwrap();
}

#[tokio::test]
async fn list_tarfiles_missing_directory_is_not_an_error() {
    let mut mock = MockFetcher::new();

    mock.expect_get()
        .returning(|_| Ok(FetchResponse::status(404)));
    mock.expect_head().never();

    let client = WebDataClient::with_fetcher(mock);
    let listing = client.list_tarfiles(SEARCH_URL, &filter()).await.unwrap();

    assert_eq!(
        listing,
        TarfileListing::Missing {
            url: SEARCH_URL.to_owned(),
            status: 404,
        }
    );
}

#[tokio::test]
async fn list_tarfiles_empty_directory() {
    let mut mock = MockFetcher::new();

    mock.expect_get()
        .returning(|_| Ok(FetchResponse::ok(EMPTY_LISTING)));

    let client = WebDataClient::with_fetcher(mock);
    let listing = client.list_tarfiles(SEARCH_URL, &filter()).await.unwrap();

    assert_eq!(listing, TarfileListing::Found(Default::default()));
}

#[tokio::test]
async fn list_tarfiles_is_idempotent() {
    let mut mock = MockFetcher::new();

    mock.expect_get()
        .times(2)
        .returning(|_| Ok(FetchResponse::ok(LISTING)));
    mock.expect_head()
        .times(4)
        .returning(|url| Ok(last_modified(url)));

    let client = WebDataClient::with_fetcher(mock);
    let first = client.list_tarfiles(SEARCH_URL, &filter()).await.unwrap();
    let second = client.list_tarfiles(SEARCH_URL, &filter()).await.unwrap();

    assert_eq!(first, second);
}

#[tokio::test]
async fn list_tarfiles_respects_digit_threshold() {
    let mut mock = MockFetcher::new();

    mock.expect_get()
        .returning(|_| Ok(FetchResponse::ok(LISTING)));
    mock.expect_head()
        .times(3)
        .returning(|url| Ok(last_modified(url)));

    let relaxed = ArchiveFilter {
        duplicates: DuplicateFilter::new(8),
        ..filter()
    };
    let client = WebDataClient::with_fetcher(mock);
    let listing = client.list_tarfiles(SEARCH_URL, &relaxed).await.unwrap();

    let tarfiles = match listing {
        TarfileListing::Found(tarfiles) => tarfiles,
        other => panic!("expected archives, got {other:?}"),
    };
    assert!(tarfiles.contains_key("sample_data-obs-20240101.tgz"));
}

#[tokio::test]
async fn list_tarfiles_missing_last_modified_fails() {
    let mut mock = MockFetcher::new();

    mock.expect_get()
        .returning(|_| Ok(FetchResponse::ok(LISTING)));
    mock.expect_head().returning(|_| Ok(FetchResponse::ok("")));

    let client = WebDataClient::with_fetcher(mock);
    let result = client.list_tarfiles(SEARCH_URL, &filter()).await;

    assert!(matches!(result, Err(WebError::MissingLastModified { .. })));
}

#[tokio::test]
async fn list_tarfiles_failed_head_fails() {
    let mut mock = MockFetcher::new();

    mock.expect_get()
        .returning(|_| Ok(FetchResponse::ok(LISTING)));
    mock.expect_head()
        .returning(|_| Ok(FetchResponse::status(403)));

    let client = WebDataClient::with_fetcher(mock);
    let result = client.list_tarfiles(SEARCH_URL, &filter()).await;

    let err = result.unwrap_err();
    assert!(matches!(err, WebError::HeadStatus { status: 403, .. }));
}

// ── Mount directories ──

#[tokio::test]
async fn fetch_mount_dirs_parses_mapping() {
    let mut mock = MockFetcher::new();

    mock.expect_get()
        .withf(|url| url == format!("{SEARCH_URL}volume_mount_directories"))
        .times(1)
        .returning(|_| Ok(FetchResponse::ok(MOUNTS)));

    let client = WebDataClient::with_fetcher(mock);
    let mounts = client
        .fetch_mount_dirs(SEARCH_URL, "volume_mount_directories")
        .await
        .unwrap();

    assert_eq!(mounts.len(), 2);
    assert_eq!(mounts["obs"], "model_applications/obs");
    assert_eq!(mounts["model"], "model_applications/model/");
}

#[tokio::test]
async fn fetch_mount_dirs_missing_file_is_an_error() {
    let mut mock = MockFetcher::new();

    mock.expect_get()
        .returning(|_| Ok(FetchResponse::status(404)));

    let client = WebDataClient::with_fetcher(mock);
    let err = client
        .fetch_mount_dirs(SEARCH_URL, "volume_mount_directories")
        .await
        .unwrap_err();

    match &err {
        WebError::MountFileMissing { status, .. } => assert_eq!(*status, 404),
        other => panic!("expected a missing mount file, got {other:?}"),
    }
    assert!(err.to_string().contains("URL does not exist"));
}

#[tokio::test]
async fn fetch_mount_dirs_malformed_line_is_an_error() {
    let mut mock = MockFetcher::new();

    mock.expect_get()
        .returning(|_| Ok(FetchResponse::ok("obs:a/b\nno separator here\n")));

    let client = WebDataClient::with_fetcher(mock);
    let result = client
        .fetch_mount_dirs(SEARCH_URL, "volume_mount_directories")
        .await;

    assert!(matches!(result, Err(WebError::MountFileParse { .. })));
}
