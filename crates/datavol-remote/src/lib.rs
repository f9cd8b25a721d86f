pub mod docker;
pub mod http;
pub mod registry;
pub mod web;

pub use docker::{DockerClient, DockerError, DockerExecutor, VolumeBuild};
pub use http::{FetchResponse, HttpError, HttpFetcher, RealFetcher};
pub use registry::{RegistryClient, RegistryError};
pub use web::{ArchiveFilter, TarfileListing, WebDataClient, WebError};
