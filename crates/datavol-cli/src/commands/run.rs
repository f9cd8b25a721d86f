use datavol_core::Settings;
use datavol_remote::{DockerClient, RegistryClient, WebDataClient};
use std::time::Instant;

use super::pipeline::{self, Outcome};

pub async fn run() -> anyhow::Result<()> {
    let started = Instant::now();
    let settings = Settings::from_env()?;

    let web = WebDataClient::new();
    let registry = RegistryClient::new(
        &settings.sources.registry_api,
        &settings.sources.registry_namespace,
    );
    let docker = DockerClient::new();

    match pipeline::run(&settings, &web, &registry, &docker).await? {
        Outcome::NoDataDirectory { search_url } => {
            println!(
                "URL does not exist: {search_url}. Nothing to update, exiting."
            );
        }
        Outcome::UpToDate { volumes } => {
            println!("No data volumes need to be created.");
            println!("Known data volumes: {}", volumes.join(","));
        }
        Outcome::Rebuilt { created, volumes } => {
            println!("Created data volumes: {}", created.join(","));
            println!("Known data volumes: {}", volumes.join(","));
            println!("Success");
        }
    }

    tracing::info!(
        elapsed = %datavol_core::report::format_elapsed(started.elapsed()),
        "TIMING: total run took (MM:SS)"
    );
    Ok(())
}
