use std::collections::BTreeSet;
use std::future::Future;
use std::time::Instant;

use datavol_core::archive::{category_of, volume_tag};
use datavol_core::mount::mount_point;
use datavol_core::report::{format_elapsed, known_volumes, write_volume_list};
use datavol_core::{
    DataTarget, DuplicateFilter, RebuildReport, RebuildStep, Settings, TarfileMap, VolumeFailure,
    VolumeListing, VolumesToCreate, plan_rebuilds, resolve_branch, search_url, select_target,
};
use datavol_remote::{
    ArchiveFilter, DockerClient, DockerError, DockerExecutor, HttpFetcher, RegistryClient,
    TarfileListing, VolumeBuild, WebDataClient,
};

/// What the listing and diff stages found.
pub(crate) struct Survey {
    pub target: DataTarget,
    pub search_url: String,
    pub tarfiles: TarfileMap,
    pub volumes: VolumeListing,
    pub to_create: VolumesToCreate,
}

impl Survey {
    /// Distinct volume tags the listed archives map to. Archives without a
    /// category are never compared and are not counted.
    pub fn checked_volumes(&self) -> usize {
        self.tarfiles
            .keys()
            .filter_map(|name| category_of(name))
            .collect::<BTreeSet<_>>()
            .len()
    }
}

pub(crate) enum SurveyOutcome {
    /// The web directory for this version does not exist.
    NoDataDirectory { search_url: String },
    Ready(Survey),
}

/// Successful end states of a full run.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Outcome {
    NoDataDirectory { search_url: String },
    UpToDate { volumes: Vec<String> },
    Rebuilt {
        created: Vec<String>,
        volumes: Vec<String>,
    },
}

/// Resolve the branch, list archives and volumes, and compute the rebuild set.
pub(crate) async fn survey<W, R>(
    settings: &Settings,
    web: &WebDataClient<W>,
    registry: &RegistryClient<R>,
) -> anyhow::Result<SurveyOutcome>
where
    W: HttpFetcher,
    R: HttpFetcher,
{
    let branch_config = &settings.branch;
    let sources = &settings.sources;

    tracing::info!(branch = %branch_config.name, "input branch name");
    let branch = resolve_branch(&branch_config.name, branch_config.trim_mode);
    tracing::info!(%branch, "formatted branch name");

    let target = select_target(&branch, branch_config);
    tracing::info!(
        repository = %target.repository,
        version = %target.version,
        "data target selected"
    );

    let search_url = search_url(
        &sources.web_data_dir,
        &sources.repo_name,
        &target.version,
        branch_config.trim_mode,
    );

    let filter = ArchiveFilter {
        prefix: sources.data_prefix.clone(),
        extension: sources.archive_extension.clone(),
        duplicates: DuplicateFilter::new(sources.max_digits),
    };
    let tarfiles = match web.list_tarfiles(&search_url, &filter).await? {
        TarfileListing::Missing { url, .. } => {
            return Ok(SurveyOutcome::NoDataDirectory { search_url: url });
        }
        TarfileListing::Found(tarfiles) => tarfiles,
    };
    print_tarfiles(&tarfiles);

    let volumes = registry
        .list_volumes(&target.version, &target.repository, sources.tag_max_pages)
        .await?;
    print_volumes(&volumes);

    let to_create = plan_rebuilds(&target.version, &tarfiles, &volumes)?;

    Ok(SurveyOutcome::Ready(Survey {
        target,
        search_url,
        tarfiles,
        volumes,
        to_create,
    }))
}

/// Run every stage, rebuilding stale volumes and writing the volume list.
pub(crate) async fn run<W, R, D>(
    settings: &Settings,
    web: &WebDataClient<W>,
    registry: &RegistryClient<R>,
    docker: &DockerClient<D>,
) -> anyhow::Result<Outcome>
where
    W: HttpFetcher,
    R: HttpFetcher,
    D: DockerExecutor,
{
    let survey = match survey(settings, web, registry).await? {
        SurveyOutcome::NoDataDirectory { search_url } => {
            return Ok(Outcome::NoDataDirectory { search_url });
        }
        SurveyOutcome::Ready(survey) => survey,
    };

    if survey.to_create.is_empty() {
        tracing::info!("no data volumes need to be created");
        let volumes = known_volumes(survey.volumes.tags(), std::iter::empty());
        write_volume_list(&settings.output_path, &volumes)?;
        return Ok(Outcome::UpToDate { volumes });
    }

    let report = rebuild(settings, web, docker, &survey).await?;
    let created = report.finish()?;

    let volumes = known_volumes(survey.volumes.tags(), created.iter().map(String::as_str));
    write_volume_list(&settings.output_path, &volumes)?;

    Ok(Outcome::Rebuilt { created, volumes })
}

/// Build, push, and prune for every planned volume. A failing entry is
/// recorded and the loop moves on.
async fn rebuild<W, D>(
    settings: &Settings,
    web: &WebDataClient<W>,
    docker: &DockerClient<D>,
    survey: &Survey,
) -> anyhow::Result<RebuildReport>
where
    W: HttpFetcher,
    D: DockerExecutor,
{
    let mounts = web
        .fetch_mount_dirs(&survey.search_url, &settings.sources.mount_file_name)
        .await?;

    let mut report = RebuildReport::new();
    for (tarfile, category) in &survey.to_create {
        let Some(relative) = mounts.get(category) else {
            report.failed(
                tarfile,
                VolumeFailure::UnmappedCategory {
                    category: category.clone(),
                },
            );
            continue;
        };

        let tag = volume_tag(&survey.target.version, category);
        let build = VolumeBuild {
            image: format!(
                "{}/{}:{}",
                settings.sources.registry_namespace, survey.target.repository, tag
            ),
            dockerfile: settings.build.dockerfile.clone(),
            context: settings.build.context.clone(),
            tarfile_url: format!("{}{}", survey.search_url, tarfile),
            mount_point: mount_point(&settings.build.docker_data_dir, relative),
            data_dir: settings.build.docker_data_dir.clone(),
        };

        match rebuild_volume(docker, &build).await {
            Ok(()) => report.created(tarfile, &tag),
            Err(failure) => report.failed(tarfile, failure),
        }
    }

    Ok(report)
}

async fn rebuild_volume<D: DockerExecutor>(
    docker: &DockerClient<D>,
    build: &VolumeBuild,
) -> Result<(), VolumeFailure> {
    timed(RebuildStep::Build, docker.build_volume(build)).await?;
    timed(RebuildStep::Push, docker.push_image(&build.image)).await?;
    timed(RebuildStep::Prune, docker.prune_images()).await
}

async fn timed<F>(step: RebuildStep, command: F) -> Result<(), VolumeFailure>
where
    F: Future<Output = Result<(), DockerError>>,
{
    let started = Instant::now();
    let result = command.await;
    let elapsed = started.elapsed();

    match result {
        Ok(()) => {
            tracing::info!(
                %step,
                elapsed = %format_elapsed(elapsed),
                "TIMING: command took (MM:SS)"
            );
            Ok(())
        }
        Err(e) => Err(VolumeFailure::Step {
            step,
            detail: e.to_string(),
            elapsed,
        }),
    }
}

fn print_tarfiles(tarfiles: &TarfileMap) {
    println!("\nTARFILES:");
    if tarfiles.is_empty() {
        println!("**No tar files found**\n");
    }
    for (name, last_modified) in tarfiles {
        println!("{name}\n  Last modified: {last_modified}\n");
    }
}

fn print_volumes(volumes: &VolumeListing) {
    println!("\nDATA VOLUMES:");
    match volumes.volumes() {
        None => println!("**Registry tag listing unavailable**\n"),
        Some(map) if map.is_empty() => println!("**No volumes found**\n"),
        Some(map) => {
            for (name, last_updated) in map {
                println!("{name}\n  Last updated: {last_updated}\n");
            }
        }
    }
}
