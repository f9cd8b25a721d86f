use datavol_core::Settings;
use datavol_core::archive::volume_tag;
use datavol_remote::{RegistryClient, WebDataClient};

use super::pipeline::{self, SurveyOutcome};

/// Report the rebuild plan. No Docker commands run and no volume list is written.
pub async fn check() -> anyhow::Result<()> {
    let settings = Settings::from_env()?;

    let web = WebDataClient::new();
    let registry = RegistryClient::new(
        &settings.sources.registry_api,
        &settings.sources.registry_namespace,
    );

    let survey = match pipeline::survey(&settings, &web, &registry).await? {
        SurveyOutcome::NoDataDirectory { search_url } => {
            println!("URL does not exist: {search_url}. Nothing to check.");
            return Ok(());
        }
        SurveyOutcome::Ready(survey) => survey,
    };

    println!(
        "Target: {} (version {})",
        survey.target.repository, survey.target.version
    );
    println!("Archive directory: {}", survey.search_url);

    if survey.to_create.is_empty() {
        let checked = survey.checked_volumes();
        println!("All {checked} data volume(s) are up to date.");
        return Ok(());
    }

    println!("\nVOLUMES TO CREATE:");
    for (tarfile, category) in &survey.to_create {
        let tag = volume_tag(&survey.target.version, category);
        println!("  {tag}  <-  {tarfile}");
    }
    Ok(())
}
