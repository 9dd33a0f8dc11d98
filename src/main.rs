use anyhow::{Context, Result};
use gitdocs::{Config, GitHubClient, RemoteError, site};
use log::debug;
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            if let Some(hint) = e.downcast_ref::<RemoteError>().and_then(RemoteError::hint) {
                eprintln!("Hint: {}", hint);
            }
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let config = Config::parse();
    config.validate().context("Invalid configuration")?;
    debug!("Configuration: {:?}", config);

    let client = GitHubClient::with_api_url(config.repository(), &config.token, &config.api_url)
        .context("Failed to create GitHub client")?;

    if config.list {
        for slug in site::list_documents(&config, &client)? {
            println!("{}", slug);
        }
        return Ok(());
    }

    let summary = site::build(&config, &client)?;

    println!(
        "Generated {} pages in {} ({} skipped)",
        summary.pages,
        config.output.display(),
        summary.skipped
    );
    println!(
        "Inlined {} images ({} unresolved)",
        summary.assets_inlined, summary.assets_unresolved
    );

    Ok(())
}
