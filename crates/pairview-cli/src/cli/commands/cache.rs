use std::io::Write;
use std::time::Duration;

use anyhow::Context;
use pairview_cache::{
    AssetCacheManager, AssetRequest, CacheConfig, CacheError, HttpFetcher, ResponseSource,
};

use crate::cli::args::{CacheArgs, CacheSub, FetchArgs};
use crate::exit_codes;

/// Longest `fetch` waits for the background refresh before exiting.
const REVALIDATION_WAIT: Duration = Duration::from_secs(5);

fn build_config(args: &CacheArgs) -> CacheConfig {
    let mut config = CacheConfig::from_env();
    if let Some(origin) = &args.origin {
        config = config.with_origin(origin.clone());
    }
    if let Some(dir) = &args.cache_dir {
        config = config.with_cache_dir(dir.clone());
    }
    if let Some(version) = &args.cache_version {
        config = config.with_version(version.clone());
    }
    config
}

fn report(e: &CacheError) -> i32 {
    eprintln!("error: {}", e);
    e.exit_code()
}

pub async fn cmd_cache(args: &CacheArgs) -> anyhow::Result<i32> {
    let config = build_config(args);
    let mut manager = match AssetCacheManager::from_config(config) {
        Ok(m) => m,
        Err(e) => return Ok(report(&e)),
    };

    let result = match &args.cmd {
        CacheSub::Install => install(&mut manager).await,
        CacheSub::Activate => activate(&mut manager, true).await,
        CacheSub::Update => match install(&mut manager).await {
            Ok(_) => activate(&mut manager, false).await,
            Err(e) => Err(e),
        },
        CacheSub::Status => return status(&manager).await,
        CacheSub::Fetch(fetch_args) => return fetch(&mut manager, fetch_args).await,
    };

    Ok(match result {
        Ok(()) => exit_codes::SUCCESS,
        Err(e) => report(&e),
    })
}

async fn install(manager: &mut AssetCacheManager<HttpFetcher>) -> Result<(), CacheError> {
    let installed = manager.install().await?;
    for url in &installed.cached {
        println!("cached {}", url);
    }
    println!("installed {} ({} resources)", installed.bucket, installed.cached.len());
    Ok(())
}

async fn activate(
    manager: &mut AssetCacheManager<HttpFetcher>,
    resume: bool,
) -> Result<(), CacheError> {
    if resume {
        manager.resume_installed().await?;
    }
    let activated = manager.activate().await?;
    for name in &activated.deleted {
        println!("deleted {}", name);
    }
    println!("activated {}", activated.bucket);
    Ok(())
}

async fn status(manager: &AssetCacheManager<HttpFetcher>) -> anyhow::Result<i32> {
    let storage = manager.storage();
    let current = manager.bucket_name();

    let names = match storage.keys().await {
        Ok(names) => names,
        Err(e) => return Ok(report(&e)),
    };

    println!("cache dir: {}", storage.root().display());
    if names.is_empty() {
        println!("no buckets");
        return Ok(exit_codes::SUCCESS);
    }

    for name in &names {
        let marker = if *name == current { "*" } else { " " };
        if storage.is_installed(name).await {
            println!("{} {}", marker, name);
        } else {
            println!("{} {} (incomplete)", marker, name);
        }
    }

    if names.contains(&current) {
        let bucket = storage
            .bucket(&current)
            .with_context(|| format!("invalid bucket name {}", current))?;
        let entries = match bucket.entries().await {
            Ok(entries) => entries,
            Err(e) => return Ok(report(&e)),
        };
        for entry in entries {
            println!(
                "    {} {} {} {}B {}",
                entry.method,
                entry.status,
                entry.url,
                entry.size,
                entry.stored_at.format("%Y-%m-%d %H:%M:%S")
            );
        }
    }

    Ok(exit_codes::SUCCESS)
}

async fn fetch(
    manager: &mut AssetCacheManager<HttpFetcher>,
    args: &FetchArgs,
) -> anyhow::Result<i32> {
    if let Err(e) = manager.resume().await {
        return Ok(report(&e));
    }

    let url = match manager.config().resolve(&args.path) {
        Ok(url) => url,
        Err(e) => return Ok(report(&e)),
    };

    let outcome = match manager.handle_fetch(AssetRequest::get(url)).await {
        Ok(outcome) => outcome,
        Err(e) => return Ok(report(&e)),
    };

    let source = match outcome.source {
        ResponseSource::Cache => "cache",
        ResponseSource::Network => "network",
    };
    eprintln!("{} {} ({})", outcome.response.status, outcome.response.url, source);

    match &args.output {
        Some(path) => tokio::fs::write(path, &outcome.response.body)
            .await
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&outcome.response.body)?;
            stdout.flush()?;
        }
    }

    // Give the background refresh a chance to land before the process exits.
    if let Some(revalidation) = outcome.revalidation {
        match revalidation.finished_within(REVALIDATION_WAIT).await {
            Some(true) => tracing::debug!("cache entry refreshed"),
            Some(false) => tracing::debug!("cache entry kept"),
            None => tracing::debug!(
                wait_secs = REVALIDATION_WAIT.as_secs(),
                "cache refresh still pending, not waiting"
            ),
        }
    }

    Ok(exit_codes::SUCCESS)
}
