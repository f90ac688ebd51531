//! Command handlers.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::info;

use rideview_api::{FetchOutcome, Region, StyleClient, VehicleClient};
use rideview_config::Config;
use rideview_core::{BackendVehicleSource, LiveLayerSync, SyncOptions, convert};

use crate::cli::{self, GlobalOpts};
use crate::error::CliError;
use crate::headless::HeadlessSurface;
use crate::output;

/// Resolve the query region from a `--bbox` argument or the config
/// fallback viewport.
fn resolve_region(config: &Config, bbox: Option<&str>) -> Result<Region, CliError> {
    match bbox {
        Some(raw) => cli::parse_bbox(raw),
        None => config.fallback_region().map_err(|e| CliError::Validation {
            field: "viewport".into(),
            reason: e.to_string(),
        }),
    }
}

/// Classify a backend failure: transport problems get the connection
/// diagnostic, everything else passes through.
fn backend_error(url: &str, e: rideview_api::Error) -> CliError {
    if matches!(e, rideview_api::Error::Transport(_)) {
        CliError::ConnectionFailed {
            url: url.to_owned(),
            source: e,
        }
    } else {
        CliError::Api(e)
    }
}

/// `rideview watch`: run the live sync loop until interrupted.
pub async fn watch(
    config: &Config,
    global: &GlobalOpts,
    bbox: Option<String>,
    interval: Option<u64>,
) -> Result<(), CliError> {
    let region = resolve_region(config, bbox.as_deref())?;

    if interval == Some(0) {
        return Err(CliError::Validation {
            field: "interval".into(),
            reason: "must be greater than zero".into(),
        });
    }

    let transport = config.transport();

    // Style handshake comes first; without it the map never initializes.
    let style = StyleClient::new(&config.backend_url, &transport)?
        .style_url()
        .await
        .map_err(|e| match e {
            rideview_api::Error::Transport(_) | rideview_api::Error::Http { .. } => {
                CliError::ConnectionFailed {
                    url: config.backend_url.clone(),
                    source: e,
                }
            }
            other => CliError::StyleUnavailable { source: other },
        })?;
    info!(style = %style, "base map style resolved");

    let client = VehicleClient::new(&config.backend_url, &transport)?;
    let surface = Arc::new(HeadlessSurface::new(region, global.output));
    let options = SyncOptions {
        interval: Duration::from_secs(interval.unwrap_or(config.refresh_interval_secs)),
        route_colors: config.route_color_pairs(),
    };

    let sync = LiveLayerSync::new(surface, BackendVehicleSource::new(client), options);
    let cancel = CancellationToken::new();
    let loop_handle = tokio::spawn(sync.run(cancel.clone()));

    tokio::signal::ctrl_c().await?;
    info!("interrupted; tearing down");
    cancel.cancel();
    let _ = loop_handle.await;
    Ok(())
}

/// `rideview vehicles`: one-shot query of a region.
pub async fn vehicles(
    config: &Config,
    global: &GlobalOpts,
    bbox: Option<String>,
) -> Result<(), CliError> {
    let region = resolve_region(config, bbox.as_deref())?;
    let client = VehicleClient::new(&config.backend_url, &config.transport())?;

    let outcome = client
        .vehicles_in_region(&region, &CancellationToken::new())
        .await
        .map_err(|e| backend_error(&config.backend_url, e))?;

    if let FetchOutcome::Fetched(batch) = outcome {
        let snapshot = convert::snapshot_from_batch(batch);
        let collection = convert::feature_collection(&snapshot);
        println!("{}", output::render_collection(global.output, &collection));
    }
    Ok(())
}

/// `rideview style`: print the base-map style URL.
pub async fn style(config: &Config) -> Result<(), CliError> {
    let client = StyleClient::new(&config.backend_url, &config.transport())?;
    let url = client
        .style_url()
        .await
        .map_err(|e| backend_error(&config.backend_url, e))?;
    println!("{url}");
    Ok(())
}

/// `rideview ping`: probe backend liveness.
pub async fn ping(config: &Config) -> Result<(), CliError> {
    let client = StyleClient::new(&config.backend_url, &config.transport())?;
    let msg = client
        .ping()
        .await
        .map_err(|e| backend_error(&config.backend_url, e))?;
    println!("{msg}");
    Ok(())
}
