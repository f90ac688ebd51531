// ── Live-layer synchronization ──
//
// The poll/refresh state machine. Each tick derives a query region
// from the viewport, fetches vehicles inside it, and commits the
// resulting GeoJSON collection into the map's live source, unless the
// tick has been superseded by a newer generation in the meantime.
//
// Effective writes are serialized by the generation check alone:
// fetches may overlap, but a commit is accepted only for the newest
// generation, so the map never flickers back to older data.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::convert;
use crate::source::{SourceFetch, VehicleSource};
use crate::surface::{
    CircleLayer, MapSurface, TRANSIT_SOURCE, TRANSIT_TILEJSON_URL, VEHICLES_SOURCE,
};
use crate::viewport;

/// Consecutive-failure count at which the streak gets loud.
const FAILURE_STREAK_WARN: u32 = 3;

/// Tuning for the sync loop.
#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Poll period. The first fetch fires immediately, not one period in.
    pub interval: Duration,
    /// Categorical route → color mapping for the vehicle layer.
    pub route_colors: Vec<(i64, String)>,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(30),
            route_colors: Vec::new(),
        }
    }
}

/// Process-local sync state. Exclusively owned by [`LiveLayerSync`];
/// lives exactly as long as the loop, torn down with it.
#[derive(Debug, Default)]
struct LiveLayerState {
    /// Flips true exactly once, on first successful installation.
    /// Never unset during normal operation; teardown stops work, it
    /// does not undo rendering state.
    source_installed: bool,
    /// Newest generation handed out to a tick. Monotonic, never reused.
    in_flight_generation: u64,
    /// Generation of the last accepted commit.
    last_committed_generation: u64,
    consecutive_failures: u32,
    last_error_at: Option<DateTime<Utc>>,
}

/// What one poll cycle did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// The map cannot accept sources yet; nothing was installed or fetched.
    NotReady,
    /// The viewport has no defined extent; the generation was skipped.
    Unavailable,
    /// A snapshot was committed to the live source.
    Committed { generation: u64, vehicles: usize },
    /// The fetch succeeded but a newer generation superseded it.
    Stale { generation: u64 },
    /// The fetch was cancelled before resolving.
    Cancelled { generation: u64 },
    /// The fetch failed; the previous commit stays on display.
    Failed { generation: u64 },
}

/// The live-layer sync loop.
///
/// Owns the poll cycle end to end: idempotent source/layer
/// installation once the surface is ready, generation-numbered ticks,
/// commit-time staleness checks, and per-cycle failure containment.
/// The vehicle source inside the surface has exactly one writer: this.
pub struct LiveLayerSync<S, F> {
    surface: Arc<S>,
    source: F,
    options: SyncOptions,
    state: LiveLayerState,
    in_flight_cancel: Option<CancellationToken>,
}

impl<S, F> LiveLayerSync<S, F>
where
    S: MapSurface,
    F: VehicleSource,
{
    pub fn new(surface: Arc<S>, source: F, options: SyncOptions) -> Self {
        Self {
            surface,
            source,
            options,
            state: LiveLayerState::default(),
            in_flight_cancel: None,
        }
    }

    // ── Observability ────────────────────────────────────────────────

    pub fn last_committed_generation(&self) -> u64 {
        self.state.last_committed_generation
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.state.consecutive_failures
    }

    pub fn last_error_at(&self) -> Option<DateTime<Utc>> {
        self.state.last_error_at
    }

    // ── Ready transition ─────────────────────────────────────────────

    /// Install the live vehicle source/layer and the static transit
    /// background, if the surface is ready for them.
    ///
    /// Idempotent: existing sources are never re-created, so a
    /// teardown/reinit race from a previous run cannot produce
    /// "already exists" errors or duplicate layers. Returns whether
    /// installation has completed.
    fn ensure_installed(&mut self) -> bool {
        if self.state.source_installed {
            return true;
        }
        if !self.surface.is_ready() {
            return false;
        }

        if !self.surface.has_source(VEHICLES_SOURCE) {
            self.surface
                .add_geojson_source(VEHICLES_SOURCE, empty_collection());
            self.surface
                .add_circle_layer(CircleLayer::vehicles(self.options.route_colors.clone()));
        }

        if !self.surface.has_source(TRANSIT_SOURCE) {
            self.surface
                .add_vector_source(TRANSIT_SOURCE, TRANSIT_TILEJSON_URL);
            self.surface.add_circle_layer(CircleLayer::stops());
            self.surface.add_circle_layer(CircleLayer::stations());
        }

        self.state.source_installed = true;
        info!("live vehicle layer installed");
        true
    }

    // ── Poll cycle ───────────────────────────────────────────────────

    /// Assign the next generation and hand out its cancel token.
    ///
    /// Any older in-flight fetch is cancelled best-effort; the
    /// staleness check at commit time is the correctness backstop.
    fn begin_tick(&mut self) -> (u64, CancellationToken) {
        if let Some(previous) = self.in_flight_cancel.take() {
            previous.cancel();
        }

        self.state.in_flight_generation += 1;
        let generation = self.state.in_flight_generation;

        let cancel = CancellationToken::new();
        self.in_flight_cancel = Some(cancel.clone());
        (generation, cancel)
    }

    /// Resolve a fetch for `generation`: commit, discard, or record the
    /// failure. Commits are accepted only for the newest generation, so
    /// out-of-order network completions can never regress the display.
    fn complete(
        &mut self,
        generation: u64,
        result: Result<SourceFetch, rideview_api::Error>,
    ) -> TickOutcome {
        match result {
            Ok(SourceFetch::Cancelled) => {
                debug!(generation, "fetch cancelled");
                TickOutcome::Cancelled { generation }
            }
            Ok(SourceFetch::Snapshot(snapshot)) => {
                if generation != self.state.in_flight_generation
                    || generation < self.state.last_committed_generation
                {
                    debug!(generation, "discarding superseded fetch result");
                    return TickOutcome::Stale { generation };
                }

                let collection = convert::feature_collection(&snapshot);
                let vehicles = collection.features.len();
                self.surface.set_geojson_data(VEHICLES_SOURCE, collection);
                self.state.last_committed_generation = generation;
                self.state.consecutive_failures = 0;
                debug!(generation, vehicles, "committed vehicle snapshot");
                TickOutcome::Committed {
                    generation,
                    vehicles,
                }
            }
            Err(e) => {
                self.state.consecutive_failures += 1;
                self.state.last_error_at = Some(Utc::now());
                if self.state.consecutive_failures >= FAILURE_STREAK_WARN {
                    warn!(
                        generation,
                        failures = self.state.consecutive_failures,
                        error = %e,
                        "vehicle fetch failing repeatedly; keeping last committed snapshot"
                    );
                } else {
                    debug!(generation, error = %e, "vehicle fetch failed; keeping last committed snapshot");
                }
                TickOutcome::Failed { generation }
            }
        }
    }

    /// Run one poll cycle.
    pub async fn tick(&mut self) -> TickOutcome {
        if !self.ensure_installed() {
            return TickOutcome::NotReady;
        }

        // Unavailable is a skip, not an error: no generation is spent
        // and committed state does not advance.
        let Some(region) = viewport::current_region(self.surface.as_ref()) else {
            debug!("viewport unavailable; skipping cycle");
            return TickOutcome::Unavailable;
        };

        let (generation, cancel) = self.begin_tick();
        let result = self.source.fetch(&region, &cancel).await;
        self.complete(generation, result)
    }

    /// Drive the poll cycle until `cancel` fires.
    ///
    /// The first tick runs immediately; subsequent ticks follow the
    /// configured interval, and a cycle that overruns its period delays
    /// the next tick instead of firing a catch-up burst. Per-cycle
    /// failures never stop the timer. Teardown cancels any in-flight
    /// fetch, drops its cycle uncommitted, and leaves installed
    /// sources/layers in place.
    pub async fn run(mut self, cancel: CancellationToken) {
        let mut interval = tokio::time::interval(self.options.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                _ = interval.tick() => {}
            }

            // The cycle races teardown: a fetch still in flight when
            // `cancel` fires is dropped here, before it can commit.
            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                outcome = self.tick() => debug!(?outcome, "poll cycle finished"),
            }
        }

        if let Some(in_flight) = self.in_flight_cancel.take() {
            in_flight.cancel();
        }
        debug!("live-layer sync torn down");
    }
}

fn empty_collection() -> geojson::FeatureCollection {
    geojson::FeatureCollection {
        bbox: None,
        features: Vec::new(),
        foreign_members: None,
    }
}
