//! Rotation loop: advances the displayed item on a fixed cadence, fetches its
//! history and publishes the rebuilt series.
//!
//! Data flow:
//! CatalogStore → RotationScheduler → PriceHistorySource → EventNormalizer →
//! SeriesBuilder → ChartViewStore

use std::sync::Arc;
use std::time::Duration;

use chart::{EventNormalizer, PriceHints, PriceHistoryRecord, SeriesBuilder};
use chrono_tz::Tz;
use rotation::{CatalogItem, FetchTicket, RotationScheduler, SelectionReason};
use tokio::sync::{broadcast, watch};
use tokio::task::JoinSet;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{Instrument, Span, debug, error, info, instrument, warn};

use crate::catalog::CatalogStore;
use crate::chart_view::ChartViewStore;
use crate::config::AppConfig;
use crate::history::{HistoryError, PriceHistorySource};
use crate::logger::{TraceId, fetch_span, warn_if_slow};
use crate::metrics::Counters;
use crate::time::{Clock, SystemClock};

const EVENT_CAPACITY: usize = 64;

/// Notification sent whenever the rotation selects a new item.
#[derive(Debug, Clone, PartialEq)]
pub enum RotationEvent {
    Activated {
        item: CatalogItem,
        generation: u64,
        reason: SelectionReason,
    },
}

#[derive(Debug, Clone, Copy)]
pub struct RotationSettings {
    pub period: Duration,
    pub slow_fetch: Duration,
    /// Zone applied to history timestamps that carry no offset.
    pub naive_zone: Tz,
}

impl From<&AppConfig> for RotationSettings {
    fn from(cfg: &AppConfig) -> Self {
        Self {
            period: cfg.rotation_period,
            slow_fetch: cfg.slow_fetch,
            naive_zone: cfg.display_tz,
        }
    }
}

struct FetchOutcome {
    ticket: FetchTicket,
    result: Result<Vec<PriceHistoryRecord>, HistoryError>,
}

/// Owns the rotation state. All decisions happen on the task running `run`;
/// fetches run concurrently and report back through a `JoinSet`.
pub struct RotationService {
    scheduler: RotationScheduler,
    settings: RotationSettings,
    normalizer: EventNormalizer,
    catalog: CatalogStore,
    source: Arc<dyn PriceHistorySource>,
    view: ChartViewStore,
    clock: Arc<dyn Clock>,
    counters: Counters,
    events: broadcast::Sender<RotationEvent>,
}

impl RotationService {
    pub fn new(
        settings: RotationSettings,
        catalog: CatalogStore,
        source: Arc<dyn PriceHistorySource>,
        view: ChartViewStore,
        counters: Counters,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            scheduler: RotationScheduler::new(),
            normalizer: EventNormalizer::new(settings.naive_zone),
            settings,
            catalog,
            source,
            view,
            clock: Arc::new(SystemClock),
            counters,
            events,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RotationEvent> {
        self.events.subscribe()
    }

    /// Runs until `shutdown` flips to `true` (or its sender is dropped).
    /// In-flight fetches are aborted on exit.
    #[instrument(name = "rotation_service", skip_all)]
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> anyhow::Result<()> {
        let mut ticker = interval(self.settings.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut in_flight: JoinSet<FetchOutcome> = JoinSet::new();

        info!(
            every_ms = self.settings.period.as_millis() as u64,
            "rotation service started"
        );

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }

                Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
                    match joined {
                        Ok(outcome) => self.on_fetch_resolved(outcome),
                        Err(e) if e.is_cancelled() => {}
                        Err(e) => error!(error = %e, "history fetch task failed"),
                    }
                }

                _ = ticker.tick() => {
                    self.on_tick(&mut in_flight).await;
                }
            }
        }

        let aborted = in_flight.len();
        in_flight.abort_all();
        while in_flight.join_next().await.is_some() {}

        info!(aborted, "rotation service stopped");
        Ok(())
    }

    async fn on_tick(&mut self, in_flight: &mut JoinSet<FetchOutcome>) {
        let catalog = self.catalog.get().await;

        let Some(selection) = self.scheduler.tick(&catalog) else {
            return;
        };

        Counters::incr(&self.counters.rotations);
        if selection.reason == SelectionReason::Fallback {
            Counters::incr(&self.counters.rotation_fallbacks);
        }

        info!(
            item_id = selection.item.item_id,
            item_name = %selection.item.item_name,
            index = selection.index,
            generation = selection.ticket.generation,
            "rotation advanced"
        );

        // No subscribers is fine.
        let _ = self.events.send(RotationEvent::Activated {
            item: selection.item,
            generation: selection.ticket.generation,
            reason: selection.reason,
        });

        self.dispatch(in_flight, selection.ticket);
    }

    fn dispatch(&self, in_flight: &mut JoinSet<FetchOutcome>, ticket: FetchTicket) {
        let source = Arc::clone(&self.source);
        let slow = self.settings.slow_fetch;
        let span = fetch_span(&TraceId::default(), ticket.item_id, ticket.generation);

        Counters::incr(&self.counters.fetch_dispatched);

        in_flight.spawn(
            async move {
                let result =
                    warn_if_slow("price_history", slow, source.price_history(ticket.item_id)).await;
                if let Ok(records) = &result {
                    Span::current().record("records", records.len());
                }
                FetchOutcome { ticket, result }
            }
            .instrument(span),
        );
    }

    fn on_fetch_resolved(&mut self, outcome: FetchOutcome) {
        let FetchOutcome { ticket, result } = outcome;

        if !self.scheduler.accept(&ticket) {
            Counters::incr(&self.counters.fetch_stale);
            return;
        }

        let Some(item) = self.scheduler.active().cloned() else {
            return;
        };

        match result {
            Ok(records) => {
                let events = self.normalizer.normalize(&records);
                let builder = SeriesBuilder::new(PriceHints {
                    base_price: item.base_price,
                    unit_price: Some(item.unit_price),
                });
                let series = builder.build(&events, self.clock.now());
                let samples = series.len();

                let version = self.view.publish(item, series);
                Counters::incr(&self.counters.fetch_applied);

                debug!(
                    item_id = ticket.item_id,
                    generation = ticket.generation,
                    records = records.len(),
                    events = events.len(),
                    samples,
                    version,
                    "series published"
                );
            }
            Err(e) => {
                Counters::incr(&self.counters.fetch_failed);
                warn!(
                    item_id = ticket.item_id,
                    generation = ticket.generation,
                    error = %e,
                    "history fetch failed"
                );
                self.view.set_error(ticket.item_id, e.to_string());
            }
        }
    }
}
