//! Published chart state shared between the rotation loop and readers.

use std::sync::Arc;

use chart::{ChartFrame, FrameComposer, Hover, Series};
use chrono::{DateTime, Timelike, Utc};
use parking_lot::{Mutex, RwLock};
use rotation::{CatalogItem, ItemId};
use tokio::sync::watch;

/// Last fetch failure, kept until the next successful publish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewError {
    pub item_id: ItemId,
    pub message: String,
}

/// Point-in-time copy of the published state.
#[derive(Debug, Clone, Default)]
pub struct ViewSnapshot {
    pub item: Option<CatalogItem>,
    pub series: Option<Arc<Series>>,
    pub version: u64,
    pub error: Option<ViewError>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FrameKey {
    version: u64,
    now_secs: DateTime<Utc>,
    width_bits: u64,
}

#[derive(Default)]
struct ViewState {
    item: Option<CatalogItem>,
    series: Option<Arc<Series>>,
    version: u64,
    error: Option<ViewError>,
}

/// Holds the displayed item and series behind a single lock.
///
/// Writers are the rotation loop only. Frames are derived on demand and
/// cached per `(version, now floored to the second, width)`.
#[derive(Clone)]
pub struct ChartViewStore {
    state: Arc<RwLock<ViewState>>,
    cache: Arc<Mutex<Option<(FrameKey, Arc<ChartFrame>)>>>,
    composer: FrameComposer,
    version_tx: Arc<watch::Sender<u64>>,
}

impl ChartViewStore {
    pub fn new(composer: FrameComposer) -> Self {
        let (version_tx, _) = watch::channel(0);
        Self {
            state: Arc::new(RwLock::new(ViewState::default())),
            cache: Arc::new(Mutex::new(None)),
            composer,
            version_tx: Arc::new(version_tx),
        }
    }

    pub fn composer(&self) -> &FrameComposer {
        &self.composer
    }

    /// Replaces the displayed series, clears any error and returns the new version.
    pub fn publish(&self, item: CatalogItem, series: Series) -> u64 {
        let version = {
            let mut g = self.state.write();
            g.version += 1;
            g.item = Some(item);
            g.series = Some(Arc::new(series));
            g.error = None;
            g.version
        };
        self.version_tx.send_replace(version);
        version
    }

    /// Records a fetch failure. The current series stays visible.
    pub fn set_error(&self, item_id: ItemId, message: impl Into<String>) {
        let mut g = self.state.write();
        g.error = Some(ViewError {
            item_id,
            message: message.into(),
        });
    }

    pub fn snapshot(&self) -> ViewSnapshot {
        let g = self.state.read();
        ViewSnapshot {
            item: g.item.clone(),
            series: g.series.clone(),
            version: g.version,
            error: g.error.clone(),
        }
    }

    pub fn version(&self) -> u64 {
        self.state.read().version
    }

    /// Frame for the published series, or `None` before the first publish.
    pub fn frame(&self, now: DateTime<Utc>, width: f64) -> Option<Arc<ChartFrame>> {
        let now = now.with_nanosecond(0).unwrap_or(now);

        let (item_name, series, version) = {
            let g = self.state.read();
            let item = g.item.as_ref()?;
            let series = g.series.clone()?;
            (item.item_name.clone(), series, g.version)
        };

        let key = FrameKey {
            version,
            now_secs: now,
            width_bits: width.to_bits(),
        };

        let mut cache = self.cache.lock();
        if let Some((k, frame)) = cache.as_ref() {
            if *k == key {
                return Some(Arc::clone(frame));
            }
        }

        let frame = Arc::new(self.composer.compose(&item_name, &series, now, width));
        *cache = Some((key, Arc::clone(&frame)));
        Some(frame)
    }

    /// Hover result for a pointer x-coordinate inside the plot area.
    pub fn locate(&self, now: DateTime<Utc>, width: f64, pointer_x: f64) -> Option<Hover> {
        let frame = self.frame(now, width)?;
        self.composer.hover(&frame, pointer_x)
    }

    /// Hover result for an explicit instant.
    pub fn locate_at(
        &self,
        now: DateTime<Utc>,
        width: f64,
        query: DateTime<Utc>,
    ) -> Option<Hover> {
        let frame = self.frame(now, width)?;
        self.composer.hover_at(&frame, query)
    }

    /// Receives the series version after every publish.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.version_tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chart::{PriceHints, SeriesBuilder, TickPolicy};
    use chrono::{TimeDelta, TimeZone};
    use chrono_tz::Europe::Tallinn;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 10, 1, 9, 37, 42).unwrap()
    }

    fn item(id: ItemId, unit_price: f64) -> CatalogItem {
        CatalogItem {
            item_id: id,
            item_name: format!("item-{id}"),
            unit_price,
            base_price: None,
            max_quantity: None,
        }
    }

    fn flat_series(price: f64) -> Series {
        SeriesBuilder::new(PriceHints {
            base_price: None,
            unit_price: Some(price),
        })
        .build(&[], now())
    }

    fn store() -> ChartViewStore {
        ChartViewStore::new(FrameComposer::new(
            TimeDelta::hours(1),
            Tallinn,
            TickPolicy::default(),
        ))
    }

    #[test]
    fn no_frame_before_first_publish() {
        let s = store();
        assert!(s.frame(now(), 760.0).is_none());
        assert!(s.locate(now(), 760.0, 10.0).is_none());
        assert_eq!(s.snapshot().version, 0);
    }

    #[test]
    fn publish_bumps_version_and_clears_error() {
        let s = store();
        s.set_error(1, "boom");
        assert!(s.snapshot().error.is_some());

        let v = s.publish(item(1, 2.0), flat_series(2.0));
        assert_eq!(v, 1);

        let snap = s.snapshot();
        assert_eq!(snap.version, 1);
        assert!(snap.error.is_none());
        assert_eq!(snap.item.map(|i| i.item_id), Some(1));
    }

    #[test]
    fn error_keeps_previous_series() {
        let s = store();
        s.publish(item(1, 2.0), flat_series(2.0));
        s.set_error(2, "timeout");

        let snap = s.snapshot();
        assert_eq!(snap.version, 1);
        assert_eq!(snap.item.map(|i| i.item_id), Some(1));
        assert_eq!(
            snap.error,
            Some(ViewError {
                item_id: 2,
                message: "timeout".into()
            })
        );
        assert!(s.frame(now(), 760.0).is_some());
    }

    #[test]
    fn frames_are_cached_within_the_same_second() {
        let s = store();
        s.publish(item(1, 2.0), flat_series(2.0));

        let a = s.frame(now(), 760.0).unwrap();
        let b = s
            .frame(now() + TimeDelta::milliseconds(400), 760.0)
            .unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.window.now, now());

        let wider = s.frame(now(), 1280.0).unwrap();
        assert!(!Arc::ptr_eq(&a, &wider));

        let later = s.frame(now() + TimeDelta::seconds(1), 760.0).unwrap();
        assert_eq!(later.window.now, now() + TimeDelta::seconds(1));

        s.publish(item(1, 3.0), flat_series(3.0));
        let republished = s.frame(now() + TimeDelta::seconds(1), 760.0).unwrap();
        assert!(!Arc::ptr_eq(&later, &republished));
    }

    #[test]
    fn locate_at_returns_tooltip() {
        let s = store();
        s.publish(item(1, 12.5), flat_series(12.5));

        let hover = s.locate_at(now(), 760.0, now()).unwrap();
        assert_eq!(hover.sample.price, 12.5);
        assert_eq!(hover.label, "12:37 • 12,50 €");
    }

    #[tokio::test]
    async fn subscribers_see_new_versions() {
        let s = store();
        let mut rx = s.subscribe();

        s.publish(item(1, 2.0), flat_series(2.0));
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), 1);
    }
}
