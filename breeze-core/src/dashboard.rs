//! Aggregation service: the one owner of the dashboard view state.
//!
//! A refresh runs the three feed fetches concurrently, merges them into one
//! bundle and publishes it through a watch channel. When the bundle is
//! incomplete the service substitutes a fixed fallback bundle instead, so
//! the view is never left empty after an error.
//!
//! Overlapping refreshes (auto-refresh timer vs a manual trigger) are
//! resolved by sequence number: every invocation takes a monotonically
//! increasing number at start, and a settling invocation applies its bundle
//! only if no higher number has been applied yet. The latest-started
//! refresh wins regardless of completion order.

use chrono::{DateTime, Days, NaiveDate, Utc};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use crate::model::{AirQualitySnapshot, ForecastDay, Location, TempRange, WeatherSnapshot};
use crate::provider::WeatherFeed;

/// Period of the auto-refresh timer armed by [`Dashboard::set_location`].
pub const REFRESH_PERIOD: Duration = Duration::from_secs(600);

/// Where the currently published data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataOrigin {
    /// A completed fetch (live or demo-mode data).
    Fetched,
    /// The fixed fallback bundle, substituted after an incomplete fetch.
    Fallback,
}

/// The published view state. Starts empty; the three data fields are only
/// ever replaced together.
#[derive(Debug, Clone, Default)]
pub struct DashboardState {
    pub weather: Option<WeatherSnapshot>,
    pub forecast: Vec<ForecastDay>,
    pub air_quality: Option<AirQualitySnapshot>,
    pub is_loading: bool,
    pub last_updated: Option<DateTime<Utc>>,
    pub origin: Option<DataOrigin>,
}

#[derive(Debug)]
pub struct Dashboard {
    feed: Arc<dyn WeatherFeed>,
    tx: watch::Sender<DashboardState>,
    next_seq: AtomicU64,
    applied_seq: AtomicU64,
    in_flight: AtomicUsize,
    timer: Mutex<Option<JoinHandle<()>>>,
}

impl Dashboard {
    pub fn new(feed: Arc<dyn WeatherFeed>) -> Arc<Self> {
        let (tx, _) = watch::channel(DashboardState::default());

        Arc::new(Self {
            feed,
            tx,
            next_seq: AtomicU64::new(0),
            applied_seq: AtomicU64::new(0),
            in_flight: AtomicUsize::new(0),
            timer: Mutex::new(None),
        })
    }

    /// Watch the published state. The receiver sees every update.
    pub fn subscribe(&self) -> watch::Receiver<DashboardState> {
        self.tx.subscribe()
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> DashboardState {
        self.tx.borrow().clone()
    }

    /// Run one aggregation pass for the given coordinates.
    ///
    /// Always settles: on completion the data fields are replaced together,
    /// `last_updated` is stamped and `is_loading` cleared. A pass that is
    /// superseded by a later-started one still clears the loading flag but
    /// has its data discarded.
    pub async fn refresh(&self, lat: f64, lon: f64) {
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed) + 1;
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        self.tx.send_modify(|state| state.is_loading = true);

        let (weather, forecast, air_quality) = tokio::join!(
            self.feed.fetch_weather(lat, lon),
            self.feed.fetch_forecast(lat, lon),
            self.feed.fetch_air_quality(lat, lon),
        );

        // Forecast absence is tolerated; missing weather or air quality
        // makes the whole pass a failure.
        let bundle = match (weather, air_quality) {
            (Some(weather), Some(air_quality)) => {
                info!(lat, lon, "aggregation pass complete");
                Bundle {
                    weather,
                    forecast: forecast.unwrap_or_default(),
                    air_quality,
                    origin: DataOrigin::Fetched,
                }
            }
            _ => {
                warn!(lat, lon, "aggregation pass incomplete, substituting fallback data");
                fallback_bundle(Utc::now().date_naive())
            }
        };

        let settled_last = self.in_flight.fetch_sub(1, Ordering::SeqCst) == 1;

        // The channel serializes modify closures, so checking the sequence
        // number and writing the bundle happen as one step; a stale pass
        // settling between another pass's check and write cannot sneak its
        // bundle in.
        self.tx.send_modify(|state| {
            if self.applied_seq.fetch_max(seq, Ordering::SeqCst) < seq {
                state.weather = Some(bundle.weather);
                state.forecast = bundle.forecast;
                state.air_quality = Some(bundle.air_quality);
                state.last_updated = Some(Utc::now());
                state.origin = Some(bundle.origin);
            }
            if settled_last {
                state.is_loading = false;
            }
        });
    }

    /// Re-arm the auto-refresh timer for a newly selected location, or
    /// cancel it when the location is cleared.
    ///
    /// At most one timer is active at a time. The spawned task holds only a
    /// weak reference, so it also stops once the dashboard is dropped. The
    /// initial fetch for a new location is the caller's move; the timer
    /// fires first after one full period.
    pub fn set_location(self: &Arc<Self>, location: Option<&Location>) {
        let mut timer = self.timer.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(handle) = timer.take() {
            handle.abort();
        }

        let Some(location) = location else { return };
        let Some(coords) = location.coords() else {
            warn!(label = %location.label, "selected location has unparsable coordinates");
            return;
        };

        let weak = Arc::downgrade(self);
        *timer = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(REFRESH_PERIOD);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately; the caller already
            // fetched once for the new location.
            ticker.tick().await;

            loop {
                ticker.tick().await;
                let Some(dashboard) = weak.upgrade() else { break };
                dashboard.refresh(coords.lat, coords.lon).await;
            }
        }));
    }
}

impl Drop for Dashboard {
    fn drop(&mut self) {
        if let Ok(timer) = self.timer.get_mut()
            && let Some(handle) = timer.take()
        {
            handle.abort();
        }
    }
}

struct Bundle {
    weather: WeatherSnapshot,
    forecast: Vec<ForecastDay>,
    air_quality: AirQualitySnapshot,
    origin: DataOrigin,
}

/// The fixed bundle shown after a failed aggregation pass. Deliberately
/// deterministic, unlike the randomized demo mode in the client.
fn fallback_bundle(today: NaiveDate) -> Bundle {
    const DESCRIPTIONS: [&str; 5] = ["sunny", "cloudy", "rainy", "partly cloudy", "clear"];
    const ICONS: [&str; 5] = ["01d", "03d", "10d", "02d", "01d"];

    let forecast = (1..=5_u64)
        .filter_map(|i| today.checked_add_days(Days::new(i)).map(|date| (i, date)))
        .map(|(i, date)| ForecastDay {
            date,
            temperature: TempRange {
                min: 18.0 + i as f64,
                max: 28.0 + i as f64,
            },
            description: DESCRIPTIONS[i as usize - 1].into(),
            icon: ICONS[i as usize - 1].into(),
            humidity: 60 + 2 * i as u8,
            wind_speed: 2.5 + 0.5 * i as f64,
            precipitation_mm: if i == 3 { 2.5 } else { 0.0 },
        })
        .collect();

    Bundle {
        weather: WeatherSnapshot {
            temperature: 22.0,
            feels_like: 24.0,
            humidity: 65,
            wind_speed: 3.2,
            uv_index: 4.0,
            pressure: 1013,
            visibility_km: 10.0,
            description: "partly cloudy".into(),
            icon: "02d".into(),
        },
        forecast,
        air_quality: AirQualitySnapshot {
            aqi: 75,
            pm25: 15.0,
            pm10: 25.0,
            co: 200.0,
            no2: 30.0,
            o3: 120.0,
            so2: 10.0,
        },
        origin: DataOrigin::Fallback,
    }
}
