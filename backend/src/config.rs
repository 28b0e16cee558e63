use std::str::FromStr;
use std::time::Duration;

use chart::TickPolicy;
use chrono::TimeDelta;
use chrono_tz::Tz;

use crate::error::AppError;

#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Base URL of the inventory API, e.g. `http://localhost:8080/api`.
    /// History is fetched from `{backend_url}/inventory/product/{id}/history`.
    pub backend_url: String,

    /// Path of the JSON catalog (`{ "<group>": [item, ...] }`) loaded at startup.
    pub catalog_path: String,

    // =========================
    // Rotation
    // =========================
    /// How often the displayed item advances. Each advance triggers one
    /// history fetch for the newly selected item.
    pub rotation_period: Duration,

    /// Per-request HTTP timeout for history fetches.
    pub fetch_timeout: Duration,

    /// Fetches slower than this are logged under the `performance` target.
    pub slow_fetch: Duration,

    // =========================
    // Chart
    // =========================
    /// Length of the trailing window shown on the chart.
    pub window: TimeDelta,

    /// Zone used for tick alignment, labels and offset-less timestamps.
    pub display_tz: Tz,

    /// Container width (px) used when logging rendered frames.
    pub render_width: f64,

    pub tick_policy: TickPolicy,

    /// Emit JSON logs (production) instead of pretty output.
    pub json_logs: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend_url: "http://localhost:8080/api".to_string(),
            catalog_path: "catalog.json".to_string(),
            rotation_period: Duration::from_millis(5_000),
            fetch_timeout: Duration::from_millis(5_000),
            slow_fetch: Duration::from_millis(1_500),
            window: TimeDelta::hours(1),
            display_tz: chrono_tz::Europe::Tallinn,
            render_width: 760.0,
            tick_policy: TickPolicy::default(),
            json_logs: false,
        }
    }
}

fn parse<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, AppError>
where
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse::<T>().map_err(|e| AppError::Config {
            key,
            reason: format!("{raw:?}: {e}"),
        }),
    }
}

fn positive(key: &'static str, v: u64) -> Result<u64, AppError> {
    if v == 0 {
        return Err(AppError::Config {
            key,
            reason: "must be greater than zero".into(),
        });
    }
    Ok(v)
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup; missing keys keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let d = Self::default();

        let backend_url: String = parse(&lookup, "BACKEND_URL", d.backend_url)?;
        let catalog_path: String = parse(&lookup, "CATALOG_PATH", d.catalog_path)?;

        let rotation_ms = positive(
            "ROTATION_PERIOD_MS",
            parse(&lookup, "ROTATION_PERIOD_MS", d.rotation_period.as_millis() as u64)?,
        )?;
        let fetch_timeout_ms = positive(
            "FETCH_TIMEOUT_MS",
            parse(&lookup, "FETCH_TIMEOUT_MS", d.fetch_timeout.as_millis() as u64)?,
        )?;
        let slow_fetch_ms: u64 = parse(&lookup, "SLOW_FETCH_MS", d.slow_fetch.as_millis() as u64)?;
        let window_secs = positive(
            "WINDOW_SECS",
            parse(&lookup, "WINDOW_SECS", d.window.num_seconds() as u64)?,
        )?;
        let window_secs = i64::try_from(window_secs).map_err(|_| AppError::Config {
            key: "WINDOW_SECS",
            reason: "out of range".into(),
        })?;
        let window = TimeDelta::try_seconds(window_secs).ok_or(AppError::Config {
            key: "WINDOW_SECS",
            reason: "out of range".into(),
        })?;

        let display_tz = match lookup("DISPLAY_TZ") {
            None => d.display_tz,
            Some(raw) => raw.trim().parse::<Tz>().map_err(|e| AppError::Config {
                key: "DISPLAY_TZ",
                reason: format!("{raw:?}: {e}"),
            })?,
        };

        let render_width: f64 = parse(&lookup, "RENDER_WIDTH", d.render_width)?;
        if !render_width.is_finite() || render_width <= 0.0 {
            return Err(AppError::Config {
                key: "RENDER_WIDTH",
                reason: "must be a positive number".into(),
            });
        }

        let json_logs = lookup("APP_ENV").is_some_and(|v| v == "production");

        Ok(Self {
            backend_url: backend_url.trim_end_matches('/').to_string(),
            catalog_path,
            rotation_period: Duration::from_millis(rotation_ms),
            fetch_timeout: Duration::from_millis(fetch_timeout_ms),
            slow_fetch: Duration::from_millis(slow_fetch_ms),
            window,
            display_tz,
            render_width,
            tick_policy: d.tick_policy,
            json_logs,
        })
    }
}
