//! "Clean time": how long since the user started the program.
//!
//! Purely for display. The string is recomputed once a minute by
//! [`CleanTimeTicker`] and never touches the network.

use chrono::{DateTime, NaiveDateTime, Utc};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Refresh period of the ticker.
pub const TICK_INTERVAL: Duration = Duration::from_secs(60);

const MINUTES_IN_DAY: i64 = 1440;
const MINUTES_IN_MONTH: i64 = 43_200;
const MINUTES_IN_TWO_MONTHS: i64 = 86_400;

/// Parse the backend's start timestamp.
///
/// Accepts RFC 3339, and naive ISO-8601 (which is how the backend emits its
/// UTC timestamps) interpreted as UTC.
pub fn parse_start(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

fn plural(count: i64, one: &str, many: &str) -> String {
    if count == 1 {
        one.to_string()
    } else {
        many.replace("{}", &count.to_string())
    }
}

/// Distance between `start` and `now` in words (pt-BR), without suffix.
///
/// Thresholds follow the usual "time ago" rounding: under 30 seconds is
/// "menos de um minuto", under 45 minutes counts minutes, under 90 minutes is
/// "cerca de 1 hora", then hours, days, months and years.
pub fn format_elapsed(start: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - start).num_seconds().max(0);
    let minutes = (seconds as f64 / 60.0).round() as i64;

    if minutes < 1 {
        return "menos de um minuto".into();
    }
    if minutes < 45 {
        return plural(minutes, "1 minuto", "{} minutos");
    }
    if minutes < 90 {
        return "cerca de 1 hora".into();
    }
    if minutes < MINUTES_IN_DAY {
        let hours = (minutes as f64 / 60.0).round() as i64;
        return plural(hours, "cerca de 1 hora", "cerca de {} horas");
    }
    if minutes < 2520 {
        return "1 dia".into();
    }
    if minutes < MINUTES_IN_MONTH {
        let days = (minutes as f64 / MINUTES_IN_DAY as f64).round() as i64;
        return plural(days, "1 dia", "{} dias");
    }
    if minutes < MINUTES_IN_TWO_MONTHS {
        let months = (minutes as f64 / MINUTES_IN_MONTH as f64).round() as i64;
        return plural(months, "cerca de 1 mês", "cerca de {} meses");
    }

    let months = minutes / MINUTES_IN_MONTH;
    if months < 12 {
        return plural(months, "1 mês", "{} meses");
    }
    let years = months / 12;
    match months % 12 {
        0..=2 => plural(years, "cerca de 1 ano", "cerca de {} anos"),
        3..=8 => plural(years, "mais de 1 ano", "mais de {} anos"),
        _ => plural(years + 1, "quase 1 ano", "quase {} anos"),
    }
}

/// Format straight from the backend string; `None` if it cannot be parsed.
pub fn describe(raw_start: &str, now: DateTime<Utc>) -> Option<String> {
    parse_start(raw_start).map(|start| format_elapsed(start, now))
}

/// Background task that republishes the clean-time string every minute.
///
/// Dropping the ticker stops the task.
pub struct CleanTimeTicker {
    rx: watch::Receiver<String>,
    task: JoinHandle<()>,
}

impl CleanTimeTicker {
    /// Must be called inside a tokio runtime.
    pub fn spawn(start: DateTime<Utc>) -> Self {
        Self::spawn_with_period(start, TICK_INTERVAL)
    }

    pub fn spawn_with_period(start: DateTime<Utc>, period: Duration) -> Self {
        let (tx, rx) = watch::channel(format_elapsed(start, Utc::now()));
        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            // the first tick completes immediately; the initial value is already sent
            interval.tick().await;
            loop {
                interval.tick().await;
                if tx.send(format_elapsed(start, Utc::now())).is_err() {
                    break;
                }
            }
        });
        Self { rx, task }
    }

    /// Latest formatted value.
    pub fn current(&self) -> String {
        self.rx.borrow().clone()
    }

    /// A receiver that sees every refresh.
    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.rx.clone()
    }
}

impl Drop for CleanTimeTicker {
    fn drop(&mut self) {
        self.task.abort();
    }
}
