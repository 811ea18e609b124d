//! Report time window
//!
//! Bounds are inclusive and expressed in the same unit as Slack `ts` values
//! (fractional seconds since the epoch). Dates are interpreted in local time.

use crate::config::ConfigError;
use chrono::{DateTime, Duration, Local, NaiveDate, NaiveDateTime, TimeZone};

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq)]
pub struct TimeRange {
    start: Option<f64>,
    end: Option<f64>,
    start_label: Option<String>,
    end_label: Option<String>,
}

impl TimeRange {
    /// No bounds on either side
    pub fn unbounded() -> Self {
        Self {
            start: None,
            end: None,
            start_label: None,
            end_label: None,
        }
    }

    /// Raw bounds without date labels
    pub fn between(start: Option<f64>, end: Option<f64>) -> Self {
        Self {
            start,
            end,
            start_label: start.map(label_for),
            end_label: end.map(label_for),
        }
    }

    /// Build a range from `yyyy-mm-dd` dates
    ///
    /// The start bound is local midnight of the start date. The end bound is
    /// the last microsecond of the end date so the whole end day is included.
    pub fn from_dates(start: Option<&str>, end: Option<&str>) -> Result<Self, ConfigError> {
        let start_dt = start
            .map(|s| parse_date(s).and_then(|d| local_at(d, 0, 0, 0, 0)))
            .transpose()?;
        let end_dt = end
            .map(|s| parse_date(s).and_then(|d| local_at(d, 23, 59, 59, 999_999)))
            .transpose()?;

        if let (Some(s), Some(e)) = (&start_dt, &end_dt) {
            if s > e {
                return Err(ConfigError::InvalidValue(format!(
                    "start date {} is after end date {}",
                    s.format(DATE_FORMAT),
                    e.format(DATE_FORMAT)
                )));
            }
        }

        Ok(Self {
            start: start_dt.as_ref().map(epoch_seconds),
            end: end_dt.as_ref().map(epoch_seconds),
            start_label: start_dt.map(|d| d.format(DATE_FORMAT).to_string()),
            end_label: end_dt.map(|d| d.format(DATE_FORMAT).to_string()),
        })
    }

    /// The `days` days leading up to `now`
    pub fn days_back(days: u32, now: DateTime<Local>) -> Result<Self, ConfigError> {
        let start_dt = Duration::try_days(i64::from(days))
            .and_then(|span| now.checked_sub_signed(span))
            .ok_or_else(|| ConfigError::InvalidValue(format!("--days-back {} is out of range", days)))?;
        Ok(Self {
            start: Some(epoch_seconds(&start_dt)),
            end: Some(epoch_seconds(&now)),
            start_label: Some(start_dt.format(DATE_FORMAT).to_string()),
            end_label: Some(now.format(DATE_FORMAT).to_string()),
        })
    }

    pub fn start(&self) -> Option<f64> {
        self.start
    }

    pub fn end(&self) -> Option<f64> {
        self.end
    }

    /// Human-readable description, e.g. `(2024-01-01 - today)`
    pub fn label(&self) -> String {
        format!(
            "({} - {})",
            self.start_label.as_deref().unwrap_or("Beginning of time"),
            self.end_label.as_deref().unwrap_or("today")
        )
    }
}

impl Default for TimeRange {
    fn default() -> Self {
        Self::unbounded()
    }
}

fn parse_date(value: &str) -> Result<NaiveDate, ConfigError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| ConfigError::InvalidDate(value.to_string()))
}

fn local_at(date: NaiveDate, h: u32, m: u32, s: u32, micro: u32) -> Result<DateTime<Local>, ConfigError> {
    let naive: NaiveDateTime = date
        .and_hms_micro_opt(h, m, s, micro)
        .ok_or_else(|| ConfigError::InvalidDate(date.to_string()))?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .ok_or_else(|| ConfigError::InvalidDate(date.to_string()))
}

fn epoch_seconds<Tz: TimeZone>(dt: &DateTime<Tz>) -> f64 {
    dt.timestamp() as f64 + f64::from(dt.timestamp_subsec_micros()) / 1_000_000.0
}

fn label_for(timestamp: f64) -> String {
    DateTime::from_timestamp(timestamp.floor() as i64, 0)
        .map(|utc| utc.with_timezone(&Local).format(DATE_FORMAT).to_string())
        .unwrap_or_else(|| format!("{:.0}", timestamp))
}
