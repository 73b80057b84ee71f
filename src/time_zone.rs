use crate::constants::*;
use crate::error::{ConfigError, Result};
use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Fixed UTC offset used to timestamp reports
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeZoneConfig {
    pub utc_offset_hours: f64,
}

impl Default for TimeZoneConfig {
    fn default() -> Self {
        Self {
            utc_offset_hours: UTC_OFFSET_HOURS,
        }
    }
}

impl TimeZoneConfig {
    pub fn validate(&self) -> Result<()> {
        let hours = self.utc_offset_hours;

        if !(UTC_OFFSET_MIN_HOURS..=UTC_OFFSET_MAX_HOURS).contains(&hours) {
            return Err(ConfigError::invalid(
                "time_zone.utc_offset_hours",
                format!("{hours} is outside {UTC_OFFSET_MIN_HOURS}..={UTC_OFFSET_MAX_HOURS}"),
            ));
        }
        if (hours * 4.0).fract() != 0.0 {
            return Err(ConfigError::invalid(
                "time_zone.utc_offset_hours",
                format!("{hours} is not a whole number of quarter hours"),
            ));
        }

        Ok(())
    }

    pub fn offset_seconds(&self) -> i32 {
        (self.utc_offset_hours * 3600.0).round() as i32
    }

    pub fn fixed_offset(&self) -> Result<FixedOffset> {
        FixedOffset::east_opt(self.offset_seconds()).ok_or_else(|| {
            ConfigError::invalid(
                "time_zone.utc_offset_hours",
                format!("{} is not a valid offset", self.utc_offset_hours),
            )
        })
    }

    pub fn to_local(&self, utc: DateTime<Utc>) -> Result<DateTime<FixedOffset>> {
        Ok(self.fixed_offset()?.from_utc_datetime(&utc.naive_utc()))
    }

    /// Local timestamp in the layout used when reporting angles
    pub fn format_timestamp(&self, utc: DateTime<Utc>) -> Result<String> {
        Ok(self.to_local(utc)?.format(TIMESTAMP_PATTERN).to_string())
    }
}
