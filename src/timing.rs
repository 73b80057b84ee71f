use crate::constants::*;
use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How often the node samples, averages and reports.
///
/// Counts and durations are kept signed so that a negative value in a file
/// or override is reported against its field instead of failing to parse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimingConfig {
    /// seconds between consecutive angle reads
    pub sampling_period_s: i64,

    /// consecutive reads folded into one stored average
    pub samples_per_average: i64,

    /// number of averages kept and reported together
    pub averages_stored: i64,

    /// deviation in degrees above which the stored averages are reported
    pub angle_threshold_deg: f64,

    /// spacing between consecutive publishes of one batch
    pub publish_delay_ms: i64,

    /// hours between voltage reports, 0 turns them off
    pub voltage_report_interval_h: i64,

    /// span the stored averages are meant to cover, checked when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history_window_min: Option<i64>,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            sampling_period_s: SAMPLING_PERIOD_S,
            samples_per_average: SAMPLES_PER_AVERAGE,
            averages_stored: AVERAGES_STORED,
            angle_threshold_deg: ANGLE_THRESHOLD_DEG,
            publish_delay_ms: PUBLISH_DELAY_MS,
            voltage_report_interval_h: VOLTAGE_REPORT_INTERVAL_H,
            history_window_min: Some(HISTORY_WINDOW_MIN),
        }
    }
}

fn positive(field: &'static str, value: i64) -> Result<()> {
    if value <= 0 {
        return Err(ConfigError::invalid(
            field,
            format!("must be positive, got {value}"),
        ));
    }
    Ok(())
}

fn non_negative(field: &'static str, value: i64) -> Result<()> {
    if value < 0 {
        return Err(ConfigError::invalid(
            field,
            format!("must not be negative, got {value}"),
        ));
    }
    Ok(())
}

fn secs(value: i64) -> Duration {
    Duration::from_secs(value.max(0) as u64)
}

impl TimingConfig {
    pub fn validate(&self) -> Result<()> {
        positive("timing.sampling_period_s", self.sampling_period_s)?;
        positive("timing.samples_per_average", self.samples_per_average)?;
        positive("timing.averages_stored", self.averages_stored)?;
        non_negative("timing.publish_delay_ms", self.publish_delay_ms)?;
        non_negative(
            "timing.voltage_report_interval_h",
            self.voltage_report_interval_h,
        )?;

        if !self.angle_threshold_deg.is_finite() || self.angle_threshold_deg < 0.0 {
            return Err(ConfigError::invalid(
                "timing.angle_threshold_deg",
                format!(
                    "must be a finite angle >= 0, got {}",
                    self.angle_threshold_deg
                ),
            ));
        }

        if self.voltage_report_interval_h.checked_mul(3600).is_none() {
            return Err(ConfigError::invalid(
                "timing.voltage_report_interval_h",
                "too large",
            ));
        }

        let history_s = self.history_window_s()?;

        if let Some(declared) = self.history_window_min {
            positive("timing.history_window_min", declared)?;
            if declared.checked_mul(60) != Some(history_s) {
                return Err(ConfigError::invalid(
                    "timing.history_window_min",
                    format!(
                        "declared {declared} min but {} s x {} samples x {} averages covers {history_s} s",
                        self.sampling_period_s, self.samples_per_average, self.averages_stored
                    ),
                ));
            }
        }

        // a whole batch of publishes should fit between two reads
        let batch_ms = self.publish_delay_ms.saturating_mul(self.averages_stored);
        if batch_ms >= self.sampling_period_s.saturating_mul(1000) {
            tracing::warn!(
                "Publishing {} averages {} ms apart takes {batch_ms} ms, longer than the {} s sampling period",
                self.averages_stored,
                self.publish_delay_ms,
                self.sampling_period_s
            );
        }

        Ok(())
    }

    fn history_window_s(&self) -> Result<i64> {
        self.sampling_period_s
            .checked_mul(self.samples_per_average)
            .and_then(|w| w.checked_mul(self.averages_stored))
            .ok_or_else(|| {
                ConfigError::invalid(
                    "timing",
                    "sampling period x samples x averages overflows",
                )
            })
    }

    pub fn sampling_period(&self) -> Duration {
        secs(self.sampling_period_s)
    }

    /// Time spanned by the reads behind one stored average
    pub fn averaging_window(&self) -> Duration {
        secs(self.sampling_period_s.saturating_mul(self.samples_per_average))
    }

    /// Time spanned by all stored averages together
    pub fn history_window(&self) -> Duration {
        secs(
            self.sampling_period_s
                .saturating_mul(self.samples_per_average)
                .saturating_mul(self.averages_stored),
        )
    }

    pub fn publish_delay(&self) -> Duration {
        Duration::from_millis(self.publish_delay_ms.max(0) as u64)
    }

    /// `None` when voltage reporting is off
    pub fn voltage_report_interval(&self) -> Option<Duration> {
        if self.voltage_report_interval_h > 0 {
            Some(secs(self.voltage_report_interval_h.saturating_mul(3600)))
        } else {
            None
        }
    }

    /// Whether an angle deviation should trigger a report
    pub fn exceeds_threshold(&self, deviation_deg: f64) -> bool {
        deviation_deg.abs() > self.angle_threshold_deg
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_cover_thirty_minutes() {
        let timing = TimingConfig::default();
        timing.validate().unwrap();

        assert_eq!(timing.sampling_period(), Duration::from_secs(30));
        assert_eq!(timing.averaging_window(), Duration::from_secs(6 * 60));
        assert_eq!(timing.history_window(), Duration::from_secs(30 * 60));
        assert_eq!(timing.publish_delay(), Duration::from_millis(450));
        assert_eq!(
            timing.voltage_report_interval(),
            Some(Duration::from_secs(4 * 3600))
        );
    }

    #[test]
    fn test_sampling_period_must_be_positive() {
        for period in [0, -1, -30, i64::MIN] {
            let timing = TimingConfig {
                sampling_period_s: period,
                history_window_min: None,
                ..Default::default()
            };
            let err = timing.validate().unwrap_err();
            assert!(matches!(
                err,
                ConfigError::InvalidField {
                    field: "timing.sampling_period_s",
                    ..
                }
            ));
        }
    }

    #[test]
    fn test_counts_must_be_positive() {
        let timing = TimingConfig {
            samples_per_average: 0,
            ..Default::default()
        };
        timing.validate().unwrap_err();

        let timing = TimingConfig {
            averages_stored: -5,
            ..Default::default()
        };
        timing.validate().unwrap_err();
    }

    #[test]
    fn test_delays_may_be_zero_but_not_negative() {
        let timing = TimingConfig {
            publish_delay_ms: 0,
            voltage_report_interval_h: 0,
            ..Default::default()
        };
        timing.validate().unwrap();
        assert_eq!(timing.voltage_report_interval(), None);

        let timing = TimingConfig {
            publish_delay_ms: -1,
            ..Default::default()
        };
        timing.validate().unwrap_err();

        let timing = TimingConfig {
            voltage_report_interval_h: -4,
            ..Default::default()
        };
        timing.validate().unwrap_err();
    }

    #[test]
    fn test_threshold_bounds() {
        for bad in [-0.5, f64::NAN, f64::INFINITY] {
            let timing = TimingConfig {
                angle_threshold_deg: bad,
                ..Default::default()
            };
            timing.validate().unwrap_err();
        }

        let timing = TimingConfig {
            angle_threshold_deg: 0.0,
            ..Default::default()
        };
        timing.validate().unwrap();
    }

    #[test]
    fn test_declared_history_window_is_checked() {
        let timing = TimingConfig {
            sampling_period_s: 60,
            ..Default::default()
        };
        let err = timing.validate().unwrap_err();
        assert!(err.to_string().starts_with("timing.history_window_min"));

        let timing = TimingConfig {
            sampling_period_s: 60,
            history_window_min: Some(60),
            ..Default::default()
        };
        timing.validate().unwrap();

        let timing = TimingConfig {
            sampling_period_s: 60,
            history_window_min: None,
            ..Default::default()
        };
        timing.validate().unwrap();
    }

    #[test]
    fn test_overflow_is_rejected() {
        let timing = TimingConfig {
            sampling_period_s: i64::MAX,
            history_window_min: None,
            ..Default::default()
        };
        timing.validate().unwrap_err();
    }

    #[test]
    fn test_exceeds_threshold() {
        let timing = TimingConfig::default();
        assert!(!timing.exceeds_threshold(7.0));
        assert!(timing.exceeds_threshold(7.01));
        assert!(timing.exceeds_threshold(-12.5));
        assert!(!timing.exceeds_threshold(-3.0));
    }
}
