use crate::config::ConfigDocument;
use crate::constants::ENV_PREFIX;
use crate::device::DeviceSelector;
use crate::error::{ConfigError, Result};
use crate::output::{DebugFlags, DebugLevel, OutputPolicy};
use crate::variant::BuildVariant;
use num_traits::FromPrimitive;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;

/// Values taken from `ANGLE_NODE_*` variables in place of the compiled-in ones.
///
/// `variant`, `device` and `document_path` choose what gets loaded and are
/// read by the caller; everything else is written into the document by
/// [`Overrides::apply`]. Sensor wiring and calibration are never overridable.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Overrides {
    pub variant: Option<BuildVariant>,
    pub device: Option<DeviceSelector>,
    pub document_path: Option<PathBuf>,

    pub serial_enabled: Option<bool>,
    pub cloud_enabled: Option<bool>,
    pub debug: Option<DebugFlags>,
    pub serial_baud_rate: Option<u32>,
    pub policy: Option<OutputPolicy>,

    pub sampling_period_s: Option<i64>,
    pub samples_per_average: Option<i64>,
    pub averages_stored: Option<i64>,
    pub history_window_min: Option<Option<i64>>,
    pub angle_threshold_deg: Option<f64>,
    pub publish_delay_ms: Option<i64>,
    pub voltage_report_interval_h: Option<i64>,

    pub utc_offset_hours: Option<f64>,
}

fn parse<T>(var: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| ConfigError::invalid_override(var, format!("{value:?} - {e}")))
}

fn parse_bool(var: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "on" | "yes" => Ok(true),
        "false" | "0" | "off" | "no" => Ok(false),
        _ => Err(ConfigError::invalid_override(
            var,
            format!("{value:?} is not a boolean"),
        )),
    }
}

/// Comma separated numeric levels, empty for none
fn parse_debug_levels(var: &str, value: &str) -> Result<DebugFlags> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            let n: u8 = parse(var, s)?;
            DebugLevel::from_u8(n).ok_or_else(|| {
                ConfigError::invalid_override(var, format!("no debug level {n}, expected 1..=3"))
            })
        })
        .collect()
}

fn parse_optional<T>(var: &str, value: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: Display,
{
    match value.trim().to_ascii_lowercase().as_str() {
        "" | "none" => Ok(None),
        _ => parse(var, value).map(Some),
    }
}

impl Overrides {
    pub fn from_env() -> Result<Self> {
        Self::from_vars(std::env::vars())
    }

    /// Collect overrides from `(name, value)` pairs, ignoring names without the prefix
    pub fn from_vars<I, K, V>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut overrides = Self::default();

        for (key, value) in vars {
            let (var, value) = (key.as_ref(), value.as_ref());
            let Some(name) = var.strip_prefix(ENV_PREFIX) else {
                continue;
            };

            match name {
                "VARIANT" => overrides.variant = Some(parse(var, value)?),
                "DEVICE" => overrides.device = Some(parse(var, value)?),
                "CONFIG" => overrides.document_path = Some(PathBuf::from(value)),
                "SERIAL" => overrides.serial_enabled = Some(parse_bool(var, value)?),
                "CLOUD" => overrides.cloud_enabled = Some(parse_bool(var, value)?),
                "DEBUG_LEVELS" => overrides.debug = Some(parse_debug_levels(var, value)?),
                "BAUD_RATE" => overrides.serial_baud_rate = Some(parse(var, value)?),
                "POLICY" => overrides.policy = Some(parse(var, value)?),
                "SAMPLING_PERIOD_S" => overrides.sampling_period_s = Some(parse(var, value)?),
                "SAMPLES_PER_AVERAGE" => overrides.samples_per_average = Some(parse(var, value)?),
                "AVERAGES_STORED" => overrides.averages_stored = Some(parse(var, value)?),
                "HISTORY_WINDOW_MIN" => {
                    overrides.history_window_min = Some(parse_optional(var, value)?)
                }
                "ANGLE_THRESHOLD_DEG" => overrides.angle_threshold_deg = Some(parse(var, value)?),
                "PUBLISH_DELAY_MS" => overrides.publish_delay_ms = Some(parse(var, value)?),
                "VOLTAGE_REPORT_INTERVAL_H" => {
                    overrides.voltage_report_interval_h = Some(parse(var, value)?)
                }
                "UTC_OFFSET_HOURS" => overrides.utc_offset_hours = Some(parse(var, value)?),
                _ => {
                    return Err(ConfigError::invalid_override(
                        var,
                        "not a recognised setting",
                    ))
                }
            }
            tracing::debug!("Override {var}={value:?}");
        }

        Ok(overrides)
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Write every set value into `document`
    pub fn apply(&self, document: &mut ConfigDocument) {
        fn set<T: Clone>(slot: &mut T, value: &Option<T>) {
            if let Some(v) = value {
                *slot = v.clone();
            }
        }

        let output = &mut document.output;
        set(&mut output.serial_enabled, &self.serial_enabled);
        set(&mut output.cloud_enabled, &self.cloud_enabled);
        set(&mut output.debug, &self.debug);
        set(&mut output.serial_baud_rate, &self.serial_baud_rate);
        set(&mut output.policy, &self.policy);

        let timing = &mut document.timing;
        set(&mut timing.sampling_period_s, &self.sampling_period_s);
        set(&mut timing.samples_per_average, &self.samples_per_average);
        set(&mut timing.averages_stored, &self.averages_stored);
        set(&mut timing.history_window_min, &self.history_window_min);
        set(&mut timing.angle_threshold_deg, &self.angle_threshold_deg);
        set(&mut timing.publish_delay_ms, &self.publish_delay_ms);
        set(
            &mut timing.voltage_report_interval_h,
            &self.voltage_report_interval_h,
        );

        set(
            &mut document.time_zone.utc_offset_hours,
            &self.utc_offset_hours,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::DeviceIndex;

    #[test]
    fn test_from_vars() {
        let overrides = Overrides::from_vars([
            ("PATH", "/usr/bin"),
            ("ANGLE_NODE_VARIANT", "mpu9250"),
            ("ANGLE_NODE_DEVICE", "3"),
            ("ANGLE_NODE_SERIAL", "FALSE"),
            ("ANGLE_NODE_CLOUD", "on"),
            ("ANGLE_NODE_DEBUG_LEVELS", "1, 3"),
            ("ANGLE_NODE_ANGLE_THRESHOLD_DEG", "4.5"),
            ("ANGLE_NODE_HISTORY_WINDOW_MIN", "none"),
            ("ANGLE_NODE_UTC_OFFSET_HOURS", "-4"),
            ("ANGLE_NODE_POLICY", "allow-silent"),
        ])
        .unwrap();

        assert_eq!(overrides.variant, Some(BuildVariant::Mpu9250));
        assert_eq!(
            overrides.device,
            Some(DeviceSelector::Index(DeviceIndex::new(3).unwrap()))
        );
        assert_eq!(overrides.serial_enabled, Some(false));
        assert_eq!(overrides.cloud_enabled, Some(true));
        assert_eq!(
            overrides.debug,
            Some(DebugFlags {
                setup: true,
                sensor_data: false,
                trace: true,
            })
        );
        assert_eq!(overrides.angle_threshold_deg, Some(4.5));
        assert_eq!(overrides.history_window_min, Some(None));
        assert_eq!(overrides.utc_offset_hours, Some(-4.0));
        assert_eq!(overrides.policy, Some(OutputPolicy::AllowSilent));
    }

    #[test]
    fn test_empty_debug_levels_turns_all_off() {
        let overrides = Overrides::from_vars([("ANGLE_NODE_DEBUG_LEVELS", "")]).unwrap();
        assert_eq!(overrides.debug, Some(DebugFlags::default()));
    }

    #[test]
    fn test_errors_name_the_variable() {
        let cases = [
            ("ANGLE_NODE_SERIAL", "maybe"),
            ("ANGLE_NODE_SAMPLING_PERIOD_S", "thirty"),
            ("ANGLE_NODE_DEBUG_LEVELS", "1,4"),
            ("ANGLE_NODE_VARIANT", "mpu6500"),
            ("ANGLE_NODE_RAW_MIN", "100"),
        ];
        for (var, value) in cases {
            let err = Overrides::from_vars([(var, value)]).unwrap_err();
            assert!(
                err.to_string().starts_with(var),
                "{err} does not name {var}"
            );
        }
    }

    #[test]
    fn test_apply_only_touches_set_values() {
        let mut doc = BuildVariant::Mpu6050.document().unwrap();
        let before = doc.clone();

        Overrides::default().apply(&mut doc);
        assert_eq!(doc, before);
        assert!(Overrides::default().is_empty());

        let overrides = Overrides {
            sampling_period_s: Some(60),
            history_window_min: Some(Some(60)),
            publish_delay_ms: Some(0),
            ..Default::default()
        };
        overrides.apply(&mut doc);
        assert_eq!(doc.timing.sampling_period_s, 60);
        assert_eq!(doc.timing.history_window_min, Some(60));
        assert_eq!(doc.timing.publish_delay_ms, 0);
        assert_eq!(doc.timing.samples_per_average, before.timing.samples_per_average);
        assert_eq!(doc.sensor, before.sensor);
        doc.validate().unwrap();
    }
}
