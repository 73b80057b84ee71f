/// Prefix of every environment variable the loader understands
pub const ENV_PREFIX: &str = "ANGLE_NODE_";

/// The list of valid baud rates
pub const BAUD_RATES: [u32; 9] = [1200, 2400, 4800, 9600, 19200, 38400, 57600, 115200, 230400];

/// USB serial rate used by both builds
pub const DEFAULT_BAUD_RATE: u32 = 9600;

/// Timestamp layout used when reporting angles
pub const TIMESTAMP_PATTERN: &str = "%Y-%m-%d %H:%M:%S";

// Timing defaults. 30 s reads, 12 per average and 5 stored averages cover 30 minutes.
pub const SAMPLING_PERIOD_S: i64 = 30;
pub const SAMPLES_PER_AVERAGE: i64 = 12;
pub const AVERAGES_STORED: i64 = 5;
pub const HISTORY_WINDOW_MIN: i64 = 30;

/// Angle in degrees above which the stored averages get reported
pub const ANGLE_THRESHOLD_DEG: f64 = 7.0;

/// Delay between consecutive angle publishes to the cloud
pub const PUBLISH_DELAY_MS: i64 = 450;

/// Hours between voltage reports, 0 disables them
pub const VOLTAGE_REPORT_INTERVAL_H: i64 = 4;

/// Local time zone of the deployment
pub const UTC_OFFSET_HOURS: f64 = -5.0;

/// I2C address of the MPU family with AD0 pulled low
pub const MPU_ADDR: u8 = 0x68;

/// I2C address of the MPU family with AD0 pulled high
pub const MPU_ADDR_ALT: u8 = 0x69;

/// PWR_MGMT_1, written once during setup to wake the part
pub const MPU_SETUP_REGISTER: u8 = 0x6B;

/// ACCEL_XOUT_H, start of the burst read for angles
pub const MPU_DATA_REGISTER: u8 = 0x3B;

/// WHO_AM_I identity register
pub const MPU_WHO_AM_I_REGISTER: u8 = 0x75;

// Raw accelerometer bounds that map onto -90..90 degrees
pub const RAW_MIN: i32 = 265;
pub const RAW_MAX: i32 = 402;

/// Angle span the raw bounds map onto
pub const MAPPED_MIN_DEG: f64 = -90.0;
pub const MAPPED_MAX_DEG: f64 = 90.0;

// Valid UTC offsets, in hours
pub const UTC_OFFSET_MIN_HOURS: f64 = -12.0;
pub const UTC_OFFSET_MAX_HOURS: f64 = 14.0;
