// src/constants.rs

/// The reserved checkpoint recorded at construction. It is time-zero for every
/// elapsed-time calculation.
pub const INIT_CHECKPOINT: &str = "init_reqprobe";

/// The lifecycle stage that triggers persisting or rendering the event log.
pub const TERMINAL_STAGE: &str = "shutdown";

/// The query parameter a host inspects to decide whether a request is an
/// interactive debug request.
pub const DEBUG_QUERY_KEY: &str = "reqprobe";

/// The name of the directory holding reqprobe configuration and data.
pub const APP_DIR: &str = "reqprobe";

/// The name of the configuration file (inside the config directory).
pub const CONFIG_FILENAME: &str = "reqprobe.toml";

/// The name of the default log file (inside the data directory).
pub const LOG_FILENAME: &str = "error.log";

/// Timestamp layout used for every log entry (UTC).
pub const LOG_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Placeholder written to the log for empty values.
pub const EMPTY_PLACEHOLDER: &str = "-Empty-";

/// Placeholder written to the log for `null`.
pub const NULL_PLACEHOLDER: &str = "Null";
