// src/models.rs

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::path::PathBuf;

// --- CONFIGURATION MODELS ---

/// Where the event log goes once the terminal stage is reached.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogMode {
    /// Keep the event log in memory only.
    #[default]
    None,
    /// Append the event log to the log file.
    File,
    /// Render the event log to the page sink.
    Page,
}

impl LogMode {
    /// Maps the legacy numeric selector (0, 1, 2) to a mode.
    pub fn from_legacy(value: i64) -> Option<Self> {
        match value {
            0 => Some(Self::None),
            1 => Some(Self::File),
            2 => Some(Self::Page),
            _ => None,
        }
    }

    /// Parses a mode name. Accepts the legacy digits as well.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "none" | "off" | "0" => Some(Self::None),
            "file" | "log" | "1" => Some(Self::File),
            "page" | "dump" | "2" => Some(Self::Page),
            _ => None,
        }
    }
}

impl fmt::Display for LogMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::None => "none",
            Self::File => "file",
            Self::Page => "page",
        };
        f.write_str(name)
    }
}

/// `log_mode` may be written as a name or as the legacy integer.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawLogMode {
    Name(String),
    Legacy(i64),
}

impl<'de> Deserialize<'de> for LogMode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match RawLogMode::deserialize(deserializer)? {
            RawLogMode::Name(name) => Self::parse(&name).ok_or_else(|| {
                serde::de::Error::custom(format!(
                    "unknown log_mode '{}', expected one of: none, file, page",
                    name
                ))
            }),
            RawLogMode::Legacy(value) => Self::from_legacy(value).ok_or_else(|| {
                serde::de::Error::custom(format!(
                    "unknown log_mode {}, expected 0, 1 or 2",
                    value
                ))
            }),
        }
    }
}

/// Represents the deserialized structure of a `reqprobe.toml` file.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct ConfigFile {
    pub log_mode: LogMode,
    pub annotate_location: bool,
    /// Raw path template; `~` and environment variables are expanded on load.
    pub log_path: Option<String>,
}

/// The fully resolved profiler configuration.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ProfilerConfig {
    pub log_mode: LogMode,
    /// Append a `< L:.. F:.. >` call-site marker to dumps and log lines.
    pub annotate_location: bool,
    pub log_path: PathBuf,
}

impl ProfilerConfig {
    pub fn new(log_path: impl Into<PathBuf>) -> Self {
        Self {
            log_mode: LogMode::None,
            annotate_location: false,
            log_path: log_path.into(),
        }
    }

    pub fn with_log_mode(mut self, log_mode: LogMode) -> Self {
        self.log_mode = log_mode;
        self
    }

    pub fn with_annotate_location(mut self, annotate: bool) -> Self {
        self.annotate_location = annotate;
        self
    }
}

// --- DEBUG ACTIVATION ---

/// The sub-mode selected by the value of the debug query parameter.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DebugMode {
    /// Plain dumps only.
    #[default]
    Dump,
    /// Full system report (requires authorization).
    SystemInfo,
    /// Force the event log onto the page at shutdown.
    PageData,
}

/// The host's verdict on whether the current request is an interactive debug
/// request. Computed once per request, outside of the profiler.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DebugRequest {
    pub active: bool,
    pub mode: DebugMode,
}

impl DebugRequest {
    pub fn inactive() -> Self {
        Self::default()
    }

    pub fn active(mode: DebugMode) -> Self {
        Self { active: true, mode }
    }

    /// Builds the request from the value of the `reqprobe` query parameter.
    /// `None` means the parameter was absent.
    pub fn from_param(value: Option<&str>) -> Self {
        match value {
            None => Self::inactive(),
            Some("phpinfo") | Some("sysinfo") => Self::active(DebugMode::SystemInfo),
            Some("pagedata") => Self::active(DebugMode::PageData),
            Some(_) => Self::active(DebugMode::Dump),
        }
    }
}

// --- LIFECYCLE MODELS ---

/// The canonical lifecycle stages, in the order a host reaches them.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Bootstrap,
    Init,
    HeadersSent,
    FooterRendered,
    AdminHeader,
    AdminFooter,
    Shutdown,
}

impl Stage {
    pub const ALL: [Self; 7] = [
        Self::Bootstrap,
        Self::Init,
        Self::HeadersSent,
        Self::FooterRendered,
        Self::AdminHeader,
        Self::AdminFooter,
        Self::Shutdown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bootstrap => "bootstrap",
            Self::Init => "init",
            Self::HeadersSent => "headers_sent",
            Self::FooterRendered => "footer_rendered",
            Self::AdminHeader => "admin_header",
            Self::AdminFooter => "admin_footer",
            Self::Shutdown => crate::constants::TERMINAL_STAGE,
        }
    }

    /// Stages that only fire on administrative pages.
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::AdminHeader | Self::AdminFooter)
    }
}

impl AsRef<str> for Stage {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the event log.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct LifecycleEntry {
    pub event: String,
    /// Seconds since the initial checkpoint.
    pub elapsed: f64,
    /// Seconds since the previous entry (equals `elapsed` for the first one).
    pub diff: f64,
    /// Wall-clock unix seconds at the time of recording.
    pub recorded_at: f64,
    /// Humanized resident memory, e.g. `"12.40 MB"`.
    pub memory: String,
}
