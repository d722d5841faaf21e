//! # Profiler
//!
//! The `Profiler` owns every piece of per-request instrumentation state: the
//! timer table, the memory table and the ordered lifecycle event log.
//!
//! A host constructs one profiler per request (or per process), hands it the
//! clock, memory reader and page sink it should use, and calls
//! [`Profiler::record_lifecycle_event`] at each stage boundary. Nothing here is
//! global: the profiler is passed explicitly to whatever needs it.
use crate::{
    constants::{INIT_CHECKPOINT, TERMINAL_STAGE},
    core::{
        format::{self, CallSite},
        report::{Authorizer, SystemReport},
        span::Span,
    },
    models::{DebugMode, DebugRequest, LifecycleEntry, LogMode, ProfilerConfig},
    system::{
        clock::{self, Clock, SystemClock},
        log_writer::{LogWriteError, LogWriter},
        memory::{MemoryProbe, ProcessMemory},
    },
};
use serde::Serialize;
use serde_json::Value;
use std::{
    collections::HashMap,
    fmt,
    io::{self, Write},
    panic::Location,
    time::Duration,
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProfilerError {
    #[error(transparent)]
    Log(#[from] LogWriteError),
    #[error("The system report requires administrative access.")]
    Forbidden,
    #[error("Could not serialize value: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("Could not render dump: {0}")]
    Render(#[from] io::Error),
}

/// What happened to a dump request.
#[must_use = "a suppressed dump means the debug switch was off"]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DumpOutcome {
    Rendered,
    /// The request is not a debug request; nothing was written.
    Suppressed,
}

/// Builds a [`Profiler`] with non-default collaborators.
pub struct ProfilerBuilder {
    config: ProfilerConfig,
    debug: DebugRequest,
    clock: Box<dyn Clock>,
    memory: Box<dyn MemoryProbe>,
    page: Box<dyn Write>,
}

impl fmt::Debug for ProfilerBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProfilerBuilder")
            .field("config", &self.config)
            .field("debug", &self.debug)
            .field("clock", &self.clock)
            .field("memory", &self.memory)
            .finish_non_exhaustive()
    }
}

impl ProfilerBuilder {
    pub fn debug(mut self, debug: DebugRequest) -> Self {
        self.debug = debug;
        self
    }

    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn memory(mut self, memory: impl MemoryProbe + 'static) -> Self {
        self.memory = Box::new(memory);
        self
    }

    /// Where dumps are rendered. Defaults to stdout.
    pub fn page(mut self, page: impl Write + 'static) -> Self {
        self.page = Box::new(page);
        self
    }

    pub fn build(self) -> Profiler {
        let mut config = self.config;
        if self.debug.active && self.debug.mode == DebugMode::PageData {
            log::debug!("Debug request asked for page data; forcing log mode to 'page'.");
            config.log_mode = LogMode::Page;
        }

        let mut profiler = Profiler {
            writer: LogWriter::new(config.log_path.clone()),
            config,
            debug: self.debug,
            clock: self.clock,
            memory: self.memory,
            page: self.page,
            timers: HashMap::new(),
            bytes: HashMap::new(),
            events: Vec::new(),
        };
        profiler.checkpoint(INIT_CHECKPOINT);
        log::debug!(
            "Profiler initialized (log_mode={}, annotate_location={}, debug={:?})",
            profiler.config.log_mode,
            profiler.config.annotate_location,
            profiler.debug
        );
        profiler
    }
}

/// Request-scoped timers, memory snapshots and lifecycle event log.
pub struct Profiler {
    config: ProfilerConfig,
    debug: DebugRequest,
    clock: Box<dyn Clock>,
    memory: Box<dyn MemoryProbe>,
    writer: LogWriter,
    page: Box<dyn Write>,
    timers: HashMap<String, Duration>,
    bytes: HashMap<String, u64>,
    events: Vec<LifecycleEntry>,
}

impl fmt::Debug for Profiler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Profiler")
            .field("config", &self.config)
            .field("debug", &self.debug)
            .field("timers", &self.timers)
            .field("bytes", &self.bytes)
            .field("events", &self.events)
            .finish_non_exhaustive()
    }
}

impl Profiler {
    /// A profiler on the process clock, reading process memory and dumping to stdout.
    pub fn new(config: ProfilerConfig, debug: DebugRequest) -> Self {
        Self::builder(config).debug(debug).build()
    }

    pub fn builder(config: ProfilerConfig) -> ProfilerBuilder {
        ProfilerBuilder {
            config,
            debug: DebugRequest::inactive(),
            clock: Box::new(SystemClock::new()),
            memory: Box::new(ProcessMemory),
            page: Box::new(io::stdout()),
        }
    }

    pub fn config(&self) -> &ProfilerConfig {
        &self.config
    }

    pub fn debug_request(&self) -> DebugRequest {
        self.debug
    }

    /// Whether the host should report lifecycle stages at all.
    pub fn tracks_lifecycle(&self) -> bool {
        self.config.log_mode != LogMode::None
    }

    // --- Checkpoints ---

    pub fn record_timer(&mut self, name: impl Into<String>) {
        let now = self.clock.now();
        self.timers.insert(name.into(), now);
    }

    pub fn record_memory(&mut self, name: impl Into<String>) {
        let usage = self.memory.current_usage();
        self.bytes.insert(name.into(), usage);
    }

    /// Records both a timer and a memory checkpoint under `name`.
    pub fn checkpoint(&mut self, name: &str) {
        self.record_timer(name);
        self.record_memory(name);
    }

    /// Time since the checkpoint `name`, or `None` if it was never recorded or
    /// the clock has not moved past it.
    pub fn elapsed_since(&self, name: &str) -> Option<Duration> {
        let recorded = *self.timers.get(name)?;
        let now = self.clock.now();
        (now > recorded).then(|| now - recorded)
    }

    /// Time since the profiler was created.
    pub fn elapsed(&self) -> Option<Duration> {
        self.elapsed_since(INIT_CHECKPOINT)
    }

    /// Memory growth in bytes since the checkpoint `name` (negative if it shrank).
    pub fn memory_delta(&self, name: &str) -> Option<i64> {
        let recorded = *self.bytes.get(name)?;
        let current = self.memory.current_usage();
        // Two's complement turns the wrapped difference into the signed delta.
        Some(current.wrapping_sub(recorded) as i64)
    }

    pub fn timers(&self) -> &HashMap<String, Duration> {
        &self.timers
    }

    pub fn memory_checkpoints(&self) -> &HashMap<String, u64> {
        &self.bytes
    }

    pub fn events(&self) -> &[LifecycleEntry] {
        &self.events
    }

    // --- Lifecycle ---

    /// Appends one entry to the event log. On the terminal stage the whole log
    /// is persisted or rendered according to the log mode.
    ///
    /// A failed write at shutdown is returned to the caller; the entry itself is
    /// always recorded.
    #[track_caller]
    pub fn record_lifecycle_event(&mut self, event: impl AsRef<str>) -> Result<(), ProfilerError> {
        let site = CallSite::from(Location::caller());
        let event = event.as_ref();

        let elapsed = self.elapsed().unwrap_or_default().as_secs_f64();
        let previous = self.events.last().map_or(0.0, |entry| entry.elapsed);
        let entry = LifecycleEntry {
            event: event.to_string(),
            elapsed,
            diff: elapsed - previous,
            recorded_at: clock::unix_seconds(self.clock.wall_time()),
            memory: format::humanize(self.memory.current_usage()),
        };
        log::trace!("Lifecycle event recorded: {:?}", entry);
        self.events.push(entry);

        if event != TERMINAL_STAGE {
            return Ok(());
        }

        let result = match self.config.log_mode {
            LogMode::None => Ok(()),
            LogMode::File => {
                let value = serde_json::to_value(&self.events)?;
                self.log_value_at(&value, &site)
            }
            LogMode::Page => {
                let value = serde_json::to_value(&self.events)?;
                self.dump_value_at(&value, &site).map(|_| ())
            }
        };
        if let Err(e) = &result {
            log::warn!("Could not flush the event log at '{}': {}", event, e);
        }
        result
    }

    /// Starts a scope that records a lifecycle event named `name` when dropped.
    pub fn span(&mut self, name: impl Into<String>) -> Span<'_> {
        Span::new(self, name.into())
    }

    // --- Rendering ---

    /// Renders `data` to the page sink, but only for debug requests.
    #[track_caller]
    pub fn dump<T: Serialize + ?Sized>(&mut self, data: &T) -> Result<DumpOutcome, ProfilerError> {
        let site = CallSite::from(Location::caller());
        if !self.debug.active {
            return Ok(DumpOutcome::Suppressed);
        }
        let value = serde_json::to_value(data)?;
        self.dump_value_at(&value, &site)
    }

    fn dump_value_at(&mut self, value: &Value, site: &CallSite) -> Result<DumpOutcome, ProfilerError> {
        if !self.debug.active {
            return Ok(DumpOutcome::Suppressed);
        }
        let mut rendered = format::format_dump(value);
        rendered.push('\n');
        self.write_page(rendered, site)
    }

    fn write_page(&mut self, mut rendered: String, site: &CallSite) -> Result<DumpOutcome, ProfilerError> {
        if self.config.annotate_location {
            let marker = format::call_site_marker(site);
            if !marker.is_empty() {
                rendered.push_str(&marker);
                rendered.push('\n');
            }
        }
        self.page.write_all(rendered.as_bytes())?;
        self.page.flush()?;
        Ok(DumpOutcome::Rendered)
    }

    /// Renders the full system report. Fails closed: without administrative
    /// access nothing is collected or written.
    #[track_caller]
    pub fn system_report(&mut self, authorizer: &dyn Authorizer) -> Result<DumpOutcome, ProfilerError> {
        let site = CallSite::from(Location::caller());
        if !authorizer.is_administrator() {
            log::warn!("Refused system report: caller is not an administrator.");
            return Err(ProfilerError::Forbidden);
        }
        if !self.debug.active {
            return Ok(DumpOutcome::Suppressed);
        }
        let report = SystemReport::collect(&self.config, self.memory.as_ref());
        self.write_page(report.render(), &site)
    }

    // --- Persistence ---

    /// Appends `data` to the log file as one timestamped entry.
    #[track_caller]
    pub fn log<T: Serialize + ?Sized>(&self, data: &T) -> Result<(), ProfilerError> {
        let site = CallSite::from(Location::caller());
        let value = serde_json::to_value(data)?;
        self.log_value_at(&value, &site)
    }

    /// Appends an already formatted message.
    #[track_caller]
    pub fn log_message(&self, message: &str) -> Result<(), ProfilerError> {
        let site = CallSite::from(Location::caller());
        self.write_log(message.to_string(), &site)
    }

    fn log_value_at(&self, value: &Value, site: &CallSite) -> Result<(), ProfilerError> {
        self.write_log(format::format_log_message(value), site)
    }

    fn write_log(&self, mut message: String, site: &CallSite) -> Result<(), ProfilerError> {
        if self.config.annotate_location {
            message.push_str("    ");
            message.push_str(&format::call_site_marker(site));
        }
        self.writer.append(self.clock.wall_time(), &message)?;
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::system::{clock::ManualClock, memory::FixedMemory};
    use std::fs;
    use std::sync::{Arc, Mutex};
    use tempfile::{TempDir, tempdir};

    /// A page sink the test can read back.
    #[derive(Debug, Clone, Default)]
    pub(crate) struct SharedPage(Arc<Mutex<Vec<u8>>>);

    impl SharedPage {
        pub(crate) fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl Write for SharedPage {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    pub(crate) struct Harness {
        pub(crate) profiler: Profiler,
        pub(crate) clock: ManualClock,
        pub(crate) memory: FixedMemory,
        pub(crate) page: SharedPage,
        pub(crate) dir: TempDir,
    }

    pub(crate) fn harness(log_mode: LogMode, debug: DebugRequest) -> Harness {
        let dir = tempdir().unwrap();
        let clock = ManualClock::fixed();
        let memory = FixedMemory::new(1024 * 1024);
        let page = SharedPage::default();
        let config = ProfilerConfig::new(dir.path().join("error.log")).with_log_mode(log_mode);
        let profiler = Profiler::builder(config)
            .debug(debug)
            .clock(clock.clone())
            .memory(memory.clone())
            .page(page.clone())
            .build();
        Harness {
            profiler,
            clock,
            memory,
            page,
            dir,
        }
    }

    fn log_path(h: &Harness) -> std::path::PathBuf {
        h.dir.path().join("error.log")
    }

    /// Splits a log file into entries: each starts with a `YYYY-MM-DD HH:MM:SS - ` prefix.
    pub(crate) fn entries(content: &str) -> Vec<String> {
        let mut entries: Vec<String> = Vec::new();
        for line in content.lines() {
            let is_start = line.len() >= 22
                && line.as_bytes().get(4) == Some(&b'-')
                && line.get(19..22) == Some(" - ");
            match entries.last_mut() {
                Some(last) if !is_start => {
                    last.push('\n');
                    last.push_str(line);
                }
                _ => entries.push(line.to_string()),
            }
        }
        entries
    }

    #[test]
    fn test_construction_seeds_initial_checkpoint() {
        let h = harness(LogMode::None, DebugRequest::inactive());
        assert_eq!(h.profiler.timers().get(INIT_CHECKPOINT), Some(&Duration::ZERO));
        assert_eq!(
            h.profiler.memory_checkpoints().get(INIT_CHECKPOINT),
            Some(&(1024 * 1024))
        );
        assert!(h.profiler.events().is_empty());
    }

    #[test]
    fn test_unrecorded_checkpoints_have_no_value() {
        let h = harness(LogMode::None, DebugRequest::inactive());
        h.clock.advance(Duration::from_secs(1));
        assert_eq!(h.profiler.elapsed_since("never"), None);
        assert_eq!(h.profiler.memory_delta("never"), None);
    }

    #[test]
    fn test_elapsed_requires_clock_to_move_past_checkpoint() {
        let h = harness(LogMode::None, DebugRequest::inactive());
        assert_eq!(h.profiler.elapsed(), None);

        h.clock.advance(Duration::from_millis(30));
        assert_eq!(h.profiler.elapsed(), Some(Duration::from_millis(30)));
    }

    #[test]
    fn test_record_timer_last_write_wins() {
        let mut h = harness(LogMode::None, DebugRequest::inactive());
        h.clock.advance(Duration::from_millis(10));
        h.profiler.record_timer("query");
        h.clock.advance(Duration::from_millis(10));
        h.profiler.record_timer("query");
        h.clock.advance(Duration::from_millis(5));

        assert_eq!(h.profiler.timers().get("query"), Some(&Duration::from_millis(20)));
        assert_eq!(h.profiler.elapsed_since("query"), Some(Duration::from_millis(5)));
        assert_eq!(h.profiler.timers().len(), 2);
    }

    #[test]
    fn test_memory_delta_sign() {
        let mut h = harness(LogMode::None, DebugRequest::inactive());
        h.memory.set(1024 * 1024 + 4096);
        assert_eq!(h.profiler.memory_delta(INIT_CHECKPOINT), Some(4096));

        h.profiler.record_memory("peak");
        h.memory.set(1024 * 1024);
        assert_eq!(h.profiler.memory_delta("peak"), Some(-4096));
    }

    #[test]
    fn test_event_log_order_and_diffs() {
        let mut h = harness(LogMode::None, DebugRequest::inactive());
        let steps = [("bootstrap", 5), ("init", 15), ("headers_sent", 30), ("init", 50)];
        for (name, at_ms) in steps {
            h.clock.set(Duration::from_millis(at_ms));
            h.profiler.record_lifecycle_event(name).unwrap();
        }

        let events = h.profiler.events();
        assert_eq!(events.len(), steps.len());
        let names: Vec<&str> = events.iter().map(|e| e.event.as_str()).collect();
        assert_eq!(names, ["bootstrap", "init", "headers_sent", "init"]);

        let mut previous = 0.0;
        for entry in events {
            assert!((entry.diff - (entry.elapsed - previous)).abs() < 1e-12);
            previous = entry.elapsed;
        }
        assert_eq!(events.first().unwrap().diff, events.first().unwrap().elapsed);
        assert_eq!(events.first().unwrap().memory, "1.00 MB");
    }

    #[test]
    fn test_event_before_clock_moves_has_zero_elapsed() {
        let mut h = harness(LogMode::None, DebugRequest::inactive());
        h.profiler.record_lifecycle_event("bootstrap").unwrap();
        let entry = h.profiler.events().first().unwrap();
        assert_eq!(entry.elapsed, 0.0);
        assert_eq!(entry.diff, 0.0);
        assert_eq!(entry.recorded_at, 1_704_067_200.0);
    }

    #[test]
    fn test_shutdown_to_file_writes_one_entry_with_all_events() {
        let mut h = harness(LogMode::File, DebugRequest::inactive());
        h.clock.set(Duration::from_millis(10));
        h.profiler.record_lifecycle_event("init").unwrap();
        h.clock.set(Duration::from_millis(50));
        h.profiler.record_lifecycle_event("shutdown").unwrap();

        let content = fs::read_to_string(log_path(&h)).unwrap();
        let entries = entries(&content);
        assert_eq!(entries.len(), 1);

        let entry = entries.first().unwrap();
        let (stamp, body) = entry.split_once(" - ").unwrap();
        assert_eq!(stamp, "2024-01-01 00:00:00");
        let logged: Vec<serde_json::Value> = serde_json::from_str(body).unwrap();
        assert_eq!(logged.len(), 2);
        assert_eq!(logged[0]["event"], "init");
        assert_eq!(logged[1]["event"], "shutdown");
        assert!((logged[0]["elapsed"].as_f64().unwrap() - 0.01).abs() < 1e-9);
        assert!((logged[1]["elapsed"].as_f64().unwrap() - 0.05).abs() < 1e-9);
        assert!((logged[1]["diff"].as_f64().unwrap() - 0.04).abs() < 1e-9);

        // Nothing is rendered in file mode.
        assert!(h.page.contents().is_empty());
    }

    #[test]
    fn test_shutdown_without_log_mode_has_no_side_effects() {
        let mut h = harness(LogMode::None, DebugRequest::active(DebugMode::Dump));
        h.profiler.record_lifecycle_event("shutdown").unwrap();
        assert!(!log_path(&h).exists());
        assert!(h.page.contents().is_empty());
        assert!(!h.profiler.tracks_lifecycle());
    }

    #[test]
    fn test_shutdown_to_page_renders_only_for_debug_requests() {
        let mut quiet = harness(LogMode::Page, DebugRequest::inactive());
        quiet.profiler.record_lifecycle_event("shutdown").unwrap();
        assert!(quiet.page.contents().is_empty());

        let mut loud = harness(LogMode::Page, DebugRequest::active(DebugMode::Dump));
        loud.clock.set(Duration::from_millis(10));
        loud.profiler.record_lifecycle_event("init").unwrap();
        loud.profiler.record_lifecycle_event("shutdown").unwrap();
        let page = loud.page.contents();
        let rendered: Vec<serde_json::Value> = serde_json::from_str(&page).unwrap();
        assert_eq!(rendered.len(), 2);
        assert!(!log_path(&loud).exists());
    }

    #[test]
    fn test_pagedata_request_forces_page_mode() {
        let h = harness(LogMode::None, DebugRequest::active(DebugMode::PageData));
        assert_eq!(h.profiler.config().log_mode, LogMode::Page);
        assert!(h.profiler.tracks_lifecycle());
    }

    #[test]
    fn test_shutdown_write_failure_is_returned_and_event_kept() {
        let dir = tempdir().unwrap();
        // The log path is a directory, so opening it for append fails.
        let config = ProfilerConfig::new(dir.path()).with_log_mode(LogMode::File);
        let mut profiler = Profiler::builder(config)
            .clock(ManualClock::fixed())
            .memory(FixedMemory::new(1))
            .page(SharedPage::default())
            .build();

        let result = profiler.record_lifecycle_event("shutdown");

        assert!(matches!(result, Err(ProfilerError::Log(LogWriteError::Open { .. }))));
        assert_eq!(profiler.events().len(), 1);
    }

    #[test]
    fn test_dump_inactive_has_no_side_effect() {
        let mut h = harness(LogMode::File, DebugRequest::inactive());
        let outcome = h.profiler.dump(&serde_json::json!({ "secret": 1 })).unwrap();
        assert_eq!(outcome, DumpOutcome::Suppressed);
        assert!(h.page.contents().is_empty());
        assert!(!log_path(&h).exists());
    }

    #[test]
    fn test_dump_active_renders_with_call_site() {
        let mut h = harness(LogMode::None, DebugRequest::active(DebugMode::Dump));
        h.profiler.config.annotate_location = true;

        let line = line!() + 1;
        let outcome = h.profiler.dump(&vec![1, 2, 3]).unwrap();

        assert_eq!(outcome, DumpOutcome::Rendered);
        let page = h.page.contents();
        assert!(page.starts_with("[\n  1,\n  2,\n  3\n]\n"));
        assert!(page.contains(&format!("< L:{}  F:", line)));
        assert!(page.contains("profiler.rs >"));
    }

    #[test]
    fn test_log_round_trip_structured_value() {
        let h = harness(LogMode::None, DebugRequest::inactive());
        let value = serde_json::json!({ "query": "SELECT 1", "rows": [1, 2] });

        h.profiler.log(&value).unwrap();
        h.profiler.log(&Option::<u8>::None).unwrap();
        h.profiler.log("").unwrap();
        h.profiler.log_message("done").unwrap();

        let content = fs::read_to_string(log_path(&h)).unwrap();
        let entries = entries(&content);
        assert_eq!(entries.len(), 4);
        assert_eq!(
            entries[0],
            format!(
                "2024-01-01 00:00:00 - {}",
                serde_json::to_string_pretty(&value).unwrap()
            )
        );
        assert_eq!(entries[1], "2024-01-01 00:00:00 - Null");
        assert_eq!(entries[2], "2024-01-01 00:00:00 - -Empty-");
        assert_eq!(entries[3], "2024-01-01 00:00:00 - done");
    }

    #[test]
    fn test_log_annotates_call_site() {
        let mut h = harness(LogMode::None, DebugRequest::inactive());
        h.profiler.config.annotate_location = true;

        let line = line!() + 1;
        h.profiler.log("checkpoint reached").unwrap();

        let content = fs::read_to_string(log_path(&h)).unwrap();
        let expected = format!("checkpoint reached    < L:{}  F:", line);
        assert!(content.contains(&expected));
    }

    #[test]
    fn test_log_is_not_gated_by_debug_switch() {
        let h = harness(LogMode::None, DebugRequest::inactive());
        h.profiler.log(&42).unwrap();
        let content = fs::read_to_string(log_path(&h)).unwrap();
        assert_eq!(content, "2024-01-01 00:00:00 - 42\n");
    }

    #[test]
    fn test_separate_instances_append_whole_entries() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("shared.log");
        let handles: Vec<_> = (0..6)
            .map(|worker| {
                let path = path.clone();
                std::thread::spawn(move || {
                    let config = ProfilerConfig::new(path);
                    let profiler = Profiler::builder(config)
                        .clock(ManualClock::fixed())
                        .memory(FixedMemory::new(1))
                        .page(SharedPage::default())
                        .build();
                    for i in 0..20 {
                        profiler
                            .log(&serde_json::json!({ "worker": worker, "i": i }))
                            .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let content = fs::read_to_string(&path).unwrap();
        let entries = entries(&content);
        assert_eq!(entries.len(), 120);
        for entry in entries {
            let (_, body) = entry.split_once(" - ").unwrap();
            let parsed: serde_json::Value = serde_json::from_str(body).unwrap();
            assert!(parsed["worker"].is_u64());
        }
    }
}
