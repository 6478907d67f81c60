//! Unit tests for engine.rs
//!
//! Tests the global logger facade and severity filtering.
//! All tests are serialized since they share the global logger.

use crate::engine::Engine;
use crate::log::{Logger, LogEntry, LogSeverity};
use serial_test::serial;
use std::sync::{Arc, Mutex};

struct CaptureLogger {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl Logger for CaptureLogger {
    fn log(&self, entry: &LogEntry) {
        self.entries.lock().unwrap().push(entry.clone());
    }
}

fn install_capture() -> Arc<Mutex<Vec<LogEntry>>> {
    let entries = Arc::new(Mutex::new(Vec::new()));
    Engine::set_logger(CaptureLogger { entries: entries.clone() });
    entries
}

// ============================================================================
// LOGGER ROUTING
// ============================================================================

#[test]
#[serial]
fn test_log_reaches_custom_logger() {
    let entries = install_capture();

    Engine::log(LogSeverity::Info, "keel::test", "hello".to_string());

    let logged = entries.lock().unwrap();
    assert_eq!(logged.len(), 1);
    assert_eq!(logged[0].source, "keel::test");
    assert_eq!(logged[0].message, "hello");
    assert!(logged[0].file.is_none());
    drop(logged);
    Engine::reset_logger();
}

#[test]
#[serial]
fn test_log_detailed_carries_location() {
    let entries = install_capture();

    Engine::log_detailed(LogSeverity::Error, "keel::test", "boom".to_string(), "x.rs", 12);

    let logged = entries.lock().unwrap();
    assert_eq!(logged[0].file, Some("x.rs"));
    assert_eq!(logged[0].line, Some(12));
    drop(logged);
    Engine::reset_logger();
}

#[test]
#[serial]
fn test_error_macro_adds_file_and_line() {
    let entries = install_capture();

    crate::engine_error!("keel::test", "failed: {}", 3);

    let logged = entries.lock().unwrap();
    assert_eq!(logged[0].severity, LogSeverity::Error);
    assert_eq!(logged[0].message, "failed: 3");
    assert!(logged[0].file.unwrap().ends_with("engine_tests.rs"));
    drop(logged);
    Engine::reset_logger();
}

// ============================================================================
// SEVERITY FILTER
// ============================================================================

#[test]
#[serial]
fn test_min_severity_filters_entries() {
    let entries = install_capture();
    Engine::set_min_severity(LogSeverity::Warn);
    assert_eq!(Engine::min_severity(), LogSeverity::Warn);

    crate::engine_trace!("keel::test", "trace");
    crate::engine_debug!("keel::test", "debug");
    crate::engine_info!("keel::test", "info");
    crate::engine_warn!("keel::test", "warn");
    crate::engine_error!("keel::test", "error");

    let messages: Vec<String> = entries.lock().unwrap().iter().map(|e| e.message.clone()).collect();
    assert_eq!(messages, vec!["warn".to_string(), "error".to_string()]);
    Engine::reset_logger();
}

#[test]
#[serial]
fn test_reset_logger_restores_threshold() {
    Engine::set_min_severity(LogSeverity::Error);
    Engine::reset_logger();
    assert_eq!(Engine::min_severity(), LogSeverity::Trace);
}
