//! Integration tests for Engine logging system
//!
//! These tests verify the logging facade and that engine subsystems
//! report through it. No GPU required.
//!
//! Run with: cargo test --test logging_integration_tests

use keel_engine::keel::Engine;
use keel_engine::keel::assets::{AssetManager, AssetType};
use keel_engine::keel::files::InternalFileHandleResolver;
use keel_engine::keel::log::{Logger, LogEntry, LogSeverity};
use std::sync::{Arc, Mutex};
use serial_test::serial;

// ============================================================================
// TEST LOGGER IMPLEMENTATION
// ============================================================================

/// Test logger that captures log entries for verification
struct TestLogger {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl TestLogger {
    fn new() -> (Self, Arc<Mutex<Vec<LogEntry>>>) {
        let entries = Arc::new(Mutex::new(Vec::new()));
        (Self { entries: entries.clone() }, entries)
    }
}

impl Logger for TestLogger {
    fn log(&self, entry: &LogEntry) {
        self.entries.lock().unwrap().push(entry.clone());
    }
}

// ============================================================================
// LOGGING TESTS
// ============================================================================

#[test]
#[serial]
fn test_integration_custom_logger() {
    let (test_logger, entries) = TestLogger::new();
    Engine::set_logger(test_logger);

    Engine::log(LogSeverity::Info, "test::module", "Test info message".to_string());
    Engine::log(LogSeverity::Warn, "test::module", "Test warning message".to_string());
    Engine::log(LogSeverity::Error, "test::module", "Test error message".to_string());

    let captured_entries = entries.lock().unwrap();
    assert_eq!(captured_entries.len(), 3);

    assert_eq!(captured_entries[0].severity, LogSeverity::Info);
    assert_eq!(captured_entries[0].source, "test::module");
    assert_eq!(captured_entries[0].message, "Test info message");

    assert_eq!(captured_entries[1].severity, LogSeverity::Warn);
    assert_eq!(captured_entries[1].message, "Test warning message");

    assert_eq!(captured_entries[2].severity, LogSeverity::Error);
    assert_eq!(captured_entries[2].message, "Test error message");
    drop(captured_entries);

    Engine::reset_logger();
}

#[test]
#[serial]
fn test_integration_error_logging_with_location() {
    let (test_logger, entries) = TestLogger::new();
    Engine::set_logger(test_logger);

    Engine::log_detailed(
        LogSeverity::Error,
        "test::error",
        "Critical error occurred".to_string(),
        "test_file.rs",
        42,
    );

    let captured_entries = entries.lock().unwrap();
    assert_eq!(captured_entries.len(), 1);

    let entry = &captured_entries[0];
    assert_eq!(entry.severity, LogSeverity::Error);
    assert_eq!(entry.source, "test::error");
    assert_eq!(entry.message, "Critical error occurred");
    assert_eq!(entry.file, Some("test_file.rs"));
    assert_eq!(entry.line, Some(42));
    drop(captured_entries);

    Engine::reset_logger();
}

#[test]
#[serial]
fn test_integration_logger_reset() {
    let (test_logger, entries) = TestLogger::new();
    Engine::set_logger(test_logger);

    Engine::log(LogSeverity::Info, "test", "Message 1".to_string());
    {
        let captured = entries.lock().unwrap();
        assert_eq!(captured.len(), 1);
    }

    Engine::reset_logger();

    // Goes to the default logger, not captured
    Engine::log(LogSeverity::Info, "test", "Message 2".to_string());

    let captured = entries.lock().unwrap();
    assert_eq!(captured.len(), 1);
}

#[test]
#[serial]
fn test_integration_min_severity_filters() {
    let (test_logger, entries) = TestLogger::new();
    Engine::set_logger(test_logger);
    Engine::set_min_severity(LogSeverity::Warn);

    Engine::log(LogSeverity::Trace, "test", "Trace message".to_string());
    Engine::log(LogSeverity::Info, "test", "Info message".to_string());
    Engine::log(LogSeverity::Warn, "test", "Warn message".to_string());
    Engine::log(LogSeverity::Error, "test", "Error message".to_string());

    {
        let captured = entries.lock().unwrap();
        assert_eq!(captured.len(), 2);
        assert_eq!(captured[0].severity, LogSeverity::Warn);
        assert_eq!(captured[1].severity, LogSeverity::Error);
    }

    // reset_logger also restores the threshold
    Engine::reset_logger();
    assert_eq!(Engine::min_severity(), LogSeverity::Trace);
}

#[test]
#[serial]
fn test_integration_asset_manager_reports_through_logger() {
    let (test_logger, entries) = TestLogger::new();
    Engine::set_logger(test_logger);

    let dir = tempfile::tempdir().unwrap();
    let resolver = Arc::new(InternalFileHandleResolver::new(dir.path()));
    let mut manager = AssetManager::new(resolver).unwrap();

    manager.load("missing.bin", AssetType::Binary).unwrap();
    assert!(manager.finish_loading().is_err());
    manager.dispose().unwrap();

    let captured = entries.lock().unwrap();
    assert!(captured
        .iter()
        .any(|e| e.source == "keel::AssetManager" && e.severity == LogSeverity::Info && e.message.contains("missing.bin")));
    let error = captured
        .iter()
        .find(|e| e.severity == LogSeverity::Error && e.source == "keel::AssetManager")
        .expect("loading failure logged");
    assert!(error.message.contains("missing.bin"));
    assert!(error.file.is_some());
    drop(captured);

    Engine::reset_logger();
}
