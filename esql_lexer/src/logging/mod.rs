//! Global logging for the ES|QL lexer
//!
//! A process-wide [`LoggingService`] and [`ErrorCollector`] are installed
//! once; until then every logging call is a no-op. Batch workers tag their
//! thread with a [`QueryContext`] so events land under the right query.

pub mod codes;
pub mod collector;
pub mod config;
pub mod events;
pub mod macros;
pub mod service;

use std::cell::RefCell;
use std::sync::{Arc, OnceLock};

pub use codes::Code;
pub use collector::{ErrorCollector, ProcessingSummary, QueryContext};
pub use events::{LogEvent, LogLevel};
pub use service::{
    ConsoleLogger, Logger, LoggingService, MemoryLogger, MultiLogger, StructuredLogger,
};

// ============================================================================
// GLOBAL STATE
// ============================================================================

static GLOBAL_LOGGER: OnceLock<Arc<LoggingService>> = OnceLock::new();
static GLOBAL_ERROR_COLLECTOR: OnceLock<Arc<ErrorCollector>> = OnceLock::new();

thread_local! {
    static QUERY_CONTEXT: RefCell<Option<QueryContext>> = const { RefCell::new(None) };
}

// ============================================================================
// INITIALIZATION
// ============================================================================

/// Install the configured logger and collector
pub fn init_global_logging() -> Result<(), String> {
    config::validate_config().map_err(|e| format!("Configuration validation failed: {}", e))?;

    let logging_service = Arc::new(service::create_configured_service());
    install(logging_service.clone())?;

    logging_service.log_event(LogEvent::success(
        codes::success::SYSTEM_INITIALIZATION_COMPLETED,
        "Global logging system initialized",
    ));
    Ok(())
}

/// Install a caller-supplied service
pub fn init_global_logging_with_service(service: Arc<LoggingService>) -> Result<(), String> {
    install(service)
}

fn install(service: Arc<LoggingService>) -> Result<(), String> {
    GLOBAL_LOGGER
        .set(service)
        .map_err(|_| "Global logger already initialized".to_string())?;
    GLOBAL_ERROR_COLLECTOR
        .set(Arc::new(ErrorCollector::new()))
        .map_err(|_| "Global error collector already initialized".to_string())
}

pub fn is_initialized() -> bool {
    GLOBAL_LOGGER.get().is_some() && GLOBAL_ERROR_COLLECTOR.get().is_some()
}

pub fn try_get_global_logger() -> Option<&'static LoggingService> {
    GLOBAL_LOGGER.get().map(|service| service.as_ref())
}

pub fn try_get_global_error_collector() -> Option<&'static ErrorCollector> {
    GLOBAL_ERROR_COLLECTOR
        .get()
        .map(|collector| collector.as_ref())
}

// ============================================================================
// QUERY CONTEXT
// ============================================================================

pub fn set_query_context(query_id: usize, label: &str) {
    let context = QueryContext::new(query_id, label);

    if let Some(collector) = try_get_global_error_collector() {
        collector.record_query_context(context.clone());
    }

    QUERY_CONTEXT.with(|ctx| *ctx.borrow_mut() = Some(context));
}

pub fn clear_query_context() {
    QUERY_CONTEXT.with(|ctx| *ctx.borrow_mut() = None);
}

/// Run `f` with the current thread tagged as working on `query_id`
pub fn with_query_context<F, R>(query_id: usize, label: &str, f: F) -> R
where
    F: FnOnce() -> R,
{
    set_query_context(query_id, label);
    let result = f();
    clear_query_context();
    result
}

pub fn get_current_query_context() -> Option<QueryContext> {
    QUERY_CONTEXT.with(|ctx| ctx.borrow().clone())
}

// ============================================================================
// MACRO SUPPORT
// ============================================================================

fn with_query_tags(mut event: LogEvent) -> LogEvent {
    if config::include_query_context() {
        if let Some(query) = get_current_query_context() {
            event = event
                .with_context("query", &query.label)
                .with_context("query_id", &query.query_id.to_string());
        }
    }
    event
}

/// Send to the global logger and, inside a query context, to the collector
fn dispatch(event: LogEvent) {
    let event = with_query_tags(event);

    if let Some(logger) = try_get_global_logger() {
        if let Some(query) = get_current_query_context() {
            if !logger.should_log(event.level) {
                return;
            }
            if let Some(collector) = try_get_global_error_collector() {
                collector.record_event(query.query_id, event.clone());
            }
        }
        logger.log_event(event);
    }
}

fn apply_context(mut event: LogEvent, context: Vec<(&str, &str)>) -> LogEvent {
    for (key, value) in context {
        event = event.with_context(key, value);
    }
    event
}

pub fn log_error_with_context(
    code: Code,
    message: &str,
    span: Option<crate::utils::Span>,
    context: Vec<(&str, &str)>,
) {
    let mut event = apply_context(LogEvent::error(code, message), context);
    if let Some(s) = span {
        event = event.with_span(s);
    }
    dispatch(event);
}

pub fn log_success_with_context(code: Code, message: &str, context: Vec<(&str, &str)>) {
    dispatch(apply_context(LogEvent::success(code, message), context));
}

pub fn log_info_with_context(message: &str, context: Vec<(&str, &str)>) {
    dispatch(apply_context(LogEvent::info(message), context));
}

pub fn log_warning_with_context(message: &str, context: Vec<(&str, &str)>) {
    dispatch(apply_context(LogEvent::warning(message), context));
}

pub fn log_debug_with_context(message: &str, context: Vec<(&str, &str)>) {
    dispatch(apply_context(LogEvent::debug(message), context));
}

/// Whether a debug event would reach any sink; lets callers skip formatting
pub fn debug_enabled() -> bool {
    try_get_global_logger().is_some_and(|logger| logger.should_log(LogLevel::Debug))
}

// ============================================================================
// COLLECTED RESULTS
// ============================================================================

pub fn get_processing_summary() -> ProcessingSummary {
    try_get_global_error_collector()
        .map(ErrorCollector::get_summary)
        .unwrap_or_default()
}

pub fn get_query_errors(query_id: usize) -> Vec<LogEvent> {
    try_get_global_error_collector()
        .map(|collector| collector.get_query_errors(query_id))
        .unwrap_or_default()
}

pub fn format_query_report() -> Option<String> {
    try_get_global_error_collector().map(collector::format_query_report)
}

pub fn get_system_diagnostics() -> String {
    let mut diagnostics = String::new();

    diagnostics.push_str("=== Logging System Diagnostics ===\n");
    diagnostics.push_str(&format!("Initialized: {}\n", is_initialized()));

    if let Some(collector) = try_get_global_error_collector() {
        let (current, max, percentage) = collector.get_capacity_info();
        diagnostics.push_str(&format!(
            "Capacity: {}/{} ({:.1}%)\n",
            current,
            max,
            percentage * 100.0
        ));

        let summary = collector.get_summary();
        diagnostics.push_str(&format!("Queries recorded: {}\n", summary.total_queries));
        diagnostics.push_str(&format!("Total errors: {}\n", summary.total_errors));
        diagnostics.push_str(&format!("Total warnings: {}\n", summary.total_warnings));
    }

    diagnostics.push('\n');
    diagnostics.push_str(&config::get_config_summary());
    diagnostics
}

/// Log through the global logger, or to stderr when none is installed
pub fn safe_log_error(code: Code, message: &str) {
    match try_get_global_logger() {
        Some(logger) => logger.log_event(LogEvent::error(code, message)),
        None => eprintln!("[ERROR] FALLBACK: [{}] {}", code.as_str(), message),
    }
}

/// Shared in-memory sink installed as the global logger for this test binary
#[cfg(test)]
pub(crate) fn test_memory_logger() -> Arc<MemoryLogger> {
    static MEMORY: OnceLock<Arc<MemoryLogger>> = OnceLock::new();
    MEMORY
        .get_or_init(|| {
            let memory = Arc::new(MemoryLogger::new());
            let service = LoggingService::new(memory.clone(), LogLevel::Debug);
            let _ = init_global_logging_with_service(Arc::new(service));
            memory
        })
        .clone()
}
