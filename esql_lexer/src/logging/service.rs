//! Logger implementations and the level-filtering service

use super::codes::Code;
use super::config;
use super::events::{LogEvent, LogLevel};
use crate::utils::Span;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

pub trait Logger: Send + Sync {
    fn log(&self, event: &LogEvent);
}

/// Level filter in front of a [`Logger`]
pub struct LoggingService {
    logger: Arc<dyn Logger>,
    min_level: LogLevel,
}

impl LoggingService {
    pub fn new(logger: Arc<dyn Logger>, min_level: LogLevel) -> Self {
        Self { logger, min_level }
    }

    /// Service built from the installed runtime preferences
    pub fn with_config() -> Self {
        let min_level = config::get_min_log_level();
        Self::new(Arc::new(create_configured_multi_logger()), min_level)
    }

    pub fn set_min_level(&mut self, level: LogLevel) {
        self.min_level = level;
    }

    pub fn min_level(&self) -> LogLevel {
        self.min_level
    }

    pub fn should_log(&self, level: LogLevel) -> bool {
        level <= self.min_level
    }

    pub fn log_event(&self, event: LogEvent) {
        if self.should_log(event.level) {
            self.logger.log(&event);
        }
    }

    pub fn log_error(&self, error_code: Code, message: &str) {
        self.log_event(LogEvent::error(error_code, message));
    }

    pub fn log_error_with_span(&self, error_code: Code, message: &str, span: Span) {
        self.log_event(LogEvent::error(error_code, message).with_span(span));
    }

    pub fn log_success(&self, success_code: Code, message: &str) {
        self.log_event(LogEvent::success(success_code, message));
    }

    pub fn log_info(&self, message: &str) {
        self.log_event(LogEvent::info(message));
    }

    pub fn log_warning(&self, message: &str) {
        self.log_event(LogEvent::warning(message));
    }

    pub fn log_debug(&self, message: &str) {
        self.log_event(LogEvent::debug(message));
    }
}

/// Plain text to stdout, errors to stderr
pub struct ConsoleLogger {
    min_level: LogLevel,
}

impl ConsoleLogger {
    pub fn new(min_level: LogLevel) -> Self {
        Self { min_level }
    }
}

impl Logger for ConsoleLogger {
    fn log(&self, event: &LogEvent) {
        if event.level > self.min_level {
            return;
        }
        match event.level {
            LogLevel::Error => eprintln!("{}", event.format()),
            _ => println!("{}", event.format()),
        }
    }
}

/// JSON lines, one object per event
pub struct StructuredLogger {
    min_level: LogLevel,
}

impl StructuredLogger {
    pub fn new(min_level: LogLevel) -> Self {
        Self { min_level }
    }
}

impl Logger for StructuredLogger {
    fn log(&self, event: &LogEvent) {
        if event.level > self.min_level {
            return;
        }
        let line = event.format_json().unwrap_or_else(|_| event.format());
        match event.level {
            LogLevel::Error => eprintln!("{}", line),
            _ => println!("{}", line),
        }
    }
}

/// Bounded in-memory sink; the oldest events are dropped first
pub struct MemoryLogger {
    events: Mutex<Vec<LogEvent>>,
    capacity: usize,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::with_capacity(config::get_error_buffer_size())
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            capacity: capacity.max(1),
        }
    }

    fn events(&self) -> MutexGuard<'_, Vec<LogEvent>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get_events(&self) -> Vec<LogEvent> {
        self.events().clone()
    }

    pub fn clear(&self) {
        self.events().clear();
    }

    pub fn event_count(&self) -> usize {
        self.events().len()
    }

    pub fn get_errors(&self) -> Vec<LogEvent> {
        self.filtered(LogEvent::is_error)
    }

    pub fn get_warnings(&self) -> Vec<LogEvent> {
        self.filtered(LogEvent::is_warning)
    }

    pub fn get_events_with_code(&self, code: Code) -> Vec<LogEvent> {
        self.filtered(|e| e.code == code)
    }

    /// Events tagged with the given context value, e.g. a batch query label
    pub fn get_events_with_context(&self, key: &str, value: &str) -> Vec<LogEvent> {
        self.filtered(|e| e.context.get(key).is_some_and(|v| v == value))
    }

    pub fn has_error_with_code(&self, code: Code) -> bool {
        self.events().iter().any(|e| e.is_error() && e.code == code)
    }

    pub fn has_success_with_code(&self, code: Code) -> bool {
        self.events().iter().any(|e| e.is_info() && e.code == code)
    }

    pub fn get_summary(&self) -> EventSummary {
        let events = self.events();
        EventSummary {
            total_count: events.len(),
            error_count: events.iter().filter(|e| e.is_error()).count(),
            warning_count: events.iter().filter(|e| e.is_warning()).count(),
            info_count: events.iter().filter(|e| e.is_info()).count(),
            debug_count: events.iter().filter(|e| e.is_debug()).count(),
            critical_count: events
                .iter()
                .filter(|e| e.is_error() && e.requires_halt())
                .count(),
        }
    }

    fn filtered(&self, predicate: impl Fn(&LogEvent) -> bool) -> Vec<LogEvent> {
        self.events()
            .iter()
            .filter(|e| predicate(e))
            .cloned()
            .collect()
    }
}

impl Default for MemoryLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl Logger for MemoryLogger {
    fn log(&self, event: &LogEvent) {
        let mut events = self.events();
        if events.len() >= self.capacity {
            let excess = events.len() + 1 - self.capacity;
            events.drain(0..excess);
        }
        events.push(event.clone());
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventSummary {
    pub total_count: usize,
    pub error_count: usize,
    pub warning_count: usize,
    pub info_count: usize,
    pub debug_count: usize,
    pub critical_count: usize,
}

impl EventSummary {
    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    pub fn has_critical_errors(&self) -> bool {
        self.critical_count > 0
    }
}

/// Fan-out to several loggers
pub struct MultiLogger {
    loggers: Vec<Arc<dyn Logger>>,
    min_level: LogLevel,
}

impl MultiLogger {
    pub fn new(min_level: LogLevel) -> Self {
        Self {
            loggers: Vec::new(),
            min_level,
        }
    }

    pub fn add_logger(&mut self, logger: Arc<dyn Logger>) {
        self.loggers.push(logger);
    }

    pub fn len(&self) -> usize {
        self.loggers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loggers.is_empty()
    }

    pub fn with_console(mut self, console_level: LogLevel) -> Self {
        self.add_logger(Arc::new(ConsoleLogger::new(console_level)));
        self
    }

    pub fn with_structured_console(mut self, console_level: LogLevel) -> Self {
        self.add_logger(Arc::new(StructuredLogger::new(console_level)));
        self
    }

    pub fn with_memory(mut self) -> (Self, Arc<MemoryLogger>) {
        let memory_logger = Arc::new(MemoryLogger::new());
        self.add_logger(memory_logger.clone());
        (self, memory_logger)
    }
}

impl Logger for MultiLogger {
    fn log(&self, event: &LogEvent) {
        if event.level <= self.min_level {
            for logger in &self.loggers {
                logger.log(event);
            }
        }
    }
}

// ============================================================================
// FACTORY FUNCTIONS
// ============================================================================

pub fn create_configured_service() -> LoggingService {
    LoggingService::with_config()
}

/// Console sink per the runtime preferences; empty when console output is disabled
pub fn create_configured_multi_logger() -> MultiLogger {
    let min_level = config::get_min_log_level();
    let multi_logger = MultiLogger::new(min_level);

    if !config::use_console_logging() {
        return multi_logger;
    }
    if config::use_structured_logging() {
        multi_logger.with_structured_console(min_level)
    } else {
        multi_logger.with_console(min_level)
    }
}

pub fn create_test_logger() -> Arc<MemoryLogger> {
    Arc::new(MemoryLogger::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::codes;

    #[test]
    fn test_memory_logger() {
        let logger = MemoryLogger::new();

        logger.log(&LogEvent::info("Message 1"));
        logger.log(&LogEvent::error(
            codes::lexical::UNRECOGNIZED_CHARACTER,
            "Unrecognized '$'",
        ));

        assert_eq!(logger.event_count(), 2);
        assert_eq!(logger.get_errors().len(), 1);
        assert!(logger.has_error_with_code(codes::lexical::UNRECOGNIZED_CHARACTER));

        let summary = logger.get_summary();
        assert_eq!(summary.info_count, 1);
        assert!(summary.has_errors());
        assert!(!summary.has_critical_errors());

        logger.clear();
        assert_eq!(logger.event_count(), 0);
    }

    #[test]
    fn test_memory_logger_drops_oldest() {
        let logger = MemoryLogger::with_capacity(2);
        for i in 0..5 {
            logger.log(&LogEvent::info(&format!("event {}", i)));
        }
        let messages: Vec<_> = logger.get_events().into_iter().map(|e| e.message).collect();
        assert_eq!(messages, vec!["event 3", "event 4"]);
    }

    #[test]
    fn test_multi_logger() {
        let (multi, memory) = MultiLogger::new(LogLevel::Info).with_memory();

        multi.log(&LogEvent::info("kept"));
        multi.log(&LogEvent::debug("filtered"));

        assert_eq!(multi.len(), 1);
        assert_eq!(memory.event_count(), 1);
    }

    #[test]
    fn test_level_filtering() {
        let logger = Arc::new(MemoryLogger::new());
        let service = LoggingService::new(logger.clone(), LogLevel::Error);

        service.log_debug("Debug message");
        service.log_info("Info message");
        service.log_warning("Warning message");
        service.log_error(codes::system::INTERNAL_ERROR, "Error message");

        assert_eq!(logger.event_count(), 1);
        assert!(logger.has_error_with_code(codes::system::INTERNAL_ERROR));
        assert_eq!(logger.get_summary().critical_count, 1);
    }

    #[test]
    fn test_service_convenience_methods() {
        let logger = Arc::new(MemoryLogger::new());
        let mut service = LoggingService::new(logger.clone(), LogLevel::Info);
        let span = Span::empty_at(crate::utils::Position::start());

        service.log_error_with_span(codes::lexical::UNBALANCED_MODE, "Stray ]", span);
        service.log_success(codes::success::TOKENIZATION_COMPLETE, "Tokenized");
        service.log_debug("hidden");
        service.set_min_level(LogLevel::Debug);
        service.log_debug("shown");

        assert_eq!(logger.event_count(), 3);
        assert_eq!(logger.get_errors()[0].span, Some(span));
        assert!(logger.has_success_with_code(codes::success::TOKENIZATION_COMPLETE));
        assert_eq!(service.min_level(), LogLevel::Debug);
    }

    #[test]
    fn test_console_and_structured_loggers_do_not_panic() {
        let event = LogEvent::error(codes::lexical::TOO_MANY_TOKENS, "Too many tokens")
            .with_context("count", "3");
        ConsoleLogger::new(LogLevel::Info).log(&event);
        StructuredLogger::new(LogLevel::Debug).log(&event);
    }

    #[test]
    fn test_context_filter() {
        let logger = MemoryLogger::new();
        logger.log(&LogEvent::info("a").with_context("query", "q1"));
        logger.log(&LogEvent::info("b").with_context("query", "q2"));
        assert_eq!(logger.get_events_with_context("query", "q2")[0].message, "b");
    }
}
