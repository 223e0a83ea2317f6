//! Per-query event collection for batch tokenization
//!
//! Events raised while a batch query is being tokenized are filed under the
//! query's id, so a batch report can list problems query by query.

use super::codes;
use super::events::LogEvent;
use crate::config::compile_time::logging::{LOG_BUFFER_SIZE, MAX_LOG_EVENTS_PER_QUERY};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Identity of the query the current thread is tokenizing
#[derive(Debug, Clone)]
pub struct QueryContext {
    pub query_id: usize,
    pub label: String,
    pub start_time: Instant,
}

impl QueryContext {
    pub fn new(query_id: usize, label: impl Into<String>) -> Self {
        Self {
            query_id,
            label: label.into(),
            start_time: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProcessingSummary {
    pub total_queries: usize,
    pub clean_queries: usize,
    pub queries_with_errors: usize,
    pub queries_with_warnings: usize,
    pub total_errors: usize,
    pub total_warnings: usize,
    pub total_processing_time: Duration,
    pub average_query_time: Duration,
}

impl ProcessingSummary {
    /// Fraction of recorded queries with no error events
    pub fn clean_rate(&self) -> f64 {
        if self.total_queries == 0 {
            0.0
        } else {
            (self.total_queries - self.queries_with_errors) as f64 / self.total_queries as f64
        }
    }

    pub fn has_errors(&self) -> bool {
        self.total_errors > 0
    }

    pub fn has_warnings(&self) -> bool {
        self.total_warnings > 0
    }
}

/// Thread-safe event store keyed by query id
pub struct ErrorCollector {
    query_events: Mutex<BTreeMap<usize, Vec<LogEvent>>>,
    query_contexts: Mutex<BTreeMap<usize, QueryContext>>,
    processing_start: Instant,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl ErrorCollector {
    pub fn new() -> Self {
        Self {
            query_events: Mutex::new(BTreeMap::new()),
            query_contexts: Mutex::new(BTreeMap::new()),
            processing_start: Instant::now(),
        }
    }

    /// File an event; past the per-query limit a single W001 marker is kept instead
    pub fn record_event(&self, query_id: usize, event: LogEvent) {
        let mut events = lock(&self.query_events);
        let query_events = events.entry(query_id).or_default();

        if query_events.len() < MAX_LOG_EVENTS_PER_QUERY {
            query_events.push(event);
        } else if query_events.len() == MAX_LOG_EVENTS_PER_QUERY {
            query_events.push(LogEvent::warning_with_code(
                codes::warnings::EVENT_LIMIT_REACHED,
                &format!(
                    "Too many events for query (limit: {})",
                    MAX_LOG_EVENTS_PER_QUERY
                ),
            ));
        }
    }

    pub fn record_query_context(&self, context: QueryContext) {
        lock(&self.query_contexts).insert(context.query_id, context);
    }

    pub fn get_query_events(&self, query_id: usize) -> Vec<LogEvent> {
        lock(&self.query_events)
            .get(&query_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn get_query_errors(&self, query_id: usize) -> Vec<LogEvent> {
        lock(&self.query_events)
            .get(&query_id)
            .map(|events| events.iter().filter(|e| e.is_error()).cloned().collect())
            .unwrap_or_default()
    }

    pub fn get_query_warnings(&self, query_id: usize) -> Vec<LogEvent> {
        lock(&self.query_events)
            .get(&query_id)
            .map(|events| events.iter().filter(|e| e.is_warning()).cloned().collect())
            .unwrap_or_default()
    }

    pub fn query_has_errors(&self, query_id: usize) -> bool {
        lock(&self.query_events)
            .get(&query_id)
            .is_some_and(|events| events.iter().any(LogEvent::is_error))
    }

    pub fn get_queries_with_errors(&self) -> Vec<usize> {
        lock(&self.query_events)
            .iter()
            .filter(|(_, events)| events.iter().any(LogEvent::is_error))
            .map(|(id, _)| *id)
            .collect()
    }

    pub fn get_all_query_events(&self) -> BTreeMap<usize, Vec<LogEvent>> {
        lock(&self.query_events).clone()
    }

    pub fn get_summary(&self) -> ProcessingSummary {
        let events = lock(&self.query_events);
        let contexts = lock(&self.query_contexts);

        let mut summary = ProcessingSummary {
            total_queries: events.len().max(contexts.len()),
            total_processing_time: self.processing_start.elapsed(),
            ..ProcessingSummary::default()
        };

        for query_events in events.values() {
            let errors = query_events.iter().filter(|e| e.is_error()).count();
            let warnings = query_events.iter().filter(|e| e.is_warning()).count();

            if errors > 0 {
                summary.queries_with_errors += 1;
            } else if warnings > 0 {
                summary.queries_with_warnings += 1;
            }
            summary.total_errors += errors;
            summary.total_warnings += warnings;
        }
        summary.clean_queries =
            summary.total_queries - summary.queries_with_errors - summary.queries_with_warnings;

        if !contexts.is_empty() {
            let total: Duration = contexts.values().map(QueryContext::elapsed).sum();
            summary.average_query_time = total / contexts.len() as u32;
        }

        summary
    }

    pub fn clear(&self) {
        lock(&self.query_events).clear();
        lock(&self.query_contexts).clear();
    }

    pub fn total_event_count(&self) -> usize {
        lock(&self.query_events).values().map(Vec::len).sum()
    }

    /// (current events, buffer size, fill ratio)
    pub fn get_capacity_info(&self) -> (usize, usize, f64) {
        let current = self.total_event_count();
        let percentage = if LOG_BUFFER_SIZE > 0 {
            current as f64 / LOG_BUFFER_SIZE as f64
        } else {
            0.0
        };
        (current, LOG_BUFFER_SIZE, percentage)
    }

    pub fn is_near_capacity(&self) -> bool {
        self.total_event_count() > LOG_BUFFER_SIZE * 80 / 100
    }

    fn label_of(&self, query_id: usize) -> Option<String> {
        lock(&self.query_contexts)
            .get(&query_id)
            .map(|context| context.label.clone())
    }
}

impl Default for ErrorCollector {
    fn default() -> Self {
        Self::new()
    }
}

/// Compiler-style report of every query with errors or warnings
pub fn format_query_report(collector: &ErrorCollector) -> String {
    let mut output = String::new();

    for (query_id, events) in collector.get_all_query_events() {
        let problems: Vec<_> = events
            .iter()
            .filter(|e| e.is_error() || e.is_warning())
            .collect();
        if problems.is_empty() {
            continue;
        }

        match collector.label_of(query_id) {
            Some(label) => output.push_str(&format!("Query #{} ({}):\n", query_id, label)),
            None => output.push_str(&format!("Query #{}:\n", query_id)),
        }

        for event in problems {
            let kind = if event.is_error() { "error" } else { "warning" };
            let location = event
                .span
                .as_ref()
                .map(|s| format!(" --> {}", s.start))
                .unwrap_or_default();
            output.push_str(&format!(
                "{}[{}]: {}{}\n",
                kind,
                event.code.as_str(),
                event.message,
                location
            ));

            for (key, value) in &event.context {
                if key != "query" && key != "query_id" {
                    output.push_str(&format!("  = {}: {}\n", key, value));
                }
            }
            if event.is_error() {
                let action = event.recommended_action();
                if action != "No specific action available" {
                    output.push_str(&format!("  = help: {}\n", action));
                }
            }
        }
    }

    let summary = collector.get_summary();
    output.push_str(&format!(
        "{} queries: {} clean, {} with errors, {} with warnings",
        summary.total_queries,
        summary.clean_queries,
        summary.queries_with_errors,
        summary.queries_with_warnings
    ));

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::{Position, Span};

    #[test]
    fn test_events_are_filed_per_query() {
        let collector = ErrorCollector::new();
        collector.record_query_context(QueryContext::new(1, "first"));
        collector.record_query_context(QueryContext::new(2, "second"));

        collector.record_event(
            1,
            LogEvent::error(codes::lexical::UNTERMINATED_LITERAL, "Unterminated string"),
        );
        collector.record_event(2, LogEvent::warning("odd"));

        assert_eq!(collector.get_query_errors(1).len(), 1);
        assert!(collector.get_query_errors(2).is_empty());
        assert_eq!(collector.get_query_warnings(2).len(), 1);
        assert!(collector.query_has_errors(1));
        assert_eq!(collector.get_queries_with_errors(), vec![1]);

        let summary = collector.get_summary();
        assert_eq!(summary.total_queries, 2);
        assert_eq!(summary.queries_with_errors, 1);
        assert_eq!(summary.queries_with_warnings, 1);
        assert_eq!(summary.clean_queries, 0);
        assert_eq!(summary.clean_rate(), 0.5);
    }

    #[test]
    fn test_per_query_limit() {
        let collector = ErrorCollector::new();
        for _ in 0..MAX_LOG_EVENTS_PER_QUERY + 10 {
            collector.record_event(7, LogEvent::info("tick"));
        }

        let events = collector.get_query_events(7);
        assert_eq!(events.len(), MAX_LOG_EVENTS_PER_QUERY + 1);
        assert_eq!(
            events.last().map(|e| e.code),
            Some(codes::warnings::EVENT_LIMIT_REACHED)
        );
    }

    #[test]
    fn test_report() {
        let collector = ErrorCollector::new();
        collector.record_query_context(QueryContext::new(3, "bad-row"));
        let span = Span::new(Position::new(4, 1, 5), Position::new(5, 1, 6));
        collector.record_event(
            3,
            LogEvent::error(codes::lexical::UNRECOGNIZED_CHARACTER, "Unrecognized character '$'")
                .with_span(span)
                .with_context("query", "bad-row")
                .with_context("rule", "UNRECOGNIZED"),
        );

        let report = format_query_report(&collector);
        assert!(report.contains("Query #3 (bad-row):"));
        assert!(report.contains("error[E020]: Unrecognized character '$' --> 1:5"));
        assert!(report.contains("  = rule: UNRECOGNIZED"));
        assert!(!report.contains("  = query:"));
        assert!(report.ends_with("1 queries: 0 clean, 1 with errors, 0 with warnings"));
    }

    #[test]
    fn test_clear() {
        let collector = ErrorCollector::new();
        collector.record_event(1, LogEvent::info("x"));
        assert_eq!(collector.get_capacity_info().0, 1);
        assert!(!collector.is_near_capacity());
        collector.clear();
        assert_eq!(collector.total_event_count(), 0);
    }
}
