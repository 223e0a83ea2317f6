//! Batch tokenization of independent queries
//!
//! Queries are tokenized sequentially or on a set of worker threads. Each query
//! runs inside its own logging query context, so diagnostics are filed under
//! the query that raised them and can be reported per query afterwards.

use crate::config::compile_time::batch_processing::{MAX_QUERIES_PER_BATCH, MAX_WORKER_THREADS};
use crate::config::runtime::{BatchPreferences, LexicalPreferences};
use crate::lexical::{LexerError, LexicalAnalyzer, LexicalMetrics};
use crate::logging::{self, codes};
use crate::tokens::TokenStream;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

// ============================================================================
// BATCH PROCESSING TYPES
// ============================================================================

/// One query submitted to a batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryInput {
    /// Name used in logs and reports
    pub label: String,
    pub source: String,
}

impl QueryInput {
    pub fn new(label: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            source: source.into(),
        }
    }

    /// Label queries `query-1`, `query-2`, ... in submission order
    pub fn numbered<I, S>(sources: I) -> Vec<QueryInput>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        sources
            .into_iter()
            .enumerate()
            .map(|(index, source)| QueryInput::new(format!("query-{}", index + 1), source))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BatchConfig {
    pub max_threads: usize,
    pub fail_fast: bool,
    /// Treat the first lexical diagnostic of a query as a failure of that query
    pub strict: bool,
    pub dev_version: bool,
}

impl BatchConfig {
    pub fn from_preferences(batch: &BatchPreferences, lexical: &LexicalPreferences) -> Self {
        Self {
            max_threads: batch.max_threads.clamp(1, MAX_WORKER_THREADS),
            fail_fast: batch.fail_fast,
            strict: lexical.strict,
            dev_version: lexical.dev_version,
        }
    }

    pub fn sequential() -> Self {
        Self {
            max_threads: 1,
            ..Self::default()
        }
    }

    fn lexical_preferences(&self) -> LexicalPreferences {
        LexicalPreferences {
            dev_version: self.dev_version,
            strict: self.strict,
            ..LexicalPreferences::default()
        }
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self::from_preferences(&BatchPreferences::default(), &LexicalPreferences::default())
    }
}

/// A query that tokenized successfully
#[derive(Debug, Clone)]
pub struct TokenizedQuery {
    pub query_id: usize,
    pub label: String,
    pub stream: TokenStream,
    pub metrics: LexicalMetrics,
}

/// A query whose analyzer run failed
#[derive(Debug, Clone)]
pub struct FailedQuery {
    pub query_id: usize,
    pub label: String,
    pub error: LexerError,
}

#[derive(Debug, Default)]
pub struct BatchResults {
    pub successful: Vec<TokenizedQuery>,
    pub failed: Vec<FailedQuery>,
    pub processing_duration: Duration,
    pub queries_processed: usize,
    pub queries_submitted: usize,
}

impl BatchResults {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn success_count(&self) -> usize {
        self.successful.len()
    }

    pub fn failure_count(&self) -> usize {
        self.failed.len()
    }

    pub fn success_rate(&self) -> f64 {
        if self.queries_processed == 0 {
            0.0
        } else {
            self.successful.len() as f64 / self.queries_processed as f64
        }
    }

    /// In-band diagnostics across all successfully tokenized queries
    pub fn diagnostic_count(&self) -> usize {
        self.successful
            .iter()
            .map(|query| query.metrics.diagnostics)
            .sum()
    }

    pub fn add_success(&mut self, query: TokenizedQuery) {
        self.successful.push(query);
        self.queries_processed += 1;
    }

    pub fn add_failure(&mut self, query: FailedQuery) {
        self.failed.push(query);
        self.queries_processed += 1;
    }

    pub fn merge(&mut self, other: BatchResults) {
        self.successful.extend(other.successful);
        self.failed.extend(other.failed);
        self.queries_processed += other.queries_processed;
    }

    /// Look up a successful query by its position in the submitted batch
    pub fn get(&self, query_id: usize) -> Option<&TokenizedQuery> {
        self.successful.iter().find(|q| q.query_id == query_id)
    }

    fn sort_by_query_id(&mut self) {
        self.successful.sort_by_key(|q| q.query_id);
        self.failed.sort_by_key(|q| q.query_id);
    }

    pub fn summary(&self) -> String {
        format!(
            "Batch tokenization completed: {} queries processed, {} successful ({:.1}%), {} failed, {} diagnostics, {:.2}s total",
            self.queries_processed,
            self.success_count(),
            self.success_rate() * 100.0,
            self.failure_count(),
            self.diagnostic_count(),
            self.processing_duration.as_secs_f64()
        )
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("Batch contains no queries")]
    EmptyBatch,

    #[error("Too many queries in batch: {count} (max: {max})")]
    TooManyQueries { count: usize, max: usize },

    #[error("Worker thread failure: {message}")]
    WorkerFailure { message: String },
}

impl BatchError {
    pub fn error_code(&self) -> codes::Code {
        match self {
            BatchError::EmptyBatch => codes::batch::EMPTY_BATCH,
            BatchError::TooManyQueries { .. } => codes::batch::BATCH_TOO_LARGE,
            BatchError::WorkerFailure { .. } => codes::batch::WORKER_THREAD_FAILURE,
        }
    }
}

// ============================================================================
// SINGLE QUERY
// ============================================================================

fn tokenize_query(
    query_id: usize,
    query: &QueryInput,
    preferences: &LexicalPreferences,
) -> Result<TokenizedQuery, FailedQuery> {
    logging::with_query_context(query_id, &query.label, || {
        let mut analyzer = LexicalAnalyzer::with_preferences(preferences.clone());
        match analyzer.tokenize(&query.source) {
            Ok(stream) => Ok(TokenizedQuery {
                query_id,
                label: query.label.clone(),
                stream,
                metrics: analyzer.metrics().clone(),
            }),
            Err(error) => {
                crate::log_error!(codes::batch::QUERY_FAILED, "Query tokenization failed",
                    "reason" => &error,
                    "code" => error.error_code()
                );
                Err(FailedQuery {
                    query_id,
                    label: query.label.clone(),
                    error,
                })
            }
        }
    })
}

fn validate_batch(queries: &[QueryInput]) -> Result<(), BatchError> {
    let error = if queries.is_empty() {
        BatchError::EmptyBatch
    } else if queries.len() > MAX_QUERIES_PER_BATCH {
        BatchError::TooManyQueries {
            count: queries.len(),
            max: MAX_QUERIES_PER_BATCH,
        }
    } else {
        return Ok(());
    };

    crate::log_error!(error.error_code(), &error.to_string(),
        "queries" => queries.len()
    );
    Err(error)
}

// ============================================================================
// BATCH PROCESSING
// ============================================================================

pub fn process_sequential(
    queries: &[QueryInput],
    config: &BatchConfig,
) -> Result<BatchResults, BatchError> {
    let start_time = Instant::now();
    validate_batch(queries)?;

    crate::log_info!("Starting sequential batch tokenization",
        "queries" => queries.len()
    );

    let preferences = config.lexical_preferences();
    let mut results = BatchResults::new();
    results.queries_submitted = queries.len();

    for (query_id, query) in queries.iter().enumerate() {
        match tokenize_query(query_id, query, &preferences) {
            Ok(tokenized) => results.add_success(tokenized),
            Err(failed) => {
                results.add_failure(failed);
                if config.fail_fast {
                    crate::log_warning!("Fail-fast mode enabled, stopping batch",
                        "query_id" => query_id
                    );
                    break;
                }
            }
        }
    }

    results.processing_duration = start_time.elapsed();
    log_completion("Sequential batch tokenization completed", &results, 1);

    Ok(results)
}

pub fn process_parallel(
    queries: &[QueryInput],
    config: &BatchConfig,
) -> Result<BatchResults, BatchError> {
    let start_time = Instant::now();
    validate_batch(queries)?;

    let max_threads = config.max_threads.clamp(1, MAX_WORKER_THREADS);
    let chunk_size = calculate_chunk_size(queries.len(), max_threads);

    crate::log_info!("Starting parallel batch tokenization",
        "queries" => queries.len(),
        "max_threads" => max_threads
    );
    crate::log_debug!("Parallel batch configuration",
        "chunk_size" => chunk_size,
        "threads" => max_threads
    );

    let preferences = config.lexical_preferences();
    let mut results = BatchResults::new();
    results.queries_submitted = queries.len();

    for (chunk_index, chunk) in queries.chunks(chunk_size).enumerate() {
        let first_id = chunk_index * chunk_size;
        let chunk_results = process_chunk_parallel(chunk, first_id, max_threads, &preferences)?;
        results.merge(chunk_results);

        if config.fail_fast && results.failure_count() > 0 {
            crate::log_warning!("Fail-fast mode enabled, stopping batch",
                "processed" => results.queries_processed
            );
            break;
        }
    }

    results.sort_by_query_id();
    results.processing_duration = start_time.elapsed();
    log_completion("Parallel batch tokenization completed", &results, max_threads);

    Ok(results)
}

fn process_chunk_parallel(
    queries: &[QueryInput],
    first_id: usize,
    max_threads: usize,
    preferences: &LexicalPreferences,
) -> Result<BatchResults, BatchError> {
    let results = Arc::new(Mutex::new(BatchResults::new()));
    let queries_per_thread = queries.len().div_ceil(max_threads);

    let mut handles = Vec::new();
    for (thread_index, thread_queries) in queries.chunks(queries_per_thread).enumerate() {
        let thread_queries = thread_queries.to_vec();
        let base_id = first_id + thread_index * queries_per_thread;
        let preferences = preferences.clone();
        let results = Arc::clone(&results);

        handles.push(thread::spawn(move || {
            for (offset, query) in thread_queries.iter().enumerate() {
                let outcome = tokenize_query(base_id + offset, query, &preferences);
                let mut guard = results.lock().unwrap_or_else(PoisonError::into_inner);
                match outcome {
                    Ok(tokenized) => guard.add_success(tokenized),
                    Err(failed) => guard.add_failure(failed),
                }
            }
        }));
    }

    for handle in handles {
        handle.join().map_err(|_| {
            let error = BatchError::WorkerFailure {
                message: "Thread panicked during tokenization".to_string(),
            };
            crate::log_error!(error.error_code(), &error.to_string());
            error
        })?;
    }

    let results = Arc::try_unwrap(results).map_err(|_| BatchError::WorkerFailure {
        message: "Failed to collect results from worker threads".to_string(),
    })?;
    Ok(results.into_inner().unwrap_or_else(PoisonError::into_inner))
}

/// Queries per chunk, kept small enough to bound memory held by in-flight streams
fn calculate_chunk_size(query_count: usize, max_threads: usize) -> usize {
    const MIN_CHUNK_SIZE: usize = 1;
    const MAX_CHUNK_SIZE: usize = 50;

    query_count
        .div_ceil(max_threads.max(1))
        .clamp(MIN_CHUNK_SIZE, MAX_CHUNK_SIZE)
}

fn log_completion(message: &str, results: &BatchResults, threads: usize) {
    crate::log_success!(codes::success::BATCH_COMPLETE, message,
        "queries_processed" => results.queries_processed,
        "successful" => results.success_count(),
        "failed" => results.failure_count(),
        "diagnostics" => results.diagnostic_count(),
        "threads_used" => threads,
        "duration_ms" => format!("{:.2}", results.processing_duration.as_secs_f64() * 1000.0)
    );
}

// ============================================================================
// PUBLIC API
// ============================================================================

/// Tokenize a batch with configuration taken from the environment
pub fn tokenize_batch(queries: &[QueryInput]) -> Result<BatchResults, BatchError> {
    tokenize_batch_with_config(queries, &BatchConfig::default())
}

pub fn tokenize_batch_with_config(
    queries: &[QueryInput],
    config: &BatchConfig,
) -> Result<BatchResults, BatchError> {
    if config.max_threads <= 1 {
        process_sequential(queries, config)
    } else {
        process_parallel(queries, config)
    }
}
