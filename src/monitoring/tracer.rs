/*!
 * Distributed Tracing
 * Structured tracing for service requests using the tracing crate
 *
 * Features:
 * - Trace ID generation for request correlation
 * - JSON-formatted logs for structured parsing
 * - `log` records from the memory engine forwarded into tracing
 */

use std::time::Instant;
use tracing::{debug, info, span, warn, Level};
use tracing_subscriber::{
    fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};
use uuid::Uuid;

/// Requests slower than this are reported at warn level
const SLOW_REQUEST_MS: u128 = 10;

/// Initialize structured tracing
///
/// Environment variables:
/// - RUST_LOG: Set log level (default: info)
/// - MEMSIM_TRACE_JSON: Enable JSON output (default: false)
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let use_json = std::env::var("MEMSIM_TRACE_JSON")
        .map(|v| v == "1" || v == "true")
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(env_filter);

    if use_json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_line_number(true)
                    .with_file(true)
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_span_events(FmtSpan::CLOSE),
            )
            .init();
        info!("Structured tracing initialized with JSON output");
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_line_number(true)
                    .with_span_events(FmtSpan::CLOSE)
                    .compact(),
            )
            .init();
        info!("Structured tracing initialized");
    }
}

/// Generate a unique trace ID for request correlation
pub fn generate_trace_id() -> String {
    Uuid::new_v4().to_string()
}

/// Span covering one service request
pub struct RequestSpan {
    span: tracing::Span,
    start: Instant,
    operation: &'static str,
    trace_id: String,
}

impl RequestSpan {
    pub fn new(operation: &'static str) -> Self {
        let trace_id = generate_trace_id();
        let span = span!(
            Level::DEBUG,
            "request",
            trace_id = %trace_id,
            op = operation,
            result = tracing::field::Empty,
            error = tracing::field::Empty,
            duration_us = tracing::field::Empty,
        );

        Self {
            span,
            start: Instant::now(),
            operation,
            trace_id,
        }
    }

    pub fn trace_id(&self) -> &str {
        &self.trace_id
    }

    pub fn record_result(&self, success: bool) {
        self.span.record("result", if success { "success" } else { "failure" });
    }

    pub fn record_error(&self, error: &str) {
        self.span.record("error", error);
        self.span.record("result", "error");
    }

    /// Enter the span context
    pub fn enter(&self) -> tracing::span::Entered<'_> {
        self.span.enter()
    }
}

impl Drop for RequestSpan {
    fn drop(&mut self) {
        let duration = self.start.elapsed();
        let _entered = self.span.enter();
        self.span.record("duration_us", duration.as_micros() as u64);

        if duration.as_millis() > SLOW_REQUEST_MS {
            warn!(
                trace_id = %self.trace_id,
                op = self.operation,
                duration_ms = duration.as_millis() as u64,
                slow = true,
                "slow request detected"
            );
        } else {
            debug!(
                trace_id = %self.trace_id,
                op = self.operation,
                duration_us = duration.as_micros() as u64,
                "request completed"
            );
        }
    }
}
