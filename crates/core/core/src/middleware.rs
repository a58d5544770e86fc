//! Invocation middleware for processing invocations before/after the handler runs.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lambda_types_events::EventSource;
use std::sync::Arc;

use crate::context::Context;
use crate::error::{InvokeError, InvokeResult};
use crate::invoke::CompletionKind;

/// What middleware sees of an invocation before it runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub request_id: String,
    pub function_name: String,
    /// Detected producer, when the event arrived as JSON.
    pub source: Option<EventSource>,
    pub started_at: DateTime<Utc>,
    /// Time left before the context deadline when the invocation started.
    pub remaining_ms: u64,
}

impl Invocation {
    pub fn new(context: &Context, source: Option<EventSource>) -> Self {
        let now = Utc::now();
        Self {
            request_id: context.aws_request_id.clone(),
            function_name: context.function_name.clone(),
            source,
            started_at: now,
            remaining_ms: context.remaining_time_in_millis_at(now),
        }
    }
}

/// What middleware sees of an invocation after it completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvocationSummary {
    pub kind: CompletionKind,
    pub failed: bool,
    pub duration_ms: u64,
}

/// Trait for invocation middleware.
#[async_trait]
pub trait InvokeMiddleware: Send + Sync {
    /// Name used in rejection errors.
    fn name(&self) -> &str;

    /// Called before the handler runs.
    /// Can adjust the invocation or reject it by returning an error.
    async fn before_invoke(&self, invocation: &mut Invocation) -> InvokeResult<()>;

    /// Called after the handler completed.
    async fn after_invoke(&self, invocation: &Invocation, summary: &InvocationSummary);
}

/// Chain of middleware to process invocations.
#[derive(Default)]
pub struct MiddlewareChain {
    middleware: Vec<Arc<dyn InvokeMiddleware>>,
}

impl MiddlewareChain {
    /// Creates a new empty middleware chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds middleware to the chain.
    pub fn add(&mut self, middleware: impl InvokeMiddleware + 'static) {
        self.middleware.push(Arc::new(middleware));
    }

    /// Runs all before_invoke middleware, stopping at the first rejection.
    pub async fn before_invoke(&self, invocation: &mut Invocation) -> InvokeResult<()> {
        for m in &self.middleware {
            m.before_invoke(invocation).await?;
        }
        Ok(())
    }

    /// Runs all after_invoke middleware.
    pub async fn after_invoke(&self, invocation: &Invocation, summary: &InvocationSummary) {
        for m in &self.middleware {
            m.after_invoke(invocation, summary).await;
        }
    }

    /// Returns the number of middleware in the chain.
    pub fn len(&self) -> usize {
        self.middleware.len()
    }

    /// Checks if the chain is empty.
    pub fn is_empty(&self) -> bool {
        self.middleware.is_empty()
    }
}

/// Log level for the logging middleware.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
}

/// Middleware that logs invocations.
///
/// Invocations that used both completion paths or neither are always logged
/// at `warn`.
#[derive(Debug, Clone, Default)]
pub struct LoggingMiddleware {
    pub level: LogLevel,
}

impl LoggingMiddleware {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_level(level: LogLevel) -> Self {
        Self { level }
    }
}

#[async_trait]
impl InvokeMiddleware for LoggingMiddleware {
    fn name(&self) -> &str {
        "logging"
    }

    async fn before_invoke(&self, invocation: &mut Invocation) -> InvokeResult<()> {
        let source = invocation.source.map(|s| s.as_str()).unwrap_or("unknown");
        match self.level {
            LogLevel::Trace => {
                tracing::trace!(
                    request_id = %invocation.request_id,
                    function = %invocation.function_name,
                    source,
                    remaining_ms = invocation.remaining_ms,
                    "Invocation started"
                );
            }
            LogLevel::Debug => {
                tracing::debug!(
                    request_id = %invocation.request_id,
                    source,
                    "Invocation started"
                );
            }
            LogLevel::Info => {
                tracing::info!(function = %invocation.function_name, source, "Invocation started");
            }
        }
        Ok(())
    }

    async fn after_invoke(&self, invocation: &Invocation, summary: &InvocationSummary) {
        match summary.kind {
            CompletionKind::Both => {
                tracing::warn!(
                    request_id = %invocation.request_id,
                    "Handler returned a result and also invoked its callback"
                );
            }
            CompletionKind::Neither => {
                tracing::warn!(
                    request_id = %invocation.request_id,
                    "Handler returned without a result and without invoking its callback"
                );
            }
            CompletionKind::Deferred | CompletionKind::Callback => {}
        }

        match self.level {
            LogLevel::Trace | LogLevel::Debug => {
                tracing::debug!(
                    request_id = %invocation.request_id,
                    completion = ?summary.kind,
                    failed = summary.failed,
                    duration_ms = summary.duration_ms,
                    "Invocation completed"
                );
            }
            LogLevel::Info => {
                if summary.failed {
                    tracing::info!(
                        function = %invocation.function_name,
                        duration_ms = summary.duration_ms,
                        "Invocation completed with an error"
                    );
                }
            }
        }
    }
}

/// Middleware that only lets events from known sources through.
#[derive(Debug, Clone, Default)]
pub struct SourceFilterMiddleware {
    /// Allowed sources; empty allows every detected source.
    pub allowed: Vec<EventSource>,
    /// Whether to reject events whose source could not be detected.
    pub reject_unknown: bool,
}

impl SourceFilterMiddleware {
    /// Allows everything, including undetected sources.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rejects events whose source could not be detected.
    pub fn strict() -> Self {
        Self {
            allowed: Vec::new(),
            reject_unknown: true,
        }
    }

    /// Allows only the given sources.
    pub fn only(sources: impl IntoIterator<Item = EventSource>) -> Self {
        Self {
            allowed: sources.into_iter().collect(),
            reject_unknown: true,
        }
    }
}

#[async_trait]
impl InvokeMiddleware for SourceFilterMiddleware {
    fn name(&self) -> &str {
        "source-filter"
    }

    async fn before_invoke(&self, invocation: &mut Invocation) -> InvokeResult<()> {
        match invocation.source {
            None if self.reject_unknown => {
                Err(InvokeError::rejected(self.name(), "event source could not be detected"))
            }
            Some(source) if !self.allowed.is_empty() && !self.allowed.contains(&source) => Err(
                InvokeError::rejected(self.name(), format!("event source '{source}' is not allowed")),
            ),
            _ => Ok(()),
        }
    }

    async fn after_invoke(&self, _invocation: &Invocation, _summary: &InvocationSummary) {}
}

/// Middleware that refuses to start once the deadline has passed.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeadlineMiddleware;

#[async_trait]
impl InvokeMiddleware for DeadlineMiddleware {
    fn name(&self) -> &str {
        "deadline"
    }

    async fn before_invoke(&self, invocation: &mut Invocation) -> InvokeResult<()> {
        if invocation.remaining_ms == 0 {
            return Err(InvokeError::rejected(self.name(), "deadline already passed"));
        }
        Ok(())
    }

    async fn after_invoke(&self, _invocation: &Invocation, _summary: &InvocationSummary) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invocation(source: Option<EventSource>) -> Invocation {
        Invocation::new(&Context::builder("f").build(), source)
    }

    #[tokio::test]
    async fn test_middleware_chain() {
        let mut chain = MiddlewareChain::new();
        chain.add(LoggingMiddleware::new());
        chain.add(SourceFilterMiddleware::new());
        assert_eq!(chain.len(), 2);

        let mut invocation = invocation(None);
        assert!(chain.before_invoke(&mut invocation).await.is_ok());
    }

    #[tokio::test]
    async fn test_source_filter() {
        let strict = SourceFilterMiddleware::strict();
        assert!(strict.before_invoke(&mut invocation(None)).await.is_err());
        assert!(strict.before_invoke(&mut invocation(Some(EventSource::Sns))).await.is_ok());

        let only_s3 = SourceFilterMiddleware::only([EventSource::S3]);
        let err = only_s3
            .before_invoke(&mut invocation(Some(EventSource::Sns)))
            .await
            .unwrap_err();
        assert!(matches!(err, InvokeError::Rejected { ref middleware, .. } if middleware == "source-filter"));
        assert!(only_s3.before_invoke(&mut invocation(Some(EventSource::S3))).await.is_ok());
    }

    #[tokio::test]
    async fn test_deadline_middleware() {
        let expired = Context::builder("f").deadline(Utc::now() - chrono::Duration::seconds(1)).build();
        let mut invocation = Invocation::new(&expired, None);

        assert_eq!(invocation.remaining_ms, 0);
        assert!(DeadlineMiddleware.before_invoke(&mut invocation).await.is_err());
    }
}
