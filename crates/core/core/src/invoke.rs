//! Local invoker: drives one handler invocation and reports how it completed.
//!
//! The invoker never chooses between completion paths. When a handler both
//! returns a deferred result and invokes its callback, the report carries
//! both results.

use lambda_types_events::EventSource;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::{Duration, Instant};
use tokio::sync::oneshot;
use tracing::{debug, warn};

use crate::context::Context;
use crate::error::{InvokeError, InvokeResult};
use crate::handler::{Callback, Completion, Handler, HandlerResult};
use crate::middleware::{Invocation, InvocationSummary, InvokeMiddleware, MiddlewareChain};

/// What the callback received: an error, or a result that may be absent.
pub type CallbackResult<R> = HandlerResult<Option<R>>;

/// Which completion paths a handler used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CompletionKind {
    Deferred,
    Callback,
    Both,
    Neither,
}

/// How an invocation completed.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<R> {
    /// Only the returned future completed it.
    Deferred(HandlerResult<R>),
    /// Only the callback completed it.
    Callback(CallbackResult<R>),
    /// Both paths were used.
    Both {
        deferred: HandlerResult<R>,
        callback: CallbackResult<R>,
    },
    /// The handler returned without a future and dropped the callback.
    Neither,
}

impl<R> Outcome<R> {
    pub fn kind(&self) -> CompletionKind {
        match self {
            Outcome::Deferred(_) => CompletionKind::Deferred,
            Outcome::Callback(_) => CompletionKind::Callback,
            Outcome::Both { .. } => CompletionKind::Both,
            Outcome::Neither => CompletionKind::Neither,
        }
    }

    /// `true` when the handler did not use exactly one completion path.
    pub fn is_ambiguous(&self) -> bool {
        matches!(self, Outcome::Both { .. } | Outcome::Neither)
    }

    /// `true` when any observed path reported an error.
    pub fn is_failure(&self) -> bool {
        match self {
            Outcome::Deferred(result) => result.is_err(),
            Outcome::Callback(result) => result.is_err(),
            Outcome::Both { deferred, callback } => deferred.is_err() || callback.is_err(),
            Outcome::Neither => false,
        }
    }

    /// Converts every observed result value with `f`.
    pub fn try_map<U, E, F>(self, mut f: F) -> Result<Outcome<U>, E>
    where
        F: FnMut(R) -> Result<U, E>,
    {
        Ok(match self {
            Outcome::Deferred(result) => Outcome::Deferred(map_result(result, &mut f)?),
            Outcome::Callback(result) => Outcome::Callback(map_callback(result, &mut f)?),
            Outcome::Both { deferred, callback } => Outcome::Both {
                deferred: map_result(deferred, &mut f)?,
                callback: map_callback(callback, &mut f)?,
            },
            Outcome::Neither => Outcome::Neither,
        })
    }
}

fn map_result<R, U, E>(
    result: HandlerResult<R>,
    f: &mut impl FnMut(R) -> Result<U, E>,
) -> Result<HandlerResult<U>, E> {
    match result {
        Ok(value) => f(value).map(Ok),
        Err(error) => Ok(Err(error)),
    }
}

fn map_callback<R, U, E>(
    result: CallbackResult<R>,
    f: &mut impl FnMut(R) -> Result<U, E>,
) -> Result<CallbackResult<U>, E> {
    match result {
        Ok(Some(value)) => f(value).map(|v| Ok(Some(v))),
        Ok(None) => Ok(Ok(None)),
        Err(error) => Ok(Err(error)),
    }
}

/// The result of one invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct InvocationReport<R> {
    pub request_id: String,
    pub source: Option<EventSource>,
    pub outcome: Outcome<R>,
    pub duration: Duration,
}

/// Drives handlers locally, one invocation at a time.
///
/// The wait for completion is bounded by the context deadline. A callback
/// invoked after the deferred result resolved is not observed.
#[derive(Default)]
pub struct Invoker {
    middleware: MiddlewareChain,
}

impl Invoker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds middleware to the chain.
    pub fn with_middleware(mut self, middleware: impl InvokeMiddleware + 'static) -> Self {
        self.middleware.add(middleware);
        self
    }

    /// Invokes `handler` with an already typed event.
    pub async fn invoke<E, R, H>(
        &self,
        handler: &H,
        event: E,
        context: Context,
    ) -> InvokeResult<InvocationReport<R>>
    where
        H: Handler<E, R> + ?Sized,
        R: Send + 'static,
    {
        self.run(handler, event, context, None).await
    }

    /// Decodes a JSON event into `E`, then invokes `handler`.
    pub async fn invoke_value<E, R, H>(
        &self,
        handler: &H,
        event: Value,
        context: Context,
    ) -> InvokeResult<InvocationReport<R>>
    where
        H: Handler<E, R> + ?Sized,
        E: DeserializeOwned,
        R: Send + 'static,
    {
        let source = EventSource::detect(&event);
        let event: E =
            serde_json::from_value(event).map_err(|e| InvokeError::EventDecode(e.to_string()))?;
        self.run(handler, event, context, source).await
    }

    /// Like [`Invoker::invoke_value`], encoding the results back to JSON.
    pub async fn invoke_json<E, R, H>(
        &self,
        handler: &H,
        event: Value,
        context: Context,
    ) -> InvokeResult<InvocationReport<Value>>
    where
        H: Handler<E, R> + ?Sized,
        E: DeserializeOwned,
        R: Serialize + Send + 'static,
    {
        let report = self.invoke_value(handler, event, context).await?;
        let outcome = report
            .outcome
            .try_map(serde_json::to_value)
            .map_err(|e| InvokeError::ResultEncode(e.to_string()))?;

        Ok(InvocationReport {
            request_id: report.request_id,
            source: report.source,
            outcome,
            duration: report.duration,
        })
    }

    async fn run<E, R, H>(
        &self,
        handler: &H,
        event: E,
        context: Context,
        source: Option<EventSource>,
    ) -> InvokeResult<InvocationReport<R>>
    where
        H: Handler<E, R> + ?Sized,
        R: Send + 'static,
    {
        let mut invocation = Invocation::new(&context, source);
        self.middleware.before_invoke(&mut invocation).await?;

        let (tx, rx) = oneshot::channel::<CallbackResult<R>>();
        let callback = Callback::new(move |error, result| {
            let result = match error {
                Some(error) => Err(error),
                None => Ok(result),
            };
            // The receiver is gone once the invocation has been reported.
            let _ = tx.send(result);
        });

        debug!(
            request_id = %invocation.request_id,
            function = %invocation.function_name,
            "Invoking handler"
        );

        let started = Instant::now();
        let completion = handler.handle(event, context, callback);
        let timeout = Duration::from_millis(invocation.remaining_ms);

        let outcome = match tokio::time::timeout(timeout, settle(completion, rx)).await {
            Ok(outcome) => outcome,
            Err(_) => {
                warn!(
                    request_id = %invocation.request_id,
                    timeout_ms = invocation.remaining_ms,
                    "Handler did not complete before the deadline"
                );
                return Err(InvokeError::Timeout {
                    request_id: invocation.request_id,
                    timeout_ms: invocation.remaining_ms,
                });
            }
        };
        let duration = started.elapsed();

        let summary = InvocationSummary {
            kind: outcome.kind(),
            failed: outcome.is_failure(),
            duration_ms: u64::try_from(duration.as_millis()).unwrap_or(u64::MAX),
        };
        self.middleware.after_invoke(&invocation, &summary).await;

        Ok(InvocationReport {
            request_id: invocation.request_id,
            source: invocation.source,
            outcome,
            duration,
        })
    }
}

async fn settle<R>(completion: Completion<R>, mut rx: oneshot::Receiver<CallbackResult<R>>) -> Outcome<R> {
    match completion {
        Completion::Deferred(future) => {
            let deferred = future.await;
            match rx.try_recv() {
                Ok(callback) => Outcome::Both { deferred, callback },
                Err(_) => Outcome::Deferred(deferred),
            }
        }
        Completion::Returned => match rx.await {
            Ok(callback) => Outcome::Callback(callback),
            Err(_) => Outcome::Neither,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HandlerError;
    use crate::handler::{async_handler_fn, handler_fn};
    use serde_json::json;

    fn context() -> Context {
        Context::builder("test-fn").build()
    }

    #[tokio::test]
    async fn test_deferred_only() {
        let handler = async_handler_fn(|event: i32, _ctx: Context| async move {
            Ok::<_, HandlerError>(event * 2)
        });

        let report = Invoker::new().invoke(&handler, 21, context()).await.unwrap();
        assert_eq!(report.outcome, Outcome::Deferred(Ok(42)));
        assert!(!report.outcome.is_ambiguous());
    }

    #[tokio::test]
    async fn test_callback_only() {
        let handler = handler_fn(|event: i32, _ctx: Context, cb: Callback<i32>| {
            cb.succeed(event + 1);
            Completion::Returned
        });

        let report = Invoker::new().invoke(&handler, 1, context()).await.unwrap();
        assert_eq!(report.outcome, Outcome::Callback(Ok(Some(2))));
    }

    #[tokio::test]
    async fn test_callback_from_spawned_task() {
        let handler = handler_fn(|_event: (), _ctx: Context, cb: Callback<&'static str>| {
            tokio::spawn(async move {
                tokio::task::yield_now().await;
                cb.succeed("later");
            });
            Completion::Returned
        });

        let report = Invoker::new().invoke(&handler, (), context()).await.unwrap();
        assert_eq!(report.outcome, Outcome::Callback(Ok(Some("later"))));
    }

    #[tokio::test]
    async fn test_both_paths_reported() {
        let handler = handler_fn(|_event: (), _ctx: Context, cb: Callback<i32>| {
            cb.fail("from callback");
            Completion::ready(Ok(1))
        });

        let report = Invoker::new().invoke(&handler, (), context()).await.unwrap();
        assert_eq!(report.outcome.kind(), CompletionKind::Both);
        assert!(report.outcome.is_ambiguous());
        assert!(report.outcome.is_failure());
        match report.outcome {
            Outcome::Both { deferred, callback } => {
                assert_eq!(deferred, Ok(1));
                assert_eq!(callback.unwrap_err().error_message, "from callback");
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_neither_path() {
        let handler = handler_fn(|_event: (), _ctx: Context, _cb: Callback<i32>| Completion::Returned);

        let report = Invoker::new().invoke(&handler, (), context()).await.unwrap();
        assert_eq!(report.outcome, Outcome::Neither);
        assert!(!report.outcome.is_failure());
    }

    #[tokio::test]
    async fn test_timeout() {
        let handler = async_handler_fn(|_event: (), _ctx: Context| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok::<_, HandlerError>(())
        });
        let context = Context::builder("slow").timeout(chrono::Duration::milliseconds(20)).build();

        let result = Invoker::new().invoke(&handler, (), context).await;
        assert!(matches!(result, Err(InvokeError::Timeout { timeout_ms, .. }) if timeout_ms <= 20));
    }

    #[tokio::test]
    async fn test_invoke_json() {
        let handler = async_handler_fn(|event: Value, _ctx: Context| async move {
            Ok::<_, HandlerError>(json!({ "echo": event["name"] }))
        });

        let report = Invoker::new()
            .invoke_json(&handler, json!({ "name": "lambda" }), context())
            .await
            .unwrap();
        assert_eq!(report.outcome, Outcome::Deferred(Ok(json!({ "echo": "lambda" }))));
        assert!(report.source.is_none());
    }

    #[tokio::test]
    async fn test_event_decode_error() {
        let handler = async_handler_fn(|event: u8, _ctx: Context| async move {
            Ok::<_, HandlerError>(event)
        });

        let result = Invoker::new()
            .invoke_value::<u8, u8, _>(&handler, json!("not a number"), context())
            .await;
        assert!(matches!(result, Err(InvokeError::EventDecode(_))));
    }
}
