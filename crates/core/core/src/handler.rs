//! Handler and callback contracts.
//!
//! A handler receives the event, the [`Context`] and a [`Callback`]. It may
//! complete by returning a deferred result, by invoking the callback, or
//! (for fire-and-forget work) by doing neither. Using exactly one path is the
//! caller's responsibility; the types do not enforce it. The invoker in
//! [`crate::invoke`] reports which paths were used.

use async_trait::async_trait;
use lambda_types_events::{APIGatewayProxyEvent, AuthResponse, CustomAuthorizerEvent, ProxyResult};
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::context::Context;
use crate::error::HandlerError;

/// Result of a completed handler.
pub type HandlerResult<R> = Result<R, HandlerError>;

/// A boxed, sendable future.
pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;

/// How `handle` returned.
pub enum Completion<R> {
    /// The result arrives when the future completes.
    Deferred(BoxFuture<HandlerResult<R>>),
    /// Returned without a value; any result goes through the callback.
    Returned,
}

impl<R> Completion<R> {
    /// Boxes a future as a deferred completion.
    pub fn deferred<F>(future: F) -> Self
    where
        F: Future<Output = HandlerResult<R>> + Send + 'static,
    {
        Completion::Deferred(Box::pin(future))
    }

    /// A deferred completion that is already resolved.
    pub fn ready(result: HandlerResult<R>) -> Self
    where
        R: Send + 'static,
    {
        Completion::deferred(std::future::ready(result))
    }

    pub fn is_deferred(&self) -> bool {
        matches!(self, Completion::Deferred(_))
    }
}

impl<R> fmt::Debug for Completion<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Completion::Deferred(_) => f.write_str("Completion::Deferred(..)"),
            Completion::Returned => f.write_str("Completion::Returned"),
        }
    }
}

/// The completion callback handed to every handler.
///
/// Consumed on use, so it can be invoked at most once.
pub struct Callback<R> {
    inner: Box<dyn FnOnce(Option<HandlerError>, Option<R>) + Send>,
}

impl<R> Callback<R> {
    pub fn new<F>(f: F) -> Self
    where
        F: FnOnce(Option<HandlerError>, Option<R>) + Send + 'static,
    {
        Self { inner: Box::new(f) }
    }

    /// A callback that discards what it receives.
    pub fn noop() -> Self {
        Self::new(|_, _| {})
    }

    /// Completes with an optional error and an optional result. An error
    /// means failure regardless of `result`.
    pub fn done(self, error: Option<HandlerError>, result: Option<R>) {
        (self.inner)(error, result)
    }

    /// Completes successfully with `result`.
    pub fn succeed(self, result: R) {
        self.done(None, Some(result))
    }

    /// Completes with an error.
    pub fn fail(self, error: impl Into<HandlerError>) {
        self.done(Some(error.into()), None)
    }

    /// Completes from a `Result`.
    pub fn complete(self, result: HandlerResult<R>) {
        match result {
            Ok(value) => self.succeed(value),
            Err(error) => self.done(Some(error), None),
        }
    }
}

impl<R> fmt::Debug for Callback<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Callback(..)")
    }
}

/// A function handler. `E` and `R` default to raw JSON.
pub trait Handler<E = Value, R = Value>: Send + Sync {
    fn handle(&self, event: E, context: Context, callback: Callback<R>) -> Completion<R>;
}

impl<E, R, H> Handler<E, R> for Arc<H>
where
    H: Handler<E, R> + ?Sized,
{
    fn handle(&self, event: E, context: Context, callback: Callback<R>) -> Completion<R> {
        (**self).handle(event, context, callback)
    }
}

impl<E, R, H> Handler<E, R> for Box<H>
where
    H: Handler<E, R> + ?Sized,
{
    fn handle(&self, event: E, context: Context, callback: Callback<R>) -> Completion<R> {
        (**self).handle(event, context, callback)
    }
}

/// Callback of an API Gateway proxy handler.
pub type ProxyCallback = Callback<ProxyResult>;

/// A handler for API Gateway proxy integrations.
pub trait ProxyHandler: Handler<APIGatewayProxyEvent, ProxyResult> {}

impl<T> ProxyHandler for T where T: Handler<APIGatewayProxyEvent, ProxyResult> + ?Sized {}

/// Callback of a custom authorizer handler.
pub type CustomAuthorizerCallback = Callback<AuthResponse>;

/// A handler for API Gateway token authorizers.
pub trait CustomAuthorizerHandler: Handler<CustomAuthorizerEvent, AuthResponse> {}

impl<T> CustomAuthorizerHandler for T where T: Handler<CustomAuthorizerEvent, AuthResponse> + ?Sized {}

/// Handler written as an `async fn` returning its result.
///
/// Lift it into a [`Handler`] with [`deferred`].
#[async_trait]
pub trait AsyncHandler<E, R>: Send + Sync
where
    E: Send + 'static,
    R: Send + 'static,
{
    async fn call(&self, event: E, context: Context) -> HandlerResult<R>;
}

/// Adapts an [`AsyncHandler`] into a [`Handler`] that completes through
/// its returned future and never touches the callback.
pub struct Deferred<H> {
    inner: Arc<H>,
}

/// Lifts an [`AsyncHandler`] into a [`Handler`].
pub fn deferred<H>(handler: H) -> Deferred<H> {
    Deferred {
        inner: Arc::new(handler),
    }
}

impl<E, R, H> Handler<E, R> for Deferred<H>
where
    H: AsyncHandler<E, R> + 'static,
    E: Send + 'static,
    R: Send + 'static,
{
    fn handle(&self, event: E, context: Context, _callback: Callback<R>) -> Completion<R> {
        let handler = Arc::clone(&self.inner);
        Completion::deferred(async move { handler.call(event, context).await })
    }
}

/// Wrapper for closure-based handlers.
pub struct FnHandler<F> {
    f: F,
}

/// Uses a closure with the full `(event, context, callback)` signature as a
/// handler.
pub fn handler_fn<F>(f: F) -> FnHandler<F> {
    FnHandler { f }
}

impl<E, R, F> Handler<E, R> for FnHandler<F>
where
    F: Fn(E, Context, Callback<R>) -> Completion<R> + Send + Sync,
{
    fn handle(&self, event: E, context: Context, callback: Callback<R>) -> Completion<R> {
        (self.f)(event, context, callback)
    }
}

/// Wrapper for async closures returning their result.
pub struct AsyncFnHandler<F> {
    f: F,
}

/// Uses an async closure `(event, context) -> Result` as a handler.
pub fn async_handler_fn<F>(f: F) -> AsyncFnHandler<F> {
    AsyncFnHandler { f }
}

impl<E, R, F, Fut> Handler<E, R> for AsyncFnHandler<F>
where
    F: Fn(E, Context) -> Fut + Send + Sync,
    Fut: Future<Output = HandlerResult<R>> + Send + 'static,
{
    fn handle(&self, event: E, context: Context, _callback: Callback<R>) -> Completion<R> {
        Completion::deferred((self.f)(event, context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    type Slot<R> = Arc<Mutex<Option<(Option<HandlerError>, Option<R>)>>>;

    fn recording<R: Send + 'static>() -> (Callback<R>, Slot<R>) {
        let slot: Slot<R> = Arc::new(Mutex::new(None));
        let writer = Arc::clone(&slot);
        let callback = Callback::new(move |error, result| {
            *writer.lock().unwrap() = Some((error, result));
        });
        (callback, slot)
    }

    #[test]
    fn test_callback_helpers() {
        let (callback, slot) = recording::<i32>();
        callback.succeed(7);
        assert_eq!(slot.lock().unwrap().take(), Some((None, Some(7))));

        let (callback, slot) = recording::<i32>();
        callback.fail("nope");
        let (error, result) = slot.lock().unwrap().take().unwrap();
        assert_eq!(error.unwrap().error_message, "nope");
        assert!(result.is_none());

        let (callback, slot) = recording::<i32>();
        callback.done(None, None);
        assert_eq!(slot.lock().unwrap().take(), Some((None, None)));
    }

    #[test]
    fn test_handler_fn_uses_callback() {
        let handler = handler_fn(|event: Value, _ctx: Context, cb: Callback<Value>| {
            cb.succeed(event);
            Completion::Returned
        });

        let (callback, slot) = recording::<Value>();
        let completion = handler.handle(Value::from(1), Context::builder("f").build(), callback);

        assert!(!completion.is_deferred());
        assert_eq!(slot.lock().unwrap().take(), Some((None, Some(Value::from(1)))));
    }

    struct Echo;

    #[async_trait]
    impl AsyncHandler<String, String> for Echo {
        async fn call(&self, event: String, context: Context) -> HandlerResult<String> {
            Ok(format!("{}:{event}", context.function_name))
        }
    }

    #[tokio::test]
    async fn test_deferred_adapter() {
        let handler = deferred(Echo);
        let completion = handler.handle("hi".to_string(), Context::builder("echo").build(), Callback::noop());

        match completion {
            Completion::Deferred(future) => assert_eq!(future.await.unwrap(), "echo:hi"),
            Completion::Returned => panic!("expected a deferred completion"),
        }
    }

    #[test]
    fn test_proxy_handler_bound() {
        fn assert_proxy<H: ProxyHandler>(_: &H) {}

        let handler = async_handler_fn(|_event: APIGatewayProxyEvent, _ctx: Context| async {
            Ok::<_, HandlerError>(ProxyResult::ok("ok"))
        });
        assert_proxy(&handler);
    }
}
