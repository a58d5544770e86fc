//! # Lambda Types Core
//!
//! This crate provides the invocation-side contracts for AWS Lambda handlers.
//! It defines the per-invocation [`Context`], the handler and callback
//! traits that bind events to user logic, the handler error shape, and a
//! local [`Invoker`] that drives one invocation and reports how it completed.

pub mod context;
pub mod error;
pub mod handler;
pub mod invoke;
pub mod middleware;

// Re-export commonly used items at the crate root
pub use context::{
    ClientContext, ClientContextClient, ClientContextEnv, CognitoIdentity, Context, ContextBuilder,
};
pub use error::{HandlerError, InvokeError, InvokeResult};
pub use handler::{
    AsyncHandler, Callback, Completion, CustomAuthorizerCallback, CustomAuthorizerHandler,
    Handler, HandlerResult, ProxyCallback, ProxyHandler, async_handler_fn, deferred, handler_fn,
};
pub use invoke::{CallbackResult, CompletionKind, InvocationReport, Invoker, Outcome};
pub use middleware::{
    DeadlineMiddleware, Invocation, InvocationSummary, InvokeMiddleware, LoggingMiddleware,
    MiddlewareChain, SourceFilterMiddleware,
};

// Re-export the event catalog
pub use lambda_types_events as events;
