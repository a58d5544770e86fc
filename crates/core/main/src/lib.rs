//! # Lambda Types
//!
//! Typed payloads for the events AWS Lambda delivers, and the contracts a
//! handler completes an invocation with.
//!
//! ## Quick Start
//!
//! ```rust
//! use lambda_types::prelude::*;
//! use serde_json::json;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), InvokeError> {
//!     let handler = async_handler_fn(|event: CustomAuthorizerEvent, _ctx: Context| async move {
//!         Ok::<_, HandlerError>(AuthResponse::allow("user", event.method_arn))
//!     });
//!
//!     let event = json!({
//!         "type": "TOKEN",
//!         "authorizationToken": "allow",
//!         "methodArn": "arn:aws:execute-api:us-east-1:123456789012:abcdef123/test/GET/pets"
//!     });
//!
//!     let report = Invoker::new()
//!         .invoke_json::<CustomAuthorizerEvent, AuthResponse, _>(
//!             &handler,
//!             event,
//!             FunctionConfig::default().context(),
//!         )
//!         .await?;
//!     assert_eq!(report.outcome.kind(), CompletionKind::Deferred);
//!     Ok(())
//! }
//! ```

// Re-export core types
pub use lambda_types_core::*;

// Re-export the event catalog
pub use lambda_types_events as events;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use lambda_types_core::context::{Context, ContextBuilder};
    pub use lambda_types_core::error::{HandlerError, InvokeError, InvokeResult};
    pub use lambda_types_core::handler::{
        AsyncHandler, Callback, Completion, CustomAuthorizerCallback, CustomAuthorizerHandler,
        Handler, HandlerResult, ProxyCallback, ProxyHandler, async_handler_fn, deferred,
        handler_fn,
    };
    pub use lambda_types_core::invoke::{CompletionKind, InvocationReport, Invoker, Outcome};
    pub use lambda_types_core::middleware::{
        DeadlineMiddleware, InvokeMiddleware, LoggingMiddleware, SourceFilterMiddleware,
    };
    pub use lambda_types_events::{
        APIGatewayProxyEvent, AuthResponse, CloudFormationCustomResourceEvent,
        CloudFrontRequestEvent, CloudWatchLogsEvent, CognitoUserPoolEvent, CustomAuthorizerEvent,
        CustomResourceResponse, Effect, EventError, EventSource, KinesisStreamEvent, LambdaEvent,
        ProxyResult, S3CreateEvent, SNSEvent,
    };

    pub use crate::config::{FunctionConfig, FunctionConfigError};
}

/// Configuration for locally simulated functions.
pub mod config {
    use chrono::Duration;
    use lambda_types_core::context::{Context, ContextBuilder};
    use serde::{Deserialize, Serialize};

    /// Describes the function whose invocations are simulated.
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(default)]
    pub struct FunctionConfig {
        /// Function name (default: "local")
        pub function_name: String,
        /// Published version (default: "$LATEST")
        pub function_version: String,
        /// Memory limit in MB (default: 128)
        pub memory_limit_in_mb: u32,
        /// Timeout in milliseconds (default: 3 seconds)
        pub timeout_ms: u64,
    }

    impl Default for FunctionConfig {
        fn default() -> Self {
            Self {
                function_name: "local".to_string(),
                function_version: "$LATEST".to_string(),
                memory_limit_in_mb: 128,
                timeout_ms: 3_000,
            }
        }
    }

    /// A [`FunctionConfig`] value outside the limits Lambda accepts.
    #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
    pub enum FunctionConfigError {
        #[error("timeout_ms must be between 1 and {max}, got {value}")]
        Timeout { value: u64, max: u64 },
        #[error("memory_limit_in_mb must be between {min} and {max}, got {value}")]
        Memory { value: u32, min: u32, max: u32 },
    }

    impl FunctionConfig {
        /// Longest timeout Lambda allows (15 minutes).
        pub const MAX_TIMEOUT_MS: u64 = 900_000;
        /// Smallest memory size Lambda allows.
        pub const MIN_MEMORY_MB: u32 = 128;
        /// Largest memory size Lambda allows.
        pub const MAX_MEMORY_MB: u32 = 10_240;

        /// Checks the values against the limits Lambda accepts.
        pub fn validate(&self) -> Result<(), FunctionConfigError> {
            if self.timeout_ms == 0 || self.timeout_ms > Self::MAX_TIMEOUT_MS {
                return Err(FunctionConfigError::Timeout {
                    value: self.timeout_ms,
                    max: Self::MAX_TIMEOUT_MS,
                });
            }
            if !(Self::MIN_MEMORY_MB..=Self::MAX_MEMORY_MB).contains(&self.memory_limit_in_mb) {
                return Err(FunctionConfigError::Memory {
                    value: self.memory_limit_in_mb,
                    min: Self::MIN_MEMORY_MB,
                    max: Self::MAX_MEMORY_MB,
                });
            }
            Ok(())
        }

        /// A context builder for one invocation of this function.
        ///
        /// Timeouts too large for a [`Duration`] saturate; call
        /// [`FunctionConfig::validate`] first to reject them.
        pub fn context_builder(&self) -> ContextBuilder {
            let timeout = i64::try_from(self.timeout_ms)
                .ok()
                .and_then(Duration::try_milliseconds)
                .unwrap_or(Duration::MAX);

            Context::builder(&self.function_name)
                .function_version(&self.function_version)
                .memory_limit_in_mb(self.memory_limit_in_mb)
                .timeout(timeout)
        }

        /// A fresh context whose deadline starts now.
        pub fn context(&self) -> Context {
            self.context_builder().build()
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_default_config() {
            let config = FunctionConfig::default();
            let context = config.context();
            assert_eq!(context.function_name, "local");
            assert_eq!(context.function_version, "$LATEST");
            assert_eq!(context.memory_limit_in_mb, 128);
            assert!(context.remaining_time_in_millis() <= 3_000);
        }

        #[test]
        fn test_partial_config() {
            let config: FunctionConfig =
                serde_json::from_str(r#"{ "function_name": "thumbnailer", "timeout_ms": 900000 }"#)
                    .unwrap();
            assert_eq!(config.function_name, "thumbnailer");
            assert_eq!(config.memory_limit_in_mb, 128);
            assert!(config.context().remaining_time_in_millis() > 3_000);
            assert!(config.validate().is_ok());
        }

        #[test]
        fn test_out_of_range_values() {
            let config = FunctionConfig {
                timeout_ms: u64::MAX,
                ..FunctionConfig::default()
            };
            assert_eq!(
                config.validate(),
                Err(FunctionConfigError::Timeout {
                    value: u64::MAX,
                    max: FunctionConfig::MAX_TIMEOUT_MS,
                })
            );
            // Still builds a context rather than overflowing the deadline.
            assert!(!config.context().is_expired());

            let config = FunctionConfig {
                timeout_ms: 0,
                ..FunctionConfig::default()
            };
            assert!(matches!(config.validate(), Err(FunctionConfigError::Timeout { .. })));

            let config = FunctionConfig {
                memory_limit_in_mb: 64,
                ..FunctionConfig::default()
            };
            assert!(matches!(config.validate(), Err(FunctionConfigError::Memory { value: 64, .. })));

            assert!(serde_json::from_str::<FunctionConfig>(r#"{ "timeout_ms": -1 }"#).is_err());
        }
    }
}
