//! Per-invocation context passed to handlers.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Amazon Cognito identity of the caller (mobile SDK invocations).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CognitoIdentity {
    pub cognito_identity_id: String,
    pub cognito_identity_pool_id: String,
}

/// Client application metadata (mobile SDK invocations).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientContext {
    pub client: ClientContextClient,
    /// Values set by the mobile application.
    #[serde(rename = "Custom", default, skip_serializing_if = "Option::is_none")]
    pub custom: Option<Value>,
    pub env: ClientContextEnv,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientContextClient {
    pub installation_id: String,
    pub app_title: String,
    pub app_version_name: String,
    pub app_version_code: String,
    pub app_package_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientContextEnv {
    pub platform_version: String,
    pub platform: String,
    pub make: String,
    pub model: String,
    pub locale: String,
}

/// Runtime information about the executing function.
///
/// Exactly one context exists per invocation. The deadline is fixed when the
/// invocation starts; [`Context::remaining_time_in_millis`] counts down to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Context {
    /// Whether the platform waits for pending background work before freezing
    /// the process after completion.
    pub callback_waits_for_empty_event_loop: bool,
    pub function_name: String,
    pub function_version: String,
    pub invoked_function_arn: String,
    #[serde(rename = "memoryLimitInMB")]
    pub memory_limit_in_mb: u32,
    pub aws_request_id: String,
    pub log_group_name: String,
    pub log_stream_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity: Option<CognitoIdentity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_context: Option<ClientContext>,
    /// When the platform stops the invocation.
    pub deadline: DateTime<Utc>,
}

impl Context {
    /// Starts a builder for a function named `function_name`.
    pub fn builder(function_name: impl Into<String>) -> ContextBuilder {
        ContextBuilder::new(function_name)
    }

    /// Milliseconds left before the deadline, or zero once it has passed.
    pub fn remaining_time_in_millis(&self) -> u64 {
        self.remaining_time_in_millis_at(Utc::now())
    }

    /// Milliseconds left before the deadline as seen at `now`.
    pub fn remaining_time_in_millis_at(&self, now: DateTime<Utc>) -> u64 {
        u64::try_from((self.deadline - now).num_milliseconds()).unwrap_or(0)
    }

    /// Returns `true` once the deadline has passed.
    pub fn is_expired(&self) -> bool {
        self.remaining_time_in_millis() == 0
    }
}

/// Builds a [`Context`] for tests and local invocation.
#[derive(Debug, Clone)]
pub struct ContextBuilder {
    function_name: String,
    function_version: String,
    invoked_function_arn: Option<String>,
    memory_limit_in_mb: u32,
    aws_request_id: Option<String>,
    log_stream_name: Option<String>,
    timeout: Duration,
    deadline: Option<DateTime<Utc>>,
    identity: Option<CognitoIdentity>,
    client_context: Option<ClientContext>,
    callback_waits_for_empty_event_loop: bool,
}

impl ContextBuilder {
    /// Default memory size in MB.
    pub const DEFAULT_MEMORY_MB: u32 = 128;
    /// Default function timeout in seconds.
    pub const DEFAULT_TIMEOUT_SECS: i64 = 3;

    pub fn new(function_name: impl Into<String>) -> Self {
        Self {
            function_name: function_name.into(),
            function_version: "$LATEST".to_string(),
            invoked_function_arn: None,
            memory_limit_in_mb: Self::DEFAULT_MEMORY_MB,
            aws_request_id: None,
            log_stream_name: None,
            timeout: Duration::seconds(Self::DEFAULT_TIMEOUT_SECS),
            deadline: None,
            identity: None,
            client_context: None,
            callback_waits_for_empty_event_loop: true,
        }
    }

    pub fn function_version(mut self, version: impl Into<String>) -> Self {
        self.function_version = version.into();
        self
    }

    pub fn invoked_function_arn(mut self, arn: impl Into<String>) -> Self {
        self.invoked_function_arn = Some(arn.into());
        self
    }

    pub fn memory_limit_in_mb(mut self, memory: u32) -> Self {
        self.memory_limit_in_mb = memory;
        self
    }

    pub fn aws_request_id(mut self, id: impl Into<String>) -> Self {
        self.aws_request_id = Some(id.into());
        self
    }

    pub fn log_stream_name(mut self, name: impl Into<String>) -> Self {
        self.log_stream_name = Some(name.into());
        self
    }

    /// Sets the timeout; the deadline is computed from it at `build` time and
    /// saturates at the latest representable instant.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets an absolute deadline, overriding the timeout.
    pub fn deadline(mut self, deadline: DateTime<Utc>) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn identity(mut self, identity: CognitoIdentity) -> Self {
        self.identity = Some(identity);
        self
    }

    pub fn client_context(mut self, client_context: ClientContext) -> Self {
        self.client_context = Some(client_context);
        self
    }

    pub fn callback_waits_for_empty_event_loop(mut self, wait: bool) -> Self {
        self.callback_waits_for_empty_event_loop = wait;
        self
    }

    pub fn build(self) -> Context {
        let now = Utc::now();
        let request_id = self
            .aws_request_id
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        let invoked_function_arn = self.invoked_function_arn.unwrap_or_else(|| {
            format!("arn:aws:lambda:us-east-1:123456789012:function:{}", self.function_name)
        });
        let log_stream_name = self.log_stream_name.unwrap_or_else(|| {
            format!(
                "{}/[{}]{}",
                now.format("%Y/%m/%d"),
                self.function_version,
                uuid::Uuid::new_v4().simple()
            )
        });

        Context {
            callback_waits_for_empty_event_loop: self.callback_waits_for_empty_event_loop,
            log_group_name: format!("/aws/lambda/{}", self.function_name),
            function_name: self.function_name,
            function_version: self.function_version,
            invoked_function_arn,
            memory_limit_in_mb: self.memory_limit_in_mb,
            aws_request_id: request_id,
            log_stream_name,
            identity: self.identity,
            client_context: self.client_context,
            deadline: self.deadline.unwrap_or_else(|| {
                now.checked_add_signed(self.timeout)
                    .unwrap_or(DateTime::<Utc>::MAX_UTC)
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let context = Context::builder("resize-images").build();

        assert_eq!(context.function_name, "resize-images");
        assert_eq!(context.function_version, "$LATEST");
        assert_eq!(context.memory_limit_in_mb, 128);
        assert_eq!(context.log_group_name, "/aws/lambda/resize-images");
        assert!(context.invoked_function_arn.ends_with(":function:resize-images"));
        assert!(context.log_stream_name.contains("[$LATEST]"));
        assert!(uuid::Uuid::parse_str(&context.aws_request_id).is_ok());
        assert!(context.callback_waits_for_empty_event_loop);

        let remaining = context.remaining_time_in_millis();
        assert!(remaining > 0 && remaining <= 3_000);
    }

    #[test]
    fn test_remaining_time_at() {
        let deadline = Utc::now();
        let context = Context::builder("f").deadline(deadline).build();

        assert_eq!(context.remaining_time_in_millis_at(deadline - Duration::milliseconds(1_500)), 1_500);
        assert_eq!(context.remaining_time_in_millis_at(deadline), 0);
        assert_eq!(context.remaining_time_in_millis_at(deadline + Duration::seconds(1)), 0);
    }

    #[test]
    fn test_oversized_timeout_saturates() {
        let context = Context::builder("f").timeout(Duration::MAX).build();

        assert_eq!(context.deadline, DateTime::<Utc>::MAX_UTC);
        assert!(!context.is_expired());
        assert!(context.remaining_time_in_millis() > 900_000);
    }

    #[test]
    fn test_wire_names() {
        let context = Context::builder("f").aws_request_id("req-1").memory_limit_in_mb(512).build();
        let value = serde_json::to_value(&context).unwrap();

        assert_eq!(value["memoryLimitInMB"], 512);
        assert_eq!(value["awsRequestId"], "req-1");
        assert!(value.get("identity").is_none());

        let back: Context = serde_json::from_value(value).unwrap();
        assert_eq!(back, context);
    }
}
