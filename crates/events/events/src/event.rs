//! Event source classification and the envelope sum type.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use crate::apigw::APIGatewayProxyEvent;
use crate::authorizer::CustomAuthorizerEvent;
use crate::cloudformation::CloudFormationCustomResourceEvent;
use crate::cloudfront::{CloudFrontRequestEvent, CloudFrontResponseEvent};
use crate::cloudwatch_logs::CloudWatchLogsEvent;
use crate::cognito::CognitoUserPoolEvent;
use crate::error::{EventError, EventResult};
use crate::kinesis::KinesisStreamEvent;
use crate::s3::S3CreateEvent;
use crate::sns::SNSEvent;

/// The producer of an event envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventSource {
    #[serde(rename = "cloudfront-request")]
    CloudFrontRequest,
    #[serde(rename = "cloudfront-response")]
    CloudFrontResponse,
    ApiGateway,
    CustomAuthorizer,
    Sns,
    S3,
    CognitoUserPool,
    #[serde(rename = "cloudformation")]
    CloudFormation,
    #[serde(rename = "cloudwatch-logs")]
    CloudWatchLogs,
    Kinesis,
}

impl EventSource {
    /// Every source, in registry order.
    pub const ALL: [EventSource; 10] = [
        EventSource::CloudFrontRequest,
        EventSource::CloudFrontResponse,
        EventSource::ApiGateway,
        EventSource::CustomAuthorizer,
        EventSource::Sns,
        EventSource::S3,
        EventSource::CognitoUserPool,
        EventSource::CloudFormation,
        EventSource::CloudWatchLogs,
        EventSource::Kinesis,
    ];

    /// Returns the stable name (e.g. `api-gateway`).
    pub fn as_str(&self) -> &'static str {
        match self {
            EventSource::CloudFrontRequest => "cloudfront-request",
            EventSource::CloudFrontResponse => "cloudfront-response",
            EventSource::ApiGateway => "api-gateway",
            EventSource::CustomAuthorizer => "custom-authorizer",
            EventSource::Sns => "sns",
            EventSource::S3 => "s3",
            EventSource::CognitoUserPool => "cognito-user-pool",
            EventSource::CloudFormation => "cloudformation",
            EventSource::CloudWatchLogs => "cloudwatch-logs",
            EventSource::Kinesis => "kinesis",
        }
    }

    /// Guesses the source from the keys that only one producer sends.
    ///
    /// Returns `None` when no rule matches; the payload may still be a
    /// valid event of a producer this catalog does not know.
    pub fn detect(value: &Value) -> Option<EventSource> {
        if let Some(record) = value.pointer("/Records/0") {
            if let Some(cf) = record.get("cf") {
                return if cf.get("response").is_some() {
                    Some(EventSource::CloudFrontResponse)
                } else {
                    Some(EventSource::CloudFrontRequest)
                };
            }
            if record.get("EventSource").and_then(Value::as_str) == Some("aws:sns") {
                return Some(EventSource::Sns);
            }
            return match record.get("eventSource").and_then(Value::as_str) {
                Some("aws:s3") => Some(EventSource::S3),
                Some("aws:kinesis") => Some(EventSource::Kinesis),
                _ => None,
            };
        }

        let has = |key: &str| value.get(key).is_some();

        if value.pointer("/awslogs/data").is_some() {
            Some(EventSource::CloudWatchLogs)
        } else if has("RequestType") && has("ResponseURL") {
            Some(EventSource::CloudFormation)
        } else if has("triggerSource") && has("userPoolId") {
            Some(EventSource::CognitoUserPool)
        } else if has("httpMethod") && has("requestContext") {
            Some(EventSource::ApiGateway)
        } else if has("authorizationToken") && has("methodArn") {
            Some(EventSource::CustomAuthorizer)
        } else {
            None
        }
    }
}

impl fmt::Display for EventSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventSource {
    type Err = EventError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventSource::ALL
            .into_iter()
            .find(|source| source.as_str() == s)
            .ok_or_else(|| EventError::UnknownEventSource(s.to_string()))
    }
}

/// Any envelope in the catalog.
#[derive(Debug, Clone, PartialEq)]
pub enum LambdaEvent {
    CloudFrontRequest(CloudFrontRequestEvent),
    CloudFrontResponse(CloudFrontResponseEvent),
    ApiGateway(APIGatewayProxyEvent),
    CustomAuthorizer(CustomAuthorizerEvent),
    Sns(SNSEvent),
    S3(S3CreateEvent),
    CognitoUserPool(CognitoUserPoolEvent),
    CloudFormation(CloudFormationCustomResourceEvent),
    CloudWatchLogs(CloudWatchLogsEvent),
    Kinesis(KinesisStreamEvent),
}

impl LambdaEvent {
    /// Detects the source and decodes the payload with its shape.
    pub fn from_value(value: Value) -> EventResult<Self> {
        let source = EventSource::detect(&value).ok_or_else(|| {
            EventError::UnknownEventSource("payload matches no known producer".to_string())
        })?;
        Self::decode_as(source, value)
    }

    /// Decodes the payload with the shape of `source`.
    pub fn decode_as(source: EventSource, value: Value) -> EventResult<Self> {
        Self::decode_input(source, value).map_err(|e| shape_mismatch(source, e))
    }

    /// Decodes JSON text with the shape of `source`. Errors carry the line
    /// and column in `text`.
    pub fn decode_str(source: EventSource, text: &str) -> EventResult<Self> {
        Self::decode_input(source, text).map_err(|e| shape_mismatch(source, e))
    }

    pub(crate) fn decode_input<I: Input>(source: EventSource, input: I) -> serde_json::Result<Self> {
        debug!(source = %source, "Decoding event");

        match source {
            EventSource::CloudFrontRequest => input.decode().map(Self::CloudFrontRequest),
            EventSource::CloudFrontResponse => input.decode().map(Self::CloudFrontResponse),
            EventSource::ApiGateway => input.decode().map(Self::ApiGateway),
            EventSource::CustomAuthorizer => input.decode().map(Self::CustomAuthorizer),
            EventSource::Sns => input.decode().map(Self::Sns),
            EventSource::S3 => input.decode().map(Self::S3),
            EventSource::CognitoUserPool => input.decode().map(Self::CognitoUserPool),
            EventSource::CloudFormation => input.decode().map(Self::CloudFormation),
            EventSource::CloudWatchLogs => input.decode().map(Self::CloudWatchLogs),
            EventSource::Kinesis => input.decode().map(Self::Kinesis),
        }
    }

    pub fn source(&self) -> EventSource {
        match self {
            Self::CloudFrontRequest(_) => EventSource::CloudFrontRequest,
            Self::CloudFrontResponse(_) => EventSource::CloudFrontResponse,
            Self::ApiGateway(_) => EventSource::ApiGateway,
            Self::CustomAuthorizer(_) => EventSource::CustomAuthorizer,
            Self::Sns(_) => EventSource::Sns,
            Self::S3(_) => EventSource::S3,
            Self::CognitoUserPool(_) => EventSource::CognitoUserPool,
            Self::CloudFormation(_) => EventSource::CloudFormation,
            Self::CloudWatchLogs(_) => EventSource::CloudWatchLogs,
            Self::Kinesis(_) => EventSource::Kinesis,
        }
    }

    /// Encodes the envelope back to its wire form.
    pub fn to_value(&self) -> EventResult<Value> {
        let value = match self {
            Self::CloudFrontRequest(event) => serde_json::to_value(event),
            Self::CloudFrontResponse(event) => serde_json::to_value(event),
            Self::ApiGateway(event) => serde_json::to_value(event),
            Self::CustomAuthorizer(event) => serde_json::to_value(event),
            Self::Sns(event) => serde_json::to_value(event),
            Self::S3(event) => serde_json::to_value(event),
            Self::CognitoUserPool(event) => serde_json::to_value(event),
            Self::CloudFormation(event) => serde_json::to_value(event),
            Self::CloudWatchLogs(event) => serde_json::to_value(event),
            Self::Kinesis(event) => serde_json::to_value(event),
        };
        Ok(value?)
    }

    /// Number of records in a `Records` envelope; `1` for single-request
    /// events.
    pub fn record_count(&self) -> usize {
        match self {
            Self::CloudFrontRequest(event) => event.records.len(),
            Self::CloudFrontResponse(event) => event.records.len(),
            Self::Sns(event) => event.records.len(),
            Self::S3(event) => event.records.len(),
            Self::Kinesis(event) => event.records.len(),
            _ => 1,
        }
    }
}

impl TryFrom<Value> for LambdaEvent {
    type Error = EventError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(value)
    }
}

/// A JSON document in either parsed or text form.
pub(crate) trait Input {
    fn decode<T: DeserializeOwned>(self) -> serde_json::Result<T>;
}

impl Input for Value {
    fn decode<T: DeserializeOwned>(self) -> serde_json::Result<T> {
        serde_json::from_value(self)
    }
}

impl Input for &str {
    fn decode<T: DeserializeOwned>(self) -> serde_json::Result<T> {
        serde_json::from_str(self)
    }
}

fn shape_mismatch(source: EventSource, err: serde_json::Error) -> EventError {
    EventError::ShapeMismatch {
        shape: source.to_string(),
        message: err.to_string(),
    }
}
