//! # Lambda Types Events
//!
//! Shapes of the payloads AWS Lambda passes to handlers and the results
//! handlers return:
//! - One module per producer (CloudFront, API Gateway, SNS, S3, ...)
//! - Tagged unions for CloudFormation custom resource requests and responses
//! - Header dual representation and nullable identity fields
//! - Source detection, a source registry and conformance checks
//!
//! ## Example
//!
//! ```rust
//! use lambda_types_events::{EventSource, LambdaEvent};
//!
//! let value = serde_json::json!({
//!     "type": "TOKEN",
//!     "authorizationToken": "allow",
//!     "methodArn": "arn:aws:execute-api:us-east-1:123456789012:abcdef123/test/GET/pets"
//! });
//!
//! let event = LambdaEvent::from_value(value).unwrap();
//! assert_eq!(event.source(), EventSource::CustomAuthorizer);
//! ```

mod error;
mod event;
mod headers;
mod nullable;
mod registry;

pub mod apigw;
pub mod authorizer;
pub mod cloudformation;
pub mod cloudfront;
pub mod cloudwatch_logs;
pub mod cognito;
pub mod conformance;
pub mod kinesis;
pub mod s3;
pub mod sns;

pub use error::{EventError, EventResult};
pub use event::{EventSource, LambdaEvent};
pub use headers::{HeaderMap, Headers, Missing, MultiValueHeaderMap};
pub use nullable::Nullable;
pub use registry::{EventRegistry, SourceDefinition};
pub use conformance::{ValidationError, ValidationResult};

pub use apigw::{
    APIGatewayCertValidity, APIGatewayClientCert, APIGatewayEvent, APIGatewayProxyEvent, APIGatewayRequestContext, APIGatewayRequestIdentity,
    HeaderValue, ProxyResult,
};
pub use authorizer::{
    AuthResponse, AuthResponseContext, ContextValue, CustomAuthorizerEvent, Effect, MethodArn,
    OneOrMany, PolicyDocument, Statement,
};
pub use cloudformation::{
    CloudFormationCustomResourceEvent, CustomResourceRequestCommon, CustomResourceResponse,
    ResourceProperties,
};
pub use cloudfront::{
    CloudFrontRequestEvent, CloudFrontRequestResult, CloudFrontResponse, CloudFrontResponseEvent,
};
pub use cloudwatch_logs::{CloudWatchLogsDecodedData, CloudWatchLogsEvent, CloudWatchLogsLogEvent};
pub use cognito::{ChallengeName, CognitoUserPoolEvent, TriggerSource};
pub use kinesis::{KinesisStreamEvent, KinesisStreamRecord};
pub use s3::{S3CreateEvent, S3EventRecord};
pub use sns::{SNSEvent, SNSEventRecord, SNSMessage};
