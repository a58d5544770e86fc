//! CloudFront (Lambda@Edge) request and response events.
//!
//! See <https://docs.aws.amazon.com/AmazonCloudFront/latest/DeveloperGuide/lambda-event-structure.html>.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Request body, present only when the trigger is configured to include it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudFrontRequestEventRecordRequestBody {
    /// `read-only` or `replace`.
    pub action: String,
    pub data: String,
    /// `base64` or `text`.
    pub encoding: String,
    pub input_truncated: bool,
}

/// One header entry. CloudFront keeps the original casing in `key`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloudFrontRequestEventRecordRequestHeader {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    pub value: String,
}

/// Header map keyed by lowercased header name.
pub type CloudFrontHeaders = HashMap<String, Vec<CloudFrontRequestEventRecordRequestHeader>>;

/// The viewer or origin request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudFrontRequestEventRecordRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<CloudFrontRequestEventRecordRequestBody>,
    pub client_ip: String,
    /// CloudFront sends `querystring`; `queryString` is accepted as well.
    #[serde(rename = "querystring", alias = "queryString")]
    pub query_string: String,
    pub uri: String,
    pub method: String,
    pub headers: CloudFrontHeaders,
    /// Custom or S3 origin description (origin-facing triggers only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<Map<String, Value>>,
}

impl CloudFrontRequestEventRecordRequest {
    /// Returns the first value for a header, matching the lowercased name.
    pub fn header(&self, name: &str) -> Option<&str> {
        first_header(&self.headers, name)
    }
}

/// Distribution and trigger metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudFrontRequestEventRecordConfig {
    pub distribution_domain_name: String,
    pub distribution_id: String,
    /// `viewer-request`, `origin-request`, `origin-response` or `viewer-response`.
    pub event_type: String,
    pub request_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloudFrontRequestEventRecordDetail {
    pub config: CloudFrontRequestEventRecordConfig,
    pub request: CloudFrontRequestEventRecordRequest,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloudFrontRequestEventRecord {
    pub cf: CloudFrontRequestEventRecordDetail,
}

/// Event delivered to viewer-request and origin-request triggers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloudFrontRequestEvent {
    #[serde(rename = "Records")]
    pub records: Vec<CloudFrontRequestEventRecord>,
}

/// The response seen by a response trigger, or generated by a request trigger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudFrontResponse {
    /// HTTP status code as a string, e.g. `"200"`.
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_description: Option<String>,
    #[serde(default)]
    pub headers: CloudFrontHeaders,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_encoding: Option<String>,
}

impl CloudFrontResponse {
    /// Returns the first value for a header, matching the lowercased name.
    pub fn header(&self, name: &str) -> Option<&str> {
        first_header(&self.headers, name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloudFrontResponseEventRecordDetail {
    pub config: CloudFrontRequestEventRecordConfig,
    pub request: CloudFrontRequestEventRecordRequest,
    pub response: CloudFrontResponse,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloudFrontResponseEventRecord {
    pub cf: CloudFrontResponseEventRecordDetail,
}

/// Event delivered to origin-response and viewer-response triggers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloudFrontResponseEvent {
    #[serde(rename = "Records")]
    pub records: Vec<CloudFrontResponseEventRecord>,
}

/// What a request trigger may return: the (possibly modified) request to
/// forward, or a response to send without contacting the origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CloudFrontRequestResult {
    Request(CloudFrontRequestEventRecordRequest),
    Response(CloudFrontResponse),
}

fn first_header<'a>(headers: &'a CloudFrontHeaders, name: &str) -> Option<&'a str> {
    headers
        .get(&name.to_ascii_lowercase())
        .and_then(|entries| entries.first())
        .map(|entry| entry.value.as_str())
}
