//! API Gateway proxy integration event and result.
//!
//! See <https://docs.aws.amazon.com/apigateway/latest/developerguide/set-up-lambda-proxy-integrations.html>.

use base64::Engine;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use crate::authorizer::AuthResponseContext;
use crate::error::{EventError, EventResult};
use crate::headers::Headers;
use crate::nullable::Nullable;

/// Caller identity attached to the request.
///
/// Every field except `sourceIp` is sent as a key that may hold `null`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct APIGatewayRequestIdentity {
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub access_key: Nullable<String>,
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub account_id: Nullable<String>,
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub api_key: Nullable<String>,
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub caller: Nullable<String>,
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub cognito_authentication_provider: Nullable<String>,
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub cognito_authentication_type: Nullable<String>,
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub cognito_identity_id: Nullable<String>,
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub cognito_identity_pool_id: Nullable<String>,
    /// Present on mutual-TLS custom domains.
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub client_cert: Nullable<APIGatewayClientCert>,
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub principal_org_id: Nullable<String>,
    pub source_ip: String,
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub user: Nullable<String>,
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub user_agent: Nullable<String>,
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub user_arn: Nullable<String>,
}

/// Client certificate presented over mutual TLS.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct APIGatewayClientCert {
    pub client_cert_pem: String,
    #[serde(rename = "subjectDN")]
    pub subject_dn: String,
    #[serde(rename = "issuerDN")]
    pub issuer_dn: String,
    pub serial_number: String,
    pub validity: APIGatewayCertValidity,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct APIGatewayCertValidity {
    pub not_before: String,
    pub not_after: String,
}

/// Request metadata added by API Gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct APIGatewayRequestContext {
    pub account_id: String,
    pub api_id: String,
    /// Output of a custom authorizer, or whatever the authorizer type emits.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorizer: Option<Value>,
    pub http_method: String,
    pub identity: APIGatewayRequestIdentity,
    pub stage: String,
    pub request_id: String,
    pub resource_id: String,
    pub resource_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain_prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extended_request_id: Option<String>,
    /// Request path including the stage, as the client sent it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    /// CLF-formatted request time, e.g. `09/Apr/2015:12:34:56 +0000`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_time: Option<String>,
    /// Request time in epoch milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_time_epoch: Option<i64>,
}

impl APIGatewayRequestContext {
    /// Reads `authorizer` as the context map a custom authorizer returns.
    ///
    /// Returns `None` when there is no authorizer output or it is not a
    /// flat map of scalars.
    pub fn authorizer_context(&self) -> Option<AuthResponseContext> {
        self.authorizer
            .as_ref()
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }
}

/// The event passed to a proxy integration.
///
/// `T` is the body type; the platform always sends a string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct APIGatewayEvent<T = String> {
    pub body: Option<T>,
    #[serde(flatten)]
    pub headers: Headers<String>,
    pub http_method: String,
    #[serde(default)]
    pub is_base64_encoded: bool,
    pub path: String,
    pub path_parameters: Option<HashMap<String, String>>,
    pub query_string_parameters: Option<HashMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multi_value_query_string_parameters: Option<HashMap<String, Vec<String>>>,
    pub stage_variables: Option<HashMap<String, String>>,
    pub request_context: APIGatewayRequestContext,
    pub resource: String,
}

/// The event type a proxy handler receives.
pub type APIGatewayProxyEvent = APIGatewayEvent<String>;

impl<T> APIGatewayEvent<T> {
    /// Returns a path parameter by name.
    pub fn path_parameter(&self, name: &str) -> Option<&str> {
        self.path_parameters
            .as_ref()
            .and_then(|params| params.get(name))
            .map(String::as_str)
    }

    /// Returns a query string parameter by name.
    pub fn query_parameter(&self, name: &str) -> Option<&str> {
        self.query_string_parameters
            .as_ref()
            .and_then(|params| params.get(name))
            .map(String::as_str)
    }

    /// Returns a stage variable by name.
    pub fn stage_variable(&self, name: &str) -> Option<&str> {
        self.stage_variables
            .as_ref()
            .and_then(|vars| vars.get(name))
            .map(String::as_str)
    }
}

impl APIGatewayEvent<String> {
    /// Returns the raw body bytes, decoding base64 when the platform flagged it.
    pub fn body_bytes(&self) -> EventResult<Vec<u8>> {
        match &self.body {
            None => Ok(Vec::new()),
            Some(body) if self.is_base64_encoded => {
                Ok(base64::engine::general_purpose::STANDARD.decode(body)?)
            }
            Some(body) => Ok(body.clone().into_bytes()),
        }
    }

    /// Decodes the body as JSON.
    pub fn json_body<B: DeserializeOwned>(&self) -> EventResult<Option<B>> {
        if self.body.is_none() {
            return Ok(None);
        }
        let bytes = self.body_bytes()?;
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    /// Re-types the body by decoding it as JSON.
    pub fn with_json_body<B: DeserializeOwned>(self) -> EventResult<APIGatewayEvent<B>> {
        let body = self.json_body()?;
        Ok(APIGatewayEvent {
            body,
            headers: self.headers,
            http_method: self.http_method,
            is_base64_encoded: false,
            path: self.path,
            path_parameters: self.path_parameters,
            query_string_parameters: self.query_string_parameters,
            multi_value_query_string_parameters: self.multi_value_query_string_parameters,
            stage_variables: self.stage_variables,
            request_context: self.request_context,
            resource: self.resource,
        })
    }
}

/// A response header value. The platform stringifies it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HeaderValue {
    Bool(bool),
    Number(serde_json::Number),
    String(String),
}

impl From<&str> for HeaderValue {
    fn from(value: &str) -> Self {
        HeaderValue::String(value.to_string())
    }
}

impl From<String> for HeaderValue {
    fn from(value: String) -> Self {
        HeaderValue::String(value)
    }
}

impl From<bool> for HeaderValue {
    fn from(value: bool) -> Self {
        HeaderValue::Bool(value)
    }
}

impl From<i64> for HeaderValue {
    fn from(value: i64) -> Self {
        HeaderValue::Number(value.into())
    }
}

/// The result a proxy handler returns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyResult {
    pub status_code: u16,
    #[serde(flatten)]
    pub headers: Headers<HeaderValue>,
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_base64_encoded: Option<bool>,
}

impl ProxyResult {
    /// Creates a result with no headers.
    pub fn new(status_code: u16, body: impl Into<String>) -> Self {
        Self {
            status_code,
            headers: Headers::empty(),
            body: body.into(),
            is_base64_encoded: None,
        }
    }

    /// Creates a `200` result.
    pub fn ok(body: impl Into<String>) -> Self {
        Self::new(200, body)
    }

    /// Creates a result with a JSON body and `Content-Type` header.
    pub fn json<B: Serialize>(status_code: u16, body: &B) -> EventResult<Self> {
        let body = serde_json::to_string(body)?;
        Ok(Self::new(status_code, body).with_header("Content-Type", "application/json"))
    }

    /// Creates a result whose body is base64-encoded binary data.
    pub fn binary(status_code: u16, bytes: &[u8]) -> Self {
        let mut result = Self::new(
            status_code,
            base64::engine::general_purpose::STANDARD.encode(bytes),
        );
        result.is_base64_encoded = Some(true);
        result
    }

    /// Adds a single-value header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<HeaderValue>) -> Self {
        let (single, multi) = std::mem::take(&mut self.headers).into_parts();
        let mut single = single.into_option().unwrap_or_default();
        single.insert(name.into(), value.into());
        self.headers = Headers::from_parts(Nullable::Present(single), multi);
        self
    }

    /// Adds one value to a multi-value header.
    pub fn with_multi_value_header(
        mut self,
        name: impl Into<String>,
        value: impl Into<HeaderValue>,
    ) -> Self {
        let (single, multi) = std::mem::take(&mut self.headers).into_parts();
        let mut multi = multi.into_option().unwrap_or_default();
        multi.entry(name.into()).or_default().push(value.into());
        self.headers = Headers::from_parts(single, Nullable::Present(multi));
        self
    }
}

impl TryFrom<Value> for ProxyResult {
    type Error = EventError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Ok(serde_json::from_value(value)?)
    }
}
