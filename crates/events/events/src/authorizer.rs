//! API Gateway custom authorizer event and its policy response.
//!
//! See <https://docs.aws.amazon.com/apigateway/latest/developerguide/api-gateway-lambda-authorizer-output.html>.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::error::{EventError, EventResult};

/// The IAM policy language version API Gateway expects.
pub const POLICY_VERSION: &str = "2012-10-17";

/// Token-based authorizer input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomAuthorizerEvent {
    /// Always `TOKEN` for token authorizers.
    #[serde(rename = "type")]
    pub type_: String,
    pub authorization_token: String,
    pub method_arn: String,
}

impl CustomAuthorizerEvent {
    /// Parses `methodArn` into its components.
    pub fn parsed_method_arn(&self) -> EventResult<MethodArn> {
        self.method_arn.parse()
    }
}

/// A value that the policy language accepts either alone or as a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    /// Returns the values as a slice regardless of representation.
    pub fn as_slice(&self) -> &[T] {
        match self {
            OneOrMany::One(value) => std::slice::from_ref(value),
            OneOrMany::Many(values) => values,
        }
    }
}

impl<T> From<T> for OneOrMany<T> {
    fn from(value: T) -> Self {
        OneOrMany::One(value)
    }
}

/// Statement effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Effect {
    Allow,
    Deny,
}

/// One access-control statement of a policy document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Statement {
    pub action: OneOrMany<String>,
    pub effect: Effect,
    pub resource: OneOrMany<String>,
}

impl Statement {
    /// Creates an `execute-api:Invoke` statement for one resource.
    pub fn invoke(effect: Effect, resource: impl Into<String>) -> Self {
        Self {
            action: OneOrMany::One("execute-api:Invoke".to_string()),
            effect,
            resource: OneOrMany::One(resource.into()),
        }
    }
}

/// The policy returned by an authorizer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyDocument {
    pub version: String,
    pub statement: Vec<Statement>,
}

impl PolicyDocument {
    /// Creates an empty policy with the standard version.
    pub fn new() -> Self {
        Self {
            version: POLICY_VERSION.to_string(),
            statement: Vec::new(),
        }
    }

    /// Adds an `Allow` invoke statement.
    pub fn allow(mut self, resource: impl Into<String>) -> Self {
        self.statement.push(Statement::invoke(Effect::Allow, resource));
        self
    }

    /// Adds a `Deny` invoke statement.
    pub fn deny(mut self, resource: impl Into<String>) -> Self {
        self.statement.push(Statement::invoke(Effect::Deny, resource));
        self
    }

    /// Returns the effect of the first statement covering `resource`
    /// exactly. A `Deny` anywhere wins over an `Allow`.
    pub fn effect_for(&self, resource: &str) -> Option<Effect> {
        let mut effect = None;
        for statement in &self.statement {
            if statement.resource.as_slice().iter().any(|r| r == resource) {
                if statement.effect == Effect::Deny {
                    return Some(Effect::Deny);
                }
                effect = Some(statement.effect);
            }
        }
        effect
    }
}

impl Default for PolicyDocument {
    fn default() -> Self {
        Self::new()
    }
}

/// A scalar passed from the authorizer to the backend integration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContextValue {
    String(String),
    Number(serde_json::Number),
    Bool(bool),
}

impl From<&str> for ContextValue {
    fn from(value: &str) -> Self {
        ContextValue::String(value.to_string())
    }
}

impl From<String> for ContextValue {
    fn from(value: String) -> Self {
        ContextValue::String(value)
    }
}

impl From<bool> for ContextValue {
    fn from(value: bool) -> Self {
        ContextValue::Bool(value)
    }
}

impl From<i64> for ContextValue {
    fn from(value: i64) -> Self {
        ContextValue::Number(value.into())
    }
}

/// Context map surfaced to the integration as `requestContext.authorizer`.
pub type AuthResponseContext = HashMap<String, ContextValue>;

/// Authorizer output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub principal_id: String,
    pub policy_document: PolicyDocument,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<AuthResponseContext>,
}

impl AuthResponse {
    /// Grants `principal_id` access to `resource`.
    pub fn allow(principal_id: impl Into<String>, resource: impl Into<String>) -> Self {
        Self {
            principal_id: principal_id.into(),
            policy_document: PolicyDocument::new().allow(resource),
            context: None,
        }
    }

    /// Denies `principal_id` access to `resource`.
    pub fn deny(principal_id: impl Into<String>, resource: impl Into<String>) -> Self {
        Self {
            principal_id: principal_id.into(),
            policy_document: PolicyDocument::new().deny(resource),
            context: None,
        }
    }

    /// Adds a context entry.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<ContextValue>) -> Self {
        self.context
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }
}

/// Components of an `arn:aws:execute-api` method ARN.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodArn {
    pub partition: String,
    pub region: String,
    pub account_id: String,
    pub api_id: String,
    pub stage: String,
    pub http_method: String,
    /// Resource path without the leading slash; may be empty.
    pub resource: String,
}

impl MethodArn {
    /// ARN covering every method and resource of the same API stage.
    pub fn stage_wildcard(&self) -> String {
        format!(
            "arn:{}:execute-api:{}:{}:{}/{}/*/*",
            self.partition, self.region, self.account_id, self.api_id, self.stage
        )
    }
}

impl std::str::FromStr for MethodArn {
    type Err = EventError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || EventError::InvalidMethodArn(s.to_string());

        let parts: Vec<&str> = s.splitn(6, ':').collect();
        if parts.len() != 6 || parts[0] != "arn" || parts[2] != "execute-api" {
            return Err(invalid());
        }

        let mut path = parts[5].splitn(4, '/');
        let api_id = path.next().filter(|p| !p.is_empty()).ok_or_else(invalid)?;
        let stage = path.next().filter(|p| !p.is_empty()).ok_or_else(invalid)?;
        let http_method = path.next().filter(|p| !p.is_empty()).ok_or_else(invalid)?;
        let resource = path.next().unwrap_or_default();

        Ok(Self {
            partition: parts[1].to_string(),
            region: parts[3].to_string(),
            account_id: parts[4].to_string(),
            api_id: api_id.to_string(),
            stage: stage.to_string(),
            http_method: http_method.to_string(),
            resource: resource.to_string(),
        })
    }
}

impl fmt::Display for MethodArn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "arn:{}:execute-api:{}:{}:{}/{}/{}",
            self.partition, self.region, self.account_id, self.api_id, self.stage, self.http_method
        )?;
        if self.resource.is_empty() {
            Ok(())
        } else {
            write!(f, "/{}", self.resource)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const ARN: &str = "arn:aws:execute-api:us-east-1:123456789012:abcdef123/test/GET/pets/1";

    #[test]
    fn test_policy_document_wire_names() {
        let response = AuthResponse::allow("user|a1b2", ARN).with_context("tier", "gold");
        let value = serde_json::to_value(&response).unwrap();

        assert_eq!(value["principalId"], "user|a1b2");
        assert_eq!(value["policyDocument"]["Version"], POLICY_VERSION);
        assert_eq!(value["policyDocument"]["Statement"][0]["Effect"], "Allow");
        assert_eq!(value["policyDocument"]["Statement"][0]["Action"], "execute-api:Invoke");
        assert_eq!(value["context"]["tier"], "gold");
    }

    #[test]
    fn test_statement_accepts_lists() {
        let statement: Statement = serde_json::from_value(json!({
            "Action": ["execute-api:Invoke"],
            "Effect": "Deny",
            "Resource": [ARN, "arn:aws:execute-api:us-east-1:123456789012:abcdef123/test/POST/pets"]
        }))
        .unwrap();

        assert_eq!(statement.effect, Effect::Deny);
        assert_eq!(statement.resource.as_slice().len(), 2);
    }

    #[test]
    fn test_deny_wins() {
        let policy = PolicyDocument::new().allow(ARN).deny(ARN);
        assert_eq!(policy.effect_for(ARN), Some(Effect::Deny));
        assert_eq!(policy.effect_for("arn:other"), None);
    }

    #[test]
    fn test_context_values_keep_their_type() {
        let context: AuthResponseContext = serde_json::from_value(json!({
            "name": "alice",
            "count": 3,
            "admin": true
        }))
        .unwrap();

        assert_eq!(context["name"], ContextValue::String("alice".to_string()));
        assert_eq!(context["count"], ContextValue::from(3_i64));
        assert_eq!(context["admin"], ContextValue::Bool(true));
    }

    #[test]
    fn test_method_arn_parsing() {
        let arn: MethodArn = ARN.parse().unwrap();
        assert_eq!(arn.region, "us-east-1");
        assert_eq!(arn.account_id, "123456789012");
        assert_eq!(arn.api_id, "abcdef123");
        assert_eq!(arn.stage, "test");
        assert_eq!(arn.http_method, "GET");
        assert_eq!(arn.resource, "pets/1");
        assert_eq!(arn.to_string(), ARN);
        assert_eq!(
            arn.stage_wildcard(),
            "arn:aws:execute-api:us-east-1:123456789012:abcdef123/test/*/*"
        );
    }

    #[test]
    fn test_method_arn_without_resource() {
        let text = "arn:aws:execute-api:us-east-1:123456789012:abcdef123/*/GET";
        let arn: MethodArn = text.parse().unwrap();
        assert_eq!(arn.resource, "");
        assert_eq!(arn.to_string(), text);

        let arn: MethodArn = format!("{text}/").parse().unwrap();
        assert_eq!(arn.to_string(), text);
    }

    #[test]
    fn test_method_arn_rejects_other_services() {
        assert!("arn:aws:s3:::bucket".parse::<MethodArn>().is_err());
        assert!("arn:aws:execute-api:us-east-1:1:api".parse::<MethodArn>().is_err());
    }
}
