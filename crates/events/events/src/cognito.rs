//! Cognito user pool trigger event.
//!
//! One shape serves every trigger; `triggerSource` says which one fired and
//! which request/response fields are meaningful.
//!
//! See <https://docs.aws.amazon.com/cognito/latest/developerguide/cognito-user-identity-pools-working-with-aws-lambda-triggers.html>.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// The trigger that produced the event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TriggerSource {
    #[serde(rename = "PreSignUp_SignUp")]
    PreSignUpSignUp,
    #[serde(rename = "PostConfirmation_ConfirmSignUp")]
    PostConfirmationConfirmSignUp,
    #[serde(rename = "PreAuthentication_Authentication")]
    PreAuthenticationAuthentication,
    #[serde(rename = "PostAuthentication_Authentication")]
    PostAuthenticationAuthentication,
    #[serde(rename = "CustomMessage_SignUp")]
    CustomMessageSignUp,
    #[serde(rename = "CustomMessage_AdminCreateUser")]
    CustomMessageAdminCreateUser,
    #[serde(rename = "CustomMessage_ResendCode")]
    CustomMessageResendCode,
    #[serde(rename = "CustomMessage_ForgotPassword")]
    CustomMessageForgotPassword,
    #[serde(rename = "CustomMessage_UpdateUserAttribute")]
    CustomMessageUpdateUserAttribute,
    #[serde(rename = "CustomMessage_VerifyUserAttribute")]
    CustomMessageVerifyUserAttribute,
    #[serde(rename = "CustomMessage_Authentication")]
    CustomMessageAuthentication,
    #[serde(rename = "DefineAuthChallenge_Authentication")]
    DefineAuthChallengeAuthentication,
    #[serde(rename = "CreateAuthChallenge_Authentication")]
    CreateAuthChallengeAuthentication,
    #[serde(rename = "VerifyAuthChallengeResponse_Authentication")]
    VerifyAuthChallengeResponseAuthentication,
}

impl TriggerSource {
    /// Returns `true` for the custom authentication flow triggers.
    pub fn is_auth_challenge(&self) -> bool {
        matches!(
            self,
            TriggerSource::DefineAuthChallengeAuthentication
                | TriggerSource::CreateAuthChallengeAuthentication
                | TriggerSource::VerifyAuthChallengeResponseAuthentication
        )
    }

    /// Returns `true` for the `CustomMessage_*` triggers.
    pub fn is_custom_message(&self) -> bool {
        matches!(
            self,
            TriggerSource::CustomMessageSignUp
                | TriggerSource::CustomMessageAdminCreateUser
                | TriggerSource::CustomMessageResendCode
                | TriggerSource::CustomMessageForgotPassword
                | TriggerSource::CustomMessageUpdateUserAttribute
                | TriggerSource::CustomMessageVerifyUserAttribute
                | TriggerSource::CustomMessageAuthentication
        )
    }
}

/// A challenge already attempted in the current authentication session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChallengeName {
    CustomChallenge,
    PasswordVerifier,
    SmsMfa,
    DeviceSrpAuth,
    DevicePasswordVerifier,
    AdminNoSrpAuth,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeResult {
    pub challenge_name: ChallengeName,
    pub challenge_result: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub challenge_meta_data: Option<String>,
}

/// The user's answer to a custom challenge. Cognito sends a plain string;
/// older integrations sent a map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChallengeAnswer {
    Text(String),
    Map(HashMap<String, String>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallerContext {
    pub aws_sdk_version: String,
    pub client_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CognitoUserPoolRequest {
    #[serde(default)]
    pub user_attributes: HashMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_data: Option<HashMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_parameter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username_parameter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_device_used: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<Vec<ChallengeResult>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub challenge_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_challenge_parameters: Option<HashMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub challenge_answer: Option<ChallengeAnswer>,
}

/// Fields the handler fills in; which ones apply depends on the trigger.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CognitoUserPoolResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_confirm_user: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_verify_email: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_verify_phone: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sms_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_subject: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub challenge_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue_tokens: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fail_authentication: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_challenge_parameters: Option<HashMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_challenge_parameters: Option<HashMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub challenge_meta_data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer_correct: Option<bool>,
}

/// Cognito user pool trigger event. The handler returns it with `response`
/// filled in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CognitoUserPoolEvent {
    /// Cognito sends `"1"`; a bare number is accepted too.
    #[serde(deserialize_with = "string_or_number")]
    pub version: String,
    pub trigger_source: TriggerSource,
    pub region: String,
    pub user_pool_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    pub caller_context: CallerContext,
    #[serde(default)]
    pub request: CognitoUserPoolRequest,
    #[serde(default)]
    pub response: CognitoUserPoolResponse,
}

impl CognitoUserPoolEvent {
    /// Returns a user attribute by name (e.g. `email`).
    pub fn user_attribute(&self, name: &str) -> Option<&str> {
        self.request.user_attributes.get(name).map(String::as_str)
    }
}

fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number, found {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_trigger_source_names() {
        let source: TriggerSource =
            serde_json::from_value(json!("VerifyAuthChallengeResponse_Authentication")).unwrap();
        assert_eq!(source, TriggerSource::VerifyAuthChallengeResponseAuthentication);
        assert!(source.is_auth_challenge());
        assert!(!source.is_custom_message());

        let value = serde_json::to_value(TriggerSource::PreSignUpSignUp).unwrap();
        assert_eq!(value, "PreSignUp_SignUp");
    }

    #[test]
    fn test_unknown_trigger_rejected() {
        assert!(serde_json::from_value::<TriggerSource>(json!("TokenGeneration_HostedAuth")).is_err());
    }

    #[test]
    fn test_challenge_session() {
        let request: CognitoUserPoolRequest = serde_json::from_value(json!({
            "userAttributes": { "email": "jane@example.com" },
            "session": [
                { "challengeName": "PASSWORD_VERIFIER", "challengeResult": true },
                { "challengeName": "CUSTOM_CHALLENGE", "challengeResult": false, "challengeMetaData": "Q1" }
            ],
            "challengeAnswer": "42"
        }))
        .unwrap();

        let session = request.session.unwrap();
        assert_eq!(session[0].challenge_name, ChallengeName::PasswordVerifier);
        assert_eq!(session[1].challenge_meta_data.as_deref(), Some("Q1"));
        assert_eq!(request.challenge_answer, Some(ChallengeAnswer::Text("42".to_string())));
    }

    #[test]
    fn test_numeric_version_accepted() {
        let event: CognitoUserPoolEvent = serde_json::from_value(json!({
            "version": 1,
            "triggerSource": "PreSignUp_SignUp",
            "region": "us-east-1",
            "userPoolId": "us-east-1_EXAMPLE",
            "callerContext": { "awsSdkVersion": "aws-sdk-unknown-unknown", "clientId": "abc" }
        }))
        .unwrap();

        assert_eq!(event.version, "1");
        assert!(event.request.user_attributes.is_empty());
        assert_eq!(event.response, CognitoUserPoolResponse::default());
    }
}
