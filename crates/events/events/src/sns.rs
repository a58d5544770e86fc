//! SNS notification event.
//!
//! See <https://docs.aws.amazon.com/lambda/latest/dg/with-sns.html>.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SNSMessageAttribute {
    /// `String`, `String.Array`, `Number` or `Binary`.
    #[serde(rename = "Type")]
    pub type_: String,
    pub value: String,
}

pub type SNSMessageAttributes = HashMap<String, SNSMessageAttribute>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SNSMessage {
    pub signature_version: String,
    pub timestamp: String,
    pub signature: String,
    pub signing_cert_url: String,
    pub message_id: String,
    pub message: String,
    #[serde(default)]
    pub message_attributes: SNSMessageAttributes,
    #[serde(rename = "Type")]
    pub type_: String,
    pub unsubscribe_url: String,
    pub topic_arn: String,
    /// `null` when the publisher did not set a subject.
    pub subject: Option<String>,
}

impl SNSMessage {
    /// Parses `Timestamp` (RFC 3339).
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.timestamp)
            .ok()
            .map(|t| t.with_timezone(&Utc))
    }

    /// Returns a message attribute value by name.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.message_attributes.get(name).map(|a| a.value.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SNSEventRecord {
    pub event_version: String,
    pub event_subscription_arn: String,
    /// Always `aws:sns`.
    pub event_source: String,
    pub sns: SNSMessage,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SNSEvent {
    #[serde(rename = "Records")]
    pub records: Vec<SNSEventRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn message() -> serde_json::Value {
        json!({
            "SignatureVersion": "1",
            "Timestamp": "2019-01-02T12:45:07.000Z",
            "Signature": "tcc6faL2yUC6dgZdmrwh1Y4cGa/ebXEkAi6RibDsvpi+tE/1+82j...65r==",
            "SigningCertUrl": "https://sns.us-east-1.amazonaws.com/SimpleNotificationService-ac565b8b1a6c5d002d285f9598aa1d9b.pem",
            "MessageId": "95df01b4-ee98-5cb9-9903-4c221d41eb5e",
            "Message": "Hello from SNS!",
            "MessageAttributes": {
                "Test": { "Type": "String", "Value": "TestString" }
            },
            "Type": "Notification",
            "UnsubscribeUrl": "https://sns.us-east-1.amazonaws.com/?Action=Unsubscribe",
            "TopicArn": "arn:aws:sns:us-east-1:123456789012:sns-lambda",
            "Subject": null
        })
    }

    #[test]
    fn test_message_accessors() {
        let msg: SNSMessage = serde_json::from_value(message()).unwrap();
        assert_eq!(msg.attribute("Test"), Some("TestString"));
        assert!(msg.subject.is_none());
        assert_eq!(
            msg.timestamp().map(|t| t.timestamp()),
            Some(1_546_433_107)
        );
    }

    #[test]
    fn test_null_subject_is_kept_on_encode() {
        let msg: SNSMessage = serde_json::from_value(message()).unwrap();
        let value = serde_json::to_value(&msg).unwrap();
        assert!(value["Subject"].is_null());
        assert_eq!(value, message());
    }
}
