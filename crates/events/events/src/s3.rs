//! S3 object-created notification event.
//!
//! See <https://docs.aws.amazon.com/AmazonS3/latest/userguide/notification-content-structure.html>.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{EventError, EventResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct S3UserIdentity {
    pub principal_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct S3RequestParameters {
    #[serde(rename = "sourceIPAddress")]
    pub source_ip_address: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct S3ResponseElements {
    #[serde(rename = "x-amz-request-id")]
    pub x_amz_request_id: String,
    #[serde(rename = "x-amz-id-2")]
    pub x_amz_id_2: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct S3Bucket {
    pub name: String,
    pub owner_identity: S3UserIdentity,
    pub arn: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct S3Object {
    /// URL-encoded object key.
    pub key: String,
    pub size: u64,
    #[serde(rename = "eTag")]
    pub e_tag: String,
    /// Only sent for buckets with versioning enabled.
    #[serde(rename = "versionId", default, skip_serializing_if = "Option::is_none")]
    pub version_id: Option<String>,
    pub sequencer: String,
}

impl S3Object {
    /// Returns the key with URL encoding removed (`+` is a space).
    pub fn decoded_key(&self) -> EventResult<String> {
        let spaced = self.key.replace('+', " ");
        urlencoding::decode(&spaced)
            .map(|key| key.into_owned())
            .map_err(|e| EventError::InvalidInput(format!("object key is not UTF-8: {e}")))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct S3Entity {
    pub s3_schema_version: String,
    pub configuration_id: String,
    pub bucket: S3Bucket,
    pub object: S3Object,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct S3EventRecord {
    pub event_version: String,
    /// Always `aws:s3`.
    pub event_source: String,
    pub aws_region: String,
    pub event_time: String,
    /// e.g. `ObjectCreated:Put`.
    pub event_name: String,
    pub user_identity: S3UserIdentity,
    pub request_parameters: S3RequestParameters,
    pub response_elements: S3ResponseElements,
    pub s3: S3Entity,
}

impl S3EventRecord {
    /// Parses `eventTime` (RFC 3339).
    pub fn event_time(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.event_time)
            .ok()
            .map(|t| t.with_timezone(&Utc))
    }

    /// Returns `true` for `ObjectCreated:*` notifications.
    pub fn is_object_created(&self) -> bool {
        self.event_name.starts_with("ObjectCreated:")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct S3CreateEvent {
    #[serde(rename = "Records")]
    pub records: Vec<S3EventRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn object(key: &str) -> S3Object {
        S3Object {
            key: key.to_string(),
            size: 1,
            e_tag: "d41d8cd98f00b204e9800998ecf8427e".to_string(),
            version_id: None,
            sequencer: "0A1B2C3D4E5F678901".to_string(),
        }
    }

    #[test]
    fn test_decoded_key() {
        assert_eq!(object("reports/q1+2024.csv").decoded_key().unwrap(), "reports/q1 2024.csv");
        assert_eq!(object("a%2Bb%3D.txt").decoded_key().unwrap(), "a+b=.txt");
        assert_eq!(object("plain").decoded_key().unwrap(), "plain");
    }

    #[test]
    fn test_version_id_is_omitted_when_absent() {
        let value = serde_json::to_value(object("k")).unwrap();
        assert!(value.get("versionId").is_none());
        assert_eq!(value["eTag"], "d41d8cd98f00b204e9800998ecf8427e");
    }
}
