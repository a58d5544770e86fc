//! Kinesis stream event.
//!
//! See <https://docs.aws.amazon.com/lambda/latest/dg/with-kinesis.html>.

use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::EventResult;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KinesisStreamRecordPayload {
    /// Seconds since the epoch, with millisecond fraction.
    pub approximate_arrival_timestamp: f64,
    /// Base64 of the record blob.
    pub data: String,
    pub kinesis_schema_version: String,
    pub partition_key: String,
    pub sequence_number: String,
}

impl KinesisStreamRecordPayload {
    pub fn decode_data(&self) -> EventResult<Vec<u8>> {
        Ok(base64::engine::general_purpose::STANDARD.decode(&self.data)?)
    }

    pub fn arrival_time(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis((self.approximate_arrival_timestamp * 1000.0).round() as i64)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KinesisStreamRecord {
    pub aws_region: String,
    #[serde(rename = "eventID")]
    pub event_id: String,
    pub event_name: String,
    /// Always `aws:kinesis`.
    pub event_source: String,
    #[serde(rename = "eventSourceARN")]
    pub event_source_arn: String,
    pub event_version: String,
    pub invoke_identity_arn: String,
    pub kinesis: KinesisStreamRecordPayload,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KinesisStreamEvent {
    #[serde(rename = "Records")]
    pub records: Vec<KinesisStreamRecord>,
}
