//! CloudWatch Logs subscription event.
//!
//! The log batch arrives as `awslogs.data`: gzip-compressed JSON, base64
//! encoded. [`CloudWatchLogsEventData::decode`] unpacks it.
//!
//! See <https://docs.aws.amazon.com/AmazonCloudWatch/latest/logs/SubscriptionFilters.html#LambdaFunctionExample>.

use base64::Engine;
use chrono::{DateTime, Utc};
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::{Read, Write};
use tracing::debug;

use crate::error::{EventError, EventResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloudWatchLogsEvent {
    pub awslogs: CloudWatchLogsEventData,
}

impl CloudWatchLogsEvent {
    /// Decodes the wrapped log batch.
    pub fn decode(&self) -> EventResult<CloudWatchLogsDecodedData> {
        self.awslogs.decode()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloudWatchLogsEventData {
    /// Base64 of the gzip-compressed JSON batch.
    pub data: String,
}

impl CloudWatchLogsEventData {
    pub fn decode(&self) -> EventResult<CloudWatchLogsDecodedData> {
        let compressed = base64::engine::general_purpose::STANDARD.decode(&self.data)?;

        let mut decoder = GzDecoder::new(compressed.as_slice());
        let mut json = Vec::new();
        decoder.read_to_end(&mut json)?;
        debug!(
            compressed = compressed.len(),
            decompressed = json.len(),
            "Decoded CloudWatch Logs payload"
        );

        Ok(serde_json::from_slice(&json)?)
    }

    /// Packs a batch the way CloudWatch Logs delivers it.
    pub fn encode(decoded: &CloudWatchLogsDecodedData) -> EventResult<Self> {
        let json = serde_json::to_vec(decoded)?;

        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&json)?;
        let compressed = encoder.finish()?;

        Ok(Self {
            data: base64::engine::general_purpose::STANDARD.encode(compressed),
        })
    }
}

impl TryFrom<&CloudWatchLogsDecodedData> for CloudWatchLogsEvent {
    type Error = EventError;

    fn try_from(decoded: &CloudWatchLogsDecodedData) -> Result<Self, Self::Error> {
        Ok(Self {
            awslogs: CloudWatchLogsEventData::encode(decoded)?,
        })
    }
}

/// The unpacked log batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudWatchLogsDecodedData {
    pub owner: String,
    pub log_group: String,
    pub log_stream: String,
    pub subscription_filters: Vec<String>,
    /// `DATA_MESSAGE`, or `CONTROL_MESSAGE` for reachability checks.
    pub message_type: String,
    pub log_events: Vec<CloudWatchLogsLogEvent>,
}

impl CloudWatchLogsDecodedData {
    /// Control messages carry no application logs.
    pub fn is_control_message(&self) -> bool {
        self.message_type == "CONTROL_MESSAGE"
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudWatchLogsLogEvent {
    pub id: String,
    /// Milliseconds since the epoch.
    pub timestamp: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extracted_fields: Option<HashMap<String, String>>,
}

impl CloudWatchLogsLogEvent {
    pub fn time(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.timestamp)
    }
}
