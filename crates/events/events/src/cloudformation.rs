//! CloudFormation custom resource request and response.
//!
//! Requests are tagged on `RequestType` and responses on `Status`, so fields
//! that only exist for one variant can only be reached through that variant.
//!
//! See <https://docs.aws.amazon.com/AWSCloudFormation/latest/UserGuide/crpg-ref.html>.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Resource properties from the template. `ServiceToken` is always present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResourceProperties {
    pub service_token: String,
    #[serde(flatten)]
    pub properties: Map<String, Value>,
}

impl ResourceProperties {
    /// Returns a template property by name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }
}

/// Fields shared by every request type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CustomResourceRequestCommon {
    pub service_token: String,
    #[serde(rename = "ResponseURL")]
    pub response_url: String,
    pub stack_id: String,
    pub request_id: String,
    pub logical_resource_id: String,
    pub resource_type: String,
    pub resource_properties: ResourceProperties,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateRequest {
    #[serde(flatten)]
    pub common: CustomResourceRequestCommon,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UpdateRequest {
    #[serde(flatten)]
    pub common: CustomResourceRequestCommon,
    pub physical_resource_id: String,
    pub old_resource_properties: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DeleteRequest {
    #[serde(flatten)]
    pub common: CustomResourceRequestCommon,
    pub physical_resource_id: String,
}

/// A custom resource lifecycle request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "RequestType")]
pub enum CloudFormationCustomResourceEvent {
    Create(CreateRequest),
    Update(UpdateRequest),
    Delete(DeleteRequest),
}

impl CloudFormationCustomResourceEvent {
    pub fn common(&self) -> &CustomResourceRequestCommon {
        match self {
            Self::Create(request) => &request.common,
            Self::Update(request) => &request.common,
            Self::Delete(request) => &request.common,
        }
    }

    /// The wire value of `RequestType`.
    pub fn request_type(&self) -> &'static str {
        match self {
            Self::Create(_) => "Create",
            Self::Update(_) => "Update",
            Self::Delete(_) => "Delete",
        }
    }

    /// The physical id CloudFormation already knows, if any. `Create`
    /// requests have none.
    pub fn physical_resource_id(&self) -> Option<&str> {
        match self {
            Self::Create(_) => None,
            Self::Update(request) => Some(&request.physical_resource_id),
            Self::Delete(request) => Some(&request.physical_resource_id),
        }
    }
}

/// Fields shared by both response statuses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CustomResourceResponseCommon {
    pub physical_resource_id: String,
    pub stack_id: String,
    pub request_id: String,
    pub logical_resource_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub no_echo: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Map<String, Value>>,
}

impl CustomResourceResponseCommon {
    fn for_request(event: &CloudFormationCustomResourceEvent, physical_resource_id: String) -> Self {
        let common = event.common();
        Self {
            physical_resource_id,
            stack_id: common.stack_id.clone(),
            request_id: common.request_id.clone(),
            logical_resource_id: common.logical_resource_id.clone(),
            no_echo: None,
            data: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SuccessResponse {
    #[serde(flatten)]
    pub common: CustomResourceResponseCommon,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FailedResponse {
    #[serde(flatten)]
    pub common: CustomResourceResponseCommon,
    pub reason: String,
}

/// The document uploaded to the request's `ResponseURL`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "Status")]
pub enum CustomResourceResponse {
    #[serde(rename = "SUCCESS")]
    Success(SuccessResponse),
    #[serde(rename = "FAILED")]
    Failed(FailedResponse),
}

impl CustomResourceResponse {
    /// Builds a `SUCCESS` response correlated with `event`.
    pub fn success_for(
        event: &CloudFormationCustomResourceEvent,
        physical_resource_id: impl Into<String>,
    ) -> Self {
        Self::Success(SuccessResponse {
            common: CustomResourceResponseCommon::for_request(event, physical_resource_id.into()),
            reason: None,
        })
    }

    /// Builds a `FAILED` response correlated with `event`.
    pub fn failed_for(
        event: &CloudFormationCustomResourceEvent,
        physical_resource_id: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Failed(FailedResponse {
            common: CustomResourceResponseCommon::for_request(event, physical_resource_id.into()),
            reason: reason.into(),
        })
    }

    /// Attaches output attributes readable with `Fn::GetAtt`.
    pub fn with_data(mut self, data: Map<String, Value>) -> Self {
        self.common_mut().data = Some(data);
        self
    }

    pub fn common(&self) -> &CustomResourceResponseCommon {
        match self {
            Self::Success(response) => &response.common,
            Self::Failed(response) => &response.common,
        }
    }

    fn common_mut(&mut self) -> &mut CustomResourceResponseCommon {
        match self {
            Self::Success(response) => &mut response.common,
            Self::Failed(response) => &mut response.common,
        }
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Success(response) => response.reason.as_deref(),
            Self::Failed(response) => Some(&response.reason),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}
