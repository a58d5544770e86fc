//! Registry of supported event sources for discovery.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::event::EventSource;

/// Definition of an event source for the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDefinition {
    /// The event source.
    pub source: EventSource,
    /// Rust type name of the envelope.
    pub shape: String,
    /// Human-readable description.
    pub description: String,
    /// AWS documentation for the payload.
    pub documentation: Option<String>,
    /// Whether this source is deprecated.
    pub deprecated: bool,
    /// Deprecation message if deprecated.
    pub deprecation_message: Option<String>,
}

impl SourceDefinition {
    /// Creates a new source definition.
    pub fn new(
        source: EventSource,
        shape: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            source,
            shape: shape.into(),
            description: description.into(),
            documentation: None,
            deprecated: false,
            deprecation_message: None,
        }
    }

    /// Sets the documentation URL.
    pub fn with_documentation(mut self, url: impl Into<String>) -> Self {
        self.documentation = Some(url.into());
        self
    }

    /// Marks the source as deprecated.
    pub fn deprecated(mut self, message: impl Into<String>) -> Self {
        self.deprecated = true;
        self.deprecation_message = Some(message.into());
        self
    }
}

/// Registry for source definitions, ordered by source.
#[derive(Debug, Clone, Default)]
pub struct EventRegistry {
    definitions: BTreeMap<EventSource, SourceDefinition>,
}

impl EventRegistry {
    /// Creates a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with every source of the catalog registered.
    pub fn with_standard_sources() -> Self {
        let mut registry = Self::new();

        registry.register_all([
            SourceDefinition::new(
                EventSource::CloudFrontRequest,
                "CloudFrontRequestEvent",
                "Lambda@Edge viewer or origin request",
            )
            .with_documentation("https://docs.aws.amazon.com/AmazonCloudFront/latest/DeveloperGuide/lambda-event-structure.html"),
            SourceDefinition::new(
                EventSource::CloudFrontResponse,
                "CloudFrontResponseEvent",
                "Lambda@Edge viewer or origin response",
            )
            .with_documentation("https://docs.aws.amazon.com/AmazonCloudFront/latest/DeveloperGuide/lambda-event-structure.html"),
            SourceDefinition::new(
                EventSource::ApiGateway,
                "APIGatewayProxyEvent",
                "API Gateway REST API proxy integration request",
            )
            .with_documentation("https://docs.aws.amazon.com/apigateway/latest/developerguide/set-up-lambda-proxy-integrations.html"),
            SourceDefinition::new(
                EventSource::CustomAuthorizer,
                "CustomAuthorizerEvent",
                "API Gateway token authorizer request",
            )
            .with_documentation("https://docs.aws.amazon.com/apigateway/latest/developerguide/api-gateway-lambda-authorizer-input.html"),
            SourceDefinition::new(EventSource::Sns, "SNSEvent", "SNS topic notification")
                .with_documentation("https://docs.aws.amazon.com/lambda/latest/dg/with-sns.html"),
            SourceDefinition::new(EventSource::S3, "S3CreateEvent", "S3 object-created notification")
                .with_documentation("https://docs.aws.amazon.com/AmazonS3/latest/userguide/notification-content-structure.html"),
            SourceDefinition::new(
                EventSource::CognitoUserPool,
                "CognitoUserPoolEvent",
                "Cognito user pool trigger",
            )
            .with_documentation("https://docs.aws.amazon.com/cognito/latest/developerguide/cognito-user-identity-pools-working-with-aws-lambda-triggers.html"),
            SourceDefinition::new(
                EventSource::CloudFormation,
                "CloudFormationCustomResourceEvent",
                "CloudFormation custom resource lifecycle request",
            )
            .with_documentation("https://docs.aws.amazon.com/AWSCloudFormation/latest/UserGuide/crpg-ref.html"),
            SourceDefinition::new(
                EventSource::CloudWatchLogs,
                "CloudWatchLogsEvent",
                "CloudWatch Logs subscription batch",
            )
            .with_documentation("https://docs.aws.amazon.com/AmazonCloudWatch/latest/logs/SubscriptionFilters.html"),
            SourceDefinition::new(EventSource::Kinesis, "KinesisStreamEvent", "Kinesis stream batch")
                .with_documentation("https://docs.aws.amazon.com/lambda/latest/dg/with-kinesis.html"),
        ]);

        registry
    }

    /// Registers a source definition, replacing any previous one.
    pub fn register(&mut self, definition: SourceDefinition) {
        if definition.deprecated {
            warn!(
                source = %definition.source,
                message = definition.deprecation_message.as_deref().unwrap_or_default(),
                "Registering deprecated event source"
            );
        }
        self.definitions.insert(definition.source, definition);
    }

    /// Registers multiple source definitions.
    pub fn register_all(&mut self, definitions: impl IntoIterator<Item = SourceDefinition>) {
        for def in definitions {
            self.register(def);
        }
    }

    /// Gets a source definition.
    pub fn get(&self, source: EventSource) -> Option<&SourceDefinition> {
        self.definitions.get(&source)
    }

    /// Checks if a source is registered.
    pub fn is_registered(&self, source: EventSource) -> bool {
        self.definitions.contains_key(&source)
    }

    /// Returns all registered definitions in source order.
    pub fn list(&self) -> impl Iterator<Item = &SourceDefinition> {
        self.definitions.values()
    }

    /// Returns deprecated source definitions.
    pub fn deprecated(&self) -> Vec<&SourceDefinition> {
        self.definitions.values().filter(|d| d.deprecated).collect()
    }

    /// Unregisters a source.
    pub fn unregister(&mut self, source: EventSource) -> Option<SourceDefinition> {
        self.definitions.remove(&source)
    }

    /// Returns the number of registered sources.
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Checks if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}
