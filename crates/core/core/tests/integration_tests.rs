//! Integration tests for Lambda Types Core
//!
//! This test suite covers:
//! - Proxy and custom authorizer handlers driven from JSON events
//! - Callback-style and deferred handlers
//! - Middleware rejection
//! - Context construction

use lambda_types_core::events::cloudformation::{CloudFormationCustomResourceEvent, CustomResourceResponse};
use lambda_types_core::events::{
    APIGatewayProxyEvent, AuthResponse, CustomAuthorizerEvent, Effect, EventSource, ProxyResult,
};
use lambda_types_core::*;
use serde_json::{Value, json};
use std::sync::Arc;

fn proxy_event() -> Value {
    json!({
        "body": null,
        "resource": "/pets/{id}",
        "path": "/pets/7",
        "httpMethod": "GET",
        "headers": { "Accept": "application/json" },
        "queryStringParameters": null,
        "pathParameters": { "id": "7" },
        "stageVariables": null,
        "requestContext": {
            "accountId": "123456789012",
            "apiId": "1234567890",
            "httpMethod": "GET",
            "stage": "prod",
            "requestId": "c6af9ac6-7b61-11e6-9a41-93e8deadbeef",
            "resourceId": "123456",
            "resourcePath": "/pets/{id}",
            "identity": { "sourceIp": "127.0.0.1", "user": null }
        }
    })
}

fn context() -> Context {
    Context::builder("integration").build()
}

mod proxy_tests {
    use super::*;

    struct PetHandler;

    #[async_trait::async_trait]
    impl AsyncHandler<APIGatewayProxyEvent, ProxyResult> for PetHandler {
        async fn call(&self, event: APIGatewayProxyEvent, _context: Context) -> HandlerResult<ProxyResult> {
            let id = event
                .path_parameter("id")
                .ok_or_else(|| HandlerError::new("BadRequest", "missing id"))?;
            Ok(ProxyResult::json(200, &json!({ "id": id }))?)
        }
    }

    fn serve<H: ProxyHandler>(handler: H) -> H {
        handler
    }

    #[tokio::test]
    async fn test_proxy_handler_from_json() {
        let handler = serve(deferred(PetHandler));

        let report = Invoker::new()
            .invoke_json::<APIGatewayProxyEvent, ProxyResult, _>(&handler, proxy_event(), context())
            .await
            .unwrap();

        assert_eq!(report.source, Some(EventSource::ApiGateway));
        match report.outcome {
            Outcome::Deferred(Ok(result)) => {
                assert_eq!(result["statusCode"], 200);
                assert_eq!(result["body"], r#"{"id":"7"}"#);
                assert_eq!(result["headers"]["Content-Type"], "application/json");
                assert!(result.get("multiValueHeaders").is_none());
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_proxy_callback_style() {
        let handler = handler_fn(|event: APIGatewayProxyEvent, _ctx: Context, cb: ProxyCallback| -> Completion<ProxyResult> {
            let accept = event.headers.get_first("accept").cloned().unwrap_or_default();
            cb.succeed(ProxyResult::ok(accept));
            Completion::Returned
        });

        let report: InvocationReport<ProxyResult> = Invoker::new()
            .invoke_value(&handler, proxy_event(), context())
            .await
            .unwrap();

        assert_eq!(report.outcome, Outcome::Callback(Ok(Some(ProxyResult::ok("application/json")))));
    }
}

mod authorizer_tests {
    use super::*;

    fn authorizer() -> impl CustomAuthorizerHandler {
        handler_fn(|event: CustomAuthorizerEvent, _ctx: Context, cb: CustomAuthorizerCallback| -> Completion<AuthResponse> {
            match event.authorization_token.as_str() {
                "allow" => cb.succeed(
                    AuthResponse::allow("user", event.method_arn.clone()).with_context("tier", "gold"),
                ),
                "deny" => cb.succeed(AuthResponse::deny("user", event.method_arn.clone())),
                _ => cb.fail(HandlerError::message("Unauthorized")),
            }
            Completion::Returned
        })
    }

    fn event(token: &str) -> Value {
        json!({
            "type": "TOKEN",
            "authorizationToken": token,
            "methodArn": "arn:aws:execute-api:us-east-1:123456789012:abcdef123/test/GET/pets"
        })
    }

    #[tokio::test]
    async fn test_allow_and_deny() {
        let handler = authorizer();
        let invoker = Invoker::new();
        let arn = "arn:aws:execute-api:us-east-1:123456789012:abcdef123/test/GET/pets";

        let report = invoker
            .invoke_value::<CustomAuthorizerEvent, AuthResponse, _>(&handler, event("allow"), context())
            .await
            .unwrap();
        let Outcome::Callback(Ok(Some(response))) = report.outcome else {
            panic!("expected a callback result");
        };
        assert_eq!(response.policy_document.effect_for(arn), Some(Effect::Allow));

        let report = invoker
            .invoke_value::<CustomAuthorizerEvent, AuthResponse, _>(&handler, event("deny"), context())
            .await
            .unwrap();
        let Outcome::Callback(Ok(Some(response))) = report.outcome else {
            panic!("expected a callback result");
        };
        assert_eq!(response.policy_document.effect_for(arn), Some(Effect::Deny));
    }

    #[tokio::test]
    async fn test_unauthorized_error_wire_form() {
        let report = Invoker::new()
            .invoke_json::<CustomAuthorizerEvent, AuthResponse, _>(&authorizer(), event("garbage"), context())
            .await
            .unwrap();

        let Outcome::Callback(Err(error)) = report.outcome else {
            panic!("expected a callback error");
        };
        assert_eq!(
            serde_json::to_value(&error).unwrap(),
            json!({ "errorType": "Error", "errorMessage": "Unauthorized" })
        );
    }
}

mod custom_resource_tests {
    use super::*;

    fn create_event() -> Value {
        json!({
            "RequestType": "Create",
            "ServiceToken": "arn:aws:lambda:us-east-1:123456789012:function:provider",
            "ResponseURL": "https://example.com/response",
            "StackId": "arn:aws:cloudformation:us-east-1:123456789012:stack/demo/guid",
            "RequestId": "req-1",
            "LogicalResourceId": "Bucket",
            "ResourceType": "Custom::Bucket",
            "ResourceProperties": {
                "ServiceToken": "arn:aws:lambda:us-east-1:123456789012:function:provider",
                "Name": "demo"
            }
        })
    }

    #[tokio::test]
    async fn test_provider_answers_with_correlated_response() {
        let handler = async_handler_fn(|event: CloudFormationCustomResourceEvent, _ctx: Context| async move {
            let name = event
                .common()
                .resource_properties
                .get("Name")
                .and_then(Value::as_str)
                .ok_or_else(|| HandlerError::message("Name is required"))?
                .to_string();
            Ok::<_, HandlerError>(CustomResourceResponse::success_for(&event, name))
        });

        let report = Invoker::new()
            .invoke_json::<CloudFormationCustomResourceEvent, CustomResourceResponse, _>(&handler, create_event(), context())
            .await
            .unwrap();

        assert_eq!(report.source, Some(EventSource::CloudFormation));
        let Outcome::Deferred(Ok(response)) = report.outcome else {
            panic!("expected a deferred result");
        };
        assert_eq!(response["Status"], "SUCCESS");
        assert_eq!(response["PhysicalResourceId"], "demo");
        assert_eq!(response["RequestId"], "req-1");
    }
}

mod middleware_tests {
    use super::*;

    #[tokio::test]
    async fn test_strict_source_filter_rejects_unknown_payloads() {
        let handler = async_handler_fn(|event: Value, _ctx: Context| async move {
            Ok::<_, HandlerError>(event)
        });
        let invoker = Invoker::new()
            .with_middleware(LoggingMiddleware::new())
            .with_middleware(SourceFilterMiddleware::strict());

        let result = invoker
            .invoke_json::<Value, Value, _>(&handler, json!({ "hello": "world" }), context())
            .await;
        assert!(matches!(result, Err(InvokeError::Rejected { .. })));

        let report = invoker
            .invoke_json::<Value, Value, _>(&handler, proxy_event(), context())
            .await
            .unwrap();
        assert_eq!(report.outcome.kind(), CompletionKind::Deferred);
    }

    #[tokio::test]
    async fn test_shared_handler() {
        let handler: Arc<dyn Handler<Value, Value>> =
            Arc::new(async_handler_fn(|_event: Value, ctx: Context| async move {
                Ok::<_, HandlerError>(Value::from(ctx.function_name))
            }));

        let report = Invoker::new()
            .invoke(&handler, Value::Null, Context::builder("shared").build())
            .await
            .unwrap();
        assert_eq!(report.outcome, Outcome::Deferred(Ok(Value::from("shared"))));
    }
}

mod context_tests {
    use super::*;

    #[test]
    fn test_context_with_client_context() {
        let client_context: ClientContext = serde_json::from_value(json!({
            "client": {
                "installationId": "install-1",
                "appTitle": "Demo",
                "appVersionName": "1.0",
                "appVersionCode": "1",
                "appPackageName": "com.example.demo"
            },
            "Custom": { "theme": "dark" },
            "env": {
                "platformVersion": "14",
                "platform": "Android",
                "make": "Google",
                "model": "Pixel",
                "locale": "en_US"
            }
        }))
        .unwrap();

        let context = Context::builder("mobile")
            .client_context(client_context)
            .identity(CognitoIdentity {
                cognito_identity_id: "us-east-1:abc".to_string(),
                cognito_identity_pool_id: "us-east-1:pool".to_string(),
            })
            .build();

        let value = serde_json::to_value(&context).unwrap();
        assert_eq!(value["clientContext"]["Custom"]["theme"], "dark");
        assert_eq!(value["identity"]["cognitoIdentityId"], "us-east-1:abc");
        assert_eq!(serde_json::from_value::<Context>(value).unwrap(), context);
    }
}
