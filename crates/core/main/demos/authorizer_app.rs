//! A token authorizer guarding a proxy handler, driven locally.
//!
//! Run with: cargo run --example authorizer_app

use lambda_types::prelude::*;
use serde_json::json;

const METHOD_ARN: &str = "arn:aws:execute-api:us-east-1:123456789012:abcdef123/prod/GET/pets/7";

fn authorizer() -> impl CustomAuthorizerHandler {
    handler_fn(
        |event: CustomAuthorizerEvent, _ctx: Context, callback: CustomAuthorizerCallback| -> Completion<AuthResponse> {
            match event.authorization_token.strip_prefix("Bearer ") {
                Some("let-me-in") => callback.succeed(
                    AuthResponse::allow("user_001", event.method_arn).with_context("plan", "pro"),
                ),
                Some(_) => callback.succeed(AuthResponse::deny("user_001", event.method_arn)),
                None => callback.fail("Unauthorized"),
            }
            Completion::Returned
        },
    )
}

fn pets() -> impl ProxyHandler {
    async_handler_fn(|event: APIGatewayProxyEvent, ctx: Context| async move {
        let id = event
            .path_parameter("id")
            .ok_or_else(|| HandlerError::new("BadRequest", "missing pet id"))?;
        tracing::info!(request_id = %ctx.aws_request_id, id, "Fetching pet");
        Ok::<_, HandlerError>(ProxyResult::json(200, &json!({ "id": id, "name": "Rex" }))?)
    })
}

#[tokio::main]
async fn main() -> Result<(), InvokeError> {
    tracing_subscriber::fmt::init();

    let function = FunctionConfig::default();
    let invoker = Invoker::new()
        .with_middleware(LoggingMiddleware::new())
        .with_middleware(DeadlineMiddleware);

    for token in ["Bearer let-me-in", "Bearer guess", "let-me-in"] {
        let event = json!({
            "type": "TOKEN",
            "authorizationToken": token,
            "methodArn": METHOD_ARN,
        });
        let report = invoker
            .invoke_json::<CustomAuthorizerEvent, AuthResponse, _>(&authorizer(), event, function.context())
            .await?;
        println!("{token:>18} -> {:?}", report.outcome);
    }

    let event = json!({
        "body": null,
        "resource": "/pets/{id}",
        "path": "/pets/7",
        "httpMethod": "GET",
        "headers": null,
        "queryStringParameters": null,
        "pathParameters": { "id": "7" },
        "stageVariables": null,
        "requestContext": {
            "accountId": "123456789012",
            "apiId": "abcdef123",
            "httpMethod": "GET",
            "stage": "prod",
            "requestId": "c6af9ac6-7b61-11e6-9a41-93e8deadbeef",
            "resourceId": "123456",
            "resourcePath": "/pets/{id}",
            "identity": { "sourceIp": "127.0.0.1" }
        }
    });
    let report = invoker
        .invoke_json::<APIGatewayProxyEvent, ProxyResult, _>(&pets(), event, function.context())
        .await?;
    println!("Proxy outcome ({:?}): {:?}", report.source, report.outcome);

    Ok(())
}
