//! AWS Lambda handler for calculator requests
//!
//! Accepts a calculator request as the JSON body of an API Gateway HTTP API
//! (or Function URL) event and returns the result as JSON. Invalid JSON and
//! calculation errors return 400 with the error messages.
//!
//! Set `TAX_TABLE_DIR` to layer CSV tax tables over the built-in years.

use std::path::Path;

use aws_lambda_events::apigw::{ApiGatewayV2httpRequest, ApiGatewayV2httpResponse};
use aws_lambda_events::encodings::Body;
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use serde::Serialize;

use finance_calculators::tax::{load_tax_tables, TaxTables};
use finance_calculators::{CalcError, CalculatorRequest, CalculatorResponse};

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    messages: Vec<String>,
}

#[derive(Debug, Serialize)]
struct SuccessBody<'a> {
    #[serde(flatten)]
    response: &'a CalculatorResponse,
    elapsed_ms: f64,
}

fn response(status: i64, body: Option<String>) -> ApiGatewayV2httpResponse {
    let mut response = ApiGatewayV2httpResponse {
        status_code: status,
        body: body.map(Body::Text),
        ..Default::default()
    };
    let headers = [
        ("content-type", "application/json"),
        ("access-control-allow-origin", "*"),
        ("access-control-allow-methods", "POST, OPTIONS"),
        ("access-control-allow-headers", "Content-Type"),
    ];
    for (name, value) in headers {
        if let Ok(value) = value.parse() {
            response.headers.insert(name, value);
        }
    }
    response
}

fn error_response(status: i64, error: &str, messages: Vec<String>) -> ApiGatewayV2httpResponse {
    let body = ErrorBody { error: error.to_string(), messages };
    let text = serde_json::to_string(&body).unwrap_or_else(|_| r#"{"error":"internal error"}"#.to_string());
    response(status, Some(text))
}

fn calc_error_response(err: &CalcError) -> ApiGatewayV2httpResponse {
    let kind = match err {
        CalcError::InvalidInput(_) => "invalid input",
        CalcError::InsufficientInput(_) => "insufficient input",
        CalcError::Domain(_) => "domain error",
        CalcError::NonConvergence { .. } => "no solution",
        CalcError::UnknownFrequency(_) => "unknown frequency",
        CalcError::UnsupportedTaxYear(_) => "unsupported tax year",
    };
    error_response(400, kind, err.messages())
}

/// Lambda handler function
async fn handler(
    tables: &TaxTables,
    event: LambdaEvent<ApiGatewayV2httpRequest>,
) -> Result<ApiGatewayV2httpResponse, Error> {
    let start = std::time::Instant::now();
    let request = event.payload;

    // CORS preflight
    if request.request_context.http.method.as_str() == "OPTIONS" {
        return Ok(response(200, None));
    }

    if request.is_base64_encoded {
        return Ok(error_response(400, "request body must be JSON text", Vec::new()));
    }

    let body = request.body.unwrap_or_default();
    let calculator: CalculatorRequest = match serde_json::from_str(&body) {
        Ok(r) => r,
        Err(e) => return Ok(error_response(400, &format!("Invalid JSON: {}", e), Vec::new())),
    };

    let result = match calculator.evaluate(tables) {
        Ok(result) => result,
        Err(e) => {
            log::info!("{} request rejected: {}", calculator.name(), e);
            return Ok(calc_error_response(&e));
        }
    };

    let body = SuccessBody {
        response: &result,
        elapsed_ms: start.elapsed().as_secs_f64() * 1000.0,
    };
    match serde_json::to_string(&body) {
        Ok(text) => Ok(response(200, Some(text))),
        Err(e) => Ok(error_response(500, &format!("could not serialize result: {}", e), Vec::new())),
    }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();

    let tables = match std::env::var("TAX_TABLE_DIR") {
        Ok(dir) => load_tax_tables(Path::new(&dir))?,
        Err(_) => TaxTables::builtin(),
    };
    let tables = &tables;

    run(service_fn(move |event| async move { handler(tables, event).await })).await
}
