//! Diagnostic HTTP surface in front of the dispatcher.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};

use crate::dispatch::Dispatcher;
use crate::error::AlertError;

const USAGE: &str = "aqi-sentinel diagnostic endpoints:\n\
    GET /aqi           current reading as JSON\n\
    GET /test-alert    fetch and send the alert message now\n\
    GET /test-summary  fetch and send the daily summary now\n";

pub fn router(dispatcher: Dispatcher) -> Router {
    Router::new()
        .route("/", get(usage))
        .route("/aqi", get(current_reading))
        .route("/test-alert", get(test_alert))
        .route("/test-summary", get(test_summary))
        .fallback(usage)
        .with_state(dispatcher)
}

async fn usage() -> &'static str {
    USAGE
}

async fn current_reading(State(dispatcher): State<Dispatcher>) -> Response {
    match dispatcher.current_reading().await {
        Ok(reading) => Json(reading).into_response(),
        Err(e) => failure(e),
    }
}

async fn test_alert(State(dispatcher): State<Dispatcher>) -> Response {
    match dispatcher.send_test_alert().await {
        Ok(()) => "Alert sent".into_response(),
        Err(e) => failure(e),
    }
}

async fn test_summary(State(dispatcher): State<Dispatcher>) -> Response {
    match dispatcher.send_test_summary().await {
        Ok(()) => "Summary sent".into_response(),
        Err(e) => failure(e),
    }
}

fn failure(e: AlertError) -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, format!("Error: {e}")).into_response()
}
