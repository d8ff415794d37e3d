//! Sample Tool Provider
//!
//! The receiving side of the sandbox: accepts LTI 1.1 launches,
//! verifies their OAuth signature, keeps the launch data in a
//! time-bounded store, and pushes grades back to the platform over
//! Basic Outcomes.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::{
    Form, Router,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use tower_http::trace::TraceLayer;
use tracing::{Level, debug, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use lti_sandbox::core::Config;
use lti_sandbox::domains::launch::LaunchStore;
use lti_sandbox::domains::oauth;
use lti_sandbox::domains::outcomes::OutcomesClient;

/// Shared state for the tool provider.
#[derive(Clone)]
struct ToolState {
    config: Arc<Config>,
    store: Arc<LaunchStore>,
    client: OutcomesClient,
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env();
    init_logging(&config.logging.level);

    info!("Starting sample LTI tool v{}", env!("CARGO_PKG_VERSION"));

    let state = ToolState {
        store: Arc::new(LaunchStore::new(Duration::from_secs(
            config.tool.launch_ttl_secs,
        ))),
        client: OutcomesClient::new(Duration::from_secs(config.outcomes.timeout_secs))?,
        config: Arc::new(config),
    };

    spawn_store_sweeper(state.store.clone());

    let addr = state.config.tool.bind.clone();
    let app = Router::new()
        .route("/", get(index_handler))
        .route("/lti/launch", post(launch_handler))
        .route("/send-grade", post(send_grade_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Sample tool listening on {}", addr);
    info!("  → Launch endpoint: POST /lti/launch");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Periodically drop expired launches, so the store stays bounded
/// even when nothing ever reads the stale entries back.
fn spawn_store_sweeper(store: Arc<LaunchStore>) {
    tokio::spawn(async move {
        let mut tick = tokio::time::interval(Duration::from_secs(60));
        loop {
            tick.tick().await;
            let removed = store.sweep();
            if removed > 0 {
                debug!("Swept {} expired launches", removed);
            }
        }
    });
}

async fn index_handler(State(state): State<ToolState>) -> Html<String> {
    Html(format!(
        "<!DOCTYPE html><html><body>\
         <h1>Sample LTI 1.1 Tool</h1>\
         <p>This tool must be launched via LTI from a platform.</p>\
         <p>Launch endpoint: <code>POST /lti/launch</code></p>\
         <p>Consumer key: <code>{}</code></p>\
         </body></html>",
        escape(&state.config.tool.consumer_key)
    ))
}

/// Handle an inbound LTI launch.
///
/// Message type, version, and consumer key are checked first; then
/// the OAuth signature is verified against the configured launch URL
/// and a mismatch is rejected with 401 rather than waved through.
async fn launch_handler(
    State(state): State<ToolState>,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    if form.get("lti_message_type").map(String::as_str) != Some("basic-lti-launch-request") {
        return (StatusCode::BAD_REQUEST, "Invalid LTI message type").into_response();
    }
    if form.get("lti_version").map(String::as_str) != Some("LTI-1p0") {
        return (StatusCode::BAD_REQUEST, "Invalid LTI version").into_response();
    }
    if form.get("oauth_consumer_key") != Some(&state.config.tool.consumer_key) {
        warn!("Launch with unknown consumer key rejected");
        return (StatusCode::UNAUTHORIZED, "Invalid consumer key").into_response();
    }

    let params: Vec<(String, String)> = form.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
    let claimed = form.get("oauth_signature").cloned().unwrap_or_default();
    if !oauth::verify(
        "POST",
        &state.config.tool.launch_url,
        &params,
        &state.config.tool.consumer_secret,
        &claimed,
    ) {
        return (StatusCode::UNAUTHORIZED, "OAuth signature verification failed").into_response();
    }

    let user = form
        .get("lis_person_name_full")
        .map(String::as_str)
        .unwrap_or("Unknown User");
    let course = form
        .get("context_title")
        .map(String::as_str)
        .unwrap_or("Unknown Course");
    let role = form.get("roles").map(String::as_str).unwrap_or("Unknown");

    let can_send_grade = form.contains_key("lis_outcome_service_url")
        && form.contains_key("lis_result_sourcedid");

    let launch_id = state.store.put(params);
    info!("Launch accepted for {} ({}) in {}", user, role, course);

    let grade_form = if can_send_grade {
        format!(
            "<h3>Send grade</h3>\
             <form action=\"/send-grade\" method=\"post\">\
             <input type=\"hidden\" name=\"launch_id\" value=\"{launch_id}\">\
             <label>Score (0.0 - 1.0): \
             <input type=\"number\" name=\"score\" min=\"0\" max=\"1\" step=\"0.01\" value=\"0.85\"></label> \
             <button type=\"submit\">Send grade to platform</button>\
             </form>"
        )
    } else {
        "<p>This launch did not advertise an outcomes service.</p>".to_string()
    };

    Html(format!(
        "<!DOCTYPE html><html><body>\
         <h1>Sample LTI Tool</h1>\
         <p>Launched as <strong>{}</strong> ({}) in <strong>{}</strong>.</p>\
         {}\
         </body></html>",
        escape(user),
        escape(role),
        escape(course),
        grade_form
    ))
    .into_response()
}

#[derive(Debug, Deserialize)]
struct SendGradeForm {
    launch_id: String,
    score: f64,
}

/// Push a grade for a stored launch back to the platform.
async fn send_grade_handler(
    State(state): State<ToolState>,
    Form(form): Form<SendGradeForm>,
) -> Response {
    let Some(params) = state.store.get(&form.launch_id) else {
        return (StatusCode::NOT_FOUND, "Launch not found or expired").into_response();
    };

    let lookup = |name: &str| {
        params
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.clone())
    };
    let (Some(outcomes_url), Some(sourced_id)) =
        (lookup("lis_outcome_service_url"), lookup("lis_result_sourcedid"))
    else {
        return (StatusCode::BAD_REQUEST, "Launch does not support outcomes").into_response();
    };

    match state
        .client
        .push_grade(&outcomes_url, &sourced_id, form.score)
        .await
    {
        Ok(outcome) => Html(format!(
            "<!DOCTYPE html><html><body>\
             <h1>Grade sent</h1>\
             <p>Score {} accepted (message id {}).</p>\
             <pre>{}</pre>\
             </body></html>",
            form.score,
            escape(&outcome.message_id),
            escape(&outcome.raw_response)
        ))
        .into_response(),
        Err(err) => {
            warn!("Grade push failed: {}", err);
            (
                StatusCode::BAD_GATEWAY,
                format!("Failed to send grade: {err}"),
            )
                .into_response()
        }
    }
}

/// Escape a string for HTML text/attribute contexts.
fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// Initialize the logging subsystem.
fn init_logging(level: &str) {
    let level = match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}
