//! Platform HTTP host.
//!
//! Serves the platform side of the sandbox: launch pages that
//! auto-submit a signed LTI POST to the registered tool, the Basic
//! Outcomes endpoint grades come back on, and JSON listings of what
//! has happened so far. All state is in memory.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::core::{Config, Error};
use crate::domains::catalog::Catalog;
use crate::domains::launch::{self, LaunchContext, Principal};
use crate::domains::outcomes::{self, GradeRecord};

/// One recorded launch, kept for inspection.
///
/// The signed parameter set is stored as sent (the signature is public
/// wire data); the consumer secret never appears here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaunchLogEntry {
    pub placement_id: u64,
    pub user_id: u64,
    pub oauth_signature: String,
    pub params: Vec<(String, String)>,
    pub launched_at: DateTime<Utc>,
}

/// Application state shared across HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    config: Arc<Config>,
    catalog: Arc<Catalog>,
    grades: Arc<RwLock<Vec<GradeRecord>>>,
    launches: Arc<RwLock<Vec<LaunchLogEntry>>>,
}

/// The platform server.
pub struct PlatformServer {
    state: AppState,
}

impl PlatformServer {
    /// Create a server over the given catalog.
    pub fn new(config: Config, catalog: Arc<Catalog>) -> Self {
        Self {
            state: AppState {
                config: Arc::new(config),
                catalog,
                grades: Arc::new(RwLock::new(Vec::new())),
                launches: Arc::new(RwLock::new(Vec::new())),
            },
        }
    }

    /// Build the router; split out so tests can drive it directly.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/", get(root_handler))
            .route("/health", get(health_check))
            .route("/catalog", get(catalog_handler))
            .route("/launch/{placement_id}", get(launch_handler))
            .route("/outcomes", post(outcomes_handler))
            .route("/grades", get(grades_handler))
            .route("/launches", get(launches_handler))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Run the platform host until the process is stopped.
    pub async fn run(self) -> Result<(), Error> {
        let addr = self.state.config.platform.bind.clone();
        let app = self.router();

        let listener = tokio::net::TcpListener::bind(&addr).await?;
        info!("Platform listening on {}", addr);
        info!("  → Launch:   GET /launch/{{placement_id}}?user_id=<id>");
        info!("  → Outcomes: POST /outcomes");
        info!("  → Grades:   GET /grades");

        axum::serve(listener, app)
            .await
            .map_err(|e| Error::internal(e.to_string()))?;
        Ok(())
    }
}

/// Root handler - provides API info.
async fn root_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "name": "LTI 1.1 Sandbox Platform",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "catalog": "/catalog",
            "launch": "/launch/{placement_id}?user_id=<id>",
            "outcomes": "/outcomes",
            "grades": "/grades",
            "launches": "/launches",
            "health": "/health"
        }
    }))
}

/// Health check endpoint.
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Current courses, users, and placements as JSON.
async fn catalog_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "courses": state.catalog.courses(),
        "users": state.catalog.users(),
        "placements": state.catalog.placements(),
    }))
}

#[derive(Debug, Deserialize)]
struct LaunchQuery {
    user_id: u64,
}

/// Build, sign, record, and render a launch for one placement+user.
async fn launch_handler(
    State(state): State<AppState>,
    Path(placement_id): Path<u64>,
    Query(query): Query<LaunchQuery>,
) -> Response {
    let Some(placement) = state.catalog.placement(placement_id) else {
        return (StatusCode::NOT_FOUND, "Placement not found").into_response();
    };
    let Some(tool) = state.catalog.tool(placement.tool_id) else {
        return (StatusCode::NOT_FOUND, "Tool not found").into_response();
    };
    let Some(course) = state.catalog.course(placement.course_id) else {
        return (StatusCode::NOT_FOUND, "Course not found").into_response();
    };
    let Some(user) = state.catalog.user(query.user_id) else {
        return (StatusCode::NOT_FOUND, "User not found").into_response();
    };

    let context = LaunchContext {
        course_id: course.id.to_string(),
        course_code: course.code,
        course_title: course.title,
        resource_link_id: placement.resource_link_id.clone(),
        resource_link_title: placement.resource_link_title.clone(),
        custom_params: tool.custom_params.clone(),
    };
    let principal = Principal {
        id: user.id.to_string(),
        full_name: user.name,
        email: user.email,
        role: user.role,
    };
    let outcomes_url = format!("{}/outcomes", state.config.platform.public_base_url);

    let request = match launch::build_launch(&tool.credential, &context, &principal, &outcomes_url)
    {
        Ok(request) => request,
        Err(err) => return (StatusCode::UNPROCESSABLE_ENTITY, err.to_string()).into_response(),
    };

    let signature = request
        .get("oauth_signature")
        .unwrap_or_default()
        .to_string();
    state.launches.write().await.push(LaunchLogEntry {
        placement_id,
        user_id: query.user_id,
        oauth_signature: signature,
        params: request.params().to_vec(),
        launched_at: Utc::now(),
    });
    info!(
        "Launching placement {} as user {} to {}",
        placement_id, query.user_id, tool.credential.launch_url
    );

    Html(launch_page(&tool.credential.launch_url, &request.form_fields())).into_response()
}

/// Basic Outcomes endpoint. Always answers 200 with a success
/// envelope; only resolved submissions append a grade record.
async fn outcomes_handler(State(state): State<AppState>, body: String) -> impl IntoResponse {
    let (record, response_xml) = outcomes::receive(&body, state.catalog.as_ref());
    if let Some(record) = record {
        state.grades.write().await.push(record);
    }
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/xml")],
        response_xml,
    )
}

/// Received grades, most recent first.
async fn grades_handler(State(state): State<AppState>) -> impl IntoResponse {
    let mut grades = state.grades.read().await.clone();
    grades.reverse();
    Json(grades)
}

/// Recorded launches, most recent first.
async fn launches_handler(State(state): State<AppState>) -> impl IntoResponse {
    let mut launches = state.launches.read().await.clone();
    launches.reverse();
    Json(launches)
}

/// Minimal page that POSTs the signed parameters to the tool.
fn launch_page(launch_url: &str, form_fields: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head><title>Launching LTI tool...</title></head>
<body>
  <p>Launching LTI tool...</p>
  <form id="ltiForm" action="{launch_url}" method="POST" style="display:none;">
{form_fields}
  </form>
  <script>document.getElementById('ltiForm').submit();</script>
</body>
</html>"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::launch::{Role, ToolCredential};
    use crate::domains::outcomes::pox;
    use std::collections::BTreeMap;

    fn demo_state() -> (AppState, u64, u64) {
        let catalog = Arc::new(Catalog::demo());
        let tool_id = catalog.add_tool(
            "Quiz Tool",
            ToolCredential {
                consumer_key: "test_key".to_string(),
                consumer_secret: "test_secret".to_string(),
                launch_url: "http://127.0.0.1:8080/lti/launch".to_string(),
            },
            BTreeMap::new(),
        );
        let course = catalog.courses()[0].clone();
        let placement = catalog.place_tool(course.id, tool_id).unwrap();
        let user = catalog
            .users()
            .into_iter()
            .find(|u| u.role == Role::Student)
            .unwrap();

        let server = PlatformServer::new(Config::default(), catalog);
        (server.state, placement.id, user.id)
    }

    #[tokio::test]
    async fn test_launch_handler_records_and_renders() {
        let (state, placement_id, user_id) = demo_state();

        let response = launch_handler(
            State(state.clone()),
            Path(placement_id),
            Query(LaunchQuery { user_id }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let launches = state.launches.read().await;
        assert_eq!(launches.len(), 1);
        assert!(!launches[0].oauth_signature.is_empty());
    }

    #[tokio::test]
    async fn test_launch_handler_unknown_placement() {
        let (state, _, user_id) = demo_state();
        let response =
            launch_handler(State(state), Path(9999), Query(LaunchQuery { user_id })).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_outcomes_handler_stores_resolved_grade() {
        let (state, placement_id, user_id) = demo_state();
        let placement = state.catalog.placement(placement_id).unwrap();

        let sid = crate::domains::launch::sourced_id::encode(
            &placement.course_id.to_string(),
            &placement.resource_link_id,
            &user_id.to_string(),
        );
        let xml = pox::build_replace_result_request("msg-1", &sid, 0.85);

        let _ = outcomes_handler(State(state.clone()), xml).await;
        let grades = state.grades.read().await;
        assert_eq!(grades.len(), 1);
        assert_eq!(grades[0].score, 0.85);
    }

    #[tokio::test]
    async fn test_outcomes_handler_drops_unknown_placement() {
        let (state, _, _) = demo_state();
        let sid = crate::domains::launch::sourced_id::encode("42", "ghost-link", "1");
        let xml = pox::build_replace_result_request("msg-2", &sid, 0.5);

        let _ = outcomes_handler(State(state.clone()), xml).await;
        assert!(state.grades.read().await.is_empty());
    }
}
