//! HTTP API surface

use std::sync::Arc;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::Json,
    routing::post,
};
use serde_json::{Value, json};
use tracing::error;

use crate::error::MeetpointError;
use crate::models::RankedResult;
use crate::planner::{MeetingPlanner, PlanRequest};

pub fn router(planner: Arc<MeetingPlanner>) -> Router {
    Router::new()
        .route("/plan", post(plan))
        .with_state(planner)
}

async fn plan(
    State(planner): State<Arc<MeetingPlanner>>,
    Json(request): Json<PlanRequest>,
) -> Result<Json<RankedResult>, (StatusCode, Json<Value>)> {
    match planner.plan(&request).await {
        Ok(result) => Ok(Json(result)),
        Err(err) => Err(error_response(&err)),
    }
}

fn error_response(err: &MeetpointError) -> (StatusCode, Json<Value>) {
    let status = match err {
        MeetpointError::Validation { .. } => StatusCode::BAD_REQUEST,
        MeetpointError::NoCandidates { .. } => StatusCode::NOT_FOUND,
        _ => {
            error!(error = %err, "plan request failed");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    (status, Json(json!({ "error": err.user_message() })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_maps_to_bad_request() {
        let (status, _) = error_response(&MeetpointError::validation("too few travelers"));
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_no_candidates_maps_to_not_found() {
        let (status, _) =
            error_response(&MeetpointError::no_candidates("all candidates rejected"));
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_internal_errors_stay_generic() {
        let (status, body) = error_response(&MeetpointError::internal("semaphore poisoned"));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body.0["error"].as_str().unwrap().contains("semaphore"));
    }
}
