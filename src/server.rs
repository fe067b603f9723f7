use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use log::info;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;

use crate::data::{BatchTimetable, GenerationSummary};
use crate::error::ScheduleError;
use crate::service::TimetableService;

impl IntoResponse for ScheduleError {
    fn into_response(self) -> Response {
        let status = if self.is_input_error() {
            StatusCode::UNPROCESSABLE_ENTITY
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        let body = json!({ "status": "error", "message": self.to_string() });
        (status, Json(body)).into_response()
    }
}

async fn generate_handler(
    State(service): State<Arc<TimetableService>>,
) -> Result<Json<GenerationSummary>, ScheduleError> {
    let summary = tokio::task::spawn_blocking(move || service.generate_timetable())
        .await
        .map_err(|e| ScheduleError::Task(e.to_string()))??;
    Ok(Json(summary))
}

async fn batch_timetable_handler(
    State(service): State<Arc<TimetableService>>,
    Path(batch_id): Path<String>,
) -> Result<Json<BatchTimetable>, ScheduleError> {
    service.batch_timetable(&batch_id).map(Json)
}

pub fn router(service: Arc<TimetableService>) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/api/generate", post(generate_handler))
        .route("/api/timetable/batch/:batch_id", get(batch_timetable_handler))
        .with_state(service)
}

pub async fn run_server(addr: SocketAddr, service: Arc<TimetableService>) -> std::io::Result<()> {
    let app = router(service);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Server running at http://{}", listener.local_addr()?);

    axum::serve(listener, app).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Catalog, ScheduleGrid, TimetableEntry};
    use crate::solver::tests::{batch, faculty, room, sample_catalog, subject};
    use crate::store::{InMemoryTimetableStore, TimetableStore};
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use serde_json::Value;
    use tower::ServiceExt;

    fn app_with(catalog: Catalog) -> (Router, Arc<InMemoryTimetableStore>) {
        let store = Arc::new(InMemoryTimetableStore::new());
        let service = TimetableService::new(
            Arc::new(catalog),
            store.clone(),
            ScheduleGrid::default(),
        );
        (router(Arc::new(service)), store)
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn generate() -> Request<Body> {
        Request::post("/api/generate").body(Body::empty()).unwrap()
    }

    fn batch_grid(id: &str) -> Request<Body> {
        Request::get(format!("/api/timetable/batch/{}", id))
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_generate_returns_counts() {
        let (app, _) = app_with(sample_catalog());
        let (status, body) = send(&app, generate()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        let scheduled = body["scheduled"].as_u64().unwrap();
        let unscheduled = body["unscheduled"].as_u64().unwrap();
        assert_eq!(scheduled + unscheduled, 90);
    }

    #[tokio::test]
    async fn test_dangling_faculty_is_unprocessable() {
        let mut catalog = sample_catalog();
        catalog.subjects.push(subject("S9", "Art", "F404"));
        let (app, _) = app_with(catalog);
        let (status, body) = send(&app, generate()).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["status"], "error");
        assert!(body["message"].as_str().unwrap().contains("F404"));
    }

    #[tokio::test]
    async fn test_batch_grid_shape_and_cell() {
        let catalog = Catalog {
            batches: vec![batch("B1")],
            subjects: vec![subject("S1", "Math", "F1")],
            faculties: vec![faculty("F1", "Dr. X")],
            rooms: vec![room("R1", "R1")],
        };
        let (app, store) = app_with(catalog);
        store
            .replace_all(vec![TimetableEntry {
                batch_id: "B1".to_string(),
                day: "Monday".to_string(),
                slot: 3,
                subject_id: "S1".to_string(),
                faculty_id: "F1".to_string(),
                room_id: "R1".to_string(),
            }])
            .unwrap();

        let (status, body) = send(&app, batch_grid("B1")).await;
        assert_eq!(status, StatusCode::OK);
        let days = body.as_object().unwrap();
        assert_eq!(days.len(), 5);
        assert_eq!(
            body["Monday"][2],
            json!({ "subject": "Math", "faculty": "Dr. X", "room": "R1" })
        );
        for (day, cells) in days {
            let cells = cells.as_array().unwrap();
            assert_eq!(cells.len(), 6);
            for (i, cell) in cells.iter().enumerate() {
                if !(day == "Monday" && i == 2) {
                    assert!(cell.is_null());
                }
            }
        }
    }

    #[tokio::test]
    async fn test_generate_then_query_round_trip() {
        let (app, store) = app_with(sample_catalog());
        let (_, body) = send(&app, generate()).await;
        let scheduled = body["scheduled"].as_u64().unwrap() as usize;
        assert_eq!(store.len().unwrap(), scheduled);

        let mut occupied = 0;
        for id in ["B1", "B2", "B3"] {
            let (status, grid) = send(&app, batch_grid(id)).await;
            assert_eq!(status, StatusCode::OK);
            occupied += grid
                .as_object()
                .unwrap()
                .values()
                .flat_map(|cells| cells.as_array().unwrap().iter())
                .filter(|c| !c.is_null())
                .count();
        }
        assert_eq!(occupied, scheduled);
    }
}
