//! Request handlers for the API endpoints.

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::sim::flow::FlowEdge;
use crate::sim::types::SimulationState;

use super::SharedSession;
use super::types::{ErrorResponse, SeriesQuery, StateResponse};

/// `GET /state` → 200 + `StateResponse` JSON
pub async fn get_state(State(session): State<SharedSession>) -> Json<StateResponse> {
    let session = session.read().await;
    Json(StateResponse {
        latest: session.latest().rounded(),
        kpis: session.kpis(),
        self_test: session.self_test(),
        mode: session.mode().clone(),
        connected: session.is_connected(),
        running: session.is_running(),
    })
}

/// Returns rounded samples, optionally filtered by time range.
///
/// `GET /series` → every retained sample
/// `GET /series?from=A&to=B` → samples with `A <= time <= B`
/// `GET /series?from=B&to=A` with `B > A` → 400 + `ErrorResponse`
pub async fn get_series(
    State(session): State<SharedSession>,
    Query(query): Query<SeriesQuery>,
) -> impl IntoResponse {
    let from = query.from.unwrap_or(i64::MIN);
    let to = query.to.unwrap_or(i64::MAX);

    if from > to {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: format!("`from` ({from}) must be <= `to` ({to})"),
            }),
        ));
    }

    let session = session.read().await;
    let records: Vec<SimulationState> = session
        .series()
        .range(from, to)
        .iter()
        .map(SimulationState::rounded)
        .collect();

    Ok(Json(records))
}

/// `GET /flows` → 200 + flow edges of the current sample
pub async fn get_flows(State(session): State<SharedSession>) -> Json<Vec<FlowEdge>> {
    Json(session.read().await.flows())
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::Request;
    use tower::util::ServiceExt;

    use super::*;
    use crate::api::{router, shared};
    use crate::feed::FeedMode;
    use crate::sim::generator::Generator;
    use crate::sim::session::Session;

    // 2024-06-01T12:00:00Z
    const NOON_MS: i64 = 1_717_243_200_000;

    fn make_test_session() -> SharedSession {
        shared(Session::new(
            Generator::default(),
            42,
            NOON_MS,
            FeedMode::Simulated,
        ))
    }

    async fn get_json(session: SharedSession, uri: &str) -> (StatusCode, serde_json::Value) {
        let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let resp = router(session).oneshot(req).await.unwrap();
        let status = resp.status();
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn state_returns_200() {
        let (status, json) = get_json(make_test_session(), "/state").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["latest"]["time"], NOON_MS);
        assert!(json["latest"].get("batterySoc").is_some());
        assert!(json.get("kpis").is_some());
        assert_eq!(json["self_test"].as_array().map(Vec::len), Some(5));
        assert_eq!(json["mode"]["mode"], "simulated");
        assert_eq!(json["running"], false);
    }

    #[tokio::test]
    async fn series_returns_all_samples() {
        let (status, json) = get_json(make_test_session(), "/series").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json.as_array().map(Vec::len), Some(61));
    }

    #[tokio::test]
    async fn series_range_query() {
        let from = NOON_MS - 5 * 60_000;
        let uri = format!("/series?from={from}&to={NOON_MS}");
        let (status, json) = get_json(make_test_session(), &uri).await;
        assert_eq!(status, StatusCode::OK);
        let rows = json.as_array().cloned().unwrap_or_default();
        assert_eq!(rows.len(), 6);
        assert_eq!(rows[0]["time"], from);
        assert_eq!(rows[5]["time"], NOON_MS);
    }

    #[tokio::test]
    async fn series_invalid_range_returns_400() {
        let (status, json) = get_json(make_test_session(), "/series?from=10&to=5").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"].as_str().is_some_and(|e| e.contains("must be <=")));
    }

    #[tokio::test]
    async fn flows_are_above_threshold() {
        let (status, json) = get_json(make_test_session(), "/flows").await;
        assert_eq!(status, StatusCode::OK);
        for edge in json.as_array().cloned().unwrap_or_default() {
            assert!(edge["power_kw"].as_f64().is_some_and(|p| p > 0.05));
        }
    }
}
