use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::{error, warn};

use crate::{
    api::AppState,
    ledger::micro_algos_to_algos,
    models::{
        ArcadeError, GetLeaderboardResponse, SubmitScorePayload, SubmitScoreResponse,
        WalletBalanceResponse,
    },
};

pub async fn get_leaderboard(State(state): State<AppState>) -> Response {
    match state.service.leaderboard(None).await {
        Ok(leaderboard) => Json(GetLeaderboardResponse { leaderboard }).into_response(),
        Err(e) => {
            error!("Failed to read leaderboard: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to fetch leaderboard" })),
            )
                .into_response()
        }
    }
}

pub async fn submit_score(
    State(state): State<AppState>,
    payload: Result<Json<SubmitScorePayload>, JsonRejection>,
) -> (StatusCode, Json<SubmitScoreResponse>) {
    let payload = match payload {
        Ok(Json(payload)) => payload,
        Err(rejection) => {
            warn!("Rejected leaderboard submission: {}", rejection.body_text());
            return (
                StatusCode::BAD_REQUEST,
                Json(SubmitScoreResponse::rejected(format!(
                    "Invalid payload: {}",
                    rejection.body_text()
                ))),
            );
        }
    };

    let request = match payload.validate() {
        Ok(request) => request,
        Err(e) => {
            warn!("Rejected leaderboard submission: {}", e);
            return (StatusCode::BAD_REQUEST, Json(SubmitScoreResponse::rejected(e.to_string())));
        }
    };

    match state.service.record_submission(&request).await {
        Ok(_) => (StatusCode::OK, Json(SubmitScoreResponse::ok())),
        Err(e @ ArcadeError::IdentityMissing) => {
            (StatusCode::BAD_REQUEST, Json(SubmitScoreResponse::rejected(e.to_string())))
        }
        Err(e) => {
            error!("Failed to record submission for {}: {}", request.address, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(SubmitScoreResponse::rejected("Failed to record score")),
            )
        }
    }
}

pub async fn wallet_balance(State(state): State<AppState>, Path(address): Path<String>) -> Response {
    match state.accounts.micro_algos(&address).await {
        Ok(micro_algos) => Json(WalletBalanceResponse {
            algos: micro_algos_to_algos(micro_algos),
            address,
            micro_algos,
        })
        .into_response(),
        Err(e) => {
            error!("Balance lookup for {} failed: {}", address, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to fetch balance" })),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::api::{router, AppState};
    use crate::config::Settings;
    use crate::ledger::MockAccountReader;
    use crate::models::ArcadeError;
    use crate::scoring::TierTable;
    use crate::service::ArcadeService;
    use crate::store::MemoryStore;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        Router,
    };
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app(accounts: MockAccountReader) -> Router {
        let tiers = TierTable::from_settings(&Settings::default().rewards).unwrap();
        let service = Arc::new(ArcadeService::new(Arc::new(MemoryStore::new()), tiers));
        router(AppState::new(service, Arc::new(accounts)))
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn post_json(body: impl Into<Body>) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/leaderboard/submit")
            .header(header::CONTENT_TYPE, "application/json")
            .body(body.into())
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_submit_then_read_leaderboard() {
        let app = app(MockAccountReader::new());

        for body in [
            json!({ "address": "AAA1", "gameType": "snake", "score": 120, "tokensEarned": 10 }),
            json!({ "address": "BBB2", "displayName": "Bea", "gameType": "trivia", "score": 300 }),
            json!({ "address": "AAA1", "gameType": "snake", "score": 100, "badgesAwarded": 1 }),
        ] {
            let (status, json) = send(&app, post_json(body.to_string())).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(json, json!({ "success": true }));
        }

        let (status, json) = send(&app, get("/api/leaderboard")).await;
        assert_eq!(status, StatusCode::OK);
        let board = json["leaderboard"].as_array().unwrap();
        assert_eq!(board.len(), 2);
        assert_eq!(board[0]["address"], "BBB2");
        assert_eq!(board[0]["rank"], 1);
        assert_eq!(board[0]["displayName"], "Bea");
        assert_eq!(board[1]["totalScore"], 220);
        assert_eq!(board[1]["tokensEarned"], 10);
        assert_eq!(board[1]["badges"], 1);
        assert_eq!(board[1]["displayName"], "Player_AAA1");
    }

    #[tokio::test]
    async fn test_submit_rejects_bad_payloads() {
        let app = app(MockAccountReader::new());

        let (status, json) = send(&app, post_json(json!({ "score": 10 }).to_string())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["success"], false);
        assert!(json["message"].as_str().unwrap().starts_with("Invalid payload"));

        let (status, _) = send(&app, post_json(json!({ "address": "A", "score": "ten" }).to_string())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, json) = send(&app, post_json("{not json")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["success"], false);

        let (_, json) = send(&app, get("/api/leaderboard")).await;
        assert!(json["leaderboard"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_out_of_range_numbers_are_accepted_and_saturate() {
        let app = app(MockAccountReader::new());

        for _ in 0..2 {
            let body = json!({ "address": "A", "gameType": "snake", "score": 1e300, "tokensEarned": 1.5 });
            let (status, json) = send(&app, post_json(body.to_string())).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(json, json!({ "success": true }));
        }

        let (_, json) = send(&app, get("/api/leaderboard")).await;
        let board = json["leaderboard"].as_array().unwrap();
        assert_eq!(board[0]["totalScore"], i64::MAX);
        assert_eq!(board[0]["tokensEarned"], 2);
    }

    #[tokio::test]
    async fn test_wallet_balance() {
        let mut accounts = MockAccountReader::new();
        accounts
            .expect_micro_algos()
            .withf(|address| address.to_string() == "ALGOADDR")
            .returning(|_| Ok(2_500_000));
        let app = app(accounts);

        let (status, json) = send(&app, get("/api/wallet/ALGOADDR/balance")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["address"], "ALGOADDR");
        assert_eq!(json["microAlgos"], 2_500_000);
        assert_eq!(json["algos"].as_f64(), Some(2.5));
    }

    #[tokio::test]
    async fn test_wallet_balance_upstream_failure() {
        let mut accounts = MockAccountReader::new();
        accounts.expect_micro_algos().returning(|_| {
            Err(ArcadeError::Upstream {
                service: "algod".to_string(),
                message: "503".to_string(),
            })
        });
        let app = app(accounts);

        let (status, json) = send(&app, get("/api/wallet/ALGOADDR/balance")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json, json!({ "error": "Failed to fetch balance" }));
    }
}
