use super::*;
use axum::{
    extract::State,
    http::StatusCode as HttpStatus,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tokio::{net::TcpListener, sync::Mutex};

#[derive(Clone)]
struct ServerState {
    pair_status: HttpStatus,
    pair_body: String,
    vote_status: HttpStatus,
    votes: Arc<Mutex<Vec<VoteRequest>>>,
}

impl ServerState {
    fn new() -> Self {
        Self {
            pair_status: HttpStatus::OK,
            pair_body: serde_json::json!({
                "left": {"id": 1, "name": "Ada", "filename": "ada.jpg", "created_at": "2024-01-01T00:00:00Z"},
                "right": {"id": 2, "name": "Grace", "filename": "grace.png", "created_at": "2024-01-01T00:00:00Z"}
            })
            .to_string(),
            vote_status: HttpStatus::OK,
            votes: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn with_pair(mut self, status: HttpStatus, body: &str) -> Self {
        self.pair_status = status;
        self.pair_body = body.to_string();
        self
    }

    fn with_vote_status(mut self, status: HttpStatus) -> Self {
        self.vote_status = status;
        self
    }
}

async fn handle_pair(State(state): State<ServerState>) -> impl IntoResponse {
    (
        state.pair_status,
        [("content-type", "application/json")],
        state.pair_body,
    )
}

async fn handle_vote(
    State(state): State<ServerState>,
    Json(payload): Json<VoteRequest>,
) -> impl IntoResponse {
    state.votes.lock().await.push(payload);
    (
        state.vote_status,
        Json(serde_json::json!({"detail": "already voted for this pair today"})),
    )
}

async fn spawn_vote_server(state: ServerState) -> Result<HttpArenaClient> {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let app = Router::new()
        .route("/api/votes/pair", get(handle_pair))
        .route("/api/votes/", post(handle_vote))
        .with_state(state);
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    HttpArenaClient::new(Url::parse(&format!("http://{addr}"))?)
}

#[tokio::test]
async fn request_pair_decodes_candidates() {
    let client = spawn_vote_server(ServerState::new())
        .await
        .expect("spawn server");

    let pair = client.request_pair().await.expect("pair");
    assert_eq!(pair.left.id, CandidateId(1));
    assert_eq!(pair.left.name, "Ada");
    assert_eq!(pair.right.media, "grace.png");
}

#[tokio::test]
async fn request_pair_maps_not_found_to_insufficient_candidates() {
    let state = ServerState::new().with_pair(
        HttpStatus::NOT_FOUND,
        r#"{"detail":"not enough candidates to build a pair"}"#,
    );
    let client = spawn_vote_server(state).await.expect("spawn server");

    let err = client.request_pair().await.expect_err("must fail");
    match &err {
        PairSourceError::InsufficientCandidates(detail) => {
            assert_eq!(detail, "not enough candidates to build a pair");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(err.notice_text(), "Not enough candidates.");
}

#[tokio::test]
async fn request_pair_rejects_same_candidate_twice() {
    let body = serde_json::json!({
        "left": {"id": 5, "name": "Ada", "filename": "ada.jpg"},
        "right": {"id": 5, "name": "Ada", "filename": "ada.jpg"}
    })
    .to_string();
    let state = ServerState::new().with_pair(HttpStatus::OK, &body);
    let client = spawn_vote_server(state).await.expect("spawn server");

    let err = client.request_pair().await.expect_err("must fail");
    assert!(matches!(err, PairSourceError::Malformed(_)), "{err}");
}

#[tokio::test]
async fn request_pair_reports_undecodable_body() {
    let state = ServerState::new().with_pair(HttpStatus::OK, "<html>maintenance</html>");
    let client = spawn_vote_server(state).await.expect("spawn server");

    let err = client.request_pair().await.expect_err("must fail");
    assert!(matches!(err, PairSourceError::Decode(_)), "{err}");
}

#[tokio::test]
async fn request_pair_reports_server_errors() {
    let state = ServerState::new().with_pair(HttpStatus::INTERNAL_SERVER_ERROR, "boom");
    let client = spawn_vote_server(state).await.expect("spawn server");

    let err = client.request_pair().await.expect_err("must fail");
    match err {
        PairSourceError::Status(api) => {
            assert_eq!(api.code, shared::error::ErrorCode::Internal);
            assert_eq!(api.message, "boom");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn submit_vote_posts_winner_and_loser() {
    let state = ServerState::new();
    let votes = state.votes.clone();
    let client = spawn_vote_server(state).await.expect("spawn server");

    let receipt = client
        .submit_vote(CandidateId(2), CandidateId(1))
        .await
        .expect("vote");
    assert_eq!(receipt, VoteReceipt::Recorded);
    assert_eq!(
        votes.lock().await.as_slice(),
        &[VoteRequest {
            winner_id: CandidateId(2),
            loser_id: CandidateId(1),
        }]
    );
}

#[tokio::test]
async fn any_success_status_records_vote_without_reading_body() {
    let state = ServerState::new().with_vote_status(HttpStatus::CREATED);
    let client = spawn_vote_server(state).await.expect("spawn server");

    let receipt = client
        .submit_vote(CandidateId(3), CandidateId(4))
        .await
        .expect("vote");
    assert_eq!(receipt, VoteReceipt::Recorded);
}

#[tokio::test]
async fn submit_vote_treats_rate_limit_as_success() {
    let state = ServerState::new().with_vote_status(HttpStatus::TOO_MANY_REQUESTS);
    let client = spawn_vote_server(state).await.expect("spawn server");

    let receipt = client
        .submit_vote(CandidateId(1), CandidateId(2))
        .await
        .expect("rate limit is not an error");
    assert_eq!(receipt, VoteReceipt::RateLimited);
}

#[tokio::test]
async fn submit_vote_surfaces_other_rejections() {
    let state = ServerState::new().with_vote_status(HttpStatus::BAD_REQUEST);
    let client = spawn_vote_server(state).await.expect("spawn server");

    let err = client
        .submit_vote(CandidateId(1), CandidateId(1))
        .await
        .expect_err("must fail");
    assert!(
        err.to_string().contains("already voted"),
        "unexpected error: {err}"
    );
}

#[tokio::test]
async fn unreachable_server_is_a_transport_error() {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    let client = HttpArenaClient::new(Url::parse(&format!("http://{addr}")).expect("url"))
        .expect("client");

    let err = client.request_pair().await.expect_err("must fail");
    assert!(matches!(err, PairSourceError::Transport(_)), "{err}");
    assert!(client.submit_vote(CandidateId(1), CandidateId(2)).await.is_err());
}

#[test]
fn endpoints_resolve_from_server_root() {
    let client = HttpArenaClient::new(Url::parse("http://example.test:8000/ui/").expect("url"))
        .expect("client");
    assert_eq!(client.pair_url.as_str(), "http://example.test:8000/api/votes/pair");
    assert_eq!(client.vote_url.as_str(), "http://example.test:8000/api/votes/");
}
