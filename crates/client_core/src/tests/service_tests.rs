use super::*;
use std::sync::Arc;

use axum::{extract::State, http::StatusCode, http::Uri, routing::post, Json, Router};
use serde_json::{json, Value};
use shared::domain::{Concept, Resource};
use tokio::{net::TcpListener, sync::Mutex};

use crate::error::FailureCategory;

type Received = Arc<Mutex<Vec<(String, Value)>>>;

#[derive(Clone)]
struct ScriptedServer {
    status: StatusCode,
    body: String,
    received: Received,
}

async fn handle_scripted(
    State(state): State<ScriptedServer>,
    uri: Uri,
    Json(body): Json<Value>,
) -> (StatusCode, String) {
    state
        .received
        .lock()
        .await
        .push((uri.path().to_string(), body));
    (state.status, state.body.clone())
}

async fn spawn_scripted_server(
    status: StatusCode,
    body: impl Into<String>,
) -> (HttpLearningService, Received) {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let received: Received = Arc::new(Mutex::new(Vec::new()));
    let state = ScriptedServer {
        status,
        body: body.into(),
        received: received.clone(),
    };
    let app = Router::new()
        .route(GENERATE_KNOWLEDGE_GRAPH_ENDPOINT, post(handle_scripted))
        .route(GENERATE_PATH_ENDPOINT, post(handle_scripted))
        .route(CHAT_ENDPOINT, post(handle_scripted))
        .with_state(state);
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    let service = HttpLearningService::new(format!("http://{addr}")).expect("client");
    (service, received)
}

fn calculus_graph() -> KnowledgeGraph {
    let mut graph = KnowledgeGraph::new();
    graph.insert("Limits", Concept::default());
    graph.insert(
        "Derivatives",
        Concept {
            prerequisites: vec!["Limits".into()],
            resources: vec![Resource {
                title: "Intro".into(),
                url: "https://x".into(),
                kind: "video".into(),
                ..Resource::default()
            }],
            ..Concept::default()
        },
    );
    graph
}

#[tokio::test]
async fn knowledge_graph_request_posts_topic_and_returns_graph() {
    let body = json!({
        "knowledge_graph": {
            "Limits": {"prerequisites": [], "resources": []},
            "Derivatives": {
                "prerequisites": ["Limits"],
                "resources": [{"title": "Intro", "url": "https://x", "type": "video"}]
            }
        }
    });
    let (service, received) = spawn_scripted_server(StatusCode::OK, body.to_string()).await;

    let graph = service
        .generate_knowledge_graph("Calculus")
        .await
        .expect("graph");

    assert_eq!(graph, calculus_graph());
    let received = received.lock().await;
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].0, GENERATE_KNOWLEDGE_GRAPH_ENDPOINT);
    assert_eq!(received[0].1, json!({"topic": "Calculus"}));
}

#[tokio::test]
async fn empty_knowledge_graph_is_malformed() {
    for body in [r#"{"knowledge_graph":{}}"#, r#"{"status":"success"}"#] {
        let (service, _) = spawn_scripted_server(StatusCode::OK, body).await;
        let err = service
            .generate_knowledge_graph("Calculus")
            .await
            .expect_err("empty graph must fail");
        assert_eq!(err.category(), FailureCategory::MalformedResponse);
        assert_eq!(err.to_string(), EMPTY_GRAPH_MESSAGE);
    }
}

#[tokio::test]
async fn non_success_status_surfaces_status_and_error_field() {
    let (service, _) =
        spawn_scripted_server(StatusCode::BAD_REQUEST, r#"{"error":"bad topic"}"#).await;

    let err = service
        .generate_knowledge_graph("???")
        .await
        .expect_err("400 must fail");

    match &err {
        GatewayError::Remote { status, message } => {
            assert_eq!(*status, 400);
            assert_eq!(message, "bad topic");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(err.to_string(), "Backend error: 400 - bad topic");
}

#[tokio::test]
async fn non_success_without_error_field_echoes_body() {
    let (service, _) = spawn_scripted_server(
        StatusCode::INTERNAL_SERVER_ERROR,
        r#"{"message":"Failed to generate knowledge graph"}"#,
    )
    .await;

    let err = service
        .generate_knowledge_graph("Calculus")
        .await
        .expect_err("500 must fail");
    let shown = err.to_string();
    assert!(shown.contains("500"), "{shown}");
    assert!(shown.contains("Failed to generate knowledge graph"), "{shown}");
}

#[tokio::test]
async fn path_request_round_trips_whole_graph() {
    let (service, received) =
        spawn_scripted_server(StatusCode::OK, r#"{"path":["Limits","Derivatives"]}"#).await;
    let request = GeneratePathRequest {
        goal: "Derivatives".into(),
        known_concepts: vec!["Sets".into()],
        struggling_concepts: vec!["Limits".into()],
        knowledge_graph: calculus_graph(),
    };

    let path = service.generate_path(&request).await.expect("path");

    assert_eq!(path, vec!["Limits".to_string(), "Derivatives".to_string()]);
    let received = received.lock().await;
    assert_eq!(received[0].0, GENERATE_PATH_ENDPOINT);
    assert_eq!(
        received[0].1,
        serde_json::to_value(&request).expect("serialize request")
    );
    assert_eq!(received[0].1["knowledge_graph"]["Derivatives"]["resources"][0]["type"], "video");
}

#[tokio::test]
async fn null_prerequisites_and_partial_resources_are_accepted() {
    let body = json!({
        "knowledge_graph": {
            "Limits": {"prerequisites": null, "resources": null},
            "Derivatives": {
                "prerequisites": ["Limits"],
                "resources": [{"title": "Intro"}]
            }
        }
    });
    let (service, _) = spawn_scripted_server(StatusCode::OK, body.to_string()).await;

    let graph = service
        .generate_knowledge_graph("Calculus")
        .await
        .expect("lenient graph");

    assert!(graph.get("Limits").expect("concept").prerequisites.is_empty());
    let intro = &graph.resources_for("Derivatives")[0];
    assert_eq!(intro.title, "Intro");
    assert_eq!(intro.kind, "");
    assert_eq!(intro.url, "");
}

#[tokio::test]
async fn received_graph_is_sent_back_unchanged() {
    let graph_json = json!({
        "Limits": {
            "prerequisites": [],
            "resources": [{"title": "Notes", "url": "https://n", "type": "article", "level": "intro"}],
            "description": "approach"
        }
    });
    let (service, _) = spawn_scripted_server(
        StatusCode::OK,
        json!({"knowledge_graph": graph_json}).to_string(),
    )
    .await;
    let graph = service
        .generate_knowledge_graph("Calculus")
        .await
        .expect("graph");

    let (path_service, received) =
        spawn_scripted_server(StatusCode::OK, r#"{"path":["Limits"]}"#).await;
    let request = GeneratePathRequest {
        goal: "Limits".into(),
        known_concepts: Vec::new(),
        struggling_concepts: Vec::new(),
        knowledge_graph: graph,
    };
    path_service.generate_path(&request).await.expect("path");

    let received = received.lock().await;
    assert_eq!(received[0].1["knowledge_graph"], graph_json);
}

#[tokio::test]
async fn absent_path_is_empty() {
    let (service, _) = spawn_scripted_server(StatusCode::OK, "{}").await;
    let request = GeneratePathRequest {
        goal: String::new(),
        known_concepts: Vec::new(),
        struggling_concepts: Vec::new(),
        knowledge_graph: calculus_graph(),
    };

    let path = service.generate_path(&request).await.expect("path");
    assert!(path.is_empty());
}

#[tokio::test]
async fn undecodable_success_body_is_transport_failure() {
    let (service, _) = spawn_scripted_server(StatusCode::OK, "<html>oops</html>").await;
    let err = service
        .generate_knowledge_graph("Calculus")
        .await
        .expect_err("html body must fail");
    assert_eq!(err.category(), FailureCategory::Transport);
}

#[tokio::test]
async fn chat_returns_answer() {
    let (service, received) =
        spawn_scripted_server(StatusCode::OK, r#"{"answer":"A limit is..."}"#).await;

    let answer = service.ask("What is a limit?").await.expect("answer");

    assert_eq!(answer, "A limit is...");
    let received = received.lock().await;
    assert_eq!(received[0].0, CHAT_ENDPOINT);
    assert_eq!(received[0].1, json!({"question": "What is a limit?"}));
}

#[tokio::test]
async fn chat_without_answer_is_malformed() {
    let (service, _) = spawn_scripted_server(StatusCode::OK, r#"{"answer":"  "}"#).await;
    let err = service.ask("What is a limit?").await.expect_err("blank answer");
    assert_eq!(err.category(), FailureCategory::MalformedResponse);
}

#[tokio::test]
async fn unreachable_service_is_transport_failure() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let service = HttpLearningService::with_timeout(
        format!("http://{addr}"),
        Some(Duration::from_secs(2)),
    )
    .expect("client");
    let err = service
        .generate_knowledge_graph("Calculus")
        .await
        .expect_err("nothing listening");
    assert_eq!(err.category(), FailureCategory::Transport);
}

#[test]
fn plain_constructor_builds_client_without_timeout() {
    let service = HttpLearningService::new("http://127.0.0.1:5000").expect("client");
    assert_eq!(service.server_url(), "http://127.0.0.1:5000");
}
