use std::sync::Arc;

use repo_rag::render::ResultList;
use repo_rag::{AppController, Applied, ClientConfig, HttpBackend, WorkflowState};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn chunk(path: &str, score: f64) -> serde_json::Value {
    json!({
        "content": format!("// {path}\nfn body() {{}}"),
        "filepath": path,
        "language": "rust",
        "chunk_type": "function",
        "symbol_name": "body",
        "start_line": 1,
        "similarity_score": score,
        "chunk_length": 20
    })
}

fn controller_for(server: &MockServer) -> AppController {
    let config = ClientConfig {
        api_base: server.uri(),
        ..ClientConfig::default()
    };
    AppController::new(Arc::new(HttpBackend::new(&config)), config.top_k)
}

async fn mount_index(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/index"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "repo": "https://github.com/acme/widgets",
            "num_files": 42,
            "num_chunks": 310
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn index_then_query_end_to_end() {
    let server = MockServer::start().await;
    mount_index(&server).await;
    Mock::given(method("POST"))
        .and(path("/query"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "question": "what does foo do?",
            "answer": "`foo` forwards to `bar`.",
            // deliberately disagrees with the array length
            "num_chunks_retrieved": 6,
            "retrieved_chunks": [
                chunk("a.rs", 0.9),
                chunk("b.rs", 0.8),
                chunk("c.rs", 0.7),
                chunk("d.rs", 0.6)
            ]
        })))
        .mount(&server)
        .await;

    let mut ctl = controller_for(&server);
    ctl.index_form_mut().set_input("https://github.com/acme/widgets");
    assert!(ctl.submit_index_form());
    assert_eq!(ctl.settle().await, Some(Applied::Indexed));

    assert_eq!(ctl.state(), WorkflowState::Indexed);
    let info = ctl.index_info().unwrap();
    assert_eq!(info.repository, "https://github.com/acme/widgets");
    assert_eq!((info.file_count, info.chunk_count), (42, 310));
    assert!(ctl.history().is_empty());

    ctl.query_form_mut().set_question("what does foo do?");
    ctl.query_form_mut().set_top_k(6);
    assert!(ctl.query_form().can_submit(ctl.state()));
    assert!(ctl.submit_query_form());
    assert!(matches!(ctl.settle().await, Some(Applied::Answered { .. })));

    assert_eq!(ctl.history().len(), 1);
    let entry = ctl.history().get(0).unwrap();
    assert_eq!(entry.result.retrieved_chunks.len(), 4);
    assert_eq!(entry.result.chunk_count, 6);
    let paths: Vec<_> = entry
        .result
        .retrieved_chunks
        .iter()
        .map(|c| c.filepath.as_str())
        .collect();
    assert_eq!(paths, vec!["a.rs", "b.rs", "c.rs", "d.rs"]);
    assert_eq!(ctl.query_form().question(), "");
}

#[tokio::test]
async fn query_failure_keeps_index_and_history() {
    let server = MockServer::start().await;
    mount_index(&server).await;
    Mock::given(method("POST"))
        .and(path("/query"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "detail": "No results from index."
        })))
        .mount(&server)
        .await;

    let mut ctl = controller_for(&server);
    ctl.submit_index("https://github.com/acme/widgets");
    ctl.settle().await;

    ctl.submit_query("anything", 6);
    assert_eq!(ctl.settle().await, Some(Applied::QueryFailed));
    assert_eq!(ctl.state(), WorkflowState::Indexed);
    assert_eq!(ctl.error(), Some("No results from index."));
    assert!(ctl.index_info().is_some());
    assert!(ctl.history().is_empty());
}

#[tokio::test]
async fn unreachable_backend_leaves_session_idle() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    let config = ClientConfig {
        api_base: format!("http://127.0.0.1:{port}"),
        ..ClientConfig::default()
    };
    let mut ctl = AppController::new(Arc::new(HttpBackend::new(&config)), config.top_k);

    assert!(ctl.submit_index("https://github.com/acme/widgets"));
    assert_eq!(ctl.settle().await, Some(Applied::IndexFailed));
    assert_eq!(ctl.state(), WorkflowState::Idle);
    assert_eq!(ctl.error(), Some("Could not reach the API."));
    assert!(!ctl.submit_query("q", 6));
}

#[tokio::test]
async fn expanding_a_chunk_survives_a_newer_answer() {
    let server = MockServer::start().await;
    mount_index(&server).await;
    Mock::given(method("POST"))
        .and(path("/query"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "question": "q",
            "answer": "a",
            "num_chunks_retrieved": 2,
            "retrieved_chunks": [chunk("a.rs", 0.5), chunk("b.rs", 0.4)]
        })))
        .mount(&server)
        .await;

    let mut ctl = controller_for(&server);
    ctl.submit_index("https://github.com/acme/widgets");
    ctl.settle().await;
    ctl.submit_query("q", 6);
    ctl.settle().await;

    let mut list = ResultList::new();
    assert_eq!(list.toggle(ctl.history(), 0, 0), Some(true));
    let first_seq = ctl.history().get(0).unwrap().seq;

    ctl.submit_query("q", 6);
    ctl.settle().await;
    list.sync(ctl.history());

    let newest_seq = ctl.history().get(0).unwrap().seq;
    assert!(list.is_expanded(first_seq, 0));
    assert!(!list.is_expanded(first_seq, 1));
    assert!(!list.is_expanded(newest_seq, 0));
}
