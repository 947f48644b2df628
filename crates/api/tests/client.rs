use flowdeck_api::{ApiError, ClientConfig, WorkflowBackend, WorkflowClient};
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn client_for(server: &MockServer) -> WorkflowClient {
    WorkflowClient::new(ClientConfig::new(server.uri(), "pizza").expect("config")).expect("client")
}

#[tokio::test]
async fn fetches_workflow_instance() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/wf/pizza/42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Meta": {
                "Workflow": "pizzaOrder",
                "ID": "42",
                "Threads": [{ "WaitEvents": [{ "Req": { "Name": "add" } }] }]
            },
            "State": { "Status": "new" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let instance = client_for(&server).await.get_workflow("42").await.expect("instance");
    assert_eq!(instance.meta.workflow, "pizzaOrder");
    assert_eq!(instance.pending_events(), vec!["add"]);
}

#[tokio::test]
async fn fetches_diagram_as_svg_text() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/graph/pizzaOrder"))
        .and(query_param("format", "svg"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<svg></svg>"))
        .expect(1)
        .mount(&server)
        .await;

    let svg = client_for(&server).await.get_diagram("pizzaOrder").await.expect("diagram");
    assert_eq!(svg, "<svg></svg>");
}

#[tokio::test]
async fn fetches_definition_and_extracts_handlers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/definition/pizzaOrder"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Stmts": [{ "Type": "event", "Name": "add", "Handler": { "Type": "handler", "Input": {} } }],
            "State": { "type": "object" }
        })))
        .mount(&server)
        .await;

    let definition = client_for(&server).await.get_definition("pizzaOrder").await.expect("definition");
    let names: Vec<_> = definition.handlers().iter().map(|h| h.name.clone()).collect();
    assert_eq!(names, vec!["add"]);
}

#[tokio::test]
async fn get_reports_status_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/wf/pizza/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
        .mount(&server)
        .await;

    let error = client_for(&server).await.get_workflow("missing").await.expect_err("should fail");
    assert_eq!(error.status(), Some(404));
}

#[tokio::test]
async fn get_reports_malformed_json() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/wf/pizza/1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{not json"))
        .mount(&server)
        .await;

    let error = client_for(&server).await.get_workflow("1").await.expect_err("should fail");
    assert!(matches!(error, ApiError::Decode { .. }), "unexpected error: {error}");
}

#[tokio::test]
async fn submit_posts_form_data_and_returns_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/wf/pizza/42/add"))
        .and(body_json(json!({ "Name": "margherita", "Qty": 2 })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let response = client_for(&server)
        .await
        .submit_event("42", "add", &json!({ "Name": "margherita", "Qty": 2 }))
        .await
        .expect("submit");
    assert!(response.is_accepted());
}

#[tokio::test]
async fn submit_does_not_fail_on_rejection() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/wf/pizza/42/add"))
        .respond_with(ResponseTemplate::new(400).set_body_string("jsonschema validate: Qty is required"))
        .mount(&server)
        .await;

    let response = client_for(&server).await.submit_event("42", "add", &json!({})).await.expect("submit");
    assert_eq!(response.status, 400);
    assert!(!response.is_accepted());
    assert!(response.body.contains("Qty"));
}

#[tokio::test]
async fn submit_treats_other_success_codes_as_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/wf/pizza/42/add"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let response = client_for(&server).await.submit_event("42", "add", &json!({})).await.expect("submit");
    assert!(!response.is_accepted());
}

#[tokio::test]
async fn create_posts_json_content_type() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/wf/pizza/777"))
        .and(header("content-type", "application/json"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let response = client_for(&server).await.create_workflow("777").await.expect("create");
    assert_eq!(response.status, 500);
    assert!(!response.is_success());
}

#[tokio::test]
async fn transport_errors_are_reported() {
    let client = WorkflowClient::new(ClientConfig::new("http://127.0.0.1:9", "pizza").expect("config")).expect("client");
    let error = client.create_workflow("1").await.expect_err("nothing listens on port 9");
    assert!(matches!(error, ApiError::Transport { .. }));
}

#[tokio::test]
async fn truncated_body_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let address = listener.local_addr().expect("address");
    let server = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.expect("accept");
        let mut request = [0u8; 1024];
        let _ = socket.read(&mut request).await.expect("read request");
        socket
            .write_all(b"HTTP/1.1 200 OK\r\nContent-Type: image/svg+xml\r\nContent-Length: 1000\r\n\r\n<svg partial")
            .await
            .expect("write response");
    });

    let client = WorkflowClient::new(ClientConfig::new(format!("http://{address}"), "pizza").expect("config")).expect("client");
    let result = client.get_diagram("pizzaOrder").await;
    server.await.expect("server task");

    assert!(matches!(result, Err(ApiError::Transport { .. })), "got {result:?}");
}
