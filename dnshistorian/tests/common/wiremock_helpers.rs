use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use std::time::Duration;

pub const HISTORY_KEY: &str = "st-test-key";
pub const AI_KEY: &str = "gemini-test-key";

pub fn history_path(domain: &str) -> String {
    format!("/v1/history/{}/dns/a", domain)
}

pub const GENERATE_PATH: &str = "/v1beta/models/test-model:generateContent";

/// Creates a mock history provider answering 200 with `body` for `domain`.
pub async fn mock_history_server(domain: &str, body: serde_json::Value) -> MockServer {
    let server = MockServer::start().await;
    mount_history(&server, domain, body).await;
    server
}

pub async fn mount_history(server: &MockServer, domain: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(history_path(domain)))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(body)
                .insert_header("content-type", "application/json"),
        )
        .mount(server)
        .await;
}

/// Creates a mock generative API that answers every prompt with `text`.
pub async fn mock_gemini_server(text: &str) -> MockServer {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "candidates": [{
            "content": {"role": "model", "parts": [{"text": text}]},
            "finishReason": "STOP",
            "index": 0
        }],
        "usageMetadata": {"promptTokenCount": 10, "candidatesTokenCount": 5, "totalTokenCount": 15}
    });

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;

    server
}

/// Creates a mock HTTP server that returns the specified status for every request.
pub async fn mock_error_server(status_code: u16) -> MockServer {
    let server = MockServer::start().await;

    Mock::given(wiremock::matchers::any())
        .respond_with(ResponseTemplate::new(status_code).set_body_string("not json at all"))
        .mount(&server)
        .await;

    server
}

/// Creates a mock HTTP server that delays responses to simulate slow providers.
pub async fn mock_timeout_server(delay_ms: u64) -> MockServer {
    let server = MockServer::start().await;

    Mock::given(wiremock::matchers::any())
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"records": []}))
                .set_delay(Duration::from_millis(delay_ms)),
        )
        .mount(&server)
        .await;

    server
}

/// Prompt text of every generateContent request the server received.
/// Base URI of a local port with nothing listening on it
pub fn closed_port_uri() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
    let uri = format!("http://{}", listener.local_addr().expect("local addr"));
    drop(listener);
    uri
}

pub async fn received_prompts(server: &MockServer) -> Vec<String> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter_map(|request| request.body_json::<serde_json::Value>().ok())
        .filter_map(|body| body["contents"][0]["parts"][0]["text"].as_str().map(str::to_string))
        .collect()
}

pub async fn request_count(server: &MockServer) -> usize {
    server.received_requests().await.map(|r| r.len()).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_history_server_serves_records() {
        let server = mock_history_server("example.com", serde_json::json!({"records": [{"ip": "1.2.3.4"}]})).await;

        let response = reqwest::Client::new()
            .get(format!("{}{}", server.uri(), history_path("example.com")))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), 200);
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["records"][0]["ip"], "1.2.3.4");
    }

    #[tokio::test]
    async fn test_mock_error_server_returns_status_code() {
        let server = mock_error_server(503).await;

        let response = reqwest::Client::new()
            .get(format!("{}/any-path", server.uri()))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), 503);
    }
}
