//! Tests for `RestTransport` against a local HTTP server.

mod common;

use common::{spawn_actor, UnitCreate};
use query_framework::mock::{list_body, mutation_body, rejection_body};
use query_framework::{HttpMethod, ListQuery, QueryError, RestTransport, Transport};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::net::TcpListener;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn transport(server: &MockServer) -> RestTransport {
    RestTransport::new(format!("{}/api", server.uri()), Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_listing_sends_one_based_page_limit_and_search() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/units"))
        .and(query_param("page", "2"))
        .and(query_param("limit", "25"))
        .and(query_param("search", "box"))
        .respond_with(ResponseTemplate::new(200).set_body_json(list_body(vec![], 0, 2, 25)))
        .expect(1)
        .mount(&server)
        .await;

    let body = transport(&server)
        .get("units", &ListQuery::new(2, 25, "box").params())
        .await
        .unwrap();

    assert_eq!(body["pagination"]["limit"], 25);
}

#[tokio::test]
async fn test_token_is_sent_as_bearer_auth() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/roles"))
        .and(header("authorization", "Bearer secret-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(list_body(vec![], 0, 1, 10)))
        .expect(1)
        .mount(&server)
        .await;

    let transport = transport(&server).with_token("secret-token");
    transport
        .get("roles", &ListQuery::first(10).params())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_non_success_status_is_an_http_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/units"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let result = transport(&server)
        .get("units", &ListQuery::first(10).params())
        .await;

    assert_eq!(result, Err(QueryError::Http { status: 500 }));
}

#[tokio::test]
async fn test_unparseable_body_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/units"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
        .mount(&server)
        .await;

    let result = transport(&server)
        .get("units", &ListQuery::first(10).params())
        .await;

    assert!(matches!(result, Err(QueryError::Decode(_))));
}

#[tokio::test]
async fn test_unreachable_server_is_a_transport_error() {
    let server = MockServer::start().await;
    let transport = transport(&server);
    drop(server);

    let result = transport.get("units", &ListQuery::first(10).params()).await;

    assert!(matches!(result, Err(QueryError::Transport(_))));
}

#[tokio::test]
async fn test_https_base_url_starts_a_tls_handshake() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let transport =
        RestTransport::new(format!("https://127.0.0.1:{port}/api"), Duration::from_secs(5))
            .unwrap();
    let request = tokio::spawn(async move {
        transport
            .get("units", &ListQuery::first(10).params())
            .await
    });

    let (mut socket, _) = listener.accept().await.unwrap();
    let mut record_type = [0u8; 1];
    socket.read_exact(&mut record_type).await.unwrap();
    // 0x16 opens a TLS handshake record (ClientHello).
    assert_eq!(record_type[0], 0x16);

    drop(socket);
    let result = request.await.unwrap();
    assert!(matches!(result, Err(QueryError::Transport(_))));
}

#[tokio::test]
async fn test_mutations_use_item_paths_and_json_bodies() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/units/4"))
        .and(body_json(json!({ "name": "Pallet" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(mutation_body(
            "Updated successfully",
            Some(json!({ "id": 4, "name": "Pallet" })),
        )))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/units/4"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(mutation_body("Deleted successfully", None)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let transport = transport(&server);
    let updated = transport
        .send(HttpMethod::Put, "units/4", Some(json!({ "name": "Pallet" })))
        .await
        .unwrap();
    assert_eq!(updated["data"]["name"], "Pallet");

    let deleted = transport
        .send(HttpMethod::Delete, "units/4", None)
        .await
        .unwrap();
    assert_eq!(deleted["message"], "Deleted successfully");
}

#[tokio::test]
async fn test_actor_over_http_reports_rejections_with_the_server_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/units"))
        .respond_with(ResponseTemplate::new(200).set_body_json(list_body(
            vec![json!({ "id": 1, "name": "Box", "active": true })],
            1,
            1,
            10,
        )))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/units"))
        .and(body_json(json!({ "name": "Box" })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(rejection_body("Unit name already exists")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (client, _handle) = spawn_actor(Arc::new(transport(&server)));

    let page = client.list(ListQuery::first(10)).await.unwrap();
    assert_eq!(page.rows[0].name, "Box");
    assert_eq!(page.pagination.total_page, 1);

    let result = client
        .create(UnitCreate {
            name: "Box".to_string(),
        })
        .await;
    assert_eq!(
        result.unwrap_err(),
        QueryError::Rejected("Unit name already exists".to_string())
    );

    // A rejection leaves the listing fresh.
    client.list(ListQuery::first(10)).await.unwrap();
}
