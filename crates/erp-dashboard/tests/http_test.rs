//! The dashboard against a real HTTP server.

use erp_dashboard::config::AppConfig;
use erp_dashboard::lifecycle::DashboardSystem;
use erp_dashboard::model::UnitId;
use query_framework::{AuthContext, NoticeLevel};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn units_body(names: &[&str], total: u64, page: u32) -> serde_json::Value {
    let rows: Vec<_> = names
        .iter()
        .enumerate()
        .map(|(i, name)| json!({ "id": i + 1, "name": name, "shortName": "", "isActive": true }))
        .collect();
    json!({
        "status": true,
        "message": "Data retrieved successfully",
        "data": rows,
        "pagination": { "total": total, "page": page, "limit": 2, "totalPage": total.div_ceil(2) }
    })
}

#[tokio::test]
async fn test_units_page_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/units"))
        .and(query_param("page", "1"))
        .and(query_param("limit", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(units_body(&["Piece", "Box"], 3, 1)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/units/2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": false,
            "message": "Unit is used by 12 products",
            "data": null
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = AppConfig::new_for_test(server.uri());
    let system = DashboardSystem::new(config.transport().unwrap(), config.channel_buffer());
    let auth = AuthContext::full_access("admin", &["units"]);

    let mut page = system.units_page(auth, 2).await.unwrap();
    page.wait_until_settled().await.unwrap();
    let rendered = page.render();
    assert_eq!(rendered.rows.len(), 2);
    assert_eq!(rendered.rows[1][0], "Box");
    assert_eq!(rendered.pager.total_pages, 2);

    let result = page.delete(UnitId(2)).await;
    assert!(result.is_err());
    let notices = page.take_notices();
    assert_eq!(notices[0].level, NoticeLevel::Error);
    assert_eq!(notices[0].message, "Unit is used by 12 products");
    // Still fresh: no second GET.
    assert_eq!(page.render().rows.len(), 2);

    drop(page);
    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_server_errors_become_notices() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/units"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let config = AppConfig::new_for_test(server.uri());
    let system = DashboardSystem::new(config.transport().unwrap(), config.channel_buffer());
    let auth = AuthContext::full_access("admin", &["units"]);

    let mut page = system.units_page(auth, 10).await.unwrap();
    page.wait_until_settled().await.unwrap();

    assert!(page.render().empty);
    let notices = page.take_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].message, "API returned status: 503");

    drop(page);
    system.shutdown().await.unwrap();
}
