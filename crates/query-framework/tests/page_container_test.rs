mod common;

use common::{
    seeded_backend, spawn_actor, unit_columns, wait_for_list_calls, Unit, UnitCreate, UnitUpdate,
};
use query_framework::mock::{list_body, mutation_body, rejection_body, MockTransport};
use query_framework::{
    AuthContext, HttpMethod, ListQuery, NoticeLevel, PageContainer, PermissionAction, QueryError,
    Resource, TableEvent,
};
use serde_json::json;
use std::sync::Arc;

fn admin() -> AuthContext {
    AuthContext::full_access("admin", &[Unit::PATH])
}

fn viewer() -> AuthContext {
    AuthContext::for_user("viewer").with(Unit::PATH, PermissionAction::View)
}

#[tokio::test]
async fn test_mount_shows_the_first_page() {
    let backend = seeded_backend(23);
    let (client, _handle) = spawn_actor(backend.clone());

    let mut page = PageContainer::mount(client, admin(), unit_columns(), 10)
        .await
        .unwrap();
    assert_eq!(page.query(), ListQuery::first(10));
    page.wait_until_settled().await.unwrap();

    let rendered = page.render();
    assert_eq!(rendered.headers, vec!["ID", "Name", "Status"]);
    assert_eq!(rendered.rows.len(), 10);
    assert_eq!(rendered.rows[0], vec!["1", "Unit 01", "Active"]);
    assert_eq!(rendered.pager.total_pages, 3);
    assert!(!rendered.pager.can_previous);
    assert!(rendered.pager.can_next);
}

#[tokio::test]
async fn test_mount_requires_view_permission() {
    let backend = seeded_backend(3);
    let (client, _handle) = spawn_actor(backend.clone());

    let result = PageContainer::mount(client, AuthContext::anonymous(), unit_columns(), 10).await;

    assert!(matches!(result, Err(QueryError::Forbidden { .. })));
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn test_navigation_requests_one_based_pages() {
    let backend = seeded_backend(23);
    let (client, _handle) = spawn_actor(backend.clone());
    let mut page = PageContainer::mount(client, admin(), unit_columns(), 10)
        .await
        .unwrap();
    page.wait_until_settled().await.unwrap();

    page.next_page().await.unwrap();
    assert_eq!(page.page(), 2);
    // The previous rows stay on screen while page 2 loads.
    assert_eq!(page.render().rows.len(), 10);
    page.wait_until_settled().await.unwrap();
    assert_eq!(page.render().rows[0][1], "Unit 11");

    page.go_to_page(2).await.unwrap();
    page.wait_until_settled().await.unwrap();
    let last = page.render();
    assert_eq!(last.rows.len(), 3);
    assert!(!last.pager.can_next);

    // Clamped: already on the last page.
    page.next_page().await.unwrap();
    assert_eq!(page.page(), 3);

    let pages: Vec<String> = backend
        .calls()
        .iter()
        .filter_map(|call| call.params.iter().find(|(k, _)| k == "page").map(|(_, v)| v.clone()))
        .collect();
    assert_eq!(pages, vec!["1", "2", "3"]);
}

#[tokio::test]
async fn test_search_resets_to_the_first_page() {
    let backend = seeded_backend(23);
    let (client, _handle) = spawn_actor(backend.clone());
    let mut page = PageContainer::mount(client, admin(), unit_columns(), 10)
        .await
        .unwrap();
    page.wait_until_settled().await.unwrap();
    page.go_to_page(2).await.unwrap();
    page.wait_until_settled().await.unwrap();

    page.search_for("unit 2").await.unwrap();
    assert_eq!(page.query(), ListQuery::new(1, 10, "unit 2"));
    page.wait_until_settled().await.unwrap();

    let rendered = page.render();
    // Unit 20 through Unit 23.
    assert_eq!(rendered.rows.len(), 4);
    assert_eq!(rendered.pager.total_pages, 1);
    assert_eq!(page.table().search_text(), "unit 2");
}

#[tokio::test]
async fn test_revisiting_a_page_is_served_from_cache() {
    let backend = seeded_backend(23);
    let (client, _handle) = spawn_actor(backend.clone());
    let mut page = PageContainer::mount(client, admin(), unit_columns(), 10)
        .await
        .unwrap();
    page.wait_until_settled().await.unwrap();

    page.handle(TableEvent::PageChange(1)).await.unwrap();
    page.wait_until_settled().await.unwrap();
    page.handle(TableEvent::PageChange(0)).await.unwrap();

    // Page 1 is fresh, so its rows are applied without waiting.
    assert_eq!(page.render().rows[0][1], "Unit 01");
    assert!(!page.render().is_fetching);
    assert_eq!(backend.call_count(HttpMethod::Get, "units"), 2);
}

#[tokio::test]
async fn test_delete_refetches_and_steps_back_from_an_emptied_page() {
    let backend = seeded_backend(11);
    let (client, _handle) = spawn_actor(backend.clone());
    let mut page = PageContainer::mount(client, admin(), unit_columns(), 10)
        .await
        .unwrap();
    page.wait_until_settled().await.unwrap();
    page.next_page().await.unwrap();
    page.wait_until_settled().await.unwrap();
    assert_eq!(page.render().rows, vec![vec!["11", "Unit 11", "Active"]]);

    page.delete(11).await.unwrap();
    page.wait_until_settled().await.unwrap();

    assert_eq!(page.page(), 1);
    let rendered = page.render();
    assert_eq!(rendered.rows.len(), 10);
    assert_eq!(rendered.pager.total_pages, 1);

    let notices = page.take_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Success);
    assert_eq!(notices[0].message, "Deleted successfully");
}

#[tokio::test]
async fn test_permission_guard_blocks_without_a_request() {
    let mock = Arc::new(MockTransport::new());
    mock.expect_get("units")
        .return_ok(list_body(vec![json!({ "id": 1, "name": "Box" })], 1, 1, 10));
    let (client, _handle) = spawn_actor(mock.clone());

    let mut page = PageContainer::mount(client, viewer(), unit_columns(), 10)
        .await
        .unwrap();
    page.wait_until_settled().await.unwrap();
    assert!(!page.can(PermissionAction::Delete));

    let result = page.delete(1).await;
    assert_eq!(
        result,
        Err(QueryError::Forbidden {
            resource: "units".to_string(),
            action: PermissionAction::Delete,
        })
    );
    let created = page
        .create(UnitCreate {
            name: "Crate".to_string(),
        })
        .await;
    assert!(created.is_err());

    let notices = page.take_notices();
    assert_eq!(notices.len(), 2);
    assert!(notices.iter().all(|n| n.level == NoticeLevel::Error));
    assert_eq!(notices[0].message, "Permission denied: cannot delete units");

    assert_eq!(mock.calls().len(), 1);
    mock.verify();
}

#[tokio::test]
async fn test_rejection_becomes_an_error_notice_and_keeps_rows() {
    let mock = Arc::new(MockTransport::new());
    mock.expect_get("units")
        .return_ok(list_body(vec![json!({ "id": 1, "name": "Box" })], 1, 1, 10));
    mock.expect_send(HttpMethod::Put, "units/1")
        .return_ok(rejection_body("Unit is used by 4 products"));
    let (client, _handle) = spawn_actor(mock.clone());

    let mut page = PageContainer::mount(client, admin(), unit_columns(), 10)
        .await
        .unwrap();
    page.wait_until_settled().await.unwrap();

    let update = UnitUpdate {
        name: Some("Crate".to_string()),
        ..UnitUpdate::default()
    };
    let result = page.update(1, update).await;

    assert_eq!(
        result,
        Err(QueryError::Rejected("Unit is used by 4 products".to_string()))
    );
    assert_eq!(
        page.take_notices(),
        vec![query_framework::Notice {
            level: NoticeLevel::Error,
            message: "Unit is used by 4 products".to_string(),
        }]
    );
    assert_eq!(page.render().rows, vec![vec!["1", "Box", "Inactive"]]);
    mock.verify();
}

#[tokio::test]
async fn test_create_success_uses_a_default_message_when_the_server_sends_none() {
    let mock = Arc::new(MockTransport::new());
    mock.expect_get("units").return_ok(list_body(vec![], 0, 1, 10));
    mock.expect_send(HttpMethod::Post, "units")
        .return_ok(mutation_body("", Some(json!({ "id": 1, "name": "Box" }))));
    mock.expect_get("units")
        .return_ok(list_body(vec![json!({ "id": 1, "name": "Box" })], 1, 1, 10));
    let (client, _handle) = spawn_actor(mock.clone());

    let mut page = PageContainer::mount(client, admin(), unit_columns(), 10)
        .await
        .unwrap();
    page.wait_until_settled().await.unwrap();
    assert!(page.render().empty);

    let created = page
        .create(UnitCreate {
            name: "Box".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(created.map(|u| u.id), Some(1));
    page.wait_until_settled().await.unwrap();

    assert_eq!(page.render().rows.len(), 1);
    assert_eq!(page.take_notices()[0].message, "Unit created");
    mock.verify();
}

#[tokio::test]
async fn test_listing_errors_are_reported_once_and_rows_survive() {
    let backend = seeded_backend(2);
    let (client, _handle) = spawn_actor(backend.clone());
    let mut page = PageContainer::mount(client.clone(), admin(), unit_columns(), 10)
        .await
        .unwrap();
    page.wait_until_settled().await.unwrap();

    backend.fail_next(QueryError::Transport("connection refused".to_string()));
    client.invalidate().await.unwrap();
    page.wait_until_settled().await.unwrap();
    page.sync();

    let notices = page.take_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].message, "Request failed: connection refused");
    assert_eq!(page.render().rows.len(), 2);
}

#[tokio::test]
async fn test_each_failed_page_raises_its_own_notice() {
    let mock = Arc::new(MockTransport::new());
    let rows = (1..=10)
        .map(|i| json!({ "id": i, "name": format!("Unit {i:02}") }))
        .collect();
    mock.expect_get("units").return_ok(list_body(rows, 30, 1, 10));
    mock.expect_get("units")
        .return_err(QueryError::Http { status: 500 });
    mock.expect_get("units")
        .return_err(QueryError::Http { status: 500 });
    let (client, _handle) = spawn_actor(mock.clone());
    let mut page = PageContainer::mount(client, admin(), unit_columns(), 10)
        .await
        .unwrap();
    page.wait_until_settled().await.unwrap();
    assert!(page.take_notices().is_empty());

    page.next_page().await.unwrap();
    page.wait_until_settled().await.unwrap();
    let notices = page.take_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].message, "API returned status: 500");

    page.next_page().await.unwrap();
    page.wait_until_settled().await.unwrap();
    assert_eq!(page.page(), 3);
    let notices = page.take_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Error);
    assert_eq!(notices[0].message, "API returned status: 500");
    mock.verify();
}

#[tokio::test]
async fn test_two_screens_on_the_same_listing_share_one_fetch() {
    let backend = seeded_backend(12);
    let (client, _handle) = spawn_actor(backend.clone());
    backend.hold();

    let mut first = PageContainer::mount(client.clone(), admin(), unit_columns(), 10)
        .await
        .unwrap();
    let mut second = PageContainer::mount(client.clone(), viewer(), unit_columns(), 10)
        .await
        .unwrap();
    wait_for_list_calls(&backend, 1).await;

    let stats = client.stats().await.unwrap();
    assert_eq!(stats.subscribers, 2);
    assert_eq!(stats.in_flight, 1);

    backend.release();
    first.wait_until_settled().await.unwrap();
    second.wait_until_settled().await.unwrap();

    assert_eq!(first.render().rows, second.render().rows);
    assert_eq!(first.render().rows.len(), 10);
    assert_eq!(backend.call_count(HttpMethod::Get, Unit::PATH), 1);
    assert_eq!(client.stats().await.unwrap().fetches, 1);
}

#[tokio::test]
async fn test_row_toggles_follow_the_rows_on_screen() {
    let backend = seeded_backend(3);
    let (client, _handle) = spawn_actor(backend.clone());
    let mut page = PageContainer::mount(client, admin(), unit_columns(), 10)
        .await
        .unwrap();
    page.wait_until_settled().await.unwrap();

    assert!(page.toggle_row(2));
    assert!(page.toggle_row(3));
    assert!(page.is_row_on(&2));

    page.delete(2).await.unwrap();
    page.wait_until_settled().await.unwrap();

    assert!(!page.is_row_on(&2));
    assert!(page.is_row_on(&3));
}
