//! End-to-end tests for the business object endpoints.

use reqwest::StatusCode;
use serde_json::{Value, json};

#[path = "test_utils/mod.rs"]
mod test_utils;
use test_utils::{mint_token, spawn_test_app, test_config};

#[tokio::test]
async fn create_then_list_is_scoped_per_tenant() {
    let app = spawn_test_app(test_config()).await;
    let t1 = mint_token("u1", "t1");
    let t2 = mint_token("u2", "t2");

    let created = app.create_object(&t1, "Invoice Workflow", "workflow").await;
    assert_eq!(created["tenant_id"], "t1");
    assert_eq!(created["created_by"], "u1");
    assert_eq!(created["status"], "pending");
    assert_eq!(created["complexity"], "low");
    assert_eq!(created["is_active"], true);

    let page: Value = app.get_as(&t1, "/objects/").await.json().await.unwrap();
    assert_eq!(page["total"], 1);
    assert_eq!(page["page"], 1);
    assert_eq!(page["size"], 100);
    assert_eq!(page["pages"], 1);
    assert_eq!(page["items"][0]["name"], "Invoice Workflow");

    let page: Value = app.get_as(&t2, "/objects/").await.json().await.unwrap();
    assert_eq!(page["total"], 0);
    assert_eq!(page["items"], json!([]));
    assert_eq!(page["pages"], 0);

    app.handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn foreign_object_reads_as_not_found() {
    let app = spawn_test_app(test_config()).await;
    let t1 = mint_token("u1", "t1");
    let t2 = mint_token("u2", "t2");

    let created = app.create_object(&t1, "Private", "process").await;
    let path = format!("/objects/{}", created["id"].as_str().unwrap());

    let response = app.get_as(&t1, &path).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.get_as(&t2, &path).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        response.headers()["content-type"],
        "application/problem+json"
    );
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["detail"], "Business object not found");
    assert_eq!(body["code"], "NOT_FOUND");

    let response = app.put_as(&t2, &path, json!({"name": "stolen"})).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.delete_as(&t2, &path).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn partial_update_changes_only_given_fields() {
    let app = spawn_test_app(test_config()).await;
    let token = mint_token("u1", "t1");

    let response = app
        .post_as(
            &token,
            "/objects/",
            json!({
                "name": "Payroll",
                "type": "process",
                "description": "monthly run",
                "complexity": "high",
                "tags": "hr,finance"
            }),
        )
        .await;
    let created: Value = response.json().await.unwrap();
    let path = format!("/objects/{}", created["id"].as_str().unwrap());

    let response = app.put_as(&token, &path, json!({"owner": "x"})).await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated: Value = response.json().await.unwrap();

    assert_eq!(updated["owner"], "x");
    for field in ["name", "type", "description", "complexity", "tags", "created_at"] {
        assert_eq!(updated[field], created[field], "{field} changed");
    }

    let response = app.put_as(&token, &path, json!({"description": null})).await;
    let cleared: Value = response.json().await.unwrap();
    assert_eq!(cleared["description"], Value::Null);
    assert_eq!(cleared["owner"], "x");
}

#[tokio::test]
async fn delete_twice_returns_not_found_the_second_time() {
    let app = spawn_test_app(test_config()).await;
    let token = mint_token("u1", "t1");

    let created = app.create_object(&token, "Doomed", "report").await;
    let path = format!("/objects/{}", created["id"].as_str().unwrap());

    let response = app.delete_as(&token, &path).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Business object deleted successfully");

    let response = app.delete_as(&token, &path).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.get_as(&token, &path).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let page: Value = app.get_as(&token, "/objects/").await.json().await.unwrap();
    assert_eq!(page["total"], 0);
}

#[tokio::test]
async fn list_supports_search_filters_and_paging() {
    let app = spawn_test_app(test_config()).await;
    let token = mint_token("u1", "t1");

    for i in 0..5 {
        app.create_object(&token, &format!("Invoice report {i}"), "report")
            .await;
    }
    app.create_object(&token, "Payroll", "workflow").await;

    let page: Value = app
        .get_as(&token, "/objects/?search=INVOICE&limit=2&skip=2")
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(page["total"], 5);
    assert_eq!(page["items"].as_array().unwrap().len(), 2);
    assert_eq!(page["page"], 2);
    assert_eq!(page["pages"], 3);

    let page: Value = app
        .get_as(&token, "/objects?type_filter=workflow")
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(page["total"], 1);
    assert_eq!(page["items"][0]["name"], "Payroll");

    let page: Value = app
        .get_as(&token, "/objects/?status_filter=active")
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(page["total"], 0);
}

#[tokio::test]
async fn invalid_queries_and_bodies_are_unprocessable() {
    let app = spawn_test_app(test_config()).await;
    let token = mint_token("u1", "t1");

    for query in [
        "/objects/?limit=0",
        "/objects/?limit=101",
        "/objects/?skip=-1",
        "/objects/?type_filter=bogus",
        "/objects/?status_filter=archived",
    ] {
        let response = app.get_as(&token, query).await;
        assert_eq!(
            response.status(),
            StatusCode::UNPROCESSABLE_ENTITY,
            "{query}"
        );
    }

    let response = app
        .post_as(&token, "/objects/", json!({"name": "x", "type": "spreadsheet"}))
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "VALIDATION_FAILED");

    let response = app
        .post_as(&token, "/objects/", json!({"name": "  ", "type": "workflow"}))
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let response = app.get_as(&token, "/objects/not-a-uuid").await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn responses_carry_trace_id() {
    let app = spawn_test_app(test_config()).await;
    let token = mint_token("u1", "t1");

    let response = app
        .client
        .get(app.api("/objects/00000000-0000-0000-0000-000000000000"))
        .bearer_auth(&token)
        .header("x-trace-id", "trace-abc")
        .send()
        .await
        .unwrap();

    assert_eq!(response.headers()["x-trace-id"], "trace-abc");
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["trace_id"], "trace-abc");
}
