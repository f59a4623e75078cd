//! HTTP-level tests for task listing, batch creation, updates and deletion.

mod common;

use axum::http::StatusCode;
use common::{
    anonymous_token, body_json, create_project, delete_auth, get_auth, patch_json_auth,
    post_json_auth, put_json_auth,
};
use sqlx::PgPool;

async fn create_tasks(
    pool: &PgPool,
    token: &str,
    project_id: i64,
    body: serde_json::Value,
) -> Vec<serde_json::Value> {
    let response = post_json_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/projects/{project_id}/tasks"),
        token,
        body,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await.as_array().unwrap().clone()
}

async fn list_tasks(pool: &PgPool, token: &str, project_id: i64) -> Vec<serde_json::Value> {
    let response = get_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/projects/{project_id}/tasks"),
        token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await.as_array().unwrap().clone()
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn batches_continue_order_from_current_count(pool: PgPool) {
    let token = anonymous_token(&pool).await;
    let project = create_project(&pool, &token, "Shop", None).await;

    let first = create_tasks(
        &pool,
        &token,
        project,
        serde_json::json!([{ "title": "A" }, { "title": "B" }]),
    )
    .await;
    let second = create_tasks(
        &pool,
        &token,
        project,
        serde_json::json!([{ "title": "C" }, { "title": "D" }, { "title": "E" }]),
    )
    .await;

    let orders: Vec<i64> = first
        .iter()
        .chain(&second)
        .map(|t| t["order"].as_i64().unwrap())
        .collect();
    assert_eq!(orders, vec![0, 1, 2, 3, 4]);

    let titles: Vec<String> = list_tasks(&pool, &token, project)
        .await
        .iter()
        .map(|t| t["title"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(titles, vec!["A", "B", "C", "D", "E"]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn created_tasks_get_defaults(pool: PgPool) {
    let token = anonymous_token(&pool).await;
    let project = create_project(&pool, &token, "Shop", None).await;

    let tasks = create_tasks(&pool, &token, project, serde_json::json!([{ "title": " Plan " }])).await;
    assert_eq!(tasks[0]["title"], "Plan");
    assert_eq!(tasks[0]["status"], "todo");
    assert_eq!(tasks[0]["priority"], "medium");
    assert_eq!(tasks[0]["description"], "");
    assert!(tasks[0]["estimated_hours"].is_null());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn batch_rejects_invalid_entries(pool: PgPool) {
    let token = anonymous_token(&pool).await;
    let project = create_project(&pool, &token, "Shop", None).await;
    let uri = format!("/api/v1/projects/{project}/tasks");

    for body in [
        serde_json::json!([]),
        serde_json::json!([{ "title": "" }]),
        serde_json::json!([{ "title": "Ok", "estimated_hours": -2 }]),
    ] {
        let response =
            post_json_auth(common::build_test_app(pool.clone()), &uri, &token, body).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    let response = post_json_auth(
        common::build_test_app(pool.clone()),
        &uri,
        &token,
        serde_json::json!([{ "title": "Ok", "status": "blocked" }]),
    )
    .await;
    assert!(response.status().is_client_error());

    assert!(list_tasks(&pool, &token, project).await.is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn status_update_leaves_other_fields_unchanged(pool: PgPool) {
    let token = anonymous_token(&pool).await;
    let project = create_project(&pool, &token, "Shop", None).await;
    let tasks = create_tasks(
        &pool,
        &token,
        project,
        serde_json::json!([{ "title": "Ship", "description": "Deploy it", "priority": "high", "estimated_hours": 3.5 }]),
    )
    .await;
    let before = tasks[0].clone();
    let id = before["id"].as_i64().unwrap();

    let response = patch_json_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/tasks/{id}/status"),
        &token,
        serde_json::json!({ "status": "done" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let after = list_tasks(&pool, &token, project).await.remove(0);
    assert_eq!(after["status"], "done");
    for field in ["id", "project_id", "title", "description", "priority", "order", "estimated_hours"] {
        assert_eq!(after[field], before[field], "{field} changed");
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn any_status_transition_is_allowed(pool: PgPool) {
    let token = anonymous_token(&pool).await;
    let project = create_project(&pool, &token, "Shop", None).await;
    let tasks = create_tasks(&pool, &token, project, serde_json::json!([{ "title": "Loop" }])).await;
    let uri = format!("/api/v1/tasks/{}/status", tasks[0]["id"]);

    for status in ["done", "todo", "in-progress", "done", "in-progress", "todo"] {
        let response = patch_json_auth(
            common::build_test_app(pool.clone()),
            &uri,
            &token,
            serde_json::json!({ "status": status }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], status);
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn partial_update_changes_only_given_fields(pool: PgPool) {
    let token = anonymous_token(&pool).await;
    let project = create_project(&pool, &token, "Shop", None).await;
    let tasks = create_tasks(
        &pool,
        &token,
        project,
        serde_json::json!([{ "title": "Draft", "priority": "low" }]),
    )
    .await;
    let id = tasks[0]["id"].as_i64().unwrap();

    let response = put_json_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/tasks/{id}"),
        &token,
        serde_json::json!({ "title": "Final", "estimated_hours": 2 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["title"], "Final");
    assert_eq!(json["estimated_hours"], 2.0);
    assert_eq!(json["priority"], "low");
    assert_eq!(json["status"], "todo");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn other_user_cannot_touch_tasks(pool: PgPool) {
    let owner = anonymous_token(&pool).await;
    let intruder = anonymous_token(&pool).await;
    let project = create_project(&pool, &owner, "Mine", None).await;
    let tasks = create_tasks(&pool, &owner, project, serde_json::json!([{ "title": "Secret" }])).await;
    let id = tasks[0]["id"].as_i64().unwrap();

    let response = get_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/projects/{project}/tasks"),
        &intruder,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = patch_json_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/tasks/{id}/status"),
        &intruder,
        serde_json::json!({ "status": "done" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = delete_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/tasks/{id}"),
        &intruder,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let remaining = list_tasks(&pool, &owner, project).await;
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0]["status"], "todo");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn delete_removes_task(pool: PgPool) {
    let token = anonymous_token(&pool).await;
    let project = create_project(&pool, &token, "Shop", None).await;
    let tasks = create_tasks(
        &pool,
        &token,
        project,
        serde_json::json!([{ "title": "Keep" }, { "title": "Drop" }]),
    )
    .await;
    let id = tasks[1]["id"].as_i64().unwrap();

    let response = delete_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/tasks/{id}"),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = delete_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/tasks/{id}"),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let remaining = list_tasks(&pool, &token, project).await;
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0]["title"], "Keep");
}
