//! Integration tests for project persistence and per-user scoping.

use sqlx::PgPool;
use taskforge_db::models::project::{CreateProject, UpdateProject};
use taskforge_db::models::task::CreateTask;
use taskforge_db::models::user::CreateUser;
use taskforge_db::repositories::{ProjectRepo, TaskRepo, UserRepo};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn anonymous_user(pool: &PgPool) -> i64 {
    UserRepo::create(
        pool,
        &CreateUser {
            email: None,
            password_hash: None,
            is_anonymous: true,
        },
    )
    .await
    .unwrap()
    .id
}

fn new_project(name: &str) -> CreateProject {
    CreateProject {
        name: name.to_string(),
        description: None,
    }
}

fn new_task(title: &str) -> CreateTask {
    CreateTask {
        title: title.to_string(),
        description: String::new(),
        status: None,
        priority: None,
        estimated_hours: None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_returns_newest_first(pool: PgPool) {
    let user = anonymous_user(&pool).await;
    let first = ProjectRepo::create(&pool, user, &new_project("First"))
        .await
        .unwrap();
    let second = ProjectRepo::create(&pool, user, &new_project("Second"))
        .await
        .unwrap();

    let projects = ProjectRepo::list_for_user(&pool, user).await.unwrap();
    let ids: Vec<i64> = projects.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![second.id, first.id]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_other_users_project_is_invisible(pool: PgPool) {
    let owner = anonymous_user(&pool).await;
    let stranger = anonymous_user(&pool).await;
    let project = ProjectRepo::create(&pool, owner, &new_project("Private"))
        .await
        .unwrap();

    assert!(ProjectRepo::find_for_user(&pool, stranger, project.id)
        .await
        .unwrap()
        .is_none());
    assert!(ProjectRepo::list_for_user(&pool, stranger)
        .await
        .unwrap()
        .is_empty());

    let update = UpdateProject {
        name: Some("Hijacked".into()),
        description: None,
    };
    assert!(ProjectRepo::update(&pool, stranger, project.id, &update)
        .await
        .unwrap()
        .is_none());
    assert!(!ProjectRepo::delete(&pool, stranger, project.id).await.unwrap());

    let still_there = ProjectRepo::find_for_user(&pool, owner, project.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(still_there.name, "Private");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_partial_update_keeps_other_fields(pool: PgPool) {
    let user = anonymous_user(&pool).await;
    let project = ProjectRepo::create(
        &pool,
        user,
        &CreateProject {
            name: "Blog".into(),
            description: Some("Markdown blog".into()),
        },
    )
    .await
    .unwrap();

    let updated = ProjectRepo::update(
        &pool,
        user,
        project.id,
        &UpdateProject {
            name: Some("Tech Blog".into()),
            description: None,
        },
    )
    .await
    .unwrap()
    .unwrap();

    assert_eq!(updated.name, "Tech Blog");
    assert_eq!(updated.description.as_deref(), Some("Markdown blog"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_delete_cascades_to_tasks(pool: PgPool) {
    let user = anonymous_user(&pool).await;
    let project = ProjectRepo::create(&pool, user, &new_project("Doomed"))
        .await
        .unwrap();
    let tasks = TaskRepo::create_many(&pool, project.id, &[new_task("a"), new_task("b")])
        .await
        .unwrap();

    assert!(ProjectRepo::delete(&pool, user, project.id).await.unwrap());

    assert!(ProjectRepo::list_for_user(&pool, user)
        .await
        .unwrap()
        .iter()
        .all(|p| p.id != project.id));
    assert!(TaskRepo::list_for_project(&pool, project.id)
        .await
        .unwrap()
        .is_empty());
    assert!(TaskRepo::find_for_user(&pool, user, tasks[0].id)
        .await
        .unwrap()
        .is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_blank_name_rejected_by_constraint(pool: PgPool) {
    let user = anonymous_user(&pool).await;
    let result = ProjectRepo::create(&pool, user, &new_project("   ")).await;
    assert!(result.is_err(), "blank project name should violate the check");
}
