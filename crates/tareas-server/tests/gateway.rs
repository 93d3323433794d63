mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;

use serde_json::json;
use uuid::Uuid;

use common::MemoryStore;
use tareas_server::store::{TaskGateway, COMMENTS_TABLE, TASKS_TABLE};
use tareas_shared::api::CreateTaskRequest;
use tareas_shared::{TaskPriority, TaskStatus};

fn setup() -> (TaskGateway, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    (TaskGateway::new(store.clone()), store)
}

#[tokio::test]
async fn list_normalizes_labels_and_defaults_missing_fields() {
    let (gateway, store) = setup();
    store.seed(
        TASKS_TABLE,
        json!({
            "Titulo": "Revisar contrato",
            "Estado": "En_progreso",
            "Prioridad": "Alta",
            "Fecha de creación": "2024-03-02T09:00:00Z"
        }),
    );
    store.seed(
        TASKS_TABLE,
        json!({
            "Titulo": "Sin estado",
            "Fecha de creación": "2024-03-01T09:00:00Z"
        }),
    );

    let tasks = gateway.list_tasks().await.unwrap();
    assert_eq!(tasks.len(), 2);

    // Newest first
    assert_eq!(tasks[0].title, "Revisar contrato");
    assert_eq!(tasks[0].status, TaskStatus::EnProgreso);
    assert_eq!(tasks[0].priority, TaskPriority::Alta);

    // Missing labels fall back to pendiente / media
    assert_eq!(tasks[1].status, TaskStatus::Pendiente);
    assert_eq!(tasks[1].priority, TaskPriority::Media);
    assert!(tasks[1].assigned_to.is_empty());
    assert_eq!(tasks[1].created_by, "");
}

#[tokio::test]
async fn create_then_get_round_trips_exactly() {
    let (gateway, _store) = setup();

    let req = CreateTaskRequest {
        title: "X".into(),
        status: Some(TaskStatus::Pendiente),
        priority: Some(TaskPriority::Alta),
        ..Default::default()
    };
    let created = gateway.create_task(&req, "Marta").await.unwrap();
    assert!(!created.id.is_empty());

    let fetched = gateway.get_task(&created.id).await.unwrap();
    assert_eq!(fetched.title, "X");
    assert_eq!(fetched.status, TaskStatus::Pendiente);
    assert_eq!(fetched.priority, TaskPriority::Alta);
    assert_eq!(fetched.created_by, "Marta");
}

#[tokio::test]
async fn status_update_leaves_other_fields_alone() {
    let (gateway, store) = setup();
    let id = store.seed(
        TASKS_TABLE,
        json!({
            "Titulo": "Llamar al cliente",
            "Estado": "Pendiente",
            "Prioridad": "Baja",
            "Asignado A": ["Ana"]
        }),
    );

    let update = tareas_shared::api::UpdateTaskRequest {
        status: Some(TaskStatus::Completada),
        ..Default::default()
    };
    let updated = gateway.update_task(&id, &update).await.unwrap();
    assert_eq!(updated.status, TaskStatus::Completada);
    assert_eq!(updated.title, "Llamar al cliente");
    assert_eq!(updated.priority, TaskPriority::Baja);
    assert_eq!(updated.assigned_to, vec!["Ana"]);

    let fetched = gateway.get_task(&id).await.unwrap();
    assert_eq!(fetched.status, TaskStatus::Completada);
}

#[tokio::test]
async fn add_comment_appends_one_reference_and_lists_newest_first() {
    let (gateway, store) = setup();
    let task_id = store.seed(TASKS_TABLE, json!({ "Titulo": "Con hilo" }));
    let author = Uuid::new_v4();

    let first = gateway
        .add_comment(&task_id, "primero", author, "Ana", false)
        .await
        .unwrap();
    let second = gateway
        .add_comment(&task_id, "segundo", author, "Ana", true)
        .await
        .unwrap();

    let task = gateway.get_task(&task_id).await.unwrap();
    assert_eq!(task.comments.len(), 2);
    // Hydration preserves reference-list (insertion) order
    assert_eq!(task.comments[0].id, first.id);
    assert_eq!(task.comments[1].id, second.id);

    // The stored reference list grew by exactly one per comment
    let record = store.record(TASKS_TABLE, &task_id).unwrap();
    let refs = record.fields["Comentarios"].as_array().unwrap();
    assert_eq!(refs.len(), 2);

    // The comment query endpoint orders newest first
    let listed = gateway.list_comments(&task_id).await.unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].id, second.id);
    assert!(listed[0].voice);
    assert_eq!(listed[1].id, first.id);
}

#[tokio::test]
async fn failed_link_step_leaves_orphaned_comment() {
    let (gateway, store) = setup();
    let task_id = store.seed(TASKS_TABLE, json!({ "Titulo": "Huérfano" }));
    store.fail_task_updates.store(true, Ordering::SeqCst);

    let result = gateway
        .add_comment(&task_id, "perdido", Uuid::new_v4(), "Ana", false)
        .await;
    assert!(result.is_err());

    // The comment record was persisted...
    assert_eq!(store.table_len(COMMENTS_TABLE), 1);
    // ...and is reachable by direct comment fetch...
    let listed = gateway.list_comments(&task_id).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].content, "perdido");
    // ...but the task's reference list never saw it.
    let task = gateway.get_task(&task_id).await.unwrap();
    assert!(task.comments.is_empty());
}

#[tokio::test]
async fn member_name_resolves_from_team_directory() {
    let (gateway, store) = setup();
    store.seed(
        "Equipo",
        json!({ "email": "ana@example.com", "name": "Ana María" }),
    );

    let name = gateway.member_name("ana@example.com").await.unwrap();
    assert_eq!(name.as_deref(), Some("Ana María"));

    let missing = gateway.member_name("nadie@example.com").await.unwrap();
    assert!(missing.is_none());
}
