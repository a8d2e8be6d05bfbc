use std::fs;
use std::sync::atomic::{AtomicU32, Ordering};

use actix_web::{App, test, web};
use pretty_assertions::assert_eq;
use serde_json::json;
use sqlx::sqlite::SqlitePool;

use codebench::database as db;
use codebench::routes::{
    create_file_handler, create_project_handler, delete_file_handler, download_project_handler,
    get_project_handler, json_error_handler, list_projects_handler, update_file_handler,
};

// Global counter to ensure unique test database names
static TEST_DB_COUNTER: AtomicU32 = AtomicU32::new(0);

// Helper function to create isolated test database
async fn create_test_db() -> (SqlitePool, String) {
    let test_id = TEST_DB_COUNTER.fetch_add(1, Ordering::SeqCst);
    let db_path = std::env::temp_dir()
        .join(format!("codebench_test_{}.db", test_id))
        .display()
        .to_string();

    // Remove existing test database if it exists
    let _ = fs::remove_file(&db_path);

    let db_pool = db::init_db(&db_path).await.unwrap();

    (db_pool, db_path)
}

// Test guard that ensures cleanup on drop
struct TestDbGuard {
    db_path: String,
}

impl TestDbGuard {
    fn new(db_path: String) -> Self {
        Self { db_path }
    }
}

impl Drop for TestDbGuard {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.db_path);
        let _ = fs::remove_file(format!("{}-wal", self.db_path));
        let _ = fs::remove_file(format!("{}-shm", self.db_path));
    }
}

macro_rules! project_app {
    ($pool:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($pool.clone()))
                .app_data(web::JsonConfig::default().error_handler(json_error_handler))
                .service(create_project_handler)
                .service(list_projects_handler)
                .service(download_project_handler)
                .service(get_project_handler)
                .service(create_file_handler)
                .service(update_file_handler)
                .service(delete_file_handler),
        )
        .await
    };
}

/// Creates a project through the API and returns its id.
macro_rules! create_project {
    ($app:expr, $name:expr) => {{
        let req = test::TestRequest::post()
            .uri("/api/projects")
            .set_json(json!({ "name": $name, "description": "integration fixture" }))
            .to_request();
        let resp = test::call_service(&$app, req).await;
        assert_eq!(resp.status(), 200);
        let body: serde_json::Value = test::read_body_json(resp).await;
        body["id"].as_str().unwrap().to_string()
    }};
}

/// Creates a file or folder and returns the raw service response.
macro_rules! create_file {
    ($app:expr, $project_id:expr, $path:expr, $is_folder:expr) => {{
        let content = if $is_folder {
            serde_json::Value::Null
        } else {
            json!("content")
        };
        let req = test::TestRequest::post()
            .uri(&format!("/api/projects/{}/files", $project_id))
            .set_json(json!({
                "path": $path,
                "content": content,
                "is_folder": $is_folder
            }))
            .to_request();
        test::call_service(&$app, req).await
    }};
}

/// Fetches the project and returns its files as (path, is_folder) pairs in
/// listing order.
macro_rules! list_paths {
    ($app:expr, $project_id:expr) => {{
        let req = test::TestRequest::get()
            .uri(&format!("/api/projects/{}", $project_id))
            .to_request();
        let resp = test::call_service(&$app, req).await;
        assert_eq!(resp.status(), 200);
        let body: serde_json::Value = test::read_body_json(resp).await;
        body["files"]
            .as_array()
            .unwrap()
            .iter()
            .map(|f| {
                (
                    f["path"].as_str().unwrap().to_string(),
                    f["is_folder"].as_bool().unwrap(),
                )
            })
            .collect::<Vec<_>>()
    }};
}

#[actix_web::test]
async fn test_create_project_seeds_default_layout() {
    let (db_pool, db_path) = create_test_db().await;
    let _guard = TestDbGuard::new(db_path);
    let app = project_app!(db_pool);

    let project_id = create_project!(app, "demo");
    let files = list_paths!(app, project_id);

    // Folders first, then files lexicographically by path
    assert_eq!(
        files,
        vec![
            ("src".to_string(), true),
            ("README.md".to_string(), false),
            ("src/index.js".to_string(), false),
        ]
    );
}

#[actix_web::test]
async fn test_create_project_requires_name() {
    let (db_pool, db_path) = create_test_db().await;
    let _guard = TestDbGuard::new(db_path);
    let app = project_app!(db_pool);

    let req = test::TestRequest::post()
        .uri("/api/projects")
        .set_json(json!({ "name": "   " }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["reason"], "ERR_INVALID_ARGUMENT");
    assert_eq!(body["code"], 1);

    // Missing field entirely is rejected by the payload handler
    let req = test::TestRequest::post()
        .uri("/api/projects")
        .set_json(json!({ "description": "no name" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
}

#[actix_web::test]
async fn test_duplicate_path_is_rejected_within_one_project_only() {
    let (db_pool, db_path) = create_test_db().await;
    let _guard = TestDbGuard::new(db_path);
    let app = project_app!(db_pool);

    let first = create_project!(app, "first");
    let second = create_project!(app, "second");

    let resp = create_file!(app, first, "notes.md", false);
    assert_eq!(resp.status(), 200);

    let resp = create_file!(app, first, "notes.md", false);
    assert_eq!(resp.status(), 400);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["reason"], "ERR_DUPLICATE_PATH");
    assert_eq!(body["code"], 4);

    // The identical path in a different project succeeds
    let resp = create_file!(app, second, "notes.md", false);
    assert_eq!(resp.status(), 200);
}

#[actix_web::test]
async fn test_create_file_in_unknown_project_is_not_found() {
    let (db_pool, db_path) = create_test_db().await;
    let _guard = TestDbGuard::new(db_path);
    let app = project_app!(db_pool);

    let resp = create_file!(app, "missing", "notes.md", false);
    assert_eq!(resp.status(), 404);
}

#[actix_web::test]
async fn test_folder_delete_cascades_by_path_prefix() {
    let (db_pool, db_path) = create_test_db().await;
    let _guard = TestDbGuard::new(db_path);
    let app = project_app!(db_pool);

    let project_id = create_project!(app, "cascade");

    let resp = create_file!(app, project_id, "docs", true);
    assert_eq!(resp.status(), 200);
    let folder: serde_json::Value = test::read_body_json(resp).await;
    let folder_id = folder["id"].as_str().unwrap().to_string();

    for (path, is_folder) in [
        ("docs/a.md", false),
        ("docs/sub", true),
        ("docs/sub/b.md", false),
        // Shares the string prefix but not the folder boundary; must survive
        ("docs-notes.md", false),
    ] {
        let resp = create_file!(app, project_id, path, is_folder);
        assert_eq!(resp.status(), 200);
    }

    let req = test::TestRequest::delete()
        .uri(&format!("/api/projects/{project_id}/files/{folder_id}"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["deleted"], 4); // the folder itself + three descendants

    let remaining: Vec<String> = list_paths!(app, project_id)
        .into_iter()
        .map(|(path, _)| path)
        .collect();
    assert!(remaining.contains(&"docs-notes.md".to_string()));
    assert!(!remaining.iter().any(|p| p.starts_with("docs/")));
    assert!(!remaining.contains(&"docs".to_string()));
}

#[actix_web::test]
async fn test_update_file_content_and_missing_file() {
    let (db_pool, db_path) = create_test_db().await;
    let _guard = TestDbGuard::new(db_path);
    let app = project_app!(db_pool);

    let project_id = create_project!(app, "edit");

    let resp = create_file!(app, project_id, "main.py", false);
    assert_eq!(resp.status(), 200);
    let file: serde_json::Value = test::read_body_json(resp).await;
    let file_id = file["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::put()
        .uri(&format!("/api/projects/{project_id}/files/{file_id}"))
        .set_json(json!({ "content": "print('updated')" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let updated: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(updated["content"], "print('updated')");
    // Path untouched when the request omits it
    assert_eq!(updated["path"], "main.py");

    let req = test::TestRequest::put()
        .uri(&format!("/api/projects/{project_id}/files/nonexistent"))
        .set_json(json!({ "content": "whatever" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["reason"], "ERR_NOT_FOUND");
    assert_eq!(body["code"], 3);
}

#[actix_web::test]
async fn test_get_unknown_project_is_not_found() {
    let (db_pool, db_path) = create_test_db().await;
    let _guard = TestDbGuard::new(db_path);
    let app = project_app!(db_pool);

    let req = test::TestRequest::get()
        .uri("/api/projects/does-not-exist")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["reason"], "ERR_NOT_FOUND");
}

#[actix_web::test]
async fn test_list_projects_most_recently_updated_first() {
    let (db_pool, db_path) = create_test_db().await;
    let _guard = TestDbGuard::new(db_path);
    let app = project_app!(db_pool);

    let older = create_project!(app, "older");
    let newer = create_project!(app, "newer");

    // Touch the older project so it floats back to the top
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let resp = create_file!(app, older, "bump.txt", false);
    assert_eq!(resp.status(), 200);

    let req = test::TestRequest::get().uri("/api/projects").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = test::read_body_json(resp).await;
    let ids: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec![older.as_str(), newer.as_str()]);
}

#[actix_web::test]
async fn test_download_archives_every_file_at_its_path() {
    let (db_pool, db_path) = create_test_db().await;
    let _guard = TestDbGuard::new(db_path);
    let app = project_app!(db_pool);

    let project_id = create_project!(app, "bundle");
    let resp = create_file!(app, project_id, "src/extra.js", false);
    assert_eq!(resp.status(), 200);

    let req = test::TestRequest::get()
        .uri(&format!("/api/projects/{project_id}/download"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    assert_eq!(
        resp.headers().get("content-type").unwrap(),
        "application/zip"
    );

    let bytes = test::read_body(resp).await;
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes.to_vec())).unwrap();

    let mut names: Vec<String> = (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect();
    names.sort();

    // Every non-folder node at its recorded path; the folder itself is absent
    assert_eq!(
        names,
        vec![
            "README.md".to_string(),
            "src/extra.js".to_string(),
            "src/index.js".to_string(),
        ]
    );
}
