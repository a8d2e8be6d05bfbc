use std::fs;
use std::path::{Path, PathBuf};

use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use thiserror::Error;
use uuid::Uuid;

use crate::routes::{CreateFileRequest, FileRecord, ProjectRecord};

const DATABASE_NAME: &str = "codebench.sqlite3";

/// Failures of the path-addressed filesystem store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("no record matches the given id")]
    NotFound,

    #[error("path already exists in this project: {0}")]
    DuplicatePath(String),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

pub fn get_db_path() -> PathBuf {
    use directories::ProjectDirs;

    let proj_dirs = ProjectDirs::from("", "", "codebench").expect("Unable to find user directory");
    let data_dir = proj_dirs.data_local_dir();

    fs::create_dir_all(data_dir).expect("Failed to create local data dir");

    data_dir.join(DATABASE_NAME)
}

pub async fn init_db(db_path: impl AsRef<Path>) -> sqlx::Result<SqlitePool> {
    let db_url = format!("sqlite://{}?mode=rwc", db_path.as_ref().display()); // rwc = read/write/create
    let db_pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(0) // Allow pool to shrink when idle
        .connect(&db_url)
        .await?;

    // Execute PRAGMA statements first (these cannot be run inside a transaction)
    for pragma_sql in &[
        "PRAGMA foreign_keys = ON;",
        "PRAGMA busy_timeout = 2000;", // 2 seconds timeout for lock contention
        "PRAGMA journal_mode = WAL;",  // Write-Ahead Logging for better concurrency
        "PRAGMA synchronous = NORMAL;", // Balance between safety and performance
    ] {
        sqlx::query(pragma_sql).execute(&db_pool).await?;
    }

    let mut tx = db_pool.begin().await?;

    for sql in &[
        r"
        CREATE TABLE IF NOT EXISTS projects (
            id            TEXT  PRIMARY KEY,
            name          TEXT  NOT NULL,
            description   TEXT  NOT NULL DEFAULT '',
            created_at    TEXT  NOT NULL,
            updated_at    TEXT  NOT NULL
        );",
        r"
        CREATE TABLE IF NOT EXISTS project_files (
            id            TEXT     PRIMARY KEY,
            project_id    TEXT     NOT NULL,
            path          TEXT     NOT NULL,
            content       TEXT,
            is_folder     INTEGER  NOT NULL DEFAULT 0,
            parent_path   TEXT,
            created_at    TEXT     NOT NULL,
            updated_at    TEXT     NOT NULL,
            FOREIGN KEY (project_id) REFERENCES projects (id) ON DELETE CASCADE,
            UNIQUE (project_id, path)
        );",
        "CREATE INDEX IF NOT EXISTS idx_project_files_project ON project_files (project_id);",
    ] {
        sqlx::query(sql).execute(tx.as_mut()).await?;
    }

    tx.commit().await?;

    log::info!("Initialized database at {}", db_path.as_ref().display());

    Ok(db_pool)
}

pub fn remove_db(db_path: impl AsRef<Path>) {
    // Remove WAL and SHM files (ignore errors as they might not exist)
    let wal_path = format!("{}-wal", db_path.as_ref().display());
    let shm_path = format!("{}-shm", db_path.as_ref().display());
    let _ = fs::remove_file(wal_path);
    let _ = fs::remove_file(shm_path);

    if let Err(e) = std::fs::remove_file(&db_path) {
        log::warn!(
            "Unable to remove database at {}: {e}",
            db_path.as_ref().display()
        );
    } else {
        log::info!("Removed database at {}", db_path.as_ref().display());
    }
}

fn new_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Canonical layout seeded into every new project so it is immediately
/// runnable: a source folder, a starter script, and a README derived from
/// the project metadata.
fn seed_files(name: &str, description: &str) -> [(&'static str, Option<String>, bool, Option<&'static str>); 3] {
    let readme_body = if description.is_empty() {
        "A new project"
    } else {
        description
    };

    [
        ("src", None, true, None),
        (
            "src/index.js",
            Some("// Start coding here\nconsole.log(\"Hello, World!\");".to_string()),
            false,
            Some("src"),
        ),
        (
            "README.md",
            Some(format!("# {name}\n\n{readme_body}")),
            false,
            None,
        ),
    ]
}

/// Creates a project together with its default file layout in one
/// transaction.
pub async fn create_project(
    name: &str,
    description: &str,
    pool: &SqlitePool,
) -> Result<ProjectRecord, StoreError> {
    let now = crate::create_timestamp();
    let id = new_id();

    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        INSERT INTO projects (id, name, description, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(name)
    .bind(description)
    .bind(&now)
    .bind(&now)
    .execute(tx.as_mut())
    .await?;

    for (path, content, is_folder, parent_path) in seed_files(name, description) {
        sqlx::query(
            r#"
            INSERT INTO project_files (id, project_id, path, content, is_folder, parent_path, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(new_id())
        .bind(&id)
        .bind(path)
        .bind(content)
        .bind(is_folder)
        .bind(parent_path)
        .bind(&now)
        .bind(&now)
        .execute(tx.as_mut())
        .await?;
    }

    tx.commit().await?;

    Ok(ProjectRecord {
        id,
        name: name.to_string(),
        description: description.to_string(),
        created_at: now.clone(),
        updated_at: now,
    })
}

pub async fn fetch_project(id: &str, pool: &SqlitePool) -> Result<ProjectRecord, StoreError> {
    sqlx::query_as::<_, ProjectRecord>(
        r#"
        SELECT id, name, description, created_at, updated_at
        FROM projects
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(StoreError::NotFound)
}

/// Most recently updated projects first.
pub async fn list_projects(limit: u32, pool: &SqlitePool) -> sqlx::Result<Vec<ProjectRecord>> {
    sqlx::query_as::<_, ProjectRecord>(
        r#"
        SELECT id, name, description, created_at, updated_at
        FROM projects
        ORDER BY updated_at DESC
        LIMIT ?
        "#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await
}

/// Folders first, then lexicographically by path. The tree builder consumes
/// this ordering directly; it is a contract, not an accident.
pub async fn list_files(project_id: &str, pool: &SqlitePool) -> sqlx::Result<Vec<FileRecord>> {
    sqlx::query_as::<_, FileRecord>(
        r#"
        SELECT id, project_id, path, content, is_folder, parent_path, created_at, updated_at
        FROM project_files
        WHERE project_id = ?
        ORDER BY is_folder DESC, path ASC
        "#,
    )
    .bind(project_id)
    .fetch_all(pool)
    .await
}

/// Non-folder nodes ordered by path, for the archive download.
pub async fn archive_files(project_id: &str, pool: &SqlitePool) -> sqlx::Result<Vec<FileRecord>> {
    sqlx::query_as::<_, FileRecord>(
        r#"
        SELECT id, project_id, path, content, is_folder, parent_path, created_at, updated_at
        FROM project_files
        WHERE project_id = ? AND is_folder = 0
        ORDER BY path ASC
        "#,
    )
    .bind(project_id)
    .fetch_all(pool)
    .await
}

pub async fn create_file(
    project_id: &str,
    request: &CreateFileRequest,
    pool: &SqlitePool,
) -> Result<FileRecord, StoreError> {
    let now = crate::create_timestamp();
    let id = new_id();

    // Folders never carry content; files default to empty
    let content = if request.is_folder {
        None
    } else {
        Some(request.content.clone().unwrap_or_default())
    };

    let mut tx = pool.begin().await?;

    let inserted = sqlx::query(
        r#"
        INSERT INTO project_files (id, project_id, path, content, is_folder, parent_path, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(project_id)
    .bind(&request.path)
    .bind(&content)
    .bind(request.is_folder)
    .bind(&request.parent_path)
    .bind(&now)
    .bind(&now)
    .execute(tx.as_mut())
    .await;

    if let Err(e) = inserted {
        if let Some(db_err) = e.as_database_error() {
            if db_err.is_unique_violation() {
                return Err(StoreError::DuplicatePath(request.path.clone()));
            }
            if db_err.is_foreign_key_violation() {
                return Err(StoreError::NotFound);
            }
        }
        return Err(e.into());
    }

    touch_project(project_id, &now, tx.as_mut()).await?;
    tx.commit().await?;

    Ok(FileRecord {
        id,
        project_id: project_id.to_string(),
        path: request.path.clone(),
        content,
        is_folder: request.is_folder,
        parent_path: request.parent_path.clone(),
        created_at: now.clone(),
        updated_at: now,
    })
}

/// Updates a file's content (and path, when one is provided) and returns the
/// record as stored.
pub async fn update_file(
    project_id: &str,
    file_id: &str,
    content: &str,
    path: Option<&str>,
    pool: &SqlitePool,
) -> Result<FileRecord, StoreError> {
    let now = crate::create_timestamp();

    let mut tx = pool.begin().await?;

    let result = match path {
        Some(path) => {
            sqlx::query(
                r#"
                UPDATE project_files
                SET content = ?, path = ?, updated_at = ?
                WHERE id = ? AND project_id = ?
                "#,
            )
            .bind(content)
            .bind(path)
            .bind(&now)
            .bind(file_id)
            .bind(project_id)
            .execute(tx.as_mut())
            .await?
        }
        None => {
            sqlx::query(
                r#"
                UPDATE project_files
                SET content = ?, updated_at = ?
                WHERE id = ? AND project_id = ?
                "#,
            )
            .bind(content)
            .bind(&now)
            .bind(file_id)
            .bind(project_id)
            .execute(tx.as_mut())
            .await?
        }
    };

    if result.rows_affected() == 0 {
        return Err(StoreError::NotFound);
    }

    touch_project(project_id, &now, tx.as_mut()).await?;

    let record = sqlx::query_as::<_, FileRecord>(
        r#"
        SELECT id, project_id, path, content, is_folder, parent_path, created_at, updated_at
        FROM project_files
        WHERE id = ? AND project_id = ?
        "#,
    )
    .bind(file_id)
    .bind(project_id)
    .fetch_one(tx.as_mut())
    .await?;

    tx.commit().await?;

    Ok(record)
}

/// Deletes a file, or a folder together with every node whose path starts
/// with `folder.path + "/"`. Returns the number of deleted records.
pub async fn delete_file(
    project_id: &str,
    file_id: &str,
    pool: &SqlitePool,
) -> Result<u64, StoreError> {
    let now = crate::create_timestamp();

    let mut tx = pool.begin().await?;

    let target = sqlx::query_as::<_, (String, bool)>(
        r#"
        SELECT path, is_folder FROM project_files
        WHERE id = ? AND project_id = ?
        "#,
    )
    .bind(file_id)
    .bind(project_id)
    .fetch_optional(tx.as_mut())
    .await?;

    let Some((path, is_folder)) = target else {
        return Err(StoreError::NotFound);
    };

    let mut deleted = sqlx::query(
        r#"
        DELETE FROM project_files WHERE id = ? AND project_id = ?
        "#,
    )
    .bind(file_id)
    .bind(project_id)
    .execute(tx.as_mut())
    .await?
    .rows_affected();

    if is_folder {
        // Plain string-prefix match; LIKE would treat % and _ in the folder
        // path as wildcards.
        let prefix = format!("{path}/");
        deleted += sqlx::query(
            r#"
            DELETE FROM project_files
            WHERE project_id = ? AND substr(path, 1, length(?)) = ?
            "#,
        )
        .bind(project_id)
        .bind(&prefix)
        .bind(&prefix)
        .execute(tx.as_mut())
        .await?
        .rows_affected();
    }

    touch_project(project_id, &now, tx.as_mut()).await?;
    tx.commit().await?;

    Ok(deleted)
}

async fn touch_project(
    project_id: &str,
    now: &str,
    executor: &mut sqlx::SqliteConnection,
) -> sqlx::Result<()> {
    sqlx::query("UPDATE projects SET updated_at = ? WHERE id = ?")
        .bind(now)
        .bind(project_id)
        .execute(executor)
        .await?;
    Ok(())
}
