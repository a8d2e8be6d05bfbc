mod delete;
mod get;
mod post;
mod put;

pub use delete::delete_file_handler;
pub use get::{download_project_handler, get_project_handler, list_projects_handler};
pub use post::{create_file_handler, create_project_handler};
pub use put::update_file_handler;

use actix_web::{HttpResponse, Responder, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqlitePool;

use super::{ErrorResponse, ErrorResponseWithMessage};
use crate::database as db;
use crate::database::StoreError;

#[derive(Serialize, Deserialize, Debug, sqlx::FromRow)]
pub struct ProjectRecord {
    pub id: String,
    pub name: String,
    pub description: String,
    pub created_at: String,
    pub updated_at: String,
}

/// A path-addressed record: a file when `content` is present, a folder when
/// it is null.
#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct FileRecord {
    pub id: String,
    pub project_id: String,
    pub path: String,
    pub content: Option<String>,
    pub is_folder: bool,
    pub parent_path: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Serialize, Debug)]
pub struct ProjectWithFiles {
    #[serde(flatten)]
    pub project: ProjectRecord,
    pub files: Vec<FileRecord>,
}

#[derive(Deserialize, Debug)]
pub struct CreateProjectRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Deserialize, Debug)]
pub struct CreateFileRequest {
    pub path: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub is_folder: bool,
    #[serde(default)]
    pub parent_path: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct UpdateFileRequest {
    pub content: String,
    #[serde(default)]
    pub path: Option<String>,
}

#[derive(Serialize, Debug)]
pub struct DeleteFileResponse {
    pub deleted: u64,
}

#[derive(Deserialize)]
pub struct ListProjectsQuery {
    pub limit: Option<u32>,
}
