use super::*;

use std::io::{Cursor, Write};

use zip::ZipWriter;
use zip::write::SimpleFileOptions;

const DEFAULT_PROJECT_LIMIT: u32 = 20;

#[get("/api/projects")]
pub async fn list_projects_handler(
    pool: web::Data<SqlitePool>,
    query: web::Query<ListProjectsQuery>,
) -> impl Responder {
    let limit = query.limit.unwrap_or(DEFAULT_PROJECT_LIMIT);

    match db::list_projects(limit, pool.get_ref()).await {
        Ok(projects) => {
            log::info!("Got {} project records", projects.len());
            HttpResponse::Ok().json(projects)
        }
        Err(e) => {
            log::error!("Failed to list projects: {e}");
            HttpResponse::InternalServerError().json(ErrorResponse {
                reason: "ERR_INTERNAL",
                code: 6,
            })
        }
    }
}

#[get("/api/projects/{id}")]
pub async fn get_project_handler(
    pool: web::Data<SqlitePool>,
    path: web::Path<(String,)>,
) -> impl Responder {
    let project_id = path.into_inner().0;

    let project = match db::fetch_project(&project_id, pool.get_ref()).await {
        Ok(project) => project,
        Err(StoreError::NotFound) => {
            return HttpResponse::NotFound().json(ErrorResponseWithMessage {
                reason: "ERR_NOT_FOUND",
                code: 3,
                message: format!("Project {project_id} not found."),
            });
        }
        Err(e) => {
            log::error!("Failed to fetch project {project_id}: {e}");
            return HttpResponse::InternalServerError().json(ErrorResponse {
                reason: "ERR_INTERNAL",
                code: 6,
            });
        }
    };

    match db::list_files(&project_id, pool.get_ref()).await {
        Ok(files) => HttpResponse::Ok().json(ProjectWithFiles { project, files }),
        Err(e) => {
            log::error!("Failed to list files of project {project_id}: {e}");
            HttpResponse::InternalServerError().json(ErrorResponse {
                reason: "ERR_INTERNAL",
                code: 6,
            })
        }
    }
}

#[get("/api/projects/{id}/download")]
pub async fn download_project_handler(
    pool: web::Data<SqlitePool>,
    path: web::Path<(String,)>,
) -> impl Responder {
    let project_id = path.into_inner().0;

    let project = match db::fetch_project(&project_id, pool.get_ref()).await {
        Ok(project) => project,
        Err(StoreError::NotFound) => {
            return HttpResponse::NotFound().json(ErrorResponseWithMessage {
                reason: "ERR_NOT_FOUND",
                code: 3,
                message: format!("Project {project_id} not found."),
            });
        }
        Err(e) => {
            log::error!("Failed to fetch project {project_id}: {e}");
            return HttpResponse::InternalServerError().json(ErrorResponse {
                reason: "ERR_INTERNAL",
                code: 6,
            });
        }
    };

    let files = match db::archive_files(&project_id, pool.get_ref()).await {
        Ok(files) => files,
        Err(e) => {
            log::error!("Failed to collect files of project {project_id}: {e}");
            return HttpResponse::InternalServerError().json(ErrorResponse {
                reason: "ERR_INTERNAL",
                code: 6,
            });
        }
    };

    match build_archive(&files) {
        Ok(bytes) => {
            log::info!(
                "Archived {} files of project {project_id} ({} bytes)",
                files.len(),
                bytes.len()
            );
            HttpResponse::Ok()
                .content_type("application/zip")
                .insert_header((
                    "Content-Disposition",
                    format!("attachment; filename=\"{}.zip\"", project.name),
                ))
                .body(bytes)
        }
        Err(e) => {
            log::error!("Failed to archive project {project_id}: {e}");
            HttpResponse::InternalServerError().json(ErrorResponse {
                reason: "ERR_INTERNAL",
                code: 6,
            })
        }
    }
}

/// Writes every non-folder node at its recorded path.
fn build_archive(files: &[FileRecord]) -> anyhow::Result<Vec<u8>> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    for file in files {
        writer.start_file(file.path.as_str(), options)?;
        writer.write_all(file.content.as_deref().unwrap_or_default().as_bytes())?;
    }

    Ok(writer.finish()?.into_inner())
}
