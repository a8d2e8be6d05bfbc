use super::*;

#[post("/api/projects")]
pub async fn create_project_handler(
    pool: web::Data<SqlitePool>,
    body: web::Json<CreateProjectRequest>,
) -> impl Responder {
    let request = body.into_inner();

    if request.name.trim().is_empty() {
        return HttpResponse::BadRequest().json(ErrorResponseWithMessage {
            reason: "ERR_INVALID_ARGUMENT",
            code: 1,
            message: "Project name is required".to_string(),
        });
    }

    match db::create_project(&request.name, &request.description, pool.get_ref()).await {
        Ok(project) => {
            log::info!("Created project {} ({})", project.id, project.name);
            HttpResponse::Ok().json(project)
        }
        Err(e) => {
            log::error!("Failed to create project: {e}");
            HttpResponse::InternalServerError().json(ErrorResponse {
                reason: "ERR_INTERNAL",
                code: 6,
            })
        }
    }
}

#[post("/api/projects/{id}/files")]
pub async fn create_file_handler(
    pool: web::Data<SqlitePool>,
    path: web::Path<(String,)>,
    body: web::Json<CreateFileRequest>,
) -> impl Responder {
    let project_id = path.into_inner().0;
    let request = body.into_inner();

    // Paths are '/'-delimited with no leading slash
    if request.path.is_empty() || request.path.starts_with('/') {
        return HttpResponse::BadRequest().json(ErrorResponseWithMessage {
            reason: "ERR_INVALID_ARGUMENT",
            code: 1,
            message: "File path is required and must not start with '/'".to_string(),
        });
    }

    match db::create_file(&project_id, &request, pool.get_ref()).await {
        Ok(file) => {
            log::info!("Created {} in project {project_id}", file.path);
            HttpResponse::Ok().json(file)
        }
        Err(StoreError::DuplicatePath(path)) => {
            HttpResponse::BadRequest().json(ErrorResponseWithMessage {
                reason: "ERR_DUPLICATE_PATH",
                code: 4,
                message: format!("A file or folder already exists at {path}"),
            })
        }
        Err(StoreError::NotFound) => HttpResponse::NotFound().json(ErrorResponseWithMessage {
            reason: "ERR_NOT_FOUND",
            code: 3,
            message: format!("Project {project_id} not found."),
        }),
        Err(e) => {
            log::error!("Failed to create file in project {project_id}: {e}");
            HttpResponse::InternalServerError().json(ErrorResponse {
                reason: "ERR_INTERNAL",
                code: 6,
            })
        }
    }
}
