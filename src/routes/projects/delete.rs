use super::*;

#[delete("/api/projects/{project_id}/files/{file_id}")]
pub async fn delete_file_handler(
    pool: web::Data<SqlitePool>,
    path: web::Path<(String, String)>,
) -> impl Responder {
    let (project_id, file_id) = path.into_inner();

    match db::delete_file(&project_id, &file_id, pool.get_ref()).await {
        Ok(deleted) => {
            log::info!("Deleted {deleted} record(s) from project {project_id}");
            HttpResponse::Ok().json(DeleteFileResponse { deleted })
        }
        Err(StoreError::NotFound) => HttpResponse::NotFound().json(ErrorResponseWithMessage {
            reason: "ERR_NOT_FOUND",
            code: 3,
            message: format!("File {file_id} not found."),
        }),
        Err(e) => {
            log::error!("Failed to delete file {file_id} from project {project_id}: {e}");
            HttpResponse::InternalServerError().json(ErrorResponse {
                reason: "ERR_INTERNAL",
                code: 6,
            })
        }
    }
}
