use super::*;

#[put("/api/projects/{project_id}/files/{file_id}")]
pub async fn update_file_handler(
    pool: web::Data<SqlitePool>,
    path: web::Path<(String, String)>,
    body: web::Json<UpdateFileRequest>,
) -> impl Responder {
    let (project_id, file_id) = path.into_inner();
    let request = body.into_inner();

    match db::update_file(
        &project_id,
        &file_id,
        &request.content,
        request.path.as_deref(),
        pool.get_ref(),
    )
    .await
    {
        Ok(file) => {
            log::debug!("Updated {} in project {project_id}", file.path);
            HttpResponse::Ok().json(file)
        }
        Err(StoreError::NotFound) => HttpResponse::NotFound().json(ErrorResponseWithMessage {
            reason: "ERR_NOT_FOUND",
            code: 3,
            message: format!("File {file_id} not found."),
        }),
        Err(e) => {
            log::error!("Failed to update file {file_id} in project {project_id}: {e}");
            HttpResponse::InternalServerError().json(ErrorResponse {
                reason: "ERR_INTERNAL",
                code: 6,
            })
        }
    }
}
