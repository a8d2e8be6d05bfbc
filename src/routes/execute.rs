use actix_web::{HttpResponse, Responder, get, post, web};
use serde::{Deserialize, Serialize};

use super::ErrorResponse;
use crate::config::LanguageProfile;
use crate::engine::EngineClient;

#[derive(Serialize, Deserialize, Debug)]
pub struct ExecutionRequest {
    pub language: String,
    pub code: String,
    #[serde(default)]
    pub stdin: String,
    #[serde(default)]
    pub args: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct ExecutionResult {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
    pub signal: Option<String>,
}

impl ExecutionResult {
    /// The shape every engine/transport failure collapses into; callers
    /// never see a raw engine error.
    pub fn engine_failure(diagnostic: impl Into<String>) -> Self {
        Self {
            success: false,
            stdout: String::new(),
            stderr: diagnostic.into(),
            exit_code: 1,
            signal: None,
        }
    }
}

#[post("/api/execute")]
pub async fn execute_handler(
    engine: web::Data<EngineClient>,
    body: web::Json<ExecutionRequest>,
) -> impl Responder {
    let request = body.into_inner();

    if request.language.is_empty() || request.code.is_empty() {
        return HttpResponse::BadRequest().json(ErrorResponse {
            reason: "ERR_INVALID_ARGUMENT",
            code: 1,
        });
    }

    let result = engine.execute(&request).await;
    log::info!(
        "Executed {} submission: success={}",
        request.language,
        result.success
    );

    HttpResponse::Ok().json(result)
}

#[get("/api/execute/runtimes")]
pub async fn get_runtimes_handler(engine: web::Data<EngineClient>) -> impl Responder {
    match engine.runtimes().await {
        Ok(runtimes) => HttpResponse::Ok().json(runtimes),
        Err(e) => {
            log::error!("Failed to fetch engine runtimes: {e}");
            HttpResponse::BadGateway().json(ErrorResponse {
                reason: "ERR_EXTERNAL",
                code: 5,
            })
        }
    }
}

#[get("/api/languages")]
pub async fn get_languages_handler(
    languages: web::Data<Vec<LanguageProfile>>,
) -> impl Responder {
    HttpResponse::Ok().json(languages.as_ref())
}
