use actix_web::{App, HttpServer, dev::Server, middleware, web};
use sqlx::sqlite::SqlitePool;

use crate::config::Config;
use crate::engine::EngineClient;
use crate::routes::{
    create_file_handler, create_project_handler, delete_file_handler, download_project_handler,
    execute_handler, get_languages_handler, get_project_handler, get_runtimes_handler,
    json_error_handler, list_projects_handler, query_error_handler, update_file_handler,
};

pub fn build_server(config: Config, db_pool: SqlitePool) -> std::io::Result<Server> {
    let Config {
        server: server_config,
        engine: engine_config,
        languages,
    } = config;

    let engine = web::Data::new(EngineClient::new(&engine_config, languages.clone()));
    let languages = web::Data::new(languages);
    let db_pool = web::Data::new(db_pool);

    let server = HttpServer::new(move || {
        App::new()
            .app_data(db_pool.clone())
            .app_data(engine.clone())
            .app_data(languages.clone())
            .app_data(web::JsonConfig::default().error_handler(json_error_handler))
            .app_data(web::QueryConfig::default().error_handler(query_error_handler))
            .wrap(middleware::Logger::default())
            .service(execute_handler)
            .service(get_runtimes_handler)
            .service(get_languages_handler)
            .service(create_project_handler)
            .service(list_projects_handler)
            .service(download_project_handler)
            .service(get_project_handler)
            .service(create_file_handler)
            .service(update_file_handler)
            .service(delete_file_handler)
    })
    .bind((
        server_config
            .bind_address
            .unwrap_or("127.0.0.1".to_string()),
        server_config.bind_port.unwrap_or(3001),
    ))?
    .run();

    Ok(server)
}
