use actix_cors::Cors;
use actix_web::{web, App, HttpResponse, HttpServer, Result as ActixResult};
use assessmatch_core::{Error, RecommendationRecord};
use assessmatch_storage::IndexManager;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};

#[derive(Deserialize)]
struct RecommendRequest {
    #[serde(default)]
    job_description: Option<String>,
    top_n: Option<usize>,
}

#[derive(Serialize)]
struct RecommendResponse {
    success: bool,
    recommendations: Vec<RecommendationRecord>,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    model_loaded: bool,
}

pub struct RestApi;

impl RestApi {
    pub async fn start(
        manager: Arc<IndexManager>,
        port: u16,
    ) -> std::io::Result<()> {
        info!("REST API listening on 0.0.0.0:{}", port);
        HttpServer::new(move || {
            let cors = Cors::default()
                .allow_any_origin()
                .allow_any_method()
                .allow_any_header()
                .max_age(3600);

            App::new()
                .wrap(cors)
                .app_data(web::Data::new(manager.clone()))
                .configure(Self::configure)
        })
        .bind(("0.0.0.0", port))?
        .run()
        .await
    }

    /// Register the API routes. Expects `web::Data<Arc<IndexManager>>` in app data.
    pub fn configure(cfg: &mut web::ServiceConfig) {
        cfg.route("/api/recommend", web::post().to(recommend))
            .route("/api/health", web::get().to(health));
    }
}

fn error_body(message: impl Into<String>) -> serde_json::Value {
    serde_json::json!({ "error": message.into() })
}

async fn recommend(
    manager: web::Data<Arc<IndexManager>>,
    req: web::Json<RecommendRequest>,
) -> ActixResult<HttpResponse> {
    let req = req.into_inner();
    let job_description = match req.job_description.as_deref() {
        Some(text) if !text.trim().is_empty() => text,
        _ => {
            return Ok(HttpResponse::BadRequest().json(error_body("No job description provided")));
        }
    };

    match manager.recommend(job_description, req.top_n) {
        Ok(recommendations) => Ok(HttpResponse::Ok().json(RecommendResponse {
            success: true,
            recommendations,
        })),
        Err(e) if e.is_recoverable() => {
            let mut response = match e {
                Error::EmptyQuery => HttpResponse::BadRequest(),
                _ => HttpResponse::ServiceUnavailable(),
            };
            Ok(response.json(error_body(e.to_string())))
        }
        Err(e) => {
            error!("Recommendation failed: {}", e);
            Ok(HttpResponse::InternalServerError().json(error_body(e.to_string())))
        }
    }
}

async fn health(manager: web::Data<Arc<IndexManager>>) -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(HealthResponse {
        status: "healthy",
        model_loaded: manager.is_loaded(),
    }))
}
