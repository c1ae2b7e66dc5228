// src/web/handlers.rs
use crate::config::ConfigManager;
use crate::pipeline;
use crate::types::SearchProfile;
use crate::web::types::*;

use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use rocket::State;
use tracing::{error, info};

/// Runs the whole scrape-and-filter pipeline for one profile. Internal
/// errors are logged in full; the client only ever sees a generic
/// message.
pub async fn process_jobs_handler(
    profile: Json<SearchProfile>,
    config: &State<ConfigManager>,
) -> Result<Json<RelevantJobsResponse>, Custom<Json<ErrorResponse>>> {
    let profile = profile.into_inner();
    info!(
        "Processing job search: position='{}', location='{}'",
        profile.position, profile.location
    );

    match pipeline::process_jobs(config, &profile).await {
        Ok(relevant_jobs) => {
            info!("Returning {} relevant jobs", relevant_jobs.len());
            Ok(Json(RelevantJobsResponse { relevant_jobs }))
        }
        Err(e) => {
            error!("Job processing failed: {:#}", e);
            Err(Custom(
                Status::InternalServerError,
                Json(ErrorResponse::new(
                    "An error occurred during job processing.",
                )),
            ))
        }
    }
}

pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK".to_string(),
        service: "jobscout".to_string(),
    })
}
