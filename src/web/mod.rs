// src/web/mod.rs

pub mod handlers;
pub mod types;

pub use types::*;

use crate::config::ConfigManager;
use anyhow::Result;
use rocket::fairing::{Fairing, Info, Kind};
use rocket::http::{Header, Status};
use rocket::serde::json::Json;
use rocket::{catchers, get, options, post, response::status::Custom, routes, Request, Response, State};
use tracing::info;

// CORS Fairing
pub struct Cors;

#[rocket::async_trait]
impl Fairing for Cors {
    fn info(&self) -> Info {
        Info {
            name: "Add CORS headers to responses",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, _request: &'r Request<'_>, response: &mut Response<'r>) {
        response.set_header(Header::new("Access-Control-Allow-Origin", "*"));
        response.set_header(Header::new(
            "Access-Control-Allow-Methods",
            "POST, GET, OPTIONS",
        ));
        response.set_header(Header::new("Access-Control-Allow-Headers", "*"));
        response.set_header(Header::new("Access-Control-Allow-Credentials", "true"));
    }
}

#[post("/process_jobs", data = "<profile>")]
pub async fn process_jobs(
    profile: Json<crate::types::SearchProfile>,
    config: &State<ConfigManager>,
) -> Result<Json<RelevantJobsResponse>, Custom<Json<ErrorResponse>>> {
    handlers::process_jobs_handler(profile, config).await
}

#[get("/health")]
pub async fn health() -> Json<HealthResponse> {
    handlers::health_handler().await
}

#[options("/<_..>")]
pub async fn options() -> Status {
    Status::Ok
}

// Error catchers
#[rocket::catch(400)]
pub fn bad_request() -> Json<ErrorResponse> {
    Json(ErrorResponse::new(
        "Invalid request format. Check the search profile JSON.",
    ))
}

#[rocket::catch(422)]
pub fn unprocessable() -> Json<ErrorResponse> {
    Json(ErrorResponse::new(
        "Search profile is missing required fields.",
    ))
}

#[rocket::catch(500)]
pub fn internal_error() -> Json<ErrorResponse> {
    Json(ErrorResponse::new(
        "An error occurred during job processing.",
    ))
}

// Main server start function
pub async fn start_web_server(config: ConfigManager) -> Result<()> {
    info!("Starting job aggregation API server");
    info!("Matches file: {}", config.output.matches_path.display());

    let _rocket = rocket::build()
        .attach(Cors)
        .manage(config)
        .register("/", catchers![bad_request, unprocessable, internal_error])
        .mount("/", routes![process_jobs, health, options])
        .launch()
        .await?;

    Ok(())
}
