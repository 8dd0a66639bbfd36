// src/routes.rs
use std::convert::Infallible;
use std::sync::Arc;

use log::{error, info};
use warp::reject::Rejection;
use warp::{Filter, Reply};

use crate::config::AppConfig;
use crate::handlers::error::ApiError;
use crate::handlers::{dashboard, download, summarize};

// Recovery handling for our custom errors
async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let code;
    let message;

    if err.is_not_found() {
        code = warp::http::StatusCode::NOT_FOUND;
        message = "Not Found";
    } else if let Some(api_error) = err.find::<ApiError>() {
        code = api_error.status();
        message = api_error.message.as_str();
    } else if err.find::<warp::reject::InvalidQuery>().is_some() {
        code = warp::http::StatusCode::BAD_REQUEST;
        message = "Invalid query string";
    } else {
        error!("Unhandled rejection: {:?}", err);
        code = warp::http::StatusCode::INTERNAL_SERVER_ERROR;
        message = "Internal Server Error";
    }

    Ok(warp::reply::with_status(
        warp::reply::json(&serde_json::json!({
            "error": message,
        })),
        code,
    ))
}

pub fn routes(
    cfg: Arc<AppConfig>,
) -> impl Filter<Extract = impl Reply, Error = Infallible> + Clone {
    info!("Configuring routes...");

    let cfg_filter = warp::any().map(move || cfg.clone());

    let summarize_route = warp::path!("api" / "v1" / "summarize" / String)
        .and(warp::get())
        .and(cfg_filter.clone())
        .and_then(summarize::summarize);

    let download_route = warp::path!("api" / "v1" / "download" / String)
        .and(warp::get())
        .and(cfg_filter.clone())
        .and_then(download::download);

    let dashboard_route = warp::path!("api" / "v1" / "financials" / String / "dashboard")
        .and(warp::get())
        .and(warp::query::<dashboard::DashboardQuery>())
        .and(cfg_filter.clone())
        .and_then(dashboard::dashboard);

    info!("All routes configured successfully.");

    summarize_route
        .or(download_route)
        .or(dashboard_route)
        .recover(handle_rejection)
}
