use askama::Template;
use askama_axum::IntoResponse as AskamaTemplateResponse;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use chrono::Local;

use crate::{
    error::AppError,
    models::{ride::RideRecord, ride_form::RideDraft, stats::RideStats},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(dashboard))
        .route("/rides", post(ride_submit))
        .route("/rides/new", get(ride_new_form))
        .route("/rides/:id/delete", post(ride_delete))
}

#[derive(Clone)]
struct RideRow {
    id: i64,
    date: String,
    has_location: bool,
    location: String,
    distance: String,
    duration: String,
    avg_speed: String,
}

impl From<RideRecord> for RideRow {
    fn from(ride: RideRecord) -> Self {
        Self {
            id: ride.id,
            date: ride.date_text(),
            has_location: ride.has_location(),
            distance: ride.distance_text(),
            duration: ride.duration_text(),
            avg_speed: ride.avg_speed_text(),
            location: ride.location,
        }
    }
}

#[derive(Template)]
#[template(path = "dashboard.html")]
struct DashboardTemplate {
    ride_count: usize,
    total_distance: String,
    total_time: String,
    average_speed: String,
    rides: Vec<RideRow>,
}

async fn dashboard(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let rides = state.store.rides().await;
    let stats = RideStats::from_rides(&rides);
    Ok(AskamaTemplateResponse::into_response(DashboardTemplate {
        ride_count: stats.ride_count,
        total_distance: stats.total_distance_text(),
        total_time: stats.total_time_text(),
        average_speed: stats.average_speed_text(),
        rides: rides.into_iter().map(RideRow::from).collect(),
    }))
}

#[derive(Template)]
#[template(path = "ride_new.html")]
struct RideNewTemplate {
    draft: RideDraft,
    show_error: bool,
    error_message: String,
}

async fn ride_new_form() -> impl IntoResponse {
    AskamaTemplateResponse::into_response(RideNewTemplate {
        draft: RideDraft::new(Local::now().date_naive()),
        show_error: false,
        error_message: String::new(),
    })
}

async fn ride_submit(
    State(state): State<AppState>,
    Form(draft): Form<RideDraft>,
) -> Result<Response, AppError> {
    match state.store.submit(draft.clone()).await {
        Ok(_) => Ok(Redirect::to("/").into_response()),
        Err(AppError::InvalidRide(err)) => Ok(render_form_error(draft, err.to_string())),
        Err(err) => Err(err),
    }
}

fn render_form_error(draft: RideDraft, message: String) -> Response {
    (
        StatusCode::BAD_REQUEST,
        AskamaTemplateResponse::into_response(RideNewTemplate {
            draft,
            show_error: true,
            error_message: message,
        }),
    )
        .into_response()
}

async fn ride_delete(
    State(state): State<AppState>,
    Path(ride_id): Path<i64>,
) -> Result<Redirect, AppError> {
    state.store.remove(ride_id).await?;
    Ok(Redirect::to("/"))
}
