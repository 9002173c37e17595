use axum::{
    Json, Router,
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    routing::get,
};
use tower_sessions::Session as HttpSession;

use super::{AppState, current_session};
use crate::{
    error::{Error, Result},
    metrics::ReportCard,
    views::StudentView,
};

fn own_report_card(state: &AppState, view: &StudentView) -> Result<ReportCard> {
    view.report_card(&state.store.read())
        .ok_or_else(|| Error::StudentNotFound(view.student_id().to_string()))
}

#[utoipa::path(
    path = "/api/student/report_card",
    method(get),
    responses(
        (status = 200, description = "Own report card", body = ReportCard),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not a student session"),
        (status = 404, description = "Student record missing")
    )
)]
pub async fn report_card(
    State(state): State<AppState>,
    http: HttpSession,
) -> Result<Json<ReportCard>> {
    let view = StudentView::new(&current_session(&http).await?)?;
    Ok(Json(own_report_card(&state, &view)?))
}

#[utoipa::path(
    path = "/api/student/report_card.csv",
    method(get),
    responses(
        (status = 200, description = "Own report card as CSV", content_type = "text/csv"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not a student session"),
        (status = 404, description = "Student record missing")
    )
)]
pub async fn report_card_csv(State(state): State<AppState>, http: HttpSession) -> Result<Response> {
    let view = StudentView::new(&current_session(&http).await?)?;
    let card = own_report_card(&state, &view)?;
    let mut body = Vec::new();
    card.write_csv(&mut body)?;
    let disposition = format!("attachment; filename=\"{}-report-card.csv\"", card.roll_no);
    Ok((
        [
            (header::CONTENT_TYPE, mime::TEXT_CSV_UTF_8.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}

pub fn get_student_scope() -> Router<AppState> {
    Router::new().nest(
        "/student",
        Router::new()
            .route("/report_card", get(report_card))
            .route("/report_card.csv", get(report_card_csv)),
    )
}
