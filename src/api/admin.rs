use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{delete, get},
};
use serde::Deserialize;
use tower_sessions::Session as HttpSession;
use tracing::info;
use utoipa::IntoParams;

use super::{AppState, current_session};
use crate::{
    error::Result,
    model::{Student, Subject},
    views::{AdminOverview, AdminView, NewStudent, RosterEntry},
};

async fn admin(http: &HttpSession) -> Result<AdminView> {
    AdminView::new(&current_session(http).await?)
}

#[utoipa::path(
    path = "/api/admin/overview",
    method(get),
    responses(
        (status = 200, description = "System overview", body = AdminOverview),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not an admin session")
    )
)]
pub async fn overview(
    State(state): State<AppState>,
    http: HttpSession,
) -> Result<Json<AdminOverview>> {
    let view = admin(&http).await?;
    Ok(Json(view.overview(&state.store.read())))
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RosterQuery {
    /// Case-insensitive match on name or roll number.
    pub search: Option<String>,
}

#[utoipa::path(
    path = "/api/admin/students",
    method(get),
    params(RosterQuery),
    responses(
        (status = 200, description = "Student roster", body = Vec<RosterEntry>)
    )
)]
pub async fn list_students(
    State(state): State<AppState>,
    http: HttpSession,
    Query(query): Query<RosterQuery>,
) -> Result<Json<Vec<RosterEntry>>> {
    let view = admin(&http).await?;
    let roster = view.roster(&state.store.read(), query.search.as_deref());
    Ok(Json(roster))
}

#[utoipa::path(
    path = "/api/admin/students",
    method(post),
    request_body = NewStudent,
    responses(
        (status = 200, description = "Enrolled student", body = Student),
        (status = 422, description = "Invalid or duplicate student")
    )
)]
pub async fn add_student(
    State(state): State<AppState>,
    http: HttpSession,
    Json(new): Json<NewStudent>,
) -> Result<Json<Student>> {
    let view = admin(&http).await?;
    let student = view.add_student(&mut state.store.write(), new)?;
    info!("student {} enrolled by admin", student.id);
    Ok(Json(student))
}

#[utoipa::path(
    path = "/api/admin/students/{id}",
    method(delete),
    params(
        ("id" = String, Path, description = "Student id")
    ),
    responses(
        (status = 200, description = "Student removed, or already absent")
    )
)]
pub async fn delete_student(
    State(state): State<AppState>,
    http: HttpSession,
    Path(id): Path<String>,
) -> Result<&'static str> {
    let view = admin(&http).await?;
    view.delete_student(&mut state.store.write(), &id);
    Ok("Student removed")
}

#[utoipa::path(
    path = "/api/admin/subjects",
    method(get),
    responses(
        (status = 200, description = "Subject catalog", body = Vec<Subject>)
    )
)]
pub async fn list_subjects(
    State(state): State<AppState>,
    http: HttpSession,
) -> Result<Json<Vec<Subject>>> {
    let view = admin(&http).await?;
    Ok(Json(view.subjects(&state.store.read())))
}

#[utoipa::path(
    path = "/api/admin/subjects",
    method(post),
    request_body = Subject,
    responses(
        (status = 200, description = "Subject added", body = Subject),
        (status = 422, description = "Invalid or duplicate subject")
    )
)]
pub async fn add_subject(
    State(state): State<AppState>,
    http: HttpSession,
    Json(subject): Json<Subject>,
) -> Result<Json<Subject>> {
    let view = admin(&http).await?;
    let subject = view.add_subject(&mut state.store.write(), subject)?;
    Ok(Json(subject))
}

pub fn get_admin_scope() -> Router<AppState> {
    Router::new().nest(
        "/admin",
        Router::new()
            .route("/overview", get(overview))
            .route("/students", get(list_students).post(add_student))
            .route("/students/{id}", delete(delete_student))
            .route("/subjects", get(list_subjects).post(add_subject)),
    )
}
