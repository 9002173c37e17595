use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session as HttpSession;
use utoipa::ToSchema;

use super::{AppState, current_session};
use crate::{
    error::Result,
    model::Student,
    remark::RemarkRequest,
    views::{FacultyView, ResultField, StudentEditor, StudentSummary, coerce_input},
};

async fn faculty(http: &HttpSession) -> Result<FacultyView> {
    FacultyView::new(&current_session(http).await?)
}

#[utoipa::path(
    path = "/api/faculty/students",
    method(get),
    responses(
        (status = 200, description = "Class list", body = Vec<StudentSummary>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not a faculty session")
    )
)]
pub async fn list_students(
    State(state): State<AppState>,
    http: HttpSession,
) -> Result<Json<Vec<StudentSummary>>> {
    let view = faculty(&http).await?;
    Ok(Json(view.class_list(&state.store.read())))
}

#[utoipa::path(
    path = "/api/faculty/students/{id}",
    method(get),
    params(
        ("id" = String, Path, description = "Student id")
    ),
    responses(
        (status = 200, description = "Marks and attendance editor", body = StudentEditor),
        (status = 404, description = "Student not found")
    )
)]
pub async fn get_student(
    State(state): State<AppState>,
    http: HttpSession,
    Path(id): Path<String>,
) -> Result<Json<StudentEditor>> {
    let view = faculty(&http).await?;
    let editor = view.editor(&state.store.read(), &state.desk, &id)?;
    Ok(Json(editor))
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EditResultRequest {
    pub subject_id: String,
    pub field: ResultField,
    /// Raw control input, number or string. Unparsable input counts as 0.
    #[schema(value_type = Object)]
    pub value: serde_json::Value,
}

#[utoipa::path(
    path = "/api/faculty/students/{id}/results",
    method(post),
    params(
        ("id" = String, Path, description = "Student id")
    ),
    request_body = EditResultRequest,
    responses(
        (status = 200, description = "Updated record", body = Student),
        (status = 404, description = "Student or subject not found")
    )
)]
pub async fn edit_result(
    State(state): State<AppState>,
    http: HttpSession,
    Path(id): Path<String>,
    Json(req): Json<EditResultRequest>,
) -> Result<Json<Student>> {
    let view = faculty(&http).await?;
    let value = coerce_input(&req.value);
    let student = view.edit_result(
        &mut state.store.write(),
        &id,
        &req.subject_id,
        req.field,
        value,
    )?;
    Ok(Json(student))
}

#[derive(Deserialize, ToSchema)]
pub struct SetRemarkRequest {
    pub text: String,
}

#[utoipa::path(
    path = "/api/faculty/students/{id}/remark",
    method(post),
    params(
        ("id" = String, Path, description = "Student id")
    ),
    request_body = SetRemarkRequest,
    responses(
        (status = 200, description = "Updated record", body = Student),
        (status = 404, description = "Student not found")
    )
)]
pub async fn set_remark(
    State(state): State<AppState>,
    http: HttpSession,
    Path(id): Path<String>,
    Json(req): Json<SetRemarkRequest>,
) -> Result<Json<Student>> {
    let view = faculty(&http).await?;
    let student = view.set_remark(&mut state.store.write(), &id, &req.text)?;
    Ok(Json(student))
}

#[derive(Serialize, ToSchema)]
pub struct DraftedRemark {
    pub text: String,
    pub request: RemarkRequest,
}

#[utoipa::path(
    path = "/api/faculty/students/{id}/remark/draft",
    method(post),
    params(
        ("id" = String, Path, description = "Student id")
    ),
    responses(
        (status = 200, description = "Drafted remark, or fallback text, saved to the record", body = DraftedRemark),
        (status = 404, description = "Student not found"),
        (status = 409, description = "A draft for this student is already running")
    )
)]
pub async fn draft_remark(
    State(state): State<AppState>,
    http: HttpSession,
    Path(id): Path<String>,
) -> Result<Json<DraftedRemark>> {
    let view = faculty(&http).await?;
    let text = view
        .draft_remark(&state.store, &state.desk, state.drafter.as_ref(), &id)
        .await?;
    Ok(Json(DraftedRemark {
        text,
        request: state.desk.state(&id),
    }))
}

pub fn get_faculty_scope() -> Router<AppState> {
    Router::new().nest(
        "/faculty",
        Router::new()
            .route("/students", get(list_students))
            .route("/students/{id}", get(get_student))
            .route("/students/{id}/results", post(edit_result))
            .route("/students/{id}/remark", post(set_remark))
            .route("/students/{id}/remark/draft", post(draft_remark)),
    )
}
