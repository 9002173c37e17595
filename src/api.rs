pub mod admin;
pub mod faculty;
pub mod public;
pub mod student;

use std::sync::Arc;

use axum::Router;
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, MemoryStore, Session as HttpSession, SessionManagerLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    error::Result,
    remark::{RemarkDesk, RemarkDrafter},
    session::Session,
    store::SharedStore,
};

const SESSION_KEY: &str = "session";

#[derive(Clone)]
pub struct AppState {
    pub store: SharedStore,
    pub desk: Arc<RemarkDesk>,
    pub drafter: Arc<dyn RemarkDrafter>,
}

impl AppState {
    pub fn new(store: SharedStore, drafter: Arc<dyn RemarkDrafter>) -> Self {
        Self {
            store,
            desk: Arc::new(RemarkDesk::default()),
            drafter,
        }
    }
}

/// The dashboard session stored in the cookie session, `Guest` if none.
pub async fn current_session(http: &HttpSession) -> Result<Session> {
    Ok(http.get::<Session>(SESSION_KEY).await?.unwrap_or_default())
}

#[derive(OpenApi)]
#[openapi(paths(
    public::login,
    public::logout,
    public::me,
    public::dashboard,
    public::subjects,
    student::report_card,
    student::report_card_csv,
    faculty::list_students,
    faculty::get_student,
    faculty::edit_result,
    faculty::set_remark,
    faculty::draft_remark,
    admin::overview,
    admin::list_students,
    admin::add_student,
    admin::delete_student,
    admin::list_subjects,
    admin::add_subject,
))]
pub struct ApiDoc;

pub fn router(state: AppState) -> Router {
    let sessions = SessionManagerLayer::new(MemoryStore::default())
        .with_secure(false)
        .with_expiry(Expiry::OnInactivity(time::Duration::hours(8)));
    let api = Router::new()
        .merge(public::get_public_scope())
        .merge(student::get_student_scope())
        .merge(faculty::get_faculty_scope())
        .merge(admin::get_admin_scope());
    Router::new()
        .nest("/api", api)
        .layer(sessions)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
