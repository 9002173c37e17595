use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session as HttpSession;
use tracing::info;
use utoipa::ToSchema;

use super::{AppState, SESSION_KEY, current_session};
use crate::{
    error::Result,
    model::Subject,
    session::{Role, Session},
    views::{self, Dashboard},
};

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub role: Role,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    pub session: Session,
    pub display_name: Option<String>,
}

fn session_info(state: &AppState, session: Session) -> SessionInfo {
    let display_name = session.display_name(&state.store.read());
    SessionInfo {
        session,
        display_name,
    }
}

#[utoipa::path(
    path = "/api/login",
    method(post),
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = SessionInfo)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    http: HttpSession,
    Json(req): Json<LoginRequest>,
) -> Result<Json<SessionInfo>> {
    let session = Session::login(req.role);
    if session.is_authenticated() {
        http.insert(SESSION_KEY, &session).await?;
        info!("login as {}", req.role.as_str());
    } else {
        http.flush().await?;
    }
    Ok(Json(session_info(&state, session)))
}

#[utoipa::path(
    path = "/api/logout",
    method(post),
    responses(
        (status = 200, description = "Logout successful")
    )
)]
pub async fn logout(http: HttpSession) -> Result<&'static str> {
    let mut session = current_session(&http).await?;
    if session.is_authenticated() {
        info!("logout from {}", session.role().as_str());
    }
    session.logout();
    http.flush().await?;
    Ok("Logout successful")
}

#[utoipa::path(
    path = "/api/me",
    method(get),
    responses(
        (status = 200, description = "Current session", body = SessionInfo)
    )
)]
pub async fn me(State(state): State<AppState>, http: HttpSession) -> Result<Json<SessionInfo>> {
    let session = current_session(&http).await?;
    Ok(Json(session_info(&state, session)))
}

#[utoipa::path(
    path = "/api/dashboard",
    method(get),
    responses(
        (status = 200, description = "The view for the current role", body = Dashboard)
    )
)]
pub async fn dashboard(State(state): State<AppState>, http: HttpSession) -> Result<Json<Dashboard>> {
    let session = current_session(&http).await?;
    let store = state.store.read();
    Ok(Json(views::dashboard(&session, &store)))
}

#[utoipa::path(
    path = "/api/public/subjects",
    method(get),
    responses(
        (status = 200, description = "Subject catalog", body = Vec<Subject>)
    )
)]
pub async fn subjects(State(state): State<AppState>) -> Json<Vec<Subject>> {
    Json(state.store.read().list_subjects().to_vec())
}

pub fn get_public_scope() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/me", get(me))
        .route("/dashboard", get(dashboard))
        .route("/public/subjects", get(subjects))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use crate::api::tests::{login, send, test_app};

    #[tokio::test]
    async fn test_guest_dashboard_is_home() {
        let (app, _) = test_app(None);
        let (status, body, _) = send(&app, "GET", "/api/dashboard", None, None).await;
        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["view"], "HOME");
    }

    #[tokio::test]
    async fn test_login_selects_view() {
        let (app, _) = test_app(None);
        let cookie = login(&app, "STUDENT").await;
        let (_, body, _) = send(&app, "GET", "/api/me", Some(&cookie), None).await;
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["session"]["role"], "STUDENT");
        assert_eq!(json["session"]["studentId"], "stu1");
        assert_eq!(json["displayName"], "Alex Johnson");

        let (_, body, _) = send(&app, "GET", "/api/dashboard", Some(&cookie), None).await;
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["view"], "STUDENT");
        assert_eq!(json["reportCard"]["cgpa"], "8.51");
        assert_eq!(json["reportCard"]["overallAttendance"], 90);

        let cookie = login(&app, "ADMIN").await;
        let (_, body, _) = send(&app, "GET", "/api/dashboard", Some(&cookie), None).await;
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["view"], "ADMIN");
        assert_eq!(json["overview"]["totalStudents"], 3);
    }

    #[tokio::test]
    async fn test_logout_returns_to_guest() {
        let (app, _) = test_app(None);
        let cookie = login(&app, "FACULTY").await;
        let (status, _, _) = send(&app, "POST", "/api/logout", Some(&cookie), None).await;
        assert_eq!(status, StatusCode::OK);
        let (_, body, _) = send(&app, "GET", "/api/dashboard", Some(&cookie), None).await;
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["view"], "HOME");
    }

    #[tokio::test]
    async fn test_public_subjects() {
        let (app, _) = test_app(None);
        let (status, body, _) = send(&app, "GET", "/api/public/subjects", None, None).await;
        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json.as_array().unwrap().len(), 5);
        assert_eq!(json[0]["maxMarks"], 100);
    }
}
