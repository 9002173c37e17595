use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    error::{Error, Result},
    seed::DEMO_STUDENT_ID,
    store::RecordStore,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Guest,
    Admin,
    Faculty,
    Student,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Guest => "guest",
            Role::Admin => "admin",
            Role::Faculty => "faculty",
            Role::Student => "student",
        }
    }
}

/// Who is using the dashboard. Each variant carries only what its view needs.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(tag = "role", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Session {
    #[default]
    Guest,
    Admin,
    Faculty,
    Student {
        #[serde(rename = "studentId")]
        student_id: String,
    },
}

impl Session {
    /// Simulated login. A student login is always bound to the demo student.
    pub fn login(role: Role) -> Self {
        match role {
            Role::Guest => Session::Guest,
            Role::Admin => Session::Admin,
            Role::Faculty => Session::Faculty,
            Role::Student => Session::Student {
                student_id: DEMO_STUDENT_ID.to_string(),
            },
        }
    }

    pub fn logout(&mut self) {
        *self = Session::Guest;
    }

    pub fn role(&self) -> Role {
        match self {
            Session::Guest => Role::Guest,
            Session::Admin => Role::Admin,
            Session::Faculty => Role::Faculty,
            Session::Student { .. } => Role::Student,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        !matches!(self, Session::Guest)
    }

    /// Name shown in the header, if any.
    pub fn display_name(&self, store: &RecordStore) -> Option<String> {
        match self {
            Session::Guest => None,
            Session::Admin => Some("System Administrator".to_string()),
            Session::Faculty => Some("Prof. Anderson".to_string()),
            Session::Student { student_id } => store.student(student_id).map(|s| s.name.clone()),
        }
    }

    pub fn require_admin(&self) -> Result<()> {
        match self {
            Session::Admin => Ok(()),
            other => Err(other.forbidden("administer the roster")),
        }
    }

    pub fn require_faculty(&self) -> Result<()> {
        match self {
            Session::Faculty => Ok(()),
            other => Err(other.forbidden("edit results")),
        }
    }

    /// The student id this session may read.
    pub fn require_student(&self) -> Result<&str> {
        match self {
            Session::Student { student_id } => Ok(student_id),
            other => Err(other.forbidden("view a report card")),
        }
    }

    fn forbidden(&self, action: &'static str) -> Error {
        match self {
            Session::Guest => Error::Unauthorized,
            other => Error::Forbidden {
                role: other.role().as_str(),
                action,
            },
        }
    }
}
