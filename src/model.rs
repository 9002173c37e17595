use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A catalog entry. Referenced by id from [`StudentResult::subject_id`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    pub id: String,
    pub name: String,
    pub code: String,
    pub max_marks: u32,
    pub credits: u32,
}

/// One subject's marks and attendance for a student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudentResult {
    pub subject_id: String,
    pub marks_obtained: u32,
    pub total_classes: u32,
    pub attended_classes: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: String,
    pub name: String,
    pub roll_no: String,
    pub email: String,
    pub semester: u32,
    pub department: String,
    /// One entry per enrolled subject, in enrollment order.
    pub results: Vec<StudentResult>,
    /// Faculty-authored or AI-drafted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
}

impl Subject {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        code: impl Into<String>,
        max_marks: u32,
        credits: u32,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            code: code.into(),
            max_marks,
            credits,
        }
    }
}

impl StudentResult {
    pub fn new(
        subject_id: impl Into<String>,
        marks_obtained: u32,
        total_classes: u32,
        attended_classes: u32,
    ) -> Self {
        Self {
            subject_id: subject_id.into(),
            marks_obtained,
            total_classes,
            attended_classes,
        }
    }
}

impl Student {
    pub fn result(&self, subject_id: &str) -> Option<&StudentResult> {
        self.results.iter().find(|r| r.subject_id == subject_id)
    }
}

/// Looks up a subject in a catalog slice.
pub fn find_subject<'a>(subjects: &'a [Subject], id: &str) -> Option<&'a Subject> {
    subjects.iter().find(|s| s.id == id)
}
