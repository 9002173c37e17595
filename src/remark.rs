//! Drafting report-card remarks with a generative text provider.
//!
//! The provider sits behind [`RemarkDrafter`]. Callers go through
//! [`draft_remark`], which never fails: every error becomes one of the
//! fixed fallback strings.

use std::collections::HashMap;

use async_openai::{
    Client,
    config::OpenAIConfig,
    types::{ChatCompletionRequestMessage, CreateChatCompletionRequestArgs},
};
use futures::future::BoxFuture;
use parking_lot::Mutex;
use serde::Serialize;
use tracing::{info, warn};
use utoipa::ToSchema;

use crate::{
    config::AiConfig,
    error::Error,
    metrics::{MARKS_PER_SUBJECT, attendance_pct},
    model::{Student, Subject, find_subject},
};

pub const UNAVAILABLE_FALLBACK: &str = "AI Service Unavailable (Missing API Key)";
pub const ERROR_FALLBACK: &str = "Error generating remark. Please try again later.";
pub const EMPTY_FALLBACK: &str = "No remark generated.";

#[derive(Debug, thiserror::Error)]
pub enum RemarkError {
    #[error("no API key configured")]
    MissingCredential,
    #[error("provider error: {0}")]
    Provider(anyhow::Error),
    #[error("provider returned no text")]
    EmptyResponse,
}

impl RemarkError {
    pub fn fallback(&self) -> &'static str {
        match self {
            RemarkError::MissingCredential => UNAVAILABLE_FALLBACK,
            RemarkError::Provider(_) => ERROR_FALLBACK,
            RemarkError::EmptyResponse => EMPTY_FALLBACK,
        }
    }
}

/// Something that turns a prompt into remark text.
pub trait RemarkDrafter: Send + Sync {
    fn draft<'a>(&'a self, prompt: &'a str) -> BoxFuture<'a, Result<String, RemarkError>>;
}

/// Chat-completions drafter for any OpenAI-compatible endpoint.
pub struct OpenAiDrafter {
    client: Option<Client<OpenAIConfig>>,
    model: String,
}

impl OpenAiDrafter {
    pub fn new(config: &AiConfig) -> Self {
        let client = config.credential().map(|key| {
            let openai = OpenAIConfig::default()
                .with_api_base(config.base_url.clone())
                .with_api_key(key);
            Client::with_config(openai)
        });
        if client.is_none() {
            warn!("no API key configured, remark drafting will return a fallback");
        }
        Self {
            client,
            model: config.model.clone(),
        }
    }

    async fn complete(&self, prompt: &str) -> Result<String, RemarkError> {
        let Some(client) = &self.client else {
            return Err(RemarkError::MissingCredential);
        };
        let request = CreateChatCompletionRequestArgs::default()
            .model(self.model.as_str())
            .messages(vec![ChatCompletionRequestMessage::User(
                prompt.to_string().into(),
            )])
            .build()
            .map_err(|e| RemarkError::Provider(e.into()))?;
        let response = client
            .chat()
            .create(request)
            .await
            .map_err(|e| RemarkError::Provider(e.into()))?;
        let text = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();
        Ok(text)
    }
}

impl RemarkDrafter for OpenAiDrafter {
    fn draft<'a>(&'a self, prompt: &'a str) -> BoxFuture<'a, Result<String, RemarkError>> {
        Box::pin(self.complete(prompt))
    }
}

/// One line of the performance summary sent to the provider.
#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceLine {
    pub subject: String,
    pub marks: u32,
    pub max_marks: u32,
    pub attendance_pct: u32,
}

impl PerformanceLine {
    /// A result whose subject is missing from the catalog is labelled by its id.
    pub fn collect(student: &Student, subjects: &[Subject]) -> Vec<Self> {
        student
            .results
            .iter()
            .map(|r| {
                let subject = find_subject(subjects, &r.subject_id);
                PerformanceLine {
                    subject: subject
                        .map(|s| s.name.clone())
                        .unwrap_or_else(|| r.subject_id.clone()),
                    marks: r.marks_obtained,
                    max_marks: subject.map_or(MARKS_PER_SUBJECT, |s| s.max_marks),
                    attendance_pct: attendance_pct(r.attended_classes, r.total_classes),
                }
            })
            .collect()
    }
}

pub fn build_prompt(student_name: &str, lines: &[PerformanceLine]) -> String {
    let data = lines
        .iter()
        .map(|l| {
            format!(
                "{}: Marks {}/{}, Attendance {}%",
                l.subject, l.marks, l.max_marks, l.attendance_pct
            )
        })
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "Analyze the following academic performance for student {student_name} and provide a 2-sentence professional, constructive remark suitable for a report card.\n\
         Focus on strengths and areas for improvement.\n\n\
         Data:\n{data}"
    )
}

pub async fn try_draft_remark(
    drafter: &dyn RemarkDrafter,
    student: &Student,
    subjects: &[Subject],
) -> Result<String, RemarkError> {
    let prompt = build_prompt(&student.name, &PerformanceLine::collect(student, subjects));
    let text = drafter.draft(&prompt).await?;
    if text.trim().is_empty() {
        return Err(RemarkError::EmptyResponse);
    }
    Ok(text)
}

/// Draft a remark, falling back to fixed text on any failure.
pub async fn draft_remark(
    drafter: &dyn RemarkDrafter,
    student: &Student,
    subjects: &[Subject],
) -> String {
    match try_draft_remark(drafter, student, subjects).await {
        Ok(text) => text,
        Err(e) => {
            warn!("remark for {} fell back: {}", student.id, e);
            e.fallback().to_string()
        }
    }
}

/// Lifecycle of one student's draft request.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, ToSchema)]
#[serde(tag = "state", content = "text", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RemarkRequest {
    #[default]
    Idle,
    InFlight,
    Succeeded(String),
    Failed(String),
}

/// Per-student draft states. At most one request per student is in flight.
#[derive(Debug, Default)]
pub struct RemarkDesk {
    requests: Mutex<HashMap<String, RemarkRequest>>,
}

impl RemarkDesk {
    pub fn state(&self, student_id: &str) -> RemarkRequest {
        self.requests
            .lock()
            .get(student_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Marks the student's request in flight, or rejects a second trigger.
    pub fn begin(&self, student_id: &str) -> Result<RemarkTicket<'_>, Error> {
        let mut requests = self.requests.lock();
        if requests.get(student_id) == Some(&RemarkRequest::InFlight) {
            return Err(Error::RemarkInFlight(student_id.to_string()));
        }
        requests.insert(student_id.to_string(), RemarkRequest::InFlight);
        Ok(RemarkTicket {
            desk: self,
            student_id: student_id.to_string(),
            finished: false,
        })
    }
}

/// Held while a draft is in flight. Dropping it unfinished returns to `Idle`.
pub struct RemarkTicket<'a> {
    desk: &'a RemarkDesk,
    student_id: String,
    finished: bool,
}

impl RemarkTicket<'_> {
    /// Records the outcome and returns the text to store as the remark.
    pub fn finish(mut self, outcome: Result<String, RemarkError>) -> String {
        let (state, text) = match outcome {
            Ok(text) => {
                info!("remark drafted for {}", self.student_id);
                (RemarkRequest::Succeeded(text.clone()), text)
            }
            Err(e) => {
                warn!("remark for {} fell back: {}", self.student_id, e);
                let text = e.fallback().to_string();
                (RemarkRequest::Failed(text.clone()), text)
            }
        };
        self.desk
            .requests
            .lock()
            .insert(self.student_id.clone(), state);
        self.finished = true;
        text
    }
}

impl Drop for RemarkTicket<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.desk
                .requests
                .lock()
                .insert(self.student_id.clone(), RemarkRequest::Idle);
        }
    }
}
