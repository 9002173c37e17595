use std::{collections::HashSet, sync::Arc};

use parking_lot::RwLock;
use tracing::info;

use crate::{
    error::{Error, Result},
    metrics::MARKS_PER_SUBJECT,
    model::{Student, StudentResult, Subject},
    seed,
};

/// Store shared between request handlers. Never hold the guard across an await.
pub type SharedStore = Arc<RwLock<RecordStore>>;

const ID_PREFIX: &str = "stu";

/// In-memory subjects and students. Nothing is persisted.
///
/// Student ids are never reused: a deleted id is retired, so a session
/// still bound to it cannot come to see a different student.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    subjects: Vec<Subject>,
    students: Vec<Student>,
    /// Highest `stuN` serial ever stored.
    last_serial: u64,
    retired: HashSet<String>,
}

fn serial(id: &str) -> Option<u64> {
    id.strip_prefix(ID_PREFIX)?.parse().ok()
}

impl RecordStore {
    pub fn new(subjects: Vec<Subject>, students: Vec<Student>) -> Self {
        let last_serial = students.iter().filter_map(|s| serial(&s.id)).max().unwrap_or(0);
        Self {
            subjects,
            students,
            last_serial,
            retired: HashSet::new(),
        }
    }

    /// The built-in dataset.
    pub fn seeded() -> Self {
        Self::new(seed::subjects(), seed::students())
    }

    pub fn into_shared(self) -> SharedStore {
        Arc::new(RwLock::new(self))
    }

    pub fn list_subjects(&self) -> &[Subject] {
        &self.subjects
    }

    pub fn subject(&self, id: &str) -> Option<&Subject> {
        self.subjects.iter().find(|s| s.id == id)
    }

    pub fn add_subject(&mut self, subject: Subject) -> Result<()> {
        if subject.id.trim().is_empty() || subject.name.trim().is_empty() {
            return Err(Error::Validation("subject id and name are required".into()));
        }
        if subject.max_marks != MARKS_PER_SUBJECT {
            return Err(Error::Validation(format!(
                "maxMarks must be {}",
                MARKS_PER_SUBJECT
            )));
        }
        if self.subject(&subject.id).is_some() {
            return Err(Error::Validation(format!(
                "subject {} already exists",
                subject.id
            )));
        }
        info!("add subject {} ({})", subject.id, subject.code);
        for student in &mut self.students {
            if student.result(&subject.id).is_none() {
                student
                    .results
                    .push(StudentResult::new(subject.id.clone(), 0, 0, 0));
            }
        }
        self.subjects.push(subject);
        Ok(())
    }

    pub fn list_students(&self) -> &[Student] {
        &self.students
    }

    pub fn student(&self, id: &str) -> Option<&Student> {
        self.students.iter().find(|s| s.id == id)
    }

    pub fn add_student(&mut self, student: Student) -> Result<()> {
        if student.id.trim().is_empty() || student.name.trim().is_empty() {
            return Err(Error::Validation("student id and name are required".into()));
        }
        if self.student(&student.id).is_some() {
            return Err(Error::Validation(format!(
                "student {} already exists",
                student.id
            )));
        }
        if self.retired.contains(&student.id) {
            return Err(Error::Validation(format!(
                "student id {} was deleted and cannot be reused",
                student.id
            )));
        }
        if let Some(n) = serial(&student.id) {
            self.last_serial = self.last_serial.max(n);
        }
        info!("add student {} ({})", student.id, student.roll_no);
        self.students.push(student);
        Ok(())
    }

    /// Replaces the record with the same id wholesale. Unknown ids are ignored.
    pub fn update_student(&mut self, student: Student) {
        match self.students.iter_mut().find(|s| s.id == student.id) {
            Some(slot) => {
                info!("update student {}", student.id);
                *slot = student;
            }
            None => info!("update of unknown student {} ignored", student.id),
        }
    }

    /// Removes the record if present. Deleting an unknown id changes nothing.
    pub fn delete_student(&mut self, id: &str) {
        let before = self.students.len();
        self.students.retain(|s| s.id != id);
        if self.students.len() != before {
            info!("delete student {}", id);
            self.retired.insert(id.to_string());
        }
    }

    /// The next never-issued `stuN` id.
    pub fn next_student_id(&self) -> String {
        format!("{}{}", ID_PREFIX, self.last_serial + 1)
    }

    /// Case-insensitive match on name or roll number. An empty term matches all.
    pub fn search_students(&self, term: &str) -> Vec<&Student> {
        let term = term.to_lowercase();
        self.students
            .iter()
            .filter(|s| {
                s.name.to_lowercase().contains(&term) || s.roll_no.to_lowercase().contains(&term)
            })
            .collect()
    }
}
