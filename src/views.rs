//! Role-scoped projections over the record store.
//!
//! Each view is a capability: it can only be constructed from a session of
//! the matching role, and only exposes what that role may see or change.

use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

use crate::{
    error::{Error, Result},
    metrics::{ChartPoint, MARKS_PER_SUBJECT, ReportCard, SubjectRow, chart_points},
    model::{Student, StudentResult, Subject},
    remark::{self, RemarkDesk, RemarkDrafter, RemarkRequest},
    session::Session,
    store::{RecordStore, SharedStore},
};

/// What the dashboard shows for a session.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(tag = "view", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Dashboard {
    Home,
    Student {
        #[serde(rename = "reportCard")]
        report_card: ReportCard,
        chart: Vec<ChartPoint>,
    },
    /// The session's student record is gone from the store.
    StudentNotFound {
        #[serde(rename = "studentId")]
        student_id: String,
    },
    Faculty {
        students: Vec<StudentSummary>,
        subjects: Vec<Subject>,
    },
    Admin {
        overview: AdminOverview,
        students: Vec<RosterEntry>,
        subjects: Vec<Subject>,
    },
}

pub fn dashboard(session: &Session, store: &RecordStore) -> Dashboard {
    match session {
        Session::Guest => Dashboard::Home,
        Session::Student { student_id } => {
            let view = StudentView::bound(student_id);
            match view.report_card(store) {
                Some(report_card) => Dashboard::Student {
                    chart: view.chart(store),
                    report_card,
                },
                None => Dashboard::StudentNotFound {
                    student_id: student_id.clone(),
                },
            }
        }
        Session::Faculty => {
            let view = FacultyView;
            Dashboard::Faculty {
                students: view.class_list(store),
                subjects: view.subjects(store),
            }
        }
        Session::Admin => {
            let view = AdminView;
            Dashboard::Admin {
                overview: view.overview(store),
                students: view.roster(store, None),
                subjects: view.subjects(store),
            }
        }
    }
}

/// Read-only access to exactly one student's record.
#[derive(Debug, Clone)]
pub struct StudentView {
    student_id: String,
}

impl StudentView {
    pub fn new(session: &Session) -> Result<Self> {
        Ok(Self::bound(session.require_student()?))
    }

    fn bound(student_id: &str) -> Self {
        Self {
            student_id: student_id.to_string(),
        }
    }

    pub fn student_id(&self) -> &str {
        &self.student_id
    }

    pub fn record<'a>(&self, store: &'a RecordStore) -> Option<&'a Student> {
        store.student(&self.student_id)
    }

    pub fn report_card(&self, store: &RecordStore) -> Option<ReportCard> {
        self.record(store)
            .map(|s| ReportCard::new(s, store.list_subjects()))
    }

    pub fn chart(&self, store: &RecordStore) -> Vec<ChartPoint> {
        self.record(store)
            .map(|s| chart_points(s, store.list_subjects()))
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudentSummary {
    pub id: String,
    pub name: String,
    pub roll_no: String,
}

/// The faculty editor for one student.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudentEditor {
    pub student: Student,
    pub rows: Vec<SubjectRow>,
    pub remark_request: RemarkRequest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum ResultField {
    MarksObtained,
    TotalClasses,
    AttendedClasses,
}

/// Read/write access to every student's results and remarks.
#[derive(Debug, Clone, Copy)]
pub struct FacultyView;

impl FacultyView {
    pub fn new(session: &Session) -> Result<Self> {
        session.require_faculty()?;
        Ok(Self)
    }

    pub fn class_list(&self, store: &RecordStore) -> Vec<StudentSummary> {
        store
            .list_students()
            .iter()
            .map(|s| StudentSummary {
                id: s.id.clone(),
                name: s.name.clone(),
                roll_no: s.roll_no.clone(),
            })
            .collect()
    }

    pub fn subjects(&self, store: &RecordStore) -> Vec<Subject> {
        store.list_subjects().to_vec()
    }

    pub fn editor(&self, store: &RecordStore, desk: &RemarkDesk, id: &str) -> Result<StudentEditor> {
        let student = store
            .student(id)
            .ok_or_else(|| Error::StudentNotFound(id.to_string()))?;
        Ok(StudentEditor {
            rows: student
                .results
                .iter()
                .map(|r| SubjectRow::new(r, store.list_subjects()))
                .collect(),
            student: student.clone(),
            remark_request: desk.state(id),
        })
    }

    /// Sets one result field from raw control input and stores the full
    /// replacement record. Values are clamped to the record's invariants.
    pub fn edit_result(
        &self,
        store: &mut RecordStore,
        id: &str,
        subject_id: &str,
        field: ResultField,
        value: u32,
    ) -> Result<Student> {
        let max_marks = store
            .subject(subject_id)
            .map_or(MARKS_PER_SUBJECT, |s| s.max_marks);
        let mut student = store
            .student(id)
            .cloned()
            .ok_or_else(|| Error::StudentNotFound(id.to_string()))?;
        let result = student
            .results
            .iter_mut()
            .find(|r| r.subject_id == subject_id)
            .ok_or_else(|| Error::SubjectNotFound(subject_id.to_string()))?;
        apply_field(result, field, value, max_marks);
        store.update_student(student.clone());
        Ok(student)
    }

    /// Blank text clears the remark.
    pub fn set_remark(&self, store: &mut RecordStore, id: &str, text: &str) -> Result<Student> {
        let mut student = store
            .student(id)
            .cloned()
            .ok_or_else(|| Error::StudentNotFound(id.to_string()))?;
        student.remarks = if text.trim().is_empty() {
            None
        } else {
            Some(text.to_string())
        };
        store.update_student(student.clone());
        Ok(student)
    }

    /// Drafts a remark with the provider and writes it into the record.
    ///
    /// The store lock is only taken before and after the provider call. If
    /// the student is deleted while the call is running, the write is skipped.
    pub async fn draft_remark(
        &self,
        store: &SharedStore,
        desk: &RemarkDesk,
        drafter: &dyn RemarkDrafter,
        id: &str,
    ) -> Result<String> {
        let (student, subjects) = {
            let store = store.read();
            let student = store
                .student(id)
                .cloned()
                .ok_or_else(|| Error::StudentNotFound(id.to_string()))?;
            (student, store.list_subjects().to_vec())
        };
        let ticket = desk.begin(id)?;
        let outcome = remark::try_draft_remark(drafter, &student, &subjects).await;
        let text = ticket.finish(outcome);

        let mut store = store.write();
        if let Some(current) = store.student(id).cloned() {
            store.update_student(Student {
                remarks: Some(text.clone()),
                ..current
            });
        }
        Ok(text)
    }
}

/// Upper bound on classes held for one subject in a term.
pub const MAX_CLASSES: u32 = 10_000;

fn apply_field(result: &mut StudentResult, field: ResultField, value: u32, max_marks: u32) {
    match field {
        ResultField::MarksObtained => {
            result.marks_obtained = value.min(max_marks).min(MARKS_PER_SUBJECT)
        }
        ResultField::TotalClasses => {
            let total = value.min(MAX_CLASSES);
            result.total_classes = total;
            result.attended_classes = result.attended_classes.min(total);
        }
        ResultField::AttendedClasses => {
            result.attended_classes = value.min(result.total_classes)
        }
    }
}

/// Coerces editing-control input to a count. Anything unparsable is 0.
///
/// Like a numeric text box, a leading integer is taken and the rest ignored,
/// so `"42abc"` is 42. Negative values become 0.
pub fn parse_count_input(raw: &str) -> u32 {
    let raw = raw.trim();
    let (negative, digits) = match raw.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, raw.strip_prefix('+').unwrap_or(raw)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    let digits = &digits[..end];
    if negative || digits.is_empty() {
        return 0;
    }
    digits.parse::<u64>().map_or(u32::MAX, |v| v.min(u32::MAX as u64) as u32)
}

/// Same coercion for a JSON value that may be a number or a string.
pub fn coerce_input(value: &serde_json::Value) -> u32 {
    match value {
        serde_json::Value::Number(n) => match n.as_f64() {
            Some(f) if f.is_finite() && f > 0.0 => f.trunc().min(u32::MAX as f64) as u32,
            _ => 0,
        },
        serde_json::Value::String(s) => parse_count_input(s),
        _ => 0,
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminOverview {
    pub total_students: usize,
    pub active_subjects: usize,
    pub system_status: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RosterEntry {
    pub id: String,
    pub name: String,
    pub roll_no: String,
    pub email: String,
    pub department: String,
}

/// A student to enroll. Without an id, the next free `stuN` is used.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewStudent {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    pub roll_no: String,
    pub email: String,
    pub semester: u32,
    pub department: String,
}

/// Roster and catalog management.
#[derive(Debug, Clone, Copy)]
pub struct AdminView;

impl AdminView {
    pub fn new(session: &Session) -> Result<Self> {
        session.require_admin()?;
        Ok(Self)
    }

    pub fn overview(&self, store: &RecordStore) -> AdminOverview {
        AdminOverview {
            total_students: store.list_students().len(),
            active_subjects: store.list_subjects().len(),
            system_status: "Active".to_string(),
        }
    }

    pub fn roster(&self, store: &RecordStore, search: Option<&str>) -> Vec<RosterEntry> {
        store
            .search_students(search.unwrap_or(""))
            .into_iter()
            .map(|s| RosterEntry {
                id: s.id.clone(),
                name: s.name.clone(),
                roll_no: s.roll_no.clone(),
                email: s.email.clone(),
                department: s.department.clone(),
            })
            .collect()
    }

    pub fn delete_student(&self, store: &mut RecordStore, id: &str) {
        store.delete_student(id);
    }

    /// Enrolls the student in every catalog subject with empty results.
    pub fn add_student(&self, store: &mut RecordStore, new: NewStudent) -> Result<Student> {
        let id = match new.id {
            Some(id) => id,
            None => store.next_student_id(),
        };
        let student = Student {
            id,
            name: new.name,
            roll_no: new.roll_no,
            email: new.email,
            semester: new.semester,
            department: new.department,
            results: store
                .list_subjects()
                .iter()
                .map(|s| StudentResult::new(s.id.clone(), 0, 0, 0))
                .collect(),
            remarks: None,
        };
        store.add_student(student.clone())?;
        Ok(student)
    }

    pub fn subjects(&self, store: &RecordStore) -> Vec<Subject> {
        store.list_subjects().to_vec()
    }

    /// Adds to the catalog and enrolls the current roster with empty results.
    pub fn add_subject(&self, store: &mut RecordStore, subject: Subject) -> Result<Subject> {
        store.add_subject(subject.clone())?;
        info!("subject {} added by admin", subject.id);
        Ok(subject)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        remark::{UNAVAILABLE_FALLBACK, tests::StubDrafter},
        seed,
        session::Role,
    };

    #[test]
    fn test_dashboard_selection() {
        let store = RecordStore::seeded();
        assert!(matches!(dashboard(&Session::Guest, &store), Dashboard::Home));
        assert!(matches!(
            dashboard(&Session::Faculty, &store),
            Dashboard::Faculty { ref students, .. } if students.len() == 3
        ));
        match dashboard(&Session::Admin, &store) {
            Dashboard::Admin { overview, .. } => {
                assert_eq!(overview.total_students, 3);
                assert_eq!(overview.active_subjects, 5);
                assert_eq!(overview.system_status, "Active");
            }
            other => panic!("unexpected {:?}", other),
        }
        match dashboard(&Session::login(Role::Student), &store) {
            Dashboard::Student { report_card, chart } => {
                assert_eq!(report_card.name, "Alex Johnson");
                assert_eq!(report_card.cgpa, "8.51");
                assert_eq!(chart.len(), 5);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_student_not_found_state() {
        let mut store = RecordStore::seeded();
        store.delete_student("stu1");
        let session = Session::login(Role::Student);
        assert!(matches!(
            dashboard(&session, &store),
            Dashboard::StudentNotFound { ref student_id } if student_id == "stu1"
        ));
        let view = StudentView::new(&session).unwrap();
        assert!(view.report_card(&store).is_none());
        assert!(view.chart(&store).is_empty());
    }

    #[test]
    fn test_student_view_only_sees_own_record() {
        let store = RecordStore::seeded();
        let session = Session::Student {
            student_id: "stu2".to_string(),
        };
        let view = StudentView::new(&session).unwrap();
        let card = view.report_card(&store).unwrap();
        assert_eq!(card.student_id, "stu2");
        assert_eq!(view.record(&store).unwrap().id, "stu2");
        let own_marks: Vec<u32> = card.rows.iter().map(|r| r.marks_obtained).collect();
        assert_eq!(own_marks, vec![45, 60, 55, 70, 65]);
        assert!(FacultyView::new(&session).is_err());
        assert!(AdminView::new(&session).is_err());
    }

    #[test]
    fn test_edit_result_keeps_other_fields() {
        let mut store = RecordStore::seeded();
        let before = store.student("stu1").unwrap().clone();
        let view = FacultyView::new(&Session::Faculty).unwrap();
        let after = view
            .edit_result(&mut store, "stu1", "sub2", ResultField::MarksObtained, 77)
            .unwrap();
        assert_eq!(after.results[1].marks_obtained, 77);
        let mut expected = before.clone();
        expected.results[1].marks_obtained = 77;
        assert_eq!(store.student("stu1").unwrap(), &expected);
        assert_eq!(store.student("stu3").unwrap(), &seed::students()[2]);
    }

    #[test]
    fn test_edit_result_clamps() {
        let mut store = RecordStore::seeded();
        let view = FacultyView;
        let s = view
            .edit_result(&mut store, "stu1", "sub1", ResultField::MarksObtained, 150)
            .unwrap();
        assert_eq!(s.results[0].marks_obtained, 100);
        let s = view
            .edit_result(&mut store, "stu1", "sub1", ResultField::AttendedClasses, 99)
            .unwrap();
        assert_eq!(s.results[0].attended_classes, 40);
        let s = view
            .edit_result(&mut store, "stu1", "sub1", ResultField::TotalClasses, 30)
            .unwrap();
        assert_eq!(s.results[0].total_classes, 30);
        assert_eq!(s.results[0].attended_classes, 30);
        let s = view
            .edit_result(&mut store, "stu1", "sub1", ResultField::TotalClasses, 0)
            .unwrap();
        let row = SubjectRow::new(&s.results[0], store.list_subjects());
        assert_eq!(row.attendance_pct, 0);
    }

    #[test]
    fn test_edit_result_missing_refs() {
        let mut store = RecordStore::seeded();
        let view = FacultyView;
        assert!(matches!(
            view.edit_result(&mut store, "nobody", "sub1", ResultField::MarksObtained, 1),
            Err(Error::StudentNotFound(_))
        ));
        assert!(matches!(
            view.edit_result(&mut store, "stu1", "sub9", ResultField::MarksObtained, 1),
            Err(Error::SubjectNotFound(_))
        ));
        assert_eq!(store.list_students(), seed::students().as_slice());
    }

    #[test]
    fn test_parse_count_input() {
        assert_eq!(parse_count_input("42"), 42);
        assert_eq!(parse_count_input(" 7 "), 7);
        assert_eq!(parse_count_input("12abc"), 12);
        assert_eq!(parse_count_input("abc"), 0);
        assert_eq!(parse_count_input(""), 0);
        assert_eq!(parse_count_input("-5"), 0);
        assert_eq!(parse_count_input("99999999999"), u32::MAX);
        assert_eq!(coerce_input(&serde_json::json!(12.7)), 12);
        assert_eq!(coerce_input(&serde_json::json!(-3)), 0);
        assert_eq!(coerce_input(&serde_json::json!("8")), 8);
        assert_eq!(coerce_input(&serde_json::json!(null)), 0);
    }

    #[test]
    fn test_set_remark() {
        let mut store = RecordStore::seeded();
        let view = FacultyView;
        view.set_remark(&mut store, "stu2", "Improving.").unwrap();
        assert_eq!(
            store.student("stu2").unwrap().remarks.as_deref(),
            Some("Improving.")
        );
        view.set_remark(&mut store, "stu2", "").unwrap();
        assert_eq!(store.student("stu2").unwrap().remarks, None);
    }

    #[tokio::test]
    async fn test_draft_remark_persists() {
        let store = RecordStore::seeded().into_shared();
        let desk = RemarkDesk::default();
        let view = FacultyView;
        let drafter = StubDrafter(Some("Strong term overall.".to_string()));
        let text = view
            .draft_remark(&store, &desk, &drafter, "stu3")
            .await
            .unwrap();
        assert_eq!(text, "Strong term overall.");
        assert_eq!(
            store.read().student("stu3").unwrap().remarks.as_deref(),
            Some("Strong term overall.")
        );
        assert_eq!(
            desk.state("stu3"),
            RemarkRequest::Succeeded("Strong term overall.".to_string())
        );
    }

    #[tokio::test]
    async fn test_draft_remark_fallback_is_stored() {
        let store = RecordStore::seeded().into_shared();
        let desk = RemarkDesk::default();
        let drafter = remark::OpenAiDrafter::new(&crate::config::AiConfig::default());
        let text = FacultyView
            .draft_remark(&store, &desk, &drafter, "stu1")
            .await
            .unwrap();
        assert_eq!(text, UNAVAILABLE_FALLBACK);
        assert_eq!(
            store.read().student("stu1").unwrap().remarks.as_deref(),
            Some(UNAVAILABLE_FALLBACK)
        );
        assert!(matches!(
            FacultyView.draft_remark(&store, &desk, &drafter, "ghost").await,
            Err(Error::StudentNotFound(_))
        ));
    }

    #[test]
    fn test_huge_class_counts_are_capped() {
        let mut store = RecordStore::seeded();
        let view = FacultyView;
        for subject_id in ["sub1", "sub2"] {
            view.edit_result(
                &mut store,
                "stu1",
                subject_id,
                ResultField::TotalClasses,
                parse_count_input("99999999999"),
            )
            .unwrap();
        }
        let s = view
            .edit_result(&mut store, "stu1", "sub1", ResultField::AttendedClasses, u32::MAX)
            .unwrap();
        assert_eq!(s.results[0].total_classes, MAX_CLASSES);
        assert_eq!(s.results[0].attended_classes, MAX_CLASSES);
        assert_eq!(s.results[1].total_classes, MAX_CLASSES);
        match dashboard(&Session::login(Role::Student), &store) {
            Dashboard::Student { report_card, .. } => {
                assert_eq!(report_card.rows[0].attendance_pct, 100);
                assert!(report_card.overall_attendance <= 100);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_new_student_never_takes_a_deleted_id() {
        let mut store = RecordStore::seeded();
        let session = Session::login(Role::Student);
        let admin = AdminView;
        admin.delete_student(&mut store, "stu1");
        let added = admin
            .add_student(
                &mut store,
                NewStudent {
                    id: None,
                    name: "Dana Lee".to_string(),
                    roll_no: "2023-CS-004".to_string(),
                    email: "dana@uni.edu".to_string(),
                    semester: 5,
                    department: "Computer Science".to_string(),
                },
            )
            .unwrap();
        assert_eq!(added.id, "stu4");
        assert!(StudentView::new(&session).unwrap().record(&store).is_none());
        assert!(matches!(
            dashboard(&session, &store),
            Dashboard::StudentNotFound { .. }
        ));
    }

    /// Deletes the student while the provider call is running.
    struct DeletingDrafter {
        store: SharedStore,
        id: &'static str,
    }

    impl RemarkDrafter for DeletingDrafter {
        fn draft<'a>(
            &'a self,
            _prompt: &'a str,
        ) -> futures::future::BoxFuture<'a, std::result::Result<String, remark::RemarkError>>
        {
            Box::pin(async move {
                self.store.write().delete_student(self.id);
                Ok("Too late.".to_string())
            })
        }
    }

    #[tokio::test]
    async fn test_draft_skips_write_for_deleted_student() {
        let store = RecordStore::seeded().into_shared();
        let desk = RemarkDesk::default();
        let drafter = DeletingDrafter {
            store: store.clone(),
            id: "stu2",
        };
        let text = FacultyView
            .draft_remark(&store, &desk, &drafter, "stu2")
            .await
            .unwrap();
        assert_eq!(text, "Too late.");
        assert!(store.read().student("stu2").is_none());
        assert_eq!(store.read().list_students().len(), 2);
        assert_eq!(
            desk.state("stu2"),
            RemarkRequest::Succeeded("Too late.".to_string())
        );
    }

    #[test]
    fn test_admin_roster_ops() {
        let mut store = RecordStore::seeded();
        let view = AdminView::new(&Session::Admin).unwrap();
        assert_eq!(view.roster(&store, Some("chen")).len(), 1);
        view.delete_student(&mut store, "stu3");
        view.delete_student(&mut store, "stu3");
        assert_eq!(view.overview(&store).total_students, 2);

        let added = view
            .add_student(
                &mut store,
                NewStudent {
                    id: None,
                    name: "Dana Lee".to_string(),
                    roll_no: "2023-CS-004".to_string(),
                    email: "dana@uni.edu".to_string(),
                    semester: 5,
                    department: "Computer Science".to_string(),
                },
            )
            .unwrap();
        assert_eq!(added.id, "stu4");
        assert_eq!(added.results.len(), 5);
        assert!(added.results.iter().all(|r| r.marks_obtained == 0));

        view.add_subject(&mut store, Subject::new("sub6", "Compilers", "CS-306", 100, 3))
            .unwrap();
        assert_eq!(view.overview(&store).active_subjects, 6);
        let graded = FacultyView
            .edit_result(&mut store, "stu1", "sub6", ResultField::MarksObtained, 64)
            .unwrap();
        assert_eq!(graded.results.len(), 6);
        assert_eq!(graded.results[5].marks_obtained, 64);
        assert_eq!(store.student("stu4").unwrap().results.len(), 6);
        assert!(
            view.add_subject(&mut store, Subject::new("sub6", "Again", "CS-306", 100, 3))
                .is_err()
        );
    }
}
