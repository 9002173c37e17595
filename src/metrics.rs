//! Derived figures for a student's result set.
//!
//! Everything here is a pure function of its inputs.

use serde::Serialize;
use utoipa::ToSchema;

use crate::model::{Student, StudentResult, Subject, find_subject};

/// Marks at or above this pass, regardless of grade letter.
pub const PASS_MARK: u32 = 40;
/// Attendance below this percentage raises a shortage warning.
pub const ATTENDANCE_THRESHOLD: u32 = 75;
/// Fixed percentage-to-CGPA conversion.
pub const CGPA_DIVISOR: f64 = 9.5;
/// Every subject is scored out of this for percentage purposes.
pub const MARKS_PER_SUBJECT: u32 = 100;

/// Letter grade for a mark out of 100. Lower bounds are inclusive.
pub fn grade_letter(marks: u32) -> &'static str {
    match marks {
        90.. => "A+",
        80..=89 => "A",
        70..=79 => "B",
        60..=69 => "C",
        50..=59 => "D",
        _ => "F",
    }
}

/// Pass/fail is on its own scale: 45 is an "F" and still a pass.
pub fn is_pass(marks: u32) -> bool {
    marks >= PASS_MARK
}

pub fn total_marks(results: &[StudentResult]) -> u64 {
    results.iter().map(|r| u64::from(r.marks_obtained)).sum()
}

pub fn max_total(results: &[StudentResult]) -> u64 {
    results.len() as u64 * u64::from(MARKS_PER_SUBJECT)
}

/// Percentage over all results, two decimals. `"0"` when there are none.
pub fn percentage(results: &[StudentResult]) -> String {
    let max = max_total(results);
    if max == 0 {
        return "0".to_string();
    }
    let pct = total_marks(results) as f64 / max as f64 * 100.0;
    format!("{:.2}", pct)
}

/// CGPA derived from the already formatted percentage.
pub fn cgpa(results: &[StudentResult]) -> String {
    let pct = percentage(results).parse::<f64>().unwrap_or(0.0);
    format!("{:.2}", pct / CGPA_DIVISOR)
}

/// Rounded attendance percentage. A subject with no classes held reports 0.
pub fn attendance_pct(attended: u32, total: u32) -> u32 {
    ratio_pct(attended.into(), total.into())
}

/// Summed in `u64` so large per-subject counts cannot overflow.
pub fn overall_attendance(results: &[StudentResult]) -> u32 {
    let total = results.iter().map(|r| u64::from(r.total_classes)).sum();
    let attended = results.iter().map(|r| u64::from(r.attended_classes)).sum();
    ratio_pct(attended, total)
}

fn ratio_pct(part: u64, whole: u64) -> u32 {
    if whole == 0 {
        return 0;
    }
    (part as f64 / whole as f64 * 100.0).round() as u32
}

pub fn attendance_shortage(pct: u32) -> bool {
    pct < ATTENDANCE_THRESHOLD
}

/// One row of a report card. Subject fields are `None` when the result
/// points at a subject missing from the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubjectRow {
    pub subject_id: String,
    pub code: Option<String>,
    pub name: Option<String>,
    pub marks_obtained: u32,
    pub max_marks: Option<u32>,
    pub grade: String,
    pub pass: bool,
    pub total_classes: u32,
    pub attended_classes: u32,
    pub attendance_pct: u32,
    pub attendance_shortage: bool,
}

impl SubjectRow {
    pub fn new(result: &StudentResult, subjects: &[Subject]) -> Self {
        let subject = find_subject(subjects, &result.subject_id);
        let pct = attendance_pct(result.attended_classes, result.total_classes);
        Self {
            subject_id: result.subject_id.clone(),
            code: subject.map(|s| s.code.clone()),
            name: subject.map(|s| s.name.clone()),
            marks_obtained: result.marks_obtained,
            max_marks: subject.map(|s| s.max_marks),
            grade: grade_letter(result.marks_obtained).to_string(),
            pass: is_pass(result.marks_obtained),
            total_classes: result.total_classes,
            attended_classes: result.attended_classes,
            attendance_pct: pct,
            attendance_shortage: attendance_shortage(pct),
        }
    }
}

/// Everything the student dashboard shows for one record.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportCard {
    pub student_id: String,
    pub name: String,
    pub roll_no: String,
    pub department: String,
    pub semester: u32,
    pub rows: Vec<SubjectRow>,
    pub total_marks: u64,
    pub max_total: u64,
    pub percentage: String,
    pub cgpa: String,
    pub overall_attendance: u32,
    pub attendance_shortage: bool,
    pub remarks: Option<String>,
}

impl ReportCard {
    pub fn new(student: &Student, subjects: &[Subject]) -> Self {
        let results = &student.results;
        let overall = overall_attendance(results);
        Self {
            student_id: student.id.clone(),
            name: student.name.clone(),
            roll_no: student.roll_no.clone(),
            department: student.department.clone(),
            semester: student.semester,
            rows: results.iter().map(|r| SubjectRow::new(r, subjects)).collect(),
            total_marks: total_marks(results),
            max_total: max_total(results),
            percentage: percentage(results),
            cgpa: cgpa(results),
            overall_attendance: overall,
            attendance_shortage: attendance_shortage(overall),
            remarks: student.remarks.clone(),
        }
    }

    /// Writes the card as CSV: one line per subject, then a totals line.
    pub fn write_csv<W: std::io::Write>(&self, writer: W) -> anyhow::Result<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record([
            "Subject Code",
            "Subject Name",
            "Marks",
            "Max Marks",
            "Grade",
            "Status",
            "Attendance %",
        ])?;
        for row in &self.rows {
            wtr.write_record(vec![
                row.code.clone().unwrap_or_default(),
                row.name.clone().unwrap_or_default(),
                row.marks_obtained.to_string(),
                row.max_marks.map(|m| m.to_string()).unwrap_or_default(),
                row.grade.clone(),
                (if row.pass { "Pass" } else { "Fail" }).to_string(),
                row.attendance_pct.to_string(),
            ])?;
        }
        wtr.write_record(vec![
            String::new(),
            "Total".to_string(),
            self.total_marks.to_string(),
            self.max_total.to_string(),
            format!("CGPA {}", self.cgpa),
            format!("{}%", self.percentage),
            self.overall_attendance.to_string(),
        ])?;
        wtr.flush()?;
        Ok(())
    }
}

/// A bar in the marks chart.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ChartPoint {
    pub name: Option<String>,
    pub marks: u32,
}

pub fn chart_points(student: &Student, subjects: &[Subject]) -> Vec<ChartPoint> {
    student
        .results
        .iter()
        .map(|r| ChartPoint {
            name: find_subject(subjects, &r.subject_id).map(|s| s.code.clone()),
            marks: r.marks_obtained,
        })
        .collect()
}
