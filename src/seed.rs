//! Built-in dataset loaded into the record store at startup.

use crate::model::{Student, StudentResult, Subject};

/// The student a `Student` login is pinned to.
pub const DEMO_STUDENT_ID: &str = "stu1";

pub fn subjects() -> Vec<Subject> {
    vec![
        Subject::new("sub1", "Advanced Mathematics", "MAT-301", 100, 4),
        Subject::new("sub2", "Computer Networks", "CS-302", 100, 3),
        Subject::new("sub3", "Database Management", "CS-303", 100, 4),
        Subject::new("sub4", "Software Engineering", "CS-304", 100, 3),
        Subject::new("sub5", "Artificial Intelligence", "CS-305", 100, 3),
    ]
}

/// (marks, total classes, attended) per subject, in `sub1..sub5` order.
type ResultRow = (u32, u32, u32);

fn student(
    id: &str,
    name: &str,
    roll_no: &str,
    email: &str,
    rows: [ResultRow; 5],
    remarks: &str,
) -> Student {
    let results = rows
        .into_iter()
        .enumerate()
        .map(|(i, (marks, total, attended))| {
            StudentResult::new(format!("sub{}", i + 1), marks, total, attended)
        })
        .collect();
    Student {
        id: id.to_string(),
        name: name.to_string(),
        roll_no: roll_no.to_string(),
        email: email.to_string(),
        semester: 5,
        department: "Computer Science".to_string(),
        results,
        remarks: Some(remarks.to_string()),
    }
}

pub fn students() -> Vec<Student> {
    vec![
        student(
            "stu1",
            "Alex Johnson",
            "2023-CS-001",
            "alex@uni.edu",
            [(85, 40, 38), (72, 35, 30), (91, 40, 40), (68, 35, 25), (88, 35, 34)],
            "Excellent performance in Mathematics and Databases. Attendance in Software Engineering needs improvement.",
        ),
        student(
            "stu2",
            "Sarah Williams",
            "2023-CS-002",
            "sarah@uni.edu",
            [(45, 40, 35), (60, 35, 32), (55, 40, 38), (70, 35, 33), (65, 35, 31)],
            "Average performance. Consistent effort is needed in Mathematics to improve grades.",
        ),
        student(
            "stu3",
            "Michael Chen",
            "2023-CS-003",
            "michael@uni.edu",
            [(95, 40, 39), (92, 35, 34), (89, 40, 38), (90, 35, 35), (94, 35, 35)],
            "Outstanding academic performance across all subjects. Keep up the great work!",
        ),
    ]
}
