//! Raw answer table to [`StudentRecord`]s.
//!
//! The table arrives already decoded: a header row and data rows of cell
//! text. One column holds the student id, one the name, and `P<n>` columns
//! hold the answer to question `n`.

use std::collections::{BTreeMap, BTreeSet};

use crate::blueprint::Blueprint;
use crate::config::TableConfig;
use crate::core::{AttendanceState, QuestionNumber, StudentRecord};
use crate::errors::{Error, Result};

fn column_index<S: AsRef<str>>(headers: &[S], name: &str) -> Option<usize> {
    headers.iter().position(|h| h.as_ref().trim() == name)
}

fn cell<S: AsRef<str>>(row: &[S], index: usize) -> &str {
    row.get(index).map(|c| c.as_ref().trim()).unwrap_or("")
}

/// Build student records from a decoded table.
///
/// Rows with a blank id or name are skipped. A student is absent when none
/// of the attendance questions has a non-empty cell; those are the assigned
/// in-range questions, or every question when nothing is assigned yet.
///
/// # Errors
///
/// [`Error::Table`] when the id or name column is missing, or when no row
/// yields a student.
pub fn records_from_table<S: AsRef<str>>(
    headers: &[S],
    rows: &[Vec<S>],
    blueprint: &Blueprint,
    table: &TableConfig,
) -> Result<Vec<StudentRecord>> {
    let id_index = column_index(headers, &table.id_column).ok_or_else(|| {
        Error::table(format!("student id column '{}' not found", table.id_column))
    })?;
    let name_index = column_index(headers, &table.name_column).ok_or_else(|| {
        Error::table(format!("student name column '{}' not found", table.name_column))
    })?;

    let question_columns: Vec<(QuestionNumber, usize)> = (1..=blueprint.question_count)
        .filter_map(|q| column_index(headers, &table.question_column(q)).map(|i| (q, i)))
        .collect();
    if question_columns.len() < blueprint.question_count as usize {
        log::warn!(
            "Answer table has {} of {} question columns",
            question_columns.len(),
            blueprint.question_count
        );
    }

    let attendance_questions: BTreeSet<QuestionNumber> = if blueprint.assigned_count() > 0 {
        blueprint.assignments_in_range().map(|(q, _)| q).collect()
    } else {
        (1..=blueprint.question_count).collect()
    };

    let records: Vec<StudentRecord> = rows
        .iter()
        .filter_map(|row| {
            let id = cell(row, id_index);
            let name = cell(row, name_index);
            if id.is_empty() || name.is_empty() {
                return None;
            }

            let answers: BTreeMap<QuestionNumber, String> = question_columns
                .iter()
                .map(|(q, i)| (*q, cell(row, *i).to_string()))
                .collect();

            let attended = answers
                .iter()
                .any(|(q, a)| attendance_questions.contains(q) && !a.is_empty());
            let attendance = if attended {
                AttendanceState::Present
            } else {
                AttendanceState::Absent
            };

            Some(StudentRecord::new(id, name, answers, attendance))
        })
        .collect();

    if records.is_empty() {
        return Err(Error::table(format!(
            "no student rows with both '{}' and '{}'",
            table.id_column, table.name_column
        )));
    }

    log::debug!(
        "Read {} students ({} absent) from answer table",
        records.len(),
        records.iter().filter(|r| !r.is_present()).count()
    );
    Ok(records)
}
