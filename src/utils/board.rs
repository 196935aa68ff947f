use chrono::Local;

use crate::error::FormError;
use crate::models::{CreateGradeRequest, GradeRecord, UpdateGradeRequest};
use crate::utils::query::{classify, filter_by_name, parse_calendar_date};

/// What the user is looking at: the last fetched snapshot plus the filter text.
///
/// The visible list is recomputed whenever either input changes, so it can never go stale.
#[derive(Debug, Clone, Default)]
pub struct GradeBoard {
    records: Vec<GradeRecord>,
    filter: String,
    visible: Vec<GradeRecord>,
}

impl GradeBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<GradeRecord>) -> Self {
        let mut board = Self::new();
        board.replace(records);
        board
    }

    /// Swaps in a freshly fetched snapshot.
    pub fn replace(&mut self, records: Vec<GradeRecord>) {
        self.records = records;
        self.refresh();
    }

    pub fn set_filter(&mut self, filter: impl Into<String>) {
        self.filter = filter.into();
        self.refresh();
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn all(&self) -> &[GradeRecord] {
        &self.records
    }

    pub fn visible(&self) -> &[GradeRecord] {
        &self.visible
    }

    pub fn is_empty(&self) -> bool {
        self.visible.is_empty()
    }

    /// Number of visible records below the pass mark.
    pub fn failing_count(&self) -> usize {
        self.visible
            .iter()
            .filter(|record| classify(record.grade).is_failing())
            .count()
    }

    fn refresh(&mut self) {
        self.visible = filter_by_name(&self.records, &self.filter)
            .into_iter()
            .cloned()
            .collect();
    }
}

/// Today's date as `YYYY-MM-DD`.
pub fn today() -> String {
    Local::now().date_naive().format("%Y-%m-%d").to_string()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertForm {
    pub student_name: String,
    pub subject: String,
    pub grade: String,
    pub grade_date: String,
}

impl Default for InsertForm {
    fn default() -> Self {
        Self::new()
    }
}

impl InsertForm {
    pub fn new() -> Self {
        Self {
            student_name: String::new(),
            subject: String::new(),
            grade: String::new(),
            grade_date: today(),
        }
    }

    /// Checks every field and reports all problems at once.
    pub fn to_request(&self) -> Result<CreateGradeRequest, FormError> {
        let mut problems = Vec::new();

        let student_name = self.student_name.trim();
        if student_name.is_empty() {
            problems.push("Il nome dello studente è obbligatorio".to_string());
        }
        let subject = self.subject.trim();
        if subject.is_empty() {
            problems.push("La materia è obbligatoria".to_string());
        }
        let grade = match parse_grade(&self.grade) {
            Some(Ok(grade)) => Some(grade),
            Some(Err(problem)) => {
                problems.push(problem);
                None
            }
            None => {
                problems.push("Il voto è obbligatorio".to_string());
                None
            }
        };
        let grade_date = match check_date(&self.grade_date) {
            Ok(date) => Some(date),
            Err(problem) => {
                problems.push(problem);
                None
            }
        };

        match (grade, grade_date) {
            (Some(grade), Some(grade_date)) if problems.is_empty() => Ok(CreateGradeRequest {
                student_name: student_name.to_string(),
                subject: subject.to_string(),
                grade,
                grade_date,
            }),
            _ => Err(FormError::Invalid(problems)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditForm {
    pub id: i64,
    pub subject: String,
    pub grade: String,
    pub grade_date: String,
}

impl EditForm {
    pub fn from_record(record: &GradeRecord) -> Self {
        Self {
            id: record.id,
            subject: record.subject.clone(),
            grade: record.grade.to_string(),
            grade_date: record.grade_date.clone(),
        }
    }

    /// Blank fields are left out of the request; the backend keeps their current value.
    pub fn to_request(&self) -> Result<UpdateGradeRequest, FormError> {
        let mut problems = Vec::new();

        let grade = match parse_grade(&self.grade) {
            Some(Ok(grade)) => Some(grade),
            Some(Err(problem)) => {
                problems.push(problem);
                None
            }
            None => None,
        };
        let grade_date = match non_blank(&self.grade_date).map(|raw| check_date(&raw)) {
            Some(Ok(date)) => Some(date),
            Some(Err(problem)) => {
                problems.push(problem);
                None
            }
            None => None,
        };

        if !problems.is_empty() {
            return Err(FormError::Invalid(problems));
        }
        Ok(UpdateGradeRequest {
            subject: non_blank(&self.subject),
            grade,
            grade_date,
        })
    }
}

fn non_blank(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn parse_grade(raw: &str) -> Option<Result<i64, String>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(
        trimmed
            .parse::<i64>()
            .map_err(|_| format!("Il voto `{trimmed}` non è un numero intero")),
    )
}

// The backend stores a plain `DATE`, so any accepted shape is sent as `YYYY-MM-DD`.
fn check_date(raw: &str) -> Result<String, String> {
    let trimmed = raw.trim();
    parse_calendar_date(trimmed)
        .map(|date| date.format("%Y-%m-%d").to_string())
        .ok_or_else(|| format!("La data `{trimmed}` non è valida"))
}
