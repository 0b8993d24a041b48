use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core;
use crate::db;

pub const MAX_GPA: f64 = 4.0;

/// Ids that would be shadowed by fixed routes such as `/health`.
pub const RESERVED_STUDENT_IDS: [&str; 1] = ["health"];

/// Envelope shared by every roster endpoint, errors included.
#[derive(Debug, Serialize, Deserialize)]
pub struct StudentResponse {
    pub success: bool,
    pub message: String,
    pub content: Vec<db::Student>,
}

impl StudentResponse {
    fn ok(message: String, content: Vec<db::Student>) -> Json<Self> {
        Json(Self {
            success: true,
            message,
            content,
        })
    }
}

#[derive(Debug, Error)]
pub enum StudentError {
    #[error("Student with id {0} not found")]
    NotFound(String),

    #[error("Student with id {0} already exists")]
    AlreadyExists(String),

    #[error("Student id {0:?} is not allowed")]
    InvalidId(String),

    #[error("gpa must be a finite number less than or equal to 4.0, got {0}")]
    InvalidGpa(f64),

    #[error("Invalid email address: {0}")]
    InvalidEmail(String),

    #[error("Invalid request body: {0}")]
    InvalidBody(#[from] JsonRejection),

    #[error("Database error: {0}")]
    DatabaseError(#[from] core::DbError),
}

impl IntoResponse for StudentError {
    fn into_response(self) -> axum::response::Response {
        let status = match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::AlreadyExists(_) => StatusCode::CONFLICT,
            Self::InvalidId(_) | Self::InvalidGpa(_) | Self::InvalidEmail(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::InvalidBody(ref rejection) => rejection.status(),
            Self::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!(error_message = %self, "Student request failed");
        } else {
            tracing::warn!(error_message = %self, "Student request rejected");
        }

        let body = Json(StudentResponse {
            success: false,
            message: self.to_string(),
            content: Vec::new(),
        });

        (status, body).into_response()
    }
}

fn validate_gpa(gpa: f64) -> Result<(), StudentError> {
    if gpa.is_finite() && gpa <= MAX_GPA {
        Ok(())
    } else {
        Err(StudentError::InvalidGpa(gpa))
    }
}

fn validate_id(id: &str) -> Result<(), StudentError> {
    if id.is_empty() || id.contains('/') || RESERVED_STUDENT_IDS.contains(&id) {
        return Err(StudentError::InvalidId(id.to_string()));
    }
    Ok(())
}

/// Accepts a bare `local@host.tld` address.
///
/// The address is parsed with `mailparse`; display names, angle brackets and
/// quoted local parts are refused, and the host must be a dotted hostname.
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    let Some(info) = mailparse::addrparse(email)
        .ok()
        .and_then(|parsed| parsed.extract_single_info())
    else {
        return false;
    };
    if info.display_name.is_some() || info.addr != email {
        return false;
    }
    let Some((local, host)) = info.addr.rsplit_once('@') else {
        return false;
    };
    is_dot_atom(local) && is_hostname(host)
}

fn is_dot_atom(local: &str) -> bool {
    const SPECIALS: &str = "!#$%&'*+-/=?^_`{|}~";
    local
        .split('.')
        .all(|atom| !atom.is_empty() && atom.chars().all(|c| c.is_ascii_alphanumeric() || SPECIALS.contains(c)))
}

fn is_hostname(host: &str) -> bool {
    let labels: Vec<&str> = host.split('.').collect();
    labels.len() > 1
        && labels.iter().all(|label| {
            !label.is_empty()
                && label.len() <= 63
                && !label.starts_with('-')
                && !label.ends_with('-')
                && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        })
}

fn validate_email(email: &str) -> Result<(), StudentError> {
    if is_valid_email(email) {
        Ok(())
    } else {
        Err(StudentError::InvalidEmail(email.to_string()))
    }
}

/// Add new student
pub async fn create_student(
    State(context): State<core::ArcContext>,
    body: Result<Json<db::NewStudent>, JsonRejection>,
) -> Result<impl IntoResponse, StudentError> {
    let Json(new_student) = body?;
    if let Some(id) = new_student.id.as_deref() {
        validate_id(id)?;
    }
    validate_gpa(new_student.gpa)?;
    validate_email(&new_student.email)?;

    let requested_id = new_student.id.clone();
    let student = db::create_student(&context.db, new_student).await.map_err(|e| match e {
        core::DbError::OperationFailed(sqlx::Error::Database(ref db_err)) if db_err.is_unique_violation() => {
            StudentError::AlreadyExists(requested_id.unwrap_or_default())
        }
        _ => StudentError::DatabaseError(e),
    })?;

    tracing::info!(student_id = %student.id, "Student created");
    Ok((
        StatusCode::CREATED,
        StudentResponse::ok("New student added successfully".to_string(), vec![student]),
    ))
}

/// List all students
pub async fn list_students(State(context): State<core::ArcContext>) -> Result<impl IntoResponse, StudentError> {
    let students = db::list_students(&context.db).await?;
    Ok(StudentResponse::ok("Students retrieved successfully".to_string(), students))
}

/// Get a single student
pub async fn show_student(
    State(context): State<core::ArcContext>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, StudentError> {
    let student = db::find_student(&context.db, &id)
        .await?
        .ok_or_else(|| StudentError::NotFound(id.clone()))?;
    Ok(StudentResponse::ok(
        format!("Student with ID {id} retrieved successfully"),
        vec![student],
    ))
}

/// Update a student, only the fields present in the body are changed
pub async fn update_student(
    State(context): State<core::ArcContext>,
    Path(id): Path<String>,
    body: Result<Json<db::StudentUpdate>, JsonRejection>,
) -> Result<impl IntoResponse, StudentError> {
    let Json(update) = body?;
    if let Some(gpa) = update.gpa {
        validate_gpa(gpa)?;
    }
    if let Some(email) = update.email.as_deref() {
        validate_email(email)?;
    }

    if !update.is_empty() {
        let touched = db::update_student(&context.db, &id, update).await?;
        tracing::debug!(student_id = %id, touched, "Student update applied");
    }

    let student = db::find_student(&context.db, &id)
        .await?
        .ok_or_else(|| StudentError::NotFound(id.clone()))?;
    Ok(StudentResponse::ok(
        format!("Student with id {id} update successfully"),
        vec![student],
    ))
}

/// Delete a student
pub async fn delete_student(
    State(context): State<core::ArcContext>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, StudentError> {
    if !db::delete_student(&context.db, &id).await? {
        return Err(StudentError::NotFound(id));
    }

    tracing::info!(student_id = %id, "Student deleted");
    Ok(StudentResponse::ok(
        format!("Student with id {id} deleted successfully"),
        Vec::new(),
    ))
}
