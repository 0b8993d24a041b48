use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;

use crate::core::{DbContext, DbError};

/// Upper bound for a single listing.
pub const MAX_LISTED_STUDENTS: i64 = 1000;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Student {
    pub id: String,
    pub name: String,
    pub email: String,
    pub course: String,
    pub gpa: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NewStudent {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    pub email: String,
    pub course: String,
    #[serde(deserialize_with = "deserialize_gpa")]
    pub gpa: f64,
}

/// Partial update, absent fields keep their stored value.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct StudentUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub course: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_gpa")]
    pub gpa: Option<f64>,
}

/// Clients send gpa either as a number or as a numeric string such as `"3.0"`.
#[derive(Deserialize)]
#[serde(untagged)]
enum GpaInput {
    Number(f64),
    Text(String),
}

impl GpaInput {
    fn into_gpa<E: serde::de::Error>(self) -> Result<f64, E> {
        match self {
            Self::Number(gpa) => Ok(gpa),
            Self::Text(text) => text
                .trim()
                .parse()
                .map_err(|_| E::custom(format!("invalid gpa: {text:?}"))),
        }
    }
}

fn deserialize_gpa<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    GpaInput::deserialize(deserializer)?.into_gpa()
}

fn deserialize_optional_gpa<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    Option::<GpaInput>::deserialize(deserializer)?
        .map(GpaInput::into_gpa)
        .transpose()
}

impl StudentUpdate {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.course.is_none() && self.gpa.is_none()
    }
}

#[must_use]
pub fn generate_student_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

pub async fn create_student(db: &DbContext, new_student: NewStudent) -> Result<Student, DbError> {
    let id = new_student.id.unwrap_or_else(generate_student_id);
    let student = sqlx::query_as::<_, Student>(
        r"
        INSERT INTO students (id, name, email, course, gpa, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, CURRENT_TIMESTAMP, CURRENT_TIMESTAMP)
        RETURNING id, name, email, course, gpa
        ",
    )
    .bind(id)
    .bind(new_student.name)
    .bind(new_student.email)
    .bind(new_student.course)
    .bind(new_student.gpa)
    .fetch_one(db)
    .await?;
    Ok(student)
}

pub async fn list_students(db: &DbContext) -> Result<Vec<Student>, DbError> {
    let students = sqlx::query_as::<_, Student>(
        r"
        SELECT id, name, email, course, gpa
        FROM students
        ORDER BY rowid
        LIMIT ?
        ",
    )
    .bind(MAX_LISTED_STUDENTS)
    .fetch_all(db)
    .await?;
    Ok(students)
}

pub async fn find_student(db: &DbContext, id: &str) -> Result<Option<Student>, DbError> {
    let student = sqlx::query_as::<_, Student>(
        r"
        SELECT id, name, email, course, gpa
        FROM students
        WHERE id = ?
        ",
    )
    .bind(id)
    .fetch_optional(db)
    .await?;
    Ok(student)
}

/// Returns the number of rows touched, 0 when the id is unknown.
pub async fn update_student(db: &DbContext, id: &str, update: StudentUpdate) -> Result<u64, DbError> {
    let result = sqlx::query(
        r"
        UPDATE students
        SET name = COALESCE(?, name),
            email = COALESCE(?, email),
            course = COALESCE(?, course),
            gpa = COALESCE(?, gpa),
            updated_at = CURRENT_TIMESTAMP
        WHERE id = ?
        ",
    )
    .bind(update.name)
    .bind(update.email)
    .bind(update.course)
    .bind(update.gpa)
    .bind(id)
    .execute(db)
    .await?;
    Ok(result.rows_affected())
}

pub async fn delete_student(db: &DbContext, id: &str) -> Result<bool, DbError> {
    let result = sqlx::query("DELETE FROM students WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() == 1)
}

/// Cheap round trip used by the health check.
pub async fn ping(db: &DbContext) -> Result<(), DbError> {
    sqlx::query("SELECT 1").execute(db).await?;
    Ok(())
}
