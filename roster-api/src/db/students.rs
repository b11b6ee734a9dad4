//! Student record store
//!
//! Durable keyed storage of student records with the canonical roster order.
//! Every mutation is a single SQL statement, so each call is atomic for the
//! one record it touches; there are no cross-record transactions.
//!
//! Roster order: grade (enumeration order, stored as the numeric level), then
//! full name compared case-sensitively byte by byte (SQLite `BINARY`).

use roster_common::{
    time, uuid_utils, Error, Grade, GradeCounts, Result, StudentInput, StudentRecord, ValidPatch,
};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use tracing::debug;
use uuid::Uuid;

const SELECT_COLUMNS: &str = "guid, full_name, date_of_birth, grade, father_name, mother_name, \
                              contact, photo_url, notes, created_at, updated_at";

/// Full roster in canonical order
pub async fn list_all(db: &SqlitePool) -> Result<Vec<StudentRecord>> {
    let rows = sqlx::query(&format!(
        "SELECT {} FROM students ORDER BY grade ASC, full_name ASC, created_at ASC",
        SELECT_COLUMNS
    ))
    .fetch_all(db)
    .await?;

    rows.iter().map(row_to_record).collect()
}

/// Fetch one record by identifier
pub async fn get(db: &SqlitePool, id: Uuid) -> Result<StudentRecord> {
    let row = sqlx::query(&format!(
        "SELECT {} FROM students WHERE guid = ?",
        SELECT_COLUMNS
    ))
    .bind(id.to_string())
    .fetch_optional(db)
    .await?
    .ok_or_else(|| not_found(id))?;

    row_to_record(&row)
}

/// Validate and store a new record
///
/// Identifier and timestamps are assigned here.
pub async fn insert(db: &SqlitePool, input: &StudentInput) -> Result<StudentRecord> {
    let valid = input.validate_new()?;
    let id = uuid_utils::generate();
    let now = time::to_storage(time::now());

    let row = sqlx::query(&format!(
        r#"
        INSERT INTO students (guid, full_name, date_of_birth, grade, father_name, mother_name,
                              contact, photo_url, notes, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING {}
        "#,
        SELECT_COLUMNS
    ))
    .bind(id.to_string())
    .bind(&valid.full_name)
    .bind(valid.date_of_birth)
    .bind(valid.grade.level())
    .bind(&valid.father_name)
    .bind(&valid.mother_name)
    .bind(&valid.contact)
    .bind(&valid.photo_url)
    .bind(&valid.notes)
    .bind(&now)
    .bind(&now)
    .fetch_one(db)
    .await?;

    debug!("Inserted student {}", id);
    row_to_record(&row)
}

/// Validate and apply a partial update
///
/// Fields absent from the input keep their stored value. Concurrent updates
/// of the same record are last-write-wins per column. `updated_at` never
/// moves backwards even if the wall clock does.
pub async fn replace(db: &SqlitePool, id: Uuid, input: &StudentInput) -> Result<StudentRecord> {
    let patch = input.validate_patch()?;
    apply_patch(db, id, &patch).await
}

async fn apply_patch(db: &SqlitePool, id: Uuid, patch: &ValidPatch) -> Result<StudentRecord> {
    let now = time::to_storage(time::now());

    let row = sqlx::query(&format!(
        r#"
        UPDATE students SET
            full_name = COALESCE(?, full_name),
            date_of_birth = COALESCE(?, date_of_birth),
            grade = COALESCE(?, grade),
            father_name = COALESCE(?, father_name),
            mother_name = COALESCE(?, mother_name),
            contact = COALESCE(?, contact),
            photo_url = CASE WHEN ? THEN ? ELSE photo_url END,
            notes = CASE WHEN ? THEN ? ELSE notes END,
            updated_at = MAX(?, updated_at)
        WHERE guid = ?
        RETURNING {}
        "#,
        SELECT_COLUMNS
    ))
    .bind(&patch.full_name)
    .bind(patch.date_of_birth)
    .bind(patch.grade.map(Grade::level))
    .bind(&patch.father_name)
    .bind(&patch.mother_name)
    .bind(&patch.contact)
    .bind(patch.photo_url.is_some())
    .bind(patch.photo_url.clone().flatten())
    .bind(patch.notes.is_some())
    .bind(patch.notes.clone().flatten())
    .bind(&now)
    .bind(id.to_string())
    .fetch_optional(db)
    .await?
    .ok_or_else(|| not_found(id))?;

    debug!("Updated student {}", id);
    row_to_record(&row)
}

/// Hard-delete a record
///
/// Deleting an identifier that does not exist is `NotFound` and changes
/// nothing.
pub async fn remove(db: &SqlitePool, id: Uuid) -> Result<()> {
    let result = sqlx::query("DELETE FROM students WHERE guid = ?")
        .bind(id.to_string())
        .execute(db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(not_found(id));
    }

    debug!("Removed student {}", id);
    Ok(())
}

/// Number of records per grade, every grade present
pub async fn count_by_grade(db: &SqlitePool) -> Result<GradeCounts> {
    let rows: Vec<(i64, i64)> =
        sqlx::query_as("SELECT grade, COUNT(*) FROM students GROUP BY grade")
            .fetch_all(db)
            .await?;

    let mut counts = GradeCounts::zeroed();
    for (level, n) in rows {
        let grade = Grade::from_level(level)
            .ok_or_else(|| Error::Internal(format!("Stored grade {} is outside the enumeration", level)))?;
        counts.add(grade, n as u64);
    }
    Ok(counts)
}

fn not_found(id: Uuid) -> Error {
    Error::NotFound(format!("student {}", id))
}

fn row_to_record(row: &SqliteRow) -> Result<StudentRecord> {
    let guid: String = row.try_get("guid")?;
    let id = uuid_utils::parse(&guid)
        .ok_or_else(|| Error::Internal(format!("Stored id '{}' is not a UUID", guid)))?;

    let level: i64 = row.try_get("grade")?;
    let grade = Grade::from_level(level)
        .ok_or_else(|| Error::Internal(format!("Stored grade {} is outside the enumeration", level)))?;

    let created_at: String = row.try_get("created_at")?;
    let updated_at: String = row.try_get("updated_at")?;

    Ok(StudentRecord {
        id,
        full_name: row.try_get("full_name")?,
        date_of_birth: row.try_get("date_of_birth")?,
        grade,
        father_name: row.try_get("father_name")?,
        mother_name: row.try_get("mother_name")?,
        contact: row.try_get("contact")?,
        photo_url: row.try_get("photo_url")?,
        notes: row.try_get("notes")?,
        created_at: time::from_storage(&created_at)?,
        updated_at: time::from_storage(&updated_at)?,
    })
}
