use actix_web::{get, post, web, HttpResponse};
use futures::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, Document};
use mongodb::options::UpdateOptions;
use serde_json::json;

use crate::auth::AuthUser;
use crate::db::Db;
use crate::error::ApiError;
use crate::schemas::{Attendance, AttendanceSheet, AttendanceStatus};

/// Logical key of an attendance record. The filter's equality fields are
/// materialised on upsert-insert, which is what stamps the owner.
pub fn upsert_filter(owner: &str, date: &str, student_id: ObjectId) -> Document {
    doc! { "user": owner, "date": date, "studentId": student_id }
}

pub fn status_update(status: AttendanceStatus) -> Document {
    doc! { "$set": { "status": status.as_str() } }
}

// Entries are applied one at a time with no batch atomicity: a failure stops
// the remainder and surfaces as a 500, but upserts already written stay.
#[post("/api/students/attendance")]
pub async fn record_attendance(
    db: web::Data<Db>,
    user: AuthUser,
    body: web::Json<AttendanceSheet>,
) -> Result<HttpResponse, ApiError> {
    let sheet = body.into_inner();
    for mark in &sheet.attendance {
        let student_id = ObjectId::parse_str(&mark.student_id)
            .map_err(|err| ApiError::invalid("Error posting attendance", err))?;
        db.attendance()
            .update_one(
                upsert_filter(&user.0, &sheet.date, student_id),
                status_update(mark.status),
                UpdateOptions::builder().upsert(true).build(),
            )
            .await
            .map_err(|err| ApiError::persistence("Error posting attendance", err))?;
    }
    Ok(HttpResponse::Ok().json(json!({ "message": "Attendance recorded for all students." })))
}

// Unlike students there is no legacy fallback here: attendance documents
// always carry their owner.
#[get("/api/students/attendance-records")]
pub async fn list_attendance(db: web::Data<Db>, user: AuthUser) -> Result<HttpResponse, ApiError> {
    let records: Vec<Attendance> = db
        .attendance()
        .find(doc! { "user": &user.0 }, None)
        .await
        .map_err(|err| ApiError::persistence("Error fetching attendance records", err))?
        .try_collect()
        .await
        .map_err(|err| ApiError::persistence("Error fetching attendance records", err))?;
    Ok(HttpResponse::Ok().json(records))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upsert_is_keyed_by_owner_date_and_student() {
        let id = ObjectId::parse_str("65a1f0c2e4b0a1b2c3d4e5f6").unwrap();
        assert_eq!(
            upsert_filter("tutor-1", "2024-01-01", id),
            doc! { "user": "tutor-1", "date": "2024-01-01", "studentId": id }
        );
    }

    #[test]
    fn resubmission_only_touches_the_status() {
        let update = status_update(AttendanceStatus::Absent);
        assert_eq!(update, doc! { "$set": { "status": "Absent" } });
        // The owner is stamped via the filter, never rewritten by the update.
        assert!(!update.get_document("$set").unwrap().contains_key("user"));
    }

    #[test]
    fn status_doc_matches_the_serde_rendering() {
        for status in [AttendanceStatus::Present, AttendanceStatus::Absent] {
            assert_eq!(
                serde_json::to_value(status).unwrap(),
                serde_json::Value::String(status.as_str().to_string())
            );
        }
    }
}
