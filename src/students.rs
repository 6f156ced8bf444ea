use actix_web::{delete, get, post, put, web, HttpResponse};
use futures::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, Document};
use mongodb::options::{FindOneAndUpdateOptions, ReturnDocument};
use serde::Deserialize;
use serde_json::json;

use crate::auth::AuthUser;
use crate::db::Db;
use crate::error::ApiError;
use crate::schemas::{FeesUpdate, NewStudent, Student, StudentPatch};

/// Students visible to an owner: their own plus legacy documents that
/// predate ownership stamping (no `user` field).
pub fn visible_to(owner: &str) -> Document {
    doc! { "$or": [ { "user": owner }, { "user": { "$exists": false } } ] }
}

/// ANDs extra top-level conditions onto the visibility filter.
pub fn visible_with(owner: &str, conditions: Document) -> Document {
    let mut filter = visible_to(owner);
    filter.extend(conditions);
    filter
}

/// The "1-5" sentinel selects the junior classes as string tokens, never a
/// numeric range, so class "10" cannot match it. Any other non-empty value
/// is an exact match; absent or empty means no class condition.
pub fn class_filter(class: Option<&str>) -> Document {
    match class {
        Some("1-5") => doc! { "class": { "$in": ["1", "2", "3", "4", "5"] } },
        Some(class) if !class.is_empty() => doc! { "class": class },
        _ => Document::new(),
    }
}

/// Builds the `$set` contents for a patch: exactly the provided fields,
/// under their wire names.
pub fn patch_set(patch: StudentPatch) -> Result<Document, bson::ser::Error> {
    let mut set = Document::new();
    if let Some(name) = patch.name {
        set.insert("name", name);
    }
    if let Some(class) = patch.class_label {
        set.insert("class", class);
    }
    if let Some(date_of_joining) = patch.date_of_joining {
        set.insert("dateOfJoining", date_of_joining);
    }
    if let Some(address) = patch.address {
        set.insert("address", address);
    }
    if let Some(phone) = patch.phone {
        set.insert("phone", phone);
    }
    if let Some(paid_advance) = patch.paid_advance {
        set.insert("paidAdvance", paid_advance);
    }
    if let Some(fees) = patch.fees {
        set.insert("fees", bson::to_bson(&fees)?);
    }
    if let Some(photo) = patch.photo {
        set.insert("photo", photo);
    }
    Ok(set)
}

fn parse_id(id: &str, message: &'static str) -> Result<ObjectId, ApiError> {
    ObjectId::parse_str(id).map_err(|err| ApiError::invalid(message, err))
}

async fn fetch_students(
    db: &Db,
    filter: Document,
    message: &'static str,
) -> Result<Vec<Student>, ApiError> {
    db.students()
        .find(filter, None)
        .await
        .map_err(|err| ApiError::persistence(message, err))?
        .try_collect()
        .await
        .map_err(|err| ApiError::persistence(message, err))
}

#[post("/api/students")]
pub async fn add_student(
    db: web::Data<Db>,
    user: AuthUser,
    body: web::Json<NewStudent>,
) -> Result<HttpResponse, ApiError> {
    let student = body.into_inner().into_student(user.0);
    db.students()
        .insert_one(student, None)
        .await
        .map_err(|err| ApiError::persistence("Error saving student", err))?;
    Ok(HttpResponse::Created().json(json!({ "message": "Student added successfully!" })))
}

#[get("/api/students")]
pub async fn list_students(db: web::Data<Db>, user: AuthUser) -> Result<HttpResponse, ApiError> {
    let students = fetch_students(&db, visible_to(&user.0), "Error fetching students").await?;
    Ok(HttpResponse::Ok().json(students))
}

#[derive(Debug, Deserialize)]
pub struct ClassQuery {
    class: Option<String>,
}

#[get("/api/students/by-class")]
pub async fn list_by_class(
    db: web::Data<Db>,
    user: AuthUser,
    query: web::Query<ClassQuery>,
) -> Result<HttpResponse, ApiError> {
    let filter = visible_with(&user.0, class_filter(query.class.as_deref()));
    let students = fetch_students(&db, filter, "Error fetching students by class").await?;
    Ok(HttpResponse::Ok().json(students))
}

// Fees live inside the student documents, so this is the same query as the
// full listing; it stays a separate endpoint for the fee screens.
#[get("/api/students/fees")]
pub async fn list_fees(db: web::Data<Db>, user: AuthUser) -> Result<HttpResponse, ApiError> {
    let students =
        fetch_students(&db, visible_to(&user.0), "Error fetching students with fees").await?;
    Ok(HttpResponse::Ok().json(students))
}

#[put("/api/students/{id}/fees")]
pub async fn update_fees(
    db: web::Data<Db>,
    user: AuthUser,
    id: web::Path<String>,
    body: web::Json<FeesUpdate>,
) -> Result<HttpResponse, ApiError> {
    let id = parse_id(&id, "Error updating fees")?;
    let fees = bson::to_bson(&body.into_inner().fees)
        .map_err(|err| ApiError::invalid("Error updating fees", err))?;
    let options = FindOneAndUpdateOptions::builder()
        .return_document(ReturnDocument::After)
        .build();
    let student = db
        .students()
        .find_one_and_update(
            visible_with(&user.0, doc! { "_id": id }),
            doc! { "$set": { "fees": fees } },
            options,
        )
        .await
        .map_err(|err| ApiError::persistence("Error updating fees", err))?
        .ok_or(ApiError::NotFound("Student not found"))?;
    Ok(HttpResponse::Ok().json(json!({
        "message": "Fees updated successfully!",
        "student": student,
    })))
}

#[get("/api/students/class-10")]
pub async fn list_class_ten(db: web::Data<Db>, user: AuthUser) -> Result<HttpResponse, ApiError> {
    let filter = visible_with(&user.0, doc! { "class": "10" });
    let students = fetch_students(&db, filter, "Error fetching class 10 students").await?;
    Ok(HttpResponse::Ok().json(students))
}

#[get("/api/students/{id}")]
pub async fn get_student(
    db: web::Data<Db>,
    user: AuthUser,
    id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = parse_id(&id, "Error fetching student")?;
    let student = db
        .students()
        .find_one(visible_with(&user.0, doc! { "_id": id }), None)
        .await
        .map_err(|err| ApiError::persistence("Error fetching student", err))?
        .ok_or(ApiError::NotFound("Student not found"))?;
    Ok(HttpResponse::Ok().json(student))
}

#[put("/api/students/{id}")]
pub async fn update_student(
    db: web::Data<Db>,
    user: AuthUser,
    id: web::Path<String>,
    body: web::Json<StudentPatch>,
) -> Result<HttpResponse, ApiError> {
    let id = parse_id(&id, "Error updating student")?;
    let set = patch_set(body.into_inner())
        .map_err(|err| ApiError::invalid("Error updating student", err))?;
    let filter = visible_with(&user.0, doc! { "_id": id });
    // Mongo rejects an empty $set, so an empty patch only checks existence.
    let matched = if set.is_empty() {
        db.students()
            .find_one(filter, None)
            .await
            .map_err(|err| ApiError::persistence("Error updating student", err))?
            .is_some()
    } else {
        db.students()
            .update_one(filter, doc! { "$set": set }, None)
            .await
            .map_err(|err| ApiError::persistence("Error updating student", err))?
            .matched_count
            > 0
    };
    if !matched {
        return Err(ApiError::NotFound("Student not found"));
    }
    Ok(HttpResponse::Ok().json(json!({ "message": "Student updated successfully!" })))
}

#[delete("/api/students/{id}")]
pub async fn delete_student(
    db: web::Data<Db>,
    user: AuthUser,
    id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = parse_id(&id, "Error deleting student")?;
    let result = db
        .students()
        .delete_one(visible_with(&user.0, doc! { "_id": id }), None)
        .await
        .map_err(|err| ApiError::persistence("Error deleting student", err))?;
    if result.deleted_count == 0 {
        return Err(ApiError::NotFound("Student not found"));
    }
    Ok(HttpResponse::Ok().json(json!({ "message": "Student deleted successfully!" })))
}
