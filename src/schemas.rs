use std::collections::HashMap;

use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Owner identity of a record, taken from the verified token subject.
pub type OwnerId = String;

/// Payment state of a single month key in a student's fee map. A month key
/// that is absent means "never recorded", which is distinct from an entry
/// with `paid: false`.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct FeeStatus {
    #[serde(default)]
    pub paid: bool,
    #[serde(rename = "paidDate", default)]
    pub paid_date: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    /// Absent on legacy documents that predate ownership stamping; such
    /// documents stay visible to every authenticated caller.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<OwnerId>,
    pub name: String,
    #[serde(rename = "class")]
    pub class_label: String,
    pub date_of_joining: String,
    pub address: String,
    pub phone: String,
    pub paid_advance: String,
    #[serde(default)]
    pub fees: HashMap<String, FeeStatus>,
    #[serde(default)]
    pub photo: String,
}

/// Create payload for a student. The owner is stamped server-side.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewStudent {
    pub name: String,
    #[serde(rename = "class")]
    pub class_label: String,
    pub date_of_joining: String,
    pub address: String,
    pub phone: String,
    pub paid_advance: String,
    #[serde(default)]
    pub fees: HashMap<String, FeeStatus>,
    #[serde(default)]
    pub photo: String,
}

impl NewStudent {
    pub fn into_student(self, owner: OwnerId) -> Student {
        Student {
            id: None,
            user: Some(owner),
            name: self.name,
            class_label: self.class_label,
            date_of_joining: self.date_of_joining,
            address: self.address,
            phone: self.phone,
            paid_advance: self.paid_advance,
            fees: self.fees,
            photo: self.photo,
        }
    }
}

/// Update payload for a student: only the provided fields are written. The
/// id and the owner are not patchable.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentPatch {
    pub name: Option<String>,
    #[serde(rename = "class")]
    pub class_label: Option<String>,
    pub date_of_joining: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub paid_advance: Option<String>,
    pub fees: Option<HashMap<String, FeeStatus>>,
    pub photo: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct FeesUpdate {
    pub fees: HashMap<String, FeeStatus>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub enum AttendanceStatus {
    Present,
    Absent,
}

impl AttendanceStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            AttendanceStatus::Present => "Present",
            AttendanceStatus::Absent => "Absent",
        }
    }
}

/// One attendance document per (owner, date, student); re-submitting a day
/// overwrites the status in place.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Attendance {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<OwnerId>,
    pub date: String,
    pub student_id: ObjectId,
    pub status: AttendanceStatus,
}

/// Wire payload of the bulk attendance endpoint: one calendar date, one
/// status per student.
#[derive(Clone, Debug, Deserialize)]
pub struct AttendanceSheet {
    pub date: String,
    pub attendance: Vec<AttendanceMark>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceMark {
    pub student_id: String,
    pub status: AttendanceStatus,
}
