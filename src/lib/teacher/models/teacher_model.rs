//! Module with teacher models compatible with the teacher API's JSON
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Deserialize, Debug, Serialize, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct TeacherDetails {
    pub id: String,
    pub name: String,
    pub role: String,
    /// DD-MM-YYYY
    pub birth_date: String,
    pub email: String,
    pub work_email: String,
    pub phone: String,
    pub home_phone: String,
}

impl TeacherDetails {
    /// Copies every field present in `patch`, leaving the rest untouched.
    pub fn merge(&mut self, patch: &TeacherDetailsPatch) {
        let fields = [
            (&mut self.id, &patch.id),
            (&mut self.name, &patch.name),
            (&mut self.role, &patch.role),
            (&mut self.birth_date, &patch.birth_date),
            (&mut self.email, &patch.email),
            (&mut self.work_email, &patch.work_email),
            (&mut self.phone, &patch.phone),
            (&mut self.home_phone, &patch.home_phone),
        ];
        for (field, value) in fields {
            if let Some(value) = value {
                *field = value.clone();
            }
        }
    }
}

/// Partial [`TeacherDetails`], as sent to and received from `PUT {base}/{id}`.
#[derive(Deserialize, Debug, Serialize, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TeacherDetailsPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home_phone: Option<String>,
}

impl From<TeacherDetails> for TeacherDetailsPatch {
    fn from(details: TeacherDetails) -> Self {
        TeacherDetailsPatch {
            id: Some(details.id),
            name: Some(details.name),
            role: Some(details.role),
            birth_date: Some(details.birth_date),
            email: Some(details.email),
            work_email: Some(details.work_email),
            phone: Some(details.phone),
            home_phone: Some(details.home_phone),
        }
    }
}

#[derive(Deserialize, Debug, Serialize, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum QualificationKind {
    Private,
    Group,
}

#[derive(Deserialize, Debug, Serialize, Clone, PartialEq, Eq)]
pub struct Qualification {
    pub id: String,
    pub name: String,
    /// Display string such as "£35.00"; never parsed.
    pub rate: String,
    #[serde(rename = "type")]
    pub kind: QualificationKind,
}

impl Qualification {
    /// A qualification with a freshly generated id.
    pub fn new(name: &str, rate: &str, kind: QualificationKind) -> Self {
        Qualification {
            id: Uuid::new_v4().to_string(),
            name: name.to_owned(),
            rate: rate.to_owned(),
            kind,
        }
    }
}

#[derive(Deserialize, Debug, Serialize, Clone, PartialEq, Eq)]
pub struct Address {
    pub id: String,
    /// Free-form label, e.g. "Home" or "Work".
    #[serde(rename = "type")]
    pub label: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub country: String,
}

#[derive(Deserialize, Debug, Serialize, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum SlotKind {
    Class,
    Meeting,
    Break,
}

#[derive(Deserialize, Debug, Serialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleSlot {
    pub id: String,
    /// DD-MM-YYYY, compare through `date_codec` only.
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<SlotKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl ScheduleSlot {
    /// Slots without a kind are shown as classes.
    pub fn display_kind(&self) -> SlotKind {
        self.kind.unwrap_or(SlotKind::Class)
    }
}

/// Everything `GET {base}/{teacher_id}` returns.
#[derive(Deserialize, Debug, Serialize, Clone, Default, PartialEq, Eq)]
pub struct TeacherSnapshot {
    pub details: TeacherDetails,
    pub qualifications: Vec<Qualification>,
    pub addresses: Vec<Address>,
    pub schedule: Vec<ScheduleSlot>,
}
