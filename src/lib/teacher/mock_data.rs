//! Built-in teacher profile served whenever the API is missing or failing.
use std::{fs::File, io::BufReader, path::PathBuf};

use log::{debug, info};

use super::{
    error::FetchError,
    models::teacher_model::{
        Address, Qualification, QualificationKind, ScheduleSlot, SlotKind, TeacherDetails,
        TeacherSnapshot,
    },
};

fn qualification(id: &str, name: &str, rate: &str, kind: QualificationKind) -> Qualification {
    Qualification {
        id: id.to_owned(),
        name: name.to_owned(),
        rate: rate.to_owned(),
        kind,
    }
}

fn address(id: &str, label: &str, street: &str, city: &str) -> Address {
    Address {
        id: id.to_owned(),
        label: label.to_owned(),
        street: street.to_owned(),
        city: city.to_owned(),
        state: "Ontario".to_owned(),
        country: "Canada".to_owned(),
    }
}

fn slot(
    id: &str,
    date: &str,
    (start_time, end_time): (&str, &str),
    subject: &str,
    kind: SlotKind,
    location: &str,
    notes: Option<&str>,
) -> ScheduleSlot {
    ScheduleSlot {
        id: id.to_owned(),
        date: date.to_owned(),
        start_time: start_time.to_owned(),
        end_time: end_time.to_owned(),
        subject: Some(subject.to_owned()),
        kind: Some(kind),
        location: Some(location.to_owned()),
        notes: notes.map(str::to_owned),
    }
}

/// The static profile of teacher "1".
pub fn mock_teacher_data() -> TeacherSnapshot {
    use QualificationKind::{Group, Private};
    use SlotKind::{Class, Meeting};

    TeacherSnapshot {
        details: TeacherDetails {
            id: "1".to_owned(),
            name: "Alynia Allan".to_owned(),
            role: "Senior Music Teacher".to_owned(),
            birth_date: "15-06-1985".to_owned(),
            email: "alyniah.allan@schoolhill.edu".to_owned(),
            work_email: "alynia.allan@schoolhill.edu".to_owned(),
            phone: "+1 (416) 555-0001".to_owned(),
            home_phone: "+1 (416) 555-0002".to_owned(),
        },
        qualifications: vec![
            qualification("1", "Vocal Contemporary", "£35.00", Private),
            qualification("2", "Vocal Classical", "£40.00", Private),
            qualification("3", "Vocal Jazz", "£38.00", Private),
            qualification("4", "Piano Fundamentals", "£32.00", Private),
            qualification("5", "Music Theory", "£30.00", Private),
            qualification("6", "Choir Group", "£25.00", Group),
            qualification("7", "Ensemble Practice", "£28.00", Group),
        ],
        addresses: vec![
            address("1", "Home", "123 Maple Street, Apartment 4B", "North York"),
            address("2", "Work", "456 Education Boulevard", "Toronto"),
        ],
        schedule: vec![
            slot("1", "08-07-2025", ("9am", "10:30am"), "Music Theory", Class, "Room 101", Some("Bring music sheets")),
            slot("2", "07-07-2025", ("2pm", "3pm"), "Vocal Jazz", Class, "Studio A", Some("Practice scales")),
            slot("3", "09-07-2025", ("4pm", "5pm"), "Piano Fundamentals", Class, "Piano Room", None),
            slot("4", "06-07-2025", ("10am", "12pm"), "Choir Group", Class, "Main Hall", Some("Rehearsal for concert")),
            slot("5", "01-07-2025", ("3:30pm", "5pm"), "Vocal Contemporary", Class, "Studio B", None),
            slot("6", "07-07-2025", ("1pm", "2:30pm"), "Ensemble Practice", Class, "Rehearsal Room", None),
            slot("7", "09-07-2025", ("9am", "10am"), "Vocal Classical", Class, "Studio A", None),
            slot("8", "14-07-2025", ("10am", "11:30am"), "Advanced Piano", Class, "Piano Room", Some("Advanced techniques")),
            slot("9", "16-07-2025", ("2pm", "3:30pm"), "Music Composition", Class, "Studio C", None),
            slot("10", "18-07-2025", ("11am", "12pm"), "Faculty Meeting", Meeting, "Conference Room", Some("Monthly department meeting")),
            slot("11", "09-07-2025", ("2pm", "3pm"), "Voice Lesson", Class, "Studio A", None),
            slot("12", "11-07-2025", ("3pm", "4:30pm"), "Piano Recital", Class, "Concert Hall", Some("Student performance")),
            slot("13", "10-07-2025", ("10am", "11am"), "Staff Training", Meeting, "Training Room", None),
            slot("14", "13-07-2025", ("1pm", "2pm"), "Guitar Lesson", Class, "Music Room 3", None),
            slot("15", "20-07-2025", ("4pm", "5:30pm"), "Orchestra Practice", Class, "Main Hall", Some("Full orchestra rehearsal")),
        ],
    }
}

/// Where fallback data comes from: the built-in profile or a JSON fixture of the same shape.
#[derive(Debug, Clone, Default)]
pub struct MockProvider {
    fixture_path: Option<PathBuf>,
}

impl MockProvider {
    pub fn builtin() -> Self {
        MockProvider { fixture_path: None }
    }

    pub fn from_fixture(path: PathBuf) -> Self {
        MockProvider {
            fixture_path: Some(path),
        }
    }

    pub fn snapshot(&self) -> Result<TeacherSnapshot, FetchError> {
        let Some(path) = &self.fixture_path else {
            debug!("Serving built-in mock teacher data");
            return Ok(mock_teacher_data());
        };
        info!("Reading mock teacher data from {}", path.display());
        let file = File::open(path)
            .map_err(|err| FetchError::Fallback(format!("{}: {}", path.display(), err)))?;
        serde_json::from_reader(BufReader::new(file))
            .map_err(|err| FetchError::Fallback(format!("{}: {}", path.display(), err)))
    }

    pub fn details(&self) -> Result<TeacherDetails, FetchError> {
        Ok(self.snapshot()?.details)
    }
}
