use std::error::Error;

use chrono::NaiveDate;
use figment::{
    providers::{Env, Format, Json},
    Figment,
};
use log::{debug, info};

use super::{
    calendar, date_codec,
    models::{
        teacher_model::{Address, Qualification, QualificationKind, ScheduleSlot, TeacherDetails},
        Args, Config,
    },
    store::TeacherState,
    time_slots::TIME_SLOTS,
};

/// Reads config.json (if present) and lets `TEACHER_*` environment variables override it.
pub fn get_config(args: &Args) -> Result<Config, Box<dyn Error>> {
    info!(
        "Reading config.json from {}",
        std::path::absolute(&args.config_json_path)?.display()
    );
    let config: Config = Figment::new()
        .merge(Json::file(&args.config_json_path))
        .merge(Env::prefixed("TEACHER_"))
        .extract()?;
    log_config(&config);
    Ok(config)
}

pub fn log_config(config: &Config) -> () {
    debug!(
        "Teacher API {:?}, timeout {}ms, simulated latency {}, fixture {:?}",
        config.endpoint(),
        config.request_timeout_ms,
        config.simulate_latency,
        config.fixture_path
    );
}

fn or_dash(value: &str) -> &str {
    if value.is_empty() {
        "-"
    } else {
        value
    }
}

pub fn format_details(details: &TeacherDetails) -> String {
    format!(
        "{} ({})\n    Role: {}\n    Born: {}\n    Email: {}\n    Work email: {}\n    Phone: {}\n    Home phone: {}\n",
        or_dash(&details.name),
        or_dash(&details.id),
        or_dash(&details.role),
        or_dash(&details.birth_date),
        or_dash(&details.email),
        or_dash(&details.work_email),
        or_dash(&details.phone),
        or_dash(&details.home_phone)
    )
}

/// Private and group qualifications as two separate lists.
pub fn format_qualifications(qualifications: &[Qualification]) -> String {
    [
        ("Private", QualificationKind::Private),
        ("Group", QualificationKind::Group),
    ]
    .iter()
    .map(|(title, kind)| {
        let lines = qualifications
            .iter()
            .filter(|q| q.kind == *kind)
            .map(|q| format!("    {} - {}\n", q.name, q.rate))
            .collect::<String>();
        format!("{} qualifications:\n{}", title, lines)
    })
    .collect()
}

pub fn format_address(address: &Address) -> String {
    format!(
        "    {}: {}, {}, {}, {}\n",
        address.label, address.street, address.city, address.state, address.country
    )
}

pub fn format_slot(slot: &ScheduleSlot) -> String {
    let mut line = format!(
        "    {} {}-{} [{:?}] {}",
        slot.date,
        slot.start_time,
        slot.end_time,
        slot.display_kind(),
        slot.subject.as_deref().unwrap_or("Untitled")
    );
    if let Some(location) = &slot.location {
        line.push_str(&format!(" @ {}", location));
    }
    if let Some(notes) = &slot.notes {
        line.push_str(&format!(" ({})", notes));
    }
    line.push('\n');
    line
}

pub fn format_schedule<'a>(slots: impl IntoIterator<Item = &'a ScheduleSlot>) -> String {
    slots.into_iter().map(format_slot).collect()
}

/// One line per grid row, one column per day of the week around `anchor`.
/// `#` marks the row a slot starts in, `|` the rows it continues through.
pub fn format_week(schedule: &[ScheduleSlot], anchor: NaiveDate) -> String {
    let week = calendar::week_dates(anchor);
    let mut out = format!("{:>8}", "");
    for date in &week {
        out.push_str(&format!(" {:>10}", date.format("%a %d").to_string()));
    }
    out.push('\n');
    for (row, label) in TIME_SLOTS.iter().enumerate() {
        out.push_str(&format!("{:>8}", label));
        for date in &week {
            let cell = match calendar::slot_at(schedule, *date, row) {
                Some(slot) if slot.start_time == *label => "#",
                Some(_) => "|",
                None => ".",
            };
            out.push_str(&format!(" {:>10}", cell));
        }
        out.push('\n');
    }
    let counts = calendar::count_kinds(
        week.iter()
            .flat_map(|date| calendar::slots_on(schedule, *date)),
    );
    out.push_str(&format!(
        "Week of {}: {} classes, {} meetings, {} breaks\n",
        date_codec::encode(week[0]),
        counts.classes,
        counts.meetings,
        counts.breaks
    ));
    out
}

/// Full profile printout: details, qualifications, addresses and the given schedule.
pub fn format_profile<'a>(
    state: &TeacherState,
    schedule: impl IntoIterator<Item = &'a ScheduleSlot>,
) -> String {
    format!(
        "{}\n{}\nAddresses:\n{}\nSchedule:\n{}",
        format_details(&state.details),
        format_qualifications(&state.qualifications),
        state.addresses.iter().map(format_address).collect::<String>(),
        format_schedule(schedule)
    )
}
