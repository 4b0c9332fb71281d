//! Week and month layouts of the schedule grid, and lookups placing slots into its cells.
use chrono::{Datelike, Days, Months, NaiveDate};

use super::{
    date_codec,
    models::teacher_model::{ScheduleSlot, SlotKind},
    time_slots,
};

pub const WEEK_LEN: usize = 7;
/// Six rows of seven days always cover a month.
pub const MONTH_CELLS: usize = 6 * WEEK_LEN;

/// The Sunday on or before `date`.
pub fn start_of_week(date: NaiveDate) -> NaiveDate {
    date - Days::new(date.weekday().num_days_from_sunday().into())
}

pub fn week_dates(anchor: NaiveDate) -> Vec<NaiveDate> {
    start_of_week(anchor)
        .iter_days()
        .take(WEEK_LEN)
        .collect()
}

/// The 42 days shown for the month of `anchor`, starting on the Sunday on or
/// before the 1st.
pub fn month_dates(anchor: NaiveDate) -> Vec<NaiveDate> {
    start_of_week(anchor.with_day(1).unwrap_or(anchor))
        .iter_days()
        .take(MONTH_CELLS)
        .collect()
}

pub fn shift_weeks(anchor: NaiveDate, weeks: i64) -> Option<NaiveDate> {
    let days = Days::new(weeks.unsigned_abs().checked_mul(WEEK_LEN as u64)?);
    if weeks < 0 {
        anchor.checked_sub_days(days)
    } else {
        anchor.checked_add_days(days)
    }
}

/// Moves by whole months, clamping to the last day of shorter months.
pub fn shift_months(anchor: NaiveDate, months: i32) -> Option<NaiveDate> {
    let step = Months::new(months.unsigned_abs());
    if months < 0 {
        anchor.checked_sub_months(step)
    } else {
        anchor.checked_add_months(step)
    }
}

fn falls_on(slot: &ScheduleSlot, date: NaiveDate) -> bool {
    date_codec::decode(&slot.date).is_ok_and(|slot_date| slot_date == date)
}

pub fn slots_on(schedule: &[ScheduleSlot], date: NaiveDate) -> Vec<&ScheduleSlot> {
    schedule.iter().filter(|slot| falls_on(slot, date)).collect()
}

/// The first slot covering grid row `slot_index` on `date`.
pub fn slot_at(schedule: &[ScheduleSlot], date: NaiveDate, slot_index: usize) -> Option<&ScheduleSlot> {
    schedule.iter().find(|slot| {
        falls_on(slot, date) && time_slots::covers(&slot.start_time, &slot.end_time, slot_index)
    })
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct KindCounts {
    pub classes: usize,
    pub meetings: usize,
    pub breaks: usize,
}

pub fn count_kinds<'a>(slots: impl IntoIterator<Item = &'a ScheduleSlot>) -> KindCounts {
    let mut counts = KindCounts::default();
    for slot in slots {
        match slot.display_kind() {
            SlotKind::Class => counts.classes += 1,
            SlotKind::Meeting => counts.meetings += 1,
            SlotKind::Break => counts.breaks += 1,
        }
    }
    counts
}
