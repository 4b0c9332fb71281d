/// Half-hour labels that make up the rows of the schedule grid, in order.
pub const TIME_SLOTS: [&str; 22] = [
    "7:30am", "8am", "8:30am", "9am", "9:30am", "10am", "10:30am", "11am", "11:30am", "12pm",
    "12:30pm", "1pm", "1:30pm", "2pm", "2:30pm", "3pm", "3:30pm", "4pm", "4:30pm", "5pm",
    "5:30pm", "6pm",
];

pub fn slot_index(label: &str) -> Option<usize> {
    TIME_SLOTS.iter().position(|slot| *slot == label)
}

/// Whether the grid row `index` falls inside `[start, end)`.
/// Unknown labels and inverted ranges never cover anything.
pub fn covers(start: &str, end: &str, index: usize) -> bool {
    match (slot_index(start), slot_index(end)) {
        (Some(start), Some(end)) => start <= index && index < end,
        _ => false,
    }
}
