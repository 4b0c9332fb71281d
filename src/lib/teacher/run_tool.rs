use std::error::Error;

use log::info;

use super::{
    date_codec,
    helpers::{format_profile, format_week},
    models::Args,
    store::TeacherStore,
    teacher_fetcher::TeacherFetcher,
};

/// Loads the profile of `args.teacher_id` through `fetcher` and renders it.
/// Fails only when the store ends up with an error or the arguments carry a bad date.
pub async fn run<F: TeacherFetcher>(fetcher: F, args: &Args) -> Result<String, Box<dyn Error>> {
    let mut store = TeacherStore::new(fetcher);
    store.load_all(&args.teacher_id).await;
    if let Some(err) = &store.state().error {
        return Err(err.clone().into());
    }

    let mut out = match (&args.from, &args.to) {
        (Some(from), Some(to)) => {
            let slots = store.filter_schedule_by_date_range(from, to)?;
            info!("{} schedule slots between {} and {}", slots.len(), from, to);
            format_profile(store.state(), slots)
        }
        _ => format_profile(store.state(), &store.state().schedule),
    };

    if let Some(week) = &args.week {
        let anchor = date_codec::decode(week)?;
        out.push('\n');
        out.push_str(&format_week(&store.state().schedule, anchor));
    }

    Ok(out)
}
