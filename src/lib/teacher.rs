//! Teacher profile core: the state store, its fetch adapter and the
//! `DD-MM-YYYY` schedule model.
pub mod calendar;
pub mod date_codec;
pub mod error;
pub mod helpers;
pub mod mock_data;
pub mod models;
pub mod run_tool;
pub mod store;
pub mod teacher_fetcher;
pub mod time_slots;
