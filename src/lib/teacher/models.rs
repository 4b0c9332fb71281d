use std::{path::PathBuf, time::Duration};

use clap::{command, Parser};
use serde::Deserialize;

pub mod teacher_model;

/// A model for describing ARGS of the tool.
/// Consists of:
/// 1. Path to config.json with the API endpoint and fetch settings.
/// 2. ID of the teacher whose profile will be loaded.
/// 3. Optional inclusive DD-MM-YYYY range narrowing the printed schedule.
/// 4. Optional DD-MM-YYYY date whose week grid will be printed.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    #[arg(long, value_name = "FILE", default_value = "config.json")]
    pub config_json_path: PathBuf,
    #[arg(long, value_name = "ID", default_value = "1")]
    pub teacher_id: String,
    #[arg(long, value_name = "DD-MM-YYYY", requires = "to")]
    pub from: Option<String>,
    #[arg(long, value_name = "DD-MM-YYYY", requires = "from")]
    pub to: Option<String>,
    #[arg(long, value_name = "DD-MM-YYYY")]
    pub week: Option<String>,
}

/// A model for describing configuration of the tool.
/// Consists of:
/// 1. Base URL of the teacher API. Unset or empty means working offline on mock data
/// 2. Timeout for fetching the whole profile, in milliseconds
/// 3. Whether offline calls pretend to take time, so loading states stay visible
/// 4. Optional JSON file replacing the built-in mock data
#[derive(Deserialize, Debug, Clone)]
pub struct Config {
    #[serde(default)]
    pub api_base_url: Option<String>,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    #[serde(default = "default_simulate_latency")]
    pub simulate_latency: bool,
    #[serde(default)]
    pub fixture_path: Option<PathBuf>,
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

fn default_simulate_latency() -> bool {
    true
}

impl Config {
    /// The configured endpoint, ignoring blank values.
    pub fn endpoint(&self) -> Option<&str> {
        self.api_base_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_base_url: None,
            request_timeout_ms: default_request_timeout_ms(),
            simulate_latency: default_simulate_latency(),
            fixture_path: None,
        }
    }
}
