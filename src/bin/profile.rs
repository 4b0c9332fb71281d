use clap::Parser;
use log::info;
use teacher_profile::teacher::{
    helpers::get_config, models::Args, run_tool::run, teacher_fetcher::ProfileFetcher,
};

#[tokio::main]
async fn main() {
    /* Setup logging */
    env_logger::builder()
        .target(env_logger::Target::Stdout)
        .filter_level(log::LevelFilter::Info)
        .init();

    /* Get all the required resources */
    let args = Args::parse();
    let config = match get_config(&args) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Could not read configuration: {}", err);
            std::process::exit(2);
        }
    };
    let fetcher = ProfileFetcher::from_config(&config);

    /* Load and print the profile */
    match run(fetcher, &args).await {
        Ok(profile) => {
            info!("Loaded profile of teacher {}", args.teacher_id);
            println!("{}", profile);
        }
        Err(err) => {
            eprintln!("{}", err);
            std::process::exit(1);
        }
    }
}
