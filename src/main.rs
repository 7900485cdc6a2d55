use skill_forge::config::Config;
use skill_forge::logging::init_tracing;
use skill_forge::progression::ProgressionConfig;
use skill_forge::runner::{load_request, run_request, RunnerError};

fn main() {
    let _ = dotenvy::dotenv();
    let config = Config::from_env().with_request_arg(std::env::args().nth(1));
    let _log_guard = init_tracing(&config.log_level);

    if let Err(err) = run(&config) {
        tracing::error!(error = %err, "request failed");
        std::process::exit(1);
    }
}

fn run(config: &Config) -> Result<(), RunnerError> {
    let request = load_request(config.request_path.as_deref())?;
    let progression = ProgressionConfig::from_env();

    let response = run_request(request, &progression)?;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
