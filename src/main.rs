use std::process::ExitCode;

use chrono::Utc;
use devops_trends::analytics::ProjectTrends;
use devops_trends::config::Config;
use devops_trends::logging::{init_tracing, LogConfig};
use devops_trends::store::Store;
use devops_trends::trend::Intervals;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let config = Config::from_env();
    if let Err(e) = init_tracing(&LogConfig::from(&config)) {
        eprintln!("devops-trends: {e}");
        return ExitCode::FAILURE;
    }
    tracing::info!(?config, "Starting devops-trends report");

    let store = match Store::open(&config.sled_path) {
        Ok(store) => store,
        Err(e) => {
            tracing::error!(error = %e, path = %config.sled_path, "Failed to open sled database");
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = store.run_migrations() {
        tracing::error!(error = %e, "Failed to run migrations");
        return ExitCode::FAILURE;
    }

    let intervals = match Intervals::trailing_weeks(Utc::now(), config.report.weeks) {
        Ok(intervals) => intervals,
        Err(e) => {
            tracing::error!(error = %e, "Invalid report window");
            return ExitCode::FAILURE;
        }
    };

    let trends = match ProjectTrends::collect(&store, &config.report, &intervals).await {
        Ok(trends) => trends,
        Err(e) => {
            tracing::error!(error = %e, "Failed to compute project trends");
            return ExitCode::FAILURE;
        }
    };

    match serde_json::to_string_pretty(&trends) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize report");
            return ExitCode::FAILURE;
        }
    }

    tracing::info!("Report complete");
    ExitCode::SUCCESS
}
