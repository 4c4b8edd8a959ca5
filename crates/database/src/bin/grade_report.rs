use database::{
    db::{DatabaseConfig, create_connection},
    repository::SeaOrmStore,
    services::{Actor, report::ReportService},
};
use log::{error, info};
use std::process::ExitCode;

const USAGE: &str = "usage: grade-report <user_id> [schedule_id]";

fn parse_args() -> Option<(i64, Option<i64>)> {
    let mut args = std::env::args().skip(1);
    let user_id = args.next()?.parse().ok()?;
    let schedule_id = match args.next() {
        Some(arg) => Some(arg.parse().ok()?),
        None => None,
    };
    Some((user_id, schedule_id))
}

async fn run(
    user_id: i64,
    schedule_id: Option<i64>,
) -> Result<String, Box<dyn std::error::Error>> {
    let config = DatabaseConfig::from_env()?;
    let store = SeaOrmStore::new(create_connection(&config).await?);

    info!("Computing grade report for user {user_id}");
    let report = ReportService::compute_report(&store, Actor::new(user_id), schedule_id).await?;
    let rows: Vec<_> = report.reports().iter().map(|r| r.row()).collect();

    Ok(serde_json::to_string_pretty(&rows)?)
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();

    let Some((user_id, schedule_id)) = parse_args() else {
        eprintln!("{USAGE}");
        return ExitCode::FAILURE;
    };

    match run(user_id, schedule_id).await {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("Failed to compute grade report: {err}");
            ExitCode::FAILURE
        }
    }
}
