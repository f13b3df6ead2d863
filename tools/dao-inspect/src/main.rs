//! Operator tool for inspecting the Kaltura LTI persistence tables.
//!
//! # Usage
//!
//! ```bash
//! # Peek at the next job waiting in the work queue (WORK_QUEUE_STATUS, default "new")
//! DATABASE_URL=postgres://... cargo run -p dao-inspect -- queue
//!
//! # Claim it so no other poller picks it up
//! DATABASE_URL=postgres://... cargo run -p dao-inspect -- claim --next in_progress
//!
//! # Look up an auth code for a user
//! DATABASE_URL=postgres://... cargo run -p dao-inspect -- auth-code ABC123 --user admin
//! ```
//!
//! Prints results as JSON. Exits non-zero on any error.

use anyhow::Result;
use clap::{Parser, Subcommand};
use serde_json::{Value, to_value};

use kaltura_core::tracing::init_tracing;
use lti_dao::config::DaoConfig;
use lti_dao::domain::types::JOB_STATUS_IN_PROGRESS;
use lti_dao::state::DaoState;

#[derive(Parser)]
#[command(about = "Inspect Kaltura LTI auth codes and site copy jobs")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Command {
    /// Show the first job in a status without claiming it
    Queue {
        /// Status to poll (defaults to WORK_QUEUE_STATUS)
        #[arg(long)]
        status: Option<String>,
    },
    /// Move the first job in a status to the next status, atomically
    Claim {
        /// Status to claim from (defaults to WORK_QUEUE_STATUS)
        #[arg(long)]
        status: Option<String>,
        #[arg(long, default_value = JOB_STATUS_IN_PROGRESS)]
        next: String,
    },
    /// Show a single job
    Job { id: i64 },
    /// List every job of a batch
    Batch { id: i64 },
    /// Look up an auth code, optionally scoped to a user
    AuthCode {
        code: String,
        #[arg(long)]
        user: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let config = DaoConfig::from_env()?;
    let state = DaoState::connect(&config).await?;

    let output = run(&state, &config, args.command).await?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

async fn run(state: &DaoState, config: &DaoConfig, command: Command) -> Result<Value> {
    let jobs = state.site_copy_job_store();
    let codes = state.auth_code_store();

    let output = match command {
        Command::Queue { status } => {
            let status = status.unwrap_or_else(|| config.work_queue_status.clone());
            to_value(jobs.check_work_queue(&status).await?)?
        }
        Command::Claim { status, next } => {
            let status = status.unwrap_or_else(|| config.work_queue_status.clone());
            to_value(jobs.claim_next(&status, &next).await?)?
        }
        Command::Job { id } => to_value(jobs.get_site_copy_job(Some(id)).await?)?,
        Command::Batch { id } => to_value(jobs.get_all_jobs(Some(id)).await?)?,
        Command::AuthCode { code, user } => match user {
            Some(user) => to_value(codes.get_auth_code_for_user(&code, &user).await?)?,
            None => to_value(codes.get_auth_code_by_code(&code).await?)?,
        },
    };
    Ok(output)
}
