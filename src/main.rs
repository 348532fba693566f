//! Team roster console.
//!
//! Loads a team's roster from the department administration API, stages membership changes
//! given on the command line, shows them as a diff, and commits them as one batch.

use std::io::{self, BufRead, Write};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use serde_json::json;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use team_roster::api::HttpDepartmentApi;
use team_roster::auth::StaticToken;
use team_roster::config::Config;
use team_roster::models::{MembershipView, PendingChange};
use team_roster::roster::{
    annotations, departing_members, filter_candidates, Projection, TeamPanel,
};
use team_roster::RosterError;

#[derive(Parser)]
#[command(
    name = "team-roster",
    about = "Stage and commit team membership changes",
    version
)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct TeamArgs {
    /// Department that owns the team
    #[arg(long, short = 'd')]
    department: String,

    /// Team to manage
    #[arg(long, short = 't')]
    team: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the current roster
    Show {
        #[command(flatten)]
        target: TeamArgs,
    },

    /// List unassigned employees that can be added
    Candidates {
        #[command(flatten)]
        target: TeamArgs,

        /// Case-insensitive filter on name, email or position
        #[arg(long, short = 'q', default_value = "")]
        query: String,
    },

    /// Stage changes, review them, and save
    Apply {
        #[command(flatten)]
        target: TeamArgs,

        /// Employee id to add (repeatable)
        #[arg(long = "add", value_name = "EMPLOYEE_ID")]
        add: Vec<String>,

        /// Membership id to remove (repeatable)
        #[arg(long = "remove", value_name = "MEMBERSHIP_ID")]
        remove: Vec<String>,

        /// Membership id to make leader (repeatable; the last one wins)
        #[arg(long = "leader", value_name = "MEMBERSHIP_ID")]
        leader: Vec<String>,

        /// Review only; discard the staged changes instead of saving
        #[arg(long)]
        dry_run: bool,

        /// Save without asking for confirmation
        #[arg(long, short = 'y')]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e.message());
            return ExitCode::FAILURE;
        }
    };

    // Initialize logging; stdout is reserved for command output.
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    match run(cli, &config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!("Command failed: {}", e);
            eprintln!("error: {}", e.message());
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, config: &Config) -> Result<(), RosterError> {
    let credentials = Arc::new(StaticToken::new(config.api_token.clone()));
    let api = HttpDepartmentApi::new(config, credentials)?;
    tracing::debug!("Using department API at {}", config.api_base_url);

    match cli.command {
        Commands::Show { target } => {
            let mut panel = TeamPanel::new(target.department, target.team);
            panel.open_and_load(&api).await?;
            let projection = panel.projection()?;
            print_roster(&projection, &[], &[], cli.json)?;
            panel.close(|_| true);
        }

        Commands::Candidates { target, query } => {
            let mut panel = TeamPanel::new(target.department, target.team);
            panel.open_and_load(&api).await?;
            let projection = panel.projection()?;
            let candidates = filter_candidates(&projection.effective_unassigned, &query);
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&candidates)?);
            } else if candidates.is_empty() {
                println!("No unassigned employees match.");
            } else {
                for employee in candidates {
                    let inactive = if employee.is_active { "" } else { " [inactive]" };
                    println!(
                        "{:<24} {:<28} {}{}",
                        employee.id,
                        employee.full_name(),
                        employee.position,
                        inactive
                    );
                }
            }
            panel.close(|_| true);
        }

        Commands::Apply {
            target,
            add,
            remove,
            leader,
            dry_run,
            yes,
        } => {
            let mut panel = TeamPanel::new(target.department, target.team);
            panel.open_and_load(&api).await?;

            for employee_id in &add {
                panel.stage_add(employee_id)?;
            }
            for membership_id in &remove {
                panel.stage_remove(membership_id)?;
            }
            for membership_id in &leader {
                panel.stage_assign_leader(membership_id)?;
            }

            if !panel.has_unsaved_changes() {
                println!("Nothing to do.");
                return Ok(());
            }

            let review = panel.review();
            let projection = panel.projection()?;
            if cli.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&json!({
                        "review": review,
                        "projection": projection,
                    }))?
                );
            } else {
                println!("Pending changes:\n{}\n", review);
                let stored = panel.roster().map(|r| r.members.as_slice()).unwrap_or(&[]);
                print_roster(&projection, stored, panel.pending_changes(), false)?;
            }

            // Declining the discard on a dry run falls through to the save prompt.
            if dry_run
                && panel.close(|changes| {
                    yes || prompt(&format!("Discard {} staged change(s)?", changes.len()), true)
                })
            {
                println!("Dry run: staged changes discarded.");
                return Ok(());
            }

            // Declining the save means closing the panel, which needs its own confirmation.
            loop {
                let count = panel.pending_changes().len();
                if yes || prompt(&format!("Save {} change(s)?", count), false) {
                    break;
                }
                // A closed stdin must not spin this loop, so EOF discards.
                if panel.close(|changes| {
                    prompt(&format!("Discard {} staged change(s)?", changes.len()), true)
                }) {
                    println!("Staged changes discarded; nothing was saved.");
                    return Ok(());
                }
            }

            let report = panel.save(&api).await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!(
                    "Saved: {} added, {} removed, {} leader call(s).",
                    report.added, report.removed, report.leader_calls
                );
                for warning in &report.warnings {
                    println!("warning: {}", warning);
                }
            }
            panel.close(|_| true);
        }
    }

    Ok(())
}

fn print_roster(
    projection: &Projection,
    stored: &[MembershipView],
    pending: &[PendingChange],
    as_json: bool,
) -> Result<(), RosterError> {
    if as_json {
        println!("{}", serde_json::to_string_pretty(projection)?);
        return Ok(());
    }

    println!("Members ({}):", projection.effective_members.len());
    for member in &projection.effective_members {
        println!("  {}", member_line(member, pending));
    }
    let departing = departing_members(stored, pending);
    if !departing.is_empty() {
        println!("Leaving ({}):", departing.len());
        for member in departing {
            println!("  {}", member_line(member, pending));
        }
    }
    println!("Unassigned ({}):", projection.effective_unassigned.len());
    for employee in &projection.effective_unassigned {
        println!("  {:<24} {}", employee.id, employee.full_name());
    }
    Ok(())
}

fn member_line(member: &MembershipView, pending: &[PendingChange]) -> String {
    let mut line = format!("{:<24} {}", member.membership_id, member.full_name());
    if member.is_leader {
        line.push_str(" [leader]");
    }
    for kind in annotations(pending, &member.membership_id) {
        line.push_str(&format!(" ({})", kind.label()));
    }
    line
}

/// Ask a yes/no question on stdin. `on_eof` answers when stdin is closed or unreadable.
fn prompt(question: &str, on_eof: bool) -> bool {
    print!("{} [y/N] ", question);
    if io::stdout().flush().is_err() {
        return on_eof;
    }

    let mut answer = String::new();
    match io::stdin().lock().read_line(&mut answer) {
        Ok(0) | Err(_) => on_eof,
        Ok(_) => matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"),
    }
}
