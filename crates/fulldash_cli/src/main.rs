//! FullDash command-line entry point.
//!
//! # Responsibility
//! - Resolve configuration, bootstrap logging and storage.
//! - Map subcommands onto `DashboardService` use-cases and print results.
//!
//! # Invariants
//! - Each command runs in one immediate transaction; a failed command
//!   leaves storage untouched.

use clap::{Args, Parser, Subcommand};
use fulldash_core::db::open_db;
use fulldash_core::{
    init_logging, Board, DashConfig, DashboardService, Metrics, Project, ProjectDetail,
    ProjectDraft, ProjectId, ProjectStatus, SecuredBy, SqliteContributionRepository,
    SqliteProjectRepository,
};
use log::error;
use rusqlite::{Connection, TransactionBehavior};
use serde::Serialize;
use std::error::Error;
use std::fmt::Write as _;
use std::path::PathBuf;
use std::process::ExitCode;

type CliResult<T> = Result<T, Box<dyn Error>>;

#[derive(Debug, Parser)]
#[command(name = "fulldash", version, about = "Shared freelance project dashboard")]
struct Cli {
    /// SQLite database path. Overrides FULLDASH_DB_PATH.
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Print JSON instead of text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Revenue totals and per-collaborator shares.
    Metrics,
    /// Projects grouped by status.
    Board {
        #[arg(long)]
        search: Option<String>,
    },
    /// One project with hours and its revenue split.
    Show { id: ProjectId },
    /// Create a project.
    Add {
        #[arg(long)]
        client: String,
        #[command(flatten)]
        fields: DraftArgs,
    },
    /// Edit a project. Omitted fields keep their current value.
    Update {
        id: ProjectId,
        #[arg(long)]
        client: Option<String>,
        #[command(flatten)]
        fields: DraftArgs,
    },
    /// Move a project to another column.
    Move {
        id: ProjectId,
        #[arg(value_parser = parse_status)]
        status: ProjectStatus,
    },
    /// Record a received payment and mark the project paid.
    Pay {
        id: ProjectId,
        #[arg(long)]
        amount: f64,
        #[arg(long = "ref")]
        payment_ref: Option<String>,
    },
    Delete { id: ProjectId },
}

/// Editable project fields shared by `add` and `update`.
#[derive(Debug, Args)]
struct DraftArgs {
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    revenue: Option<f64>,
    #[arg(long, value_parser = parse_status)]
    status: Option<ProjectStatus>,
    #[arg(long, value_parser = parse_secured_by)]
    secured_by: Option<SecuredBy>,
    #[arg(long)]
    noor_hours: Option<f64>,
    #[arg(long)]
    ahmad_hours: Option<f64>,
}

impl DraftArgs {
    fn apply(self, mut draft: ProjectDraft) -> ProjectDraft {
        if let Some(description) = self.description {
            draft.description = description;
        }
        if let Some(revenue) = self.revenue {
            draft.revenue = revenue;
        }
        if let Some(status) = self.status {
            draft.status = status;
        }
        if let Some(secured_by) = self.secured_by {
            draft.secured_by = secured_by;
        }
        if let Some(hours) = self.noor_hours {
            draft.noor_hours = hours;
        }
        if let Some(hours) = self.ahmad_hours {
            draft.ahmad_hours = hours;
        }
        draft
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=cli_command module=cli status=error error={err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> CliResult<()> {
    let mut config = DashConfig::from_env()?;
    if let Some(path) = cli.db {
        config.db_path = path;
    }
    if let Some(log_dir) = &config.log_dir {
        init_logging(config.log_level, &log_dir.to_string_lossy())?;
    }

    let mut conn = open_db(&config.db_path)?;
    let output = run_in_transaction(&mut conn, cli.command, cli.json)?;
    print!("{output}");
    Ok(())
}

/// Executes one command atomically and returns the rendered output.
///
/// The transaction commits only when the command succeeds.
fn run_in_transaction(conn: &mut Connection, command: Command, json: bool) -> CliResult<String> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let output = {
        let service = DashboardService::new(
            SqliteProjectRepository::try_new(&tx)?,
            SqliteContributionRepository::try_new(&tx)?,
        );
        execute(&service, command, json)?
    };
    tx.commit()?;
    Ok(output)
}

fn execute(
    service: &DashboardService<SqliteProjectRepository<'_>, SqliteContributionRepository<'_>>,
    command: Command,
    json: bool,
) -> CliResult<String> {
    match command {
        Command::Metrics => render(json, &service.metrics()?, render_metrics),
        Command::Board { search } => {
            render(json, &service.board(search.as_deref())?, render_board)
        }
        Command::Show { id } => {
            let detail = service
                .project_detail(id)?
                .ok_or_else(|| format!("project not found: {id}"))?;
            render(json, &detail, render_detail)
        }
        Command::Add { client, fields } => {
            let draft = fields.apply(ProjectDraft::new(client, SecuredBy::Both));
            render(json, &service.create_project(&draft)?, render_detail)
        }
        Command::Update { id, client, fields } => {
            let current = service
                .project_detail(id)?
                .ok_or_else(|| format!("project not found: {id}"))?;
            let mut draft = fields.apply(draft_from(&current));
            if let Some(client) = client {
                draft.client = client;
            }
            render(json, &service.update_project(id, &draft)?, render_detail)
        }
        Command::Move { id, status } => {
            service.move_project(id, status)?;
            Ok(format!("moved {id} to {status}\n"))
        }
        Command::Pay {
            id,
            amount,
            payment_ref,
        } => render(
            json,
            &service.record_payment(id, amount, payment_ref.as_deref())?,
            render_detail,
        ),
        Command::Delete { id } => {
            service.delete_project(id)?;
            Ok(format!("deleted {id}\n"))
        }
    }
}

fn draft_from(detail: &ProjectDetail) -> ProjectDraft {
    let project = &detail.project;
    ProjectDraft {
        client: project.client.clone(),
        description: project.description.clone(),
        revenue: project.revenue,
        status: project.status,
        secured_by: project.secured_by,
        noor_hours: detail.noor_hours,
        ahmad_hours: detail.ahmad_hours,
    }
}

fn render<T: Serialize>(
    json: bool,
    value: &T,
    render_text: fn(&T, &mut String) -> std::fmt::Result,
) -> CliResult<String> {
    let mut out = String::new();
    if json {
        out.push_str(&serde_json::to_string_pretty(value)?);
        out.push('\n');
    } else {
        render_text(value, &mut out)?;
    }
    Ok(out)
}

fn render_metrics(metrics: &Metrics, out: &mut String) -> std::fmt::Result {
    writeln!(out, "total revenue  {:>12.2}", metrics.total_revenue)?;
    writeln!(out, "noor share     {:>12.2}", metrics.noor_share)?;
    writeln!(out, "ahmad share    {:>12.2}", metrics.ahmad_share)?;
    writeln!(out, "open projects  {:>12}", metrics.open_projects)?;
    writeln!(out, "paid projects  {:>12}", metrics.paid_projects)
}

fn render_board(board: &Board, out: &mut String) -> std::fmt::Result {
    if board.is_empty() {
        return writeln!(out, "no projects");
    }
    writeln!(out, "{} project(s)", board.len())?;

    let columns: [(&str, &[Project]); 4] = [
        ("new", &board.new),
        ("in_progress", &board.in_progress),
        ("done", &board.done),
        ("paid", &board.paid),
    ];
    for (name, projects) in columns {
        writeln!(out, "[{name}] ({})", projects.len())?;
        for project in projects {
            writeln!(
                out,
                "  {}  {:<24} {:>10.2}  secured_by={}",
                project.id, project.client, project.revenue, project.secured_by
            )?;
        }
    }
    Ok(())
}

fn render_detail(detail: &ProjectDetail, out: &mut String) -> std::fmt::Result {
    let project = &detail.project;
    writeln!(out, "{}  {}", project.id, project.client)?;
    if !project.description.is_empty() {
        writeln!(out, "  {}", project.description)?;
    }
    writeln!(
        out,
        "  status={} secured_by={} revenue={:.2}",
        project.status, project.secured_by, project.revenue
    )?;
    if let Some(reference) = &project.payment_ref {
        writeln!(out, "  payment_ref={reference}")?;
    }
    writeln!(
        out,
        "  hours noor={:.2} ahmad={:.2}",
        detail.noor_hours, detail.ahmad_hours
    )?;
    writeln!(
        out,
        "  split noor={:.2} ahmad={:.2} method={}",
        detail.split.noor_share,
        detail.split.ahmad_share,
        detail.split.method.as_str()
    )
}

fn parse_status(value: &str) -> Result<ProjectStatus, String> {
    ProjectStatus::parse(value.trim())
        .ok_or_else(|| format!("unknown status `{value}`; expected new|in_progress|done|paid"))
}

fn parse_secured_by(value: &str) -> Result<SecuredBy, String> {
    SecuredBy::parse(value.trim())
        .ok_or_else(|| format!("unknown owner `{value}`; expected noor|ahmad|both"))
}
