//! studiodesk CLI.
//!
//! Thin shell over the command layer: opens the store, resolves the acting
//! user's role fresh from `user_roles`, and prints reports. The role is
//! never taken from the command line; `--user` supplies an identity and
//! the store says what it may do.

use std::process::ExitCode;

use studiodesk::commands;
use studiodesk::db::StudioDb;
use studiodesk::devtools;
use studiodesk::error::AppError;
use studiodesk::permissions::{role_label, Role};
use studiodesk::reports::CommissionFilter;
use studiodesk::util::format_inr;

const USAGE: &str = "\
studiodesk - studio CRM reports and administration

USAGE:
  studiodesk seed
  studiodesk dashboard  --user <id> [--json]
  studiodesk projects   --user <id> [--json]
  studiodesk commission --user <id> [--enabled-only] [--json]
  studiodesk users      --user <id>

The database lives at ~/.studiodesk/studio.db (override: STUDIODESK_DB).";

fn main() -> ExitCode {
    env_logger::init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if err.is_user_error() {
                eprintln!("{err}");
            } else {
                log::error!("{err}");
                eprintln!("Error: {err}");
            }
            ExitCode::FAILURE
        }
    }
}

struct Args {
    command: String,
    user: Option<String>,
    json: bool,
    enabled_only: bool,
}

fn parse_args() -> Option<Args> {
    let mut args = std::env::args().skip(1);
    let command = args.next()?;

    let mut parsed = Args {
        command,
        user: None,
        json: false,
        enabled_only: false,
    };

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--user" => parsed.user = args.next(),
            "--json" => parsed.json = true,
            "--enabled-only" => parsed.enabled_only = true,
            other => {
                eprintln!("Unknown argument: {other}");
                return None;
            }
        }
    }
    Some(parsed)
}

fn run() -> Result<(), AppError> {
    let Some(args) = parse_args() else {
        eprintln!("{USAGE}");
        return Ok(());
    };

    let db = StudioDb::open()?;

    if args.command == "seed" {
        let summary = devtools::seed_demo_data(&db)?;
        println!(
            "Seeded {} clients, {} projects, {} tasks.",
            summary.clients, summary.projects, summary.tasks
        );
        println!("Demo users:");
        println!("  admin:          {}", summary.admin_user_id);
        println!("  sales_team:     {}", summary.sales_user_id);
        println!("  music_producer: {}", summary.producer_user_id);
        return Ok(());
    }

    // Every other command acts as a user; resolve the role fresh.
    let user_id = args.user.as_deref().unwrap_or("");
    if user_id.is_empty() {
        return Err(AppError::required("--user <id>"));
    }
    let role = commands::fetch_role(&db, user_id)?;

    match args.command.as_str() {
        "dashboard" => print_dashboard(&db, role, args.json),
        "projects" => print_projects(&db, role, args.json),
        "commission" => {
            let filter = if args.enabled_only {
                CommissionFilter::EnabledOnly
            } else {
                CommissionFilter::All
            };
            print_commission(&db, role, filter, args.json)
        }
        "users" => print_users(&db, role),
        _ => {
            eprintln!("{USAGE}");
            Ok(())
        }
    }
}

fn print_dashboard(db: &StudioDb, role: Option<Role>, json: bool) -> Result<(), AppError> {
    let summary = commands::dashboard(db, role)?;

    if json {
        println!("{}", to_json(&summary));
        return Ok(());
    }

    println!("Dashboard (signed in as {})", summary.role_label);
    println!("  Clients:  {}", summary.total_clients);
    println!("  Projects: {}", summary.total_projects);
    if summary.show_money {
        println!("  Revenue:  {}", format_inr(summary.total_revenue));
        println!("  Budget:   {}", format_inr(summary.total_budget));
    }
    println!("  By status:");
    for bucket in &summary.status_counts {
        println!("    {:<10} {}", bucket.status, bucket.count);
    }
    println!("  Last {} months:", summary.monthly.len());
    for month in &summary.monthly {
        if summary.show_money {
            println!(
                "    {:<7} clients {:>3}  projects {:>3}  revenue {}",
                month.month,
                month.clients,
                month.projects,
                format_inr(month.revenue)
            );
        } else {
            println!(
                "    {:<7} clients {:>3}  projects {:>3}",
                month.month, month.clients, month.projects
            );
        }
    }
    Ok(())
}

fn print_projects(db: &StudioDb, role: Option<Role>, json: bool) -> Result<(), AppError> {
    let rows = commands::projects_overview(db, role)?;

    if json {
        println!("{}", to_json(&rows));
        return Ok(());
    }

    println!("Projects ({}), viewing as {}", rows.len(), role_label(role));
    for row in &rows {
        let money = match row.money_left {
            Some(left) => format!("  remaining {}", format_inr(left)),
            None => String::new(),
        };
        println!(
            "  {:<24} {:<16} {:<10} {:>3}%{}",
            row.name, row.client_name, row.status, row.progress, money
        );
    }
    Ok(())
}

fn print_commission(
    db: &StudioDb,
    role: Option<Role>,
    filter: CommissionFilter,
    json: bool,
) -> Result<(), AppError> {
    let report = commands::commission(db, role, filter)?;

    if json {
        println!("{}", to_json(&report));
        return Ok(());
    }

    println!("Sales Commission");
    println!("  Total budget:     {}", format_inr(report.total_budget));
    println!("  Total commission: {}", format_inr(report.total_commission));
    println!(
        "  Enabled projects: {} / {}",
        report.enabled_count, report.total_count
    );
    for row in &report.rows {
        println!(
            "  {:<24} {:<16} {:>6.1}%  {}",
            row.project_name,
            row.client_name,
            row.commission_percentage,
            format_inr(row.commission_amount)
        );
    }
    Ok(())
}

fn print_users(db: &StudioDb, role: Option<Role>) -> Result<(), AppError> {
    let users = commands::list_users(db, role)?;
    println!("Users ({})", users.len());
    for user in &users {
        let label = role_label(Role::parse(&user.role));
        println!("  {:<36} {:<28} {}", user.id, user.email, label);
    }
    Ok(())
}

fn to_json<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("{{\"error\":\"{e}\"}}"))
}
