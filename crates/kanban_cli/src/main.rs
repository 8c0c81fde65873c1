//! `cli_kanban` entry point.
//!
//! # Responsibility
//! - Resolve configuration from environment and flags.
//! - List or delete workspace files, or open a workspace and print its board.

use clap::Parser;
use kanban_core::session::{delete_workspace, SessionError};
use kanban_core::{init_logging, BoardSnapshot, EngineConfig, KanbanApp};
use log::error;
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

/// Terminal kanban board with one SQLite file per workspace.
#[derive(Parser, Debug)]
#[command(name = "cli_kanban", version, about = "Kanban board for the terminal")]
struct Cli {
    /// Workspace to open (lowercase letters, digits, `-`, `_`; at most 32).
    #[arg(short, long)]
    workspace: Option<String>,

    /// List available workspaces and exit.
    #[arg(short, long, conflicts_with = "delete")]
    list: bool,

    /// Delete a workspace database and exit.
    #[arg(short, long, value_name = "NAME")]
    delete: Option<String>,

    /// Print the board snapshot as JSON.
    #[arg(long)]
    json: bool,

    /// Directory holding workspace databases (default `~/.cli_kanban`).
    #[arg(long, value_name = "PATH")]
    data_dir: Option<PathBuf>,

    /// trace | debug | info | warn | error
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=cli_exit module=cli status=error error={err}");
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn with_kind(err: SessionError) -> String {
    format!("[{}] {err}", err.kind())
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let mut config = EngineConfig::from_env()?;
    if let Some(data_dir) = cli.data_dir {
        config = config.with_data_dir(data_dir);
    }
    if let Some(level) = cli.log_level {
        config = config.with_log_level(level);
    }
    if let Err(err) = init_logging(&config.log_level, config.log_dir()) {
        eprintln!("warning: logging disabled: {err}");
    }

    let locator = config.locator();
    if cli.list {
        let workspaces = locator.list()?;
        if workspaces.is_empty() {
            println!("No workspaces found.");
        }
        for entry in workspaces {
            println!("{}\t{}", entry.name, entry.path.display());
        }
        return Ok(());
    }

    if let Some(name) = cli.delete {
        delete_workspace(&locator, &name).map_err(with_kind)?;
        println!("Deleted workspace {name}");
        return Ok(());
    }

    let workspace = cli.workspace.unwrap_or(config.default_workspace.clone());
    let mut app = KanbanApp::open(config.store_opener(), &workspace).map_err(with_kind)?;
    let snapshot = app.snapshot();
    app.close();

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        print!("{}", render_text(&snapshot));
    }
    Ok(())
}

fn render_text(snapshot: &BoardSnapshot) -> String {
    let mut out = format!(
        "Workspace: {} ({} tasks)\n",
        snapshot.workspace,
        snapshot.task_count()
    );
    for column in &snapshot.columns {
        out.push_str(&format!("\n{} [{}]\n", column.name, column.tasks.len()));
        for task in &column.tasks {
            out.push_str(&format!("  {}. {}\n", task.position + 1, task.title));
            if let Some(description) = &task.description {
                out.push_str(&format!("     {description}\n"));
            }
        }
    }
    out
}
