//! Command-line front-end for the student roster.
//!
//! # Responsibility
//! - Map subcommands onto roster service and edit session commands.
//! - Keep output plain and line-oriented for scripting.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use roster_core::{
    format_due_date, init_logging_for_data_path, parse_due_date, resolve_data_path, today,
    EditSession, JsonFileRosterRepository, RosterService, TaskRowPatch, TaskState,
};
use std::error::Error;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

type CliResult<T> = Result<T, Box<dyn Error>>;
type FileRoster = RosterService<JsonFileRosterRepository>;

#[derive(Debug, Parser)]
#[command(name = "roster", version, about = "Track students, research topics and tasks")]
struct Cli {
    /// Roster file (default: $ROSTER_DATA_PATH, else students.json next to the binary)
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    /// trace|debug|info|warn|error
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List students in display order
    List,
    /// Add a student with an empty record
    Add { name: String },
    /// Delete a student and all of their tasks
    Delete {
        name: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Show research, memo and tasks of a student
    Show { name: String },
    /// Update research topic and/or memo
    Set {
        name: String,
        #[arg(long)]
        research: Option<String>,
        #[arg(long)]
        memo: Option<String>,
    },
    /// Append a task
    AddTask {
        name: String,
        task: String,
        /// YYYY-MM-DD (default: today)
        #[arg(long, value_parser = parse_due_arg)]
        due: Option<NaiveDate>,
        #[arg(long, value_parser = parse_state_arg)]
        state: Option<TaskState>,
    },
    /// Remove a task by its 1-based position
    RemoveTask { name: String, index: usize },
    /// Edit a task by its 1-based position
    SetTask {
        name: String,
        index: usize,
        #[arg(long)]
        task: Option<String>,
        #[arg(long, value_parser = parse_due_arg)]
        due: Option<NaiveDate>,
        #[arg(long, value_parser = parse_state_arg)]
        state: Option<TaskState>,
    },
}

impl Command {
    fn label(&self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Add { .. } => "add",
            Self::Delete { .. } => "delete",
            Self::Show { .. } => "show",
            Self::Set { .. } => "set",
            Self::AddTask { .. } => "add-task",
            Self::RemoveTask { .. } => "remove-task",
            Self::SetTask { .. } => "set-task",
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let data_path = resolve_data_path(cli.data.as_deref());
    if let Err(err) = init_logging_for_data_path(&data_path, cli.log_level.as_deref()) {
        eprintln!("warning: logging disabled: {err}");
    }

    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout().lock();
    match run(cli.command, data_path, &mut stdin.lock(), &mut stdout) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(
    command: Command,
    data_path: PathBuf,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> CliResult<()> {
    log::debug!(
        "event=cli_command module=cli status=start command={}",
        command.label()
    );
    let mut service = RosterService::open(JsonFileRosterRepository::new(&data_path))?;
    let mut session = EditSession::new();

    match command {
        Command::List => {
            for name in service.student_names() {
                let count = service.student(&name).map_or(0, |record| record.tasks.len());
                writeln!(out, "{name}\t{count} task(s)")?;
            }
        }
        Command::Add { name } => {
            let stored = session.add_student(&mut service, &name)?;
            writeln!(out, "added {stored}")?;
        }
        Command::Delete { name, yes } => {
            if !yes && !confirm(input, out, &format!("Delete \"{}\"? [y/N] ", name.trim()))? {
                writeln!(out, "cancelled")?;
                return Ok(());
            }
            if session.delete_student(&mut service, &name)? {
                writeln!(out, "deleted {}", name.trim())?;
            } else {
                writeln!(out, "{} not found; nothing deleted", name.trim())?;
            }
        }
        Command::Show { name } => {
            session.select(&service, &name)?;
            print_session(&session, out)?;
        }
        Command::Set {
            name,
            research,
            memo,
        } => {
            session.select(&service, &name)?;
            if let Some(research) = research {
                session.set_research(research);
            }
            if let Some(memo) = memo {
                session.set_memo(memo);
            }
            save_if_dirty(&mut session, &mut service, out)?;
        }
        Command::AddTask {
            name,
            task,
            due,
            state,
        } => {
            session.select(&service, &name)?;
            let row = session.add_task_row_on(due.unwrap_or_else(today));
            session.update_task_row(
                row,
                TaskRowPatch {
                    name: Some(task),
                    due: None,
                    state,
                },
            )?;
            save_if_dirty(&mut session, &mut service, out)?;
        }
        Command::RemoveTask { name, index } => {
            session.select(&service, &name)?;
            let removed = session.delete_task_row(index.checked_sub(1))?;
            save_if_dirty(&mut session, &mut service, out)?;
            writeln!(out, "removed {}", removed.name)?;
        }
        Command::SetTask {
            name,
            index,
            task,
            due,
            state,
        } => {
            session.select(&service, &name)?;
            let row = index.checked_sub(1).ok_or("task positions start at 1")?;
            session.update_task_row(
                row,
                TaskRowPatch {
                    name: task,
                    due,
                    state,
                },
            )?;
            save_if_dirty(&mut session, &mut service, out)?;
        }
    }
    Ok(())
}

fn save_if_dirty(
    session: &mut EditSession,
    service: &mut FileRoster,
    out: &mut impl Write,
) -> CliResult<()> {
    if session.is_dirty() {
        session.save(service)?;
        writeln!(out, "saved {}", session.selected().unwrap_or_default())?;
    }
    Ok(())
}

fn print_session(session: &EditSession, out: &mut impl Write) -> CliResult<()> {
    let today = today();
    writeln!(out, "student:  {}", session.selected().unwrap_or_default())?;
    writeln!(out, "research: {}", session.research())?;
    writeln!(out, "tasks:")?;
    for (position, task) in session.rows().iter().enumerate() {
        let marker = if task.is_overdue(today) { "!" } else { " " };
        writeln!(
            out,
            "  {:>2}. {marker} {}  {:<10}  {}",
            position + 1,
            format_due_date(task.due),
            task.state.label(),
            task.name
        )?;
    }
    writeln!(out, "memo:")?;
    for line in session.memo().lines() {
        writeln!(out, "  {line}")?;
    }
    Ok(())
}

fn confirm(input: &mut impl BufRead, out: &mut impl Write, prompt: &str) -> CliResult<bool> {
    write!(out, "{prompt}")?;
    out.flush()?;
    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}

fn parse_due_arg(value: &str) -> Result<NaiveDate, String> {
    parse_due_date(value).ok_or_else(|| format!("expected YYYY-MM-DD, got `{value}`"))
}

fn parse_state_arg(value: &str) -> Result<TaskState, String> {
    TaskState::parse_label(value).ok_or_else(|| {
        format!("unknown state `{value}`; expected NotStarted|InProgress|Done")
    })
}

#[cfg(test)]
mod tests {
    use super::{run, Cli, Command};
    use clap::Parser;
    use roster_core::{JsonFileRosterRepository, RosterRepository, TaskState};
    use std::path::{Path, PathBuf};

    fn exec(path: &Path, args: &[&str], stdin: &str) -> Result<String, String> {
        let mut argv = vec!["roster"];
        argv.extend_from_slice(args);
        let cli = Cli::try_parse_from(argv).map_err(|err| err.to_string())?;
        let mut input = stdin.as_bytes();
        let mut out = Vec::new();
        run(cli.command, path.to_path_buf(), &mut input, &mut out).map_err(|err| err.to_string())?;
        Ok(String::from_utf8(out).expect("command output should be UTF-8"))
    }

    fn data_file(dir: &tempfile::TempDir) -> PathBuf {
        dir.path().join("students.json")
    }

    #[test]
    fn add_and_list_students() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = data_file(&dir);
        exec(&path, &["add", "Alice"], "").expect("run command");
        exec(&path, &["add", "Bob"], "").expect("run command");

        let listed = exec(&path, &["list"], "").expect("run command");
        assert_eq!(listed, "Alice\t0 task(s)\nBob\t0 task(s)\n");
    }

    #[test]
    fn duplicate_add_reports_error() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = data_file(&dir);
        exec(&path, &["add", "Alice"], "").expect("run command");
        let err = exec(&path, &["add", "Alice"], "").expect_err("duplicate add must fail");
        assert!(err.contains("already exists"));
    }

    #[test]
    fn task_commands_edit_and_persist() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = data_file(&dir);
        exec(&path, &["add", "Alice"], "").expect("run command");
        exec(&path, &["set", "Alice", "--research", "ML"], "").expect("run command");
        exec(
            &path,
            &["add-task", "Alice", "survey", "--due", "2024-01-01", "--state", "InProgress"],
            "",
        )
        .expect("run command");
        exec(&path, &["add-task", "Alice", "draft"], "").expect("run command");
        exec(&path, &["set-task", "Alice", "2", "--state", "done"], "").expect("run command");
        exec(&path, &["remove-task", "Alice", "1"], "").expect("run command");

        let roster = JsonFileRosterRepository::new(&path)
            .load()
            .expect("reload roster file");
        let record = roster.get("Alice").expect("student should be stored");
        assert_eq!(record.research, "ML");
        assert_eq!(record.tasks.len(), 1);
        assert_eq!(record.tasks[0].name, "draft");
        assert_eq!(record.tasks[0].state, TaskState::Done);
    }

    #[test]
    fn remove_task_rejects_position_zero() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = data_file(&dir);
        exec(&path, &["add", "Alice"], "").expect("run command");
        let err = exec(&path, &["remove-task", "Alice", "0"], "")
            .expect_err("position zero must fail");
        assert!(err.contains("select a task row"));
    }

    #[test]
    fn delete_asks_for_confirmation() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = data_file(&dir);
        exec(&path, &["add", "Alice"], "").expect("run command");

        let out = exec(&path, &["delete", "Alice"], "n\n").expect("run command");
        assert!(out.ends_with("cancelled\n"));
        let out = exec(&path, &["delete", "Alice"], "y\n").expect("run command");
        assert!(out.ends_with("deleted Alice\n"));
        assert_eq!(exec(&path, &["list"], "").expect("run command"), "");
    }

    #[test]
    fn show_marks_overdue_tasks() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = data_file(&dir);
        exec(&path, &["add", "Alice"], "").expect("run command");
        exec(&path, &["add-task", "Alice", "old", "--due", "2000-01-01"], "").expect("run command");

        let out = exec(&path, &["show", "Alice"], "").expect("run command");
        assert!(out.contains(" 1. ! 2000-01-01  NotStarted  old"));
    }

    #[test]
    fn invalid_due_is_rejected_by_parser() {
        let result = Cli::try_parse_from(["roster", "add-task", "A", "t", "--due", "01/02/2024"]);
        assert!(result.is_err());
        let cli = Cli::try_parse_from(["roster", "--data", "/tmp/x.json", "list"])
            .expect("list with --data should parse");
        assert!(matches!(cli.command, Command::List));
    }
}
