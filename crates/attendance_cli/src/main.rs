//! Command-line interaction layer for the attendance tracker.
//!
//! # Responsibility
//! - Map subcommands onto `attendance_core` service calls.
//! - Render results to stdout and failures to stderr with a non-zero exit.

use attendance_core::{
    core_version, distinct_students, init_logging, parse_date, subject_breakdown,
    AttendanceStore, CsvAttendanceService, MarkAttendance, Period, ServiceError, Status, Subject,
    TrackerConfig, ALL_SUBJECTS,
};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use log::warn;
use std::path::PathBuf;
use std::process::ExitCode;

/// Attendance tracker: students, per-period attendance and percentages.
#[derive(Parser)]
#[command(name = "attendance")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Directory holding students.csv and attendance_data.csv.
    #[arg(long, global = true, env = "ATTENDANCE_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Log level (trace|debug|info|warn|error).
    #[arg(long, global = true, env = "ATTENDANCE_LOG_LEVEL")]
    log_level: Option<String>,

    /// Absolute directory for rolling log files; logging is off when unset.
    #[arg(long, global = true, env = "ATTENDANCE_LOG_DIR")]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a student.
    AddStudent {
        name: String,
    },

    /// List registered students.
    Students,

    /// Record attendance for a registered student.
    Mark {
        #[arg(short, long)]
        student: String,

        #[arg(long)]
        subject: String,

        /// `Period 1`..`Period 8`, or just the number.
        #[arg(short, long)]
        period: String,

        /// Present or Absent.
        #[arg(long, default_value = "Present")]
        status: String,

        /// YYYY-MM-DD; defaults to today.
        #[arg(short, long)]
        date: Option<String>,
    },

    /// Show all records with their row numbers.
    Records,

    /// Attendance percentage for one student; lists students with records
    /// when no student is given.
    Percentage {
        #[arg(short, long)]
        student: Option<String>,

        /// Subject name, or `All`.
        #[arg(long, default_value = ALL_SUBJECTS)]
        subject: String,

        /// Also list every subject separately.
        #[arg(long)]
        breakdown: bool,
    },

    /// Replace fields of the record at a row number (starts from 0).
    Modify {
        row: usize,

        #[arg(short, long)]
        student: Option<String>,

        #[arg(long)]
        subject: Option<String>,

        #[arg(short, long)]
        period: Option<String>,

        #[arg(long)]
        status: Option<String>,

        #[arg(short, long)]
        date: Option<String>,
    },

    /// Delete the record at a row number (starts from 0).
    Delete {
        row: usize,
    },

    /// List selectable subjects, periods and statuses.
    Options,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = resolve_config(&cli);

    if let Some(log_dir) = &config.log_dir {
        if let Err(err) = init_logging(&config.log_level, log_dir) {
            eprintln!("warning: logging disabled: {err}");
        }
    }

    match run(cli.command, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            warn!("event=cli_command module=cli status=error error={err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn resolve_config(cli: &Cli) -> TrackerConfig {
    let mut config = TrackerConfig::from_env();
    if let Some(dir) = &cli.data_dir {
        config.data_dir = dir.clone();
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if let Some(dir) = &cli.log_dir {
        config.log_dir = Some(dir.clone());
    }
    config
}

fn run(command: Commands, config: &TrackerConfig) -> Result<(), ServiceError> {
    let service = CsvAttendanceService::open(config)?;
    match command {
        Commands::AddStudent { name } => {
            let student = service.register_student(&name)?;
            println!("Student added: {student}");
        }
        Commands::Students => {
            let students = service.list_students()?;
            if students.is_empty() {
                println!("No students found. Add students first.");
            }
            for student in students {
                println!("{student}");
            }
        }
        Commands::Mark {
            student,
            subject,
            period,
            status,
            date,
        } => {
            let request = MarkAttendance {
                date: date.unwrap_or_else(|| today().format("%Y-%m-%d").to_string()),
                student_name: student,
                subject,
                period,
                status,
            };
            service.mark_attendance(&request)?;
            println!("Attendance marked.");
        }
        Commands::Records => {
            let entries = service.list_records()?;
            if entries.is_empty() {
                println!("No attendance records available.");
            }
            for entry in entries {
                println!("{:>4}  {}", entry.index, entry.record);
            }
        }
        Commands::Percentage {
            student,
            subject,
            breakdown,
        } => {
            let Some(student) = student else {
                let records = service.records().load()?;
                for name in distinct_students(&records) {
                    println!("{name}");
                }
                return Ok(());
            };
            let report = service.percentage(&student, Some(&subject))?;
            println!("{report}");
            if breakdown {
                let records = service.records().load()?;
                for (subject, report) in subject_breakdown(&records, &student) {
                    println!("  {subject}: {report}");
                }
            }
        }
        Commands::Modify {
            row,
            student,
            subject,
            period,
            status,
            date,
        } => {
            let id = service.entry_at(row)?.id;
            let mut draft = service.edit_draft(id, today())?;
            if let Some(name) = student {
                draft.student_name = name;
            }
            if let Some(value) = subject {
                draft.subject =
                    Subject::parse(&value).ok_or(ServiceError::InvalidSubject(value))?;
            }
            if let Some(value) = period {
                draft.period = Period::parse(&value).ok_or(ServiceError::InvalidPeriod(value))?;
            }
            if let Some(value) = status {
                draft.status = Status::parse(&value).ok_or(ServiceError::InvalidStatus(value))?;
            }
            if let Some(value) = date {
                draft.date = parse_date(&value).ok_or(ServiceError::InvalidDate(value))?;
            }
            service.save_draft(id, &draft)?;
            println!("Record updated: {}", draft.to_record());
        }
        Commands::Delete { row } => {
            let id = service.entry_at(row)?.id;
            let removed = service.delete_record(id)?;
            println!("Record deleted: {removed}");
        }
        Commands::Options => print_options(),
    }
    Ok(())
}

fn print_options() {
    let subjects: Vec<String> = Subject::ALL.into_iter().map(String::from).collect();
    let periods: Vec<String> = Period::ALL.into_iter().map(String::from).collect();
    let statuses: Vec<String> = Status::ALL.into_iter().map(String::from).collect();
    println!("Subjects: {}", subjects.join(", "));
    println!("Periods:  {}", periods.join(", "));
    println!("Status:   {}", statuses.join(", "));
    println!("attendance_core {}", core_version());
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}
