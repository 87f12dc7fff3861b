use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use lifelog_core::{Category, GroupMode, Section};

mod commands;
mod config;
mod render;
mod state;

use commands::{AddArgs, RecordEdit, ReportArgs};
use config::TimeView;

#[derive(Parser, Debug)]
#[command(
    name = "lifelog",
    version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("LIFELOG_BUILD_SHA"), ")"),
    about = "Time, money and output log reports"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a default config.toml into the state directory
    Init,

    /// Group, roll up and score the stored records
    Report {
        /// Time tab: project, week or month
        #[arg(long)]
        time: Option<TimeView>,

        #[arg(long)]
        money: Option<GroupMode>,

        #[arg(long)]
        output: Option<GroupMode>,

        /// Evaluation instant (RFC3339); defaults to the current time
        #[arg(long, value_parser = parse_instant)]
        now: Option<DateTime<Utc>>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Record a new entry
    Add {
        #[command(subcommand)]
        kind: AddCommand,
    },

    /// Change fields of a stored record; omitted flags keep their values
    Edit {
        id: String,

        #[command(flatten)]
        changes: EditArgs,
    },

    Budget {
        #[command(subcommand)]
        command: BudgetCommand,
    },

    Project {
        #[command(subcommand)]
        command: ProjectCommand,
    },

    Task {
        #[command(subcommand)]
        command: TaskCommand,
    },

    /// Flip the expanded flag of a group (section: time, money, output, project)
    Expand { section: Section, key: String },

    /// Recently used continuous project titles
    Recent {
        #[arg(long, default_value_t = 8)]
        limit: usize,
    },
}

#[derive(Args, Debug)]
struct EntryArgs {
    #[arg(long)]
    activity: String,

    /// Calendar day (YYYY-MM-DD); keeps the current time of day
    #[arg(long)]
    date: Option<NaiveDate>,

    #[arg(long)]
    note: Option<String>,

    /// Attachment file id
    #[arg(long)]
    attachment: Option<String>,
}

#[derive(Subcommand, Debug)]
enum AddCommand {
    Time {
        #[command(flatten)]
        entry: EntryArgs,

        /// Minutes spent
        #[arg(long)]
        duration: Option<f64>,

        /// 1 (high) to 3 (low)
        #[arg(long, default_value_t = 2)]
        priority: u8,

        /// Offer this title as a quick pick later
        #[arg(long)]
        continuous: bool,
    },
    Money {
        #[command(flatten)]
        entry: EntryArgs,

        #[arg(long)]
        amount: Option<f64>,
    },
    Output {
        #[command(flatten)]
        entry: EntryArgs,

        #[arg(long, default_value = "code")]
        kind: String,

        /// 1 to 5
        #[arg(long, default_value_t = 3)]
        satisfaction: u8,

        #[arg(long, default_value = "")]
        link: String,
    },
}

#[derive(Args, Debug)]
struct EditArgs {
    #[arg(long)]
    activity: Option<String>,

    /// Move the record to this day at the current time of day
    #[arg(long)]
    date: Option<NaiveDate>,

    /// Pass an empty string to clear the note
    #[arg(long)]
    note: Option<String>,

    #[arg(long)]
    attachment: Option<String>,

    #[arg(long)]
    duration: Option<f64>,

    #[arg(long)]
    priority: Option<u8>,

    #[arg(long)]
    continuous: Option<bool>,

    #[arg(long)]
    amount: Option<f64>,

    #[arg(long)]
    kind: Option<String>,

    #[arg(long)]
    satisfaction: Option<u8>,

    #[arg(long)]
    link: Option<String>,
}

impl From<EditArgs> for RecordEdit {
    fn from(a: EditArgs) -> Self {
        RecordEdit {
            activity: a.activity,
            duration: a.duration,
            amount: a.amount,
            date: a.date,
            priority: a.priority,
            continuous: a.continuous,
            kind: a.kind,
            satisfaction: a.satisfaction,
            link: a.link,
            note: a.note,
            attachment: a.attachment,
        }
    }
}

#[derive(Subcommand, Debug)]
enum BudgetCommand {
    /// Month-to-date spend against the ceiling
    Show,
    /// Set the monthly ceiling
    Set { amount: f64 },
}

#[derive(Subcommand, Debug)]
enum ProjectCommand {
    /// Switch a project between doing and done
    Toggle { title: String },
}

#[derive(Subcommand, Debug)]
enum TaskCommand {
    /// Switch one time record between doing and done
    Toggle { id: String },
}

fn parse_instant(s: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| format!("expected RFC3339 timestamp: {e}"))
}

fn add_args(entry: EntryArgs) -> AddArgs {
    AddArgs {
        activity: entry.activity,
        date: entry.date,
        note: entry.note,
        attachment: entry.attachment,
        ..AddArgs::default()
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let dir = state::ensure_lifelog_home()?;
    let cfg = config::load_config(&dir).context("loading config")?;
    lifelog_core::logging::init(&cfg.logging.level);
    tracing::debug!(dir = %dir.display(), "state directory");

    match cli.command {
        Command::Init => config::init_config(&dir)?,

        Command::Report {
            time,
            money,
            output,
            now,
            json,
        } => {
            let args = ReportArgs {
                time,
                money,
                output,
                now,
            };
            commands::report(&dir, &args, json)?;
        }

        Command::Add { kind } => {
            let (category, args) = match kind {
                AddCommand::Time {
                    entry,
                    duration,
                    priority,
                    continuous,
                } => (
                    Category::Time,
                    AddArgs {
                        duration,
                        priority,
                        continuous,
                        ..add_args(entry)
                    },
                ),
                AddCommand::Money { entry, amount } => (
                    Category::Money,
                    AddArgs {
                        amount,
                        ..add_args(entry)
                    },
                ),
                AddCommand::Output {
                    entry,
                    kind,
                    satisfaction,
                    link,
                } => (
                    Category::Output,
                    AddArgs {
                        kind,
                        satisfaction,
                        link,
                        ..add_args(entry)
                    },
                ),
            };
            let draft = commands::draft_for(category, args)?;
            let id = commands::add(&dir, draft, Utc::now())?;
            println!("Added {} record {}", category.as_str(), id);
        }

        Command::Edit { id, changes } => {
            commands::edit(&dir, &id, changes.into(), Utc::now())?;
            println!("Updated record {id}");
        }

        Command::Budget { command } => match command {
            BudgetCommand::Show => commands::budget_show(&dir, Utc::now())?,
            BudgetCommand::Set { amount } => {
                let ceiling = commands::budget_set(&dir, amount)?;
                println!("Monthly budget set to {}", lifelog_core::format::money(ceiling.value()));
            }
        },

        Command::Project {
            command: ProjectCommand::Toggle { title },
        } => {
            let change = commands::project_toggle(&dir, &title)?;
            println!("{}: {} -> {}", change.title, change.from.as_str(), change.to.as_str());
        }

        Command::Task {
            command: TaskCommand::Toggle { id },
        } => {
            let toggle = commands::task_toggle(&dir, &id)?;
            println!("{}: {} -> {}", toggle.record_id, toggle.from.as_str(), toggle.to.as_str());
        }

        Command::Expand { section, key } => {
            let expanded = commands::expand(&dir, section, &key)?;
            let state = if expanded { "expanded" } else { "collapsed" };
            println!("{section}:{key} {state}");
        }

        Command::Recent { limit } => {
            let titles = commands::recent(&dir, limit)?;
            if titles.is_empty() {
                println!("(no continuous projects yet)");
            }
            for t in titles {
                println!("{t}");
            }
        }
    }

    Ok(())
}
