//! Operator CLI for the portfolio content store.
//!
//! # Responsibility
//! - Expose database initialization, evolution and ordering to operators.
//! - Print machine-readable JSON for listings.

use clap::{Parser, Subcommand};
use folio_core::db::{evolve_content_tables, SqliteSchemaStore};
use folio_core::{
    initialize_database, open_db, AboutItem, BlogCategory, BlogPost, ContentEntity, ContentKind,
    ContentService, Education, Experience, FolioConfig, InitOptions, Project, Skill,
    SqliteContentRepository,
};
use log::info;
use rusqlite::Connection;
use serde::Serialize;
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "folio", author, version, about)]
struct Cli {
    /// SQLite database file; overrides FOLIO_DB_PATH.
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Absolute directory for rolling logs; overrides FOLIO_LOG_DIR.
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create or upgrade tables, add ordering columns, optionally seed.
    InitDb {
        /// Insert default content into empty collections.
        #[arg(long)]
        seed: bool,
    },
    /// Re-run ordering column evolution over every content table.
    Evolve,
    /// Print one collection as JSON in display order.
    List { kind: ContentKind },
    /// Print blog posts with their category as JSON, newest first.
    Posts {
        /// Only posts filed under this category id.
        #[arg(long)]
        category: Option<String>,
    },
    /// Move one entry to `sequence`, shifting its neighbours.
    Move {
        kind: ContentKind,
        id: String,
        sequence: i64,
    },
    /// Print core health and version.
    Ping,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let mut config = FolioConfig::from_env()?;
    if let Some(db) = cli.db {
        config.db_path = db;
    }
    if let Some(log_dir) = cli.log_dir {
        config.log_dir = Some(log_dir);
    }
    folio_core::init_logging(&config)?;

    if let Command::Ping = cli.command {
        println!("folio_core ping={}", folio_core::ping());
        println!("folio_core version={}", folio_core::core_version());
        return Ok(());
    }

    let mut conn = open_db(&config.db_path)?;
    info!(
        "event=cli_command module=cli status=start command={:?}",
        cli.command
    );

    match cli.command {
        Command::InitDb { seed } => {
            let report = initialize_database(&mut conn, &InitOptions { seed })?;
            println!("migrations applied: {}", report.migrations_applied);
            print_evolution(&report.evolution);
            for (kind, rows) in &report.seeded {
                println!("seeded {kind}: {rows}");
            }
        }
        Command::Evolve => {
            let report = evolve_content_tables(&SqliteSchemaStore::new(&conn));
            print_evolution(&report);
            if !report.is_clean() {
                return Err(format!("{} table(s) failed to evolve", report.failures.len()).into());
            }
        }
        Command::List { kind } => print_list(&conn, kind)?,
        Command::Posts { category } => {
            let service = ContentService::new(SqliteContentRepository::try_new(&conn)?);
            let posts = match category.as_deref() {
                Some(category_id) => service.posts_by_category(category_id)?,
                None => service.blog_posts()?,
            };
            println!("{}", serde_json::to_string_pretty(&posts)?);
        }
        Command::Move { kind, id, sequence } => {
            let service = ContentService::new(SqliteContentRepository::try_new(&conn)?);
            let applied = service.move_to_sequence(kind, &id, sequence)?;
            println!("{kind} {id} -> {applied}");
        }
        Command::Ping => {}
    }
    Ok(())
}

fn print_evolution(report: &folio_core::EvolutionReport) {
    for (table, outcome) in &report.outcomes {
        println!("{table}: {outcome:?}");
    }
    for failure in &report.failures {
        eprintln!("{failure}");
    }
}

fn print_list(conn: &Connection, kind: ContentKind) -> Result<(), Box<dyn Error>> {
    let service = ContentService::new(SqliteContentRepository::try_new(conn)?);
    match kind {
        ContentKind::AboutItems => print_entries::<AboutItem>(&service),
        ContentKind::Skills => print_entries::<Skill>(&service),
        ContentKind::Experiences => print_entries::<Experience>(&service),
        ContentKind::Education => print_entries::<Education>(&service),
        ContentKind::Projects => print_entries::<Project>(&service),
        ContentKind::BlogCategories => print_entries::<BlogCategory>(&service),
        ContentKind::BlogPosts => print_entries::<BlogPost>(&service),
    }
}

fn print_entries<E>(
    service: &ContentService<SqliteContentRepository<'_>>,
) -> Result<(), Box<dyn Error>>
where
    E: ContentEntity + Serialize,
{
    let entries = service.list::<E>()?;
    println!("{}", serde_json::to_string_pretty(&entries)?);
    Ok(())
}
