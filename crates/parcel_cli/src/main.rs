//! CLI entry point for the parcel core.
//!
//! # Responsibility
//! - Verify `parcel_core` linkage (`ping`).
//! - Walk a parcel through the delivery workflow against a real database
//!   (`demo`) for quick local sanity checks.

use clap::{Parser, Subcommand};
use log::error;
use parcel_core::db::{open_db, open_db_in_memory};
use parcel_core::{ClientId, Parcel, ParcelService, SqliteParcelStore};
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "parcel", version, about = "Parcel tracker storage tools")]
struct Cli {
    /// SQLite database file. Uses an in-memory database when omitted.
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Enable file logging into this absolute directory.
    #[arg(long, global = true)]
    log_dir: Option<String>,

    /// Log level for file logging (trace|debug|info|warn|error).
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print core health and version.
    Ping,
    /// Register parcels for a client and run them through the workflow.
    Demo {
        #[arg(long, default_value_t = 1000)]
        client: ClientId,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli
            .log_level
            .as_deref()
            .unwrap_or_else(|| parcel_core::default_log_level());
        if let Err(err) = parcel_core::init_logging(level, log_dir) {
            eprintln!("logging disabled: {err}");
        }
    }

    let result = match cli.command {
        Command::Ping => {
            println!("parcel_core ping={}", parcel_core::ping());
            println!("parcel_core version={}", parcel_core::core_version());
            Ok(())
        }
        Command::Demo { client } => run_demo(cli.db, client),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=cli_failed module=cli status=error error={err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run_demo(db: Option<PathBuf>, client: ClientId) -> Result<(), Box<dyn Error>> {
    let conn = match db {
        Some(path) => open_db(path)?,
        None => open_db_in_memory()?,
    };
    let service = ParcelService::new(SqliteParcelStore::try_new(&conn)?);

    let parcel = service.register(client, "Pskov, Sadovaya st. 10")?;
    print_parcel("registered", &parcel);

    service.change_address(parcel.number, "Saratov, Verkhnyaya st. 5")?;
    print_parcel("address changed", &service.get(parcel.number)?);

    if let Some(status) = service.next_status(parcel.number)? {
        println!("parcel {} moved to {status}", parcel.number);
    }

    // Both are no-ops now that the parcel has left `registered`.
    service.change_address(parcel.number, "Moscow, Lenina st. 1")?;
    service.delete(parcel.number)?;
    print_parcel("after gated requests", &service.get(parcel.number)?);

    let cancelled = service.register(client, "Kazan, Baumana st. 3")?;
    service.delete(cancelled.number)?;
    println!("parcel {} cancelled", cancelled.number);

    println!("parcels of client {client}:");
    for parcel in service.parcels_of_client(client)? {
        print_parcel("  ", &parcel);
    }

    Ok(())
}

fn print_parcel(label: &str, parcel: &Parcel) {
    println!("{}", describe_parcel(label, parcel));
}

fn describe_parcel(label: &str, parcel: &Parcel) -> String {
    let gate = if parcel.is_registered() {
        "open"
    } else {
        "closed"
    };
    format!(
        "{label} #{} client={} status={} gate={gate} address={:?} created_at={}",
        parcel.number, parcel.client, parcel.status, parcel.address, parcel.created_at
    )
}
