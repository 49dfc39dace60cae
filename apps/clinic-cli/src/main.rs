use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use clinic_api::model::{Bill, BillStatus, LoginRequest, RegisterRequest, Role};
use clinic_api::{
    ApiError, AppointmentsApi, BillsApi, ClinicClient, ErrorKind, MedicalRecordsApi, Redirect,
    UsersApi,
};
use mimalloc::MiMalloc;
use runtime::{AppConfig, CliArgs};
use serde::Serialize;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Command-line client for the dental clinic REST API
#[derive(Parser)]
#[command(name = "clinic-cli")]
#[command(about = "Command-line client for the dental clinic REST API")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// API base URL (overrides config)
    #[arg(long)]
    base_url: Option<String>,

    /// Print current configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and store the session
    Login {
        username: String,
        #[arg(long)]
        password: String,
    },
    /// Create an account and store the session
    Register(RegisterArgs),
    /// Drop the stored session
    Logout,
    /// Show the logged-in user
    Whoami,
    /// Appointment operations
    #[command(subcommand)]
    Appointments(AppointmentCommand),
    /// Bill operations
    #[command(subcommand)]
    Bills(BillCommand),
    /// Medical record operations
    #[command(subcommand)]
    Records(RecordCommand),
    /// Validate configuration and print it
    Check,
}

#[derive(Args)]
struct RegisterArgs {
    #[arg(long)]
    username: String,
    #[arg(long)]
    email: String,
    #[arg(long)]
    password: String,
    /// PATIENT, DOCTOR or RECEPTION
    #[arg(long, default_value = "PATIENT")]
    role: Role,
    #[arg(long)]
    first_name: String,
    #[arg(long)]
    last_name: String,
    #[arg(long)]
    phone: String,
}

#[derive(Subcommand)]
enum AppointmentCommand {
    List,
    Get { id: i64 },
    ByPatient { patient_id: i64 },
    ByDoctor { doctor_id: i64 },
    /// Appointments on a day (YYYY-MM-DD)
    ByDate { date: NaiveDate },
    Delete { id: i64 },
}

#[derive(Subcommand)]
enum BillCommand {
    List,
    Get { id: i64 },
    ByPatient { patient_id: i64 },
    ByStatus { status: BillStatus },
    /// Mark a bill as paid
    Pay {
        id: i64,
        #[arg(long, default_value = "CASH")]
        method: String,
    },
}

#[derive(Subcommand)]
enum RecordCommand {
    List,
    Get { id: i64 },
    ByPatient { patient_id: i64 },
    ByDoctor { doctor_id: i64 },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report(&err);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let args = CliArgs {
        config: cli.config.as_ref().map(|p| p.to_string_lossy().to_string()),
        base_url: cli.base_url.clone(),
        print_config: cli.print_config,
        verbose: cli.verbose,
    };

    // Load configuration (normalized home_dir is applied inside)
    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    config.apply_cli_overrides(&args);

    let logging_config = config.logging.as_ref().cloned().unwrap_or_default();
    runtime::logging::init_logging_from_config(&logging_config, Path::new(&config.client.home_dir));

    if cli.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    let Some(command) = cli.command else {
        anyhow::bail!("no command given, see --help");
    };

    let clinic = ClinicClient::from_config(&config)?;
    tracing::debug!(base_url = %clinic.api().base_url(), "dispatching command");
    dispatch(&config, &clinic, command).await
}

async fn dispatch(config: &AppConfig, clinic: &ClinicClient, command: Commands) -> Result<()> {
    match command {
        Commands::Login { username, password } => {
            let auth = clinic
                .users()
                .login(&LoginRequest { username, password })
                .await?;
            eprintln!("Logged in as {} ({})", auth.user.full_name(), auth.user.role);
            print_json(&auth.user)
        }
        Commands::Register(a) => {
            let auth = clinic
                .users()
                .register(&RegisterRequest {
                    username: a.username,
                    email: a.email,
                    password: a.password,
                    role: a.role,
                    first_name: a.first_name,
                    last_name: a.last_name,
                    phone_number: a.phone,
                })
                .await?;
            print_json(&auth.user)
        }
        Commands::Logout => {
            clinic.users().logout()?;
            println!("Logged out");
            Ok(())
        }
        Commands::Whoami => match clinic.session().state()?.user() {
            Some(user) => {
                eprintln!("{} ({})", user.full_name(), user.role);
                print_json(user)
            }
            None => {
                println!("Not logged in");
                Ok(())
            }
        },
        Commands::Appointments(cmd) => {
            let api = clinic.appointments();
            match cmd {
                AppointmentCommand::List => print_json(&api.get_all().await?),
                AppointmentCommand::Get { id } => print_json(&api.get_by_id(id).await?),
                AppointmentCommand::ByPatient { patient_id } => {
                    print_json(&api.get_by_patient(patient_id).await?)
                }
                AppointmentCommand::ByDoctor { doctor_id } => {
                    print_json(&api.get_by_doctor(doctor_id).await?)
                }
                AppointmentCommand::ByDate { date } => print_json(&api.get_by_date(date).await?),
                AppointmentCommand::Delete { id } => {
                    api.delete(id).await?;
                    println!("Appointment {id} deleted");
                    Ok(())
                }
            }
        }
        Commands::Bills(cmd) => {
            let api = clinic.bills();
            match cmd {
                BillCommand::List => print_json(&api.get_all().await?),
                BillCommand::Get { id } => {
                    let bill = api.get_by_id(id).await?;
                    warn_unreconciled(&bill);
                    print_json(&bill)
                }
                BillCommand::ByPatient { patient_id } => {
                    print_json(&api.get_by_patient(patient_id).await?)
                }
                BillCommand::ByStatus { status } => print_json(&api.get_by_status(status).await?),
                BillCommand::Pay { id, method } => {
                    let bill = api.mark_as_paid(id, &method).await?;
                    warn_unreconciled(&bill);
                    print_json(&bill)
                }
            }
        }
        Commands::Records(cmd) => {
            let api = clinic.medical_records();
            match cmd {
                RecordCommand::List => print_json(&api.get_all().await?),
                RecordCommand::Get { id } => print_json(&api.get_by_id(id).await?),
                RecordCommand::ByPatient { patient_id } => {
                    print_json(&api.get_by_patient(patient_id).await?)
                }
                RecordCommand::ByDoctor { doctor_id } => {
                    print_json(&api.get_by_doctor(doctor_id).await?)
                }
            }
        }
        Commands::Check => check_config(config),
    }
}

fn check_config(config: &AppConfig) -> Result<()> {
    tracing::info!("Checking configuration...");
    println!("Configuration check passed");
    println!("{}", config.to_yaml()?);
    Ok(())
}

/// Flag bills whose line items disagree with their amount.
fn warn_unreconciled(bill: &Bill) {
    for item in &bill.items {
        if item.total != item.computed_total() {
            tracing::warn!(
                bill_id = bill.id,
                item = %item.description,
                total = %item.total,
                expected = %item.computed_total(),
                "bill item total does not match quantity x unit price"
            );
        }
    }
    if !bill.is_reconciled() {
        tracing::warn!(
            bill_id = bill.id,
            amount = %bill.amount,
            items_total = %bill.items_total(),
            "bill items do not add up to the amount"
        );
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let out = serde_json::to_string_pretty(value).context("cannot render response")?;
    println!("{out}");
    Ok(())
}

/// Turn an error into the message a user should see.
fn report(err: &anyhow::Error) {
    let Some(api) = err.downcast_ref::<ApiError>() else {
        eprintln!("Error: {err:#}");
        return;
    };

    match api.redirect() {
        Some(Redirect::Login) => {
            eprintln!("Not logged in or session expired. Run `clinic-cli login` first.")
        }
        Some(Redirect::Unauthorized) => {
            eprintln!("You are not permitted to perform this action.")
        }
        None => match api.kind() {
            ErrorKind::Network => eprintln!("Cannot reach the clinic server: {api}"),
            ErrorKind::CorruptedSession => {
                eprintln!("{api}. Run `clinic-cli logout` to reset the stored session.")
            }
            _ => eprintln!("Error: {api}"),
        },
    }
}
