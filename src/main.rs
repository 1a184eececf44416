//! Diacare command-line tool.
//!
//! Usage:
//!   diacare add-patient <name> [--age <n>] [--height-cm <cm>] [--weight-kg <kg>] [--db <path>]
//!   diacare add-family --patient <id> <name> <phone> [--relation <text>] [--db <path>]
//!   diacare import --patient <id> <file|-> [--correct-ocr] [--db <path>]
//!   diacare record --patient <id> --vital <kind=value>... [--db <path>]
//!   diacare parse <file|-> [--correct-ocr]
//!   diacare classify --vital <kind=value>... --missed <name=count>... [--threshold <n>]
//!   diacare check --patient <id> [--db <path>] [--notify]
//!   diacare schedule --patient <id> [--db <path>] [--from <HH:MM>]
//!   diacare overview --patient <id> [--db <path>]

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::str::FromStr;

use chrono::NaiveTime;
use clap::{Parser, Subcommand};
use serde::Serialize;
use uuid::Uuid;

use diacare::config::{self, CareConfig};
use diacare::models::{AdherenceTally, FamilyContact, Patient, VitalKind, VitalsSnapshot};
use diacare::{db, pipeline, reminders, CareService};

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "diacare")]
#[command(version)]
#[command(about = "Prescription parsing and vitals/adherence alerts for diabetes care", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a patient and print the stored profile
    AddPatient {
        /// Patient name
        name: String,

        #[arg(long)]
        age: Option<u32>,

        #[arg(long)]
        height_cm: Option<f64>,

        #[arg(long)]
        weight_kg: Option<f64>,

        /// Database file (defaults to ~/Diacare/diacare.db)
        #[arg(long)]
        db: Option<PathBuf>,
    },

    /// Add a family member who receives a patient's alerts
    AddFamily {
        /// Patient id
        #[arg(short, long)]
        patient: Uuid,

        /// Family member name
        name: String,

        /// Phone number in international format, e.g. +919811111111
        phone: String,

        #[arg(long, default_value = "Family")]
        relation: String,

        /// Database file (defaults to ~/Diacare/diacare.db)
        #[arg(long)]
        db: Option<PathBuf>,
    },

    /// Parse prescription text and store its medications for a patient
    Import {
        /// Patient id
        #[arg(short, long)]
        patient: Uuid,

        /// Text file to parse, or "-" for stdin
        file: PathBuf,

        /// Repair OCR misspellings of known drug names first
        #[arg(long)]
        correct_ocr: bool,

        /// Database file (defaults to ~/Diacare/diacare.db)
        #[arg(long)]
        db: Option<PathBuf>,
    },

    /// Record vital readings for a patient, timestamped now
    Record {
        /// Patient id
        #[arg(short, long)]
        patient: Uuid,

        /// Vital reading as kind=value, e.g. hba1c=6.8
        #[arg(long = "vital", value_parser = parse_vital, required = true)]
        vitals: Vec<(VitalKind, f64)>,

        /// Database file (defaults to ~/Diacare/diacare.db)
        #[arg(long)]
        db: Option<PathBuf>,
    },

    /// Parse prescription text into medication entries
    Parse {
        /// Text file to parse, or "-" for stdin
        file: PathBuf,

        /// Repair OCR misspellings of known drug names first
        #[arg(long)]
        correct_ocr: bool,
    },

    /// Classify ad-hoc vitals and missed-dose counts
    Classify {
        /// Vital reading as kind=value, e.g. blood_sugar_random=145
        #[arg(long = "vital", value_parser = parse_vital)]
        vitals: Vec<(VitalKind, f64)>,

        /// Missed doses as name=count, e.g. Metformin=3
        #[arg(long = "missed", value_parser = parse_missed)]
        missed: Vec<(String, u32)>,

        /// Missed-dose threshold (defaults to configuration)
        #[arg(short, long)]
        threshold: Option<u32>,
    },

    /// Evaluate a stored patient's latest vitals and adherence
    Check {
        /// Patient id
        #[arg(short, long)]
        patient: Uuid,

        /// Database file (defaults to ~/Diacare/diacare.db)
        #[arg(long)]
        db: Option<PathBuf>,

        /// Send the alert to the patient's family when warranted
        #[arg(long)]
        notify: bool,
    },

    /// Show a stored patient's daily reminder schedule
    Schedule {
        /// Patient id
        #[arg(short, long)]
        patient: Uuid,

        /// Database file (defaults to ~/Diacare/diacare.db)
        #[arg(long)]
        db: Option<PathBuf>,

        /// Only doses at or after this time (HH:MM)
        #[arg(long, value_parser = parse_clock)]
        from: Option<NaiveTime>,
    },

    /// Show a stored patient's profile, BMI, latest vitals, alerts and schedule
    Overview {
        /// Patient id
        #[arg(short, long)]
        patient: Uuid,

        /// Database file (defaults to ~/Diacare/diacare.db)
        #[arg(long)]
        db: Option<PathBuf>,
    },
}

fn parse_vital(s: &str) -> Result<(VitalKind, f64), String> {
    let (kind, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected kind=value, got '{s}'"))?;
    let kind = VitalKind::from_str(kind.trim()).map_err(|_| {
        let known: Vec<&str> = VitalKind::ALL.iter().map(VitalKind::as_str).collect();
        format!("unknown vital '{}', expected one of: {}", kind.trim(), known.join(", "))
    })?;
    let value: f64 = value
        .trim()
        .parse()
        .map_err(|_| format!("invalid number '{value}'"))?;
    Ok((kind, value))
}

fn parse_missed(s: &str) -> Result<(String, u32), String> {
    let (name, count) = s
        .rsplit_once('=')
        .ok_or_else(|| format!("expected name=count, got '{s}'"))?;
    let count: u32 = count
        .trim()
        .parse()
        .map_err(|_| format!("invalid count '{count}'"))?;
    Ok((name.trim().to_string(), count))
}

fn parse_clock(s: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(s, "%H:%M").map_err(|_| format!("expected HH:MM, got '{s}'"))
}

fn print_json<T: Serialize>(value: &T) -> CliResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn read_input(file: &Path) -> CliResult<String> {
    if file.as_os_str() == "-" {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        Ok(text)
    } else {
        Ok(std::fs::read_to_string(file)?)
    }
}

fn open_db(path: Option<PathBuf>) -> CliResult<rusqlite::Connection> {
    let path = match path {
        Some(p) => p,
        None => config::default_db_path()?,
    };
    Ok(db::open_database(&path)?)
}

fn care_service(path: Option<PathBuf>) -> CliResult<CareService> {
    Ok(CareService::with_configured_sink(
        open_db(path)?,
        CareConfig::from_env()?,
    )?)
}

fn run(cli: Cli) -> CliResult<()> {
    match cli.command {
        Commands::AddPatient {
            name,
            age,
            height_cm,
            weight_kg,
            db: db_path,
        } => {
            let conn = open_db(db_path)?;
            let mut patient = Patient::new(name);
            patient.age = age;
            patient.height_cm = height_cm;
            patient.weight_kg = weight_kg;
            db::insert_patient(&conn, &patient)?;
            print_json(&patient)
        }
        Commands::AddFamily {
            patient,
            name,
            phone,
            relation,
            db: db_path,
        } => {
            let conn = open_db(db_path)?;
            let contact = FamilyContact::new(patient, name, relation, phone);
            db::insert_family_contact(&conn, &contact)?;
            print_json(&contact)
        }
        Commands::Import {
            patient,
            file,
            correct_ocr,
            db: db_path,
        } => {
            let text = read_input(&file)?;
            let service = care_service(db_path)?;
            print_json(&service.import_prescription(&patient, &text, correct_ocr)?)
        }
        Commands::Record {
            patient,
            vitals,
            db: db_path,
        } => {
            let vitals: VitalsSnapshot = vitals.into_iter().collect();
            let service = care_service(db_path)?;
            let now = chrono::Local::now().naive_local();
            print_json(&service.record_vitals(&patient, &vitals, now)?)
        }
        Commands::Parse { file, correct_ocr } => {
            let mut text = read_input(&file)?;
            if correct_ocr {
                text = pipeline::correct_ocr_terms(&text);
            }
            print_json(&pipeline::parse_prescription_text(&text))
        }
        Commands::Classify {
            vitals,
            missed,
            threshold,
        } => {
            let threshold = match threshold {
                Some(t) => t,
                None => CareConfig::from_env()?.missed_dose_threshold,
            };
            let vitals: VitalsSnapshot = vitals.into_iter().collect();
            let missed: AdherenceTally = missed.into_iter().collect();
            print_json(&diacare::classify_vitals_and_adherence(
                &vitals, &missed, threshold,
            ))
        }
        Commands::Check {
            patient,
            db: db_path,
            notify,
        } => {
            let service = care_service(db_path)?;
            if notify {
                print_json(&service.alert_family(&patient)?)
            } else {
                print_json(&service.evaluate(&patient)?)
            }
        }
        Commands::Schedule {
            patient,
            db: db_path,
            from,
        } => {
            let conn = open_db(db_path)?;
            let meds = db::list_medications(&conn, &patient)?;
            let doses = match from {
                Some(now) => reminders::upcoming_doses(&meds, now),
                None => reminders::daily_schedule(&meds),
            };
            print_json(&doses)
        }
        Commands::Overview {
            patient,
            db: db_path,
        } => {
            print_json(&care_service(db_path)?.overview(&patient)?)
        }
    }
}

fn main() -> ExitCode {
    diacare::init_tracing();
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Command failed");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
