use clap::{Args, Parser, Subcommand};
use guardia_core::config::{locality_from_env_value, store_kind_from_env_value};
use guardia_core::services::arrival_clock_for;
use guardia_core::{
    AdmissionRecord, AdmissionService, AttentionService, CoreConfig, Doctor, Nurse,
    PatientDemographics, StoreKind, Stores, TriageLevel, UrgencyRequest, VitalReadings,
    DEFAULT_DATA_DIR,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "guardia")]
#[command(about = "Emergency department admission queue CLI")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args)]
struct Physician {
    /// Physician name
    #[arg(long = "doctor")]
    name: String,
    /// Physician licence number
    #[arg(long = "doctor-license")]
    license: String,
}

impl Physician {
    fn into_doctor(self) -> guardia_core::CoreResult<Doctor> {
        Doctor::new(self.name, self.license)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Register an urgency and enqueue the patient
    Register {
        /// Patient national id
        patient_id: String,
        /// Triage level (CRITICAL, EMERGENCY, URGENT, MINOR_URGENT, NON_URGENT)
        triage_level: TriageLevel,
        /// Nurse's clinical note
        note: String,
        /// Nurse name
        #[arg(long)]
        nurse: String,
        /// Nurse licence number
        #[arg(long)]
        nurse_license: String,
        /// Temperature in °C
        #[arg(long)]
        temperature: f64,
        /// Heart rate in bpm
        #[arg(long)]
        heart_rate: f64,
        /// Respiratory rate in breaths/min
        #[arg(long)]
        respiratory_rate: f64,
        /// Systolic pressure in mmHg
        #[arg(long)]
        systolic: f64,
        /// Diastolic pressure in mmHg
        #[arg(long)]
        diastolic: f64,
        /// Patient first name, when known
        #[arg(long)]
        first_name: Option<String>,
        /// Patient last name, when known
        #[arg(long)]
        last_name: Option<String>,
    },
    /// List waiting admissions in priority order
    Pending,
    /// List every admission
    All,
    /// Claim the next waiting patient
    Claim {
        #[command(flatten)]
        physician: Physician,
    },
    /// Return a claimed patient to the queue
    Cancel {
        /// Patient national id
        patient_id: String,
    },
    /// Finalise a claimed patient's admission
    Attend {
        /// Patient national id
        patient_id: String,
        /// Physician's report
        note: String,
        #[command(flatten)]
        physician: Physician,
    },
    /// Show a patient on file
    Patient {
        /// Patient national id
        patient_id: String,
    },
}

fn print_admission(record: &AdmissionRecord) {
    println!(
        "{} | {} | {} | {} | {} | nurse {}",
        record.arrived_at().to_rfc3339(),
        record.triage_level(),
        record.state(),
        record.patient_id(),
        record.patient().full_name(),
        record.nurse(),
    );
}

fn print_admissions(records: &[AdmissionRecord]) {
    if records.is_empty() {
        println!("No admissions found.");
    } else {
        for record in records {
            print_admission(record);
        }
    }
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("guardia_core=warn".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let data_dir = std::env::var("GUARDIA_DATA_DIR").unwrap_or_else(|_| DEFAULT_DATA_DIR.into());
    let store = store_kind_from_env_value(std::env::var("GUARDIA_STORE").ok(), StoreKind::File)?;
    let locality = locality_from_env_value(std::env::var("GUARDIA_DEFAULT_LOCALITY").ok());
    let cfg = Arc::new(CoreConfig::new(PathBuf::from(data_dir), store, locality));

    let stores = Stores::from_config(&cfg)?;
    let clock = Arc::new(arrival_clock_for(stores.queue.as_ref())?);
    let admissions = AdmissionService::new(cfg, &stores, clock);
    let attention = AttentionService::new(&stores);

    match cli.command {
        Some(Commands::Register {
            patient_id,
            triage_level,
            note,
            nurse,
            nurse_license,
            temperature,
            heart_rate,
            respiratory_rate,
            systolic,
            diastolic,
            first_name,
            last_name,
        }) => {
            let request = UrgencyRequest {
                patient_id,
                nurse: Nurse::new(nurse, nurse_license)?,
                note,
                triage_level,
                vitals: VitalReadings {
                    temperature,
                    heart_rate,
                    respiratory_rate,
                    systolic_pressure: systolic,
                    diastolic_pressure: diastolic,
                },
                demographics: PatientDemographics {
                    first_name,
                    last_name,
                    ..Default::default()
                },
            };
            let record = admissions.register_urgency(request)?;
            println!("Registered admission {}", record.id());
        }
        Some(Commands::Pending) => print_admissions(&admissions.get_pending_admissions()?),
        Some(Commands::All) => print_admissions(&admissions.get_all_admissions()?),
        Some(Commands::Claim { physician }) => {
            let doctor = physician.into_doctor()?;
            let record = admissions.claim_next_patient(Some(&doctor))?;
            print_admission(&record);
        }
        Some(Commands::Cancel { patient_id }) => {
            admissions.cancel_attention(&patient_id)?;
            println!("Patient {} returned to the queue", patient_id);
        }
        Some(Commands::Attend {
            patient_id,
            note,
            physician,
        }) => {
            let doctor = physician.into_doctor()?;
            let record = attention.attend_patient(&patient_id, &note, Some(&doctor))?;
            println!("{}", record.report());
        }
        Some(Commands::Patient { patient_id }) => match admissions.find_patient(&patient_id)? {
            Some(patient) => println!(
                "ID: {}, Name: {}, Registered: {}, Created: {}",
                patient.national_id,
                patient.full_name(),
                patient.registered,
                patient.created_at
            ),
            None => println!("No patient found."),
        },
        None => {
            println!("Use 'guardia --help' for commands");
        }
    }

    Ok(())
}
