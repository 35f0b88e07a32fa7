//! Register a patient and open a visitation from the command line
//!
//! Usage: register_patient <medical_record_number> <name> <birth_date YYYY-MM-DD> <male|female> [ward]

use chrono::{NaiveDate, Utc};

use dietcare::db::{self, Database};
use dietcare::energy::Gender;
use dietcare::models::{Patient, PatientCreate, Visitation, VisitationCreate};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() < 4 {
        eprintln!("Usage: register_patient <medical_record_number> <name> <birth_date YYYY-MM-DD> <male|female> [ward]");
        std::process::exit(2);
    }

    let data = PatientCreate {
        medical_record_number: args[0].clone(),
        name: args[1].clone(),
        birth_date: NaiveDate::parse_from_str(&args[2], "%Y-%m-%d")?,
        gender: Gender::from_str(&args[3])?,
    };
    let ward = args.get(4).cloned();

    let db_path = db::database_path();
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    println!("Database path: {}", db_path.display());

    let database = Database::new(&db_path)?;
    database.with_conn(|conn| {
        db::migrations::run_migrations(conn)?;

        let patient = Patient::create(conn, &data)?;
        let visitation = Visitation::create(
            conn,
            &VisitationCreate {
                patient_id: patient.id,
                visit_date: Utc::now().date_naive(),
                ward,
                notes: None,
            },
        )?;

        println!("Patient registered:");
        println!("  ID: {}", patient.id);
        println!("  MRN: {}", patient.medical_record_number);
        println!("  Name: {}", patient.name);
        println!("  Birth date: {}", patient.birth_date);
        println!("  Gender: {}", patient.gender.display_name());
        println!("Visitation opened: {} ({})", visitation.id, visitation.visit_date);
        Ok(())
    })?;

    Ok(())
}
