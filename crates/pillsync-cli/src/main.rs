mod cli;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands, ConfigAction, ContactAction, RoleArg};
use pillsync_core::matcher::guess_medicine_name;
use pillsync_core::{
    normalize, ocr, register_medicine, AppConfig, CareTeam, Contact, ContactRole, Database,
    MedicineRegistration, NotificationService, Scorer, TextExtractor, Verifier, VerifyRequest,
};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    run(cli)
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.command {
        // Written, not read
        Commands::Config { .. } => AppConfig::default(),
        _ => AppConfig::load(&cli.config)
            .with_context(|| format!("loading configuration from {}", cli.config.display()))?,
    };

    match cli.command {
        Commands::Config { action: ConfigAction::Init { force } } => {
            if cli.config.exists() && !force {
                bail!("{} already exists (use --force to overwrite)", cli.config.display());
            }
            config
                .save(&cli.config)
                .with_context(|| format!("writing {}", cli.config.display()))?;
            println!("Wrote default configuration to {}", cli.config.display());
        }

        Commands::Normalize { text } => {
            println!("{}", normalize(&text));
        }

        Commands::Compare { patient_text, registered_name, ocr, threshold } => {
            let mut matching = config.matching;
            if let Some(threshold) = threshold {
                matching = matching.with_match_threshold(threshold);
            }
            matching.validate()?;

            let result = Scorer::new(matching).compare(&patient_text, &registered_name, ocr.as_deref());
            println!("{}", serde_json::to_string_pretty(&result)?);
        }

        Commands::Ocr { source } => {
            let extractor = extractor(&config)?;
            let extracted = extractor.try_extract(&source)?;
            println!("{}", extracted.text);
            if let Some(name) = guess_medicine_name(&extracted.text) {
                eprintln!("likely name: {}", name);
            }
            if let Some(sha) = extracted.sha256 {
                eprintln!("sha256: {}", sha);
            }
        }

        Commands::Engines => {
            for engine in ocr::configured_engines(&config.ocr) {
                let status = if engine.is_available() { "available" } else { "unavailable" };
                println!("{:<12} {}", engine.name(), status);
            }
        }

        Commands::Register { user, name, dosage, photo } => {
            let db = open_db(&cli.db)?;
            let extracted = match &photo {
                Some(source) => extractor(&config)?.extract(source),
                None => Default::default(),
            };
            if photo.is_some() && extracted.text.is_empty() {
                tracing::warn!("No text recognized on the registration photo");
            }
            let name = match name.or_else(|| guess_medicine_name(&extracted.text)) {
                Some(name) => name,
                None => bail!("no medicine name given and none recognized on the photo"),
            };
            tracing::debug!(name = %name, "Registering medicine");

            let medicine = register_medicine(
                &db,
                MedicineRegistration {
                    user_id: user,
                    name,
                    dosage,
                    photo_ref: photo,
                    photo_sha256: extracted.sha256,
                    ocr_text: extracted.text,
                },
            )?;
            println!("{}", serde_json::to_string_pretty(&medicine)?);
        }

        Commands::Verify { user, photo, text, medicine, notify } => {
            let db = open_db(&cli.db)?;
            let (patient_text, sha256) = match (&photo, text) {
                (_, Some(text)) => (normalize(&text), None),
                (Some(source), None) => {
                    let extracted = extractor(&config)?.extract(source);
                    (extracted.text, extracted.sha256)
                }
                (None, None) => bail!("either --photo or --text is required"),
            };

            let service = if notify {
                Some(NotificationService::from_config(&config.notifications)?)
            } else {
                None
            };
            let mut verifier = Verifier::new(&db, config.matching);
            if let Some(service) = &service {
                verifier = verifier.with_notifier(service, CareTeam::from_env());
            }

            let outcome = verifier.verify(VerifyRequest {
                user_id: user,
                patient_ocr_text: patient_text,
                photo_ref: photo,
                photo_sha256: sha256,
                medicine_id: medicine,
            })?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }

        Commands::List { user } => {
            let db = open_db(&cli.db)?;
            let medicines = db.list_medicines_for_user(&user)?;
            println!("{}", serde_json::to_string_pretty(&medicines)?);
        }

        Commands::Verifications { user, limit } => {
            let db = open_db(&cli.db)?;
            let records = db.list_verifications_for_user(&user, limit)?;
            println!("{}", serde_json::to_string_pretty(&records)?);
        }

        Commands::Delete { medicine_id } => {
            let db = open_db(&cli.db)?;
            if !db.delete_medicine(&medicine_id)? {
                bail!("medicine {} not found", medicine_id);
            }
            println!("Deleted {}", medicine_id);
        }

        Commands::Contact { action: ContactAction::Add { user, role, name, email, phone } } => {
            let db = open_db(&cli.db)?;
            let role = match role {
                RoleArg::Doctor => ContactRole::Doctor,
                RoleArg::Family => ContactRole::Family,
            };
            let id = db.add_contact(&user, role, &Contact { name, email, phone })?;
            println!("Added {} contact #{} for {}", role.as_str(), id, user);
        }

    }

    Ok(())
}

fn open_db(path: &std::path::Path) -> Result<Database> {
    Database::open(path).with_context(|| format!("opening database {}", path.display()))
}

fn extractor(config: &AppConfig) -> Result<TextExtractor> {
    let engine = ocr::select_engine(&config.ocr)?;
    Ok(TextExtractor::new(engine, config.ocr.fetch_timeout_secs)?)
}
