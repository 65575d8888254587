use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pillsync")]
#[command(about = "Medicine photo verification: register medicines, verify dosing-time photos", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (JSON)
    #[arg(short, long, default_value = "pillsync.json", global = true)]
    pub config: PathBuf,

    /// SQLite database file
    #[arg(long, default_value = "pillsync.db", global = true)]
    pub db: PathBuf,

    /// Verbose logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Normalize raw OCR text
    Normalize {
        text: String,
    },

    /// Compare patient photo text with a medicine name
    Compare {
        patient_text: String,

        registered_name: String,

        /// OCR text of the registration photo
        #[arg(long)]
        ocr: Option<String>,

        /// Minimum confidence for a match
        #[arg(short, long)]
        threshold: Option<f64>,
    },

    /// Extract text from an image path or URL
    Ocr {
        source: String,
    },

    /// List configured OCR engines and whether they can run here
    Engines,

    /// Register a medicine from its package photo
    Register {
        #[arg(short, long)]
        user: String,

        /// Medicine name; guessed from the photo text when omitted
        #[arg(short, long, required_unless_present = "photo")]
        name: Option<String>,

        #[arg(short, long)]
        dosage: Option<String>,

        /// Back-label photo, path or URL
        #[arg(short, long)]
        photo: Option<String>,
    },

    /// Verify a dosing-time photo against registered medicines
    Verify {
        #[arg(short, long)]
        user: String,

        /// Patient photo, path or URL
        #[arg(short, long, required_unless_present = "text", conflicts_with = "text")]
        photo: Option<String>,

        /// Already-recognized patient photo text
        #[arg(long)]
        text: Option<String>,

        /// Compare against this medicine only
        #[arg(short, long)]
        medicine: Option<String>,

        /// Send care-team notifications
        #[arg(long)]
        notify: bool,
    },

    /// List a user's registered medicines
    List {
        #[arg(short, long)]
        user: String,
    },

    /// Show a user's verification history, newest first
    Verifications {
        #[arg(short, long)]
        user: String,

        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Delete a registered medicine
    Delete {
        medicine_id: String,
    },

    /// Manage care-team contacts
    Contact {
        #[command(subcommand)]
        action: ContactAction,
    },

    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub enum ContactAction {
    /// Add a doctor or family contact
    Add {
        #[arg(short, long)]
        user: String,

        #[arg(short, long)]
        role: RoleArg,

        #[arg(short, long)]
        name: String,

        #[arg(short, long)]
        email: Option<String>,

        #[arg(short, long)]
        phone: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Write a configuration file with default values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq)]
pub enum RoleArg {
    Doctor,
    Family,
}
