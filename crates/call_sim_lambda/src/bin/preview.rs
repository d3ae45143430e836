use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use call_sim_core::config::{config_document_from_json, normalize_config};
use call_sim_core::contract::{ConfigDocument, Lead};
use call_sim_core::generator::{generate_call_records, sample_record_count};
use call_sim_core::payload::{decode_lead_json, decode_lead_payload};
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;

#[derive(Parser)]
#[command(
    name = "call-sim-preview",
    about = "Generate call records for one lead and print them as JSON lines",
    long_about = "Runs decode, configuration normalization and record generation\n\
                  locally. Nothing is read from or written to any store."
)]
struct Cli {
    /// JSON file holding the configuration document (defaults apply when omitted)
    #[arg(long, env = "CALL_SIM_CONFIG_FILE")]
    config_file: Option<PathBuf>,
    /// Base64 lead payload, as delivered on the queue
    #[arg(long, conflicts_with = "lead_file", required_unless_present = "lead_file")]
    payload: Option<String>,
    /// Plain JSON lead file
    #[arg(long)]
    lead_file: Option<PathBuf>,
    /// Seed for reproducible output
    #[arg(long, env = "CALL_SIM_SEED")]
    seed: Option<u64>,
    /// Generate exactly this many records instead of sampling the count
    #[arg(long)]
    count: Option<u32>,
}

fn read_lead(cli: &Cli) -> Result<Lead, String> {
    if let Some(payload) = &cli.payload {
        return decode_lead_payload(payload).map_err(|error| error.to_string());
    }
    let path = cli
        .lead_file
        .as_ref()
        .ok_or_else(|| "either --payload or --lead-file is required".to_string())?;
    let text = fs::read_to_string(path)
        .map_err(|error| format!("failed to read {}: {error}", path.display()))?;
    decode_lead_json(&text).map_err(|error| error.to_string())
}

fn read_config_document(cli: &Cli) -> Result<ConfigDocument, String> {
    let Some(path) = &cli.config_file else {
        return Ok(ConfigDocument::new());
    };
    let text = fs::read_to_string(path)
        .map_err(|error| format!("failed to read {}: {error}", path.display()))?;
    let value: serde_json::Value = serde_json::from_str(&text)
        .map_err(|error| format!("invalid configuration JSON: {error}"))?;
    config_document_from_json(&value).map_err(|error| error.to_string())
}

fn run(cli: &Cli) -> Result<(), String> {
    let lead = read_lead(cli)?;
    let config = normalize_config(&read_config_document(cli)?)
        .map_err(|error| error.to_string())?;

    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let count = cli
        .count
        .unwrap_or_else(|| sample_record_count(&config, &mut rng));
    let records =
        generate_call_records(&lead, count, &config, &mut rng).map_err(|error| error.to_string())?;

    for record in &records {
        let line = serde_json::to_string(record)
            .map_err(|error| format!("failed to serialize record: {error}"))?;
        println!("{line}");
    }
    eprintln!(
        "generated {} records for LeadID {} (destination {})",
        records.len(),
        lead.display_id(),
        config.table_ref()
    );
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}
