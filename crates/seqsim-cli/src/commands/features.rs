use anyhow::{Context, Result};

use seqsim_core::alphabet::clean_sequence;
use seqsim_core::model::FEATURE_NAMES;
use seqsim_core::{extract, Scaler, StandardScaler};
use seqsim_search::Config;

/// Print the labelled features of `sequence`, optionally with the
/// standardized values next to them.
pub fn show_features(config: &Config, sequence: &str, scaled: bool) -> Result<()> {
    let cleaned = clean_sequence(sequence);
    let raw = extract(&cleaned)?;

    let scaled = if scaled {
        let scaler = StandardScaler::load(&config.scaler_path)
            .context("Failed to load scaler")?;
        Some(scaler.transform(&raw)?)
    } else {
        None
    };

    println!("{} residues\n", cleaned.len());
    for (i, name) in FEATURE_NAMES.iter().enumerate() {
        match &scaled {
            Some(scaled) => println!(
                "  {name:<16} {:>10.6} {:>10.4}",
                raw.values()[i],
                scaled.values()[i]
            ),
            None => println!("  {name:<16} {:>10.6}", raw.values()[i]),
        }
    }

    Ok(())
}
