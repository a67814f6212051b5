use anyhow::Result;

use seqsim_core::{CandidateStore, SqliteCorpus, StandardScaler};
use seqsim_search::Config;

pub fn show_status(config: &Config) -> Result<()> {
    println!("\n📊 seqsim Status\n");

    println!("  Corpus: {}", config.database_path.display());
    match SqliteCorpus::open(&config.database_path).and_then(|corpus| corpus.stats()) {
        Ok(stats) => {
            println!("  Reference entries: {}", stats.entries);
            if let (Some(min), Some(max)) = (stats.min_length, stats.max_length) {
                println!("  Sequence lengths: {min}..={max}");
            }
        }
        Err(e) => println!("  ✗ {e}"),
    }

    println!("\n  Scaler: {}", config.scaler_path.display());
    match StandardScaler::load(&config.scaler_path) {
        Ok(_) => println!("  ✓ loaded"),
        Err(e) => println!("  ✗ {e}"),
    }

    println!(
        "\n  Defaults: top {} matches, length window {}..{}, similarity scale {}",
        config.top_n, config.window_lower, config.window_upper, config.similarity_scale
    );

    Ok(())
}
