use anyhow::Result;
use seqsim_search::{config, Config};

/// Show the effective configuration.
pub fn show_config(config: &Config) -> Result<()> {
    println!("Current Configuration");
    println!("=====================\n");

    let path = config::config_file_path();
    println!("Config file: {}", path.display());
    println!(
        "File exists: {}\n",
        if path.exists() { "yes" } else { "no (using defaults)" }
    );

    println!("Settings:");
    print!("{}", toml_lines(config)?);

    println!(
        "\nPriority: CLI args > ENV vars ({}*) > Config file > Defaults",
        config::ENV_PREFIX
    );

    Ok(())
}

fn toml_lines(config: &Config) -> Result<String> {
    let rendered = toml::to_string(config)?;
    Ok(rendered
        .lines()
        .map(|line| format!("  {line}\n"))
        .collect())
}

/// Show the config file path.
pub fn show_path() {
    println!("{}", config::config_file_path().display());
}

/// Show example configuration.
pub fn show_example() {
    print!("{}", config::example_config());
}

/// Initialize config file with defaults.
pub fn init_config() -> Result<()> {
    let created = config::ensure_config_file()?;
    let config_path = config::config_file_path();

    if created {
        println!("✓ Created config file: {}", config_path.display());
        println!("\nEdit this file to configure seqsim.");
    } else {
        println!("Config file already exists: {}", config_path.display());
    }

    Ok(())
}
