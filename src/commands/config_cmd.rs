use anyhow::Result;

use super::prompt;
use super::Context;
use crate::config::Config;

pub fn show_config(ctx: &Context) -> Result<()> {
    let mut config = ctx.load_config()?;

    // Tokens stay out of the terminal
    for token in [&mut config.auth.access_token, &mut config.auth.refresh_token] {
        if !token.is_empty() {
            *token = "********".to_string();
        }
    }

    let config_str = toml::to_string_pretty(&config)?;

    println!("Current Configuration");
    println!("────────────────────────────────");
    if let Some(path) = config.source() {
        println!("File: {}", path.display());
    }
    println!();
    println!("{}", config_str);

    Ok(())
}

pub fn init_config(
    ctx: &Context,
    url: Option<String>,
    anon_key: Option<String>,
    force: bool,
) -> Result<()> {
    let mut config = ctx.file_config()?;
    let config_file = match config.source() {
        Some(path) => path.to_path_buf(),
        None => Config::config_file()?,
    };

    if config_file.exists() && !force {
        println!(
            "Configuration file already exists at: {}",
            config_file.display()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    config.backend = Default::default();
    config.auth = Default::default();
    config.ui = Default::default();
    config.apply_overrides(url, anon_key);
    config.save()?;

    prompt::success(&format!(
        "Configuration initialized at: {}",
        config_file.display()
    ));
    if config.backend.validate().is_err() {
        println!();
        println!("Set backend.url and backend.anon_key in that file, or export SUPABASE_URL and SUPABASE_ANON_KEY.");
    }

    Ok(())
}
