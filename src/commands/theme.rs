use anyhow::Result;
use clap::Subcommand;

use super::prompt;
use super::Context;

#[derive(Subcommand)]
pub enum ThemeSubcommands {
    /// Show the current preference
    Show,

    /// Switch between light and dark
    Toggle,
}

fn describe(dark_mode: bool) -> &'static str {
    if dark_mode {
        "dark"
    } else {
        "light"
    }
}

impl ThemeSubcommands {
    pub fn execute(self, ctx: &Context) -> Result<()> {
        let mut config = ctx.file_config()?;

        match self {
            ThemeSubcommands::Show => {
                println!("Theme: {}", describe(config.ui.dark_mode));
            }
            ThemeSubcommands::Toggle => {
                let dark_mode = config.toggle_dark_mode();
                config.save()?;
                prompt::success(&format!("Theme set to {}", describe(dark_mode)));
            }
        }

        Ok(())
    }
}
