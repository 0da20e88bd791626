use anyhow::Result;
use clap::Args;
use colored::Colorize;

use super::Context;

#[derive(Args)]
pub struct WhoamiCommand {}

impl WhoamiCommand {
    pub async fn execute(self, ctx: &Context) -> Result<()> {
        let config = ctx.load_config()?;

        if !config.is_authenticated() {
            println!("You are not signed in.");
            println!();
            println!("Use 'mk-training login' to authenticate.");
            return Ok(());
        }

        let client = ctx.connect()?;

        match client.current_user().await {
            Ok(user) => {
                println!("{} Authenticated as:", "✓".green());
                println!();
                println!("  Email:   {}", user.email.as_deref().unwrap_or("-"));
                println!("  User ID: {}", user.id);
                Ok(())
            }
            Err(e) => {
                eprintln!("{} Failed to fetch user information: {}", "✗".red(), e);
                Err(e.into())
            }
        }
    }
}
