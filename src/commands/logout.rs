use anyhow::Result;
use clap::Args;

use super::prompt;
use super::Context;

#[derive(Args)]
pub struct LogoutCommand {}

impl LogoutCommand {
    pub async fn execute(self, ctx: &Context) -> Result<()> {
        let config = ctx.load_config()?;

        if !config.is_authenticated() {
            println!("You are not signed in.");
            return Ok(());
        }

        let client = ctx.connect()?;
        client.sign_out().await?;

        prompt::success("Signed out successfully!");
        Ok(())
    }
}
