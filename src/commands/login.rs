use anyhow::Result;
use clap::Args;
use colored::Colorize;
use dialoguer::{Input, Password};

use super::prompt;
use super::Context;
use crate::api::ApiError;
use crate::forms::SignInForm;

#[derive(Args)]
pub struct LoginCommand {
    /// Account email (prompted when omitted)
    #[arg(short, long)]
    email: Option<String>,
}

impl LoginCommand {
    pub async fn execute(self, ctx: &Context) -> Result<()> {
        println!("{}", "MK Training - Sign in".bold());
        println!();

        let email = match self.email {
            Some(email) => email,
            None => Input::<String>::new().with_prompt("Email").interact_text()?,
        };
        let password = Password::new().with_prompt("Password").interact()?;

        let form = SignInForm::new(email, password);
        form.validate()?;

        let client = ctx.connect()?;
        let spinner = prompt::spinner(&format!("Signing in as {}...", form.email));
        let result = client.sign_in(form.email.trim(), &form.password).await;
        spinner.finish_and_clear();

        match result {
            Ok(user) => {
                prompt::success("Signed in!");
                println!();
                println!("Welcome, {}!", user.email.as_deref().unwrap_or(&form.email));
                println!("User ID: {}", user.id);
                Ok(())
            }
            Err(ApiError::InvalidCredentials) => {
                eprintln!("{} Incorrect email or password", "✗".red());
                Err(ApiError::InvalidCredentials.into())
            }
            Err(e) => {
                eprintln!("{} Sign in failed: {}", "✗".red(), e);
                Err(e.into())
            }
        }
    }
}
