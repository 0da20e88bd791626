use anyhow::Result;
use clap::Args;
use colored::Colorize;
use dialoguer::{Input, Password};

use super::prompt;
use super::Context;
use crate::api::SignUpOutcome;
use crate::forms::SignUpForm;

#[derive(Args)]
pub struct SignupCommand {}

impl SignupCommand {
    pub async fn execute(self, ctx: &Context) -> Result<()> {
        println!("{}", "MK Training - Create account".bold());
        println!();

        let form = SignUpForm {
            name: Input::<String>::new().with_prompt("Name").interact_text()?,
            email: Input::<String>::new().with_prompt("Email").interact_text()?,
            password: Password::new().with_prompt("Password").interact()?,
            confirm_password: Password::new().with_prompt("Confirm password").interact()?,
        };
        form.validate()?;

        let client = ctx.connect()?;
        let spinner = prompt::spinner("Creating account...");
        let outcome = client
            .sign_up(form.email.trim(), &form.password, form.name.trim())
            .await;
        spinner.finish_and_clear();

        match outcome? {
            SignUpOutcome::SignedIn(user) => {
                prompt::success("Account created and signed in!");
                println!("User ID: {}", user.id);
            }
            SignUpOutcome::ConfirmationRequired(_) => {
                prompt::success("Account created! Check your email to activate it.");
                println!();
                println!("Then use 'mk-training login' to sign in.");
            }
        }
        Ok(())
    }
}
