//! Terminal helpers shared by the entity commands: form filling, confirmation
//! and progress spinners.

use anyhow::{bail, Result};
use colored::Colorize;
use dialoguer::{Confirm, Input};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use crate::forms::{FormController, FormErrors, FormField, FormModel, SubmitError};

/// Parse `key=value` pairs given with `--set`
pub fn parse_assignments(raw: &[String]) -> Result<Vec<(String, String)>> {
    raw.iter()
        .map(|pair| match pair.split_once('=') {
            Some((key, value)) if !key.trim().is_empty() => {
                Ok((key.trim().to_string(), value.to_string()))
            }
            _ => bail!("Expected key=value, got '{}'", pair),
        })
        .collect()
}

/// Apply `--set` values to the open form. Unknown keys are rejected.
pub fn apply_assignments<M: FormModel>(
    form: &mut FormController<M>,
    assignments: &[(String, String)],
) -> Result<()> {
    for (key, value) in assignments {
        let Some(field) = M::Field::ALL.iter().find(|f| f.key() == key) else {
            let known: Vec<_> = M::Field::ALL.iter().map(|f| f.key()).collect();
            bail!("Unknown field '{}'. Fields: {}", key, known.join(", "));
        };
        form.set_field(*field, value);
    }
    Ok(())
}

/// Prompt for `fields`, pre-filled with the current draft
pub fn prompt_fields<M: FormModel>(form: &mut FormController<M>, fields: &[M::Field]) -> Result<()> {
    for field in fields {
        let mut input = Input::<String>::new()
            .with_prompt(field.label())
            .allow_empty(true);

        let current = form.field_text(*field);
        if !current.is_empty() {
            input = input.default(current);
        }

        let value = input.interact_text()?;
        form.set_field(*field, &value);
    }
    Ok(())
}

/// Fill and validate the form. Interactively, only failing fields are asked
/// again; otherwise validation errors end the command.
pub fn fill_form<M: FormModel>(
    form: &mut FormController<M>,
    assignments: &[(String, String)],
) -> Result<()> {
    let interactive = assignments.is_empty();

    if interactive {
        prompt_fields(form, M::Field::ALL)?;
    } else {
        apply_assignments(form, assignments)?;
    }

    while !form.validate() {
        print_errors::<M::Field, _>(form.errors());
        if !interactive {
            bail!(SubmitError::Invalid);
        }

        let failing: Vec<M::Field> = M::Field::ALL
            .iter()
            .copied()
            .filter(|f| form.errors().message(*f).is_some())
            .collect();
        println!();
        prompt_fields(form, &failing)?;
    }

    Ok(())
}

pub fn print_errors<F, E: FormErrors<F>>(errors: &E) {
    for (key, message) in errors.entries() {
        eprintln!("  {} {}: {}", "✗".red(), key.bold(), message);
    }
}

/// Ask before an irreversible action; `force` skips the question
pub fn confirm(prompt: &str, force: bool) -> Result<bool> {
    if force {
        return Ok(true);
    }
    Ok(Confirm::new().with_prompt(prompt).default(false).interact()?)
}

pub fn spinner(message: &str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    bar.set_message(message.to_string());
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}

pub fn success(message: &str) {
    println!("{} {}", "✓".green(), message);
}
