mod assessments;
mod config_cmd;
mod dashboard;
mod exercises;
mod login;
mod logout;
mod photos;
mod plans;
mod prompt;
mod signup;
mod students;
mod theme;
mod whoami;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;

use crate::api::{ApiClient, ApiError};
use crate::config::Config;
use crate::forms::SubmitError;

pub use assessments::AssessmentSubcommands;
pub use dashboard::DashboardCommand;
pub use exercises::ExerciseSubcommands;
pub use login::LoginCommand;
pub use logout::LogoutCommand;
pub use photos::PhotoSubcommands;
pub use plans::PlanSubcommands;
pub use signup::SignupCommand;
pub use students::StudentSubcommands;
pub use theme::ThemeSubcommands;
pub use whoami::WhoamiCommand;

#[derive(Parser)]
#[command(name = "mk-training")]
#[command(about = "Manage students, exercises, assessments and workout plans", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file
    #[arg(long, global = true, env = "MK_TRAINING_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in with email and password
    Login(LoginCommand),

    /// Create a trainer account
    Signup(SignupCommand),

    /// Sign out and forget the stored session
    Logout(LogoutCommand),

    /// Show the signed-in trainer
    Whoami(WhoamiCommand),

    /// Manage students
    #[command(subcommand)]
    Students(StudentSubcommands),

    /// Manage the exercise library
    #[command(subcommand)]
    Exercises(ExerciseSubcommands),

    /// Manage physical assessments
    #[command(subcommand)]
    Assessments(AssessmentSubcommands),

    /// Manage workout plans
    #[command(subcommand)]
    Plans(PlanSubcommands),

    /// Manage progress photos
    #[command(subcommand)]
    Photos(PhotoSubcommands),

    /// Light/dark preference
    #[command(subcommand)]
    Theme(ThemeSubcommands),

    /// Launch interactive dashboard
    Dashboard(DashboardCommand),

    /// Manage configuration
    #[command(subcommand)]
    Config(ConfigSubcommands),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand)]
enum ConfigSubcommands {
    /// Show current configuration
    Show,

    /// Write a configuration file
    Init {
        /// Backend base URL
        #[arg(long)]
        url: Option<String>,

        /// Backend public API key
        #[arg(long)]
        anon_key: Option<String>,

        /// Overwrite existing config
        #[arg(short, long)]
        force: bool,
    },
}

/// Where the configuration comes from for this invocation
pub struct Context {
    config_path: Option<PathBuf>,
}

impl Context {
    pub fn new(config_path: Option<PathBuf>) -> Self {
        Self { config_path }
    }

    /// The configuration file as stored, without environment overrides
    pub fn file_config(&self) -> Result<Config> {
        match &self.config_path {
            Some(path) => Config::load_from(path),
            None => Config::load_from(&Config::config_file()?),
        }
    }

    /// Load the file configuration with environment overrides applied
    pub fn load_config(&self) -> Result<Config> {
        let mut config = self.file_config()?;
        config.apply_env();
        Ok(config)
    }

    /// Build the one backend client for this process
    pub fn connect(&self) -> Result<Arc<ApiClient>> {
        let config = self.load_config()?;
        Ok(Arc::new(ApiClient::new(config)?))
    }
}

impl Cli {
    pub fn verbose(&self) -> bool {
        self.verbose
    }

    pub async fn execute(self) -> Result<()> {
        let ctx = Context::new(self.config);

        let result = match self.command {
            Commands::Login(cmd) => cmd.execute(&ctx).await,
            Commands::Signup(cmd) => cmd.execute(&ctx).await,
            Commands::Logout(cmd) => cmd.execute(&ctx).await,
            Commands::Whoami(cmd) => cmd.execute(&ctx).await,
            Commands::Students(subcmd) => subcmd.execute(&ctx).await,
            Commands::Exercises(subcmd) => subcmd.execute(&ctx).await,
            Commands::Assessments(subcmd) => subcmd.execute(&ctx).await,
            Commands::Plans(subcmd) => subcmd.execute(&ctx).await,
            Commands::Photos(subcmd) => subcmd.execute(&ctx).await,
            Commands::Theme(subcmd) => subcmd.execute(&ctx),
            Commands::Dashboard(cmd) => cmd.execute(&ctx).await,
            Commands::Config(subcmd) => match subcmd {
                ConfigSubcommands::Show => config_cmd::show_config(&ctx),
                ConfigSubcommands::Init {
                    url,
                    anon_key,
                    force,
                } => config_cmd::init_config(&ctx, url, anon_key, force),
            },
            Commands::Completions { shell } => {
                generate_completions(shell);
                Ok(())
            }
        };

        if let Err(e) = &result {
            if is_unauthenticated(e) {
                eprintln!("{} You are not signed in.", "✗".red());
                eprintln!();
                eprintln!("Use 'mk-training login' to authenticate.");
            }
        }
        result
    }
}

fn is_unauthenticated(error: &anyhow::Error) -> bool {
    error.chain().any(|cause| {
        let api = cause.downcast_ref::<ApiError>().or_else(|| {
            match cause.downcast_ref::<SubmitError>() {
                Some(SubmitError::Remote(e)) => Some(e),
                _ => None,
            }
        });
        api.is_some_and(ApiError::is_unauthenticated)
    })
}

fn generate_completions(shell: clap_complete::Shell) {
    use clap::CommandFactory;
    use clap_complete::generate;
    use std::io;

    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context as _;

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_unauthenticated_is_found_through_context() {
        let err: Result<()> = Err(ApiError::Unauthenticated).context("Failed to create student");
        assert!(is_unauthenticated(&err.unwrap_err()));

        let submit: Result<()> =
            Err(SubmitError::Remote(ApiError::Unauthenticated)).context("Failed to create student");
        assert!(is_unauthenticated(&submit.unwrap_err()));

        let other = anyhow::Error::new(ApiError::NotFound("students 1".to_string()));
        assert!(!is_unauthenticated(&other));
    }
}
