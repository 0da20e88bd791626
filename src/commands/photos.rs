use anyhow::{Context as _, Result};
use clap::Subcommand;
use colored::Colorize;
use std::path::PathBuf;

use super::prompt;
use super::Context;
use crate::cache::EntityCache;
use crate::forms::parse_date;
use crate::gateway::PhotoGateway;
use crate::models::{PhotoOrientation, PhotoUpload};

#[derive(Subcommand)]
pub enum PhotoSubcommands {
    /// List a student's progress photos, most recent first
    List {
        /// Student ID
        #[arg(short, long)]
        student: String,
    },

    /// Upload a progress photo
    Upload {
        /// Student ID
        #[arg(short, long)]
        student: String,

        /// Image file
        #[arg(short, long)]
        file: PathBuf,

        /// front, back or side
        #[arg(short = 't', long = "type", default_value = "front")]
        photo_type: PhotoOrientation,

        /// Capture date (YYYY-MM-DD or DD/MM/YYYY); defaults to today
        #[arg(short, long)]
        date: Option<String>,
    },

    /// Delete a photo and its stored file
    Delete {
        /// Photo ID
        id: String,

        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
}

impl PhotoSubcommands {
    pub async fn execute(self, ctx: &Context) -> Result<()> {
        match self {
            PhotoSubcommands::List { student } => list_photos(ctx, &student).await,
            PhotoSubcommands::Upload {
                student,
                file,
                photo_type,
                date,
            } => upload_photo(ctx, &student, file, photo_type, date).await,
            PhotoSubcommands::Delete { id, force } => delete_photo(ctx, &id, force).await,
        }
    }
}

pub async fn list_photos(ctx: &Context, student_id: &str) -> Result<()> {
    let client = ctx.connect()?;
    let date_format = client.config().await.ui.date_format;
    let mut photos = EntityCache::for_student(PhotoGateway::new(client), student_id);

    let spinner = prompt::spinner("Loading photos...");
    let loaded = photos.fetch().await;
    spinner.finish_and_clear();
    loaded.context("Failed to load photos")?;

    println!("{}", "Progress photos".bold());
    println!();

    if photos.is_empty() {
        println!("No photos for this student yet.");
        return Ok(());
    }

    for photo in photos.items() {
        println!(
            "  {}  {}  {:<5}  {}",
            photo.id.dimmed(),
            photo.date.format(&date_format),
            photo.photo_type,
            photo.url
        );
    }

    Ok(())
}

pub async fn upload_photo(
    ctx: &Context,
    student_id: &str,
    file: PathBuf,
    photo_type: PhotoOrientation,
    date: Option<String>,
) -> Result<()> {
    let bytes = tokio::fs::read(&file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let file_name = file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut upload = PhotoUpload::new(student_id, file_name, bytes, photo_type);
    if let Some(raw) = date {
        upload.date = parse_date(&raw).with_context(|| format!("Invalid date '{}'", raw))?;
    }

    let client = ctx.connect()?;
    let mut photos = EntityCache::for_student(PhotoGateway::new(client), student_id);

    let spinner = prompt::spinner(&format!("Uploading {}...", file.display()));
    let created = photos.create(&upload).await;
    spinner.finish_and_clear();
    let photo = created.context("Failed to upload photo")?;

    prompt::success(&format!("Uploaded photo {}", photo.id));
    println!("  {}", photo.url);
    Ok(())
}

pub async fn delete_photo(ctx: &Context, id: &str, force: bool) -> Result<()> {
    let client = ctx.connect()?;
    let mut photos = EntityCache::for_student(PhotoGateway::new(client), "");

    if !prompt::confirm(&format!("Delete photo {}?", id), force)? {
        println!("Cancelled.");
        return Ok(());
    }

    photos.delete(id).await.context("Failed to delete photo")?;

    prompt::success(&format!("Deleted photo {}", id));
    Ok(())
}
