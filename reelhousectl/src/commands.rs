use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, bail};
use reelhouse_core::{
    application::{AppServices, AppUnitOfWork},
    config::Config,
    database::PostgresDatabase,
    media_host::{ImagesClient, StreamClient, build_image_url},
    registration::{RegistrationPhase, Submission},
    session::StaticSession,
    upload::UploadPipeline,
    watch::WatchedItem,
};
use reelhouse_model::{
    ContentId, ContentRecord, ImageVariant, LocalFile, ModerationStatus,
    format_file_size, format_progress_percentage, format_progress_time,
    mime_for_extension,
};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::cli::{MyListCommand, ProgressArgs, SubmitArgs, UserArgs};

/// Services wired over Postgres and both media hosts.
#[derive(Debug)]
pub struct AppContext {
    services: AppServices,
}

impl AppContext {
    pub async fn connect(config: Config) -> anyhow::Result<Self> {
        let uploads = UploadPipeline::new(
            Arc::new(StreamClient::new(&config.stream)?),
            Arc::new(ImagesClient::new(&config.images)?),
            config.upload,
        );
        let db = PostgresDatabase::connect(&config.database)
            .await
            .context("failed to connect to PostgreSQL")?;
        let unit_of_work = AppUnitOfWork::from_postgres(&db);
        Ok(Self {
            services: AppServices::new(&unit_of_work, uploads, config.watch),
        })
    }
}

pub async fn migrate(config: &Config) -> anyhow::Result<()> {
    let db = PostgresDatabase::connect(&config.database)
        .await
        .context("failed to connect to PostgreSQL for migrations")?;
    db.migrate().await.context("database migration failed")?;
    Ok(())
}

pub async fn submit(ctx: &AppContext, args: SubmitArgs) -> anyhow::Result<()> {
    let registration = &ctx.services.registration;

    let mut submission = Submission {
        title: args.title,
        description: args.description,
        video: Some(local_file(&args.video).await?),
        image: None,
        category: args.category,
    };
    if let Some(poster) = &args.poster {
        submission.image = Some(local_file(poster).await?);
    }

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, cancelling upload");
            on_interrupt.cancel();
        }
    });

    let progress = |phase: RegistrationPhase, percent: u8| {
        eprintln!("{:>3}% {}", percent, phase_label(phase));
    };
    let session = match args.session.user {
        Some(user) => StaticSession::signed_in(user),
        None => StaticSession::anonymous(),
    };
    let result = registration
        .register_for_session(&session, &submission, &progress, &cancel)
        .await;
    interrupt.abort();

    match result {
        Ok(record) => {
            println!("submitted {} ({})", record.id, record.moderation);
            Ok(())
        }
        Err(err) => {
            eprintln!("{}", err.user_message());
            let orphaned = err.orphaned();
            if !orphaned.is_empty() {
                if args.discard_orphans {
                    let leftover = registration.discard_orphans(orphaned).await;
                    for asset in &leftover {
                        eprintln!(
                            "could not delete {} {}",
                            asset.kind, asset.asset_id
                        );
                    }
                } else {
                    for asset in orphaned {
                        eprintln!(
                            "uploaded but unreferenced: {} {}",
                            asset.kind, asset.asset_id
                        );
                    }
                }
            }
            Err(err.into())
        }
    }
}

pub async fn list(
    ctx: &AppContext,
    category: Option<&str>,
) -> anyhow::Result<()> {
    for record in ctx.services.catalog.list(category).await? {
        print_record(&record);
    }
    Ok(())
}

pub async fn shelves(ctx: &AppContext) -> anyhow::Result<()> {
    for shelf in ctx.services.catalog.shelves().await? {
        println!("{} ({})", shelf.category, shelf.items.len());
        for record in &shelf.items {
            print!("  ");
            print_record(record);
        }
    }
    Ok(())
}

pub async fn search(ctx: &AppContext, query: &str) -> anyhow::Result<()> {
    let results = ctx.services.catalog.search(query).await?;
    if results.is_empty() {
        println!("no matches");
    }
    for record in &results {
        print_record(record);
    }
    Ok(())
}

pub async fn moderate(
    ctx: &AppContext,
    content_id: ContentId,
    status: ModerationStatus,
) -> anyhow::Result<()> {
    let record = ctx
        .services
        .catalog
        .moderate(content_id, status)
        .await
        .with_context(|| format!("could not update {content_id}"))?;
    print_record(&record);
    Ok(())
}

pub async fn progress(
    ctx: &AppContext,
    args: ProgressArgs,
) -> anyhow::Result<()> {
    let user = require_user(&args.session)?;
    let saved = ctx
        .services
        .watch
        .record_progress(user, args.content_id, args.position, args.duration)
        .await?;
    println!(
        "{} at {} ({}%)",
        saved.content_id,
        format_progress_time(saved.progress_time_seconds),
        format_progress_percentage(saved.progress_percentage)
    );
    Ok(())
}

pub async fn continue_watching(
    ctx: &AppContext,
    args: UserArgs,
) -> anyhow::Result<()> {
    let user = require_user(&args)?;
    for item in ctx.services.watch.list_continue_watching(user).await? {
        print_watched(&item);
    }
    Ok(())
}

pub async fn history(ctx: &AppContext, args: UserArgs) -> anyhow::Result<()> {
    let user = require_user(&args)?;
    for item in ctx.services.watch.list_history(user).await? {
        print_watched(&item);
    }
    Ok(())
}

pub async fn my_list(
    ctx: &AppContext,
    command: MyListCommand,
) -> anyhow::Result<()> {
    let service = &ctx.services.my_list;
    match command {
        MyListCommand::Add {
            session,
            content_id,
        } => {
            service.add(require_user(&session)?, content_id).await?;
            println!("added {content_id}");
        }
        MyListCommand::Remove {
            session,
            content_id,
        } => {
            if service.remove(require_user(&session)?, content_id).await? {
                println!("removed {content_id}");
            } else {
                println!("{content_id} was not in the list");
            }
        }
        MyListCommand::Show(session) => {
            for item in service.list(require_user(&session)?).await? {
                match &item.content {
                    Some(content) => println!("{}  {}", content.id, content.title),
                    None => println!("{}  (removed)", item.entry.content_id),
                }
            }
        }
    }
    Ok(())
}

pub fn image_url(
    config: &Config,
    asset_id: &str,
    variant: ImageVariant,
) -> anyhow::Result<()> {
    let Some(delivery_url) = config.images.delivery_url.as_deref() else {
        bail!("IMAGES_DELIVERY_URL is not set");
    };
    println!("{}", build_image_url(delivery_url, asset_id, variant));
    Ok(())
}

fn require_user(args: &UserArgs) -> anyhow::Result<uuid::Uuid> {
    args.user
        .context("no user given; pass --user or set REELHOUSE_USER_ID")
}

async fn local_file(path: &Path) -> anyhow::Result<LocalFile> {
    let metadata = tokio::fs::metadata(path)
        .await
        .with_context(|| format!("cannot read {}", path.display()))?;
    if !metadata.is_file() {
        bail!("{} is not a file", path.display());
    }

    let mut file = LocalFile::new(path.to_string_lossy(), metadata.len());
    if let Some(name) = path.file_name() {
        file = file.with_name(name.to_string_lossy());
    }
    if let Some(mime) = path
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(mime_for_extension)
    {
        file = file.with_mime_type(mime);
    }
    info!(
        path = %path.display(),
        size = %format_file_size(file.size_bytes),
        "picked file"
    );
    Ok(file)
}

fn phase_label(phase: RegistrationPhase) -> &'static str {
    match phase {
        RegistrationPhase::Started => "starting",
        RegistrationPhase::UploadingVideo => "uploading video",
        RegistrationPhase::UploadingImage => "uploading poster",
        RegistrationPhase::Saving => "saving",
        RegistrationPhase::Done => "done",
    }
}

fn print_record(record: &ContentRecord) {
    println!(
        "{}  {}  [{}]  {}",
        record.id,
        record.title,
        record.display_category(),
        record.moderation
    );
}

fn print_watched(item: &WatchedItem) {
    println!("{}", watched_line(item));
}

fn watched_line(item: &WatchedItem) -> String {
    let title = item
        .content
        .as_ref()
        .map(|c| c.title.as_str())
        .unwrap_or("(removed)");
    let progress = &item.progress;
    let position = format_progress_time(progress.progress_time_seconds);
    if item.state().is_completed() {
        format!("{}  {}  {} (watched)", progress.content_id, title, position)
    } else {
        format!(
            "{}  {}  {} ({}%)",
            progress.content_id,
            title,
            position,
            format_progress_percentage(progress.progress_percentage)
        )
    }
}
