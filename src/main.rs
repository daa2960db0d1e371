use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::{Result, eyre};
use tokio::sync::mpsc;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use promobot::application::use_cases::PromoteUseCase;
use promobot::domain::entities::{RoomEvent, Settings};
use promobot::infrastructure::{
    AttachmentDecryptor, CliArgs, MatrixRoomClient, PromotionServerClient, load_settings,
    matrix::spawn_sync_loop,
};

fn init_logging(args: &CliArgs) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(args.log_level.to_string()));

    if let Some(log_path) = &args.log_path {
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)?;

        let file_layer = fmt::layer()
            .with_writer(file)
            .with_ansi(false)
            .with_target(true)
            .with_thread_ids(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .init();

        info!(path = %log_path.display(), "Logging initialized");
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer())
            .init();
    }

    Ok(())
}

/// Refuses startup on an invalid configuration, logging every defect.
fn check_settings(settings: &Settings) -> Result<()> {
    let defects = settings.validate();
    if defects.is_empty() {
        return Ok(());
    }

    error!(count = defects.len(), "invalid configuration detected");
    for (index, defect) in defects.iter().enumerate() {
        error!("config error #{}: {defect}", index + 1);
    }
    Err(eyre!("configuration is invalid, refusing to start"))
}

fn log_startup(settings: &Settings) {
    info!(version = promobot::VERSION, "Starting promobot");
    info!(
        commands = ?settings.commands,
        auto_join = settings.auto_join,
        "Configuration loaded"
    );
    info!(server = %settings.promotion.server_url, "Promotion server");
    info!(
        global_secs = settings.cooldowns.global,
        user_secs = settings.cooldowns.user,
        "Cooldowns"
    );
    info!(
        max_size_bytes = settings.image.maximum_file_size_bytes,
        formats = ?settings.image.allowed_image_formats,
        "Image policy"
    );
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let args = CliArgs::parse();
    init_logging(&args)?;

    let settings = load_settings(args.config.as_deref())?;
    check_settings(&settings)?;
    log_startup(&settings);

    let room_client = Arc::new(MatrixRoomClient::new(&settings.homeserver)?);
    let decryptor = Arc::new(AttachmentDecryptor::new());
    let server = Arc::new(PromotionServerClient::new(&settings.promotion)?);

    let pipeline = Arc::new(PromoteUseCase::new(
        room_client.clone(),
        decryptor,
        server,
        &settings,
    ));

    let (events_tx, mut events_rx) = mpsc::unbounded_channel::<RoomEvent>();
    let sync_handle = spawn_sync_loop(room_client, events_tx);

    // One independent unit of work per inbound event.
    while let Some(event) = events_rx.recv().await {
        let pipeline = Arc::clone(&pipeline);
        tokio::spawn(async move {
            match event {
                RoomEvent::Message(message) => {
                    pipeline.handle_message(&message).await;
                }
                RoomEvent::Membership(membership) => {
                    pipeline.handle_membership(&membership).await;
                }
            }
        });
    }

    sync_handle.await?;
    Ok(())
}
