use anyhow::{Context, Result};
use albumcast_core::{
    http, AlbumProcessor, Announcer, GalleryPublisher, Settings, TelegramBot, TelegraphClient,
    Throttle,
};
use std::path::PathBuf;

pub async fn execute(root: PathBuf) -> Result<()> {
    let settings = Settings::from_env().context("Failed to load settings")?;
    tracing::debug!("Loaded {:?}", settings);

    let client = http::build_client(settings.http_timeout)?;
    let telegraph = TelegraphClient::new(
        client.clone(),
        settings.telegraph_token.clone(),
        &settings.gallery_host,
    );
    let bot = TelegramBot::new(client, settings.telegram_token.clone(), settings.chat_id.clone());

    let processor = AlbumProcessor::new(
        GalleryPublisher::new(telegraph)
            .with_throttle(Throttle::min_interval(settings.publish_interval)),
        Announcer::new(bot, Throttle::fixed(settings.send_pause)),
        settings.gallery_host.clone(),
    );

    tracing::info!("Processing albums under {}", root.display());
    let summary = processor
        .run(&root)
        .await
        .with_context(|| format!("Run aborted while processing {}", root.display()))?;

    println!("✓ Run complete");
    println!("Users: {}", summary.users);
    println!(
        "Albums: {} published, {} empty",
        summary.albums_published, summary.albums_empty
    );
    println!("Media sent: {}", summary.media_sent);

    Ok(())
}
