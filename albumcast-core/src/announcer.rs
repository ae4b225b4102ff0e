use async_trait::async_trait;

use crate::error::Result;
use crate::media::MediaKind;
use crate::pacing::Throttle;

/// Channel-imposed limit on media captions, in characters.
pub const CAPTION_LIMIT: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MessageOptions {
    pub disable_preview: bool,
    pub silent: bool,
}

/// Group messaging destination. The chat is fixed by the implementation.
#[async_trait]
pub trait Channel: Send + Sync {
    async fn send_photo(&self, photo_url: &str, caption: &str) -> Result<()>;

    async fn send_video(&self, video_url: &str, caption: &str) -> Result<()>;

    async fn send_message(&self, text: &str, options: MessageOptions) -> Result<()>;
}

/// Cut `caption` down to its first [`CAPTION_LIMIT`] characters.
pub fn truncate_caption(caption: &str) -> &str {
    match caption.char_indices().nth(CAPTION_LIMIT) {
        Some((end, _)) => &caption[..end],
        None => caption,
    }
}

pub fn media_caption(user_handle: &str, album_title: &str) -> String {
    format!("#{user_handle} {user_handle}: {album_title}")
}

pub fn page_message(user_handle: &str, page_url: &str) -> String {
    format!("\nGallery URL #{user_handle} \n({user_handle}): {page_url}\n")
}

/// Posts an album's media and gallery link to the channel, pausing after
/// every send according to its [`Throttle`].
pub struct Announcer<C> {
    channel: C,
    throttle: Throttle,
}

impl<C: Channel> Announcer<C> {
    pub fn new(channel: C, throttle: Throttle) -> Self {
        Self { channel, throttle }
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }

    /// Send each locator in order. Images go out as photos, everything else
    /// as video.
    pub async fn announce_media<S: AsRef<str>>(
        &self,
        user_handle: &str,
        album_title: &str,
        locators: &[S],
    ) -> Result<()> {
        let caption = media_caption(user_handle, album_title);
        let caption = truncate_caption(&caption);

        for locator in locators {
            let locator = locator.as_ref();
            match MediaKind::classify(locator) {
                MediaKind::Image => {
                    tracing::debug!("sendPhoto {}", locator);
                    self.throttle
                        .run(self.channel.send_photo(locator, caption))
                        .await?;
                }
                MediaKind::Video | MediaKind::Unknown => {
                    tracing::debug!("sendVideo {}", locator);
                    self.throttle
                        .run(self.channel.send_video(locator, caption))
                        .await?;
                }
            }
        }

        Ok(())
    }

    pub async fn announce_page(&self, user_handle: &str, page_url: &str) -> Result<()> {
        let text = page_message(user_handle, page_url);
        let options = MessageOptions {
            disable_preview: true,
            silent: true,
        };
        self.throttle
            .run(self.channel.send_message(&text, options))
            .await
    }
}
