pub mod announcer;
pub mod config;
pub mod error;
pub mod http;
pub mod media;
pub mod pacing;
pub mod pipeline;
pub mod publisher;
pub mod telegram;
pub mod telegraph;

pub use announcer::{Announcer, Channel, MessageOptions};
pub use config::Settings;
pub use error::{ErrorKind, RelayError, Result};
pub use media::MediaKind;
pub use pacing::Throttle;
pub use pipeline::{AlbumOutcome, AlbumProcessor, AlbumState, RunSummary};
pub use publisher::{GalleryHost, GalleryPublisher, PageBody, Publication};
pub use telegram::TelegramBot;
pub use telegraph::TelegraphClient;
