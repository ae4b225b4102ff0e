//! Album → user → root traversal. Each level finishes completely, deletion
//! included, before its next sibling starts. Any error aborts the whole run
//! and leaves the failing album (and its user) on disk.

use std::fmt;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::announcer::{Announcer, Channel};
use crate::error::{RelayError, Result};
use crate::publisher::{media_files, walk_error, GalleryHost, GalleryPublisher};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlbumState {
    Start,
    Published,
    Announced,
    Empty,
    Cleaned,
    Failed,
}

impl fmt::Display for AlbumState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Start => "START",
            Self::Published => "PUBLISHED",
            Self::Announced => "ANNOUNCED",
            Self::Empty => "EMPTY",
            Self::Cleaned => "CLEANED",
            Self::Failed => "FAILED",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlbumOutcome {
    Published { page_url: String, media_count: usize },
    Empty,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub users: usize,
    pub albums_published: usize,
    pub albums_empty: usize,
    pub media_sent: usize,
}

impl RunSummary {
    fn record(&mut self, outcome: &AlbumOutcome) {
        match outcome {
            AlbumOutcome::Published { media_count, .. } => {
                self.albums_published += 1;
                self.media_sent += media_count;
            }
            AlbumOutcome::Empty => self.albums_empty += 1,
        }
    }

    fn merge(&mut self, other: RunSummary) {
        self.users += other.users;
        self.albums_published += other.albums_published;
        self.albums_empty += other.albums_empty;
        self.media_sent += other.media_sent;
    }
}

pub struct AlbumProcessor<G, C> {
    publisher: GalleryPublisher<G>,
    announcer: Announcer<C>,
    gallery_host: String,
}

impl<G: GalleryHost, C: Channel> AlbumProcessor<G, C> {
    /// `gallery_host` is prepended to every locator before it is announced.
    pub fn new(
        publisher: GalleryPublisher<G>,
        announcer: Announcer<C>,
        gallery_host: impl Into<String>,
    ) -> Self {
        Self {
            publisher,
            announcer,
            gallery_host: gallery_host.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn publisher(&self) -> &GalleryPublisher<G> {
        &self.publisher
    }

    pub fn announcer(&self) -> &Announcer<C> {
        &self.announcer
    }

    /// Publish, announce and delete one album directory.
    pub async fn process_album(&self, user: &str, album_dir: &Path) -> Result<AlbumOutcome> {
        let album = dir_name(album_dir);
        log_state(user, &album, AlbumState::Start);

        let outcome = match self.publish_and_announce(user, &album, album_dir).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(
                    user,
                    album = %album,
                    state = %AlbumState::Failed,
                    "Album left at {}: {}",
                    album_dir.display(),
                    e
                );
                return Err(e);
            }
        };

        clean_up(album_dir).await?;
        log_state(user, &album, AlbumState::Cleaned);
        Ok(outcome)
    }

    async fn publish_and_announce(
        &self,
        user: &str,
        album: &str,
        album_dir: &Path,
    ) -> Result<AlbumOutcome> {
        let files = media_files(album_dir)?;
        let Some(publication) = self.publisher.publish(album, user, &files).await? else {
            log_state(user, album, AlbumState::Empty);
            return Ok(AlbumOutcome::Empty);
        };

        let media_urls: Vec<String> = publication
            .locators
            .iter()
            .map(|locator| format!("{}{}", self.gallery_host, locator))
            .collect();
        self.announcer.announce_media(user, album, &media_urls).await?;
        log_state(user, album, AlbumState::Published);

        self.announcer
            .announce_page(user, &publication.page_url)
            .await?;
        log_state(user, album, AlbumState::Announced);

        Ok(AlbumOutcome::Published {
            page_url: publication.page_url,
            media_count: media_urls.len(),
        })
    }

    /// Process every album directory of one user. The user directory itself
    /// is left for the caller to remove.
    pub async fn process_user(&self, user_dir: &Path) -> Result<RunSummary> {
        let user = dir_name(user_dir);
        tracing::info!("Processing user '{}'", user);

        let mut summary = RunSummary::default();
        for album_dir in subdirectories(user_dir)? {
            let outcome = self.process_album(&user, &album_dir).await?;
            summary.record(&outcome);
        }
        Ok(summary)
    }

    /// Process and delete every user directory under `root`.
    pub async fn run(&self, root: &Path) -> Result<RunSummary> {
        let mut summary = RunSummary::default();
        for user_dir in subdirectories(root)? {
            let user_summary = self.process_user(&user_dir).await?;
            clean_up(&user_dir).await?;
            tracing::info!("Removed user directory {}", user_dir.display());

            summary.users += 1;
            summary.merge(user_summary);
        }
        Ok(summary)
    }
}

fn log_state(user: &str, album: &str, state: AlbumState) {
    tracing::info!(user, album, state = %state, "Album state changed");
}

fn dir_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

/// Direct subdirectories of `dir`, sorted by name. Symlinks to directories
/// are included; other entries are skipped. `dir` itself must be a directory.
pub fn subdirectories(dir: &Path) -> Result<Vec<PathBuf>> {
    let metadata = std::fs::metadata(dir).map_err(|e| RelayError::filesystem(dir, e))?;
    if !metadata.is_dir() {
        return Err(RelayError::filesystem(
            dir,
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "not a directory"),
        ));
    }

    let mut dirs = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| walk_error(dir, e))?;
        if entry.file_type().is_dir() || (entry.path_is_symlink() && entry.path().is_dir()) {
            dirs.push(entry.into_path());
        } else {
            tracing::warn!("Skipping non-directory entry {}", entry.path().display());
        }
    }
    Ok(dirs)
}

/// Remove a directory tree, or a single file.
pub async fn clean_up(path: &Path) -> Result<()> {
    let metadata = tokio::fs::symlink_metadata(path)
        .await
        .map_err(|e| RelayError::filesystem(path, e))?;

    let removed = if metadata.is_dir() {
        tokio::fs::remove_dir_all(path).await
    } else {
        tokio::fs::remove_file(path).await
    };
    removed.map_err(|e| RelayError::filesystem(path, e))
}
