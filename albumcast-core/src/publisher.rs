use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::{json, Value};
use walkdir::WalkDir;

use crate::error::{RelayError, Result};
use crate::media::MediaKind;
use crate::pacing::Throttle;

/// Remote host that stores uploaded media and serves gallery pages.
#[async_trait]
pub trait GalleryHost: Send + Sync {
    /// Upload every file in one batch. Returns one host-relative locator per
    /// input file, in input order.
    async fn upload(&self, files: &[PathBuf]) -> Result<Vec<String>>;

    /// Create a page and return its public URL.
    async fn create_page(&self, title: &str, body: &PageBody) -> Result<String>;
}

/// Result of publishing a non-empty album.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Publication {
    pub page_url: String,
    pub locators: Vec<String>,
}

/// Ordered media blocks making up a gallery page.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PageBody {
    blocks: Vec<(MediaKind, String)>,
}

impl PageBody {
    pub fn compose<S: AsRef<str>>(locators: &[S]) -> Self {
        Self {
            blocks: locators
                .iter()
                .map(|locator| {
                    let locator = locator.as_ref();
                    (MediaKind::classify(locator), locator.to_string())
                })
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// HTML fragment, one block per locator, each followed by a line break.
    pub fn html(&self) -> String {
        self.blocks
            .iter()
            .map(|(kind, locator)| match kind {
                MediaKind::Image => format!("<img src='{locator}'> <br />"),
                MediaKind::Video => format!("<video src='{locator}' controls></video> <br />"),
                MediaKind::Unknown => {
                    format!("<p>found new kind of content {locator}</p> <br />")
                }
            })
            .collect()
    }

    /// The same content as Telegraph DOM nodes. Telegraph only keeps `src`
    /// and `href` attributes, so `controls` is dropped here.
    pub fn nodes(&self) -> Vec<Value> {
        let mut nodes = Vec::with_capacity(self.blocks.len() * 3);
        for (kind, locator) in &self.blocks {
            nodes.push(match kind {
                MediaKind::Image => json!({ "tag": "img", "attrs": { "src": locator } }),
                MediaKind::Video => json!({ "tag": "video", "attrs": { "src": locator } }),
                MediaKind::Unknown => json!({
                    "tag": "p",
                    "children": [format!("found new kind of content {locator}")],
                }),
            });
            nodes.push(Value::String(" ".to_string()));
            nodes.push(json!({ "tag": "br" }));
        }
        nodes
    }
}

pub fn page_title(album_title: &str, user_handle: &str) -> String {
    format!("{album_title} by {user_handle}")
}

/// Regular files directly inside `album_dir`, sorted by name. Symlinks count
/// as whatever they point to; dangling links and subdirectories are skipped.
pub fn media_files(album_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(album_dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| walk_error(album_dir, e))?;
        if entry.file_type().is_file() || (entry.path_is_symlink() && entry.path().is_file()) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

pub(crate) fn walk_error(root: &Path, err: walkdir::Error) -> RelayError {
    let path = err.path().unwrap_or(root).to_path_buf();
    let source = err
        .into_io_error()
        .unwrap_or_else(|| std::io::Error::other("directory walk failed"));
    RelayError::filesystem(path, source)
}

/// Uploads an album's files and turns them into a gallery page.
pub struct GalleryPublisher<G> {
    host: G,
    throttle: Throttle,
}

impl<G: GalleryHost> GalleryPublisher<G> {
    pub fn new(host: G) -> Self {
        Self {
            host,
            throttle: Throttle::Unlimited,
        }
    }

    pub fn with_throttle(mut self, throttle: Throttle) -> Self {
        self.throttle = throttle;
        self
    }

    pub fn host(&self) -> &G {
        &self.host
    }

    /// Publish `files` as one page. `Ok(None)` means there was nothing to
    /// publish and no remote call was made.
    pub async fn publish(
        &self,
        album_title: &str,
        user_handle: &str,
        files: &[PathBuf],
    ) -> Result<Option<Publication>> {
        if files.is_empty() {
            return Ok(None);
        }

        for file in files {
            if MediaKind::of_path(file) == MediaKind::Unknown {
                tracing::warn!("Uploading file of unknown media kind: {}", file.display());
            }
        }
        tracing::debug!("Uploading {} files for album '{}'", files.len(), album_title);
        let locators = self.throttle.run(self.host.upload(files)).await?;
        if locators.len() != files.len() {
            return Err(RelayError::rejected(
                "upload",
                format!(
                    "expected {} locators, host returned {}",
                    files.len(),
                    locators.len()
                ),
            ));
        }

        let body = PageBody::compose(&locators);
        let title = page_title(album_title, user_handle);
        let page_url = self.throttle.run(self.host.create_page(&title, &body)).await?;
        tracing::info!("Created gallery page '{}': {}", title, page_url);

        Ok(Some(Publication { page_url, locators }))
    }
}
