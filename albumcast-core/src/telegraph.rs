use std::path::PathBuf;

use async_trait::async_trait;
use reqwest::{multipart, Client};
use serde::Deserialize;
use serde_json::json;

use crate::error::{RelayError, Result};
use crate::http::read_body;
use crate::media::MediaKind;
use crate::publisher::{GalleryHost, PageBody};

pub const TELEGRAPH_API_URL: &str = "https://api.telegra.ph";

/// Telegraph client: media upload plus page creation.
#[derive(Clone)]
pub struct TelegraphClient {
    client: Client,
    access_token: String,
    upload_url: String,
    api_url: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum UploadResponse {
    Files(Vec<UploadedFile>),
    Failure { error: String },
}

#[derive(Debug, Deserialize)]
struct UploadedFile {
    src: String,
}

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Page {
    url: String,
}

impl TelegraphClient {
    /// `gallery_host` is the origin serving uploads, e.g. `https://telegra.ph`.
    pub fn new(client: Client, access_token: String, gallery_host: &str) -> Self {
        Self {
            client,
            access_token,
            upload_url: format!("{}/upload", gallery_host.trim_end_matches('/')),
            api_url: TELEGRAPH_API_URL.to_string(),
        }
    }

    pub fn with_api_url(mut self, api_url: &str) -> Self {
        self.api_url = api_url.trim_end_matches('/').to_string();
        self
    }

    async fn build_form(files: &[PathBuf]) -> Result<multipart::Form> {
        let mut form = multipart::Form::new();
        for (index, path) in files.iter().enumerate() {
            let data = tokio::fs::read(path)
                .await
                .map_err(|e| RelayError::filesystem(path, e))?;
            let filename = path
                .file_name()
                .unwrap_or_default()
                .to_string_lossy()
                .to_string();
            let part = multipart::Part::bytes(data)
                .mime_str(MediaKind::mime_type(&filename))
                .map_err(|e| RelayError::network("upload", e))?
                .file_name(filename);
            form = form.part(index.to_string(), part);
        }
        Ok(form)
    }
}

fn parse_upload(status: u16, body: &str) -> Result<Vec<String>> {
    match serde_json::from_str::<UploadResponse>(body) {
        Ok(UploadResponse::Files(files)) if (200..300).contains(&status) => {
            Ok(files.into_iter().map(|file| file.src).collect())
        }
        Ok(UploadResponse::Failure { error }) => {
            Err(RelayError::from_status("upload", status.max(400), error, None))
        }
        _ if !(200..300).contains(&status) => Err(RelayError::from_status("upload", status, body, None)),
        _ => Err(RelayError::rejected("upload", format!("unexpected response: {body}"))),
    }
}

fn parse_page(status: u16, body: &str) -> Result<String> {
    match serde_json::from_str::<ApiResponse<Page>>(body) {
        Ok(ApiResponse {
            ok: true,
            result: Some(page),
            ..
        }) => Ok(page.url),
        Ok(response) => Err(RelayError::from_status(
            "createPage",
            if (200..300).contains(&status) { 400 } else { status },
            response.error.unwrap_or_else(|| "no page in response".to_string()),
            None,
        )),
        Err(_) => Err(RelayError::from_status(
            "createPage",
            if (200..300).contains(&status) { 400 } else { status },
            format!("unexpected response: {body}"),
            None,
        )),
    }
}

#[async_trait]
impl GalleryHost for TelegraphClient {
    async fn upload(&self, files: &[PathBuf]) -> Result<Vec<String>> {
        let form = Self::build_form(files).await?;
        tracing::debug!("POST {} with {} files", self.upload_url, files.len());

        let response = self
            .client
            .post(&self.upload_url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| RelayError::network("upload", e))?;

        let (status, body) = read_body("upload", response).await?;
        parse_upload(status, &body)
    }

    async fn create_page(&self, title: &str, body: &PageBody) -> Result<String> {
        let payload = json!({
            "access_token": self.access_token,
            "title": title,
            "content": body.nodes(),
            "return_content": false,
        });

        let response = self
            .client
            .post(format!("{}/createPage", self.api_url))
            .json(&payload)
            .send()
            .await
            .map_err(|e| RelayError::network("createPage", e))?;

        let (status, text) = read_body("createPage", response).await?;
        parse_page(status, &text)
    }
}
