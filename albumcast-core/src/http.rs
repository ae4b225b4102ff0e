use reqwest::{Client, Response};
use tokio::time::Duration;

use crate::error::{RelayError, Result};

/// Build the shared client. Without a timeout, requests wait as long as the
/// remote side keeps the connection open.
pub fn build_client(timeout: Option<Duration>) -> Result<Client> {
    let mut builder = Client::builder();
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder
        .build()
        .map_err(|e| RelayError::Config(format!("Failed to build HTTP client: {e}")))
}

/// Drain a response into its status code and body text.
pub(crate) async fn read_body(operation: &'static str, response: Response) -> Result<(u16, String)> {
    let status = response.status().as_u16();
    let body = response
        .text()
        .await
        .map_err(|e| RelayError::network(operation, e))?;
    tracing::debug!(
        "{} -> {} ({} bytes): {}",
        operation,
        status,
        body.len(),
        preview(&body)
    );
    Ok((status, body))
}

fn preview(body: &str) -> &str {
    match body.char_indices().nth(300) {
        Some((end, _)) => &body[..end],
        None => body,
    }
}
