// pagekeep/src/application/messaging.rs
//! JSON request/response surface: one request object in, one response
//! object out. `serve` speaks newline-delimited JSON over any byte stream.
use crate::application::error::{ApplicationError, ApplicationResult};
use crate::application::services::capture_service::CaptureService;
use crate::domain::capture::CaptureMode;
use crate::domain::services::downloads::DownloadId;
use crate::domain::services::tabs::TabId;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, error, instrument};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Request {
    SavePage {
        url: String,
        #[serde(default)]
        title: String,
        #[serde(default, rename = "tabId")]
        tab_id: Option<TabId>,
        #[serde(default)]
        mode: CaptureMode,
    },
    CreateClonedTab {
        html: String,
        #[serde(default)]
        title: String,
    },
    Ping,
    ClonePage {
        #[serde(default, rename = "tabId")]
        tab_id: Option<TabId>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Response {
    Saved {
        success: bool,
        #[serde(rename = "downloadId")]
        download_id: DownloadId,
    },
    TabCreated {
        success: bool,
        #[serde(rename = "tabId")]
        tab_id: TabId,
    },
    Done {
        success: bool,
    },
    Status {
        status: String,
    },
    Failed {
        success: bool,
        error: String,
    },
}

impl Response {
    pub fn saved(download_id: DownloadId) -> Self {
        Response::Saved {
            success: true,
            download_id,
        }
    }

    pub fn tab_created(tab_id: TabId) -> Self {
        Response::TabCreated {
            success: true,
            tab_id,
        }
    }

    pub fn done() -> Self {
        Response::Done { success: true }
    }

    pub fn ready() -> Self {
        Response::Status {
            status: "ready".to_string(),
        }
    }

    pub fn failed(error: impl ToString) -> Self {
        Response::Failed {
            success: false,
            error: error.to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        match self {
            Response::Saved { success, .. }
            | Response::TabCreated { success, .. }
            | Response::Done { success }
            | Response::Failed { success, .. } => *success,
            Response::Status { .. } => true,
        }
    }
}

/// Tab id 0 is never a real tab and counts as absent.
fn present(tab_id: Option<TabId>) -> Option<TabId> {
    tab_id.filter(|tab| tab.0 != 0)
}

/// Last-resort reply when a response cannot be serialized.
fn serialization_failure(err: impl std::fmt::Display) -> String {
    serde_json::json!({
        "success": false,
        "error": format!("Failed to serialize response: {}", err),
    })
    .to_string()
}

fn respond<T>(result: ApplicationResult<T>, on_success: impl FnOnce(T) -> Response) -> Response {
    match result {
        Ok(value) => on_success(value),
        Err(e) => {
            error!("Request failed: {}", e);
            Response::failed(e)
        }
    }
}

/// Dispatches requests to the capture service.
#[derive(Debug, Clone)]
pub struct MessageRouter {
    capture: Arc<dyn CaptureService>,
}

impl MessageRouter {
    pub fn new(capture: Arc<dyn CaptureService>) -> Self {
        Self { capture }
    }

    #[instrument(skip(self, request), level = "debug")]
    pub async fn handle(&self, request: Request) -> Response {
        match request {
            Request::Ping => Response::ready(),
            Request::SavePage {
                url,
                title,
                tab_id,
                mode,
            } => {
                let result = match present(tab_id) {
                    Some(tab) => self.capture.capture(mode, tab, &url, &title).await,
                    None => Err(ApplicationError::MissingTabId),
                };
                respond(result, Response::saved)
            }
            Request::CreateClonedTab { html, title } => {
                let result = self.capture.create_cloned_tab(&html, &title).await;
                respond(result, Response::tab_created)
            }
            Request::ClonePage { tab_id } => {
                let result = match self.capture.resolve_tab(present(tab_id)).await {
                    Ok(tab) => self.capture.clone_page(tab).await,
                    Err(e) => Err(e),
                };
                respond(result, |_| Response::done())
            }
        }
    }

    /// Handle one serialized request and serialize the response.
    pub async fn handle_line(&self, line: &str) -> String {
        let response = match serde_json::from_str::<Request>(line) {
            Ok(request) => self.handle(request).await,
            Err(e) => Response::failed(format!("Invalid request: {}", e)),
        };
        serde_json::to_string(&response).unwrap_or_else(serialization_failure)
    }

    /// Answer newline-delimited requests until the reader is exhausted.
    /// Returns the number of requests handled.
    #[instrument(skip_all, level = "debug")]
    pub async fn serve<R, W>(&self, reader: R, mut writer: W) -> std::io::Result<usize>
    where
        R: AsyncBufRead + Unpin + Send,
        W: AsyncWrite + Unpin + Send,
    {
        let mut lines = reader.lines();
        let mut handled = 0;
        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            let reply = self.handle_line(&line).await;
            writer.write_all(reply.as_bytes()).await?;
            writer.write_all(b"\n").await?;
            writer.flush().await?;
            handled += 1;
        }
        debug!("Input closed after {} requests", handled);
        Ok(handled)
    }
}
