// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Triton-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Triton and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! HTTP client for the render server.
//!
//! The server exposes one endpoint, `plot`, dispatched on the `a` parameter:
//! `a=list` enumerates datasets, `a=plot` renders a diagram and answers with
//! result URLs plus per-diagram error lists. All calls are async; the TUI
//! talks to them through [`spawn_worker`], which bridges the tokio runtime to
//! the blocking draw loop with a pair of channels.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::{unbounded_channel, UnboundedSender};

use crate::model::DatasetInfo;

#[derive(Debug)]
pub enum ClientError {
    Http(reqwest::Error),
    Status { status: u16 },
    Decode(String),
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(err) => write!(f, "request failed: {err}"),
            Self::Status { status } => write!(f, "server answered with status {status}"),
            Self::Decode(msg) => write!(f, "could not decode server response: {msg}"),
        }
    }
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Http(err) => Some(err),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        Self::Http(err)
    }
}

/// Error lists of one render response: session-wide problems under `global`,
/// per-diagram problems keyed by diagram index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotErrors {
    pub global: Vec<String>,
    pub diagrams: BTreeMap<String, Vec<String>>,
}

impl PlotErrors {
    pub fn is_empty(&self) -> bool {
        self.global.is_empty() && self.diagrams.values().all(|errs| errs.is_empty())
    }

    /// All messages flattened, global first.
    pub fn messages(&self) -> Vec<String> {
        let mut out = self.global.clone();
        for (diagram, errs) in &self.diagrams {
            out.extend(errs.iter().map(|err| format!("diagram {diagram}: {err}")));
        }
        out
    }
}

/// Answer to `a=plot`: one relative URL per output format, present on success.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotResult {
    pub png: Option<String>,
    pub pdf: Option<String>,
    pub svg: Option<String>,
    pub errors: PlotErrors,
}

impl PlotResult {
    pub fn succeeded(&self) -> bool {
        self.png.is_some() && self.errors.is_empty()
    }
}

/// Thin wrapper over the render server's `plot` endpoint.
#[derive(Debug, Clone)]
pub struct PlotClient {
    base_url: String,
    http: reqwest::Client,
}

impl PlotClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("triton/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { base_url: base_url.into().trim_end_matches('/').to_owned(), http })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self) -> String {
        format!("{}/plot", self.base_url)
    }

    /// `a=list`: the datasets the server can read, as id/title pairs.
    pub async fn list_datasets(&self) -> Result<Vec<DatasetInfo>, ClientError> {
        let response = self
            .http
            .get(self.endpoint())
            .query(&[("a", "list")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status { status: status.as_u16() });
        }

        let listing: BTreeMap<String, String> = response
            .json()
            .await
            .map_err(|err| ClientError::Decode(err.to_string()))?;
        Ok(listing
            .into_iter()
            .map(|(id, title)| DatasetInfo::new(id, title))
            .collect())
    }

    /// `a=plot`: submits the form parameters and returns the render result.
    /// Render errors come back inside the result, not as an `Err`.
    pub async fn submit_plot(
        &self,
        params: &[(String, String)],
    ) -> Result<PlotResult, ClientError> {
        let response = self.http.get(self.endpoint()).query(params).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status { status: status.as_u16() });
        }

        response
            .json()
            .await
            .map_err(|err| ClientError::Decode(err.to_string()))
    }

    /// A result URL resolved against the server base.
    pub fn absolute_url(&self, relative: &str) -> String {
        format!("{}/{}", self.base_url, relative.trim_start_matches('/'))
    }
}

/// Work the TUI hands to the client worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientRequest {
    ListDatasets,
    SubmitPlot { params: Vec<(String, String)> },
}

/// Answers flowing back into the draw loop.
#[derive(Debug)]
pub enum ClientResponse {
    Datasets(Result<Vec<DatasetInfo>, ClientError>),
    Plot(Result<PlotResult, ClientError>),
}

/// Spawns the client worker on the current tokio runtime.
///
/// Requests go in over a tokio channel; answers come out over a std channel the
/// draw loop drains without blocking. Requests are served strictly in order.
pub fn spawn_worker(
    client: PlotClient,
) -> (UnboundedSender<ClientRequest>, std::sync::mpsc::Receiver<ClientResponse>) {
    let (request_tx, mut request_rx) = unbounded_channel::<ClientRequest>();
    let (response_tx, response_rx) = std::sync::mpsc::channel::<ClientResponse>();

    tokio::spawn(async move {
        while let Some(request) = request_rx.recv().await {
            let response = match request {
                ClientRequest::ListDatasets => {
                    ClientResponse::Datasets(client.list_datasets().await)
                }
                ClientRequest::SubmitPlot { params } => {
                    ClientResponse::Plot(client.submit_plot(&params).await)
                }
            };
            // The TUI dropping its receiver means shutdown.
            if response_tx.send(response).is_err() {
                break;
            }
        }
    });

    (request_tx, response_rx)
}

#[cfg(test)]
mod tests {
    use super::{ClientError, PlotClient, PlotErrors, PlotResult};

    #[test]
    fn plot_result_decodes_server_shape() {
        let raw = r#"{
            "png": "cache/plot-1234.png",
            "pdf": "cache/plot-1234.pdf",
            "svg": "cache/plot-1234.svg",
            "errors": { "global": [], "diagrams": {} }
        }"#;
        let result: PlotResult = serde_json::from_str(raw).expect("decode");
        assert!(result.succeeded());
        assert_eq!(result.png.as_deref(), Some("cache/plot-1234.png"));
    }

    #[test]
    fn render_errors_are_data_not_transport_failures() {
        let raw = r#"{
            "errors": {
                "global": ["session expired"],
                "diagrams": { "0": ["unknown column 'mu_rat'"] }
            }
        }"#;
        let result: PlotResult = serde_json::from_str(raw).expect("decode");
        assert!(!result.succeeded());
        assert!(result.png.is_none());
        let messages = result.errors.messages();
        assert_eq!(messages[0], "session expired");
        assert_eq!(messages[1], "diagram 0: unknown column 'mu_rat'");
    }

    #[test]
    fn empty_errors_object_counts_as_clean() {
        let errors = PlotErrors::default();
        assert!(errors.is_empty());
        let result: PlotResult = serde_json::from_str("{}").expect("decode");
        assert!(result.errors.is_empty());
    }

    #[test]
    fn base_url_is_normalized() {
        let client = PlotClient::new("http://localhost:8080/").expect("client");
        assert_eq!(client.base_url(), "http://localhost:8080");
        assert_eq!(
            client.absolute_url("/cache/p.png"),
            "http://localhost:8080/cache/p.png"
        );
    }

    #[test]
    fn status_errors_name_the_code() {
        let err = ClientError::Status { status: 502 };
        assert_eq!(err.to_string(), "server answered with status 502");
    }
}
