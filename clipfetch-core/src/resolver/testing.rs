//! Scripted in-memory transport for deterministic resolver tests.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::errors::FetchError;
use super::fetch::Transport;
use super::types::{RawResponse, RequestSpec};

/// Canned behaviour for requests whose URL contains a given marker.
#[derive(Debug, Clone)]
pub enum ScriptedReply {
    Respond { status: u16, body: String },
    NetworkFailure(String),
    /// Never settles
    Hang,
    Delayed(Duration, Box<ScriptedReply>),
}

impl ScriptedReply {
    pub fn json(status: u16, body: impl Into<String>) -> Self {
        ScriptedReply::Respond {
            status,
            body: body.into(),
        }
    }
}

/// Transport that answers from a script and records every request in order.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    script: Vec<(String, ScriptedReply)>,
    calls: Mutex<Vec<RequestSpec>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `reply` for any request whose URL contains `marker`.
    pub fn on(mut self, marker: &str, reply: ScriptedReply) -> Self {
        self.script.push((marker.to_string(), reply));
        self
    }

    /// Requests seen so far, in send order.
    pub fn calls(&self) -> Vec<RequestSpec> {
        self.calls.lock().unwrap().clone()
    }

    fn reply_for(&self, url: &str) -> ScriptedReply {
        self.script
            .iter()
            .find(|(marker, _)| url.contains(marker.as_str()))
            .map(|(_, reply)| reply.clone())
            .unwrap_or_else(|| ScriptedReply::NetworkFailure(format!("no script for {url}")))
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, spec: &RequestSpec) -> Result<RawResponse, FetchError> {
        self.calls.lock().unwrap().push(spec.clone());

        let mut reply = self.reply_for(&spec.url);
        loop {
            match reply {
                ScriptedReply::Respond { status, body } => {
                    return Ok(RawResponse::new(status, body));
                }
                ScriptedReply::NetworkFailure(reason) => {
                    return Err(FetchError::Network { reason });
                }
                ScriptedReply::Hang => std::future::pending::<()>().await,
                ScriptedReply::Delayed(delay, next) => {
                    tokio::time::sleep(delay).await;
                    reply = *next;
                }
            }
        }
    }
}
