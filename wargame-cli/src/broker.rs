//! Game broker client
//!
//! A broker relays moves between two remote players over HTTP JSON:
//! - GET returns the latest move (if any) tagged with the turn it belongs to
//! - POST publishes our move; the broker echoes it back on success
//!
//! Failures never end a match: callers log them and poll again (GET) or
//! drop the move (POST).

use std::time::Duration;

use reqwest::header::ACCEPT;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use wargame_core::{Coord, Move};

/// Delay between two broker polls
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

// ============================================================================
// WIRE TYPES
// ============================================================================

/// A move as exchanged with the broker
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireMove {
    pub from: Coord,
    pub to: Coord,
    pub turn: u32,
}

impl WireMove {
    pub fn new(mv: Move, turn: u32) -> Self {
        Self {
            from: mv.src,
            to: mv.dst,
            turn,
        }
    }

    pub fn to_move(self) -> Move {
        Move::new(self.from, self.to)
    }
}

#[derive(Debug, Deserialize)]
pub struct BrokerResponse {
    pub success: bool,
    #[serde(default)]
    pub data: Option<WireMove>,
}

#[derive(Debug, Error)]
pub enum BrokerError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("status code {status}, response: {body}")]
    Status { status: StatusCode, body: String },

    #[error("malformed response {body:?}: {source}")]
    Malformed {
        body: String,
        source: serde_json::Error,
    },

    #[error("broker reported failure")]
    Rejected,

    #[error("broker echoed {echoed:?}, expected {sent:?}")]
    EchoMismatch {
        sent: WireMove,
        echoed: Option<WireMove>,
    },
}

// ============================================================================
// ASYNC CLIENT
// ============================================================================

pub struct BrokerClient {
    url: String,
    http_client: reqwest::Client,
}

impl BrokerClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            http_client: reqwest::Client::new(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch the broker's current move if it belongs to `expected_turn`.
    /// `Ok(None)` when the broker has nothing for that turn yet.
    pub async fn fetch_move(&self, expected_turn: u32) -> Result<Option<Move>, BrokerError> {
        let response = self
            .http_client
            .get(&self.url)
            .header(ACCEPT, "application/json")
            .send()
            .await?;
        let reply = read_reply(response).await?;

        match reply.data {
            Some(wire) if wire.turn == expected_turn => {
                let mv = wire.to_move();
                tracing::debug!("Got move from broker: {}", mv);
                Ok(Some(mv))
            }
            Some(wire) => {
                tracing::trace!("broker data for turn {}, wanted {}", wire.turn, expected_turn);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    /// Publish a move played on turn `turn` and check the broker's echo
    pub async fn post_move(&self, mv: Move, turn: u32) -> Result<(), BrokerError> {
        let sent = WireMove::new(mv, turn);
        let response = self.http_client.post(&self.url).json(&sent).send().await?;
        let reply = read_reply(response).await?;

        if reply.data != Some(sent) {
            return Err(BrokerError::EchoMismatch {
                sent,
                echoed: reply.data,
            });
        }
        tracing::debug!("Sent move to broker: {} (turn {})", mv, turn);
        Ok(())
    }
}

/// Status check, JSON decode and `success` flag shared by GET and POST
async fn read_reply(response: reqwest::Response) -> Result<BrokerResponse, BrokerError> {
    let status = response.status();
    let body = response.text().await?;

    if status != StatusCode::OK {
        return Err(BrokerError::Status { status, body });
    }

    let reply: BrokerResponse = match serde_json::from_str(&body) {
        Ok(reply) => reply,
        Err(source) => return Err(BrokerError::Malformed { body, source }),
    };
    if !reply.success {
        return Err(BrokerError::Rejected);
    }
    Ok(reply)
}

// ============================================================================
// BLOCKING FACADE
// ============================================================================

/// Broker access for the synchronous turn loop. Owns a current-thread
/// runtime and must not be used from inside another runtime.
pub struct BlockingBroker {
    runtime: tokio::runtime::Runtime,
    client: BrokerClient,
    poll_interval: Duration,
}

impl BlockingBroker {
    pub fn new(url: impl Into<String>) -> std::io::Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        Ok(Self {
            runtime,
            client: BrokerClient::new(url),
            poll_interval: POLL_INTERVAL,
        })
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn url(&self) -> &str {
        self.client.url()
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn fetch_move(&self, expected_turn: u32) -> Result<Option<Move>, BrokerError> {
        self.runtime.block_on(self.client.fetch_move(expected_turn))
    }

    pub fn post_move(&self, mv: Move, turn: u32) -> Result<(), BrokerError> {
        self.runtime.block_on(self.client.post_move(mv, turn))
    }
}
