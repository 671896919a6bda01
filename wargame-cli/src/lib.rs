//! AI Wargame CLI - match orchestration
//!
//! - play: option merging and the turn loop (keyboard, broker, computer)
//! - broker: HTTP client for remote play
//! - trace: per-match text record

pub mod broker;
pub mod play;
pub mod trace;

pub use broker::{BlockingBroker, BrokerClient, BrokerError, WireMove};
pub use play::{GameTypeArg, MatchOutcome, MatchRunner, PlayArgs};
pub use trace::Trace;
