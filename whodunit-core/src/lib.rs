//! Social-deduction murder-mystery game engine.
//!
//! This crate provides:
//! - A fixed cast of four characters, one secretly the murderer
//! - Per-agent suspicion scoring driven by a keyword scanner
//! - A round loop of weighted interrogations and threshold accusations
//! - Optional OpenAI-generated dialogue with scripted fallbacks
//!
//! # Quick Start
//!
//! ```ignore
//! use whodunit_core::{Game, GameConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = GameConfig::new().with_seed(42).with_offline(true);
//!
//!     let mut game = Game::new(config)?;
//!     let outcome = game.play(4).await?;
//!
//!     println!("The murderer was {}", outcome.murderer);
//!     println!("{} wins", outcome.winner);
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod cast;
pub mod game;
pub mod responder;
pub mod rng;
pub mod testing;

// Primary public API
pub use agent::{Agent, Role, Whisper};
pub use game::{Game, GameConfig, GameError, Outcome, DEFAULT_MODEL};
pub use responder::{OpenAiResponder, Responder, ResponderError};
pub use rng::GameRng;
pub use testing::ScriptedResponder;
