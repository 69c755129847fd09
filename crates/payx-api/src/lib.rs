//! # payx-api
//!
//! HTTP paywall for PAYx402.
//!
//! This crate provides:
//! - Axum-based HTTP server
//! - x402 gate holding tier routes behind a USDC payment
//! - Farcaster Mini App manifest and landing page
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/` | Landing page |
//! | GET | `/health` | Health check |
//! | GET | `/payment/{tier_id}` | Payment confirmation (x402 gated) |
//! | GET | `/.well-known/farcaster.json` | Mini App manifest |
//! | GET | `/logo.png` | Logo |

pub mod gate;
pub mod handlers;
pub mod routes;
pub mod state;

pub use routes::create_router;
pub use state::{AppConfig, AppState};
