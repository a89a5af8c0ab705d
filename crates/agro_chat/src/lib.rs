//! # agro_chat - Agri Assistant message pipeline
//!
//! This crate holds the conversational core of the Agri Assistant:
//! - **Markup**: turns raw replies into bold/italic/bullet segments
//! - **Conversation log**: append-only history with change notifications
//! - **Orchestrator**: one exchange at a time against an injected provider
//! - **Providers**: Gemini adapter, bounded-wait wrapper, scripted provider
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐ submit ┌──────────────────┐ generate ┌──────────────────┐
//! │ Input surface│───────▶│ ChatOrchestrator │─────────▶│GenerationProvider│
//! └──────────────┘        └────────┬─────────┘          └──────────────────┘
//!                                  │ append
//!                                  ▼
//!                         ┌──────────────────┐  LogEvent  ┌──────────┐
//!                         │ ConversationLog  │───────────▶│ Renderer │
//!                         └──────────────────┘            └────┬─────┘
//!                                                              │ parse
//!                                                              ▼
//!                                                     Vec<FormattedSegment>
//! ```
//!
//! The log stores raw text; markup is parsed when a message is rendered.

pub mod error;
pub mod gemini;
pub mod log;
pub mod markup;
pub mod mock;
pub mod orchestrator;
pub mod provider;
pub mod settings;
pub mod types;

pub use error::*;
pub use gemini::GeminiProvider;
pub use log::{ConversationLog, LogEvent};
pub use markup::{parse, plain_text, FormattedSegment};
pub use mock::ScriptedProvider;
pub use orchestrator::{ChatOrchestrator, ExchangeOutcome, FALLBACK_REPLY};
pub use provider::{GenerationProvider, TimeoutProvider};
pub use settings::ChatSettings;
pub use types::*;
