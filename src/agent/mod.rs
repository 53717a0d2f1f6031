//! Reasoning-service integration
//!
//! This module owns the I/O side of the advisor:
//! - Chat client for the reasoning service
//! - Prompt construction
//! - Allocation orchestration with market fallback
//! - Position review orchestration

pub mod allocator;
pub mod analysis;
pub mod client;
pub mod prompts;
pub mod reviewer;

pub use allocator::{AllocationAgent, AllocationReport};
pub use analysis::{compose_analysis, AnalysisParts};
pub use client::{ChatCompletion, ChatMessage, OpenAiClient};
pub use reviewer::PositionReviewer;
