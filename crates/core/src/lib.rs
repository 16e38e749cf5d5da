//! Core library for chatmark
//!
//! This crate implements the **Functional Core** of the chatmark application,
//! following the Functional Core - Imperative Shell architectural pattern.
//!
//! # Architecture Overview
//!
//! The chatmark project uses a two-crate architecture to enforce separation of concerns:
//!
//! - **`chatmark_core`** (this crate): Pure transformation functions with zero I/O
//! - **`chatmark`**: Input/output and orchestration (the Imperative Shell)
//!
//! ## Functional Core Principles
//!
//! All functions in this crate adhere to these principles:
//!
//! - **Pure functions**: Same input always produces the same output
//! - **No side effects**: No I/O operations, no external state mutations
//! - **Total**: Every string converts; malformed markup degrades to literal text
//! - **Testable**: Can be tested with simple fixture strings, no mocking required
//!
//! # Module Organization
//!
//! - [`transcode`]: Markdown to WhatsApp, plain text and Telegram markup
//!
//! # Example Usage
//!
//! ```rust
//! use chatmark_core::transcode::{to_telegram, to_whatsapp};
//!
//! assert_eq!(to_whatsapp("**bold** and *italic*"), "*bold* and _italic_");
//! assert_eq!(to_telegram("# Title"), "**Title**");
//! ```

pub mod transcode;
