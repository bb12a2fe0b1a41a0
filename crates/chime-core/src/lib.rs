//! # Chime Core
//!
//! The core types of the Chime bot framework.
//!
//! This crate holds everything the dispatch core and the platform layer need
//! to agree on, and nothing else:
//!
//! - **Event model**: the [`InboundEvent`] sum type and the [`RawDelivery`]
//!   it is decoded from
//! - **Acknowledgment payloads**: [`AckResponse`] and [`Visibility`]
//! - **Platform client contract**: the [`PlatformClient`] trait and the
//!   [`ApiCallResult`] every call produces
//! - **Errors**: [`DecodeError`] and [`AckError`]
//!
//! ```text
//! ┌──────────────┐  RawDelivery  ┌────────────┐  InboundEvent  ┌─────────┐
//! │  Transport   │──────────────▶│ Dispatcher │───────────────▶│ Handler │──▶ PlatformClient
//! └──────────────┘               └────────────┘                └─────────┘
//! ```

pub mod ack;
pub mod client;
pub mod error;
pub mod event;

pub use ack::{AckResponse, Visibility};
pub use client::{ApiCallResult, BoxedClient, PlatformClient};
pub use error::{AckError, DecodeError};
pub use event::{EventKind, InboundEvent, MentionEvent, MessageEvent, RawDelivery, SlashCommand};
