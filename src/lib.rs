//! Protocol core of the Stemstr Nostr client: where a note sits in its
//! thread (NIP-10) and how to obtain an invoice for zapping it (NIP-57).

pub mod app;
pub mod config;
pub mod directory;
pub mod error;
pub mod identity;
pub mod nostr;
pub mod pass;
pub mod relays;
pub mod session;
pub mod time;
pub mod zap;

use nostr_sdk::nostr::Event;

pub use crate::error::{Error, Result};
pub use crate::nostr::thread::{TagReference, ThreadMarker, ThreadPosition};
pub use crate::session::Session;
pub use crate::zap::endpoint::{lnurl_service_endpoint, resolve_zap_endpoint};
pub use crate::zap::{ZapRequest, Zapper};

/// Finds root, reply and mentions of `event`.
pub fn parse_thread_position(event: &Event) -> ThreadPosition {
    crate::nostr::EventExt::thread_position(event)
}
