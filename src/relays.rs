use nostr_sdk::nostr::Event;

use crate::nostr::EventExt;

/// Relays used when a user has not published their own list.
pub const DEFAULT_RELAYS: &[&str] = &[
    "wss://relay.damus.io",
    "wss://nos.lol",
    "wss://relay.snort.social",
    "wss://nostr-pub.wellorder.net",
    "wss://offchain.pub",
];

/// Which entries of a NIP-65 relay list to keep.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RelayFilter {
    All,
    /// Marked `read` or unmarked.
    Readable,
    /// Marked `write` or unmarked.
    Writable,
}

impl RelayFilter {
    fn accepts(&self, marker: Option<&str>) -> bool {
        match self {
            RelayFilter::All => true,
            RelayFilter::Readable => matches!(marker, None | Some("read")),
            RelayFilter::Writable => matches!(marker, None | Some("write")),
        }
    }
}

/// Relay URLs (`r` tags) of a relay-list event that pass `filter`.
pub fn relay_urls(relay_list: &Event, filter: RelayFilter) -> Vec<String> {
    relay_list
        .matching_tags("r")
        .into_iter()
        .filter(|t| filter.accepts(t.get(2).map(String::as_str)))
        .filter_map(|t| t.get(1).cloned())
        .collect()
}

/// Relays to announce in a zap request: the recipient's own relays first,
/// then `defaults`.
pub fn zap_relays(user_relays: Option<Vec<String>>, defaults: &[String]) -> Vec<String> {
    let mut relays = user_relays.unwrap_or_default();
    relays.extend(defaults.iter().cloned());
    relays
}
