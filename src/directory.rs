use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use nostr_sdk::prelude::*;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::nostr::{EventExt, Persona};
use crate::relays::{relay_urls, RelayFilter};

/// NIP-65 relay list metadata.
pub const RELAY_LIST: u64 = 10_002;

/// Source of other users' published data, usually a relay pool.
pub trait Directory {
    /// Latest profile of `pubkey`, if any was published.
    fn profile(&self, pubkey: XOnlyPublicKey)
        -> impl Future<Output = Result<Option<Persona>>> + Send;

    /// Relay-list events (NIP-65) published by `pubkey`, newest first.
    fn relay_lists(&self, pubkey: XOnlyPublicKey)
        -> impl Future<Output = Result<Vec<Event>>> + Send;
}

/// Relay URLs of the newest relay list of `pubkey` passing `filter`.
/// `None` when the user has not published any list.
pub async fn user_relay_urls<D: Directory>(
    directory: &D,
    pubkey: XOnlyPublicKey,
    filter: RelayFilter,
) -> Result<Option<Vec<String>>> {
    let lists = directory.relay_lists(pubkey).await?;
    Ok(lists.first().map(|list| relay_urls(list, filter)))
}

/// Keeps only the newest event per [`EventExt::tag_id`], newest first.
pub fn dedupe_newest(events: Vec<Event>) -> Vec<Event> {
    let mut newest: HashMap<String, Event> = HashMap::new();

    for event in events {
        let key = event.tag_id();
        match newest.get(&key) {
            Some(existing) if existing.created_at >= event.created_at => {}
            _ => {
                newest.insert(key, event);
            }
        }
    }

    let mut events: Vec<Event> = newest.into_values().collect();
    events.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    events
}

/// [`Directory`] backed by a connected Nostr client.
#[derive(Clone)]
pub struct NostrDirectory(Arc<NostrDirectoryInner>);

struct NostrDirectoryInner {
    client: Client,
    timeout: Duration,
}

impl NostrDirectory {
    pub fn new(client: Client, timeout: Duration) -> NostrDirectory {
        NostrDirectory(Arc::new(NostrDirectoryInner { client, timeout }))
    }

    pub fn client(&self) -> &Client {
        &self.0.client
    }

    /// Fetches events matching `filter` until relays signal end of stored
    /// events, keeping the newest version of each.
    pub async fn fetch_events(&self, filter: Filter) -> Result<Vec<Event>> {
        let events = self
            .0
            .client
            .get_events_of(vec![filter], Some(self.0.timeout))
            .await
            .map_err(|e| Error::Relay(e.to_string()))?;

        debug!("Received {} events", events.len());

        Ok(dedupe_newest(events))
    }
}

impl Directory for NostrDirectory {
    async fn profile(&self, pubkey: XOnlyPublicKey) -> Result<Option<Persona>> {
        info!("Requesting metadata {}.", pubkey);

        let events = self
            .fetch_events(
                Filter::new()
                    .kind(Kind::Metadata)
                    .author(pubkey.to_string())
                    .limit(1),
            )
            .await?;

        Ok(events
            .first()
            .and_then(|e| e.as_metadata())
            .map(|m| Persona::from_metadata(pubkey, m)))
    }

    async fn relay_lists(&self, pubkey: XOnlyPublicKey) -> Result<Vec<Event>> {
        info!("Requesting relay list {}.", pubkey);

        self.fetch_events(
            Filter::new()
                .kind(Kind::from(RELAY_LIST))
                .author(pubkey.to_string()),
        )
        .await
    }
}
