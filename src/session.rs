use std::fmt::Debug;
use std::sync::Arc;

use nostr_sdk::prelude::{Event, XOnlyPublicKey};
use nostr_sdk::Client;
use tracing::info;

use crate::config::Config;
use crate::directory::{Directory, NostrDirectory};
use crate::error::Result;
use crate::identity::Identity;
use crate::nostr::Persona;
use crate::zap::{ZapRequest, Zapper};

/// Stemstr session: the user's identity and a connected relay pool. Cheap
/// to clone.
#[derive(Clone)]
pub struct Session(Arc<SessionInner>);

impl Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Session").field(&self.0.identity.name).finish()
    }
}

struct SessionInner {
    config: Config,
    identity: Identity,
    directory: NostrDirectory,
    zapper: Zapper<NostrDirectory, Identity>,
}

impl Session {
    pub(crate) fn new(config: Config, identity: Identity, client: Client) -> Result<Session> {
        let http = reqwest::Client::builder()
            .timeout(config.http_timeout())
            .build()?;
        let directory = NostrDirectory::new(client, config.relay_timeout());
        let zapper = Zapper::new(
            http,
            directory.clone(),
            identity.clone(),
            config.default_relays.clone(),
        );

        Ok(Session(Arc::new(SessionInner {
            config,
            identity,
            directory,
            zapper,
        })))
    }

    pub fn config(&self) -> &Config {
        &self.0.config
    }

    pub fn identity(&self) -> &Identity {
        &self.0.identity
    }

    pub fn directory(&self) -> &NostrDirectory {
        &self.0.directory
    }

    pub fn client(&self) -> &Client {
        self.0.directory.client()
    }

    /// Profile of `pubkey`, or an empty one if none was published.
    pub async fn persona(&self, pubkey: XOnlyPublicKey) -> Result<Persona> {
        Ok(self
            .0
            .directory
            .profile(pubkey)
            .await?
            .unwrap_or_else(|| Persona::new(pubkey)))
    }

    /// Zaps `amount` sats to `pubkey` and returns the invoice to pay.
    pub async fn zap(
        &self,
        pubkey: XOnlyPublicKey,
        amount: u64,
        comment: Option<String>,
        anonymous: bool,
    ) -> Result<String> {
        self.send_zap(pubkey, None, amount, comment, anonymous).await
    }

    /// Zaps `amount` sats to the author of `event` for that event and
    /// returns the invoice to pay.
    pub async fn zap_event(
        &self,
        event: &Event,
        amount: u64,
        comment: Option<String>,
        anonymous: bool,
    ) -> Result<String> {
        self.send_zap(event.pubkey, Some(event), amount, comment, anonymous)
            .await
    }

    async fn send_zap(
        &self,
        pubkey: XOnlyPublicKey,
        event: Option<&Event>,
        amount: u64,
        comment: Option<String>,
        anonymous: bool,
    ) -> Result<String> {
        let persona = self.persona(pubkey).await?;

        let mut request = ZapRequest::new(&persona, amount).anonymous(anonymous);
        if let Some(comment) = comment {
            request = request.comment(comment);
        }
        if let Some(event) = event {
            request = request.event(event);
        }

        info!("Zapping {} sats to {}", amount, persona.normalized_name());

        self.0.zapper.create_zap_request(&request).await
    }
}
