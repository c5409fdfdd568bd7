use nostr_sdk::Client;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::identity::Identity;
use crate::session::Session;

/// Installs global tracing subscriber with `filter` directives. Does nothing
/// if one is already installed.
pub fn init_tracing(filter: &str) {
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .compact()
        .with_file(true)
        .with_line_number(true)
        .with_ansi(true)
        .with_env_filter(EnvFilter::new(filter))
        .finish();

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        debug!("Tracing subscriber already installed");
    }
}

/// Initializes logging, connects to the configured relays as `identity`
/// and returns it all inside [`Session`].
///
/// Connecting gives up waiting after the configured relay timeout; relays
/// still connecting keep trying in the background. Requires Tokio.
pub async fn make_session(config: Config, identity: Identity) -> Result<Session> {
    init_tracing(&config.log_filter);

    let client = Client::new(&identity.nostr_key()?);

    client
        .add_relays(
            config
                .default_relays
                .iter()
                .map(|r| (r.as_str(), None))
                .collect(),
        )
        .await
        .map_err(|e| Error::Relay(e.to_string()))?;

    if tokio::time::timeout(config.relay_timeout(), client.connect())
        .await
        .is_err()
    {
        warn!(
            "Relays did not connect within {:?}, continuing",
            config.relay_timeout()
        );
    }

    info!(
        "Connected to {} relays as {}",
        config.default_relays.len(),
        identity.npub()?
    );

    Session::new(config, identity, client)
}
