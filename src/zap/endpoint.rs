//! Finding where to send zap requests: Lightning address (LUD-16) or bech32
//! LNURL (LUD-06), taken from a zapped event's `zap` tag or from the
//! recipient's profile.

use bech32::FromBase32;
use nostr_sdk::nostr::Event;
use reqwest::{Client, Url};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::nostr::{EventExt, Persona};

/// A Lightning payment identifier as published by its owner.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ZapAddress {
    /// `name@domain`
    Lud16(String),
    /// bech32-encoded LNURL
    Lud06(String),
}

impl ZapAddress {
    /// LNURL-pay service URL of this address. `None` if the address is
    /// malformed.
    pub fn service_url(&self) -> Option<Url> {
        match self {
            ZapAddress::Lud16(address) => {
                let (name, domain) = address.split_once('@')?;
                if name.is_empty() || domain.is_empty() {
                    return None;
                }
                Url::parse(&format!("https://{domain}/.well-known/lnurlp/{name}")).ok()
            }
            ZapAddress::Lud06(lnurl) => decode_lnurl(lnurl),
        }
    }

    fn is_empty(&self) -> bool {
        match self {
            ZapAddress::Lud16(s) | ZapAddress::Lud06(s) => s.is_empty(),
        }
    }
}

/// Decodes bech32 LNURL into the URL it wraps.
pub fn decode_lnurl(lnurl: &str) -> Option<Url> {
    let (_, words, _) = bech32::decode(lnurl)
        .map_err(|e| warn!("Invalid LNURL {lnurl}: {e}"))
        .ok()?;
    let bytes = Vec::<u8>::from_base32(&words).ok()?;
    let url = String::from_utf8(bytes).ok()?;
    Url::parse(&url).ok()
}

/// Address named by the `zap` tag of `event`. Fails when the tag uses an
/// encoding other than `lud06` or `lud16`. A tag with empty address names
/// nothing.
fn from_zap_tag(_: Option<&Persona>, event: Option<&Event>) -> Result<Vec<ZapAddress>> {
    let Some(tag) = event.and_then(|e| e.matching_tags("zap").into_iter().next()) else {
        return Ok(vec![]);
    };

    let address = tag.get(1).cloned().unwrap_or_default();
    let address = match tag.get(2).map(String::as_str) {
        Some("lud06") => ZapAddress::Lud06(address),
        Some("lud16") => ZapAddress::Lud16(address),
        other => {
            return Err(Error::UnsupportedZapTagEncoding(
                other.unwrap_or_default().to_string(),
            ))
        }
    };

    if address.is_empty() {
        Ok(vec![])
    } else {
        Ok(vec![address])
    }
}

/// Addresses from profile, Lightning address first.
fn from_profile(profile: Option<&Persona>, _: Option<&Event>) -> Result<Vec<ZapAddress>> {
    let Some(profile) = profile else {
        return Ok(vec![]);
    };

    Ok(profile
        .lud16
        .iter()
        .map(|a| ZapAddress::Lud16(a.clone()))
        .chain(profile.lud06.iter().map(|a| ZapAddress::Lud06(a.clone())))
        .filter(|a| !a.is_empty())
        .collect())
}

/// Address sources, in order of preference. The first one yielding a
/// usable address is used exclusively.
type Strategy = fn(Option<&Persona>, Option<&Event>) -> Result<Vec<ZapAddress>>;

const STRATEGIES: &[Strategy] = &[from_zap_tag, from_profile];

/// Candidate addresses of the recipient, preferred first.
pub fn zap_addresses(profile: Option<&Persona>, event: Option<&Event>) -> Result<Vec<ZapAddress>> {
    for strategy in STRATEGIES {
        let addresses = strategy(profile, event)?;
        if addresses.iter().any(|a| a.service_url().is_some()) {
            return Ok(addresses);
        }
    }
    Ok(vec![])
}

/// LNURL-pay service URL of the recipient, without contacting it. Useful to
/// decide whether zapping should be offered at all.
pub fn lnurl_service_endpoint(profile: Option<&Persona>, event: Option<&Event>) -> Result<Url> {
    zap_addresses(profile, event)?
        .iter()
        .find_map(ZapAddress::service_url)
        .ok_or(Error::NoZapEndpoint)
}

/// Response of LNURL-pay service (LUD-06) with NIP-57 extensions.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PayService {
    callback: Option<String>,
    #[serde(default)]
    allows_nostr: bool,
    nostr_pubkey: Option<String>,
    #[serde(rename = "nostrPubKey")]
    nostr_pub_key: Option<String>,
}

/// Asks the LNURL-pay service at `url` whether it accepts zaps, returning
/// its callback if it does.
pub async fn probe_service(http: &Client, url: Url) -> Result<Url> {
    info!("Probing zap endpoint {}", url);

    let service: PayService = http
        .get(url.clone())
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    debug!("Zap endpoint {} answered {:?}", url, service);

    let has_key = service.nostr_pubkey.is_some() || service.nostr_pub_key.is_some();
    match service.callback {
        Some(callback) if service.allows_nostr && has_key => {
            Url::parse(&callback).map_err(|_| Error::NoZapEndpoint)
        }
        _ => Err(Error::NoZapEndpoint),
    }
}

/// Resolves the callback to which zap requests for the recipient are sent.
pub async fn resolve_zap_endpoint(
    http: &Client,
    profile: Option<&Persona>,
    event: Option<&Event>,
) -> Result<Url> {
    let url = lnurl_service_endpoint(profile, event)?;
    probe_service(http, url).await
}
