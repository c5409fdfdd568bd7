//! Zap requests (NIP-57): a signed kind 9734 event sent to the recipient's
//! LNURL-pay callback in exchange for a Lightning invoice.

pub mod amount;
pub mod endpoint;

use futures_util::future::try_join;
use nostr_sdk::nostr::prelude::*;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};

use crate::directory::{user_relay_urls, Directory};
use crate::error::{Error, Result};
use crate::identity::Signer;
use crate::nostr::{EventExt, Persona};
use crate::relays::{zap_relays, RelayFilter};

use self::amount::sats_to_msats;
use self::endpoint::resolve_zap_endpoint;

/// Kind of zap request events.
pub const ZAP_REQUEST: u64 = 9734;

/// What to zap, how much and how.
#[derive(Clone, Debug)]
pub struct ZapRequest<'a> {
    recipient: &'a Persona,
    amount: u64,
    comment: Option<String>,
    event: Option<&'a Event>,
    extra_tags: Vec<Vec<String>>,
    anonymous: bool,
}

impl<'a> ZapRequest<'a> {
    /// Zap of `amount` sats to `recipient`.
    pub fn new(recipient: &'a Persona, amount: u64) -> ZapRequest<'a> {
        ZapRequest {
            recipient,
            amount,
            comment: None,
            event: None,
            extra_tags: vec![],
            anonymous: false,
        }
    }

    pub fn comment<S: Into<String>>(mut self, comment: S) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Attaches the zap to an event of the recipient.
    pub fn event(mut self, event: &'a Event) -> Self {
        self.event = Some(event);
        self
    }

    /// Tags appended verbatim after the standard ones.
    pub fn extra_tags(mut self, tags: Vec<Vec<String>>) -> Self {
        self.extra_tags = tags;
        self
    }

    /// Sign with a throwaway key so that the sender stays unknown.
    pub fn anonymous(mut self, anonymous: bool) -> Self {
        self.anonymous = anonymous;
        self
    }

    pub fn recipient(&self) -> &Persona {
        self.recipient
    }

    pub fn zapped_event(&self) -> Option<&Event> {
        self.event
    }

    pub fn is_anonymous(&self) -> bool {
        self.anonymous
    }

    pub fn msats(&self) -> u64 {
        sats_to_msats(self.amount)
    }

    /// Tags of the request event announcing `relays`.
    pub fn tags(&self, relays: &[String]) -> Vec<Vec<String>> {
        let mut relays_tag = vec!["relays".to_string()];
        relays_tag.extend(relays.iter().cloned());

        let mut tags = vec![
            vec!["p".to_string(), self.recipient.pubkey.to_string()],
            vec!["amount".to_string(), self.msats().to_string()],
            relays_tag,
        ];

        if let Some(event) = self.event {
            tags.push(event.tag_reference());
        }

        tags.extend(self.extra_tags.iter().cloned());
        tags
    }

    /// Unsigned request event.
    pub fn to_event_builder(&self, relays: &[String]) -> EventBuilder {
        let tags: Vec<Tag> = self
            .tags(relays)
            .into_iter()
            .filter_map(|mut t| {
                if t.is_empty() {
                    return None;
                }
                let name = t.remove(0);
                Some(Tag::Generic(TagKind::Custom(name), t))
            })
            .collect();

        EventBuilder::new(
            Kind::from(ZAP_REQUEST),
            self.comment.clone().unwrap_or_default(),
            &tags,
        )
    }
}

/// Answer of LNURL-pay callback.
#[derive(Debug, Deserialize)]
struct Invoice {
    pr: Option<String>,
    reason: Option<String>,
}

/// Obtains invoices for zaps.
pub struct Zapper<D, S> {
    http: Client,
    directory: D,
    signer: S,
    default_relays: Vec<String>,
}

impl<D, S> Zapper<D, S>
where
    D: Directory,
    S: Signer,
{
    pub fn new(http: Client, directory: D, signer: S, default_relays: Vec<String>) -> Self {
        Zapper {
            http,
            directory,
            signer,
            default_relays,
        }
    }

    /// Signs request announcing `relays`, with a fresh key if the request
    /// is anonymous.
    pub fn signed_request(&self, request: &ZapRequest<'_>, relays: &[String]) -> Result<Event> {
        let builder = request.to_event_builder(relays);

        if request.anonymous {
            Signer::sign(&Keys::generate(), builder)
        } else {
            self.signer.sign(builder)
        }
    }

    /// Builds and signs zap request, sends it to the recipient's zap
    /// endpoint and returns the BOLT11 invoice to pay.
    pub async fn create_zap_request(&self, request: &ZapRequest<'_>) -> Result<String> {
        let recipient = request.recipient;

        let (callback, user_relays) = try_join(
            resolve_zap_endpoint(&self.http, Some(recipient), request.event),
            user_relay_urls(&self.directory, recipient.pubkey, RelayFilter::Writable),
        )
        .await?;

        let relays = zap_relays(user_relays, &self.default_relays);
        let zap_request = self.signed_request(request, &relays)?;
        let msats = request.msats();

        debug!("Signed zap request {}", zap_request.id);
        info!("Requesting invoice of {} msats from {}", msats, callback);

        let invoice: Invoice = self
            .http
            .get(callback)
            .query(&[
                ("amount", msats.to_string()),
                ("nostr", serde_json::to_string(&zap_request)?),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        invoice.pr.ok_or(Error::MissingInvoice(invoice.reason))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use bech32::{ToBase32, Variant};
    use mockito::{Matcher, Server, ServerGuard};
    use reqwest::Url;

    use super::*;

    const SERVER_PUBKEY: &str = "9630f464cca6a5147aa8a35f0bcdd3ce485324e732fd39e09233b1d848238f31";
    const INVOICE: &str = "lnbc210n1pjtest";

    struct Relays(Vec<Event>);

    impl Directory for Relays {
        async fn profile(&self, _pubkey: XOnlyPublicKey) -> Result<Option<Persona>> {
            Ok(None)
        }

        async fn relay_lists(&self, _pubkey: XOnlyPublicKey) -> Result<Vec<Event>> {
            Ok(self.0.clone())
        }
    }

    struct Refusing;

    impl Signer for Refusing {
        fn sign(&self, _builder: EventBuilder) -> Result<Event> {
            Err(Error::Signing("user rejected".to_string()))
        }
    }

    fn relay_list(keys: &Keys, relays: &[(&str, Option<&str>)]) -> Event {
        let tags: Vec<Tag> = relays
            .iter()
            .map(|(url, marker)| {
                let mut rest = vec![url.to_string()];
                rest.extend(marker.map(str::to_string));
                Tag::Generic(TagKind::Custom("r".to_string()), rest)
            })
            .collect();
        EventBuilder::new(Kind::from(10_002), "", &tags)
            .to_event(keys)
            .unwrap()
    }

    fn recipient(server: &ServerGuard, keys: &Keys) -> Persona {
        let url = format!("{}/lnurlp/alice", server.url());
        let mut persona = Persona::new(keys.public_key());
        persona.lud06 =
            Some(bech32::encode("lnurl", url.as_bytes().to_base32(), Variant::Bech32).unwrap());
        persona
    }

    async fn pay_service(server: &mut ServerGuard) -> mockito::Mock {
        let callback = format!("{}/callback", server.url());
        server
            .mock("GET", "/lnurlp/alice")
            .with_status(200)
            .with_body(
                serde_json::json!({
                    "callback": callback,
                    "allowsNostr": true,
                    "nostrPubkey": SERVER_PUBKEY,
                    "tag": "payRequest"
                })
                .to_string(),
            )
            .create_async()
            .await
    }

    fn defaults() -> Vec<String> {
        vec!["wss://default.example".to_string()]
    }

    #[test]
    fn request_event() {
        let recipient_keys = Keys::generate();
        let persona = Persona::new(recipient_keys.public_key());
        let zapped = EventBuilder::new_text_note("a beat", &[])
            .to_event(&recipient_keys)
            .unwrap();

        let request = ZapRequest::new(&persona, 21)
            .comment("nice")
            .event(&zapped)
            .extra_tags(vec![vec!["client".to_string(), "stemstr".to_string()]]);

        let sender = Keys::generate();
        let zapper = Zapper::new(Client::new(), Relays(vec![]), sender.clone(), defaults());
        let relays = vec!["wss://mine.example".to_string(), "wss://default.example".to_string()];
        let event = zapper.signed_request(&request, &relays).unwrap();

        assert_eq!(event.kind, Kind::from(ZAP_REQUEST));
        assert_eq!(event.content, "nice");
        assert_eq!(event.pubkey, sender.public_key());
        assert!(event.verify().is_ok());
        assert_eq!(
            event.raw_tags(),
            vec![
                vec!["p".to_string(), recipient_keys.public_key().to_string()],
                vec!["amount".to_string(), "21000".to_string()],
                vec![
                    "relays".to_string(),
                    "wss://mine.example".to_string(),
                    "wss://default.example".to_string()
                ],
                vec!["e".to_string(), zapped.id.to_hex()],
                vec!["client".to_string(), "stemstr".to_string()],
            ]
        );
    }

    #[test]
    fn anonymous_request_uses_throwaway_key() {
        let persona = Persona::new(Keys::generate().public_key());
        let sender = Keys::generate();
        let zapper = Zapper::new(Client::new(), Relays(vec![]), sender.clone(), defaults());

        let event = zapper
            .signed_request(&ZapRequest::new(&persona, 5).anonymous(true), &defaults())
            .unwrap();

        assert_ne!(event.pubkey, sender.public_key());
        assert!(event.verify().is_ok());
        assert_eq!(event.content, "");
    }

    #[tokio::test]
    async fn obtains_invoice() {
        let mut server = Server::new_async().await;
        let recipient_keys = Keys::generate();
        let persona = recipient(&server, &recipient_keys);

        let received = Arc::new(Mutex::new(None));
        let seen = received.clone();

        let service = pay_service(&mut server).await;
        let callback = server
            .mock("GET", "/callback")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("amount".into(), "21000".into()),
                Matcher::Regex("nostr=".into()),
            ]))
            .with_status(200)
            .with_body_from_request(move |req| {
                *seen.lock().unwrap() = Some(req.path_and_query().to_string());
                serde_json::json!({ "pr": INVOICE, "routes": [] })
                    .to_string()
                    .into_bytes()
            })
            .create_async()
            .await;

        let directory = Relays(vec![relay_list(
            &recipient_keys,
            &[("wss://write.example", Some("write")), ("wss://read.example", Some("read"))],
        )]);
        let sender = Keys::generate();
        let zapper = Zapper::new(Client::new(), directory, sender.clone(), defaults());

        let invoice = zapper
            .create_zap_request(&ZapRequest::new(&persona, 21).comment("🎵"))
            .await
            .unwrap();

        assert_eq!(invoice, INVOICE);
        service.assert_async().await;
        callback.assert_async().await;

        let path_and_query = received.lock().unwrap().clone().unwrap();
        let url = Url::parse(&format!("http://localhost{path_and_query}")).unwrap();
        let nostr = url
            .query_pairs()
            .find(|(k, _)| k == "nostr")
            .map(|(_, v)| v.into_owned())
            .unwrap();
        let zap_request: Event = serde_json::from_str(&nostr).unwrap();

        assert_eq!(zap_request.kind, Kind::from(ZAP_REQUEST));
        assert_eq!(zap_request.pubkey, sender.public_key());
        assert_eq!(zap_request.content, "🎵");
        assert!(zap_request.verify().is_ok());

        let tags = zap_request.raw_tags();
        assert_eq!(
            tags[0],
            vec!["p".to_string(), recipient_keys.public_key().to_string()]
        );
        assert_eq!(tags[1], vec!["amount".to_string(), "21000".to_string()]);
        assert_eq!(
            tags[2],
            vec![
                "relays".to_string(),
                "wss://write.example".to_string(),
                "wss://default.example".to_string()
            ]
        );
    }

    #[tokio::test]
    async fn callback_without_invoice() {
        let mut server = Server::new_async().await;
        let recipient_keys = Keys::generate();
        let persona = recipient(&server, &recipient_keys);

        let _service = pay_service(&mut server).await;
        let _callback = server
            .mock("GET", "/callback")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"status": "ERROR", "reason": "amount too low"}"#)
            .create_async()
            .await;

        let zapper = Zapper::new(Client::new(), Relays(vec![]), Keys::generate(), defaults());
        let result = zapper.create_zap_request(&ZapRequest::new(&persona, 1)).await;

        assert!(matches!(
            result,
            Err(Error::MissingInvoice(Some(reason))) if reason == "amount too low"
        ));
    }

    #[tokio::test]
    async fn signing_failure_stops_request() {
        let mut server = Server::new_async().await;
        let persona = recipient(&server, &Keys::generate());

        let _service = pay_service(&mut server).await;
        let callback = server
            .mock("GET", "/callback")
            .match_query(Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let zapper = Zapper::new(Client::new(), Relays(vec![]), Refusing, defaults());
        let result = zapper.create_zap_request(&ZapRequest::new(&persona, 21)).await;

        assert!(matches!(result, Err(Error::Signing(_))));
        callback.assert_async().await;
    }

    #[tokio::test]
    async fn no_endpoint() {
        let persona = Persona::new(Keys::generate().public_key());
        let zapper = Zapper::new(Client::new(), Relays(vec![]), Keys::generate(), defaults());

        assert!(matches!(
            zapper.create_zap_request(&ZapRequest::new(&persona, 21)).await,
            Err(Error::NoZapEndpoint)
        ));
    }
}
