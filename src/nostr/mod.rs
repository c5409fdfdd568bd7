pub mod keys;
pub mod thread;

use nostr_sdk::nostr::prelude::*;
use nostr_sdk::nostr::{Event, Tag};

use self::thread::ThreadPosition;

/// Public profile of a user, as published in their metadata event.
#[derive(Clone, Debug, PartialEq)]
pub struct Persona {
    pub pubkey: XOnlyPublicKey,
    pub name: Option<String>,
    pub display_name: Option<String>,
    pub image: Option<String>,
    pub about: Option<String>,
    pub nip05: Option<String>,
    pub lud06: Option<String>,
    pub lud16: Option<String>,
}

impl Persona {
    pub fn new(pubkey: XOnlyPublicKey) -> Persona {
        Persona {
            pubkey,
            name: None,
            display_name: None,
            image: None,
            about: None,
            nip05: None,
            lud06: None,
            lud16: None,
        }
    }

    pub fn from_metadata(pubkey: XOnlyPublicKey, metadata: Metadata) -> Persona {
        Persona {
            pubkey,
            name: metadata.name,
            display_name: metadata.display_name,
            image: metadata.picture,
            about: metadata.about,
            nip05: metadata.nip05,
            lud06: metadata.lud06,
            lud16: metadata.lud16,
        }
    }

    /// Name to show for this person.
    pub fn normalized_name(&self) -> String {
        normalized_name(&self.pubkey.to_string(), Some(self))
    }

    pub fn format_nip05(&self) -> Option<String> {
        self.nip05
            .as_ref()
            .map(|n| n.strip_prefix("_@").unwrap_or(n).to_string())
    }
}

/// Display name if there is one, then name, then a prefix of the public key.
pub fn normalized_name(pubkey: &str, persona: Option<&Persona>) -> String {
    persona
        .and_then(|p| p.display_name.clone().or_else(|| p.name.clone()))
        .unwrap_or_else(|| format!("{}...", pubkey.chars().take(5).collect::<String>()))
}

/// Kinds 30000 to 39999 are addressed by `kind:pubkey:d` rather than by ID.
fn is_parameterized_replaceable(kind: Kind) -> bool {
    (30_000..40_000).contains(&kind.as_u64())
}

/// Kinds whose newer versions replace older ones (NIP-01, NIP-16).
fn is_replaceable(kind: Kind) -> bool {
    let k = kind.as_u64();
    k == 0 || k == 3 || (10_000..20_000).contains(&k)
}

pub trait EventExt {
    /// All tags in their raw string form.
    fn raw_tags(&self) -> Vec<Vec<String>>;

    /// Raw tags whose name is `name`, in order.
    fn matching_tags(&self, name: &str) -> Vec<Vec<String>>;

    /// Finds root, reply and mentions of this event according to NIP-10.
    fn thread_position(&self) -> ThreadPosition;

    /// Tag by which other events refer to this one: `a` tag for
    /// parameterized replaceable events, `e` tag otherwise.
    fn tag_reference(&self) -> Vec<String>;

    /// Identity of this event for deduplication. Replaceable events share it
    /// across versions.
    fn tag_id(&self) -> String;

    /// Hashtags (`t` tags) of this event.
    fn hashtags(&self) -> Vec<String>;

    /// If this event is metadata, tries to parse it.
    fn as_metadata(&self) -> Option<Metadata>;
}

impl EventExt for Event {
    fn raw_tags(&self) -> Vec<Vec<String>> {
        self.tags.iter().map(Tag::as_vec).collect()
    }

    fn matching_tags(&self, name: &str) -> Vec<Vec<String>> {
        self.tags
            .iter()
            .map(Tag::as_vec)
            .filter(|t| t.first().map(String::as_str) == Some(name))
            .collect()
    }

    fn thread_position(&self) -> ThreadPosition {
        ThreadPosition::from_tags(&self.raw_tags())
    }

    fn tag_reference(&self) -> Vec<String> {
        if is_parameterized_replaceable(self.kind) {
            vec!["a".to_string(), self.tag_id()]
        } else {
            vec!["e".to_string(), self.id.to_hex()]
        }
    }

    fn tag_id(&self) -> String {
        if is_parameterized_replaceable(self.kind) {
            let d = self
                .matching_tags("d")
                .into_iter()
                .find_map(|t| t.get(1).cloned())
                .unwrap_or_default();
            format!("{}:{}:{}", self.kind.as_u64(), self.pubkey, d)
        } else if is_replaceable(self.kind) {
            format!("{}:{}", self.kind.as_u64(), self.pubkey)
        } else {
            self.id.to_hex()
        }
    }

    fn hashtags(&self) -> Vec<String> {
        self.matching_tags("t")
            .into_iter()
            .filter_map(|t| t.get(1).cloned())
            .collect()
    }

    fn as_metadata(&self) -> Option<Metadata> {
        Metadata::from_json(&self.content).ok()
    }
}

#[cfg(test)]
mod tests {
    use nostr_sdk::nostr::prelude::*;

    use super::*;

    fn generic(name: &str, rest: &[&str]) -> Tag {
        Tag::Generic(
            TagKind::Custom(name.to_string()),
            rest.iter().map(|s| s.to_string()).collect(),
        )
    }

    #[test]
    fn thread_position_of_signed_event() {
        let keys = Keys::generate();
        let root = EventBuilder::new_text_note("root", &[]).to_event(&keys).unwrap();
        let parent = EventBuilder::new_text_note("parent", &[]).to_event(&keys).unwrap();

        let reply = EventBuilder::new_text_note(
            "reply",
            &[
                Tag::Event(root.id, None, Some(Marker::Root)),
                Tag::Event(parent.id, None, Some(Marker::Reply)),
            ],
        )
        .to_event(&keys)
        .unwrap();

        let position = reply.thread_position();
        assert_eq!(position.root_id(), Some(root.id.to_hex().as_str()));
        assert_eq!(position.reply_id(), Some(parent.id.to_hex().as_str()));
        assert!(position.mentions.is_empty());
    }

    #[test]
    fn reference_and_hashtags() {
        let keys = Keys::generate();
        let note = EventBuilder::new_text_note(
            "beat #music",
            &[generic("t", &["music"]), generic("t", &["house"])],
        )
        .to_event(&keys)
        .unwrap();

        assert_eq!(note.tag_reference(), vec!["e".to_string(), note.id.to_hex()]);
        assert_eq!(note.hashtags(), vec!["music", "house"]);

        let article = EventBuilder::new(Kind::from(30023), "long form", &[generic("d", &["intro"])])
            .to_event(&keys)
            .unwrap();

        assert_eq!(
            article.tag_reference(),
            vec![
                "a".to_string(),
                format!("30023:{}:intro", keys.public_key())
            ]
        );
    }

    #[test]
    fn names() {
        let keys = Keys::generate();
        let pubkey = keys.public_key();
        let mut persona = Persona::new(pubkey);

        assert_eq!(
            persona.normalized_name(),
            format!("{}...", &pubkey.to_string()[..5])
        );

        persona.name = Some("alice".to_string());
        assert_eq!(persona.normalized_name(), "alice");

        persona.display_name = Some("Alice".to_string());
        assert_eq!(persona.normalized_name(), "Alice");

        persona.nip05 = Some("_@alice.example".to_string());
        assert_eq!(persona.format_nip05().as_deref(), Some("alice.example"));
    }
}
