//! Thread position of an event according to NIP-10.
//!
//! Two tag encodings exist in the wild. Older clients put `e` tags in a fixed
//! order (root first, reply last, mentions between) without markers, newer
//! ones mark each tag with `root`, `reply` or `mention`. Both are accepted and
//! normalised to marked 4-element tags.

use std::fmt;

use serde::Serialize;

/// Role of an `e` tag within a thread.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ThreadMarker {
    Root,
    Reply,
    Mention,
}

impl ThreadMarker {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThreadMarker::Root => "root",
            ThreadMarker::Reply => "reply",
            ThreadMarker::Mention => "mention",
        }
    }

    fn parse(s: &str) -> Option<ThreadMarker> {
        match s {
            "root" => Some(ThreadMarker::Root),
            "reply" => Some(ThreadMarker::Reply),
            "mention" => Some(ThreadMarker::Mention),
            _ => None,
        }
    }
}

impl fmt::Display for ThreadMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An `e` tag in its raw form: `["e", <event id>, <relay hint>, <marker>]`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TagReference(Vec<String>);

impl TagReference {
    pub fn new(tag: Vec<String>) -> TagReference {
        TagReference(tag)
    }

    /// Referenced event ID, empty if the tag has none.
    pub fn event_id(&self) -> &str {
        self.0.get(1).map(String::as_str).unwrap_or_default()
    }

    pub fn relay_hint(&self) -> Option<&str> {
        self.0.get(2).map(String::as_str)
    }

    pub fn marker(&self) -> Option<&str> {
        self.0.get(3).map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<String> {
        self.0
    }

    /// Copy of this tag with a relay hint (empty when missing) and with
    /// the marker set to `marker`.
    fn normalized(&self, marker: ThreadMarker) -> TagReference {
        let mut tag = self.0.clone();
        if tag.len() < 4 {
            tag.resize(4, String::new());
        }
        tag[3] = marker.as_str().to_string();
        TagReference(tag)
    }
}

impl From<TagReference> for Vec<String> {
    fn from(tag: TagReference) -> Self {
        tag.0
    }
}

/// Which `e` tag encoding an event uses. Decided by the first `e` tag:
/// without a marker it is positional.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SchemaKind {
    /// Deprecated positional encoding.
    Positional,
    /// Marked encoding.
    Marked,
}

impl SchemaKind {
    pub fn detect(e_tags: &[&[String]]) -> SchemaKind {
        match e_tags.first() {
            Some(tag) if tag.get(3).is_none() => SchemaKind::Positional,
            _ => SchemaKind::Marked,
        }
    }
}

/// Where an event sits in a thread.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ThreadPosition {
    pub root: Option<TagReference>,
    pub reply: Option<TagReference>,
    pub mentions: Vec<TagReference>,
}

impl ThreadPosition {
    /// Resolves thread position from an event's tags. Only `e` tags are
    /// considered, the input is not modified.
    pub fn from_tags<T: AsRef<[String]>>(tags: &[T]) -> ThreadPosition {
        let e_tags: Vec<&[String]> = tags
            .iter()
            .map(AsRef::as_ref)
            .filter(|t| t.first().map(String::as_str) == Some("e"))
            .collect();

        match SchemaKind::detect(&e_tags) {
            SchemaKind::Positional => Self::positional(&e_tags),
            SchemaKind::Marked => Self::marked(&e_tags),
        }
    }

    fn positional(e_tags: &[&[String]]) -> ThreadPosition {
        match e_tags {
            [] => ThreadPosition::default(),
            // A lone positional tag stands for both root and reply; both carry
            // the root marker after normalisation.
            [only] => {
                let root = TagReference(only.to_vec()).normalized(ThreadMarker::Root);
                ThreadPosition {
                    reply: Some(root.clone()),
                    root: Some(root),
                    mentions: vec![],
                }
            }
            [first, between @ .., last] => ThreadPosition {
                root: Some(TagReference(first.to_vec()).normalized(ThreadMarker::Root)),
                reply: Some(TagReference(last.to_vec()).normalized(ThreadMarker::Reply)),
                mentions: between
                    .iter()
                    .map(|t| TagReference(t.to_vec()).normalized(ThreadMarker::Mention))
                    .collect(),
            },
        }
    }

    fn marked(e_tags: &[&[String]]) -> ThreadPosition {
        let mut position = ThreadPosition::default();

        // Repeated markers: the last one wins.
        for tag in e_tags {
            let Some(marker) = tag.get(3).and_then(|m| ThreadMarker::parse(m)) else {
                continue;
            };
            let reference = TagReference(tag.to_vec()).normalized(marker);
            match marker {
                ThreadMarker::Root => position.root = Some(reference),
                ThreadMarker::Reply => position.reply = Some(reference),
                ThreadMarker::Mention => position.mentions.push(reference),
            }
        }

        position
    }

    /// Event ID of the thread root, if any.
    pub fn root_id(&self) -> Option<&str> {
        self.root.as_ref().map(TagReference::event_id)
    }

    /// Event ID this event directly replies to, if any.
    pub fn reply_id(&self) -> Option<&str> {
        self.reply.as_ref().map(TagReference::event_id)
    }
}
