use std::io::{Read, Write};
use std::path::Path;
use std::str::FromStr;

use age::{Decryptor, Encryptor};
use nostr_sdk::prelude::{Event, EventBuilder, FromBech32, Keys, SecretKey, ToBech32};
use secrecy::zeroize::Zeroize;
use secrecy::*;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Produces signatures for event templates.
pub trait Signer {
    fn sign(&self, builder: EventBuilder) -> Result<Event>;
}

impl Signer for Keys {
    fn sign(&self, builder: EventBuilder) -> Result<Event> {
        builder
            .to_event(self)
            .map_err(|e| Error::Signing(e.to_string()))
    }
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct Key(String);

/// User's own key, kept secret in memory.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Identity {
    pub name: String,
    pub secret_key: Secret<Key>,
}

impl Identity {
    /// Creates identity from `nsec1…` or hex secret key.
    pub fn from_secret(name: &str, secret: &str) -> Result<Identity> {
        let key = if secret.starts_with("nsec1") {
            SecretKey::from_bech32(secret).map_err(|e| Error::InvalidKey(e.to_string()))?
        } else {
            SecretKey::from_str(secret).map_err(|e| Error::InvalidKey(e.to_string()))?
        };

        Ok(Identity::with_key(name, &key))
    }

    pub fn new_random(name: &str) -> Result<Identity> {
        let keys = Keys::generate();
        let key = keys
            .secret_key()
            .map_err(|e| Error::InvalidKey(e.to_string()))?;

        Ok(Identity::with_key(name, &key))
    }

    fn with_key(name: &str, key: &SecretKey) -> Identity {
        Identity {
            name: name.to_string(),
            secret_key: Secret::new(Key(key.display_secret().to_string())),
        }
    }

    pub fn nostr_key(&self) -> Result<Keys> {
        SecretKey::from_str(&self.secret_key.expose_secret().0)
            .map(Keys::new)
            .map_err(|e| Error::InvalidKey(e.to_string()))
    }

    pub fn npub(&self) -> Result<String> {
        self.nostr_key()?
            .public_key()
            .to_bech32()
            .map_err(|e| Error::InvalidKey(e.to_string()))
    }

    /// Reads identity from an age file encrypted with `password`.
    pub fn load(path: &Path, password: &SecretString) -> Result<Identity> {
        let buf = std::fs::read(path)?;

        match Decryptor::new(buf.as_slice()) {
            Ok(Decryptor::Passphrase(d)) => {
                let mut json = Vec::new();
                d.decrypt(password, None)
                    .map_err(|e| Error::Identity(e.to_string()))?
                    .read_to_end(&mut json)?;
                Ok(serde_json::from_slice(&json)?)
            }
            Ok(_) => Err(Error::Identity("not encrypted by passphrase".to_string())),
            Err(e) => Err(Error::Identity(e.to_string())),
        }
    }

    /// Writes identity to an age file encrypted with `password`.
    pub fn save(&self, path: &Path, password: SecretString) -> Result<()> {
        let json = serde_json::to_vec(self)?;

        let mut encrypted = Vec::new();
        let mut writer = Encryptor::with_user_passphrase(password)
            .wrap_output(&mut encrypted)
            .map_err(|e| Error::Identity(e.to_string()))?;
        writer.write_all(&json)?;
        writer.finish()?;

        std::fs::write(path, encrypted)?;
        Ok(())
    }
}

impl Signer for Identity {
    fn sign(&self, builder: EventBuilder) -> Result<Event> {
        Signer::sign(&self.nostr_key()?, builder)
    }
}

impl Zeroize for Key {
    fn zeroize(&mut self) {
        self.0.zeroize();
    }
}

impl DebugSecret for Key {}
impl CloneableSecret for Key {}
impl SerializableSecret for Key {}
