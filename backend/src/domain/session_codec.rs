//! Opaque storage form of a [`Session`].
//!
//! The session is serialised to JSON, checked against its shape, and the
//! bearer token is replaced by an authenticated ciphertext before the whole
//! document is base64url encoded. The ciphertext is bound to the session's
//! `api_url`, so a token cannot be replayed under a different endpoint.
//!
//! Anything that fails on the way back in is reported as [`SessionInvalid`];
//! callers never learn which stage rejected the input beyond the logged
//! reason.

use std::fmt;

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chacha20poly1305::aead::{Aead, AeadCore, KeyInit, OsRng, Payload};
use chacha20poly1305::{ChaCha20Poly1305, Key, Nonce};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use sha2::{Digest, Sha256};
use zeroize::Zeroize;

use super::error::{Error, SessionInvalid, SessionInvalidReason};
use super::schema::{Schema, parse};
use super::session::Session;

/// Nonce length for ChaCha20-Poly1305.
const NONCE_LEN: usize = 12;

/// Encrypts and decrypts the storage form of sessions with one secret.
#[derive(Clone)]
pub struct SessionCodec {
    cipher: ChaCha20Poly1305,
}

impl SessionCodec {
    /// Derive the cipher key from the application secret.
    ///
    /// The key is the SHA-256 digest of the secret; the intermediate digest is
    /// wiped once the cipher holds its own copy.
    #[must_use]
    pub fn new(secret: &SecretString) -> Self {
        let mut digest = Sha256::digest(secret.expose_secret().as_bytes());
        let cipher = ChaCha20Poly1305::new(Key::from_slice(digest.as_slice()));
        digest.as_mut_slice().zeroize();
        Self { cipher }
    }

    /// Produce the opaque storage string for `session`.
    ///
    /// # Errors
    /// [`Error::Schema`] when the session breaks its own shape, and
    /// [`Error::Internal`] when serialisation or encryption fails.
    pub fn encode(&self, session: &Session) -> Result<String, Error> {
        let mut value = serde_json::to_value(session)
            .map_err(|err| Error::internal(format!("session serialisation failed: {err}")))?;
        Session::shape().check(&value)?;

        let sealed = self.seal(session.token(), session.api_url())?;
        if let Some(object) = value.as_object_mut() {
            object.insert(Session::TOKEN_FIELD.to_owned(), Value::String(sealed));
        }

        let json = serde_json::to_vec(&value)
            .map_err(|err| Error::internal(format!("session serialisation failed: {err}")))?;
        Ok(URL_SAFE_NO_PAD.encode(json))
    }

    /// Recover a session from its storage string.
    ///
    /// # Errors
    /// [`SessionInvalid`] for corrupt encoding, a non-JSON payload, a
    /// ciphertext that fails authentication, or a shape violation.
    pub fn decode(&self, raw: &str) -> Result<Session, SessionInvalid> {
        let bytes = URL_SAFE_NO_PAD
            .decode(raw.trim())
            .map_err(|_| SessionInvalid::new(SessionInvalidReason::Encoding))?;
        let mut value: Value = serde_json::from_slice(&bytes)
            .map_err(|_| SessionInvalid::new(SessionInvalidReason::Malformed))?;

        // The stored form has the same shape; the token is merely ciphertext.
        Session::shape()
            .check(&value)
            .map_err(|violation| SessionInvalid::new(SessionInvalidReason::Schema(violation)))?;

        let object = value
            .as_object_mut()
            .ok_or_else(|| SessionInvalid::new(SessionInvalidReason::Malformed))?;
        let api_url = string_member(object, Session::API_URL_FIELD)?;
        let sealed = string_member(object, Session::TOKEN_FIELD)?;
        let token = self.open(&sealed, &api_url)?;
        object.insert(Session::TOKEN_FIELD.to_owned(), Value::String(token));

        parse::<Session>(value)
            .map_err(|violation| SessionInvalid::new(SessionInvalidReason::Schema(violation)))
    }

    fn seal(&self, token: &str, api_url: &str) -> Result<String, Error> {
        let nonce = ChaCha20Poly1305::generate_nonce(&mut OsRng);
        let ciphertext = self
            .cipher
            .encrypt(
                &nonce,
                Payload {
                    msg: token.as_bytes(),
                    aad: api_url.as_bytes(),
                },
            )
            .map_err(|_| Error::internal("token encryption failed"))?;

        let mut sealed = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        sealed.extend_from_slice(nonce.as_slice());
        sealed.extend_from_slice(&ciphertext);
        Ok(URL_SAFE_NO_PAD.encode(sealed))
    }

    fn open(&self, sealed: &str, api_url: &str) -> Result<String, SessionInvalid> {
        let failed = || SessionInvalid::new(SessionInvalidReason::Decryption);
        let bytes = URL_SAFE_NO_PAD.decode(sealed).map_err(|_| failed())?;
        let (nonce, ciphertext) = bytes.split_at_checked(NONCE_LEN).ok_or_else(failed)?;
        let plaintext = self
            .cipher
            .decrypt(
                Nonce::from_slice(nonce),
                Payload {
                    msg: ciphertext,
                    aad: api_url.as_bytes(),
                },
            )
            .map_err(|_| failed())?;
        String::from_utf8(plaintext).map_err(|_| failed())
    }
}

impl fmt::Debug for SessionCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionCodec").finish_non_exhaustive()
    }
}

fn string_member(
    object: &serde_json::Map<String, Value>,
    name: &str,
) -> Result<String, SessionInvalid> {
    object
        .get(name)
        .and_then(Value::as_str)
        .map(str::to_owned)
        .ok_or_else(|| SessionInvalid::new(SessionInvalidReason::Malformed))
}
