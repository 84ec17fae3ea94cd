//! OAuth 1.0a request signing.
//!
//! User-context requests carry an `Authorization: OAuth ...` header. Its
//! HMAC-SHA1 signature covers the method, the URL without its query, and
//! every query parameter alongside the protocol parameters.

use std::fmt::{self, Write as _};
use std::time::{SystemTime, UNIX_EPOCH};

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use hmac::{Hmac, Mac};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use rand::{distributions::Alphanumeric, Rng};
use sha1::Sha1;

use crate::config::TwitterConfig;
use crate::error::{TwitterError, TwitterResult};

/// RFC 3986 unreserved characters stay as-is; everything else is escaped.
const UNRESERVED: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

const NONCE_LEN: usize = 32;

struct KeyPair {
    key: String,
    secret: String,
}

/// Signs requests with the app's consumer key and the user's access token.
pub struct OAuthSigner {
    consumer: KeyPair,
    token: KeyPair,
}

impl fmt::Debug for OAuthSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthSigner")
            .field("consumer_key", &self.consumer.key)
            .finish_non_exhaustive()
    }
}

impl OAuthSigner {
    #[must_use]
    pub fn new(config: &TwitterConfig) -> Self {
        Self {
            consumer: KeyPair {
                key: config.api_key.clone(),
                secret: config.api_secret.clone(),
            },
            token: KeyPair {
                key: config.access_token.clone(),
                secret: config.access_token_secret.clone(),
            },
        }
    }

    /// `Authorization` header value for a request to `url` (no query string)
    /// carrying `params` in its query.
    pub fn sign(
        &self,
        method: &str,
        url: &str,
        params: &[(String, String)],
    ) -> TwitterResult<String> {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| TwitterError::OAuth(format!("system clock before 1970: {e}")))?
            .as_secs();
        self.sign_with(method, url, params, &nonce(), timestamp)
    }

    /// [`Self::sign`] with a fixed nonce and timestamp.
    pub fn sign_with(
        &self,
        method: &str,
        url: &str,
        params: &[(String, String)],
        nonce: &str,
        timestamp: u64,
    ) -> TwitterResult<String> {
        let timestamp = timestamp.to_string();
        let protocol = [
            ("oauth_consumer_key", self.consumer.key.as_str()),
            ("oauth_nonce", nonce),
            ("oauth_signature_method", "HMAC-SHA1"),
            ("oauth_timestamp", timestamp.as_str()),
            ("oauth_token", self.token.key.as_str()),
            ("oauth_version", "1.0"),
        ];

        let mut pairs: Vec<(String, String)> = protocol
            .iter()
            .map(|(k, v)| (percent_encode(k), percent_encode(v)))
            .chain(params.iter().map(|(k, v)| (percent_encode(k), percent_encode(v))))
            .collect();
        pairs.sort_unstable();

        let base = base_string(method, url, &pairs);
        let key = format!(
            "{}&{}",
            percent_encode(&self.consumer.secret),
            percent_encode(&self.token.secret)
        );
        let signature = hmac_sha1(&key, &base)?;

        let mut header = String::from("OAuth ");
        for (k, v) in protocol
            .iter()
            .copied()
            .chain(std::iter::once(("oauth_signature", signature.as_str())))
        {
            if header.len() > "OAuth ".len() {
                header.push_str(", ");
            }
            let _ = write!(header, "{}=\"{}\"", percent_encode(k), percent_encode(v));
        }
        Ok(header)
    }
}

/// `METHOD&url&params`, each part percent-encoded; `pairs` must already be
/// encoded and sorted.
fn base_string(method: &str, url: &str, pairs: &[(String, String)]) -> String {
    let mut joined = String::new();
    for (k, v) in pairs {
        if !joined.is_empty() {
            joined.push('&');
        }
        let _ = write!(joined, "{k}={v}");
    }
    format!(
        "{}&{}&{}",
        method.to_ascii_uppercase(),
        percent_encode(url),
        percent_encode(&joined)
    )
}

/// Percent-encode per RFC 3986.
pub(crate) fn percent_encode(s: &str) -> String {
    utf8_percent_encode(s, UNRESERVED).to_string()
}

fn nonce() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(NONCE_LEN)
        .map(char::from)
        .collect()
}

fn hmac_sha1(key: &str, data: &str) -> TwitterResult<String> {
    let mut mac = Hmac::<Sha1>::new_from_slice(key.as_bytes())
        .map_err(|e| TwitterError::OAuth(format!("bad signing key: {e}")))?;
    mac.update(data.as_bytes());
    Ok(BASE64.encode(mac.finalize().into_bytes()))
}
