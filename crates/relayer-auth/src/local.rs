//! Locally computed HMAC attribution.

use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD, URL_SAFE, URL_SAFE_NO_PAD};
use base64::Engine;
use hmac::{Hmac, Mac};
use relayer_types::{RelayError, Result};
use sha2::Sha256;

use crate::{BuilderCredentials, BuilderHeaders};

type HmacSha256 = Hmac<Sha256>;

/// Timestamps below this are taken to be seconds.
pub const MILLIS_THRESHOLD: i64 = 1_000_000_000_000;

/// 0 becomes the current time; anything below `MILLIS_THRESHOLD` is
/// treated as seconds and scaled to milliseconds.
///
/// A genuine millisecond timestamp from before September 2001 is misread
/// as seconds.
pub fn normalize_timestamp(timestamp: i64) -> i64 {
    if timestamp == 0 {
        return chrono::Utc::now().timestamp_millis();
    }
    if timestamp < MILLIS_THRESHOLD {
        return timestamp.saturating_mul(1000);
    }
    timestamp
}

/// Secrets arrive in any of the four common base64 alphabets/paddings.
fn decode_secret(secret: &str) -> Result<Vec<u8>> {
    URL_SAFE
        .decode(secret)
        .or_else(|_| URL_SAFE_NO_PAD.decode(secret))
        .or_else(|_| STANDARD.decode(secret))
        .or_else(|_| STANDARD_NO_PAD.decode(secret))
        .map_err(|e| RelayError::InvalidCredentials(format!("invalid base64 secret: {e}")))
}

/// HMAC-SHA256 over `"{timestamp}{method}{path}{body}"`, URL-safe base64 (padded).
///
/// `timestamp` is used as given; callers normalize it first.
pub fn build_hmac_signature(
    secret: &str,
    timestamp: i64,
    method: &str,
    path: &str,
    body: Option<&str>,
) -> Result<String> {
    let key = decode_secret(secret)?;
    let mut message = format!("{timestamp}{method}{path}");
    if let Some(body) = body {
        message.push_str(body);
    }

    let mut mac = HmacSha256::new_from_slice(&key)
        .map_err(|e| RelayError::InvalidCredentials(format!("invalid HMAC key: {e}")))?;
    mac.update(message.as_bytes());
    Ok(URL_SAFE.encode(mac.finalize().into_bytes()))
}

pub(crate) fn local_headers(
    creds: &BuilderCredentials,
    method: &str,
    path: &str,
    body: Option<&str>,
    timestamp: i64,
) -> Result<BuilderHeaders> {
    if !creds.is_valid() {
        return Err(RelayError::InvalidCredentials(
            "key, secret and passphrase are required".into(),
        ));
    }
    let timestamp = normalize_timestamp(timestamp);
    let signature = build_hmac_signature(&creds.secret, timestamp, method, path, body)?;
    Ok(BuilderHeaders {
        api_key: creds.key.clone(),
        passphrase: creds.passphrase.clone(),
        signature,
        timestamp: timestamp.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "c2VjcmV0";
    const TS: i64 = 1_700_000_000_000;

    #[test]
    fn test_known_signatures() {
        assert_eq!(
            build_hmac_signature(SECRET, TS, "POST", "/submit", Some(r#"{"a":1}"#)).unwrap(),
            "cKGCEfrmRjmd-BDdVIKPpJ2R8f5uFyb0SC4b7bN-x9g="
        );
        assert_eq!(
            build_hmac_signature(SECRET, TS, "GET", "/transactions", None).unwrap(),
            "5p9jptsqmBMlcfTdeN74NzwWWQ_BX22U-WPkSlyUl4Q="
        );
    }

    #[test]
    fn test_empty_body_same_as_none() {
        assert_eq!(
            build_hmac_signature(SECRET, TS, "GET", "/transactions", Some("")).unwrap(),
            build_hmac_signature(SECRET, TS, "GET", "/transactions", None).unwrap()
        );
    }

    #[test]
    fn test_every_input_changes_signature() {
        let base = build_hmac_signature(SECRET, TS, "POST", "/submit", Some("{}")).unwrap();
        let variants = [
            build_hmac_signature("b3RoZXI=", TS, "POST", "/submit", Some("{}")),
            build_hmac_signature(SECRET, TS + 1, "POST", "/submit", Some("{}")),
            build_hmac_signature(SECRET, TS, "GET", "/submit", Some("{}")),
            build_hmac_signature(SECRET, TS, "POST", "/nonce", Some("{}")),
            build_hmac_signature(SECRET, TS, "POST", "/submit", Some("{ }")),
        ];
        for v in variants {
            assert_ne!(v.unwrap(), base);
        }
    }

    #[test]
    fn test_secret_alphabets() {
        // 0xfb 0xff: '+/' in standard, '-_' in URL-safe.
        let url = build_hmac_signature("-_8=", TS, "GET", "/", None).unwrap();
        let url_raw = build_hmac_signature("-_8", TS, "GET", "/", None).unwrap();
        let std = build_hmac_signature("+/8=", TS, "GET", "/", None).unwrap();
        let std_raw = build_hmac_signature("+/8", TS, "GET", "/", None).unwrap();
        assert_eq!(url, url_raw);
        assert_eq!(url, std);
        assert_eq!(url, std_raw);
    }

    #[test]
    fn test_undecodable_secret() {
        assert!(matches!(
            build_hmac_signature("not base64!!", TS, "GET", "/", None),
            Err(RelayError::InvalidCredentials(_))
        ));
    }

    #[test]
    fn test_normalize_timestamp() {
        assert_eq!(normalize_timestamp(1_700_000_000), 1_700_000_000_000);
        assert_eq!(normalize_timestamp(TS), TS);
        let now = normalize_timestamp(0);
        assert!(now >= MILLIS_THRESHOLD);
    }

    #[test]
    fn test_negative_timestamp_saturates() {
        assert_eq!(normalize_timestamp(-5), -5_000);
        assert_eq!(normalize_timestamp(i64::MIN), i64::MIN);
        assert_eq!(normalize_timestamp(i64::MIN / 10), i64::MIN);
        // Signing with an extreme timestamp must not panic.
        assert!(build_hmac_signature(SECRET, i64::MIN, "GET", "/nonce", None).is_ok());
    }

    #[test]
    fn test_local_headers() {
        let creds = BuilderCredentials::new("key", SECRET, "pass");
        let headers = local_headers(&creds, "POST", "/submit", Some(r#"{"a":1}"#), 1_700_000_000)
            .unwrap();
        assert_eq!(headers.api_key, "key");
        assert_eq!(headers.passphrase, "pass");
        assert_eq!(headers.timestamp, "1700000000000");
        assert_eq!(headers.signature, "cKGCEfrmRjmd-BDdVIKPpJ2R8f5uFyb0SC4b7bN-x9g=");

        let incomplete = BuilderCredentials::new("key", "", "pass");
        assert!(matches!(
            local_headers(&incomplete, "GET", "/", None, TS),
            Err(RelayError::InvalidCredentials(_))
        ));
    }
}
