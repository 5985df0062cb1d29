use anyhow::Result;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD as B64URL;
use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use sealbox_types::api::SessionData;
use sealbox_types::models::{Identity, Role};

type HmacSha256 = Hmac<Sha256>;

pub const SESSION_COOKIE_NAME: &str = "user_session";

const SESSION_TTL_MS: i64 = 7 * 24 * 60 * 60 * 1000;

/// Issues and verifies self-contained session tokens.
///
/// A token is `base64url(payload_json) . base64url(hmac_sha256(payload_json))`
/// with the payload `{userId, role, email, expiresAt}`. The signing secret is
/// injected at construction so tests can run with a fixed key.
#[derive(Clone)]
pub struct SessionManager {
    secret: String,
}

impl SessionManager {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Build and sign a fresh 7-day session for a verified account.
    /// Returns the token and its expiry (epoch milliseconds) for the cookie
    /// `Expires` attribute.
    pub fn create_session(&self, user_id: &str, role: Role, email: &str) -> Result<(String, i64)> {
        let expires_at = Utc::now().timestamp_millis() + SESSION_TTL_MS;
        let payload = SessionData {
            user_id: user_id.to_string(),
            role,
            email: email.to_string(),
            expires_at,
        };

        let payload_bytes = serde_json::to_vec(&payload)?;
        let signature = self.sign(&payload_bytes);

        let token = format!(
            "{}.{}",
            B64URL.encode(&payload_bytes),
            B64URL.encode(signature)
        );
        Ok((token, expires_at))
    }

    /// Verify a token and recover the caller identity.
    ///
    /// Returns `None` for any failure: malformed split, bad base64, signature
    /// mismatch (checked over the decoded payload bytes, constant-time),
    /// malformed JSON, or expiry in the past.
    pub fn decrypt_session(&self, token: &str) -> Option<Identity> {
        let (payload_b64, signature_b64) = token.split_once('.')?;
        let payload_bytes = B64URL.decode(payload_b64).ok()?;
        let signature = B64URL.decode(signature_b64).ok()?;

        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes()).ok()?;
        mac.update(&payload_bytes);
        mac.verify_slice(&signature).ok()?;

        let session: SessionData = serde_json::from_slice(&payload_bytes).ok()?;
        if Utc::now().timestamp_millis() > session.expires_at {
            return None;
        }

        Some(session.into_identity())
    }

    fn sign(&self, data: &[u8]) -> Vec<u8> {
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(data);
        mac.finalize().into_bytes().to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> SessionManager {
        SessionManager::new("test-secret")
    }

    fn forge(mgr: &SessionManager, payload: &str) -> String {
        let signature = mgr.sign(payload.as_bytes());
        format!(
            "{}.{}",
            B64URL.encode(payload.as_bytes()),
            B64URL.encode(signature)
        )
    }

    #[test]
    fn token_roundtrips_to_identity() {
        let mgr = manager();
        let (token, expires_at) = mgr
            .create_session("user-1", Role::Admin, "admin@example.com")
            .unwrap();

        assert!(expires_at > Utc::now().timestamp_millis());

        let identity = mgr.decrypt_session(&token).unwrap();
        assert_eq!(identity.user_id, "user-1");
        assert_eq!(identity.role, Role::Admin);
        assert_eq!(identity.email, "admin@example.com");
    }

    #[test]
    fn payload_wire_format_is_stable() {
        // The cookie format is camelCase JSON with UPPERCASE roles; a token
        // hand-built from that exact JSON must verify.
        let mgr = manager();
        let far_future = Utc::now().timestamp_millis() + 60_000;
        let payload = format!(
            r#"{{"userId":"u1","role":"USER","email":"a@b.c","expiresAt":{}}}"#,
            far_future
        );

        let identity = mgr.decrypt_session(&forge(&mgr, &payload)).unwrap();
        assert_eq!(identity.user_id, "u1");
        assert_eq!(identity.role, Role::User);
        assert_eq!(identity.email, "a@b.c");
    }

    #[test]
    fn tampered_payload_rejected() {
        let mgr = manager();
        let (token, _) = mgr
            .create_session("user-1", Role::User, "a@b.c")
            .unwrap();

        let (payload_b64, signature_b64) = token.split_once('.').unwrap();
        let mut payload = B64URL.decode(payload_b64).unwrap();
        // Flip one bit of the payload; the signature no longer matches.
        payload[10] ^= 0x01;
        let forged = format!("{}.{}", B64URL.encode(&payload), signature_b64);

        assert!(mgr.decrypt_session(&forged).is_none());
    }

    #[test]
    fn tampered_signature_rejected() {
        let mgr = manager();
        let (token, _) = mgr
            .create_session("user-1", Role::User, "a@b.c")
            .unwrap();

        let (payload_b64, signature_b64) = token.split_once('.').unwrap();
        let mut signature = B64URL.decode(signature_b64).unwrap();
        signature[0] ^= 0x01;
        let forged = format!("{}.{}", payload_b64, B64URL.encode(&signature));

        assert!(mgr.decrypt_session(&forged).is_none());
    }

    #[test]
    fn role_elevation_requires_resigning() {
        // Swapping USER for ADMIN in the payload invalidates the signature.
        let mgr = manager();
        let (token, _) = mgr
            .create_session("user-1", Role::User, "a@b.c")
            .unwrap();

        let (payload_b64, signature_b64) = token.split_once('.').unwrap();
        let payload = String::from_utf8(B64URL.decode(payload_b64).unwrap()).unwrap();
        let elevated = payload.replace("\"USER\"", "\"ADMIN\"");
        let forged = format!("{}.{}", B64URL.encode(elevated.as_bytes()), signature_b64);

        assert!(mgr.decrypt_session(&forged).is_none());
    }

    #[test]
    fn wrong_secret_rejected() {
        let (token, _) = manager()
            .create_session("user-1", Role::User, "a@b.c")
            .unwrap();

        assert!(
            SessionManager::new("other-secret")
                .decrypt_session(&token)
                .is_none()
        );
    }

    #[test]
    fn expired_token_rejected_despite_valid_signature() {
        let mgr = manager();
        let past = Utc::now().timestamp_millis() - 1_000;
        let payload = format!(
            r#"{{"userId":"u1","role":"USER","email":"a@b.c","expiresAt":{}}}"#,
            past
        );

        assert!(mgr.decrypt_session(&forge(&mgr, &payload)).is_none());
    }

    #[test]
    fn malformed_tokens_rejected() {
        let mgr = manager();
        assert!(mgr.decrypt_session("").is_none());
        assert!(mgr.decrypt_session("no-separator").is_none());
        assert!(mgr.decrypt_session("!!!.???").is_none());
        // Valid signature over bytes that are not JSON.
        assert!(mgr.decrypt_session(&forge(&mgr, "not json")).is_none());
    }
}
