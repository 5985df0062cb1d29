use anyhow::Result;
use rand::RngCore;
use scrypt::Params;
use subtle::ConstantTimeEq;

const SALT_LEN: usize = 16;
const KEY_LEN: usize = 64;

// scrypt cost parameters: N = 2^14, r = 8, p = 1.
const LOG_N: u8 = 14;
const R: u32 = 8;
const P: u32 = 1;

/// Hash a password into the `hexSalt:hexDerivedKey` storage format.
///
/// The KDF is keyed with the hex-encoded salt string itself (not the raw
/// salt bytes) so that secrets hashed here verify against rows written by
/// earlier deployments of this format.
pub fn hash_password(password: &str) -> Result<String> {
    let mut salt = [0u8; SALT_LEN];
    rand::rng().fill_bytes(&mut salt);
    let salt_hex = hex::encode(salt);

    let key = derive_key(password, &salt_hex)?;
    Ok(format!("{}:{}", salt_hex, hex::encode(key)))
}

/// Check a candidate password against a stored `salt:key` secret.
///
/// Fails closed: any malformed stored secret yields `false`, never an error.
/// The final comparison is constant-time.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let Some((salt_hex, key_hex)) = stored.split_once(':') else {
        return false;
    };
    if salt_hex.is_empty() || key_hex.is_empty() {
        return false;
    }
    let Ok(stored_key) = hex::decode(key_hex) else {
        return false;
    };
    let Ok(candidate) = derive_key(password, salt_hex) else {
        return false;
    };

    bool::from(candidate.ct_eq(&stored_key))
}

fn derive_key(password: &str, salt_hex: &str) -> Result<[u8; KEY_LEN]> {
    let params = Params::new(LOG_N, R, P, KEY_LEN)
        .map_err(|e| anyhow::anyhow!("invalid scrypt params: {}", e))?;

    let mut key = [0u8; KEY_LEN];
    scrypt::scrypt(password.as_bytes(), salt_hex.as_bytes(), &params, &mut key)
        .map_err(|e| anyhow::anyhow!("scrypt failed: {}", e))?;
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify_roundtrip() {
        let stored = hash_password("hunter22").unwrap();
        assert!(verify_password("hunter22", &stored));
    }

    #[test]
    fn wrong_password_rejected() {
        let stored = hash_password("hunter22").unwrap();
        assert!(!verify_password("hunter23", &stored));
        assert!(!verify_password("", &stored));
    }

    #[test]
    fn stored_format_is_salt_colon_key() {
        let stored = hash_password("pw").unwrap();
        let (salt, key) = stored.split_once(':').unwrap();
        assert_eq!(salt.len(), SALT_LEN * 2);
        assert_eq!(key.len(), KEY_LEN * 2);
        assert!(salt.chars().all(|c| c.is_ascii_hexdigit()));
        assert!(key.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn salts_are_random() {
        let a = hash_password("pw").unwrap();
        let b = hash_password("pw").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn malformed_stored_secret_fails_closed() {
        assert!(!verify_password("pw", ""));
        assert!(!verify_password("pw", "no-separator"));
        assert!(!verify_password("pw", ":"));
        assert!(!verify_password("pw", "deadbeef:"));
        assert!(!verify_password("pw", "deadbeef:not-hex!"));
    }
}
