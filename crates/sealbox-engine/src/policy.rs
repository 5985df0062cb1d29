use subtle::ConstantTimeEq;

use sealbox_types::models::{Identity, Role};

/// Who may run the tamper operation.
///
/// Two policies have shipped for this capability: possession of a shared
/// secret, and ADMIN role membership. Role membership is the converged
/// default; the shared-secret variant stays available for deployments that
/// hand the tamper key to a test harness instead of an account.
#[derive(Debug, Clone)]
pub enum TamperPolicy {
    AdminRole,
    SharedSecret(String),
}

impl TamperPolicy {
    pub fn authorize(&self, identity: &Identity, provided_key: Option<&str>) -> bool {
        match self {
            TamperPolicy::AdminRole => identity.role == Role::Admin,
            TamperPolicy::SharedSecret(secret) => match provided_key {
                Some(key) => bool::from(key.as_bytes().ct_eq(secret.as_bytes())),
                None => false,
            },
        }
    }
}
