use bcrypt::{hash, verify, DEFAULT_COST};
use log::{error, warn};

/// bcrypt reads at most this many bytes of a secret.
pub const MAX_PASSWORD_BYTES: usize = 72;

/// Salted one-way password hashing backed by bcrypt.
///
/// Digests embed their own salt and cost, so the same secret hashes to a
/// different string every time. Compare digests only through [`verify`](Self::verify).
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self { cost: DEFAULT_COST }
    }
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    /// Hashes `secret` with a fresh random salt.
    ///
    /// A blank secret, or one longer than [`MAX_PASSWORD_BYTES`], yields an
    /// empty digest, which never verifies. A bcrypt failure is logged and also
    /// yields an empty digest.
    pub fn hash(&self, secret: &str) -> String {
        if secret.trim().is_empty() {
            return String::new();
        }
        if secret.len() > MAX_PASSWORD_BYTES {
            warn!("Refusing to hash a password longer than {} bytes", MAX_PASSWORD_BYTES);
            return String::new();
        }
        match hash(secret, self.cost) {
            Ok(digest) => digest,
            Err(e) => {
                error!("Failed to hash password: {}", e);
                String::new()
            }
        }
    }

    /// Returns `true` only when `secret` matches `digest`.
    ///
    /// An empty or unparseable digest is a mismatch, never an error.
    pub fn verify(&self, digest: &str, secret: &str) -> bool {
        if digest.is_empty() || secret.len() > MAX_PASSWORD_BYTES {
            return false;
        }
        match verify(secret, digest) {
            Ok(matches) => matches,
            Err(e) => {
                warn!("Failed to verify password against stored digest: {}", e);
                false
            }
        }
    }
}
