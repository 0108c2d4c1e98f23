use std::sync::atomic::{AtomicU64, Ordering};

/// Opaque id generation for locally created columns and cards.
///
/// Server-loaded entities keep their server-assigned ids; ids minted here
/// only need to be unique within the running client until the next sync
/// assigns canonical ones.
static ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Generate a new opaque id (8 hex chars).
/// An atomic counter gives intra-process uniqueness, combined with a
/// nanosecond timestamp and hashed via SHA-256 for uniform distribution.
pub fn generate_id() -> String {
    use sha2::{Digest, Sha256};
    let seq = ID_COUNTER.fetch_add(1, Ordering::Relaxed);
    let ts = std::time::SystemTime::now()
        .duration_since(std::time::SystemTime::UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let mut hasher = Sha256::new();
    hasher.update(seq.to_le_bytes());
    hasher.update(ts.to_le_bytes());
    let hash = hasher.finalize();
    hex::encode(&hash[..4])
}
