use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

const RANDOM_SUFFIX_LEN: usize = 9;
const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Opaque token grouping every record emitted by one instrumentation instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// `session_<millis>_<random>`: time component first, random component second.
    /// Practically unique; collisions are not guarded against.
    pub fn generate_at(now_ms: i64) -> Self {
        Self(format!("session_{}_{}", now_ms, random_suffix()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn random_suffix() -> String {
    let mut value = Uuid::new_v4().as_u128();
    let mut suffix = String::with_capacity(RANDOM_SUFFIX_LEN);
    for _ in 0..RANDOM_SUFFIX_LEN {
        suffix.push(BASE36[(value % 36) as usize] as char);
        value /= 36;
    }
    suffix
}
