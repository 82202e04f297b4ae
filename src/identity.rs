//! Record identity and per-run context
//!
//! Every emitted record carries an id derived from a salted SHA-256 over
//! `(spider_id, sequence, url_id, created_at)`. The digest is rendered in a
//! lowercase alphanumeric alphabet so ids are short, stable across reruns at
//! the same timestamp, and reveal nothing about insertion order.

use chrono::Utc;
use sha2::{Digest, Sha256};

const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz1234567890";

/// Spider type stamped into record ids
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpiderKind {
    GreenhouseDepartments = 1,
    GreenhouseOpenings = 2,
    LeverOpenings = 3,
}

impl SpiderKind {
    pub fn id(self) -> u64 {
        self as u64
    }
}

/// Salted, deterministic id encoder
#[derive(Debug, Clone)]
pub struct RecordIdHasher {
    salt: String,
}

impl RecordIdHasher {
    pub fn new(salt: impl Into<String>) -> Self {
        Self { salt: salt.into() }
    }

    /// Encode a sequence of integers into an opaque id
    pub fn encode(&self, values: &[u64]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.salt.as_bytes());
        for value in values {
            // Separator keeps [1, 23] distinct from [12, 3]
            hasher.update([0x1f]);
            hasher.update(value.to_be_bytes());
        }
        let digest = hasher.finalize();

        let mut head = [0u8; 16];
        head.copy_from_slice(&digest[..16]);
        to_alphabet(u128::from_be_bytes(head))
    }

    /// Id for one harvested record
    pub fn record_id(&self, spider: SpiderKind, sequence: u64, url_id: u64, created_at: i64) -> String {
        self.encode(&[spider.id(), sequence, url_id, created_at.max(0) as u64])
    }
}

fn to_alphabet(mut value: u128) -> String {
    let base = ALPHABET.len() as u128;
    let mut out = Vec::with_capacity(25);
    loop {
        out.push(ALPHABET[(value % base) as usize]);
        value /= base;
        if value == 0 {
            break;
        }
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}

/// Identity shared by every record of one harvest invocation
#[derive(Debug, Clone)]
pub struct RunContext {
    hasher: RecordIdHasher,
    run_hash: String,
    started_at: i64,
}

impl RunContext {
    /// Start a new run stamped with the current time
    pub fn new(salt: &str) -> Self {
        Self::at(salt, Utc::now().timestamp())
    }

    /// Start a run with an explicit start timestamp
    pub fn at(salt: &str, started_at: i64) -> Self {
        let hasher = RecordIdHasher::new(salt);
        let run_hash = hasher.encode(&[started_at.max(0) as u64]);
        Self {
            hasher,
            run_hash,
            started_at,
        }
    }

    /// Rebuild the context a parent process handed to a worker
    pub fn resume(salt: &str, run_hash: impl Into<String>, started_at: i64) -> Self {
        Self {
            hasher: RecordIdHasher::new(salt),
            run_hash: run_hash.into(),
            started_at,
        }
    }

    pub fn run_hash(&self) -> &str {
        &self.run_hash
    }

    pub fn started_at(&self) -> i64 {
        self.started_at
    }

    pub fn hasher(&self) -> &RecordIdHasher {
        &self.hasher
    }
}
