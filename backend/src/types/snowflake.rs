//! Time-ordered, shard-aware 64-bit identifier allocation.
//!
//! Layout of an ID (most significant bit first):
//!
//! ```text
//! | 1 bit unused | 41 bits ms since epoch | 10 bits shard | 12 bits sequence |
//! ```
//!
//! One [`SnowflakeGenerator`] is built per process (or per shard) and shared
//! through the application state.

use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

/// Default custom epoch (2025-10-08T07:49:18.646Z).
pub const DEFAULT_EPOCH_MS: i64 = 1_759_909_758_646;

const SHARD_BITS: u32 = 10;
const SEQUENCE_BITS: u32 = 12;
const TIMESTAMP_SHIFT: u32 = SHARD_BITS + SEQUENCE_BITS;

pub const MAX_SHARD_ID: u16 = (1 << SHARD_BITS) - 1;
pub const SEQUENCE_MASK: i64 = (1 << SEQUENCE_BITS) - 1;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SnowflakeError {
    #[error("shard id {0} is out of range (0..={MAX_SHARD_ID})")]
    ShardOutOfRange(u16),
}

/// Millisecond wall clock used by the generator.
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> i64;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as i64)
            .unwrap_or(0)
    }
}

#[derive(Debug)]
struct GeneratorState {
    last_timestamp: i64,
    sequence: i64,
}

pub struct SnowflakeGenerator {
    epoch_ms: i64,
    shard_id: u16,
    clock: Box<dyn Clock>,
    state: Mutex<GeneratorState>,
}

impl std::fmt::Debug for SnowflakeGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnowflakeGenerator")
            .field("epoch_ms", &self.epoch_ms)
            .field("shard_id", &self.shard_id)
            .finish_non_exhaustive()
    }
}

impl SnowflakeGenerator {
    pub fn new(shard_id: u16, epoch_ms: i64) -> Result<Self, SnowflakeError> {
        Self::with_clock(shard_id, epoch_ms, SystemClock)
    }

    pub fn with_clock<C>(shard_id: u16, epoch_ms: i64, clock: C) -> Result<Self, SnowflakeError>
    where
        C: Clock + 'static,
    {
        if shard_id > MAX_SHARD_ID {
            return Err(SnowflakeError::ShardOutOfRange(shard_id));
        }
        Ok(Self {
            epoch_ms,
            shard_id,
            clock: Box::new(clock),
            state: Mutex::new(GeneratorState {
                last_timestamp: -1,
                sequence: 0,
            }),
        })
    }

    /// Allocates the next identifier.
    ///
    /// When 4096 IDs have already been handed out in the current millisecond
    /// the call blocks until the clock moves on.
    pub fn next_id(&self) -> i64 {
        let mut state = match self.state.lock() {
            Ok(guard) => guard,
            // Plain integers; nothing to repair after a poisoning panic.
            Err(poisoned) => poisoned.into_inner(),
        };

        let mut timestamp = self.clock.now_millis();
        if timestamp < state.last_timestamp {
            tracing::warn!(
                now = timestamp,
                last = state.last_timestamp,
                "Clock moved backwards; holding snowflake timestamp"
            );
            timestamp = state.last_timestamp;
        }

        if timestamp == state.last_timestamp {
            state.sequence = (state.sequence + 1) & SEQUENCE_MASK;
            if state.sequence == 0 {
                timestamp = self.wait_next_millis(state.last_timestamp);
            }
        } else {
            state.sequence = 0;
        }
        state.last_timestamp = timestamp;

        self.compose(timestamp, state.sequence)
    }

    fn wait_next_millis(&self, last_timestamp: i64) -> i64 {
        let mut timestamp = self.clock.now_millis();
        while timestamp <= last_timestamp {
            std::thread::yield_now();
            timestamp = self.clock.now_millis();
        }
        timestamp
    }

    fn compose(&self, timestamp: i64, sequence: i64) -> i64 {
        let elapsed = (timestamp - self.epoch_ms).max(0);
        (elapsed << TIMESTAMP_SHIFT) | (i64::from(self.shard_id) << SEQUENCE_BITS) | sequence
    }
}

/// Splits an identifier back into `(timestamp_ms, shard_id, sequence)`.
pub fn decompose(id: i64, epoch_ms: i64) -> (i64, u16, i64) {
    let timestamp = (id >> TIMESTAMP_SHIFT) + epoch_ms;
    let shard = ((id >> SEQUENCE_BITS) & i64::from(MAX_SHARD_ID)) as u16;
    (timestamp, shard, id & SEQUENCE_MASK)
}
