//! Temp id allocation
//!
//! Temp ids are placeholders in a transaction payload that the engine
//! resolves to real entity ids on commit. Allocation is deterministic and
//! owned by the caller: there is no process-wide counter.

use crate::core::config::{ConfigError, ConverterConfig};
use crate::models::{Keyword, TempId};

/// First index handed out; the engine reserves `-1000000` and above
const FIRST_TEMPID_IDX: i64 = -1_000_001;

/// Allocates temp ids in one partition, counting down
///
/// # Example
/// ```
/// use ednbridge_core::{Keyword, TempIdAllocator};
///
/// let mut ids = TempIdAllocator::new(Keyword::namespaced("db.part", "user"));
/// assert_eq!(ids.next_id().idx(), Some(-1000001));
/// assert_eq!(ids.next_id().idx(), Some(-1000002));
/// assert_eq!(ids.allocated(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct TempIdAllocator {
    partition: Keyword,
    next_idx: i64,
}

impl TempIdAllocator {
    pub fn new(partition: Keyword) -> Self {
        Self {
            partition,
            next_idx: FIRST_TEMPID_IDX,
        }
    }

    /// Allocator for the configured default partition
    pub fn from_config(config: &ConverterConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(config.partition()?))
    }

    /// Allocate the next temp id
    pub fn next_id(&mut self) -> TempId {
        let id = TempId::new(self.partition.clone(), self.next_idx);
        self.next_idx -= 1;
        id
    }

    /// Number of ids handed out so far
    pub fn allocated(&self) -> usize {
        (FIRST_TEMPID_IDX - self.next_idx) as usize
    }

    pub fn partition(&self) -> &Keyword {
        &self.partition
    }
}
