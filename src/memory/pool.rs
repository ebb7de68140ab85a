//! Fixed-capacity value store
//!
//! `SolidPool` owns Solid Numbers in a slot array sized once at construction.
//! Slots are recycled through a free list and each carries a generation
//! counter, so an id that outlived its value never aliases whatever reuses
//! the slot. Exhaustion is an explicit failure: `alloc` returns `None`.
//!
//! Arithmetic on the pool borrows both operands and allocates the result,
//! handing the caller a reference count of one. `recover` with
//! `RecoveryStrategy::Propagate` is the only operation that returns an
//! existing id, with its count incremented.

use std::fmt;

use log::{debug, warn};

use super::stats::PoolStats;
use crate::algebra::{self, Recovery, RecoveryStrategy};
use crate::arith;
use crate::config::SolidConfig;
use crate::error::{Result, SolidError};
use crate::solid::{AstSolidLiteral, Barrier, Confidence, GapMagnitude, SolidNumber, Terminal};

/// Handle to a value stored in a `SolidPool`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SolidId {
    index: u32,
    generation: u32,
}

impl SolidId {
    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl fmt::Display for SolidId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SolidId({}v{})", self.index, self.generation)
    }
}

#[derive(Debug, Clone)]
struct Entry {
    value: SolidNumber,
    ref_count: u32,
}

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    entry: Option<Entry>,
}

#[derive(Debug, Clone)]
pub struct SolidPool {
    slots: Vec<Slot>,
    /// Free slot indices; the most recently freed slot is reused first
    free: Vec<u32>,
    stats: PoolStats,
}

impl SolidPool {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.min(u32::MAX as usize);
        let slots = (0..capacity)
            .map(|_| Slot {
                generation: 0,
                entry: None,
            })
            .collect();
        // Reversed so that allocation starts from slot 0
        let free = (0..capacity as u32).rev().collect();
        Self {
            slots,
            free,
            stats: PoolStats {
                capacity,
                ..PoolStats::default()
            },
        }
    }

    pub fn from_config(config: &SolidConfig) -> Self {
        Self::with_capacity(config.store.pool_capacity)
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn len(&self) -> usize {
        self.stats.live
    }

    pub fn is_empty(&self) -> bool {
        self.stats.live == 0
    }

    pub fn is_full(&self) -> bool {
        self.free.is_empty()
    }

    pub fn stats(&self) -> PoolStats {
        self.stats.clone()
    }

    /// Store `value` with a reference count of one; `None` when every slot is taken
    pub fn alloc(&mut self, value: SolidNumber) -> Option<SolidId> {
        let Some(index) = self.free.pop() else {
            self.stats.exhaustions += 1;
            warn!("solid pool exhausted at capacity {}", self.capacity());
            return None;
        };
        let slot = &mut self.slots[index as usize];
        slot.entry = Some(Entry {
            value,
            ref_count: 1,
        });
        self.stats.record_alloc();
        Some(SolidId {
            index,
            generation: slot.generation,
        })
    }

    pub fn try_alloc(&mut self, value: SolidNumber) -> Result<SolidId> {
        let capacity = self.capacity();
        self.alloc(value)
            .ok_or(SolidError::AllocationExhausted { capacity })
    }

    fn entry(&self, id: SolidId) -> Option<&Entry> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.entry.as_ref())
    }

    fn entry_mut(&mut self, id: SolidId) -> Option<&mut Entry> {
        if self.entry(id).is_none() {
            self.stats.stale_accesses += 1;
            return None;
        }
        self.slots[id.index as usize].entry.as_mut()
    }

    pub fn contains(&self, id: SolidId) -> bool {
        self.entry(id).is_some()
    }

    pub fn get(&self, id: SolidId) -> Option<&SolidNumber> {
        self.entry(id).map(|entry| &entry.value)
    }

    pub fn ref_count(&self, id: SolidId) -> Option<u32> {
        self.entry(id).map(|entry| entry.ref_count)
    }

    /// Release the slot regardless of its reference count. Returns false for a stale id.
    pub fn free(&mut self, id: SolidId) -> bool {
        if self.entry_mut(id).is_none() {
            debug!("free of stale {}", id);
            return false;
        }
        let slot = &mut self.slots[id.index as usize];
        slot.entry = None;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        self.stats.record_free();
        true
    }

    /// Add an owner; returns the new count
    pub fn inc_ref(&mut self, id: SolidId) -> Option<u32> {
        let entry = self.entry_mut(id)?;
        entry.ref_count = entry.ref_count.saturating_add(1);
        Some(entry.ref_count)
    }

    /// Drop an owner, freeing the slot when the last one goes; returns the remaining count
    pub fn dec_ref(&mut self, id: SolidId) -> Option<u32> {
        let entry = self.entry_mut(id)?;
        entry.ref_count = entry.ref_count.saturating_sub(1);
        let remaining = entry.ref_count;
        if remaining == 0 {
            self.free(id);
        }
        Some(remaining)
    }

    pub fn init_exact(&mut self, digits: &str) -> Option<SolidId> {
        self.alloc(SolidNumber::exact(digits))
    }

    pub fn init_with_gap(
        &mut self,
        known: &str,
        barrier: Barrier,
        gap: GapMagnitude,
        confidence: Confidence,
        terminal: Terminal,
    ) -> Option<SolidId> {
        self.alloc(SolidNumber::with_gap(known, barrier, gap, confidence, terminal))
    }

    /// Store the value described by a parser literal
    pub fn init_from_ast(&mut self, literal: &AstSolidLiteral, source: &str) -> Result<SolidId> {
        let value = SolidNumber::from_ast(literal, source)?;
        self.try_alloc(value)
    }

    fn operand(&self, id: SolidId) -> Result<&SolidNumber> {
        self.get(id)
            .ok_or_else(|| SolidError::invalid_operand(format!("{} is not a live value", id)))
    }

    fn apply(
        &mut self,
        a: SolidId,
        b: SolidId,
        op: fn(&SolidNumber, &SolidNumber) -> SolidNumber,
    ) -> Result<SolidId> {
        let result = op(self.operand(a)?, self.operand(b)?);
        self.try_alloc(result)
    }

    pub fn add(&mut self, a: SolidId, b: SolidId) -> Result<SolidId> {
        self.apply(a, b, arith::add)
    }

    pub fn subtract(&mut self, a: SolidId, b: SolidId) -> Result<SolidId> {
        self.apply(a, b, arith::subtract)
    }

    pub fn multiply(&mut self, a: SolidId, b: SolidId) -> Result<SolidId> {
        self.apply(a, b, arith::multiply)
    }

    pub fn divide(&mut self, a: SolidId, b: SolidId) -> Result<SolidId> {
        self.apply(a, b, arith::divide)
    }

    pub fn power(&mut self, a: SolidId, b: SolidId) -> Result<SolidId> {
        self.apply(a, b, algebra::power)
    }

    /// Replace an undefined value according to `strategy`.
    /// Defined values and `Propagate` share the original id.
    pub fn recover(&mut self, id: SolidId, strategy: RecoveryStrategy) -> Result<SolidId> {
        match algebra::recover(self.operand(id)?, strategy) {
            Recovery::Fresh(value) => self.try_alloc(value),
            Recovery::Shared => {
                self.inc_ref(id);
                Ok(id)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solid::TerminalKind;

    #[test]
    fn test_capacity_exhaustion() {
        let mut pool = SolidPool::with_capacity(3);
        for i in 0..3 {
            assert!(pool.init_exact(&i.to_string()).is_some());
        }
        assert!(pool.is_full());
        assert_eq!(pool.init_exact("3"), None);
        assert!(matches!(
            pool.try_alloc(SolidNumber::exact("4")),
            Err(SolidError::AllocationExhausted { capacity: 3 })
        ));
        assert_eq!(pool.stats().exhaustions, 2);
    }

    #[test]
    fn test_reference_counting_frees_on_zero() {
        let mut pool = SolidPool::with_capacity(2);
        let id = pool.init_exact("7").unwrap();
        assert_eq!(pool.inc_ref(id), Some(2));
        assert_eq!(pool.dec_ref(id), Some(1));
        assert!(pool.contains(id));
        assert_eq!(pool.dec_ref(id), Some(0));
        assert!(!pool.contains(id));
        assert_eq!(pool.len(), 0);
        assert_eq!(pool.dec_ref(id), None);
    }

    #[test]
    fn test_stale_id_does_not_alias_reused_slot() {
        let mut pool = SolidPool::with_capacity(1);
        let old = pool.init_exact("1").unwrap();
        assert!(pool.free(old));
        let new = pool.init_exact("2").unwrap();
        assert_eq!(old.index(), new.index());
        assert_ne!(old, new);
        assert_eq!(pool.get(old), None);
        assert_eq!(pool.get(new).map(|v| v.known_digits()), Some("2"));
        assert!(!pool.free(old));
        assert!(pool.stats().stale_accesses >= 1);
    }

    #[test]
    fn test_pool_arithmetic_borrows_operands() {
        let mut pool = SolidPool::with_capacity(8);
        let a = pool.init_exact("123456789").unwrap();
        let b = pool.init_exact("987654321").unwrap();
        let product = pool.multiply(a, b).unwrap();
        assert_eq!(
            pool.get(product).map(|v| v.known_digits()),
            Some("121932631112635269")
        );
        assert_eq!(pool.ref_count(a), Some(1));
        assert_eq!(pool.ref_count(product), Some(1));

        let sum = pool.add(a, b).unwrap();
        let back = pool.subtract(sum, b).unwrap();
        assert_eq!(pool.get(back), pool.get(a));

        let quotient = pool.divide(a, b).unwrap();
        assert_eq!(pool.get(quotient).map(|v| v.barrier()), Some(Barrier::Computational));

        let two = pool.init_exact("2").unwrap();
        let square = pool.power(b, two).unwrap();
        assert_eq!(
            pool.get(square).map(|v| v.known_digits()),
            Some("975461057789971041")
        );
    }

    #[test]
    fn test_arithmetic_on_stale_operand_fails() {
        let mut pool = SolidPool::with_capacity(4);
        let a = pool.init_exact("1").unwrap();
        let b = pool.init_exact("2").unwrap();
        pool.free(b);
        assert!(matches!(
            pool.add(a, b),
            Err(SolidError::InvalidOperand { .. })
        ));
    }

    #[test]
    fn test_recovery_strategies() {
        let mut pool = SolidPool::with_capacity(4);
        let one = pool.init_exact("1").unwrap();
        let zero = pool.init_exact("0").unwrap();
        let undefined = pool.divide(one, zero).unwrap();
        assert!(pool.get(undefined).unwrap().is_undefined());

        let shared = pool.recover(undefined, RecoveryStrategy::Propagate).unwrap();
        assert_eq!(shared, undefined);
        assert_eq!(pool.ref_count(undefined), Some(2));

        let replaced = pool.recover(undefined, RecoveryStrategy::UseOne).unwrap();
        assert_ne!(replaced, undefined);
        assert_eq!(pool.get(replaced), Some(&SolidNumber::exact("1")));
    }

    #[test]
    fn test_init_from_ast() {
        let mut pool = SolidPool::with_capacity(2);
        let source = "0.5...(t:10^3|800/1000)...{*}";
        let literal = AstSolidLiteral {
            known_offset: 0,
            known_len: 3,
            barrier: 't',
            gap_magnitude: 1000,
            confidence: 800,
            terminal_offset: 0,
            terminal_len: 0,
            terminal_kind: TerminalKind::Superposition,
        };
        let id = pool.init_from_ast(&literal, source).unwrap();
        assert_eq!(pool.get(id).map(|v| v.to_debug_string()).as_deref(), Some(source));
    }

    #[test]
    fn test_init_with_gap_and_stats() {
        let mut pool = SolidPool::with_capacity(2);
        let id = pool
            .init_with_gap(
                "2.71",
                Barrier::Temporal,
                GapMagnitude::from_exponent(4),
                Confidence::new(640),
                Terminal::Digits("828".into()),
            )
            .unwrap();
        assert_eq!(
            pool.get(id).map(|v| v.to_debug_string()).as_deref(),
            Some("2.71...(t:10^4|640/1000)...828")
        );
        pool.free(id);
        let stats = pool.stats();
        assert_eq!(stats.total_allocations, 1);
        assert_eq!(stats.total_frees, 1);
        assert_eq!(stats.peak_live, 1);
    }
}
