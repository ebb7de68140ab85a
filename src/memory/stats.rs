//! Value store statistics

/// Counters for a `SolidPool`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Fixed number of slots
    pub capacity: usize,
    /// Total successful allocations
    pub total_allocations: u64,
    /// Total slots released, explicitly or by the last `dec_ref`
    pub total_frees: u64,
    /// Values currently stored
    pub live: usize,
    /// Highest `live` ever observed
    pub peak_live: usize,
    /// Allocation attempts rejected because every slot was taken
    pub exhaustions: u64,
    /// Lookups with an id whose slot was freed or reused
    pub stale_accesses: u64,
}

impl PoolStats {
    /// Fraction of slots in use
    pub fn utilization(&self) -> f64 {
        if self.capacity == 0 {
            0.0
        } else {
            self.live as f64 / self.capacity as f64
        }
    }

    /// Fraction of slots ever used at once
    pub fn peak_utilization(&self) -> f64 {
        if self.capacity == 0 {
            0.0
        } else {
            self.peak_live as f64 / self.capacity as f64
        }
    }

    pub(crate) fn record_alloc(&mut self) {
        self.total_allocations += 1;
        self.live += 1;
        self.peak_live = self.peak_live.max(self.live);
    }

    pub(crate) fn record_free(&mut self) {
        self.total_frees += 1;
        self.live = self.live.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utilization() {
        let mut stats = PoolStats {
            capacity: 4,
            ..PoolStats::default()
        };
        stats.record_alloc();
        stats.record_alloc();
        stats.record_free();
        assert_eq!(stats.live, 1);
        assert_eq!(stats.peak_live, 2);
        assert_eq!(stats.utilization(), 0.25);
        assert_eq!(stats.peak_utilization(), 0.5);
        assert_eq!(PoolStats::default().utilization(), 0.0);
    }
}
