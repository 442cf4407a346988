use std::sync::{Mutex, MutexGuard, TryLockError};

use super::types::{ContamType, MAX_FLANK_LEN};

const SPIN_FIRST: u32 = 1000;
const SPIN_RETRY: u32 = 100;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeCounters {
    /// Times this type was checked against a read.
    pub num_checks: u64,
    pub hit_tot: u64,
    /// Indexed by overlap length; empty for the vector type.
    pub hit_dist: Vec<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContamCounters {
    pub hit_tot: u64,
    /// Indexed by overlap length; empty for vector contaminants.
    pub hit_dist: Vec<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatsCounters {
    /// Indexed by `ContamType::index()`.
    pub types: [TypeCounters; 5],
    /// Indexed by contaminant id - 1.
    pub contams: Vec<ContamCounters>,
}

/// Hit/check counters shared by all threads querying one index.
///
/// Only counter updates take the lock; index traversal never does.
#[derive(Debug, Default)]
pub struct ContamStats {
    inner: Mutex<StatsCounters>,
}

impl ContamStats {
    /// `flank_ids[i]` tells whether contaminant id `i + 1` is a flank.
    pub fn new(flank_ids: &[bool]) -> Self {
        let mut counters = StatsCounters::default();
        for t in ContamType::FLANK_TYPES {
            counters.types[t.index()].hit_dist = vec![0; MAX_FLANK_LEN + 1];
        }
        counters.contams = flank_ids
            .iter()
            .map(|&is_flank| ContamCounters {
                hit_tot: 0,
                hit_dist: if is_flank { vec![0; MAX_FLANK_LEN + 1] } else { Vec::new() },
            })
            .collect();
        Self { inner: Mutex::new(counters) }
    }

    /// Spin on `try_lock`, yielding the thread once the spin budget is spent.
    fn acquire(&self) -> MutexGuard<'_, StatsCounters> {
        let mut spins = SPIN_FIRST;
        loop {
            match self.inner.try_lock() {
                Ok(guard) => return guard,
                // counters stay consistent even if a holder panicked
                Err(TryLockError::Poisoned(p)) => return p.into_inner(),
                Err(TryLockError::WouldBlock) => {
                    spins -= 1;
                    if spins == 0 {
                        std::thread::yield_now();
                        spins = SPIN_RETRY;
                    } else {
                        std::hint::spin_loop();
                    }
                }
            }
        }
    }

    pub fn record_check(&self, t: ContamType) {
        self.acquire().types[t.index()].num_checks += 1;
    }

    pub fn record_flank_hit(&self, t: ContamType, contam_id: u32, overlap: usize) {
        let mut s = self.acquire();
        let ty = &mut s.types[t.index()];
        ty.hit_tot += 1;
        if let Some(c) = ty.hit_dist.get_mut(overlap) {
            *c += 1;
        }
        if let Some(c) = s.contams.get_mut(contam_id as usize - 1) {
            c.hit_tot += 1;
            if let Some(d) = c.hit_dist.get_mut(overlap) {
                *d += 1;
            }
        }
    }

    pub fn record_vector_hit(&self, contam_id: u32) {
        let mut s = self.acquire();
        s.types[ContamType::Vector.index()].hit_tot += 1;
        if let Some(c) = s.contams.get_mut(contam_id as usize - 1) {
            c.hit_tot += 1;
        }
    }

    pub fn num_checks(&self, t: ContamType) -> u64 {
        self.acquire().types[t.index()].num_checks
    }

    pub fn type_hits(&self, t: ContamType) -> u64 {
        self.acquire().types[t.index()].hit_tot
    }

    pub fn type_dist(&self, t: ContamType) -> Vec<u64> {
        self.acquire().types[t.index()].hit_dist.clone()
    }

    /// Hit counters for one contaminant; `None` for an unknown id.
    pub fn contam_counts(&self, contam_id: u32) -> Option<ContamCounters> {
        let idx = (contam_id as usize).checked_sub(1)?;
        self.acquire().contams.get(idx).cloned()
    }

    pub fn snapshot(&self) -> StatsCounters {
        self.acquire().clone()
    }
}
