//! Best-effort CPU pinning for background workers.
//!
//! The solver's compute threads are usually pinned. The communication worker
//! should not compete with them, so by default it is moved onto whatever
//! online CPUs the solver thread is not allowed to run on.

use crate::PinError;

/// Pins the calling thread somewhere sensible.
///
/// Called once on each freshly spawned worker thread, before it polls. The
/// result is only logged; a failure never stops the worker.
pub trait CpuPinner: Send + Sync {
    /// Pin the current thread.
    fn pin_current_thread(&self) -> Result<(), PinError>;
}

/// Leaves threads unpinned.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPinning;

impl CpuPinner for NoPinning {
    fn pin_current_thread(&self) -> Result<(), PinError> {
        Ok(())
    }
}

/// Pins onto online CPUs outside a reserved set.
#[derive(Debug, Clone, Default)]
pub struct FreeCpuPinner {
    /// CPUs reserved for the caller, sorted.
    reserved: Vec<usize>,
}

impl FreeCpuPinner {
    /// Reserve the current thread's affinity set.
    ///
    /// If the affinity cannot be read nothing is reserved.
    pub fn capture() -> Self {
        Self::with_reserved(sys::current_affinity().unwrap_or_default())
    }

    /// Reserve an explicit set of CPUs.
    pub fn with_reserved(mut reserved: Vec<usize>) -> Self {
        reserved.sort_unstable();
        reserved.dedup();
        Self { reserved }
    }

    /// CPUs reserved for the caller.
    pub fn reserved(&self) -> &[usize] {
        &self.reserved
    }

    /// Online CPUs not in the reserved set.
    pub fn free_cpus(&self) -> Vec<usize> {
        free_cpus(&sys::online_cpus(), &self.reserved)
    }
}

impl CpuPinner for FreeCpuPinner {
    fn pin_current_thread(&self) -> Result<(), PinError> {
        let free = self.free_cpus();
        if free.is_empty() {
            return Err(PinError::NoFreeCpus {
                reserved: self.reserved.len(),
            });
        }
        sys::set_affinity(&free)
    }
}

fn free_cpus(online: &[usize], reserved: &[usize]) -> Vec<usize> {
    online
        .iter()
        .copied()
        .filter(|cpu| reserved.binary_search(cpu).is_err())
        .collect()
}

/// Parse a kernel CPU list such as `0-3,8,10-11`. Malformed entries are skipped.
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn parse_cpu_list(list: &str) -> Vec<usize> {
    list.trim()
        .split(',')
        .filter(|entry| !entry.is_empty())
        .flat_map(|entry| {
            let (lo, hi) = entry.split_once('-').unwrap_or((entry, entry));
            match (lo.trim().parse::<usize>(), hi.trim().parse::<usize>()) {
                (Ok(lo), Ok(hi)) if lo <= hi => lo..=hi,
                _ => 1..=0,
            }
        })
        .collect()
}

#[cfg(target_os = "linux")]
mod sys {
    use crate::PinError;
    use nix::sched::{sched_getaffinity, sched_setaffinity, CpuSet};
    use nix::unistd::Pid;
    use std::io;

    const ONLINE_CPUS: &str = "/sys/devices/system/cpu/online";

    pub(super) fn current_affinity() -> io::Result<Vec<usize>> {
        let set = sched_getaffinity(Pid::from_raw(0))?;
        Ok((0..CpuSet::count())
            .filter(|&cpu| set.is_set(cpu).unwrap_or(false))
            .collect())
    }

    /// CPUs the kernel reports online, which need not be contiguous.
    pub(super) fn online_cpus() -> Vec<usize> {
        match std::fs::read_to_string(ONLINE_CPUS) {
            Ok(list) => super::parse_cpu_list(&list),
            // No sysfs: offer every slot and let the kernel drop offline ones
            Err(_) => (0..CpuSet::count()).collect(),
        }
    }

    pub(super) fn set_affinity(cpus: &[usize]) -> Result<(), PinError> {
        let mut set = CpuSet::new();
        for &cpu in cpus.iter().filter(|&&cpu| cpu < CpuSet::count()) {
            set.set(cpu).map_err(|e| PinError::Affinity(e.into()))?;
        }
        sched_setaffinity(Pid::from_raw(0), &set).map_err(|e| PinError::Affinity(e.into()))
    }
}

#[cfg(not(target_os = "linux"))]
mod sys {
    use crate::PinError;
    use std::io;

    pub(super) fn current_affinity() -> io::Result<Vec<usize>> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "thread affinity is Linux-only",
        ))
    }

    pub(super) fn online_cpus() -> Vec<usize> {
        let count = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(0);
        (0..count).collect()
    }

    pub(super) fn set_affinity(_cpus: &[usize]) -> Result<(), PinError> {
        Err(PinError::Unsupported)
    }
}
