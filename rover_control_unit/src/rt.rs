//! Real-time setup for the acquisition thread.
//!
//! With the `rt` feature the calling thread's memory is locked, its stack
//! prefaulted, and it is pinned to one core under `SCHED_FIFO`. Without the
//! feature [`RtParams::apply`] succeeds without touching the thread.

use crate::error::ControlError;

/// Scheduling parameters for the acquisition thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RtParams {
    pub cpu_core: usize,
    pub priority: i32,
}

impl RtParams {
    /// Apply to the calling thread.
    pub fn apply(&self) -> Result<(), ControlError> {
        lock_memory()?;
        prefault_stack();
        pin_to_core(self.cpu_core)?;
        set_fifo(self.priority)
    }
}

/// Stack bytes touched up front.
#[cfg(feature = "rt")]
const PREFAULT_BYTES: usize = 256 * 1024;

#[cfg(feature = "rt")]
fn lock_memory() -> Result<(), ControlError> {
    use nix::sys::mman::{MlockallFlags, mlockall};
    mlockall(MlockallFlags::MCL_CURRENT | MlockallFlags::MCL_FUTURE)
        .map_err(|e| ControlError::RtSetup(format!("mlockall: {e}")))
}

#[cfg(feature = "rt")]
fn prefault_stack() {
    let mut buf = [0u8; PREFAULT_BYTES];
    for byte in buf.iter_mut() {
        // SAFETY: `byte` is an exclusive reference into `buf`.
        unsafe { core::ptr::write_volatile(byte, 0xFF) };
    }
    core::hint::black_box(&buf);
}

#[cfg(feature = "rt")]
fn pin_to_core(cpu: usize) -> Result<(), ControlError> {
    use nix::sched::{CpuSet, sched_setaffinity};
    use nix::unistd::Pid;

    let mut set = CpuSet::new();
    set.set(cpu)
        .map_err(|e| ControlError::RtSetup(format!("core {cpu}: {e}")))?;
    sched_setaffinity(Pid::from_raw(0), &set)
        .map_err(|e| ControlError::RtSetup(format!("sched_setaffinity: {e}")))
}

#[cfg(feature = "rt")]
fn set_fifo(priority: i32) -> Result<(), ControlError> {
    let param = libc::sched_param {
        sched_priority: priority,
    };
    // SAFETY: `param` outlives the call; pid 0 is the calling thread.
    if unsafe { libc::sched_setscheduler(0, libc::SCHED_FIFO, &param) } != 0 {
        let err = std::io::Error::last_os_error();
        return Err(ControlError::RtSetup(format!("SCHED_FIFO priority {priority}: {err}")));
    }
    Ok(())
}

#[cfg(not(feature = "rt"))]
fn lock_memory() -> Result<(), ControlError> {
    Ok(())
}

#[cfg(not(feature = "rt"))]
fn prefault_stack() {}

#[cfg(not(feature = "rt"))]
fn pin_to_core(_cpu: usize) -> Result<(), ControlError> {
    Ok(())
}

#[cfg(not(feature = "rt"))]
fn set_fifo(_priority: i32) -> Result<(), ControlError> {
    Ok(())
}
