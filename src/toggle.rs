// filepath: src/toggle.rs
//! Menu visibility toggles delivered from outside the touch path
//!
//! A toggle request only flips an atomic flag, which makes it safe to issue
//! from a signal handler. The render loop drains the flag once per tick and
//! applies it to the locked overlay state.

use std::str::FromStr;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use log::info;
use nix::sys::signal::{sigaction, SaFlags, SigAction, SigHandler, SigSet, Signal};

static SIGNAL_TOGGLE: AtomicBool = AtomicBool::new(false);
static SHUTDOWN_REQUESTED: AtomicBool = AtomicBool::new(false);

extern "C" fn on_toggle_signal(_: nix::libc::c_int) {
    SIGNAL_TOGGLE.fetch_xor(true, Ordering::AcqRel);
}

extern "C" fn on_shutdown_signal(_: nix::libc::c_int) {
    SHUTDOWN_REQUESTED.store(true, Ordering::Release);
}

#[derive(Clone)]
enum Flag {
    Owned(Arc<AtomicBool>),
    Static(&'static AtomicBool),
}

impl Flag {
    fn get(&self) -> &AtomicBool {
        match self {
            Self::Owned(flag) => flag,
            Self::Static(flag) => flag,
        }
    }
}

/// Pending visibility flip; two requests before a drain cancel out
#[derive(Clone)]
pub struct ToggleSwitch {
    pending: Flag,
}

impl Default for ToggleSwitch {
    fn default() -> Self {
        Self::new()
    }
}

impl ToggleSwitch {
    pub fn new() -> Self {
        Self {
            pending: Flag::Owned(Arc::new(AtomicBool::new(false))),
        }
    }

    pub fn request(&self) {
        self.pending.get().fetch_xor(true, Ordering::AcqRel);
    }

    /// Returns whether an odd number of requests arrived since the last call
    pub fn take(&self) -> bool {
        self.pending.get().swap(false, Ordering::AcqRel)
    }
}

fn install(signal: Signal, handler: extern "C" fn(nix::libc::c_int)) -> nix::Result<()> {
    let action = SigAction::new(
        SigHandler::Handler(handler),
        SaFlags::SA_RESTART,
        SigSet::empty(),
    );
    // SAFETY: the handlers only touch lock-free atomics.
    unsafe { sigaction(signal, &action) }?;
    Ok(())
}

/// Route `signal_name` (e.g. "SIGUSR1") to a toggle switch
pub fn install_toggle_handler(signal_name: &str) -> nix::Result<ToggleSwitch> {
    let signal = Signal::from_str(signal_name)?;
    install(signal, on_toggle_signal)?;
    info!("Menu toggle bound to {signal}");
    Ok(ToggleSwitch {
        pending: Flag::Static(&SIGNAL_TOGGLE),
    })
}

/// Set by SIGINT or SIGTERM once `install_shutdown_handler` has run
#[derive(Clone, Copy)]
pub struct ShutdownFlag(&'static AtomicBool);

impl ShutdownFlag {
    pub fn requested(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

pub fn install_shutdown_handler() -> nix::Result<ShutdownFlag> {
    install(Signal::SIGINT, on_shutdown_signal)?;
    install(Signal::SIGTERM, on_shutdown_signal)?;
    Ok(ShutdownFlag(&SHUTDOWN_REQUESTED))
}
