//! Last-fault slot.
//!
//! # Responsibilities
//! - Hold the most recent low-level fault of the current thread
//! - Populate it explicitly via `record`
//! - Stash panics seen by the hook until the caller knows they escaped
//!
//! # Design Decisions
//! - Thread-local: a request runs on one thread from arm to finish, so
//!   concurrent requests never observe each other's faults
//! - The hook chains to the previously installed hook

use std::any::Any;
use std::cell::RefCell;
use std::panic;
use std::sync::Once;
use std::thread::LocalKey;

/// A low-level failure that bypassed the error dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fault {
    /// Failure type (`panic`, `resource`, ...).
    pub kind: String,
    pub message: String,
    /// Source file reported by the runtime.
    pub file: String,
    pub line: u32,
}

impl Fault {
    pub fn new(kind: impl Into<String>, message: impl Into<String>, file: impl Into<String>, line: u32) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
            file: file.into(),
            line,
        }
    }
}

thread_local! {
    static LAST_FAULT: RefCell<Option<Fault>> = const { RefCell::new(None) };
    static PENDING_PANIC: RefCell<Option<Fault>> = const { RefCell::new(None) };
}

static HOOK: Once = Once::new();

type Slot = LocalKey<RefCell<Option<Fault>>>;

fn put(slot: &'static Slot, fault: Fault) {
    let _ = slot.try_with(|cell| {
        if let Ok(mut cell) = cell.try_borrow_mut() {
            *cell = Some(fault);
        }
    });
}

fn pull(slot: &'static Slot) -> Option<Fault> {
    slot.try_with(|cell| cell.try_borrow_mut().ok().and_then(|mut f| f.take()))
        .ok()
        .flatten()
}

/// Record `fault` as the current thread's last fault.
pub fn record(fault: Fault) {
    put(&LAST_FAULT, fault);
}

/// Peek at the last fault.
pub fn last() -> Option<Fault> {
    LAST_FAULT
        .try_with(|slot| slot.try_borrow().ok().and_then(|f| (*f).clone()))
        .ok()
        .flatten()
}

/// Remove and return the last fault.
pub fn take() -> Option<Fault> {
    pull(&LAST_FAULT)
}

/// Forget the last fault.
pub fn clear() {
    let _ = take();
}

/// Remove and return the most recent panic seen by the hook on this thread.
///
/// A panic only becomes a fault once the caller knows it escaped; panics
/// caught and recovered inside a handler stay here and are discarded.
pub fn take_panic() -> Option<Fault> {
    pull(&PENDING_PANIC)
}

/// Forget any panic seen by the hook on this thread.
pub fn discard_panic() {
    let _ = take_panic();
}

/// Text of a panic payload.
pub fn payload_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "<unknown panic>".to_string()
    }
}

/// Install (once per process) a panic hook that stashes every panic's
/// location and message in the panicking thread's pending slot.
pub fn install_panic_hook() {
    HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            let (file, line) = info
                .location()
                .map(|l| (l.file().to_string(), l.line()))
                .unwrap_or_default();
            put(&PENDING_PANIC, Fault::new("panic", payload_message(info.payload()), file, line));
            previous(info);
        }));
    });
}
