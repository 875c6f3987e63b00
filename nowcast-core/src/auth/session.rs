use std::sync::atomic::{AtomicBool, Ordering};

static GLOBAL_GATE: AuthSessionGate = AuthSessionGate::new();

/// Allows a single authorization browser session at a time.
///
/// The gate starts armed. [`acquire`](Self::acquire) consumes it and hands out
/// a guard; dropping the guard arms it again for the next login.
#[derive(Debug)]
pub struct AuthSessionGate {
    armed: AtomicBool,
}

impl AuthSessionGate {
    pub const fn new() -> Self {
        Self {
            armed: AtomicBool::new(true),
        }
    }

    /// Process-wide gate shared by every login flow of the application.
    pub fn global() -> &'static Self {
        &GLOBAL_GATE
    }

    pub fn acquire(&self) -> Option<SessionGuard<'_>> {
        self.armed
            .compare_exchange(true, false, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| SessionGuard { gate: self })
    }

    pub fn is_armed(&self) -> bool {
        self.armed.load(Ordering::Acquire)
    }
}

impl Default for AuthSessionGate {
    fn default() -> Self {
        Self::new()
    }
}

/// Held while a browser session is open.
#[derive(Debug)]
pub struct SessionGuard<'a> {
    gate: &'a AuthSessionGate,
}

impl Drop for SessionGuard<'_> {
    fn drop(&mut self) {
        self.gate.armed.store(true, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_session_is_refused_while_first_is_open() {
        let gate = AuthSessionGate::new();
        let first = gate.acquire();
        assert!(first.is_some());
        assert!(!gate.is_armed());
        assert!(gate.acquire().is_none());
    }

    #[test]
    fn dropping_guard_rearms() {
        let gate = AuthSessionGate::new();
        drop(gate.acquire());
        assert!(gate.is_armed());
        assert!(gate.acquire().is_some());
    }
}
