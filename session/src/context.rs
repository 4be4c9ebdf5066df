//! Per-session identity and the move processing lock.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chess::PieceColor;

/// Identity of the game this client is playing, fixed for the session.
#[derive(Debug)]
pub struct SessionContext {
    game_id: String,
    local_color: PieceColor,
    lock: ProcessingLock,
}

impl SessionContext {
    pub fn new(game_id: impl Into<String>, local_color: PieceColor) -> Self {
        Self {
            game_id: game_id.into(),
            local_color,
            lock: ProcessingLock::default(),
        }
    }

    pub fn game_id(&self) -> &str {
        &self.game_id
    }

    pub fn local_color(&self) -> PieceColor {
        self.local_color
    }

    pub fn lock(&self) -> &ProcessingLock {
        &self.lock
    }
}

/// True while a move is in flight. At most one holder at a time.
///
/// The only way to set it is [`ProcessingLock::try_acquire`]; the returned
/// guard clears it when dropped.
#[derive(Debug, Clone, Default)]
pub struct ProcessingLock {
    held: Arc<AtomicBool>,
}

impl ProcessingLock {
    pub fn is_held(&self) -> bool {
        self.held.load(Ordering::Acquire)
    }

    pub fn try_acquire(&self) -> Option<InFlightGuard> {
        self.held
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlightGuard {
                held: self.held.clone(),
            })
    }
}

/// Proof that the processing lock is held.
#[derive(Debug)]
pub struct InFlightGuard {
    held: Arc<AtomicBool>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.held.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lock_is_exclusive() {
        let lock = ProcessingLock::default();
        assert!(!lock.is_held());

        let guard = lock.try_acquire().expect("free lock");
        assert!(lock.is_held());
        assert!(lock.try_acquire().is_none());

        drop(guard);
        assert!(!lock.is_held());
        assert!(lock.try_acquire().is_some());
    }

    #[test]
    fn test_guard_released_on_early_return() {
        fn fails(lock: &ProcessingLock) -> Result<(), ()> {
            let _guard = lock.try_acquire().ok_or(())?;
            Err(())
        }

        let lock = ProcessingLock::default();
        assert!(fails(&lock).is_err());
        assert!(!lock.is_held());
    }

    #[test]
    fn test_context_accessors() {
        let ctx = SessionContext::new("g1", PieceColor::Black);
        assert_eq!(ctx.game_id(), "g1");
        assert_eq!(ctx.local_color(), PieceColor::Black);
        assert!(!ctx.lock().is_held());
    }
}
