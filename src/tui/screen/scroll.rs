//! Background scroll state with a reference-counted lock

/// Proof that a scroll lock is held. Give it back through
/// [`ScrollState::release`]; it cannot be cloned, so a lock is released at
/// most once.
#[derive(Debug)]
#[must_use = "a scroll lock stays held until the token is released"]
pub struct ScrollLockToken {
    _private: (),
}

#[derive(Debug, Default)]
pub struct ScrollState {
    offset: u16,
    holders: usize,
}

impl ScrollState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lock(&mut self) -> ScrollLockToken {
        self.holders += 1;
        ScrollLockToken { _private: () }
    }

    /// Scrolling comes back once the last holder releases
    pub fn release(&mut self, token: ScrollLockToken) {
        let ScrollLockToken { .. } = token;
        self.holders = self.holders.saturating_sub(1);
    }

    pub fn is_locked(&self) -> bool {
        self.holders > 0
    }

    pub fn holders(&self) -> usize {
        self.holders
    }

    pub fn offset(&self) -> u16 {
        self.offset
    }

    /// Move the offset by `delta` rows. Returns false while locked.
    pub fn scroll_by(&mut self, delta: i32) -> bool {
        if self.is_locked() {
            return false;
        }
        let next = (self.offset as i32 + delta).clamp(0, u16::MAX as i32);
        self.offset = next as u16;
        true
    }

    /// Keep the offset inside `0..=max` after content shrinks
    pub fn clamp_to(&mut self, max: u16) {
        self.offset = self.offset.min(max);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lock_blocks_scrolling() {
        let mut scroll = ScrollState::new();
        assert!(scroll.scroll_by(3));
        assert_eq!(scroll.offset(), 3);

        let token = scroll.lock();
        assert!(!scroll.scroll_by(1));
        assert_eq!(scroll.offset(), 3);

        scroll.release(token);
        assert!(scroll.scroll_by(-10));
        assert_eq!(scroll.offset(), 0);
    }

    #[test]
    fn test_nested_locks_release_on_last_holder() {
        let mut scroll = ScrollState::new();
        let outer = scroll.lock();
        let inner = scroll.lock();
        assert_eq!(scroll.holders(), 2);

        scroll.release(inner);
        assert!(scroll.is_locked());
        scroll.release(outer);
        assert!(!scroll.is_locked());
    }
}
