// src/scene/redraw.rs

bitflags::bitflags! {
    /// Rendering work owed after a mutation. Sub-steps of one operation OR
    /// their flags together; the caller consumes the result once.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct RedrawFlags: u32 {
        /// The visible frame is stale.
        const REDRAW         = 1 << 0;
        /// The picking buffer must be regenerated.
        const REDRAW_PICKING = 1 << 1;
    }
}

impl RedrawFlags {
    /// Flags owed by any structural list change.
    pub fn structural() -> Self {
        RedrawFlags::REDRAW | RedrawFlags::REDRAW_PICKING
    }

    pub fn needs_redraw(&self) -> bool {
        self.contains(RedrawFlags::REDRAW)
    }

    pub fn needs_picking(&self) -> bool {
        self.contains(RedrawFlags::REDRAW_PICKING)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_combine() {
        let mut flags = RedrawFlags::empty();
        assert!(!flags.needs_redraw());
        flags |= RedrawFlags::REDRAW;
        flags |= RedrawFlags::REDRAW;
        assert!(flags.needs_redraw());
        assert!(!flags.needs_picking());
        flags |= RedrawFlags::REDRAW_PICKING;
        assert_eq!(flags, RedrawFlags::structural());
    }
}
