//! Vertical scroll synchronization across the four panes.
//!
//! A scroll on any surface records that surface's offset and moves the
//! coordinator to `Syncing`. Nothing else changes until `flush` runs on the
//! next idle tick, which applies the source's normalized fraction to the
//! other three surfaces and returns to `Idle`.

use super::types::Side;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Surface {
    GutterA,
    ContentA,
    GutterB,
    ContentB,
}

impl Surface {
    pub const ALL: [Surface; 4] = [
        Surface::GutterA,
        Surface::ContentA,
        Surface::GutterB,
        Surface::ContentB,
    ];

    fn index(self) -> usize {
        match self {
            Surface::GutterA => 0,
            Surface::ContentA => 1,
            Surface::GutterB => 2,
            Surface::ContentB => 3,
        }
    }

    pub fn side(self) -> Side {
        match self {
            Surface::GutterA | Surface::ContentA => Side::A,
            Surface::GutterB | Surface::ContentB => Side::B,
        }
    }

    pub fn content(side: Side) -> Surface {
        match side {
            Side::A => Surface::ContentA,
            Side::B => Surface::ContentB,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncState {
    #[default]
    Idle,
    Syncing,
}

#[derive(Debug, Clone, Copy, Default)]
struct Extent {
    total: usize,
    viewport: usize,
}

impl Extent {
    fn max_offset(self) -> usize {
        self.total.saturating_sub(self.viewport)
    }
}

#[derive(Debug, Clone, Copy)]
struct Broadcast {
    source: Surface,
    fraction: f64,
}

#[derive(Debug, Default)]
pub struct ScrollSync {
    offsets: [usize; 4],
    extents: [Extent; 4],
    horizontal: [usize; 2],
    state: SyncState,
    pending: Option<Broadcast>,
}

impl ScrollSync {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record how many rows a surface holds and how many fit on screen.
    /// Clamps the current offset if the content shrank.
    pub fn set_extent(&mut self, surface: Surface, total: usize, viewport: usize) {
        let i = surface.index();
        self.extents[i] = Extent { total, viewport };
        self.offsets[i] = self.offsets[i].min(self.extents[i].max_offset());
    }

    pub fn set_extent_all(&mut self, total: usize, viewport: usize) {
        for surface in Surface::ALL {
            self.set_extent(surface, total, viewport);
        }
    }

    /// Scroll one surface. The others follow on the next `flush`.
    pub fn scroll_to(&mut self, surface: Surface, offset: usize) {
        let i = surface.index();
        let offset = offset.min(self.extents[i].max_offset());
        self.offsets[i] = offset;

        // A newer scroll while syncing replaces the queued broadcast
        self.pending = Some(Broadcast {
            source: surface,
            fraction: self.fraction(surface),
        });
        self.state = SyncState::Syncing;
    }

    pub fn scroll_by(&mut self, surface: Surface, delta: isize) {
        let current = self.offsets[surface.index()];
        self.scroll_to(surface, current.saturating_add_signed(delta));
    }

    /// Bring the given row into view on `surface`, scrolling only if needed.
    pub fn reveal(&mut self, surface: Surface, row: usize) {
        let i = surface.index();
        let viewport = self.extents[i].viewport.max(1);
        let offset = self.offsets[i];
        if row < offset {
            self.scroll_to(surface, row);
        } else if row >= offset + viewport {
            self.scroll_to(surface, row + 1 - viewport);
        }
    }

    /// Apply the queued broadcast to the other three surfaces.
    /// Returns true if anything was applied.
    pub fn flush(&mut self) -> bool {
        let Some(broadcast) = self.pending.take() else {
            self.state = SyncState::Idle;
            return false;
        };

        for surface in Surface::ALL {
            if surface == broadcast.source {
                continue;
            }
            let i = surface.index();
            let max = self.extents[i].max_offset();
            self.offsets[i] = ((broadcast.fraction * max as f64).round() as usize).min(max);
        }

        tracing::debug!(
            source = ?broadcast.source,
            fraction = broadcast.fraction,
            "scroll sync flushed"
        );
        self.state = SyncState::Idle;
        true
    }

    pub fn offset(&self, surface: Surface) -> usize {
        self.offsets[surface.index()]
    }

    /// Normalized vertical position of a surface, 0.0 to 1.0.
    pub fn fraction(&self, surface: Surface) -> f64 {
        let i = surface.index();
        let max = self.extents[i].max_offset();
        if max == 0 {
            0.0
        } else {
            self.offsets[i] as f64 / max as f64
        }
    }

    pub fn state(&self) -> SyncState {
        self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == SyncState::Idle
    }

    /// Horizontal offsets are per content pane and never synchronized.
    pub fn scroll_horizontal(&mut self, side: Side, delta: isize) {
        let h = &mut self.horizontal[side.index()];
        *h = h.saturating_add_signed(delta);
    }

    pub fn horizontal(&self, side: Side) -> usize {
        self.horizontal[side.index()]
    }

    /// Back to the top with nothing pending, as after loading a new pair.
    pub fn reset(&mut self) {
        self.offsets = [0; 4];
        self.horizontal = [0; 2];
        self.pending = None;
        self.state = SyncState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn synced(total: usize, viewport: usize) -> ScrollSync {
        let mut sync = ScrollSync::new();
        sync.set_extent_all(total, viewport);
        sync
    }

    fn offsets(sync: &ScrollSync) -> Vec<usize> {
        Surface::ALL.iter().map(|s| sync.offset(*s)).collect()
    }

    #[test]
    fn test_scroll_defers_until_flush() {
        let mut sync = synced(100, 20);
        sync.scroll_to(Surface::ContentA, 30);

        assert_eq!(sync.state(), SyncState::Syncing);
        assert_eq!(offsets(&sync), vec![0, 30, 0, 0]);

        assert!(sync.flush());
        assert!(sync.is_idle());
        assert_eq!(offsets(&sync), vec![30, 30, 30, 30]);
    }

    #[test]
    fn test_any_surface_can_lead() {
        for source in Surface::ALL {
            let mut sync = synced(50, 10);
            sync.scroll_to(source, 17);
            sync.flush();
            assert_eq!(offsets(&sync), vec![17; 4], "source {:?}", source);
        }
    }

    #[test]
    fn test_latest_scroll_wins_while_syncing() {
        let mut sync = synced(100, 20);
        sync.scroll_to(Surface::ContentA, 10);
        sync.scroll_to(Surface::GutterB, 40);
        sync.flush();
        assert_eq!(sync.offset(Surface::ContentA), 40);
        assert_eq!(offsets(&sync), vec![40; 4]);
    }

    #[test]
    fn test_flush_without_pending_is_noop() {
        let mut sync = synced(100, 20);
        assert!(!sync.flush());
        assert!(sync.is_idle());
    }

    #[test]
    fn test_offset_clamped_to_content() {
        let mut sync = synced(30, 20);
        sync.scroll_to(Surface::ContentB, 500);
        sync.flush();
        assert_eq!(offsets(&sync), vec![10; 4]);
        assert_eq!(sync.fraction(Surface::GutterA), 1.0);
    }

    #[test]
    fn test_scroll_by_saturates_at_top() {
        let mut sync = synced(100, 20);
        sync.scroll_by(Surface::ContentA, -5);
        sync.flush();
        assert_eq!(offsets(&sync), vec![0; 4]);
    }

    #[test]
    fn test_short_content_never_scrolls() {
        let mut sync = synced(5, 20);
        sync.scroll_by(Surface::ContentA, 3);
        sync.flush();
        assert_eq!(offsets(&sync), vec![0; 4]);
        assert_eq!(sync.fraction(Surface::ContentA), 0.0);
    }

    #[test]
    fn test_fraction_maps_between_extents() {
        let mut sync = ScrollSync::new();
        sync.set_extent(Surface::ContentA, 120, 20);
        sync.set_extent(Surface::GutterA, 120, 20);
        sync.set_extent(Surface::ContentB, 60, 10);
        sync.set_extent(Surface::GutterB, 60, 10);

        sync.scroll_to(Surface::ContentA, 50);
        sync.flush();
        assert_eq!(sync.offset(Surface::ContentB), 25);
        assert_eq!(sync.offset(Surface::GutterB), 25);
    }

    #[test]
    fn test_reveal_scrolls_only_when_needed() {
        let mut sync = synced(100, 10);
        sync.reveal(Surface::ContentA, 5);
        assert!(sync.is_idle());

        sync.reveal(Surface::ContentA, 42);
        sync.flush();
        assert_eq!(offsets(&sync), vec![33; 4]);

        sync.reveal(Surface::ContentB, 2);
        sync.flush();
        assert_eq!(offsets(&sync), vec![2; 4]);
    }

    #[test]
    fn test_horizontal_is_independent() {
        let mut sync = synced(100, 10);
        sync.scroll_horizontal(Side::A, 8);
        sync.scroll_horizontal(Side::B, -3);
        sync.flush();
        assert_eq!(sync.horizontal(Side::A), 8);
        assert_eq!(sync.horizontal(Side::B), 0);
        assert_eq!(offsets(&sync), vec![0; 4]);
    }

    #[test]
    fn test_shrinking_content_clamps_offsets() {
        let mut sync = synced(100, 10);
        sync.scroll_to(Surface::ContentA, 80);
        sync.flush();
        sync.set_extent_all(40, 10);
        assert_eq!(offsets(&sync), vec![30; 4]);
    }
}
