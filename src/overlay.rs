use crate::channels::{AnimationError, Channel, SpringParams, TimingSpec};

/// Per-row fade length for the staggered list entrances/exits.
const ROW_FADE_SECS: f32 = 0.3;

/// Lifecycle of the slide-up song list. `Showing` and `Hiding` exist to run
/// the enter/exit animation; the list is mounted in every phase but
/// `Hidden`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayPhase {
    Hidden,
    Showing,
    Visible,
    Hiding,
}

/// Motion parameters for the overlay transition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayMotion {
    pub spring: SpringParams,
    /// Opacity fade duration, seconds.
    pub fade_secs: f32,
    /// Vertical travel of the panel when hidden.
    pub travel: f32,
    /// Enter delay increment per row index.
    pub row_enter_stagger_secs: f32,
    /// Exit delay increment per row index.
    pub row_exit_stagger_secs: f32,
}

impl Default for OverlayMotion {
    fn default() -> Self {
        Self {
            spring: SpringParams::default(),
            fade_secs: 0.2,
            travel: 100.0,
            row_enter_stagger_secs: 0.1,
            row_exit_stagger_secs: 0.01,
        }
    }
}

/// The song-list overlay: visibility state machine plus the offset/opacity
/// channels it gates and the per-row staggered fades.
#[derive(Debug, Clone)]
pub struct SongListOverlay {
    phase: OverlayPhase,
    motion: OverlayMotion,
    offset: Channel,
    opacity: Channel,
    rows: Vec<Channel>,
}

/// Rejects degenerate motion configs by exercising the real channel
/// construction paths once, so a bad config fails here rather than on the
/// first toggle.
fn validate_motion(motion: &OverlayMotion) -> Result<(), AnimationError> {
    if !motion.travel.is_finite() {
        return Err(AnimationError::invalid("overlay travel must be finite"));
    }
    let mut probe = Channel::resting(0.0);
    probe.retarget_timing(1.0, TimingSpec::new(motion.fade_secs))?;
    probe.retarget_timing(
        1.0,
        TimingSpec::new(ROW_FADE_SECS)
            .with_delay(motion.row_enter_stagger_secs.max(motion.row_exit_stagger_secs)),
    )?;
    probe.retarget_spring(0.0, motion.spring)?;
    Ok(())
}

impl SongListOverlay {
    pub fn new(row_count: usize, motion: OverlayMotion) -> Result<Self, AnimationError> {
        validate_motion(&motion)?;

        Ok(Self {
            phase: OverlayPhase::Hidden,
            motion,
            offset: Channel::resting(motion.travel),
            opacity: Channel::resting(0.0),
            rows: vec![Channel::resting(0.0); row_count],
        })
    }

    /// Swap in new motion parameters; they apply from the next transition.
    pub fn set_motion(&mut self, motion: OverlayMotion) -> Result<(), AnimationError> {
        validate_motion(&motion)?;
        self.motion = motion;
        Ok(())
    }

    pub fn phase(&self) -> OverlayPhase {
        self.phase
    }

    /// The externally observed visibility boolean.
    pub fn is_open(&self) -> bool {
        matches!(self.phase, OverlayPhase::Showing | OverlayPhase::Visible)
    }

    /// Whether the list renders at all (true while the exit animation runs).
    pub fn is_mounted(&self) -> bool {
        self.phase != OverlayPhase::Hidden
    }

    pub fn offset(&self) -> f32 {
        self.offset.value()
    }

    pub fn opacity(&self) -> f32 {
        self.opacity.value().clamp(0.0, 1.0)
    }

    pub fn row_opacity(&self, index: usize) -> f32 {
        self.rows
            .get(index)
            .map(|row| row.value().clamp(0.0, 1.0))
            .unwrap_or(0.0)
    }

    pub fn toggle(&mut self) {
        match self.phase {
            OverlayPhase::Hidden | OverlayPhase::Hiding => self.open(),
            OverlayPhase::Showing | OverlayPhase::Visible => self.close(),
        }
    }

    pub fn open(&mut self) {
        if self.is_open() {
            return;
        }
        self.phase = OverlayPhase::Showing;
        self.offset
            .retarget_spring(0.0, self.motion.spring)
            .expect("motion validated at construction");
        self.opacity
            .retarget_timing(1.0, TimingSpec::new(self.motion.fade_secs))
            .expect("motion validated at construction");
        for (index, row) in self.rows.iter_mut().enumerate() {
            row.snap_to(0.0);
            row.retarget_timing(
                1.0,
                TimingSpec::new(ROW_FADE_SECS)
                    .with_delay(index as f32 * self.motion.row_enter_stagger_secs),
            )
            .expect("motion validated at construction");
        }
    }

    pub fn close(&mut self) {
        if !self.is_open() {
            return;
        }
        self.phase = OverlayPhase::Hiding;
        self.offset
            .retarget_spring(self.motion.travel, self.motion.spring)
            .expect("motion validated at construction");
        self.opacity
            .retarget_timing(0.0, TimingSpec::new(self.motion.fade_secs))
            .expect("motion validated at construction");
        for (index, row) in self.rows.iter_mut().enumerate() {
            row.retarget_timing(
                0.0,
                TimingSpec::new(ROW_FADE_SECS)
                    .with_delay(index as f32 * self.motion.row_exit_stagger_secs),
            )
            .expect("motion validated at construction");
        }
    }

    /// Advance the overlay's channels and promote the transient phases once
    /// both the spring and the fade have finished, whichever is later.
    pub fn advance(&mut self, dt: f32) {
        self.offset.advance(dt);
        self.opacity.advance(dt);
        for row in &mut self.rows {
            row.advance(dt);
        }
        let settled = self.offset.is_settled() && self.opacity.is_settled();
        match self.phase {
            OverlayPhase::Showing if settled => self.phase = OverlayPhase::Visible,
            OverlayPhase::Hiding if settled => {
                self.phase = OverlayPhase::Hidden;
                for row in &mut self.rows {
                    row.snap_to(0.0);
                }
            }
            _ => {}
        }
    }

    /// True while any of the overlay's channels is still moving.
    pub fn is_animating(&self) -> bool {
        matches!(self.phase, OverlayPhase::Showing | OverlayPhase::Hiding)
            || self.rows.iter().any(|row| !row.is_settled())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settle(overlay: &mut SongListOverlay) {
        for _ in 0..1200 {
            overlay.advance(1.0 / 60.0);
        }
    }

    #[test]
    fn starts_hidden_at_resting_values() {
        let overlay = SongListOverlay::new(10, OverlayMotion::default()).unwrap();
        assert_eq!(overlay.phase(), OverlayPhase::Hidden);
        assert!(!overlay.is_open());
        assert!(!overlay.is_mounted());
        assert_eq!(overlay.offset(), 100.0);
        assert_eq!(overlay.opacity(), 0.0);
    }

    #[test]
    fn open_runs_enter_animation_then_becomes_visible() {
        let mut overlay = SongListOverlay::new(10, OverlayMotion::default()).unwrap();
        overlay.toggle();
        assert_eq!(overlay.phase(), OverlayPhase::Showing);
        assert!(overlay.is_open());
        assert!(overlay.is_mounted());
        settle(&mut overlay);
        assert_eq!(overlay.phase(), OverlayPhase::Visible);
        assert_eq!(overlay.offset(), 0.0);
        assert_eq!(overlay.opacity(), 1.0);
    }

    #[test]
    fn close_keeps_list_mounted_until_settled() {
        let mut overlay = SongListOverlay::new(10, OverlayMotion::default()).unwrap();
        overlay.toggle();
        settle(&mut overlay);
        overlay.toggle();
        assert_eq!(overlay.phase(), OverlayPhase::Hiding);
        assert!(!overlay.is_open());
        assert!(overlay.is_mounted());
        settle(&mut overlay);
        assert_eq!(overlay.phase(), OverlayPhase::Hidden);
        assert!(!overlay.is_mounted());
        assert_eq!(overlay.offset(), 100.0);
        assert_eq!(overlay.opacity(), 0.0);
    }

    #[test]
    fn reopening_mid_exit_reverses_the_motion() {
        let mut overlay = SongListOverlay::new(10, OverlayMotion::default()).unwrap();
        overlay.toggle();
        settle(&mut overlay);
        overlay.toggle();
        overlay.advance(0.05);
        let mid_exit = overlay.offset();
        assert!(mid_exit > 0.0);
        overlay.toggle();
        assert_eq!(overlay.phase(), OverlayPhase::Showing);
        settle(&mut overlay);
        assert_eq!(overlay.phase(), OverlayPhase::Visible);
        assert_eq!(overlay.offset(), 0.0);
    }

    #[test]
    fn rows_fade_in_by_index_order() {
        let mut overlay = SongListOverlay::new(10, OverlayMotion::default()).unwrap();
        overlay.open();
        // Row 0 has no delay; row 5 waits 500 ms.
        overlay.advance(0.2);
        assert!(overlay.row_opacity(0) > 0.0);
        assert_eq!(overlay.row_opacity(5), 0.0);
        overlay.advance(0.4);
        assert!(overlay.row_opacity(0) >= overlay.row_opacity(5));
        assert!(overlay.row_opacity(5) > 0.0);
    }

    #[test]
    fn out_of_range_row_is_transparent() {
        let overlay = SongListOverlay::new(3, OverlayMotion::default()).unwrap();
        assert_eq!(overlay.row_opacity(7), 0.0);
    }

    #[test]
    fn degenerate_motion_is_rejected_at_construction() {
        let motion = OverlayMotion {
            fade_secs: 0.0,
            ..OverlayMotion::default()
        };
        assert!(SongListOverlay::new(10, motion).is_err());
        let motion = OverlayMotion {
            spring: SpringParams {
                stiffness: -1.0,
                ..SpringParams::default()
            },
            ..OverlayMotion::default()
        };
        assert!(SongListOverlay::new(10, motion).is_err());
    }
}
