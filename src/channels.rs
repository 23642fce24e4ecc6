use thiserror::Error;

/// Durations shorter than this are clamped up instead of rejected.
pub const MIN_DURATION_SECS: f32 = 0.001;

/// A spring counts as settled once both displacement and velocity drop
/// below this threshold.
const SETTLE_EPSILON: f32 = 0.01;

/// Spring integration substep cap. Keeps the integration stable when a
/// frame takes unusually long (window drag, background tab).
const MAX_SPRING_STEP_SECS: f32 = 1.0 / 120.0;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnimationError {
    #[error("invalid animation config: {reason}")]
    InvalidAnimationConfig { reason: String },
}

impl AnimationError {
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidAnimationConfig {
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
    Linear,
    #[default]
    InOutQuad,
}

impl Easing {
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::InOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
        }
    }
}

/// What a timing ramp does when it reaches its end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Repeat {
    /// Run once and hold the end value.
    #[default]
    None,
    /// Snap back to the start and run again, forever.
    Restart,
    /// Reverse direction at each extreme, forever.
    Reverse,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimingSpec {
    pub duration_secs: f32,
    pub easing: Easing,
    pub delay_secs: f32,
    pub repeat: Repeat,
}

impl TimingSpec {
    pub fn new(duration_secs: f32) -> Self {
        Self {
            duration_secs,
            easing: Easing::default(),
            delay_secs: 0.0,
            repeat: Repeat::None,
        }
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    pub fn with_delay(mut self, delay_secs: f32) -> Self {
        self.delay_secs = delay_secs;
        self
    }

    pub fn with_repeat(mut self, repeat: Repeat) -> Self {
        self.repeat = repeat;
        self
    }

    fn validated(mut self) -> Result<Self, AnimationError> {
        if !self.duration_secs.is_finite() || self.duration_secs <= 0.0 {
            return Err(AnimationError::invalid(format!(
                "timing duration must be positive and finite, got {}",
                self.duration_secs
            )));
        }
        if !self.delay_secs.is_finite() || self.delay_secs < 0.0 {
            return Err(AnimationError::invalid(format!(
                "timing delay must be non-negative and finite, got {}",
                self.delay_secs
            )));
        }
        self.duration_secs = self.duration_secs.max(MIN_DURATION_SECS);
        Ok(self)
    }
}

/// Spring interpolation parameters. The defaults match the slide-up
/// panel's motion (critically damped for its travel distance).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpringParams {
    pub damping: f32,
    pub stiffness: f32,
    pub mass: f32,
}

impl Default for SpringParams {
    fn default() -> Self {
        Self {
            damping: 10.0,
            stiffness: 100.0,
            mass: 1.0,
        }
    }
}

impl SpringParams {
    fn validated(self) -> Result<Self, AnimationError> {
        for (name, value) in [
            ("damping", self.damping),
            ("stiffness", self.stiffness),
            ("mass", self.mass),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(AnimationError::invalid(format!(
                    "spring {name} must be positive and finite, got {value}"
                )));
            }
        }
        Ok(self)
    }
}

#[derive(Debug, Clone)]
struct Timing {
    from: f32,
    to: f32,
    spec: TimingSpec,
    elapsed_secs: f32,
}

impl Timing {
    fn sample(&self) -> f32 {
        let active = self.elapsed_secs - self.spec.delay_secs;
        if active <= 0.0 {
            return self.from;
        }
        let phase = active / self.spec.duration_secs;
        let t = match self.spec.repeat {
            Repeat::None => phase.min(1.0),
            Repeat::Restart => phase.fract(),
            Repeat::Reverse => {
                let cycle = phase.rem_euclid(2.0);
                if cycle <= 1.0 {
                    cycle
                } else {
                    2.0 - cycle
                }
            }
        };
        self.from + (self.to - self.from) * self.spec.easing.apply(t)
    }

    fn finished(&self) -> bool {
        self.spec.repeat == Repeat::None
            && self.elapsed_secs >= self.spec.delay_secs + self.spec.duration_secs
    }
}

#[derive(Debug, Clone)]
struct SpringMotion {
    target: f32,
    velocity: f32,
    params: SpringParams,
}

#[derive(Debug, Clone)]
enum Driver {
    Idle,
    Timing(Timing),
    Spring(SpringMotion),
}

/// A single named time-varying value: a current sample plus an in-flight
/// interpolation descriptor. Channels carry presentation scalars only and
/// are advanced by the host frame clock.
#[derive(Debug, Clone)]
pub struct Channel {
    value: f32,
    driver: Driver,
}

impl Channel {
    /// Channel at rest; stays put until retargeted.
    pub fn resting(value: f32) -> Self {
        Self {
            value,
            driver: Driver::Idle,
        }
    }

    /// Channel running a timing ramp from `from` to `to`.
    pub fn timing(from: f32, to: f32, spec: TimingSpec) -> Result<Self, AnimationError> {
        let mut channel = Self::resting(from);
        channel.retarget_timing(to, spec)?;
        Ok(channel)
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn target(&self) -> f32 {
        match &self.driver {
            Driver::Idle => self.value,
            Driver::Timing(timing) => timing.to,
            Driver::Spring(spring) => spring.target,
        }
    }

    /// True once the in-flight interpolation has run to completion.
    /// Repeating ramps never settle.
    pub fn is_settled(&self) -> bool {
        match &self.driver {
            Driver::Idle => true,
            Driver::Timing(timing) => timing.finished(),
            Driver::Spring(_) => false,
        }
    }

    /// Start a timing ramp from the current sample toward `to`.
    pub fn retarget_timing(&mut self, to: f32, spec: TimingSpec) -> Result<(), AnimationError> {
        if !to.is_finite() || !self.value.is_finite() {
            return Err(AnimationError::invalid("timing endpoints must be finite"));
        }
        self.driver = Driver::Timing(Timing {
            from: self.value,
            to,
            spec: spec.validated()?,
            elapsed_secs: 0.0,
        });
        Ok(())
    }

    /// Start a spring toward `to`. Velocity carries over from a previous
    /// spring so retargeting mid-flight stays smooth.
    pub fn retarget_spring(&mut self, to: f32, params: SpringParams) -> Result<(), AnimationError> {
        if !to.is_finite() {
            return Err(AnimationError::invalid("spring target must be finite"));
        }
        let velocity = match &self.driver {
            Driver::Spring(spring) => spring.velocity,
            _ => 0.0,
        };
        self.driver = Driver::Spring(SpringMotion {
            target: to,
            velocity,
            params: params.validated()?,
        });
        Ok(())
    }

    /// Jump to `value` with no animation.
    pub fn snap_to(&mut self, value: f32) {
        self.value = value;
        self.driver = Driver::Idle;
    }

    /// Advance the channel by `dt` seconds of wall clock.
    pub fn advance(&mut self, dt: f32) {
        if dt <= 0.0 || !dt.is_finite() {
            return;
        }
        match &mut self.driver {
            Driver::Idle => {}
            Driver::Timing(timing) => {
                timing.elapsed_secs += dt;
                self.value = timing.sample();
                if timing.finished() {
                    self.value = timing.to;
                    self.driver = Driver::Idle;
                }
            }
            Driver::Spring(spring) => {
                let mut remaining = dt;
                while remaining > 0.0 {
                    let h = remaining.min(MAX_SPRING_STEP_SECS);
                    remaining -= h;
                    let displacement = self.value - spring.target;
                    let accel = (-spring.params.stiffness * displacement
                        - spring.params.damping * spring.velocity)
                        / spring.params.mass;
                    spring.velocity += accel * h;
                    self.value += spring.velocity * h;
                }
                if (self.value - spring.target).abs() < SETTLE_EPSILON
                    && spring.velocity.abs() < SETTLE_EPSILON
                {
                    self.value = spring.target;
                    self.driver = Driver::Idle;
                }
            }
        }
    }
}

/// The breathing blob: a radius ramp that restarts from zero each cycle
/// (deliberately not a ping-pong) paired with its mirrored ordinate.
#[derive(Debug, Clone)]
pub struct BlobPulse {
    size: f32,
    radius: Channel,
}

impl BlobPulse {
    pub fn new(size: f32, cycle_secs: f32) -> Result<Self, AnimationError> {
        if !size.is_finite() || size <= 0.0 {
            return Err(AnimationError::invalid(format!(
                "blob size must be positive and finite, got {size}"
            )));
        }
        let radius = Channel::timing(
            0.0,
            size * 0.33,
            TimingSpec::new(cycle_secs).with_repeat(Repeat::Restart),
        )?;
        Ok(Self { size, radius })
    }

    pub fn advance(&mut self, dt: f32) {
        self.radius.advance(dt);
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn max_radius(&self) -> f32 {
        self.size * 0.33
    }

    pub fn radius(&self) -> f32 {
        self.radius.value()
    }

    /// Mirrored ordinate for the paired circle. Pure function of the
    /// radius sample, never stored.
    pub fn complement(&self) -> f32 {
        self.size - self.radius.value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timing_reaches_target_and_settles() {
        let mut channel =
            Channel::timing(0.0, 10.0, TimingSpec::new(1.0).with_easing(Easing::Linear)).unwrap();
        channel.advance(0.5);
        assert!((channel.value() - 5.0).abs() < 1e-4);
        assert!(!channel.is_settled());
        channel.advance(0.6);
        assert_eq!(channel.value(), 10.0);
        assert!(channel.is_settled());
    }

    #[test]
    fn timing_honors_delay() {
        let mut channel = Channel::timing(
            0.0,
            1.0,
            TimingSpec::new(0.2)
                .with_easing(Easing::Linear)
                .with_delay(0.5),
        )
        .unwrap();
        channel.advance(0.4);
        assert_eq!(channel.value(), 0.0);
        channel.advance(0.2);
        assert!(channel.value() > 0.0);
    }

    #[test]
    fn restart_repeat_snaps_back() {
        let mut channel = Channel::timing(
            0.0,
            10.0,
            TimingSpec::new(1.0)
                .with_easing(Easing::Linear)
                .with_repeat(Repeat::Restart),
        )
        .unwrap();
        channel.advance(0.9);
        let near_end = channel.value();
        channel.advance(0.2);
        assert!(channel.value() < near_end, "ramp restarts from the origin");
        assert!(!channel.is_settled(), "repeating ramps never settle");
    }

    #[test]
    fn reverse_repeat_ping_pongs() {
        let mut channel = Channel::timing(
            0.0,
            3.0,
            TimingSpec::new(1.0)
                .with_easing(Easing::Linear)
                .with_repeat(Repeat::Reverse),
        )
        .unwrap();
        // Midpoint of the forward half-cycle sits strictly between the
        // extremes.
        channel.advance(0.5);
        let mid = channel.value();
        assert!(mid > 0.0 && mid < 3.0);
        channel.advance(0.1);
        assert!(channel.value() > mid, "still moving toward the far extreme");
        // Into the reverse half-cycle.
        channel.advance(0.9);
        let coming_back = channel.value();
        assert!(coming_back < 3.0);
        channel.advance(0.1);
        assert!(channel.value() < coming_back, "moving back toward the origin");
    }

    #[test]
    fn spring_moves_toward_target_then_settles() {
        let mut channel = Channel::resting(100.0);
        channel.retarget_spring(0.0, SpringParams::default()).unwrap();
        channel.advance(0.1);
        assert!(channel.value() < 100.0);
        assert!(!channel.is_settled());
        for _ in 0..600 {
            channel.advance(1.0 / 60.0);
        }
        assert_eq!(channel.value(), 0.0);
        assert!(channel.is_settled());
    }

    #[test]
    fn spring_survives_long_frames() {
        let mut channel = Channel::resting(0.0);
        channel.retarget_spring(100.0, SpringParams::default()).unwrap();
        // A half-second hitch must not blow up the integration.
        channel.advance(0.5);
        assert!(channel.value().is_finite());
        assert!(channel.value() <= 150.0);
    }

    #[test]
    fn degenerate_configs_are_rejected() {
        assert!(Channel::timing(0.0, 1.0, TimingSpec::new(0.0)).is_err());
        assert!(Channel::timing(0.0, 1.0, TimingSpec::new(-2.0)).is_err());
        assert!(Channel::timing(0.0, 1.0, TimingSpec::new(f32::NAN)).is_err());
        let mut channel = Channel::resting(0.0);
        assert!(channel
            .retarget_spring(
                1.0,
                SpringParams {
                    damping: 0.0,
                    ..SpringParams::default()
                },
            )
            .is_err());
    }

    #[test]
    fn tiny_duration_is_clamped_not_rejected() {
        let spec = TimingSpec::new(1e-6).validated().unwrap();
        assert_eq!(spec.duration_secs, MIN_DURATION_SECS);
    }

    #[test]
    fn complement_mirrors_radius_every_frame() {
        let mut blob = BlobPulse::new(200.0, 5.0).unwrap();
        for _ in 0..600 {
            blob.advance(1.0 / 60.0);
            assert_eq!(blob.complement(), 200.0 - blob.radius());
            assert!(blob.radius() >= 0.0 && blob.radius() <= blob.max_radius() + 1e-3);
        }
    }
}
