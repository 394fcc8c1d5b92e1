//! # Spring Physics Module
//!
//! Damped harmonic oscillator driving a single animated scalar (dot position,
//! pan offset, blend factor). Each spring owns its own clock and is advanced
//! once per frame by its owner.
//!
//! ## Integration
//! Semi-implicit Euler per tick:
//! ```text
//! a = (-k * (value - target) - d * velocity) / m
//! velocity += a * dt
//! value    += velocity * dt
//! ```
//! `dt` is capped at 64 ms so a stalled frame cannot blow the integrator up.
//!
//! ## Lifecycle
//! - `set_target`: start or retarget motion, keeping current velocity
//! - `set_value`: teleport, clear velocity, no further ticks
//! - `stop`: freeze where it is, no snap

use std::fmt;
use std::time::Instant;

/// Largest integration step in seconds (~15 fps)
const MAX_DT: f64 = 0.064;

/// Rest threshold for both displacement and velocity
const REST_THRESHOLD: f64 = 0.001;

/// Physical constants of a spring
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpringConfig {
    pub stiffness: f64,
    pub damping: f64,
    pub mass: f64,
}

impl SpringConfig {
    /// More bounce, default for interactions
    pub const EXPRESSIVE: SpringConfig = SpringConfig { stiffness: 300.0, damping: 20.0, mass: 1.0 };
    /// Less bounce
    pub const STANDARD: SpringConfig = SpringConfig { stiffness: 400.0, damping: 30.0, mass: 1.0 };
    /// Small elements like the scrub dot
    pub const FAST: SpringConfig = SpringConfig { stiffness: 500.0, damping: 25.0, mass: 0.8 };
    /// Page-sized transitions
    pub const SLOW: SpringConfig = SpringConfig { stiffness: 200.0, damping: 20.0, mass: 1.2 };
    /// Press feedback
    pub const SQUISH: SpringConfig = SpringConfig { stiffness: 600.0, damping: 15.0, mass: 0.5 };
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self::EXPRESSIVE
    }
}

/// Result of one integration step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpringStep {
    pub value: f64,
    /// True on the final tick, after the value snapped to the target
    pub completed: bool,
}

pub struct Spring {
    config: SpringConfig,
    value: f64,
    target: f64,
    velocity: f64,
    animating: bool,
    last_tick: Option<Instant>,
    on_update: Option<Box<dyn FnMut(f64)>>,
    on_complete: Option<Box<dyn FnMut()>>,
}

impl fmt::Debug for Spring {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Spring")
            .field("config", &self.config)
            .field("value", &self.value)
            .field("target", &self.target)
            .field("velocity", &self.velocity)
            .field("animating", &self.animating)
            .finish()
    }
}

impl Spring {
    pub fn new(config: SpringConfig, initial_value: f64) -> Self {
        Self {
            config,
            value: initial_value,
            target: initial_value,
            velocity: 0.0,
            animating: false,
            last_tick: None,
            on_update: None,
            on_complete: None,
        }
    }

    /// Called with the new value on every tick and on `set_value`
    pub fn with_on_update(mut self, callback: impl FnMut(f64) + 'static) -> Self {
        self.on_update = Some(Box::new(callback));
        self
    }

    /// Called once when the spring comes to rest at its target
    pub fn with_on_complete(mut self, callback: impl FnMut() + 'static) -> Self {
        self.on_complete = Some(Box::new(callback));
        self
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    pub fn is_animating(&self) -> bool {
        self.animating
    }

    /// Start (or retarget) motion toward `target`.
    ///
    /// Velocity is left untouched so a retarget mid-flight keeps its momentum.
    pub fn set_target(&mut self, target: f64) {
        self.target = target;

        if (self.value - target).abs() < REST_THRESHOLD && self.velocity.abs() < REST_THRESHOLD {
            return;
        }

        if !self.animating {
            self.animating = true;
            self.last_tick = None;
        }
    }

    /// Jump to `value` without animating
    pub fn set_value(&mut self, value: f64) {
        self.value = value;
        self.target = value;
        self.velocity = 0.0;
        self.animating = false;
        self.last_tick = None;
        if let Some(on_update) = self.on_update.as_mut() {
            on_update(value);
        }
    }

    /// Cancel any pending ticks, leaving value and velocity as they are
    pub fn stop(&mut self) {
        self.animating = false;
        self.last_tick = None;
    }

    /// Advance using wall-clock time since this spring's previous tick.
    ///
    /// The first tick after motion starts only establishes the time base.
    pub fn tick(&mut self, now: Instant) -> Option<SpringStep> {
        if !self.animating {
            return None;
        }
        let dt = match self.last_tick {
            Some(last) => now.saturating_duration_since(last).as_secs_f64(),
            None => 0.0,
        };
        self.last_tick = Some(now);
        self.step(dt)
    }

    /// Integrate one step of `dt` seconds. Returns `None` when at rest.
    pub fn step(&mut self, dt: f64) -> Option<SpringStep> {
        if !self.animating {
            return None;
        }
        let dt = dt.clamp(0.0, MAX_DT);

        let displacement = self.value - self.target;
        let spring_force = -self.config.stiffness * displacement;
        let damping_force = -self.config.damping * self.velocity;
        let acceleration = (spring_force + damping_force) / self.config.mass;

        self.velocity += acceleration * dt;
        self.value += self.velocity * dt;

        let completed =
            self.velocity.abs() < REST_THRESHOLD && displacement.abs() < REST_THRESHOLD;

        if completed {
            self.value = self.target;
            self.velocity = 0.0;
            self.animating = false;
            self.last_tick = None;
        }

        if let Some(on_update) = self.on_update.as_mut() {
            on_update(self.value);
        }
        if completed {
            if let Some(on_complete) = self.on_complete.as_mut() {
                on_complete();
            }
        }

        Some(SpringStep { value: self.value, completed })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;
    use std::time::Duration;

    const FRAME: f64 = 1.0 / 60.0;

    fn run_to_rest(spring: &mut Spring) -> usize {
        let mut ticks = 0;
        while spring.step(FRAME).is_some() {
            ticks += 1;
            assert!(ticks < 10_000, "spring never settled");
        }
        ticks
    }

    #[test]
    fn test_converges_to_target() {
        for config in [
            SpringConfig::EXPRESSIVE,
            SpringConfig::STANDARD,
            SpringConfig::FAST,
            SpringConfig::SLOW,
            SpringConfig::SQUISH,
        ] {
            let mut spring = Spring::new(config, 0.0);
            spring.set_target(150.0);
            let ticks = run_to_rest(&mut spring);
            assert!(ticks > 1);
            assert_eq!(spring.value(), 150.0);
            assert_eq!(spring.velocity(), 0.0);
            assert!(!spring.is_animating());
        }
    }

    #[test]
    fn test_no_ticks_after_rest() {
        let updates = Rc::new(Cell::new(0));
        let completions = Rc::new(Cell::new(0));
        let u = updates.clone();
        let c = completions.clone();
        let mut spring = Spring::new(SpringConfig::FAST, 206.0)
            .with_on_update(move |_| u.set(u.get() + 1))
            .with_on_complete(move || c.set(c.get() + 1));

        spring.set_target(50.0);
        let ticks = run_to_rest(&mut spring);
        assert_eq!(updates.get(), ticks);
        assert_eq!(completions.get(), 1);

        assert!(spring.step(FRAME).is_none());
        assert!(spring.tick(Instant::now()).is_none());
        assert_eq!(updates.get(), ticks);
    }

    #[test]
    fn test_retarget_preserves_velocity() {
        let mut spring = Spring::new(SpringConfig::EXPRESSIVE, 0.0);
        spring.set_target(100.0);
        for _ in 0..5 {
            spring.step(FRAME);
        }
        let velocity = spring.velocity();
        assert!(velocity > 0.0);

        spring.set_target(-100.0);
        assert_eq!(spring.velocity(), velocity);
        assert!(spring.is_animating());
    }

    #[test]
    fn test_set_value_fires_once_and_rests() {
        let updates = Rc::new(Cell::new(0));
        let u = updates.clone();
        let mut spring = Spring::new(SpringConfig::FAST, 0.0).with_on_update(move |_| u.set(u.get() + 1));
        spring.set_target(10.0);
        spring.step(FRAME);
        spring.set_value(42.0);
        let after_set = updates.get();

        assert_eq!(spring.value(), 42.0);
        assert_eq!(spring.target(), 42.0);
        assert_eq!(spring.velocity(), 0.0);
        assert!(spring.step(FRAME).is_none());
        assert_eq!(updates.get(), after_set);
    }

    #[test]
    fn test_stop_keeps_value() {
        let mut spring = Spring::new(SpringConfig::FAST, 0.0);
        spring.set_target(100.0);
        spring.step(FRAME);
        spring.step(FRAME);
        let value = spring.value();

        spring.stop();
        assert!(!spring.is_animating());
        assert_eq!(spring.value(), value);
        assert!(spring.step(FRAME).is_none());
    }

    #[test]
    fn test_target_at_rest_does_not_animate() {
        let mut spring = Spring::new(SpringConfig::FAST, 5.0);
        spring.set_target(5.0);
        assert!(!spring.is_animating());
    }

    #[test]
    fn test_dt_is_clamped() {
        let mut clamped = Spring::new(SpringConfig::FAST, 0.0);
        let mut reference = Spring::new(SpringConfig::FAST, 0.0);
        clamped.set_target(100.0);
        reference.set_target(100.0);

        clamped.step(5.0);
        reference.step(MAX_DT);
        assert_eq!(clamped.value(), reference.value());
    }

    #[test]
    fn test_tick_uses_own_clock() {
        let mut spring = Spring::new(SpringConfig::FAST, 0.0);
        spring.set_target(100.0);
        let start = Instant::now();

        let first = spring.tick(start).expect("animating");
        assert_eq!(first.value, 0.0);

        let second = spring.tick(start + Duration::from_millis(16)).expect("animating");
        assert!(second.value > 0.0);
    }
}
