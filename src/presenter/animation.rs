//! Door swing state machine.
//!
//! `progress` is the door's openness in `[0, 1]`: opening raises it, closing
//! lowers it. A toggle mid-swing flips direction and continues from the
//! current value, so the pose never jumps.

use std::f64::consts::FRAC_PI_2;
use std::time::Duration;

use serde::Serialize;

use crate::geom::{Transform, Vec3};
use crate::model::DimensionParameters;

/// Default swing time.
pub const DOOR_SWING: Duration = Duration::from_millis(1000);

/// State machine: Closed → Opening → Open → Closing → Closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DoorPhase {
    #[default]
    Closed,
    Opening,
    Open,
    Closing,
}

impl DoorPhase {
    #[inline]
    #[must_use]
    pub fn is_animating(self) -> bool {
        matches!(self, Self::Opening | Self::Closing)
    }

    /// Where the door is headed (or rests).
    #[must_use]
    pub fn is_open_target(self) -> bool {
        matches!(self, Self::Opening | Self::Open)
    }
}

/// Quadratic ease-in-out.
#[must_use]
pub fn ease_in_out(p: f64) -> f64 {
    let p = p.clamp(0.0, 1.0);
    if p < 0.5 {
        2.0 * p * p
    } else {
        1.0 - (-2.0 * p + 2.0).powi(2) / 2.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DoorAnimation {
    phase: DoorPhase,
    progress: f64,
    duration: Duration,
}

impl Default for DoorAnimation {
    fn default() -> Self {
        Self::new(DOOR_SWING)
    }
}

impl DoorAnimation {
    #[must_use]
    pub fn new(duration: Duration) -> Self {
        Self {
            phase: DoorPhase::Closed,
            progress: 0.0,
            duration,
        }
    }

    #[must_use]
    pub fn phase(&self) -> DoorPhase {
        self.phase
    }

    #[must_use]
    pub fn progress(&self) -> f64 {
        self.progress
    }

    #[must_use]
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Flips the target. Mid-swing this reverses from the current progress.
    pub fn toggle(&mut self) {
        self.phase = if self.phase.is_open_target() {
            DoorPhase::Closing
        } else {
            DoorPhase::Opening
        };
    }

    /// Advances by `dt`. Returns true while the door is still moving.
    pub fn advance(&mut self, dt: Duration) -> bool {
        let step = if self.duration.is_zero() {
            1.0
        } else {
            dt.as_secs_f64() / self.duration.as_secs_f64()
        };

        match self.phase {
            DoorPhase::Opening => {
                self.progress = (self.progress + step).min(1.0);
                if self.progress >= 1.0 {
                    self.phase = DoorPhase::Open;
                }
            }
            DoorPhase::Closing => {
                self.progress = (self.progress - step).max(0.0);
                if self.progress <= 0.0 {
                    self.phase = DoorPhase::Closed;
                }
            }
            DoorPhase::Closed | DoorPhase::Open => {}
        }
        self.phase.is_animating()
    }

    /// Jumps to the closed rest state.
    pub fn reset(&mut self) {
        self.phase = DoorPhase::Closed;
        self.progress = 0.0;
    }

    #[must_use]
    pub fn pose(&self, params: &DimensionParameters) -> DoorPose {
        DoorPose::at(params, self.progress)
    }
}

/// Door placement for one eased progress value.
///
/// The door turns about its own centre from 0 to -90° while the centre
/// slides from the opening's middle to the hinge side (`x = -w/2 + t`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DoorPose {
    pub eased: f64,
    pub rotation_y: f64,
    pub center: Vec3,
    closed_center: Vec3,
}

impl DoorPose {
    #[must_use]
    pub fn at(params: &DimensionParameters, progress: f64) -> Self {
        let (w, h, d, t) = (
            params.width,
            params.height,
            params.depth,
            params.panel_thickness,
        );
        let eased = ease_in_out(progress);
        let closed_center = Vec3::new(0.0, h / 2.0, d / 2.0 - t / 2.0);
        let open_center = Vec3::new(-w / 2.0 + t, h / 2.0, d / 2.0 - t / 2.0);
        Self {
            eased,
            rotation_y: -FRAC_PI_2 * eased,
            center: closed_center.lerp(open_center, eased),
            closed_center,
        }
    }

    /// Rigid motion carrying the door (and its handle) from the closed pose.
    #[must_use]
    pub fn motion(&self) -> Transform {
        Transform::translate(-self.closed_center)
            .then(Transform::rotate_y(self.rotation_y))
            .then(Transform::translate(self.center))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: Duration = Duration::from_millis(16);

    #[test]
    fn easing_hits_endpoints_and_midpoint() {
        assert_eq!(ease_in_out(0.0), 0.0);
        assert_eq!(ease_in_out(0.5), 0.5);
        assert_eq!(ease_in_out(1.0), 1.0);
        assert!((ease_in_out(0.25) - 0.125).abs() < 1e-12);
        assert!((ease_in_out(0.75) - 0.875).abs() < 1e-12);
    }

    #[test]
    fn full_swing_takes_the_configured_duration() {
        let mut anim = DoorAnimation::default();
        anim.toggle();
        assert_eq!(anim.phase(), DoorPhase::Opening);
        assert!(anim.advance(Duration::from_millis(500)));
        assert!((anim.progress() - 0.5).abs() < 1e-12);
        assert!(!anim.advance(Duration::from_millis(500)));
        assert_eq!(anim.phase(), DoorPhase::Open);
        assert_eq!(anim.progress(), 1.0);
        // resting states ignore time
        assert!(!anim.advance(Duration::from_secs(3)));
        assert_eq!(anim.progress(), 1.0);
    }

    #[test]
    fn toggle_mid_opening_reverses_without_jump() {
        let mut anim = DoorAnimation::default();
        anim.toggle();
        anim.advance(Duration::from_millis(300));
        assert!((anim.progress() - 0.3).abs() < 1e-12);

        anim.toggle();
        assert_eq!(anim.phase(), DoorPhase::Closing);
        assert!((anim.progress() - 0.3).abs() < 1e-12);

        let mut last = anim.progress();
        while anim.advance(FRAME) {
            assert!(anim.progress() < last);
            assert!(last - anim.progress() <= 0.016 + 1e-12);
            last = anim.progress();
        }
        assert_eq!(anim.phase(), DoorPhase::Closed);
        assert_eq!(anim.progress(), 0.0);
    }

    #[test]
    fn zero_duration_completes_in_one_step() {
        let mut anim = DoorAnimation::new(Duration::ZERO);
        anim.toggle();
        assert!(!anim.advance(Duration::ZERO));
        assert_eq!(anim.phase(), DoorPhase::Open);
    }

    #[test]
    fn open_pose_slides_to_hinge_and_turns() {
        let params = DimensionParameters::new(20.0, 30.0, 20.0, 0.75);
        let closed = DoorPose::at(&params, 0.0);
        assert_eq!(closed.rotation_y, 0.0);
        let p = closed.motion().apply_point(Vec3::new(7.25, 15.0, 10.5));
        assert!((p - Vec3::new(7.25, 15.0, 10.5)).length() < 1e-12);

        let open = DoorPose::at(&params, 1.0);
        assert!((open.rotation_y + FRAC_PI_2).abs() < 1e-12);
        assert!((open.center - Vec3::new(-9.25, 15.0, 9.625)).length() < 1e-12);
        assert!((open.motion().apply_point(closed.center) - open.center).length() < 1e-12);
    }
}
