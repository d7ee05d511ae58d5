//! # Animation Sampler
//!
//! Blends each entity between its previous and current transform.
//!
//! ## Timing
//!
//! ```text
//! sync            sync            sync
//!  |---- N frames ---|---- N frames ---|
//!  t=0      t=0.5    t=1=0
//! ```
//!
//! `t = frames_since_sync / N`, clamped to `[0, 1]`. A late sync holds the
//! entity at its current transform instead of overshooting.

use std::f32::consts::TAU;

use parkview_shared::{Mat4, Vec3, AGENT_RENDER_OFFSET, FRAMES_PER_SYNC, WHEEL_OFFSET};

use crate::entity::{Entity, EntityKind};

/// Computes blend fractions and sampled transforms.
#[derive(Clone, Copy, Debug)]
pub struct AnimationSampler {
    frames_per_sync: u32,
}

impl Default for AnimationSampler {
    fn default() -> Self {
        Self::new(FRAMES_PER_SYNC)
    }
}

impl AnimationSampler {
    /// Sampler for a sync every `frames_per_sync` frames (at least 1).
    #[must_use]
    pub fn new(frames_per_sync: u32) -> Self {
        Self {
            frames_per_sync: frames_per_sync.max(1),
        }
    }

    /// Frames between syncs.
    #[must_use]
    pub fn frames_per_sync(&self) -> u32 {
        self.frames_per_sync
    }

    /// Blend fraction for a frame counter.
    #[inline]
    #[must_use]
    pub fn fraction(&self, frames_since_sync: u32) -> f32 {
        (frames_since_sync as f32 / self.frames_per_sync as f32).clamp(0.0, 1.0)
    }

    /// Samples `entity` at blend fraction `t`.
    #[must_use]
    pub fn sample(&self, entity: &Entity, t: f32) -> SampledTransform {
        let t = t.clamp(0.0, 1.0);
        SampledTransform {
            kind: entity.kind,
            position: entity.previous_position.lerp(entity.position, t),
            rotation: entity.previous_rotation.lerp(entity.rotation, t),
            scale: entity.scale,
            wheel_spin: if entity.moved() { TAU * t } else { 0.0 },
        }
    }
}

/// An entity's transform for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SampledTransform {
    /// Entity kind
    pub kind: EntityKind,
    /// Interpolated position
    pub position: Vec3,
    /// Interpolated Euler rotation (radians)
    pub rotation: Vec3,
    /// Model scale
    pub scale: Vec3,
    /// Wheel rotation about local X, zero for stationary entities
    pub wheel_spin: f32,
}

impl SampledTransform {
    /// World-space anchor: agents ride slightly above the tile.
    #[inline]
    #[must_use]
    pub fn anchor(&self) -> Vec3 {
        if self.kind == EntityKind::Agent {
            self.position + AGENT_RENDER_OFFSET
        } else {
            self.position
        }
    }

    /// `translate · rotX · rotY · rotZ`, shared by the body and its wheels.
    fn oriented(&self) -> Mat4 {
        Mat4::translation(self.anchor())
            .rotate_x(self.rotation.x)
            .rotate_y(self.rotation.y)
            .rotate_z(self.rotation.z)
    }

    /// Model matrix: `translate · rotX · rotY · rotZ · scale`.
    #[must_use]
    pub fn model_matrix(&self) -> Mat4 {
        self.oriented().scale(self.scale)
    }

    /// Front and rear wheel matrices, offset along local Z and spun about
    /// local X.
    #[must_use]
    pub fn wheel_matrices(&self) -> [Mat4; 2] {
        let body = self.oriented();
        [WHEEL_OFFSET, -WHEEL_OFFSET].map(|offset| {
            body.translate(offset)
                .rotate_x(self.wheel_spin)
                .scale(self.scale)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parkview_shared::EntityId;
    use std::f32::consts::{FRAC_PI_2, FRAC_PI_4};

    fn moving_agent() -> Entity {
        let mut e = Entity::at_rest(EntityId::from("7"), EntityKind::Agent, Vec3::ZERO, Vec3::ZERO);
        e.position = Vec3::new(5.0, 0.0, 0.0);
        e.rotation = Vec3::new(0.0, FRAC_PI_2, 0.0);
        e
    }

    #[test]
    fn test_fraction_clamps() {
        let sampler = AnimationSampler::new(30);
        assert_eq!(sampler.fraction(0), 0.0);
        assert_eq!(sampler.fraction(15), 0.5);
        assert_eq!(sampler.fraction(30), 1.0);
        assert_eq!(sampler.fraction(45), 1.0);
        assert_eq!(AnimationSampler::new(0).frames_per_sync(), 1);
    }

    #[test]
    fn test_boundaries_are_exact() {
        let sampler = AnimationSampler::default();
        let mut e = moving_agent();
        e.previous_position = Vec3::new(0.1, 0.7, -3.3);
        e.position = Vec3::new(1.9, 0.2, 8.1);

        let start = sampler.sample(&e, 0.0);
        assert_eq!(start.position, e.previous_position);
        assert_eq!(start.rotation, e.previous_rotation);

        let end = sampler.sample(&e, 1.0);
        assert_eq!(end.position, e.position);
        assert_eq!(end.rotation, e.rotation);
    }

    #[test]
    fn test_halfway_position_and_yaw() {
        let s = AnimationSampler::default().sample(&moving_agent(), 0.5);
        assert_eq!(s.position, Vec3::new(2.5, 0.0, 0.0));
        assert!((s.rotation.y - FRAC_PI_4).abs() < 1e-6);
        assert!((s.wheel_spin - std::f32::consts::PI).abs() < 1e-6);
    }

    #[test]
    fn test_stationary_wheels_do_not_spin() {
        let mut e = moving_agent();
        e.previous_position = e.position;
        let s = AnimationSampler::default().sample(&e, 0.5);
        assert_eq!(s.wheel_spin, 0.0);
    }

    #[test]
    fn test_model_matrix_applies_agent_offset() {
        let s = AnimationSampler::default().sample(&moving_agent(), 1.0);
        let origin = s.model_matrix().transform_point(Vec3::ZERO);
        assert!((origin - Vec3::new(5.0, 0.25, 0.0)).length() < 1e-6);
    }

    #[test]
    fn test_wheels_sit_either_side_of_body() {
        let mut e = moving_agent();
        e.rotation = Vec3::ZERO;
        e.previous_rotation = Vec3::ZERO;
        let s = AnimationSampler::default().sample(&e, 1.0);

        let [front, rear] = s.wheel_matrices();
        let f = front.transform_point(Vec3::ZERO);
        let r = rear.transform_point(Vec3::ZERO);
        assert!((f - Vec3::new(5.0, 0.25, 0.3)).length() < 1e-6);
        assert!((r - Vec3::new(5.0, 0.25, -0.3)).length() < 1e-6);
    }

    #[test]
    fn test_static_entity_is_identity() {
        let tile = Entity::at_rest(
            EntityId::from("t"),
            EntityKind::Road,
            Vec3::new(2.0, 0.0, 3.0),
            Vec3::ZERO,
        );
        let sampler = AnimationSampler::default();
        for t in [0.0, 0.3, 1.0] {
            let s = sampler.sample(&tile, t);
            assert_eq!(s.position, tile.position);
            assert_eq!(s.anchor(), tile.position);
            assert_eq!(s.wheel_spin, 0.0);
        }
    }
}
