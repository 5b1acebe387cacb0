//! Offset Capture
//!
//! Measures, once, how far the target's current pose is from the pose the
//! mirror node would give it, and stores that delta on the target as three
//! keyable compound attributes. The combiners add (or multiply) the delta
//! back in, so binding does not make the target jump.

use glam::DVec3;

use crate::errors::Result;
use crate::scene::{Attribute, NodeHandle, Scene};
use crate::settings::RotateOffsetMode;
use crate::symmetry::binding::{OFFSET_ROTATE, OFFSET_SCALE, OFFSET_TRANSLATE};

/// Static translate / rotate / scale delta captured at bind time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OffsetTriple {
    /// Added to the mirrored translate.
    pub translate: DVec3,
    /// Added to the mirrored rotate (Euler degrees).
    pub rotate: DVec3,
    /// Multiplied into the mirrored scale.
    pub scale: DVec3,
}

impl Default for OffsetTriple {
    fn default() -> Self {
        Self {
            translate: DVec3::ZERO,
            rotate: DVec3::ZERO,
            scale: DVec3::ONE,
        }
    }
}

impl OffsetTriple {
    /// Samples the current pose.
    ///
    /// - translate: target world position minus the mirror's `constraintTranslate`
    /// - rotate: target world Euler minus source world Euler (or minus the
    ///   mirror's `constraintRotate` in [`RotateOffsetMode::Mirrored`])
    /// - scale: target world scale divided by source world scale
    pub fn capture(
        scene: &Scene,
        source: NodeHandle,
        target: NodeHandle,
        mirror: NodeHandle,
        mode: RotateOffsetMode,
    ) -> Result<Self> {
        let target_pose = scene.world_pose(target)?;
        let constrained = scene.get_vec3(mirror, "constraintTranslate")?;

        let target_euler = scene.world_rotation(target)?;
        let reference = match mode {
            RotateOffsetMode::SourceWorld => scene.world_rotation(source)?,
            RotateOffsetMode::Mirrored => scene.get_vec3(mirror, "constraintRotate")?,
        };

        let offsets = Self {
            translate: target_pose.translation - constrained,
            rotate: target_euler - reference,
            scale: target_pose.scale / scene.world_scale(source)?,
        };
        log::debug!(
            "Captured offsets for '{}': t={:?} r={:?} s={:?}",
            scene.display_name(target),
            offsets.translate,
            offsets.rotate,
            offsets.scale
        );
        Ok(offsets)
    }

    /// Adds the three offset attributes to `target`.
    pub fn persist(&self, scene: &mut Scene, target: NodeHandle) -> Result<()> {
        for (name, value) in self.entries() {
            scene.add_attr(target, Attribute::new(name, value).keyable().compound_xyz())?;
        }
        Ok(())
    }

    /// Reads back persisted offsets, if all three attributes are present.
    #[must_use]
    pub fn read(scene: &Scene, target: NodeHandle) -> Option<Self> {
        Some(Self {
            translate: scene.get_vec3(target, OFFSET_TRANSLATE).ok()?,
            rotate: scene.get_vec3(target, OFFSET_ROTATE).ok()?,
            scale: scene.get_vec3(target, OFFSET_SCALE).ok()?,
        })
    }

    fn entries(&self) -> [(&'static str, DVec3); 3] {
        [
            (OFFSET_TRANSLATE, self.translate),
            (OFFSET_ROTATE, self.rotate),
            (OFFSET_SCALE, self.scale),
        ]
    }
}
