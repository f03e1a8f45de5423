//! Compatibility checker: validates a clip's animated properties against the
//! binding whitelist before any generation begins.

use loadout_api_core::Clip;

use crate::error::{CompileError, Result};

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum BindingRestriction {
    /// The clip may only animate transform/skeletal properties.
    MovementOnly,
    /// The clip may animate anything except transform/skeletal properties.
    NoMovement,
}

/// Pure validation: fails on the first binding whose owner contradicts the
/// restriction, identifying the clip and the offending property.
pub fn check_clip(clip: &Clip, restriction: BindingRestriction) -> Result<()> {
    for binding in &clip.bindings {
        let movement = binding.owner.is_movement();
        let forbidden = match restriction {
            BindingRestriction::MovementOnly => !movement,
            BindingRestriction::NoMovement => movement,
        };
        if forbidden {
            return Err(CompileError::IncompatibleAnimation {
                clip: clip.name.clone(),
                owner: binding.owner.label().to_string(),
                property: binding.property.clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use loadout_api_core::PropertyOwner;

    #[test]
    fn empty_clip_is_vacuously_compatible() {
        let clip = Clip::new("empty");
        assert!(check_clip(&clip, BindingRestriction::MovementOnly).is_ok());
        assert!(check_clip(&clip, BindingRestriction::NoMovement).is_ok());
    }

    #[test]
    fn toggle_clip_rejects_transform_binding() {
        let clip = Clip::new("bad")
            .with_binding(PropertyOwner::GameObject, "is_active")
            .with_binding(PropertyOwner::Transform, "local_position.x");
        let err = check_clip(&clip, BindingRestriction::NoMovement).unwrap_err();
        match err {
            CompileError::IncompatibleAnimation {
                clip,
                owner,
                property,
            } => {
                assert_eq!(clip, "bad");
                assert_eq!(owner, "Transform");
                assert_eq!(property, "local_position.x");
            }
            other => panic!("expected IncompatibleAnimation, got {other:?}"),
        }
    }

    #[test]
    fn movement_clip_rejects_renderer_binding() {
        let clip = Clip::new("walk")
            .with_binding(PropertyOwner::Skeleton, "spine.rotation")
            .with_binding(PropertyOwner::Renderer, "enabled");
        assert!(matches!(
            check_clip(&clip, BindingRestriction::MovementOnly),
            Err(CompileError::IncompatibleAnimation { .. })
        ));
    }

    #[test]
    fn movement_clip_accepts_skeletal_bindings() {
        let clip = Clip::new("walk")
            .with_binding(PropertyOwner::Skeleton, "spine.rotation")
            .with_binding(PropertyOwner::Transform, "local_position.y");
        assert!(check_clip(&clip, BindingRestriction::MovementOnly).is_ok());
    }
}
