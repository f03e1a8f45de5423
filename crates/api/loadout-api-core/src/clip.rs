//! Animation-clip descriptors.
//!
//! The compiler never samples animation data; it only needs each clip's name
//! and the set of properties it animates, so a clip is described by its
//! bindings alone. The owner taxonomy exists to split "movement" bindings
//! (transform and skeletal rig) from everything else.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Clip {
    pub name: String,
    #[serde(default)]
    pub bindings: Vec<PropertyBinding>,
}

impl Clip {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bindings: Vec::new(),
        }
    }

    pub fn with_binding(mut self, owner: PropertyOwner, property: impl Into<String>) -> Self {
        self.bindings.push(PropertyBinding {
            owner,
            property: property.into(),
            object: None,
        });
        self
    }
}

/// One animated property in a clip.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PropertyBinding {
    pub owner: PropertyOwner,
    pub property: String,
    /// Scene path of the object owning the property, when the clip targets a
    /// specific object rather than the clip's own root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object: Option<String>,
}

/// The component type that owns an animated property.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyOwner {
    Transform,
    /// Skeletal rig (humanoid muscles and bones).
    Skeleton,
    GameObject,
    Renderer,
    Material,
    Other(String),
}

impl PropertyOwner {
    /// Transform and skeletal bindings are "movement"; a movement-only clip
    /// may touch nothing else, and a toggle clip may touch nothing here.
    pub fn is_movement(&self) -> bool {
        matches!(self, PropertyOwner::Transform | PropertyOwner::Skeleton)
    }

    pub fn label(&self) -> &str {
        match self {
            PropertyOwner::Transform => "Transform",
            PropertyOwner::Skeleton => "Skeleton",
            PropertyOwner::GameObject => "GameObject",
            PropertyOwner::Renderer => "Renderer",
            PropertyOwner::Material => "Material",
            PropertyOwner::Other(name) => name,
        }
    }
}
