//! Error type shared by the world, the shape builders and the asset descriptors.
//!
//! Most variants describe caller bugs (a ribbon with one point, render data on an
//! entity without a mesh). Malformed descriptors are the exception: the lenient
//! loaders log them and fall back to empty data, the `try_` loaders return
//! [`PocketsError::Descriptor`].

use thiserror::Error;

use crate::api::types::EntityId;

#[derive(Debug, Error)]
pub enum PocketsError {
    /// A shape builder received fewer points than it needs.
    #[error("{shape} needs at least {required} points, got {actual}")]
    InsufficientPoints {
        shape: &'static str,
        required: usize,
        actual: usize,
    },

    /// A line builder received two coincident endpoints.
    #[error("{shape} endpoints coincide; segment has no direction")]
    DegenerateSegment { shape: &'static str },

    /// An entity is missing a component the operation depends on.
    #[error("entity {entity:?} has no {component} component")]
    MissingComponent {
        entity: EntityId,
        component: &'static str,
    },

    /// The entity was despawned (or never existed in this world).
    #[error("entity {0:?} is not alive")]
    StaleEntity(EntityId),

    /// Parenting would make a locus its own ancestor.
    #[error("parenting {child:?} under {parent:?} would create a cycle")]
    HierarchyCycle { child: EntityId, parent: EntityId },

    #[error("unknown animation '{0}'")]
    UnknownAnimation(String),

    #[error("malformed descriptor: {0}")]
    Descriptor(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PocketsError>;
