/// The decoded scene graph of a G3D resource, with explicit ids instead of parent pointers.
pub mod highlevel_types;
/// Primitive assembly of kicked vertices.
pub mod kick;
/// basic types (e.g. mesh) to abstract away from both the asset format and the render backend.
pub mod types;
