//! Scene contents loaded from OBJ files

pub mod mesh;
pub mod scene;
pub mod vertex;

pub use mesh::{DrawMesh, Mesh};
pub use scene::{Scene, SceneError};
pub use vertex::Vertex3D;
