//! Asset loading/parsers: OBJ geometry, MTL materials, skybox face images.

pub mod error;
pub mod material;
pub mod mesh;
pub mod mtl;
pub mod obj;
pub mod texture;

pub use error::AssetError;
pub use material::{Material, MaterialTable};
pub use mesh::{MeshData, VertexRef};
pub use obj::ObjModel;
