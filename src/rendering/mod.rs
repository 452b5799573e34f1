pub mod common;
pub mod importer;
pub mod mesh_library;
