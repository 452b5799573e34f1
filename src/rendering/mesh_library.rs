use std::collections::HashMap;
use std::sync::{LazyLock, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use kya_files::common::types::{Memory, Ptr};
use log::{error, info, trace};

use crate::MeshLibraryError;
use crate::io::common::loader::MeshLoadedDelegate;
use crate::rendering::common::highlevel_types::{G3d, Object, Strip, StripLocator, StripParent};
use crate::rendering::common::types::SimpleMesh;
use crate::rendering::importer::g3d_importer::{DecodedG3d, G3dImporter};
use crate::rendering::importer::strip_importer::StripImporter;

/// Name of the meshes of display list strips, which belong to no asset.
pub const TRANSIENT_MESH_NAME: &str = "None_0_0_0";

static MESH_LIBRARY: LazyLock<RwLock<MeshLibrary>> = LazyLock::new(|| RwLock::new(MeshLibrary::default()));

/// The process wide library. Decoding and rendering are expected to happen on one logical
/// thread, the lock merely serializes the odd access from elsewhere.
pub fn mesh_library() -> RwLockReadGuard<'static, MeshLibrary> {
    MESH_LIBRARY.read().unwrap_or_else(PoisonError::into_inner)
}

pub fn mesh_library_mut() -> RwLockWriteGuard<'static, MeshLibrary> {
    MESH_LIBRARY.write().unwrap_or_else(PoisonError::into_inner)
}

/// Where a cached strip handle resolves to.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum CachedStrip {
    Asset { mesh: usize, locator: StripLocator },
    /// The single strip of the handle's entry in the object cache.
    Transient,
}

/// A scene graph node handed over by the display list, `data` being the raw strip.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct DisplayNode {
    pub data: Ptr,
    pub flags: u32,
}

/// The render backend, as far as the mesh library is concerned.
pub trait MeshRenderer {
    fn render_mesh(&mut self, mesh: &SimpleMesh, flags: u32);
}

#[derive(Debug, Default)]
pub struct MeshLibrary {
    meshes: Vec<G3d>,
    strip_cache: HashMap<Ptr, CachedStrip>,
    object_cache: HashMap<Ptr, Object>,
}

impl MeshLibrary {
    /// Makes the process wide library decode every asset the loader announces.
    ///
    /// The listener takes [`mesh_library_mut`], so no guard of the process wide library may be
    /// held on the broadcasting thread, or the broadcast deadlocks.
    pub fn init(delegate: &mut MeshLoadedDelegate) {
        delegate.subscribe(|memory, manager, name| mesh_library_mut().add_mesh(memory, manager, name).map(|_| ()));
    }

    /// Decodes the asset managed by `manager` and registers it along with its strips.
    pub fn add_mesh(&mut self, memory: &Memory, manager: Ptr, name: &str) -> Result<&G3d, MeshLibraryError> {
        let DecodedG3d { g3d, cache_entries } = G3dImporter::import(memory, manager, name)?;

        let mesh = self.meshes.len();
        info!("Registering mesh {} with {} strips", name, cache_entries.len());
        for (handle, locator) in cache_entries {
            self.strip_cache.insert(handle, CachedStrip::Asset { mesh, locator });
        }

        self.meshes.push(g3d);
        Ok(&self.meshes[mesh])
    }

    pub fn find_strip(&self, handle: Ptr) -> Option<&Strip> {
        match self.strip_cache.get(&handle)? {
            CachedStrip::Asset { mesh, locator } => self.meshes.get(*mesh)?.strip(*locator),
            CachedStrip::Transient => self.object_cache.get(&handle)?.strips.first(),
        }
    }

    pub fn strip(&self, handle: Ptr) -> Result<&Strip, MeshLibraryError> {
        self.find_strip(handle)
            .ok_or(MeshLibraryError::StripNotFound { handle })
    }

    /// Looks through every decoded asset without consulting the cache. Display list strips are not covered.
    pub fn find_strip_by_scan(&self, handle: Ptr) -> Option<&Strip> {
        for mesh in &self.meshes {
            if let Some((index, strip)) = mesh
                .strips()
                .enumerate()
                .find(|(_, strip)| strip.record == handle)
            {
                info!("Found strip {} of mesh {}: {:?}", index, mesh.name, strip.parent);
                return Some(strip);
            }
        }

        info!("Strip {} not found", handle);
        None
    }

    /// Decodes the strip at `handle` again, replacing whatever has been cached for it before.
    /// Any strip previously returned for the handle is gone afterwards.
    pub fn cache_dlist_strip(&mut self, memory: &Memory, handle: Ptr) -> Result<&Strip, MeshLibraryError> {
        let (_, mesh) = StripImporter::create_mesh(memory, handle, TRANSIENT_MESH_NAME.to_string())?;
        let strip = Strip {
            record: handle,
            parent: StripParent::Object(None),
            mesh,
        };

        self.strip_cache.insert(handle, CachedStrip::Transient);
        let object = self.object_cache.entry(handle).or_insert_with(Object::transient);
        object.strips.clear();
        object.strips.push(strip);
        trace!("Cached display list strip {}", handle);

        Ok(&object.strips[0])
    }

    pub fn render_node<R: MeshRenderer>(&self, node: &DisplayNode, renderer: &mut R) -> Result<(), MeshLibraryError> {
        match self.find_strip(node.data) {
            Some(strip) => {
                renderer.render_mesh(&strip.mesh, node.flags);
                Ok(())
            }
            None => {
                error!("Strip {} not found or no simple mesh available for rendering", node.data);
                Err(MeshLibraryError::StripNotFound { handle: node.data })
            }
        }
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    pub fn meshes(&self) -> &[G3d] {
        &self.meshes
    }

    pub fn for_each<F: FnMut(&G3d)>(&self, func: F) {
        self.meshes.iter().for_each(func);
    }
}
