use kya_files::common::types::Ptr;

use crate::rendering::common::types::SimpleMesh;

/// Which container a hierarchy was emplaced into.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum HierarchyParent {
    Asset,
    Cluster,
}

/// Position of a hierarchy inside of its [`G3d`]: the owning list and the index into it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct HierarchyId {
    pub parent: HierarchyParent,
    pub index: usize,
}

/// Position of an object: the hierarchy and the index of the lod (within [`Hierarchy::lods`]) holding it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ObjectParent {
    pub hierarchy: HierarchyId,
    pub lod: usize,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum StripParent {
    /// `None` for the freestanding objects of display list strips.
    Object(Option<ObjectParent>),
    Cluster,
}

/// Where a strip lives inside of its [`G3d`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum StripLocator {
    Object { object: ObjectParent, strip: usize },
    Cluster { strip: usize },
}

#[derive(Debug, Clone)]
pub struct Strip {
    /// The raw strip record, which doubles as the handle renderers look strips up by.
    pub record: Ptr,
    pub parent: StripParent,
    pub mesh: SimpleMesh,
}

#[derive(Debug, Clone)]
pub struct Object {
    /// Null when the lod's hash code carries no object chunk, or for display list strips.
    pub record: Ptr,
    pub parent: Option<ObjectParent>,
    pub strips: Vec<Strip>,
}

impl Object {
    /// The freestanding object that owns a display list strip.
    pub fn transient() -> Self {
        Self {
            record: Ptr::NULL,
            parent: None,
            strips: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Lod {
    pub record: Ptr,
    /// Index into the raw lod array, lods without object reference are not emplaced.
    pub index: usize,
    pub hierarchy: HierarchyId,
    pub object: Object,
}

#[derive(Debug, Clone)]
pub struct Hierarchy {
    pub record: Ptr,
    pub id: HierarchyId,
    /// Index into the raw hierarchy list, used for naming the meshes.
    pub index: usize,
    pub name: String,
    pub lods: Vec<Lod>,
}

impl Hierarchy {
    pub fn strips(&self) -> impl Iterator<Item = &Strip> {
        self.lods.iter().flat_map(|lod| lod.object.strips.iter())
    }
}

#[derive(Debug, Clone)]
pub struct Cluster {
    pub record: Ptr,
    pub strips: Vec<Strip>,
    pub hierarchies: Vec<Hierarchy>,
}

/// A fully decoded G3D resource.
#[derive(Debug, Clone)]
pub struct G3d {
    pub name: String,
    pub manager: Ptr,
    pub hierarchies: Vec<Hierarchy>,
    pub cluster: Option<Cluster>,
}

impl G3d {
    pub fn hierarchy(&self, id: HierarchyId) -> Option<&Hierarchy> {
        match id.parent {
            HierarchyParent::Asset => self.hierarchies.get(id.index),
            HierarchyParent::Cluster => self.cluster.as_ref()?.hierarchies.get(id.index),
        }
    }

    pub fn object(&self, parent: ObjectParent) -> Option<&Object> {
        self.hierarchy(parent.hierarchy)?
            .lods
            .get(parent.lod)
            .map(|lod| &lod.object)
    }

    pub fn strip(&self, locator: StripLocator) -> Option<&Strip> {
        match locator {
            StripLocator::Object { object, strip } => self.object(object)?.strips.get(strip),
            StripLocator::Cluster { strip } => self.cluster.as_ref()?.strips.get(strip),
        }
    }

    /// Every strip of the asset, in the order they have been decoded.
    pub fn strips(&self) -> impl Iterator<Item = &Strip> {
        let cluster = self.cluster.iter().flat_map(|cluster| {
            cluster
                .strips
                .iter()
                .chain(cluster.hierarchies.iter().flat_map(Hierarchy::strips))
        });

        self.hierarchies
            .iter()
            .flat_map(Hierarchy::strips)
            .chain(cluster)
    }
}
