use kya_files::common::types::{Memory, Ptr, name_from_hash};
use kya_files::g3d::reader::{G3dReader, HallResolver, HierarchyResolver};
use kya_files::g3d::types::{ClusterRecord, ClusterRoot, HierarchyRecord, LodRecord, ManagerRecord, ObjectRecord};
use log::{debug, info, warn};

use crate::MeshLibraryError;
use crate::rendering::common::highlevel_types::{
    Cluster, G3d, Hierarchy, HierarchyId, HierarchyParent, Lod, Object, ObjectParent, Strip, StripLocator,
    StripParent,
};
use crate::rendering::importer::strip_importer::StripImporter;

/// The result of walking a G3D resource. The strip cache entries are handed back to the caller,
/// who merges them once the asset has been registered.
#[derive(Debug)]
pub struct DecodedG3d {
    pub g3d: G3d,
    pub cache_entries: Vec<(Ptr, StripLocator)>,
}

pub struct G3dImporter<'a, 'm, R: HierarchyResolver> {
    memory: &'a Memory<'m>,
    resolver: &'a R,
    /// The asset name without its directories, the prefix of every mesh name.
    short_name: String,
    cache_entries: Vec<(Ptr, StripLocator)>,
}

impl<'a, 'm> G3dImporter<'a, 'm, HallResolver> {
    pub fn import(memory: &'a Memory<'m>, manager: Ptr, name: &str) -> Result<DecodedG3d, MeshLibraryError> {
        G3dImporter::import_with_resolver(memory, manager, name, &HallResolver)
    }
}

impl<'a, 'm, R: HierarchyResolver> G3dImporter<'a, 'm, R> {
    /// Decodes the asset managed by the record at `manager`: the `HALL` hierarchies first, then the `CSTA` cluster.
    pub fn import_with_resolver(
        memory: &'a Memory<'m>,
        manager: Ptr,
        name: &str,
        resolver: &'a R,
    ) -> Result<DecodedG3d, MeshLibraryError> {
        info!("Beginning processing of mesh: {}", name);
        let record = G3dReader::read_manager(memory, manager)?;

        let mut importer = G3dImporter {
            memory,
            resolver,
            short_name: short_name(name).to_string(),
            cache_entries: Vec::new(),
        };

        let hierarchies = if record.hall.is_null() {
            Vec::new()
        } else {
            importer.process_hall(&record)?
        };

        let cluster = if record.csta.is_null() {
            None
        } else {
            importer.process_csta(&record)?
        };

        Ok(DecodedG3d {
            g3d: G3d {
                name: name.to_string(),
                manager,
                hierarchies,
                cluster,
            },
            cache_entries: importer.cache_entries,
        })
    }

    fn process_hall(&mut self, manager: &ManagerRecord) -> Result<Vec<Hierarchy>, MeshLibraryError> {
        // The HASH chunk itself is counted as well.
        let chunk_count = G3dReader::hall_chunk_count(self.memory, manager.hall)?;
        info!("Nb Chunks: {}", chunk_count);

        let mut hierarchies = Vec::with_capacity(chunk_count);
        for index in 0..chunk_count.saturating_sub(1) {
            let entry = G3dReader::hall_entry(self.memory, manager.hall, index)?;
            info!("Processing hierarchy {}/{} hash: {}", index, chunk_count, entry.name());

            let Some(hierarchy) = self.resolver.hierarchy_from_index(self.memory, manager, index)? else {
                continue;
            };

            let id = HierarchyId {
                parent: HierarchyParent::Asset,
                index: hierarchies.len(),
            };
            hierarchies.push(self.emplace_hierarchy(hierarchy, index, id)?);
        }

        Ok(hierarchies)
    }

    fn emplace_hierarchy(&mut self, at: Ptr, index: usize, id: HierarchyId) -> Result<Hierarchy, MeshLibraryError> {
        let record: HierarchyRecord = G3dReader::read_hierarchy(self.memory, at)?;
        let name = name_from_hash(record.hash);
        info!("Processing hierarchy: {}", name);

        let mut lods = Vec::with_capacity(record.lods.len());
        for (lod_index, lod) in record.lods.iter().enumerate() {
            info!("Processing lod: {}", lod_index);
            if lod.obj.is_null() {
                info!("No lod data");
                continue;
            }

            let parent = ObjectParent {
                hierarchy: id,
                lod: lods.len(),
            };
            let object = self.process_lod(lod, parent, index, lod_index)?;
            lods.push(Lod {
                record: at.advance(HierarchyRecord::LODS_OFFSET + lod_index * LodRecord::SIZE)?,
                index: lod_index,
                hierarchy: id,
                object,
            });
        }

        Ok(Hierarchy {
            record: at,
            id,
            index,
            name,
            lods,
        })
    }

    fn process_lod(
        &mut self,
        lod: &LodRecord,
        parent: ObjectParent,
        hierarchy_index: usize,
        lod_index: usize,
    ) -> Result<Object, MeshLibraryError> {
        let hash = G3dReader::lod_hash(self.memory, lod)?;
        info!("Processing lod: {}", hash.name());

        let mut object = Object {
            record: Ptr::NULL,
            parent: Some(parent),
            strips: Vec::new(),
        };

        // A lod whose hash code carries no data is valid, it just has no geometry.
        if let Some((at, record)) = G3dReader::object_from_hash(self.memory, &hash)? {
            object.record = at;
            self.process_object(&mut object, parent, &record, hierarchy_index, lod_index)?;
        }

        Ok(object)
    }

    fn process_object(
        &mut self,
        object: &mut Object,
        parent: ObjectParent,
        record: &ObjectRecord,
        hierarchy_index: usize,
        lod_index: usize,
    ) -> Result<(), MeshLibraryError> {
        if record.strip_data.is_null() {
            return Ok(());
        }

        let mut handle = record.strip_data;
        for strip_index in 0..record.strip_count as usize {
            info!("Processing strip: {}", strip_index);
            let name = format!(
                "{}_{}_{}_{}",
                self.short_name, hierarchy_index, lod_index, strip_index
            );

            let (strip_record, mesh) = StripImporter::create_mesh(self.memory, handle, name)?;
            object.strips.push(Strip {
                record: handle,
                parent: StripParent::Object(Some(parent)),
                mesh,
            });
            handle = strip_record.next;
        }

        // Only cache once every sibling is decoded.
        self.cache_entries.extend(object.strips.iter().enumerate().map(|(strip, decoded)| {
            (decoded.record, StripLocator::Object { object: parent, strip })
        }));
        Ok(())
    }

    fn process_csta(&mut self, manager: &ManagerRecord) -> Result<Option<Cluster>, MeshLibraryError> {
        let header = G3dReader::csta_header(self.memory, manager.csta)?;
        info!("CSTA chunk header: {}", header);

        match G3dReader::cluster_root(self.memory, manager.csta)? {
            ClusterRoot::Quad { header, cluster } => {
                info!("Processing CDQA chunk");
                debug!("field_0x20: {}", header.field_0x20);
                debug!("worldLocation: {}", header.world_location);

                match cluster {
                    Some((at, record)) => Ok(Some(self.process_cluster(at, &record)?)),
                    None => {
                        warn!("CDQA chunk without CDQU chunk, skipping the cluster");
                        Ok(None)
                    }
                }
            }
            ClusterRoot::Unknown { magic } => {
                warn!(
                    "Unknown cluster type {:?}, skipping the cluster",
                    String::from_utf8_lossy(&magic.to_le_bytes())
                );
                Ok(None)
            }
        }
    }

    fn process_cluster(&mut self, at: Ptr, record: &ClusterRecord) -> Result<Cluster, MeshLibraryError> {
        let strip_count = record.strip_count() as usize;
        info!("Processing CDQU chunk stripCount: {}", strip_count);

        let mut strips = Vec::with_capacity(strip_count);
        let mut handle = record.first_strip;
        for strip_index in 0..strip_count {
            info!("Processing cluster strip: {}", strip_index);
            let name = format!("{}_{}", self.short_name, strip_index);

            let (strip_record, mesh) = StripImporter::create_mesh(self.memory, handle, name)?;
            strips.push(Strip {
                record: handle,
                parent: StripParent::Cluster,
                mesh,
            });
            handle = strip_record.next;
        }

        self.cache_entries.extend(
            strips
                .iter()
                .enumerate()
                .map(|(strip, decoded)| (decoded.record, StripLocator::Cluster { strip })),
        );

        if record.sprite_count != 0 {
            info!("Ignoring {} cluster sprites", record.sprite_count);
        }

        let hierarchies: Vec<Hierarchy> = G3dReader::cluster_hierarchies(self.memory, at, record)?
            .into_iter()
            .enumerate()
            .map(|(index, (entry, hierarchy))| {
                info!("Processing cluster hierarchy: {}", entry.name());
                let id = HierarchyId {
                    parent: HierarchyParent::Cluster,
                    index,
                };
                self.emplace_hierarchy(hierarchy, index, id)
            })
            .collect::<Result<_, _>>()?;

        Ok(Cluster {
            record: at,
            strips,
            hierarchies,
        })
    }
}

/// Strips everything up to and including the last backslash.
pub fn short_name(name: &str) -> &str {
    name.rsplit_once('\\').map_or(name, |(_, file)| file)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_name_drops_directories() {
        assert_eq!(short_name("LEVEL\\SECT1.g3d"), "SECT1.g3d");
        assert_eq!(short_name("a\\b\\c"), "c");
        assert_eq!(short_name("plain"), "plain");
        assert_eq!(short_name("trailing\\"), "");
    }
}
