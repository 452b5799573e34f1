use crate::ParserError;
use crate::common::reader::{chunk_count, expect_chunk, first_chunk};
use crate::common::types::{
    ChunkHeader, FOURCC_CDOA, FOURCC_CDQA, FOURCC_CDQU, FOURCC_CSTA, FOURCC_HALL, FOURCC_HASH, FOURCC_HIER,
    FOURCC_OBJ, HashCode, Memory, Ptr,
};
use crate::g3d::types::{
    ClusterRecord, ClusterRoot, ClusterTypeHeader, HierarchyRecord, LodRecord, ManagerRecord, ObjectRecord,
};

/// Resolves the n-th entry of a manager's hierarchy list to the address of its hierarchy record.
pub trait HierarchyResolver {
    fn hierarchy_from_index(
        &self,
        memory: &Memory,
        manager: &ManagerRecord,
        index: usize,
    ) -> Result<Option<Ptr>, ParserError>;
}

/// Resolves hierarchies through the `HASH` table at the start of the `HALL` chunk.
#[derive(Debug, Default, Copy, Clone)]
pub struct HallResolver;

impl HierarchyResolver for HallResolver {
    fn hierarchy_from_index(
        &self,
        memory: &Memory,
        manager: &ManagerRecord,
        index: usize,
    ) -> Result<Option<Ptr>, ParserError> {
        let entries = G3dReader::hall_entries_start(memory, manager.hall)?;
        let entry: HashCode = memory.read_indexed(entries, index, HashCode::SIZE)?;
        entry
            .data
            .non_null()
            .map(|hier| G3dReader::hierarchy_in_chunk(memory, hier))
            .transpose()
    }
}

pub struct G3dReader {}

impl G3dReader {
    pub fn read_manager(memory: &Memory, manager: Ptr) -> Result<ManagerRecord, ParserError> {
        if manager.is_null() {
            return Err(ParserError::NullReference { what: "G3D manager" });
        }

        memory.read(manager)
    }

    /// Number of chunks following the `HASH` header of `HALL`, the `HASH` chunk itself included.
    pub fn hall_chunk_count(memory: &Memory, hall: Ptr) -> Result<usize, ParserError> {
        let hall_header = expect_chunk(memory, hall, FOURCC_HALL)?;
        let hash = ChunkHeader::data(hall)?;
        expect_chunk(memory, hash, FOURCC_HASH)?;
        chunk_count(memory, hash, hall_header.end(hall)?)
    }

    pub fn hall_entry(memory: &Memory, hall: Ptr, index: usize) -> Result<HashCode, ParserError> {
        memory.read_indexed(Self::hall_entries_start(memory, hall)?, index, HashCode::SIZE)
    }

    fn hall_entries_start(memory: &Memory, hall: Ptr) -> Result<Ptr, ParserError> {
        expect_chunk(memory, hall, FOURCC_HALL)?;
        let hash = ChunkHeader::data(hall)?;
        expect_chunk(memory, hash, FOURCC_HASH)?;
        ChunkHeader::data(hash)
    }

    /// Address of the hierarchy record inside of the `HIER` chunk at `hier`.
    pub fn hierarchy_in_chunk(memory: &Memory, hier: Ptr) -> Result<Ptr, ParserError> {
        expect_chunk(memory, hier, FOURCC_HIER)?;
        ChunkHeader::data(hier)
    }

    pub fn read_hierarchy(memory: &Memory, hierarchy: Ptr) -> Result<HierarchyRecord, ParserError> {
        memory.read(hierarchy)
    }

    /// The hash code entry a lod refers to. The lod must have an object reference.
    pub fn lod_hash(memory: &Memory, lod: &LodRecord) -> Result<HashCode, ParserError> {
        if lod.obj.is_null() {
            return Err(ParserError::NullReference { what: "lod object" });
        }

        memory.read(lod.obj)
    }

    /// The object record behind a lod's hash code entry, `None` when the entry carries no data.
    pub fn object_from_hash(memory: &Memory, hash: &HashCode) -> Result<Option<(Ptr, ObjectRecord)>, ParserError> {
        let Some(chunk) = hash.data.non_null() else {
            return Ok(None);
        };

        expect_chunk(memory, chunk, FOURCC_OBJ)?;
        let object = ChunkHeader::data(chunk)?;
        Ok(Some((object, memory.read(object)?)))
    }

    pub fn csta_header(memory: &Memory, csta: Ptr) -> Result<ChunkHeader, ParserError> {
        expect_chunk(memory, csta, FOURCC_CSTA)
    }

    /// Descends from `CSTA` into its cluster type chunk. Octree clusters (`CDOA`) are rejected.
    pub fn cluster_root(memory: &Memory, csta: Ptr) -> Result<ClusterRoot, ParserError> {
        Self::csta_header(memory, csta)?;

        let type_chunk = ChunkHeader::data(csta)?;
        let type_header: ChunkHeader = memory.read(type_chunk)?;

        match type_header.hash {
            FOURCC_CDOA => Err(ParserError::UnsupportedVariant {
                magic: type_header.hash,
            }),
            FOURCC_CDQA => {
                let header_at = ChunkHeader::data(type_chunk)?;
                let header: ClusterTypeHeader = memory.read(header_at)?;

                let cdqu_start = header_at.advance(ClusterTypeHeader::SIZE)?;
                let cluster = match first_chunk(memory, cdqu_start, type_header.end(type_chunk)?)? {
                    Some((cdqu, cdqu_header)) => {
                        if cdqu_header.hash != FOURCC_CDQU {
                            return Err(ParserError::InvalidMagicValue {
                                expected: FOURCC_CDQU,
                                magic: cdqu_header.hash,
                            });
                        }

                        let cluster = ChunkHeader::data(cdqu)?;
                        Some((cluster, memory.read(cluster)?))
                    }
                    None => None,
                };

                Ok(ClusterRoot::Quad { header, cluster })
            }
            magic => Ok(ClusterRoot::Unknown { magic }),
        }
    }

    /// The hierarchies nested in a cluster, as listed by the `HASH` chunk right behind the cluster record.
    pub fn cluster_hierarchies(
        memory: &Memory,
        cluster: Ptr,
        record: &ClusterRecord,
    ) -> Result<Vec<(HashCode, Ptr)>, ParserError> {
        if record.hierarchy_count == 0 {
            return Ok(Vec::new());
        }

        let hash = cluster.advance(ClusterRecord::SIZE)?;
        expect_chunk(memory, hash, FOURCC_HASH)?;

        let entries: Vec<HashCode> = memory.read_array(ChunkHeader::data(hash)?, record.hierarchy_count as usize)?;
        entries
            .into_iter()
            .map(|entry| {
                let hier = entry.data.non_null().ok_or(ParserError::NullReference {
                    what: "cluster hierarchy",
                })?;
                Ok((entry, Self::hierarchy_in_chunk(memory, hier)?))
            })
            .collect()
    }
}
