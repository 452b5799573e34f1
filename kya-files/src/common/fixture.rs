//! Lays out synthetic memory images the way the asset loader would have mapped a G3D file.
//! Only meant for tests, the attribute values follow the `fixture_*` functions so that tests can
//! recompute what a decoder has to produce.

use byteorder::{LittleEndian, WriteBytesExt};

use crate::common::types::{
    ChunkHeader, FOURCC_CDOA, FOURCC_CDQA, FOURCC_CDQU, FOURCC_CSTA, FOURCC_HALL, FOURCC_HASH, FOURCC_HIER,
    FOURCC_OBJ, Ptr,
};
use crate::gif::types::{GIF_TAG_COPY_CODE, GifTag, GsPrim, PrimFlags, PrimitiveType, VIF_END_CODE};
use crate::strip::types::{RawTexCoord, StripFlags, VERTEX_SKIP_FLAG};

const WRITE_INFALLIBLE: &str = "Writing into a Vec<u8> cannot fail";

pub fn fixture_color(index: usize) -> [u8; 4] {
    [index as u8, (index * 2) as u8, (index * 3) as u8, 0x80]
}

pub fn fixture_tex_coord(index: usize) -> [i16; 2] {
    [(index * 16) as i16, -((index * 16) as i16)]
}

/// Compact position with 12 fractional bits, the wide layout stores the same value divided by 4096.
pub fn fixture_position(index: usize) -> [i16; 3] {
    [(index * 256) as i16, -((index * 128) as i16), 2048]
}

pub fn fixture_normal(index: usize) -> [i16; 3] {
    [(index * 1024) as i16, 16384, -((index * 512) as i16)]
}

#[derive(Debug, Clone)]
pub struct StripSpec {
    /// NLOOP of every segment's GIF tag.
    pub loop_counts: Vec<u16>,
    pub compact: bool,
    pub normals: bool,
    pub prim: GsPrim,
    /// Entries of the position array whose flag word carries the skip bit.
    pub skip: Vec<usize>,
    /// Segment whose copy packet is replaced by something else.
    pub missing_copy_segment: Option<usize>,
}

impl StripSpec {
    pub fn new(loop_counts: &[u16]) -> Self {
        let prim = PrimitiveType::TriangleStrip as u16 | (PrimFlags::IIP | PrimFlags::TME).bits();
        StripSpec {
            loop_counts: loop_counts.to_vec(),
            compact: true,
            normals: true,
            prim: GsPrim(prim),
            skip: Vec::new(),
            missing_copy_segment: None,
        }
    }

    pub fn wide(mut self) -> Self {
        self.compact = false;
        self
    }

    pub fn without_normals(mut self) -> Self {
        self.normals = false;
        self
    }

    pub fn with_prim(mut self, prim: GsPrim) -> Self {
        self.prim = prim;
        self
    }

    pub fn with_skip(mut self, skip: &[usize]) -> Self {
        self.skip = skip.to_vec();
        self
    }

    pub fn with_missing_copy(mut self, segment: usize) -> Self {
        self.missing_copy_segment = Some(segment);
        self
    }

    pub fn total(&self) -> usize {
        self.loop_counts.iter().map(|&count| count as usize).sum()
    }

    /// Every segment after the first one reuses the last two positions of its predecessor.
    pub fn position_count(&self) -> usize {
        self.total().saturating_sub(2 * self.loop_counts.len().saturating_sub(1))
    }

    fn flags_for(&self, index: usize) -> u32 {
        if self.skip.contains(&index) { VERTEX_SKIP_FLAG } else { 0 }
    }
}

#[derive(Debug, Clone)]
pub enum LodSpec {
    /// The lod does not reference an object at all.
    Unused,
    /// The lod references a hash code entry without data.
    Empty,
    Strips(Vec<StripSpec>),
}

#[derive(Debug, Clone)]
pub struct HierarchySpec {
    pub name: String,
    pub lods: Vec<LodSpec>,
}

#[derive(Debug, Clone)]
pub struct ClusterSpec {
    pub strips: Vec<StripSpec>,
    pub sprite_count: u16,
    pub hierarchies: Vec<HierarchySpec>,
    /// Write a `CDOA` cluster type instead of `CDQA`.
    pub octree: bool,
}

#[derive(Debug, Clone, Default)]
pub struct AssetSpec {
    pub hierarchies: Vec<HierarchySpec>,
    pub cluster: Option<ClusterSpec>,
}

#[derive(Debug, Clone)]
pub struct AssetFixture {
    pub manager: Ptr,
    /// Every strip, in the order a tree walk visits them.
    pub strips: Vec<Ptr>,
}

pub struct ImageWriter {
    bytes: Vec<u8>,
}

impl Default for ImageWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageWriter {
    pub fn new() -> Self {
        // Nothing lives at the null address.
        Self { bytes: vec![0; 16] }
    }

    pub fn position(&self) -> Ptr {
        Ptr(self.bytes.len() as u32)
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn put_u8(&mut self, value: u8) -> &mut Self {
        self.bytes.write_u8(value).expect(WRITE_INFALLIBLE);
        self
    }

    pub fn put_u16(&mut self, value: u16) -> &mut Self {
        self.bytes.write_u16::<LittleEndian>(value).expect(WRITE_INFALLIBLE);
        self
    }

    pub fn put_i16(&mut self, value: i16) -> &mut Self {
        self.bytes.write_i16::<LittleEndian>(value).expect(WRITE_INFALLIBLE);
        self
    }

    pub fn put_u32(&mut self, value: u32) -> &mut Self {
        self.bytes.write_u32::<LittleEndian>(value).expect(WRITE_INFALLIBLE);
        self
    }

    pub fn put_u64(&mut self, value: u64) -> &mut Self {
        self.bytes.write_u64::<LittleEndian>(value).expect(WRITE_INFALLIBLE);
        self
    }

    pub fn put_f32(&mut self, value: f32) -> &mut Self {
        self.bytes.write_f32::<LittleEndian>(value).expect(WRITE_INFALLIBLE);
        self
    }

    pub fn put_ptr(&mut self, ptr: Ptr) -> &mut Self {
        self.put_u32(ptr.0)
    }

    pub fn put_zeros(&mut self, count: usize) -> &mut Self {
        self.bytes.resize(self.bytes.len() + count, 0);
        self
    }

    pub fn patch_u32(&mut self, at: Ptr, value: u32) {
        let start = at.0 as usize;
        self.bytes[start..start + 4].copy_from_slice(&value.to_le_bytes());
    }

    /// Writes a chunk header whose size is filled in by [`Self::end_chunk`].
    pub fn begin_chunk(&mut self, hash: u32) -> Ptr {
        let start = self.position();
        self.put_u32(hash).put_u16(0).put_u16(0).put_u32(0).put_u32(0);
        start
    }

    pub fn end_chunk(&mut self, start: Ptr) {
        let size = self.position().0 - start.0;
        self.patch_u32(Ptr(start.0 + 8), size);
    }

    pub fn put_hash_code(&mut self, name: &str, data: Ptr) -> Ptr {
        let at = self.position();
        self.put_u64(name_hash(name)).put_ptr(data).put_u32(0);
        at
    }

    pub fn put_gif_tag(&mut self, tag: &GifTag) -> Ptr {
        let at = self.position();
        let (lo, hi) = tag.to_bits();
        self.put_u64(lo).put_u64(hi);
        at
    }

    pub fn put_strip(&mut self, spec: &StripSpec) -> Ptr {
        let segment_count = spec.loop_counts.len();
        let tags = spec
            .loop_counts
            .iter()
            .enumerate()
            .map(|(segment, &nloop)| {
                self.put_gif_tag(&GifTag {
                    nloop,
                    eop: segment + 1 == segment_count,
                    pre: true,
                    prim: spec.prim,
                    flg: 0,
                    nreg: 3,
                    regs: 0x412,
                })
            })
            .collect::<Vec<_>>();

        let colors = self.position();
        for index in 0..spec.total() {
            for channel in fixture_color(index) {
                self.put_u8(channel);
            }
        }

        let tex_coords = self.position();
        self.put_zeros(RawTexCoord::HEADER_SIZE);
        for index in 0..spec.total() {
            let [s, t] = fixture_tex_coord(index);
            self.put_i16(s).put_i16(t);
        }

        let vertices = self.position();
        for index in 0..spec.position_count() {
            let [x, y, z] = fixture_position(index);
            let flags = spec.flags_for(index);
            if spec.compact {
                self.put_i16(x).put_i16(y).put_i16(z).put_u16(flags as u16);
            } else {
                self.put_f32(x as f32 / 4096.0)
                    .put_f32(y as f32 / 4096.0)
                    .put_f32(z as f32 / 4096.0)
                    .put_u32(flags);
            }
        }

        let normals = if spec.normals {
            let at = self.position();
            for index in 0..spec.position_count() {
                let [x, y, z] = fixture_normal(index);
                self.put_i16(x).put_i16(y).put_i16(z).put_i16(0);
            }
            at
        } else {
            Ptr::NULL
        };

        let strip = self.position();
        let flags = if spec.compact { StripFlags::COMPACT_VERTICES.bits() } else { 0 };
        self.put_u32(flags)
            .put_i16(-1)
            .put_u8(segment_count as u8)
            .put_u8(0)
            .put_zeros(16)
            .put_ptr(Ptr::NULL)
            .put_ptr(tex_coords)
            .put_ptr(colors)
            .put_ptr(vertices)
            .put_ptr(normals)
            .put_u32(0x30);

        for (segment, tag) in tags.into_iter().enumerate() {
            let copy_code = if spec.missing_copy_segment == Some(segment) { 0 } else { GIF_TAG_COPY_CODE };
            self.put_u32(0x0100_0404).put_u32(0).put_u32(0).put_u32(0);
            self.put_u32(0x1100_0000).put_ptr(tag).put_u32(0).put_u32(copy_code);
            self.put_u32(VIF_END_CODE).put_u32(0).put_u32(0).put_u32(0);
        }

        strip
    }

    /// Chains the strips through their `next` field, in order.
    pub fn link_strips(&mut self, strips: &[Ptr]) {
        for pair in strips.windows(2) {
            self.patch_u32(Ptr(pair[0].0 + 0x18), pair[1].0);
        }
    }

    fn put_strip_chain(&mut self, specs: &[StripSpec]) -> Vec<Ptr> {
        let strips = specs.iter().map(|spec| self.put_strip(spec)).collect::<Vec<_>>();
        self.link_strips(&strips);
        strips
    }

    /// Writes the lod's object (if any) and returns the address for [`LodRecord::obj`](crate::g3d::types::LodRecord).
    fn put_lod(&mut self, name: &str, lod: &LodSpec, strips: &mut Vec<Ptr>) -> Ptr {
        match lod {
            LodSpec::Unused => Ptr::NULL,
            LodSpec::Empty => self.put_hash_code(name, Ptr::NULL),
            LodSpec::Strips(specs) => {
                let chain = self.put_strip_chain(specs);

                let chunk = self.begin_chunk(FOURCC_OBJ);
                self.put_ptr(chain.first().copied().unwrap_or(Ptr::NULL))
                    .put_u32(chain.len() as u32)
                    .put_zeros(16);
                self.end_chunk(chunk);

                strips.extend(chain);
                self.put_hash_code(name, chunk)
            }
        }
    }

    fn put_hierarchy_chunk(&mut self, spec: &HierarchySpec, strips: &mut Vec<Ptr>) -> Ptr {
        let lods = spec
            .lods
            .iter()
            .map(|lod| self.put_lod(&spec.name, lod, strips))
            .collect::<Vec<_>>();

        let chunk = self.begin_chunk(FOURCC_HIER);
        for row in 0..4 {
            for column in 0..4 {
                self.put_f32(if row == column { 1.0 } else { 0.0 });
            }
        }
        self.put_u64(name_hash(&spec.name))
            .put_u16(lods.len() as u16)
            .put_u16(0)
            .put_u32(0);
        for obj in lods {
            self.put_ptr(obj).put_i16(0).put_i16(0);
        }
        self.end_chunk(chunk);
        chunk
    }

    fn put_hash_chunk(&mut self, names: &[&str], chunks: &[Ptr]) {
        let hash = self.begin_chunk(FOURCC_HASH);
        for (name, &chunk) in names.iter().zip(chunks) {
            self.put_hash_code(name, chunk);
        }
        self.end_chunk(hash);
    }

    pub fn put_asset(&mut self, spec: &AssetSpec) -> AssetFixture {
        let mut hall_strips = Vec::new();
        let hall_chunks = spec
            .hierarchies
            .iter()
            .map(|hierarchy| self.put_hierarchy_chunk(hierarchy, &mut hall_strips))
            .collect::<Vec<_>>();

        let mut cluster_strips = Vec::new();
        let mut cluster_hierarchy_strips = Vec::new();
        let cluster_chunks = spec.cluster.as_ref().map(|cluster| {
            cluster_strips = self.put_strip_chain(&cluster.strips);
            cluster
                .hierarchies
                .iter()
                .map(|hierarchy| self.put_hierarchy_chunk(hierarchy, &mut cluster_hierarchy_strips))
                .collect::<Vec<_>>()
        });

        // HALL: the HASH table, followed by copies of the hierarchy chunks it points at.
        let hall = if spec.hierarchies.is_empty() {
            Ptr::NULL
        } else {
            let hall = self.begin_chunk(FOURCC_HALL);
            let hash = self.begin_chunk(FOURCC_HASH);
            let entries = spec
                .hierarchies
                .iter()
                .map(|hierarchy| self.put_hash_code(&hierarchy.name, Ptr::NULL))
                .collect::<Vec<_>>();
            self.end_chunk(hash);

            for (entry, &source) in entries.into_iter().zip(&hall_chunks) {
                let copy = self.copy_chunk(source);
                self.patch_u32(Ptr(entry.0 + 8), copy.0);
            }
            self.end_chunk(hall);
            hall
        };

        let csta = match (&spec.cluster, cluster_chunks) {
            (Some(cluster), Some(hierarchy_chunks)) => {
                let csta = self.begin_chunk(FOURCC_CSTA);
                let cluster_type = self.begin_chunk(if cluster.octree { FOURCC_CDOA } else { FOURCC_CDQA });
                self.put_zeros(0x20);
                for value in [1.0, 2.0, 3.0, 4.0, 10.0, 20.0, 30.0, 1.0] {
                    self.put_f32(value);
                }

                let cdqu = self.begin_chunk(FOURCC_CDQU);
                for slot in 0..8 {
                    self.put_u16(if slot == 4 { cluster.strips.len() as u16 } else { 0 });
                }
                self.put_u16(cluster.sprite_count)
                    .put_u16(cluster.hierarchies.len() as u16)
                    .put_u32(0)
                    .put_ptr(Ptr::NULL)
                    .put_ptr(cluster_strips.first().copied().unwrap_or(Ptr::NULL))
                    .put_zeros(16);
                if !cluster.hierarchies.is_empty() {
                    let names = cluster
                        .hierarchies
                        .iter()
                        .map(|hierarchy| hierarchy.name.as_str())
                        .collect::<Vec<_>>();
                    self.put_hash_chunk(&names, &hierarchy_chunks);
                }
                self.end_chunk(cdqu);
                self.end_chunk(cluster_type);
                self.end_chunk(csta);
                csta
            }
            _ => Ptr::NULL,
        };

        let manager = self.position();
        let file_length = manager.0;
        self.put_ptr(Ptr::NULL)
            .put_u32(file_length)
            .put_ptr(hall)
            .put_ptr(csta)
            .put_ptr(Ptr::NULL)
            .put_ptr(Ptr::NULL)
            .put_ptr(Ptr::NULL)
            .put_u32(0);

        let mut strips = hall_strips;
        strips.extend(cluster_strips);
        strips.extend(cluster_hierarchy_strips);
        AssetFixture { manager, strips }
    }

    fn copy_chunk(&mut self, source: Ptr) -> Ptr {
        let start = source.0 as usize;
        let size_bytes: [u8; 4] = self.bytes[start + 8..start + 12]
            .try_into()
            .expect("Chunk headers are 16 bytes");
        let size = u32::from_le_bytes(size_bytes) as usize;
        debug_assert!(size >= ChunkHeader::SIZE);

        let copy = self.position();
        let data = self.bytes[start..start + size].to_vec();
        self.bytes.extend_from_slice(&data);
        copy
    }
}

pub fn name_hash(name: &str) -> u64 {
    let mut bytes = [0u8; 8];
    for (slot, byte) in bytes.iter_mut().zip(name.bytes()) {
        *slot = byte;
    }
    u64::from_le_bytes(bytes)
}
