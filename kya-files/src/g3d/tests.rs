use crate::ParserError;
use crate::common::fixture::{AssetSpec, ClusterSpec, HierarchySpec, ImageWriter, LodSpec, StripSpec, name_hash};
use crate::common::types::{FOURCC_CDOA, FOURCC_HASH, FOURCC_HIER, Memory};
use crate::g3d::reader::{G3dReader, HallResolver, HierarchyResolver};
use crate::g3d::types::ClusterRoot;

fn hierarchy(name: &str, lods: Vec<LodSpec>) -> HierarchySpec {
    HierarchySpec {
        name: name.to_string(),
        lods,
    }
}

#[test]
fn hall_hierarchies_and_lods() -> Result<(), anyhow::Error> {
    let spec = AssetSpec {
        hierarchies: vec![
            hierarchy(
                "rock",
                vec![LodSpec::Strips(vec![StripSpec::new(&[4]), StripSpec::new(&[3])]), LodSpec::Unused],
            ),
            hierarchy("bush", vec![LodSpec::Empty]),
        ],
        cluster: None,
    };
    let mut writer = ImageWriter::new();
    let fixture = writer.put_asset(&spec);
    let bytes = writer.into_bytes();
    let memory = Memory::new(&bytes);

    let manager = G3dReader::read_manager(&memory, fixture.manager)?;
    assert!(manager.csta.is_null());
    // The HASH chunk plus one HIER chunk per hierarchy.
    assert_eq!(G3dReader::hall_chunk_count(&memory, manager.hall)?, 3);

    let rock = HallResolver
        .hierarchy_from_index(&memory, &manager, 0)?
        .expect("rock is present");
    let record = G3dReader::read_hierarchy(&memory, rock)?;
    assert_eq!(record.hash, name_hash("rock"));
    assert_eq!(record.lod_count, 2);
    assert_eq!(record.transform.rows[2].z, 1.0);
    assert!(record.lods[1].obj.is_null());

    let hash = G3dReader::lod_hash(&memory, &record.lods[0])?;
    assert_eq!(hash.name(), "rock");
    let (_, object) = G3dReader::object_from_hash(&memory, &hash)?.expect("lod has an object");
    assert_eq!(object.strip_count, 2);
    assert_eq!(object.strip_data, fixture.strips[0]);
    assert!(matches!(
        G3dReader::lod_hash(&memory, &record.lods[1]),
        Err(ParserError::NullReference { .. })
    ));

    let bush = HallResolver
        .hierarchy_from_index(&memory, &manager, 1)?
        .expect("bush is present");
    let record = G3dReader::read_hierarchy(&memory, bush)?;
    let hash = G3dReader::lod_hash(&memory, &record.lods[0])?;
    assert!(G3dReader::object_from_hash(&memory, &hash)?.is_none());

    Ok(())
}

#[test]
fn quad_cluster_with_hierarchies() -> Result<(), anyhow::Error> {
    let spec = AssetSpec {
        hierarchies: Vec::new(),
        cluster: Some(ClusterSpec {
            strips: vec![StripSpec::new(&[3]), StripSpec::new(&[5])],
            sprite_count: 2,
            hierarchies: vec![hierarchy("lamp", vec![LodSpec::Strips(vec![StripSpec::new(&[3])])])],
            octree: false,
        }),
    };
    let mut writer = ImageWriter::new();
    let fixture = writer.put_asset(&spec);
    let bytes = writer.into_bytes();
    let memory = Memory::new(&bytes);

    let manager = G3dReader::read_manager(&memory, fixture.manager)?;
    assert!(manager.hall.is_null());

    let ClusterRoot::Quad { header, cluster } = G3dReader::cluster_root(&memory, manager.csta)? else {
        panic!("Expected a quad tree cluster");
    };
    assert_eq!(header.world_location.x, 10.0);

    let (cluster, record) = cluster.expect("CDQU is present");
    assert_eq!(record.strip_count(), 2);
    assert_eq!(record.sprite_count, 2);
    assert_eq!(record.first_strip, fixture.strips[0]);

    let hierarchies = G3dReader::cluster_hierarchies(&memory, cluster, &record)?;
    assert_eq!(hierarchies.len(), 1);
    assert_eq!(hierarchies[0].0.name(), "lamp");
    let lamp = G3dReader::read_hierarchy(&memory, hierarchies[0].1)?;
    assert_eq!(lamp.lod_count, 1);

    Ok(())
}

#[test]
fn octree_cluster_is_unsupported() -> Result<(), anyhow::Error> {
    let spec = AssetSpec {
        hierarchies: Vec::new(),
        cluster: Some(ClusterSpec {
            strips: vec![StripSpec::new(&[3])],
            sprite_count: 0,
            hierarchies: Vec::new(),
            octree: true,
        }),
    };
    let mut writer = ImageWriter::new();
    let fixture = writer.put_asset(&spec);
    let bytes = writer.into_bytes();
    let memory = Memory::new(&bytes);

    let manager = G3dReader::read_manager(&memory, fixture.manager)?;
    assert!(matches!(
        G3dReader::cluster_root(&memory, manager.csta),
        Err(ParserError::UnsupportedVariant { magic: FOURCC_CDOA })
    ));

    Ok(())
}

#[test]
fn hall_entry_must_point_at_hier() -> Result<(), anyhow::Error> {
    let spec = AssetSpec {
        hierarchies: vec![hierarchy("rock", vec![LodSpec::Empty])],
        cluster: None,
    };
    let mut writer = ImageWriter::new();
    let fixture = writer.put_asset(&spec);
    let bytes = writer.into_bytes();
    let manager = G3dReader::read_manager(&Memory::new(&bytes), fixture.manager)?;

    // Point the only entry at the HASH chunk itself.
    let hash_chunk = manager.hall.advance(16)?;
    let mut writer_bytes = bytes.clone();
    let entry_data = hash_chunk.0 as usize + 16 + 8;
    writer_bytes[entry_data..entry_data + 4].copy_from_slice(&hash_chunk.0.to_le_bytes());
    let memory = Memory::new(&writer_bytes);

    assert!(matches!(
        HallResolver.hierarchy_from_index(&memory, &manager, 0),
        Err(ParserError::InvalidMagicValue { expected: FOURCC_HIER, magic: FOURCC_HASH })
    ));

    Ok(())
}
