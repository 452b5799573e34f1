use std::fs::File;
use std::io::BufWriter;

use anyhow::{Context, bail};
use clap::Parser;
use itertools::Itertools;
use kya_files::common::types::Memory;
use kya_meshes::io::common::loader::{MeshLoadedDelegate, RawAssetLoader};
use kya_meshes::io::fs::loader::FileLoader;
use kya_meshes::rendering::common::highlevel_types::{G3d, Hierarchy, Strip};
use kya_meshes::rendering::mesh_library::{MeshLibrary, mesh_library, mesh_library_mut};
use kya_meshes::settings::{CliArgs, Command};

fn main() -> Result<(), anyhow::Error> {
    env_logger::init();

    let args = CliArgs::parse();
    log::trace!("Starting with args: {:?}", args);

    let loader = FileLoader::new(&args.data_dir);
    match &args.command {
        Command::List { image, manager, name } => {
            let buf = load_image(&loader, image)?;
            let memory = Memory::new(&buf);

            // Answer the load notification just like the asset loader would trigger it.
            let mut delegate = MeshLoadedDelegate::default();
            MeshLibrary::init(&mut delegate);
            delegate
                .broadcast(&memory, manager.0, name)
                .with_context(|| format!("Failed to decode {}", name))?;

            mesh_library().for_each(print_g3d);
        }
        Command::Strip { image, address, obj } => {
            let buf = load_image(&loader, image)?;
            let memory = Memory::new(&buf);

            let mut library = mesh_library_mut();
            let strip = library
                .cache_dlist_strip(&memory, address.0)
                .with_context(|| format!("Failed to decode the strip at {}", address.0))?;
            print_strip(strip, "");

            if let Some(path) = obj {
                let mut w = BufWriter::new(File::create(path)?);
                strip.mesh.dump_to_wavefront_obj(&mut w)?;
                log::info!("Wrote {}", path);
            }
        }
    }

    Ok(())
}

fn load_image(loader: &FileLoader, image: &str) -> Result<Vec<u8>, anyhow::Error> {
    match loader.load_raw_owned(image) {
        Some(buf) => Ok(buf),
        None => bail!("Failed to load the memory image {}", image),
    }
}

fn print_g3d(g3d: &G3d) {
    println!("{} (manager {})", g3d.name, g3d.manager);
    for hierarchy in &g3d.hierarchies {
        print_hierarchy(hierarchy, "  ");
    }

    if let Some(cluster) = &g3d.cluster {
        println!("  cluster {}", cluster.record);
        for strip in &cluster.strips {
            print_strip(strip, "    ");
        }
        for hierarchy in &cluster.hierarchies {
            print_hierarchy(hierarchy, "    ");
        }
    }
}

fn print_hierarchy(hierarchy: &Hierarchy, indent: &str) {
    println!("{}hierarchy {} {} at {}", indent, hierarchy.index, hierarchy.name, hierarchy.record);
    for lod in &hierarchy.lods {
        println!("{}  lod {} object {}", indent, lod.index, lod.object.record);
        for strip in &lod.object.strips {
            print_strip(strip, &format!("{}    ", indent));
        }
    }
}

fn print_strip(strip: &Strip, indent: &str) {
    let buffer = &strip.mesh.vertex_buffer;
    println!(
        "{}strip {} at {}: {:?}, {} vertices, {} indices, colours {}",
        indent,
        strip.mesh.name,
        strip.record,
        strip.mesh.prim.primitive_type(),
        buffer.vertex_tail(),
        buffer.index_tail(),
        buffer
            .vertices
            .iter()
            .map(|vertex| vertex.rgba)
            .unique()
            .count()
    );
}
