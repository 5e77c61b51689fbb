//! Stack two directory archives and an in-memory patch at the root, then
//! walk the merged tree.
//!
//! Run with: `RUST_LOG=debug cargo run --example mount_overlay`

use std::fs;

use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use vfs_overlay::*;

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    // Two archives on the host, under one archive root.
    let archive_root = tempfile::tempdir().map_err(VfsError::from)?;
    let base = archive_root.path().join("base");
    fs::create_dir_all(base.join("assets/textures"))?;
    fs::write(base.join("assets/readme.txt"), "base readme")?;
    fs::write(base.join("assets/textures/wall.png"), [0x89, b'P', b'N', b'G'])?;
    let dlc = archive_root.path().join("dlc");
    fs::create_dir_all(dlc.join("assets"))?;
    fs::write(dlc.join("assets/readme.txt"), "dlc readme")?;
    fs::write(dlc.join("assets/level2.map"), "#####")?;

    let mut vfs = Filesystem::new(Config::new().with_archive_root(archive_root.path()));
    let root = VirtualPath::root();
    vfs.mount("base", &root)?;
    vfs.mount("dlc", &root)?;

    // A hotfix built in memory, mounted on top.
    let hotfix = MemoryArchive::new("hotfix").with_file("/assets/level2.map", "#.#.#")?;
    vfs.mount_archive(Box::new(hotfix), &root)?;
    vfs.create_directory(&VirtualPath::parse("/saves")?)?;

    println!("tree:");
    print_tree(&vfs, &root, 1)?;

    let readme = VirtualPath::parse("/assets/readme.txt")?;
    println!("readme: {}", vfs.read_to_string(&readme)?);

    println!("mounts:");
    for mount in vfs.mounts() {
        println!(
            "  {} at {} layer {} ({})",
            mount.id,
            mount.mount_path,
            mount.layer,
            mount.real_path.display()
        );
    }

    // Peel the overlay back one layer at a time.
    while !vfs.mounts().is_empty() {
        let id = vfs.unmount(&root)?;
        println!("unmounted {id}; readme exists: {}", vfs.exists(&readme)?);
    }
    if let Err(e) = vfs.unmount(&root) {
        println!("unmount again: {e} [{}]", e.code());
    }
    Ok(())
}

fn print_tree(vfs: &Filesystem, dir: &VirtualPath, depth: usize) -> Result<()> {
    for entry in vfs.read_dir(dir)? {
        let entry = entry?;
        let indent = "  ".repeat(depth);
        match entry.file_type {
            FileType::Directory => {
                println!("{indent}{}/", entry.name);
                print_tree(vfs, &entry.path, depth + 1)?;
            }
            FileType::File => {
                println!("{indent}{} ({} bytes)", entry.name, vfs.file_size(&entry.path)?);
            }
        }
    }
    Ok(())
}
