//! Contract conformance, run against the memory backend and every composition.
//!
//! Each fixture builds a fresh, empty filesystem. The same checks run on all
//! of them, so a composition that routes or rewrites paths must behave exactly
//! like a plain backend from the caller's side, error paths included.

mod common;

use std::collections::BTreeSet;
use std::sync::Arc;

use common::{expect_kind, payload};
use kasane_vfs::{
    CopyOptions, EntryFilter, ErrorKind, Filesystem, ListOptions, MemoryBackend, MountTable,
    OpenMode, Overlay, ResourceKind, SubView, Synchronized, Wildcard,
};

// ============================================================================
// Checks
// ============================================================================

fn check_empty_root(fs: &dyn Filesystem) {
    assert!(fs.is_dir("/"));
    assert!(!fs.is_file("/"));
    assert!(fs.list_dir("/").unwrap().is_empty());
    assert!(!fs.exists("/missing"));
    let path = expect_kind(fs.info("/missing"), ErrorKind::NotFound);
    assert_eq!(path, "/missing");
}

fn check_make_and_remove_dir(fs: &dyn Filesystem) {
    fs.make_dir("/keep", false, false).unwrap();
    fs.make_dir("/x", false, false).unwrap();
    assert!(fs.is_dir("/x"));

    fs.remove_dir("/x", false).unwrap();
    assert!(!fs.exists("/x"));
    assert!(fs.is_dir("/keep"));
}

fn check_make_dir_errors(fs: &dyn Filesystem) {
    expect_kind(fs.make_dir("/a/b", false, false), ErrorKind::ParentNotFound);
    fs.make_dir("/a/b", true, false).unwrap();
    assert!(fs.is_dir("/a"));

    expect_kind(fs.make_dir("/a", false, false), ErrorKind::AlreadyExists);
    fs.make_dir("/a", false, true).unwrap();

    fs.write_all("/f", b"").unwrap();
    expect_kind(fs.make_dir("/f", true, true), ErrorKind::ResourceInvalid);
}

fn check_open_errors(fs: &dyn Filesystem) {
    let path = expect_kind(fs.read_all("/nope"), ErrorKind::NotFound);
    assert_eq!(path, "/nope");

    expect_kind(fs.write_all("/missing/f", b"x"), ErrorKind::ParentNotFound);

    fs.make_dir("/d", false, false).unwrap();
    expect_kind(fs.open("/d", OpenMode::read()).map(|_| ()), ErrorKind::ResourceInvalid);

    fs.write_all("/f", b"x").unwrap();
    expect_kind(fs.open("/f", OpenMode::create_new()).map(|_| ()), ErrorKind::AlreadyExists);
    assert_eq!(fs.read_all("/f").unwrap(), b"x");
}

fn check_remove_errors(fs: &dyn Filesystem) {
    fs.make_dir("/full", false, false).unwrap();
    fs.write_all("/full/child", b"c").unwrap();

    expect_kind(fs.remove_dir("/full", false), ErrorKind::DirectoryNotEmpty);
    assert!(fs.is_dir("/full"));
    assert!(fs.is_file("/full/child"));

    expect_kind(fs.remove("/full"), ErrorKind::ResourceInvalid);
    expect_kind(fs.remove("/ghost"), ErrorKind::NotFound);
    expect_kind(fs.remove_dir("/", true), ErrorKind::ResourceInvalid);

    fs.remove_dir("/full", true).unwrap();
    assert!(!fs.exists("/full"));
    assert!(!fs.exists("/full/child"));
}

fn check_copy_round_trip(fs: &dyn Filesystem) {
    let data = payload(50_000);
    fs.write_all("/src.bin", &data).unwrap();

    let options = CopyOptions::new().chunk_size(4096);
    fs.copy("/src.bin", "/dst.bin", options).unwrap();
    assert_eq!(fs.read_all("/dst.bin").unwrap(), data);

    expect_kind(fs.copy("/src.bin", "/dst.bin", options), ErrorKind::AlreadyExists);
    fs.write_all("/small", b"small").unwrap();
    fs.copy("/small", "/dst.bin", options.overwrite(true)).unwrap();
    assert_eq!(fs.read_all("/dst.bin").unwrap(), b"small");

    expect_kind(fs.copy("/nothing", "/x", options), ErrorKind::NotFound);
}

fn check_transfer_onto_itself(fs: &dyn Filesystem) {
    let data = payload(10_000);
    fs.write_all("/keep.bin", &data).unwrap();
    let options = CopyOptions::new().overwrite(true);

    fs.copy("/keep.bin", "/keep.bin", options).unwrap();
    assert_eq!(fs.read_all("/keep.bin").unwrap(), data);
    fs.copy("/keep.bin", "/./keep.bin", options).unwrap();
    assert_eq!(fs.read_all("/keep.bin").unwrap(), data);

    fs.move_file("/keep.bin", "/keep.bin", options).unwrap();
    assert_eq!(fs.read_all("/keep.bin").unwrap(), data);
    fs.move_file("/keep.bin", "/keep.bin", CopyOptions::new()).unwrap();
    assert!(fs.is_file("/keep.bin"));

    expect_kind(fs.move_file("/gone", "/gone", options), ErrorKind::NotFound);
}

fn check_rename(fs: &dyn Filesystem) {
    fs.write_all("/a", b"a").unwrap();
    fs.write_all("/b", b"b").unwrap();
    expect_kind(fs.rename("/a", "/b"), ErrorKind::AlreadyExists);

    fs.rename("/a", "/c").unwrap();
    assert!(!fs.exists("/a"));
    assert_eq!(fs.read_all("/c").unwrap(), b"a");
}

fn check_walk_files(fs: &dyn Filesystem) {
    fs.make_dir("/w/x/y", true, false).unwrap();
    fs.make_dir("/w/z", true, false).unwrap();
    let expected = ["/w/1", "/w/x/2", "/w/x/y/3", "/w/x/y/4", "/w/z/5"];
    for path in expected {
        fs.write_all(path, path.as_bytes()).unwrap();
    }

    let walked: Vec<String> = fs.walk_files("/", None).map(Result::unwrap).collect();
    let unique: BTreeSet<&str> = walked.iter().map(String::as_str).collect();
    assert_eq!(walked.len(), expected.len());
    assert_eq!(unique, expected.into_iter().collect());
    assert!(walked.iter().all(|p| fs.is_file(p)));

    let dirs: Vec<String> = fs.walk_dirs("/w", None).map(Result::unwrap).collect();
    assert_eq!(dirs.len(), 4);
}

fn check_tree_transfer(fs: &dyn Filesystem) {
    fs.make_dir("/tree/sub", true, false).unwrap();
    fs.write_all("/tree/top.txt", b"top").unwrap();
    fs.write_all("/tree/sub/deep.txt", b"deep").unwrap();

    fs.copy_dir("/tree", "/copy", CopyOptions::new()).unwrap();
    assert_eq!(fs.read_all("/copy/sub/deep.txt").unwrap(), b"deep");
    assert!(fs.is_file("/tree/top.txt"));

    expect_kind(fs.copy_dir("/tree", "/copy", CopyOptions::new()), ErrorKind::AlreadyExists);
    expect_kind(fs.copy_dir("/tree", "/tree/inner", CopyOptions::new()), ErrorKind::PathInvalid);

    fs.move_dir("/copy", "/moved", CopyOptions::new()).unwrap();
    assert!(!fs.exists("/copy"));
    assert_eq!(fs.read_all("/moved/top.txt").unwrap(), b"top");
    assert_eq!(fs.read_all("/moved/sub/deep.txt").unwrap(), b"deep");
}

fn check_path_escape(fs: &dyn Filesystem) {
    expect_kind(fs.read_all("/../escape"), ErrorKind::PathInvalid);
    expect_kind(fs.write_all("a/../../escape", b""), ErrorKind::PathInvalid);
    assert!(!fs.exists("/.."));

    fs.make_dir("/p", false, false).unwrap();
    fs.write_all("/p/../q", b"q").unwrap();
    assert!(fs.is_file("/q"));
    assert!(fs.is_file("q"));
}

fn check_size_info_and_listing(fs: &dyn Filesystem) {
    fs.make_dir("/d/inner", true, false).unwrap();
    fs.write_all("/d/a.txt", &[0; 10]).unwrap();
    fs.write_all("/d/b.log", &[0; 5]).unwrap();
    fs.write_all("/d/inner/c.txt", &[0; 7]).unwrap();

    assert_eq!(fs.size("/d").unwrap(), 22);
    let info = fs.info("/d/a.txt").unwrap();
    assert_eq!(info.kind, ResourceKind::File);
    assert_eq!(info.size, 10);
    assert!(fs.info("/d").unwrap().is_dir());

    let mut all = fs.list_dir("/d").unwrap();
    all.sort();
    assert_eq!(all, vec!["a.txt", "b.log", "inner"]);

    let txt = ListOptions::new()
        .wildcard(Wildcard::new("*.txt").unwrap())
        .filter(EntryFilter::FilesOnly)
        .full();
    assert_eq!(fs.list_dir_with("/d", &txt).unwrap(), vec!["/d/a.txt"]);

    let dirs = ListOptions::new().filter(EntryFilter::DirsOnly);
    assert_eq!(fs.list_dir_with("/d", &dirs).unwrap(), vec!["inner"]);

    assert_eq!(fs.list_dir_info("/d").unwrap().len(), 3);
    assert!(!fs.is_dir_empty("/d").unwrap());
    assert!(fs.is_dir_empty("/d/inner/../inner").is_ok());
}

// ============================================================================
// Fixtures
// ============================================================================

fn jailed() -> SubView {
    let parent = MemoryBackend::new();
    parent.make_dir("/jail", false, false).unwrap();
    parent.write_all("/escape", b"outside").unwrap();
    SubView::new(Arc::new(parent), "/jail").unwrap()
}

fn layered() -> Overlay {
    let overlay = Overlay::new();
    overlay.add("upper", MemoryBackend::new()).unwrap();
    overlay.add("lower", MemoryBackend::new()).unwrap();
    overlay
}

macro_rules! conformance {
    ($($name:ident => $make:expr;)*) => {
        $(
            mod $name {
                use super::*;

                fn fs() -> Box<dyn Filesystem> {
                    common::init_tracing();
                    Box::new($make)
                }

                #[test]
                fn empty_root() { check_empty_root(&*fs()); }
                #[test]
                fn make_and_remove_dir() { check_make_and_remove_dir(&*fs()); }
                #[test]
                fn make_dir_errors() { check_make_dir_errors(&*fs()); }
                #[test]
                fn open_errors() { check_open_errors(&*fs()); }
                #[test]
                fn remove_errors() { check_remove_errors(&*fs()); }
                #[test]
                fn copy_round_trip() { check_copy_round_trip(&*fs()); }
                #[test]
                fn transfer_onto_itself() { check_transfer_onto_itself(&*fs()); }
                #[test]
                fn rename() { check_rename(&*fs()); }
                #[test]
                fn walk_files() { check_walk_files(&*fs()); }
                #[test]
                fn tree_transfer() { check_tree_transfer(&*fs()); }
                #[test]
                fn path_escape() { check_path_escape(&*fs()); }
                #[test]
                fn size_info_and_listing() { check_size_info_and_listing(&*fs()); }
            }
        )*
    };
}

conformance! {
    memory => MemoryBackend::new();
    mount_fallback => MountTable::with_fallback(Arc::new(MemoryBackend::new()));
    overlay => layered();
    subview => jailed();
    synchronized => Synchronized::new(MemoryBackend::new());
}
