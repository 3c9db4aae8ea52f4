use dupscan::duplicates::{DuplicateFinder, FinderConfig};
use dupscan::scanner::{ExclusionSet, Walker, WalkerConfig};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

fn write(path: &Path, content: &[u8]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    File::create(path).unwrap().write_all(content).unwrap();
}

fn finder(exclusions: &str) -> DuplicateFinder {
    DuplicateFinder::new(
        FinderConfig::default()
            .with_io_threads(1)
            .with_exclusions(ExclusionSet::parse_list(exclusions)),
    )
}

#[test]
fn test_excluded_subtree_is_not_grouped() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("keep").join("a.txt"), b"same");
    write(&dir.path().join("skip_me").join("b.txt"), b"same");

    let (groups, summary) = finder("skip_me")
        .find_duplicates(&[dir.path().to_path_buf()])
        .unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].paths, vec![dir.path().join("keep").join("a.txt")]);
    assert_eq!(summary.files_hashed, 1);
    assert_eq!(summary.excluded_dirs, 1);
}

#[test]
fn test_descendants_of_excluded_directory_are_pruned() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("cache_dir").join("deep").join("er").join("f.bin"), b"x");
    write(&dir.path().join("top.bin"), b"x");

    let (groups, summary) = finder("cache_dir")
        .find_duplicates(&[dir.path().to_path_buf()])
        .unwrap();

    assert_eq!(summary.files_hashed, 1);
    assert_eq!(groups[0].paths, vec![dir.path().join("top.bin")]);
    // Only the top of the pruned subtree is visited.
    assert_eq!(summary.excluded_dirs, 1);
}

#[test]
fn test_fragment_matches_anywhere_in_path() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("project.git_old").join("a"), b"1");
    write(&dir.path().join("src").join("b"), b"2");

    let (groups, _) = finder(".git")
        .find_duplicates(&[dir.path().to_path_buf()])
        .unwrap();

    let paths: Vec<PathBuf> = groups.into_iter().flat_map(|g| g.paths).collect();
    assert_eq!(paths, vec![dir.path().join("src").join("b")]);
}

#[test]
fn test_excluded_root_yields_nothing() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("archive_root");
    write(&root.join("a.txt"), b"data");

    let (groups, summary) = finder("archive_root").find_duplicates(&[root]).unwrap();

    assert!(groups.is_empty());
    assert_eq!(summary.files_hashed, 0);
}

#[test]
fn test_file_names_are_not_matched() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("skip_me.txt"), b"data");

    let (groups, _) = finder("skip_me")
        .find_duplicates(&[dir.path().to_path_buf()])
        .unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].paths, vec![dir.path().join("skip_me.txt")]);
}

#[test]
fn test_empty_exclusion_list_excludes_nothing() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("a").join("1"), b"x");
    write(&dir.path().join("b").join("2"), b"x");

    let (groups, summary) = finder("")
        .find_duplicates(&[dir.path().to_path_buf()])
        .unwrap();

    assert_eq!(summary.excluded_dirs, 0);
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].len(), 2);
}

#[test]
fn test_several_fragments() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("node_modules").join("pkg").join("index.js"), b"js");
    write(&dir.path().join("target_build").join("out.o"), b"obj");
    write(&dir.path().join("main.rs"), b"rs");

    let config = WalkerConfig::new(false, ExclusionSet::parse_list("node_modules,target_build"));
    let walker = Walker::new(dir.path(), config);
    let files: Vec<PathBuf> = walker.walk().map(|r| r.unwrap().path).collect();

    assert_eq!(files, vec![dir.path().join("main.rs")]);
    assert_eq!(walker.excluded_dirs(), 2);
}
