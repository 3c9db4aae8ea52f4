use dupscan::duplicates::{DuplicateFinder, FinderConfig, FinderError};
use dupscan::scanner::Fingerprint;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

const HELLO_MD5: &str = "5d41402abc4b2a76b9719d911017c592";
const WORLD_MD5: &str = "7d793037a0760186574b0282f2f435e7";

fn write(path: &Path, content: &[u8]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    File::create(path).unwrap().write_all(content).unwrap();
}

fn sequential() -> DuplicateFinder {
    DuplicateFinder::new(FinderConfig::default().with_io_threads(1))
}

#[test]
fn test_identical_files_form_one_group() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("x.txt"), b"hello");
    write(&dir.path().join("y.txt"), b"hello");

    let (groups, summary) = sequential()
        .find_duplicates(&[dir.path().to_path_buf()])
        .unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].fingerprint.to_string(), HELLO_MD5);
    assert_eq!(
        groups[0].paths,
        vec![dir.path().join("x.txt"), dir.path().join("y.txt")]
    );
    assert_eq!(summary.files_hashed, 2);
    assert_eq!(summary.duplicate_groups, 1);
    assert_eq!(summary.duplicate_files, 1);
    assert_eq!(summary.bytes_hashed, 10);
    assert!(!summary.interrupted);
}

#[test]
fn test_distinct_files_form_singletons() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("a.txt"), b"hello");
    write(&dir.path().join("b.txt"), b"world");

    let (groups, summary) = sequential()
        .find_duplicates(&[dir.path().to_path_buf()])
        .unwrap();

    assert_eq!(groups.len(), 2);
    assert!(groups.iter().all(|g| g.len() == 1));
    assert_eq!(groups[0].fingerprint_hex(), HELLO_MD5);
    assert_eq!(groups[1].fingerprint_hex(), WORLD_MD5);
    assert_eq!(summary.total_groups, 2);
    assert_eq!(summary.duplicate_groups, 0);
}

#[test]
fn test_every_file_appears_exactly_once() {
    let dir = tempdir().unwrap();
    let contents: [&[u8]; 4] = [b"one", b"two", b"one", b""];
    let mut expected = Vec::new();
    for (i, content) in contents.iter().enumerate() {
        let path = dir.path().join(format!("d{}", i % 2)).join(format!("f{}", i));
        write(&path, content);
        expected.push(path);
    }

    let (groups, summary) = sequential()
        .find_duplicates(&[dir.path().to_path_buf()])
        .unwrap();

    let mut seen: Vec<PathBuf> = groups.iter().flat_map(|g| g.paths.clone()).collect();
    seen.sort();
    expected.sort();
    assert_eq!(seen, expected);
    assert_eq!(summary.files_hashed, 4);

    for group in &groups {
        for path in &group.paths {
            let data = fs::read(path).unwrap();
            assert_eq!(Fingerprint::of_bytes(&data), group.fingerprint);
        }
    }
}

#[test]
fn test_empty_files_are_grouped() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("e1"), b"");
    write(&dir.path().join("e2"), b"");

    let (groups, _) = sequential()
        .find_duplicates(&[dir.path().to_path_buf()])
        .unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].fingerprint_hex(), "d41d8cd98f00b204e9800998ecf8427e");
    assert_eq!(groups[0].len(), 2);
}

#[test]
fn test_duplicates_across_roots() {
    let first = tempdir().unwrap();
    let second = tempdir().unwrap();
    write(&first.path().join("photo.jpg"), b"jpeg bytes");
    write(&second.path().join("copy").join("photo.jpg"), b"jpeg bytes");
    write(&second.path().join("other.jpg"), b"different");

    let roots = vec![first.path().to_path_buf(), second.path().to_path_buf()];
    let (groups, summary) = sequential().find_duplicates(&roots).unwrap();

    assert_eq!(summary.roots, roots);
    assert_eq!(groups.len(), 2);
    // Roots are scanned in the order given.
    assert_eq!(
        groups[0].paths,
        vec![
            first.path().join("photo.jpg"),
            second.path().join("copy").join("photo.jpg")
        ]
    );
    assert_eq!(groups[1].paths, vec![second.path().join("other.jpg")]);
}

#[test]
fn test_repeated_root_is_scanned_once() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("only.txt"), b"solo");

    let root = dir.path().to_path_buf();
    let (groups, summary) = sequential()
        .find_duplicates(&[root.clone(), root])
        .unwrap();

    assert_eq!(summary.files_hashed, 1);
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].len(), 1);
}

#[test]
fn test_rescan_is_idempotent() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("a").join("1.bin"), b"alpha");
    write(&dir.path().join("b").join("2.bin"), b"alpha");
    write(&dir.path().join("c.bin"), b"beta");

    let roots = [dir.path().to_path_buf()];
    let (first, _) = sequential().find_duplicates(&roots).unwrap();
    let (second, _) = sequential().find_duplicates(&roots).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_parallel_scan_finds_same_groups() {
    let dir = tempdir().unwrap();
    for i in 0..40 {
        let content = format!("content {}", i % 7);
        write(
            &dir.path().join(format!("dir{}", i % 5)).join(format!("f{}.txt", i)),
            content.as_bytes(),
        );
    }

    let roots = [dir.path().to_path_buf()];
    let (seq, _) = sequential().find_duplicates(&roots).unwrap();
    let parallel = DuplicateFinder::new(FinderConfig::default().with_io_threads(8));
    let (par, summary) = parallel.find_duplicates(&roots).unwrap();

    assert_eq!(summary.files_hashed, 40);
    assert_eq!(seq.len(), 7);
    assert_eq!(par.len(), 7);

    let normalize = |groups: Vec<dupscan::duplicates::DuplicateGroup>| {
        let mut sets: Vec<(Fingerprint, Vec<PathBuf>)> = groups
            .into_iter()
            .map(|mut g| {
                g.paths.sort();
                (g.fingerprint, g.paths)
            })
            .collect();
        sets.sort();
        sets
    };
    assert_eq!(normalize(seq), normalize(par));
}

#[test]
fn test_no_roots() {
    let result = sequential().find_duplicates(&[]);
    assert!(matches!(result, Err(FinderError::NoRoots)));
}
