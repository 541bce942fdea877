//! File cache and file transforms against real files.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use approx::assert_abs_diff_eq;
use chroma_formats::{
    CachedFile, FileCache, FileTransform, FormatError, FormatRegistry, build_file_ops,
};
use chroma_lut::Lut3D;
use chroma_ops::{OpKind, OptimizationLevel, TransformDirection};
use tempfile::TempDir;

const GAMMA_SPI1D: &str = "Version 1\nFrom 0 2\nLength 5\nComponents 1\n{\n0.0\n0.0625\n0.25\n0.5625\n1.0\n}\n";

fn write(dir: &TempDir, name: &str, text: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, text).unwrap();
    path
}

#[test]
fn concurrent_first_access_parses_once() {
    let cache = FileCache::new();
    let loads = AtomicUsize::new(0);
    let path = Path::new("shared/cube.itx");

    let results: Vec<Arc<CachedFile>> = thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                s.spawn(|| {
                    cache
                        .get_or_insert_with(path, || {
                            loads.fetch_add(1, Ordering::SeqCst);
                            thread::sleep(std::time::Duration::from_millis(20));
                            Ok(CachedFile::Lut3D {
                                lut: Arc::new(Lut3D::identity(3).unwrap()),
                            })
                        })
                        .unwrap()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(loads.load(Ordering::SeqCst), 1);
    assert!(results.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
}

#[test]
fn loads_from_disk_by_extension() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "gamma.spi1d", GAMMA_SPI1D);
    let cache = FileCache::new();

    let first = cache.get_or_load(&path, FormatRegistry::global()).unwrap();
    assert_eq!(first.kind_name(), "lut1d");

    // Later edits are not seen; the entry is parsed once per path.
    fs::write(&path, "garbage").unwrap();
    let again = cache.get_or_load(&path, FormatRegistry::global()).unwrap();
    assert!(Arc::ptr_eq(&first, &again));
}

#[test]
fn parse_failure_names_the_file_and_is_retried() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "broken.itx", "LUT_3D_SIZE 2\n0 0\n");
    let cache = FileCache::new();

    let err = cache.get_or_load(&path, FormatRegistry::global()).unwrap_err();
    let FormatError::Parse(parse) = &err else {
        panic!("expected a parse error, got {err}");
    };
    assert!(parse.source_name.ends_with("broken.itx"));
    assert_eq!(parse.line, Some(2));
    assert!(!cache.contains(&path));

    let mut text = String::from("LUT_3D_SIZE 2\n");
    for _ in 0..8 {
        text.push_str("0.5 0.5 0.5\n");
    }
    fs::write(&path, text).unwrap();
    assert!(cache.get_or_load(&path, FormatRegistry::global()).is_ok());
    assert_eq!(cache.len(), 1);
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = TempDir::new().unwrap();
    let cache = FileCache::new();
    let err = cache
        .get_or_load(&dir.path().join("absent.itx"), FormatRegistry::global())
        .unwrap_err();
    assert!(matches!(err, FormatError::Io(_)));
}

#[test]
fn file_transform_round_trips() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "gamma.spi1d", GAMMA_SPI1D);
    let cache = FileCache::new();
    let registry = FormatRegistry::global();
    let transform = FileTransform::new(&path);

    let forward = build_file_ops(
        &transform,
        TransformDirection::Forward,
        &cache,
        registry,
        OptimizationLevel::Lossless,
    )
    .unwrap();
    assert!(forward.is_finalized());
    let kinds: Vec<OpKind> = forward.ops().iter().map(|op| op.kind()).collect();
    assert_eq!(kinds, [OpKind::Range, OpKind::Lut1D]);

    let inverse = build_file_ops(
        &transform,
        TransformDirection::Inverse,
        &cache,
        registry,
        OptimizationLevel::Lossless,
    )
    .unwrap();

    let fwd = forward.cpu_processor().unwrap();
    let inv = inverse.cpu_processor().unwrap();
    // Domain [0, 2] then a quadratic curve.
    let out = fwd.apply_rgb([1.0, 1.0, 1.0]);
    assert_abs_diff_eq!(out[0], 0.25, epsilon = 1e-6);
    for x in [0.3f32, 1.0, 1.7] {
        let back = inv.apply_rgb(fwd.apply_rgb([x, x, x]));
        assert_abs_diff_eq!(back[0], x, epsilon = 1e-5);
    }
    assert_eq!(cache.len(), 1);
}

#[test]
fn unknown_extension_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "grade.cube", "LUT_3D_SIZE 2\n");
    let err = build_file_ops(
        &FileTransform::new(&path),
        TransformDirection::Forward,
        &FileCache::new(),
        FormatRegistry::global(),
        OptimizationLevel::None,
    )
    .unwrap_err();
    assert!(matches!(err, FormatError::UnknownFormat(_)));
}
