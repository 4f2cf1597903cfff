use hashcheck::reconcile::Reconciler;
use hashcheck::storage::manifest::{self, Manifest};
use hashcheck::storage::{ChangeKind, FileRecord, ScanMode, Snapshot};
use hashcheck::utils::hash::{hash_bytes, hash_file_streaming};
use proptest::prelude::*;
use std::collections::BTreeSet;
use std::io::Write;
use std::path::{Path, PathBuf};

fn record_strategy() -> impl Strategy<Value = FileRecord> {
    (
        // Printable paths without line breaks, including the delimiter itself
        prop_oneof![
            "[a-zA-Z0-9_./ ,-]{1,40}",
            "[a-z]{1,8}::::[a-z]{1,8}",
            "[a-z]{1,8}(::){1,5}[a-z]{0,8}",
        ],
        prop::collection::vec(any::<u8>(), 0..64),
        any::<u64>(),
        any::<i64>(),
        any::<bool>(),
    )
        .prop_map(|(path, content, size, modified, digested)| {
            let path = PathBuf::from(path);
            if digested {
                FileRecord::full(path, hash_bytes(&content), size, modified)
            } else {
                FileRecord::quick(path, size, modified)
            }
        })
}

proptest! {
    #[test]
    fn test_digest_ignores_chunk_size(
        data in prop::collection::vec(any::<u8>(), 0..20_000),
        chunk_size in 1usize..5000,
    ) {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&data).unwrap();
        file.flush().unwrap();

        let streamed = hash_file_streaming(file.path(), chunk_size).unwrap();
        prop_assert_eq!(&streamed, &hash_bytes(&data));
        prop_assert_eq!(streamed, hash_file_streaming(file.path(), 0).unwrap());
    }

    #[test]
    fn test_single_byte_change_changes_digest(
        data in prop::collection::vec(any::<u8>(), 1..4096),
        index in any::<prop::sample::Index>(),
        flip in 1u8..=255,
    ) {
        let mut changed = data.clone();
        let i = index.index(changed.len());
        changed[i] ^= flip;
        prop_assert_ne!(hash_bytes(&data), hash_bytes(&changed));
    }

    #[test]
    fn test_manifest_round_trip(records in prop::collection::vec(record_strategy(), 0..30)) {
        let snapshot = Snapshot::from_records(ScanMode::Full, records);
        let encoded = manifest::encode(&snapshot).unwrap();
        let decoded = manifest::decode(&encoded, Path::new("prop.manifest")).unwrap();

        prop_assert_eq!(decoded, Manifest::from_snapshot(snapshot));
    }

    #[test]
    fn test_every_path_is_classified_once(
        baseline_paths in prop::collection::btree_set("[a-e]{1,3}", 0..20),
        fresh_paths in prop::collection::btree_set("[a-e]{1,3}", 0..20),
        mode in prop_oneof![Just(ScanMode::Full), Just(ScanMode::Quick)],
    ) {
        let record = |path: &String| match mode {
            ScanMode::Full => FileRecord::full(PathBuf::from(path), hash_bytes(path.as_bytes()), 1, 1),
            ScanMode::Quick => FileRecord::quick(PathBuf::from(path), 1, 1),
        };
        let baseline = Manifest::from_snapshot(Snapshot::from_records(
            ScanMode::Full,
            baseline_paths.iter().map(|p| FileRecord::full(PathBuf::from(p), hash_bytes(p.as_bytes()), 1, 1)),
        ));
        let fresh = Snapshot::from_records(mode, fresh_paths.iter().map(record));

        let report = Reconciler::default()
            .reconcile_with(&fresh, &baseline, |r| Ok(hash_bytes(r.path.to_string_lossy().as_bytes())))
            .unwrap();

        let union: BTreeSet<PathBuf> = baseline_paths.iter().chain(&fresh_paths).map(PathBuf::from).collect();
        prop_assert_eq!(report.len(), union.len());
        for path in &union {
            let expected = match (baseline_paths.contains(path.to_str().unwrap()), fresh_paths.contains(path.to_str().unwrap())) {
                (true, true) => ChangeKind::Unchanged,
                (true, false) => ChangeKind::Deleted,
                (false, true) => ChangeKind::New,
                (false, false) => unreachable!(),
            };
            prop_assert_eq!(report.classification(path), Some(expected));
        }
    }
}
