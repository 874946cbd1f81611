mod common;

use common::{RecordingSource, write};
use exif_sorter::{Config, SorterError, run};
use tempfile::tempdir;

#[test]
fn failed_metadata_batch_does_not_stop_the_run() -> Result<(), Box<dyn std::error::Error>> {
    let src = tempdir()?;
    let dst = tempdir()?;
    for i in 1..=5 {
        write(&src.path().join(format!("2020010{i}.jpg")), b"x");
    }
    let mut cfg = Config::new(src.path(), dst.path());
    cfg.batch_size = 2;
    let mut source = RecordingSource {
        fail_on: vec![2],
        ..Default::default()
    };

    let report = run(&cfg, &mut source)?;
    assert_eq!(source.calls, [2, 2, 1]);
    assert_eq!(report.failed_batches, 1);
    assert_eq!(report.copied, 3);
    assert!(dst.path().join("2020/01/01/20200101.jpg").exists());
    assert!(!dst.path().join("2020/01/03/20200103.jpg").exists());
    assert!(dst.path().join("2020/01/05/20200105.jpg").exists());
    Ok(())
}

#[test]
fn every_batch_failing_is_reported() {
    let src = tempdir().unwrap();
    let dst = tempdir().unwrap();
    write(&src.path().join("20200101.jpg"), b"x");
    write(&src.path().join("20200102.jpg"), b"x");
    let mut cfg = Config::new(src.path(), dst.path());
    cfg.batch_size = 1;
    let mut source = RecordingSource {
        fail_on: vec![1, 2],
        ..Default::default()
    };

    let err = run(&cfg, &mut source).unwrap_err();
    let se = err.downcast_ref::<SorterError>().unwrap();
    assert!(matches!(se, SorterError::AllBatchesFailed { batches: 2 }));
    assert_eq!(se.code(), 22);
}

#[test]
fn destination_nested_in_source_is_not_rescanned() -> Result<(), Box<dyn std::error::Error>> {
    let src = tempdir()?;
    let nested = src.path().join("sorted");
    write(&nested.join("2019/01/01/20190101.jpg"), b"old");
    write(&src.path().join("20200101.jpg"), b"new");

    let mut source = RecordingSource::default();
    let report = run(&Config::new(src.path(), &nested), &mut source)?;
    assert_eq!(report.files_scanned, 1);
    assert!(nested.join("2020/01/01/20200101.jpg").exists());
    Ok(())
}
