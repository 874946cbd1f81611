use exif_sorter::metadata::{CREATE_DATE, FILE_MODIFY_DATE, FILE_NAME, MetadataRecord, OFFSET_TIME};
use exif_sorter::{Config, DateResolver, FileRecord, ResolvedDate, Tier, plan_batch};
use std::path::Path;
use tempfile::tempdir;

fn record(name: &str) -> MetadataRecord {
    MetadataRecord::new(&Path::new("/in").join(name)).with(FILE_NAME, name)
}

fn ymd(y: i32, m: u32, d: u32) -> ResolvedDate {
    ResolvedDate::from_ymd(y, m, d).unwrap()
}

#[test]
fn create_date_wins_over_every_other_tier() {
    let resolver = DateResolver::default();
    let rec = record("IMG_20100101_000000.jpg")
        .with(CREATE_DATE, "2019:12:31 23:59:59")
        .with(OFFSET_TIME, "-05:00")
        .with(FILE_MODIFY_DATE, "2024:01:01 00:00:00+00:00");
    let res = resolver.resolve(&rec).unwrap();
    assert_eq!(res.date, ymd(2019, 12, 31));
    assert_eq!(res.tier, Tier::CreateDate);
}

#[test]
fn modify_date_used_when_create_date_missing() {
    let rec = record("photo.jpg").with(FILE_MODIFY_DATE, "2023:05:11 10:00:00");
    let res = DateResolver::default().resolve(&rec).unwrap();
    assert_eq!(res.date, ymd(2023, 5, 11));
    assert_eq!(res.tier, Tier::ModifyDate);
}

#[test]
fn malformed_create_date_falls_through() {
    let rec = record("photo.jpg")
        .with(CREATE_DATE, "0000:00:00 00:00:00")
        .with(FILE_MODIFY_DATE, "2023:05:11 10:00:00+02:00");
    assert_eq!(DateResolver::default().resolve(&rec).unwrap().tier, Tier::ModifyDate);
}

#[test]
fn file_name_is_the_last_resort() {
    let res = DateResolver::default()
        .resolve(&record("IMG_20210304_120000.jpg"))
        .unwrap();
    assert_eq!(res.date, ymd(2021, 3, 4));
    assert_eq!(res.tier, Tier::FileName);
}

#[test]
fn undated_file_is_absent_from_the_plan() {
    let src = tempdir().unwrap();
    let dst = tempdir().unwrap();
    let cfg = Config::new(src.path(), dst.path());
    let dated = FileRecord::from_path(src.path().join("IMG_20210304_120000.jpg")).unwrap();
    let undated = FileRecord::from_path(src.path().join("photo.jpg")).unwrap();
    let records = vec![
        MetadataRecord::new(&undated.path).with(FILE_NAME, "photo.jpg"),
        MetadataRecord::new(&dated.path).with(FILE_NAME, "IMG_20210304_120000.jpg"),
    ];

    let plan = plan_batch(&cfg, &DateResolver::default(), &[dated.clone(), undated.clone()], records);
    assert_eq!(plan.entries.len(), 1);
    assert_eq!(plan.entries[0].source, dated.path);
    assert_eq!(plan.unresolved, [undated.path]);
    assert_eq!(
        plan.entries[0].dest_file(),
        dst.path().join("2021").join("03").join("04").join("IMG_20210304_120000.jpg")
    );
}

#[test]
fn year_directory_is_never_truncated() {
    assert_eq!(ymd(2021, 3, 4).relative_dir(), Path::new("2021").join("03").join("04"));
    assert_eq!(ymd(999, 1, 2).relative_dir(), Path::new("999").join("01").join("02"));
}
