use anyhow::Result;
use annotate::{AnnotationStore, BatchStatus, Config, DisagreementReport, Session};
use bbox::BBox3;
use datasource::{DataSource, TargetKind};
use label::Label;
use std::num::NonZeroUsize;

fn write_sources(path: &std::path::Path, count: usize) -> Result<Vec<DataSource>> {
    let sources: Vec<_> = (0..count)
        .map(|index| DataSource {
            input_path: Some("/wkw/color/1".into()),
            input_bbox: Some(BBox3::from_xyzd([
                25000 + 140 * index as i64,
                13000,
                3000,
                140,
                140,
                1,
            ])),
            ..DataSource::new(index.to_string())
        })
        .collect();
    datasource::save_short_json(&sources, path)?;
    Ok(sources)
}

fn config(dir: &std::path::Path) -> Config {
    Config {
        data_dir: Some(dir.to_owned()),
        datasources_file: "sources.json".into(),
        margin: 35,
        chunk_size: NonZeroUsize::new(4).unwrap(),
        output_dir: "checkpoints".into(),
        output_stem: "labels".into(),
        target_kind: TargetKind::Binary,
    }
}

fn labels(range: std::ops::Range<usize>, label: Label) -> AnnotationStore {
    range.map(|index| (index, label)).collect()
}

#[test]
fn resumable_session() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let sources = write_sources(&dir.path().join("sources.json"), 10)?;
    let config = config(dir.path());
    std::env::remove_var(annotate::DATA_DIR_ENV);

    let session = Session::open(&config)?;
    assert_eq!(session.sources(), sources.as_slice());
    assert_eq!(session.batches().len(), 3);
    assert_eq!(
        session.batches()[0].requests[0].bbox.xyzd(),
        [24965, 12965, 3000, 210, 210, 1]
    );
    assert_eq!(
        session.status()?,
        vec![BatchStatus::Pending, BatchStatus::Pending, BatchStatus::Pending]
    );

    session.next_batch()?;
    assert!(!dir.path().join("checkpoints").exists());

    // first batch in two sittings
    session.record(0, &labels(0..2, Label::Clean))?;
    assert_eq!(session.next_batch()?, Some((0, vec![2, 3])));
    session.record(0, &labels(2..4, Label::Debris))?;
    assert!(session.record(0, &labels(3..4, Label::Debris)).is_err());
    assert!(session.record(1, &labels(0..1, Label::Debris)).is_err());

    session.record(1, &labels(4..8, Label::Myelin))?;
    session.record(2, &labels(8..9, Label::Clean))?;
    assert_eq!(
        session.status()?,
        vec![
            BatchStatus::Done,
            BatchStatus::Done,
            BatchStatus::Partial { done: 1, total: 2 }
        ]
    );
    assert!(session.merge().is_err());

    session.record(2, &labels(9..10, Label::Clean))?;
    assert_eq!(session.next_batch()?, None);

    let merged = session.merge()?;
    assert_eq!(merged.len(), 10);
    merged.check_continuity()?;
    assert!(dir
        .path()
        .join("checkpoints")
        .join("labels_8_10.json")
        .is_file());

    // a second pass that sees debris where the first saw myelin
    let mut second = AnnotationStore::new();
    merged.pairs().for_each(|(index, label)| {
        let label = if index == 5 { Label::Debris } else { label };
        second.push(index, label);
    });
    let report = DisagreementReport::new(
        ["first".into(), "second".into()],
        &merged,
        &second,
        session.sources(),
    )?;
    assert_eq!(report.items.len(), 1);
    assert_eq!(report.items[0].labels, [Label::Myelin, Label::Debris]);
    assert_eq!(report.items[0].source_id, "5");

    let mut labeled = session.sources().to_vec();
    datasource::apply_labels(&mut labeled, merged.pairs(), config.target_kind)?;
    assert_eq!(labeled[5].label(), Some(Label::Myelin));
    Ok(())
}
