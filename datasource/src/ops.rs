use crate::{common::*, load_short_json, DataSource, Target, TargetKind};
use label::Label;

/// Concatenate the sources of several files and renumber the ids
/// sequentially from zero.
pub fn concat<P>(paths: impl IntoIterator<Item = P>) -> Result<Vec<DataSource>>
where
    P: AsRef<Path>,
{
    let mut all = vec![];
    for path in paths {
        let sources = load_short_json(path)?;
        all.extend(sources);
    }

    let all = all
        .into_iter()
        .enumerate()
        .map(|(index, source)| DataSource {
            id: index.to_string(),
            ..source
        })
        .collect();
    Ok(all)
}

/// A data source on which two files disagree about the target.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TargetDiff {
    pub key: String,
    pub targets: [Option<Target>; 2],
}

/// Compare the targets of two source lists describing the same samples.
///
/// The lists must have the same length, and the sources must pairwise agree
/// on every field except `target_class`.
pub fn compare_targets(lhs: &[DataSource], rhs: &[DataSource]) -> Result<Vec<TargetDiff>> {
    ensure!(
        lhs.len() == rhs.len(),
        "data source lists differ in length: {} vs {}",
        lhs.len(),
        rhs.len()
    );

    let mut diffs = vec![];

    for (index, (lsource, rsource)) in lhs.iter().zip(rhs).enumerate() {
        ensure!(
            lsource.id == rsource.id,
            "data source {} has mismatched ids '{}' and '{}'",
            index,
            lsource.id,
            rsource.id
        );

        let without_target = |source: &DataSource| DataSource {
            target_class: None,
            ..source.clone()
        };
        ensure!(
            without_target(lsource) == without_target(rsource),
            "data source '{}' differs in fields other than target_class",
            lsource.id
        );

        if lsource.target_class != rsource.target_class {
            diffs.push(TargetDiff {
                key: lsource.key(),
                targets: [lsource.target_class.clone(), rsource.target_class.clone()],
            });
        }
    }

    if !diffs.is_empty() {
        info!("{} of {} data sources differ in target", diffs.len(), lhs.len());
    }

    Ok(diffs)
}

/// A copy of `template` whose input and target boxes are its `index`-th
/// aligned tile of size `extent`.
pub fn tile_from_template(
    template: &DataSource,
    extent: [i64; 3],
    index: usize,
) -> Result<DataSource> {
    let bbox = template.try_input_bbox()?.tile_at(extent, index)?;
    Ok(DataSource {
        input_bbox: Some(bbox),
        target_bbox: Some(bbox),
        ..template.clone()
    })
}

/// Write annotation labels into the `target_class` of the sources at the
/// given sample indices.
///
/// All indices are checked before any source is modified.
pub fn apply_labels<I>(sources: &mut [DataSource], labels: I, kind: TargetKind) -> Result<usize>
where
    I: IntoIterator<Item = (usize, Label)>,
{
    let labels: Vec<_> = labels.into_iter().collect();

    if let Some((index, _)) = labels.iter().find(|(index, _)| *index >= sources.len()) {
        bail!(
            "sample index {} is out of range 0..{}",
            index,
            sources.len()
        );
    }

    labels.iter().for_each(|&(index, label)| {
        sources[index].target_class = Some(Target::from_label(label, kind));
    });

    Ok(labels.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bbox::BBox3;

    fn labeled(id: &str, label: Option<Label>) -> DataSource {
        DataSource {
            input_bbox: Some(BBox3::from_xyzd([0, 0, 0, 140, 140, 1])),
            target_class: label.map(|label| Target::from_label(label, TargetKind::Binary)),
            ..DataSource::new(id)
        }
    }

    #[test]
    fn compare_reports_target_differences() {
        let lhs = vec![
            labeled("0", Some(Label::Clean)),
            labeled("1", Some(Label::Debris)),
            labeled("2", None),
        ];
        let rhs = vec![
            labeled("0", Some(Label::Clean)),
            labeled("1", Some(Label::Myelin)),
            labeled("2", Some(Label::Debris)),
        ];

        let diffs = compare_targets(&lhs, &rhs).unwrap();
        assert_eq!(diffs.len(), 2);
        assert_eq!(diffs[0].key, "datasource_1");
        assert_eq!(
            diffs[0].targets[1].as_ref().and_then(Target::to_label),
            Some(Label::Myelin)
        );
        assert_eq!(diffs[1].targets[0], None);
    }

    #[test]
    fn compare_rejects_mismatched_sources() {
        let lhs = vec![labeled("0", None)];
        assert!(compare_targets(&lhs, &[]).is_err());
        assert!(compare_targets(&lhs, &[labeled("1", None)]).is_err());

        let mut moved = labeled("0", None);
        moved.input_bbox = Some(BBox3::from_xyzd([1, 0, 0, 140, 140, 1]));
        assert!(compare_targets(&lhs, &[moved]).is_err());
    }

    #[test]
    fn tile_template() {
        let template = DataSource {
            input_bbox: Some(BBox3::from_xyzd([0, 0, 0, 1000, 1000, 10])),
            ..DataSource::new("template")
        };
        let tile = tile_from_template(&template, [500, 500, 10], 3).unwrap();
        assert_eq!(tile.input_bbox.unwrap().xyzd(), [500, 500, 0, 500, 500, 10]);
        assert_eq!(tile.target_bbox, tile.input_bbox);
        assert!(tile_from_template(&template, [500, 500, 10], 4).is_err());
    }

    #[test]
    fn apply_labels_to_sources() {
        let mut sources = vec![labeled("0", None), labeled("1", None)];
        let count =
            apply_labels(&mut sources, [(1, Label::Debris)], TargetKind::Index).unwrap();
        assert_eq!(count, 1);
        assert_eq!(sources[0].target_class, None);
        assert_eq!(sources[1].target_class, Some(Target::Scalar(r64(1.0))));
        assert!(apply_labels(&mut sources, [(2, Label::Clean)], TargetKind::Index).is_err());
    }

    #[test]
    fn apply_labels_out_of_range_keeps_sources() {
        let mut sources = vec![labeled("0", None), labeled("1", Some(Label::Myelin))];
        let before = sources.clone();

        let labels = [(0, Label::Debris), (5, Label::Clean)];
        assert!(apply_labels(&mut sources, labels, TargetKind::Index).is_err());
        assert_eq!(sources, before);
    }
}
