use crate::{common::*, store::AnnotationStore};

/// A sample two annotation passes labeled differently.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Disagreement {
    pub index: usize,
    pub source_id: String,
    pub bbox: BBox3<i64>,
    /// Center of the box, used to place a marker in a viewer.
    pub center: [i64; 3],
    pub labels: [Label; 2],
}

/// Indices labeled differently by two passes over the same samples.
///
/// Both passes must annotate exactly the same index set.
pub fn disagreements(
    lhs: &AnnotationStore,
    rhs: &AnnotationStore,
) -> Result<Vec<(usize, [Label; 2])>> {
    let lhs = lhs.to_index_map()?;
    let rhs = rhs.to_index_map()?;

    ensure!(
        lhs.len() == rhs.len(),
        "annotation passes differ in length: {} vs {}",
        lhs.len(),
        rhs.len()
    );

    lhs.iter()
        .zip(&rhs)
        .filter_map(|((&lindex, &llabel), (&rindex, &rlabel))| {
            if lindex != rindex {
                return Some(Err(format_err!(
                    "annotation passes cover different samples: {} vs {}",
                    lindex,
                    rindex
                )));
            }
            (llabel != rlabel).then(|| Ok((lindex, [llabel, rlabel])))
        })
        .try_collect()
}

/// Disagreements between two named annotation passes, resolved to boxes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisagreementReport {
    pub annotators: [String; 2],
    pub num_samples: usize,
    pub items: Vec<Disagreement>,
}

impl DisagreementReport {
    pub fn new(
        annotators: [String; 2],
        lhs: &AnnotationStore,
        rhs: &AnnotationStore,
        sources: &[DataSource],
    ) -> Result<Self> {
        let items: Vec<_> = disagreements(lhs, rhs)?
            .into_iter()
            .map(|(index, labels)| -> Result<_> {
                let source = sources.get(index).ok_or_else(|| {
                    format_err!(
                        "sample index {} is out of range 0..{}",
                        index,
                        sources.len()
                    )
                })?;
                let bbox = *source.try_input_bbox()?;
                let [x, y, z] = bbox.corner_min();
                let [dx, dy, dz] = bbox.extent();
                Ok(Disagreement {
                    index,
                    source_id: source.id.clone(),
                    bbox,
                    center: [x + dx / 2, y + dy / 2, z + dz / 2],
                    labels,
                })
            })
            .try_collect()?;

        if items.is_empty() {
            info!("'{}' and '{}' fully agree", annotators[0], annotators[1]);
        } else {
            warn!(
                "'{}' and '{}' disagree on {} of {} samples",
                annotators[0],
                annotators[1],
                items.len(),
                lhs.len()
            );
        }

        Ok(Self {
            annotators,
            num_samples: lhs.len(),
            items,
        })
    }

    /// Fraction of samples both passes agree on. An empty comparison counts
    /// as full agreement.
    pub fn agreement(&self) -> f64 {
        if self.num_samples == 0 {
            return 1.0;
        }
        1.0 - self.items.len() as f64 / self.num_samples as f64
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let text = serde_json::to_string_pretty(self)?;
        fs::write(path, text)
            .with_context(|| format!("unable to write report '{}'", path.display()))?;
        info!("saved disagreement report '{}'", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn pass(labels: &[Label]) -> AnnotationStore {
        labels.iter().copied().enumerate().collect()
    }

    #[test]
    fn find_disagreements() {
        let lhs = pass(&[Label::Clean, Label::Debris, Label::Myelin]);
        let rhs = pass(&[Label::Clean, Label::Myelin, Label::Myelin]);
        let diffs = disagreements(&lhs, &rhs).unwrap();
        assert_eq!(diffs, vec![(1, [Label::Debris, Label::Myelin])]);
    }

    #[test]
    fn mismatched_passes() {
        let lhs = pass(&[Label::Clean, Label::Debris]);
        let rhs = pass(&[Label::Clean]);
        assert!(disagreements(&lhs, &rhs).is_err());

        let shifted: AnnotationStore = [(1usize, Label::Clean), (2, Label::Debris)]
            .into_iter()
            .collect();
        assert!(disagreements(&lhs, &shifted).is_err());
    }

    #[test]
    fn report_items() {
        let sources: Vec<_> = (0..2)
            .map(|index| DataSource {
                input_bbox: Some(BBox3::from_xyzd([index * 140, 0, 0, 140, 140, 1])),
                ..DataSource::new(format!("{}", index))
            })
            .collect();
        let lhs = pass(&[Label::Clean, Label::Clean]);
        let rhs = pass(&[Label::Clean, Label::Debris]);

        let report =
            DisagreementReport::new(["a".into(), "b".into()], &lhs, &rhs, &sources).unwrap();
        assert_eq!(report.items.len(), 1);
        assert_eq!(report.items[0].source_id, "1");
        assert_eq!(report.items[0].center, [210, 70, 0]);
        assert_abs_diff_eq!(report.agreement(), 0.5);

        let short_sources = &sources[..1];
        let result = DisagreementReport::new(["a".into(), "b".into()], &lhs, &rhs, short_sources);
        assert!(result.is_err());
    }
}
