use crate::{common::*, partition::PartitionIter};

/// One patch to show to an annotator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnnotationRequest {
    /// Position of the sample in the data-source list.
    pub index: usize,
    pub source_id: String,
    /// The sample's input box enlarged by the display margin.
    pub bbox: BBox3<i64>,
}

/// The requests of one checkpointed index range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationBatch {
    pub range: Range<usize>,
    pub requests: Vec<AnnotationRequest>,
}

impl AnnotationBatch {
    /// File name of the checkpoint holding this batch's results.
    pub fn checkpoint_name(&self, stem: &str) -> String {
        checkpoint_name(stem, &self.range)
    }
}

pub fn checkpoint_name(stem: &str, range: &Range<usize>) -> String {
    format!("{}_{}_{}.json", stem, range.start, range.end)
}

/// Input boxes of all sources enlarged by `margin` on the x and y axes.
pub fn expand_all(sources: &[DataSource], margin: i64) -> Result<Vec<BBox3<i64>>> {
    sources
        .iter()
        .map(|source| -> Result<_> { Ok(source.try_input_bbox()?.expand_margin(margin)) })
        .try_collect()
}

/// Expand every sample and group the requests into ranges of `chunk_size`.
pub fn batches(
    sources: &[DataSource],
    margin: i64,
    chunk_size: NonZeroUsize,
) -> Result<Vec<AnnotationBatch>> {
    let bboxes = expand_all(sources, margin)?;

    let batches: Vec<_> = PartitionIter::new(sources.len(), chunk_size)
        .map(|range| {
            let requests = range
                .clone()
                .map(|index| AnnotationRequest {
                    index,
                    source_id: sources[index].id.clone(),
                    bbox: bboxes[index],
                })
                .collect();
            AnnotationBatch { range, requests }
        })
        .collect();

    debug!(
        "prepared {} annotation batches for {} samples",
        batches.len(),
        sources.len()
    );
    Ok(batches)
}
