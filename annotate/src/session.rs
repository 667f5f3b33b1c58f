//! Resumable annotation sessions backed by per-batch checkpoint files.

use crate::{
    batch::{self, AnnotationBatch},
    common::*,
    config::Config,
    store::AnnotationStore,
};

/// Progress of one batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BatchStatus {
    Pending,
    Partial { done: usize, total: usize },
    Done,
}

#[derive(Debug, Clone)]
pub struct Session {
    sources: Vec<DataSource>,
    batches: Vec<AnnotationBatch>,
    checkpoint_dir: PathBuf,
    stem: String,
}

impl Session {
    pub fn new(
        sources: Vec<DataSource>,
        margin: i64,
        chunk_size: NonZeroUsize,
        checkpoint_dir: impl Into<PathBuf>,
        stem: impl Into<String>,
    ) -> Result<Self> {
        let batches = batch::batches(&sources, margin, chunk_size)?;
        Ok(Self {
            sources,
            batches,
            checkpoint_dir: checkpoint_dir.into(),
            stem: stem.into(),
        })
    }

    /// Load the configured data sources and prepare the batches.
    pub fn open(config: &Config) -> Result<Self> {
        let sources = datasource::load_short_json(config.datasources_path())?;
        let output_dir = config.output_dir();

        info!(
            "session over {} samples, {} per batch",
            sources.len(),
            config.chunk_size
        );
        Self::new(
            sources,
            config.margin,
            config.chunk_size,
            output_dir,
            config.output_stem.clone(),
        )
    }

    pub fn sources(&self) -> &[DataSource] {
        &self.sources
    }

    pub fn batches(&self) -> &[AnnotationBatch] {
        &self.batches
    }

    pub fn batch(&self, index: usize) -> Result<&AnnotationBatch> {
        self.batches.get(index).ok_or_else(|| {
            format_err!(
                "batch {} does not exist, the session has {} batches",
                index,
                self.batches.len()
            )
        })
    }

    pub fn checkpoint_path(&self, batch: &AnnotationBatch) -> PathBuf {
        self.checkpoint_dir.join(batch.checkpoint_name(&self.stem))
    }

    /// Annotations saved so far for `batch`. A missing file is an empty store.
    pub fn load_checkpoint(&self, batch: &AnnotationBatch) -> Result<AnnotationStore> {
        let path = self.checkpoint_path(batch);
        if !path.exists() {
            return Ok(AnnotationStore::new());
        }
        AnnotationStore::load(path)
    }

    pub fn status(&self) -> Result<Vec<BatchStatus>> {
        self.batches
            .iter()
            .map(|batch| -> Result<_> {
                let store = self.load_checkpoint(batch)?;
                let total = batch.range.len();
                let done = total - store.pending(batch.range.clone()).len();
                let status = match done {
                    0 => BatchStatus::Pending,
                    done if done == total => BatchStatus::Done,
                    done => BatchStatus::Partial { done, total },
                };
                Ok(status)
            })
            .try_collect()
    }

    /// The first batch with unannotated samples and the samples left in it.
    pub fn next_batch(&self) -> Result<Option<(usize, Vec<usize>)>> {
        for (index, batch) in self.batches.iter().enumerate() {
            let pending = self.load_checkpoint(batch)?.pending(batch.range.clone());
            if !pending.is_empty() {
                return Ok(Some((index, pending)));
            }
        }
        Ok(None)
    }

    /// Append `annotations` to the checkpoint of batch `batch_index`.
    ///
    /// Every index must fall into the batch range and must not be annotated
    /// already.
    pub fn record(&self, batch_index: usize, annotations: &AnnotationStore) -> Result<PathBuf> {
        let batch = self.batch(batch_index)?;
        let range = &batch.range;

        if let Some(outside) = annotations
            .iter()
            .find(|annotation| !range.contains(&annotation.index))
        {
            bail!(
                "sample {} does not belong to batch {} ({:?})",
                outside.index,
                batch_index,
                range
            );
        }

        let mut store = self.load_checkpoint(batch)?;
        annotations
            .pairs()
            .for_each(|(index, label)| store.push(index, label));
        store.to_index_map()?;

        self.create_checkpoint_dir()?;
        let path = self.checkpoint_path(batch);
        store.save(&path)?;

        let remaining = store.pending(range.clone()).len();
        if remaining == 0 {
            info!("batch {} ({:?}) is complete", batch_index, range);
        } else {
            info!(
                "batch {} ({:?}) has {} samples left",
                batch_index, range, remaining
            );
        }
        Ok(path)
    }

    /// Merge all checkpoints into one store ordered by sample index.
    ///
    /// Creates the output directory so the result can be saved to
    /// [Session::merged_path].
    pub fn merge(&self) -> Result<AnnotationStore> {
        self.create_checkpoint_dir()?;
        let stores: Vec<_> = self
            .batches
            .iter()
            .map(|batch| -> Result<_> {
                let path = self.checkpoint_path(batch);
                ensure!(
                    path.exists(),
                    "checkpoint '{}' is missing",
                    path.display()
                );
                let store = AnnotationStore::load(&path)?;
                let sorted: AnnotationStore = store
                    .to_index_map()?
                    .into_iter()
                    .collect();
                Ok(sorted)
            })
            .try_collect()?;

        let merged = AnnotationStore::merge(stores)?;
        ensure!(
            merged.len() == self.sources.len(),
            "merged {} annotations, but the session has {} samples",
            merged.len(),
            self.sources.len()
        );
        Ok(merged)
    }

    pub fn merged_path(&self) -> PathBuf {
        self.checkpoint_dir.join(format!("{}.json", self.stem))
    }

    fn create_checkpoint_dir(&self) -> Result<()> {
        let dir = &self.checkpoint_dir;
        fs::create_dir_all(dir)
            .with_context(|| format!("unable to create output directory '{}'", dir.display()))
    }
}
