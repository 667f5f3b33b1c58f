use crate::common::*;

/// Label given to one sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Annotation {
    pub index: usize,
    pub label: Label,
}

impl From<(usize, Label)> for Annotation {
    fn from((index, label): (usize, Label)) -> Self {
        Self { index, label }
    }
}

/// Ordered annotation results, saved as a JSON list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnnotationStore {
    annotations: Vec<Annotation>,
}

impl AnnotationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("unable to read annotation file '{}'", path.display()))?;
        let store: Self = serde_json::from_str(&text)
            .with_context(|| format!("invalid annotation file '{}'", path.display()))?;
        debug!(
            "loaded {} annotations from '{}'",
            store.len(),
            path.display()
        );
        Ok(store)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let text = serde_json::to_string_pretty(self)?;
        fs::write(path, text)
            .with_context(|| format!("unable to write annotation file '{}'", path.display()))?;
        info!("saved {} annotations to '{}'", self.len(), path.display());
        Ok(())
    }

    pub fn push(&mut self, index: usize, label: Label) {
        self.annotations.push(Annotation { index, label });
    }

    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Annotation> {
        self.annotations.iter()
    }

    pub fn as_slice(&self) -> &[Annotation] {
        &self.annotations
    }

    /// `(index, label)` pairs in stored order.
    pub fn pairs(&self) -> impl Iterator<Item = (usize, Label)> + '_ {
        self.annotations
            .iter()
            .map(|annotation| (annotation.index, annotation.label))
    }

    /// Labels keyed by sample index.
    ///
    /// Fails if an index is labeled twice.
    pub fn to_index_map(&self) -> Result<BTreeMap<usize, Label>> {
        let mut map = BTreeMap::new();
        for Annotation { index, label } in self.annotations.iter().copied() {
            let prev = map.insert(index, label);
            ensure!(prev.is_none(), "sample {} is annotated more than once", index);
        }
        Ok(map)
    }

    /// Number of samples per label, including labels with no samples.
    pub fn label_counts(&self) -> BTreeMap<Label, usize> {
        use label::IntoEnumIterator as _;

        let mut counts: BTreeMap<_, _> = Label::iter().map(|label| (label, 0)).collect();
        self.annotations.iter().for_each(|annotation| {
            *counts.entry(annotation.label).or_default() += 1;
        });
        counts
    }

    /// Indices in `range` without an annotation, in ascending order.
    pub fn pending(&self, range: Range<usize>) -> Vec<usize> {
        let done: HashSet<_> = self
            .annotations
            .iter()
            .map(|annotation| annotation.index)
            .collect();
        range.filter(|index| !done.contains(index)).collect()
    }

    /// Where a resumed session over `range` continues.
    pub fn next_pending(&self, range: Range<usize>) -> Option<usize> {
        self.pending(range).into_iter().next()
    }

    /// Check that the annotations are ordered and cover `0..len` exactly.
    pub fn check_continuity(&self) -> Result<()> {
        for (expect, annotation) in self.annotations.iter().enumerate() {
            ensure!(
                annotation.index == expect,
                "annotation at position {} has index {}, but expect {}",
                expect,
                annotation.index,
                expect
            );
        }
        Ok(())
    }

    /// Concatenate checkpoint results in order.
    ///
    /// The merged store must cover `0..len` without gaps or repeats.
    pub fn merge<I>(stores: I) -> Result<Self>
    where
        I: IntoIterator<Item = Self>,
    {
        let annotations: Vec<_> = stores
            .into_iter()
            .flat_map(|store| store.annotations)
            .collect();
        let merged = Self { annotations };
        merged
            .check_continuity()
            .context("merged annotations are not continuous")?;
        Ok(merged)
    }
}

impl FromIterator<Annotation> for AnnotationStore {
    fn from_iter<T: IntoIterator<Item = Annotation>>(iter: T) -> Self {
        Self {
            annotations: iter.into_iter().collect(),
        }
    }
}

impl FromIterator<(usize, Label)> for AnnotationStore {
    fn from_iter<T: IntoIterator<Item = (usize, Label)>>(iter: T) -> Self {
        iter.into_iter().map(Annotation::from).collect()
    }
}

impl IntoIterator for AnnotationStore {
    type Item = Annotation;
    type IntoIter = std::vec::IntoIter<Annotation>;

    fn into_iter(self) -> Self::IntoIter {
        self.annotations.into_iter()
    }
}
