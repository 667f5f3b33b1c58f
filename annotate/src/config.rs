//! Annotation session configuration format.

use crate::common::*;
use datasource::TargetKind;

/// Environment variable overriding the configured data directory.
pub const DATA_DIR_ENV: &str = "EM_DATA_DIR";

/// The main session configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Base directory for relative paths.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    /// Data-source file listing the samples, in long or short layout.
    pub datasources_file: PathBuf,
    /// Margin added around each sample box before display.
    #[serde(default = "default_margin")]
    pub margin: i64,
    /// Number of samples per checkpoint.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: NonZeroUsize,
    /// Directory receiving checkpoints and merged results.
    pub output_dir: PathBuf,
    #[serde(default = "default_output_stem")]
    pub output_stem: String,
    /// Encoding of labels when written back into data sources.
    #[serde(default)]
    pub target_kind: TargetKind,
}

impl Config {
    pub fn open<P>(path: P) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        let text = std::fs::read_to_string(path)?;
        let config = json5::from_str(&text)?;
        Ok(config)
    }

    /// The data directory, with the environment variable taking precedence.
    pub fn data_dir(&self) -> Option<PathBuf> {
        match env::var_os(DATA_DIR_ENV) {
            Some(dir) if !dir.is_empty() => Some(PathBuf::from(dir)),
            _ => self.data_dir.clone(),
        }
    }

    /// Resolve `path` against the data directory if it is relative.
    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        match self.data_dir() {
            Some(dir) if path.is_relative() => dir.join(path),
            _ => path.to_owned(),
        }
    }

    pub fn datasources_path(&self) -> PathBuf {
        self.resolve(&self.datasources_file)
    }

    pub fn output_dir(&self) -> PathBuf {
        self.resolve(&self.output_dir)
    }
}

fn default_margin() -> i64 {
    35
}

fn default_chunk_size() -> NonZeroUsize {
    NonZeroUsize::new(1000).unwrap()
}

fn default_output_stem() -> String {
    "annotations".into()
}
