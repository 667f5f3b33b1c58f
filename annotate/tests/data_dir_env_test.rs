use annotate::{Config, DATA_DIR_ENV};
use datasource::TargetKind;
use std::{env, num::NonZeroUsize, path::Path};

// The variable is process-wide, so all checks stay in one test.
#[test]
fn data_dir_env_overrides_config() {
    let config = Config {
        data_dir: Some("/data/genEM3".into()),
        datasources_file: "sources.json".into(),
        margin: 35,
        chunk_size: NonZeroUsize::new(1000).unwrap(),
        output_dir: "/abs/out".into(),
        output_stem: "labels".into(),
        target_kind: TargetKind::Binary,
    };

    env::set_var(DATA_DIR_ENV, "/mnt/em");
    assert_eq!(config.data_dir().as_deref(), Some(Path::new("/mnt/em")));
    assert_eq!(
        config.datasources_path(),
        Path::new("/mnt/em/sources.json")
    );
    assert_eq!(config.output_dir(), Path::new("/abs/out"));

    // an empty value falls back to the configured directory
    env::set_var(DATA_DIR_ENV, "");
    assert_eq!(
        config.datasources_path(),
        Path::new("/data/genEM3/sources.json")
    );

    env::remove_var(DATA_DIR_ENV);
    assert_eq!(config.data_dir().as_deref(), Some(Path::new("/data/genEM3")));
}
