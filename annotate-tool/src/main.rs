use annotate::{AnnotationStore, BatchStatus, Config, DisagreementReport, Session};
use anyhow::{ensure, Context, Result};
use clap::Parser;
use datasource::{DataSource, TargetKind};
use log::info;
use prettytable::{cell, row, Table};
use std::{
    fs,
    path::{Path, PathBuf},
};

#[derive(Debug, Clone, Parser)]
/// Prepare, checkpoint and compare manual annotations of EM patches.
enum Opts {
    /// Print the index ranges of a partition.
    Partition {
        /// number of samples
        total: usize,
        /// samples per range
        chunk_size: usize,
    },
    /// Print the input boxes of a data-source file enlarged by a margin.
    Expand {
        /// data-source file
        datasources_file: PathBuf,
        #[clap(long, default_value = "35")]
        margin: i64,
    },
    /// Show the progress of each batch in a session.
    Status {
        /// session configuration file
        config_file: PathBuf,
    },
    /// Write the pending requests of the next unfinished batch.
    Next {
        /// session configuration file
        config_file: PathBuf,
        /// output JSON file, printed to stdout if omitted
        output_file: Option<PathBuf>,
    },
    /// Append annotation results to a batch checkpoint.
    Record {
        /// session configuration file
        config_file: PathBuf,
        /// batch index
        batch: usize,
        /// annotation JSON file
        annotations_file: PathBuf,
    },
    /// Merge all batch checkpoints of a session.
    Merge {
        /// session configuration file
        config_file: PathBuf,
    },
    /// Write merged session annotations into the targets of the data sources.
    Apply {
        /// session configuration file
        config_file: PathBuf,
        /// merged annotation JSON file
        annotations_file: PathBuf,
        /// output data-source file
        output_file: PathBuf,
    },
    /// Concatenate data-source files and renumber their ids.
    Concat {
        /// output data-source file
        #[clap(long, short)]
        output_file: PathBuf,
        /// write the layout with shared properties
        #[clap(long)]
        short: bool,
        /// input data-source files
        input_files: Vec<PathBuf>,
    },
    /// List the data sources two files label differently.
    Compare {
        first_file: PathBuf,
        second_file: PathBuf,
    },
    /// Report samples two annotation passes label differently.
    Disagreements {
        /// session configuration file
        config_file: PathBuf,
        first_file: PathBuf,
        second_file: PathBuf,
        /// output report file
        output_file: PathBuf,
        /// annotator names
        #[clap(long, number_of_values = 2)]
        names: Option<Vec<String>>,
    },
    /// Crop an aligned tile out of a template data source.
    Tile {
        /// template data-source file
        template_file: PathBuf,
        /// output data-source file
        output_file: PathBuf,
        /// tile extent along x, y and z
        #[clap(long, number_of_values = 3, required = true)]
        extent: Vec<i64>,
        /// linear tile index
        #[clap(long)]
        index: usize,
        /// position of the template within the file
        #[clap(long, default_value = "0")]
        source: usize,
    },
}

fn main() -> Result<()> {
    pretty_env_logger::init();

    match Opts::parse() {
        Opts::Partition { total, chunk_size } => partition(total, chunk_size)?,
        Opts::Expand {
            datasources_file,
            margin,
        } => expand(datasources_file, margin)?,
        Opts::Status { config_file } => status(config_file)?,
        Opts::Next {
            config_file,
            output_file,
        } => next(config_file, output_file)?,
        Opts::Record {
            config_file,
            batch,
            annotations_file,
        } => record(config_file, batch, annotations_file)?,
        Opts::Merge { config_file } => merge(config_file)?,
        Opts::Apply {
            config_file,
            annotations_file,
            output_file,
        } => apply(config_file, annotations_file, output_file)?,
        Opts::Concat {
            output_file,
            short,
            input_files,
        } => concat(&input_files, output_file, short)?,
        Opts::Compare {
            first_file,
            second_file,
        } => compare(first_file, second_file)?,
        Opts::Disagreements {
            config_file,
            first_file,
            second_file,
            output_file,
            names,
        } => disagreements(config_file, first_file, second_file, output_file, names)?,
        Opts::Tile {
            template_file,
            output_file,
            extent,
            index,
            source,
        } => tile(template_file, output_file, &extent, index, source)?,
    }

    Ok(())
}

fn open_session(config_file: impl AsRef<Path>) -> Result<(Config, Session)> {
    let config_file = config_file.as_ref();
    let config = Config::open(config_file)
        .with_context(|| format!("failed to load config file '{}'", config_file.display()))?;
    let session = Session::open(&config)?;
    Ok((config, session))
}

fn partition(total: usize, chunk_size: usize) -> Result<()> {
    let ranges = annotate::partition_ranges(total, chunk_size)?;

    let mut table = Table::new();
    table.add_row(row!["index", "start", "end", "len"]);
    ranges.iter().enumerate().for_each(|(index, range)| {
        table.add_row(row![index, range.start, range.end, range.len()]);
    });
    table.printstd();

    Ok(())
}

fn expand(datasources_file: impl AsRef<Path>, margin: i64) -> Result<()> {
    let sources = datasource::load_short_json(datasources_file)?;
    let expanded = annotate::expand_all(&sources, margin)?;

    let mut table = Table::new();
    table.add_row(row!["index", "id", "input bbox", "expanded bbox"]);
    sources
        .iter()
        .zip(&expanded)
        .enumerate()
        .for_each(|(index, (source, bbox))| {
            let input = source
                .input_bbox
                .map(|bbox| format!("{:?}", bbox.xyzd()))
                .unwrap_or_default();
            table.add_row(row![index, source.id, input, format!("{:?}", bbox.xyzd())]);
        });
    table.printstd();

    Ok(())
}

fn status(config_file: impl AsRef<Path>) -> Result<()> {
    let (_, session) = open_session(config_file)?;
    let statuses = session.status()?;

    let mut table = Table::new();
    table.add_row(row!["batch", "range", "checkpoint", "status"]);
    session
        .batches()
        .iter()
        .zip(statuses)
        .enumerate()
        .for_each(|(index, (batch, status))| {
            let status = match status {
                BatchStatus::Pending => "pending".to_string(),
                BatchStatus::Partial { done, total } => format!("{}/{}", done, total),
                BatchStatus::Done => "done".to_string(),
            };
            table.add_row(row![
                index,
                format!("{:?}", batch.range),
                session.checkpoint_path(batch).display(),
                status
            ]);
        });
    table.printstd();

    Ok(())
}

fn next(config_file: impl AsRef<Path>, output_file: Option<PathBuf>) -> Result<()> {
    let (_, session) = open_session(config_file)?;

    let (batch_index, pending) = match session.next_batch()? {
        Some(next) => next,
        None => {
            info!("all batches are complete");
            return Ok(());
        }
    };

    let batch = session.batch(batch_index)?;
    let requests: Vec<_> = batch
        .requests
        .iter()
        .filter(|request| pending.contains(&request.index))
        .collect();
    info!(
        "batch {} has {} pending requests",
        batch_index,
        requests.len()
    );

    let text = serde_json::to_string_pretty(&requests)?;
    match output_file {
        Some(path) => fs::write(&path, text)
            .with_context(|| format!("unable to write '{}'", path.display()))?,
        None => println!("{}", text),
    }

    Ok(())
}

fn record(
    config_file: impl AsRef<Path>,
    batch: usize,
    annotations_file: impl AsRef<Path>,
) -> Result<()> {
    let (_, session) = open_session(config_file)?;
    let annotations = AnnotationStore::load(annotations_file)?;
    session.record(batch, &annotations)?;
    Ok(())
}

fn merge(config_file: impl AsRef<Path>) -> Result<()> {
    let (_, session) = open_session(config_file)?;
    let merged = session.merge()?;
    merged.save(session.merged_path())?;

    let mut table = Table::new();
    table.add_row(row!["label", "target index", "count"]);
    merged.label_counts().into_iter().for_each(|(label, count)| {
        table.add_row(row![label, label.target_index(), count]);
    });
    table.printstd();

    Ok(())
}

fn apply(
    config_file: impl AsRef<Path>,
    annotations_file: impl AsRef<Path>,
    output_file: impl AsRef<Path>,
) -> Result<()> {
    let (config, session) = open_session(config_file)?;
    let annotations = AnnotationStore::load(annotations_file)?;
    annotations.check_continuity()?;
    ensure!(
        annotations.len() == session.sources().len(),
        "{} annotations are given for {} samples",
        annotations.len(),
        session.sources().len()
    );

    let mut sources: Vec<DataSource> = session.sources().to_vec();
    let kind: TargetKind = config.target_kind;
    datasource::apply_labels(&mut sources, annotations.pairs(), kind)?;
    datasource::save_json(&sources, output_file)?;
    Ok(())
}

fn concat(input_files: &[PathBuf], output_file: impl AsRef<Path>, short: bool) -> Result<()> {
    ensure!(!input_files.is_empty(), "no input files are given");
    let sources = datasource::concat(input_files)?;
    info!(
        "concatenated {} data sources from {} files",
        sources.len(),
        input_files.len()
    );

    if short {
        datasource::save_short_json(&sources, output_file)?;
    } else {
        datasource::save_json(&sources, output_file)?;
    }
    Ok(())
}

fn compare(first_file: impl AsRef<Path>, second_file: impl AsRef<Path>) -> Result<()> {
    let first_file = first_file.as_ref();
    let second_file = second_file.as_ref();
    let first = datasource::load_short_json(first_file)?;
    let second = datasource::load_short_json(second_file)?;
    let diffs = datasource::compare_targets(&first, &second)?;

    let target_str = |target: &Option<datasource::Target>| -> String {
        match target {
            Some(target) => match target.to_label() {
                Some(label) => format!("{} {:?}", label, label.binary_targets()),
                None => format!("{:?}", target),
            },
            None => datasource::UNSET.to_string(),
        }
    };

    let mut table = Table::new();
    table.add_row(row![
        "key",
        first_file.display(),
        second_file.display()
    ]);
    diffs.iter().for_each(|diff| {
        table.add_row(row![
            diff.key,
            target_str(&diff.targets[0]),
            target_str(&diff.targets[1])
        ]);
    });
    table.printstd();

    Ok(())
}

fn disagreements(
    config_file: impl AsRef<Path>,
    first_file: impl AsRef<Path>,
    second_file: impl AsRef<Path>,
    output_file: impl AsRef<Path>,
    names: Option<Vec<String>>,
) -> Result<()> {
    let first_file = first_file.as_ref();
    let second_file = second_file.as_ref();
    let (_, session) = open_session(config_file)?;
    let first = AnnotationStore::load(first_file)?;
    let second = AnnotationStore::load(second_file)?;

    let annotators = match names {
        Some(names) => {
            let [first, second]: [String; 2] = names
                .try_into()
                .map_err(|_| anyhow::anyhow!("exactly two annotator names are expected"))?;
            [first, second]
        }
        None => [
            first_file.display().to_string(),
            second_file.display().to_string(),
        ],
    };

    let report = DisagreementReport::new(annotators, &first, &second, session.sources())?;
    report.save(output_file)?;

    let mut table = Table::new();
    table.add_row(row![
        "index",
        "id",
        "center",
        &report.annotators[0],
        &report.annotators[1]
    ]);
    report.items.iter().for_each(|item| {
        table.add_row(row![
            item.index,
            item.source_id,
            format!("{:?}", item.center),
            item.labels[0],
            item.labels[1]
        ]);
    });
    table.printstd();
    println!("agreement: {:.2}%", report.agreement() * 100.0);

    Ok(())
}

fn tile(
    template_file: impl AsRef<Path>,
    output_file: impl AsRef<Path>,
    extent: &[i64],
    index: usize,
    source: usize,
) -> Result<()> {
    let extent: [i64; 3] = extent
        .try_into()
        .map_err(|_| anyhow::anyhow!("the tile extent must have three values"))?;
    let sources = datasource::load_short_json(template_file)?;
    let template = sources.get(source).ok_or_else(|| {
        anyhow::anyhow!(
            "source {} is out of range, the file has {} sources",
            source,
            sources.len()
        )
    })?;

    let tile = datasource::tile_from_template(template, extent, index)?;
    if let Some(bbox) = &tile.input_bbox {
        info!("tile {} is {:?}", index, bbox.xyzd());
    }
    datasource::save_json(&[tile], output_file)?;
    Ok(())
}
