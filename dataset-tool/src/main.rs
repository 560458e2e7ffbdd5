use anyhow::{Context, Result};
use clap::Parser;
use label::LABEL_ROW_LEN;
use log::info;
use prettytable::{cell, row, Table};
use rand::{rngs::StdRng, SeedableRng};
use std::{
    env,
    num::NonZeroUsize,
    path::{Path, PathBuf},
};
use yolo_dataset::{scheduler::multiscale_shape, Config, SampleLoader};

#[derive(Debug, Clone, Parser)]
/// Inspect detection datasets described by sample loader configuration files
enum Opts {
    /// List the samples in the manifests
    Info {
        /// configuration file
        config_file: PathBuf,
        /// maximum number of listed samples
        #[clap(long, default_value = "20")]
        limit: usize,
    },
    /// Load samples in order and report their tensors
    Sample {
        /// configuration file
        config_file: PathBuf,
        /// sample indexes, all samples if not specified
        indexes: Vec<usize>,
    },
    /// Draw input shapes from the multi-scale schedule
    Schedule {
        /// batch size
        #[clap(long)]
        batch_size: NonZeroUsize,
        /// number of seen samples
        #[clap(long)]
        seen: usize,
        /// number of drawn shapes
        #[clap(long, default_value = "10")]
        draws: usize,
        /// random seed
        #[clap(long)]
        seed: Option<u64>,
    },
}

fn main() -> Result<()> {
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    pretty_env_logger::init();

    match Opts::parse() {
        Opts::Info { config_file, limit } => {
            info(config_file, limit)?;
        }
        Opts::Sample {
            config_file,
            indexes,
        } => {
            sample(config_file, indexes)?;
        }
        Opts::Schedule {
            batch_size,
            seen,
            draws,
            seed,
        } => {
            schedule(batch_size, seen, draws, seed);
        }
    }

    Ok(())
}

fn open_loader(config_file: &Path) -> Result<SampleLoader> {
    let config = Config::open(config_file)
        .with_context(|| format!("failed to load config file '{}'", config_file.display()))?;
    SampleLoader::open(config)
}

fn info(config_file: impl AsRef<Path>, limit: usize) -> Result<()> {
    let loader = open_loader(config_file.as_ref())?;
    let index = loader.index();

    let mut table = Table::new();
    table.add_row(row!["index", "image", "label", "derived"]);

    index
        .entries()
        .iter()
        .enumerate()
        .take(limit)
        .for_each(|(nth, entry)| {
            table.add_row(row![
                nth,
                entry.image_path.display(),
                entry.resolve_label_path().display(),
                entry.label_path.is_none(),
            ]);
        });

    table.printstd();
    info!("{} samples in total", index.len());

    Ok(())
}

fn sample(config_file: impl AsRef<Path>, indexes: Vec<usize>) -> Result<()> {
    let mut loader = open_loader(config_file.as_ref())?;
    let indexes = if indexes.is_empty() {
        (0..loader.len()).collect()
    } else {
        indexes
    };

    let mut table = Table::new();
    table.add_row(row!["index", "image size", "shape", "seen", "boxes", "first box"]);

    for index in indexes {
        let (image, label) = loader.materialize(index)?;
        let rows: Vec<_> = label
            .to_vec()
            .chunks(LABEL_ROW_LEN)
            .filter(|row| row.iter().any(|&value| value != 0.0))
            .map(|row| row.to_vec())
            .collect();
        let shape = loader
            .shape()
            .map(|shape| shape.to_string())
            .unwrap_or_else(|| "-".to_string());
        let first_box = rows
            .first()
            .map(|row| format!("{:?}", row))
            .unwrap_or_else(|| "-".to_string());

        table.add_row(row![
            index,
            format!("{}x{}", image.width(), image.height()),
            shape,
            loader.seen(),
            rows.len(),
            first_box,
        ]);
    }

    table.printstd();

    Ok(())
}

fn schedule(batch_size: NonZeroUsize, seen: usize, draws: usize, seed: Option<u64>) {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut table = Table::new();
    table.add_row(row!["draw", "shape"]);
    (0..draws).for_each(|draw| {
        let shape = multiscale_shape(seen, batch_size, &mut rng);
        table.add_row(row![draw, shape]);
    });
    table.printstd();
}
