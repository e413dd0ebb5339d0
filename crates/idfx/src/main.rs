//! idfx - identification features report tool

mod config;
mod progress;
mod report;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand, ValueEnum};
use idcache::Partition;
use idfeatures::{FeaturesGenerator, InMemoryStore, SpectrumCountingMethod, Unit};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::{load_dataset, Settings};
use crate::progress::LogProgress;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Dataset file (JSON)
    #[arg(short, long)]
    dataset: PathBuf,

    /// Settings file (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Spectrum counting method, overrides the settings
    #[arg(short, long, value_enum)]
    method: Option<MethodArg>,

    /// Abundance unit, e.g. fmol, ppm or %
    #[arg(short, long)]
    unit: Option<Unit>,

    /// Only print the first rows
    #[arg(short, long)]
    top: Option<usize>,

    /// Print JSON instead of a table
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Ranked protein groups
    Proteins,
    /// Peptides of a protein group
    Peptides {
        /// Protein group key
        #[arg(short, long)]
        protein: u64,
    },
    /// PSMs of a peptide
    Psms {
        /// Peptide key
        #[arg(short, long)]
        peptide: u64,

        /// Order on retention time instead of score
        #[arg(long)]
        rt: bool,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum MethodArg {
    Nsaf,
    Empai,
    Lfq,
}

impl From<MethodArg> for SpectrumCountingMethod {
    fn from(method: MethodArg) -> Self {
        match method {
            MethodArg::Nsaf => SpectrumCountingMethod::Nsaf,
            MethodArg::Empai => SpectrumCountingMethod::Empai,
            MethodArg::Lfq => SpectrumCountingMethod::Lfq,
        }
    }
}

fn main() -> Result<()> {
    // Logs go to stderr, reports to stdout
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();
    info!("idfx v{}", env!("CARGO_PKG_VERSION"));

    let mut settings = Settings::load(args.config.as_deref())?;
    if let Some(method) = args.method {
        settings.spectrum_counting.method = method.into();
    }
    if let Some(unit) = args.unit {
        settings.spectrum_counting.unit = unit;
    }
    info!(
        "Spectrum counting: {:?} in {}",
        settings.spectrum_counting.method, settings.spectrum_counting.unit
    );

    let store = Arc::new(InMemoryStore::from_dataset(load_dataset(&args.dataset)?));
    let generator = FeaturesGenerator::new(store.clone(), store, settings.digestion.clone())
        .with_spectrum_counting(settings.spectrum_counting.clone())
        .with_cache_config(settings.cache.config());
    generator.populate_peptide_length_distribution()?;

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match args.command {
        Command::Proteins => {
            let progress = LogProgress::new();
            if generator
                .estimate_spectrum_counting_totals(Some(&progress))?
                .is_none()
            {
                bail!("Spectrum counting totals were cancelled");
            }
            let ranked = generator.processed_protein_keys(Some(&progress), None, false)?;
            let Some(keys) = ranked else {
                bail!("Protein ranking was cancelled");
            };

            let keys = limit(&keys, args.top);
            let rows = report::protein_rows(
                &generator,
                keys,
                settings.spectrum_counting.method,
                settings.spectrum_counting.unit,
            )?;
            report::render(&rows, args.json, &mut out)?;
        }
        Command::Peptides { protein } => {
            let mut rows = report::peptide_rows(&generator, protein)?;
            rows.truncate(args.top.unwrap_or(usize::MAX));
            report::render(&rows, args.json, &mut out)?;
        }
        Command::Psms { peptide, rt } => {
            let mut rows = report::psm_rows(&generator, peptide, rt)?;
            rows.truncate(args.top.unwrap_or(usize::MAX));
            report::render(&rows, args.json, &mut out)?;
        }
    }
    out.flush()?;

    let cache = generator.cache();
    let stats = cache.stats();
    info!(
        "Cache: {} hits, {} misses, {} inserts, {} entries evicted ({:.1}% hit ratio)",
        stats.hits(),
        stats.misses(),
        stats.inserts(),
        stats.evicted_entries(),
        100.0 * stats.hit_ratio()
    );
    for partition in Partition::ALL {
        let partition_stats = stats.for_partition(partition);
        debug!(
            ?partition,
            hits = partition_stats.hits,
            misses = partition_stats.misses,
            evicted = partition_stats.evicted_entries,
            "cache partition"
        );
    }

    Ok(())
}

/// First `top` keys, all of them when no limit is given
fn limit(keys: &[u64], top: Option<usize>) -> &[u64] {
    match top {
        Some(top) => &keys[..top.min(keys.len())],
        None => keys,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_args() {
        let args = Args::try_parse_from([
            "idfx", "--dataset", "data.json", "--method", "empai", "--unit", "ppm", "--top", "5",
            "psms", "--peptide", "12", "--rt",
        ])
        .unwrap();

        assert_eq!(args.dataset, PathBuf::from("data.json"));
        assert_eq!(
            args.method.map(SpectrumCountingMethod::from),
            Some(SpectrumCountingMethod::Empai)
        );
        assert_eq!(args.unit, Some(Unit::PPM));
        assert_eq!(args.top, Some(5));
        assert!(matches!(args.command, Command::Psms { peptide: 12, rt: true }));
    }

    #[test]
    fn test_reject_unknown_unit() {
        let result = Args::try_parse_from([
            "idfx", "--dataset", "data.json", "--unit", "gram", "proteins",
        ]);

        assert!(result.is_err());
    }

    #[test]
    fn test_limit() {
        let keys = [3, 1, 2];

        assert_eq!(limit(&keys, Some(2)), &[3, 1]);
        assert_eq!(limit(&keys, Some(10)), &[3, 1, 2]);
        assert_eq!(limit(&keys, None), &[3, 1, 2]);
    }
}
