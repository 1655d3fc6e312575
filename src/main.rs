use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use std::fs;
use std::path::PathBuf;

use mzbin::binner::SpectrumBinner;
use mzbin::table::FeatureTable;
use mzbin::text;

/// MALDI-TOF MS 3 dalton feature extraction from bacterial spectra samples
#[derive(Parser)]
#[command(name = "mzbin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory of per-sample spectrum CSV files (two columns: m/z, intensity)
    #[arg(short = 'f', long)]
    folder: PathBuf,

    /// Directory the feature table is written into, created if missing
    #[arg(short = 'o', long, default_value = "maldi-features")]
    feature_output_dir: PathBuf,

    /// Directory of per-sample antibiotic label CSV files to join with the features
    #[arg(short = 'l', long)]
    labels: Option<PathBuf>,

    /// Verbosity level (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let spectra = text::spectra_from_dir(&cli.folder)
        .with_context(|| format!("failed to read spectra from {}", cli.folder.display()))?;
    info!("Read {} spectra from {}", spectra.len(), cli.folder.display());

    let binner = SpectrumBinner::maldi();
    let rows = binner.bin_all(&spectra);
    let table = FeatureTable::assemble(binner.grid.labels(), rows)?;

    fs::create_dir_all(&cli.feature_output_dir).with_context(|| {
        format!(
            "failed to create output directory {}",
            cli.feature_output_dir.display()
        )
    })?;

    let features_path = cli.feature_output_dir.join("maldi_features.csv");
    text::feature_table_to_path(&table, &features_path)
        .with_context(|| format!("failed to write {}", features_path.display()))?;
    println!(
        "MALDI features for {} samples written to {}",
        table.len(),
        features_path.display()
    );

    if let Some(labels_dir) = &cli.labels {
        let labels = text::labels_from_dir(labels_dir)
            .with_context(|| format!("failed to read labels from {}", labels_dir.display()))?;
        info!("Read labels for {} samples", labels.len());

        let joined = table.join(&labels);
        let joined_path = cli.feature_output_dir.join("maldi_features_with_labels.csv");
        text::joined_table_to_path(&joined, &joined_path)
            .with_context(|| format!("failed to write {}", joined_path.display()))?;
        println!(
            "Features matched with antibiotic labels written to {}",
            joined_path.display()
        );
    }

    Ok(())
}
