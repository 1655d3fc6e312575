use std::{env, io};

use mzbin::binner::SpectrumBinner;
use mzbin::table::FeatureTable;
use mzbin::text;

fn main() -> anyhow::Result<()> {
    let path = env::args().nth(1).expect("expected a spectrum CSV path");

    let spectrum = text::spectrum_from_path(&path)?;
    let binner = SpectrumBinner::maldi();
    let row = binner.bin(&spectrum);

    let table = FeatureTable::assemble(binner.grid.labels(), [row])?;
    text::feature_table_to_writer(&table, io::stdout().lock())?;
    Ok(())
}
