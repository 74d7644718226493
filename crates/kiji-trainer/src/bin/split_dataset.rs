use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use clap::Parser;
use tracing::info;

use kiji_trainer::dataset::{read_records_from_path, DatasetConfig, Record};
use kiji_trainer::split::{stratified_split, SplitRatios};

/// Stratified train/val/test split of a labelled dataset file.
#[derive(Parser, Debug)]
#[command(name = "split-dataset", version, about)]
struct Args {
    /// Labelled input file (header row with label and text columns).
    input: PathBuf,

    /// Directory the train/val/test files are written to.
    #[arg(short, long, default_value = "data")]
    output_dir: PathBuf,

    /// Field delimiter.
    #[arg(long, default_value_t = ';')]
    delimiter: char,

    /// Header name of the label column.
    #[arg(long, default_value = "topic")]
    label_column: String,

    /// Header name of the text column.
    #[arg(long, default_value = "title")]
    text_column: String,

    /// Share of each label's rows that goes to train.
    #[arg(long, default_value_t = 0.7)]
    train_ratio: f64,

    /// Share of each label's rows that goes to dev.
    #[arg(long, default_value_t = 0.15)]
    dev_ratio: f64,
}

fn write_split(path: &Path, records: &[Record], delimiter: char) -> anyhow::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    writeln!(writer, "label{delimiter}text")?;
    for record in records {
        writeln!(writer, "{}{delimiter}{}", record.label, record.text)?;
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().init();
    let args = Args::parse();

    let ratios = SplitRatios {
        train: args.train_ratio,
        dev: args.dev_ratio,
    };
    anyhow::ensure!(
        ratios.is_valid(),
        "invalid ratios: train {} + dev {} must leave room for test",
        ratios.train,
        ratios.dev
    );

    let config = DatasetConfig {
        delimiter: args.delimiter,
        label_column: args.label_column.clone(),
        text_column: args.text_column.clone(),
        ..DatasetConfig::default()
    };
    let records = read_records_from_path(&args.input, &config)?;
    info!(rows = records.len(), input = %args.input.display(), "loaded dataset");

    let (train, dev, test) = stratified_split(records, ratios);

    std::fs::create_dir_all(&args.output_dir)?;
    write_split(&args.output_dir.join("train.csv"), &train, args.delimiter)?;
    write_split(&args.output_dir.join("val.csv"), &dev, args.delimiter)?;
    write_split(&args.output_dir.join("test.csv"), &test, args.delimiter)?;

    info!(
        train = train.len(),
        dev = dev.len(),
        test = test.len(),
        output = %args.output_dir.display(),
        "splits written"
    );
    Ok(())
}
