use synthetic_control_lstm::dataset::{self, DatasetConfig, SequenceBatchIterator, SplitLabel};

/// Download the synthetic control chart dataset and materialize it as
/// numbered feature/label CSV pairs. Running it a second time is a no-op:
/// the output root's existence skips the whole pipeline.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    println!("=== Synthetic Control Dataset Preparation ===\n");

    let config = DatasetConfig::default();
    println!("Source: {}", config.source_url);
    println!("Output root: {}", config.root_dir.display());
    println!(
        "Split: {:.0}% train, seed {}, label blocks of {}\n",
        config.train_ratio * 100.0,
        config.seed,
        config.block_size
    );

    let layout = dataset::prepare(&config)?;

    let train = SequenceBatchIterator::from_layout(&layout, SplitLabel::Train, config.batch_size, 6)?;
    let test = SequenceBatchIterator::from_layout(&layout, SplitLabel::Test, config.batch_size, 6)?;

    println!("Materialized layout:");
    println!("  {}", layout.train_features.display());
    println!("  {}", layout.train_labels.display());
    println!("  {}", layout.test_features.display());
    println!("  {}", layout.test_labels.display());
    println!(
        "\n{} training sequences, {} test sequences",
        train.total_examples(),
        test.total_examples()
    );

    Ok(())
}
