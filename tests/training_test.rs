use std::path::Path;

use synthetic_control_lstm::dataset::{self, DatasetConfig, SequenceBatchIterator, SplitLabel};
use synthetic_control_lstm::model::SequenceClassifier;
use synthetic_control_lstm::persistence::{ModelMetadata, ModelPersistence, PersistentModel};
use synthetic_control_lstm::trainer::{create_adam_trainer, ModelTrainer, TrainingConfig};
use tempfile::tempdir;
use ndarray::arr2;

/// Two cleanly separable classes: low constant sequences and high constant
/// sequences, with a little deterministic jitter.
fn separable_lines(per_class: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for i in 0..per_class {
        let j = (i % 5) as f64 * 0.01;
        lines.push(format!(
            "{v:.3} {v:.3} {v:.3} {v:.3}",
            v = -1.0 + j
        ));
    }
    for i in 0..per_class {
        let j = (i % 5) as f64 * 0.01;
        lines.push(format!("{v:.3} {v:.3} {v:.3} {v:.3}", v = 1.0 + j));
    }
    lines
}

fn prepared(root: &Path, per_class: usize) -> synthetic_control_lstm::DatasetLayout {
    let config = DatasetConfig::default()
        .with_root_dir(root)
        .with_block_size(per_class)
        .with_train_ratio(1.0)
        .with_seed(3);
    dataset::prepare_from_lines(&separable_lines(per_class), &config).unwrap()
}

#[test]
fn training_reduces_the_loss_on_separable_data() {
    let dir = tempdir().unwrap();
    let layout = prepared(&dir.path().join("uci"), 8);

    let mut train = SequenceBatchIterator::from_layout(&layout, SplitLabel::Train, 4, 2).unwrap();

    let model = SequenceClassifier::new(1, 8, 2);
    let mut trainer = create_adam_trainer(model, 0.02).with_config(TrainingConfig {
        epochs: 60,
        print_every: 1000,
        clip_gradient: Some(5.0),
    });

    trainer.train(&mut train, None).unwrap();

    let history = trainer.get_metrics_history();
    assert_eq!(history.len(), 60);
    let first = history.first().unwrap().train_loss;
    let last = history.last().unwrap().train_loss;
    assert!(
        last < first,
        "loss should decrease: first {:.6}, last {:.6}",
        first,
        last
    );
}

#[test]
fn trained_model_separates_the_classes() {
    let dir = tempdir().unwrap();
    let layout = prepared(&dir.path().join("uci"), 8);

    let mut train = SequenceBatchIterator::from_layout(&layout, SplitLabel::Train, 4, 2).unwrap();

    let model = SequenceClassifier::new(1, 8, 2);
    let mut trainer = create_adam_trainer(model, 0.02).with_config(TrainingConfig {
        epochs: 80,
        print_every: 1000,
        clip_gradient: Some(5.0),
    });

    ModelTrainer::fit(&mut trainer, &mut train).unwrap();
    let evaluation = ModelTrainer::evaluate(&mut trainer, &mut train).unwrap();

    assert_eq!(evaluation.total(), 16);
    // A constant-only guess caps at 0.5; real learning must beat it.
    assert!(
        evaluation.accuracy() > 0.7,
        "accuracy {:.4} on separable data",
        evaluation.accuracy()
    );
}

#[test]
fn evaluation_counts_every_example_once() {
    let dir = tempdir().unwrap();
    let layout = prepared(&dir.path().join("uci"), 6);

    let mut train = SequenceBatchIterator::from_layout(&layout, SplitLabel::Train, 5, 2).unwrap();

    let model = SequenceClassifier::new(1, 4, 2);
    let trainer = create_adam_trainer(model, 0.01);
    let evaluation = trainer.evaluate_model(&mut train).unwrap();

    assert_eq!(evaluation.total(), 12);
    let per_class: usize = (0..2)
        .map(|actual| (0..2).map(|pred| evaluation.count(actual, pred)).sum::<usize>())
        .sum();
    assert_eq!(per_class, 12);
}

#[test]
fn classifier_round_trips_through_json_and_binary() {
    let dir = tempdir().unwrap();
    let model = SequenceClassifier::new(1, 6, 4);
    let sequence = vec![arr2(&[[0.3]]), arr2(&[[-0.7]]), arr2(&[[0.1]])];
    let logits_before = model.forward(&sequence);

    let metadata = ModelMetadata {
        model_name: "round_trip".to_string(),
        version: "0.1.0".to_string(),
        created_at: "2024-01-01T00:00:00Z".to_string(),
        input_size: 1,
        hidden_size: 6,
        num_classes: 4,
        total_epochs: 0,
        final_loss: None,
        test_accuracy: None,
        description: None,
    };

    for name in ["model.json", "model.bin"] {
        let path = dir.path().join(name);
        model.save(&path, metadata.clone()).unwrap();
        assert!(path.exists());

        let (loaded, loaded_metadata) = SequenceClassifier::load(&path).unwrap();
        assert_eq!(loaded_metadata.model_name, "round_trip");
        assert_eq!(loaded.hidden_size, 6);

        let logits_after = loaded.forward(&sequence);
        for (a, b) in logits_before.iter().zip(logits_after.iter()) {
            assert!((a - b).abs() < 1e-9);
        }
        assert_eq!(model.predict(&sequence), loaded.predict(&sequence));
    }
}

#[test]
fn saved_model_carries_the_normalizer() {
    use synthetic_control_lstm::normalize::SequenceNormalizer;

    let dir = tempdir().unwrap();
    let model = SequenceClassifier::new(1, 3, 2);
    let normalizer = SequenceNormalizer {
        mean: vec![0.25],
        std: vec![2.0],
    };

    let saved = ModelPersistence::create_saved_model(
        &model,
        Some(&normalizer),
        "with_stats".to_string(),
        12,
        Some(0.05),
        Some(0.95),
        Some("fixture".to_string()),
    );
    let path = dir.path().join("with_stats.json");
    ModelPersistence::save_to_json(&saved, &path).unwrap();

    let loaded = ModelPersistence::load_from_json(&path).unwrap();
    let (_model, loaded_normalizer, metadata) = loaded.into_parts();
    let loaded_normalizer = loaded_normalizer.expect("normalizer should survive the round trip");
    assert_eq!(loaded_normalizer.mean, vec![0.25]);
    assert_eq!(loaded_normalizer.std, vec![2.0]);
    assert_eq!(metadata.total_epochs, 12);
    assert_eq!(metadata.test_accuracy, Some(0.95));
}
