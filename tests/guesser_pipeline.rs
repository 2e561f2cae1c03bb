//! End-to-end test of the guesser data pipeline: pretrained embeddings →
//! cache → index sequences → batches → affine layer.

use std::collections::HashSet;

use adivinar::batch::{BatchOptions, Batcher};
use adivinar::embedding::load_embeddings;
use adivinar::graph::{affine_layer, parametric_relu, GraphBuilder, LayerConfig, Tensor};
use adivinar::labels::{self, ExampleProperties, LabelField};
use adivinar::sequence;

const EMBEDDING_SOURCE: &str = "\
the 0.2 0.4 0.6
war 1.0 0.0 -1.0
of 0.1 0.1 0.1
roses 0.5 -0.5 0.0
shakespeare -0.3 0.9 0.3
";

fn record(ans_type: &str, category: &str, gender: &str) -> ExampleProperties {
    ExampleProperties {
        ans_type: ans_type.to_string(),
        category: category.to_string(),
        gender: gender.to_string(),
    }
}

#[test]
fn pipeline_from_source_file_to_batches() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("glove.txt");
    std::fs::write(&source, EMBEDDING_SOURCE).unwrap();
    let tmp_cache = dir.path().join("tmp/emb.bin");
    let perm_cache = dir.path().join("cache/emb.bin");

    let vocab: HashSet<String> = ["the", "war", "of", "roses", "shakespeare"]
        .iter()
        .map(|w| w.to_string())
        .collect();

    // fresh build persists to the tmp cache
    let table = load_embeddings(&tmp_cache, &perm_cache, Some(&vocab), &source).unwrap();
    assert!(tmp_cache.exists());
    assert_eq!(table.known_len(), 5);

    // a second load round-trips through the cache without a vocab
    let cached = load_embeddings(&tmp_cache, &perm_cache, None, &source).unwrap();
    assert_eq!(cached.index_of("roses"), table.index_of("roses"));
    assert_eq!(cached.unk_index(), table.unk_index());

    // questions become index sequences, padded to a shared width
    let questions: Vec<Vec<&str>> = vec![
        vec!["the", "war", "of", "the", "roses"],
        vec!["shakespeare"],
        vec!["the", "unseen", "word"],
        vec!["of", "the", "roses"],
    ];
    let mut seqs: Vec<Vec<u32>> = questions
        .iter()
        .map(|q| sequence::embedding_indices(q, &table))
        .collect();
    assert_eq!(seqs[2][1], table.unk_index());

    let lengths = sequence::sequence_lengths(&seqs);
    let width = sequence::max_sequence_len(&seqs);
    assert_eq!(width, 5);
    sequence::pad_truncate(&mut seqs, width, table.unk_index());
    let inputs = sequence::to_matrix(&seqs).unwrap();

    // auxiliary labels normalize against the fixed registries
    let records = vec![
        record("event", "History", "non_person"),
        record("people", "Literature", "male"),
        record("mystery", "Sports", "robot"),
        record("work", "Literature", "non_person"),
    ];
    let (ans_registry, ans_records) = labels::answer_type_classes(&records);
    let (cat_registry, cat_records) = labels::category_classes(&records);
    let (gen_registry, gen_records) = labels::gender_classes(&records);
    assert_eq!(ans_records[2].ans_type, "missing");
    assert_eq!(cat_records[2].category, "missing");

    let ans_ids: ndarray::Array1<u32> = ans_records
        .iter()
        .map(|r| ans_registry.id_of(&r.ans_type).unwrap() as u32)
        .collect();
    let cat_ids: ndarray::Array1<u32> = cat_records
        .iter()
        .map(|r| cat_registry.id_of(&r.category).unwrap() as u32)
        .collect();
    let gen_ids: ndarray::Array1<u32> = gen_records
        .iter()
        .map(|r| gen_registry.id_of(&r.gender).unwrap() as u32)
        .collect();
    assert_eq!(ans_ids[2], ans_registry.missing_id() as u32);

    // answers (the main head) as arbitrary class ids
    let targets = ndarray::array![3_u32, 1, 4, 1];

    let batches: Vec<_> = Batcher::new(
        2,
        inputs,
        targets,
        lengths,
        ans_ids,
        cat_ids,
        gen_ids,
        BatchOptions { shuffle: false, ..BatchOptions::default() },
    )
    .unwrap()
    .collect();

    assert_eq!(batches.len(), 2);
    assert_eq!(batches[0].size(), 2);
    assert_eq!(batches[0].targets, ndarray::array![3, 1]);
    assert_eq!(batches[1].lengths, ndarray::array![3, 3]);

    // one batch of mean-pooled embeddings runs through an affine layer
    let batch = &batches[0];
    let dim = table.dim();
    let mut pooled = Vec::with_capacity(batch.size() * dim);
    for row in batch.inputs.rows() {
        let mut acc = vec![0.0_f32; dim];
        for &idx in row {
            for (a, v) in acc.iter_mut().zip(table.row(idx)) {
                *a += v;
            }
        }
        for a in &mut acc {
            *a /= row.len() as f32;
        }
        pooled.extend(acc);
    }

    let mut builder = GraphBuilder::with_seed(1234);
    let config = LayerConfig {
        dropout: Some(0.2),
        batch_norm: true,
        training: Some(true),
        activation: Some(parametric_relu as adivinar::graph::ActivationFn),
        ..LayerConfig::default()
    };
    let layer = affine_layer(
        &mut builder,
        "_hidden",
        &Tensor::from_vec(pooled, false),
        batch.size(),
        16,
        &config,
    )
    .unwrap();

    assert_eq!(layer.output.len(), batch.size() * 16);
    assert!(builder.get("layer_hidden/w").is_some());
    assert!(builder.get("layer_hidden/bn/gamma").is_some());
    assert!(builder.get("layer_hidden/alpha").is_some());

    // gradients reach the layer variables
    let mut out = layer.output;
    adivinar::graph::backward(&mut out, None);
    assert!(layer.weights.grad().is_some());
    assert!(layer.bias.grad().is_some());
}

#[test]
fn missing_labels_never_panic_id_lookup() {
    let records = vec![record("nonsense", "nonsense", "nonsense")];
    for field in [LabelField::AnswerType, LabelField::Category, LabelField::Gender] {
        let registry = adivinar::ClassRegistry::for_field(field);
        let normalized = labels::normalize(&records, field);
        let value = match field {
            LabelField::AnswerType => &normalized[0].ans_type,
            LabelField::Category => &normalized[0].category,
            LabelField::Gender => &normalized[0].gender,
        };
        assert_eq!(registry.id_of(value), Some(registry.missing_id()));
    }
}
