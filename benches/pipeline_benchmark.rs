use criterion::{black_box, criterion_group, criterion_main, Criterion};
use pyq_predictor::pipeline::{resolve_topic, TopicVocabulary};
use pyq_predictor::{Dataset, LabelEncoder, LogisticModel, PredictionPipeline, QuestionRecord};

const TOPICS: [&str; 12] = [
    "Arrays", "Loops", "Pointers", "Structures", "Unions", "Strings",
    "Functions", "Recursion", "File Handling", "Dynamic Memory", "Operators", "Macros",
];

fn sample_records(count: usize) -> Vec<QuestionRecord> {
    (0..count)
        .map(|i| QuestionRecord::new(TOPICS[i % TOPICS.len()], (i % 20) as u32 + 1, (i % 7) as u32))
        .collect()
}

fn setup_benchmark_pipeline() -> PredictionPipeline {
    PredictionPipeline::builder()
        .with_classifier(LogisticModel::new(vec![0.05, 0.1, 0.8], -2.0).unwrap())
        .with_encoder(LabelEncoder::fit(TOPICS))
        .build()
        .unwrap()
}

fn bench_topic_resolution(c: &mut Criterion) {
    let vocabulary = TopicVocabulary::new(TOPICS);
    let mut group = c.benchmark_group("TopicResolution");
    group.sample_size(50);

    group.bench_function("first_topic", |b| b.iter(|| {
        resolve_topic(&vocabulary, None, black_box(Some("explain arrays in c with example"))).unwrap()
    }));

    group.bench_function("last_topic", |b| b.iter(|| {
        resolve_topic(&vocabulary, None, black_box(Some("write short notes on macros and the preprocessor"))).unwrap()
    }));

    group.bench_function("no_match", |b| b.iter(|| {
        resolve_topic(&vocabulary, None, black_box(Some("discuss the history of the language"))).is_err()
    }));

    group.bench_function("build_vocabulary", |b| b.iter(|| {
        TopicVocabulary::new(black_box(TOPICS))
    }));

    group.finish();
}

fn bench_prediction(c: &mut Criterion) {
    let pipeline = setup_benchmark_pipeline();
    let records = sample_records(500);
    let dataset = Dataset::from_records(&records);
    let mut group = c.benchmark_group("Prediction");
    group.sample_size(50);

    group.bench_function("single_question", |b| b.iter(|| {
        pipeline.predict_from_text(Some(records.as_slice()), black_box("What is dynamic memory allocation?"), 5).unwrap()
    }));

    group.bench_function("batch_500", |b| b.iter(|| {
        pipeline.predict_batch(black_box(&records))
    }));

    group.bench_function("dataset_500", |b| b.iter(|| {
        pipeline.predict_dataset(black_box(&dataset)).unwrap()
    }));

    group.finish();
}

criterion_group!(benches, bench_topic_resolution, bench_prediction);
criterion_main!(benches);
