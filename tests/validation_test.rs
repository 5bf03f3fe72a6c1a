use pyq_predictor::{
    BatchPolicy, Dataset, LabelEncoder, LogisticModel, PipelineConfig, PipelineError, PredictionPipeline,
    TopicNotFound,
};

fn setup_pipeline(policy: BatchPolicy) -> PredictionPipeline {
    PredictionPipeline::builder()
        .with_classifier(LogisticModel::new(vec![0.0, 0.1, 0.8], -2.0).unwrap())
        .with_encoder(LabelEncoder::fit(["Arrays", "Loops", "Pointers", "Structures"]))
        .with_config(PipelineConfig::default().with_batch_policy(policy))
        .build()
        .expect("Failed to create pipeline")
}

fn load(csv: &str) -> Dataset {
    Dataset::from_reader(csv.as_bytes()).expect("Failed to read CSV")
}

#[test]
fn test_missing_topic_column() {
    let pipeline = setup_pipeline(BatchPolicy::PartialSuccess);
    let dataset = load("Subject,Marks,RepetitionCount\nArrays,5,3\n");

    match pipeline.predict_dataset(&dataset) {
        Err(PipelineError::MissingColumn(column)) => assert_eq!(column, "Topic"),
        other => panic!("expected MissingColumn, got {:?}", other),
    }
    assert!(!dataset.has_column("Prediction"));
}

#[test]
fn test_missing_numeric_columns() {
    let pipeline = setup_pipeline(BatchPolicy::PartialSuccess);

    let without_marks = load("Topic,RepetitionCount\nArrays,3\n");
    assert!(matches!(
        pipeline.predict_dataset(&without_marks),
        Err(PipelineError::MissingColumn(column)) if column == "Marks"
    ));

    let without_repetitions = load("Topic,Marks\nArrays,5\n");
    assert!(matches!(
        pipeline.predict_dataset(&without_repetitions),
        Err(PipelineError::MissingColumn(column)) if column == "RepetitionCount"
    ));
}

#[test]
fn test_extra_columns_are_kept() -> Result<(), PipelineError> {
    let pipeline = setup_pipeline(BatchPolicy::PartialSuccess);
    let dataset = load("Year,Topic,Marks,RepetitionCount,Question\n2022,Loops,10,4,Write a while loop\n");

    let report = pipeline.predict_dataset(&dataset)?;
    let headers: Vec<&str> = report.table().headers().collect();
    assert_eq!(headers, vec!["Year", "Topic", "Marks", "RepetitionCount", "Question", "Prediction"]);
    assert_eq!(report.table().column("Prediction"), Some(vec!["1"]));
    Ok(())
}

#[test]
fn test_partial_success_policy() -> Result<(), PipelineError> {
    let pipeline = setup_pipeline(BatchPolicy::PartialSuccess);
    let dataset = load("Topic,Marks,RepetitionCount\nArrays,5,3\nRecursion,5,3\nPointers,2,0\n");

    let report = pipeline.predict_dataset(&dataset)?;
    assert_eq!(report.predicted_count(), 2);

    let failures: Vec<_> = report.failures().collect();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].0, 2);
    assert!(matches!(
        failures[0].1,
        PipelineError::TopicNotFound(TopicNotFound::UnknownToEncoder(topic)) if topic == "Recursion"
    ));

    assert_eq!(report.table().column("Prediction"), Some(vec!["1", "", "0"]));
    Ok(())
}

#[test]
fn test_all_or_nothing_policy() {
    let pipeline = setup_pipeline(BatchPolicy::AllOrNothing);
    let dataset = load("Topic,Marks,RepetitionCount\nArrays,5,3\nRecursion,5,3\nPointers,2,0\n");

    assert!(matches!(
        pipeline.predict_dataset(&dataset),
        Err(PipelineError::TopicNotFound(TopicNotFound::UnknownToEncoder(_)))
    ));

    let clean = load("Topic,Marks,RepetitionCount\nArrays,5,3\nPointers,2,0\n");
    let report = pipeline.predict_dataset(&clean).expect("clean batch should succeed");
    assert_eq!(report.predicted_count(), 2);
}

#[test]
fn test_invalid_row_fails_the_batch() {
    let pipeline = setup_pipeline(BatchPolicy::PartialSuccess);
    let dataset = load("Topic,Marks,RepetitionCount\nArrays,5,3\nLoops,ten,3\n");

    let error = pipeline.predict_dataset(&dataset).unwrap_err();
    assert!(matches!(error, PipelineError::InvalidRecord { row: 2, .. }));
    assert!(error.user_message().contains("Row 2"));
}

#[test]
fn test_empty_dataset() -> Result<(), PipelineError> {
    let pipeline = setup_pipeline(BatchPolicy::PartialSuccess);
    let dataset = load("Topic,Marks,RepetitionCount\n");

    let report = pipeline.predict_dataset(&dataset)?;
    assert_eq!(report.outcomes().len(), 0);

    let records = dataset.question_records(pipeline.config().marks_range())?;
    assert!(matches!(
        pipeline.predict_from_text(Some(records.as_slice()), "Explain arrays", 5),
        Err(PipelineError::TopicNotFound(TopicNotFound::EmptyVocabulary))
    ));
    Ok(())
}

#[test]
fn test_user_messages_distinguish_topic_causes() {
    let not_in_text = PipelineError::TopicNotFound(TopicNotFound::NotInText).user_message();
    let unknown = PipelineError::TopicNotFound(TopicNotFound::UnknownToEncoder("Unions".into())).user_message();
    let no_dataset = PipelineError::NoDatasetLoaded.user_message();

    assert!(not_in_text.contains("Could not identify the topic"));
    assert!(unknown.contains("Unions"));
    assert_ne!(not_in_text, unknown);
    assert!(no_dataset.contains("upload a question CSV"));
}

#[test]
fn test_padded_headers_are_accepted() -> Result<(), PipelineError> {
    let pipeline = setup_pipeline(BatchPolicy::AllOrNothing);
    let dataset = load(" Topic , Marks ,RepetitionCount\nLoops,5,2\n");

    let records = dataset.question_records(pipeline.config().marks_range())?;
    assert_eq!(records.len(), 1);

    let report = pipeline.predict_dataset(&dataset)?;
    assert_eq!(report.predicted_count(), 1);
    assert_eq!(report.table().column("Prediction"), Some(vec!["1"]));
    Ok(())
}

#[test]
fn test_blank_topics_are_skipped_for_questions() -> Result<(), PipelineError> {
    let pipeline = setup_pipeline(BatchPolicy::PartialSuccess);
    let dataset = load("Topic,Marks,RepetitionCount\n,5,9\nLoops,10,4\nLoops,5,2\n");

    assert!(matches!(
        pipeline.predict_dataset(&dataset),
        Err(PipelineError::InvalidRecord { row: 1, .. })
    ));

    let records = dataset.topic_records(pipeline.config().marks_range())?;
    let result = pipeline.predict_from_text(Some(records.as_slice()), "Write a program using loops", 5)?;
    assert_eq!(result.matched_topic.as_deref(), Some("Loops"));
    assert_eq!(result.estimated_repetition_count, Some(3));
    Ok(())
}
