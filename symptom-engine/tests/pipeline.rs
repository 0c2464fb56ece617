mod common;

use symptom_engine::{EngineHandle, InferenceContext, ModelArtifact, NewSymptom, PredictionOutcome};

fn contains(list: &[String], item: &str) -> bool {
    list.iter().any(|s| s == item)
}

#[test]
fn headache_tired_high_fever_is_ranked_with_all_three_symptoms() {
    let context = common::context();
    let predictions = context.predict("I have a headache and feel very tired with high fever", None);

    assert!(!predictions.is_empty());
    assert!(predictions.len() <= 3);
    let top = &predictions[0];
    for symptom in ["headache", "fatigue", "high_fever"] {
        assert!(contains(&top.detected_symptoms, symptom), "missing {symptom}");
    }
    assert!(top.confidence > 0.0 && top.confidence <= 0.98);
    assert_eq!(top.disease, "Typhoid");
    assert!(!top.precautions.is_empty());
    assert!(top.total_symptom_weight > 0.0);
}

#[test]
fn nonsense_detects_nothing() {
    let context = common::context();
    let outcome = context.diagnose("xyz123 nonsense", None);

    assert_eq!(outcome, PredictionOutcome::NoSymptomsDetected);
    assert!(outcome.predictions().is_empty());
    assert!(outcome.detected_symptoms().is_empty());
    assert!(context.predict("xyz123 nonsense", None).is_empty());
}

#[test]
fn blank_input_is_not_an_error() {
    let context = common::context();
    assert_eq!(context.diagnose("", None), PredictionOutcome::EmptyInput);
    assert_eq!(context.diagnose("  \n\t ", Some(5)), PredictionOutcome::EmptyInput);
    assert!(PredictionOutcome::EmptyInput.follow_up_prompt().is_some());
}

#[test]
fn spelling_variants_collapse_to_one_symptom() {
    let context = common::context();
    let predictions = context.predict("diarrhea and more diarrhoea, also vomiting", None);

    let top = &predictions[0];
    let diarrhoea = top.detected_symptoms.iter().filter(|s| *s == "diarrhoea").count();
    assert_eq!(diarrhoea, 1);
    assert_eq!(top.disease, "Gastroenteritis");
}

#[test]
fn disease_without_precautions_reports_empty_list() {
    let context = common::context();
    let predictions = context.predict("vomiting, diarrhoea and sunken eyes", None);

    let gastro = predictions
        .iter()
        .find(|p| p.disease == "Gastroenteritis")
        .expect("gastroenteritis ranked");
    assert!(gastro.precautions.is_empty());

    let json = serde_json::to_value(gastro).unwrap();
    assert_eq!(json["precautions"], serde_json::json!([]));
}

#[test]
fn every_prediction_is_bounded_by_base_and_ceiling() {
    let context = common::context();
    let inputs = [
        "itching and skin rash",
        "headache",
        "I feel dizzy and my vision is blurred",
        "frequent urination and excessive hunger and weight loss",
        "stiff neck with nausea",
    ];
    for input in inputs {
        for prediction in context.predict(input, Some(5)) {
            assert!(prediction.base_confidence <= prediction.confidence, "{input}");
            assert!(prediction.confidence <= 0.98, "{input}");
            assert!(prediction.symptom_match_score >= 0.0 && prediction.symptom_match_score <= 0.5);
            assert!(prediction.precautions.len() <= 4);
        }
    }
}

#[test]
fn predictions_are_sorted_by_confidence() {
    let context = common::context();
    let predictions = context.predict("headache and nausea with fatigue", Some(5));
    for pair in predictions.windows(2) {
        assert!(pair[0].confidence >= pair[1].confidence);
    }
}

#[test]
fn unreachable_floor_reports_detected_symptoms() {
    common::init_tracing();
    let mut config = common::config();
    config.calibration.floor_many = 1.0;
    config.calibration.floor_pair = 1.0;
    config.calibration.floor_single = 1.0;
    let (knowledge_base, model) = common::trained(&config);
    let context = InferenceContext::new(config, knowledge_base, model).unwrap();

    let outcome = context.diagnose("itching", None);
    match &outcome {
        PredictionOutcome::BelowConfidenceFloor { detected_symptoms } => {
            assert_eq!(detected_symptoms, &vec!["itching".to_string()]);
        }
        other => panic!("unexpected outcome {other:?}"),
    }
    assert!(outcome.predictions().is_empty());
    assert_ne!(
        outcome.follow_up_prompt(),
        PredictionOutcome::NoSymptomsDetected.follow_up_prompt()
    );
}

#[test]
fn saved_artifacts_reproduce_predictions() {
    let config = common::config();
    let (knowledge_base, model) = common::trained(&config);

    let dir = tempfile::tempdir().unwrap();
    let mut disk_config = config.clone();
    disk_config.paths.knowledge_base = dir.path().join("kb_csv.json");
    disk_config.paths.model = dir.path().join("models").join("disease_model.json");
    knowledge_base.save(&disk_config.paths.knowledge_base).unwrap();
    model.save(&disk_config.paths.model).unwrap();

    let in_memory = InferenceContext::new(config, knowledge_base, model).unwrap();
    let from_disk = InferenceContext::load(&disk_config).unwrap();

    for input in [
        "I have a headache and feel very tired with high fever",
        "itching and skin rash",
        "vomiting and diarrhoea",
        "blurred vision",
    ] {
        assert_eq!(in_memory.predict(input, None), from_disk.predict(input, None), "{input}");
    }
}

#[test]
fn missing_model_is_fatal_at_startup() {
    let config = common::config();
    let (knowledge_base, _) = common::trained(&config);

    let dir = tempfile::tempdir().unwrap();
    let mut disk_config = config;
    disk_config.paths.knowledge_base = dir.path().join("kb_csv.json");
    disk_config.paths.model = dir.path().join("missing.json");
    knowledge_base.save(&disk_config.paths.knowledge_base).unwrap();

    let err = InferenceContext::load(&disk_config).unwrap_err();
    assert!(err.is_startup_fatal());
    assert!(ModelArtifact::load(&disk_config.paths.model).is_err());
}

#[test]
fn knowledge_edit_is_swapped_in_atomically() {
    let handle = EngineHandle::new(common::context());
    let before = handle.current();
    assert!(before.mapper().lookup("tremor").is_none());

    let after = handle
        .apply_knowledge_edit(|kb| {
            kb.add_symptom(NewSymptom {
                synonyms: vec!["tremor".to_string()],
                ..NewSymptom::named("Shaky hands")
            })?;
            Ok(())
        })
        .unwrap();

    assert_eq!(after.mapper().lookup("tremor"), Some("shaky_hands"));
    assert_eq!(after.knowledge_base().total_symptoms, before.knowledge_base().total_symptoms + 1);
    // the old snapshot is untouched
    assert!(before.mapper().lookup("tremor").is_none());
    assert!(std::sync::Arc::ptr_eq(&handle.current(), &after));
}

#[test]
fn failed_knowledge_edit_changes_nothing() {
    let handle = EngineHandle::new(common::context());
    let before = handle.current();

    let result = handle.apply_knowledge_edit(|kb| {
        kb.add_symptom(NewSymptom::named("headache"))?;
        Ok(())
    });

    assert!(result.is_err());
    assert!(std::sync::Arc::ptr_eq(&handle.current(), &before));
}

#[test]
fn concurrent_readers_share_one_context() {
    let handle = EngineHandle::new(common::context());
    let threads: Vec<_> = (0..4)
        .map(|_| {
            let handle = handle.clone();
            std::thread::spawn(move || handle.current().predict("itching and skin rash", None))
        })
        .collect();

    let results: Vec<_> = threads.into_iter().map(|t| t.join().unwrap()).collect();
    for result in &results[1..] {
        assert_eq!(result, &results[0]);
    }
}
