// Terminal, JSON and YAML output for the operator tool
use anyhow::Result;
use colored::*;
use serde::Serialize;
use symptom_engine::mapper::SymptomMatch;
use symptom_engine::{
    ConfidenceLevel, FeatureVector, KnowledgeBaseStats, ModelMetadata, Prediction, PredictionOutcome, TrainingReport,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Text,
    Json,
    Yaml,
}

/// Print `value` as JSON or YAML. Returns false for [`Format::Text`].
fn print_structured<T: Serialize>(value: &T, format: Format) -> Result<bool> {
    match format {
        Format::Json => println!("{}", serde_json::to_string_pretty(value)?),
        Format::Yaml => print!("{}", serde_yaml::to_string(value)?),
        Format::Text => return Ok(false),
    }
    Ok(true)
}

fn level_colored(level: ConfidenceLevel) -> ColoredString {
    let label = level.to_string();
    match level {
        ConfidenceLevel::VeryHigh | ConfidenceLevel::High => label.bright_green(),
        ConfidenceLevel::Moderate => label.bright_yellow(),
        ConfidenceLevel::LowModerate | ConfidenceLevel::Low => label.bright_red(),
    }
}

fn print_prediction(rank: usize, prediction: &Prediction) {
    println!(
        "{} {} {:.1}% ({})",
        format!("{rank}.").bright_black(),
        prediction.disease.bold(),
        prediction.confidence * 100.0,
        level_colored(prediction.confidence_level())
    );
    println!("   {}", prediction.description);
    println!(
        "   • Match score: {:.2}  Base: {:.1}%  Symptom weight: {:.2}",
        prediction.symptom_match_score,
        prediction.base_confidence * 100.0,
        prediction.total_symptom_weight
    );
    if !prediction.precautions.is_empty() {
        println!("   • Precautions:");
        for precaution in &prediction.precautions {
            println!("     - {precaution}");
        }
    }
}

pub fn print_outcome(outcome: &PredictionOutcome, format: Format) -> Result<()> {
    if print_structured(outcome, format)? {
        return Ok(());
    }

    let detected = outcome.detected_symptoms();
    if !detected.is_empty() {
        println!("{} {}", "🔍 Detected:".bright_cyan(), detected.join(", "));
    }

    if let Some(prompt) = outcome.follow_up_prompt() {
        println!("{}", prompt.bright_yellow());
        return Ok(());
    }

    println!();
    for (index, prediction) in outcome.predictions().iter().enumerate() {
        print_prediction(index + 1, prediction);
        println!();
    }
    Ok(())
}

#[derive(Serialize)]
struct Extraction<'a> {
    matches: &'a [SymptomMatch],
    weights: &'a [(String, f64)],
    total_weight: f64,
}

pub fn print_extraction(matches: &[SymptomMatch], vector: &FeatureVector, format: Format) -> Result<()> {
    let extraction = Extraction {
        matches,
        weights: &vector.weights,
        total_weight: vector.total_weight,
    };
    if print_structured(&extraction, format)? {
        return Ok(());
    }

    if matches.is_empty() {
        println!("{}", "No symptoms detected".bright_yellow());
        return Ok(());
    }

    for found in matches {
        let weight = vector
            .weight_of(&found.symptom)
            .map(|w| format!("{w:.2}"))
            .unwrap_or_else(|| "not in model".bright_black().to_string());
        println!(
            "  • {:<28} {:<10} from '{}' ({:?})",
            found.symptom.bold(),
            weight,
            found.term,
            found.pass
        );
    }
    println!("{} {:.2}", "Total weight:".bright_cyan(), vector.total_weight);
    Ok(())
}

pub fn print_stats(stats: &KnowledgeBaseStats, format: Format) -> Result<()> {
    if print_structured(stats, format)? {
        return Ok(());
    }

    println!("\n📊 {}", "Knowledge base".bold());
    println!("  • Symptoms: {}", stats.total_symptoms);
    println!("  • Diseases: {}", stats.total_diseases);
    println!("  • With description: {}", stats.diseases_with_description);
    println!("  • With precautions: {}", stats.diseases_with_precautions);
    println!("  • Synonyms: {}", stats.total_synonyms);

    println!("\n🔝 {}", "Most frequent symptoms".bold());
    for (name, frequency) in &stats.top_symptoms {
        println!("  • {name:<30} {frequency}");
    }
    println!();
    Ok(())
}

pub fn print_training_report(metadata: &ModelMetadata, report: &TrainingReport) {
    println!("\n🧠 {}", "Training complete".bold());
    println!("  • Model: {}", metadata.model_id);
    println!(
        "  • Samples: {} of {} records ({} train / {} test)",
        report.samples_used, report.records_total, report.train_samples, report.test_samples
    );
    println!("  • Symptoms: {}  Diseases: {}", metadata.symptom_count, report.classes);
    println!("  • Split: {}", if report.stratified { "stratified" } else { "random" });
    match (report.accuracy, report.mean_confidence) {
        (Some(accuracy), Some(confidence)) => {
            println!("  • Accuracy: {}", format!("{:.1}%", accuracy * 100.0).bright_green());
            println!("  • Mean confidence: {:.1}%", confidence * 100.0);
        }
        _ => println!("  • Accuracy: {}", "no held-out samples".bright_black()),
    }
    println!("  • Took {} ms\n", report.duration_ms);
}

pub fn print_advice(symptom: &str, advice: &str) {
    println!("{} {}", format!("💡 {symptom}:").bright_cyan(), advice);
}
