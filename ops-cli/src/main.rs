//! Symptom engine operator tool
//!
//! Builds the knowledge base and the model from the CSV tables, queries the
//! engine and edits the knowledge base.
//!
//! Usage:
//!   symptom-ops build-kb
//!   symptom-ops train
//!   symptom-ops predict "I have a headache and feel very tired with high fever" --top-k 3
//!   symptom-ops kb add-symptom "Shaky hands" --synonym tremor

mod render;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use error_common::DiagnosisError;
use logger_redacted::LoggerConfig;
use render::Format;
use std::path::{Path, PathBuf};
use symptom_engine::knowledge::slugify;
use symptom_engine::{
    CuratedSynonyms, DiseaseCatalog, EngineConfig, InferenceContext, KnowledgeBase, KnowledgeBaseBuilder,
    NewDisease, NewSymptom, SymptomDataset, SymptomMapper, SymptomVocabulary, Trainer,
};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "symptom-ops")]
#[command(about = "Build, train and query the symptom inference engine")]
#[command(version)]
struct Cli {
    /// YAML configuration file; `SYMPTOM_ENGINE__*` variables override it
    #[arg(short, long, global = true, env = "SYMPTOM_ENGINE_CONFIG")]
    config: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build the knowledge base from the dataset and disease tables
    BuildKb {
        #[arg(long)]
        dataset: Option<PathBuf>,
        #[arg(long)]
        descriptions: Option<PathBuf>,
        #[arg(long)]
        precautions: Option<PathBuf>,
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Train the disease classifier and write the model artifact
    Train {
        #[arg(long)]
        dataset: Option<PathBuf>,
        /// Knowledge base used to size the mapping table recorded with the model
        #[arg(long)]
        knowledge_base: Option<PathBuf>,
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Rank likely conditions for an utterance
    Predict {
        text: String,
        #[arg(short = 'k', long)]
        top_k: Option<usize>,
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Show detected symptoms and their weights
    Extract {
        text: String,
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Knowledge-base statistics
    Stats {
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Advice for a symptom
    Advice { symptom: String },

    /// Edit the knowledge base
    Kb {
        #[command(subcommand)]
        edit: KbCommand,
    },
}

#[derive(Subcommand, Debug)]
enum KbCommand {
    AddSymptom {
        name: String,
        #[arg(long = "synonym")]
        synonyms: Vec<String>,
        #[arg(long, default_value = "")]
        description: String,
    },
    UpdateSymptom {
        current: String,
        new_name: String,
        #[arg(long = "synonym")]
        synonyms: Vec<String>,
    },
    AddDisease {
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long = "symptom")]
        symptoms: Vec<String>,
        #[arg(long = "precaution")]
        precautions: Vec<String>,
    },
    UpdateDisease {
        name: String,
        #[arg(long)]
        description: String,
    },
    SetPrecautions {
        name: String,
        #[arg(required = true, num_args = 1..=4)]
        precautions: Vec<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
    Yaml,
}

impl From<OutputFormat> for Format {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Text => Format::Text,
            OutputFormat::Json => Format::Json,
            OutputFormat::Yaml => Format::Yaml,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = EngineConfig::load(cli.config.as_deref()).context("loading configuration")?;
    let logging = LoggerConfig {
        json: cli.json_logs || config.logging.json,
        ..config.logging.clone()
    };
    logger_redacted::init_tracing(&logging, cli.verbose).context("initialising logging")?;

    let result = run(cli.command, &config);
    if let Err(error) = &result {
        if let Some(engine_error) = error.downcast_ref::<DiagnosisError>() {
            error_common::log_error("symptom-ops", engine_error);
        }
    }
    result
}

fn run(command: Command, config: &EngineConfig) -> Result<()> {
    match command {
        Command::BuildKb {
            dataset,
            descriptions,
            precautions,
            output,
        } => {
            let paths = &config.paths;
            let dataset_path = dataset.unwrap_or_else(|| paths.dataset.clone());
            let descriptions = descriptions.unwrap_or_else(|| paths.descriptions.clone());
            let precautions = precautions.unwrap_or_else(|| paths.precautions.clone());
            let output = output.unwrap_or_else(|| paths.knowledge_base.clone());

            let dataset = SymptomDataset::load(&dataset_path)?;
            let catalog = DiseaseCatalog::load(&descriptions, &precautions)?;
            let kb = KnowledgeBaseBuilder::new().build(&dataset, &catalog)?;
            kb.save(&output)?;

            render::print_stats(&kb.stats(), Format::Text)?;
            println!("Knowledge base written to {}", output.display());
        }

        Command::Train {
            dataset,
            knowledge_base,
            output,
        } => {
            let dataset_path = dataset.unwrap_or_else(|| config.paths.dataset.clone());
            let kb_path = knowledge_base.unwrap_or_else(|| config.paths.knowledge_base.clone());
            let output = output.unwrap_or_else(|| config.paths.model.clone());

            let dataset = SymptomDataset::load(&dataset_path)?;
            let kb = KnowledgeBase::load(&kb_path)
                .with_context(|| format!("knowledge base {} is needed; run build-kb first", kb_path.display()))?;
            let mapping_size = SymptomMapper::new(&kb, &CuratedSynonyms::default()).mapping_size();
            let vocabulary = SymptomVocabulary::from_dataset(&dataset);

            let (artifact, report) = Trainer::new(config.training.clone()).train(&dataset, &vocabulary, mapping_size)?;
            artifact.save(&output)?;

            render::print_training_report(&artifact.metadata, &report);
            println!("Model written to {}", output.display());
        }

        Command::Predict { text, top_k, format } => {
            let context = InferenceContext::load(config)?;
            let outcome = context.diagnose(&text, top_k);
            render::print_outcome(&outcome, format.into())?;
        }

        Command::Extract { text, format } => {
            let context = InferenceContext::load(config)?;
            let matches = context.mapper().extract_matches(&text);
            let detected: Vec<String> = matches.iter().map(|m| m.symptom.clone()).collect();
            let vector = context.vectorizer().vectorize(&detected);
            render::print_extraction(&matches, &vector, format.into())?;
        }

        Command::Stats { format } => {
            let kb = KnowledgeBase::load(&config.paths.knowledge_base)?;
            render::print_stats(&kb.stats(), format.into())?;
        }

        Command::Advice { symptom } => {
            let kb = KnowledgeBase::load(&config.paths.knowledge_base)?;
            let advice = kb
                .advice_for(&symptom)
                .or_else(|| kb.advice_for(&slugify(&symptom)))
                .with_context(|| format!("no advice recorded for '{symptom}'"))?;
            render::print_advice(&symptom, advice);
        }

        Command::Kb { edit } => edit_knowledge_base(edit, &config.paths.knowledge_base)?,
    }
    Ok(())
}

fn edit_knowledge_base(edit: KbCommand, path: &Path) -> Result<()> {
    let mut kb = KnowledgeBase::load(path)?;

    match edit {
        KbCommand::AddSymptom {
            name,
            synonyms,
            description,
        } => {
            let added = kb.add_symptom(NewSymptom {
                synonyms,
                description,
                ..NewSymptom::named(name)
            })?;
            info!(symptom = %added.name, category = ?added.category, "Symptom added");
        }
        KbCommand::UpdateSymptom {
            current,
            new_name,
            synonyms,
        } => {
            kb.update_symptom(&current, &new_name, &synonyms)?;
        }
        KbCommand::AddDisease {
            name,
            description,
            symptoms,
            precautions,
        } => {
            kb.add_disease(NewDisease {
                name,
                description,
                symptoms,
                precautions,
            })?;
        }
        KbCommand::UpdateDisease { name, description } => {
            kb.update_disease_description(&name, &description)?;
        }
        KbCommand::SetPrecautions { name, precautions } => {
            kb.set_disease_precautions(&name, &precautions)?;
        }
    }

    kb.save(path)?;
    println!(
        "Knowledge base updated: {} symptoms, {} diseases",
        kb.total_symptoms, kb.total_diseases
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_predict_arguments() {
        let cli = Cli::parse_from(["symptom-ops", "predict", "headache and fever", "--top-k", "5", "--format", "json"]);
        match cli.command {
            Command::Predict { text, top_k, format } => {
                assert_eq!(text, "headache and fever");
                assert_eq!(top_k, Some(5));
                assert_eq!(format, OutputFormat::Json);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["symptom-ops", "stats", "--verbose", "--json-logs", "--config", "engine.yaml"]);
        assert!(cli.verbose);
        assert!(cli.json_logs);
        assert_eq!(cli.config, Some(PathBuf::from("engine.yaml")));
    }

    #[test]
    fn test_set_precautions_takes_at_most_four() {
        let args = ["symptom-ops", "kb", "set-precautions", "Migraine", "a", "b", "c", "d", "e"];
        assert!(Cli::try_parse_from(args).is_err());

        let cli = Cli::parse_from(["symptom-ops", "kb", "add-symptom", "Shaky hands", "--synonym", "tremor"]);
        match cli.command {
            Command::Kb {
                edit: KbCommand::AddSymptom { name, synonyms, .. },
            } => {
                assert_eq!(name, "Shaky hands");
                assert_eq!(synonyms, vec!["tremor".to_string()]);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
