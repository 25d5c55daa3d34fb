use clap::Parser;
use serde_json::{Map, Value};
use shinsei::prelude::*;
use shinsei::validation::group_errors_by_field;
use std::fs;
use std::path::Path;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

/// Inspect a webform: its steps, validation state and submission payload
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the form structure JSON (wrapped document or bare element map)
    structure_path: String,
    /// Optional path to saved field values (field key -> JSON value)
    values_path: Option<String>,

    /// Path to triage answers (question id -> JSON primitive)
    #[arg(short, long)]
    answers: Option<String>,

    /// Path to an engine configuration JSON file
    #[arg(short, long)]
    config: Option<String>,

    /// Try to advance to this step (0-based) before reporting
    #[arg(short, long)]
    step: Option<usize>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let total_start = Instant::now();

    // --- 1. Configuration and Structure ---
    let config = match &cli.config {
        Some(path) => EngineConfig::from_json(&read_file(path, "config"))
            .unwrap_or_else(|e| exit_with_error(&format!("Invalid config '{}': {}", path, e))),
        None => EngineConfig::default(),
    };
    let registry = config.type_registry();

    let webform_id = Path::new(&cli.structure_path)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("webform")
        .to_string();
    let document = WebformDocument::from_json(
        &webform_id,
        &read_file(&cli.structure_path, "structure"),
        &registry,
    )
    .unwrap_or_else(|e| exit_with_error(&format!("Failed to load form structure: {}", e)));

    let mut store = FormStore::new(config);
    let step_count = store
        .initialize(&document.elements)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to initialize form: {}", e)));
    if step_count == 0 {
        exit_with_error("The form structure contains no fields.");
    }

    // --- 2. Saved Answers and Values ---
    if let Some(path) = &cli.answers {
        for (question, answer) in read_object(path, "answers") {
            match Scalar::from_json(&answer) {
                Some(scalar) => store.set_triage_answer(&question, scalar),
                None => eprintln!("Ignoring non-primitive answer for '{}'", question),
            }
        }
    }

    if let Some(path) = &cli.values_path {
        for (key, json) in read_object(path, "values") {
            let Some(descriptor) = store.descriptor(&key) else {
                eprintln!("Ignoring value for unknown field '{}'", key);
                continue;
            };
            let Some(value) = FieldValue::from_json(descriptor, &json) else {
                eprintln!("Ignoring value for '{}': it does not fit the field", key);
                continue;
            };
            if let Err(e) = store.set_field_value(&key, value) {
                eprintln!("Ignoring value for '{}': {}", key, e);
            }
        }
    }

    // --- 3. Navigation ---
    if let Some(target) = cli.step {
        while store.current_step() < target {
            match store.next_step() {
                Ok(StepChange::Moved { .. }) => {}
                Ok(StepChange::Blocked(errors)) => {
                    println!(
                        "Stopped at step {}: {} error(s) must be fixed first",
                        store.current_step(),
                        errors.len()
                    );
                    break;
                }
                Ok(StepChange::Stayed) => break,
                Err(e) => exit_with_error(&format!("Navigation failed: {}", e)),
            }
        }
    }

    // --- 4. Report ---
    println!("\nForm: {} ({})", document.title, document.id);
    let progress = store.progress();
    println!(
        "Step {} of {} ({}%)",
        progress.current, progress.total, progress.percent
    );
    for (index, step) in store.steps().iter().enumerate() {
        let marker = match store.step_status(index) {
            StepStatus::Completed => "x",
            StepStatus::Current => ">",
            StepStatus::Upcoming => " ",
        };
        let validity = if store.is_step_valid(index) { "" } else { "  (has errors)" };
        println!("  [{}] {}{}", marker, step, validity);
    }

    if let Some(triage) = &document.triage {
        let missing = triage.validate_answers(store.triage_answers());
        if !missing.is_empty() {
            println!("\nUnanswered triage questions:");
            for error in &missing {
                println!("  - {}", error.message);
            }
        }
    }

    let report = store.validate();
    if report.is_valid() {
        println!("\nValidation: OK");
    } else {
        println!(
            "\nValidation: {} error(s), first on step {}",
            report.errors.len(),
            report
                .first_error_step
                .map_or("-".to_string(), |s| s.to_string())
        );
        let grouped = group_errors_by_field(&report.errors);
        for error in &report.errors {
            if grouped.get(&error.field) == Some(&error.message) {
                println!("  - {}", error);
            }
        }
    }

    let payload = Value::Object(store.payload());
    let rendered = serde_json::to_string_pretty(&payload)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to render payload: {}", e)));
    println!("\nPayload:\n{}", rendered);
    println!("\nCompleted in {:?}", total_start.elapsed());
}

fn read_file(path: &str, what: &str) -> String {
    fs::read_to_string(path).unwrap_or_else(|e| {
        exit_with_error(&format!("Failed to read {} file '{}': {}", what, path, e))
    })
}

fn read_object(path: &str, what: &str) -> Map<String, Value> {
    match serde_json::from_str(&read_file(path, what)) {
        Ok(Value::Object(object)) => object,
        Ok(_) => exit_with_error(&format!("The {} file must contain a JSON object", what)),
        Err(e) => exit_with_error(&format!("Failed to parse {} JSON: {}", what, e)),
    }
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
