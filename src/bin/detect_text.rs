use anyhow::{anyhow, Context};
use detektor::models::{ConfidenceLevel, DetectionThresholds};
use detektor::services::classifier::HttpClassifier;
use detektor::services::config_store::ConfigStore;
use detektor::services::detection::{count_markers, Detector};
use std::io::Read;
use std::sync::Arc;

fn preview(s: &str, max_chars: usize) -> String {
    let mut out: String = s.chars().take(max_chars).collect();
    if s.chars().count() > max_chars {
        out.push_str("...");
    }
    out.replace('\n', " ")
}

fn parse_arg_value(args: &[String], key: &str) -> Option<String> {
    args.iter()
        .position(|a| a == key)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

fn has_flag(args: &[String], key: &str) -> bool {
    args.iter().any(|a| a == key)
}

fn confidence_label(level: ConfidenceLevel) -> &'static str {
    match level {
        ConfidenceLevel::High => "TINGGI",
        ConfidenceLevel::Medium => "SEDANG",
        ConfidenceLevel::Low => "RENDAH",
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        eprintln!(
            "Usage:\n  detect_text <path | -> [--endpoint <url>] [--budget <tokens>] [--sentences] [--html] [--out <json_path>]\n\nNotes:\n  - `-` reads the text from stdin.\n  - `--endpoint` overrides the configured classifier URL.\n  - `--out` writes the full detection result as pretty JSON."
        );
        return Ok(());
    }

    detektor::init_logging();

    let path = args[1].clone();
    let endpoint_arg = parse_arg_value(&args, "--endpoint");
    let budget_arg: Option<usize> = parse_arg_value(&args, "--budget").and_then(|s| s.parse().ok());
    let show_sentences = has_flag(&args, "--sentences");
    let show_html = has_flag(&args, "--html");
    let out_path = parse_arg_value(&args, "--out");

    let text = if path == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("read stdin failed")?;
        buf
    } else {
        std::fs::read_to_string(&path).with_context(|| format!("read file failed: {}", path))?
    };

    let config = match ConfigStore::default_config_dir() {
        Some(dir) => ConfigStore::new(dir).load().map_err(|e| anyhow!(e))?,
        None => Default::default(),
    };

    let endpoint = endpoint_arg
        .or_else(|| {
            let configured = config.classifier.endpoint.trim().to_string();
            (!configured.is_empty()).then_some(configured)
        })
        .unwrap_or_else(HttpClassifier::endpoint_from_env);

    let mut thresholds: DetectionThresholds = config.detection.thresholds();
    if let Some(budget) = budget_arg {
        thresholds.max_chunk_budget = budget;
    }

    let classifier = Arc::new(HttpClassifier::new(
        endpoint.clone(),
        config.classifier.timeout_secs,
    ));
    let detector = Detector::new(classifier, thresholds)
        .with_max_concurrency(config.detection.max_concurrency);

    println!("Input: {}", if path == "-" { "(stdin)" } else { &path });
    println!("Chars: {}", text.chars().count());
    println!("Classifier: {}", endpoint);
    println!();

    let result = detector
        .analyze(&text)
        .await
        .map_err(|e| anyhow!("analysis failed: {}", e))?;

    println!("AI probability: {:.1}%", result.ai_probability * 100.0);
    println!(
        "Verdict: {}",
        if result.is_ai_generated { "AI-generated" } else { "human-written" }
    );
    println!(
        "Confidence: {} ({:.1}%)",
        confidence_label(result.confidence_level),
        result.ai_probability * 100.0
    );
    println!("Chunks: {}", result.total_chunks);
    println!("Highlighted: {}", result.highlighted_parts.len());
    println!();

    for pred in &result.chunk_predictions {
        let status = match &pred.error {
            Some(e) => format!("ERROR: {}", e),
            None => format!("{:.1}%{}", pred.ai_probability * 100.0, if pred.is_ai { " [AI]" } else { "" }),
        };
        println!(
            "[C{:04}] words={} {}  {}",
            pred.chunk_id,
            pred.text.split_whitespace().count(),
            status,
            preview(&pred.text, 100)
        );
    }

    if show_sentences {
        println!();
        let sentences = detector
            .analyze_sentences(&text)
            .await
            .map_err(|e| anyhow!("sentence analysis failed: {}", e))?;
        println!("Sentences: {}", sentences.len());
        for s in &sentences {
            let status = match &s.error {
                Some(e) => format!("ERROR: {}", e),
                None => format!("{:.1}%{}", s.ai_probability * 100.0, if s.is_ai { " [AI]" } else { "" }),
            };
            println!("[S{:04}] {}  {}", s.sentence_id, status, preview(&s.text, 100));
        }
    }

    if show_html {
        println!();
        let annotated = detector.render_highlights(&text, &result);
        println!("Markers: {}", count_markers(&annotated));
        println!("{}", annotated);
    }

    if let Some(out_path) = out_path {
        let json = serde_json::to_string_pretty(&result)?;
        std::fs::write(&out_path, json).with_context(|| format!("write out failed: {}", out_path))?;
        println!();
        println!("Wrote JSON: {}", out_path);
    }

    Ok(())
}
