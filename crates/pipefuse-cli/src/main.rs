//! pipefuse CLI: run, validate, or explain YAML pipelines over JSON input.

use clap::{Parser, Subcommand};
use pipefuse_core::config::EngineConfig;
use pipefuse_core::value::Value;
use pipefuse_exec::Engine;
use pipefuse_operators::Registry;
use pipefuse_planner::{explain, lower, parse_yaml_pipeline, PipelineConfig, Segment};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "pipefuse")]
#[command(about = "pipefuse: fused, short-circuiting collection pipelines", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a pipeline from a YAML file against a JSON input
    Run {
        /// Path to the pipeline YAML file
        #[arg(short, long)]
        pipeline: PathBuf,

        /// Path to the JSON input document
        #[arg(short, long)]
        input: PathBuf,

        /// Run every step on its own (overrides config)
        #[arg(long)]
        no_fusion: bool,

        /// Print the full run report as JSON instead of just the output
        #[arg(long)]
        report: bool,
    },

    /// Validate a pipeline YAML file (syntax and op parameters)
    Validate {
        /// Path to the pipeline YAML file
        #[arg(short, long)]
        pipeline: PathBuf,
    },

    /// Show how the pipeline's steps are grouped into fused runs
    Explain {
        /// Path to the pipeline YAML file
        #[arg(short, long)]
        pipeline: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            pipeline,
            input,
            no_fusion,
            report,
        } => {
            if let Err(e) = run_pipeline(&pipeline, &input, no_fusion, report) {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
        Commands::Validate { pipeline } => {
            if let Err(e) = validate_pipeline(&pipeline) {
                eprintln!("Validation failed: {}", e);
                std::process::exit(1);
            }
            println!("✓ Pipeline is valid");
        }
        Commands::Explain { pipeline } => {
            if let Err(e) = explain_pipeline(&pipeline) {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
    }
}

fn run_pipeline(
    pipeline_path: &Path,
    input_path: &Path,
    no_fusion: bool,
    report: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let yaml_content = fs::read_to_string(pipeline_path)?;
    let parsed = parse_yaml_pipeline(&yaml_content)?;
    let steps = lower(&parsed.spec, &Registry::new())?;

    let input: serde_json::Value = serde_json::from_str(&fs::read_to_string(input_path)?)?;

    let config = build_config(&parsed.config, no_fusion);
    let mut engine = Engine::new(config);
    let out = engine.run_report(Value::from(input), &steps)?;

    if report {
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("{}", serde_json::Value::from(out.output));
    eprintln!("✓ Pipeline executed successfully");
    eprintln!("  Duration: {}ms", out.manifest.duration_ms());
    eprintln!("  Plan hash: {}", out.manifest.plan_hash);
    eprintln!(
        "  Fused runs: {} ({} steps), eager steps: {}",
        out.stats.fused_runs, out.stats.fused_steps, out.stats.eager_steps
    );
    eprintln!(
        "  Pulled: {}, emitted: {}, short-circuits: {}",
        out.stats.pulled, out.stats.emitted, out.stats.short_circuits
    );

    Ok(())
}

fn validate_pipeline(pipeline_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let yaml_content = fs::read_to_string(pipeline_path)?;
    let parsed = parse_yaml_pipeline(&yaml_content)?;
    let _ = lower(&parsed.spec, &Registry::new())?;
    build_config(&parsed.config, false).validate()?;
    Ok(())
}

fn explain_pipeline(pipeline_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let yaml_content = fs::read_to_string(pipeline_path)?;
    let parsed = parse_yaml_pipeline(&yaml_content)?;
    let steps = lower(&parsed.spec, &Registry::new())?;
    let config = build_config(&parsed.config, false);

    println!("Pipeline Execution Plan");
    println!("======================");
    println!();
    println!("Steps: {}", steps.len());
    println!("Fusion: {}", if config.fusion_enabled { "on" } else { "off" });
    println!();
    println!("Segments (for sequence input):");
    for segment in explain(&steps) {
        println!("  {}", segment);
    }
    if !config.fusion_enabled {
        let fused = explain(&steps)
            .iter()
            .filter(|s| matches!(s, Segment::Fused { names, .. } if names.len() > 1))
            .count();
        if fused > 0 {
            println!();
            println!("  note: fusion is off; multi-step runs execute one step at a time");
        }
    }

    Ok(())
}

/// Env defaults, then the pipeline file's `config:`, then CLI flags.
fn build_config(doc: &PipelineConfig, no_fusion: bool) -> EngineConfig {
    let mut cfg = EngineConfig::from_env();
    doc.apply(&mut cfg);
    if no_fusion {
        cfg.fusion_enabled = false;
    }
    cfg
}
