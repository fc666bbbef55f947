//! Surreal story remix CLI.
//!
//! Runs the full pipeline for one prompt, critiques the result, updates the
//! user's memory file, and writes the run artifacts:
//!
//! ```bash
//! cargo run -p remix-cli -- --prompt "a door that leads nowhere" --user-id u1 --style dark
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use remix_core::{
    save_artifacts, DreamBank, GeminiGenerator, Judge, LogTrace, Pipeline, PipelineConfig,
    RemixState, SerpApiFacts,
};

#[derive(Debug, Clone)]
struct CliOptions {
    prompt: String,
    user_id: String,
    style: String,
    branches: usize,
    pause_facts: bool,
    memory_dir: PathBuf,
    out_dir: PathBuf,
}

impl Default for CliOptions {
    fn default() -> Self {
        Self {
            prompt: String::new(),
            user_id: String::new(),
            style: "whimsical".to_string(),
            branches: 2,
            pause_facts: false,
            memory_dir: PathBuf::from("memory"),
            out_dir: PathBuf::from("."),
        }
    }
}

#[tokio::main]
async fn main() {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "remix_core=info,remix_cli=info".into()),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_help();
        return;
    }

    let options = match parse_args(&args) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("Run with --help for usage.");
            std::process::exit(2);
        }
    };

    // Check for API key before doing any work
    let generator = match GeminiGenerator::from_env() {
        Ok(generator) => Arc::new(generator),
        Err(_) => {
            eprintln!("Error: GEMINI_API_KEY environment variable not set.");
            eprintln!("Please set it in .env file or with: export GEMINI_API_KEY=your_key_here");
            std::process::exit(2);
        }
    };

    if let Err(e) = run(options, generator).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(
    options: CliOptions,
    generator: Arc<GeminiGenerator>,
) -> Result<(), Box<dyn std::error::Error>> {
    let trace = Arc::new(LogTrace);
    let pipeline = Pipeline::new(
        generator.clone(),
        Arc::new(SerpApiFacts::from_env()),
        trace.clone(),
        PipelineConfig {
            branch_count: options.branches,
            pause_facts: options.pause_facts,
            memory_dir: options.memory_dir.clone(),
        },
    );

    let mut state = RemixState::new(&options.prompt, &options.user_id, &options.style);
    pipeline.run(&mut state).await?;

    let judge = Judge::new(generator, trace);
    let critique = judge.review_run(&state).await;

    // Remember this run for the next one
    let mut bank = DreamBank::load(&options.memory_dir, &state.user_id).await;
    let core_idea = state.core_idea.as_deref().unwrap_or_default();
    bank.extract_and_store(core_idea, &critique.critique).await;

    let artifacts = save_artifacts(&options.out_dir, &state, &critique).await?;

    println!("{}", remix_core::render_transcript(&state, &critique));
    println!("Overall score: {:.1}", critique.overall);
    println!("Saved: {}", artifacts.json.display());
    println!("Saved: {}", artifacts.transcript.display());
    Ok(())
}

fn parse_args(args: &[String]) -> Result<CliOptions, String> {
    let mut options = CliOptions::default();

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--prompt" => {
                options.prompt = take_value(args, i, "--prompt")?;
                i += 1;
            }
            "--user-id" => {
                options.user_id = take_value(args, i, "--user-id")?;
                i += 1;
            }
            "--style" => {
                options.style = take_value(args, i, "--style")?;
                i += 1;
            }
            "--branches" => {
                let value = take_value(args, i, "--branches")?;
                options.branches = value
                    .parse()
                    .map_err(|_| format!("--branches must be a number, got '{value}'"))?;
                i += 1;
            }
            "--memory-dir" => {
                options.memory_dir = PathBuf::from(take_value(args, i, "--memory-dir")?);
                i += 1;
            }
            "--out-dir" => {
                options.out_dir = PathBuf::from(take_value(args, i, "--out-dir")?);
                i += 1;
            }
            "--pause-facts" => {
                options.pause_facts = true;
            }
            other => return Err(format!("unknown argument '{other}'")),
        }
        i += 1;
    }

    if options.prompt.trim().is_empty() {
        return Err("--prompt is required".to_string());
    }
    if options.user_id.trim().is_empty() {
        return Err("--user-id is required".to_string());
    }
    Ok(options)
}

fn take_value(args: &[String], i: usize, flag: &str) -> Result<String, String> {
    args.get(i + 1)
        .cloned()
        .ok_or_else(|| format!("{flag} requires a value"))
}

fn print_help() {
    println!("Reality Remix - surreal short story pipeline");
    println!();
    println!("USAGE:");
    println!("  remix --prompt <PROMPT> --user-id <ID> [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("  -h, --help             Show this help message");
    println!("  --prompt <PROMPT>      Story prompt (required)");
    println!("  --user-id <ID>         Identity for memory and artifacts (required)");
    println!("  --style <STYLE>        Narrative style (default: whimsical)");
    println!("  --branches <N>         Alternate versions to write (default: 2)");
    println!("  --pause-facts          Skip the fact lookup for this run");
    println!("  --memory-dir <DIR>     Memory file directory (default: memory)");
    println!("  --out-dir <DIR>        Artifact output directory (default: .)");
    println!();
    println!("ENVIRONMENT:");
    println!("  GEMINI_API_KEY         Required. Gemini API key.");
    println!("  SERPAPI_KEY            Optional. Enables the web fact lookup.");
}
