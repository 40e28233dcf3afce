//! Terminal Interview Client
//!
//! Runs one mock interview on stdin/stdout. The first question is asked when
//! the session starts; every answer gets a follow-up and feedback. `/next`
//! asks a fresh question and `/end` (or EOF) closes the session with a
//! summary.

use anyhow::{Context, Result};
use clap::Parser;
use interview_core::{
    InterviewError, InterviewOrchestrator,
    generator::{GeneratorSettings, Provider, build_generator},
    loader::load_from_dir,
};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{Level, info};

#[derive(Parser, Debug)]
#[command(version, about = "Practice a job interview in the terminal")]
struct Args {
    #[arg(long, default_value = "software_engineer")]
    role: String,
    #[arg(long, default_value = "mid")]
    seniority: String,
    #[arg(long, default_value = "backend")]
    domain: String,
    #[arg(long, default_value = "efficient")]
    persona: String,
    /// Directory holding roles.json, rubric.json and prompts/.
    #[arg(long, default_value = "./data")]
    data: PathBuf,
    /// Generation backend: ollama, openai or mock.
    #[arg(long, default_value = "ollama")]
    provider: Provider,
    #[arg(long, default_value = "mistral")]
    model: String,
    #[arg(long, default_value = "http://localhost:11434")]
    ollama_url: String,
    #[arg(long, default_value = "https://api.openai.com/v1")]
    openai_base_url: String,
    #[arg(long, default_value = "warn")]
    log_level: Level,
    /// Print the available roles and personas, then exit.
    #[arg(long)]
    list: bool,
}

/// One line of user input.
#[derive(Debug, PartialEq, Eq)]
enum Input {
    Answer(String),
    Next,
    End,
}

fn parse_input(line: &str) -> Option<Input> {
    match line.trim() {
        "" => None,
        "/end" | "/quit" => Some(Input::End),
        "/next" => Some(Input::Next),
        answer => Some(Input::Answer(answer.to_string())),
    }
}

/// Prints a failed generation as an explicit failure state.
fn report(what: &str, err: &InterviewError) {
    println!("Agent: [failed to produce {what}] {err}");
}

async fn ask_question(orc: &mut InterviewOrchestrator) -> bool {
    match orc.next_question().await {
        Ok(question) => {
            println!("\nAgent: {question}\n");
            true
        }
        Err(e) => {
            report("a question", &e);
            false
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(args.log_level)
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
        .with_writer(std::io::stderr)
        .init();

    let profiles = Arc::new(
        load_from_dir(&args.data)
            .with_context(|| format!("Failed to load interview data from {}", args.data.display()))?,
    );

    if args.list {
        for role in profiles.role_ids() {
            println!("role {role}: {}", profiles.role_domains(role)?.join(", "));
        }
        println!("personas: {}", profiles.persona_ids().collect::<Vec<_>>().join(", "));
        return Ok(());
    }

    let settings = GeneratorSettings {
        provider: args.provider,
        model: args.model.clone(),
        ollama_url: args.ollama_url.clone(),
        openai_api_key: std::env::var("OPENAI_API_KEY").ok(),
        openai_base_url: args.openai_base_url.clone(),
    };
    let generator = build_generator(&settings).context("Failed to initialize the generator")?;
    info!(provider = %settings.provider, model = %settings.model, "Generator ready");

    let mut orc = InterviewOrchestrator::new(profiles, generator);
    orc.set_profile(&args.role, &args.seniority, &args.domain, &args.persona)?;

    let ctx = orc.context();
    println!(
        "Agent: Starting {} interview ({}, {}) as {} persona.",
        ctx.role, ctx.seniority, ctx.domain, ctx.persona
    );
    println!("Type your answer and press Enter. /next asks a new question, /end finishes.");

    if !ask_question(&mut orc).await {
        return Ok(());
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("You: ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            println!();
            break;
        };
        let answer = match parse_input(&line) {
            None => continue,
            Some(Input::End) => break,
            Some(Input::Next) => {
                if !ask_question(&mut orc).await {
                    return Ok(());
                }
                continue;
            }
            Some(Input::Answer(answer)) => answer,
        };

        match orc.followup(&answer).await {
            Ok(reply) => println!("Agent (follow-up): {reply}"),
            Err(e) => {
                report("a follow-up", &e);
                return Ok(());
            }
        }
        match orc.feedback(&answer).await {
            Ok(record) => println!("{}\n", record.render()),
            Err(e) => {
                report("feedback", &e);
                return Ok(());
            }
        }
    }

    match orc.summary().await {
        Ok(summary) => println!("Agent (summary): {summary}"),
        Err(e) => report("a summary", &e),
    }
    println!("Agent: Interview ended.");
    Ok(())
}
