//! pdf-quiz CLI
//!
//! Commands:
//!   extract  - Print the normalized text of a PDF
//!   generate - Generate a 40-question exam from a PDF
//!   exam     - Take an exam in the terminal
//!   serve    - Start the relay server
//!   config   - Show or initialize configuration

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use indicatif::ProgressBar;
use pdf_quiz::config::{self, api_key_from_env, Config};
use pdf_quiz::server::{self, AppState};
use pdf_quiz::{
    parse_question_set, pdf, short_input_warning, ExamSession, OpenAIProvider, QuestionSet,
    QuizBackend, QuizGenerator, RelayClient,
};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "pdf-quiz")]
#[command(about = "Generate a multiple-choice exam from a PDF handout")]
#[command(version)]
struct Cli {
    /// Verbose logging (includes raw model output)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the normalized text extracted from a PDF
    Extract {
        /// Path to the PDF
        path: PathBuf,
    },

    /// Generate 40 questions from a PDF and print or save them as JSON
    Generate {
        /// Path to the PDF
        path: PathBuf,

        /// Write the questions to this file instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// API key (defaults to $OPENAI_API_KEY; falls back to the relay)
        #[arg(long)]
        api_key: Option<String>,
    },

    /// Take an exam in the terminal
    Exam {
        /// PDF to generate the exam from
        #[arg(required_unless_present = "questions", conflicts_with = "questions")]
        path: Option<PathBuf>,

        /// Previously generated questions (JSON)
        #[arg(short, long)]
        questions: Option<PathBuf>,

        /// API key (defaults to $OPENAI_API_KEY; falls back to the relay)
        #[arg(long)]
        api_key: Option<String>,
    },

    /// Start the relay server (requires $OPENAI_API_KEY)
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "8787")]
        port: u16,
    },

    /// Show the effective configuration
    Config {
        /// Write a default config file if none exists
        #[arg(long)]
        init: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    let config = Config::resolve()?;

    match cli.command {
        Commands::Extract { path } => {
            let text = extract_pdf(&path).await?;
            println!("{}", text);
        }

        Commands::Generate { path, out, api_key } => {
            let backend = select_backend(&config, api_key)?;
            let questions = generate_from_pdf(&path, backend.as_ref()).await?;
            let json = serde_json::to_string_pretty(&questions)?;

            match out {
                Some(out) => {
                    std::fs::write(&out, json)
                        .with_context(|| format!("Failed to write {}", out.display()))?;
                    println!(
                        "{} {} questions written to {}",
                        "✓".green(),
                        questions.len(),
                        out.display()
                    );
                }
                None => println!("{}", json),
            }
        }

        Commands::Exam { path, questions, api_key } => {
            let questions = match (questions, path) {
                (Some(file), _) => load_questions(&file)?,
                (None, Some(path)) => {
                    let backend = select_backend(&config, api_key)?;
                    generate_from_pdf(&path, backend.as_ref()).await?
                }
                (None, None) => bail!("Provide a PDF or --questions <file>"),
            };
            run_exam(ExamSession::new(questions))?;
        }

        Commands::Serve { port } => {
            let api_key = api_key_from_env().with_context(|| {
                format!("The relay needs {} set in its environment", config::API_KEY_ENV)
            })?;
            let provider = OpenAIProvider::from_config(api_key, &config)?;
            let state = Arc::new(AppState::new(Arc::new(QuizGenerator::new(provider))));
            server::run_server(state, port).await?;
        }

        Commands::Config { init } => {
            let path = Config::path()?;
            if init && !path.exists() {
                Config::default().save()?;
                println!("{} Wrote {}", "✓".green(), path.display());
            }
            println!("{}", format!("# {}", path.display()).dimmed());
            println!("{}", toml::to_string_pretty(&config)?);
            let key_state = if api_key_from_env().is_some() { "set".green() } else { "not set".yellow() };
            println!("{} {}", format!("{}:", config::API_KEY_ENV).dimmed(), key_state);
        }
    }

    Ok(())
}

/// Direct transport when a key is available, otherwise the relay
fn select_backend(config: &Config, api_key: Option<String>) -> Result<Box<dyn QuizBackend>> {
    if let Some(key) = api_key.or_else(api_key_from_env) {
        let provider = OpenAIProvider::from_config(key, config)?;
        return Ok(Box::new(QuizGenerator::new(provider)));
    }

    if let Some(url) = &config.relay_url {
        return Ok(Box::new(RelayClient::new(url.clone(), config.timeout())?));
    }

    bail!(
        "No credentials: set {} (or --api-key), or configure relay_url in {}",
        config::API_KEY_ENV,
        Config::path()?.display()
    )
}

async fn extract_pdf(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    eprintln!("Parsing PDF...");
    let text = pdf::extract_text_async(bytes)
        .await
        .with_context(|| format!("Could not extract text from {}", path.display()))?;

    if let Some(warning) = short_input_warning(&text) {
        eprintln!("{} {}", "Warning:".yellow().bold(), warning);
    }
    Ok(text)
}

async fn generate_from_pdf(path: &Path, backend: &dyn QuizBackend) -> Result<QuestionSet> {
    let text = extract_pdf(path).await?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_message("Generating questions...");
    spinner.enable_steady_tick(Duration::from_millis(100));

    let result = backend.generate(&text).await;
    spinner.finish_and_clear();

    let questions = result.context("Failed to generate questions")?;
    eprintln!("{} Questions generated successfully!", "✓".green());
    Ok(questions)
}

/// Accepts a saved JSON array, or raw model output with fences around it
fn load_questions(path: &Path) -> Result<QuestionSet> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let questions = parse_question_set(&content)
        .with_context(|| format!("{} is not a valid question set", path.display()))?;
    Ok(questions)
}

/// Read one trimmed line; None on EOF
fn prompt_line(prompt: &str) -> Result<Option<String>> {
    print!("{}", prompt);
    io::stdout().flush()?;

    let mut input = String::new();
    if io::stdin().read_line(&mut input)? == 0 {
        return Ok(None);
    }
    Ok(Some(input.trim().to_string()))
}

fn run_exam(mut exam: ExamSession) -> Result<()> {
    loop {
        let total = exam.questions().len();
        println!("\n{} {} questions. Type 1-4 to answer, q to quit.\n", "Exam:".bold(), total);

        for index in 0..total {
            let Some(question) = exam.questions().get(index).cloned() else {
                break;
            };

            println!("{} {}", format!("{}/{}.", index + 1, total).cyan(), question.question.bold());
            for (i, option) in question.options.iter().enumerate() {
                println!("   {}) {}", i + 1, option);
            }

            loop {
                let Some(input) = prompt_line(&format!("{} ", ">".green().bold()))? else {
                    println!("\nExam aborted.");
                    return Ok(());
                };
                if input.eq_ignore_ascii_case("q") {
                    println!("Exam aborted.");
                    return Ok(());
                }
                match input.parse::<usize>() {
                    Ok(choice) if (1..=question.options.len()).contains(&choice) => {
                        exam.select_position(index, choice - 1)?;
                        break;
                    }
                    _ => println!("{}", "Pick a number from 1 to 4.".yellow()),
                }
            }
            println!();
        }

        if !exam.is_complete() {
            bail!("{} questions left unanswered", exam.unanswered_count());
        }

        show_results(&exam);

        match prompt_line("Retake the same exam? [y/N] ")? {
            Some(answer) if answer.eq_ignore_ascii_case("y") => exam.reset(),
            _ => return Ok(()),
        }
    }
}

fn show_results(exam: &ExamSession) {
    println!(
        "{} {}/{} ({:.0}%)\n",
        "Results:".bold(),
        exam.score().to_string().green().bold(),
        exam.questions().len(),
        exam.percentage()
    );

    for review in exam.review() {
        let badge = if review.correct { "Correct".green() } else { "Incorrect".red() };
        println!("{}. {} [{}]", review.index + 1, review.question, badge);
        if !review.correct {
            println!("   Your answer:    {}", review.picked.unwrap_or("-").red());
            println!("   Correct answer: {}", review.answer.green());
        }
    }
    println!();
}
