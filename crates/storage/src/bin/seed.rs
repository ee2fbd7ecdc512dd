use std::fmt;

use quiz_core::model::{QuestionId, QuestionRecord};
use storage::repository::Storage;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone)]
struct Args {
    db_url: String,
    questions: u32,
}

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
    InvalidQuestions { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidQuestions { raw } => write!(f, "invalid --questions value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

impl Args {
    fn parse() -> Result<Self, ArgsError> {
        let mut db_url =
            std::env::var("QUIZ_DB_URL").unwrap_or_else(|_| "sqlite:quiz.sqlite3?mode=rwc".into());
        let mut questions = std::env::var("QUIZ_SEED_QUESTIONS")
            .ok()
            .and_then(|value| value.parse::<u32>().ok())
            .unwrap_or(40);

        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = value;
                }
                "--questions" => {
                    let value = require_value(&mut args, "--questions")?;
                    questions = value
                        .parse::<u32>()
                        .map_err(|_| ArgsError::InvalidQuestions { raw: value.clone() })?;
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self { db_url, questions })
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p storage --bin seed -- [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --db <sqlite_url>         SQLite URL (default: sqlite:quiz.sqlite3?mode=rwc)");
    eprintln!("  --questions <n>           Number of sample questions to upsert (default: 40)");
    eprintln!("  -h, --help                Show this help");
    eprintln!();
    eprintln!("Environment (same as flags):");
    eprintln!("  QUIZ_DB_URL, QUIZ_SEED_QUESTIONS, RUST_LOG");
}

// Correct answer first, as the store expects.
const SAMPLES: [(&str, [&str; 3]); 5] = [
    (
        "Which voltage is considered safe for portable lamps in damp rooms?",
        ["12 V", "127 V", "220 V"],
    ),
    (
        "What must be done before working on a de-energized installation?",
        [
            "Check for absence of voltage",
            "Notify the neighbours",
            "Remove all fuses from the building",
        ],
    ),
    (
        "Which colour marks the protective earth conductor?",
        ["Green-yellow", "Blue", "Brown"],
    ),
    (
        "Who may operate electrical installations above 1000 V?",
        [
            "Qualified personnel with the required safety group",
            "Any employee with a permit",
            "Anyone wearing dielectric gloves",
        ],
    ),
    (
        "What is the first action when a person is under voltage?",
        [
            "Free the person from the current",
            "Call the supervisor",
            "Pour water on the person",
        ],
    ),
];

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse().map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let storage = Storage::sqlite(&args.db_url).await?;

    for i in 0..args.questions {
        let idx = (i as usize) % SAMPLES.len();
        let (question, answers) = SAMPLES[idx];
        let record = QuestionRecord::new(
            QuestionId::new((i + 1).to_string()),
            format!("{question} (#{})", i + 1),
            answers.map(str::to_owned),
        )?;
        storage.bank.upsert_question(&record).await?;
    }

    let total = storage.bank.count_questions().await?;
    tracing::info!(seeded = args.questions, total, db = %args.db_url, "seeded question bank");
    println!(
        "Seeded {} questions into {} ({} total)",
        args.questions, args.db_url, total
    );

    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
