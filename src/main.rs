use std::io::{self, BufRead, Write};

use clap::{Parser, Subcommand};

use tuvung_core::{
    logging, move_record, Config, MoveOutcome, NewVocabulary, PartOfSpeech, QuestionKind, QuizEvent, QuizMode,
    QuizSessionController, SessionState, SqliteStore, Status, StatusBoard, VocabularyStore,
};

#[derive(Parser)]
#[command(name = "tuvung", about = "Vocabulary notebook and quiz", version)]
struct Cli {
    /// SQLite database file (overrides TUVUNG_DB_PATH)
    #[arg(long, global = true)]
    db: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Add a word
    Add {
        word: String,
        /// noun, verb, adjective, adverb, preposition, conjunction, pronoun, phrase
        #[arg(value_parser = parse_part_of_speech)]
        part_of_speech: PartOfSpeech,
        meaning: String,
    },

    /// List all words
    List {
        /// Only words with this status
        #[arg(long, value_parser = parse_status)]
        status: Option<Status>,
    },

    /// Show words grouped by status
    Board,

    /// Set a word's status by hand
    Move {
        id: String,
        #[arg(value_parser = parse_status)]
        status: Status,
    },

    /// Replace a word's text, part of speech and meaning; status is kept
    Edit {
        id: String,
        word: String,
        #[arg(value_parser = parse_part_of_speech)]
        part_of_speech: PartOfSpeech,
        meaning: String,
    },

    /// Delete a word
    Delete { id: String },

    /// Show database path, schema version and word counts
    Info,

    /// Run an interactive quiz over one status column
    Quiz {
        #[arg(value_parser = parse_status)]
        status: Status,
        /// multiple_choice or writing
        #[arg(value_parser = parse_mode)]
        mode: QuizMode,
    },
}

fn parse_status(s: &str) -> Result<Status, String> {
    Status::parse(s).ok_or_else(|| format!("unknown status '{s}' (to_learn, learning, mastered)"))
}

fn parse_mode(s: &str) -> Result<QuizMode, String> {
    QuizMode::parse(s).ok_or_else(|| format!("unknown mode '{s}' (multiple_choice, writing)"))
}

fn parse_part_of_speech(s: &str) -> Result<PartOfSpeech, String> {
    PartOfSpeech::parse(s).ok_or_else(|| format!("unknown part of speech '{s}'"))
}

fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let config = Config::from_env();
    let _log_guard = logging::init_tracing(&config.log_level);

    let cli = Cli::parse();
    let db_path = cli.db.unwrap_or_else(|| config.db_path.clone());
    let store = VocabularyStore::new(SqliteStore::open(&db_path)?);
    tracing::debug!(db_path = %db_path, "store opened");

    match cli.command {
        Command::Add {
            word,
            part_of_speech,
            meaning,
        } => {
            let record = store.add(NewVocabulary::new(word, part_of_speech, meaning))?;
            println!("{}  {}  {}", record.id, record.word, record.rendered_meaning());
        }
        Command::List { status } => {
            let records = match status {
                Some(status) => store.by_status(status)?,
                None => store.list()?,
            };
            for record in records {
                println!(
                    "{}  {:<20} {:<10} {}",
                    record.id,
                    record.word,
                    record.status.as_str(),
                    record.rendered_meaning()
                );
            }
        }
        Command::Board => {
            let board = StatusBoard::load(&store)?;
            for column in board.columns() {
                println!("== {} ({}) ==", column.title(), column.len());
                for record in &column.records {
                    println!("  {}  {}", record.word, record.rendered_meaning());
                }
            }
        }
        Command::Move { id, status } => match move_record(&store, &id, status)? {
            MoveOutcome::Moved { from, to } => println!("{from} -> {to}"),
            MoveOutcome::Unchanged => println!("already {status}"),
            MoveOutcome::NotFound => anyhow::bail!("no word with id {id}"),
        },
        Command::Edit {
            id,
            word,
            part_of_speech,
            meaning,
        } => {
            let record = store.edit(&id, NewVocabulary::new(word, part_of_speech, meaning))?;
            println!("{}  {}  {}", record.id, record.word, record.rendered_meaning());
        }
        Command::Info => {
            println!("database: {}", store.kv().db_path());
            for migration in store.kv().migration_history()? {
                println!("schema v{} {}", migration.version, migration.name);
            }
            for (status, count) in StatusBoard::load(&store)?.counts() {
                println!("{}: {count}", status.label());
            }
        }
        Command::Delete { id } => {
            if !store.delete(&id)? {
                anyhow::bail!("no word with id {id}");
            }
        }
        Command::Quiz { status, mode } => {
            let controller = QuizSessionController::new(store, config.quiz_options());
            run_quiz(controller, status, mode)?;
        }
    }

    Ok(())
}

fn run_quiz(
    mut controller: QuizSessionController<SqliteStore>,
    status: Status,
    mode: QuizMode,
) -> anyhow::Result<()> {
    controller.subscribe(|event: &QuizEvent| {
        if let QuizEvent::PersistenceFailed { message, .. } = event {
            eprintln!("! could not save progress: {message}");
        }
    });

    let total = controller.start(status, mode)?.len();
    println!("{} / {} ({total})", mode.label(), status.label());

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    while controller.state() == SessionState::InProgress {
        let Some(session) = controller.session() else { break };
        let Some(question) = session.current_question() else { break };

        println!();
        print!("[{}/{}] ", session.current_index() + 1, session.len());
        let options = match &question.kind {
            QuestionKind::MultipleChoice { options } => {
                println!("{}", question.prompt);
                for (i, option) in options.iter().enumerate() {
                    println!("  {}. {option}", i + 1);
                }
                Some(options.clone())
            }
            QuestionKind::Writing { clue, scaffold } => {
                println!("{clue}");
                println!("  {}", scaffold.masked(&question.correct_answer));
                None
            }
        };

        print!("> ");
        io::stdout().flush()?;
        let Some(line) = lines.next().transpose()? else {
            controller.cancel()?;
            break;
        };
        let line = line.trim();
        if line == ":q" {
            controller.cancel()?;
            println!("quiz cancelled");
            return Ok(());
        }

        // Multiple choice accepts the option number
        let answer = options
            .as_ref()
            .and_then(|opts| line.parse::<usize>().ok().and_then(|n| opts.get(n.wrapping_sub(1))))
            .map(String::as_str)
            .unwrap_or(line)
            .to_string();

        let result = controller.submit_answer(&answer)?;
        if result.correct {
            println!("correct");
        } else {
            println!("wrong, answer: {}", result.correct_answer);
        }
        if let Some(next) = result.new_status {
            println!("  -> {}", next.label());
        }
        controller.advance()?;
    }

    if let Ok(result) = controller.result() {
        println!();
        println!("{}/{} correct", result.correct, result.total);
    }
    Ok(())
}
