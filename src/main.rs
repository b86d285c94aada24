//! Escape room command line: seed, inspect, import, play and delete rooms
//! stored in a local room database.

#[cfg(not(target_arch = "wasm32"))]
fn main() -> std::process::ExitCode {
    use clap::Parser;

    let args = cli::Args::parse();
    match cli::run(args) {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("Error: {}", e);
            std::process::ExitCode::FAILURE
        }
    }
}

// There is no command line on the web
#[cfg(target_arch = "wasm32")]
fn main() {}

#[cfg(not(target_arch = "wasm32"))]
mod cli {
    use std::io::{self, BufRead, Write};
    use std::path::PathBuf;

    use clap::{Parser, Subcommand};
    use thiserror::Error;
    use web_time::Instant;

    use escape_room::api::RoomApi;
    use escape_room::config::{AppConfig, ConfigError};
    use escape_room::layout::LayoutTracker;
    use escape_room::model::{AnswerRule, HotspotId};
    use escape_room::payload::SavePayload;
    use escape_room::play::{AnswerOutcome, PlayState, format_clock};
    use escape_room::seed::seed_demo_room;
    use escape_room::sync::{LocalBackend, RoomBackend, SyncError};
    use escape_room::{Confirmation, Session, SessionError};
    use room_db::{Database, DbError};

    #[derive(Parser, Debug)]
    #[command(author, version, about = "Build and play point-and-click escape rooms", long_about = None)]
    pub struct Args {
        /// Configuration file (defaults to the platform config directory)
        #[arg(long, global = true)]
        config: Option<PathBuf>,

        /// Room database file (overrides the configuration)
        #[arg(long, global = true)]
        database: Option<PathBuf>,

        #[command(subcommand)]
        command: Command,
    }

    #[derive(Subcommand, Debug)]
    enum Command {
        /// Insert the demo room "The Detective's Office"
        Seed,
        /// Print a stored room as JSON
        Show { room_id: String },
        /// Save a room from a JSON save payload
        Import { payload: PathBuf },
        /// Play a room in the terminal
        Play { room_id: String },
        /// Delete a room with all of its puzzles and hotspots
        Delete {
            room_id: String,
            /// Do not ask for confirmation
            #[arg(long)]
            yes: bool,
        },
        /// Write the current configuration to the config file
        InitConfig,
    }

    #[derive(Debug, Error)]
    pub enum CliError {
        #[error(transparent)]
        Config(#[from] ConfigError),

        #[error("Room database: {0}")]
        Db(#[from] DbError),

        #[error(transparent)]
        Session(#[from] SessionError),

        #[error(transparent)]
        Sync(#[from] SyncError),

        #[error("I/O error: {0}")]
        Io(#[from] io::Error),

        #[error("Invalid JSON: {0}")]
        Json(#[from] serde_json::Error),

        #[error("{0}")]
        Usage(String),
    }

    pub fn run(args: Args) -> Result<(), CliError> {
        let config_path = args.config.clone().or_else(AppConfig::default_path);
        let config = config_path
            .as_deref()
            .map(AppConfig::load_or_default)
            .unwrap_or_default();

        env_logger::Builder::new()
            .filter_level(config.preferences.log_level.to_level_filter())
            .parse_default_env()
            .init();

        if let Command::InitConfig = args.command {
            let path = config_path.ok_or_else(|| {
                CliError::Usage("Could not determine config directory".to_string())
            })?;
            config.save_to(&path)?;
            println!("Wrote {}", path.display());
            return Ok(());
        }

        let db_path = args.database.clone().unwrap_or_else(|| config.database_path());
        let db = Database::open(&db_path)?;
        log::debug!("Using room database {:?}", db_path);

        match args.command {
            Command::Seed => {
                let mut db = db;
                let room = seed_demo_room(&mut db)?;
                println!("Seeded \"{}\" as {} ({})", room.name, room.id, room.slug);
            }
            Command::Show { room_id } => {
                let api = RoomApi::new(db);
                let room = api
                    .load(&room_id)
                    .ok_or_else(|| SyncError::NotFound(room_id.clone()))?;
                println!("{}", serde_json::to_string_pretty(&room)?);
            }
            Command::Import { payload } => {
                let json = std::fs::read_to_string(&payload)?;
                let payload: SavePayload = serde_json::from_str(&json)?;
                let mut backend = LocalBackend::new(RoomApi::new(db));
                let saved = backend.save_room(&payload)?;
                println!("Saved room {} ({})", saved.room_id, saved.slug);
            }
            Command::Play { room_id } => {
                let layout =
                    LayoutTracker::new().with_debounce(config.preferences.layout_debounce());
                let mut session =
                    Session::new(LocalBackend::new(RoomApi::new(db))).with_layout(layout);
                session.load(&room_id, Instant::now())?;
                play(&mut session)?;
            }
            Command::Delete { room_id, yes } => {
                let mut session = Session::new(LocalBackend::new(RoomApi::new(db)));
                session.request(Confirmation::DeleteRoom(room_id.clone()));
                if yes || ask(&format!("Delete room {} and everything in it?", room_id))? {
                    session.confirm()?;
                    println!("Deleted room {}", room_id);
                } else {
                    session.dismiss();
                    println!("Cancelled");
                }
            }
            Command::InitConfig => {}
        }
        Ok(())
    }

    fn ask(question: &str) -> Result<bool, CliError> {
        print!("{} [y/N] ", question);
        io::stdout().flush()?;
        let mut answer = String::new();
        io::stdin().lock().read_line(&mut answer)?;
        Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
    }

    fn play(session: &mut Session<LocalBackend>) -> Result<(), CliError> {
        session.enter_play();

        let room = session.room();
        let targets: Vec<HotspotId> = room
            .hotspots
            .iter()
            .filter(|h| h.is_linked())
            .map(|h| h.id.clone())
            .collect();
        if targets.is_empty() {
            return Err(CliError::Usage(
                "This room has no puzzles to solve".to_string(),
            ));
        }

        println!("== {} ==", room.settings.name);
        for (i, id) in targets.iter().enumerate() {
            let Some(puzzle) = room.puzzle_for(id) else {
                continue;
            };
            println!("[{}] {}", i + 1, puzzle.question);
            if let AnswerRule::MultipleChoice { options, .. } = &puzzle.rule {
                for (n, option) in options.iter().enumerate() {
                    println!("      {}) {}", n, option);
                }
            }
        }
        println!("Answer with `<puzzle> <answer>`; also: pause, resume, restart, quit");
        print_status(session, targets.len());

        let mut last = Instant::now();
        for line in io::stdin().lock().lines() {
            let line = line?;
            let now = Instant::now();
            session.advance(now.duration_since(last));
            last = now;

            if session.play_state() == PlayState::TimedOut {
                println!("Time is up!");
                break;
            }

            match line.trim() {
                "" => {}
                "q" | "quit" => break,
                "pause" => session.pause()?,
                "resume" => session.resume()?,
                "restart" => session.restart()?,
                input => answer(session, &targets, input)?,
            }

            if let PlayState::Won { seconds_left } = session.play_state() {
                println!("You escaped with {} to spare!", format_clock(seconds_left));
                break;
            }
            print_status(session, targets.len());
        }

        session.leave_play();
        Ok(())
    }

    fn answer(
        session: &mut Session<LocalBackend>,
        targets: &[HotspotId],
        input: &str,
    ) -> Result<(), CliError> {
        let (index, text) = input.split_once(' ').unwrap_or((input, ""));
        let Some(hotspot_id) = index
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|n| targets.get(n))
        else {
            println!("Unknown puzzle '{}'", index);
            return Ok(());
        };

        match session.submit_answer(hotspot_id, text)? {
            AnswerOutcome::Correct { .. } => println!("Correct!"),
            AnswerOutcome::Incorrect { clue: Some(clue) } => println!("Wrong. Clue: {}", clue),
            AnswerOutcome::Incorrect { clue: None } => println!("Wrong."),
            AnswerOutcome::AlreadySolved => println!("Already solved."),
            AnswerOutcome::NotRunning => println!("The clock is stopped; `resume` first."),
            AnswerOutcome::NoPuzzle | AnswerOutcome::UnknownHotspot => {
                println!("Nothing to solve there.")
            }
        }
        Ok(())
    }

    fn print_status(session: &Session<LocalBackend>, total: usize) {
        let solved = session.completion().iter().filter(|done| **done).count();
        let paused = matches!(session.play_state(), PlayState::Paused { .. });
        println!(
            "[{}{}] {}/{} solved",
            session.play().clock(),
            if paused { " paused" } else { "" },
            solved,
            total
        );
    }
}
