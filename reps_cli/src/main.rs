use clap::{Parser, Subcommand};
use reps_core::*;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "reptrack")]
#[command(about = "Guided bodyweight exercise rep counter", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Load configuration from this file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the exercise menu (default)
    List,

    /// Print the tracking options handed to the pose detector
    Tracking,

    /// Write a synthetic landmark recording
    Synth {
        /// Exercise to perform (high_knees, squats, lunges, calf_raises, one_leg_squat)
        #[arg(long)]
        exercise: String,

        /// Number of rep cycles to generate
        #[arg(long, default_value_t = 10)]
        reps: usize,

        /// Frame rate of the recording (defaults to replay.fps)
        #[arg(long)]
        fps: Option<u32>,

        /// Output file (stdout if omitted)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Replay a landmark recording through a guided session
    Run {
        /// Exercise to perform
        #[arg(long)]
        exercise: String,

        /// JSON Lines landmark recording
        #[arg(long)]
        frames: PathBuf,

        /// Frame rate of the recording (defaults to replay.fps)
        #[arg(long)]
        fps: Option<u32>,

        /// Print the session report as JSON instead of progress lines
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    reps_core::logging::init();

    let cli = Cli::parse();

    let config = match cli.config {
        Some(ref path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    tracing::debug!("Using config: {:?}", config);

    match cli.command {
        Some(Commands::List) | None => cmd_list(),
        Some(Commands::Tracking) => cmd_tracking(&config),
        Some(Commands::Synth {
            exercise,
            reps,
            fps,
            output,
        }) => cmd_synth(
            exercise.parse()?,
            reps,
            fps.unwrap_or(config.replay.fps),
            output.as_deref(),
        ),
        Some(Commands::Run {
            exercise,
            frames,
            fps,
            json,
        }) => cmd_run(
            exercise.parse()?,
            &frames,
            fps.unwrap_or(config.replay.fps),
            json,
            &config,
        ),
    }
}

fn cmd_list() -> Result<()> {
    println!("Select Exercise");
    println!();
    for (i, info) in catalog::menu().iter().enumerate() {
        println!("  {}. {:<14} [{}]", i + 1, info.label, info.exercise.id());
        println!("     {}", info.cue);
    }
    Ok(())
}

fn cmd_tracking(config: &Config) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&config.tracking)?);
    Ok(())
}

fn cmd_synth(exercise: Exercise, reps: usize, fps: u32, output: Option<&Path>) -> Result<()> {
    if fps == 0 {
        return Err(Error::Config("fps must be at least 1".into()));
    }

    let frames = synthetic::recording(exercise, reps, fps);

    match output {
        Some(path) => {
            pose::write_frames(path, &frames)?;
            println!(
                "✓ Wrote {} frames ({} x {}) to {}",
                frames.len(),
                reps,
                exercise,
                path.display()
            );
        }
        None => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            pose::write_frames_to(&mut out, &frames)?;
            out.flush()?;
        }
    }

    Ok(())
}

fn cmd_run(
    exercise: Exercise,
    frames: &Path,
    fps: u32,
    json: bool,
    config: &Config,
) -> Result<()> {
    let trainer = Trainer::new(config.tracking.clone());
    let mut runner = SessionRunner::new(trainer, fps)?;
    let mut source = JsonlFrameSource::new(frames);

    let report = runner.run(exercise, &mut source, |trainer, event| {
        if !json {
            display_event(trainer, event);
        }
    })?;

    if source.skipped() > 0 {
        eprintln!("Skipped {} malformed frames", source.skipped());
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!();
    if report.completed() {
        if let Some(ref summary) = report.summary {
            println!(
                "✓ {} x {} completed (session {})",
                summary.reps, summary.exercise, summary.key
            );
        }
    } else {
        println!(
            "Recording ended on the {} screen at {} / {} reps",
            report.final_screen, report.reps, TARGET_REPS
        );
    }

    Ok(())
}

fn display_event(trainer: &Trainer, event: &TrainerEvent) {
    match event {
        TrainerEvent::ScreenChanged { to: Screen::Calibration, .. } => {
            if let Some(exercise) = trainer.exercise() {
                println!("{}", exercise);
                println!("  {}", catalog::info(exercise).cue);
                println!("Step back until your shoulders and feet are inside the box...");
            }
        }
        TrainerEvent::ScreenChanged { to: Screen::Done, .. } => {
            println!("Great Job!");
        }
        TrainerEvent::Calibrated => println!("✅ Calibrated"),
        TrainerEvent::Countdown { display } => println!("  {}", display),
        TrainerEvent::RepCounted { .. } => {
            if let Some(text) = trainer.counter_text() {
                println!("{}", text);
            }
        }
        _ => {}
    }
}
