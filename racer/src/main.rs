use std::path::PathBuf;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use racer::autopilot::{bot_ids, create_bot, describe_bots};
use racer::client::{DEFAULT_REQUEST_TIMEOUT, DEFAULT_SERVER_URL};
use racer::runner::{read_ride, run_bot, write_ride};
use racer::surface::{
    JsonLinesSurface, LogSurface, NamePrompt, ScriptedPrompt, StdinPrompt, Surface,
};
use racer::{Driver, HttpScoreClient, ProfileCache};
use racer_core::constants::{FRAMES_PER_SECOND, MAX_FRAMES_DEFAULT};
use racer_core::{verify_ride, FixedStep};

#[derive(Parser, Debug)]
#[command(name = "racer")]
#[command(about = "Headless Hurdle Racer client: play against the score service, verify ride logs")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Play one session with an autopilot at the wheel
    Play(PlayArgs),
    /// Verify a recorded ride log and print what it establishes
    Replay {
        #[arg(long)]
        input: PathBuf,
        #[arg(long, default_value_t = MAX_FRAMES_DEFAULT)]
        max_frames: u32,
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// List available autopilot bots
    Bots,
}

#[derive(Args, Debug)]
struct PlayArgs {
    /// Score service base URL
    #[arg(long, default_value = DEFAULT_SERVER_URL)]
    server: String,
    /// Directory holding the cached player profile
    #[arg(long, default_value = "racer-data")]
    data_dir: PathBuf,
    /// Name to register when no player is cached (prompts on stdin otherwise)
    #[arg(long)]
    player: Option<String>,
    /// Session seed, decimal or 0x-prefixed hex
    #[arg(long, value_parser = parse_seed)]
    seed: Option<u32>,
    #[arg(long, default_value_t = 18_000)]
    max_frames: u32,
    #[arg(long, default_value = "hopper")]
    bot: String,
    /// Presentation rate; the simulation always ticks at its fixed rate
    #[arg(long, default_value_t = FRAMES_PER_SECOND)]
    fps: u32,
    /// Pace frames by the wall clock instead of running flat out
    #[arg(long)]
    realtime: bool,
    /// Write the played inputs and milestones as a JSON ride log
    #[arg(long)]
    record: Option<PathBuf>,
    /// Write every rendered scene as JSON lines
    #[arg(long)]
    scene_log: Option<PathBuf>,
    /// How long to wait for outstanding score requests after the session
    #[arg(long, default_value_t = 2_000)]
    submit_grace_ms: u64,
    /// Skip the score service entirely
    #[arg(long)]
    offline: bool,
}

fn parse_seed(raw: &str) -> Result<u32> {
    let raw = raw.trim();
    match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        Some(hex) => {
            u32::from_str_radix(hex, 16).with_context(|| format!("invalid hex seed: {raw}"))
        }
        None => raw
            .parse::<u32>()
            .with_context(|| format!("invalid decimal seed: {raw}")),
    }
}

fn clock_seed() -> u32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.subsec_nanos() ^ elapsed.as_secs() as u32)
        .unwrap_or(1)
}

#[actix_rt::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::filter::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    match Cli::parse().command {
        Commands::Play(args) => play(args).await,
        Commands::Replay {
            input,
            max_frames,
            json,
        } => {
            let ride = read_ride(&input)?;
            let summary = verify_ride(&ride, max_frames)
                .with_context(|| format!("{} did not verify", input.display()))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!("input={}", input.display());
                println!("seed={:#010x}", summary.seed);
                println!("frames={}", summary.frame_count);
                println!("score={}", summary.final_score);
                println!("hits={}", summary.final_hit_count);
                println!("game_over={}", summary.game_over);
                println!("jumps_scored={}", summary.jumps_scored);
                println!("input_runs={}", summary.input_runs);
            }
            Ok(())
        }
        Commands::Bots => {
            for (id, description) in describe_bots() {
                println!("{id:10} {description}");
            }
            Ok(())
        }
    }
}

async fn play(args: PlayArgs) -> Result<()> {
    if create_bot(&args.bot).is_none() {
        let available = bot_ids().join(", ");
        return Err(anyhow!("unknown bot '{}'. available: {available}", args.bot));
    }
    if args.max_frames == 0 {
        return Err(anyhow!("--max-frames must be > 0"));
    }
    let seed = args.seed.unwrap_or_else(clock_seed);

    if args.offline {
        let artifact = run_bot(&args.bot, seed, args.max_frames)?;
        println!("{}", serde_json::to_string_pretty(&artifact.metrics)?);
        if let Some(path) = &args.record {
            write_ride(path, &artifact.ride)?;
            println!("ride={}", path.display());
        }
        return Ok(());
    }

    match &args.scene_log {
        Some(path) => {
            let surface = JsonLinesSurface::create(path)?;
            play_online(&args, seed, surface).await
        }
        None => play_online(&args, seed, LogSurface::new(u64::from(args.fps) * 5)).await,
    }
}

async fn play_online<U: Surface>(args: &PlayArgs, seed: u32, surface: U) -> Result<()> {
    let profile = ProfileCache::open(&args.data_dir)?;
    let prompt: Box<dyn NamePrompt> = match &args.player {
        Some(name) => Box::new(ScriptedPrompt::new([name.clone()])),
        None => Box::new(StdinPrompt::default()),
    };
    let service = HttpScoreClient::new(&args.server, DEFAULT_REQUEST_TIMEOUT);
    let mut bot = create_bot(&args.bot).ok_or_else(|| anyhow!("unknown bot '{}'", args.bot))?;
    bot.reset(seed);

    tracing::info!(
        seed = %format!("{seed:#010x}"),
        bot = bot.id(),
        server = service.base_url(),
        player = profile.player_name().unwrap_or("-"),
        "starting session"
    );

    let mut driver = Driver::new(
        seed,
        FixedStep::new(FRAMES_PER_SECOND),
        service,
        surface,
        prompt,
        profile,
    );
    let frame_interval = Duration::from_secs(1) / args.fps.max(1);
    let mut last_frame = Instant::now();

    while driver.session().snapshot().frame_count < args.max_frames {
        let delta = if args.realtime {
            let now = Instant::now();
            let delta = now - last_frame;
            last_frame = now;
            delta
        } else {
            frame_interval
        };

        let input = bot.next_input(&driver.session().snapshot());
        if driver.frame(delta, input)?.game_over {
            break;
        }

        if args.realtime {
            actix_rt::time::sleep(frame_interval.saturating_sub(last_frame.elapsed())).await;
        } else {
            actix_rt::task::yield_now().await;
        }
    }

    driver
        .settle(Duration::from_millis(args.submit_grace_ms))
        .await;

    let result = driver.result();
    println!("seed={seed:#010x}");
    println!("frames={}", result.frame_count);
    println!("score={}", result.final_score);
    println!("hits={}", result.final_hit_count);
    println!("game_over={}", result.game_over);
    println!(
        "player={}",
        driver.profile().player_name().unwrap_or("(unregistered)")
    );
    if let Some(path) = &args.record {
        write_ride(path, &driver.ride()?)?;
        println!("ride={}", path.display());
    }
    Ok(())
}
