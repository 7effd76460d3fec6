use std::path::PathBuf;

use clap::{Parser, Subcommand};
use stagehand_core::config::ConfigLoader;
use stagehand_host::{init_logging, run_countdown, CountdownOptions, DEFAULT_MAX_CHARS};

#[derive(Parser)]
#[command(version, about = "Drive a stagehand countdown against the default audio device")]
struct Cli {
    /// YAML configuration file (defaults apply when omitted)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Print the debug log overlay on exit
    #[arg(long, global = true)]
    dump_log: bool,

    /// Character cap of the debug log overlay
    #[arg(long, global = true, default_value_t = DEFAULT_MAX_CHARS)]
    log_cap: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Count down from SECONDS, announcing milestones
    Countdown {
        seconds: f64,

        /// Effect played on every milestone
        #[arg(long)]
        tick_sound: Option<PathBuf>,

        /// Music started when the countdown completes
        #[arg(long)]
        finish_music: Option<PathBuf>,

        /// Frames per second of the update loop
        #[arg(long, default_value_t = 60.0)]
        fps: f64,

        /// Seconds to keep audio playing after completion
        #[arg(long, default_value_t = 3.0)]
        linger: f64,

        /// Start with output muted
        #[arg(long)]
        mute: bool,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let overlay = init_logging(cli.log_cap);

    let config = ConfigLoader::new().load_or_default(cli.config.as_ref())?;

    let result = match cli.command {
        Commands::Countdown {
            seconds,
            tick_sound,
            finish_music,
            fps,
            linger,
            mute,
        } => {
            let options = CountdownOptions {
                seconds,
                tick_sound,
                finish_music,
                fps,
                linger,
                muted: mute,
            };
            run_countdown(options, config).await
        }
    };

    if let Err(e) = &result {
        tracing::error!("{:#}", e);
    }
    if cli.dump_log {
        print!("{}", overlay.contents());
    }
    result
}
