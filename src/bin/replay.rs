use std::fs;
use std::path::PathBuf;

use clap::Parser;
use homeworlds_engine::wire::WireAction;
use homeworlds_engine::{replay, Action};
use tracing::{error, info, warn};

#[derive(Debug, Parser)]
#[command(name = "homeworlds-replay")]
#[command(about = "Replay a Binary Homeworlds action log and print the resulting state")]
struct Args {
    /// Path to a JSON array of wire-form actions (§6).
    log: PathBuf,

    /// Print the resulting state's wire form to stdout on success.
    #[arg(long)]
    print_state: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let raw = match fs::read_to_string(&args.log) {
        Ok(raw) => raw,
        Err(err) => {
            error!(path = %args.log.display(), %err, "failed to read action log");
            std::process::exit(1);
        }
    };

    let wire_actions: Vec<WireAction> = match serde_json::from_str(&raw) {
        Ok(actions) => actions,
        Err(err) => {
            error!(%err, "action log is not a valid wire-form action array");
            std::process::exit(1);
        }
    };

    let actions: Vec<Action> = match wire_actions
        .into_iter()
        .map(Action::try_from)
        .collect::<Result<Vec<_>, _>>()
    {
        Ok(actions) => actions,
        Err(err) => {
            error!(%err, "failed to decode a wire action");
            std::process::exit(1);
        }
    };

    info!(count = actions.len(), "replaying action log");

    match replay(actions) {
        Ok(state) => {
            info!(phase = ?state.phase, winner = ?state.winner, "replay complete");
            if args.print_state {
                println!("{}", serde_json::to_string_pretty(&state.to_wire()).unwrap());
            }
        }
        Err((index, err)) => {
            warn!(index, %err, "replay rejected");
            std::process::exit(1);
        }
    }
}
