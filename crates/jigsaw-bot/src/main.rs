//! `jigsaw-bot`: joins a puzzle room and assembles part of the puzzle.
//!
//! ```text
//! jigsaw-bot --room abcd --edges
//! jigsaw-bot --room abcd --region "(0,0):(3,3)" --delay 2ms
//! ```

mod strategy;

use std::sync::Arc;
use std::time::Duration;

use clap::{ArgGroup, Parser};
use jigsaw::prelude::*;
use jigsaw::session::{DEFAULT_USER_COLOR, DEFAULT_USER_NAME, GATEWAY_URL};
use tokio::sync::oneshot;

use strategy::{Placement, Region, Strategy, StrategyError};

/// Time given to queued commands to reach the socket before exiting.
const SETTLE_DELAY: Duration = Duration::from_millis(250);

#[derive(Parser, Debug)]
#[command(name = "jigsaw-bot", version, about = "Assembles jigsaw puzzle rooms")]
#[command(group(
    ArgGroup::new("strategy")
        .required(true)
        .args(["edges", "complete", "region"])
))]
struct Cli {
    /// Room code to join
    #[arg(long)]
    room: String,

    /// Room secret for private rooms
    #[arg(long)]
    secret: Option<String>,

    /// Display name
    #[arg(long, default_value = DEFAULT_USER_NAME)]
    name: String,

    /// Display color
    #[arg(long, default_value = DEFAULT_USER_COLOR)]
    color: String,

    /// Assemble the border
    #[arg(long)]
    edges: bool,

    /// Assemble the whole puzzle
    #[arg(long)]
    complete: bool,

    /// Assemble one region
    #[arg(long, value_name = "(ROW,COL):(ROW,COL)")]
    region: Option<Region>,

    /// Drop the assembled region at the board's top-left corner
    #[arg(long, requires = "region")]
    top_left: bool,

    /// Skip root group checks for --region
    #[arg(long, requires = "region")]
    force: bool,

    /// Pause between commands (e.g. 500us, 2ms, 1s)
    #[arg(long, default_value = "500us", value_parser = parse_delay)]
    delay: Duration,

    /// Trace every frame
    #[arg(long)]
    debug: bool,

    /// Proceed even if the server version is unexpected
    #[arg(long)]
    override_version: bool,

    /// WebSocket gateway to dial
    #[arg(long, env = "JIGSAW_GATEWAY", default_value = GATEWAY_URL)]
    gateway: String,
}

impl Cli {
    fn session_options(&self) -> SessionOptions {
        let mut options = SessionOptions::new(&self.room)
            .with_user_name(&self.name)
            .with_user_color(&self.color)
            .with_debug(self.debug)
            .with_override_version(self.override_version)
            .with_gateway_url(&self.gateway);
        if let Some(secret) = &self.secret {
            options = options.with_secret(secret);
        }
        options
    }

    fn strategy(&self) -> Strategy {
        match (self.region, self.complete) {
            (Some(region), _) => Strategy::Region {
                region,
                placement: if self.top_left {
                    Placement::TopLeft
                } else {
                    Placement::BoardCenter
                },
                force: self.force,
            },
            (None, true) => Strategy::Complete,
            (None, false) => Strategy::Edges,
        }
    }
}

/// Parses a duration with a `ns`, `us`, `µs`, `ms`, `s` or `m` suffix.
fn parse_delay(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    let split = s
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .ok_or_else(|| format!("missing unit in {s:?}"))?;
    let (value, unit) = s.split_at(split);
    let value: f64 = value
        .parse()
        .map_err(|_| format!("invalid number in {s:?}"))?;

    let nanos_per_unit = match unit {
        "ns" => 1.0,
        "us" | "µs" => 1e3,
        "ms" => 1e6,
        "s" => 1e9,
        "m" => 60e9,
        _ => return Err(format!("unknown unit {unit:?} in {s:?}")),
    };
    let nanos = (value * nanos_per_unit).round();
    if !nanos.is_finite() || nanos > u64::MAX as f64 {
        return Err(format!("{s:?} is out of range"));
    }
    Ok(Duration::from_nanos(nanos as u64))
}

#[derive(Debug, thiserror::Error)]
enum BotError {
    #[error(transparent)]
    Client(#[from] JigsawError),

    #[error(transparent)]
    Strategy(#[from] StrategyError),
}

#[tokio::main]
async fn main() -> Result<(), BotError> {
    let cli = Cli::parse();
    jigsaw::logging::init(cli.debug);

    let strategy = cli.strategy();
    let delay = cli.delay;
    let (outcome_tx, mut outcome_rx) = oneshot::channel();

    let session = Session::connect(cli.session_options())
        .await
        .map_err(JigsawError::from)?
        .on_joined(move |handle, state| async move {
            let outcome = run_strategy(&handle, &state, strategy, delay).await;
            tokio::time::sleep(SETTLE_DELAY).await;
            finish(&handle, outcome_tx, outcome);
        });

    session.run().await.map_err(JigsawError::from)?;
    strategy_outcome(&mut outcome_rx)
}

type Outcome = Result<(), StrategyError>;

/// Reports the strategy outcome, then ends the session.
///
/// The outcome must be in place before `exit`, since `run` may return as
/// soon as the session is cancelled.
fn finish(handle: &SessionHandle, outcome_tx: oneshot::Sender<Outcome>, outcome: Outcome) {
    let _ = outcome_tx.send(outcome);
    handle.exit();
}

/// The strategy's result once the session has ended. A session that ended
/// before joining has no outcome.
fn strategy_outcome(outcome_rx: &mut oneshot::Receiver<Outcome>) -> Result<(), BotError> {
    match outcome_rx.try_recv() {
        Ok(outcome) => outcome.map_err(BotError::from),
        Err(_) => Ok(()),
    }
}

async fn run_strategy(
    handle: &SessionHandle,
    state: &Arc<SessionState>,
    strategy: Strategy,
    delay: Duration,
) -> Outcome {
    let room = state.room.as_ref().ok_or(StrategyError::NoRoom)?;
    let plan = strategy.plan(room).inspect_err(|e| {
        tracing::error!(strategy = strategy.name(), error = %e, "strategy failed");
    })?;

    tracing::info!(
        strategy = strategy.name(),
        room = %room.name,
        combines = plan.len(),
        "assembling"
    );
    match strategy::execute(handle, &plan, delay).await {
        Ok(()) => tracing::info!(strategy = strategy.name(), "done"),
        Err(e) => tracing::warn!(error = %e, "session ended while assembling"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;
    use crate::strategy::tests::Recorder;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("jigsaw-bot").chain(args.iter().copied()))
    }

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = parse(&["--room", "abcd", "--edges"]).unwrap();
        assert_eq!(cli.name, "Puzzle Bot");
        assert_eq!(cli.color, "#00ff00");
        assert_eq!(cli.delay, Duration::from_micros(500));
        assert_eq!(cli.strategy(), Strategy::Edges);

        let options = cli.session_options();
        assert_eq!(options.room, "abcd");
        assert_eq!(options.secret, None);
        assert!(!options.override_version);
    }

    #[test]
    fn test_exactly_one_strategy_is_required() {
        assert!(parse(&["--room", "abcd"]).is_err());
        assert!(parse(&["--room", "abcd", "--edges", "--complete"]).is_err());
        assert!(parse(&["--edges"]).is_err());
    }

    #[test]
    fn test_region_strategy() {
        let cli = parse(&["--room", "r", "--region", "(0,0):(2,3)", "--force", "--top-left"])
            .unwrap();
        assert_eq!(
            cli.strategy(),
            Strategy::Region {
                region: "(0,0):(2,3)".parse().unwrap(),
                placement: Placement::TopLeft,
                force: true,
            }
        );
        assert!(parse(&["--room", "r", "--region", "nonsense"]).is_err());
        assert!(parse(&["--room", "r", "--edges", "--force"]).is_err());
    }

    #[test]
    fn test_session_options_from_flags() {
        let cli = parse(&[
            "--room", "r", "--complete", "--secret", "s3", "--name", "Ann",
            "--override-version", "--debug",
        ])
        .unwrap();
        let options = cli.session_options();
        assert_eq!(options.secret.as_deref(), Some("s3"));
        assert_eq!(options.user_name, "Ann");
        assert!(options.override_version);
        assert!(options.debug);
        assert_eq!(cli.strategy(), Strategy::Complete);
    }

    #[test]
    fn test_strategy_failure_is_reported_once_session_exits() {
        let session = Session::new(Recorder::default(), SessionOptions::new("r"));
        let handle = session.handle();
        let (outcome_tx, mut outcome_rx) = oneshot::channel();

        finish(&handle, outcome_tx, Err(StrategyError::RootLocked(1)));

        assert!(handle.is_closed());
        assert!(matches!(
            strategy_outcome(&mut outcome_rx),
            Err(BotError::Strategy(StrategyError::RootLocked(1)))
        ));
    }

    #[test]
    fn test_session_without_outcome_is_ok() {
        let (outcome_tx, mut outcome_rx) = oneshot::channel::<Outcome>();
        drop(outcome_tx);
        assert!(strategy_outcome(&mut outcome_rx).is_ok());
    }

    #[test]
    fn test_parse_delay() {
        assert_eq!(parse_delay("500us").unwrap(), Duration::from_micros(500));
        assert_eq!(parse_delay("500µs").unwrap(), Duration::from_micros(500));
        assert_eq!(parse_delay("2ms").unwrap(), Duration::from_millis(2));
        assert_eq!(parse_delay("1.5s").unwrap(), Duration::from_millis(1500));
        assert_eq!(parse_delay("0s").unwrap(), Duration::ZERO);
        assert!(parse_delay("10").is_err());
        assert!(parse_delay("ms").is_err());
        assert!(parse_delay("5h").is_err());
    }
}
