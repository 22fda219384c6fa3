//! Command-line surface for the `topic2csv` binary.

use std::path::PathBuf;

use clap::Parser;

use crate::source::{QosProfile, Reliability};

/// Subscribe to a typed message stream and save each message as one CSV row.
///
/// Messages are read as JSON objects, one per line, from standard input.
#[derive(Parser, Debug)]
#[command(name = "topic2csv", version)]
pub struct Cli {
    /// Topic name, e.g. /joint_states
    #[arg(long)]
    pub topic: String,

    /// Topic type, e.g. sensor_msgs/msg/JointState or sensor_msgs/JointState
    #[arg(long = "type", value_name = "TYPE")]
    pub topic_type: String,

    /// Output CSV path
    #[arg(long)]
    pub output: PathBuf,

    /// Subscription queue depth
    #[arg(long, default_value_t = 100)]
    pub queue_size: usize,

    /// Drop messages under load instead of blocking (default is reliable)
    #[arg(long)]
    pub best_effort: bool,
}

impl Cli {
    /// Queueing policy derived from the flags.
    pub fn qos(&self) -> QosProfile {
        let reliability = if self.best_effort {
            Reliability::BestEffort
        } else {
            Reliability::Reliable
        };
        QosProfile::new(self.queue_size, reliability)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("topic2csv").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults() {
        let cli = parse(&["--topic", "/t", "--type", "std_msgs/String", "--output", "o.csv"]);
        assert_eq!(cli.queue_size, 100);
        assert!(!cli.best_effort);
        assert_eq!(cli.qos().reliability, Reliability::Reliable);
    }

    #[test]
    fn test_best_effort_flag() {
        let cli = parse(&[
            "--topic", "/t",
            "--type", "std_msgs/String",
            "--output", "o.csv",
            "--queue-size", "0",
            "--best-effort",
        ]);
        let qos = cli.qos();
        assert_eq!(qos.reliability, Reliability::BestEffort);
        // Depth is clamped to at least one in-flight message.
        assert_eq!(qos.depth, 1);
    }

    #[test]
    fn test_required_flags() {
        let result = Cli::try_parse_from(["topic2csv", "--topic", "/t"]);
        assert!(result.is_err());
    }
}
