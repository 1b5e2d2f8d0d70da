#[derive(Debug, Clone, clap::Parser)]
pub struct Cfg {
    /// The priority queue implementation to test.
    pub implementation: Implementation,
    /// Number of producers that will push to and update items in the queue.
    #[arg(short, long)]
    pub producer_num: usize,
    /// Number of operations each producer will issue during the test.
    #[arg(short = 'o', long)]
    pub op_num: usize,
    /// Number of consumers that will drain items from the queue.
    #[arg(short, long, default_value_t = 1)]
    pub consumer_num: usize,
    /// Share of producer operations that update an earlier item instead of pushing, in [0, 1].
    #[arg(short, long, default_value_t = 0.2, value_parser = parse_ratio)]
    pub update_ratio: f64,
    /// Delay between the start of each drain interval, at least 1.
    #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u64).range(1..))]
    pub drain_interval_ms: u64,
    /// Number of items that will be drained per batch.
    #[arg(short = 'b', long, default_value_t = 100)]
    pub drain_batch_size: usize,
    /// Hard cap on the test's execution time
    #[arg(long, default_value_t = 10)]
    pub run_duration_seconds: u64,
}

#[derive(Debug, Clone, strum::EnumString, strum::Display, clap::ValueEnum)]
#[strum(serialize_all = "lowercase")]
pub enum Implementation {
    #[strum(ascii_case_insensitive)]
    Locked,
    #[strum(ascii_case_insensitive)]
    Channels,
    #[strum(ascii_case_insensitive)]
    Async,
}

fn parse_ratio(s: &str) -> Result<f64, String> {
    let ratio: f64 = s.parse().map_err(|e| format!("`{s}` is not a number: {e}"))?;
    if !(0.0..=1.0).contains(&ratio) {
        return Err(format!("{ratio} is not within [0, 1]"));
    }
    Ok(ratio)
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use clap::{Parser, error::ErrorKind};

    use super::{Cfg, Implementation, parse_ratio};

    #[test]
    fn parses_minimal_command_line() {
        let cfg = Cfg::try_parse_from(["stress_tester", "channels", "-p", "4", "-o", "1000"])
            .unwrap();

        assert!(matches!(cfg.implementation, Implementation::Channels));
        assert_eq!(cfg.producer_num, 4);
        assert_eq!(cfg.op_num, 1_000);
        assert_eq!(cfg.consumer_num, 1);
        assert_eq!(cfg.update_ratio, 0.2);
    }

    #[test]
    fn rejects_ratio_outside_unit_interval() {
        assert!(parse_ratio("0.5").is_ok());
        assert!(parse_ratio("1.5").is_err());
        assert!(parse_ratio("often").is_err());
        let err = Cfg::try_parse_from(["stress_tester", "locked", "-p", "1", "-o", "1", "-u", "2"])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
        assert!(err.to_string().contains("not within [0, 1]"));
    }

    #[test]
    fn rejects_zero_drain_interval() {
        let args = ["stress_tester", "async", "-p", "1", "-o", "1", "--drain-interval-ms"];

        let err = Cfg::try_parse_from(args.iter().copied().chain(["0"])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);

        let cfg = Cfg::try_parse_from(args.iter().copied().chain(["1"])).unwrap();
        assert_eq!(cfg.drain_interval_ms, 1);
    }

    #[test]
    fn implementation_names_are_case_insensitive() {
        assert!(matches!(
            Implementation::from_str("ASYNC"),
            Ok(Implementation::Async)
        ));
        assert_eq!(Implementation::Locked.to_string(), "locked");
    }
}
