// src/cli.rs

use clap::Parser;

/// Download one file faster by fetching byte ranges in parallel.
#[derive(Parser, Debug)]
#[command(name = "pget")]
#[command(author, version, about)]
pub struct Args {
    /// URL of the file to download
    pub url: String,

    /// Number of parallel range requests (defaults to the CPU count)
    #[arg(short = 'p', long, value_parser = clap::value_parser!(u16).range(1..))]
    pub procs: Option<u16>,

    /// Output file or directory (`dir/name`, `~/dir/name`, `name`)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Connect timeout in seconds
    #[arg(short, long, default_value_t = 30)]
    pub timeout: u64,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress bars and non-error output
    #[arg(short, long)]
    pub quiet: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_is_required() {
        let err = Args::try_parse_from(["pget"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn defaults() {
        let args = Args::try_parse_from(["pget", "https://example.com/f.iso"]).unwrap();
        assert_eq!(args.url, "https://example.com/f.iso");
        assert_eq!(args.procs, None);
        assert_eq!(args.output, None);
        assert_eq!(args.timeout, 30);
        assert_eq!(args.verbose, 0);
        assert!(!args.quiet);
    }

    #[test]
    fn procs_and_output() {
        let args =
            Args::try_parse_from(["pget", "-p", "8", "-o", "~/iso/", "https://example.com/f.iso"])
                .unwrap();
        assert_eq!(args.procs, Some(8));
        assert_eq!(args.output.as_deref(), Some("~/iso/"));
    }

    #[test]
    fn zero_procs_rejected() {
        let err = Args::try_parse_from(["pget", "-p", "0", "https://example.com/f.iso"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn verbose_counts() {
        let args = Args::try_parse_from(["pget", "-vv", "https://example.com/f.iso"]).unwrap();
        assert_eq!(args.verbose, 2);
    }
}
