use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "agrolens")]
#[command(version)]
#[command(about = "Crop photo diagnosis with a content-addressed result cache")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a default config file to the data directory
    Init,

    /// Make an image the current upload (does not analyze it)
    Upload {
        /// Path to the photo
        path: PathBuf,
    },

    /// Analyze the current upload
    Analyze {
        /// Model selector sent to the service
        #[arg(short, long)]
        model: Option<String>,

        /// Allow the service to keep the image for training
        #[arg(long)]
        train: bool,

        /// Request debug output from the service
        #[arg(long)]
        debug: bool,
    },

    /// Re-issue an analysis interrupted by a previous run
    Resume,

    /// Show the current upload and in-flight state
    Status,

    /// Print the most recent diagnosis summary
    Latest,

    /// Clear the current upload (cached results are kept)
    Clear,

    /// View analysis history
    History {
        /// Show statistics summary
        #[arg(long)]
        stats: bool,

        /// Only analyses of this content key
        #[arg(long)]
        key: Option<String>,

        /// Only analyses from the last N hours
        #[arg(long)]
        hours: Option<u64>,

        /// Number of entries to show
        #[arg(short = 'n', long, default_value_t = 20)]
        limit: usize,
    },

    /// Print version information
    Version,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_version() {
        let cli = Cli::try_parse_from(["agrolens", "version"]);
        assert!(cli.is_ok());
        assert!(matches!(cli.unwrap().command, Commands::Version));
    }

    #[test]
    fn test_cli_parse_upload() {
        let cli = Cli::try_parse_from(["agrolens", "upload", "leaf.jpg"]).unwrap();
        if let Commands::Upload { path } = cli.command {
            assert_eq!(path, PathBuf::from("leaf.jpg"));
        } else {
            panic!("Expected Upload command");
        }
    }

    #[test]
    fn test_cli_parse_analyze_flags() {
        let cli =
            Cli::try_parse_from(["agrolens", "analyze", "--model", "maize-v3", "--train"]).unwrap();
        if let Commands::Analyze {
            model,
            train,
            debug,
        } = cli.command
        {
            assert_eq!(model, Some("maize-v3".to_string()));
            assert!(train);
            assert!(!debug);
        } else {
            panic!("Expected Analyze command");
        }
    }

    #[test]
    fn test_cli_upload_requires_path() {
        assert!(Cli::try_parse_from(["agrolens", "upload"]).is_err());
    }

    #[test]
    fn test_cli_parse_history_filters() {
        let cli = Cli::try_parse_from([
            "agrolens",
            "history",
            "--key",
            "ba7816bf8f01cfea",
            "--hours",
            "24",
        ])
        .unwrap();
        if let Commands::History {
            stats,
            key,
            hours,
            limit,
        } = cli.command
        {
            assert!(!stats);
            assert_eq!(key.as_deref(), Some("ba7816bf8f01cfea"));
            assert_eq!(hours, Some(24));
            assert_eq!(limit, 20);
        } else {
            panic!("Expected History command");
        }
    }

    #[test]
    fn test_cli_parse_simple_commands() {
        for cmd in ["init", "resume", "status", "latest", "clear", "history"] {
            let cli = Cli::try_parse_from(["agrolens", cmd]);
            assert!(cli.is_ok(), "Failed to parse {}", cmd);
        }
    }
}
