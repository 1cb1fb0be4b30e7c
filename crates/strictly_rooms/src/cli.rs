//! Command-line interface for strictly_rooms.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Strictly Rooms - ultimate tic-tac-toe, alone, against the computer, or online
#[derive(Parser, Debug)]
#[command(name = "strictly_rooms")]
#[command(about = "Ultimate tic-tac-toe with shared online rooms", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the document store server that online rooms live in
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },

    /// Play in the terminal
    Play {
        /// How the two sides are played
        #[arg(short, long, value_enum, default_value = "local")]
        mode: PlayMode,

        /// Room key (online mode)
        #[arg(long)]
        room: Option<String>,

        /// Your display name (online mode)
        #[arg(long)]
        name: Option<String>,

        /// Path to the config file
        #[arg(short, long, default_value = "strictly_rooms.toml")]
        config: PathBuf,
    },
}

/// Play mode chosen on the command line.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayMode {
    /// Two players at one keyboard
    Local,
    /// Against the computer
    Ai,
    /// In a shared room on the store server
    Online,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_play_defaults() {
        let cli = Cli::parse_from(["strictly_rooms", "play"]);
        match cli.command {
            Command::Play { mode, room, config, .. } => {
                assert_eq!(mode, PlayMode::Local);
                assert_eq!(room, None);
                assert_eq!(config, PathBuf::from("strictly_rooms.toml"));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_online_with_room() {
        let cli = Cli::parse_from([
            "strictly_rooms", "play", "--mode", "online", "--room", "abc", "--name", "Ann",
        ]);
        assert!(matches!(
            cli.command,
            Command::Play { mode: PlayMode::Online, room: Some(ref r), name: Some(ref n), .. }
                if r == "abc" && n == "Ann"
        ));
    }

    #[test]
    fn test_serve_port() {
        let cli = Cli::parse_from(["strictly_rooms", "serve", "-p", "4000"]);
        assert!(matches!(cli.command, Command::Serve { port: 4000, ref host } if host == "127.0.0.1"));
    }
}
