//! Subcommands.

use std::net::SocketAddr;
use std::path::PathBuf;

use anirent_core::Resolution;
use clap::Subcommand;

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP/SSE server until Ctrl-C
    Serve {
        /// Address to listen on
        #[arg(long, env = "ANIRENT_ADDR", default_value = "0.0.0.0:8080")]
        addr: SocketAddr,
        /// Allowed CORS origin (repeatable); all origins when omitted
        #[arg(long = "cors-origin")]
        cors_origins: Vec<String>,
    },

    /// Search for releases and print them as a JSON array
    #[command(alias = "subsplease")]
    Search {
        /// Title to search for
        name: String,
        /// Desired resolution (repeatable); defaults to 1080p
        #[arg(short = 'r', long = "resolution")]
        resolutions: Vec<Resolution>,
    },

    /// Download a search result and move it into place
    Download {
        /// One search result as JSON, or "-" to read it from stdin
        result: String,
        /// Directory to move the content to once downloaded
        #[arg(short = 'd', long, default_value = ".")]
        dir: PathBuf,
        /// Save content under a Plex friendly name
        #[arg(short = 'p', long, default_value_t = true, action = clap::ArgAction::Set)]
        plex: bool,
    },
}
