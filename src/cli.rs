use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "partnerbot")]
#[command(author, version, about = "Telegram referral bot for partner registration and balances", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Run the bot (long polling)
    Run,

    /// Check database, spreadsheet and QR assets, then exit
    Check,

    /// Render the referral QR code for a partner code into a PNG file
    RenderQr {
        /// Partner code (the partner's Telegram ID)
        #[arg(short, long)]
        code: String,

        /// Output file
        #[arg(short, long, default_value = "qr.png")]
        out: PathBuf,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
