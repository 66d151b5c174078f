use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use netschool_cli::Color;

use crate::{auth::LoginArgs, portal::MailCommands, render::Output};

pub const SESSION_FILE_ENV: &str = "NS_SESSION_FILE";
pub const URL_ENV: &str = "NS_URL";

#[derive(Parser, Clone)]
#[command(name = "nsg", version, about = "NetSchool portal command line client", long_about = None)]
pub struct Cli {
    // Optional as a workaround for https://github.com/clap-rs/clap/issues/3572
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[arg(short = 'o', long, global = true, value_enum, default_value_t = Output::JSON)]
    pub output: Output,

    #[arg(short = 'c', long, global = true, value_enum, default_value_t = Color::Auto)]
    pub color: Color,

    #[arg(
        long,
        global = true,
        env = SESSION_FILE_ENV,
        default_value = "nsg-session.json",
        help = "File the session is saved to by `nsg login` and read from by the other commands."
    )]
    pub session_file: PathBuf,

    #[arg(
        long,
        global = true,
        help = "Exit with a success exit code (0) unless an error is thrown."
    )]
    pub cleanexit: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        help = "Don't return anything to stdout."
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Clone)]
pub enum Commands {
    // Auth commands
    #[command(long_about = "Log into the portal and save the session.")]
    Login(LoginArgs),

    #[command(long_about = "End the saved session and delete the session file.")]
    Logout,

    // Portal commands
    #[command(long_about = "Lessons and assignments, by default of the current week.")]
    Diary {
        #[arg(long, help = "First day, YYYY-MM-DD")]
        start: Option<NaiveDate>,
        #[arg(long, help = "Last day, YYYY-MM-DD")]
        end: Option<NaiveDate>,
    },

    #[command(long_about = "Overdue assignments, by default of the current week.")]
    Overdue {
        #[arg(long, help = "First day, YYYY-MM-DD")]
        start: Option<NaiveDate>,
        #[arg(long, help = "Last day, YYYY-MM-DD")]
        end: Option<NaiveDate>,
    },

    #[command(long_about = "School announcements.")]
    Announcements {
        #[arg(long, default_value_t = -1, help = "How many, -1 for all")]
        take: i64,
    },

    #[command(long_about = "Internal mail.")]
    Mail {
        #[command(subcommand)]
        command: MailCommands,
    },

    #[command(long_about = "Card of the school of the saved session.")]
    School,

    // Discovery commands
    #[command(long_about = "Search the schools of a portal.")]
    Schools {
        #[arg(short = 'u', long, env = URL_ENV, help = "Portal URL or region name")]
        url: String,
        query: Option<String>,
    },

    #[command(long_about = "Login methods offered by a portal.")]
    Methods {
        #[arg(short = 'u', long, env = URL_ENV, help = "Portal URL or region name")]
        url: String,
    },

    #[command(long_about = "Known regions and their portals.")]
    Regions,
}
