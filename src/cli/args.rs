//! CLI argument definitions using clap.
//!
//! The surface deliberately mirrors the classic extraction tool options:
//! `-k`/`--keyword`, `--flag`, `--from-code`, `--add-comments` and friends,
//! so existing build-system invocations translate directly.

use std::path::PathBuf;

use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Arguments {
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Arguments {
    /// Check if a command was provided, otherwise print help and return None.
    pub fn with_command_or_help(self) -> Option<Self> {
        if self.command.is_none() {
            Self::command().print_help().ok();
            None
        } else {
            Some(self)
        }
    }

    pub fn verbose(&self) -> bool {
        match &self.command {
            Some(Command::Extract(cmd)) => cmd.verbose,
            Some(Command::Languages) | None => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// PO template (the default)
    Po,
    /// Structured JSON, one record per message
    Json,
}

#[derive(Debug, Args)]
pub struct ExtractCommand {
    /// Input source files
    pub files: Vec<PathBuf>,

    /// Directories searched recursively for source files
    #[arg(short = 'D', long = "directory", value_name = "DIR")]
    pub directories: Vec<PathBuf>,

    /// Force the source language instead of guessing from the extension
    #[arg(short = 'L', long = "language", value_name = "NAME")]
    pub language: Option<String>,

    /// Write output to this file instead of standard output
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output serialization
    #[arg(long = "output-format", value_enum, default_value_t = OutputFormat::Po)]
    pub output_format: OutputFormat,

    /// Extract all strings, not just keyword call arguments
    #[arg(short = 'a', long = "extract-all")]
    pub extract_all: bool,

    /// Additional keyword to look for; an empty KEYWORDSPEC disables the
    /// built-in defaults
    #[arg(short = 'k', long = "keyword", value_name = "KEYWORDSPEC")]
    pub keywords: Vec<String>,

    /// Additional format-flag declaration, KEYWORD:ARGNUM:[pass-]FLAG
    #[arg(long = "flag", value_name = "FLAGSPEC")]
    pub flags: Vec<String>,

    /// Encoding of the input files
    #[arg(long = "from-code", value_name = "NAME", default_value = "UTF-8")]
    pub from_code: String,

    /// Copy comment blocks starting with TAG (all blocks without a TAG)
    /// into the output
    #[arg(
        long = "add-comments",
        value_name = "TAG",
        num_args = 0..=1,
        default_missing_value = ""
    )]
    pub add_comments: Option<String>,

    /// Understand ANSI C trigraphs in C family input
    #[arg(long)]
    pub trigraphs: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Extract translatable strings from source files
    Extract(ExtractCommand),
    /// List supported source languages and their file extensions
    Languages,
}
