//! Lockbox CLI - Password-based file encryption
//!
//! Command-line interface for locking and unlocking files using
//! AES-128-CBC with scrypt key derivation.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process;

use lockbox::file_ops;
use lockbox::password::{PasswordReader, ReaderPasswordReader, TerminalPasswordReader};

/// Extension appended to locked files when no output path is given
const LOCKED_EXT: &str = "encr";

#[derive(Parser)]
#[command(name = "lockbox")]
#[command(version)]
#[command(about = "Password-based file encryption.", long_about = None)]
struct Cli {
    /// Read password from stdin instead of from terminal
    #[arg(long, global = true)]
    password_stdin: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encrypt a file
    #[command(alias = "l")]
    Lock {
        /// Path to the file whose contents is to be encrypted
        #[arg(value_name = "FILE")]
        path: PathBuf,

        /// Path to write the encrypted container to (default: FILE.encr)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Decrypt a file
    #[command(alias = "u")]
    Unlock {
        /// Path to the encrypted container
        #[arg(value_name = "FILE")]
        path: PathBuf,

        /// Path to write the decrypted contents to (default: FILE without .encr)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Lock { path, output } => {
            let output = output.unwrap_or_else(|| default_locked_path(&path));
            let mut reader = get_password_reader(cli.password_stdin);
            file_ops::lock_file(&path, &output, &mut *reader)
        }
        Commands::Unlock { path, output } => {
            let output = match output.map(Ok).unwrap_or_else(|| default_unlocked_path(&path)) {
                Ok(output) => output,
                Err(msg) => {
                    eprintln!("Error: {}", msg);
                    process::exit(1);
                }
            };
            let mut reader = get_password_reader(cli.password_stdin);
            file_ops::unlock_file(&path, &output, &mut *reader)
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        let mut source: Option<&dyn std::error::Error> =
            e.source_error().map(|s| s as &dyn std::error::Error);
        while let Some(cause) = source {
            eprintln!("  caused by: {}", cause);
            source = cause.source();
        }
        process::exit(1);
    }
}

fn default_locked_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".");
    name.push(LOCKED_EXT);
    PathBuf::from(name)
}

fn default_unlocked_path(path: &Path) -> Result<PathBuf, String> {
    if path.extension().is_some_and(|ext| ext == LOCKED_EXT) {
        Ok(path.with_extension(""))
    } else {
        Err(format!(
            "{} does not end in .{}; use --output to name the decrypted file",
            path.display(),
            LOCKED_EXT
        ))
    }
}

fn get_password_reader(use_stdin: bool) -> Box<dyn PasswordReader> {
    if use_stdin {
        Box::new(ReaderPasswordReader::new(Box::new(std::io::stdin())))
    } else {
        Box::new(TerminalPasswordReader)
    }
}
