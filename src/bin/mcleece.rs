//! CLI front-end: three subcommands over the `mcleece` library. Argument
//! parsing, exit-code mapping, and filesystem path handling live here; all
//! cryptographic behavior is delegated to [`mcleece::actions`].

use std::io;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use mcleece::codec::MAX_CHUNK;
use mcleece::{actions, Error, Profile};

const PASSWORD_ENV_VAR: &str = "MCLEECE_PASSWORD";

#[derive(Parser)]
#[command(name = "mcleece", about = "Hybrid post-quantum file and stream encryption")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Operational profile. CBOX is planned but not yet bit-defined.
    #[arg(long = "mode", value_enum, default_value_t = Mode::Simple, global = true)]
    mode: Mode,
}

#[derive(Clone, Copy, ValueEnum)]
enum Mode {
    Simple,
    Cbox,
}

impl From<Mode> for Profile {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Simple => Profile::Simple,
            Mode::Cbox => Profile::Cbox,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Generate a keypair, writing `<path_prefix>.pk` and `<path_prefix>.sk`.
    Keypair {
        path_prefix: String,
    },
    /// Read plaintext from stdin, write ciphertext to stdout.
    Encrypt {
        path_prefix: String,
    },
    /// Read ciphertext from stdin, write plaintext to stdout.
    Decrypt {
        path_prefix: String,
    },
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();
    let profile = Profile::from(cli.mode);

    let result = match cli.command {
        Command::Keypair { path_prefix } => run_keypair(&path_prefix, profile),
        Command::Encrypt { path_prefix } => run_encrypt(&path_prefix, profile),
        Command::Decrypt { path_prefix } => run_decrypt(&path_prefix, profile),
    };

    match result {
        Ok(()) => ExitCode::from(0),
        Err(CliError::Usage(msg)) => {
            eprintln!("usage error: {msg}");
            ExitCode::from(64)
        }
        Err(CliError::Crate(e)) => {
            eprintln!("error: {e}");
            ExitCode::from(e.exit_code() as u8)
        }
    }
}

enum CliError {
    Usage(String),
    Crate(Error),
}

impl From<Error> for CliError {
    fn from(e: Error) -> Self {
        CliError::Crate(e)
    }
}

fn run_keypair(path_prefix: &str, profile: Profile) -> Result<(), CliError> {
    let password = read_password()?;
    log::debug!("generating {profile:?}-profile keypair at {path_prefix}");
    actions::keypair_to_file(path_prefix, password, profile)?;
    Ok(())
}

fn run_encrypt(path_prefix: &str, profile: Profile) -> Result<(), CliError> {
    log::debug!("encrypting stdin under {profile:?} profile key {path_prefix}");
    let stdin = io::stdin();
    let stdout = io::stdout();
    actions::encrypt(path_prefix, stdin.lock(), stdout.lock(), profile, MAX_CHUNK)?;
    Ok(())
}

fn run_decrypt(path_prefix: &str, profile: Profile) -> Result<(), CliError> {
    let password = read_password()?;
    log::debug!("decrypting stdin under {profile:?} profile key {path_prefix}");
    let stdin = io::stdin();
    let stdout = io::stdout();
    actions::decrypt(path_prefix, password, stdin.lock(), stdout.lock(), profile, MAX_CHUNK)?;
    Ok(())
}

fn read_password() -> Result<String, CliError> {
    std::env::var(PASSWORD_ENV_VAR).map_err(|_| {
        CliError::Usage(format!("{PASSWORD_ENV_VAR} must be set"))
    })
}
