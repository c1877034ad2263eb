use std::io::{self, BufReader};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use orthospell_core::Dictionary;
use orthospell_std::{
    default_dictionary_name, find_dictionary, list_dictionaries, search_dirs, OutputMode,
    SpellSession,
};

/// Spell checker for Hunspell-format dictionaries.
#[derive(Parser)]
#[command(name = "orthospell", version, about)]
struct Cli {
    /// Dictionary name to search for, or a path to the .aff file
    #[arg(short = 'd', value_name = "NAME")]
    dictionary: Option<String>,

    /// List the dictionaries found in the search paths and exit
    #[arg(short = 'D', long = "list-dictionaries")]
    list: bool,

    /// Encoding of both input and output text
    #[arg(long, value_name = "ENC")]
    encoding: Option<String>,

    /// Encoding of the checked input text
    #[arg(long, value_name = "ENC")]
    input_encoding: Option<String>,

    /// Encoding of the written results
    #[arg(long, value_name = "ENC")]
    output_encoding: Option<String>,

    /// Ispell-pipe style output with suggestions
    #[arg(short = 'a')]
    pipe: bool,

    /// Print one line per misspelled word (the default)
    #[arg(short = 'l')]
    list_misspelled: bool,

    /// Files to check; standard input when none are given
    files: Vec<PathBuf>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("orthospell: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let dirs = search_dirs();
    if cli.list {
        for (name, path) in list_dictionaries(&dirs) {
            println!("{name}\t{}", path.display());
        }
        return Ok(());
    }

    let name = match cli.dictionary {
        Some(name) => name,
        None => default_dictionary_name(&dirs)
            .context("no dictionary given with -d and none found in the search paths")?,
    };
    let aff_path = find_dictionary(&name, &dirs)
        .with_context(|| format!("dictionary {name:?} not found"))?;
    tracing::info!(path = %aff_path.display(), "loading dictionary");
    let dict = Dictionary::load_path(&aff_path)
        .with_context(|| format!("loading {}", aff_path.display()))?;

    let mode = if cli.pipe {
        OutputMode::Pipe
    } else {
        OutputMode::List
    };
    let mut session = SpellSession::new(dict, mode);
    if let Some(enc) = cli.input_encoding.as_deref().or(cli.encoding.as_deref()) {
        session.set_input_encoding(enc)?;
    }
    if let Some(enc) = cli.output_encoding.as_deref().or(cli.encoding.as_deref()) {
        session.set_output_encoding(enc)?;
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if cli.files.is_empty() {
        let stdin = io::stdin();
        session.check_stream(&mut stdin.lock(), &mut out)?;
    } else {
        for path in &cli.files {
            let file = std::fs::File::open(path)
                .with_context(|| format!("opening {}", path.display()))?;
            session
                .check_stream(&mut BufReader::new(file), &mut out)
                .with_context(|| format!("checking {}", path.display()))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::Cli;
    use clap::Parser;

    #[test]
    fn argument_surface_parses() {
        let cli = Cli::parse_from([
            "orthospell",
            "-d",
            "en_US",
            "-a",
            "--input-encoding",
            "ISO8859-1",
            "file.txt",
        ]);
        assert_eq!(cli.dictionary.as_deref(), Some("en_US"));
        assert!(cli.pipe);
        assert_eq!(cli.input_encoding.as_deref(), Some("ISO8859-1"));
        assert_eq!(cli.files.len(), 1);
    }
}
