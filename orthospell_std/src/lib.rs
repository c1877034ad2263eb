//! Filesystem and terminal glue around the core library: dictionary
//! discovery through `DICPATH`/`DICTIONARY`, text tokenization and the
//! check loop with its output modes.

use std::env;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use orthospell_core::encoding::{Encoding, EncodingConverter};
use orthospell_core::Dictionary;

/// Environment variable naming the default dictionary.
pub const ENV_DICTIONARY: &str = "DICTIONARY";
/// Environment variable with extra search paths, `:`/`;` separated.
pub const ENV_DICPATH: &str = "DICPATH";

const SYSTEM_DICT_DIRS: [&str; 3] = [
    "/usr/share/hunspell",
    "/usr/share/myspell",
    "/usr/local/share/hunspell",
];

/// Directories searched for dictionaries: the working directory, `DICPATH`
/// entries, then the system locations.
pub fn search_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![PathBuf::from(".")];
    if let Some(paths) = env::var_os(ENV_DICPATH) {
        dirs.extend(env::split_paths(&paths));
    }
    dirs.extend(SYSTEM_DICT_DIRS.iter().map(PathBuf::from));
    dirs
}

/// All `.aff` files in the search directories, as (name, path) pairs. The
/// first hit wins for duplicated names.
pub fn list_dictionaries(dirs: &[PathBuf]) -> Vec<(String, PathBuf)> {
    let mut found: Vec<(String, PathBuf)> = Vec::new();
    for dir in dirs {
        let Ok(entries) = fs::read_dir(dir) else {
            continue;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().is_some_and(|e| e == "aff") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    if !found.iter().any(|(name, _)| name == stem) {
                        found.push((stem.to_string(), path));
                    }
                }
            }
        }
    }
    found.sort();
    found
}

/// Resolves a `-d` argument: a name with a path separator loads directly,
/// a bare name is looked up in the search directories.
pub fn find_dictionary(name: &str, dirs: &[PathBuf]) -> Option<PathBuf> {
    if name.contains(std::path::MAIN_SEPARATOR) || name.contains('/') {
        let mut path = PathBuf::from(name);
        if path.extension().is_none() {
            path.set_extension("aff");
        }
        return path.exists().then_some(path);
    }
    let file = format!("{name}.aff");
    dirs.iter()
        .map(|dir| dir.join(&file))
        .find(|p| p.exists())
}

/// The dictionary name to use when `-d` is absent: `DICTIONARY`, falling
/// back to the first dictionary found.
pub fn default_dictionary_name(dirs: &[PathBuf]) -> Option<String> {
    if let Ok(name) = env::var(ENV_DICTIONARY) {
        if !name.is_empty() {
            return Some(name);
        }
    }
    list_dictionaries(dirs).into_iter().next().map(|(n, _)| n)
}

/// How check results are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// One line per misspelled word.
    List,
    /// Ispell-pipe style: `*` for good words, `&`/`#` lines with
    /// suggestions for bad ones.
    Pipe,
}

/// A loaded dictionary plus the I/O configuration of one run.
pub struct SpellSession {
    dict: Dictionary,
    mode: OutputMode,
    input_converter: Option<EncodingConverter>,
    output_encoding: Option<&'static encoding_rs::Encoding>,
}

impl SpellSession {
    pub fn new(dict: Dictionary, mode: OutputMode) -> Self {
        SpellSession {
            dict,
            mode,
            input_converter: None,
            output_encoding: None,
        }
    }

    pub fn dictionary(&self) -> &Dictionary {
        &self.dict
    }

    /// Overrides the encoding used to read checked text (not the
    /// dictionary files, which carry their own `SET`).
    pub fn set_input_encoding(&mut self, name: &str) -> anyhow::Result<()> {
        let enc = Encoding::new(name)
            .map_err(|e| anyhow::anyhow!("input encoding {name:?}: {e}"))?;
        self.input_converter = Some(EncodingConverter::new(&enc));
        Ok(())
    }

    /// Overrides the encoding used to write results.
    pub fn set_output_encoding(&mut self, name: &str) -> anyhow::Result<()> {
        let enc = encoding_rs::Encoding::for_label(name.as_bytes())
            .ok_or_else(|| anyhow::anyhow!("unknown output encoding {name:?}"))?;
        self.output_encoding = Some(enc);
        Ok(())
    }

    fn decode_line(&self, raw: &[u8]) -> String {
        match &self.input_converter {
            Some(conv) => conv
                .to_utf8(raw)
                .unwrap_or_else(|| String::from_utf8_lossy(raw).into_owned()),
            None => String::from_utf8_lossy(raw).into_owned(),
        }
    }

    fn write_line(&self, out: &mut impl Write, line: &str) -> io::Result<()> {
        match self.output_encoding {
            Some(enc) => {
                let (encoded, _, _) = enc.encode(line);
                out.write_all(&encoded)?;
                out.write_all(b"\n")
            }
            None => writeln!(out, "{line}"),
        }
    }

    /// Checks everything readable from `input`, writing results to `out`.
    /// Returns true when no misspelling was seen.
    pub fn check_stream(
        &self,
        input: &mut impl BufRead,
        out: &mut impl Write,
    ) -> io::Result<bool> {
        if self.mode == OutputMode::Pipe {
            self.write_line(out, concat!("@(#) Orthospell ", env!("CARGO_PKG_VERSION")))?;
        }
        let mut all_good = true;
        let mut raw = Vec::new();
        loop {
            raw.clear();
            if input.read_until(b'\n', &mut raw)? == 0 {
                break;
            }
            while matches!(raw.last(), Some(b'\n') | Some(b'\r')) {
                raw.pop();
            }
            let line = self.decode_line(&raw);
            if !self.check_line(&line, out)? {
                all_good = false;
            }
        }
        Ok(all_good)
    }

    pub fn check_path(&self, path: &Path, out: &mut impl Write) -> io::Result<bool> {
        let file = fs::File::open(path)?;
        self.check_stream(&mut io::BufReader::new(file), out)
    }

    fn check_line(&self, line: &str, out: &mut impl Write) -> io::Result<bool> {
        let mut all_good = true;
        let mut suggestions = Vec::new();
        for token in tokenize(line, &self.dict.aff_data().wordchars) {
            let ok = self.check_token(token.text);
            if ok {
                if self.mode == OutputMode::Pipe {
                    self.write_line(out, "*")?;
                }
                continue;
            }
            all_good = false;
            match self.mode {
                OutputMode::List => self.write_line(out, token.text)?,
                OutputMode::Pipe => {
                    self.dict.suggest(token.text, &mut suggestions);
                    if suggestions.is_empty() {
                        self.write_line(out, &format!("# {} {}", token.text, token.offset))?;
                    } else {
                        let joined = suggestions.join(", ");
                        self.write_line(
                            out,
                            &format!(
                                "& {} {} {}: {joined}",
                                token.text,
                                suggestions.len(),
                                token.offset
                            ),
                        )?;
                    }
                }
            }
        }
        Ok(all_good)
    }

    /// A token is accepted as-is or with its optional edge characters
    /// (apostrophes, hyphens and other `WORDCHARS`) trimmed off.
    fn check_token(&self, token: &str) -> bool {
        if self.dict.spell(token) {
            return true;
        }
        let trimmed = token.trim_matches(|c: char| !c.is_alphabetic());
        if trimmed.len() != token.len() && !trimmed.is_empty() {
            return self.dict.spell(trimmed);
        }
        false
    }
}

/// One word-like token of an input line.
pub struct Token<'a> {
    pub text: &'a str,
    /// Byte offset of the token within its line.
    pub offset: usize,
}

/// Splits a line into word tokens. A character belongs to a word when it is
/// alphabetic or listed in `WORDCHARS`.
pub fn tokenize<'a>(line: &'a str, wordchars: &str) -> Vec<Token<'a>> {
    let in_word = |c: char| c.is_alphabetic() || wordchars.contains(c);
    let mut tokens = Vec::new();
    let mut start: Option<usize> = None;
    for (i, c) in line.char_indices() {
        if in_word(c) {
            start.get_or_insert(i);
        } else if let Some(s) = start.take() {
            tokens.push(Token {
                text: &line[s..i],
                offset: s,
            });
        }
    }
    if let Some(s) = start {
        tokens.push(Token {
            text: &line[s..],
            offset: s,
        });
    }
    tokens
}
