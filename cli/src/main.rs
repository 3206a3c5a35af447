#![deny(clippy::all)]

use anyhow::Context;
use cdecl::{translate, Lang, Options, Session};
use std::{
    fs,
    io::{self, BufRead},
    path::PathBuf,
    process,
};
use structopt::StructOpt;

/// Compose and explain C and C++ type declarations.
#[derive(Debug, StructOpt)]
#[structopt(name = "cdecl")]
struct Opt {
    /// Language dialect to start in (knr, c89..c23, c++98..c++23)
    #[structopt(long = "lang", short = "x")]
    lang: Option<String>,

    /// Path to a JSON options file; missing keys take their defaults
    #[structopt(parse(from_os_str), long = "options", short = "o")]
    options_path: Option<PathBuf>,

    /// Read commands from this file instead of stdin
    #[structopt(parse(from_os_str), long = "file", short = "f")]
    file: Option<PathBuf>,

    /// A single command to run; with none given, commands are read line
    /// by line from stdin
    command: Vec<String>,
}

/// Loads session options from a file. If the path is None, returns the
/// default options instead.
fn load_options(path_opt: &Option<PathBuf>) -> anyhow::Result<Options> {
    match path_opt {
        None => Ok(Options::default()),
        Some(path) => {
            let options_str = fs::read_to_string(path)
                .with_context(|| format!("Failed to read file {:?}", path))?;
            Ok(serde_json::from_str(&options_str)?)
        }
    }
}

/// Run one command line. Returns true if the session should end.
fn run_line(session: &mut Session, line: &str, errored: &mut bool) -> bool {
    match translate(session, line) {
        Ok(response) => {
            if let Some(warnings) = &response.warnings {
                eprintln!("{}", warnings);
            }
            if let Some(output) = &response.output {
                println!("{}", output);
            }
            response.quit
        }
        Err(errors) => {
            eprintln!("{}", errors);
            *errored = true;
            false
        }
    }
}

fn run(opt: Opt) -> anyhow::Result<i32> {
    let mut options = load_options(&opt.options_path)?;
    if let Some(lang_name) = &opt.lang {
        match Lang::from_alias(lang_name) {
            Some(lang) => options.lang = lang,
            None => {
                eprintln!("unknown language: {}", lang_name);
                return Ok(2);
            }
        }
    }
    let mut session = Session::with_options(options);
    let mut errored = false;

    if !opt.command.is_empty() {
        // one-shot: the trailing arguments form a single command
        run_line(&mut session, &opt.command.join(" "), &mut errored);
    } else if let Some(path) = &opt.file {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read file {:?}", path))?;
        for line in content.lines() {
            if run_line(&mut session, line, &mut errored) {
                break;
            }
        }
    } else {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let line = line.context("Failed to read stdin")?;
            if run_line(&mut session, &line, &mut errored) {
                break;
            }
        }
    }

    Ok(if errored { 1 } else { 0 })
}

fn main() {
    let exit_code = match run(Opt::from_args()) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{:#}", err);
            70
        }
    };
    process::exit(exit_code);
}
