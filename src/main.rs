use anyhow::{Context, Result, anyhow};
use clap::Parser;
use itertools::Itertools;
use std::fs;
use std::io::{self, Read};
use std::time::Duration;

use netregex::{CompiledPattern, Engine, EngineConfig, MatchResult, RegexOptions};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Pattern in .NET syntax
    #[arg(value_name = "PATTERN")]
    pattern: String,

    /// Input file (standard input when absent)
    #[arg(value_name = "FILE")]
    file: Option<String>,

    /// Compile options as letters from "imnsx"
    #[arg(short = 'o', long, value_name = "LETTERS", default_value = "")]
    options: String,

    /// Report every match instead of the first
    #[arg(short = 'a', long)]
    all: bool,

    /// Replace matches with TEMPLATE and print the result
    #[arg(short = 'r', long, value_name = "TEMPLATE", conflicts_with = "split")]
    replace: Option<String>,

    /// Most replacements to make, or most pieces to split into
    #[arg(long, value_name = "N")]
    count: Option<usize>,

    /// Split the input around matches, one piece per line
    #[arg(long)]
    split: bool,

    /// Byte offset to start matching at
    #[arg(long, value_name = "N", default_value_t = 0)]
    start: usize,

    /// Give up on capture recovery after this many milliseconds
    #[arg(long, value_name = "N")]
    timeout_ms: Option<u64>,

    /// Print the translated pattern and group table, then exit
    #[arg(long)]
    explain: bool,
}

fn main() {
    let args = Args::parse();
    match run(&args) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(err) => {
            eprintln!("netregex: {err:#}");
            std::process::exit(2);
        }
    }
}

/// Returns whether anything matched.
fn run(args: &Args) -> Result<bool> {
    let options = RegexOptions::parse(&args.options)
        .map_err(|c| anyhow!("unknown option letter {c:?}; expected some of \"imnsx\""))?;
    let mut config = EngineConfig::default();
    if let Some(ms) = args.timeout_ms {
        config = config.with_match_timeout(Duration::from_millis(ms));
    }
    let engine = Engine::with_config(config);
    let pattern = engine.compile(&args.pattern, options)?;

    if args.explain {
        explain(&pattern);
        return Ok(true);
    }

    let input = read_input(args.file.as_deref())?;
    if let Some(template) = &args.replace {
        let out = pattern.replace(&input, template.as_str(), args.count, args.start)?;
        print!("{out}");
        return Ok(out != input);
    }
    if args.split {
        let pieces = pattern.split(&input, args.count, args.start)?;
        for piece in &pieces {
            println!("{piece}");
        }
        return Ok(pieces.len() > 1);
    }

    let mut found = false;
    for m in pattern.matches(&input, args.start) {
        print_match(&m?);
        found = true;
        if !args.all {
            break;
        }
    }
    Ok(found)
}

fn read_input(file: Option<&str>) -> Result<String> {
    match file {
        Some(path) => fs::read_to_string(path).with_context(|| format!("Failed to read {path}")),
        None => {
            let mut contents = String::new();
            io::stdin()
                .read_to_string(&mut contents)
                .context("Failed to read stdin")?;
            Ok(contents)
        }
    }
}

fn explain(pattern: &CompiledPattern) {
    let flags = pattern.flags();
    println!("pattern: {}", pattern.as_str());
    println!("host:    {}", pattern.host_pattern());
    let derived = [
        (flags.must_capture_first_char, "must-capture-first-char"),
        (flags.is_contiguous_anchor, "contiguous-anchor"),
        (flags.has_multiline_end_anchor, "end-anchor"),
        (flags.always_fails, "always-fails"),
    ];
    let set = derived.iter().filter(|(on, _)| *on).map(|(_, name)| name).join(" ");
    println!("flags:   {}", if set.is_empty() { "-" } else { set.as_str() });
    for (number, name) in pattern.group_numbers().into_iter().zip(pattern.group_names()) {
        println!("group {number}: {name}");
    }
}

fn print_match(m: &MatchResult) {
    println!("{}+{}: {:?}", m.index, m.length, m.value);
    for group in m.groups.iter().skip(1) {
        let captures = group
            .captures
            .iter()
            .map(|c| format!("{}+{} {:?}", c.index, c.length, c.value))
            .join(", ");
        let shown = if captures.is_empty() { "-" } else { captures.as_str() };
        println!("  {} ({}): {}", group.name, group.number, shown);
    }
}
