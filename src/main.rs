use std::{
    fs::File,
    io::{self, BufRead, BufReader, Write},
};

use anyhow::Context;
use clap::{App, Arg};
use kaleidoscope_front::{
    ast::ASTNode,
    config,
    parser::{Parser, ParserSettings},
};

struct Options {
    quiet: bool,
    print_ast: bool,
}

/// stream the characters of `reader` line by line, a read error ends the stream
fn input_chars(reader: impl BufRead) -> impl Iterator<Item = char> {
    reader
        .lines()
        .map_while(|line| match line {
            Ok(line) => Some(line + "\n"),
            Err(e) => {
                eprintln!("Error: failed to read input: {}", e);
                None
            }
        })
        .flat_map(|line| line.chars().collect::<Vec<_>>())
}

fn prompt(options: &Options) -> io::Result<()> {
    if !options.quiet {
        eprint!("ready> ");
        io::stderr().flush()?;
    }
    Ok(())
}

fn describe(node: &ASTNode) -> &'static str {
    match node {
        ASTNode::Extern(_) => "Parsed an extern",
        ASTNode::Function(func) if func.prototype.is_anonymous() => "Parsed a top-level expr",
        ASTNode::Function(_) => "Parsed a function definition.",
    }
}

fn run(
    source: impl Iterator<Item = char>,
    settings: ParserSettings,
    options: &Options,
) -> anyhow::Result<()> {
    prompt(options)?;
    let mut parser = Parser::new(source, settings);

    loop {
        prompt(options)?;
        if parser.skip_separator() {
            continue;
        }

        let node = match parser.parse_item() {
            Some(node) => node,
            None => break,
        };

        match node {
            Ok(node) => {
                if !options.quiet {
                    eprintln!("{}", describe(&node));
                }
                if options.print_ast {
                    println!("{}", node);
                }
            }
            Err(err) => eprintln!("Error: {}", err),
        }
    }

    Ok(())
}

fn main() -> anyhow::Result<()> {
    let matches = App::new("kaleidoscope-front")
        .version(env!("CARGO_PKG_VERSION"))
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .arg(
            Arg::with_name("INPUT")
                .help("file to parse, reads stdin when absent")
                .index(1),
        )
        .arg(
            Arg::with_name("precedence")
                .short("p")
                .long("precedence")
                .value_name("OP=N")
                .help("set the precedence of a binary operator, 0 removes it")
                .takes_value(true)
                .multiple(true)
                .number_of_values(1),
        )
        .arg(
            Arg::with_name("max-depth")
                .long("max-depth")
                .value_name("N")
                .help("maximum expression nesting depth")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("quiet")
                .short("q")
                .long("quiet")
                .help("don't print prompts or status messages"),
        )
        .arg(
            Arg::with_name("print-ast")
                .long("print-ast")
                .help("print every parsed item to stdout"),
        )
        .get_matches();

    let mut settings = ParserSettings::default();
    if let Some(overrides) = matches.values_of("precedence") {
        settings = config::apply_overrides(settings, overrides)?;
    }
    if let Some(depth) = matches.value_of("max-depth") {
        settings.max_depth = config::parse_max_depth(depth)?;
    }

    let options = Options {
        quiet: matches.is_present("quiet"),
        print_ast: matches.is_present("print-ast"),
    };

    match matches.value_of("INPUT") {
        Some(path) => {
            let file = File::open(path).with_context(|| format!("failed to open {}", path))?;
            run(input_chars(BufReader::new(file)), settings, &options)
        }
        None => {
            let stdin = io::stdin();
            run(input_chars(stdin.lock()), settings, &options)
        }
    }
}
