use clap::Parser;
use serde::Deserialize;
use std::io::Read;
use tracing_subscriber::EnvFilter;
use bash_xtrace::interpreter::get_xtrace_prefix;
use bash_xtrace::{BashSyntax, CommandNode, ShellOptions, StaticRuntime, XTrace};

#[derive(Parser)]
#[command(name = "bash-xtrace")]
#[command(about = "Render JSON-encoded bash command nodes as set -x trace lines")]
#[command(version)]
struct Cli {
    /// Variable visible to expansions (repeatable)
    #[arg(long = "var", value_name = "NAME=VALUE")]
    vars: Vec<String>,

    /// Trace prefix (defaults to "+ ")
    #[arg(long = "ps4")]
    ps4: Option<String>,

    /// Quote with POSIX shell rules
    #[arg(long = "posix")]
    posix: bool,

    /// Render with xtrace turned off
    #[arg(long = "no-xtrace")]
    no_xtrace: bool,

    /// Output results as JSON (trace, skipped)
    #[arg(long = "json")]
    json: bool,

    /// JSON file with one command node or an array of nodes
    #[arg()]
    input_file: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Input {
    Many(Vec<CommandNode>),
    One(CommandNode),
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    // Determine input source: file or stdin
    let source = if let Some(ref file) = cli.input_file {
        match std::fs::read_to_string(file) {
            Ok(content) => content,
            Err(e) => {
                eprintln!("Error: Cannot read input file: {}: {}", file, e);
                std::process::exit(1);
            }
        }
    } else {
        use std::io::IsTerminal;
        if std::io::stdin().is_terminal() {
            eprintln!("Error: No input provided. Provide a JSON file or pipe via stdin.");
            std::process::exit(1);
        }
        let mut buf = String::new();
        if let Err(e) = std::io::stdin().read_to_string(&mut buf) {
            eprintln!("Error: Cannot read stdin: {}", e);
            std::process::exit(1);
        }
        buf
    };

    let nodes = match serde_json::from_str::<Input>(&source) {
        Ok(Input::Many(nodes)) => nodes,
        Ok(Input::One(node)) => vec![node],
        Err(e) => {
            eprintln!("Error: Invalid command node: {}", e);
            std::process::exit(2);
        }
    };

    let mut runtime = StaticRuntime::new();
    let mut env = std::collections::HashMap::new();
    for var in &cli.vars {
        let Some((name, value)) = var.split_once('=') else {
            eprintln!("Error: Expected NAME=VALUE, got: {}", var);
            std::process::exit(2);
        };
        runtime.set_var(name, value);
        env.insert(name.to_string(), value.to_string());
    }
    if let Some(ps4) = cli.ps4 {
        env.insert("PS4".to_string(), ps4);
    }

    let options = ShellOptions {
        xtrace: !cli.no_xtrace,
        posix: cli.posix,
    };
    let syntax = BashSyntax;
    let mut tracer = XTrace::new(&mut runtime, &syntax)
        .with_lang(options.lang())
        .with_prefix(get_xtrace_prefix(&env));

    if !cli.json {
        let mut out = std::io::stdout();
        for node in &nodes {
            tracer.trace(node, options.xtrace, &mut out);
        }
        return;
    }

    let mut trace = Vec::new();
    let mut skipped = Vec::new();
    for (index, node) in nodes.iter().enumerate() {
        match tracer.render(node, options.xtrace) {
            Ok(line) => trace.push(line),
            Err(reason) => skipped.push(serde_json::json!({
                "index": index,
                "kind": node.kind(),
                "reason": reason.to_string(),
            })),
        }
    }

    println!("{}", serde_json::json!({
        "trace": trace,
        "skipped": skipped,
    }));
}
