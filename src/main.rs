/// iterec - Trampoline Demo CLI
use iterec::config::TrampolineConfig;
use iterec::demos::Demos;
use iterec::Value;
use std::env;
use std::fs;
use std::io::{self, Read, Write};
use std::process;
use tracing_subscriber::EnvFilter;

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn print_usage() {
    eprintln!("iterec v{}", VERSION);
    eprintln!();
    eprintln!("USAGE:");
    eprintln!("    iterec [OPTIONS] <DEMO> <ARG>");
    eprintln!();
    eprintln!("OPTIONS:");
    eprintln!("    -h, --help           Print this help message");
    eprintln!("    -v, --version        Print version information");
    eprintln!("    -o, --output <FILE>  Write output to FILE (default: stdout)");
    eprintln!("    -c, --config <FILE>  Load trampoline settings from a TOML file");
    eprintln!("    --no-memo            Disable per-invocation memoization");
    eprintln!("    --native             Run the plain recursive version instead");
    eprintln!("    --stats              Print invocation counters after the result");
    eprintln!("    --list               List the available demos");
    eprintln!();
    eprintln!("ARGUMENTS:");
    eprintln!("    <DEMO>               One of: {}", Demos::NAMES.join(", "));
    eprintln!("    <ARG>                Value literal, e.g. 10 or [3, 1, 2] (use '-' for stdin)");
    eprintln!();
    eprintln!("EXAMPLES:");
    eprintln!("    iterec fact 20");
    eprintln!("    iterec --stats ifib1 40");
    eprintln!("    iterec quicksort '[5, 3, 9, 1]'");
    eprintln!("    iterec sum_to 1000000");
    eprintln!("    RUST_LOG=iterec=trace iterec fact 5");
}

fn print_version() {
    println!("iterec {}", VERSION);
}

struct Options {
    demo: Option<String>,
    arg: Option<String>,
    output: Option<String>,
    config: Option<String>,
    no_memo: bool,
    native: bool,
    stats: bool,
}

fn parse_args() -> Result<Options, String> {
    let args: Vec<String> = env::args().collect();

    let mut demo = None;
    let mut arg = None;
    let mut output = None;
    let mut config = None;
    let mut no_memo = false;
    let mut native = false;
    let mut stats = false;
    let mut i = 1;

    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_usage();
                process::exit(0);
            }
            "-v" | "--version" => {
                print_version();
                process::exit(0);
            }
            "--list" => {
                for name in Demos::NAMES {
                    println!("{}", name);
                }
                process::exit(0);
            }
            "-o" | "--output" => {
                i += 1;
                if i >= args.len() {
                    return Err("Missing output file after -o".to_string());
                }
                output = Some(args[i].clone());
            }
            "-c" | "--config" => {
                i += 1;
                if i >= args.len() {
                    return Err("Missing config file after -c".to_string());
                }
                config = Some(args[i].clone());
            }
            "--no-memo" => {
                no_memo = true;
            }
            "--native" => {
                native = true;
            }
            "--stats" => {
                stats = true;
            }
            flag if flag.starts_with("--") => {
                return Err(format!("Unknown option: {}", flag));
            }
            positional => {
                if demo.is_none() {
                    demo = Some(positional.to_string());
                } else if arg.is_none() {
                    arg = Some(positional.to_string());
                } else {
                    return Err(format!("Unexpected argument: {}", positional));
                }
            }
        }
        i += 1;
    }

    Ok(Options {
        demo,
        arg,
        output,
        config,
        no_memo,
        native,
        stats,
    })
}

fn read_arg(raw: &str) -> Result<Value, String> {
    let text = if raw == "-" {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .map_err(|e| format!("Failed to read from stdin: {}", e))?;
        buffer
    } else {
        raw.to_string()
    };
    text.trim()
        .parse::<Value>()
        .map_err(|e| format!("Invalid argument '{}': {}", text.trim(), e))
}

fn load_config(options: &Options) -> Result<TrampolineConfig, String> {
    let base = match &options.config {
        Some(path) => TrampolineConfig::from_file(path).map_err(|e| e.to_string())?,
        None => TrampolineConfig::default(),
    };
    let mut config = base.with_env_overrides().map_err(|e| e.to_string())?;
    if options.no_memo {
        config.memoize = false;
    }
    Ok(config)
}

fn run(options: &Options) -> Result<String, String> {
    let (Some(demo), Some(raw)) = (&options.demo, &options.arg) else {
        return Err("Missing demo name or argument".to_string());
    };
    if !Demos::NAMES.contains(&demo.as_str()) {
        return Err(format!("Unknown demo: {}", demo));
    }
    let arg = read_arg(raw)?;

    if options.native {
        let value = Demos::run_native(demo, &arg).map_err(|e| e.to_string())?;
        return Ok(format!("{}\n", value));
    }

    let demos = Demos::with_config(load_config(options)?);
    let func = demos
        .trampoline
        .lookup(demo)
        .ok_or_else(|| format!("Unknown demo: {}", demo))?;
    let (value, stats) = demos
        .trampoline
        .invoke_with_stats(func, [arg])
        .map_err(|e| e.to_string())?;

    let mut output = format!("{}\n", value);
    if options.stats {
        output.push_str(&format!(
            "frames_created={} frames_executed={} memo_hits={} max_work_stack={} resolutions={} participants={}\n",
            stats.frames_created,
            stats.frames_executed,
            stats.memo_hits,
            stats.max_work_stack,
            stats.resolutions,
            stats.participants
        ));
    }
    Ok(output)
}

fn write_output(output: Option<&str>, content: &str) -> Result<(), String> {
    match output {
        Some(path) => {
            let mut file = fs::File::create(path)
                .map_err(|e| format!("Failed to create output file '{}': {}", path, e))?;
            file.write_all(content.as_bytes())
                .map_err(|e| format!("Failed to write to output file '{}': {}", path, e))?;
            Ok(())
        }
        None => {
            print!("{}", content);
            Ok(())
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let options = match parse_args() {
        Ok(opts) => opts,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!();
            print_usage();
            process::exit(1);
        }
    };

    if options.demo.is_none() {
        eprintln!("Error: Missing demo name");
        eprintln!();
        print_usage();
        process::exit(1);
    }

    let output = match run(&options) {
        Ok(output) => output,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = write_output(options.output.as_deref(), &output) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
