use clap::Parser;
use std::error::Error;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;
use turing_tutor::{
    ProgramDescriptor, ProgramLoader, ProgramManager, Response, Session, SessionConfig,
    TuringMachine,
};

#[derive(Parser)]
#[command(author, version, about, long_about = None, arg_required_else_help = true)]
#[command(after_help = "EXAMPLES:
  tutor-cli --example binary_increment --input 1011
  tutor-cli --program flip.json --input 1010 --debug
  tutor-cli --example bit_flip --interactive")]
struct Cli {
    /// Program file to execute (.json descriptor or .tm text)
    #[arg(short, long, conflicts_with = "example")]
    program: Option<PathBuf>,

    /// Built-in example program to execute (see --list)
    #[arg(short, long)]
    example: Option<String>,

    /// The input written onto the tape. Defaults to the program's suggested input
    #[arg(short, long)]
    input: Option<String>,

    /// JSON file with session limits
    #[arg(long)]
    config: Option<PathBuf>,

    /// Step budget for a run
    #[arg(long)]
    max_steps: Option<usize>,

    /// Number of snapshots kept for undo (at least 1)
    #[arg(long)]
    max_history: Option<usize>,

    /// Blank cells shown on each side of the tape window (at most 256)
    #[arg(long)]
    padding: Option<usize>,

    /// Print each step of the execution
    #[arg(short = 'd', long)]
    debug: bool,

    /// Read commands (step, run [n], undo, redo, reset [tape], view, quit) from stdin
    #[arg(short = 'I', long)]
    interactive: bool,

    /// List the built-in programs and exit
    #[arg(short, long)]
    list: bool,

    /// Print machine state as JSON
    #[arg(long)]
    json: bool,

    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.list {
        for info in ProgramManager::list() {
            println!(
                "{:<18} {:<26} {}",
                info.id, info.name, info.description
            );
        }
        return Ok(());
    }

    let descriptor = load_descriptor(&cli)?;
    let config = load_config(&cli)?;
    let input = cli
        .input
        .clone()
        .or_else(|| descriptor.default_input.clone())
        .unwrap_or_default();

    let mut session = Session::new(config);
    let loaded = session.load(&descriptor, &input)?;
    info!(
        states = loaded.program.states.len(),
        transitions = loaded.program.transitions.len(),
        "program ready"
    );

    if cli.interactive {
        return interactive(&mut session, cli.json);
    }

    if cli.debug {
        print_state(session.machine());
        for _ in 0..config.max_steps {
            let response = session.step();
            if response.success {
                print_state(session.machine());
            }
            if session.machine().is_halted() {
                break;
            }
        }
        println!("\nFinal tape:");
    } else {
        session.run(None);
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&session.view())?);
    } else {
        println!("{}", session.machine().tape_contents());
        println!("{}", outcome(session.machine()));
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(io::stderr)
        .init();
}

fn load_descriptor(cli: &Cli) -> Result<ProgramDescriptor, Box<dyn Error>> {
    match (&cli.program, &cli.example) {
        (Some(path), _) => Ok(ProgramLoader::load_program(path)?),
        (None, Some(id)) => Ok(ProgramManager::get(id)?.descriptor),
        (None, None) => Err("either --program or --example is required".into()),
    }
}

fn load_config(cli: &Cli) -> Result<SessionConfig, Box<dyn Error>> {
    let mut config = match &cli.config {
        Some(path) => SessionConfig::from_file(path)?,
        None => SessionConfig::default(),
    };

    if let Some(max_steps) = cli.max_steps {
        config.max_steps = max_steps;
    }
    if let Some(max_history) = cli.max_history {
        config.max_history = max_history;
    }
    if let Some(padding) = cli.padding {
        config.tape_padding = padding;
    }

    config.validate()?;
    Ok(config)
}

fn interactive(session: &mut Session, json: bool) -> Result<(), Box<dyn Error>> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    print_response(&session.view(), session.machine(), json)?;
    write!(stdout, "> ")?;
    stdout.flush()?;

    for line in stdin.lock().lines() {
        let line = line?;
        let mut words = line.split_whitespace();

        let response = match (words.next(), words.next()) {
            (None, _) => None,
            (Some("step" | "s"), _) => Some(session.step()),
            (Some("run" | "r"), None) => Some(session.run(None)),
            (Some("run" | "r"), Some(n)) => match n.parse::<usize>() {
                Ok(n) => Some(session.run(Some(n))),
                Err(_) => {
                    eprintln!("run expects a step count, got '{}'", n);
                    None
                }
            },
            (Some("undo" | "u"), _) => Some(session.undo()),
            (Some("redo"), _) => Some(session.redo()),
            (Some("reset"), tape) => Some(session.reset(tape.unwrap_or_default())),
            (Some("view" | "v"), _) => Some(session.view()),
            (Some("quit" | "q" | "exit"), _) => break,
            (Some(other), _) => {
                eprintln!("unknown command '{}'", other);
                None
            }
        };

        if let Some(response) = response {
            print_response(&response, session.machine(), json)?;
        }

        write!(stdout, "> ")?;
        stdout.flush()?;
    }

    Ok(())
}

fn print_response(
    response: &Response,
    machine: &TuringMachine,
    json: bool,
) -> Result<(), Box<dyn Error>> {
    if json {
        println!("{}", serde_json::to_string(response)?);
        return Ok(());
    }

    if let Some(notice) = response.notice {
        println!("{}", notice);
    }
    if let Some(report) = response.result {
        println!(
            "Ran {} steps{}",
            report.steps_executed,
            if report.max_steps_reached {
                " (step budget exhausted)"
            } else {
                ""
            }
        );
    }
    print_state(machine);
    if let Some(next) = &response.machine.next_action {
        if next.why.is_empty() {
            println!("Next: {}", next.action);
        } else {
            println!("Next: {} ({})", next.action, next.why);
        }
    }
    println!(
        "undo: {}, redo: {}",
        if response.can_undo { "yes" } else { "no" },
        if response.can_redo { "yes" } else { "no" }
    );

    Ok(())
}

fn print_state(machine: &TuringMachine) {
    println!(
        "Step: {}, State: {}, Head: {}, Tape: {}{}",
        machine.step_count(),
        machine.state(),
        machine.head_position(),
        machine.tape_contents(),
        if machine.is_halted() {
            format!(" [{}]", outcome(machine))
        } else {
            String::new()
        }
    );
}

fn outcome(machine: &TuringMachine) -> &'static str {
    match (machine.is_halted(), machine.is_accepted()) {
        (true, true) => "accepted",
        (true, false) => "rejected",
        (false, _) => "running",
    }
}
