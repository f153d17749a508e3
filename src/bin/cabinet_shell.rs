//! Cabinet Shell - drive a real shell through a terminal
//!
//! Spawns the configured shell on a PTY, types each line of stdin into it,
//! pumps `update` on a fixed tick like a game loop would, and prints the
//! screen once the shell exits or input runs out.

use std::io::{self, BufRead};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::mpsc::{self, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};

use cabinet_term::app::TerminalConfig;
use cabinet_term::input::{encode_key, encode_text, Key};
use cabinet_term::ShellTerminal;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// One host frame
const TICK: Duration = Duration::from_millis(16);

fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let args: Vec<String> = std::env::args().collect();

    let mut config_path: Option<PathBuf> = None;
    let mut cols: Option<usize> = None;
    let mut rows: Option<usize> = None;
    let mut shell: Option<String> = None;
    let mut linger_ms = 500u64;
    let mut show_help = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-c" | "--cols" => {
                i += 1;
                if i < args.len() {
                    cols = args[i].parse().ok();
                }
            },
            "-r" | "--rows" => {
                i += 1;
                if i < args.len() {
                    rows = args[i].parse().ok();
                }
            },
            "-s" | "--shell" => {
                i += 1;
                if i < args.len() {
                    shell = Some(args[i].clone());
                }
            },
            "--config" => {
                i += 1;
                if i < args.len() {
                    config_path = Some(PathBuf::from(&args[i]));
                }
            },
            "--linger" => {
                i += 1;
                if i < args.len() {
                    linger_ms = args[i].parse().unwrap_or(500);
                }
            },
            "-h" | "--help" => show_help = true,
            _ => {},
        }
        i += 1;
    }

    if show_help {
        print_help();
        return ExitCode::SUCCESS;
    }

    let mut config = match &config_path {
        Some(path) => match TerminalConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error loading config '{}': {}", path.display(), e);
                return ExitCode::FAILURE;
            },
        },
        None => TerminalConfig::load_or_default(),
    };
    if let Some(cols) = cols {
        config.cols = cols;
    }
    if let Some(rows) = rows {
        config.rows = rows;
    }
    if let Some(shell) = shell {
        config.shell.primary = shell;
    }
    if let Err(e) = config.validate() {
        eprintln!("{}", e);
        return ExitCode::FAILURE;
    }

    let mut term = ShellTerminal::new(&config);
    if let Err(e) = term.try_spawn() {
        eprintln!("Failed to spawn shell: {}", e);
        return ExitCode::FAILURE;
    }
    tracing::info!(
        "shell running in a {}x{} terminal",
        term.screen().cols(),
        term.screen().rows()
    );

    // Blocking stdin reads stay off the tick loop
    let (tx, rx) = mpsc::channel::<String>();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });

    let mut input_done_at: Option<Instant> = None;
    let linger = Duration::from_millis(linger_ms);

    while term.is_active() {
        loop {
            match rx.try_recv() {
                Ok(line) => {
                    term.write(encode_text(&line));
                    term.write(encode_key(Key::Enter));
                },
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    input_done_at.get_or_insert_with(Instant::now);
                    break;
                },
            }
        }

        term.update();

        if input_done_at.is_some_and(|at| at.elapsed() >= linger) {
            tracing::info!("input finished");
            break;
        }
        thread::sleep(TICK);
    }

    println!("{}", term.screen().text());
    term.close();

    ExitCode::SUCCESS
}

fn print_help() {
    println!("Cabinet Shell - run a shell inside a virtual terminal");
    println!();
    println!("Usage: cabinet-shell [OPTIONS] < commands.txt");
    println!();
    println!("Options:");
    println!("  -c, --cols <N>       Set terminal width (default from config: 80)");
    println!("  -r, --rows <N>       Set terminal height (default from config: 24)");
    println!("  -s, --shell <PATH>   Shell to spawn (default from config: /bin/bash)");
    println!("      --config <PATH>  Load configuration from PATH");
    println!("      --linger <MS>    Keep pumping output after input ends (default: 500)");
    println!("  -h, --help           Show this help message");
    println!();
    println!("Each line of stdin is typed into the shell followed by Enter.");
    println!("The screen is printed when the shell exits or input runs out.");
}
