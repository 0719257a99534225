//! tis-emu: run node programs from the command line

use std::env;

use anyhow::{bail, Context};
use tis_emu::config::Config;
use tis_emu::demos;
use tis_emu::device::{Board, Position};
use tis_emu::emu::Direction;

fn main() -> anyhow::Result<()> {
    // Initialize logging
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    match args.get(1).map(String::as_str) {
        None | Some("demo") => run_demos(args.get(2).map(String::as_str)),
        Some("run") => run_file(&args[2..]),
        Some("--help") | Some("-h") => {
            print_usage();
            Ok(())
        }
        Some(other) => {
            print_usage();
            bail!("Unknown command: {}", other)
        }
    }
}

fn print_usage() {
    println!("Usage:");
    println!("  tis-emu demo [simple|doubler|sorter|all]");
    println!("  tis-emu run <file> [--input 1,2,3] [--ticks N]");
    println!();
    println!("Config: ./tis-emu.toml or {}", config_path_hint());
}

fn config_path_hint() -> String {
    Config::user_config_path()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "~/.config/tis-emu/config.toml".to_string())
}

fn run_demos(which: Option<&str>) -> anyhow::Result<()> {
    let max_ticks = Config::get().max_ticks();

    let reports = match which.unwrap_or("all") {
        "simple" => vec![demos::simple(max_ticks)?],
        "doubler" => vec![demos::doubler(max_ticks)?],
        "sorter" => vec![demos::sorter(max_ticks)?],
        "all" => demos::all(max_ticks)?,
        other => bail!("Unknown demo: {} (expected simple, doubler, sorter or all)", other),
    };

    for report in &reports {
        println!("{}", report);
    }

    Ok(())
}

fn run_file(args: &[String]) -> anyhow::Result<()> {
    let config = Config::get();

    let mut path = None;
    let mut input = Vec::new();
    let mut max_ticks = config.max_ticks();

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--input" | "-i" => {
                let list = iter.next().context("--input needs a value like 1,2,3")?;
                input = parse_values(list)?;
            }
            "--ticks" | "-t" => {
                let value = iter.next().context("--ticks needs a number")?;
                max_ticks = value
                    .parse()
                    .with_context(|| format!("Invalid tick count: {}", value))?;
            }
            other if !other.starts_with('-') => path = Some(other),
            other => bail!("Unknown option: {}", other),
        }
    }

    let Some(path) = path else {
        print_usage();
        bail!("run needs a program file");
    };

    let source =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path))?;

    println!("Loading: {}", path);
    println!();

    // One node, fed from above, with every other side collected.
    let mut board = Board::new(1, 1);
    board.fill();
    board.add_input(0, -1, Direction::Down, input);
    let outputs: [(&str, Position); 3] = [
        ("Right", board.add_output(1, 0, Direction::Left)),
        ("Down", board.add_output(0, 1, Direction::Up)),
        ("Left", board.add_output(-1, 0, Direction::Right)),
    ];

    let errors = board.load(0, 0, &source)?;
    if !errors.is_empty() {
        for error in &errors {
            eprintln!("{}", error);
        }
        bail!("{} validation errors in {}", errors.len(), path);
    }

    for _ in 0..max_ticks {
        board.step();
        if config.trace_outputs() {
            print_outputs(&board, &outputs, Some(board.ticks()));
        }
    }

    if let Some(core) = board.core(0, 0) {
        println!("ACC: {}  BAK: {}  PC: {}", core.acc(), core.bak(), core.pc());
    }
    print_outputs(&board, &outputs, None);

    Ok(())
}

fn parse_values(list: &str) -> anyhow::Result<Vec<i32>> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<i32>()
                .with_context(|| format!("Invalid input value: {}", s))
        })
        .collect()
}

fn print_outputs(board: &Board, outputs: &[(&str, Position)], tick: Option<u64>) {
    if let Some(tick) = tick {
        println!("Tick {}:", tick);
    }
    for (name, pos) in outputs {
        let values: Vec<String> = board
            .get_output(*pos)
            .map(|link| link.values().iter().map(i32::to_string).collect())
            .unwrap_or_default();
        println!("Output {}: {}", name, values.join(","));
    }
}
