#![cfg(not(tarpaulin_include))]

use cgpa::Calculator;
use cgpa::command::{Command, HELP};
use cgpa::display::render_table;
use clap::Parser;
use log::debug;
use std::io::{self, BufRead, Write};

/// Terminal version of the CGPA calculator.
#[derive(Parser, Debug)]
#[command(name = "cgpa-cli", version)]
struct Args {
    /// Start with an empty table instead of the sample courses
    #[arg(long)]
    empty: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut calculator = if args.empty {
        Calculator::empty()
    } else {
        Calculator::with_sample_courses()
    };
    calculator.subscribe(|snapshot| debug!("table now has {} rows", snapshot.rows().len()));
    let mut status = String::from("ok");
    let mut show = true;

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        if show {
            println!("{}", render_table(calculator.rows(), calculator.cgpa()));
        }
        print!("({}) > ", status);
        io::stdout().flush()?;

        let Some(line) = lines.next() else { break };
        let line = line?;

        match Command::parse(&line) {
            Ok(Command::Quit) => break,
            Ok(Command::Help) => {
                println!("{}", HELP);
                show = false;
                status = String::from("ok");
            }
            Ok(Command::Show) => {
                show = true;
                status = String::from("ok");
            }
            Ok(command) => {
                debug!("command {:?}", command);
                let applied = command
                    .into_action()
                    .map(|action| calculator.apply(action))
                    .unwrap_or(false);
                status = String::from(if applied { "ok" } else { "no such row" });
                show = true;
            }
            Err(e) => {
                status = e.to_string();
                show = false;
            }
        }
    }

    Ok(())
}
