//! Interactive weekly scoring session over stdin/stdout.
//!
//! This is one conversational transport for the core's scoring flow: it
//! renders each prompt, reads a line, normalizes it to an option token or
//! raw text, and feeds it back until the session reaches a terminal state.

use std::io::{self, BufRead, Write};

use chrono::Utc;
use fitweek_core::session::{Answer, Expects, FlowTurn, Prompt, ScoringFlow, StartOutcome};
use fitweek_core::storage::{Config, Database};

pub fn run(user: i64) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let db = Database::open()?;
    let config = Config::load_or_default();
    let mut flow = ScoringFlow::new(&db, config.rules, config.submission, user);

    match flow.begin(Utc::now())? {
        StartOutcome::Unregistered => {
            println!("User not found. Please register first with `fitweek-cli register`.");
            Ok(())
        }
        StartOutcome::Denied(reason) => {
            println!("{reason}");
            Ok(())
        }
        StartOutcome::Prompt(prompt) => drive(&mut flow, prompt),
    }
}

fn drive(
    flow: &mut ScoringFlow<'_, Database>,
    first: Prompt,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let mut prompt = first;

    loop {
        render(&prompt)?;

        let Some(line) = lines.next().transpose()? else {
            println!();
            println!("Input closed; session abandoned without saving.");
            return Ok(());
        };
        let answer = normalize(&prompt, line.trim());

        match flow.handle(&answer, Utc::now())? {
            FlowTurn::Prompt(next) => prompt = next,
            FlowTurn::Restarted(next) => {
                println!("Starting over!");
                prompt = next;
            }
            FlowTurn::Retry { prompt: same, hint } => {
                println!("{hint}");
                prompt = same;
            }
            FlowTurn::Committed(ledger) => {
                println!(
                    "Points saved! Your cumulative total is now {}.",
                    ledger.points.total
                );
                return Ok(());
            }
            FlowTurn::Cancelled => {
                println!("Cancelled & exited. You can start again with `fitweek-cli score`.");
                return Ok(());
            }
            FlowTurn::Failed(message) => {
                println!("{message}");
                return Ok(());
            }
        }
    }
}

fn render(prompt: &Prompt) -> io::Result<()> {
    let mut out = io::stdout().lock();
    writeln!(out)?;
    writeln!(out, "{}", prompt.text)?;
    match &prompt.expects {
        Expects::Options { choices } => {
            for (i, choice) in choices.iter().enumerate() {
                writeln!(out, "  [{}] {}", i + 1, choice.label)?;
            }
            write!(out, "> ")?;
        }
        Expects::Number { min, max } => {
            write!(out, "({min}-{max}, or 'cancel') > ")?;
        }
    }
    out.flush()
}

/// Map a typed line to the normalized event the core expects: a numbered
/// menu pick becomes its option token; anything else passes through.
fn normalize(prompt: &Prompt, line: &str) -> Answer {
    match &prompt.expects {
        Expects::Options { choices } => {
            if let Ok(pick) = line.parse::<usize>() {
                if (1..=choices.len()).contains(&pick) {
                    return Answer::select(choices[pick - 1].token.clone());
                }
            }
            Answer::select(line.to_lowercase())
        }
        Expects::Number { .. } => Answer::text(line),
    }
}
