use pairview_navigator::{Direction, Labels};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::cli::args::{FileArgs, ShowArgs};
use crate::cli::helpers::{flush_notifications, open_file, print_current};
use crate::exit_codes;

pub async fn cmd_list(args: &FileArgs, labels: Labels) -> anyhow::Result<i32> {
    let nav = match open_file(&args.file, labels).await {
        Ok(nav) => nav,
        Err(code) => return Ok(code),
    };

    for (i, label) in nav.selector_labels().iter().enumerate() {
        println!("{}. {}", i + 1, label);
    }
    Ok(exit_codes::SUCCESS)
}

pub async fn cmd_show(args: &ShowArgs, labels: Labels) -> anyhow::Result<i32> {
    let mut nav = match open_file(&args.file, labels).await {
        Ok(nav) => nav,
        Err(code) => return Ok(code),
    };

    if let Some(n) = args.index {
        // Out-of-range selections leave the first record active.
        let selected = match n.checked_sub(1) {
            Some(i) => nav.select(i) || nav.active_index() == Some(i),
            None => false,
        };
        if !selected {
            tracing::warn!(index = n, total = nav.records().len(), "record index out of range");
        }
        nav.drain_events();
    }

    print_current(&nav, args.html);
    Ok(exit_codes::SUCCESS)
}

enum BrowseInput {
    Step(Direction),
    Jump(usize),
    Quit,
    Unknown,
}

fn parse_input(line: &str) -> BrowseInput {
    match line.trim() {
        "" | "n" | "next" => BrowseInput::Step(Direction::Next),
        "p" | "prev" | "previous" => BrowseInput::Step(Direction::Previous),
        "q" | "quit" | "exit" => BrowseInput::Quit,
        other => match other.parse::<usize>() {
            Ok(n) if n > 0 => BrowseInput::Jump(n - 1),
            _ => BrowseInput::Unknown,
        },
    }
}

pub async fn cmd_browse(args: &FileArgs, labels: Labels) -> anyhow::Result<i32> {
    let mut nav = match open_file(&args.file, labels).await {
        Ok(nav) => nav,
        Err(code) => return Ok(code),
    };

    print_current(&nav, false);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let moved = match parse_input(&line) {
            BrowseInput::Step(direction) => nav.step(direction),
            BrowseInput::Jump(index) => nav.select(index),
            BrowseInput::Quit => break,
            BrowseInput::Unknown => {
                eprintln!("commands: n(ext), p(rev), <number>, q(uit)");
                continue;
            }
        };

        flush_notifications(&mut nav);
        if moved {
            println!();
            print_current(&nav, false);
        } else {
            println!("{}", nav.counter_text());
        }
    }

    Ok(exit_codes::SUCCESS)
}
