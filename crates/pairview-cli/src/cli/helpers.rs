use std::path::Path;

use anyhow::Context;
use pairview_navigator::{Labels, Navigator, NavigatorError};

use super::args::Cli;

/// Labels from `--labels` if given, else the built-in set for `--locale`.
pub fn resolve_labels(cli: &Cli) -> anyhow::Result<Labels> {
    if let Some(path) = &cli.labels {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read labels file {}", path.display()))?;
        return serde_json::from_str(&raw)
            .with_context(|| format!("invalid labels file {}", path.display()));
    }

    Labels::for_locale(&cli.locale)
        .ok_or_else(|| anyhow::anyhow!("unknown locale {:?} (expected fa or en)", cli.locale))
}

/// Load a comparison file, printing the resulting notifications.
///
/// On failure returns the exit code to use.
pub async fn open_file(file: &Path, labels: Labels) -> Result<Navigator, i32> {
    let mut nav = Navigator::new(labels);
    let result = nav.load_file(file).await;
    flush_notifications(&mut nav);

    match result {
        Ok(_) => Ok(nav),
        Err(e) => {
            // Parse and read failures were already reported as a notification.
            if matches!(e, NavigatorError::UnsupportedFile { .. }) {
                eprintln!("error: {}", e);
            }
            Err(e.exit_code())
        }
    }
}

pub fn flush_notifications(nav: &mut Navigator) {
    for event in nav.drain_events() {
        if let Some(note) = event.notification(nav.labels()) {
            eprintln!("{}", note);
        }
    }
}

/// Header line: label, counter, progress.
pub fn header(nav: &Navigator) -> Option<String> {
    let view = nav.current_view()?;
    Some(format!(
        "{}  {}  [{:.0}%]",
        view.label,
        nav.counter_text(),
        nav.progress_percent()
    ))
}

pub fn print_current(nav: &Navigator, html: bool) {
    let (Some(head), Some(view)) = (header(nav), nav.current_view()) else {
        println!("{}", nav.counter_text());
        return;
    };

    println!("{}", head);
    println!();
    if html {
        println!("{}", view.to_html());
    } else {
        print!("{}", view.to_plain_text());
    }
}
