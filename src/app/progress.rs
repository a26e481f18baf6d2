use std::io::{IsTerminal, Write};
use std::time::Duration;

use crossterm::{
    cursor, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{Clear, ClearType},
};
use tokio::sync::mpsc;
use tokio::time::Instant;

use chopper::runner::ProgressEvent;

const PROGRESS_TICK: Duration = Duration::from_millis(250);
const PROGRESS_BAR_WIDTH: usize = 30;

/// Renders a single progress line on stderr until every worker has stopped.
///
/// The task ends when the progress conduit closes, which happens once the
/// last worker exits. Nothing is drawn when stderr is not a terminal.
pub(crate) fn setup_progress_indicator(
    duration: Duration,
    concurrency: usize,
    no_color: bool,
    mut progress_rx: mpsc::UnboundedReceiver<ProgressEvent>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let draw = std::io::stderr().is_terminal();
        let style = ProgressStyle::new(PROGRESS_BAR_WIDTH);
        let run_start = Instant::now();
        let mut counts = CompletionCounts::new(concurrency);
        let mut ticker = tokio::time::interval(PROGRESS_TICK);

        loop {
            tokio::select! {
                event = progress_rx.recv() => {
                    let Some(event) = event else {
                        if draw {
                            let elapsed = run_start.elapsed().min(duration);
                            let line = build_progress_line(&style, elapsed, duration, counts.total(), no_color);
                            if render_progress_line(&line, no_color).is_ok() {
                                drop(finish_progress_line());
                            }
                        }
                        break;
                    };
                    counts.record(event);
                }
                _ = ticker.tick() => {
                    if !draw {
                        continue;
                    }
                    let line = build_progress_line(&style, run_start.elapsed(), duration, counts.total(), no_color);
                    if render_progress_line(&line, no_color).is_err() {
                        break;
                    }
                }
            }
        }
    })
}

/// Latest cumulative count reported by each worker.
struct CompletionCounts {
    per_worker: Vec<u64>,
}

impl CompletionCounts {
    fn new(concurrency: usize) -> Self {
        Self {
            per_worker: vec![0; concurrency],
        }
    }

    fn record(&mut self, event: ProgressEvent) {
        if let Some(slot) = self.per_worker.get_mut(event.worker) {
            *slot = (*slot).max(event.completed);
        }
    }

    fn total(&self) -> u64 {
        self.per_worker
            .iter()
            .fold(0_u64, |acc, count| acc.saturating_add(*count))
    }
}

fn render_progress_line(line: &[ProgressSegment], no_color: bool) -> Result<(), std::io::Error> {
    let mut out = std::io::stderr();
    queue!(out, cursor::MoveToColumn(0), Clear(ClearType::CurrentLine))?;
    for segment in line {
        if no_color {
            queue!(out, Print(&segment.text))?;
        } else if let Some(color) = segment.color {
            queue!(
                out,
                SetForegroundColor(color),
                Print(&segment.text),
                ResetColor
            )?;
        } else {
            queue!(out, Print(&segment.text))?;
        }
    }
    out.flush()?;
    Ok(())
}

fn finish_progress_line() -> Result<(), std::io::Error> {
    let mut out = std::io::stderr();
    out.write_all(b"\n")?;
    out.flush()?;
    Ok(())
}

fn build_progress_line(
    style: &ProgressStyle,
    elapsed: Duration,
    duration: Duration,
    completed: u64,
    no_color: bool,
) -> Vec<ProgressSegment> {
    let size = style.size.max(1);
    let goal_ms = duration.as_millis().max(1);
    let elapsed_ms = elapsed.as_millis().min(goal_ms);
    let size_u128 = u128::from(u64::try_from(size).unwrap_or(u64::MAX));

    let scaled = elapsed_ms
        .saturating_mul(size_u128)
        .checked_div(goal_ms)
        .unwrap_or(0);
    let complete_size = usize::try_from(scaled).unwrap_or(size).min(size);
    let incomplete_size = size.saturating_sub(complete_size);

    let percent_x100 = elapsed_ms
        .saturating_mul(10_000)
        .checked_div(goal_ms)
        .unwrap_or(0);
    let percent_whole = percent_x100.checked_div(100).unwrap_or(0);
    let percent_frac = percent_x100.checked_rem(100).unwrap_or(0);
    let percent_text = format!(" {}.{:02}%", percent_whole, percent_frac);

    let time_text = format!(
        " | {} / {}",
        format_tenths(elapsed_ms),
        format_goal(duration)
    );
    let completed_text = format!(" | {} completed", completed);

    let progress_bar = format!(
        "{}{}{}{}",
        style.begin,
        style.fill.repeat(complete_size),
        style.empty.repeat(incomplete_size),
        style.end
    );

    if no_color {
        vec![
            ProgressSegment::plain(progress_bar),
            ProgressSegment::plain(percent_text),
            ProgressSegment::plain(time_text),
            ProgressSegment::plain(completed_text),
        ]
    } else {
        vec![
            ProgressSegment::plain(progress_bar),
            ProgressSegment::colored(percent_text, Color::Cyan),
            ProgressSegment::colored(time_text, Color::Yellow),
            ProgressSegment::colored(completed_text, Color::Green),
        ]
    }
}

fn format_tenths(millis: u128) -> String {
    let tenths = millis.checked_div(100).unwrap_or(0);
    format!(
        "{}.{}s",
        tenths.checked_div(10).unwrap_or(0),
        tenths.checked_rem(10).unwrap_or(0)
    )
}

/// Whole-second goals print without a fraction: `10s`, `1.5s`.
fn format_goal(duration: Duration) -> String {
    if duration.subsec_millis() == 0 {
        format!("{}s", duration.as_secs())
    } else {
        format_tenths(duration.as_millis())
    }
}

struct ProgressStyle {
    size: usize,
    begin: String,
    end: String,
    fill: String,
    empty: String,
}

impl ProgressStyle {
    fn new(size: usize) -> Self {
        Self {
            size,
            begin: "[".to_owned(),
            end: "]".to_owned(),
            fill: "#".to_owned(),
            empty: "-".to_owned(),
        }
    }
}

struct ProgressSegment {
    text: String,
    color: Option<Color>,
}

impl ProgressSegment {
    const fn plain(text: String) -> Self {
        Self { text, color: None }
    }

    const fn colored(text: String, color: Color) -> Self {
        Self {
            text,
            color: Some(color),
        }
    }
}
