//! Terminal progress bar.

use std::io::Write;

use hwpgen_core::progress::{stage_label, ProgressPhase, ProgressSnapshot};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

const BAR_WIDTH: usize = 30;

/// Redraw the bar on stderr for every snapshot until the bar reaches a
/// terminal phase or `done` is cancelled.
pub async fn progress_bar(mut progress: watch::Receiver<ProgressSnapshot>, done: CancellationToken) {
    let mut stderr = std::io::stderr();
    loop {
        let snapshot = *progress.borrow_and_update();
        if let Err(e) = draw(&mut stderr, &snapshot) {
            tracing::debug!(error = %e, "Failed to draw progress bar");
        }
        if snapshot.is_terminal() {
            break;
        }

        tokio::select! {
            biased;
            changed = progress.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            _ = done.cancelled() => break,
        }
    }
    if let Err(e) = writeln!(stderr) {
        tracing::debug!(error = %e, "Failed to finish progress bar");
    }
}

/// Overwrite the current terminal line with the bar.
fn draw(out: &mut impl Write, snapshot: &ProgressSnapshot) -> std::io::Result<()> {
    write!(out, "\r{}", bar_line(snapshot))?;
    out.flush()
}

fn bar_line(snapshot: &ProgressSnapshot) -> String {
    let filled = BAR_WIDTH * usize::from(snapshot.percent.min(100)) / 100;
    let status = match snapshot.phase {
        ProgressPhase::Running => stage_label(snapshot.percent),
        ProgressPhase::Completed => "완료",
        ProgressPhase::Failed => "실패",
    };
    format!(
        "[{}{}] {:>3}% {}",
        "#".repeat(filled),
        "-".repeat(BAR_WIDTH - filled),
        snapshot.percent,
        status
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_bar() {
        let line = bar_line(&ProgressSnapshot::initial());
        assert!(line.starts_with(&format!("[{}]   0% ", "-".repeat(BAR_WIDTH))));
    }

    #[test]
    fn completed_bar() {
        let line = bar_line(&ProgressSnapshot {
            percent: 100,
            phase: ProgressPhase::Completed,
        });
        assert_eq!(line, format!("[{}] 100% 완료", "#".repeat(BAR_WIDTH)));
    }

    #[test]
    fn failed_bar_keeps_its_value() {
        let line = bar_line(&ProgressSnapshot {
            percent: 50,
            phase: ProgressPhase::Failed,
        });
        assert_eq!(
            line,
            format!("[{}{}]  50% 실패", "#".repeat(15), "-".repeat(15))
        );
    }

    #[test]
    fn draw_rewrites_the_line() {
        let mut out = Vec::new();
        draw(&mut out, &ProgressSnapshot::initial()).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("\r["));
        assert!(!text.contains('\n'));
    }

    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
            Err(std::io::ErrorKind::BrokenPipe.into())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Err(std::io::ErrorKind::BrokenPipe.into())
        }
    }

    #[test]
    fn draw_reports_write_errors() {
        let err = draw(&mut ClosedPipe, &ProgressSnapshot::initial()).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::BrokenPipe);
    }
}
