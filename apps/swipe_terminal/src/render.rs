use client_core::{
    card::CandidateView,
    session::ResolveStep,
    Leaning, RenderFrame, SessionState,
};
use shared::domain::Side;

pub fn frame_line(frame: &RenderFrame) -> String {
    let mut line = match (&frame.card, frame.state) {
        (_, SessionState::Idle) => "starting...".to_string(),
        (_, SessionState::Loading)
        | (_, SessionState::Resolving(ResolveStep::Fetching)) => "loading next pair...".to_string(),
        (_, SessionState::AwaitingChoice) => {
            "no comparisons left: 'continue' to keep voting or 'results'".to_string()
        }
        (_, SessionState::Stalled) => "stalled: 'reload' to try again".to_string(),
        (_, SessionState::Finished) => "done".to_string(),
        (Some(card), _) => {
            let left = card.view(Side::Left);
            let right = card.view(Side::Right);
            match frame.exiting {
                Some(Side::Left) => format!("<< {} wins", left.label),
                Some(Side::Right) => format!("{} wins >>", right.label),
                None => format!(
                    "{}{} | {}{}",
                    if frame.leaning == Leaning::Left { "* " } else { "" },
                    describe(left),
                    describe(right),
                    if frame.leaning == Leaning::Right { " *" } else { "" },
                ),
            }
        }
        (None, _) => "waiting for a pair".to_string(),
    };

    if let Some(remaining) = frame.counter {
        line = format!("[{remaining} left] {line}");
    }
    if frame.results_shortcut_visible {
        line.push_str("  ('results' to see the ranking)");
    }
    if let Some(notice) = &frame.notice {
        line.push_str(&format!("  ! {notice}"));
    }
    line
}

fn describe(view: &CandidateView) -> String {
    format!("{} <{}>", view.label, view.media_url)
}
