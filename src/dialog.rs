use chrono::Local;
use time_humanize::{Accuracy, HumanTime, Tense};

use crate::history::HistorySummary;

/// The five modal dialogs. The session enforces that at most one is open.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum_macros::Display)]
pub enum DialogKind {
    Intro,
    Help,
    Pause,
    Win,
    Lose,
}

impl DialogKind {
    pub fn title(self) -> &'static str {
        match self {
            DialogKind::Intro => "Meeting Room Madness!",
            DialogKind::Help => "Help",
            DialogKind::Pause => "Pause",
            DialogKind::Win => "Hell yeah!",
            DialogKind::Lose => "Uh-oh!",
        }
    }

    pub fn button_label(self) -> &'static str {
        match self {
            DialogKind::Intro => "Start",
            DialogKind::Help => "OK",
            DialogKind::Pause => "Continue",
            DialogKind::Win => "Play again",
            DialogKind::Lose => "Try again",
        }
    }
}

/// Renderable dialog: title, body paragraphs (newline separated), one button.
#[derive(Clone, Debug)]
pub struct DialogContent {
    pub title: &'static str,
    pub body: String,
    pub button: &'static str,
}

/// Build the text for a dialog from the facts of the current round and,
/// where it adds flavor, the history summary.
pub fn content(
    kind: DialogKind,
    time_limit_secs: u64,
    elapsed_secs: u64,
    summary: Option<&HistorySummary>,
) -> DialogContent {
    let body = match kind {
        DialogKind::Intro => {
            let mut body = format!(
                "Oh no! An important client shows up for a meeting in about {time_limit_secs} seconds. But what happened to the meeting room?\n\
                 It seems that after last night's party nobody was in any shape to clean up. That job is yours now!\n\
                 Remove everything that doesn't belong (a left click will do), and do it in the right order: the bar at the bottom tells you what has to go first."
            );
            if let Some(last) = summary.and_then(|s| s.last_finished) {
                let secs = (Local::now() - last).num_seconds().max(0) as u64;
                let ago = HumanTime::from(std::time::Duration::from_secs(secs))
                    .to_text_en(Accuracy::Rough, Tense::Past);
                body.push_str(&format!("\nLast attempt {ago}."));
            }
            body
        }
        DialogKind::Win => {
            let mut body = format!(
                "Phew, you did it! Now all that's left to worry about is the state of your colleagues...\n\
                 Your time: {elapsed_secs} seconds."
            );
            if let Some(best) = summary.and_then(|s| s.best_win_secs) {
                body.push_str(&format!("\nBest time so far: {best} seconds."));
            }
            body
        }
        DialogKind::Lose => {
            "Oh man, that was pathetic. And the client was not happy. Not at all. \
             Word is the project goes to another firm now..."
                .to_string()
        }
        DialogKind::Pause => {
            "You have paused the game. Probably because you are too hungover to continue."
                .to_string()
        }
        DialogKind::Help => {
            "You are supposed to tidy up the meeting room. Remove the clutter by left-clicking it, in the correct order and within the time limit.\n\
             The bar at the bottom of the screen hints at what has to go next. The top right corner shows the remaining time and your progress. \
             Press 'p' to pause the game and 'h' to open this help."
                .to_string()
        }
    };

    DialogContent {
        title: kind.title(),
        body,
        button: kind.button_label(),
    }
}
