//! The "file already exists" prompt.

use engine::{ConflictDecision, ConflictOutcome};
use iced::widget::{button, checkbox, column, container, radio, text, Column};
use iced::{Alignment, Element, Length};

use crate::Message;

/// Choices on screen for one pending conflict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictPrompt {
    pub file_name: String,
    pub outcome: ConflictOutcome,
    pub apply_to_all: bool,
}

impl ConflictPrompt {
    /// Opens on "keep both", applying to this file only.
    pub fn new(file_name: String) -> Self {
        ConflictPrompt {
            file_name,
            outcome: ConflictOutcome::KeepBoth,
            apply_to_all: false,
        }
    }

    pub fn decision(&self) -> ConflictDecision {
        ConflictDecision {
            outcome: self.outcome,
            remember: self.apply_to_all,
        }
    }
}

pub fn view(prompt: &ConflictPrompt) -> Element<'_, Message> {
    let choices: Vec<Element<Message>> = ConflictOutcome::ALL
        .into_iter()
        .map(|outcome| {
            radio(
                outcome.to_string(),
                outcome,
                Some(prompt.outcome),
                Message::ConflictOutcomeSelected,
            )
            .into()
        })
        .collect();
    let choices = Column::with_children(choices).spacing(6);

    let dialog = column![
        text("File already exists").size(20),
        text(&prompt.file_name),
        choices,
        checkbox("Apply to all", prompt.apply_to_all).on_toggle(Message::ApplyToAllToggled),
        button("OK").on_press(Message::ConflictConfirmed).padding([6, 22]),
    ]
    .spacing(12)
    .padding(20)
    .align_items(Alignment::Center);

    container(dialog)
        .width(Length::Fill)
        .height(Length::Fill)
        .center_x()
        .center_y()
        .into()
}
