mod conflict;
mod display_types;
mod state;

use std::path::PathBuf;
use std::time::Duration;

use engine::logging::{init_logging, LogFormat};
use engine::{ConfigStore, ConflictOutcome};
use iced::widget::{
    button, column, container, progress_bar, row, scrollable, text, text_input, Column, Row,
};
use iced::{
    event, executor, theme, window, Alignment, Application, Command, Element, Event, Length,
    Settings, Subscription, Theme,
};

use display_types::DisplayMode;
use state::{AppState, Notice};

/// How often a running transfer is polled for events and conflicts.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

pub fn main() -> iced::Result {
    if let Err(e) = init_logging(2, LogFormat::Text) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    GuiApp::run(Settings {
        window: window::Settings {
            size: iced::Size::new(860.0, 620.0),
            // Closing goes through `Message::CloseRequested` so the
            // destination is saved first.
            exit_on_close_request: false,
            ..window::Settings::default()
        },
        ..Settings::default()
    })
}

#[derive(Debug, Clone)]
pub enum Message {
    Tick,
    FileDropped(PathBuf),
    AddFilesPressed,
    ClearFilesPressed,
    DestinationChanged(String),
    BrowseDestinationPressed,
    ModeSelected(DisplayMode),
    StartPressed,
    ConflictOutcomeSelected(ConflictOutcome),
    ApplyToAllToggled(bool),
    ConflictConfirmed,
    CloseRequested(window::Id),
}

pub struct GuiApp {
    state: AppState,
}

impl Application for GuiApp {
    type Executor = executor::Default;
    type Message = Message;
    type Theme = Theme;
    type Flags = ();

    fn new(_flags: ()) -> (Self, Command<Message>) {
        let app = GuiApp {
            state: AppState::new(ConfigStore::at_default_location()),
        };
        (app, Command::none())
    }

    fn title(&self) -> String {
        "MediaSort".to_string()
    }

    fn theme(&self) -> Theme {
        Theme::Dark
    }

    fn update(&mut self, message: Message) -> Command<Message> {
        match message {
            Message::Tick => self.state.tick(),
            Message::FileDropped(path) => self.state.add_files(Some(path)),
            Message::AddFilesPressed => {
                if let Some(paths) = rfd::FileDialog::new().pick_files() {
                    self.state.add_files(paths);
                }
            }
            Message::ClearFilesPressed => self.state.clear_files(),
            Message::DestinationChanged(destination) => self.state.set_destination(destination),
            Message::BrowseDestinationPressed => {
                if let Some(folder) = rfd::FileDialog::new().pick_folder() {
                    self.state.browse_destination(folder);
                }
            }
            Message::ModeSelected(mode) => self.state.set_mode(mode),
            Message::StartPressed => self.state.start(),
            Message::ConflictOutcomeSelected(outcome) => {
                self.state.select_conflict_outcome(outcome)
            }
            Message::ApplyToAllToggled(apply) => self.state.toggle_apply_to_all(apply),
            Message::ConflictConfirmed => self.state.confirm_conflict(),
            Message::CloseRequested(id) => {
                self.state.save_config();
                return window::close(id);
            }
        }
        Command::none()
    }

    fn subscription(&self) -> Subscription<Message> {
        let window_events = event::listen_with(|event, _status| match event {
            Event::Window(_, window::Event::FileDropped(path)) => Some(Message::FileDropped(path)),
            Event::Window(id, window::Event::CloseRequested) => Some(Message::CloseRequested(id)),
            _ => None,
        });

        if self.state.is_running() {
            Subscription::batch(vec![
                window_events,
                iced::time::every(POLL_INTERVAL).map(|_| Message::Tick),
            ])
        } else {
            window_events
        }
    }

    fn view(&self) -> Element<Message> {
        // A pending conflict takes over the window until it is answered.
        if let Some(prompt) = &self.state.conflict {
            return conflict::view(prompt);
        }

        let running = self.state.is_running();

        let mode_buttons: Vec<Element<Message>> = DisplayMode::ALL
            .into_iter()
            .map(|mode| {
                let style = if mode == self.state.mode {
                    theme::Button::Primary
                } else {
                    theme::Button::Secondary
                };
                button(text(mode.to_string()))
                    .style(style)
                    .padding([6, 18])
                    .on_press_maybe((!running).then_some(Message::ModeSelected(mode)))
                    .into()
            })
            .collect();
        let mode_toggle = Row::with_children(mode_buttons).spacing(4);

        let header = row![
            column![
                text("MediaSort").size(26),
                text("Drop files here, pick a folder, sort them.").size(14),
            ]
            .width(Length::Fill),
            mode_toggle,
        ]
        .align_items(Alignment::Center);

        let file_list: Element<Message> = if self.state.listed.is_empty() {
            container(text("Drag files into the window or add them below"))
                .width(Length::Fill)
                .height(Length::Fill)
                .center_x()
                .center_y()
                .into()
        } else {
            let names: Vec<Element<Message>> =
                self.state.listed.iter().map(|name| text(name).into()).collect();
            scrollable(Column::with_children(names).spacing(4).width(Length::Fill))
                .height(Length::Fill)
                .into()
        };

        let files_panel = column![
            text("FILES").size(16),
            file_list,
            row![
                button("Add files...").on_press_maybe((!running).then_some(Message::AddFilesPressed)),
                button("Clear").on_press_maybe((!running).then_some(Message::ClearFilesPressed)),
            ]
            .spacing(10),
        ]
        .spacing(10)
        .width(Length::FillPortion(3));

        let mut destination_input = text_input("Choose a destination folder", &self.state.destination);
        if !running {
            destination_input = destination_input.on_input(Message::DestinationChanged);
        }

        let destination_panel = column![
            text("DESTINATION").size(16),
            destination_input,
            button("BROWSE").on_press_maybe((!running).then_some(Message::BrowseDestinationPressed)),
        ]
        .spacing(10)
        .width(Length::FillPortion(2));

        let status: Element<Message> = match &self.state.notice {
            Some(Notice::Info(message)) => text(message).into(),
            Some(Notice::Warning(message)) => text(format!("WARNING: {}", message)).into(),
            Some(Notice::Error(message)) => text(format!("ERROR: {}", message)).into(),
            None if running => text(format!("Working on {}", self.state.current_file_name)).into(),
            None => text("").into(),
        };

        let start_button = button(text(self.state.mode.action_label()))
            .padding([10, 28])
            .on_press_maybe((!running).then_some(Message::StartPressed));

        column![
            header,
            row![files_panel, destination_panel].spacing(20).height(Length::Fill),
            progress_bar(0.0..=1.0, self.state.progress).height(Length::Fixed(10.0)),
            row![container(status).width(Length::Fill), start_button].align_items(Alignment::Center),
        ]
        .spacing(16)
        .padding(20)
        .into()
    }
}
