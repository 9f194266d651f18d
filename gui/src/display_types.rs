use std::fmt;
use engine::Mode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayMode {
    #[default]
    Move,
    Copy,
}

impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayMode::Move => write!(f, "MOVE"),
            DisplayMode::Copy => write!(f, "COPY"),
        }
    }
}

impl DisplayMode {
    pub const ALL: [DisplayMode; 2] = [DisplayMode::Move, DisplayMode::Copy];

    pub fn from_engine_mode(mode: Mode) -> Self {
        match mode {
            Mode::Move => DisplayMode::Move,
            Mode::Copy => DisplayMode::Copy,
        }
    }

    pub fn to_engine_mode(&self) -> Mode {
        match self {
            DisplayMode::Move => Mode::Move,
            DisplayMode::Copy => Mode::Copy,
        }
    }

    /// Label of the start button.
    pub fn action_label(&self) -> &'static str {
        match self {
            DisplayMode::Move => "MOVE FILES",
            DisplayMode::Copy => "COPY FILES",
        }
    }
}
