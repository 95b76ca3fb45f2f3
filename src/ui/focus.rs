// Focus management for the form

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormFocus {
    #[default]
    InputPath,
    OutputPath,
    Ipd,
    ProcessButton,
    LogPane,
}

impl FormFocus {
    pub fn next(self) -> Self {
        match self {
            Self::InputPath => Self::OutputPath,
            Self::OutputPath => Self::Ipd,
            Self::Ipd => Self::ProcessButton,
            Self::ProcessButton => Self::LogPane,
            Self::LogPane => Self::InputPath,
        }
    }

    pub fn previous(self) -> Self {
        match self {
            Self::InputPath => Self::LogPane,
            Self::OutputPath => Self::InputPath,
            Self::Ipd => Self::OutputPath,
            Self::ProcessButton => Self::Ipd,
            Self::LogPane => Self::ProcessButton,
        }
    }

    /// Text fields take character input, so global hotkeys are off there
    pub fn is_text_field(self) -> bool {
        matches!(self, Self::InputPath | Self::OutputPath | Self::Ipd)
    }

    /// Fields that can open the file browser
    pub fn is_path_field(self) -> bool {
        matches!(self, Self::InputPath | Self::OutputPath)
    }
}
