use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrainerError {
    #[error("Please enter a name for your range.")]
    EmptyName,

    #[error("Please select at least one hand.")]
    EmptySelection,

    #[error("Preset \"{0}\" not found")]
    UnknownPreset(String),

    #[error("No saved range named \"{0}\"")]
    UnknownSavedRange(String),

    #[error("Invalid hand notation: {0}")]
    InvalidHandNotation(String),

    #[error("Invalid action: {0}")]
    InvalidAction(String),

    #[error("Failed to save range. Storage may be full or disabled: {0}")]
    Storage(String),

    #[error("Not in train mode")]
    NotTraining,

    #[error("No spot drill is running")]
    DrillNotRunning,

    #[error("Spot drill is not finished yet")]
    DrillNotFinished,

    #[error("Waiting for the next hand to be revealed")]
    AwaitingReveal,

    #[error("Expected an answer for {expected}, got {got}")]
    WrongHand { expected: String, got: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type TrainerResult<T> = Result<T, TrainerError>;
