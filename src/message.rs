use serde::Serialize;

/// Status bar text, sorted into the turn phases the host reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "text", rename_all = "camelCase")]
pub enum HostMessage {
    /// No message element, or an empty one.
    Absent,
    /// "Select an orange piece to move."
    AwaitingSelection,
    /// "Make a move."
    MakeAMove,
    /// A capture landed and another jump is required.
    ContinuationPending,
    /// The click did not land on one of the player's pieces.
    WrongSquare,
    #[serde(rename_all = "camelCase")]
    GameOver { player_won: bool },
    Other(String),
}

impl HostMessage {
    pub fn classify(text: &str) -> Self {
        let text = text.trim();
        if text.is_empty() {
            HostMessage::Absent
        } else if text.contains("double jump") {
            HostMessage::ContinuationPending
        } else if text.contains("Game over") {
            HostMessage::GameOver {
                player_won: !text.contains("lose"),
            }
        } else if text.contains("Click on your orange piece") {
            HostMessage::WrongSquare
        } else if text.starts_with("Select an orange piece") {
            HostMessage::AwaitingSelection
        } else if text.starts_with("Make a move") {
            HostMessage::MakeAMove
        } else {
            HostMessage::Other(text.to_string())
        }
    }

    pub fn is_continuation_pending(&self) -> bool {
        matches!(self, HostMessage::ContinuationPending)
    }

    pub fn is_game_over(&self) -> bool {
        matches!(self, HostMessage::GameOver { .. })
    }
}
