use crate::models::chat::HistoryTurn;

/// The last `limit` turns, oldest first.
pub fn recent_turns(history: &[HistoryTurn], limit: usize) -> &[HistoryTurn] {
    &history[history.len().saturating_sub(limit)..]
}
