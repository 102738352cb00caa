use log::debug;

use crate::board::LogicalBoard;
use crate::error::HarnessResult;
use crate::host::{BoardInjection, HostPage};
use crate::types::{Placement, TurnFlags};

/// Replaces the whole board, sentinel border included, redraws every square,
/// and puts the host back into "player's turn, nothing selected".
/// Later placements on the same square win.
pub fn set_board<H: HostPage + ?Sized>(
    host: &mut H,
    placements: &[Placement],
    prompt: &str,
) -> HarnessResult<()> {
    debug!("injecting board with {} placements", placements.len());
    inject(host, LogicalBoard::from_placements(placements), prompt)
}

pub fn reset_to_initial<H: HostPage + ?Sized>(host: &mut H, prompt: &str) -> HarnessResult<()> {
    debug!("injecting initial position");
    inject(host, LogicalBoard::initial(), prompt)
}

/// Hands the turn straight back to the player without touching the board.
pub fn force_player_turn<H: HostPage + ?Sized>(host: &mut H) -> HarnessResult<()> {
    debug!("forcing player's turn");
    host.write_flags(TurnFlags::player_to_move())
}

fn inject<H: HostPage + ?Sized>(
    host: &mut H,
    board: LogicalBoard,
    prompt: &str,
) -> HarnessResult<()> {
    host.apply(&BoardInjection::new(board, prompt))
}
