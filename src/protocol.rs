use log::debug;

use crate::error::HarnessResult;
use crate::host::HostPage;
use crate::session::CheckersPage;
use crate::types::Square;

impl<H: HostPage> CheckersPage<H> {
    /// Selects, deselects, or switches the selection. The host resolves this
    /// synchronously, so there is nothing to wait for.
    pub fn select_piece(&mut self, square: Square) -> HarnessResult<()> {
        self.click_square(square)
    }

    /// Clicks `from` then `to`. Callers that need the settled result follow
    /// up with [`wait_until_ready`](CheckersPage::wait_until_ready).
    pub fn move_piece(&mut self, from: Square, to: Square) -> HarnessResult<()> {
        debug!("move {from} -> {to}");
        self.click_square(from)?;
        self.click_square(to)
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn move_and_wait(&mut self, from: Square, to: Square) -> HarnessResult<()> {
        self.move_piece(from, to)?;
        self.wait_until_ready()
    }

    /// Selects `from` and returns a token for the jumps that follow.
    pub fn start_move(&mut self, from: Square) -> HarnessResult<MoveInProgress<'_, H>> {
        debug!("start move at {from}");
        self.click_square(from)?;
        Ok(self.resume_move(from))
    }

    /// A token for a move whose piece already sits on `current`, without
    /// clicking anything.
    pub fn resume_move(&mut self, current: Square) -> MoveInProgress<'_, H> {
        MoveInProgress {
            page: self,
            current,
        }
    }

    /// Starts at `from` and lands on each square of `path` in turn, waiting
    /// for the host to settle after every landing.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn jump_sequence(&mut self, from: Square, path: &[Square]) -> HarnessResult<()> {
        let mut mv = self.start_move(from)?;
        for &to in path {
            mv.jump_to_and_wait(to)?;
        }
        Ok(())
    }
}

/// A piece selected for what may become a multi-jump.
///
/// Holds the session borrowed and no board state of its own; drop it to end
/// the move.
pub struct MoveInProgress<'a, H: HostPage> {
    page: &'a mut CheckersPage<H>,
    current: Square,
}

impl<H: HostPage> MoveInProgress<'_, H> {
    /// The square most recently clicked for this move.
    pub fn current(&self) -> Square {
        self.current
    }

    /// Clicks the landing square. Whether a continuation is legal or required
    /// is the host's business.
    pub fn jump_to(&mut self, to: Square) -> HarnessResult<()> {
        debug!("jump {} -> {to}", self.current);
        self.page.click_square(to)?;
        self.current = to;
        Ok(())
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn jump_to_and_wait(&mut self, to: Square) -> HarnessResult<()> {
        self.jump_to(to)?;
        self.page.wait_until_ready()
    }

    /// Read access to the page between jumps.
    pub fn page(&self) -> &CheckersPage<H> {
        self.page
    }
}
