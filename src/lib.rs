use wasm_bindgen::prelude::*;

pub mod bindings;
pub mod board;
pub mod config;
pub mod dom;
pub mod error;
pub mod host;
pub mod injector;
pub mod message;
pub mod protocol;
pub mod reader;
pub mod session;
pub mod sync;
pub mod types;

#[cfg(test)]
mod testing;

pub use board::{LogicalBoard, SquareLabel, VisualBoard};
pub use config::PageConfig;
pub use error::{HarnessError, HarnessResult};
pub use host::{BoardInjection, HostPage};
pub use message::HostMessage;
pub use protocol::MoveInProgress;
pub use session::CheckersPage;
pub use types::{PieceState, Placement, Square, TurnFlags};

#[wasm_bindgen]
pub fn harness_ready() -> bool {
    true
}
