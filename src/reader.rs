use log::warn;

use crate::board::{LogicalBoard, SquareLabel, VisualBoard};
use crate::error::{HarnessError, HarnessResult};
use crate::host::HostPage;
use crate::message::HostMessage;
use crate::types::{Square, TurnFlags};

/// Fails with `HostStateUnavailable` before the host has built its board.
pub fn read_logical_board<H: HostPage + ?Sized>(host: &H) -> HarnessResult<LogicalBoard> {
    let codes = host
        .read_board()?
        .ok_or_else(|| HarnessError::unavailable("board"))?;
    LogicalBoard::from_codes(&codes)
}

/// Unrecognized or missing images become [`SquareLabel::Unknown`].
pub fn read_visual_board<H: HostPage + ?Sized>(host: &H) -> HarnessResult<VisualBoard> {
    VisualBoard::try_from_fn(|square| Ok(label_for(square, host.square_image(square)?)))
}

/// Empty when the message element is missing.
pub fn read_message<H: HostPage + ?Sized>(host: &H) -> HarnessResult<String> {
    Ok(host.message_text()?.unwrap_or_default())
}

pub fn read_host_message<H: HostPage + ?Sized>(host: &H) -> HarnessResult<HostMessage> {
    read_message(host).map(|text| HostMessage::classify(&text))
}

pub fn read_turn_flags<H: HostPage + ?Sized>(host: &H) -> HarnessResult<TurnFlags> {
    host.read_flags()?
        .ok_or_else(|| HarnessError::unavailable("turn flags"))
}

fn label_for(square: Square, src: Option<String>) -> SquareLabel {
    let Some(src) = src else {
        warn!("no image element for square {square}");
        return SquareLabel::Unknown;
    };
    let label = SquareLabel::from_image(&src);
    if label == SquareLabel::Unknown {
        warn!("unrecognized image {src:?} on square {square}");
    }
    label
}
