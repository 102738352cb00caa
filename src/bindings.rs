use std::time::Duration;

use js_sys::{Function, Promise, Reflect};
use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::config::PageConfig;
use crate::dom::DomHost;
use crate::error::HarnessError;
use crate::host::HostPage;
use crate::session::CheckersPage;
use crate::sync::ReadinessWait;
use crate::types::{Placement, Square};

#[wasm_bindgen]
pub struct HarnessSession {
    page: CheckersPage<DomHost>,
    active_move: Option<Square>,
}

#[wasm_bindgen]
impl HarnessSession {
    /// `config` may be `undefined` or any subset of [`PageConfig`]'s fields.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<HarnessSession, JsError> {
        let config: PageConfig = if config.is_undefined() || config.is_null() {
            PageConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)?
        };
        let host = DomHost::new(&config);
        Ok(Self {
            page: CheckersPage::new(host, config),
            active_move: None,
        })
    }

    #[wasm_bindgen(js_name = setBoard)]
    pub fn set_board(&mut self, placements: JsValue) -> Result<(), JsError> {
        let placements: Vec<Placement> = serde_wasm_bindgen::from_value(placements)?;
        self.active_move = None;
        self.page.set_board(&placements).map_err(to_js)
    }

    #[wasm_bindgen(js_name = resetToInitial)]
    pub fn reset_to_initial(&mut self) -> Result<(), JsError> {
        self.active_move = None;
        self.page.reset_to_initial().map_err(to_js)
    }

    #[wasm_bindgen(js_name = forcePlayerTurn)]
    pub fn force_player_turn(&mut self) -> Result<(), JsError> {
        self.page.force_player_turn().map_err(to_js)
    }

    #[wasm_bindgen(js_name = logicalBoard)]
    pub fn logical_board(&self) -> Result<JsValue, JsError> {
        to_value(&self.page.read_logical_board().map_err(to_js)?)
    }

    #[wasm_bindgen(js_name = visualBoard)]
    pub fn visual_board(&self) -> Result<JsValue, JsError> {
        to_value(&self.page.read_visual_board().map_err(to_js)?)
    }

    pub fn message(&self) -> Result<String, JsError> {
        self.page.read_message().map_err(to_js)
    }

    /// `{ kind, text? }`, see [`HostMessage`](crate::message::HostMessage).
    #[wasm_bindgen(js_name = hostMessage)]
    pub fn host_message(&self) -> Result<JsValue, JsError> {
        to_value(&self.page.read_host_message().map_err(to_js)?)
    }

    #[wasm_bindgen(js_name = turnFlags)]
    pub fn turn_flags(&self) -> Result<JsValue, JsError> {
        to_value(&self.page.read_turn_flags().map_err(to_js)?)
    }

    #[wasm_bindgen(js_name = clickSquare)]
    pub fn click_square(&mut self, file: u8, rank: u8) -> Result<(), JsError> {
        let square = square(file, rank)?;
        self.page.click_square(square).map_err(to_js)
    }

    #[wasm_bindgen(js_name = selectPiece)]
    pub fn select_piece(&mut self, file: u8, rank: u8) -> Result<(), JsError> {
        let square = square(file, rank)?;
        self.page.select_piece(square).map_err(to_js)
    }

    #[wasm_bindgen(js_name = movePiece)]
    pub fn move_piece(
        &mut self,
        from_file: u8,
        from_rank: u8,
        to_file: u8,
        to_rank: u8,
    ) -> Result<(), JsError> {
        let from = square(from_file, from_rank)?;
        let to = square(to_file, to_rank)?;
        self.active_move = None;
        self.page.move_piece(from, to).map_err(to_js)
    }

    #[wasm_bindgen(js_name = startMove)]
    pub fn start_move(&mut self, file: u8, rank: u8) -> Result<(), JsError> {
        let from = square(file, rank)?;
        let mv = self.page.start_move(from).map_err(to_js)?;
        self.active_move = Some(mv.current());
        Ok(())
    }

    /// Continues the move begun by `startMove`.
    #[wasm_bindgen(js_name = jumpTo)]
    pub fn jump_to(&mut self, file: u8, rank: u8) -> Result<(), JsError> {
        let to = square(file, rank)?;
        let current = self
            .active_move
            .ok_or_else(|| JsError::new("jumpTo called without startMove"))?;
        let mut mv = self.page.resume_move(current);
        mv.jump_to(to).map_err(to_js)?;
        self.active_move = Some(mv.current());
        Ok(())
    }

    /// Resolves once the host is ready for input and rejects with the timeout
    /// error otherwise. Polls from `setTimeout`, so the page keeps running.
    #[wasm_bindgen(js_name = waitUntilReady)]
    pub fn wait_until_ready(&self, timeout_ms: Option<u32>) -> Promise {
        let config = self.page.config();
        let timeout = timeout_ms.map_or(config.ready_timeout, |ms| {
            Duration::from_millis(ms.into())
        });
        let interval = config.poll_interval;
        let mut pending = Some((self.page.host().clone(), ReadinessWait::start(timeout)));
        Promise::new(&mut |resolve, reject| {
            if let Some((host, wait)) = pending.take() {
                poll_until_settled(host, wait, interval, resolve, reject);
            }
        })
    }

    /// Starts a readiness wait; JS polls it from its own timer so the page
    /// keeps running in between.
    #[wasm_bindgen(js_name = beginWait)]
    pub fn begin_wait(&self, timeout_ms: Option<u32>) -> ReadyWaiter {
        let wait = match timeout_ms {
            Some(ms) => ReadinessWait::start(Duration::from_millis(ms.into())),
            None => self.page.begin_wait(),
        };
        ReadyWaiter { wait }
    }

    #[wasm_bindgen(js_name = rulesLinkHref)]
    pub fn rules_link_href(&self) -> Result<Option<String>, JsError> {
        self.page.rules_link_href().map_err(to_js)
    }
}

#[wasm_bindgen]
pub struct ReadyWaiter {
    wait: ReadinessWait,
}

#[wasm_bindgen]
impl ReadyWaiter {
    /// `true` when ready, `false` while pending; throws on timeout.
    pub fn poll(&self, session: &HarnessSession) -> Result<bool, JsError> {
        session.page.poll_ready(&self.wait).map_err(to_js)
    }

    #[wasm_bindgen(js_name = remainingMs)]
    pub fn remaining_ms(&self) -> f64 {
        self.wait.remaining().as_secs_f64() * 1000.0
    }
}

/// Polls once and either settles the promise or schedules the next poll.
fn poll_until_settled<H: HostPage + 'static>(
    host: H,
    wait: ReadinessWait,
    interval: Duration,
    resolve: Function,
    reject: Function,
) {
    let outcome = match wait.poll(&host) {
        Ok(true) => resolve.call0(&JsValue::UNDEFINED),
        Ok(false) => {
            let delay = interval.min(wait.remaining());
            let reject_later = reject.clone();
            let next = Closure::once_into_js(move || {
                poll_until_settled(host, wait, interval, resolve, reject_later)
            });
            set_timeout(&next, delay)
        }
        Err(err) => reject.call1(&JsValue::UNDEFINED, &to_js(err).into()),
    };
    if let Err(err) = outcome {
        let _ = reject.call1(&JsValue::UNDEFINED, &err);
    }
}

fn set_timeout(callback: &JsValue, delay: Duration) -> Result<JsValue, JsValue> {
    let global: JsValue = js_sys::global().into();
    let set_timeout: Function =
        Reflect::get(&global, &JsValue::from_str("setTimeout"))?.dyn_into()?;
    set_timeout.call2(&global, callback, &JsValue::from_f64(delay.as_secs_f64() * 1000.0))
}

fn square(file: u8, rank: u8) -> Result<Square, JsError> {
    Square::new(file, rank).map_err(to_js)
}

fn to_js(err: HarnessError) -> JsError {
    JsError::new(&err.to_string())
}

fn to_value<T: Serialize>(value: &T) -> Result<JsValue, JsError> {
    Ok(serde_wasm_bindgen::to_value(value)?)
}
