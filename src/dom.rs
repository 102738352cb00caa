use js_sys::{Array, Function, Reflect};
use log::{debug, warn};
use wasm_bindgen::{JsCast, JsValue};

use crate::board::{FIRST_PADDED, LAST_PADDED, PADDED_SIZE};
use crate::config::{HostGlobals, PageConfig};
use crate::error::{HarnessError, HarnessResult};
use crate::host::{BoardInjection, HostPage};
use crate::types::{PageLink, Square, TurnFlags};

/// Host substrate for a harness compiled to WebAssembly and loaded into the
/// page. JS runs one task at a time, so a single `apply` is atomic from the
/// page's point of view.
#[derive(Debug, Clone)]
pub struct DomHost {
    globals: HostGlobals,
    message_id: String,
    restart_selector: String,
    rules_selector: String,
}

impl DomHost {
    pub fn new(config: &PageConfig) -> Self {
        Self {
            globals: config.globals.clone(),
            message_id: config.message_id.clone(),
            restart_selector: config.restart_selector.clone(),
            rules_selector: config.rules_selector.clone(),
        }
    }

    fn window(&self) -> JsValue {
        js_sys::global().into()
    }

    fn global(&self, name: &str) -> HarnessResult<Option<JsValue>> {
        get(&self.window(), name).map(present)
    }

    fn set_global(&self, name: &str, value: &JsValue) -> HarnessResult<()> {
        set(&self.window(), &JsValue::from_str(name), value)
    }

    fn document(&self) -> HarnessResult<JsValue> {
        self.global("document")?
            .ok_or_else(|| HarnessError::unavailable("document"))
    }

    fn square_element(&self, square: Square) -> HarnessResult<Option<JsValue>> {
        let name = JsValue::from_str(&square.element_name());
        let elements = call(&self.document()?, "getElementsByName", &[name])?;
        Reflect::get_u32(&elements, 0).map(present).map_err(js_error)
    }

    fn message_element(&self) -> HarnessResult<Option<JsValue>> {
        let id = JsValue::from_str(&self.message_id);
        call(&self.document()?, "getElementById", &[id]).map(present)
    }

    fn link_element(&self, link: PageLink) -> HarnessResult<Option<JsValue>> {
        let selector = match link {
            PageLink::Restart => &self.restart_selector,
            PageLink::Rules => &self.rules_selector,
        };
        call(&self.document()?, "querySelector", &[JsValue::from_str(selector)]).map(present)
    }

    fn flag(&self, name: &str) -> HarnessResult<bool> {
        Ok(self.global(name)?.is_some_and(|value| value.is_truthy()))
    }

    fn write_flag_globals(&self, flags: TurnFlags) -> HarnessResult<()> {
        let globals = &self.globals;
        self.set_global(&globals.player_turn, &JsValue::from_bool(flags.player_turn))?;
        self.set_global(&globals.host_busy, &JsValue::from_bool(flags.host_busy))?;
        self.set_global(&globals.selection, &JsValue::from_bool(flags.selection_active))?;
        self.set_global(
            &globals.continuation,
            &JsValue::from_bool(flags.continuation_pending),
        )?;
        self.set_global(&globals.game_over, &JsValue::from_bool(flags.game_over))
    }

    fn draw(&self, injection: &BoardInjection) -> HarnessResult<()> {
        let draw = self
            .global(&self.globals.draw)?
            .and_then(|value| value.dyn_into::<Function>().ok());
        for (square, image) in injection.images() {
            let file = JsValue::from(square.file());
            let rank = JsValue::from(square.rank());
            let image = JsValue::from_str(image);
            match &draw {
                Some(draw) => {
                    draw.call3(&self.window(), &file, &rank, &image)
                        .map_err(js_error)?;
                }
                None => {
                    if let Some(element) = self.square_element(square)? {
                        call(&element, "setAttribute", &[JsValue::from_str("src"), image])?;
                    }
                }
            }
        }
        Ok(())
    }
}

impl HostPage for DomHost {
    /// A harness living inside the page cannot survive leaving it, so this
    /// only accepts the page it is already on.
    fn navigate(&mut self, url: &str) -> HarnessResult<()> {
        let location = self
            .global("location")?
            .ok_or_else(|| HarnessError::unavailable("location"))?;
        let href = get(&location, "href")?.as_string().unwrap_or_default();
        if href.trim_end_matches('/') == url.trim_end_matches('/') {
            return Ok(());
        }
        Err(HarnessError::Host(format!(
            "in-page harness is on {href} and cannot navigate to {url}"
        )))
    }

    fn read_board(&self) -> HarnessResult<Option<Vec<Vec<f64>>>> {
        let Some(board) = self.global(&self.globals.board)? else {
            return Ok(None);
        };
        let mut codes = Vec::with_capacity(PADDED_SIZE);
        for file in FIRST_PADDED..=LAST_PADDED {
            let column = present(get_index(&board, file)?);
            let mut cells = Vec::with_capacity(PADDED_SIZE);
            for rank in FIRST_PADDED..=LAST_PADDED {
                let cell = match &column {
                    Some(column) => cell_code(&get_index(column, rank)?),
                    None => 0.0,
                };
                cells.push(cell);
            }
            codes.push(cells);
        }
        Ok(Some(codes))
    }

    fn square_image(&self, square: Square) -> HarnessResult<Option<String>> {
        let Some(element) = self.square_element(square)? else {
            return Ok(None);
        };
        Ok(call(&element, "getAttribute", &[JsValue::from_str("src")])?.as_string())
    }

    fn message_text(&self) -> HarnessResult<Option<String>> {
        let Some(element) = self.message_element()? else {
            return Ok(None);
        };
        Ok(get(&element, "textContent")?.as_string())
    }

    fn read_flags(&self) -> HarnessResult<Option<TurnFlags>> {
        if self.global(&self.globals.player_turn)?.is_none() {
            return Ok(None);
        }
        Ok(Some(TurnFlags {
            player_turn: self.flag(&self.globals.player_turn)?,
            host_busy: self.flag(&self.globals.host_busy)?,
            selection_active: self.flag(&self.globals.selection)?,
            continuation_pending: self.flag(&self.globals.continuation)?,
            game_over: self.flag(&self.globals.game_over)?,
        }))
    }

    fn click_square(&mut self, square: Square) -> HarnessResult<()> {
        match self.square_element(square)? {
            Some(element) => call(&element, "click", &[]).map(drop),
            None => {
                debug!("no element for {square}, click dropped");
                Ok(())
            }
        }
    }

    fn apply(&mut self, injection: &BoardInjection) -> HarnessResult<()> {
        let board = self
            .global(&self.globals.board)?
            .ok_or_else(|| HarnessError::unavailable("board"))?;
        for file in FIRST_PADDED..=LAST_PADDED {
            let column = match present(get_index(&board, file)?) {
                Some(column) if column.is_object() => column,
                _ => {
                    let column: JsValue = Array::new().into();
                    set(&board, &JsValue::from(file), &column)?;
                    column
                }
            };
            for rank in FIRST_PADDED..=LAST_PADDED {
                let code = injection
                    .board
                    .get_padded(file, rank)
                    .map_or(0.0, |piece| piece.code());
                set(&column, &JsValue::from(rank), &JsValue::from_f64(code))?;
            }
        }
        self.draw(injection)?;
        self.write_flag_globals(injection.flags)?;
        match self.message_element()? {
            Some(element) => set(
                &element,
                &JsValue::from_str("textContent"),
                &JsValue::from_str(&injection.message),
            )?,
            None => warn!("no #{} element, message not reset", self.message_id),
        }
        Ok(())
    }

    fn write_flags(&mut self, flags: TurnFlags) -> HarnessResult<()> {
        self.write_flag_globals(flags)
    }

    fn follow_link(&mut self, link: PageLink) -> HarnessResult<()> {
        let element = self
            .link_element(link)?
            .ok_or_else(|| HarnessError::Host(format!("no element for {link:?} link")))?;
        call(&element, "click", &[]).map(drop)
    }

    fn link_href(&self, link: PageLink) -> HarnessResult<Option<String>> {
        let Some(element) = self.link_element(link)? else {
            return Ok(None);
        };
        Ok(call(&element, "getAttribute", &[JsValue::from_str("href")])?.as_string())
    }

    fn mark_page(&mut self, marker: &str) -> HarnessResult<()> {
        self.set_global(marker, &JsValue::TRUE)
    }

    fn page_marked(&self, marker: &str) -> HarnessResult<bool> {
        Ok(self.global(marker)?.is_some())
    }
}

/// Host cells that were never allocated are empty; anything else that is not
/// a number is kept as NaN so parsing rejects it.
fn cell_code(value: &JsValue) -> f64 {
    if value.is_undefined() || value.is_null() {
        0.0
    } else {
        value.as_f64().unwrap_or(f64::NAN)
    }
}

fn present(value: JsValue) -> Option<JsValue> {
    (!value.is_undefined() && !value.is_null()).then_some(value)
}

fn get(target: &JsValue, key: &str) -> HarnessResult<JsValue> {
    Reflect::get(target, &JsValue::from_str(key)).map_err(js_error)
}

/// Indexes like `target[index]`, negative indices included.
fn get_index(target: &JsValue, index: i32) -> HarnessResult<JsValue> {
    Reflect::get(target, &JsValue::from(index)).map_err(js_error)
}

fn set(target: &JsValue, key: &JsValue, value: &JsValue) -> HarnessResult<()> {
    Reflect::set(target, key, value).map(drop).map_err(js_error)
}

fn call(target: &JsValue, method: &str, args: &[JsValue]) -> HarnessResult<JsValue> {
    let function: Function = get(target, method)?
        .dyn_into()
        .map_err(|_| HarnessError::Host(format!("{method} is not a function")))?;
    let args: Array = args.iter().collect();
    Reflect::apply(&function, target, &args).map_err(js_error)
}

fn js_error(err: JsValue) -> HarnessError {
    let text = err
        .as_string()
        .or_else(|| {
            err.dyn_ref::<js_sys::Error>()
                .map(|e| String::from(e.message()))
        })
        .unwrap_or_else(|| format!("{err:?}"));
    HarnessError::Host(text)
}
