#[cfg(not(target_arch = "wasm32"))]
use std::time::Duration;

use log::debug;
#[cfg(not(target_arch = "wasm32"))]
use log::info;

use crate::board::{LogicalBoard, VisualBoard};
use crate::config::PageConfig;
use crate::error::HarnessResult;
use crate::host::HostPage;
use crate::message::HostMessage;
#[cfg(not(target_arch = "wasm32"))]
use crate::sync;
use crate::sync::ReadinessWait;
use crate::types::{PageLink, Placement, Square, TurnFlags};
use crate::{injector, reader};

/// Window property set on the current document before leaving it; its
/// absence marks the replacement document.
pub const PAGE_MARKER: &str = "__checkersHarnessPage";

/// One test's view of one host page.
///
/// Every action takes `&mut self`: a session is strictly sequential, and
/// independent sessions each own their own host.
pub struct CheckersPage<H: HostPage> {
    host: H,
    config: PageConfig,
}

impl<H: HostPage> CheckersPage<H> {
    pub fn new(host: H, config: PageConfig) -> Self {
        Self { host, config }
    }

    pub fn with_default_config(host: H) -> Self {
        Self::new(host, PageConfig::default())
    }

    pub fn config(&self) -> &PageConfig {
        &self.config
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn into_host(self) -> H {
        self.host
    }

    /// Opens the configured page and waits for the host to initialize.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn navigate(&mut self) -> HarnessResult<()> {
        info!("navigating to {}", self.config.url);
        self.host.navigate(&self.config.url)?;
        sync::wait_until_loaded(&self.host, self.config.ready_timeout, self.config.poll_interval)
    }

    /// Follows the page's own restart link and waits until the old document
    /// is gone and the new one has initialized.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn restart(&mut self) -> HarnessResult<()> {
        info!("restarting game");
        self.host.mark_page(PAGE_MARKER)?;
        self.host.follow_link(PageLink::Restart)?;
        sync::wait_until_reloaded(
            &self.host,
            PAGE_MARKER,
            self.config.ready_timeout,
            self.config.poll_interval,
        )
    }

    pub fn rules_link_href(&self) -> HarnessResult<Option<String>> {
        self.host.link_href(PageLink::Rules)
    }

    pub fn read_logical_board(&self) -> HarnessResult<LogicalBoard> {
        reader::read_logical_board(&self.host)
    }

    pub fn read_visual_board(&self) -> HarnessResult<VisualBoard> {
        reader::read_visual_board(&self.host)
    }

    pub fn read_message(&self) -> HarnessResult<String> {
        reader::read_message(&self.host)
    }

    pub fn read_host_message(&self) -> HarnessResult<HostMessage> {
        reader::read_host_message(&self.host)
    }

    pub fn read_turn_flags(&self) -> HarnessResult<TurnFlags> {
        reader::read_turn_flags(&self.host)
    }

    pub fn set_board(&mut self, placements: &[Placement]) -> HarnessResult<()> {
        injector::set_board(&mut self.host, placements, &self.config.default_prompt)
    }

    pub fn reset_to_initial(&mut self) -> HarnessResult<()> {
        injector::reset_to_initial(&mut self.host, &self.config.default_prompt)
    }

    pub fn force_player_turn(&mut self) -> HarnessResult<()> {
        injector::force_player_turn(&mut self.host)
    }

    /// Waits with the configured timeout.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn wait_until_ready(&self) -> HarnessResult<()> {
        self.wait_until_ready_for(self.config.ready_timeout)
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn wait_until_ready_for(&self, timeout: Duration) -> HarnessResult<()> {
        sync::wait_until_ready(&self.host, timeout, self.config.poll_interval)
    }

    /// Starts a non-blocking wait with the configured timeout.
    pub fn begin_wait(&self) -> ReadinessWait {
        ReadinessWait::start(self.config.ready_timeout)
    }

    pub fn poll_ready(&self, wait: &ReadinessWait) -> HarnessResult<bool> {
        wait.poll(&self.host)
    }

    /// One raw click; whether it does anything is up to the host.
    pub fn click_square(&mut self, square: Square) -> HarnessResult<()> {
        debug!("click {square}");
        self.host.click_square(square)
    }
}
