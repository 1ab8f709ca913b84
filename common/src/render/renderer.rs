//! Diff-based page renderer.
//!
//! A frame is either a full redraw (page or connection change, first frame,
//! or a different DTC list while the DTC page is open) or a set of targeted
//! repaints of whatever changed since the previous frame.

use embedded_hal_async::delay::DelayNs;

use super::canvas::DrawPrimitives;
use super::frame::{Field, FieldSet, RenderFrameState, StatusBadge};
use super::pacing::PacedCanvas;
use super::widgets;
use crate::config::layout::RECONNECT_DOTS;
use crate::log_buffer::recent_logs;
use crate::state::{Page, ViewState, is_enabled};
use crate::store::TelemetryStore;

/// What a frame repainted.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct FrameReport {
    pub full_redraw: bool,
    /// Dashboard values repainted this frame.
    pub fields: FieldSet,
}

pub struct Renderer {
    frame: RenderFrameState,
}

impl Renderer {
    pub const fn new() -> Self {
        Self {
            frame: RenderFrameState::new(),
        }
    }

    #[inline]
    pub fn force_full_redraw(&mut self) { self.frame.force_full_redraw(); }

    #[inline]
    pub const fn frame(&self) -> &RenderFrameState { &self.frame }

    /// Draw one frame of `view` from a store snapshot.
    pub async fn render<C: DrawPrimitives, D: DelayNs>(
        &mut self,
        canvas: &mut PacedCanvas<C, D>,
        store: &TelemetryStore,
        view: &ViewState,
    ) -> FrameReport {
        let connected = store.telemetry.connected;
        let full_redraw = self.frame.needs_full_redraw(store, view);
        if full_redraw {
            self.frame.begin_full_redraw(store, view);
            widgets::draw_chrome(canvas, view.page).await;
            if !connected {
                widgets::draw_connection_lost(canvas).await;
            } else {
                match view.page {
                    Page::Dashboard => {
                        for field in Field::ALL {
                            widgets::draw_metric_frame(canvas, field).await;
                        }
                    }
                    Page::Dtc => widgets::draw_dtc_page(canvas, store, view).await,
                    Page::Info => widgets::draw_info_captions(canvas),
                }
            }
        }

        let badge = StatusBadge::of(store);
        if self.frame.status != Some(badge) {
            widgets::draw_status(canvas, badge).await;
            self.frame.status = Some(badge);
        }

        let mut fields = FieldSet::EMPTY;
        if connected {
            match view.page {
                Page::Dashboard => fields = self.update_values(canvas, store).await,
                Page::Dtc => self.update_busy(canvas, store).await,
                Page::Info => self.update_info(canvas, store).await,
            }
        } else {
            self.update_lost(canvas, store).await;
        }

        self.update_highlight(canvas, store, view);

        FrameReport { full_redraw, fields }
    }

    async fn update_values<C: DrawPrimitives, D: DelayNs>(
        &mut self,
        canvas: &mut PacedCanvas<C, D>,
        store: &TelemetryStore,
    ) -> FieldSet {
        let mut changed = FieldSet::EMPTY;
        for field in Field::ALL {
            let text = field.format(&store.telemetry);
            if self.frame.value_changed(field, &text) {
                widgets::draw_metric_value(canvas, field, &text).await;
                self.frame.record_value(field, text);
                changed.insert(field);
            }
        }
        changed
    }

    async fn update_busy<C: DrawPrimitives, D: DelayNs>(
        &mut self,
        canvas: &mut PacedCanvas<C, D>,
        store: &TelemetryStore,
    ) {
        let busy = store.commands.is_busy();
        if self.frame.busy != Some(busy) {
            widgets::draw_dtc_busy(canvas, busy).await;
            self.frame.busy = Some(busy);
        }
    }

    async fn update_info<C: DrawPrimitives, D: DelayNs>(
        &mut self,
        canvas: &mut PacedCanvas<C, D>,
        store: &TelemetryStore,
    ) {
        if self.frame.vin.as_ref() != Some(&store.vin) {
            widgets::draw_vin(canvas, store.vin.as_deref()).await;
            self.frame.vin = Some(store.vin.clone());
        }

        let codes = store.dtcs_read.then(|| store.dtcs.len());
        if self.frame.info_codes != Some(codes) {
            widgets::draw_info_codes(canvas, codes).await;
            self.frame.info_codes = Some(codes);
        }

        // A busy buffer keeps the lines already on screen.
        if let Some((sequence, logs)) = recent_logs::<{ widgets::INFO_LOG_LINES }>() {
            if self.frame.log_sequence != Some(sequence) {
                widgets::draw_recent_logs(canvas, &logs).await;
                self.frame.log_sequence = Some(sequence);
            }
        }
    }

    async fn update_lost<C: DrawPrimitives, D: DelayNs>(
        &mut self,
        canvas: &mut PacedCanvas<C, D>,
        store: &TelemetryStore,
    ) {
        let error = &store.telemetry.last_error;
        if self.frame.error.as_ref() != Some(error) {
            widgets::draw_lost_error(canvas, error).await;
            self.frame.error = Some(error.clone());
        }
        let dots = self.frame.next_dots(RECONNECT_DOTS);
        widgets::draw_reconnect_dots(canvas, dots).await;
    }

    /// Move the highlight border. Content buttons are only framed while
    /// they are shown.
    fn update_highlight<C: DrawPrimitives, D: DelayNs>(
        &mut self,
        canvas: &mut PacedCanvas<C, D>,
        store: &TelemetryStore,
        view: &ViewState,
    ) {
        let button = view.highlighted;
        let visible = button.is_nav()
            || (store.telemetry.connected && is_enabled(button, view.page, store.dtcs.len(), view.scroll));
        let target = visible.then_some(button);
        if self.frame.highlight == target {
            return;
        }
        if let Some(previous) = self.frame.highlight {
            widgets::draw_button_border(canvas, previous, false);
        }
        if let Some(current) = target {
            widgets::draw_button_border(canvas, current, true);
        }
        self.frame.highlight = target;
    }
}

impl Default for Renderer {
    fn default() -> Self { Self::new() }
}

#[cfg(test)]
mod tests {
    use embassy_futures::block_on;
    use heapless::String;

    use super::*;
    use crate::colors::{GRAY, YELLOW};
    use crate::dtc::{DiagnosticCode, DtcCode};
    use crate::render::PacingPolicy;
    use crate::state::ButtonId;
    use crate::test_support::{Op, OpLog, RecordingCanvas, RecordingDelay};

    type RecordingPaced = PacedCanvas<RecordingCanvas, RecordingDelay>;

    fn paced(log: &OpLog) -> RecordingPaced { PacedCanvas::new(log.canvas(), log.delay(), PacingPolicy::DEFAULT) }

    fn live_store() -> TelemetryStore {
        let mut store = TelemetryStore::new();
        store.telemetry.connected = true;
        store.telemetry.rpm = 1726;
        store.telemetry.speed = 50;
        store.telemetry.coolant_temp = 83.0;
        store.telemetry.throttle_pct = 20.0;
        store.telemetry.battery_voltage = 14.2;
        store.telemetry.intake_temp = 23.0;
        store.dtcs_read = true;
        store
    }

    fn render(
        renderer: &mut Renderer,
        log: &OpLog,
        store: &TelemetryStore,
        view: &ViewState,
    ) -> FrameReport {
        let mut canvas = paced(log);
        block_on(renderer.render(&mut canvas, store, view))
    }

    fn assert_fills_paced(ops: &[Op]) {
        for (i, op) in ops.iter().enumerate() {
            if let Op::Fill(area, _) = op {
                assert!(area.size.width * area.size.height <= 10_000, "unstriped fill {:?}", area);
                assert!(matches!(ops.get(i + 1), Some(Op::Delay(_))), "fill without settle at {}", i);
            }
        }
    }

    #[test]
    fn test_first_frame_is_full_redraw() {
        let log = OpLog::new();
        let mut renderer = Renderer::new();
        let report = render(&mut renderer, &log, &live_store(), &ViewState::default());

        assert!(report.full_redraw);
        assert_eq!(report.fields.len(), Field::COUNT);
        let ops = log.ops();
        let screen_stripes = ops
            .iter()
            .filter(|op| matches!(op, Op::Fill(area, _) if area.size.width == 320 && area.size.height == 10))
            .count();
        assert_eq!(screen_stripes, 24);
        assert_fills_paced(&ops);
        assert!(log.texts().iter().any(|t| t == "1726"));
        assert!(log.texts().iter().any(|t| t == "14.2V"));
    }

    #[test]
    fn test_unchanged_frame_draws_nothing() {
        let log = OpLog::new();
        let mut renderer = Renderer::new();
        let store = live_store();
        render(&mut renderer, &log, &store, &ViewState::default());
        log.clear();

        let report = render(&mut renderer, &log, &store, &ViewState::default());
        assert!(!report.full_redraw);
        assert!(report.fields.is_empty());
        assert!(log.ops().is_empty());
    }

    #[test]
    fn test_single_value_change() {
        let log = OpLog::new();
        let mut renderer = Renderer::new();
        let mut store = live_store();
        render(&mut renderer, &log, &store, &ViewState::default());
        log.clear();

        store.telemetry.speed = 51;
        let report = render(&mut renderer, &log, &store, &ViewState::default());
        assert!(!report.full_redraw);
        assert_eq!(report.fields.iter().collect::<std::vec::Vec<_>>(), [Field::Speed]);
        assert_eq!(
            log.ops()[..2],
            [
                Op::Fill(Field::Speed.value_area(), crate::colors::PANEL),
                Op::Delay(20)
            ]
        );
        assert_eq!(log.texts(), ["51"]);
    }

    #[test]
    fn test_rounded_value_not_redrawn() {
        let log = OpLog::new();
        let mut renderer = Renderer::new();
        let mut store = live_store();
        store.telemetry.coolant_temp = 90.04;
        render(&mut renderer, &log, &store, &ViewState::default());
        log.clear();

        store.telemetry.coolant_temp = 90.01;
        let report = render(&mut renderer, &log, &store, &ViewState::default());
        assert!(report.fields.is_empty());
        assert!(log.ops().is_empty());
    }

    #[test]
    fn test_disconnect_shows_lost_box() {
        let log = OpLog::new();
        let mut renderer = Renderer::new();
        let mut store = live_store();
        render(&mut renderer, &log, &store, &ViewState::default());
        log.clear();

        store.telemetry.connected = false;
        store.telemetry.last_error = String::try_from("Connection lost (timeout)").unwrap();
        let report = render(&mut renderer, &log, &store, &ViewState::default());
        assert!(report.full_redraw);
        assert!(report.fields.is_empty());
        let texts = log.texts();
        assert!(texts.iter().any(|t| t == "Connection Lost"));
        assert!(texts.iter().any(|t| t == "Connection lost (timeout)"));
        assert!(!texts.iter().any(|t| t == "1726"));
        assert_fills_paced(&log.ops());

        // Next frame only animates the dots.
        log.clear();
        let report = render(&mut renderer, &log, &store, &ViewState::default());
        assert!(!report.full_redraw);
        assert_eq!(log.texts(), [".."]);
    }

    #[test]
    fn test_dtc_list_change_forces_full_redraw() {
        let log = OpLog::new();
        let mut renderer = Renderer::new();
        let mut store = live_store();
        let view = ViewState {
            page: Page::Dtc,
            highlighted: ButtonId::NavDtc,
            scroll: 0,
        };
        render(&mut renderer, &log, &store, &view);
        assert!(log.texts().iter().any(|t| t == "ALL CLEAR"));
        log.clear();

        store.dtcs.push(DiagnosticCode::from_code(DtcCode::from_raw(0x0300))).unwrap();
        let report = render(&mut renderer, &log, &store, &view);
        assert!(report.full_redraw);
        assert!(log.texts().iter().any(|t| t == "P0300"));
        assert!(log.texts().iter().any(|t| t == "CRIT"));
    }

    #[test]
    fn test_empty_first_read_shows_all_clear() {
        let log = OpLog::new();
        let mut renderer = Renderer::new();
        let mut store = live_store();
        store.dtcs_read = false;
        let view = ViewState {
            page: Page::Dtc,
            highlighted: ButtonId::NavDtc,
            scroll: 0,
        };
        render(&mut renderer, &log, &store, &view);
        assert!(log.texts().iter().any(|t| t == "Reading codes..."));
        log.clear();

        store.dtcs_read = true;
        let report = render(&mut renderer, &log, &store, &view);
        assert!(report.full_redraw);
        assert!(log.texts().iter().any(|t| t == "ALL CLEAR"));
        assert!(!log.texts().iter().any(|t| t == "Reading codes..."));
    }

    #[test]
    fn test_dtc_busy_marker() {
        let log = OpLog::new();
        let mut renderer = Renderer::new();
        let mut store = live_store();
        let view = ViewState {
            page: Page::Dtc,
            highlighted: ButtonId::DtcRefresh,
            scroll: 0,
        };
        render(&mut renderer, &log, &store, &view);
        log.clear();

        store.commands.request(crate::store::DtcCommand::Refresh).unwrap();
        let report = render(&mut renderer, &log, &store, &view);
        assert!(!report.full_redraw);
        assert_eq!(log.texts(), ["WORKING..."]);
    }

    #[test]
    fn test_busy_log_buffer_keeps_log_lines() {
        let log = OpLog::new();
        let mut renderer = Renderer::new();
        let store = live_store();
        let view = ViewState {
            page: Page::Info,
            highlighted: ButtonId::NavInfo,
            scroll: 0,
        };
        render(&mut renderer, &log, &store, &view);
        log.clear();

        let guard = loop {
            if let Ok(guard) = crate::log_buffer::LOG_BUFFER.try_lock() {
                break guard;
            }
            std::thread::yield_now();
        };
        let report = render(&mut renderer, &log, &store, &view);
        drop(guard);

        assert!(!report.full_redraw);
        assert!(log.ops().is_empty(), "{:?}", log.ops());
    }

    #[test]
    fn test_highlight_moves_without_fills() {
        let log = OpLog::new();
        let mut renderer = Renderer::new();
        let store = live_store();
        render(&mut renderer, &log, &store, &ViewState::default());
        log.clear();

        let view = ViewState {
            highlighted: ButtonId::NavInfo,
            ..ViewState::default()
        };
        render(&mut renderer, &log, &store, &view);
        let ops = log.ops();
        assert!(ops.iter().all(|op| matches!(op, Op::Outline(..))));
        assert_eq!(
            ops,
            [
                Op::Outline(ButtonId::NavDashboard.area(), GRAY),
                Op::Outline(crate::render::inset(ButtonId::NavDashboard.area(), 1), GRAY),
                Op::Outline(ButtonId::NavInfo.area(), YELLOW),
                Op::Outline(crate::render::inset(ButtonId::NavInfo.area(), 1), YELLOW),
            ]
        );
    }

    #[test]
    fn test_hidden_button_not_framed() {
        let log = OpLog::new();
        let mut renderer = Renderer::new();
        let store = live_store();
        let view = ViewState {
            page: Page::Dtc,
            highlighted: ButtonId::DtcClear,
            scroll: 0,
        };
        render(&mut renderer, &log, &store, &view);
        assert!(!log.ops().iter().any(|op| matches!(op, Op::Outline(_, color) if *color == YELLOW)));
    }

    #[test]
    fn test_force_full_redraw() {
        let log = OpLog::new();
        let mut renderer = Renderer::new();
        let store = live_store();
        render(&mut renderer, &log, &store, &ViewState::default());
        renderer.force_full_redraw();
        let report = render(&mut renderer, &log, &store, &ViewState::default());
        assert!(report.full_redraw);
        assert_eq!(report.fields.len(), Field::COUNT);
    }
}
