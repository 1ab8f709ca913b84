//! Screen pieces. Each function draws one region completely, so the
//! renderer can repaint any of them on its own.

use embedded_graphics::prelude::Point;
use embedded_graphics::primitives::Rectangle;
use embedded_hal_async::delay::DelayNs;

use super::canvas::{DrawPrimitives, TextSize, inset, rect};
use super::frame::{Field, StatusBadge};
use super::pacing::PacedCanvas;
use crate::colors::{BLACK, BUTTON, CYAN, DARK_GRAY, GRAY, GREEN, LIGHT_GRAY, PANEL, RED, WHITE, YELLOW};
use crate::config::layout::{
    CONTENT_HEIGHT,
    CONTENT_Y,
    DTC_ITEMS_PER_PAGE,
    DTC_LIST_Y,
    DTC_ROW_HEIGHT,
    HEADER_HEIGHT,
    LOST_BOX_HEIGHT,
    LOST_BOX_WIDTH,
    LOST_STRIPE_HEIGHT,
    MARGIN,
    RECONNECT_DOTS,
    SCREEN_HEIGHT,
    SCREEN_WIDTH,
};
use crate::dtc::DiagnosticCode;
use crate::log_buffer::LogEntry;
use crate::state::{ButtonId, Page, ViewState, is_enabled};
use crate::store::TelemetryStore;
use crate::text::{truncated, truncated_fmt};

const SCREEN: Rectangle = rect(0, 0, SCREEN_WIDTH, SCREEN_HEIGHT);
const HEADER: Rectangle = rect(0, 0, SCREEN_WIDTH, HEADER_HEIGHT - 1);
const STATUS: Rectangle = rect(226, 4, 90, 18);

/// DTC page summary text, left of the action buttons.
const DTC_SUMMARY: Rectangle = rect(MARGIN as i32, CONTENT_Y + 4, 108, 10);
const DTC_BUSY: Rectangle = rect(MARGIN as i32, CONTENT_Y + 15, 108, 10);
const DTC_BADGE_X: i32 = 70;
const DTC_TEXT_CHARS: usize = 52;

const INFO_X: i32 = 8;
const INFO_VIN: Rectangle = rect(INFO_X, CONTENT_Y + 20, SCREEN_WIDTH - 16, 18);
const INFO_VALUE_X: i32 = INFO_X + 60;
const INFO_CODES: Rectangle = rect(INFO_VALUE_X, CONTENT_Y + 58, 144, 10);
const INFO_LOGS: Rectangle = rect(INFO_X, CONTENT_Y + 92, SCREEN_WIDTH - 16, 72);
pub(super) const INFO_LOG_LINES: usize = 6;
const INFO_LOG_CHARS: usize = 50;

const LOST_BOX: Rectangle = rect(
    ((SCREEN_WIDTH - LOST_BOX_WIDTH) / 2) as i32,
    CONTENT_Y + ((CONTENT_HEIGHT - LOST_BOX_HEIGHT) / 2) as i32,
    LOST_BOX_WIDTH,
    LOST_BOX_HEIGHT,
);
const LOST_ERROR: Rectangle = rect(LOST_BOX.top_left.x + 10, LOST_BOX.top_left.y + 44, LOST_BOX_WIDTH - 20, 12);
const LOST_DOTS: Rectangle = rect(
    LOST_BOX.top_left.x + 172,
    LOST_BOX.top_left.y + 80,
    RECONNECT_DOTS as u32 * 6,
    10,
);

/// Top-left position that centers `text` in `area`.
fn centered(
    area: Rectangle,
    text: &str,
    size: TextSize,
) -> Point {
    let dx = area.size.width.saturating_sub(size.text_width(text)) / 2;
    let dy = area.size.height.saturating_sub(size.line_height()) / 2;
    area.top_left + Point::new(dx as i32, dy as i32)
}

// =============================================================================
// Chrome
// =============================================================================

/// Clear the screen, then draw the header title and the navigation bar.
pub async fn draw_chrome<C: DrawPrimitives, D: DelayNs>(
    canvas: &mut PacedCanvas<C, D>,
    page: Page,
) {
    canvas.fill(SCREEN, BLACK).await;
    canvas.fill(HEADER, PANEL).await;
    canvas.text(page.title(), Point::new(6, 4), WHITE, TextSize::Medium);
    let divider = HEADER_HEIGHT as i32 - 1;
    canvas.line(Point::new(0, divider), Point::new(SCREEN_WIDTH as i32 - 1, divider), GRAY);

    for tab in Page::ALL {
        draw_nav_tab(canvas, tab.nav_button(), tab == page).await;
    }
}

async fn draw_nav_tab<C: DrawPrimitives, D: DelayNs>(
    canvas: &mut PacedCanvas<C, D>,
    button: ButtonId,
    active: bool,
) {
    let area = button.area();
    let (fill, color) = if active { (BUTTON, WHITE) } else { (PANEL, LIGHT_GRAY) };
    canvas.fill(area, fill).await;
    canvas.text(button.label(), centered(area, button.label(), TextSize::Small), color, TextSize::Small);
    draw_button_border(canvas, button, false);
}

/// Status dot and stored-code count in the header.
pub async fn draw_status<C: DrawPrimitives, D: DelayNs>(
    canvas: &mut PacedCanvas<C, D>,
    badge: StatusBadge,
) {
    canvas.fill(STATUS, PANEL).await;
    let dot = rect(STATUS.top_left.x + 4, STATUS.top_left.y + 4, 10, 10);
    canvas.fill(dot, badge.level.color()).await;
    let text = truncated_fmt::<12>(format_args!("{} DTC", badge.dtc_count));
    canvas.text(&text, Point::new(STATUS.top_left.x + 20, STATUS.top_left.y + 4), WHITE, TextSize::Small);
}

/// Two-pixel button border, yellow when highlighted.
pub fn draw_button_border<C: DrawPrimitives, D: DelayNs>(
    canvas: &mut PacedCanvas<C, D>,
    button: ButtonId,
    highlighted: bool,
) {
    let color = if highlighted { YELLOW } else { GRAY };
    let area = button.area();
    canvas.outline(area, color);
    canvas.outline(inset(area, 1), color);
}

async fn draw_action_button<C: DrawPrimitives, D: DelayNs>(
    canvas: &mut PacedCanvas<C, D>,
    button: ButtonId,
) {
    let area = button.area();
    canvas.fill(area, BUTTON).await;
    canvas.text(button.label(), centered(area, button.label(), TextSize::Small), WHITE, TextSize::Small);
    draw_button_border(canvas, button, false);
}

// =============================================================================
// Dashboard
// =============================================================================

/// Empty metric box with its caption.
pub async fn draw_metric_frame<C: DrawPrimitives, D: DelayNs>(
    canvas: &mut PacedCanvas<C, D>,
    field: Field,
) {
    let area = field.area();
    canvas.fill(area, PANEL).await;
    canvas.outline(area, GRAY);
    canvas.text(
        field.label(),
        area.top_left + Point::new(6, 5),
        LIGHT_GRAY,
        TextSize::Small,
    );
}

/// Repaint only the value part of a metric box.
pub async fn draw_metric_value<C: DrawPrimitives, D: DelayNs>(
    canvas: &mut PacedCanvas<C, D>,
    field: Field,
    text: &str,
) {
    let area = field.value_area();
    canvas.fill(area, PANEL).await;
    canvas.text(text, centered(area, text, TextSize::Large), CYAN, TextSize::Large);
}

// =============================================================================
// DTC Page
// =============================================================================

/// Action buttons, summary and the visible slice of the code list.
pub async fn draw_dtc_page<C: DrawPrimitives, D: DelayNs>(
    canvas: &mut PacedCanvas<C, D>,
    store: &TelemetryStore,
    view: &ViewState,
) {
    let count = store.dtcs.len();
    for button in [ButtonId::DtcUp, ButtonId::DtcDown, ButtonId::DtcRefresh, ButtonId::DtcClear] {
        if is_enabled(button, Page::Dtc, count, view.scroll) {
            draw_action_button(canvas, button).await;
        }
    }

    let summary = if count > DTC_ITEMS_PER_PAGE {
        truncated_fmt::<18>(format_args!(
            "{} CODES {}/{}",
            count,
            view.scroll / DTC_ITEMS_PER_PAGE + 1,
            count.div_ceil(DTC_ITEMS_PER_PAGE)
        ))
    } else {
        truncated_fmt::<18>(format_args!("{} CODES", count))
    };
    canvas.text(&summary, DTC_SUMMARY.top_left, WHITE, TextSize::Small);

    let list = rect(0, DTC_LIST_Y, SCREEN_WIDTH, DTC_ROW_HEIGHT * DTC_ITEMS_PER_PAGE as u32);
    if !store.dtcs_read {
        let text = "Reading codes...";
        canvas.text(text, centered(list, text, TextSize::Medium), LIGHT_GRAY, TextSize::Medium);
        return;
    }
    if store.dtcs.is_empty() {
        let title = "ALL CLEAR";
        let mut at = centered(list, title, TextSize::Large);
        at.y -= 10;
        canvas.text(title, at, GREEN, TextSize::Large);
        let note = "No stored trouble codes";
        let mut at = centered(list, note, TextSize::Small);
        at.y += 16;
        canvas.text(note, at, LIGHT_GRAY, TextSize::Small);
        return;
    }

    let visible = store.dtcs.iter().skip(view.scroll).take(DTC_ITEMS_PER_PAGE);
    for (row, code) in visible.enumerate() {
        let y = DTC_LIST_Y + (row as u32 * DTC_ROW_HEIGHT) as i32;
        draw_dtc_row(canvas, code, y).await;
    }
}

async fn draw_dtc_row<C: DrawPrimitives, D: DelayNs>(
    canvas: &mut PacedCanvas<C, D>,
    code: &DiagnosticCode,
    y: i32,
) {
    let formatted = code.code.format();
    canvas.text(&formatted, Point::new(6, y + 2), WHITE, TextSize::Medium);

    let badge = rect(DTC_BADGE_X, y + 3, 36, 14);
    canvas.fill(badge, code.severity.color()).await;
    let label = code.severity.badge();
    canvas.text(label, centered(badge, label, TextSize::Small), BLACK, TextSize::Small);

    let description = truncated::<DTC_TEXT_CHARS>(&code.description);
    canvas.text(&description, Point::new(6, y + 21), LIGHT_GRAY, TextSize::Small);

    let bottom = y + DTC_ROW_HEIGHT as i32 - 1;
    canvas.line(Point::new(4, bottom), Point::new(SCREEN_WIDTH as i32 - 5, bottom), DARK_GRAY);
}

/// "WORKING..." while a refresh or clear is queued or in flight.
pub async fn draw_dtc_busy<C: DrawPrimitives, D: DelayNs>(
    canvas: &mut PacedCanvas<C, D>,
    busy: bool,
) {
    canvas.fill(DTC_BUSY, BLACK).await;
    if busy {
        canvas.text("WORKING...", DTC_BUSY.top_left, YELLOW, TextSize::Small);
    }
}

// =============================================================================
// Info Page
// =============================================================================

/// Static captions of the Info page.
pub fn draw_info_captions<C: DrawPrimitives, D: DelayNs>(canvas: &mut PacedCanvas<C, D>) {
    let top = CONTENT_Y;
    canvas.text("VIN", Point::new(INFO_X, top + 8), GRAY, TextSize::Small);
    canvas.text("ADAPTER", Point::new(INFO_X, top + 44), GRAY, TextSize::Small);
    canvas.text("ELM327 connected", Point::new(INFO_VALUE_X, top + 44), WHITE, TextSize::Small);
    canvas.text("CODES", INFO_CODES.top_left - Point::new(INFO_VALUE_X - INFO_X, 0), GRAY, TextSize::Small);
    canvas.text("RECENT LOG", Point::new(INFO_X, top + 80), GRAY, TextSize::Small);
}

/// Stored-code summary; `None` until the first mode 03 answer.
pub async fn draw_info_codes<C: DrawPrimitives, D: DelayNs>(
    canvas: &mut PacedCanvas<C, D>,
    stored: Option<usize>,
) {
    canvas.fill(INFO_CODES, BLACK).await;
    let text = match stored {
        Some(count) => truncated_fmt::<24>(format_args!("{} stored", count)),
        None => truncated::<24>("not read yet"),
    };
    canvas.text(&text, INFO_CODES.top_left, WHITE, TextSize::Small);
}

/// Newest log lines, oldest on top.
pub async fn draw_recent_logs<C: DrawPrimitives, D: DelayNs>(
    canvas: &mut PacedCanvas<C, D>,
    logs: &[LogEntry],
) {
    canvas.fill(INFO_LOGS, BLACK).await;
    for (i, entry) in logs.iter().enumerate() {
        let line = truncated_fmt::<INFO_LOG_CHARS>(format_args!("{} {}", entry.level.prefix(), entry.message));
        let at = INFO_LOGS.top_left + Point::new(0, i as i32 * 12);
        canvas.text(&line, at, entry.level.color(), TextSize::Small);
    }
}

/// VIN line; "--" until the vehicle reported one.
pub async fn draw_vin<C: DrawPrimitives, D: DelayNs>(
    canvas: &mut PacedCanvas<C, D>,
    vin: Option<&str>,
) {
    canvas.fill(INFO_VIN, BLACK).await;
    canvas.text(vin.unwrap_or("--"), INFO_VIN.top_left, WHITE, TextSize::Medium);
}

// =============================================================================
// Disconnected
// =============================================================================

/// Striped "Connection Lost" box over a cleared content area.
pub async fn draw_connection_lost<C: DrawPrimitives, D: DelayNs>(canvas: &mut PacedCanvas<C, D>) {
    canvas.fill(LOST_BOX, BLACK).await;
    let mut y = 0;
    while y < LOST_BOX_HEIGHT {
        let height = LOST_STRIPE_HEIGHT.min(LOST_BOX_HEIGHT - y);
        let band = rect(LOST_BOX.top_left.x, LOST_BOX.top_left.y + y as i32, LOST_BOX_WIDTH, height);
        canvas.fill(band, DARK_GRAY).await;
        y += 2 * LOST_STRIPE_HEIGHT;
    }
    canvas.outline(LOST_BOX, RED);
    canvas.outline(inset(LOST_BOX, 1), RED);

    let title = "Connection Lost";
    let title_area = rect(LOST_BOX.top_left.x, LOST_BOX.top_left.y + 12, LOST_BOX_WIDTH, 18);
    canvas.text(title, centered(title_area, title, TextSize::Medium), RED, TextSize::Medium);
    canvas.text(
        "Reconnecting",
        Point::new(LOST_DOTS.top_left.x - 78, LOST_DOTS.top_left.y),
        LIGHT_GRAY,
        TextSize::Small,
    );
}

/// Error line inside the box.
pub async fn draw_lost_error<C: DrawPrimitives, D: DelayNs>(
    canvas: &mut PacedCanvas<C, D>,
    error: &str,
) {
    canvas.fill(LOST_ERROR, BLACK).await;
    let text = truncated::<40>(error);
    canvas.text(&text, centered(LOST_ERROR, &text, TextSize::Small), WHITE, TextSize::Small);
}

/// Reconnect animation, `count` dots.
pub async fn draw_reconnect_dots<C: DrawPrimitives, D: DelayNs>(
    canvas: &mut PacedCanvas<C, D>,
    count: u8,
) {
    canvas.fill(LOST_DOTS, BLACK).await;
    let dots = &"...."[..usize::from(count.min(RECONNECT_DOTS))];
    canvas.text(dots, LOST_DOTS.top_left, LIGHT_GRAY, TextSize::Small);
}

#[cfg(test)]
mod tests {
    use embassy_futures::block_on;

    use super::*;
    use crate::dtc::DtcCode;
    use crate::render::PacingPolicy;
    use crate::test_support::{Op, OpLog};

    fn store_with_codes(raw: &[u16]) -> TelemetryStore {
        let mut store = TelemetryStore::new();
        store.telemetry.connected = true;
        store.dtcs_read = true;
        for r in raw {
            store.dtcs.push(DiagnosticCode::from_code(DtcCode::from_raw(*r))).unwrap();
        }
        store.dtcs.sort_by_severity();
        store
    }

    fn dtc_view(scroll: usize) -> ViewState {
        ViewState {
            page: Page::Dtc,
            highlighted: ButtonId::NavDtc,
            scroll,
        }
    }

    #[test]
    fn test_lost_box_is_centered_in_content() {
        assert_eq!(LOST_BOX.top_left.x + LOST_BOX_WIDTH as i32 / 2, SCREEN_WIDTH as i32 / 2);
        assert!(LOST_BOX.top_left.y > CONTENT_Y);
        assert!(LOST_DOTS.top_left.x + (LOST_DOTS.size.width as i32) < LOST_BOX.top_left.x + LOST_BOX_WIDTH as i32);
    }

    #[test]
    fn test_dtc_page_shows_visible_slice() {
        let log = OpLog::new();
        let mut canvas = PacedCanvas::new(log.canvas(), log.delay(), PacingPolicy::DEFAULT);
        let store = store_with_codes(&[0x0101, 0x0300, 0x0401, 0x0133, 0x0171, 0x0420]);
        block_on(draw_dtc_page(&mut canvas, &store, &dtc_view(4)));

        let texts = log.texts();
        assert!(texts.iter().any(|t| t == "6 CODES 2/2"));
        assert!(texts.iter().any(|t| t == "UP"));
        assert!(!texts.iter().any(|t| t == "DN"));
        // Most severe first; the last two after sorting sit on the second page.
        assert!(!texts.iter().any(|t| t == "P0300"));
        assert!(texts.iter().any(|t| t == "P0133"));
    }

    #[test]
    fn test_dtc_page_all_clear() {
        let log = OpLog::new();
        let mut canvas = PacedCanvas::new(log.canvas(), log.delay(), PacingPolicy::DEFAULT);
        let store = store_with_codes(&[]);
        block_on(draw_dtc_page(&mut canvas, &store, &dtc_view(0)));

        let texts = log.texts();
        assert!(texts.iter().any(|t| t == "ALL CLEAR"));
        assert!(texts.iter().any(|t| t == "REFRESH"));
        assert!(!texts.iter().any(|t| t == "CLEAR"));
    }

    #[test]
    fn test_dtc_page_before_first_read() {
        let log = OpLog::new();
        let mut canvas = PacedCanvas::new(log.canvas(), log.delay(), PacingPolicy::DEFAULT);
        let mut store = store_with_codes(&[]);
        store.dtcs_read = false;
        block_on(draw_dtc_page(&mut canvas, &store, &dtc_view(0)));
        assert!(log.texts().iter().any(|t| t == "Reading codes..."));
        assert!(!log.texts().iter().any(|t| t == "ALL CLEAR"));
    }

    #[test]
    fn test_connection_lost_box_is_paced() {
        let log = OpLog::new();
        let mut canvas = PacedCanvas::new(log.canvas(), log.delay(), PacingPolicy::DEFAULT);
        block_on(draw_connection_lost(&mut canvas));

        let ops = log.ops();
        for (i, op) in ops.iter().enumerate() {
            if let Op::Fill(area, _) = op {
                assert!(area.size.width * area.size.height <= 10_000);
                assert!(matches!(ops.get(i + 1), Some(Op::Delay(ms)) if *ms >= 10));
            }
        }
        assert!(log.texts().iter().any(|t| t == "Connection Lost"));
    }

    #[test]
    fn test_reconnect_dots() {
        let log = OpLog::new();
        let mut canvas = PacedCanvas::new(log.canvas(), log.delay(), PacingPolicy::DEFAULT);
        block_on(draw_reconnect_dots(&mut canvas, 3));
        block_on(draw_reconnect_dots(&mut canvas, 9));
        assert_eq!(log.texts(), ["...", "...."]);
    }

    #[test]
    fn test_highlight_border_colors() {
        let log = OpLog::new();
        let mut canvas = PacedCanvas::new(log.canvas(), log.delay(), PacingPolicy::DEFAULT);
        draw_button_border(&mut canvas, ButtonId::DtcClear, true);
        draw_button_border(&mut canvas, ButtonId::DtcClear, false);
        let colors: std::vec::Vec<_> = log
            .ops()
            .into_iter()
            .filter_map(|op| match op {
                Op::Outline(_, color) => Some(color),
                _ => None,
            })
            .collect();
        assert_eq!(colors, [YELLOW, YELLOW, GRAY, GRAY]);
    }
}
