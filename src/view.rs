//! Status screen
//!
//! [`ViewModel`] is everything the status screen shows. A [`View`] turns a model into
//! pixels; [`StatusView`] is the stock layout for the 400×300 panel.
//!
//! Rendering must be a pure function of the view and the model. Partial refreshes
//! rebuild the frame currently on the panel by rendering the previous model again,
//! so any hidden state would show up as ghosting.

use crate::canvas::BitCanvas;
use crate::font::GlyphFont;

/// Battery level shown by the small status icon
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BatteryStatus {
    /// Full
    #[default]
    Full,
    /// Half
    Half,
    /// Empty
    Empty,
}

/// Outcome of bringing up the network for this wake cycle
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NetworkStatus {
    /// Connected and time synchronized
    #[default]
    Ok,
    /// No association within the timeout
    WifiTimeout,
    /// Association lost
    WifiDisconnected,
    /// Time synchronization did not complete
    SntpTimeout,
}

impl NetworkStatus {
    /// Short description for the error line
    pub fn describe(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::WifiTimeout | Self::WifiDisconnected => "wifi: connection failed",
            Self::SntpTimeout => "ntp: failed to sync",
        }
    }
}

/// State of the connection to the data API
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConnectionStatus {
    /// Never completed
    Pending,
    /// Connected
    #[default]
    Ok,
    /// Connection failed
    Error,
    /// Connection timed out
    Timeout,
    /// Transfer aborted mid-request
    TransferError,
}

impl ConnectionStatus {
    /// Short description for the error line
    pub fn describe(self) -> &'static str {
        match self {
            Self::Pending => "API: internal error",
            Self::Ok => "API: ok",
            Self::Error => "API: connection error",
            Self::Timeout => "API: timeout",
            Self::TransferError => "API: transfer error",
        }
    }
}

/// Outcome of a single API request
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RequestStatus {
    /// Still in flight
    Pending,
    /// Data received
    #[default]
    Ok,
    /// Not issued this cycle
    NoRequest,
    /// Transfer aborted
    TransferError,
    /// Response could not be parsed
    InvalidResponse,
    /// Non-success HTTP status
    HttpError,
    /// API reported an error
    ApiError,
    /// Rate limited
    RateLimit,
    /// No answer in time
    Timeout,
}

impl RequestStatus {
    /// Short description for the error line
    pub fn describe(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Ok => "ok",
            Self::NoRequest => "no request",
            // The error line shows only the prefix for this one
            Self::TransferError => "",
            Self::InvalidResponse => "bad response",
            Self::HttpError => "HTTP error",
            Self::ApiError => "API error",
            Self::RateLimit => "rate limit",
            Self::Timeout => "timeout",
        }
    }
}

/// Data shown on the status screen
///
/// Negative numbers mean "unknown" and render as `-`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewModel {
    /// Battery icon level
    pub battery_status: BatteryStatus,
    /// Whether the charging flash is shown
    pub charging: bool,
    /// Network bring-up result
    pub network: NetworkStatus,
    /// API connection state
    pub connection: ConnectionStatus,
    /// Status of the live power request
    pub current_power_request: RequestStatus,
    /// Status of the accumulated energy request
    pub accumulated_power_request: RequestStatus,
    /// Seconds since the Unix epoch
    pub epoch: u64,
    /// PV power in W
    pub pv_power_w: f32,
    /// PV energy in kWh
    pub pv_energy_kwh: f32,
    /// Load power in W
    pub load_power_w: f32,
    /// Load energy in kWh
    pub load_energy_kwh: f32,
    /// Surplus energy in kWh
    pub surplus_energy_kwh: f32,
    /// Grid energy in kWh
    pub grid_energy_kwh: f32,
    /// Storage charge in percent
    pub charge: i32,
}

impl ViewModel {
    /// Model assumed to be on the panel after a cold boot
    pub const fn baseline() -> Self {
        Self {
            battery_status: BatteryStatus::Full,
            charging: true,
            network: NetworkStatus::Ok,
            connection: ConnectionStatus::Ok,
            current_power_request: RequestStatus::Ok,
            accumulated_power_request: RequestStatus::Ok,
            epoch: 0,
            pv_power_w: -1.0,
            pv_energy_kwh: -1.0,
            load_power_w: -1.0,
            load_energy_kwh: -1.0,
            surplus_energy_kwh: -1.0,
            grid_energy_kwh: -1.0,
            charge: -1,
        }
    }

    /// Whether any network, connection or request status is not ok
    pub fn has_error(&self) -> bool {
        self.network != NetworkStatus::Ok
            || self.connection != ConnectionStatus::Ok
            || self.current_power_request != RequestStatus::Ok
            || self.accumulated_power_request != RequestStatus::Ok
    }
}

impl Default for ViewModel {
    fn default() -> Self {
        Self::baseline()
    }
}

/// Renders a [`ViewModel`] onto a canvas
pub trait View {
    /// Draw `model`; the result must depend on nothing but `self` and `model`
    fn render<B>(&self, canvas: &mut BitCanvas<'_, B>, model: &ViewModel)
    where
        B: AsRef<[u8]> + AsMut<[u8]>;
}

/// Labels of the six figures
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Labels {
    /// PV power
    pub pv: &'static str,
    /// PV energy
    pub pv_total: &'static str,
    /// Load power
    pub load: &'static str,
    /// Load energy
    pub load_total: &'static str,
    /// Surplus energy
    pub surplus: &'static str,
    /// Grid energy
    pub grid: &'static str,
}

impl Default for Labels {
    fn default() -> Self {
        Self {
            pv: "PV",
            pv_total: "PV total",
            load: "Load",
            load_total: "Load total",
            surplus: "Surplus",
            grid: "Grid",
        }
    }
}

/// Optional proportional fonts, by size
///
/// Slots left empty fall back to the built-in font, scaled 1×, 2× and 3×.
#[derive(Clone, Copy, Debug, Default)]
pub struct ViewFonts {
    /// Date and time line
    pub small: Option<&'static GlyphFont<'static>>,
    /// Energy totals
    pub medium: Option<&'static GlyphFont<'static>>,
    /// Power figures and charge
    pub large: Option<&'static GlyphFont<'static>>,
}

/// Weekday names starting with Sunday
pub const WEEKDAYS_DE: [&str; 7] = [
    "Sonntag",
    "Montag",
    "Dienstag",
    "Mittwoch",
    "Donnerstag",
    "Freitag",
    "Samstag",
];

/// Central European Summer Time
pub const DEFAULT_UTC_OFFSET_SECONDS: i32 = 2 * 3600;

/// Text and locale settings of [`StatusView`]
#[derive(Clone, Copy, Debug)]
pub struct ViewConfig {
    /// Figure labels
    pub labels: Labels,
    /// Weekday names, Sunday first
    pub weekdays: [&'static str; 7],
    /// Local time offset from UTC
    pub utc_offset_seconds: i32,
    /// Fonts
    pub fonts: ViewFonts,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            labels: Labels::default(),
            weekdays: WEEKDAYS_DE,
            utc_offset_seconds: DEFAULT_UTC_OFFSET_SECONDS,
            fonts: ViewFonts::default(),
        }
    }
}

#[cfg(feature = "alloc")]
pub use status::StatusView;

#[cfg(feature = "alloc")]
mod status {
    use alloc::format;
    use alloc::string::String;

    use chrono::{DateTime, Datelike, FixedOffset, Timelike};

    use super::*;
    use crate::color::Color;
    use crate::icon::{self, XBitmap};

    /// Gap between status icons
    const ICON_SPACING: i32 = 5;
    /// Top of the error line
    const ERROR_LINE_Y: i32 = 23;
    /// Rows of a built-in glyph above the baseline
    const BUILTIN_ASCENT: i32 = 7;

    const GAUGE_X: i32 = 285;
    const GAUGE_Y: i32 = 75;
    const GAUGE_WIDTH: i32 = 115;
    const GAUGE_HEIGHT: i32 = 225;
    const GAUGE_RADIUS: i32 = 10;
    const GAUGE_INSET: i32 = 5;
    const SEGMENT_HEIGHT: i32 = 50;
    const SEGMENT_PITCH: i32 = 55;
    const CHARGE_CENTER_X: i32 = 338;

    #[derive(Clone, Copy)]
    enum Face {
        Small,
        Medium,
        Large,
    }

    /// Stock status screen layout
    ///
    /// From top to bottom: local date and time with the status icons on the right,
    /// an error line, then PV, load, surplus and grid figures on the left and the
    /// storage charge above a four segment gauge on the right.
    #[derive(Clone, Copy, Debug, Default)]
    pub struct StatusView {
        config: ViewConfig,
    }

    impl StatusView {
        /// View with the given labels, locale and fonts
        pub fn new(config: ViewConfig) -> Self {
            Self { config }
        }

        /// Current settings
        pub fn config(&self) -> &ViewConfig {
            &self.config
        }

        /// `HH:MM:SS Uhr / <weekday> dd.mm.yyyy` in local time
        ///
        /// `None` if the timestamp or offset cannot be represented.
        pub fn format_datetime(&self, epoch: u64) -> Option<String> {
            let offset = FixedOffset::east_opt(self.config.utc_offset_seconds)?;
            let seconds = i64::try_from(epoch).ok()?;
            let time = DateTime::from_timestamp(seconds, 0)?.with_timezone(&offset);
            let weekday = self
                .config
                .weekdays
                .get(time.weekday().num_days_from_sunday() as usize)?;
            Some(format!(
                "{:02}:{:02}:{:02} Uhr / {} {:02}.{:02}.{:04}",
                time.hour(),
                time.minute(),
                time.second(),
                weekday,
                time.day(),
                time.month(),
                time.year()
            ))
        }

        /// Select a face and return the cursor line for `baseline`
        fn select<B>(&self, canvas: &mut BitCanvas<'_, B>, face: Face, baseline: i32) -> i32
        where
            B: AsRef<[u8]> + AsMut<[u8]>,
        {
            let fonts = &self.config.fonts;
            let (font, scale) = match face {
                Face::Small => (fonts.small, 1),
                Face::Medium => (fonts.medium, 2),
                Face::Large => (fonts.large, 3),
            };
            canvas.set_font(font);
            if font.is_some() {
                canvas.set_text_size(1);
                baseline
            } else {
                canvas.set_text_size(scale);
                baseline - BUILTIN_ASCENT * i32::from(scale)
            }
        }

        fn write<B>(&self, canvas: &mut BitCanvas<'_, B>, face: Face, baseline: i32, text: &str)
        where
            B: AsRef<[u8]> + AsMut<[u8]>,
        {
            let y = self.select(canvas, face, baseline);
            canvas.write_at(0, y, text);
        }
    }

    impl View for StatusView {
        fn render<B>(&self, canvas: &mut BitCanvas<'_, B>, model: &ViewModel)
        where
            B: AsRef<[u8]> + AsMut<[u8]>,
        {
            canvas.fill_screen(Color::White);
            canvas.set_text_wrap(false);
            canvas.set_legacy_charset(true);
            canvas.set_text_color(Color::Black);

            if let Some(line) = self.format_datetime(model.epoch) {
                self.write(canvas, Face::Small, 16, &line);
            }

            draw_status_icons(canvas, model);

            if let Some(message) = error_message(model) {
                canvas.set_font(None);
                canvas.set_text_size(1);
                let right = i32::from(canvas.width());
                canvas.write_right_justified(right, ERROR_LINE_Y, &message);
            }

            let labels = &self.config.labels;
            self.write(
                canvas,
                Face::Large,
                68,
                &format_power(labels.pv, model.pv_power_w),
            );
            self.write(
                canvas,
                Face::Medium,
                96,
                &format_energy(labels.pv_total, model.pv_energy_kwh),
            );
            self.write(
                canvas,
                Face::Large,
                150,
                &format_power(labels.load, model.load_power_w),
            );
            self.write(
                canvas,
                Face::Medium,
                178,
                &format_energy(labels.load_total, model.load_energy_kwh),
            );
            self.write(
                canvas,
                Face::Medium,
                234,
                &format_energy(labels.surplus, model.surplus_energy_kwh),
            );
            self.write(
                canvas,
                Face::Medium,
                291,
                &format_energy(labels.grid, model.grid_energy_kwh),
            );

            let y = self.select(canvas, Face::Large, 68);
            canvas.write_centered(CHARGE_CENTER_X, y, &format_charge(model.charge));

            draw_gauge(canvas, model.charge);
        }
    }

    fn is_unknown(value: f32) -> bool {
        value.is_nan() || value < 0.0
    }

    /// `label: 123W`, or `label: -` when unknown
    pub(super) fn format_power(label: &str, watts: f32) -> String {
        if is_unknown(watts) {
            format!("{}: -", label)
        } else {
            format!("{}: {:.0}W", label, watts)
        }
    }

    /// `label: 12.3kWh`, or `label: -` when unknown
    pub(super) fn format_energy(label: &str, kwh: f32) -> String {
        if is_unknown(kwh) {
            format!("{}: -", label)
        } else {
            format!("{}: {:.1}kWh", label, kwh)
        }
    }

    /// Percentage capped at 100, or `-` when unknown
    pub(super) fn format_charge(charge: i32) -> String {
        if charge < 0 {
            String::from("-")
        } else {
            format!("{}%", charge.min(100))
        }
    }

    /// Most relevant error: network first, then the API connection, then requests
    pub(super) fn error_message(model: &ViewModel) -> Option<String> {
        if !model.has_error() {
            return None;
        }
        if model.network != NetworkStatus::Ok {
            return Some(String::from(model.network.describe()));
        }
        if model.connection != ConnectionStatus::Ok {
            return Some(String::from(model.connection.describe()));
        }

        let mut message = String::new();
        if model.current_power_request != RequestStatus::Ok {
            message.push_str("live data: ");
            message.push_str(model.current_power_request.describe());
        }
        if model.accumulated_power_request != RequestStatus::Ok {
            if !message.is_empty() {
                message.push_str(", ");
            }
            message.push_str("acc data: ");
            message.push_str(model.accumulated_power_request.describe());
        }
        Some(message)
    }

    fn draw_status_icons<B>(canvas: &mut BitCanvas<'_, B>, model: &ViewModel)
    where
        B: AsRef<[u8]> + AsMut<[u8]>,
    {
        let mut x = i32::from(canvas.width()) - 1;

        let (link, y) = if model.has_error() {
            (&icon::WARNING, 0)
        } else {
            (&icon::WIFI, 1)
        };
        x -= i32::from(link.width);
        canvas.draw_icon(x, y, link, Color::Black);
        x -= ICON_SPACING;

        if model.charging {
            x -= i32::from(icon::FLASH.width);
            canvas.draw_icon(x, 0, &icon::FLASH, Color::Black);
            x -= ICON_SPACING;
        }

        let battery: &XBitmap = match model.battery_status {
            BatteryStatus::Full => &icon::BATTERY_FULL,
            BatteryStatus::Half => &icon::BATTERY_HALF,
            BatteryStatus::Empty => &icon::BATTERY_EMPTY,
        };
        x -= i32::from(battery.width);
        canvas.draw_icon(x, 4, battery, Color::Black);
    }

    /// Rounded outline with four segments lit at ≥75, ≥50, ≥25 and >0 percent
    fn draw_gauge<B>(canvas: &mut BitCanvas<'_, B>, charge: i32)
    where
        B: AsRef<[u8]> + AsMut<[u8]>,
    {
        canvas.draw_round_rect(
            GAUGE_X,
            GAUGE_Y,
            GAUGE_WIDTH,
            GAUGE_HEIGHT,
            GAUGE_RADIUS,
            Color::Black,
        );
        if charge < 0 {
            return;
        }

        let x = GAUGE_X + GAUGE_INSET;
        let width = GAUGE_WIDTH - 2 * GAUGE_INSET;
        let top = GAUGE_Y + GAUGE_INSET;
        let lit = [charge >= 75, charge >= 50, charge >= 25, charge > 0];

        for (index, lit) in (0..).zip(lit) {
            if !lit {
                continue;
            }
            let y = top + index * SEGMENT_PITCH;
            match index {
                // Round the outer corners only
                0 => {
                    canvas.fill_round_rect(x, y, width, SEGMENT_HEIGHT, GAUGE_RADIUS, Color::Black);
                    canvas.fill_rect(
                        x,
                        y + SEGMENT_HEIGHT - GAUGE_RADIUS,
                        width,
                        GAUGE_RADIUS,
                        Color::Black,
                    );
                }
                3 => {
                    canvas.fill_round_rect(x, y, width, SEGMENT_HEIGHT, GAUGE_RADIUS, Color::Black);
                    canvas.fill_rect(x, y, width, GAUGE_RADIUS, Color::Black);
                }
                _ => canvas.fill_rect(x, y, width, SEGMENT_HEIGHT, Color::Black),
            }
        }
    }
}

#[cfg(test)]
mod describe_tests {
    use super::*;

    #[test]
    fn test_transfer_errors_describe_differently() {
        assert_eq!(RequestStatus::TransferError.describe(), "");
        assert_eq!(ConnectionStatus::TransferError.describe(), "API: transfer error");
        assert_eq!(RequestStatus::Timeout.describe(), "timeout");
        assert_eq!(NetworkStatus::WifiDisconnected.describe(), "wifi: connection failed");
    }
}

#[cfg(all(test, feature = "alloc"))]
mod tests {
    use super::status::{error_message, format_charge, format_energy, format_power};
    use super::*;
    use crate::color::Color;
    use alloc::vec;
    use alloc::vec::Vec;

    fn canvas() -> BitCanvas<'static, Vec<u8>> {
        BitCanvas::new(400, 300, vec![0xFF; 400 * 300 / 8]).unwrap()
    }

    fn sample() -> ViewModel {
        ViewModel {
            battery_status: BatteryStatus::Half,
            charging: false,
            epoch: 1_717_243_200,
            pv_power_w: 7963.4,
            pv_energy_kwh: 16.79,
            load_power_w: 1076.0,
            load_energy_kwh: 10.97,
            surplus_energy_kwh: 3.2,
            grid_energy_kwh: 7.7,
            charge: 74,
            ..ViewModel::baseline()
        }
    }

    fn render(model: &ViewModel) -> BitCanvas<'static, Vec<u8>> {
        let mut canvas = canvas();
        StatusView::default().render(&mut canvas, model);
        canvas
    }

    #[test]
    fn test_render_is_deterministic() {
        let model = sample();
        let first = render(&model);
        let second = render(&model);
        assert_eq!(first.buffer(), second.buffer());
    }

    #[test]
    fn test_render_ignores_previous_content() {
        let model = sample();
        let mut dirty = canvas();
        dirty.fill_rect(10, 10, 200, 200, Color::Black);
        dirty.set_text_size(4);
        StatusView::default().render(&mut dirty, &model);
        assert_eq!(dirty.buffer(), render(&model).buffer());
    }

    #[test]
    fn test_different_models_differ() {
        let mut other = sample();
        other.pv_power_w = 12.0;
        assert_ne!(render(&sample()).buffer(), render(&other).buffer());
    }

    #[test]
    fn test_wifi_icon_without_error() {
        let canvas = render(&sample());
        // Wi-Fi at x = 378, y = 1; first row lights columns 8..=12
        assert_eq!(canvas.pixel(386, 1), Some(Color::Black));
        assert_eq!(canvas.pixel(390, 1), Some(Color::Black));
        assert_eq!(canvas.pixel(387, 0), Some(Color::White));
    }

    #[test]
    fn test_warning_icon_and_message_on_error() {
        let mut model = sample();
        model.connection = ConnectionStatus::Timeout;
        let canvas = render(&model);
        // Warning at x = 378, y = 0; first row lights columns 9..=11
        assert_eq!(canvas.pixel(387, 0), Some(Color::Black));
        let message_ink = (23..31)
            .flat_map(|y| (300..400).map(move |x| (x, y)))
            .filter(|(x, y)| canvas.pixel(*x, *y) == Some(Color::Black))
            .count();
        assert!(message_ink > 0);
    }

    #[test]
    fn test_gauge_segments_follow_charge() {
        let segment_lit = |canvas: &BitCanvas<'_, Vec<u8>>, index: i32| {
            canvas.pixel(340, 80 + index * 55 + 25) == Some(Color::Black)
        };

        let mut model = sample();
        model.charge = 80;
        let full = render(&model);
        assert!((0..4).all(|i| segment_lit(&full, i)));

        model.charge = 30;
        let low = render(&model);
        assert!(!segment_lit(&low, 0));
        assert!(!segment_lit(&low, 1));
        assert!(segment_lit(&low, 2));
        assert!(segment_lit(&low, 3));

        model.charge = -1;
        let unknown = render(&model);
        assert!((0..4).all(|i| !segment_lit(&unknown, i)));
        // Outline is still drawn
        assert_eq!(unknown.pixel(285, 200), Some(Color::Black));
    }

    #[test]
    fn test_charging_adds_flash() {
        let mut model = sample();
        // Flash tip: x = 358 + 10, first row; the battery icon starts at y = 4
        assert_eq!(render(&model).pixel(368, 0), Some(Color::White));
        model.charging = true;
        assert_eq!(render(&model).pixel(368, 0), Some(Color::Black));
    }

    #[test]
    fn test_format_figures() {
        assert_eq!(format_power("PV", 7963.4), "PV: 7963W");
        assert_eq!(format_power("PV", -1.0), "PV: -");
        assert_eq!(format_power("PV", f32::NAN), "PV: -");
        assert_eq!(format_energy("Grid", 12.34), "Grid: 12.3kWh");
        assert_eq!(format_energy("Grid", 0.0), "Grid: 0.0kWh");
        assert_eq!(format_energy("Grid", -0.5), "Grid: -");
        assert_eq!(format_charge(74), "74%");
        assert_eq!(format_charge(120), "100%");
        assert_eq!(format_charge(-1), "-");
    }

    #[test]
    fn test_format_datetime() {
        let view = StatusView::default();
        assert_eq!(
            view.format_datetime(0).as_deref(),
            Some("02:00:00 Uhr / Donnerstag 01.01.1970")
        );
        let utc = StatusView::new(ViewConfig {
            utc_offset_seconds: 0,
            ..ViewConfig::default()
        });
        assert_eq!(
            utc.format_datetime(1_717_243_200).as_deref(),
            Some("12:00:00 Uhr / Samstag 01.06.2024")
        );
        assert_eq!(view.format_datetime(u64::MAX), None);
    }

    #[test]
    fn test_error_message_priority() {
        let mut model = ViewModel::baseline();
        assert_eq!(error_message(&model), None);

        model.accumulated_power_request = RequestStatus::RateLimit;
        assert_eq!(error_message(&model).as_deref(), Some("acc data: rate limit"));

        model.current_power_request = RequestStatus::Timeout;
        assert_eq!(
            error_message(&model).as_deref(),
            Some("live data: timeout, acc data: rate limit")
        );

        model.connection = ConnectionStatus::Error;
        assert_eq!(error_message(&model).as_deref(), Some("API: connection error"));

        model.network = NetworkStatus::SntpTimeout;
        assert_eq!(error_message(&model).as_deref(), Some("ntp: failed to sync"));
    }

    #[test]
    fn test_request_transfer_error_has_no_description() {
        let mut model = ViewModel::baseline();
        model.current_power_request = RequestStatus::TransferError;
        assert_eq!(error_message(&model).as_deref(), Some("live data: "));
        assert_eq!(ConnectionStatus::TransferError.describe(), "API: transfer error");
    }

    #[test]
    fn test_baseline_has_no_error() {
        let model = ViewModel::baseline();
        assert!(!model.has_error());
        assert!(model.charging);
        assert_eq!(model.charge, -1);
        assert_eq!(ViewModel::default(), model);
    }
}
