//! Peripheral configuration for the Pimoroni PIM715 Display Pack 2.8" and
//! the adapter UART.
//!
//! Pin mapping:
//! - DC: GPIO16
//! - CS: GPIO17
//! - CLK: GPIO18 (SPI0 CLK)
//! - MOSI: GPIO19 (SPI0 TX)
//! - Backlight: GPIO20
//! - Buttons: A=GPIO12, X=GPIO14, Y=GPIO15 (active-low)
//! - ELM327: UART0 TX=GPIO0, RX=GPIO1

use embassy_rp::spi::Config as SpiConfig;
use embassy_rp::uart::Config as UartConfig;

/// ELM327 clones ship at 38400 baud.
pub const ELM327_BAUD: u32 = 38_400;

/// SPI configuration for the ST7789 display.
/// The ST7789 supports up to 62.5MHz SPI clock.
pub fn display_spi_config() -> SpiConfig {
    let mut config = SpiConfig::default();
    config.frequency = 62_500_000;
    config
}

/// 8N1 at [`ELM327_BAUD`].
pub fn elm327_uart_config() -> UartConfig {
    let mut config = UartConfig::default();
    config.baudrate = ELM327_BAUD;
    config
}
