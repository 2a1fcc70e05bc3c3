/// Parameter bytes sent after the opcodes in [`super::cmd::Cmd`].
///
/// Most of these are magic numbers from the Waveshare reference code for the
/// 2.66" (G) panel, the controller datasheet is not public.
pub struct Flag;
#[allow(missing_docs)]
impl Flag {
    pub const VENDOR_4D: u8 = 0x78;

    // Panel Setting (0x00)
    pub const PANEL_SETTING: [u8; 2] = [0x0F, 0x29];

    // Power Setting (0x01)
    pub const POWER_SETTING: [u8; 2] = [0x07, 0x00];

    // Power Off Sequence Setting (0x03)
    pub const POWER_OFF_SEQUENCE: [u8; 3] = [0x10, 0x54, 0x44];

    // Booster Soft Start (0x06), phases A/B/C plus driving strength
    pub const BOOSTER_SOFT_START: [u8; 7] = [0x05, 0x00, 0x3F, 0x0A, 0x25, 0x12, 0x1A];

    // VCOM and Data Interval (0x50)
    pub const VCOM_DATA_INTERVAL: u8 = 0x37;

    // TCON (0x60), source to gate and gate to source non-overlap
    pub const TCON_SETTING: [u8; 2] = [0x02, 0x02];

    pub const VENDOR_E7: u8 = 0x1C;
    pub const VENDOR_E3: u8 = 0x22;
    pub const VENDOR_B4: u8 = 0xD0;
    pub const VENDOR_B5: u8 = 0x03;
    pub const VENDOR_E9: u8 = 0x01;

    // PLL Control (0x30)
    pub const PLL_CONTROL: u8 = 0x08;

    // Display Refresh (0x12)
    pub const REFRESH_NORMAL: u8 = 0x00;

    // Power Off (0x02)
    pub const POWER_OFF: u8 = 0x00;

    // Byte streamed for pixels outside a partial window, four white pixels
    pub const PARTIAL_FILL: u8 = 0x55;
}
