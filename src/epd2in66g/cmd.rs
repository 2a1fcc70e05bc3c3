/// Single byte opcodes understood by the 2.66" (G) controller
pub struct Cmd;
impl Cmd {
    // Init
    pub const PANEL_SETTING: u8 = 0x00;
    pub const POWER_SETTING: u8 = 0x01;
    pub const POWER_OFF: u8 = 0x02;
    pub const POWER_OFF_SEQUENCE: u8 = 0x03;
    pub const POWER_ON: u8 = 0x04;
    pub const BOOSTER_SOFT_START: u8 = 0x06;
    pub const PLL_CONTROL: u8 = 0x30;
    pub const VCOM_DATA_INTERVAL: u8 = 0x50;
    pub const TCON_SETTING: u8 = 0x60;
    pub const RESOLUTION_SETTING: u8 = 0x61;

    // Undocumented vendor registers, values come from the Waveshare reference code
    pub const VENDOR_4D: u8 = 0x4D;
    pub const VENDOR_B4: u8 = 0xB4;
    pub const VENDOR_B5: u8 = 0xB5;
    pub const VENDOR_E3: u8 = 0xE3;
    pub const VENDOR_E7: u8 = 0xE7;
    pub const VENDOR_E9: u8 = 0xE9;

    // Update
    pub const DATA_START_TRANSMISSION: u8 = 0x10;
    pub const DISPLAY_REFRESH: u8 = 0x12;
}

/*
Waveshare reference sequence for EPD_2IN66G:
0x4D, 0x00 PSR, 0x01 PWR, 0x03 POFS, 0x06 BTST, 0x50 CDI, 0x60 TCON,
0x61 TRES, 0xE7, 0xE3, 0xB4, 0xB5, 0xE9, 0x30 PLL, 0x04 PON
*/
