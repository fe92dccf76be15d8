use image::Rgba;

pub(crate) struct Colours {
    pub background: Rgba<u8>,
    pub header: Rgba<u8>,
    pub text: Rgba<u8>,
    pub temperature: Rgba<u8>,
    pub humidity: Rgba<u8>,
    pub threshold: Rgba<u8>,
    pub alert: Rgba<u8>,
    pub grid: Rgba<u8>,
    pub muted: Rgba<u8>,
}

impl Default for Colours {
    fn default() -> Self {
        Self {
            background: Rgba([249, 249, 249, 255]), // Off-white page
            header: Rgba([58, 107, 172, 255]),      // Steel blue - for headers
            text: Rgba([51, 51, 51, 255]),          // Charcoal - for general text
            temperature: Rgba([245, 121, 0, 255]),  // Burnt orange - temperature series
            humidity: Rgba([52, 101, 164, 255]),    // Royal blue - humidity series
            threshold: Rgba([204, 0, 0, 255]),      // Crimson - threshold markers
            alert: Rgba([244, 67, 54, 255]),        // Alert red - banner background
            grid: Rgba([221, 221, 221, 255]),       // Light gray - borders and grid
            muted: Rgba([186, 189, 182, 255]),      // Silver gray - gauges without value
        }
    }
}
