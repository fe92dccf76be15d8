use crate::renderer::fonts::FontConfig;
use image::{Rgba, RgbaImage};
use imageproc::drawing::{
    draw_filled_rect_mut, draw_hollow_rect_mut, draw_line_segment_mut, draw_text_mut,
};
use imageproc::rect::Rect;

pub fn horizontal_line(image: &mut RgbaImage, x: u32, y: u32, width: u32, colour: Rgba<u8>) {
    draw_line_segment_mut(
        image,
        (x as f32, y as f32),
        ((x + width) as f32, y as f32),
        colour,
    );
}

pub fn vertical_line(image: &mut RgbaImage, x: u32, y1: u32, y2: u32, colour: Rgba<u8>) {
    draw_line_segment_mut(
        image,
        (x as f32, y1 as f32),
        (x as f32, y2 as f32),
        colour,
    );
}

pub fn segment(image: &mut RgbaImage, from: (f32, f32), to: (f32, f32), colour: Rgba<u8>) {
    draw_line_segment_mut(image, from, to, colour);
}

/// Filled rectangle; zero-sized rectangles are skipped.
pub fn filled_rect(image: &mut RgbaImage, x: i32, y: i32, width: u32, height: u32, colour: Rgba<u8>) {
    if width > 0 && height > 0 {
        draw_filled_rect_mut(image, Rect::at(x, y).of_size(width, height), colour);
    }
}

pub fn hollow_rect(image: &mut RgbaImage, x: i32, y: i32, width: u32, height: u32, colour: Rgba<u8>) {
    if width > 0 && height > 0 {
        draw_hollow_rect_mut(image, Rect::at(x, y).of_size(width, height), colour);
    }
}

pub(crate) fn text(
    image: &mut RgbaImage,
    colour: Rgba<u8>,
    x: i32,
    y: i32,
    font_config: Option<&FontConfig>,
    content: &str,
) {
    if let Some(font_config) = font_config {
        draw_text_mut(
            image,
            colour,
            x,
            y,
            font_config.scale,
            &font_config.font,
            content,
        );
    }
}

pub fn progress_bar(
    image: &mut RgbaImage,
    x: i32,
    y: i32,
    width: u32,
    height: u32,
    fraction: f32,
    colour: Rgba<u8>,
) {
    let bg_colour = Rgba([230, 230, 230, 255]);

    // Background
    filled_rect(image, x, y, width, height, bg_colour);

    // Progress
    let bar_width = (fraction.clamp(0.0, 1.0) * width as f32) as u32;
    filled_rect(image, x, y, bar_width, height, colour);

    // Border
    hollow_rect(image, x, y, width, height, Rgba([100, 100, 100, 255]));
}
