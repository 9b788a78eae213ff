//! Canvas geometry and painting primitives for the referral card.

use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut};
use imageproc::rect::Rect;
use qrcode::Color;

pub const CANVAS_SIZE: u32 = 512;
pub const QR_SIZE: u32 = 400;
/// The code sits this far above the vertical centre to leave room for the brand line
pub const QR_LIFT: u32 = 20;
pub const QUIET_ZONE: usize = 4;
pub const LIGHT_ALPHA: u8 = 180;
pub const TEXT_GAP: u32 = 20;
pub const FONT_SIZE: f32 = 35.0;

pub const BACKGROUND: Rgba<u8> = Rgba([0x1A, 0x3C, 0x34, 0xFF]);
pub const ACCENT: Rgba<u8> = Rgba([0xC9, 0xA9, 0x6E, 0xFF]);
pub const TEXT_COLOR: Rgba<u8> = Rgba([0xFF, 0xFF, 0xFF, 0xFF]);
pub const DARK: Rgba<u8> = Rgba([0x00, 0x00, 0x00, 0xFF]);
pub const WHITE: Rgba<u8> = Rgba([0xFF, 0xFF, 0xFF, 0xFF]);

const FRAME_INSET: i32 = 10;
const FRAME_WIDTH: u32 = 2;
const MARK_LENGTH: u32 = 28;
const MARK_WIDTH: u32 = 4;

/// Top-left corner of the code region on the canvas.
pub fn qr_origin() -> (u32, u32) {
    let x = (CANVAS_SIZE - QR_SIZE) / 2;
    let y = (CANVAS_SIZE - QR_SIZE) / 2 - QR_LIFT;
    (x, y)
}

/// Top edge of the brand text.
pub fn text_top() -> u32 {
    qr_origin().1 + QR_SIZE + TEXT_GAP
}

/// `fg` over `under` at `alpha`, integer arithmetic only.
pub fn blend(under: Rgba<u8>, fg: Rgba<u8>, alpha: u8) -> Rgba<u8> {
    let a = u16::from(alpha);
    let mix = |b: u8, f: u8| ((u16::from(f) * a + u16::from(b) * (255 - a) + 127) / 255) as u8;
    Rgba([mix(under[0], fg[0]), mix(under[1], fg[1]), mix(under[2], fg[2]), 0xFF])
}

/// Paints a code of `width` modules, plus the quiet zone, into a `size`×`size`
/// square at `origin`.
///
/// Pixels are mapped to modules by nearest neighbour, so any `size` works.
/// Dark modules are opaque; light ones are white blended at `light_alpha`.
pub fn paint_code(canvas: &mut RgbaImage, colors: &[Color], width: usize, origin: (u32, u32), size: u32, light_alpha: u8) {
    let total = width + 2 * QUIET_ZONE;
    for py in 0..size {
        let my = py as usize * total / size as usize;
        for px in 0..size {
            let mx = px as usize * total / size as usize;
            let dark = module_is_dark(colors, width, mx, my);
            let (x, y) = (origin.0 + px, origin.1 + py);
            if x >= canvas.width() || y >= canvas.height() {
                continue;
            }
            let pixel = if dark {
                DARK
            } else {
                blend(*canvas.get_pixel(x, y), WHITE, light_alpha)
            };
            canvas.put_pixel(x, y, pixel);
        }
    }
}

fn module_is_dark(colors: &[Color], width: usize, mx: usize, my: usize) -> bool {
    let inside = |m: usize| m >= QUIET_ZONE && m < QUIET_ZONE + width;
    if !inside(mx) || !inside(my) {
        return false;
    }
    let index = (my - QUIET_ZONE) * width + (mx - QUIET_ZONE);
    colors.get(index).is_some_and(|c| *c == Color::Dark)
}

/// Inset frame and four corner marks in the accent colour.
pub fn draw_decorations(canvas: &mut RgbaImage) {
    let size = canvas.width().min(canvas.height());
    let outer = size.saturating_sub(2 * FRAME_INSET as u32);
    for step in 0..FRAME_WIDTH {
        let offset = FRAME_INSET + step as i32;
        let side = outer.saturating_sub(2 * step);
        if side == 0 {
            break;
        }
        draw_hollow_rect_mut(canvas, Rect::at(offset, offset).of_size(side, side), ACCENT);
    }

    let near = FRAME_INSET * 2;
    let far = size as i32 - FRAME_INSET * 2;
    let len = MARK_LENGTH as i32;
    let w = MARK_WIDTH as i32;
    // (x, y) of each corner's outer vertex and the direction the arms run
    let corners = [(near, near, 1, 1), (far, near, -1, 1), (near, far, 1, -1), (far, far, -1, -1)];
    for (x, y, dx, dy) in corners {
        let hx = if dx > 0 { x } else { x - len };
        let hy = if dy > 0 { y } else { y - w };
        draw_filled_rect_mut(canvas, Rect::at(hx, hy).of_size(MARK_LENGTH, MARK_WIDTH), ACCENT);
        let vx = if dx > 0 { x } else { x - w };
        let vy = if dy > 0 { y } else { y - len };
        draw_filled_rect_mut(canvas, Rect::at(vx, vy).of_size(MARK_WIDTH, MARK_LENGTH), ACCENT);
    }
}
