//! Application icon.

mod render;

pub use render::render_icon;

/// Generate the window icon as egui `IconData`.
pub fn generate_icon(size: u32) -> egui::IconData {
    egui::IconData {
        rgba: render_icon(size),
        width: size,
        height: size,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alpha(rgba: &[u8], size: u32, x: u32, y: u32) -> u8 {
        rgba[((y * size + x) * 4 + 3) as usize]
    }

    #[test]
    fn test_buffer_dimensions() {
        let icon = generate_icon(32);
        assert_eq!(icon.rgba.len(), 32 * 32 * 4);
        assert_eq!((icon.width, icon.height), (32, 32));
    }

    #[test]
    fn test_corners_transparent_body_opaque() {
        let size = 64;
        let rgba = render_icon(size);
        assert_eq!(alpha(&rgba, size, 0, 0), 0);
        assert_eq!(alpha(&rgba, size, size - 1, 0), 0);
        // Middle of the drive body.
        assert_eq!(alpha(&rgba, size, 20, 30), 255);
        // Centre of the badge is the check-free green disc.
        let i = ((62 * size / 100 * size + 74 * size / 100) * 4) as usize;
        assert_eq!(rgba[i + 3], 255);
    }
}
