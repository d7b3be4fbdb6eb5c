//! Pixel renderer for the application icon: a flash drive with a green
//! check badge. Std-only so the build script can compile it directly.

type Rgb = [u8; 3];

const CONNECTOR: Rgb = [0xb8, 0xbc, 0xc8];
const CONNECTOR_HOLE: Rgb = [0x4a, 0x4e, 0x5a];
const BODY: Rgb = [0x3a, 0x6f, 0xd8];
const BADGE: Rgb = [0xa6, 0xe3, 0xa1];
const CHECK: Rgb = [0x1e, 0x1e, 0x2e];

/// Render the icon into an RGBA pixel buffer (top-to-bottom row order).
pub fn render_icon(size: u32) -> Vec<u8> {
    let s = size as f32;
    let mut pixels = vec![0u8; (size * size * 4) as usize];

    for y in 0..size {
        for x in 0..size {
            // Work in unit coordinates so the shapes scale with `size`.
            let p = ((x as f32 + 0.5) / s, (y as f32 + 0.5) / s);
            let mut px = [0.0f32; 4];

            over(&mut px, CONNECTOR, coverage(rounded_box(p, (0.40, 0.17), (0.13, 0.12), 0.02), s));
            for hole_x in [0.35, 0.45] {
                let hole = rounded_box(p, (hole_x, 0.13), (0.025, 0.025), 0.0);
                over(&mut px, CONNECTOR_HOLE, coverage(hole, s));
            }
            over(&mut px, BODY, coverage(rounded_box(p, (0.40, 0.55), (0.20, 0.30), 0.06), s));
            over(&mut px, BADGE, coverage(circle(p, (0.70, 0.72), 0.22), s));

            let tick = segment(p, (0.60, 0.72), (0.67, 0.80))
                .min(segment(p, (0.67, 0.80), (0.81, 0.63)))
                - 0.035;
            over(&mut px, CHECK, coverage(tick, s));

            let i = ((y * size + x) * 4) as usize;
            for (dst, v) in pixels[i..i + 4].iter_mut().zip(px) {
                *dst = v.round().clamp(0.0, 255.0) as u8;
            }
        }
    }
    pixels
}

/// Fraction of a pixel covered by a shape with signed distance `d`.
fn coverage(d: f32, size: f32) -> f32 {
    (0.5 - d * size).clamp(0.0, 1.0)
}

/// Straight-alpha "over" compositing of an opaque colour at `alpha`.
fn over(dst: &mut [f32; 4], color: Rgb, alpha: f32) {
    if alpha <= 0.0 {
        return;
    }
    let dst_a = dst[3] / 255.0;
    let out_a = alpha + dst_a * (1.0 - alpha);
    for c in 0..3 {
        dst[c] = (color[c] as f32 * alpha + dst[c] * dst_a * (1.0 - alpha)) / out_a;
    }
    dst[3] = out_a * 255.0;
}

fn rounded_box(p: (f32, f32), center: (f32, f32), half: (f32, f32), r: f32) -> f32 {
    let qx = (p.0 - center.0).abs() - half.0 + r;
    let qy = (p.1 - center.1).abs() - half.1 + r;
    let outside = (qx.max(0.0).powi(2) + qy.max(0.0).powi(2)).sqrt();
    outside + qx.max(qy).min(0.0) - r
}

fn circle(p: (f32, f32), center: (f32, f32), r: f32) -> f32 {
    ((p.0 - center.0).powi(2) + (p.1 - center.1).powi(2)).sqrt() - r
}

/// Distance from `p` to the segment `a`..`b`.
fn segment(p: (f32, f32), a: (f32, f32), b: (f32, f32)) -> f32 {
    let (abx, aby) = (b.0 - a.0, b.1 - a.1);
    let (apx, apy) = (p.0 - a.0, p.1 - a.1);
    let t = ((apx * abx + apy * aby) / (abx * abx + aby * aby)).clamp(0.0, 1.0);
    ((apx - abx * t).powi(2) + (apy - aby * t).powi(2)).sqrt()
}
