//! Build script -- writes the application icon and embeds the Windows
//! application manifest and icon resource.

#[path = "crates/usbcheck-gui/src/icon/render.rs"]
#[allow(dead_code)]
mod render;

const ICON_PATH: &str = "assets/icon.ico";

fn main() {
    println!("cargo:rerun-if-changed=crates/usbcheck-gui/src/icon/render.rs");

    if !std::path::Path::new(ICON_PATH).exists() {
        std::fs::create_dir_all("assets").ok();
        if let Err(e) = std::fs::write(ICON_PATH, encode_ico(&[48, 32, 16])) {
            println!("cargo:warning=Failed to write icon: {e}");
        }
    }

    if std::env::var("CARGO_CFG_TARGET_OS").unwrap_or_default() != "windows" {
        return;
    }

    // asInvoker: only repair needs elevation, and it checks for it at run time.
    let mut res = winresource::WindowsResource::new();
    res.set_manifest(
        r#"
<assembly xmlns="urn:schemas-microsoft-com:asm.v1" manifestVersion="1.0">
  <trustInfo xmlns="urn:schemas-microsoft-com:asm.v3">
    <security>
      <requestedPrivileges>
        <requestedExecutionLevel level="asInvoker" uiAccess="false"/>
      </requestedPrivileges>
    </security>
  </trustInfo>
  <application xmlns="urn:schemas-microsoft-com:asm.v3">
    <windowsSettings>
      <dpiAwareness xmlns="http://schemas.microsoft.com/SMI/2016/WindowsSettings">PerMonitorV2</dpiAwareness>
    </windowsSettings>
  </application>
</assembly>
"#,
    );
    if std::path::Path::new(ICON_PATH).exists() {
        res.set_icon(ICON_PATH);
    }
    if let Err(e) = res.compile() {
        println!("cargo:warning=Failed to compile Windows resources: {e}");
    }
}

/// Multi-resolution ICO holding one 32-bit DIB per size.
fn encode_ico(sizes: &[u32]) -> Vec<u8> {
    let images: Vec<(u32, Vec<u8>)> = sizes
        .iter()
        .map(|&size| (size, dib(&render::render_icon(size), size)))
        .collect();

    let mut out = Vec::new();
    // ICONDIR: reserved, type 1 (icon), image count.
    for v in [0u16, 1, images.len() as u16] {
        out.extend_from_slice(&v.to_le_bytes());
    }

    let mut offset = (6 + 16 * images.len()) as u32;
    for (size, data) in &images {
        let side = if *size >= 256 { 0 } else { *size as u8 };
        out.extend_from_slice(&[side, side, 0, 0]);
        out.extend_from_slice(&1u16.to_le_bytes());
        out.extend_from_slice(&32u16.to_le_bytes());
        out.extend_from_slice(&(data.len() as u32).to_le_bytes());
        out.extend_from_slice(&offset.to_le_bytes());
        offset += data.len() as u32;
    }
    for (_, data) in images {
        out.extend(data);
    }
    out
}

/// BITMAPINFOHEADER + bottom-up BGRA rows + AND mask.
fn dib(rgba: &[u8], size: u32) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&40u32.to_le_bytes());
    out.extend_from_slice(&(size as i32).to_le_bytes());
    // Height covers both the colour rows and the mask.
    out.extend_from_slice(&(size as i32 * 2).to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&32u16.to_le_bytes());
    out.extend_from_slice(&[0u8; 24]);

    let pixel = |x: u32, y: u32| &rgba[((y * size + x) * 4) as usize..][..4];
    for y in (0..size).rev() {
        for x in 0..size {
            let p = pixel(x, y);
            out.extend_from_slice(&[p[2], p[1], p[0], p[3]]);
        }
    }

    let mask_row = (size.div_ceil(32) * 4) as usize;
    for y in (0..size).rev() {
        let mut row = vec![0u8; mask_row];
        for x in 0..size {
            if pixel(x, y)[3] < 128 {
                row[(x / 8) as usize] |= 0x80 >> (x % 8);
            }
        }
        out.extend(row);
    }
    out
}
