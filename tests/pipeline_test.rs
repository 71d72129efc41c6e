use image::{Rgba, RgbaImage};
use imgfetch::core::terminal;
use imgfetch::renderer::{Glyph, Shade};
use imgfetch::{
    load_bitmap, CellGridConfig, Color, ColorMode, DitherMode, Pipeline, RenderError, ScaleMode,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn write_png(dir: &TempDir, name: &str, img: &RgbaImage) -> std::path::PathBuf {
    let path = dir.path().join(name);
    img.save(&path).unwrap();
    path
}

#[test]
fn renders_png_from_disk() {
    let dir = TempDir::new().unwrap();
    let img = RgbaImage::from_fn(4, 4, |_, y| {
        if y < 2 {
            Rgba([255, 0, 0, 255])
        } else {
            Rgba([0, 0, 255, 255])
        }
    });
    let path = write_png(&dir, "split.png", &img);

    let config = CellGridConfig::builder(2, 2).workers(2).build().unwrap();
    let stream = Pipeline::new(&config).run(load_bitmap(&path).unwrap()).unwrap();

    let expected = concat!(
        "\x1b[48;2;255;0;0m  \x1b[0m\n",
        "\x1b[48;2;0;0;255m  \x1b[0m",
    );
    assert_eq!(String::from_utf8(stream).unwrap(), expected);
}

#[test]
fn transparent_png_takes_matte_color() {
    let dir = TempDir::new().unwrap();
    let img = RgbaImage::from_pixel(1, 1, Rgba([0, 0, 0, 0]));
    let path = write_png(&dir, "clear.png", &img);

    let config = CellGridConfig::builder(1, 1)
        .matte("ff0000".parse::<Color>().unwrap())
        .color_mode(ColorMode::Ansi256)
        .build()
        .unwrap();
    let stream = Pipeline::new(&config).run(load_bitmap(&path).unwrap()).unwrap();
    assert_eq!(String::from_utf8(stream).unwrap(), "\x1b[48;5;196m \x1b[0m");
}

#[test]
fn checkerboard_block_mode_uses_medium_shade() {
    let dir = TempDir::new().unwrap();
    let img = RgbaImage::from_fn(2, 2, |x, y| {
        let v = if (x + y) % 2 == 0 { 0 } else { 255 };
        Rgba([v, v, v, 255])
    });
    let path = write_png(&dir, "checker.png", &img);

    let config = CellGridConfig::builder(1, 1)
        .dither(DitherMode::Block)
        .build()
        .unwrap();
    let image = Pipeline::new(&config).dither(load_bitmap(&path).unwrap()).unwrap();
    let cell = image.get(0, 0).unwrap();
    assert_ne!(cell.fg, cell.bg);
    assert_eq!(cell.glyph, Glyph::Shade(Shade::Medium));

    let stream = Pipeline::new(&config).run(load_bitmap(&path).unwrap()).unwrap();
    assert!(String::from_utf8(stream).unwrap().contains('▒'));
}

#[test]
fn fit_mode_letterboxes_with_matte() {
    let dir = TempDir::new().unwrap();
    // 40x20 into 10x20 pixels: a 10x5 band on pixel rows 7..12
    let img = RgbaImage::from_pixel(40, 20, Rgba([255, 255, 255, 255]));
    let path = write_png(&dir, "strip.png", &img);

    let matte = Color::new(0, 128, 0);
    let config = CellGridConfig::builder(10, 10)
        .scale(ScaleMode::Fit)
        .matte(matte)
        .build()
        .unwrap();
    let image = Pipeline::new(&config).dither(load_bitmap(&path).unwrap()).unwrap();
    assert_eq!(image.get(0, 0).unwrap().bg, matte);
    assert_eq!(image.get(9, 9).unwrap().bg, matte);
    assert_eq!(*image.get(5, 4).unwrap(), imgfetch::Cell::solid(Color::WHITE));
}

#[test]
fn missing_file_maps_to_io_exit_code() {
    let dir = TempDir::new().unwrap();
    let err = load_bitmap(dir.path().join("nope.png")).unwrap_err();
    assert!(matches!(err, RenderError::Io { .. }));
    assert_eq!(err.exit_code(), 255);
}

#[test]
fn corrupt_file_maps_to_decode_failure() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.png");
    std::fs::write(&path, b"\x89PNG\r\n\x1a\nthis is not a png").unwrap();
    let err = load_bitmap(&path).unwrap_err();
    assert!(matches!(err, RenderError::DecodeFailure { .. }));
    assert_eq!(err.exit_code(), 2);
}

#[test]
fn stream_written_once_with_newline() {
    let config = CellGridConfig::builder(3, 2).build().unwrap();
    let bitmap = imgfetch::Bitmap::filled(6, 4, Color::WHITE).unwrap();
    let stream = Pipeline::new(&config).run(bitmap).unwrap();

    let mut out = Vec::new();
    terminal::write_stream(&mut out, &stream, false, true).unwrap();
    assert_eq!(out.len(), stream.len() + 1);
    assert_eq!(out.last(), Some(&b'\n'));
}
