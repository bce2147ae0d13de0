use super::*;

fn png_bytes(pixels: &[[u8; 4]], width: u32, height: u32) -> Vec<u8> {
    let raw: Vec<u8> = pixels.iter().flatten().copied().collect();
    let img = image::RgbaImage::from_raw(width, height, raw).unwrap();
    let mut out = std::io::Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png).unwrap();
    out.into_inner()
}

#[test]
fn decode_png_premultiplies() {
    let bytes = png_bytes(&[[255, 0, 0, 255], [200, 100, 50, 128]], 2, 1);
    let frame = decode_image(&bytes).unwrap();
    assert_eq!((frame.width, frame.height), (2, 1));
    assert!(frame.is_well_formed());
    assert_eq!(&frame.rgba8_premul[0..4], &[255, 0, 0, 255]);
    assert_eq!(&frame.rgba8_premul[4..8], &[100, 50, 25, 128]);
}

#[test]
fn transparent_pixels_clear_color() {
    let mut px = vec![10, 20, 30, 0];
    premultiply_rgba8_in_place(&mut px);
    assert_eq!(px, vec![0, 0, 0, 0]);
}

#[test]
fn garbage_bytes_fail() {
    assert!(decode_image(b"not an image").is_err());
}

#[test]
fn decode_image_file_reports_missing_files() {
    let dir = tempfile::tempdir().unwrap();
    assert!(decode_image_file(&dir.path().join("nope.png")).is_err());

    let path = dir.path().join("one.png");
    std::fs::write(&path, png_bytes(&[[0, 255, 0, 255]], 1, 1)).unwrap();
    let frame = decode_image_file(&path).unwrap();
    assert_eq!(&frame.rgba8_premul[..], &[0, 255, 0, 255]);
}
