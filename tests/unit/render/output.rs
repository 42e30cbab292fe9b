use image::Rgba;

use super::*;

fn scratch(name: &str) -> PathBuf {
    let dir = PathBuf::from("target").join("unit_output");
    std::fs::create_dir_all(&dir).unwrap();
    dir.join(name)
}

#[test]
fn save_then_load_keeps_pixels() {
    let path = scratch("nested/roundtrip.png");
    let _ = std::fs::remove_file(&path);
    let img = RgbaImage::from_fn(3, 2, |x, y| Rgba([x as u8 * 50, y as u8 * 90, 7, 200]));

    save_png(&img, &path).unwrap();
    let back = load_image(&path).unwrap();
    assert_eq!(back, img);
}

#[test]
fn missing_source_is_reported_as_such() {
    let err = load_image(Path::new("target/unit_output/absent.png")).unwrap_err();
    assert!(matches!(err, DiagramError::MissingSourceImage(_)));
}

#[test]
fn undecodable_source_is_a_decode_error() {
    let path = scratch("garbage.png");
    std::fs::write(&path, b"definitely not a png").unwrap();
    let err = load_image(&path).unwrap_err();
    assert!(matches!(err, DiagramError::ImageDecode(_)));
}

#[test]
fn output_file_writes_png() {
    let path = scratch("final.png");
    let _ = std::fs::remove_file(&path);
    let img = RgbaImage::from_pixel(4, 4, Rgba([1, 2, 3, 255]));
    Output::File(path.clone()).finalize(&img).unwrap();
    assert!(path.is_file());
}

#[test]
fn missing_viewer_is_a_viewer_error() {
    let img = RgbaImage::from_pixel(1, 1, Rgba([0, 0, 0, 255]));
    let err = display(&img, "diagram-test-no-such-viewer-binary").unwrap_err();
    assert!(matches!(err, DiagramError::Viewer(_)));
}

#[cfg(unix)]
#[test]
fn viewer_file_is_removed_after_success() {
    let path = scratch("viewed_ok.png");
    let img = RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 255]));
    view_via_file(&img, "true", path.clone()).unwrap();
    assert!(!path.exists());
}

#[cfg(unix)]
#[test]
fn viewer_file_is_removed_after_failure() {
    let path = scratch("viewed_fail.png");
    let img = RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 255]));
    let err = view_via_file(&img, "false", path.clone()).unwrap_err();
    assert!(err.to_string().contains("exited with"));
    assert!(!path.exists());
}
