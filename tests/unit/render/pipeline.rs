use std::path::PathBuf;

use image::Rgba;

use super::*;
use crate::{
    foundation::core::{FOREGROUND, PixelPoint},
    render::output::save_png,
    text::testing::{BoxRenderer, FailingRenderer},
};

const WHITE: [u8; 4] = [255, 255, 255, 255];
const INK: [u8; 4] = [0, 128, 0, 255];

fn white(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_pixel(width, height, Rgba(WHITE))
}

#[test]
fn empty_plan_passes_the_image_through() {
    let renderer = BoxRenderer::new(1, 1, INK);
    let src = white(30, 20);
    let out = Compositor::new(src.clone(), &renderer)
        .run(&Plan::default())
        .unwrap();
    assert_eq!(out, src);
    assert!(renderer.calls.borrow().is_empty());
}

#[test]
fn captions_are_positioned_before_the_crop() {
    let renderer = BoxRenderer::new(4, 4, INK);
    let plan = Plan {
        grid: None,
        captions: vec![Caption::new("x", 10, PixelPoint::new(50, 50))],
        crop: Some(CropRect::new(40, 40, 60, 60).unwrap()),
    };
    let out = Compositor::new(white(100, 100), &renderer).run(&plan).unwrap();
    assert_eq!(out.dimensions(), (20, 20));
    // Caption covers source 48..52, i.e. 8..12 after the crop.
    assert_eq!(out.get_pixel(8, 8).0, INK);
    assert_eq!(out.get_pixel(11, 11).0, INK);
    assert_eq!(out.get_pixel(12, 12).0, WHITE);
}

#[test]
fn captions_draw_over_grid_lines() {
    let renderer = BoxRenderer::new(10, 10, INK);
    let plan = Plan {
        grid: Some(GridSpec::new(2, 0)),
        captions: vec![Caption::new("x", 10, PixelPoint::new(20, 10))],
        crop: None,
    };
    let out = Compositor::new(white(40, 20), &renderer).run(&plan).unwrap();
    assert_eq!(out.get_pixel(0, 10).0, FOREGROUND);
    assert_eq!(out.get_pixel(20, 10).0, INK);
}

#[test]
fn stages_cannot_run_backwards() {
    let renderer = BoxRenderer::new(2, 2, INK);
    let mut comp = Compositor::new(white(100, 100), &renderer);
    comp.apply_caption(&Caption::new("a", 5, PixelPoint::new(5, 5)))
        .unwrap();
    assert_eq!(comp.stage(), Stage::CaptionsApplied);

    let err = comp.apply_grid(GridSpec::new(2, 2)).err().unwrap();
    assert!(matches!(err, DiagramError::Validation(_)));

    comp.apply_crop(CropRect::new(0, 0, 10, 10).unwrap()).unwrap();
    assert!(
        comp.apply_caption(&Caption::new("b", 5, PixelPoint::new(1, 1)))
            .is_err()
    );
    assert_eq!(comp.image().dimensions(), (10, 10));
}

#[test]
fn repeated_captions_stay_in_their_stage() {
    let renderer = BoxRenderer::new(2, 2, INK);
    let mut comp = Compositor::new(white(10, 10), &renderer);
    comp.apply_captions(&[
        Caption::new("a", 5, PixelPoint::new(2, 2)),
        Caption::new("b", 5, PixelPoint::new(7, 7)),
    ])
    .unwrap();
    assert_eq!(renderer.calls.borrow().len(), 2);
    assert_eq!(comp.stage(), Stage::CaptionsApplied);
}

#[test]
fn render_failure_leaves_no_output() {
    let dir = PathBuf::from("target").join("unit_pipeline");
    std::fs::create_dir_all(&dir).unwrap();
    let src = dir.join("src.png");
    let out = dir.join("never.png");
    let _ = std::fs::remove_file(&out);
    save_png(&white(200, 200), &src).unwrap();

    let plan = Plan {
        captions: vec![Caption::new("x", 10, PixelPoint::new(5, 5))],
        ..Plan::default()
    };
    let err = render_once(&src, &plan, &Output::File(out.clone()), &FailingRenderer).unwrap_err();
    assert!(matches!(err, DiagramError::RenderFailure(_)));
    assert!(!out.exists());
}

#[test]
fn bad_crop_fails_the_run() {
    let renderer = BoxRenderer::new(2, 2, INK);
    let plan = Plan {
        crop: Some(CropRect::new(0, 0, 500, 10).unwrap()),
        ..Plan::default()
    };
    let err = Compositor::new(white(50, 50), &renderer).run(&plan).unwrap_err();
    assert!(matches!(err, DiagramError::InvalidCropRect(_)));
}
