use image::{Rgba, RgbaImage};

use super::*;
use crate::{foundation::core::PixelPoint, text::testing::BoxRenderer};

const INK: [u8; 4] = [200, 0, 0, 255];

fn workspace(name: &str) -> PathBuf {
    let dir = PathBuf::from("target").join("unit_session").join(name);
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn source_in(dir: &Path) -> PathBuf {
    let path = dir.join("source.png");
    save_png(
        &RgbaImage::from_pixel(120, 80, Rgba([255, 255, 255, 255])),
        &path,
    )
    .unwrap();
    path
}

fn request(captions: &[&str]) -> RenderRequest {
    RenderRequest {
        grid: ",".to_owned(),
        captions: captions.iter().map(|s| (*s).to_owned()).collect(),
        dump: String::new(),
        crop: ",,,".to_owned(),
    }
}

#[test]
fn placeholder_grid_and_crop_mean_none() {
    let plan = request(&[]).to_plan().unwrap();
    assert_eq!(plan.plan, Plan::default());
}

#[test]
fn caption_entries_become_captions_and_dump_lines() {
    let req = RenderRequest {
        grid: "2,3".to_owned(),
        captions: vec![
            "H_1,84,500,800".to_owned(),
            String::new(),
            "broken,84".to_owned(),
            "O,big,1,1".to_owned(),
            "C_2,40,-3,9".to_owned(),
        ],
        dump: String::new(),
        crop: "0,0,10,10".to_owned(),
    };
    let plan = req.to_plan().unwrap();

    assert_eq!(plan.plan.grid, Some(GridSpec::new(2, 3)));
    assert_eq!(plan.plan.crop, Some(CropRect::new(0, 0, 10, 10).unwrap()));
    assert_eq!(
        plan.plan.captions,
        vec![
            Caption::new("H<sub>1</sub>", 84, PixelPoint::new(500, 800)),
            Caption::new("C<sub>2</sub>", 40, PixelPoint::new(-3, 9)),
        ]
    );
    assert_eq!(
        plan.dump_lines,
        vec!["H_1 84 500,800", "O big 1,1", "C_2 40 -3,9"]
    );
    assert_eq!(plan.warnings.len(), 1);
}

#[test]
fn bad_coordinates_fail_the_request() {
    let err = request(&["A,10,x,1"]).to_plan().unwrap_err();
    assert!(matches!(
        err,
        DiagramError::MalformedCaptionCoordinates { .. }
    ));
}

#[test]
fn requests_deserialize_with_defaults_and_aliases() {
    let req: RenderRequest = serde_json::from_str(r#"{"cap": ["a,1,2,3"]}"#).unwrap();
    assert_eq!(req.captions, vec!["a,1,2,3"]);
    assert!(req.grid.is_empty() && req.dump.is_empty() && req.crop.is_empty());
}

#[test]
fn state_exposes_preloaded_captions() {
    let dir = workspace("state");
    let src = source_in(&dir);
    let cap = dir.join("in.cap");
    std::fs::write(&cap, "H_1 84 500,800\n").unwrap();

    let session =
        InteractiveSession::new(&src, Some(cap.clone()), BoxRenderer::new(1, 1, INK), &dir)
            .unwrap();
    let state = session.state();
    assert_eq!(state.image, src);
    assert_eq!(state.caption_file, Some(cap));
    assert_eq!(state.captions.len(), 1);
    assert!(session.last_artifact().is_none());
}

#[test]
fn missing_source_fails_at_startup() {
    let dir = workspace("missing");
    let err = InteractiveSession::new(
        dir.join("nope.png"),
        None,
        BoxRenderer::new(1, 1, INK),
        &dir,
    )
    .err()
    .unwrap();
    assert!(matches!(err, DiagramError::MissingSourceImage(_)));
}

#[test]
fn new_artifacts_supersede_old_ones() {
    let dir = workspace("supersede");
    let src = source_in(&dir);
    let mut session =
        InteractiveSession::new(&src, None, BoxRenderer::new(4, 4, INK), &dir).unwrap();

    let first = session.handle(&request(&["x,10,10,10"])).unwrap();
    assert!(first.is_file());

    let second = session.handle(&request(&["x,10,20,20"])).unwrap();
    assert_ne!(first, second);
    assert!(second.is_file());
    assert!(!first.exists(), "previous artifact is deleted");
    assert_eq!(session.last_artifact(), Some(second.as_path()));

    let rendered = load_image(&second).unwrap();
    assert_eq!(rendered.get_pixel(20, 20).0, INK);
    assert_eq!(rendered.get_pixel(10, 10).0, [255, 255, 255, 255]);

    drop(session);
    assert!(!second.exists(), "dropping the session cleans up");
}

#[test]
fn failed_requests_keep_the_previous_artifact() {
    let dir = workspace("failed");
    let src = source_in(&dir);
    let mut session =
        InteractiveSession::new(&src, None, BoxRenderer::new(4, 4, INK), &dir).unwrap();

    let first = session.handle(&request(&[])).unwrap();
    let mut bad = request(&[]);
    bad.crop = "0,0,500,500".to_owned();
    assert!(session.handle(&bad).is_err());
    assert!(first.is_file());
    assert_eq!(session.last_artifact(), Some(first.as_path()));
}

#[test]
fn dump_writes_a_reloadable_caption_file() {
    let dir = workspace("dump");
    let src = source_in(&dir);
    let dump = dir.join("saved/out.cap");
    let mut session =
        InteractiveSession::new(&src, None, BoxRenderer::new(2, 2, INK), &dir).unwrap();

    let mut req = request(&["H_2,30,5,6", "O,30,7,8"]);
    req.dump = dump.to_string_lossy().into_owned();
    session.handle(&req).unwrap();

    let saved = std::fs::read_to_string(&dump).unwrap();
    assert_eq!(saved, "H_2 30 5,6\nO 30 7,8\n");
    let reparsed = read_caption_file(&dump).unwrap();
    assert_eq!(reparsed.captions.len(), 2);
    assert_eq!(reparsed.captions[0].text, "H<sub>2</sub>");
}
