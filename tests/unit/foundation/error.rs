use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        DiagramError::malformed_line(3, "expected 3 fields")
            .to_string()
            .contains("malformed caption line 3:")
    );
    assert!(
        DiagramError::malformed_coordinates(7, "500;800")
            .to_string()
            .contains("malformed caption coordinates on line 7")
    );
    assert!(
        DiagramError::crop("x")
            .to_string()
            .contains("invalid crop rectangle:")
    );
    assert!(
        DiagramError::grid("x")
            .to_string()
            .contains("invalid grid specification:")
    );
    assert!(
        DiagramError::render("x")
            .to_string()
            .contains("text render failure:")
    );
    assert!(
        DiagramError::validation("x")
            .to_string()
            .contains("validation error:")
    );
}

#[test]
fn missing_source_names_the_path() {
    let err = DiagramError::MissingSourceImage(PathBuf::from("nope/c2h4.png"));
    assert!(err.to_string().contains("nope/c2h4.png"));
}

#[test]
fn only_caption_lines_are_recoverable() {
    assert!(DiagramError::malformed_line(1, "bad size").is_recoverable());
    assert!(!DiagramError::malformed_coordinates(1, "1").is_recoverable());
    assert!(!DiagramError::crop("x").is_recoverable());
    assert!(!DiagramError::render("x").is_recoverable());
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = DiagramError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
