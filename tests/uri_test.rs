use anyhow::Result;
use mxl_comparison_player::uri_helpers::{local_path, source_uri, uri_from_pathbuf};
use tempfile::NamedTempFile;

#[test]
fn source_paths_become_file_uris() -> Result<()> {
    let file = NamedTempFile::new()?;
    let path = file.path().to_string_lossy().to_string();

    let uri = source_uri(&path)?;
    assert!(uri.starts_with("file://"), "unexpected uri {uri}");
    assert_eq!(uri, uri_from_pathbuf(file.path())?);
    assert_eq!(local_path(&uri), Some(file.path().to_path_buf()));

    Ok(())
}

#[test]
fn source_uris_pass_through() -> Result<()> {
    let uri = "https://example.com/media/clip.mp4";
    assert_eq!(source_uri(uri)?, uri);
    assert_eq!(local_path(uri), None);

    Ok(())
}

#[test]
fn missing_relative_source_is_rejected() {
    assert!(source_uri("missing/clip.mp4").is_err());
}
