use anyhow::Result;
use log::*;
use mxl_relm4_components::relm4::gtk::{
    gio::{prelude::FileExt, File},
    glib,
};
use std::path::{Path, PathBuf};

pub fn uri_from_pathbuf(path: &Path) -> Result<String> {
    if let Some(path_string) = path.to_str() {
        let uri = if path.is_file() {
            let file_path = File::for_path(path);
            trace!(
                "file_path(:?) = {:?} file_path(uri) = {}",
                file_path,
                file_path.uri().as_str()
            );
            glib::Uri::parse(file_path.uri().as_str(), glib::UriFlags::PARSE_RELAXED)?
        } else {
            glib::Uri::parse(path_string, glib::UriFlags::PARSE_RELAXED)?
        };

        return Ok(uri.to_str().to_string());
    }
    Err(anyhow::anyhow!(
        "The path {} is not a valid URI",
        path.to_str().unwrap_or_default()
    ))
}

/// Media source as URI; strings without a scheme are treated as file paths.
pub fn source_uri(source: &str) -> Result<String> {
    if glib::Uri::peek_scheme(source).is_some() {
        return Ok(source.to_owned());
    }
    uri_from_pathbuf(Path::new(source))
}

/// Local file behind a `file://` URI.
pub fn local_path(uri: &str) -> Option<PathBuf> {
    if !glib::Uri::peek_scheme(uri).is_some_and(|scheme| scheme.as_str() == "file") {
        return None;
    }
    glib::filename_from_uri(uri).ok().map(|(path, _)| path)
}
