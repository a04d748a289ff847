//! Offering generated CSV text as a file download.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("browser refused the download: {0}")]
    Browser(String),
    #[error("invalid file name {0:?}")]
    InvalidName(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Hand `content` to the browser as `filename` through a Blob object URL and a
/// synthetic `<a download>` click. Nothing leaves the machine.
#[cfg(target_arch = "wasm32")]
pub fn download_csv(filename: &str, content: &str) -> Result<(), DownloadError> {
    use wasm_bindgen::{JsCast, JsValue};
    use web_sys::{Blob, BlobPropertyBag, HtmlAnchorElement, Url};

    fn browser(value: JsValue) -> DownloadError {
        DownloadError::Browser(format!("{value:?}"))
    }

    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| DownloadError::Browser("no document".to_string()))?;

    let parts = js_sys::Array::new();
    parts.push(&JsValue::from_str(content));
    let options = BlobPropertyBag::new();
    options.set_type("text/csv;charset=utf-8");
    let blob = Blob::new_with_str_sequence_and_options(&parts, &options).map_err(browser)?;
    let url = Url::create_object_url_with_blob(&blob).map_err(browser)?;

    let anchor: HtmlAnchorElement = document
        .create_element("a")
        .map_err(browser)?
        .dyn_into()
        .map_err(|_| DownloadError::Browser("not an anchor".to_string()))?;
    anchor.set_href(&url);
    anchor.set_download(filename);
    anchor.click();

    Url::revoke_object_url(&url).map_err(browser)?;
    tracing::info!("offered {filename} for download");
    Ok(())
}

/// Off the web the file is written to the working directory.
#[cfg(not(target_arch = "wasm32"))]
pub fn download_csv(filename: &str, content: &str) -> Result<(), DownloadError> {
    let dir = std::env::current_dir()?;
    let path = write_csv(&dir, filename, content)?;
    tracing::info!("wrote {}", path.display());
    Ok(())
}

#[cfg(not(target_arch = "wasm32"))]
pub fn write_csv(
    dir: &std::path::Path,
    filename: &str,
    content: &str,
) -> Result<std::path::PathBuf, DownloadError> {
    let name = std::path::Path::new(filename)
        .file_name()
        .ok_or_else(|| DownloadError::InvalidName(filename.to_string()))?;
    let path = dir.join(name);
    std::fs::write(&path, content)?;
    Ok(path)
}
