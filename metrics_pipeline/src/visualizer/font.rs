use std::{
    fs,
    path::{Path, PathBuf},
    sync::Mutex,
};

use plotters::style::{FontStyle, register_font};
use tracing::debug;

/// Family name every chart text element is drawn with.
pub const FAMILY: &str = "sans-serif";

/// DejaVu Sans, used unless a font file is configured.
static BUNDLED: &[u8] = include_bytes!("../../assets/DejaVuSans.ttf");

/// Font currently registered under [`FAMILY`]: `Some(None)` is the bundled one.
static REGISTERED: Mutex<Option<Option<PathBuf>>> = Mutex::new(None);

/// Registers the font at `path`, or the bundled font when `path` is `None`,
/// for [`FAMILY`]. Registration happens once per distinct choice.
///
/// The font bytes must outlive every chart, so each file read from disk is
/// leaked. Switching fonts repeatedly within one process leaks one copy
/// per switch.
pub fn ensure_registered(path: Option<&Path>) -> Result<(), String> {
    let mut current = REGISTERED
        .lock()
        .map_err(|_| "font registry lock poisoned".to_string())?;
    if current.as_ref().map(Option::as_deref) == Some(path) {
        return Ok(());
    }

    let bytes: &'static [u8] = match path {
        None => BUNDLED,
        Some(path) => {
            let bytes =
                fs::read(path).map_err(|e| format!("cannot read font {}: {e}", path.display()))?;
            Box::leak(bytes.into_boxed_slice())
        }
    };
    register_font(FAMILY, FontStyle::Normal, bytes).map_err(|_| match path {
        Some(path) => format!("invalid font {}", path.display()),
        None => "invalid bundled font".to_string(),
    })?;

    match path {
        Some(path) => debug!(font = %path.display(), "chart font registered"),
        None => debug!("bundled chart font registered"),
    }
    *current = Some(path.map(Path::to_path_buf));
    Ok(())
}
