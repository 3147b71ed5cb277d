//! Opening files with the operating system's default application

use std::io;
use std::path::Path;

/// Open `path` with the default handler for its type
///
/// A path that does not exist is reported as [`io::ErrorKind::NotFound`]
/// without starting the handler. A handler that fails to start or exits
/// unsuccessfully is an error too.
pub fn open_file(path: &Path) -> io::Result<()> {
    if !path.exists() {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("{} does not exist", path.display()),
        ));
    }

    log::debug!("opening {}", path.display());
    open::that(path)
}
