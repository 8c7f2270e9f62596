use crate::core::Point;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("accessibility permission is not granted")]
    PermissionDenied,
    #[error("failed to install the pointer event tap")]
    TapInstallFailed,
    #[error("no window at ({}, {})", .0.x, .0.y)]
    NoWindowAtPoint(Point),
    #[error("window geometry could not be read")]
    GeometryUnreadable,
}
