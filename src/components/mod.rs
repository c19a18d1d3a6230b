pub mod map_view;
pub mod modal;
pub mod popup;

pub use map_view::{MapStatus, MapView};
pub use modal::{AboutModal, Modal, ScreenshotModal};
pub use popup::Popup;
