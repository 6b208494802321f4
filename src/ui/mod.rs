pub mod draw;
pub mod rect;

pub use draw::draw_box;
pub use rect::Rect;
