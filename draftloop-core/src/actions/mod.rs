pub mod navigation;

pub use navigation::highlight_line;
