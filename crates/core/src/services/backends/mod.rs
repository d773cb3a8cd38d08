pub mod dumpbin;
pub mod ldd;
pub mod otool;

pub use dumpbin::DumpbinExtractor;
pub use ldd::LddExtractor;
pub use otool::OtoolExtractor;
