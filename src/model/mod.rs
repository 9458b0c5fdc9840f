pub mod contig;
pub mod counts;
pub mod read;
pub mod region;

pub use contig::ContigTable;
pub use counts::ReadCountsByLib;
pub use read::{Read, ReadFlag, Strand};
pub use region::BasicRegion;
