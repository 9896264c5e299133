pub mod aligned_buffer;
pub mod checksum;
pub mod pattern;

pub use aligned_buffer::AlignedBuffer;
pub use checksum::{calculate_checksum, verify_checksum};
pub use pattern::{fill_test_pattern, verify_test_pattern};
