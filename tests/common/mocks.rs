//! Mock output stream for exercising write failures.
use mockall::mock;

use std::io::{self, Write};

mock! {
    pub Output {}
    impl Write for Output {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize>;
        fn flush(&mut self) -> io::Result<()>;
    }
}

/// An output whose every write fails, as a full disk would.
pub fn failing_output() -> MockOutput {
    let mut output = MockOutput::new();
    output
        .expect_write()
        .returning(|_| Err(io::Error::other("no space left on device")));
    output.expect_flush().returning(|| Ok(()));
    output
}
