/// A trait used to buffer data. Conceptually, a buffer starts empty,
/// has some data written to it. The buffer holds that data while it's
/// uncommitted, then something else commits that data e.g. by writing it
/// to the outside world. Once all data has been committed, then the buffer
/// is again empty.
///
/// See [FixedBuffer] for a minimal buffer implementation.
pub trait Buffer {
    /// Get the writable slice of the buffer.
    fn writable(&mut self) -> &mut [u8];

    /// Mark the first `len` bytes as having been written to the writable
    /// part of the buffer.
    ///
    /// ## Panics
    ///
    /// Implementations may panic if `len > self.writable().len()`.
    fn written(&mut self, len: usize);

    /// Get the uncommitted slice of the buffer. This is data that has
    /// been written to the buffer but not yet committed.
    fn uncommitted(&self) -> &[u8];

    /// Mark the first `len` bytes as having been committed to the uncommitted
    /// part of the buffer, e.g. because it was flushed to the outside world.
    /// Implementations may then free the committed space to allow for
    /// writing again.
    ///
    /// ## Panics
    ///
    /// Implementations may panic if `len > self.uncommitted().len()`.
    fn commit(&mut self, len: usize);
}

/// A [Buffer] that wraps some fixed-size array-like type, which uses two
/// indices to track the writable, uncommitted, and commmitted parts of the
/// buffer.
///
/// The buffer will look like this internally:
///
/// ```plain
/// |--------------------- buffer ---------------------|
/// |-- (committed) --|-- uncommitted --|-- writable --|
///                 ^ head            ^ tail
/// ```
///
/// - When data is written to the buffer, `tail` is bumped forward
/// - When data is committed from the buffer, `head` is bumped forward
/// - Once all data is committed, then `head` and `tail` are reset
#[derive(Debug)]
pub struct FixedBuffer<T> {
    buffer: T,
    head: usize,
    tail: usize,
}

impl<T> FixedBuffer<T> {
    pub fn new(buffer: T) -> Self {
        Self {
            buffer,
            head: 0,
            tail: 0,
        }
    }
}

impl<T> Buffer for FixedBuffer<T>
where
    T: AsRef<[u8]> + AsMut<[u8]>,
{
    fn writable(&mut self) -> &mut [u8] {
        let buffer = self.buffer.as_mut();
        &mut buffer[self.tail..]
    }

    fn written(&mut self, len: usize) {
        self.tail += len;
        assert!(self.tail <= self.buffer.as_ref().len());
    }

    fn uncommitted(&self) -> &[u8] {
        let buffer = self.buffer.as_ref();
        &buffer[self.head..self.tail]
    }

    fn commit(&mut self, len: usize) {
        self.head += len;
        assert!(self.head <= self.tail);

        if self.head == self.tail {
            self.head = 0;
            self.tail = 0;
        }
    }
}

/// Invoke one engine step with the buffer's writable region as the
/// destination, recording however many bytes the step produced. This is
/// the single drive point shared by the encode, decode, and concat loops.
pub fn with_codec_out_buffer(
    buffer: &mut impl Buffer,
    f: impl FnOnce(&mut [u8]) -> crate::error::Result<crate::codec::Progress>,
) -> crate::error::Result<crate::codec::Progress> {
    let progress = f(buffer.writable())?;
    buffer.written(progress.produced);
    Ok(progress)
}

/// Drain every uncommitted byte in `buffer` to `writer`. The engines are
/// only re-invoked once this returns, which is what bounds their output to
/// the buffer size.
pub fn drain_to_writer(
    buffer: &mut impl Buffer,
    writer: &mut impl std::io::Write,
) -> std::io::Result<()> {
    loop {
        let uncommitted = buffer.uncommitted();
        if uncommitted.is_empty() {
            return Ok(());
        }

        let committed = writer.write(uncommitted)?;
        buffer.commit(committed);

        if committed == 0 {
            return Err(std::io::Error::new(
                std::io::ErrorKind::WriteZero,
                "failed to write buffered data",
            ));
        }
    }
}
