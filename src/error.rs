/// Errors produced while framing, transforming, or concatenating block
/// streams.
///
/// Argument errors are reported synchronously by the builders, before any
/// I/O. Decode errors are terminal: once one surfaces, any bytes already
/// flushed to the sink are undefined and the run cannot be resumed.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Compression quality outside the supported range.
    #[error("compression quality {0} is out of range (0..=11)")]
    QualityOutOfRange(u32),

    /// Window size exponent outside the supported range.
    #[error("window size {0} is out of range (10..=24)")]
    WindowBitsOutOfRange(u8),

    /// A transfer buffer was configured with zero capacity.
    #[error("buffer size must be greater than zero")]
    ZeroBufferSize,

    /// The compressed bytes are not a valid (or not yet complete) stream.
    #[error("invalid compressed data")]
    InvalidData,

    /// A segment declared a window size larger than the target window size
    /// or a window size seen earlier in the same concatenation run.
    #[error("segment window size exceeds the window size of the output stream")]
    WindowSizeExceeded,

    /// A segment was not compressed with the catable flag.
    #[error("segment was not crafted for concatenation")]
    NotCatable,

    /// The leading segment was not compressed with the appendable flag.
    #[error("segment was not crafted for appending")]
    NotAppendable,

    /// A blocked read exceeded the configured timeout.
    #[error("read did not complete within the configured timeout")]
    ReadTimeout,

    /// A blocked write exceeded the configured timeout.
    #[error("write did not complete within the configured timeout")]
    WriteTimeout,

    /// Failure reported by the underlying source or sink.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<Error> for std::io::Error {
    fn from(err: Error) -> Self {
        let kind = match &err {
            Error::Io(_) => std::io::ErrorKind::Other,
            Error::InvalidData
            | Error::WindowSizeExceeded
            | Error::NotCatable
            | Error::NotAppendable => std::io::ErrorKind::InvalidData,
            Error::ReadTimeout | Error::WriteTimeout => std::io::ErrorKind::TimedOut,
            Error::QualityOutOfRange(_) | Error::WindowBitsOutOfRange(_) | Error::ZeroBufferSize => {
                std::io::ErrorKind::InvalidInput
            }
        };

        match err {
            Error::Io(io) => io,
            other => std::io::Error::new(kind, other),
        }
    }
}

impl Error {
    /// Recover a crate error that crossed a `std::io` trait boundary,
    /// falling back to [`Error::Io`] for genuine I/O failures.
    pub(crate) fn from_io(err: std::io::Error) -> Self {
        match err.downcast::<Error>() {
            Ok(err) => err,
            Err(err) => Error::Io(err),
        }
    }
}
