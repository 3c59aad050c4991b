use std::{error::Error, fmt, io};

/// Errors a caller can trigger when compressing.
///
/// Broken internal invariants (a zero-length command met while reading
/// the solved chain back) are bugs, not inputs, and panic instead.
#[derive(Debug)]
#[non_exhaustive]
pub enum PackError {
    /// The codec cannot represent inputs this small.
    InputTooSmall { size: usize, min: usize },
    /// The codec's size fields cannot address inputs this large.
    InputTooLarge { size: usize, max: usize },
    /// A verbatim prefix was requested past the end of the input.
    SkippedTooLong { skipped: usize, size: usize },
    Io(io::Error),
}

impl fmt::Display for PackError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PackError::InputTooSmall { size, min } => {
                write!(f, "input of {} bytes is below the codec minimum of {}", size, min)
            }
            PackError::InputTooLarge { size, max } => {
                write!(f, "input of {} bytes exceeds the codec maximum of {}", size, max)
            }
            PackError::SkippedTooLong { skipped, size } => write!(
                f,
                "verbatim prefix of {} bytes exceeds the {} byte input",
                skipped, size
            ),
            PackError::Io(_) => write!(f, "IO issue"),
        }
    }
}

impl Error for PackError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            PackError::Io(e) => Some(e as &dyn Error),
            _ => None,
        }
    }
}

impl From<io::Error> for PackError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

/// Reject inputs outside a codec's representable size window.
pub(crate) fn check_size(size: usize, min: usize, max: usize) -> Result<(), PackError> {
    if size < min {
        Err(PackError::InputTooSmall { size, min })
    } else if size > max {
        Err(PackError::InputTooLarge { size, max })
    } else {
        Ok(())
    }
}
