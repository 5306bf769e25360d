use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Which input a file was selected for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Top,
    Bottom,
}

impl Slot {
    pub const ALL: [Slot; 2] = [Slot::Top, Slot::Bottom];

    pub fn as_str(&self) -> &'static str {
        match self {
            Slot::Top => "top",
            Slot::Bottom => "bottom",
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Library error type for merge operations.
#[derive(Debug, Error)]
pub enum MergeError {
    /// One of the two inputs has not been chosen yet.
    #[error("no image selected for the {slot} slot")]
    MissingSelection { slot: Slot },

    /// The file's declared type is not an image format.
    #[error("{} is not an image file ({slot} slot)", .path.display())]
    NotAnImage { slot: Slot, path: PathBuf },

    /// Reading or decoding the selected file failed.
    #[error("failed to decode {} ({slot} slot)", .path.display())]
    Decode {
        slot: Slot,
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// The encoder cannot produce a JPEG in this build.
    #[error("JPEG export is not supported: {0}")]
    ExportUnsupported(String),

    /// Scaling or painting onto the canvas failed.
    #[error("render error: {0}")]
    Render(String),

    /// Encoding failed for any other reason.
    #[error("failed to encode merged image")]
    Export(#[source] image::ImageError),

    /// Underlying IO error while writing the output.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A blocking worker panicked or was torn down.
    #[error("merge worker failed: {0}")]
    Worker(String),
}

impl MergeError {
    /// Status-line text shown to the user for this failure.
    pub fn user_message(&self) -> &'static str {
        match self {
            MergeError::MissingSelection { .. } => "Select both a top and a bottom image to merge.",
            MergeError::NotAnImage { .. } => "Please select an image file.",
            MergeError::ExportUnsupported(_) => {
                "This build cannot export JPEG images. (Try a different build or platform.)"
            }
            MergeError::Decode { .. }
            | MergeError::Render(_)
            | MergeError::Export(_)
            | MergeError::Io(_)
            | MergeError::Worker(_) => {
                "An error occurred. Please select the images again and retry."
            }
        }
    }

    /// Maps an encoder failure onto the unsupported/other split.
    pub fn from_encode(err: image::ImageError) -> Self {
        match err {
            image::ImageError::Unsupported(unsupported) => {
                MergeError::ExportUnsupported(unsupported.to_string())
            }
            other => MergeError::Export(other),
        }
    }

    pub fn slot(&self) -> Option<Slot> {
        match self {
            MergeError::MissingSelection { slot }
            | MergeError::NotAnImage { slot, .. }
            | MergeError::Decode { slot, .. } => Some(*slot),
            _ => None,
        }
    }
}

impl From<tokio::task::JoinError> for MergeError {
    fn from(err: tokio::task::JoinError) -> Self {
        MergeError::Worker(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::error::{ImageFormatHint, UnsupportedError, UnsupportedErrorKind};

    #[test]
    fn unsupported_encoder_maps_to_distinct_message() {
        let err = image::ImageError::Unsupported(UnsupportedError::from_format_and_kind(
            ImageFormatHint::Exact(image::ImageFormat::Jpeg),
            UnsupportedErrorKind::Format(ImageFormatHint::Exact(image::ImageFormat::Jpeg)),
        ));
        let mapped = MergeError::from_encode(err);
        assert!(matches!(mapped, MergeError::ExportUnsupported(_)));
        assert_ne!(
            mapped.user_message(),
            MergeError::Worker("x".into()).user_message()
        );
    }

    #[test]
    fn other_encoder_failures_are_generic() {
        let err = image::ImageError::IoError(std::io::Error::other("disk gone"));
        let mapped = MergeError::from_encode(err);
        assert!(matches!(mapped, MergeError::Export(_)));
        assert_eq!(
            mapped.user_message(),
            "An error occurred. Please select the images again and retry."
        );
    }

    #[test]
    fn slot_is_reported_for_input_errors() {
        let err = MergeError::NotAnImage {
            slot: Slot::Bottom,
            path: PathBuf::from("notes.txt"),
        };
        assert_eq!(err.slot(), Some(Slot::Bottom));
        assert_eq!(err.to_string(), "notes.txt is not an image file (bottom slot)");
    }
}
