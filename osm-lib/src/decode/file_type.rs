//! Magic-number sniffing.

/// Container formats the engine can decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Wave,
    Ogg,
}

impl FileType {
    /// Detect the container from its leading bytes. File extensions play no
    /// part in detection.
    pub fn detect(data: &[u8]) -> Option<FileType> {
        if data.len() >= 4 && &data[0..4] == b"OggS" {
            return Some(FileType::Ogg);
        }
        if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WAVE" {
            return Some(FileType::Wave);
        }
        None
    }

    /// Extension passed to the symphonia probe as a hint.
    pub fn extension(self) -> &'static str {
        match self {
            FileType::Wave => "wav",
            FileType::Ogg => "ogg",
        }
    }
}
