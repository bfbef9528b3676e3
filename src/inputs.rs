/// An uploaded file after decoding, ready for formatting.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadedFile {
    pub filename: String,
    pub content: String,
}

#[derive(Debug, Clone)]
pub enum Error {
    NotUtf8 { filename: String, message: String },
    UnreadableFile(String),
}

#[rustfmt::skip]
impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotUtf8 { filename, message }
                => write!(f, "{:?} is not UTF-8 text: {}", filename, message),
            Self::UnreadableFile(message) => write!(f, "{}", message),
        }
    }
}

impl std::error::Error for Error {}

impl UploadedFile {
    pub fn decode(filename: impl Into<String>, bytes: Vec<u8>) -> Result<Self, Error> {
        let filename = filename.into();
        match String::from_utf8(bytes) {
            Ok(content) => Ok(Self { filename, content }),
            Err(e) => Err(Error::NotUtf8 {
                filename,
                message: e.utf8_error().to_string(),
            }),
        }
    }

    /// Read a file from disk; the upload name is the path's final component.
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        let bytes = std::fs::read(path)
            .map_err(|e| Error::UnreadableFile(format!("{:?}: {}", path, e)))?;
        Self::decode(filename, bytes)
    }

    pub fn as_pair(&self) -> (&str, &str) {
        (self.filename.as_str(), self.content.as_str())
    }
}

/// Decode a whole batch. Any undecodable file fails the batch.
pub fn decode_batch<N: Into<String>>(
    uploads: impl IntoIterator<Item = (N, Vec<u8>)>,
) -> Result<Vec<UploadedFile>, Error> {
    uploads
        .into_iter()
        .map(|(filename, bytes)| UploadedFile::decode(filename, bytes))
        .collect()
}

pub fn filenames(files: &[UploadedFile]) -> Vec<String> {
    files.iter().map(|f| f.filename.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_utf8() {
        let file = UploadedFile::decode("a.py", b"print('\xc3\xa9')".to_vec()).unwrap();
        assert_eq!(file.content, "print('é')");
        assert_eq!(file.as_pair(), ("a.py", "print('é')"));
    }

    #[test]
    fn one_bad_file_fails_batch() {
        let result = decode_batch([
            ("ok.txt", b"fine".to_vec()),
            ("bad.bin", vec![0xff, 0xfe, 0x00]),
        ]);
        match result {
            Err(Error::NotUtf8 { filename, .. }) => assert_eq!(filename, "bad.bin"),
            other => panic!("expected decode failure, got {:?}", other),
        }
    }

    #[test]
    fn load_uses_final_component() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Makefile");
        std::fs::write(&path, "all:\n\ttrue\n").unwrap();
        let file = UploadedFile::load(&path).unwrap();
        assert_eq!(file.filename, "Makefile");
        assert_eq!(file.content, "all:\n\ttrue\n");
        assert!(matches!(
            UploadedFile::load(dir.path().join("missing.txt")),
            Err(Error::UnreadableFile(_))
        ));
    }
}
