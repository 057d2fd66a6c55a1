use std::fmt;
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::PathBuf;

use chrono::Utc;
use mime_guess::mime;

use crate::config::UploadConfig;

/// Which user attachment a file is uploaded as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Photo,
    Cv,
}

impl UploadKind {
    pub const fn label(self) -> &'static str {
        match self {
            UploadKind::Photo => "photo",
            UploadKind::Cv => "cv",
        }
    }

    pub const fn allowed_extensions(self) -> &'static [&'static str] {
        match self {
            UploadKind::Photo => &["jpg", "jpeg", "png", "gif"],
            UploadKind::Cv => &["pdf", "doc", "docx"],
        }
    }

    fn accepts(self, guessed: &mime::Mime) -> bool {
        match self {
            UploadKind::Photo => guessed.type_() == mime::IMAGE,
            UploadKind::Cv => guessed.type_() == mime::APPLICATION,
        }
    }
}

impl fmt::Display for UploadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// File received from a multipart form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }

    pub fn extension(&self) -> String {
        self.file_name
            .rsplit_once('.')
            .map(|(_, extension)| extension.to_ascii_lowercase())
            .unwrap_or_default()
    }
}

/// Size and type restrictions applied before anything touches the disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadPolicy {
    max_file_size: u64,
}

impl UploadPolicy {
    pub fn new(max_file_size: u64) -> Self {
        Self { max_file_size }
    }

    pub fn max_file_size(&self) -> u64 {
        self.max_file_size
    }

    pub fn check(&self, kind: UploadKind, file: &UploadedFile) -> Result<(), UploadError> {
        if file.bytes.is_empty() {
            return Err(UploadError::Empty { kind });
        }
        if file.bytes.len() as u64 > self.max_file_size {
            return Err(UploadError::TooLarge {
                file_name: file.file_name.clone(),
                limit: self.max_file_size,
            });
        }

        let extension = file.extension();
        let guessed_ok = mime_guess::from_ext(&extension)
            .first()
            .is_some_and(|guessed| kind.accepts(&guessed));
        if !kind.allowed_extensions().contains(&extension.as_str()) || !guessed_ok {
            return Err(UploadError::ExtensionNotAllowed { kind, extension });
        }
        Ok(())
    }
}

/// Destination for accepted uploads; returns the stored location.
pub trait FileStore: Send + Sync {
    /// Applies the upload policy without writing anything.
    fn check(&self, kind: UploadKind, file: &UploadedFile) -> Result<(), UploadError>;

    fn store(&self, kind: UploadKind, file: &UploadedFile) -> Result<String, UploadError>;

    /// Removes a location returned by [`FileStore::store`] whose record was never saved.
    fn discard(&self, location: &str);
}

/// Attempts at a free name before giving up on a directory.
const MAX_NAME_ATTEMPTS: u32 = 64;

/// Writes uploads into a local directory as `<unix-millis>_<name>`, adding a counter
/// (`<unix-millis>_<n>_<name>`) when that name is already taken.
#[derive(Debug, Clone)]
pub struct DiskFileStore {
    directory: PathBuf,
    policy: UploadPolicy,
}

impl DiskFileStore {
    pub fn new(config: &UploadConfig) -> Self {
        Self {
            directory: config.directory.clone(),
            policy: UploadPolicy::new(config.max_file_size),
        }
    }

    pub fn policy(&self) -> UploadPolicy {
        self.policy
    }
}

impl FileStore for DiskFileStore {
    fn check(&self, kind: UploadKind, file: &UploadedFile) -> Result<(), UploadError> {
        self.policy.check(kind, file)
    }

    fn store(&self, kind: UploadKind, file: &UploadedFile) -> Result<String, UploadError> {
        self.policy.check(kind, file)?;

        let io_error = |source: std::io::Error| UploadError::Io {
            file_name: file.file_name.clone(),
            source,
        };
        std::fs::create_dir_all(&self.directory).map_err(io_error)?;

        let millis = Utc::now().timestamp_millis();
        let name = sanitize_file_name(&file.file_name);
        for attempt in 0..MAX_NAME_ATTEMPTS {
            let stored_name = match attempt {
                0 => format!("{millis}_{name}"),
                n => format!("{millis}_{n}_{name}"),
            };
            let path = self.directory.join(stored_name);
            // create_new never clobbers an earlier upload with the same name
            let mut target = match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(target) => target,
                Err(err) if err.kind() == ErrorKind::AlreadyExists => continue,
                Err(err) => return Err(io_error(err)),
            };
            if let Err(err) = target.write_all(&file.bytes) {
                drop(target);
                let _ = std::fs::remove_file(&path);
                return Err(io_error(err));
            }

            tracing::debug!(kind = %kind, path = %path.display(), "stored upload");
            return Ok(path.to_string_lossy().into_owned());
        }

        Err(io_error(std::io::Error::new(
            ErrorKind::AlreadyExists,
            "no free file name in upload directory",
        )))
    }

    fn discard(&self, location: &str) {
        match std::fs::remove_file(location) {
            Ok(()) => tracing::debug!(path = %location, "discarded upload"),
            Err(err) => tracing::warn!(path = %location, error = %err, "failed to discard upload"),
        }
    }
}

/// Keeps the final path component and replaces anything outside `[A-Za-z0-9._-]`.
pub fn sanitize_file_name(raw: &str) -> String {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or(raw);
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let trimmed = cleaned.trim_start_matches('.');
    if trimmed.is_empty() {
        "upload".to_string()
    } else {
        trimmed.to_string()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("{kind} file must not be empty")]
    Empty { kind: UploadKind },
    #[error("file {file_name} is larger than {limit} bytes")]
    TooLarge { file_name: String, limit: u64 },
    #[error("{kind} file type .{extension} is not allowed")]
    ExtensionNotAllowed { kind: UploadKind, extension: String },
    #[error("failed to store {file_name}")]
    Io {
        file_name: String,
        #[source]
        source: std::io::Error,
    },
}
