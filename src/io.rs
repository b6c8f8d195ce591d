use std::{
    error::Error,
    fmt::Display,
    fs::{self, File},
    io::{self, Read},
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

const BYTE_ORDER_MARK: char = '\u{feff}';

#[derive(Debug)]
#[non_exhaustive]
pub struct FromFileError {
    path: PathBuf,
    kind: FromFileErrorKind,
}

impl FromFileError {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn kind(&self) -> &FromFileErrorKind {
        &self.kind
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self.kind, FromFileErrorKind::NotFound)
    }
}

impl Display for FromFileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            FromFileErrorKind::NotFound => write!(f, "could not find file {:?}", self.path),
            FromFileErrorKind::Read(err) => match err.raw_os_error() {
                Some(errno) => write!(f, "error {} reading {:?}", errno, self.path),
                None => write!(f, "error reading {:?}", self.path),
            },
            FromFileErrorKind::Parse(_) => write!(
                f,
                "error parsing {:?}, it may not be valid JSON in UTF-8",
                self.path
            ),
        }
    }
}

impl Error for FromFileError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.kind {
            FromFileErrorKind::NotFound => None,
            FromFileErrorKind::Read(err) => Some(err),
            FromFileErrorKind::Parse(err) => Some(err),
        }
    }
}

#[derive(Debug)]
pub enum FromFileErrorKind {
    #[non_exhaustive]
    NotFound,
    #[non_exhaustive]
    Read(io::Error),
    #[non_exhaustive]
    Parse(serde_json::Error),
}

impl From<io::Error> for FromFileErrorKind {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => Self::NotFound,
            _ => Self::Read(err),
        }
    }
}

#[derive(Debug)]
#[non_exhaustive]
pub struct ToFileError {
    path: PathBuf,
    kind: ToFileErrorKind,
}

impl Display for ToFileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            ToFileErrorKind::Serialize(_) => write!(f, "unable to serialize {:?}", self.path),
            ToFileErrorKind::Write(_) => write!(f, "unable to write file {:?}", self.path),
        }
    }
}

impl Error for ToFileError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.kind {
            ToFileErrorKind::Serialize(err) => Some(err),
            ToFileErrorKind::Write(err) => Some(err),
        }
    }
}

#[derive(Debug)]
pub enum ToFileErrorKind {
    #[non_exhaustive]
    Serialize(serde_json::Error),
    #[non_exhaustive]
    Write(io::Error),
}

/// Read a JSON document, tolerating a leading byte-order mark. Empty or
/// whitespace-only files parse as `{}`.
pub(crate) fn read_json_from_file<P, T>(path: P) -> Result<T, FromFileError>
where
    P: AsRef<Path>,
    for<'de> T: Deserialize<'de>,
{
    fn inner<T>(path: &Path) -> Result<T, FromFileError>
    where
        for<'de> T: Deserialize<'de>,
    {
        // Reading a file into a string before invoking Serde is faster than
        // invoking Serde from a BufReader, see
        // https://github.com/serde-rs/json/issues/160
        (|| {
            let mut string = String::new();
            File::open(path)?.read_to_string(&mut string)?;
            let content = string.strip_prefix(BYTE_ORDER_MARK).unwrap_or(&string);
            let content = if content.trim().is_empty() {
                "{}"
            } else {
                content
            };
            let json = serde_json::from_str(content).map_err(FromFileErrorKind::Parse)?;
            Ok(json)
        })()
        .map_err(|kind| FromFileError {
            path: path.to_owned(),
            kind,
        })
    }
    inner(path.as_ref())
}

/// Overwrite `path` with `value` as JSON indented by four spaces.
pub(crate) fn write_json_to_file<P, T>(path: P, value: &T) -> Result<(), ToFileError>
where
    P: AsRef<Path>,
    T: Serialize,
{
    let path = path.as_ref();
    (|| {
        let mut buffer = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
        value
            .serialize(&mut serializer)
            .map_err(ToFileErrorKind::Serialize)?;
        fs::write(path, buffer).map_err(ToFileErrorKind::Write)?;
        Ok(())
    })()
    .map_err(|kind| ToFileError {
        path: path.to_owned(),
        kind,
    })
}
