//! Path safety normalization for upload names and request paths.
//!
//! A [`SafePath`] is a canonical, `/`-separated path relative to a
//! deployment namespace. Construction resolves `.` and `..` lexically and
//! rejects anything that would climb above the namespace root instead of
//! clamping it.

use percent_encoding::percent_decode_str;
use std::fmt;

/// A normalized path relative to a deployment namespace.
///
/// The path never contains empty, `.` or `..` segments. A path written with
/// a trailing separator keeps that intent as a directory marker.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SafePath {
    path: String,
    directory: bool,
}

impl SafePath {
    /// Normalize a raw relative path.
    ///
    /// Leading separators are ignored, `\` is treated as a separator, and a
    /// trailing separator (or trailing `.`/`..` segment) marks a directory.
    pub fn normalize(raw: &str) -> crate::Result<Self> {
        if raw.is_empty() {
            return Err(crate::Error::InvalidPath("path is empty".to_string()));
        }
        if let Some(c) = raw.chars().find(|c| c.is_control()) {
            return Err(crate::Error::InvalidPath(format!(
                "path contains control character {:?}",
                c
            )));
        }

        let unified = raw.replace('\\', "/");
        let mut segments: Vec<&str> = Vec::new();

        for segment in unified.split('/') {
            match segment {
                "" | "." => {}
                ".." => {
                    if segments.pop().is_none() {
                        return Err(crate::Error::InvalidPath(format!(
                            "path escapes its namespace: {raw}"
                        )));
                    }
                }
                other => segments.push(other),
            }
        }

        let directory = segments.is_empty()
            || matches!(unified.rsplit('/').next(), Some("" | "." | ".."));

        Ok(Self {
            path: segments.join("/"),
            directory,
        })
    }

    /// Normalize the path component of a request URI.
    ///
    /// Percent-escapes are decoded first, so encoded dot segments are
    /// subject to the same traversal checks as literal ones.
    pub fn from_request_path(raw: &str) -> crate::Result<Self> {
        let decoded = percent_decode_str(raw)
            .decode_utf8()
            .map_err(|_| crate::Error::InvalidPath("path is not valid UTF-8".to_string()))?;
        Self::normalize(&decoded)
    }

    /// Normalize an uploaded file name, which must name a file.
    pub fn file_name(raw: &str) -> crate::Result<Self> {
        let path = Self::normalize(raw)?;
        if path.directory {
            return Err(crate::Error::InvalidPath(format!(
                "file name does not name a file: {raw}"
            )));
        }
        Ok(path)
    }

    /// The normalized path, without any trailing separator.
    /// Empty for the namespace root.
    pub fn as_str(&self) -> &str {
        &self.path
    }

    /// Whether the path was written as a directory.
    pub fn is_directory(&self) -> bool {
        self.directory
    }

    /// The final path segment, if any.
    pub fn last_segment(&self) -> Option<&str> {
        self.path.rsplit('/').next().filter(|s| !s.is_empty())
    }

    /// Whether the final segment carries a file extension.
    pub fn has_extension(&self) -> bool {
        self.last_segment()
            .is_some_and(|segment| segment.contains('.'))
    }

    /// Join a file name onto this path, treating it as a directory.
    pub fn join(&self, name: &str) -> String {
        if self.path.is_empty() {
            name.to_string()
        } else {
            format!("{}/{}", self.path, name)
        }
    }
}

impl fmt::Debug for SafePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SafePath({self})")
    }
}

impl fmt::Display for SafePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.directory {
            write!(f, "{}/", self.path)
        } else {
            write!(f, "{}", self.path)
        }
    }
}
